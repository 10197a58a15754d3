use crate::models::candidature::Candidature;

pub fn confirmation_subject(c: &Candidature) -> String {
    format!("Confirmation de votre candidature — {}", c.reference())
}

/// Plain-text acknowledgement sent to the candidate.
pub fn confirmation_body(c: &Candidature, contact: &str, support: &str) -> String {
    format!(
        "Bonjour {nom},\n\n\
         Nous avons bien reçu votre candidature.\n\n\
         Référence : {reference}\n\
         Date de soumission : {date}\n\n\
         Votre dossier sera examiné par notre équipe de recrutement. Vous serez \
         contacté(e) à l'adresse {email} pour la suite du processus.\n\n\
         Pour toute question : {contact}\n\
         Support technique : {support}\n\n\
         Cordialement,\n\
         L'équipe de recrutement",
        nom = c.nom_complet,
        reference = c.reference(),
        date = c.date_soumission.format("%d/%m/%Y à %H:%M UTC"),
        email = c.email,
        contact = contact,
        support = support,
    )
}

pub fn admin_notice_subject(c: &Candidature) -> String {
    format!("Nouvelle candidature reçue — {}", c.reference())
}

/// Plain-text heads-up sent to the configured admin address.
pub fn admin_notice_body(c: &Candidature) -> String {
    format!(
        "Nouvelle candidature {reference}\n\n\
         Nom : {nom}\n\
         Email : {email}\n\
         Téléphone : {telephone}\n\
         Ville : {ville}\n\
         Date : {date}\n\n\
         CV : {cv}\n\
         Lettre de motivation : {lettre}\n\
         Portfolio (fichier) : {portfolio}\n\
         Portfolio (lien) : {lien}",
        reference = c.reference(),
        nom = c.nom_complet,
        email = c.email,
        telephone = c.telephone.as_deref().unwrap_or("non renseigné"),
        ville = c.ville,
        date = c.date_soumission.format("%d/%m/%Y à %H:%M UTC"),
        cv = c.cv_path.as_deref().unwrap_or("absent"),
        lettre = c.lettre_motivation_path.as_deref().unwrap_or("absent"),
        portfolio = c.portfolio_fichier_path.as_deref().unwrap_or("absent"),
        lien = c.portfolio_lien.as_deref().unwrap_or("absent"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidature::test_candidature;

    #[test]
    fn confirmation_names_candidate_and_reference() {
        let c = test_candidature(42);
        let body = confirmation_body(&c, "contact@example.com", "support@example.com");
        assert!(body.contains("Marie Essomba"));
        assert!(body.contains("CAND000042"));
        assert!(body.contains("contact@example.com"));
        assert!(body.contains("support@example.com"));
        assert!(body.contains("15/01/2026"));
    }

    #[test]
    fn confirmation_subject_carries_reference() {
        let c = test_candidature(7);
        assert!(confirmation_subject(&c).contains("CAND000007"));
    }

    #[test]
    fn admin_notice_lists_attachments() {
        let c = test_candidature(42);
        let body = admin_notice_body(&c);
        assert!(body.contains("CAND000042"));
        assert!(body.contains("marie.essomba@example.com"));
        assert!(body.contains("_cv_")); // the stored CV filename
        assert!(body.contains("Lettre de motivation : absent"));
    }
}
