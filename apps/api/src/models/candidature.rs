use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One job-application record, as stored in the `candidatures` table.
/// `id` and `date_soumission` are set at insert time and never change;
/// only `statut` and `notes_admin` are mutable afterwards, via the admin panel.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidature {
    pub id: i64,
    pub nom_complet: String,
    pub email: String,
    pub telephone: Option<String>,
    pub ville: String,
    pub cv_path: Option<String>,
    pub lettre_motivation_path: Option<String>,
    pub portfolio_fichier_path: Option<String>,
    pub portfolio_lien: Option<String>,
    pub lettre_motivation_text: Option<String>,
    pub competences_marketing: Option<String>,
    pub date_soumission: DateTime<Utc>,
    pub statut: String,
    pub notes_admin: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl Candidature {
    pub fn reference(&self) -> String {
        format_reference(self.id)
    }

    /// Stored filename for the given document slot, if one was uploaded.
    pub fn document_path(&self, kind: DocumentKind) -> Option<&str> {
        match kind {
            DocumentKind::Cv => self.cv_path.as_deref(),
            DocumentKind::LettreMotivation => self.lettre_motivation_path.as_deref(),
            DocumentKind::PortfolioFichier => self.portfolio_fichier_path.as_deref(),
        }
    }

    pub fn summary(&self) -> CandidatureSummary {
        CandidatureSummary {
            id: self.id,
            reference: self.reference(),
            nom_complet: self.nom_complet.clone(),
            email: self.email.clone(),
            telephone: self.telephone.clone(),
            ville: self.ville.clone(),
            date_soumission: self.date_soumission,
            statut: self.statut.clone(),
            has_cv: self.cv_path.is_some(),
            has_lettre: self.lettre_motivation_path.is_some(),
            has_portfolio_file: self.portfolio_fichier_path.is_some(),
            portfolio_lien: self.portfolio_lien.clone(),
        }
    }
}

/// Human-facing reference printed on confirmations: `CAND` + zero-padded id.
pub fn format_reference(id: i64) -> String {
    format!("CAND{id:06}")
}

/// Listing view of a candidature, without the long text fields.
#[derive(Debug, Clone, Serialize)]
pub struct CandidatureSummary {
    pub id: i64,
    pub reference: String,
    pub nom_complet: String,
    pub email: String,
    pub telephone: Option<String>,
    pub ville: String,
    pub date_soumission: DateTime<Utc>,
    pub statut: String,
    pub has_cv: bool,
    pub has_lettre: bool,
    pub has_portfolio_file: bool,
    pub portfolio_lien: Option<String>,
}

/// Admin-managed lifecycle label. Stored as its canonical string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statut {
    Nouvelle,
    EnRevue,
    Contactee,
    Rejetee,
}

impl Statut {
    pub fn as_str(self) -> &'static str {
        match self {
            Statut::Nouvelle => "nouvelle",
            Statut::EnRevue => "en_revue",
            Statut::Contactee => "contactee",
            Statut::Rejetee => "rejetee",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "nouvelle" => Some(Statut::Nouvelle),
            "en_revue" => Some(Statut::EnRevue),
            "contactee" => Some(Statut::Contactee),
            "rejetee" => Some(Statut::Rejetee),
            _ => None,
        }
    }
}

impl Default for Statut {
    fn default() -> Self {
        Statut::Nouvelle
    }
}

/// A typed attachment slot on a candidature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Cv,
    LettreMotivation,
    PortfolioFichier,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::Cv,
        DocumentKind::LettreMotivation,
        DocumentKind::PortfolioFichier,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Cv => "cv",
            DocumentKind::LettreMotivation => "lettre_motivation",
            DocumentKind::PortfolioFichier => "portfolio_fichier",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cv" => Some(DocumentKind::Cv),
            "lettre_motivation" => Some(DocumentKind::LettreMotivation),
            "portfolio_fichier" => Some(DocumentKind::PortfolioFichier),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Cv => "CV",
            DocumentKind::LettreMotivation => "Lettre de motivation",
            DocumentKind::PortfolioFichier => "Portfolio",
        }
    }
}

#[cfg(test)]
pub(crate) fn test_candidature(id: i64) -> Candidature {
    Candidature {
        id,
        nom_complet: "Marie Essomba".into(),
        email: "marie.essomba@example.com".into(),
        telephone: Some("+237 600 000 000".into()),
        ville: "Bertoua".into(),
        cv_path: Some("20260115093000_Marie_Essomba_cv_1a2b3c4d.pdf".into()),
        lettre_motivation_path: None,
        portfolio_fichier_path: None,
        portfolio_lien: None,
        lettre_motivation_text: Some("Je souhaite rejoindre votre équipe.".into()),
        competences_marketing: None,
        date_soumission: chrono::DateTime::parse_from_rfc3339("2026-01-15T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc),
        statut: Statut::default().as_str().into(),
        notes_admin: None,
        ip_address: None,
        user_agent: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_is_zero_padded_to_six_digits() {
        assert_eq!(format_reference(42), "CAND000042");
        assert_eq!(format_reference(1), "CAND000001");
        assert_eq!(format_reference(123456), "CAND123456");
    }

    #[test]
    fn reference_keeps_longer_ids_intact() {
        assert_eq!(format_reference(1234567), "CAND1234567");
    }

    #[test]
    fn statut_round_trips_canonical_labels() {
        for s in ["nouvelle", "en_revue", "contactee", "rejetee"] {
            assert_eq!(Statut::parse(s).unwrap().as_str(), s);
        }
    }

    #[test]
    fn statut_rejects_unknown_labels() {
        assert!(Statut::parse("acceptee").is_none());
        assert!(Statut::parse("NOUVELLE").is_none());
        assert!(Statut::parse("").is_none());
    }

    #[test]
    fn default_statut_is_nouvelle() {
        assert_eq!(Statut::default(), Statut::Nouvelle);
    }

    #[test]
    fn document_kind_maps_to_path_columns() {
        let c = test_candidature(7);
        assert!(c.document_path(DocumentKind::Cv).is_some());
        assert!(c.document_path(DocumentKind::LettreMotivation).is_none());
        assert!(c.document_path(DocumentKind::PortfolioFichier).is_none());
    }

    #[test]
    fn document_kind_parse_rejects_unknown() {
        assert!(DocumentKind::parse("cv").is_some());
        assert!(DocumentKind::parse("resume").is_none());
    }

    #[test]
    fn summary_reports_attachment_presence() {
        let s = test_candidature(7).summary();
        assert_eq!(s.reference, "CAND000007");
        assert!(s.has_cv);
        assert!(!s.has_lettre);
        assert!(!s.has_portfolio_file);
    }
}
