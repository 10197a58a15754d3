use std::io::{Cursor, Write};
use std::path::Path;

use anyhow::{Context, Result};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::models::candidature::{Candidature, DocumentKind};

/// Bundles every stored document of a candidature plus a generated summary
/// into one in-memory ZIP. Slots with no stored file are skipped, as is a
/// filename whose bytes have gone missing from the upload directory.
pub fn build_archive(candidature: &Candidature, upload_dir: &Path) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for kind in DocumentKind::ALL {
        let Some(filename) = candidature.document_path(kind) else {
            continue;
        };
        match std::fs::read(upload_dir.join(filename)) {
            Ok(bytes) => {
                writer.start_file(filename, options)?;
                writer.write_all(&bytes)?;
            }
            Err(e) => {
                tracing::warn!(
                    "{}: stored file '{filename}' unreadable, left out of archive: {e}",
                    candidature.reference()
                );
            }
        }
    }

    writer.start_file("candidature_summary.txt", options)?;
    writer.write_all(summary_text(candidature).as_bytes())?;

    let cursor = writer.finish().context("finalizing archive")?;
    Ok(cursor.into_inner())
}

/// Plain-text recap included in every archive.
pub fn summary_text(c: &Candidature) -> String {
    let mut out = format!(
        "Candidature {reference}\n\
         =====================\n\n\
         Nom complet : {nom}\n\
         Email : {email}\n\
         Téléphone : {telephone}\n\
         Ville : {ville}\n\
         Date de soumission : {date}\n\
         Statut : {statut}\n\
         Portfolio (lien) : {lien}\n",
        reference = c.reference(),
        nom = c.nom_complet,
        email = c.email,
        telephone = c.telephone.as_deref().unwrap_or("non renseigné"),
        ville = c.ville,
        date = c.date_soumission.format("%d/%m/%Y à %H:%M UTC"),
        statut = c.statut,
        lien = c.portfolio_lien.as_deref().unwrap_or("non renseigné"),
    );

    if let Some(motivation) = &c.lettre_motivation_text {
        out.push_str("\nLettre de motivation (texte) :\n");
        out.push_str(motivation);
        out.push('\n');
    }
    if let Some(competences) = &c.competences_marketing {
        out.push_str("\nCompétences marketing :\n");
        out.push_str(competences);
        out.push('\n');
    }
    if let Some(notes) = &c.notes_admin {
        out.push_str("\nNotes admin :\n");
        out.push_str(notes);
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidature::test_candidature;
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn cv_only_record_yields_one_document_plus_summary() {
        let dir = tempdir().unwrap();
        let c = test_candidature(42);
        let cv_name = c.cv_path.as_deref().unwrap();
        std::fs::write(dir.path().join(cv_name), b"%PDF-1.4").unwrap();

        let bytes = build_archive(&c, dir.path()).unwrap();
        let names = entry_names(&bytes);
        assert_eq!(names.len(), 2);
        assert!(names.contains(&cv_name.to_string()));
        assert!(names.contains(&"candidature_summary.txt".to_string()));
    }

    #[test]
    fn record_without_any_file_still_gets_summary() {
        let dir = tempdir().unwrap();
        let mut c = test_candidature(1);
        c.cv_path = None;

        let bytes = build_archive(&c, dir.path()).unwrap();
        assert_eq!(entry_names(&bytes), vec!["candidature_summary.txt"]);
    }

    #[test]
    fn missing_bytes_on_disk_are_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        // cv_path is set but no such file was written into the directory.
        let c = test_candidature(2);

        let bytes = build_archive(&c, dir.path()).unwrap();
        assert_eq!(entry_names(&bytes), vec!["candidature_summary.txt"]);
    }

    #[test]
    fn archive_contents_round_trip() {
        let dir = tempdir().unwrap();
        let c = test_candidature(3);
        let cv_name = c.cv_path.as_deref().unwrap();
        std::fs::write(dir.path().join(cv_name), b"contenu du cv").unwrap();

        let bytes = build_archive(&c, dir.path()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut stored = String::new();
        archive
            .by_name(cv_name)
            .unwrap()
            .read_to_string(&mut stored)
            .unwrap();
        assert_eq!(stored, "contenu du cv");
    }

    #[test]
    fn summary_carries_identity_and_statut() {
        let c = test_candidature(42);
        let text = summary_text(&c);
        assert!(text.contains("CAND000042"));
        assert!(text.contains("Marie Essomba"));
        assert!(text.contains("nouvelle"));
        assert!(text.contains("Je souhaite rejoindre"));
    }
}
