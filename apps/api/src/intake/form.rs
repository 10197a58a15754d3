use axum::extract::Multipart;

use crate::errors::AppError;

/// One uploaded attachment, held in memory until validated and stored.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub data: Vec<u8>,
}

/// The candidate-facing submission, collected from the multipart body.
/// Text fields are trimmed; empty optionals become `None`.
#[derive(Debug, Default)]
pub struct ApplicationForm {
    pub nom_complet: String,
    pub email: String,
    pub telephone: Option<String>,
    pub ville: String,
    pub portfolio_lien: Option<String>,
    pub motivation: Option<String>,
    pub competences: Option<String>,
    pub cv: Option<UploadedFile>,
    pub lettre_motivation: Option<UploadedFile>,
    pub portfolio_fichier: Option<UploadedFile>,
}

impl ApplicationForm {
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, AppError> {
        let mut form = ApplicationForm::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            AppError::Validation(format!("formulaire multipart invalide: {e}"))
        })? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "nom_complet" => form.nom_complet = read_text(field).await?,
                "email" => form.email = read_text(field).await?,
                "ville" => form.ville = read_text(field).await?,
                "telephone" => form.telephone = read_optional(field).await?,
                "portfolio_lien" => form.portfolio_lien = read_optional(field).await?,
                "motivation" => form.motivation = read_optional(field).await?,
                "competences" => form.competences = read_optional(field).await?,
                "cv" => form.cv = read_file(field).await?,
                "lettre_motivation" => form.lettre_motivation = read_file(field).await?,
                "portfolio_fichier" => form.portfolio_fichier = read_file(field).await?,
                _ => {
                    // Unknown fields (e.g. the privacy checkbox) are drained and dropped.
                    let _ = field.bytes().await.map_err(|e| {
                        AppError::Validation(format!("formulaire multipart invalide: {e}"))
                    })?;
                }
            }
        }

        Ok(form)
    }

    /// Required text fields and required attachments, checked before any
    /// file is written or row inserted.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.nom_complet.trim().is_empty() {
            return Err(AppError::Validation(
                "Le nom complet est obligatoire".to_string(),
            ));
        }
        if self.email.trim().is_empty() {
            return Err(AppError::Validation(
                "L'adresse email est obligatoire".to_string(),
            ));
        }
        if self.ville.trim().is_empty() {
            return Err(AppError::Validation(
                "La ville de résidence est obligatoire".to_string(),
            ));
        }
        if self.cv.is_none() {
            return Err(AppError::Validation("Le CV est obligatoire".to_string()));
        }
        if self.lettre_motivation.is_none() {
            return Err(AppError::Validation(
                "La lettre de motivation est obligatoire".to_string(),
            ));
        }
        Ok(())
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map(|s| s.trim().to_string())
        .map_err(|e| AppError::Validation(format!("champ texte illisible: {e}")))
}

async fn read_optional(
    field: axum::extract::multipart::Field<'_>,
) -> Result<Option<String>, AppError> {
    let text = read_text(field).await?;
    Ok(if text.is_empty() { None } else { Some(text) })
}

/// An attachment slot submitted with no filename (empty file input) counts
/// as not provided.
async fn read_file(
    field: axum::extract::multipart::Field<'_>,
) -> Result<Option<UploadedFile>, AppError> {
    let original_name = field.file_name().unwrap_or("").to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("fichier illisible: {e}")))?;
    if original_name.is_empty() || data.is_empty() {
        return Ok(None);
    }
    Ok(Some(UploadedFile {
        original_name,
        data: data.to_vec(),
    }))
}
