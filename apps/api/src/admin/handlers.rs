use axum::{
    extract::{Path, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{Html, IntoResponse},
    Form, Json,
};
use serde::Deserialize;
use tracing::info;

use crate::admin::archive::build_archive;
use crate::admin::queries::{self, ListFilter, PagedCandidatures, Statistics};
use crate::errors::AppError;
use crate::models::candidature::{Candidature, CandidatureSummary, DocumentKind, Statut};
use crate::state::AppState;

/// GET /admin
/// Static shell; the table inside it is fed by /admin/api/candidatures.
pub async fn handle_dashboard() -> Result<Html<String>, AppError> {
    let page = tokio::fs::read_to_string("templates/admin.html")
        .await
        .map_err(|e| anyhow::anyhow!("templates/admin.html unreadable: {e}"))?;
    Ok(Html(page))
}

/// GET /admin/candidatures
pub async fn handle_list(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<PagedCandidatures>, AppError> {
    let page = queries::list_candidatures(&state.db, &filter).await?;
    Ok(Json(page))
}

/// GET /admin/candidature/:id
pub async fn handle_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Candidature>, AppError> {
    let candidature = queries::fetch_candidature(&state.db, id).await?;
    Ok(Json(candidature))
}

#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    pub statut: Option<String>,
    pub notes_admin: Option<String>,
}

/// POST /admin/candidature/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<UpdateForm>,
) -> Result<Json<Candidature>, AppError> {
    let statut = match form.statut.as_deref() {
        Some(s) => Some(
            Statut::parse(s)
                .ok_or_else(|| AppError::Validation(format!("statut inconnu: {s}")))?,
        ),
        None => None,
    };

    let updated = queries::update_candidature(&state.db, id, statut, form.notes_admin).await?;
    info!("candidature {} updated, statut={}", updated.reference(), updated.statut);
    Ok(Json(updated))
}

/// GET /admin/download/:id/:kind
pub async fn handle_download(
    State(state): State<AppState>,
    Path((id, kind)): Path<(i64, String)>,
) -> Result<impl IntoResponse, AppError> {
    let kind = DocumentKind::parse(&kind)
        .ok_or_else(|| AppError::NotFound(format!("Type de document inconnu: {kind}")))?;
    let candidature = queries::fetch_candidature(&state.db, id).await?;
    let filename = candidature
        .document_path(kind)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Aucun document '{}' pour la candidature {id}",
                kind.as_str()
            ))
        })?
        .to_string();

    let bytes = tokio::fs::read(state.files.dir().join(&filename))
        .await
        .map_err(|_| AppError::NotFound(format!("Fichier introuvable: {filename}")))?;

    Ok((
        [
            (CONTENT_TYPE, content_type_for(&filename).to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

/// GET /admin/download-all/:id
pub async fn handle_download_all(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let candidature = queries::fetch_candidature(&state.db, id).await?;
    let upload_dir = state.files.dir().to_path_buf();
    let archive_name = format!("candidature_{}.zip", candidature.reference());

    let bytes = tokio::task::spawn_blocking(move || build_archive(&candidature, &upload_dir))
        .await
        .map_err(|e| anyhow::anyhow!("archive task panicked: {e}"))??;

    Ok((
        [
            (CONTENT_TYPE, "application/zip".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{archive_name}\""),
            ),
        ],
        bytes,
    ))
}

/// GET /admin/statistiques
pub async fn handle_statistics(
    State(state): State<AppState>,
) -> Result<Json<Statistics>, AppError> {
    let stats = queries::statistics(&state.db).await?;
    Ok(Json(stats))
}

/// GET /admin/api/candidatures
pub async fn handle_api_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidatureSummary>>, AppError> {
    let summaries = queries::list_summaries(&state.db).await?;
    Ok(Json(summaries))
}

fn content_type_for(filename: &str) -> &'static str {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain; charset=utf-8",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_covers_the_allow_list() {
        assert_eq!(content_type_for("a.pdf"), "application/pdf");
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert!(content_type_for("a.docx").contains("wordprocessingml"));
        assert_eq!(content_type_for("a"), "application/octet-stream");
    }
}
