use std::collections::BTreeMap;

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    response::Html,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::admin::queries;
use crate::errors::AppError;
use crate::intake::form::ApplicationForm;
use crate::models::candidature::{Candidature, DocumentKind};
use crate::state::AppState;

/// GET /
/// Intake form, with the deadline and an open/closed notice substituted in.
pub async fn handle_home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let page = tokio::fs::read_to_string("templates/index.html")
        .await
        .map_err(|e| anyhow::anyhow!("templates/index.html unreadable: {e}"))?;

    let accepting = state
        .config
        .accepting_applications(Utc::now().date_naive());
    let avis = if accepting {
        ""
    } else {
        r#"<div class="avis-cloture">La période de candidature est terminée.</div>"#
    };

    let page = page
        .replace(
            "{{date_limite}}",
            &state.config.date_limite.format("%d/%m/%Y").to_string(),
        )
        .replace("{{avis_cloture}}", avis)
        .replace("{{email_contact}}", &state.config.email_contact)
        .replace("{{email_support}}", &state.config.email_support);

    Ok(Html(page))
}

/// GET /health
pub async fn handle_health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let count = queries::count_candidatures(&state.db).await?;
    Ok(Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "candidatures_count": count,
    })))
}

/// POST /postuler
///
/// Validates the submission, stores the attachments, inserts the row inside
/// one transaction, then dispatches both notification emails in the
/// background. Required files abort the whole submission when invalid; an
/// invalid optional portfolio file is skipped with a note in `file_status`.
pub async fn handle_postuler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let form = ApplicationForm::from_multipart(&mut multipart).await?;
    form.validate()?;

    let mut file_status: BTreeMap<&str, String> = BTreeMap::new();

    // Required attachments: any failure aborts before the row exists.
    let Some(cv) = &form.cv else {
        return Err(AppError::Validation("Le CV est obligatoire".to_string()));
    };
    let cv_path = state
        .files
        .store(&cv.original_name, &cv.data, &form.nom_complet, DocumentKind::Cv)
        .await?;
    file_status.insert("cv", format!("CV enregistré ({cv_path})"));

    let Some(lettre) = &form.lettre_motivation else {
        return Err(AppError::Validation(
            "La lettre de motivation est obligatoire".to_string(),
        ));
    };
    let lettre_path = state
        .files
        .store(
            &lettre.original_name,
            &lettre.data,
            &form.nom_complet,
            DocumentKind::LettreMotivation,
        )
        .await?;
    file_status.insert(
        "lettre_motivation",
        format!("Lettre de motivation enregistrée ({lettre_path})"),
    );

    // Optional portfolio: degrade gracefully instead of failing the submission.
    let portfolio_path = match &form.portfolio_fichier {
        Some(file) => match state
            .files
            .store(
                &file.original_name,
                &file.data,
                &form.nom_complet,
                DocumentKind::PortfolioFichier,
            )
            .await
        {
            Ok(path) => {
                file_status.insert("portfolio_fichier", format!("Portfolio enregistré ({path})"));
                Some(path)
            }
            Err(e) => {
                tracing::warn!("optional portfolio file skipped: {e}");
                file_status.insert("portfolio_fichier", format!("Portfolio ignoré : {e}"));
                None
            }
        },
        None => None,
    };

    let ip_address = client_ip(&headers);
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut tx = state.db.begin().await?;
    let candidature: Candidature = sqlx::query_as(
        r#"
        INSERT INTO candidatures
            (nom_complet, email, telephone, ville,
             cv_path, lettre_motivation_path, portfolio_fichier_path, portfolio_lien,
             lettre_motivation_text, competences_marketing, ip_address, user_agent)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(form.nom_complet.trim())
    .bind(form.email.trim())
    .bind(&form.telephone)
    .bind(form.ville.trim())
    .bind(&cv_path)
    .bind(&lettre_path)
    .bind(&portfolio_path)
    .bind(&form.portfolio_lien)
    .bind(&form.motivation)
    .bind(&form.competences)
    .bind(&ip_address)
    .bind(&user_agent)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    info!(
        "candidature {} received from {} ({})",
        candidature.reference(),
        candidature.nom_complet,
        candidature.ville
    );

    // Fire-and-log: mail failures never surface to the submitter.
    let notifier = state.notifier.clone();
    let for_mail = candidature.clone();
    tokio::spawn(async move {
        notifier.send_confirmation(&for_mail).await;
        notifier.send_admin_notice(&for_mail).await;
    });

    Ok(Json(json!({
        "success": true,
        "message": format!(
            "Candidature soumise avec succès ! Votre référence : {}",
            candidature.reference()
        ),
        "id": candidature.id,
        "nom": candidature.nom_complet,
        "file_status": file_status,
    })))
}

/// First hop of X-Forwarded-For when present (the service sits behind a
/// reverse proxy in production).
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn client_ip_absent_without_header() {
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
