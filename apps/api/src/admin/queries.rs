use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::errors::AppError;
use crate::models::candidature::{Candidature, CandidatureSummary, Statut};

/// Fixed admin page size.
pub const PAGE_SIZE: i64 = 20;

#[derive(Debug, Default, Deserialize)]
pub struct ListFilter {
    pub statut: Option<String>,
    pub q: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PagedCandidatures {
    pub items: Vec<CandidatureSummary>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct StatutCount {
    pub statut: String,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct MoisCount {
    pub mois: String,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct VilleCount {
    pub ville: String,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct Statistics {
    pub par_statut: Vec<StatutCount>,
    pub par_mois: Vec<MoisCount>,
    pub top_villes: Vec<VilleCount>,
}

pub async fn count_candidatures(pool: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM candidatures")
        .fetch_one(pool)
        .await
}

pub async fn fetch_candidature(pool: &PgPool, id: i64) -> Result<Candidature, AppError> {
    sqlx::query_as::<_, Candidature>("SELECT * FROM candidatures WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidature {id} introuvable")))
}

/// Newest-first listing with optional statut equality and free-text search
/// over name/email/ville, paginated at `PAGE_SIZE`.
pub async fn list_candidatures(
    pool: &PgPool,
    filter: &ListFilter,
) -> Result<PagedCandidatures, AppError> {
    // An unknown statut label is a caller mistake, not an empty result.
    if let Some(statut) = &filter.statut {
        if Statut::parse(statut).is_none() {
            return Err(AppError::Validation(format!("statut inconnu: {statut}")));
        }
    }

    let page = filter.page.unwrap_or(1).max(1);

    let mut count_query: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM candidatures");
    push_filters(&mut count_query, filter);
    let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

    let mut list_query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM candidatures");
    push_filters(&mut list_query, filter);
    list_query.push(" ORDER BY date_soumission DESC, id DESC");
    list_query.push(" LIMIT ").push_bind(PAGE_SIZE);
    list_query
        .push(" OFFSET ")
        .push_bind((page - 1) * PAGE_SIZE);

    let rows: Vec<Candidature> = list_query.build_query_as().fetch_all(pool).await?;

    Ok(PagedCandidatures {
        items: rows.iter().map(Candidature::summary).collect(),
        page,
        per_page: PAGE_SIZE,
        total,
        total_pages: (total + PAGE_SIZE - 1) / PAGE_SIZE,
    })
}

fn push_filters(query: &mut QueryBuilder<Postgres>, filter: &ListFilter) {
    let mut prefix = " WHERE ";
    if let Some(statut) = &filter.statut {
        query.push(prefix).push("statut = ").push_bind(statut.clone());
        prefix = " AND ";
    }
    if let Some(q) = filter.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let pattern = format!("%{}%", q.trim());
        query
            .push(prefix)
            .push("(nom_complet ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR ville ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Full newest-first dump feeding the admin page's table.
pub async fn list_summaries(pool: &PgPool) -> Result<Vec<CandidatureSummary>, AppError> {
    let rows: Vec<Candidature> =
        sqlx::query_as("SELECT * FROM candidatures ORDER BY date_soumission DESC, id DESC")
            .fetch_all(pool)
            .await?;
    Ok(rows.iter().map(Candidature::summary).collect())
}

/// Applies the admin's partial update. `statut` arrives pre-validated as an
/// enum; `None` fields are left untouched.
pub async fn update_candidature(
    pool: &PgPool,
    id: i64,
    statut: Option<Statut>,
    notes_admin: Option<String>,
) -> Result<Candidature, AppError> {
    let mut tx = pool.begin().await?;
    let updated: Option<Candidature> = sqlx::query_as(
        r#"
        UPDATE candidatures
        SET statut = COALESCE($1, statut),
            notes_admin = COALESCE($2, notes_admin)
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(statut.map(|s| s.as_str().to_string()))
    .bind(notes_admin)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;
    tx.commit().await?;

    updated.ok_or_else(|| AppError::NotFound(format!("Candidature {id} introuvable")))
}

/// Pure aggregate queries for the statistics page; nothing is cached.
pub async fn statistics(pool: &PgPool) -> Result<Statistics, AppError> {
    let par_statut: Vec<(String, i64)> =
        sqlx::query_as("SELECT statut, COUNT(*) FROM candidatures GROUP BY statut ORDER BY statut")
            .fetch_all(pool)
            .await?;

    let par_mois: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT to_char(date_soumission, 'YYYY-MM') AS mois, COUNT(*)
        FROM candidatures
        GROUP BY mois
        ORDER BY mois
        "#,
    )
    .fetch_all(pool)
    .await?;

    let top_villes: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT ville, COUNT(*) AS total
        FROM candidatures
        GROUP BY ville
        ORDER BY total DESC, ville
        LIMIT 5
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(Statistics {
        par_statut: par_statut
            .into_iter()
            .map(|(statut, total)| StatutCount { statut, total })
            .collect(),
        par_mois: par_mois
            .into_iter()
            .map(|(mois, total)| MoisCount { mois, total })
            .collect(),
        top_villes: top_villes
            .into_iter()
            .map(|(ville, total)| VilleCount { ville, total })
            .collect(),
    })
}
