use actix_web::{get, web, HttpResponse};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{RecommendQuery, RecommendResponse, RecommendationItem};

/// Courses most similar to the selected one
#[get("/recommend")]
pub async fn recommend(
    query: web::Query<RecommendQuery>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let top_k = query.top_k.unwrap_or(state.config.default_top_k);
    info!("Recommendation requested: '{}' (top_k={})", query.name, top_k);

    let preview_chars = state.config.description_preview_chars;
    let results: Vec<RecommendationItem> = state
        .engine
        .recommend_by_name(&query.name, top_k)?
        .into_iter()
        .map(|rec| RecommendationItem::from_recommendation(rec, preview_chars))
        .collect();

    let count = results.len();

    Ok(HttpResponse::Ok().json(RecommendResponse {
        course: query.name.clone(),
        results,
        count,
    }))
}
