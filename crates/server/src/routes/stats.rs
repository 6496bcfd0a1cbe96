use actix_web::{get, web, HttpResponse};
use std::sync::Arc;

use crate::state::AppState;
use crate::types::{RatingDistributionResponse, StatsResponse};

#[get("/stats")]
pub async fn stats(state: web::Data<Arc<AppState>>) -> actix_web::Result<HttpResponse> {
    let stats = state.engine.stats();
    let columns = state
        .engine
        .corpus()
        .columns()
        .into_iter()
        .map(str::to_string)
        .collect();

    Ok(HttpResponse::Ok().json(StatsResponse {
        courses: stats.courses,
        dimension: stats.dimension,
        state: stats.state,
        columns,
    }))
}

/// Course counts per rating, most common first
#[get("/stats/ratings")]
pub async fn rating_distribution(
    state: web::Data<Arc<AppState>>,
) -> actix_web::Result<HttpResponse> {
    let buckets = state.engine.rating_distribution();
    let total = buckets.iter().map(|b| b.count).sum();

    Ok(HttpResponse::Ok().json(RatingDistributionResponse { buckets, total }))
}
