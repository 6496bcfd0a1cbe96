use actix_web::{get, web, HttpResponse};
use std::sync::Arc;

use crate::state::AppState;
use crate::types::{CourseListResponse, SearchQuery, SearchResponse};

/// All course names, in corpus order (selection list)
#[get("/courses")]
pub async fn list_courses(state: web::Data<Arc<AppState>>) -> actix_web::Result<HttpResponse> {
    let courses: Vec<String> = state
        .engine
        .corpus()
        .items()
        .iter()
        .map(|item| item.name.clone())
        .collect();
    let count = courses.len();

    Ok(HttpResponse::Ok().json(CourseListResponse { courses, count }))
}

/// Substring search over course names
#[get("/search")]
pub async fn search(
    query: web::Query<SearchQuery>,
    state: web::Data<Arc<AppState>>,
) -> actix_web::Result<HttpResponse> {
    let corpus = state.engine.corpus();
    let results: Vec<_> = state
        .engine
        .search(&query.q, !query.case_sensitive)
        .into_iter()
        .map(|item| corpus.record(item, query.include_vectors))
        .collect();

    let count = results.len();

    Ok(HttpResponse::Ok().json(SearchResponse {
        results,
        query: query.q.clone(),
        count,
    }))
}
