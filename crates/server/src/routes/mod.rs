use actix_web::web;

pub mod export;
pub mod recommend;
pub mod search;
pub mod stats;

/// Register every route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(search::list_courses)
        .service(search::search)
        .service(recommend::recommend)
        .service(stats::stats)
        .service(stats::rating_distribution)
        .service(export::export);
}
