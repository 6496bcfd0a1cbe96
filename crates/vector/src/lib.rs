//! CourseRec similarity core
//!
//! Loads a course corpus with precomputed embeddings, validates it into a
//! typed `Corpus` and ranks courses by cosine similarity.
//!
//! ```no_run
//! use courserec_vector::SimilarityEngine;
//! use std::path::Path;
//!
//! # fn main() -> courserec_common::Result<()> {
//! let engine = SimilarityEngine::load(Path::new("course_embeddings.json"), "Embeddings")?;
//! for rec in engine.recommend_by_name("Machine Learning", 5)? {
//!     println!("{:.3} {}", rec.score, rec.name);
//! }
//! # Ok(())
//! # }
//! ```

mod corpus;
mod engine;
mod normalize;
mod similarity;
mod table;
mod types;

pub use corpus::{
    Corpus, DEFAULT_EMBEDDINGS_COLUMN, DESCRIPTION_COLUMN, NAME_COLUMN, RATING_COLUMN, URL_COLUMN,
};
pub use engine::{EngineStats, SimilarityEngine};
pub use normalize::{parse_rating, parse_vector};
pub use similarity::{cosine_similarity, SimilarityMatrix};
pub use table::Table;
pub use types::{truncate_chars, EngineState, Item, RatingBucket, Recommendation};
