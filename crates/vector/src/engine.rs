use courserec_common::{CourseRecError, Result};
use parking_lot::RwLock;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::corpus::Corpus;
use crate::similarity::SimilarityMatrix;
use crate::types::{EngineState, Item, RatingBucket, Recommendation};

/// Corpus size and lifecycle snapshot
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub courses: usize,
    pub dimension: usize,
    pub state: EngineState,
}

/// Course similarity engine
///
/// Starts `Unbuilt`; `build()` publishes a similarity matrix and moves it to
/// `Ready`. The matrix is immutable once published: readers take a cheap
/// `Arc` clone under a short read lock, and `rebuild()` computes a fresh
/// matrix before swapping it in, so a query never sees a half-written one.
pub struct SimilarityEngine {
    corpus: Arc<Corpus>,
    matrix: RwLock<Option<Arc<SimilarityMatrix>>>,
}

impl SimilarityEngine {
    /// Create an unbuilt engine owning `corpus`
    ///
    /// # Arguments
    /// * `corpus` - Validated course corpus; queries that need similarity
    ///   scores fail with `NotReady` until `build()` runs
    pub fn new(corpus: Corpus) -> Self {
        Self {
            corpus: Arc::new(corpus),
            matrix: RwLock::new(None),
        }
    }

    /// Load a corpus file and build the similarity matrix
    ///
    /// # Arguments
    /// * `path` - Corpus file (.csv or .json)
    /// * `embeddings_column` - Name of the vector column (case-insensitive fallback)
    ///
    /// # Errors
    /// Any load error from `Corpus::load` (`Schema`, `DimensionMismatch`, I/O)
    pub fn load(path: &Path, embeddings_column: &str) -> Result<Self> {
        let engine = Self::new(Corpus::load(path, embeddings_column)?);
        engine.build();
        Ok(engine)
    }

    pub fn state(&self) -> EngineState {
        if self.matrix.read().is_some() {
            EngineState::Ready
        } else {
            EngineState::Unbuilt
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Compute the similarity matrix and publish it (Unbuilt/Ready -> Ready)
    pub fn build(&self) -> Arc<SimilarityMatrix> {
        let started = Instant::now();

        // Compute outside the lock
        let matrix = Arc::new(SimilarityMatrix::build(self.corpus.embeddings()));

        // Publish; readers holding the previous Arc keep it until they finish
        *self.matrix.write() = Some(Arc::clone(&matrix));

        info!(
            "Similarity matrix built - {}x{} in {:?}",
            matrix.len(),
            matrix.len(),
            started.elapsed()
        );
        matrix
    }

    /// Recompute the matrix from the current corpus. Query results are not
    /// cached, so the swap is the only invalidation needed.
    pub fn rebuild(&self) -> Arc<SimilarityMatrix> {
        info!("Rebuilding similarity matrix");
        self.build()
    }

    /// Current matrix, or `NotReady` before the first build
    pub fn matrix(&self) -> Result<Arc<SimilarityMatrix>> {
        self.matrix.read().clone().ok_or(CourseRecError::NotReady)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.corpus.len() {
            return Err(CourseRecError::Index {
                index,
                len: self.corpus.len(),
            });
        }
        Ok(())
    }

    /// Top `k` courses most similar to `index`, the course itself excluded.
    /// `k` larger than N-1 returns every other course.
    ///
    /// # Arguments
    /// * `index` - Corpus position of the query course
    /// * `k` - Maximum number of recommendations
    ///
    /// # Errors
    /// `NotReady` before the first build, `Index` when `index` is out of range
    pub fn top_k(&self, index: usize, k: usize) -> Result<Vec<Recommendation>> {
        // Snapshot the published matrix
        let matrix = self.matrix()?;
        self.check_index(index)?;

        // Rank the row and attach course metadata
        let recommendations: Vec<Recommendation> = matrix
            .ranked_neighbors(index, k)
            .into_iter()
            .map(|(j, score)| Recommendation::new(&self.corpus.items()[j], score))
            .collect();

        debug!(
            "top_k(index={}, k={}) -> {} recommendations",
            index,
            k,
            recommendations.len()
        );
        Ok(recommendations)
    }

    /// Recommendations for the first course named `name`
    ///
    /// # Arguments
    /// * `name` - Exact course name
    /// * `k` - Maximum number of recommendations
    ///
    /// # Errors
    /// `NotReady` before the first build, then `NotFound` for an unknown name
    pub fn recommend_by_name(&self, name: &str, k: usize) -> Result<Vec<Recommendation>> {
        // readiness is reported before a lookup miss
        self.matrix()?;
        let item = self.corpus.lookup_by_name(name)?;
        self.top_k(item.id, k)
    }

    /// Similarity between two courses
    ///
    /// # Arguments
    /// * `i`, `j` - Corpus positions
    ///
    /// # Errors
    /// `NotReady` before the first build, `Index` for an out-of-range position
    pub fn similarity(&self, i: usize, j: usize) -> Result<f32> {
        let matrix = self.matrix()?;
        self.check_index(i)?;
        self.check_index(j)?;
        matrix
            .get(i, j)
            .ok_or_else(|| CourseRecError::internal("similarity matrix smaller than corpus"))
    }

    pub fn lookup_by_name(&self, name: &str) -> Result<&Item> {
        self.corpus.lookup_by_name(name)
    }

    pub fn search(&self, query: &str, case_insensitive: bool) -> Vec<&Item> {
        self.corpus.search(query, case_insensitive)
    }

    pub fn rating_distribution(&self) -> Vec<RatingBucket> {
        self.corpus.rating_distribution()
    }

    pub fn export(&self, path: &Path) -> Result<()> {
        self.corpus.export(path)
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            courses: self.corpus.len(),
            dimension: self.corpus.dimension(),
            state: self.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(vectors: Vec<(&str, Vec<f32>)>) -> SimilarityEngine {
        let items = vectors
            .into_iter()
            .map(|(name, vector)| Item::new(name, vector))
            .collect();
        SimilarityEngine::new(Corpus::from_items(items).unwrap())
    }

    fn names(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_queries_before_build_are_not_ready() {
        let engine = engine(vec![("A", vec![1.0, 0.0]), ("B", vec![0.0, 1.0])]);
        assert_eq!(engine.state(), EngineState::Unbuilt);
        assert!(matches!(engine.top_k(0, 1), Err(CourseRecError::NotReady)));
        assert!(matches!(engine.recommend_by_name("A", 1), Err(CourseRecError::NotReady)));
        assert!(matches!(engine.similarity(0, 1), Err(CourseRecError::NotReady)));
        assert!(matches!(engine.matrix(), Err(CourseRecError::NotReady)));

        // corpus queries do not need the matrix
        assert_eq!(engine.search("a", true).len(), 1);
        assert_eq!(engine.lookup_by_name("B").unwrap().id, 1);

        engine.build();
        assert_eq!(engine.state(), EngineState::Ready);
        assert!(engine.top_k(0, 1).is_ok());
    }

    #[test]
    fn test_top_k_scenario() {
        let engine = engine(vec![
            ("A", vec![1.0, 0.0]),
            ("B", vec![1.0, 0.0]),
            ("C", vec![0.0, 1.0]),
        ]);
        engine.build();

        let recs = engine.top_k(0, 2).unwrap();
        assert_eq!(names(&recs), vec!["B", "C"]);
        assert!((recs[0].score - 1.0).abs() < 1e-6);
        assert!(recs[1].score.abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_similarity_is_zero() {
        let engine = engine(vec![
            ("A", vec![1.0, 0.0]),
            ("B", vec![1.0, 0.0]),
            ("C", vec![0.0, 1.0]),
            ("D", vec![0.0, 0.0]),
        ]);
        engine.build();

        assert_eq!(engine.similarity(0, 3).unwrap(), 0.0);
        assert_eq!(engine.similarity(3, 3).unwrap(), 1.0);
        let recs = engine.top_k(3, 3).unwrap();
        assert!(recs.iter().all(|r| r.score == 0.0));
        // all tied: corpus order
        assert_eq!(names(&recs), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_large_magnitude_vectors_score_like_unit_ones() {
        let engine = engine(vec![
            ("A", vec![1e20, 1e20]),
            ("B", vec![1e20, 1e20]),
            ("C", vec![1.0, -1.0]),
        ]);
        engine.build();

        assert!((engine.similarity(0, 1).unwrap() - 1.0).abs() < 1e-6);
        let recs = engine.top_k(0, 2).unwrap();
        assert_eq!(names(&recs), vec!["B", "C"]);
        assert!(recs[1].score.abs() < 1e-6);
    }

    #[test]
    fn test_k_larger_than_corpus_is_clamped() {
        let engine = engine(vec![
            ("A", vec![1.0, 0.0]),
            ("B", vec![0.9, 0.1]),
            ("C", vec![0.1, 0.9]),
            ("D", vec![-1.0, 0.0]),
            ("E", vec![0.5, 0.5]),
        ]);
        engine.build();

        let recs = engine.top_k(0, 10).unwrap();
        assert_eq!(recs.len(), 4);
        assert_eq!(names(&recs), vec!["B", "E", "C", "D"]);
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
        assert!((recs[3].score + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_top_k_never_contains_query_and_respects_k() {
        let vectors: Vec<(String, Vec<f32>)> = (0..12)
            .map(|i| {
                let x = i as f32;
                (format!("course-{}", i), vec![x.sin(), x.cos(), (x * 0.3).sin()])
            })
            .collect();
        let engine = engine(vectors.iter().map(|(n, v)| (n.as_str(), v.clone())).collect());
        engine.build();

        for i in 0..12 {
            for k in [0, 1, 5, 11, 20] {
                let recs = engine.top_k(i, k).unwrap();
                assert!(recs.len() <= k);
                assert_eq!(recs.len(), k.min(11));
                assert!(recs.iter().all(|r| r.id != i && r.score <= 1.0));
            }
        }
    }

    #[test]
    fn test_out_of_range_index() {
        let engine = engine(vec![("A", vec![1.0]), ("B", vec![2.0])]);
        engine.build();
        assert!(matches!(
            engine.top_k(2, 1),
            Err(CourseRecError::Index { index: 2, len: 2 })
        ));
        assert!(matches!(engine.similarity(0, 9), Err(CourseRecError::Index { .. })));
    }

    #[test]
    fn test_recommend_by_name() {
        let engine = engine(vec![
            ("Rust Basics", vec![1.0, 0.1]),
            ("Go Basics", vec![0.0, 1.0]),
            ("Advanced Rust", vec![0.9, 0.2]),
        ]);
        engine.build();

        let recs = engine.recommend_by_name("Rust Basics", 1).unwrap();
        assert_eq!(names(&recs), vec!["Advanced Rust"]);
        assert!(matches!(
            engine.recommend_by_name("Nonexistent", 1),
            Err(CourseRecError::NotFound(_))
        ));
    }

    #[test]
    fn test_rebuild_yields_equal_matrix() {
        let engine = engine(vec![
            ("A", vec![0.3, 0.7, 0.1]),
            ("B", vec![0.9, 0.2, 0.4]),
            ("C", vec![0.0, 0.0, 0.0]),
        ]);
        let first = engine.build();
        let second = engine.rebuild();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(first.max_abs_diff(&second).unwrap() < 1e-6);
        assert!(Arc::ptr_eq(&engine.matrix().unwrap(), &second));
    }

    #[test]
    fn test_readers_keep_their_matrix_across_rebuild() {
        let engine = Arc::new(engine(vec![("A", vec![1.0, 0.0]), ("B", vec![0.0, 1.0])]));
        engine.build();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        if t == 0 {
                            engine.rebuild();
                        } else {
                            let recs = engine.top_k(0, 1).unwrap();
                            assert_eq!(recs[0].name, "B");
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[test]
    fn test_independent_engines() {
        let first = engine(vec![("A", vec![1.0, 0.0]), ("B", vec![0.0, 1.0])]);
        let second = engine(vec![("X", vec![1.0]), ("Y", vec![1.0]), ("Z", vec![-1.0])]);
        first.build();

        assert_eq!(first.state(), EngineState::Ready);
        assert_eq!(second.state(), EngineState::Unbuilt);
        assert_eq!(second.stats().courses, 3);
        assert_eq!(first.stats().dimension, 2);
    }
}
