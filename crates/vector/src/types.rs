use serde::{Deserialize, Serialize};

/// Course record with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Position in the corpus (0..N-1)
    pub id: usize,

    /// Course name (lookup key)
    pub name: String,

    /// Course description
    pub description: String,

    /// Course rating, `None` when missing or not numeric
    pub rating: Option<f32>,

    /// Rating cell as it appeared in the input ("4.7", "Not Calibrated")
    #[serde(default)]
    pub rating_text: String,

    /// Course URL
    pub url: String,

    /// Embedding vector (length D)
    pub vector: Vec<f32>,

    /// Values of the remaining input columns, aligned with `Corpus::extra_columns`
    #[serde(default)]
    pub extra: Vec<String>,
}

impl Item {
    /// Item with a name and vector and empty metadata
    pub fn new(name: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: String::new(),
            rating: None,
            rating_text: String::new(),
            url: String::new(),
            vector,
            extra: Vec::new(),
        }
    }
}

/// Recommendation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Corpus index of the recommended course
    pub id: usize,

    /// Course name
    pub name: String,

    /// Full course description
    pub description: String,

    /// Course rating
    pub rating: Option<f32>,

    /// Course URL
    pub url: String,

    /// Cosine similarity to the query course (-1.0 to 1.0)
    pub score: f32,
}

impl Recommendation {
    pub fn new(item: &Item, score: f32) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            description: item.description.clone(),
            rating: item.rating,
            url: item.url.clone(),
            score,
        }
    }

    /// Description cut to `max_chars` characters, with `...` when cut
    pub fn preview(&self, max_chars: usize) -> String {
        truncate_chars(&self.description, max_chars)
    }
}

/// Truncate on a char boundary and mark the cut with an ellipsis
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// One slice of the rating distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingBucket {
    /// Rating value, `None` for unrated courses
    pub rating: Option<f32>,

    /// Number of courses with this rating
    pub count: usize,

    /// Share of the corpus in percent
    pub percentage: f32,
}

/// Similarity engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    /// No similarity matrix yet
    Unbuilt,

    /// Similarity matrix built, queries allowed
    Ready,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_text_untouched() {
        assert_eq!(truncate_chars("Intro to Rust", 150), "Intro to Rust");
        assert_eq!(truncate_chars("exact", 5), "exact");
    }

    #[test]
    fn test_truncate_chars_cuts_on_char_boundary() {
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("데이터 과학 입문", 3), "데이터...");
    }

    #[test]
    fn test_recommendation_preview() {
        let item = Item {
            id: 4,
            name: "Data Science".to_string(),
            description: "A long description of the course".to_string(),
            rating: Some(4.5),
            rating_text: "4.5".to_string(),
            url: "https://example.com/ds".to_string(),
            vector: vec![1.0, 0.0],
            extra: Vec::new(),
        };
        let rec = Recommendation::new(&item, 0.75);
        assert_eq!(rec.id, 4);
        assert_eq!(rec.preview(6), "A long...");
    }
}
