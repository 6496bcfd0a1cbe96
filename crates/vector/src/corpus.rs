//! Embedding store
//!
//! Validates a raw `Table` into a typed, immutable `Corpus`: course metadata
//! in `Item`s plus a dense row-major N×D embedding buffer joined by index.

use courserec_common::{CourseRecError, Result};
use ndarray::Array2;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::normalize::{cell_to_string, parse_rating, parse_vector};
use crate::table::Table;
use crate::types::{Item, RatingBucket};

pub const NAME_COLUMN: &str = "Course Name";
pub const DESCRIPTION_COLUMN: &str = "Course Description";
pub const RATING_COLUMN: &str = "Course Rating";
pub const URL_COLUMN: &str = "Course URL";
pub const DEFAULT_EMBEDDINGS_COLUMN: &str = "Embeddings";

/// Where an exported column takes its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Description,
    Rating,
    Url,
    Extra(usize),
}

/// Ordered, validated course collection
#[derive(Debug, Clone)]
pub struct Corpus {
    items: Vec<Item>,

    /// Row i holds the vector of item i
    embeddings: Array2<f32>,

    /// Non-vector columns in input order
    columns: Vec<(String, Field)>,

    /// Names of columns stored in `Item::extra`
    extra_columns: Vec<String>,

    /// Name of the vector column as found in the input
    embeddings_column: String,
}

impl Corpus {
    /// Load a corpus file (.csv or .json)
    pub fn load(path: &Path, embeddings_column: &str) -> Result<Self> {
        info!("Loading course corpus: {}", path.display());
        let table = Table::from_path(path)?;
        Self::from_table(table, embeddings_column)
    }

    /// Validate and index a raw table
    pub fn from_table(table: Table, embeddings_column: &str) -> Result<Self> {
        if table.is_empty() {
            return Err(CourseRecError::schema("Corpus has no rows"));
        }

        let vector_idx = table.resolve_column(embeddings_column).ok_or_else(|| {
            CourseRecError::schema(format!(
                "No embeddings column '{}' found (columns: {:?})",
                embeddings_column, table.columns
            ))
        })?;

        let required = |name: &str| {
            table.resolve_column(name).ok_or_else(|| {
                CourseRecError::schema(format!(
                    "Missing required column '{}' (columns: {:?})",
                    name, table.columns
                ))
            })
        };
        let name_idx = required(NAME_COLUMN)?;
        let description_idx = required(DESCRIPTION_COLUMN)?;
        let rating_idx = required(RATING_COLUMN)?;
        let url_idx = required(URL_COLUMN)?;

        let mut columns = Vec::with_capacity(table.columns.len());
        let mut extra_idx = Vec::new();
        let mut extra_columns = Vec::new();
        for (idx, column) in table.columns.iter().enumerate() {
            let field = if idx == vector_idx {
                continue;
            } else if idx == name_idx {
                Field::Name
            } else if idx == description_idx {
                Field::Description
            } else if idx == rating_idx {
                Field::Rating
            } else if idx == url_idx {
                Field::Url
            } else {
                extra_idx.push(idx);
                extra_columns.push(column.clone());
                Field::Extra(extra_idx.len() - 1)
            };
            columns.push((column.clone(), field));
        }

        let mut items = Vec::with_capacity(table.len());
        let mut unrated = 0usize;
        for (row_idx, row) in table.rows.iter().enumerate() {
            let vector = parse_vector(&row[vector_idx]).map_err(|e| {
                CourseRecError::schema(format!(
                    "Row {}: malformed '{}' cell: {}",
                    row_idx, table.columns[vector_idx], e
                ))
            })?;

            let rating = parse_rating(&row[rating_idx]);
            let rating_text = cell_to_string(&row[rating_idx]);
            if rating.is_none() {
                unrated += 1;
            }

            items.push(Item {
                id: row_idx,
                name: cell_to_string(&row[name_idx]),
                description: cell_to_string(&row[description_idx]),
                rating,
                rating_text,
                url: cell_to_string(&row[url_idx]),
                vector,
                extra: extra_idx.iter().map(|&i| cell_to_string(&row[i])).collect(),
            });
        }

        if unrated > 0 {
            warn!("{} of {} courses have no numeric rating", unrated, items.len());
        }

        let embeddings_column = table.columns[vector_idx].clone();
        Self::assemble(items, columns, extra_columns, embeddings_column)
    }

    /// Build a corpus from in-memory items; ids are reassigned to positions
    pub fn from_items(items: Vec<Item>) -> Result<Self> {
        if items.is_empty() {
            return Err(CourseRecError::schema("Corpus has no rows"));
        }

        let columns = vec![
            (NAME_COLUMN.to_string(), Field::Name),
            (DESCRIPTION_COLUMN.to_string(), Field::Description),
            (RATING_COLUMN.to_string(), Field::Rating),
            (URL_COLUMN.to_string(), Field::Url),
        ];
        let items = items
            .into_iter()
            .enumerate()
            .map(|(id, item)| {
                // in-memory items may carry only the parsed rating
                let rating_text = match item.rating {
                    Some(r) if item.rating_text.is_empty() => r.to_string(),
                    _ => item.rating_text.clone(),
                };
                Item {
                    id,
                    rating_text,
                    extra: Vec::new(),
                    ..item
                }
            })
            .collect();

        Self::assemble(
            items,
            columns,
            Vec::new(),
            DEFAULT_EMBEDDINGS_COLUMN.to_string(),
        )
    }

    fn assemble(
        items: Vec<Item>,
        columns: Vec<(String, Field)>,
        extra_columns: Vec<String>,
        embeddings_column: String,
    ) -> Result<Self> {
        let dim = items[0].vector.len();
        if dim == 0 {
            return Err(CourseRecError::schema("Embedding vectors are empty"));
        }

        let mut flat = Vec::with_capacity(items.len() * dim);
        for item in &items {
            if item.vector.len() != dim {
                return Err(CourseRecError::DimensionMismatch {
                    expected: dim,
                    found: item.vector.len(),
                    row: item.id,
                });
            }
            flat.extend_from_slice(&item.vector);
        }

        let embeddings = Array2::from_shape_vec((items.len(), dim), flat)
            .map_err(|e| CourseRecError::internal(format!("Embedding buffer shape: {}", e)))?;

        info!("Corpus loaded - {} courses, dimension {}", items.len(), dim);

        Ok(Self {
            items,
            embeddings,
            columns,
            extra_columns,
            embeddings_column,
        })
    }

    /// Number of courses (N)
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Vector dimension (D)
    pub fn dimension(&self) -> usize {
        self.embeddings.ncols()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: usize) -> Option<&Item> {
        self.items.get(id)
    }

    /// Dense N×D embedding buffer
    pub fn embeddings(&self) -> &Array2<f32> {
        &self.embeddings
    }

    /// Non-vector column names in input order
    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Column names of `Item::extra`
    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn embeddings_column(&self) -> &str {
        &self.embeddings_column
    }

    fn field_text(item: &Item, field: Field) -> String {
        match field {
            Field::Name => item.name.clone(),
            Field::Description => item.description.clone(),
            Field::Rating => item.rating_text.clone(),
            Field::Url => item.url.clone(),
            Field::Extra(i) => item.extra[i].clone(),
        }
    }

    /// Rating as JSON: numeric ratings as the shortest decimal that
    /// round-trips the f32 (4.7, not 4.699999809265137), anything else as
    /// the original text, empty cells as null
    fn rating_value(item: &Item) -> Value {
        let number = item
            .rating
            .and_then(|r| r.to_string().parse::<f64>().ok())
            .and_then(serde_json::Number::from_f64);

        match number {
            Some(n) => Value::Number(n),
            None if item.rating_text.is_empty() => Value::Null,
            None => Value::String(item.rating_text.clone()),
        }
    }

    /// Item as a column -> value row in input column order; the vector
    /// column is appended when `include_vector` is set
    pub fn record(&self, item: &Item, include_vector: bool) -> Map<String, Value> {
        let mut row = Map::new();
        for (name, field) in &self.columns {
            let value = match field {
                Field::Rating => Self::rating_value(item),
                other => Value::String(Self::field_text(item, *other)),
            };
            row.insert(name.clone(), value);
        }
        if include_vector {
            row.insert(self.embeddings_column.clone(), Value::from(item.vector.clone()));
        }
        row
    }

    /// Exact name lookup; the first course with the name wins
    pub fn lookup_by_name(&self, name: &str) -> Result<&Item> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .ok_or_else(|| CourseRecError::not_found(format!("Course '{}'", name)))
    }

    /// Courses whose name contains `query`, in corpus order
    pub fn search(&self, query: &str, case_insensitive: bool) -> Vec<&Item> {
        let results: Vec<&Item> = if query.is_empty() {
            self.items.iter().collect()
        } else if case_insensitive {
            let needle = query.to_lowercase();
            self.items
                .iter()
                .filter(|item| item.name.to_lowercase().contains(&needle))
                .collect()
        } else {
            self.items
                .iter()
                .filter(|item| item.name.contains(query))
                .collect()
        };

        debug!("Search '{}' matched {} courses", query, results.len());
        results
    }

    /// Course counts per rating, most common first
    pub fn rating_distribution(&self) -> Vec<RatingBucket> {
        let mut order: Vec<Option<f32>> = Vec::new();
        let mut counts: HashMap<Option<u32>, usize> = HashMap::new();

        for item in &self.items {
            let key = item.rating.map(f32::to_bits);
            let count = counts.entry(key).or_insert(0);
            if *count == 0 {
                order.push(item.rating);
            }
            *count += 1;
        }

        let total = self.items.len() as f32;
        let mut buckets: Vec<RatingBucket> = order
            .into_iter()
            .map(|rating| {
                let count = counts[&rating.map(f32::to_bits)];
                RatingBucket {
                    rating,
                    count,
                    percentage: count as f32 * 100.0 / total,
                }
            })
            .collect();
        // stable: equal counts keep first-appearance order
        buckets.sort_by(|a, b| b.count.cmp(&a.count));
        buckets
    }

    /// Write the flattened corpus as CSV: metadata columns, then one
    /// column per vector dimension named `0..D-1`
    pub fn export_to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header: Vec<String> = self.columns.iter().map(|(name, _)| name.clone()).collect();
        header.extend((0..self.dimension()).map(|d| d.to_string()));
        csv_writer.write_record(&header)?;

        for item in &self.items {
            let mut record: Vec<String> = self
                .columns
                .iter()
                .map(|(_, field)| Self::field_text(item, *field))
                .collect();
            record.extend(item.vector.iter().map(|v| v.to_string()));
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Export to a CSV file, creating parent directories
    pub fn export(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        self.export_to_writer(BufWriter::new(file))?;

        info!(
            "Corpus exported - {} rows, {} columns -> {}",
            self.len(),
            self.columns.len() + self.dimension(),
            path.display()
        );
        Ok(())
    }
}
