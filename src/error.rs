//! Error types for loading and configuring the graph view.

use thiserror::Error;

/// A CSV record whose column count is not `source,target[,color]`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("malformed row at line {line}: expected 2 or 3 columns, found {columns}")]
pub struct MalformedRowError {
	/// 1-based line in the source text.
	pub line: u64,
	/// Columns the record actually had.
	pub columns: usize,
}

/// Failure to turn the data file into graph data.
#[derive(Debug, Error)]
pub enum IngestionError {
	/// The request failed or returned a non-success status.
	#[error("failed to fetch data file: {0}")]
	Fetch(String),

	/// The text is not valid CSV.
	#[error("failed to parse CSV: {0}")]
	Parse(#[from] csv::Error),

	/// A record had the wrong width under [`RowPolicy::Reject`](crate::data::RowPolicy::Reject).
	#[error(transparent)]
	Malformed(#[from] MalformedRowError),
}

/// The embedded view configuration could not be read.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Not valid JSON, or a field has the wrong type.
	#[error("invalid graph config JSON: {0}")]
	Json(#[from] serde_json::Error),
}

/// Result of loading graph data.
pub type Result<T> = std::result::Result<T, IngestionError>;
