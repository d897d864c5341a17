use csv::{ReaderBuilder, StringRecord};
use log::warn;
use serde::Deserialize;

use crate::error::{MalformedRowError, Result};

/// One `source,target[,color]` record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRow {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Link color; `None` when the column is absent or empty.
	pub color: Option<String>,
}

/// What to do with a record that has the wrong number of columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
	/// Fail the whole load.
	Reject,
	/// Drop the record and keep going.
	#[default]
	Skip,
}

/// Parses CSV text into rows. The first record is a header and is discarded.
/// Records may end in `\r\n` or `\n`; blank lines are ignored.
pub fn parse_rows(text: &str, policy: RowPolicy) -> Result<Vec<RawRow>> {
	let mut reader = ReaderBuilder::new()
		.has_headers(true)
		.flexible(true)
		.from_reader(text.as_bytes());

	let mut rows = Vec::new();
	for record in reader.records() {
		let record = record?;
		match row_from_record(&record) {
			Ok(row) => rows.push(row),
			Err(e) => match policy {
				RowPolicy::Reject => return Err(e.into()),
				RowPolicy::Skip => warn!("skipping {}", e),
			},
		}
	}
	Ok(rows)
}

fn row_from_record(record: &StringRecord) -> std::result::Result<RawRow, MalformedRowError> {
	let malformed = || MalformedRowError {
		line: record.position().map(|p| p.line()).unwrap_or(0),
		columns: record.len(),
	};
	match record.len() {
		2 | 3 => {}
		_ => return Err(malformed()),
	}
	Ok(RawRow {
		source: record[0].to_owned(),
		target: record[1].to_owned(),
		color: record
			.get(2)
			.filter(|c| !c.is_empty())
			.map(str::to_owned),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::IngestionError;

	fn row(s: &str, t: &str) -> RawRow {
		RawRow {
			source: s.into(),
			target: t.into(),
			color: None,
		}
	}

	#[test]
	fn test_parse_crlf_records_skips_header() {
		let rows = parse_rows("source,target\r\nA,B\r\nB,C\r\nA,C\r\n", RowPolicy::Reject).unwrap();
		assert_eq!(rows, vec![row("A", "B"), row("B", "C"), row("A", "C")]);
	}

	#[test]
	fn test_parse_optional_color_column() {
		let rows = parse_rows(
			"source,target,color\nA,B,#ff0000\nB,C,\n",
			RowPolicy::Reject,
		)
		.unwrap();
		assert_eq!(rows[0].color.as_deref(), Some("#ff0000"));
		assert_eq!(rows[1].color, None);
	}

	#[test]
	fn test_malformed_row_rejected() {
		let err = parse_rows("source,target\nA,B\nlonely\n", RowPolicy::Reject).unwrap_err();
		match err {
			IngestionError::Malformed(e) => {
				assert_eq!(e.line, 3);
				assert_eq!(e.columns, 1);
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn test_malformed_row_skipped() {
		let rows = parse_rows("source,target\nA,B\nlonely\nC,D,red,extra\nB,C\n", RowPolicy::Skip)
			.unwrap();
		assert_eq!(rows, vec![row("A", "B"), row("B", "C")]);
	}

	#[test]
	fn test_empty_fields_are_kept() {
		let rows = parse_rows("source,target\nA,\n", RowPolicy::Reject).unwrap();
		assert_eq!(rows, vec![row("A", "")]);
	}

	#[test]
	fn test_header_only() {
		assert!(parse_rows("source,target\r\n", RowPolicy::Reject).unwrap().is_empty());
		assert!(parse_rows("", RowPolicy::Reject).unwrap().is_empty());
	}
}
