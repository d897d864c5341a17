//! Loading the edge list: fetch, CSV parsing, graph derivation.

mod fetch;
mod ingest;

use log::info;

pub use fetch::fetch_text;
pub use ingest::{RawRow, RowPolicy, parse_rows};

use crate::error::Result;
use crate::graph::{GraphBuilder, GraphData};

/// Turns CSV text into graph data.
pub fn graph_from_csv(text: &str, policy: RowPolicy) -> Result<GraphData> {
	let rows = parse_rows(text, policy)?;
	Ok(GraphBuilder::from_rows(rows))
}

/// Fetches and parses the data file. Resolves once; there is no retry.
pub async fn load_graph(url: &str, policy: RowPolicy) -> Result<GraphData> {
	let text = fetch_text(url).await?;
	let data = graph_from_csv(&text, policy)?;
	info!(
		"loaded {}: {} nodes, {} links",
		url,
		data.nodes.len(),
		data.links.len()
	);
	Ok(data)
}
