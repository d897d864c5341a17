//! Graph data model derived from the edge list.

mod builder;
mod ranking;
mod search;

pub use builder::GraphBuilder;
pub use ranking::rank;
pub use search::match_nodes;

/// A distinct id from the edge list with its link counts.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Id as written in the CSV.
	pub id: String,
	/// `input_links + output_links`.
	pub total_links: u32,
	/// Links ending here.
	pub input_links: u32,
	/// Links starting here.
	pub output_links: u32,
	/// `#rrggbb`, derived from the node's degree relative to the busiest node.
	pub color: String,
}

/// One CSV row, in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Stroke override from the optional third column.
	pub color: Option<String>,
}

/// Nodes in first-seen order and links in row order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	/// Deduplicated nodes.
	pub nodes: Vec<Node>,
	/// One link per row, duplicates included.
	pub links: Vec<Link>,
}

impl GraphData {
	/// Looks a node up by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}
}
