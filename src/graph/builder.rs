use std::collections::HashMap;

use log::debug;

use super::{GraphData, Link, Node};
use crate::data::RawRow;

/// Color of the best connected node.
pub const COLOR_HIGH: [u8; 3] = [0xd8, 0x1b, 0x60];
/// Color a node with no links would get.
pub const COLOR_LOW: [u8; 3] = [0x4f, 0x74, 0xc2];

/// Accumulates edges into a deduplicated node list and a link list.
#[derive(Default)]
pub struct GraphBuilder {
	nodes: Vec<Node>,
	index: HashMap<String, usize>,
	links: Vec<Link>,
}

impl GraphBuilder {
	/// Empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a graph from parsed rows in one go.
	pub fn from_rows<I>(rows: I) -> GraphData
	where
		I: IntoIterator<Item = RawRow>,
	{
		let mut builder = Self::new();
		for row in rows {
			builder.push_edge(row.source, row.target, row.color);
		}
		builder.build()
	}

	/// Registers one edge. Empty ids are accepted as-is and become a node
	/// named `""`.
	pub fn push_edge(&mut self, source: String, target: String, color: Option<String>) {
		let src = self.node_entry(&source);
		self.nodes[src].output_links += 1;
		self.nodes[src].total_links += 1;

		let tgt = self.node_entry(&target);
		self.nodes[tgt].input_links += 1;
		self.nodes[tgt].total_links += 1;

		self.links.push(Link {
			source,
			target,
			color,
		});
	}

	fn node_entry(&mut self, id: &str) -> usize {
		if let Some(&i) = self.index.get(id) {
			return i;
		}
		let i = self.nodes.len();
		self.nodes.push(Node {
			id: id.to_owned(),
			total_links: 0,
			input_links: 0,
			output_links: 0,
			color: hex_color(COLOR_HIGH),
		});
		self.index.insert(id.to_owned(), i);
		i
	}

	/// Finishes the graph, coloring every node by its share of the highest degree.
	pub fn build(self) -> GraphData {
		let Self {
			mut nodes, links, ..
		} = self;
		let max = nodes.iter().map(|n| n.total_links).max().unwrap_or(0);
		if max > 0 {
			for node in &mut nodes {
				let ratio = round2(node.total_links as f64 / max as f64);
				node.color = color_for_ratio(ratio);
			}
		}
		debug!(
			"built graph: {} nodes, {} links, max degree {}",
			nodes.len(),
			links.len(),
			max
		);
		GraphData { nodes, links }
	}
}

fn round2(x: f64) -> f64 {
	(x * 100.0).round() / 100.0
}

/// Linear blend between [`COLOR_LOW`] (ratio 0) and [`COLOR_HIGH`] (ratio 1).
pub fn color_for_ratio(ratio: f64) -> String {
	let mut rgb = [0u8; 3];
	for (c, out) in rgb.iter_mut().enumerate() {
		let v = (COLOR_HIGH[c] as f64 * ratio + COLOR_LOW[c] as f64 * (1.0 - ratio)).ceil();
		*out = v.clamp(0.0, 255.0) as u8;
	}
	hex_color(rgb)
}

fn hex_color([r, g, b]: [u8; 3]) -> String {
	format!("#{:02x}{:02x}{:02x}", r, g, b)
}
