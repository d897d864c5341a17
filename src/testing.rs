//! Test doubles for the engine and label renderers.

use std::collections::{HashMap, HashSet};

use crate::engine::{GraphEngine, Point};
use crate::graph::{GraphBuilder, GraphData, Node};
use crate::labels::{FloatingLabel, LabelEntry, LabelRenderer};

pub const MOCK_NODE_RADIUS: f64 = 3.0;

pub fn node(id: &str, total: u32) -> Node {
	Node {
		id: id.into(),
		total_links: total,
		input_links: 0,
		output_links: total,
		color: "#d81b60".into(),
	}
}

/// A→B, B→C, A→C, A→D, E→C
pub fn sample_graph() -> GraphData {
	let mut builder = GraphBuilder::new();
	for (s, t) in [("A", "B"), ("B", "C"), ("A", "C"), ("A", "D"), ("E", "C")] {
		builder.push_edge(s.into(), t.into(), None);
	}
	builder.build()
}

pub struct MockEngine {
	pub nodes: Vec<Node>,
	pub adjacency: HashMap<String, Vec<String>>,
	pub selected: Option<HashSet<String>>,
	pub tracked_ids: Vec<String>,
	pub track_calls: usize,
	pub positions: HashMap<String, Point>,
	pub zoom: f64,
	pub running: bool,
	pub fit_calls: usize,
	/// Selection calls in order, e.g. `select A adjacent=true`.
	pub calls: Vec<String>,
}

impl Default for MockEngine {
	fn default() -> Self {
		Self {
			nodes: Vec::new(),
			adjacency: HashMap::new(),
			selected: None,
			tracked_ids: Vec::new(),
			track_calls: 0,
			positions: HashMap::new(),
			zoom: 1.0,
			running: true,
			fit_calls: 0,
			calls: Vec::new(),
		}
	}
}

impl GraphEngine for MockEngine {
	fn set_data(&mut self, data: &GraphData) {
		self.nodes = data.nodes.clone();
		self.adjacency.clear();
		for link in &data.links {
			self.adjacency
				.entry(link.source.clone())
				.or_default()
				.push(link.target.clone());
			self.adjacency
				.entry(link.target.clone())
				.or_default()
				.push(link.source.clone());
		}
	}

	fn select_node_by_id(&mut self, id: &str, select_adjacent: bool) {
		self.calls.push(format!("select {id} adjacent={select_adjacent}"));
		let mut ids: HashSet<String> = HashSet::from([id.to_string()]);
		if select_adjacent {
			ids.extend(self.adjacency.get(id).cloned().unwrap_or_default());
		}
		self.selected = Some(ids);
	}

	fn select_nodes_by_ids(&mut self, ids: &[String]) {
		self.calls.push(format!("select_many {}", ids.join(",")));
		self.selected = Some(ids.iter().cloned().collect());
	}

	fn unselect_nodes(&mut self) {
		self.calls.push("unselect".into());
		self.selected = None;
	}

	fn selected_node_ids(&self) -> Option<&HashSet<String>> {
		self.selected.as_ref()
	}

	fn adjacent_nodes(&self, id: &str) -> Option<Vec<Node>> {
		let ids = self.adjacency.get(id)?;
		Some(
			self.nodes
				.iter()
				.filter(|n| ids.contains(&n.id))
				.cloned()
				.collect(),
		)
	}

	fn track_node_positions_by_ids(&mut self, ids: &[String]) {
		self.track_calls += 1;
		self.tracked_ids = ids.to_vec();
	}

	fn tracked_node_positions(&self) -> HashMap<String, Point> {
		self.positions
			.iter()
			.filter(|(id, _)| self.tracked_ids.contains(*id))
			.map(|(id, p)| (id.clone(), *p))
			.collect()
	}

	fn space_to_screen_position(&self, [x, y]: Point) -> Point {
		[x * self.zoom, y * self.zoom]
	}

	fn space_to_screen_radius(&self, radius: f64) -> f64 {
		radius * self.zoom
	}

	fn node_radius(&self, id: &str) -> Option<f64> {
		self.nodes
			.iter()
			.any(|n| n.id == id)
			.then_some(MOCK_NODE_RADIUS)
	}

	fn start(&mut self) {
		self.running = true;
	}

	fn pause(&mut self) {
		self.running = false;
	}

	fn fit_view(&mut self) {
		self.fit_calls += 1;
	}
}

pub struct RecordingRenderer {
	pub labels: Vec<LabelEntry>,
	/// `force` flag of every draw call.
	pub draws: Vec<bool>,
	pub visible: bool,
	pub destroyed: usize,
}

impl Default for RecordingRenderer {
	fn default() -> Self {
		Self {
			labels: Vec::new(),
			draws: Vec::new(),
			visible: true,
			destroyed: 0,
		}
	}
}

impl LabelRenderer for RecordingRenderer {
	fn set_labels(&mut self, labels: Vec<LabelEntry>) {
		self.labels = labels;
	}

	fn draw(&mut self, force: bool) {
		self.draws.push(force);
	}

	fn show(&mut self) {
		self.visible = true;
	}

	fn hide(&mut self) {
		self.visible = false;
	}

	fn destroy(&mut self) {
		self.destroyed += 1;
	}
}

#[derive(Default)]
pub struct RecordingFloating {
	pub text: String,
	pub position: (f64, f64),
	pub visible: bool,
	pub color: String,
	pub draws: usize,
	pub destroyed: usize,
}

impl FloatingLabel for RecordingFloating {
	fn set_text(&mut self, text: &str) {
		self.text = text.into();
	}

	fn set_position(&mut self, x: f64, y: f64) {
		self.position = (x, y);
	}

	fn set_visibility(&mut self, visible: bool) {
		self.visible = visible;
	}

	fn set_color(&mut self, color: &str) {
		self.color = color.into();
	}

	fn draw(&mut self) {
		self.draws += 1;
	}

	fn destroy(&mut self) {
		self.destroyed += 1;
	}
}
