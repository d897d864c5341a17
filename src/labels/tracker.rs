use log::debug;

use super::{FloatingLabel, LabelEntry, LabelRenderer};
use crate::engine::{GraphEngine, Point};
use crate::graph::Node;

/// Opacity of labels outside the current selection.
pub const DIMMED_OPACITY: f64 = 0.1;
/// Gap in pixels between a node's edge and its label.
const LABEL_OFFSET: f64 = 2.0;

/// Maps a node to its label text; `None` means the node gets no label.
pub type TextAccessor = Box<dyn Fn(&Node) -> Option<String>>;

/// Lifecycle of a [`LabelTracker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelState {
	/// Labels are redrawn on every update.
	Visible,
	/// Updates are dropped until shown again.
	Hidden,
	/// Terminal. Every operation is a no-op.
	Destroyed,
}

/// Keeps labels attached to a set of tracked nodes, plus one floating label
/// for the hovered node.
pub struct LabelTracker<R, F> {
	renderer: R,
	floating: F,
	tracked: Vec<Node>,
	state: LabelState,
	text: TextAccessor,
	color: String,
}

impl<R: LabelRenderer, F: FloatingLabel> LabelTracker<R, F> {
	/// Visible tracker labelling nodes by id.
	pub fn new(renderer: R, floating: F) -> Self {
		Self {
			renderer,
			floating,
			tracked: Vec::new(),
			state: LabelState::Visible,
			text: Box::new(|node| Some(node.id.clone())),
			color: "#f5f5f5".into(),
		}
	}

	/// Replaces how label text is derived from a node.
	pub fn with_text_accessor(mut self, text: TextAccessor) -> Self {
		self.text = text;
		self
	}

	/// Sets the text color for every label.
	pub fn with_color(mut self, color: impl Into<String>) -> Self {
		self.color = color.into();
		self
	}

	/// Current lifecycle state.
	pub fn state(&self) -> LabelState {
		self.state
	}

	/// Nodes currently labelled.
	pub fn tracked_nodes(&self) -> &[Node] {
		&self.tracked
	}

	#[cfg(test)]
	pub(crate) fn renderer(&self) -> &R {
		&self.renderer
	}

	#[cfg(test)]
	pub(crate) fn floating(&self) -> &F {
		&self.floating
	}

	/// Labels `nodes` from now on and asks the engine to report their
	/// positions.
	pub fn track_nodes<E: GraphEngine>(&mut self, engine: &mut E, nodes: Vec<Node>) {
		if self.state == LabelState::Destroyed {
			return;
		}
		let ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
		engine.track_node_positions_by_ids(&ids);
		self.tracked = nodes;
	}

	/// Drops every tracked node and clears the layer.
	pub fn reset_nodes<E: GraphEngine>(&mut self, engine: &mut E) {
		if self.state == LabelState::Destroyed {
			return;
		}
		self.tracked.clear();
		engine.track_node_positions_by_ids(&[]);
		self.renderer.set_labels(Vec::new());
		self.renderer.draw(false);
	}

	/// Re-projects every tracked node and redraws. The label of `focused`
	/// is pinned.
	pub fn update_tracked_nodes_labels<E: GraphEngine>(&mut self, engine: &E, focused: Option<&Node>) {
		if self.state != LabelState::Visible {
			return;
		}
		let positions = engine.tracked_node_positions();
		let selected = engine.selected_node_ids().filter(|s| !s.is_empty());

		let labels: Vec<LabelEntry> = self
			.tracked
			.iter()
			.filter_map(|node| {
				let text = (self.text)(node)?;
				let position = positions.get(&node.id).copied().unwrap_or([0.0, 0.0]);
				let [x, y] = engine.space_to_screen_position(position);
				let radius = engine.space_to_screen_radius(engine.node_radius(&node.id).unwrap_or(0.0));
				let opacity = match selected {
					Some(ids) if !ids.contains(&node.id) => DIMMED_OPACITY,
					_ => 1.0,
				};
				Some(LabelEntry {
					id: node.id.clone(),
					text,
					x,
					y: y - (radius + LABEL_OFFSET),
					opacity,
					weight: opacity,
					should_be_shown: focused.is_some_and(|f| f.id == node.id),
					color: self.color.clone(),
				})
			})
			.collect();

		self.renderer.set_labels(labels);
		self.renderer.draw(true);
	}

	/// Shows the floating label above `node` at `position` (simulation
	/// space), or hides it when either is missing.
	pub fn update_hovered_node_label<E: GraphEngine>(
		&mut self,
		engine: &E,
		node: Option<&Node>,
		position: Option<Point>,
	) {
		if self.state != LabelState::Visible {
			return;
		}
		let text = node.and_then(|n| (self.text)(n));
		match (node, position, text) {
			(Some(node), Some(position), Some(text)) => {
				let [x, y] = engine.space_to_screen_position(position);
				let radius = engine.space_to_screen_radius(engine.node_radius(&node.id).unwrap_or(0.0));
				self.floating.set_text(&text);
				self.floating.set_visibility(true);
				self.floating.set_color(&self.color);
				self.floating.set_position(x, y - (radius + LABEL_OFFSET));
			}
			_ => self.floating.set_visibility(false),
		}
		self.floating.draw();
	}

	/// Leaves the hidden state and redraws.
	pub fn show<E: GraphEngine>(&mut self, engine: &E) {
		if self.state == LabelState::Destroyed {
			return;
		}
		self.state = LabelState::Visible;
		self.update_tracked_nodes_labels(engine, None);
		self.renderer.show();
	}

	/// Suppresses redraws; the tracked set is kept.
	pub fn hide(&mut self) {
		if self.state == LabelState::Destroyed {
			return;
		}
		self.state = LabelState::Hidden;
		self.renderer.hide();
	}

	/// Releases both label layers. Idempotent.
	pub fn destroy(&mut self) {
		if self.state == LabelState::Destroyed {
			return;
		}
		debug!("destroying labels ({} tracked)", self.tracked.len());
		self.state = LabelState::Destroyed;
		self.tracked.clear();
		self.floating.destroy();
		self.renderer.destroy();
	}
}
