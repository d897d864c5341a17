//! Capabilities the view needs from the layout/rendering engine.

use std::collections::{HashMap, HashSet};

use crate::graph::{GraphData, Node};

/// A point in simulation space or on screen.
pub type Point = [f64; 2];

/// Layout, selection and projection. Implemented by the canvas force graph
/// and by test doubles.
pub trait GraphEngine {
	/// Replaces the graph and restarts the layout.
	fn set_data(&mut self, data: &GraphData);

	/// Selects one node, plus its neighbours when `select_adjacent` is set.
	fn select_node_by_id(&mut self, id: &str, select_adjacent: bool);
	/// Selects exactly `ids`.
	fn select_nodes_by_ids(&mut self, ids: &[String]);
	/// Clears the selection.
	fn unselect_nodes(&mut self);
	/// `None` when no selection is active.
	fn selected_node_ids(&self) -> Option<&HashSet<String>>;

	/// Neighbours in either direction, `None` for an unknown id.
	fn adjacent_nodes(&self, id: &str) -> Option<Vec<Node>>;

	/// Replaces the set of nodes whose positions are reported by
	/// [`tracked_node_positions`](Self::tracked_node_positions).
	fn track_node_positions_by_ids(&mut self, ids: &[String]);
	/// Simulation-space positions of the tracked nodes.
	fn tracked_node_positions(&self) -> HashMap<String, Point>;

	/// Projects a simulation-space point onto the screen.
	fn space_to_screen_position(&self, position: Point) -> Point;
	/// Scales a simulation-space length to screen pixels.
	fn space_to_screen_radius(&self, radius: f64) -> f64;
	/// Radius of a node in simulation space.
	fn node_radius(&self, id: &str) -> Option<f64>;

	/// Resumes the layout with full energy.
	fn start(&mut self);
	/// Freezes the layout.
	fn pause(&mut self);
	/// Zooms and pans so every node is on screen.
	fn fit_view(&mut self);
}
