use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use crate::config::{SimulationConfig, ViewConfig};
use crate::engine::{GraphEngine, Point};
use crate::graph::{GraphData, Node};

/// Below this alpha the layout is considered settled and physics stops.
pub const ALPHA_MIN: f64 = 0.001;
/// Alpha restored when a node is dragged.
const DRAG_ALPHA: f64 = 0.3;
/// Minimum hit radius in screen pixels.
const MIN_HIT_PX: f64 = 4.0;
const FIT_PADDING: f64 = 40.0;

#[derive(Clone, Debug, Default)]
pub(crate) struct NodeInfo {
	pub(crate) id: String,
	pub(crate) color: String,
}

#[derive(Clone, Debug)]
pub(crate) struct EdgeInfo {
	pub(crate) source: DefaultNodeIdx,
	pub(crate) target: DefaultNodeIdx,
	pub(crate) color: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ViewTransform {
	pub(crate) x: f64,
	pub(crate) y: f64,
	pub(crate) k: f64,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct DragState {
	pub(crate) active: bool,
	pub(crate) node_idx: Option<DefaultNodeIdx>,
	pub(crate) start_x: f64,
	pub(crate) start_y: f64,
	pub(crate) node_start_x: f32,
	pub(crate) node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct PanState {
	pub(crate) active: bool,
	pub(crate) start_x: f64,
	pub(crate) start_y: f64,
	pub(crate) transform_start_x: f64,
	pub(crate) transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct HoverState {
	pub(crate) node: Option<DefaultNodeIdx>,
	/// Eases towards 1 while a node is hovered, back to 0 after.
	pub(crate) highlight_t: f64,
}

/// Force-directed layout on a canvas, exposed to the view through
/// [`GraphEngine`].
pub(crate) struct ForceGraphState {
	pub(crate) graph: ForceGraph<NodeInfo, ()>,
	pub(crate) config: ViewConfig,
	pub(crate) transform: ViewTransform,
	pub(crate) drag: DragState,
	pub(crate) pan: PanState,
	pub(crate) hover: HoverState,
	pub(crate) width: f64,
	pub(crate) height: f64,
	pub(crate) edges: Vec<EdgeInfo>,
	running: bool,
	alpha: f64,
	alpha_decay: f64,
	nodes: Vec<Node>,
	id_to_idx: HashMap<String, DefaultNodeIdx>,
	id_to_pos: HashMap<String, usize>,
	adjacency: Vec<Vec<usize>>,
	selected: Option<HashSet<String>>,
	selected_idx: HashSet<DefaultNodeIdx>,
	tracked: HashSet<DefaultNodeIdx>,
}

fn simulation_parameters(sim: &SimulationConfig) -> SimulationParameters {
	SimulationParameters {
		force_charge: sim.force_charge,
		force_spring: sim.force_spring,
		force_max: sim.force_max,
		node_speed: sim.node_speed,
		damping_factor: sim.damping_factor,
	}
}

/// Per-tick alpha decay so that alpha reaches [`ALPHA_MIN`] after `decay` ticks.
fn alpha_decay(decay: f64) -> f64 {
	if decay <= 0.0 {
		return 1.0;
	}
	1.0 - ALPHA_MIN.powf(1.0 / decay)
}

impl ForceGraphState {
	/// Empty layout for a `width` x `height` canvas, centred on the origin.
	pub fn new(config: ViewConfig, width: f64, height: f64) -> Self {
		let graph = ForceGraph::new(simulation_parameters(&config.simulation));
		let alpha_decay = alpha_decay(config.simulation.decay);
		Self {
			graph,
			config,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			edges: Vec::new(),
			running: true,
			alpha: 1.0,
			alpha_decay,
			nodes: Vec::new(),
			id_to_idx: HashMap::new(),
			id_to_pos: HashMap::new(),
			adjacency: Vec::new(),
			selected: None,
			selected_idx: HashSet::new(),
			tracked: HashSet::new(),
		}
	}

	/// Current layout energy, from 1 down to [`ALPHA_MIN`].
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// False while paused.
	pub fn is_running(&self) -> bool {
		self.running
	}

	pub(crate) fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub(crate) fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let hit = self.config.node_size.max(MIN_HIT_PX / self.transform.k);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < hit {
				found = Some(node.index());
			}
		});
		found
	}

	pub(crate) fn node_id(&self, idx: DefaultNodeIdx) -> Option<String> {
		let mut id = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				id = Some(node.data.user_data.id.clone());
			}
		});
		id
	}

	/// Simulation-space position of a node.
	pub(crate) fn node_position(&self, idx: DefaultNodeIdx) -> Option<Point> {
		let mut pos = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				pos = Some([node.x() as f64, node.y() as f64]);
			}
		});
		pos
	}

	/// Returns whether the hovered node changed.
	pub(crate) fn set_hover(&mut self, node: Option<DefaultNodeIdx>) -> bool {
		if self.hover.node == node {
			return false;
		}
		self.hover.node = node;
		true
	}

	pub(crate) fn has_selection(&self) -> bool {
		!self.selected_idx.is_empty()
	}

	pub(crate) fn is_selected(&self, idx: DefaultNodeIdx) -> bool {
		self.selected_idx.contains(&idx)
	}

	/// Nudges the layout back to life after a drag.
	pub(crate) fn reheat(&mut self) {
		self.alpha = self.alpha.max(DRAG_ALPHA);
	}

	/// Advances physics while running and unsettled, eases hover
	/// highlighting, and returns the current alpha.
	pub(crate) fn tick(&mut self, dt: f32) -> f64 {
		if self.running && self.alpha >= ALPHA_MIN {
			self.graph.update(dt);
			self.alpha *= 1.0 - self.alpha_decay;
		}

		let target = if self.hover.node.is_some() { 1.0 } else { 0.0 };
		self.hover.highlight_t += (target - self.hover.highlight_t) * (6.0 * dt as f64).min(1.0);
		if self.hover.highlight_t < 0.01 && target == 0.0 {
			self.hover.highlight_t = 0.0;
		}
		self.alpha
	}

	pub(crate) fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	fn select_ids(&mut self, ids: HashSet<String>) {
		self.selected_idx = ids
			.iter()
			.filter_map(|id| self.id_to_idx.get(id).copied())
			.collect();
		self.selected = Some(ids);
	}
}

impl GraphEngine for ForceGraphState {
	fn set_data(&mut self, data: &GraphData) {
		self.graph = ForceGraph::new(simulation_parameters(&self.config.simulation));
		self.nodes = data.nodes.clone();
		self.id_to_idx.clear();
		self.id_to_pos.clear();
		self.edges.clear();
		self.adjacency = vec![Vec::new(); data.nodes.len()];

		// phyllotaxis seed so the first frames are not a single point
		let golden = PI * (3.0 - 5f64.sqrt());
		for (i, node) in data.nodes.iter().enumerate() {
			let (r, angle) = (10.0 * (0.5 + i as f64).sqrt(), i as f64 * golden);
			let idx = self.graph.add_node(NodeData {
				x: (r * angle.cos()) as f32,
				y: (r * angle.sin()) as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					color: node.color.clone(),
				},
			});
			self.id_to_idx.insert(node.id.clone(), idx);
			self.id_to_pos.insert(node.id.clone(), i);
		}

		for link in &data.links {
			let (Some(&src), Some(&tgt)) =
				(self.id_to_idx.get(&link.source), self.id_to_idx.get(&link.target))
			else {
				continue;
			};
			let (s, t) = (self.id_to_pos[&link.source], self.id_to_pos[&link.target]);
			self.adjacency[s].push(t);
			self.adjacency[t].push(s);
			self.edges.push(EdgeInfo {
				source: src,
				target: tgt,
				color: link.color.clone(),
			});
			// a spring of zero length has no direction
			if src != tgt {
				self.graph.add_edge(src, tgt, EdgeData::default());
			}
		}
		for neighbours in &mut self.adjacency {
			neighbours.sort_unstable();
			neighbours.dedup();
		}

		self.selected = None;
		self.selected_idx.clear();
		self.tracked.clear();
		self.hover = HoverState::default();
		self.alpha = 1.0;
		self.running = true;
		debug!("engine loaded {} nodes, {} edges", self.nodes.len(), self.edges.len());
	}

	fn select_node_by_id(&mut self, id: &str, select_adjacent: bool) {
		let mut ids = HashSet::from([id.to_owned()]);
		if select_adjacent {
			if let Some(&pos) = self.id_to_pos.get(id) {
				ids.extend(self.adjacency[pos].iter().map(|&i| self.nodes[i].id.clone()));
			}
		}
		self.select_ids(ids);
	}

	fn select_nodes_by_ids(&mut self, ids: &[String]) {
		self.select_ids(ids.iter().cloned().collect());
	}

	fn unselect_nodes(&mut self) {
		self.selected = None;
		self.selected_idx.clear();
	}

	fn selected_node_ids(&self) -> Option<&HashSet<String>> {
		self.selected.as_ref()
	}

	fn adjacent_nodes(&self, id: &str) -> Option<Vec<Node>> {
		let &pos = self.id_to_pos.get(id)?;
		Some(
			self.adjacency[pos]
				.iter()
				.map(|&i| self.nodes[i].clone())
				.collect(),
		)
	}

	fn track_node_positions_by_ids(&mut self, ids: &[String]) {
		self.tracked = ids
			.iter()
			.filter_map(|id| self.id_to_idx.get(id).copied())
			.collect();
	}

	fn tracked_node_positions(&self) -> HashMap<String, Point> {
		let mut positions = HashMap::with_capacity(self.tracked.len());
		if self.tracked.is_empty() {
			return positions;
		}
		self.graph.visit_nodes(|node| {
			if self.tracked.contains(&node.index()) {
				positions.insert(
					node.data.user_data.id.clone(),
					[node.x() as f64, node.y() as f64],
				);
			}
		});
		positions
	}

	fn space_to_screen_position(&self, [x, y]: Point) -> Point {
		[
			x * self.transform.k + self.transform.x,
			y * self.transform.k + self.transform.y,
		]
	}

	fn space_to_screen_radius(&self, radius: f64) -> f64 {
		radius * self.transform.k
	}

	fn node_radius(&self, id: &str) -> Option<f64> {
		self.id_to_idx
			.contains_key(id)
			.then_some(self.config.node_size)
	}

	fn start(&mut self) {
		self.running = true;
		self.alpha = 1.0;
	}

	fn pause(&mut self) {
		self.running = false;
	}

	fn fit_view(&mut self) {
		let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
		let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		self.graph.visit_nodes(|node| {
			let (x, y) = (node.x() as f64, node.y() as f64);
			min_x = min_x.min(x);
			min_y = min_y.min(y);
			max_x = max_x.max(x);
			max_y = max_y.max(y);
		});
		if !min_x.is_finite() {
			return;
		}
		let (w, h) = ((max_x - min_x).max(1.0), (max_y - min_y).max(1.0));
		let avail_w = (self.width - 2.0 * FIT_PADDING).max(1.0);
		let avail_h = (self.height - 2.0 * FIT_PADDING).max(1.0);
		let k = (avail_w / w).min(avail_h / h).clamp(0.1, 10.0);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}
}
