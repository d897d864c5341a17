//! Per-view interaction state and the event handlers that drive it.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::config::{InteractionProfile, ViewConfig};
use crate::engine::{GraphEngine, Point};
use crate::graph::{GraphData, Node, rank};
use crate::labels::{FloatingLabel, LabelRenderer, LabelTracker};

/// Everything the view reacts to.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewEvent {
	/// The edge list finished loading.
	DataLoaded(GraphData),
	/// A node was clicked.
	NodeClicked(String),
	/// A click that hit no node.
	BackgroundClicked,
	/// The node under the pointer, if any.
	NodeHovered {
		/// Id of the hovered node.
		id: Option<String>,
		/// Node position in simulation space.
		position: Option<Point>,
	},
	/// A search result was picked.
	SearchSelected(String),
	/// The search box was cleared.
	SearchCleared,
	/// The camera moved (zoom or pan).
	ViewZoomed,
	/// One animation frame of the layout.
	Tick {
		/// Layout energy after the frame.
		alpha: f64,
	},
	/// Pause/Start button.
	TogglePause,
	/// Fit view button.
	FitView,
}

/// Contents of the detail panel for the selected node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeDetail {
	/// Node id.
	pub id: String,
	/// Links ending at the node.
	pub input_links: u32,
	/// Links starting at the node.
	pub output_links: u32,
}

impl From<&Node> for NodeDetail {
	fn from(node: &Node) -> Self {
		Self {
			id: node.id.clone(),
			input_links: node.input_links,
			output_links: node.output_links,
		}
	}
}

/// Rate-limits label updates while the layout is settling.
#[derive(Clone, Debug)]
pub struct TickThrottle {
	prev_alpha: f64,
	threshold: f64,
}

impl TickThrottle {
	/// Throttle that passes changes larger than `threshold`.
	pub fn new(threshold: f64) -> Self {
		Self {
			prev_alpha: 1.0,
			threshold,
		}
	}

	/// True when `alpha` moved far enough since the last accepted tick.
	pub fn accept(&mut self, alpha: f64) -> bool {
		if alpha > 0.0 && (self.prev_alpha - alpha).abs() > self.threshold {
			self.prev_alpha = alpha;
			return true;
		}
		false
	}
}

/// State of the single active graph view.
pub struct ViewSession<E, R, F> {
	/// Layout engine; the canvas drives it directly for drag, pan and zoom.
	pub engine: E,
	labels: LabelTracker<R, F>,
	config: ViewConfig,
	data: Option<Rc<GraphData>>,
	most_important: Vec<Node>,
	selected_node: Option<Node>,
	detail: Option<NodeDetail>,
	is_paused: bool,
	throttle: TickThrottle,
}

impl<E: GraphEngine, R: LabelRenderer, F: FloatingLabel> ViewSession<E, R, F> {
	/// Session with no data yet.
	pub fn new(engine: E, labels: LabelTracker<R, F>, config: ViewConfig) -> Self {
		let throttle = TickThrottle::new(config.tick_threshold);
		Self {
			engine,
			labels,
			config,
			data: None,
			most_important: Vec::new(),
			selected_node: None,
			detail: None,
			is_paused: false,
			throttle,
		}
	}

	/// Loaded graph, if any.
	pub fn data(&self) -> Option<&GraphData> {
		self.data.as_deref()
	}

	/// Node picked by the last click or search.
	pub fn selected_node(&self) -> Option<&Node> {
		self.selected_node.as_ref()
	}

	/// Detail panel contents.
	pub fn detail(&self) -> Option<&NodeDetail> {
		self.detail.as_ref()
	}

	/// Whether the layout is paused.
	pub fn is_paused(&self) -> bool {
		self.is_paused
	}

	/// Nodes labelled while nothing is selected.
	pub fn most_important(&self) -> &[Node] {
		&self.most_important
	}

	/// Label tracker.
	pub fn labels(&self) -> &LabelTracker<R, F> {
		&self.labels
	}

	/// Active interaction profile.
	pub fn profile(&self) -> InteractionProfile {
		self.config.profile
	}

	/// Applies one event. Until data is loaded only pause and fit view
	/// have any effect.
	pub fn handle(&mut self, event: ViewEvent) {
		match event {
			ViewEvent::DataLoaded(data) => self.on_data_loaded(data),
			ViewEvent::TogglePause => self.toggle_pause(),
			ViewEvent::FitView => self.engine.fit_view(),
			_ if self.data.is_none() => debug!("ignoring {:?} before data load", event),
			ViewEvent::NodeClicked(id) => self.click_by_id(&id),
			ViewEvent::BackgroundClicked | ViewEvent::SearchCleared => self.on_point_click(None),
			ViewEvent::SearchSelected(id) => self.click_by_id(&id),
			ViewEvent::NodeHovered { id, position } => {
				let node = id.as_deref().and_then(|id| self.find_node(id));
				self.labels
					.update_hovered_node_label(&self.engine, node.as_ref(), position);
			}
			ViewEvent::ViewZoomed => {
				self.labels.update_hovered_node_label(&self.engine, None, None);
				self.labels
					.update_tracked_nodes_labels(&self.engine, self.selected_node.as_ref());
			}
			ViewEvent::Tick { alpha } => {
				if self.throttle.accept(alpha) {
					self.labels
						.update_tracked_nodes_labels(&self.engine, self.selected_node.as_ref());
				}
			}
		}
	}

	/// Pointer moved over the canvas. `id` and `position` describe the node
	/// under it, `node_changed` whether that differs from the last move.
	pub fn pointer_moved(&mut self, id: Option<String>, position: Option<Point>, node_changed: bool) {
		if self
			.config
			.profile
			.refreshes_hover_label(node_changed, id.is_some())
		{
			self.handle(ViewEvent::NodeHovered { id, position });
		}
	}

	/// Tears down the label layers. Later events still reach the engine
	/// but draw no labels.
	pub fn destroy(&mut self) {
		self.labels.destroy();
	}

	/// Destroys the session held in `slot` and empties it, so callers that
	/// share the slot find nothing to dispatch to.
	pub fn release(slot: &RefCell<Option<Self>>) -> Option<Self> {
		let mut session = slot.borrow_mut().take()?;
		session.destroy();
		Some(session)
	}

	fn find_node(&self, id: &str) -> Option<Node> {
		self.data.as_ref()?.node(id).cloned()
	}

	fn on_data_loaded(&mut self, data: GraphData) {
		info!(
			"graph ready: {} nodes, {} links",
			data.nodes.len(),
			data.links.len()
		);
		self.engine.set_data(&data);
		self.most_important = rank(&data.nodes, self.config.top_count)
			.into_iter()
			.cloned()
			.collect();
		self.selected_node = None;
		self.detail = None;
		self.data = Some(Rc::new(data));
		self.labels
			.track_nodes(&mut self.engine, self.most_important.clone());
	}

	fn click_by_id(&mut self, id: &str) {
		let node = self.find_node(id);
		if node.is_none() {
			warn!("no node with id {:?}", id);
		}
		self.on_point_click(node);
	}

	fn on_point_click(&mut self, node: Option<Node>) {
		let profile = self.config.profile;
		self.selected_node = node.clone();
		if profile.pauses_on_select() {
			self.engine.pause();
			self.is_paused = true;
		}
		self.labels.reset_nodes(&mut self.engine);

		match node {
			Some(node) => {
				let neighbours = self.top_neighbours(&node);
				match profile {
					InteractionProfile::Focused => {
						let ids: Vec<String> = std::iter::once(&node)
							.chain(&neighbours)
							.map(|n| n.id.clone())
							.collect();
						self.engine.select_nodes_by_ids(&ids);
					}
					InteractionProfile::Neighborhood => {
						self.engine.select_node_by_id(&node.id, true);
					}
				}
				let mut tracked = Vec::with_capacity(neighbours.len() + 1);
				tracked.push(node.clone());
				tracked.extend(neighbours);
				self.labels.track_nodes(&mut self.engine, tracked);
				debug!("selected {:?}", node.id);
				self.detail = Some(NodeDetail::from(&node));
			}
			None => {
				self.engine.unselect_nodes();
				self.labels
					.track_nodes(&mut self.engine, self.most_important.clone());
				self.detail = None;
			}
		}
		self.labels.update_tracked_nodes_labels(&self.engine, None);
	}

	fn top_neighbours(&self, node: &Node) -> Vec<Node> {
		let Some(adjacent) = self.engine.adjacent_nodes(&node.id) else {
			return Vec::new();
		};
		let adjacent: Vec<&Node> = adjacent.iter().filter(|n| n.id != node.id).collect();
		rank(adjacent, self.config.adjacent_limit)
			.into_iter()
			.cloned()
			.collect()
	}

	fn toggle_pause(&mut self) {
		if self.is_paused {
			self.is_paused = false;
			self.engine.start();
		} else {
			self.is_paused = true;
			self.engine.pause();
		}
		debug!("paused: {}", self.is_paused);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{MockEngine, RecordingFloating, RecordingRenderer, sample_graph};

	type TestSession = ViewSession<MockEngine, RecordingRenderer, RecordingFloating>;

	fn session(profile: InteractionProfile) -> TestSession {
		let config = ViewConfig {
			profile,
			top_count: 3,
			..ViewConfig::default()
		};
		let labels = LabelTracker::new(RecordingRenderer::default(), RecordingFloating::default());
		ViewSession::new(MockEngine::default(), labels, config)
	}

	fn loaded(profile: InteractionProfile) -> TestSession {
		let mut s = session(profile);
		s.handle(ViewEvent::DataLoaded(sample_graph()));
		s
	}

	fn tracked_ids(s: &TestSession) -> Vec<&str> {
		s.labels().tracked_nodes().iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn test_tick_throttle() {
		let mut throttle = TickThrottle::new(0.02);
		assert!(!throttle.accept(0.99));
		assert!(throttle.accept(0.97));
		assert!(!throttle.accept(0.96));
		assert!(throttle.accept(0.94));
		assert!(!throttle.accept(0.0));
	}

	#[test]
	fn test_data_load_tracks_most_important() {
		let s = loaded(InteractionProfile::Focused);
		// degrees: A 3, B 2, C 3, D 1, E 1
		assert_eq!(tracked_ids(&s), ["A", "C", "B"]);
		assert_eq!(s.most_important().len(), 3);
		assert_eq!(s.data().map(|d| d.links.len()), Some(5));
		assert_eq!(s.engine.nodes.len(), 5);
		assert_eq!(s.engine.tracked_ids, ["A", "C", "B"]);
	}

	#[test]
	fn test_events_before_load_are_ignored() {
		let mut s = session(InteractionProfile::Focused);
		s.handle(ViewEvent::NodeClicked("A".into()));
		s.handle(ViewEvent::ViewZoomed);
		s.handle(ViewEvent::Tick { alpha: 0.5 });
		assert!(s.selected_node().is_none());
		assert!(s.engine.calls.is_empty());
		assert_eq!(s.engine.track_calls, 0);
	}

	#[test]
	fn test_click_in_focused_profile() {
		let mut s = loaded(InteractionProfile::Focused);
		s.handle(ViewEvent::NodeClicked("C".into()));

		assert_eq!(s.selected_node().map(|n| n.id.as_str()), Some("C"));
		assert!(s.is_paused());
		assert!(!s.engine.running);
		// neighbours of C: B (2), A (3), E (1), ranked by degree
		assert_eq!(tracked_ids(&s), ["C", "A", "B", "E"]);
		assert_eq!(s.engine.calls, ["select_many C,A,B,E"]);
		assert_eq!(
			s.detail(),
			Some(&NodeDetail {
				id: "C".into(),
				input_links: 3,
				output_links: 0,
			})
		);
	}

	#[test]
	fn test_click_in_neighborhood_profile() {
		let mut s = loaded(InteractionProfile::Neighborhood);
		s.handle(ViewEvent::NodeClicked("A".into()));

		assert!(!s.is_paused());
		assert!(s.engine.running);
		assert_eq!(s.engine.calls, ["select A adjacent=true"]);
		assert_eq!(tracked_ids(&s), ["A", "C", "B", "D"]);
	}

	#[test]
	fn test_adjacent_limit() {
		let mut s = loaded(InteractionProfile::Focused);
		s.config.adjacent_limit = 1;
		s.handle(ViewEvent::NodeClicked("C".into()));
		assert_eq!(tracked_ids(&s), ["C", "A"]);
	}

	#[test]
	fn test_background_click_restores_importance_set() {
		let mut s = loaded(InteractionProfile::Focused);
		s.handle(ViewEvent::NodeClicked("D".into()));
		s.handle(ViewEvent::BackgroundClicked);

		assert!(s.selected_node().is_none());
		assert!(s.detail().is_none());
		assert_eq!(s.engine.calls.last().map(String::as_str), Some("unselect"));
		assert_eq!(tracked_ids(&s), ["A", "C", "B"]);
	}

	#[test]
	fn test_search_replays_click() {
		let mut s = loaded(InteractionProfile::Neighborhood);
		s.handle(ViewEvent::SearchSelected("B".into()));
		assert_eq!(s.detail().map(|d| d.id.as_str()), Some("B"));

		s.handle(ViewEvent::SearchCleared);
		assert!(s.detail().is_none());

		s.handle(ViewEvent::SearchSelected("missing".into()));
		assert!(s.selected_node().is_none());
		assert_eq!(s.engine.calls.last().map(String::as_str), Some("unselect"));
	}

	#[test]
	fn test_toggle_pause() {
		let mut s = session(InteractionProfile::Neighborhood);
		s.handle(ViewEvent::TogglePause);
		assert!(s.is_paused());
		assert!(!s.engine.running);
		s.handle(ViewEvent::TogglePause);
		assert!(!s.is_paused());
		assert!(s.engine.running);
	}

	#[test]
	fn test_fit_view_delegates() {
		let mut s = session(InteractionProfile::Focused);
		s.handle(ViewEvent::FitView);
		assert_eq!(s.engine.fit_calls, 1);
	}

	#[test]
	fn test_zoom_redraws_labels_and_hides_hover() {
		let mut s = loaded(InteractionProfile::Focused);
		s.handle(ViewEvent::NodeHovered {
			id: Some("A".into()),
			position: Some([1.0, 1.0]),
		});
		assert!(s.labels.floating().visible);

		s.handle(ViewEvent::ViewZoomed);
		assert!(!s.labels.floating().visible);
		assert_eq!(s.labels.renderer().draws, vec![true]);
	}

	#[test]
	fn test_ticks_are_throttled() {
		let mut s = loaded(InteractionProfile::Focused);
		s.handle(ViewEvent::Tick { alpha: 0.995 });
		assert!(s.labels.renderer().draws.is_empty());
		s.handle(ViewEvent::Tick { alpha: 0.9 });
		assert_eq!(s.labels.renderer().draws, vec![true]);
	}

	#[test]
	fn test_focused_hover_label_follows_pointer() {
		let mut s = loaded(InteractionProfile::Focused);
		s.pointer_moved(Some("A".into()), Some([10.0, 10.0]), true);
		s.pointer_moved(Some("A".into()), Some([20.0, 10.0]), false);
		assert!(s.labels.floating().visible);
		assert_eq!(s.labels.floating().draws, 2);
		assert_eq!(s.labels.floating().position.0, 20.0);
	}

	#[test]
	fn test_neighborhood_hover_label_waits_for_node_change() {
		let mut s = loaded(InteractionProfile::Neighborhood);
		s.pointer_moved(Some("A".into()), Some([10.0, 10.0]), true);
		s.pointer_moved(Some("A".into()), Some([20.0, 10.0]), false);
		assert_eq!(s.labels.floating().draws, 1);
		assert_eq!(s.labels.floating().position.0, 10.0);

		s.pointer_moved(None, None, false);
		assert_eq!(s.labels.floating().draws, 1);
		s.pointer_moved(None, None, true);
		assert!(!s.labels.floating().visible);
		assert_eq!(s.labels.floating().draws, 2);
	}

	#[test]
	fn test_release_destroys_and_empties_slot() {
		let slot = RefCell::new(Some(loaded(InteractionProfile::Focused)));
		let released = ViewSession::release(&slot).unwrap();
		assert!(slot.borrow().is_none());
		assert_eq!(released.labels.renderer().destroyed, 1);
		assert_eq!(released.labels.floating().destroyed, 1);
		assert!(ViewSession::release(&slot).is_none());
	}

	#[test]
	fn test_destroyed_labels_stay_quiet() {
		let mut s = loaded(InteractionProfile::Focused);
		s.destroy();
		let calls_before = s.engine.track_calls;
		s.handle(ViewEvent::NodeClicked("A".into()));
		s.handle(ViewEvent::ViewZoomed);
		assert_eq!(s.engine.track_calls, calls_before);
		assert!(s.labels.renderer().draws.is_empty());
	}
}
