//! View configuration: defaults, optionally overridden by a JSON
//! `<script id="graph-config">` element on the page.

use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

use crate::data::RowPolicy;
use crate::error::ConfigError;

const CONFIG_ELEMENT_ID: &str = "graph-config";

/// How clicks and hovers behave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionProfile {
	/// Click selects the node and its busiest neighbours and pauses the
	/// layout. The hover label follows every pointer move.
	#[default]
	Focused,
	/// Click selects the node with all of its neighbours while the layout
	/// keeps running. The hover label only changes with the hovered node;
	/// links outside the selection are greyed out.
	Neighborhood,
}

impl InteractionProfile {
	/// Whether selecting a node pauses the layout.
	pub fn pauses_on_select(self) -> bool {
		matches!(self, Self::Focused)
	}

	/// Whether the hover label tracks the pointer within a node.
	pub fn follows_pointer(self) -> bool {
		matches!(self, Self::Focused)
	}

	/// Whether a pointer move should redraw the hover label. Moving onto,
	/// off or between nodes always does; moving within one node only when
	/// the label follows the pointer.
	pub fn refreshes_hover_label(self, node_changed: bool, over_node: bool) -> bool {
		node_changed || (over_node && self.follows_pointer())
	}

	/// Opacity of links not touching the selection.
	pub fn link_greyout_opacity(self) -> f64 {
		match self {
			Self::Focused => 0.1,
			Self::Neighborhood => 0.5,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
/// Layout physics, passed through to `force_graph`.
pub struct SimulationConfig {
	/// Ticks over which alpha decays from 1 to 0.001.
	pub decay: f64,
	/// Node repulsion.
	pub force_charge: f32,
	/// Link attraction.
	pub force_spring: f32,
	/// Cap on the force applied to one node per step.
	pub force_max: f32,
	/// Velocity scale.
	pub node_speed: f32,
	/// Velocity kept between steps.
	pub damping_factor: f32,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			decay: 1000.0,
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.85,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
/// Settings for one graph view. Every field has a default.
pub struct ViewConfig {
	/// CSV edge list to fetch.
	pub data_url: String,
	/// What to do with rows that are not 2 or 3 columns wide.
	pub malformed_rows: RowPolicy,
	/// Click and hover behaviour.
	pub profile: InteractionProfile,
	/// Size of the importance set labelled when nothing is selected.
	pub top_count: usize,
	/// Most neighbours labelled around a selected node.
	pub adjacent_limit: usize,
	/// Most search matches listed.
	pub search_limit: usize,
	/// Minimum alpha change between two label recomputes during layout.
	pub tick_threshold: f64,
	/// Canvas fill.
	pub background_color: String,
	/// Stroke for links without a color of their own.
	pub link_color: String,
	/// Link stroke width in simulation units.
	pub link_width: f64,
	/// Node radius in simulation units.
	pub node_size: f64,
	/// Label text color.
	pub label_color: String,
	/// Layout physics.
	pub simulation: SimulationConfig,
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self {
			data_url: "data.csv".into(),
			malformed_rows: RowPolicy::default(),
			profile: InteractionProfile::default(),
			top_count: 100,
			adjacent_limit: 50,
			search_limit: 20,
			tick_threshold: 0.02,
			background_color: "#222222".into(),
			link_color: "#666666".into(),
			link_width: 0.5,
			node_size: 3.0,
			label_color: "#f5f5f5".into(),
			simulation: SimulationConfig::default(),
		}
	}
}

impl ViewConfig {
	/// Parses a partial JSON config; missing fields keep their defaults.
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(json)?)
	}

	/// Reads the config element if present, falling back to defaults.
	pub fn load() -> Self {
		let Some(json) = config_element_text() else {
			return Self::default();
		};
		match Self::from_json(&json) {
			Ok(config) => {
				info!("using page config (profile {:?})", config.profile);
				config
			}
			Err(e) => {
				warn!("{}; using defaults", e);
				Self::default()
			}
		}
	}
}

fn config_element_text() -> Option<String> {
	let document = web_sys::window()?.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_partial_json_keeps_defaults() {
		let config = ViewConfig::from_json(
			r#"{ "profile": "neighborhood", "top_count": 10, "simulation": { "decay": 500 } }"#,
		)
		.unwrap();
		assert_eq!(config.profile, InteractionProfile::Neighborhood);
		assert_eq!(config.top_count, 10);
		assert_eq!(config.simulation.decay, 500.0);
		assert_eq!(config.simulation.force_charge, 150.0);
		assert_eq!(config.adjacent_limit, 50);
		assert_eq!(config.malformed_rows, RowPolicy::Skip);
	}

	#[test]
	fn test_hover_refresh_per_profile() {
		let focused = InteractionProfile::Focused;
		assert!(focused.refreshes_hover_label(true, true));
		assert!(focused.refreshes_hover_label(false, true));
		assert!(focused.refreshes_hover_label(true, false));
		assert!(!focused.refreshes_hover_label(false, false));

		let neighborhood = InteractionProfile::Neighborhood;
		assert!(neighborhood.refreshes_hover_label(true, true));
		assert!(!neighborhood.refreshes_hover_label(false, true));
		assert!(neighborhood.refreshes_hover_label(true, false));
		assert!(!neighborhood.refreshes_hover_label(false, false));
	}

	#[test]
	fn test_invalid_json_is_an_error() {
		assert!(ViewConfig::from_json("{ nope").is_err());
		assert!(ViewConfig::from_json(r#"{ "malformed_rows": "explode" }"#).is_err());
	}
}
