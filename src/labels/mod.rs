//! Text labels drawn over the graph canvas.

mod dom;
mod layout;
mod tracker;

pub use dom::{DomFloatingLabel, DomLabelRenderer};
pub use tracker::{LabelState, LabelTracker, TextAccessor};

/// One label, positioned in screen space. Rebuilt on every view change.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelEntry {
	/// Node id; also the key for reusing DOM elements.
	pub id: String,
	/// Text shown.
	pub text: String,
	/// Screen x of the label anchor.
	pub x: f64,
	/// Screen y of the label's baseline.
	pub y: f64,
	/// 1 for selected or unselected-everything, dimmed otherwise.
	pub opacity: f64,
	/// Higher weight wins when labels overlap.
	pub weight: f64,
	/// Shown even when it overlaps other labels.
	pub should_be_shown: bool,
	/// Text color.
	pub color: String,
}

/// Draws a batch of labels.
pub trait LabelRenderer {
	/// Replaces the pending batch.
	fn set_labels(&mut self, labels: Vec<LabelEntry>);
	/// Applies pending labels; `force` redraws even when nothing changed.
	fn draw(&mut self, force: bool);
	/// Makes the layer visible again.
	fn show(&mut self);
	/// Hides the layer without dropping the labels.
	fn hide(&mut self);
	/// Removes the layer; later calls do nothing.
	fn destroy(&mut self);
}

/// A single free-standing label, used for the hovered node.
pub trait FloatingLabel {
	/// Sets the label text.
	fn set_text(&mut self, text: &str);
	/// Moves the label anchor to screen coordinates.
	fn set_position(&mut self, x: f64, y: f64);
	/// Shows or hides the label.
	fn set_visibility(&mut self, visible: bool);
	/// Sets the text color.
	fn set_color(&mut self, color: &str);
	/// Applies pending changes.
	fn draw(&mut self);
	/// Removes the label; later calls do nothing.
	fn destroy(&mut self);
}
