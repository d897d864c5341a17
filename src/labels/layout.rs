//! Overlap culling for label batches.

use super::LabelEntry;

/// Estimated glyph width in pixels for the overlay font.
pub const CHAR_WIDTH: f64 = 6.5;
pub const LINE_HEIGHT: f64 = 14.0;
const PADDING: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Rect {
	left: f64,
	top: f64,
	right: f64,
	bottom: f64,
}

impl Rect {
	/// Box of a label anchored at its bottom centre.
	fn around(label: &LabelEntry) -> Self {
		let width = label.text.chars().count() as f64 * CHAR_WIDTH + PADDING * 2.0;
		Self {
			left: label.x - width / 2.0,
			right: label.x + width / 2.0,
			top: label.y - LINE_HEIGHT,
			bottom: label.y,
		}
	}

	fn intersects(&self, other: &Rect) -> bool {
		self.left < other.right
			&& other.left < self.right
			&& self.top < other.bottom
			&& other.top < self.bottom
	}
}

/// Decides which labels to draw. Pinned labels always win, then labels go
/// by descending weight, then by position in `labels`; a label is dropped
/// if it overlaps one already placed.
pub fn visible_labels(labels: &[LabelEntry]) -> Vec<bool> {
	let mut order: Vec<usize> = (0..labels.len()).collect();
	order.sort_by(|&a, &b| {
		let (a, b) = (&labels[a], &labels[b]);
		b.should_be_shown
			.cmp(&a.should_be_shown)
			.then(b.weight.total_cmp(&a.weight))
	});

	let mut placed: Vec<Rect> = Vec::with_capacity(labels.len());
	let mut visible = vec![false; labels.len()];
	for i in order {
		let label = &labels[i];
		let rect = Rect::around(label);
		if label.should_be_shown || !placed.iter().any(|p| p.intersects(&rect)) {
			placed.push(rect);
			visible[i] = true;
		}
	}
	visible
}

#[cfg(test)]
mod tests {
	use super::*;

	fn label(id: &str, x: f64, y: f64, weight: f64, pinned: bool) -> LabelEntry {
		LabelEntry {
			id: id.into(),
			text: id.into(),
			x,
			y,
			opacity: weight,
			weight,
			should_be_shown: pinned,
			color: "#f5f5f5".into(),
		}
	}

	#[test]
	fn test_distant_labels_all_visible() {
		let labels = [label("one", 0.0, 0.0, 1.0, false), label("two", 200.0, 200.0, 1.0, false)];
		assert_eq!(visible_labels(&labels), [true, true]);
	}

	#[test]
	fn test_overlap_keeps_first_of_equal_weight() {
		let labels = [label("one", 0.0, 0.0, 1.0, false), label("two", 5.0, 2.0, 1.0, false)];
		assert_eq!(visible_labels(&labels), [true, false]);
	}

	#[test]
	fn test_overlap_prefers_heavier_label() {
		let labels = [label("dim", 0.0, 0.0, 0.1, false), label("lit", 5.0, 2.0, 1.0, false)];
		assert_eq!(visible_labels(&labels), [false, true]);
	}

	#[test]
	fn test_pinned_label_beats_heavier_neighbours() {
		let labels = [
			label("heavy", 0.0, 0.0, 1.0, false),
			label("focus", 3.0, 0.0, 0.1, true),
			label("other", 6.0, 0.0, 1.0, false),
		];
		assert_eq!(visible_labels(&labels), [false, true, false]);
	}
}
