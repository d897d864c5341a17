//! Label renderers backed by absolutely positioned `<div>`s in the overlay
//! container above the canvas.

use std::collections::HashMap;

use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use super::layout::visible_labels;
use super::{FloatingLabel, LabelEntry, LabelRenderer};

fn create_div(document: &Document, class: &str) -> Option<HtmlElement> {
	let element = match document.create_element("div") {
		Ok(el) => el,
		Err(e) => {
			warn!("failed to create label element: {:?}", e);
			return None;
		}
	};
	element.set_class_name(class);
	element.dyn_into::<HtmlElement>().ok()
}

fn set_style(element: &HtmlElement, property: &str, value: &str) {
	let _ = element.style().set_property(property, value);
}

fn place(element: &HtmlElement, x: f64, y: f64) {
	// anchored at bottom centre
	set_style(
		element,
		"transform",
		&format!("translate({:.1}px, {:.1}px) translate(-50%, -100%)", x, y),
	);
}

/// Labels as absolutely positioned `div`s in an overlay layer.
pub struct DomLabelRenderer {
	document: Document,
	layer: HtmlElement,
	elements: HashMap<String, HtmlElement>,
	labels: Vec<LabelEntry>,
	dirty: bool,
}

impl DomLabelRenderer {
	/// Appends a label layer to `container`. `None` if the DOM refuses.
	pub fn new(container: &HtmlElement) -> Option<Self> {
		let document = container.owner_document()?;
		let layer = create_div(&document, "graph-labels")?;
		set_style(&layer, "pointer-events", "none");
		container.append_child(&layer).ok()?;
		Some(Self {
			document,
			layer,
			elements: HashMap::new(),
			labels: Vec::new(),
			dirty: false,
		})
	}

	fn element_for(&mut self, id: &str) -> Option<HtmlElement> {
		if let Some(el) = self.elements.get(id) {
			return Some(el.clone());
		}
		let el = create_div(&self.document, "graph-label")?;
		self.layer.append_child(&el).ok()?;
		self.elements.insert(id.to_owned(), el.clone());
		Some(el)
	}
}

impl LabelRenderer for DomLabelRenderer {
	fn set_labels(&mut self, labels: Vec<LabelEntry>) {
		self.labels = labels;
		self.dirty = true;
	}

	fn draw(&mut self, force: bool) {
		if !force && !self.dirty {
			return;
		}
		self.dirty = false;

		let visible = visible_labels(&self.labels);
		let labels = std::mem::take(&mut self.labels);
		for (label, shown) in labels.iter().zip(visible) {
			let Some(el) = self.element_for(&label.id) else {
				continue;
			};
			if !shown {
				set_style(&el, "display", "none");
				continue;
			}
			el.set_text_content(Some(&label.text));
			place(&el, label.x, label.y);
			set_style(&el, "display", "block");
			set_style(&el, "opacity", &label.opacity.to_string());
			set_style(&el, "color", &label.color);
		}

		self.elements.retain(|id, el| {
			let keep = labels.iter().any(|l| &l.id == id);
			if !keep {
				el.remove();
			}
			keep
		});
		self.labels = labels;
	}

	fn show(&mut self) {
		set_style(&self.layer, "display", "block");
	}

	fn hide(&mut self) {
		set_style(&self.layer, "display", "none");
	}

	fn destroy(&mut self) {
		self.elements.clear();
		self.labels.clear();
		self.layer.remove();
	}
}

/// The hover label as a single `div`.
pub struct DomFloatingLabel {
	element: HtmlElement,
	text: String,
	position: (f64, f64),
	visible: bool,
	color: String,
}

impl DomFloatingLabel {
	/// Appends a hidden label to `container`.
	pub fn new(container: &HtmlElement) -> Option<Self> {
		let document = container.owner_document()?;
		let element = create_div(&document, "graph-label graph-label-hover")?;
		set_style(&element, "pointer-events", "none");
		set_style(&element, "opacity", "1");
		set_style(&element, "display", "none");
		container.append_child(&element).ok()?;
		Some(Self {
			element,
			text: String::new(),
			position: (0.0, 0.0),
			visible: false,
			color: String::new(),
		})
	}
}

impl FloatingLabel for DomFloatingLabel {
	fn set_text(&mut self, text: &str) {
		self.text = text.to_owned();
	}

	fn set_position(&mut self, x: f64, y: f64) {
		self.position = (x, y);
	}

	fn set_visibility(&mut self, visible: bool) {
		self.visible = visible;
	}

	fn set_color(&mut self, color: &str) {
		self.color = color.to_owned();
	}

	fn draw(&mut self) {
		if !self.visible {
			set_style(&self.element, "display", "none");
			return;
		}
		self.element.set_text_content(Some(&self.text));
		place(&self.element, self.position.0, self.position.1);
		set_style(&self.element, "color", &self.color);
		set_style(&self.element, "display", "block");
	}

	fn destroy(&mut self) {
		self.element.remove();
	}
}
