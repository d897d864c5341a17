use std::collections::HashMap;
use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::ForceGraphState;

/// Opacity of nodes outside an active selection.
const GREYOUT_NODE_ALPHA: f64 = 0.1;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(&state.config.background_color);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_links(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_links(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let mut positions = HashMap::new();
	state.graph.visit_nodes(|node| {
		positions.insert(node.index(), (node.x() as f64, node.y() as f64));
	});

	let has_selection = state.has_selection();
	let greyout = state.config.profile.link_greyout_opacity();
	ctx.set_line_width(state.config.link_width);

	for edge in &state.edges {
		let (Some(&(x1, y1)), Some(&(x2, y2))) =
			(positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		if (dx * dx + dy * dy).sqrt() < 0.001 {
			continue;
		}

		let in_selection = state.is_selected(edge.source) && state.is_selected(edge.target);
		let alpha = if has_selection && !in_selection {
			greyout
		} else {
			1.0
		};

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(edge.color.as_deref().unwrap_or(state.config.link_color.as_str()));
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_selection, t, k) = (
		state.has_selection(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);
	let radius = state.config.node_size;

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		let (x, y) = (node.x() as f64, node.y() as f64);
		let alpha = if has_selection && !state.is_selected(idx) {
			GREYOUT_NODE_ALPHA
		} else {
			1.0
		};

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&node.data.user_data.color);
		ctx.fill();
		ctx.set_global_alpha(1.0);
	});

	let Some(hovered) = state.hover.node else {
		return;
	};
	if t <= 0.01 {
		return;
	}
	let Some([x, y]) = state.node_position(hovered) else {
		return;
	};

	let glow_radius = radius * (1.8 + 1.2 * t);
	if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
		let alpha = 0.35 * t;
		let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", alpha));
		let _ = gradient.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
		let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
		ctx.begin_path();
		let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
		ctx.fill();
	}

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
	ctx.set_line_width(1.5 / k);
	ctx.stroke();
}
