use leptos::prelude::*;

use crate::components::force_graph::ForceGraphCanvas;
use crate::config::ViewConfig;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = ViewConfig::load();

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas config=config fullscreen=true />
			<div class="graph-overlay">
				<h1>"Edge List Explorer"</h1>
				<p class="subtitle">
					"Click a node to label its neighbours. Scroll to zoom. Drag background to pan."
				</p>
			</div>
		</div>
	}
}
