use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent, Window,
};

use super::render;
use super::state::ForceGraphState;
use crate::config::ViewConfig;
use crate::data::load_graph;
use crate::graph::match_nodes;
use crate::labels::{DomFloatingLabel, DomLabelRenderer, LabelTracker};
use crate::session::{NodeDetail, ViewEvent, ViewSession};

type Session = ViewSession<ForceGraphState, DomLabelRenderer, DomFloatingLabel>;

/// Pointer travel in pixels below which a press counts as a click.
const CLICK_SLOP: f64 = 4.0;
/// Longest frame step fed to the simulation, in seconds.
const MAX_FRAME_DT: f64 = 0.05;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn pointer_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn create_session(config: &ViewConfig, overlay: &HtmlElement, w: f64, h: f64) -> Option<Session> {
	let renderer = DomLabelRenderer::new(overlay)?;
	let floating = DomFloatingLabel::new(overlay)?;
	let labels = LabelTracker::new(renderer, floating).with_color(config.label_color.clone());
	let engine = ForceGraphState::new(config.clone(), w, h);
	Some(ViewSession::new(engine, labels, config.clone()))
}

/// Updates hover state for the node under the pointer and lets the session
/// decide whether the floating label follows.
fn pointer_moved(s: &mut Session, x: f64, y: f64) {
	let hovered = s.engine.node_at_position(x, y);
	let changed = s.engine.set_hover(hovered);
	let id = hovered.and_then(|i| s.engine.node_id(i));
	let position = hovered.and_then(|i| s.engine.node_position(i));
	s.pointer_moved(id, position, changed);
}

/// Graph canvas with its label overlay, search box, controls and detail
/// panel. Loads `config.data_url` once mounted.
#[component]
pub fn ForceGraphCanvas(
	/// View settings; see [`ViewConfig`].
	config: ViewConfig,
	/// Fill the window and follow its resizes.
	#[prop(default = false)]
	fullscreen: bool,
	/// Canvas width; defaults to the parent's.
	#[prop(default = None)]
	width: Option<f64>,
	/// Canvas height; defaults to the parent's.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let overlay_ref = NodeRef::<leptos::html::Div>::new();
	let session: Rc<RefCell<Option<Session>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let frame_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let press: Rc<Cell<Option<(f64, f64)>>> = Rc::new(Cell::new(None));

	let detail = RwSignal::new(None::<NodeDetail>);
	let paused = RwSignal::new(false);
	let counts = RwSignal::new(None::<(usize, usize)>);
	let load_error = RwSignal::new(None::<String>);
	let search_query = RwSignal::new(String::new());
	let search_results = RwSignal::new(Vec::<String>::new());
	let search_limit = config.search_limit;

	// Runs one event and mirrors the panel state into signals.
	let dispatch: Rc<dyn Fn(ViewEvent)> = {
		let session = session.clone();
		Rc::new(move |event: ViewEvent| {
			let snapshot = match session.borrow_mut().as_mut() {
				Some(s) => {
					s.handle(event);
					(s.detail().cloned(), s.is_paused())
				}
				None => return,
			};
			detail.set(snapshot.0);
			paused.set(snapshot.1);
		})
	};
	let dispatch_store = StoredValue::new_local(dispatch.clone());

	let (session_init, animate_init, resize_cb_init, dispatch_init, frame_init) = (
		session.clone(),
		animate.clone(),
		resize_cb.clone(),
		dispatch.clone(),
		frame_id.clone(),
	);
	Effect::new(move |_| {
		if session_init.borrow().is_some() {
			return;
		}
		let (Some(canvas), Some(overlay)) = (canvas_ref.get(), overlay_ref.get()) else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas 2d context unavailable");
			return;
		};
		let Some(new_session) = create_session(&config, &overlay, w, h) else {
			error!("failed to create label layers");
			return;
		};
		*session_init.borrow_mut() = Some(new_session);
		info!("graph view {}x{} ready, loading {}", w, h, config.data_url);

		let (url, policy, dispatch_load) = (
			config.data_url.clone(),
			config.malformed_rows,
			dispatch_init.clone(),
		);
		spawn_local(async move {
			match load_graph(&url, policy).await {
				Ok(data) => {
					counts.set(Some((data.nodes.len(), data.links.len())));
					dispatch_load(ViewEvent::DataLoaded(data));
				}
				Err(e) => {
					error!("{}", e);
					load_error.set(Some(e.to_string()));
				}
			}
		});

		if fullscreen {
			let (session_resize, canvas_resize) = (session_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *session_resize.borrow_mut() {
					s.engine.resize(nw, nh);
					s.handle(ViewEvent::ViewZoomed);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (session_anim, animate_inner, frame_inner) =
			(session_init.clone(), animate_init.clone(), frame_init.clone());
		let mut last_frame = js_sys::Date::now();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now = js_sys::Date::now();
			let dt = ((now - last_frame) / 1000.0).clamp(0.0, MAX_FRAME_DT);
			last_frame = now;
			if let Some(ref mut s) = *session_anim.borrow_mut() {
				let alpha = s.engine.tick(dt as f32);
				if s.engine.is_running() {
					s.handle(ViewEvent::Tick { alpha });
				}
				render::render(&s.engine, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				frame_inner.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			frame_init.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	let teardown = StoredValue::new_local((
		session.clone(),
		animate.clone(),
		resize_cb.clone(),
		frame_id.clone(),
	));
	on_cleanup(move || {
		teardown.try_with_value(|(session, animate, resize_cb, frame_id)| {
			if Session::release(session).is_some() {
				info!("graph view torn down");
			}
			let window = web_sys::window();
			if let (Some(id), Some(win)) = (frame_id.take(), window.as_ref()) {
				let _ = win.cancel_animation_frame(id);
			}
			// Breaks the closure's reference to itself.
			animate.borrow_mut().take();
			if let (Some(cb), Some(win)) = (resize_cb.borrow_mut().take(), window.as_ref()) {
				let _ = win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		});
	});

	let (session_md, press_md) = (session.clone(), press.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = pointer_position(&canvas, &ev);
		press_md.set(Some((x, y)));

		if let Some(ref mut s) = *session_md.borrow_mut() {
			let st = &mut s.engine;
			if let Some(idx) = st.node_at_position(x, y) {
				let [nx, ny] = st.node_position(idx).unwrap_or([0.0, 0.0]);
				st.drag.active = true;
				st.drag.node_idx = Some(idx);
				st.drag.start_x = x;
				st.drag.start_y = y;
				st.drag.node_start_x = nx as f32;
				st.drag.node_start_y = ny as f32;
			} else {
				st.pan.active = true;
				st.pan.start_x = x;
				st.pan.start_y = y;
				st.pan.transform_start_x = st.transform.x;
				st.pan.transform_start_y = st.transform.y;
			}
		}
	};

	let session_mm = session.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = pointer_position(&canvas, &ev);

		let mut guard = session_mm.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};

		if !s.engine.drag.active {
			pointer_moved(s, x, y);
		}

		let st = &mut s.engine;
		if st.drag.active {
			if let Some(idx) = st.drag.node_idx {
				let (dx, dy) = (
					(x - st.drag.start_x) / st.transform.k,
					(y - st.drag.start_y) / st.transform.k,
				);
				let (nx, ny) = (
					st.drag.node_start_x + dx as f32,
					st.drag.node_start_y + dy as f32,
				);
				st.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.x = nx;
						node.data.y = ny;
						node.data.is_anchor = true;
					}
				});
				st.reheat();
			}
		} else if st.pan.active {
			st.transform.x = st.pan.transform_start_x + (x - st.pan.start_x);
			st.transform.y = st.pan.transform_start_y + (y - st.pan.start_y);
			s.handle(ViewEvent::ViewZoomed);
		}
	};

	let (session_mu, press_mu, dispatch_mu) = (session.clone(), press.clone(), dispatch.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = pointer_position(&canvas, &ev);
		let is_click = press_mu
			.take()
			.is_some_and(|(px, py)| (x - px).hypot(y - py) < CLICK_SLOP);

		let click = {
			let mut guard = session_mu.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			let st = &mut s.engine;
			st.drag.active = false;
			st.drag.node_idx = None;
			st.pan.active = false;
			is_click.then(|| match st.node_at_position(x, y).and_then(|i| st.node_id(i)) {
				Some(id) => ViewEvent::NodeClicked(id),
				None => ViewEvent::BackgroundClicked,
			})
		};
		if let Some(event) = click {
			dispatch_mu(event);
		}
	};

	let (session_ml, press_ml) = (session.clone(), press.clone());
	let on_mouseleave = move |_: MouseEvent| {
		press_ml.set(None);
		if let Some(ref mut s) = *session_ml.borrow_mut() {
			s.engine.drag.active = false;
			s.engine.drag.node_idx = None;
			s.engine.pan.active = false;
			let changed = s.engine.set_hover(None);
			s.pointer_moved(None, None, changed);
		}
	};

	let session_wh = session.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = pointer_position(&canvas, &ev);

		if let Some(ref mut s) = *session_wh.borrow_mut() {
			let t = &mut s.engine.transform;
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (t.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / t.k;
			t.x = x - (x - t.x) * ratio;
			t.y = y - (y - t.y) * ratio;
			t.k = new_k;
			s.handle(ViewEvent::ViewZoomed);
		}
	};

	let session_search = session.clone();
	let on_search_input = move |ev: web_sys::Event| {
		let query = event_target_value(&ev);
		let matches: Vec<String> = session_search
			.borrow()
			.as_ref()
			.and_then(|s| s.data())
			.map(|data| {
				match_nodes(&data.nodes, &query, search_limit)
					.into_iter()
					.map(|n| n.id.clone())
					.collect()
			})
			.unwrap_or_default();
		search_query.set(query);
		search_results.set(matches);
	};

	let dispatch_clear = dispatch.clone();
	let on_search_clear = move |_: MouseEvent| {
		search_query.set(String::new());
		search_results.set(Vec::new());
		dispatch_clear(ViewEvent::SearchCleared);
	};

	let dispatch_pause = dispatch.clone();
	let dispatch_fit = dispatch.clone();

	view! {
		<div class="graph-view">
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div node_ref=overlay_ref class="graph-labels-overlay" />

			<div class="graph-controls">
				<div class="node-search">
					<input
						type="search"
						placeholder="Search node"
						prop:value=move || search_query.get()
						on:input=on_search_input
					/>
					<button type="button" class="clear" on:click=on_search_clear>
						"×"
					</button>
					<ul class="search-results">
						{move || {
							search_results
								.get()
								.into_iter()
								.map(|id| {
									let selected = id.clone();
									view! {
										<li>
											<button
												type="button"
												on:click=move |_| {
													search_query.set(selected.clone());
													search_results.set(Vec::new());
													dispatch_store
														.with_value(|d| d(ViewEvent::SearchSelected(selected.clone())));
												}
											>
												{id}
											</button>
										</li>
									}
								})
								.collect_view()
						}}
					</ul>
				</div>
				<button type="button" on:click=move |_| dispatch_pause(ViewEvent::TogglePause)>
					{move || if paused.get() { "Start" } else { "Pause" }}
				</button>
				<button type="button" on:click=move |_| dispatch_fit(ViewEvent::FitView)>
					"Fit view"
				</button>
				{move || {
					counts
						.get()
						.map(|(nodes, links)| {
							view! {
								<p class="graph-counts">
									<span>{nodes}</span>
									" nodes, "
									<span>{links}</span>
									" links"
								</p>
							}
						})
				}}
			</div>

			{move || {
				detail
					.get()
					.map(|d| {
						view! {
							<div class="selected-area">
								<h2>{d.id}</h2>
								<p>"Input links: " {d.input_links}</p>
								<p>"Output links: " {d.output_links}</p>
							</div>
						}
					})
			}}
			{move || load_error.get().map(|e| view! { <p class="graph-error">{e}</p> })}
		</div>
	}
}
