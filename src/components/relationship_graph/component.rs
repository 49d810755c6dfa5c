use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::analysis::{focal_relationships, most_connected, network_stats, strength_dots};
use super::config::{GraphConfig, LayoutMode};
use super::render::{self, Frame, Viewport};
use super::state::GraphView;
use super::types::{Entity, Point, Relationship, RelationshipDraft, RelationshipKind};

const MOST_CONNECTED_SHOWN: usize = 5;

struct Canvas {
	element: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	viewport: Viewport,
}

impl Canvas {
	/// Re-read the CSS size and size the backing store to match the display.
	fn fit(&mut self) {
		let dpr = web_sys::window()
			.map(|w| w.device_pixel_ratio())
			.unwrap_or(1.0);
		self.viewport = Viewport {
			width: self.element.client_width() as f64,
			height: self.element.client_height() as f64,
			device_pixel_ratio: dpr,
		};
		let (w, h) = self.viewport.backing_size();
		self.element.set_width(w);
		self.element.set_height(h);
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

type JsCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Detach the resize listener and drop both browser callbacks.
///
/// `on_cleanup` only takes `Send` closures, so this runs from the frame
/// callback on the first frame after the stop flag is set.
fn teardown(resize_cb: &JsCallback, animate: &JsCallback) {
	if let (Some(cb), Some(window)) = (resize_cb.borrow_mut().take(), web_sys::window()) {
		let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
	}
	drop(animate.borrow_mut().take());
	debug!("relationship graph callbacks released");
}

fn pointer(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> Point {
	let rect = canvas.get_bounding_client_rect();
	Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Interactive relationship graph for a story or for one focal character.
///
/// `relationships` is only ever appended to, through the add form.
#[component]
pub fn RelationshipGraph(
	#[prop(into)] entities: Signal<Vec<Entity>>,
	relationships: RwSignal<Vec<Relationship>>,
	#[prop(optional, into)] focal: Option<String>,
	#[prop(default = LayoutMode::Grid)] layout: LayoutMode,
	#[prop(default = GraphConfig::story())] config: GraphConfig,
	#[prop(default = 384.0)] height: f64,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let view = Rc::new(RefCell::new(GraphView::new(
		entities.get_untracked(),
		relationships.get_untracked(),
		focal.clone(),
		layout,
		config.clone(),
	)));
	let canvas: Rc<RefCell<Option<Canvas>>> = Rc::new(RefCell::new(None));
	let dirty = Rc::new(Cell::new(true));
	let stopped = Arc::new(AtomicBool::new(false));
	let animate: JsCallback = Rc::new(RefCell::new(None));
	let resize_cb: JsCallback = Rc::new(RefCell::new(None));
	let layout_mode = RwSignal::new(layout);

	let stop = stopped.clone();
	on_cleanup(move || stop.store(true, Ordering::Relaxed));

	let (view_input, dirty_input) = (view.clone(), dirty.clone());
	Effect::new(move |_| {
		let (ents, rels) = (entities.get(), relationships.get());
		view_input.borrow_mut().set_input(ents, rels);
		dirty_input.set(true);
	});

	let (view_layout, dirty_layout) = (view.clone(), dirty.clone());
	Effect::new(move |_| {
		let mode = layout_mode.get();
		let mut v = view_layout.borrow_mut();
		if v.layout() != mode {
			v.set_layout(mode);
			dirty_layout.set(true);
		}
	});

	let (canvas_init, view_init, dirty_init, stopped_init) =
		(canvas.clone(), view.clone(), dirty.clone(), stopped.clone());
	Effect::new(move |_| {
		let Some(element) = canvas_ref.get() else {
			return;
		};
		if canvas_init.borrow().is_some() {
			return;
		}
		let element: HtmlCanvasElement = element.into();
		let Some(ctx) = context_2d(&element) else {
			error!("2d canvas context unavailable; relationship graph disabled");
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};
		let mut surface = Canvas {
			element,
			ctx,
			viewport: Viewport {
				width: 0.0,
				height: 0.0,
				device_pixel_ratio: 1.0,
			},
		};
		surface.fit();
		debug!(
			"relationship graph canvas {}x{} @{}x",
			surface.viewport.width, surface.viewport.height, surface.viewport.device_pixel_ratio
		);
		*canvas_init.borrow_mut() = Some(surface);

		let (canvas_resize, dirty_resize, stopped_resize) =
			(canvas_init.clone(), dirty_init.clone(), stopped_init.clone());
		*resize_cb.borrow_mut() = Some(Closure::new(move || {
			if stopped_resize.load(Ordering::Relaxed) {
				return;
			}
			if let Some(ref mut c) = *canvas_resize.borrow_mut() {
				c.fit();
				dirty_resize.set(true);
			}
		}));
		if let Some(ref cb) = *resize_cb.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (canvas_anim, view_anim, dirty_anim, stopped_anim, animate_inner, resize_inner) = (
			canvas_init.clone(),
			view_init.clone(),
			dirty_init.clone(),
			stopped_init.clone(),
			animate.clone(),
			resize_cb.clone(),
		);
		*animate.borrow_mut() = Some(Closure::new(move || {
			if stopped_anim.load(Ordering::Relaxed) {
				teardown(&resize_inner, &animate_inner);
				return;
			}
			if dirty_anim.replace(false) {
				if let Some(ref c) = *canvas_anim.borrow() {
					let v = view_anim.borrow();
					render::render(
						&c.ctx,
						&Frame {
							model: v.model(),
							transform: v.transform,
							hovered: v.hovered(),
							focal: v.focal(),
							viewport: c.viewport,
							config: &v.config,
						},
					);
				}
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let (view_md, dirty_md) = (view.clone(), dirty.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some(element) = canvas_ref.get() else {
			return;
		};
		view_md.borrow_mut().pointer_down(pointer(&element, &ev));
		dirty_md.set(true);
	};

	let (view_mm, dirty_mm) = (view.clone(), dirty.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some(element) = canvas_ref.get() else {
			return;
		};
		if view_mm.borrow_mut().pointer_move(pointer(&element, &ev)) {
			dirty_mm.set(true);
		}
	};

	let view_mu = view.clone();
	let on_mouseup = move |_: MouseEvent| view_mu.borrow_mut().pointer_up();

	let view_ml = view.clone();
	let on_mouseleave = move |_: MouseEvent| view_ml.borrow_mut().pointer_leave();

	let (view_wh, dirty_wh) = (view.clone(), dirty.clone());
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		view_wh.borrow_mut().wheel(ev.delta_y());
		dirty_wh.set(true);
	};

	let (view_reset, dirty_reset) = (view.clone(), dirty.clone());
	let reset_view = move |_: MouseEvent| {
		view_reset.borrow_mut().reset_view();
		dirty_reset.set(true);
	};
	let (view_zi, dirty_zi) = (view.clone(), dirty.clone());
	let zoom_in = move |_: MouseEvent| {
		view_zi.borrow_mut().zoom_in();
		dirty_zi.set(true);
	};
	let (view_zo, dirty_zo) = (view.clone(), dirty.clone());
	let zoom_out = move |_: MouseEvent| {
		view_zo.borrow_mut().zoom_out();
		dirty_zo.set(true);
	};

	let draft_from = RwSignal::new(focal.clone().unwrap_or_default());
	let draft_to = RwSignal::new(String::new());
	let draft_kind = RwSignal::new(RelationshipKind::Friendship.name().to_string());
	let draft_strength = RwSignal::new(3_i32);

	let (view_add, dirty_add) = (view.clone(), dirty.clone());
	let add_relationship = move |_: MouseEvent| {
		let draft = RelationshipDraft {
			strength: draft_strength.get_untracked(),
			..RelationshipDraft::between(
				draft_from.get_untracked(),
				draft_to.get_untracked(),
				RelationshipKind::parse(&draft_kind.get_untracked()),
			)
		};
		let id = format!("{}", js_sys::Date::now() as u64);
		let updated = {
			let mut v = view_add.borrow_mut();
			match v.add_relationship(draft, id) {
				Ok(_) => Some(v.relationships().to_vec()),
				Err(e) => {
					debug!("relationship not added: {e}");
					None
				}
			}
		};
		if let Some(list) = updated {
			relationships.set(list);
			draft_to.set(String::new());
			dirty_add.set(true);
		}
	};

	let entity_options = move || {
		entities
			.get()
			.into_iter()
			.map(|e| view! { <option value=e.id.clone()>{e.name.clone()}</option> })
			.collect_view()
	};

	let focal_rows = focal.clone().map(|focal_id| {
		view! {
			<ul class="focal-relationships">
				{move || {
					let (ents, rels) = (entities.get(), relationships.get());
					focal_relationships(&rels, &focal_id)
						.into_iter()
						.map(|row| {
							let other = ents
								.iter()
								.find(|e| e.id == row.other_id)
								.map(|e| e.name.clone())
								.unwrap_or_else(|| row.other_id.to_string());
							let arrow = if row.outgoing { "→" } else { "←" };
							let dots = "●".repeat(strength_dots(row.relationship.strength));
							let kind = row.relationship.kind.name().to_string();
							let description = row.relationship.description.clone();
							view! {
								<li>
									<span class="arrow">{arrow}</span>
									" "
									<span class="name">{other}</span>
									" "
									<span class="badge">{kind}</span>
									" "
									<span class="strength">{dots}</span>
									" "
									<span class="description">{description}</span>
								</li>
							}
						})
						.collect_view()
				}}
			</ul>
		}
	});

	view! {
		<div class="relationship-graph">
			<div class="graph-toolbar">
				<button on:click=reset_view>"Reset View"</button>
				<button on:click=zoom_in>"+"</button>
				<button on:click=zoom_out>"−"</button>
				<select
					prop:value=move || layout_mode.get().name()
					on:change=move |ev| {
						if let Some(mode) = LayoutMode::parse(&event_target_value(&ev)) {
							layout_mode.set(mode);
						}
					}
				>
					{LayoutMode::ALL
						.into_iter()
						.map(|mode| view! { <option value=mode.name()>{mode.name()}</option> })
						.collect_view()}
				</select>
			</div>

			<canvas
				node_ref=canvas_ref
				class="relationship-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style=format!("display: block; width: 100%; height: {height}px; cursor: move;")
			/>

			<div class="add-relationship">
				<select
					prop:value=move || draft_from.get()
					on:change=move |ev| draft_from.set(event_target_value(&ev))
				>
					<option value="">"From"</option>
					{entity_options}
				</select>
				<select
					prop:value=move || draft_to.get()
					on:change=move |ev| draft_to.set(event_target_value(&ev))
				>
					<option value="">"To"</option>
					{entity_options}
				</select>
				<select
					prop:value=move || draft_kind.get()
					on:change=move |ev| draft_kind.set(event_target_value(&ev))
				>
					{RelationshipKind::ALL
						.into_iter()
						.map(|kind| {
							let name = kind.name().to_string();
							view! { <option value=name.clone()>{name.clone()}</option> }
						})
						.collect_view()}
				</select>
				<input
					type="number"
					min="1"
					max="5"
					prop:value=move || draft_strength.get().to_string()
					on:input=move |ev| {
						draft_strength.set(event_target_value(&ev).parse().unwrap_or(1))
					}
				/>
				<button on:click=add_relationship>"Add Relationship"</button>
			</div>

			<div class="graph-analysis">
				{move || {
					let stats = network_stats(entities.get().len(), relationships.get().len());
					view! {
						<dl class="network-stats">
							<dt>"Total Characters"</dt>
							<dd>{stats.entities}</dd>
							<dt>"Total Relationships"</dt>
							<dd>{stats.relationships}</dd>
							<dt>"Network Density"</dt>
							<dd>{format!("{}%", stats.density_percent)}</dd>
						</dl>
					}
				}}
				<ol class="most-connected">
					{move || {
						let (ents, rels) = (entities.get(), relationships.get());
						if ents.is_empty() {
							return view! { <li class="empty">"No characters yet"</li> }.into_any();
						}
						most_connected(&ents, &rels, MOST_CONNECTED_SHOWN)
							.into_iter()
							.map(|(entity, degree)| {
								let line = format!("{} ({degree} connections)", entity.name);
								view! { <li>{line}</li> }
							})
							.collect_view()
							.into_any()
					}}
				</ol>
				{focal_rows}
			</div>
		</div>
	}
}
