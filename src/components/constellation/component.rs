//! Leptos component wrapping the constellation canvas.
//!
//! The component creates an HTML canvas element and wires up mouse, wheel and
//! touch handlers for star dragging, panning, and zooming. Two independent
//! timers drive the session: a `requestAnimationFrame` loop for physics and
//! drawing, and a coarse interval for the sparkle effect. Both, plus the window
//! resize listener, are owned by a [`FrameLoop`] that releases them when the
//! component is unmounted.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, Touch, TouchEvent, WheelEvent, Window,
};

use super::config::ConstellationConfig;
use super::state::ConstellationState;
use super::types::GraphData;

type SharedState = Rc<RefCell<Option<ConstellationState>>>;

/// Frame times above this are treated as a stall (tab in background) and clamped.
const MAX_FRAME_DT: f64 = 0.1;

/// Scheduled tasks and listeners of one mounted constellation. Dropping it
/// cancels the animation frame, clears the sparkle interval, removes the resize
/// listener and stops the session.
struct FrameLoop {
	window: Window,
	state: SharedState,
	frame_id: Rc<Cell<Option<i32>>>,
	animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
	sparkle_id: Option<i32>,
	_sparkle: Closure<dyn FnMut()>,
	resize: Option<Closure<dyn FnMut()>>,
}

impl FrameLoop {
	fn start(
		window: Window,
		canvas: HtmlCanvasElement,
		mut ctx: CanvasRenderingContext2d,
		state: SharedState,
		fullscreen: bool,
	) -> Self {
		let frame_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
		let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));

		let (state_anim, animate_inner, frame_id_inner) =
			(state.clone(), animate.clone(), frame_id.clone());
		let mut last: Option<f64> = None;
		*animate.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			let dt = last.map_or(0.016, |prev| {
				((timestamp - prev) / 1000.0).clamp(0.0, MAX_FRAME_DT)
			});
			last = Some(timestamp);

			let running = match *state_anim.borrow_mut() {
				Some(ref mut s) if s.is_running() => {
					s.frame(dt);
					s.render(&mut ctx);
					true
				}
				_ => false,
			};
			if !running {
				frame_id_inner.set(None);
				return;
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				frame_id_inner.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				Ok(id) => frame_id.set(Some(id)),
				Err(e) => warn!("constellation: requestAnimationFrame failed: {:?}", e),
			}
		}

		let state_sparkle = state.clone();
		let sparkle = Closure::<dyn FnMut()>::new(move || {
			if let Some(ref mut s) = *state_sparkle.borrow_mut() {
				s.sparkle();
			}
		});
		let interval_ms = state
			.borrow()
			.as_ref()
			.map_or(2000, |s| s.config().sparkle.interval_ms);
		let sparkle_id = match window.set_interval_with_callback_and_timeout_and_arguments_0(
			sparkle.as_ref().unchecked_ref(),
			i32::try_from(interval_ms).unwrap_or(i32::MAX),
		) {
			Ok(id) => Some(id),
			Err(e) => {
				warn!("constellation: failed to schedule sparkle timer: {:?}", e);
				None
			}
		};

		let resize = fullscreen.then(|| {
			let state_resize = state.clone();
			let cb = Closure::<dyn FnMut()>::new(move || {
				let Some((w, h)) = web_sys::window().as_ref().and_then(viewport_size) else {
					return;
				};
				canvas.set_width(w as u32);
				canvas.set_height(h as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(w, h);
				}
			});
			if let Err(e) =
				window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
			{
				warn!("constellation: failed to add resize listener: {:?}", e);
			}
			cb
		});

		Self {
			window,
			state,
			frame_id,
			animate,
			sparkle_id,
			_sparkle: sparkle,
			resize,
		}
	}
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		if let Some(id) = self.frame_id.take() {
			let _ = self.window.cancel_animation_frame(id);
		}
		// Breaks the closure's reference to itself.
		self.animate.borrow_mut().take();
		if let Some(id) = self.sparkle_id.take() {
			self.window.clear_interval_with_handle(id);
		}
		if let Some(cb) = self.resize.take() {
			let _ = self
				.window
				.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		if let Some(ref mut s) = *self.state.borrow_mut() {
			s.stop();
		}
	}
}

fn viewport_size(window: &Window) -> Option<(f64, f64)> {
	let w = window.inner_width().ok()?.as_f64()?;
	let h = window.inner_height().ok()?.as_f64()?;
	Some((w, h))
}

/// Pointer position relative to the canvas' top-left corner.
fn local_point(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	client_x: i32,
	client_y: i32,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((client_x as f64 - rect.left(), client_y as f64 - rect.top()))
}

fn set_cursor(canvas_ref: NodeRef<leptos::html::Canvas>, state: &ConstellationState) {
	let Some(canvas) = canvas_ref.get() else {
		return;
	};
	let canvas: HtmlCanvasElement = canvas.into();
	if let Err(e) = HtmlElement::style(&canvas).set_property("cursor", state.cursor()) {
		warn!("constellation: failed to set cursor: {:?}", e);
	}
}

fn touch_distance(a: &Touch, b: &Touch) -> f64 {
	let dx = (a.client_x() - b.client_x()) as f64;
	let dy = (a.client_y() - b.client_y()) as f64;
	(dx * dx + dy * dy).sqrt()
}

/// Renders an interactive knowledge-graph constellation on a canvas element.
///
/// Pass graph data via the reactive `data` signal; every change re-derives the
/// working set while keeping the current pan and zoom. The component sizes
/// itself to its parent container by default; set `fullscreen = true` to fill
/// the viewport and resize automatically with the window. Explicit
/// `width`/`height` override automatic sizing.
#[component]
pub fn ConstellationCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional)] config: ConstellationConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let frame_loop = StoredValue::new_local(None::<FrameLoop>);

	let state_init = state.clone();
	Effect::new(move |_| {
		let graph = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};

		if let Some(ref mut s) = *state_init.borrow_mut() {
			s.update(graph);
			return;
		}

		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("constellation: no window, not starting");
			return;
		};

		let (w, h) = if fullscreen {
			viewport_size(&window).unwrap_or((800.0, 600.0))
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| {
					parent.as_ref().map(|p| p.client_width() as f64).unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					parent.as_ref().map(|p| p.client_height() as f64).unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = match canvas.get_context("2d") {
			Ok(Some(obj)) => obj.dyn_into::<CanvasRenderingContext2d>().ok(),
			_ => None,
		};
		let Some(ctx) = ctx else {
			warn!("constellation: canvas 2d context unavailable");
			return;
		};

		*state_init.borrow_mut() = Some(ConstellationState::start(config, graph, w, h));
		let handle = FrameLoop::start(window, canvas, ctx, state_init.clone(), fullscreen);
		frame_loop.set_value(Some(handle));
	});

	on_cleanup(move || {
		let _ = frame_loop.try_update_value(|slot| slot.take());
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		// Primary button only.
		if ev.button() != 0 {
			return;
		}
		let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
			set_cursor(canvas_ref, s);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
			set_cursor(canvas_ref, s);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer_up();
			set_cursor(canvas_ref, s);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
			set_cursor(canvas_ref, s);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(x, y, ev.delta_y());
		}
	};

	let state_ts = state.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		let touches = ev.touches();
		let Some(ref mut s) = *state_ts.borrow_mut() else {
			return;
		};
		match (touches.get(0), touches.get(1)) {
			(Some(a), Some(b)) => s.pinch_start(touch_distance(&a, &b)),
			(Some(a), None) => {
				if let Some((x, y)) = local_point(canvas_ref, a.client_x(), a.client_y()) {
					s.pointer_down(x, y);
				}
			}
			_ => {}
		}
	};

	let state_tm = state.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let touches = ev.touches();
		let Some(ref mut s) = *state_tm.borrow_mut() else {
			return;
		};
		match (touches.get(0), touches.get(1)) {
			(Some(a), Some(b)) => {
				let mid_x = (a.client_x() + b.client_x()) / 2;
				let mid_y = (a.client_y() + b.client_y()) / 2;
				if let Some((cx, cy)) = local_point(canvas_ref, mid_x, mid_y) {
					s.pinch_move(cx, cy, touch_distance(&a, &b));
				}
			}
			(Some(a), None) => {
				if let Some((x, y)) = local_point(canvas_ref, a.client_x(), a.client_y()) {
					s.pointer_move(x, y);
				}
			}
			_ => {}
		}
	};

	let state_te = state.clone();
	let on_touchend = move |ev: TouchEvent| {
		let remaining = ev.touches().length();
		if let Some(ref mut s) = *state_te.borrow_mut() {
			if remaining < 2 {
				s.pinch_end();
			}
			if remaining == 0 {
				s.pointer_up();
			}
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="constellation-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend.clone()
			on:touchcancel=on_touchend
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}
