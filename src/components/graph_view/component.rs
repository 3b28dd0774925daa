use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent};

use super::render;
use crate::config::window_width;
use super::state::GraphSession;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.unwrap_or((800.0, 600.0))
}

fn local_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Canvas-local positions of the active touches.
fn touch_points(canvas: &HtmlCanvasElement, ev: &TouchEvent) -> Vec<(f64, f64)> {
	let rect = canvas.get_bounding_client_rect();
	let touches = ev.touches();
	(0..touches.length())
		.filter_map(|i| touches.get(i))
		.map(|t| {
			(
				t.client_x() as f64 - rect.left(),
				t.client_y() as f64 - rect.top(),
			)
		})
		.collect()
}

/// Canvas that draws the session's scene, steps its layouts every frame and
/// turns mouse input into drag, pan and zoom.
#[component]
pub fn GraphCanvas(session: Rc<RefCell<GraphSession>>) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));
	let (session_init, animate_init, resize_cb_init) =
		(session.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		session_init.borrow_mut().resize(w, h);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas 2d context unavailable");
			return;
		};

		let (session_resize, canvas_resize) = (session_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			let mut s = session_resize.borrow_mut();
			if let Some(win) = web_sys::window() {
				s.update_display_mode(window_width(&win));
			}
			s.resize(nw, nh);
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (session_anim, animate_inner) = (session_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let mut s = session_anim.borrow_mut();
				s.tick(js_sys::Date::now());
				render::render(&s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let session_md = session.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		session_md.borrow_mut().pointer_down(x, y);
	};

	let session_mm = session.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		session_mm.borrow_mut().pointer_move(x, y);
	};

	let session_mu = session.clone();
	let on_mouseup = move |_: MouseEvent| session_mu.borrow_mut().pointer_up();

	let session_ml = session.clone();
	let on_mouseleave = move |_: MouseEvent| session_ml.borrow_mut().pointer_up();

	let session_ts = session.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let mut s = session_ts.borrow_mut();
		match touch_points(&canvas, &ev)[..] {
			[(x, y)] => s.pointer_down(x, y),
			[a, b, ..] => s.pinch(a, b),
			[] => {}
		}
	};

	let session_tm = session.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let mut s = session_tm.borrow_mut();
		match touch_points(&canvas, &ev)[..] {
			[(x, y)] => s.pointer_move(x, y),
			[a, b, ..] => s.pinch(a, b),
			[] => {}
		}
	};

	let session_te = session.clone();
	let on_touchend = move |_: TouchEvent| session_te.borrow_mut().pointer_up();

	let session_wh = session;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		session_wh.borrow_mut().wheel(x, y, ev.delta_y());
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
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
