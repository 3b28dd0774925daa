use std::collections::HashMap;
use std::f64::consts::PI;

use log::{info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement};

use super::state::GraphSession;
use crate::engine::layout::Point;
use crate::engine::style::{LABEL_COLOR, LABEL_FONT};
use crate::engine::{ExportPlan, GraphScene, Viewport};

const SHADOW_COLOR: &str = "rgba(0, 0, 0, 0.4)";
const SHADOW_BLUR: f64 = 8.0;

pub fn render(session: &GraphSession, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(&session.config.export.background);
	ctx.fill_rect(0.0, 0.0, session.width, session.height);
	draw_scene(&session.scene, &session.viewport, ctx);
}

fn draw_scene(scene: &GraphScene, viewport: &Viewport, ctx: &CanvasRenderingContext2d) {
	ctx.save();
	let _ = ctx.translate(viewport.x, viewport.y);
	let _ = ctx.scale(viewport.k, viewport.k);
	draw_edges(scene, ctx);
	draw_nodes(scene, ctx);
	ctx.restore();
}

fn draw_edges(scene: &GraphScene, ctx: &CanvasRenderingContext2d) {
	let radii: HashMap<&str, (Point, f64)> = scene
		.node_styles()
		.map(|(node, p, style)| (node.id.as_str(), (p, style.diameter / 2.0)))
		.collect();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	for (edge, style) in scene.edge_styles() {
		if style.hidden {
			continue;
		}
		let (Some(&(from, r1)), Some(&(to, r2))) = (
			radii.get(edge.source.as_str()),
			radii.get(edge.target.as_str()),
		) else {
			continue;
		};
		let (dx, dy) = (to.x - from.x, to.y - from.y);
		let dist = dx.hypot(dy);
		if dist <= r1 + r2 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let arrow = style.arrow_size.min(dist - r1 - r2);

		ctx.set_global_alpha(style.opacity);
		ctx.set_stroke_style_str(style.color.as_str());
		ctx.set_line_width(style.width);
		ctx.begin_path();
		ctx.move_to(from.x + ux * r1, from.y + uy * r1);
		ctx.line_to(
			to.x - ux * (r2 + arrow),
			to.y - uy * (r2 + arrow),
		);
		ctx.stroke();

		let (tip_x, tip_y) = (to.x - ux * r2, to.y - uy * r2);
		let (back_x, back_y) = (tip_x - ux * arrow, tip_y - uy * arrow);
		let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);
		ctx.set_fill_style_str(style.color.as_str());
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(scene: &GraphScene, ctx: &CanvasRenderingContext2d) {
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for (_, p, style) in scene.node_styles() {
		if style.hidden {
			continue;
		}
		let radius = style.diameter / 2.0;
		ctx.set_global_alpha(style.opacity);

		if style.highlighted {
			ctx.set_shadow_color(SHADOW_COLOR);
			ctx.set_shadow_blur(SHADOW_BLUR);
			ctx.set_shadow_offset_y(1.0);
		}
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(style.color.as_str());
		ctx.fill();
		ctx.set_shadow_color("transparent");
		ctx.set_shadow_blur(0.0);
		ctx.set_shadow_offset_y(0.0);

		ctx.set_stroke_style_str(style.border_color.as_str());
		ctx.set_line_width(style.border_width);
		ctx.stroke();

		if style.label.is_empty() {
			continue;
		}
		ctx.set_fill_style_str(LABEL_COLOR);
		ctx.set_font(&format!("{}px {LABEL_FONT}", style.font_size));
		let lines: Vec<&str> = style.label.lines().collect();
		let line_height = style.font_size * 1.2;
		let top = p.y - line_height * (lines.len() as f64 - 1.0) / 2.0;
		for (i, line) in lines.iter().enumerate() {
			let _ = ctx.fill_text(line, p.x, top + line_height * i as f64);
		}
	}
	ctx.set_global_alpha(1.0);
}

/// Draws the whole visible scene on an off-screen canvas and offers it as a
/// PNG download. Returns a notice for the user when the image had to be
/// downscaled.
pub fn export_png(session: &GraphSession) -> Result<Option<String>, JsValue> {
	let settings = &session.config.export;
	let Some(plan) = ExportPlan::for_scene(&session.scene, settings) else {
		warn!("nothing to export");
		return Ok(None);
	};
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;

	let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
	canvas.set_width(plan.width);
	canvas.set_height(plan.height);
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")?
		.ok_or_else(|| JsValue::from_str("2d context unavailable"))?
		.dyn_into()?;
	ctx.set_fill_style_str(&settings.background);
	ctx.fill_rect(0.0, 0.0, plan.width as f64, plan.height as f64);
	draw_scene(&session.scene, &plan.viewport, &ctx);

	let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	anchor.set_href(&canvas.to_data_url_with_type("image/png")?);
	anchor.set_download(&settings.filename);
	anchor.click();
	info!(
		"exported {}x{} image as {}",
		plan.width, plan.height, settings.filename
	);
	Ok(plan.is_downscaled(settings).then(|| {
		format!(
			"Map too large for a {}x export; saved at {:.2}x instead",
			settings.scale, plan.scale
		)
	}))
}
