//! View transform and fit-to-view framing.

use super::layout::Point;

/// Axis-aligned box in model space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl Bounds {
	/// Box around a circle of diameter `d` centred on `p`.
	pub fn around(p: Point, d: f64) -> Self {
		let r = d / 2.0;
		Self {
			min_x: p.x - r,
			min_y: p.y - r,
			max_x: p.x + r,
			max_y: p.y + r,
		}
	}

	pub fn union(self, other: Self) -> Self {
		Self {
			min_x: self.min_x.min(other.min_x),
			min_y: self.min_y.min(other.min_y),
			max_x: self.max_x.max(other.max_x),
			max_y: self.max_y.max(other.max_y),
		}
	}

	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	pub fn center(&self) -> Point {
		Point::new(
			(self.min_x + self.max_x) / 2.0,
			(self.min_y + self.max_y) / 2.0,
		)
	}
}

/// Screen = model * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl Viewport {
	/// Frames `bounds` inside a `width` x `height` screen with `padding`
	/// pixels on every side, zoom clamped to `zoom`.
	pub fn fit(
		bounds: Bounds,
		width: f64,
		height: f64,
		padding: f64,
		zoom: (f64, f64),
	) -> Self {
		let avail_w = (width - 2.0 * padding).max(1.0);
		let avail_h = (height - 2.0 * padding).max(1.0);
		let k = if bounds.width() <= f64::EPSILON && bounds.height() <= f64::EPSILON {
			1.0
		} else {
			(avail_w / bounds.width().max(f64::EPSILON))
				.min(avail_h / bounds.height().max(f64::EPSILON))
		}
		.clamp(zoom.0, zoom.1);
		let c = bounds.center();
		Self {
			x: width / 2.0 - c.x * k,
			y: height / 2.0 - c.y * k,
			k,
		}
	}

	pub fn screen_to_model(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn model_to_screen(&self, p: Point) -> (f64, f64) {
		(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	/// Zooms by `factor` keeping the screen point (sx, sy) fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, zoom: (f64, f64)) {
		let new_k = (self.k * factor).clamp(zoom.0, zoom.1);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fit_centres_bounds() {
		let b = Bounds {
			min_x: 0.0,
			min_y: 0.0,
			max_x: 100.0,
			max_y: 50.0,
		};
		let v = Viewport::fit(b, 300.0, 300.0, 50.0, (0.05, 4.0));
		assert_eq!(v.k, 2.0);
		assert_eq!(v.model_to_screen(b.center()), (150.0, 150.0));
	}

	#[test]
	fn fit_clamps_zoom() {
		let b = Bounds::around(Point::new(10.0, 10.0), 1.0);
		let v = Viewport::fit(b, 800.0, 600.0, 0.0, (0.05, 4.0));
		assert_eq!(v.k, 4.0);
	}

	#[test]
	fn screen_round_trip() {
		let v = Viewport {
			x: 12.0,
			y: -4.0,
			k: 1.5,
		};
		let p = v.screen_to_model(42.0, 17.0);
		let (sx, sy) = v.model_to_screen(p);
		assert!((sx - 42.0).abs() < 1e-9 && (sy - 17.0).abs() < 1e-9);
	}

	#[test]
	fn zoom_keeps_anchor() {
		let mut v = Viewport::default();
		let before = v.screen_to_model(100.0, 100.0);
		v.zoom_at(100.0, 100.0, 1.1, (0.05, 4.0));
		let after = v.screen_to_model(100.0, 100.0);
		assert!((before.x - after.x).abs() < 1e-9 && (before.y - after.y).abs() < 1e-9);
	}
}
