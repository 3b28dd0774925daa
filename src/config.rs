//! View configuration and display-mode detection.

use log::debug;
use regex::Regex;

use crate::engine::{DisplayMode, ExportSettings};

const COMPACT_MAX_WIDTH: f64 = 768.0;
const MOBILE_AGENTS: &str = "Android|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini";

/// Everything the view needs that is not part of the loaded graph.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewConfig {
	pub display_mode: DisplayMode,
	pub data_url: String,
	/// Minimum and maximum zoom.
	pub zoom: (f64, f64),
	pub wheel_sensitivity: f64,
	/// Padding used when framing search matches.
	pub search_padding: f64,
	pub export: ExportSettings,
	/// Browser user agent, kept for re-detecting the mode on resize.
	pub user_agent: String,
}

impl ViewConfig {
	pub fn for_mode(display_mode: DisplayMode) -> Self {
		Self {
			display_mode,
			data_url: "srv/data.json".into(),
			zoom: (0.05, 4.0),
			wheel_sensitivity: wheel_sensitivity(display_mode),
			search_padding: 50.0,
			export: ExportSettings::default(),
			user_agent: String::new(),
		}
	}

	/// Switches mode-dependent settings; returns whether the mode changed.
	pub fn set_display_mode(&mut self, mode: DisplayMode) -> bool {
		if mode == self.display_mode {
			return false;
		}
		debug!("display mode: {:?} -> {mode:?}", self.display_mode);
		self.display_mode = mode;
		self.wheel_sensitivity = wheel_sensitivity(mode);
		true
	}

	/// Picks the display mode from the browser window.
	pub fn detect() -> Self {
		let (width, user_agent) = web_sys::window()
			.map(|win| {
				(
					window_width(&win),
					win.navigator().user_agent().unwrap_or_default(),
				)
			})
			.unwrap_or((f64::MAX, String::new()));
		let mode = display_mode_for(width, &user_agent);
		debug!("display mode: {mode:?}");
		Self {
			user_agent,
			..Self::for_mode(mode)
		}
	}

	/// Zoom multiplier for one wheel notch; `delta_y > 0` zooms out.
	pub fn wheel_factor(&self, delta_y: f64) -> f64 {
		let step = 1.0 + self.wheel_sensitivity;
		if delta_y > 0.0 { 1.0 / step } else { step }
	}
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self::for_mode(DisplayMode::default())
	}
}

fn wheel_sensitivity(mode: DisplayMode) -> f64 {
	match mode {
		DisplayMode::Compact => 0.5,
		DisplayMode::Full => 0.2,
	}
}

pub fn window_width(win: &web_sys::Window) -> f64 {
	win.inner_width()
		.ok()
		.and_then(|w| w.as_f64())
		.unwrap_or(f64::MAX)
}

/// Compact on narrow windows or mobile user agents.
pub fn display_mode_for(width: f64, user_agent: &str) -> DisplayMode {
	let mobile = Regex::new(MOBILE_AGENTS).is_ok_and(|rx| rx.is_match(user_agent));
	if width <= COMPACT_MAX_WIDTH || mobile {
		DisplayMode::Compact
	} else {
		DisplayMode::Full
	}
}
