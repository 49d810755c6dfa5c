use serde::{Deserialize, Serialize};

use super::types::Point;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
	#[default]
	Grid,
	Circle,
	/// Circle with random radii, relaxed by a short force simulation.
	/// Positions differ between builds.
	Organic,
}

impl LayoutMode {
	pub const ALL: [LayoutMode; 3] = [Self::Grid, Self::Circle, Self::Organic];

	pub fn name(self) -> &'static str {
		match self {
			Self::Grid => "grid",
			Self::Circle => "circle",
			Self::Organic => "organic",
		}
	}

	pub fn parse(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|mode| mode.name() == name)
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
	pub origin: Point,
	pub columns: usize,
	pub spacing: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircleLayout {
	pub center: Point,
	pub radius: f64,
	/// Organic mode draws each radius from `[jitter_min, jitter_min + jitter_span)`.
	pub jitter_min: f64,
	pub jitter_span: f64,
	/// Force simulation ticks applied after organic jitter. 0 disables relaxation.
	pub relax_ticks: u32,
}

/// Tunables for layout, sizing, zoom and text of the relationship graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	pub grid: GridLayout,
	pub circle: CircleLayout,
	pub radius_base: f64,
	pub radius_per_connection: f64,
	pub zoom_min: f64,
	pub zoom_max: f64,
	pub wheel_zoom_in: f64,
	pub wheel_zoom_out: f64,
	pub button_zoom_in: f64,
	pub button_zoom_out: f64,
	pub label_font: String,
	pub role_font: String,
	pub edge_font: String,
	pub role_label_offset: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self::story()
	}
}

impl GraphConfig {
	/// Whole-story view: larger nodes on a three column grid.
	pub fn story() -> Self {
		Self {
			grid: GridLayout {
				origin: Point::new(200.0, 200.0),
				columns: 3,
				spacing: 150.0,
			},
			circle: CircleLayout {
				center: Point::new(200.0, 200.0),
				radius: 120.0,
				jitter_min: 80.0,
				jitter_span: 40.0,
				relax_ticks: 60,
			},
			radius_base: 25.0,
			radius_per_connection: 3.0,
			zoom_min: 0.5,
			zoom_max: 3.0,
			wheel_zoom_in: 1.1,
			wheel_zoom_out: 0.9,
			button_zoom_in: 1.2,
			button_zoom_out: 0.8,
			label_font: "bold 14px Inter, sans-serif".into(),
			role_font: "10px Inter, sans-serif".into(),
			edge_font: "12px Inter, sans-serif".into(),
			role_label_offset: 15.0,
		}
	}

	/// View scoped to one character: smaller nodes on a four column grid.
	pub fn character() -> Self {
		Self {
			grid: GridLayout {
				origin: Point::new(300.0, 200.0),
				columns: 4,
				spacing: 120.0,
			},
			radius_base: 20.0,
			radius_per_connection: 2.0,
			label_font: "bold 12px Inter, sans-serif".into(),
			role_font: "9px Inter, sans-serif".into(),
			role_label_offset: 12.0,
			..Self::story()
		}
	}

	pub fn node_radius(&self, degree: usize) -> f64 {
		self.radius_base + degree as f64 * self.radius_per_connection
	}

	/// A reversed range (`zoom_min > zoom_max`) resolves to `zoom_max`.
	pub fn clamp_zoom(&self, zoom: f64) -> f64 {
		zoom.max(self.zoom_min).min(self.zoom_max)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn presets_size_nodes_by_degree() {
		assert_eq!(GraphConfig::story().node_radius(2), 31.0);
		assert_eq!(GraphConfig::character().node_radius(2), 24.0);
	}

	#[test]
	fn partial_config_fills_in_defaults() {
		let cfg: GraphConfig = serde_json::from_str(r#"{"zoom_max": 5.0}"#).unwrap();
		assert_eq!(cfg.zoom_max, 5.0);
		assert_eq!(cfg.zoom_min, 0.5);
		assert_eq!(cfg.grid.columns, 3);
	}

	#[test]
	fn reversed_zoom_range_does_not_panic() {
		let cfg: GraphConfig = serde_json::from_str(r#"{"zoom_min": 4.0}"#).unwrap();
		assert_eq!(cfg.clamp_zoom(1.0), 3.0);
		assert_eq!(cfg.clamp_zoom(10.0), 3.0);
		assert_eq!(GraphConfig::story().clamp_zoom(0.1), 0.5);
	}

	#[test]
	fn layout_mode_names_round_trip() {
		for mode in LayoutMode::ALL {
			assert_eq!(LayoutMode::parse(mode.name()), Some(mode));
		}
		assert_eq!(LayoutMode::parse("spiral"), None);
	}
}
