use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::config::GraphConfig;
use super::model::GraphModel;
use super::palette::{FOCAL_RING_COLOR, HOVER_OUTLINE_COLOR, LABEL_COLOR, ROLE_LABEL_COLOR};
use super::state::ViewTransform;

const FOCAL_RING_GAP: f64 = 5.0;
const FOCAL_RING_WIDTH: f64 = 3.0;
const HOVER_OUTLINE_WIDTH: f64 = 3.0;
const EDGE_LABEL_LIFT: f64 = 5.0;
const NAME_BASELINE: f64 = 5.0;

/// Immediate-mode drawing primitives the renderer needs.
pub trait Surface {
	fn save(&self);
	fn restore(&self);
	fn set_transform(&self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64);
	fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64);
	fn translate(&self, x: f64, y: f64);
	fn scale(&self, x: f64, y: f64);
	fn begin_path(&self);
	fn move_to(&self, x: f64, y: f64);
	fn line_to(&self, x: f64, y: f64);
	fn arc(&self, x: f64, y: f64, radius: f64);
	fn stroke(&self);
	fn fill(&self);
	fn set_stroke_style(&self, style: &str);
	fn set_fill_style(&self, style: &str);
	fn set_line_width(&self, width: f64);
	fn set_font(&self, font: &str);
	fn set_text_align(&self, align: &str);
	fn fill_text(&self, text: &str, x: f64, y: f64);
}

impl Surface for CanvasRenderingContext2d {
	fn save(&self) {
		CanvasRenderingContext2d::save(self);
	}

	fn restore(&self) {
		CanvasRenderingContext2d::restore(self);
	}

	fn set_transform(&self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
		let _ = CanvasRenderingContext2d::set_transform(self, a, b, c, d, e, f);
	}

	fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64) {
		CanvasRenderingContext2d::clear_rect(self, x, y, w, h);
	}

	fn translate(&self, x: f64, y: f64) {
		let _ = CanvasRenderingContext2d::translate(self, x, y);
	}

	fn scale(&self, x: f64, y: f64) {
		let _ = CanvasRenderingContext2d::scale(self, x, y);
	}

	fn begin_path(&self) {
		CanvasRenderingContext2d::begin_path(self);
	}

	fn move_to(&self, x: f64, y: f64) {
		CanvasRenderingContext2d::move_to(self, x, y);
	}

	fn line_to(&self, x: f64, y: f64) {
		CanvasRenderingContext2d::line_to(self, x, y);
	}

	fn arc(&self, x: f64, y: f64, radius: f64) {
		let _ = CanvasRenderingContext2d::arc(self, x, y, radius, 0.0, 2.0 * PI);
	}

	fn stroke(&self) {
		CanvasRenderingContext2d::stroke(self);
	}

	fn fill(&self) {
		CanvasRenderingContext2d::fill(self);
	}

	fn set_stroke_style(&self, style: &str) {
		self.set_stroke_style_str(style);
	}

	fn set_fill_style(&self, style: &str) {
		self.set_fill_style_str(style);
	}

	fn set_line_width(&self, width: f64) {
		CanvasRenderingContext2d::set_line_width(self, width);
	}

	fn set_font(&self, font: &str) {
		CanvasRenderingContext2d::set_font(self, font);
	}

	fn set_text_align(&self, align: &str) {
		CanvasRenderingContext2d::set_text_align(self, align);
	}

	fn fill_text(&self, text: &str, x: f64, y: f64) {
		let _ = CanvasRenderingContext2d::fill_text(self, text, x, y);
	}
}

/// CSS size of the drawing area plus the device pixel ratio of the display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
	pub device_pixel_ratio: f64,
}

impl Viewport {
	pub fn is_empty(&self) -> bool {
		!(self.width > 0.0 && self.height > 0.0)
	}

	/// Backing store size in device pixels.
	pub fn backing_size(&self) -> (u32, u32) {
		let dpr = self.dpr();
		(
			(self.width * dpr).round() as u32,
			(self.height * dpr).round() as u32,
		)
	}

	fn dpr(&self) -> f64 {
		if self.device_pixel_ratio > 0.0 {
			self.device_pixel_ratio
		} else {
			1.0
		}
	}
}

pub struct Frame<'a> {
	pub model: &'a GraphModel,
	pub transform: ViewTransform,
	pub hovered: Option<&'a str>,
	pub focal: Option<&'a str>,
	pub viewport: Viewport,
	pub config: &'a GraphConfig,
}

/// Clear the surface and draw the whole graph.
pub fn render<S: Surface + ?Sized>(surface: &S, frame: &Frame<'_>) {
	if frame.viewport.is_empty() {
		return;
	}
	let dpr = frame.viewport.dpr();
	surface.save();
	surface.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
	surface.clear_rect(0.0, 0.0, frame.viewport.width, frame.viewport.height);
	if !frame.model.is_empty() {
		surface.translate(frame.transform.x, frame.transform.y);
		surface.scale(frame.transform.k, frame.transform.k);
		draw_edges(surface, frame);
		draw_nodes(surface, frame);
	}
	surface.restore();
}

fn draw_edges<S: Surface + ?Sized>(surface: &S, frame: &Frame<'_>) {
	surface.set_font(&frame.config.edge_font);
	surface.set_text_align("center");
	for edge in &frame.model.edges {
		let Some((from, to)) = frame.model.endpoints(edge) else {
			continue;
		};
		surface.begin_path();
		surface.move_to(from.position.x, from.position.y);
		surface.line_to(to.position.x, to.position.y);
		surface.set_stroke_style(edge.color);
		surface.set_line_width(edge.line_width());
		surface.stroke();

		let mid = from.position.midpoint(to.position);
		surface.set_fill_style(edge.color);
		surface.fill_text(&edge.label, mid.x, mid.y - EDGE_LABEL_LIFT);
	}
}

fn draw_nodes<S: Surface + ?Sized>(surface: &S, frame: &Frame<'_>) {
	surface.set_text_align("center");
	for node in &frame.model.nodes {
		let (x, y, radius) = (node.position.x, node.position.y, node.radius);

		if frame.focal == Some(node.id.as_str()) {
			surface.begin_path();
			surface.arc(x, y, radius + FOCAL_RING_GAP);
			surface.set_stroke_style(FOCAL_RING_COLOR);
			surface.set_line_width(FOCAL_RING_WIDTH);
			surface.stroke();
		}

		surface.begin_path();
		surface.arc(x, y, radius);
		surface.set_fill_style(node.color);
		surface.fill();

		if frame.hovered == Some(node.id.as_str()) {
			surface.set_stroke_style(HOVER_OUTLINE_COLOR);
			surface.set_line_width(HOVER_OUTLINE_WIDTH);
			surface.stroke();
		}

		surface.set_fill_style(LABEL_COLOR);
		surface.set_font(&frame.config.label_font);
		surface.fill_text(&node.name, x, y + NAME_BASELINE);

		surface.set_fill_style(ROLE_LABEL_COLOR);
		surface.set_font(&frame.config.role_font);
		surface.fill_text(
			node.role.label(),
			x,
			y + radius + frame.config.role_label_offset,
		);
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use super::*;
	use crate::components::relationship_graph::config::LayoutMode;
	use crate::components::relationship_graph::model::build_graph;
	use crate::components::relationship_graph::palette::kind_color;
	use crate::components::relationship_graph::types::{
		Entity, Relationship, RelationshipKind, Role,
	};

	#[derive(Clone, Debug, PartialEq)]
	enum Op {
		Save,
		Restore,
		SetTransform([f64; 6]),
		Clear(f64, f64),
		Translate(f64, f64),
		Scale(f64),
		Line((f64, f64), (f64, f64)),
		Arc(f64, f64, f64),
		Stroke,
		Fill,
		StrokeStyle(String),
		FillStyle(String),
		LineWidth(f64),
		Text(String, f64, f64),
	}

	#[derive(Default)]
	struct Recorder {
		ops: RefCell<Vec<Op>>,
		cursor: RefCell<(f64, f64)>,
	}

	impl Recorder {
		fn ops(&self) -> Vec<Op> {
			self.ops.borrow().clone()
		}

		fn push(&self, op: Op) {
			self.ops.borrow_mut().push(op);
		}
	}

	impl Surface for Recorder {
		fn save(&self) {
			self.push(Op::Save);
		}
		fn restore(&self) {
			self.push(Op::Restore);
		}
		fn set_transform(&self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
			self.push(Op::SetTransform([a, b, c, d, e, f]));
		}
		fn clear_rect(&self, _x: f64, _y: f64, w: f64, h: f64) {
			self.push(Op::Clear(w, h));
		}
		fn translate(&self, x: f64, y: f64) {
			self.push(Op::Translate(x, y));
		}
		fn scale(&self, x: f64, _y: f64) {
			self.push(Op::Scale(x));
		}
		fn begin_path(&self) {}
		fn move_to(&self, x: f64, y: f64) {
			*self.cursor.borrow_mut() = (x, y);
		}
		fn line_to(&self, x: f64, y: f64) {
			let from = *self.cursor.borrow();
			self.push(Op::Line(from, (x, y)));
		}
		fn arc(&self, x: f64, y: f64, radius: f64) {
			self.push(Op::Arc(x, y, radius));
		}
		fn stroke(&self) {
			self.push(Op::Stroke);
		}
		fn fill(&self) {
			self.push(Op::Fill);
		}
		fn set_stroke_style(&self, style: &str) {
			self.push(Op::StrokeStyle(style.into()));
		}
		fn set_fill_style(&self, style: &str) {
			self.push(Op::FillStyle(style.into()));
		}
		fn set_line_width(&self, width: f64) {
			self.push(Op::LineWidth(width));
		}
		fn set_font(&self, _font: &str) {}
		fn set_text_align(&self, _align: &str) {}
		fn fill_text(&self, text: &str, x: f64, y: f64) {
			self.push(Op::Text(text.into(), x, y));
		}
	}

	fn sample() -> (GraphModel, GraphConfig) {
		let cfg = GraphConfig::story();
		let entities = vec![
			Entity::new("a", "Ada", Role::Protagonist).at(0.0, 0.0),
			Entity::new("b", "Bo", Role::Antagonist).at(100.0, 0.0),
			Entity::new("c", "Cy", Role::Minor).at(0.0, 100.0),
		];
		let rels = vec![
			Relationship {
				id: "1".into(),
				from_id: "a".into(),
				to_id: "b".into(),
				kind: RelationshipKind::Ally,
				strength: 3,
				description: String::new(),
				directional: true,
			},
			Relationship {
				id: "2".into(),
				from_id: "a".into(),
				to_id: "ghost".into(),
				kind: RelationshipKind::Enemy,
				strength: 5,
				description: String::new(),
				directional: false,
			},
		];
		let model = build_graph(&entities, &rels, LayoutMode::Grid, None, &cfg);
		(model, cfg)
	}

	fn viewport() -> Viewport {
		Viewport {
			width: 640.0,
			height: 480.0,
			device_pixel_ratio: 2.0,
		}
	}

	#[test]
	fn pass_is_balanced_and_starts_from_device_scale() {
		let (model, cfg) = sample();
		let surface = Recorder::default();
		let transform = ViewTransform { x: 15.0, y: -4.0, k: 1.5 };
		render(
			&surface,
			&Frame {
				model: &model,
				transform,
				hovered: None,
				focal: None,
				viewport: viewport(),
				config: &cfg,
			},
		);
		let ops = surface.ops();
		assert_eq!(ops[0], Op::Save);
		assert_eq!(ops[1], Op::SetTransform([2.0, 0.0, 0.0, 2.0, 0.0, 0.0]));
		assert_eq!(ops[2], Op::Clear(640.0, 480.0));
		assert_eq!(ops[3], Op::Translate(15.0, -4.0));
		assert_eq!(ops[4], Op::Scale(1.5));
		assert_eq!(ops.last(), Some(&Op::Restore));
		let saves = ops.iter().filter(|op| **op == Op::Save).count();
		let restores = ops.iter().filter(|op| **op == Op::Restore).count();
		assert_eq!(saves, restores);
	}

	#[test]
	fn edges_use_strength_and_kind_color_and_come_first() {
		let (model, cfg) = sample();
		let surface = Recorder::default();
		render(
			&surface,
			&Frame {
				model: &model,
				transform: ViewTransform::default(),
				hovered: None,
				focal: None,
				viewport: viewport(),
				config: &cfg,
			},
		);
		let ops = surface.ops();
		let lines: Vec<_> = ops.iter().filter(|op| matches!(op, Op::Line(..))).collect();
		assert_eq!(lines, vec![&Op::Line((0.0, 0.0), (100.0, 0.0))]);
		assert!(ops.contains(&Op::StrokeStyle(kind_color(&RelationshipKind::Ally).into())));
		assert!(ops.contains(&Op::LineWidth(3.0)));
		assert!(ops.contains(&Op::Text("ally".into(), 50.0, -5.0)));

		let line_at = ops.iter().position(|op| matches!(op, Op::Line(..))).unwrap();
		let first_arc = ops.iter().position(|op| matches!(op, Op::Arc(..))).unwrap();
		assert!(line_at < first_arc);
	}

	#[test]
	fn nodes_sized_by_degree_with_labels() {
		let (model, cfg) = sample();
		let surface = Recorder::default();
		render(
			&surface,
			&Frame {
				model: &model,
				transform: ViewTransform::default(),
				hovered: None,
				focal: None,
				viewport: viewport(),
				config: &cfg,
			},
		);
		let ops = surface.ops();
		// "a" touches both relationships, the dangling one included
		assert!(ops.contains(&Op::Arc(0.0, 0.0, cfg.node_radius(2))));
		assert!(ops.contains(&Op::Arc(0.0, 100.0, cfg.node_radius(0))));
		assert!(ops.contains(&Op::Text("Ada".into(), 0.0, 5.0)));
		let r = cfg.node_radius(0);
		assert!(ops.contains(&Op::Text("minor".into(), 0.0, 100.0 + r + cfg.role_label_offset)));
	}

	#[test]
	fn hover_and_focal_are_outlined() {
		let (model, cfg) = sample();
		let surface = Recorder::default();
		render(
			&surface,
			&Frame {
				model: &model,
				transform: ViewTransform::default(),
				hovered: Some("b"),
				focal: Some("c"),
				viewport: viewport(),
				config: &cfg,
			},
		);
		let ops = surface.ops();
		let r = cfg.node_radius(0);
		assert!(ops.contains(&Op::Arc(0.0, 100.0, r + FOCAL_RING_GAP)));
		assert!(ops.contains(&Op::StrokeStyle(FOCAL_RING_COLOR.into())));
		assert!(ops.contains(&Op::StrokeStyle(HOVER_OUTLINE_COLOR.into())));
		// ring plus body for the focal node only
		let arcs_at = |x: f64, y: f64| {
			ops.iter()
				.filter(|op| matches!(op, Op::Arc(ax, ay, _) if *ax == x && *ay == y))
				.count()
		};
		assert_eq!(arcs_at(0.0, 100.0), 2);
		assert_eq!(arcs_at(100.0, 0.0), 1);
	}

	#[test]
	fn repeated_passes_are_identical() {
		let (model, cfg) = sample();
		let frame = Frame {
			model: &model,
			transform: ViewTransform { x: 3.0, y: 4.0, k: 0.75 },
			hovered: Some("a"),
			focal: Some("b"),
			viewport: viewport(),
			config: &cfg,
		};
		let first = Recorder::default();
		render(&first, &frame);
		let second = Recorder::default();
		render(&second, &frame);
		render(&second, &frame);
		let once = first.ops();
		let twice = second.ops();
		assert_eq!(twice.len(), once.len() * 2);
		assert_eq!(&twice[once.len()..], &once[..]);
	}

	#[test]
	fn zero_viewport_draws_nothing() {
		let (model, cfg) = sample();
		let surface = Recorder::default();
		render(
			&surface,
			&Frame {
				model: &model,
				transform: ViewTransform::default(),
				hovered: None,
				focal: None,
				viewport: Viewport {
					width: 0.0,
					height: 300.0,
					device_pixel_ratio: 1.0,
				},
				config: &cfg,
			},
		);
		assert!(surface.ops().is_empty());
	}

	#[test]
	fn empty_model_only_clears() {
		let cfg = GraphConfig::story();
		let model = build_graph(&[], &[], LayoutMode::Grid, None, &cfg);
		let surface = Recorder::default();
		render(
			&surface,
			&Frame {
				model: &model,
				transform: ViewTransform::default(),
				hovered: None,
				focal: None,
				viewport: viewport(),
				config: &cfg,
			},
		);
		assert_eq!(
			surface.ops(),
			vec![
				Op::Save,
				Op::SetTransform([2.0, 0.0, 0.0, 2.0, 0.0, 0.0]),
				Op::Clear(640.0, 480.0),
				Op::Restore,
			]
		);
	}

	#[test]
	fn backing_store_scales_with_device_pixel_ratio() {
		assert_eq!(viewport().backing_size(), (1280, 960));
		let odd = Viewport {
			width: 100.0,
			height: 50.0,
			device_pixel_ratio: 0.0,
		};
		assert_eq!(odd.backing_size(), (100, 50));
	}
}
