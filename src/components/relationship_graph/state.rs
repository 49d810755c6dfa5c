use log::{debug, info};
use thiserror::Error;

use super::config::{GraphConfig, LayoutMode};
use super::model::{GraphModel, build_graph};
use super::types::{Entity, Point, Relationship, RelationshipDraft};

/// Pan offset `(x, y)` in screen pixels and zoom factor `k`.
///
/// Drawing applies `translate(x, y)` then `scale(k, k)`, so a graph point
/// `g` lands on screen at `g * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn screen_to_graph(&self, p: Point) -> Point {
		Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
	}

	#[cfg(test)]
	pub fn graph_to_screen(&self, p: Point) -> Point {
		Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Interaction {
	Idle,
	/// `anchor` is the pointer position minus the pan offset at press time.
	Panning { anchor: Point },
	Hovering(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRelationship {
	#[error("relationship needs both a source and a target")]
	MissingEndpoint,
	#[error("relationship source and target are the same entity ({0})")]
	SelfLoop(String),
}

/// Everything one relationship graph widget knows: its inputs, the derived
/// model, the view transform and the pointer state machine.
pub struct GraphView {
	pub config: GraphConfig,
	pub transform: ViewTransform,
	entities: Vec<Entity>,
	relationships: Vec<Relationship>,
	focal: Option<String>,
	layout: LayoutMode,
	model: GraphModel,
	interaction: Interaction,
}

impl GraphView {
	pub fn new(
		entities: Vec<Entity>,
		relationships: Vec<Relationship>,
		focal: Option<String>,
		layout: LayoutMode,
		config: GraphConfig,
	) -> Self {
		let mut view = Self {
			config,
			transform: ViewTransform::default(),
			entities,
			relationships,
			focal,
			layout,
			model: GraphModel::default(),
			interaction: Interaction::Idle,
		};
		view.rebuild();
		view
	}

	pub fn model(&self) -> &GraphModel {
		&self.model
	}

	pub fn relationships(&self) -> &[Relationship] {
		&self.relationships
	}

	pub fn focal(&self) -> Option<&str> {
		self.focal.as_deref()
	}

	pub fn layout(&self) -> LayoutMode {
		self.layout
	}

	#[cfg(test)]
	pub fn interaction(&self) -> &Interaction {
		&self.interaction
	}

	pub fn hovered(&self) -> Option<&str> {
		match &self.interaction {
			Interaction::Hovering(id) => Some(id),
			_ => None,
		}
	}

	/// Replace both inputs at once; the story store hands them over together.
	pub fn set_input(&mut self, entities: Vec<Entity>, relationships: Vec<Relationship>) {
		self.entities = entities;
		self.relationships = relationships;
		self.rebuild();
	}

	pub fn set_layout(&mut self, layout: LayoutMode) {
		self.layout = layout;
		self.rebuild();
	}

	fn rebuild(&mut self) {
		self.model = build_graph(
			&self.entities,
			&self.relationships,
			self.layout,
			self.focal.as_deref(),
			&self.config,
		);
		let stale = matches!(
			&self.interaction,
			Interaction::Hovering(id) if self.model.node(id).is_none()
		);
		if stale {
			self.interaction = Interaction::Idle;
		}
	}

	pub fn node_at_position(&self, screen: Point) -> Option<&str> {
		let p = self.transform.screen_to_graph(screen);
		self.model.node_at(p).map(|node| node.id.as_str())
	}

	pub fn pointer_down(&mut self, screen: Point) {
		if matches!(self.interaction, Interaction::Panning { .. }) {
			return;
		}
		let anchor = Point::new(screen.x - self.transform.x, screen.y - self.transform.y);
		self.interaction = Interaction::Panning { anchor };
	}

	/// Returns whether anything visible changed.
	pub fn pointer_move(&mut self, screen: Point) -> bool {
		if let Interaction::Panning { anchor } = self.interaction {
			self.transform.x = screen.x - anchor.x;
			self.transform.y = screen.y - anchor.y;
			return true;
		}
		let next = match self.node_at_position(screen) {
			Some(id) => Interaction::Hovering(id.to_string()),
			None => Interaction::Idle,
		};
		if next == self.interaction {
			return false;
		}
		self.interaction = next;
		true
	}

	pub fn pointer_up(&mut self) {
		if matches!(self.interaction, Interaction::Panning { .. }) {
			self.interaction = Interaction::Idle;
		}
	}

	pub fn pointer_leave(&mut self) {
		self.pointer_up();
	}

	pub fn wheel(&mut self, delta_y: f64) {
		let factor = if delta_y > 0.0 {
			self.config.wheel_zoom_out
		} else {
			self.config.wheel_zoom_in
		};
		self.zoom_by(factor);
	}

	pub fn zoom_in(&mut self) {
		self.zoom_by(self.config.button_zoom_in);
	}

	pub fn zoom_out(&mut self) {
		self.zoom_by(self.config.button_zoom_out);
	}

	fn zoom_by(&mut self, factor: f64) {
		self.transform.k = self.config.clamp_zoom(self.transform.k * factor);
	}

	pub fn reset_view(&mut self) {
		self.transform = ViewTransform::default();
	}

	/// Append a relationship built from `draft` and rebuild the model.
	///
	/// Drafts with an empty endpoint or with `from == to` are rejected and
	/// leave the relationship list untouched.
	pub fn add_relationship(
		&mut self,
		draft: RelationshipDraft,
		id: String,
	) -> Result<&Relationship, InvalidRelationship> {
		if draft.from_id.is_empty() || draft.to_id.is_empty() {
			debug!("rejected relationship draft without both endpoints");
			return Err(InvalidRelationship::MissingEndpoint);
		}
		if draft.from_id == draft.to_id {
			debug!("rejected self relationship on {}", draft.from_id);
			return Err(InvalidRelationship::SelfLoop(draft.from_id));
		}
		info!(
			"adding {} relationship {} -> {}",
			draft.kind, draft.from_id, draft.to_id
		);
		self.relationships.push(draft.into_relationship(id));
		self.rebuild();
		Ok(&self.relationships[self.relationships.len() - 1])
	}
}
