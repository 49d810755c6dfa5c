use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;
use rand::Rng;

use super::config::{CircleLayout, GraphConfig, GridLayout, LayoutMode};
use super::palette::{kind_color, role_color};
use super::types::{Entity, Point, Relationship, RelationshipKind, Role};

pub const MIN_STRENGTH: i32 = 1;
pub const MAX_STRENGTH: i32 = 5;

const RELAX_DT: f32 = 0.016;

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub name: String,
	pub role: Role,
	pub position: Point,
	/// Number of relationships naming this entity as either endpoint.
	pub degree: usize,
	pub radius: f64,
	pub color: &'static str,
}

impl GraphNode {
	pub fn contains(&self, p: Point) -> bool {
		self.position.distance(p) <= self.radius
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	pub source: String,
	pub target: String,
	pub kind: RelationshipKind,
	/// Already clamped to `MIN_STRENGTH..=MAX_STRENGTH`.
	pub strength: u8,
	pub color: &'static str,
	pub label: String,
}

impl GraphEdge {
	pub fn line_width(&self) -> f64 {
		self.strength as f64
	}
}

#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
	index: HashMap<String, usize>,
}

impl GraphModel {
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	pub fn endpoints(&self, edge: &GraphEdge) -> Option<(&GraphNode, &GraphNode)> {
		Some((self.node(&edge.source)?, self.node(&edge.target)?))
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Topmost node whose circle contains `p` (graph space). Nodes are
	/// drawn in order, so later nodes win where circles overlap.
	pub fn node_at(&self, p: Point) -> Option<&GraphNode> {
		self.nodes.iter().rev().find(|node| node.contains(p))
	}
}

pub fn clamp_strength(strength: i32) -> u8 {
	strength.clamp(MIN_STRENGTH, MAX_STRENGTH) as u8
}

/// Turn entities and relationships into positioned nodes and styled edges.
///
/// Relationships naming an entity that is not in `entities` still count
/// towards the degree of the endpoint that is present, but produce no edge.
pub fn build_graph(
	entities: &[Entity],
	relationships: &[Relationship],
	layout: LayoutMode,
	focal: Option<&str>,
	config: &GraphConfig,
) -> GraphModel {
	build_graph_with_rng(
		entities,
		relationships,
		layout,
		focal,
		config,
		&mut rand::thread_rng(),
	)
}

pub fn build_graph_with_rng<R: Rng>(
	entities: &[Entity],
	relationships: &[Relationship],
	layout: LayoutMode,
	focal: Option<&str>,
	config: &GraphConfig,
	rng: &mut R,
) -> GraphModel {
	let focal = focal.filter(|id| entities.iter().any(|e| e.id == *id));
	let positions = match layout {
		LayoutMode::Grid => grid_positions(entities.len(), &config.grid),
		LayoutMode::Circle => circle_positions(entities, focal, &config.circle, |_| {
			config.circle.radius
		}),
		LayoutMode::Organic => {
			let circle = &config.circle;
			let jittered = circle_positions(entities, focal, circle, |_| {
				circle.jitter_min + rng.gen_range(0.0..1.0) * circle.jitter_span
			});
			relax(entities, relationships, focal, jittered, circle.relax_ticks)
		}
	};

	let mut index = HashMap::with_capacity(entities.len());
	let nodes: Vec<GraphNode> = entities
		.iter()
		.zip(positions)
		.enumerate()
		.map(|(i, (entity, position))| {
			index.insert(entity.id.clone(), i);
			let degree = relationships.iter().filter(|r| r.touches(&entity.id)).count();
			GraphNode {
				id: entity.id.clone(),
				name: entity.name.clone(),
				role: entity.role.clone(),
				position: entity.position.unwrap_or(position),
				degree,
				radius: config.node_radius(degree),
				color: role_color(&entity.role),
			}
		})
		.collect();

	let edges: Vec<GraphEdge> = relationships
		.iter()
		.filter(|r| index.contains_key(&r.from_id) && index.contains_key(&r.to_id))
		.map(|r| GraphEdge {
			source: r.from_id.clone(),
			target: r.to_id.clone(),
			kind: r.kind.clone(),
			strength: clamp_strength(r.strength),
			color: kind_color(&r.kind),
			label: r.kind.name().to_string(),
		})
		.collect();

	if edges.len() < relationships.len() {
		debug!(
			"dropped {} relationship(s) with a missing endpoint",
			relationships.len() - edges.len()
		);
	}
	debug!(
		"built {} graph: {} nodes, {} edges",
		layout.name(),
		nodes.len(),
		edges.len()
	);

	GraphModel {
		nodes,
		edges,
		index,
	}
}

fn grid_positions(count: usize, grid: &GridLayout) -> Vec<Point> {
	let columns = grid.columns.max(1);
	(0..count)
		.map(|i| {
			Point::new(
				grid.origin.x + (i % columns) as f64 * grid.spacing,
				grid.origin.y + (i / columns) as f64 * grid.spacing,
			)
		})
		.collect()
}

/// The focal entity (if any) sits at the center; everyone else is spread
/// evenly around it at the radius `radius_for(i)` returns.
fn circle_positions(
	entities: &[Entity],
	focal: Option<&str>,
	circle: &CircleLayout,
	mut radius_for: impl FnMut(usize) -> f64,
) -> Vec<Point> {
	let ring = entities.len() - usize::from(focal.is_some());
	let mut slot = 0;
	entities
		.iter()
		.map(|entity| {
			if focal == Some(entity.id.as_str()) {
				return circle.center;
			}
			let angle = slot as f64 / ring as f64 * 2.0 * PI;
			let radius = radius_for(slot);
			slot += 1;
			Point::new(
				circle.center.x + angle.cos() * radius,
				circle.center.y + angle.sin() * radius,
			)
		})
		.collect()
}

fn relax(
	entities: &[Entity],
	relationships: &[Relationship],
	focal: Option<&str>,
	start: Vec<Point>,
	ticks: u32,
) -> Vec<Point> {
	if ticks == 0 || entities.len() < 2 {
		return start;
	}
	let mut graph: ForceGraph<usize, ()> = ForceGraph::new(SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	});
	let mut id_to_idx = HashMap::new();
	for (i, (entity, p)) in entities.iter().zip(&start).enumerate() {
		let p = entity.position.unwrap_or(*p);
		let idx = graph.add_node(NodeData {
			x: p.x as f32,
			y: p.y as f32,
			mass: 10.0,
			is_anchor: entity.position.is_some() || focal == Some(entity.id.as_str()),
			user_data: i,
		});
		id_to_idx.insert(entity.id.as_str(), idx);
	}
	for rel in relationships {
		if let (Some(&src), Some(&tgt)) = (
			id_to_idx.get(rel.from_id.as_str()),
			id_to_idx.get(rel.to_id.as_str()),
		) {
			if src != tgt {
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}
	}
	for _ in 0..ticks {
		graph.update(RELAX_DT);
	}

	let mut relaxed = start;
	graph.visit_nodes(|node| {
		relaxed[node.data.user_data] = Point::new(node.x() as f64, node.y() as f64);
	});
	relaxed
}
