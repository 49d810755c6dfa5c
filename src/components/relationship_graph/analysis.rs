//! Summary figures shown next to the graph: network statistics, the most
//! connected entities and the relationship rows of the focal entity.

use super::model::clamp_strength;
use super::types::{Entity, Relationship};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkStats {
	pub entities: usize,
	pub relationships: usize,
	/// Relationships as a share of all ordered entity pairs, rounded percent.
	pub density_percent: u32,
}

pub fn network_stats(entity_count: usize, relationship_count: usize) -> NetworkStats {
	let density_percent = if entity_count > 1 {
		let pairs = (entity_count * (entity_count - 1)) as f64;
		(relationship_count as f64 / pairs * 100.0).round() as u32
	} else {
		0
	};
	NetworkStats {
		entities: entity_count,
		relationships: relationship_count,
		density_percent,
	}
}

/// Entities with their degree, highest first; ties keep their original order.
pub fn most_connected<'a>(
	entities: &'a [Entity],
	relationships: &[Relationship],
	limit: usize,
) -> Vec<(&'a Entity, usize)> {
	let mut ranked: Vec<(&Entity, usize)> = entities
		.iter()
		.map(|e| (e, relationships.iter().filter(|r| r.touches(&e.id)).count()))
		.collect();
	ranked.sort_by(|a, b| b.1.cmp(&a.1));
	ranked.truncate(limit);
	ranked
}

#[derive(Clone, Debug, PartialEq)]
pub struct FocalRow<'a> {
	pub relationship: &'a Relationship,
	pub other_id: &'a str,
	/// True when the focal entity is the relationship's source.
	pub outgoing: bool,
}

pub fn focal_relationships<'a>(relationships: &'a [Relationship], focal_id: &str) -> Vec<FocalRow<'a>> {
	relationships
		.iter()
		.filter(|r| r.touches(focal_id))
		.map(|r| {
			let outgoing = r.from_id == focal_id;
			FocalRow {
				relationship: r,
				other_id: if outgoing { &r.to_id } else { &r.from_id },
				outgoing,
			}
		})
		.collect()
}

pub fn strength_dots(strength: i32) -> usize {
	clamp_strength(strength) as usize
}
