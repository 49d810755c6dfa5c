//! World-building elements and their free-text connection lists.
//!
//! A connection is written as `Name` or `Name (type)`, e.g. `Grand Library`
//! or `Elena (character)`.

use serde::{Deserialize, Serialize};

use crate::components::relationship_graph::{Entity, Relationship, RelationshipKind, Role};

const DEFAULT_CONNECTION_TYPE: &str = "connected";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldElement {
	pub id: String,
	pub name: String,
	#[serde(rename = "type", default)]
	pub element_type: String,
	#[serde(default)]
	pub category: String,
	/// Free-text connections, `Name` or `Name (type)`.
	#[serde(default)]
	pub connections: Vec<String>,
}

impl WorldElement {
	/// Categories are more specific than element types, so a known category
	/// decides the node color before the type does.
	pub fn role(&self) -> Role {
		let category = Role::parse(&self.category);
		if category.is_world_category() {
			return category;
		}
		Role::parse(&self.element_type)
	}

	pub fn to_entity(&self) -> Entity {
		Entity::new(self.id.clone(), self.name.clone(), self.role())
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
	pub target: String,
	pub kind: String,
}

pub fn parse_connection(raw: &str) -> Connection {
	let raw = raw.trim();
	if let Some(open) = raw.find('(') {
		if let Some(inner) = raw[open + 1..].strip_suffix(')') {
			let target = raw[..open].trim();
			let kind = inner.trim();
			if !target.is_empty() && !kind.is_empty() && !kind.contains(['(', ')']) {
				return Connection {
					target: target.to_string(),
					kind: kind.to_lowercase(),
				};
			}
		}
	}
	Connection {
		target: raw.to_string(),
		kind: DEFAULT_CONNECTION_TYPE.to_string(),
	}
}

/// Entities and relationships for the connection map of `element`.
///
/// The element itself comes first; every connection becomes its own node
/// (`connected-{i}`), typed from the matching element in `all` when the
/// names agree and `other` otherwise.
pub fn world_graph_input(element: &WorldElement, all: &[WorldElement]) -> (Vec<Entity>, Vec<Relationship>) {
	let connections = &element.connections;
	let mut entities = Vec::with_capacity(connections.len() + 1);
	let mut relationships = Vec::with_capacity(connections.len());
	entities.push(element.to_entity());

	for (i, raw) in connections.iter().enumerate() {
		let conn = parse_connection(raw);
		let id = format!("connected-{i}");
		let role = all
			.iter()
			.find(|el| el.name == conn.target)
			.map(WorldElement::role)
			.unwrap_or_else(|| Role::parse("other"));
		entities.push(Entity::new(id.clone(), conn.target, role));
		relationships.push(Relationship {
			id: format!("{}-{id}", element.id),
			from_id: element.id.clone(),
			to_id: id,
			kind: RelationshipKind::parse(&conn.kind),
			strength: 1,
			description: String::new(),
			directional: false,
		});
	}
	(entities, relationships)
}
