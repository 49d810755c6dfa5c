use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}

	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}
}

/// Role or category label of an entity. Only used for color selection and
/// the subtitle under each node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
	Protagonist,
	Antagonist,
	Supporting,
	Minor,
	Deuteragonist,
	LoveInterest,
	Location,
	Organization,
	System,
	Culture,
	History,
	City,
	Institution,
	NaturalArea,
	SecretSociety,
	MagicSystem,
	Government,
	Other(String),
}

impl Role {
	pub fn parse(label: &str) -> Self {
		match label.trim().to_lowercase().as_str() {
			"protagonist" => Self::Protagonist,
			"antagonist" => Self::Antagonist,
			"supporting" => Self::Supporting,
			"minor" => Self::Minor,
			"deuteragonist" => Self::Deuteragonist,
			"love_interest" => Self::LoveInterest,
			"location" => Self::Location,
			"organization" => Self::Organization,
			"system" => Self::System,
			"culture" => Self::Culture,
			"history" => Self::History,
			"city" => Self::City,
			"institution" => Self::Institution,
			"natural area" => Self::NaturalArea,
			"secret society" => Self::SecretSociety,
			"magic system" => Self::MagicSystem,
			"government" => Self::Government,
			_ => Self::Other(label.to_string()),
		}
	}

	pub fn label(&self) -> &str {
		match self {
			Self::Protagonist => "protagonist",
			Self::Antagonist => "antagonist",
			Self::Supporting => "supporting",
			Self::Minor => "minor",
			Self::Deuteragonist => "deuteragonist",
			Self::LoveInterest => "love_interest",
			Self::Location => "location",
			Self::Organization => "organization",
			Self::System => "system",
			Self::Culture => "culture",
			Self::History => "history",
			Self::City => "City",
			Self::Institution => "Institution",
			Self::NaturalArea => "Natural Area",
			Self::SecretSociety => "Secret Society",
			Self::MagicSystem => "Magic System",
			Self::Government => "Government",
			Self::Other(label) => label,
		}
	}

	/// True for the world-building categories (as opposed to element types).
	pub fn is_world_category(&self) -> bool {
		matches!(
			self,
			Self::City
				| Self::Institution
				| Self::NaturalArea
				| Self::SecretSociety
				| Self::MagicSystem
				| Self::Government
		)
	}
}

impl Default for Role {
	fn default() -> Self {
		Self::Minor
	}
}

impl From<String> for Role {
	fn from(label: String) -> Self {
		Self::parse(&label)
	}
}

impl From<Role> for String {
	fn from(role: Role) -> Self {
		role.label().to_string()
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipKind {
	Family,
	Romantic,
	Friendship,
	Rivalry,
	Mentor,
	Enemy,
	Ally,
	Professional,
	Other(String),
}

impl RelationshipKind {
	pub const ALL: [RelationshipKind; 8] = [
		Self::Family,
		Self::Romantic,
		Self::Friendship,
		Self::Rivalry,
		Self::Mentor,
		Self::Enemy,
		Self::Ally,
		Self::Professional,
	];

	pub fn parse(name: &str) -> Self {
		match name.trim().to_lowercase().as_str() {
			"family" => Self::Family,
			"romantic" => Self::Romantic,
			"friendship" => Self::Friendship,
			"rivalry" => Self::Rivalry,
			"mentor" => Self::Mentor,
			"enemy" => Self::Enemy,
			"ally" => Self::Ally,
			"professional" => Self::Professional,
			other => Self::Other(other.to_string()),
		}
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Family => "family",
			Self::Romantic => "romantic",
			Self::Friendship => "friendship",
			Self::Rivalry => "rivalry",
			Self::Mentor => "mentor",
			Self::Enemy => "enemy",
			Self::Ally => "ally",
			Self::Professional => "professional",
			Self::Other(name) => name,
		}
	}
}

impl Default for RelationshipKind {
	fn default() -> Self {
		Self::Friendship
	}
}

impl From<String> for RelationshipKind {
	fn from(name: String) -> Self {
		Self::parse(&name)
	}
}

impl From<RelationshipKind> for String {
	fn from(kind: RelationshipKind) -> Self {
		kind.name().to_string()
	}
}

impl fmt::Display for RelationshipKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A character or world element that can take part in relationships.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub role: Role,
	#[serde(flatten, with = "position_hint")]
	pub position: Option<Point>,
}

impl Entity {
	pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			role,
			position: None,
		}
	}

	#[cfg(test)]
	pub fn at(mut self, x: f64, y: f64) -> Self {
		self.position = Some(Point::new(x, y));
		self
	}
}

/// Stored characters carry their hint as optional top-level `x`/`y` fields.
mod position_hint {
	use serde::{Deserialize, Deserializer, Serialize, Serializer};

	use super::Point;

	#[derive(Serialize, Deserialize, Default)]
	struct Hint {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		x: Option<f64>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		y: Option<f64>,
	}

	pub fn serialize<S: Serializer>(value: &Option<Point>, s: S) -> Result<S::Ok, S::Error> {
		let hint = match value {
			Some(p) => Hint {
				x: Some(p.x),
				y: Some(p.y),
			},
			None => Hint::default(),
		};
		hint.serialize(s)
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Point>, D::Error> {
		let hint = Hint::deserialize(d)?;
		Ok(match (hint.x, hint.y) {
			(Some(x), Some(y)) => Some(Point::new(x, y)),
			_ => None,
		})
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
	pub id: String,
	#[serde(rename = "fromCharacterId")]
	pub from_id: String,
	#[serde(rename = "toCharacterId")]
	pub to_id: String,
	#[serde(rename = "type")]
	pub kind: RelationshipKind,
	pub strength: i32,
	#[serde(default)]
	pub description: String,
	/// Stored but never consulted when drawing; edges are always undirected.
	#[serde(rename = "isDirectional", default)]
	pub directional: bool,
}

impl Relationship {
	pub fn touches(&self, entity_id: &str) -> bool {
		self.from_id == entity_id || self.to_id == entity_id
	}
}

/// The fields of the "add relationship" form before an id is assigned.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipDraft {
	pub from_id: String,
	pub to_id: String,
	pub kind: RelationshipKind,
	pub strength: i32,
	pub description: String,
	pub directional: bool,
}

impl Default for RelationshipDraft {
	fn default() -> Self {
		Self {
			from_id: String::new(),
			to_id: String::new(),
			kind: RelationshipKind::Friendship,
			strength: 3,
			description: String::new(),
			directional: false,
		}
	}
}

impl RelationshipDraft {
	pub fn between(from: impl Into<String>, to: impl Into<String>, kind: RelationshipKind) -> Self {
		Self {
			from_id: from.into(),
			to_id: to.into(),
			kind,
			..Self::default()
		}
	}

	pub fn into_relationship(self, id: String) -> Relationship {
		Relationship {
			id,
			from_id: self.from_id,
			to_id: self.to_id,
			kind: self.kind,
			strength: self.strength,
			description: self.description,
			directional: self.directional,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn role_parse_is_case_insensitive() {
		assert_eq!(Role::parse("Protagonist"), Role::Protagonist);
		assert_eq!(Role::parse(" LOVE_INTEREST "), Role::LoveInterest);
		assert_eq!(Role::parse("Natural Area"), Role::NaturalArea);
		assert_eq!(Role::parse("wizard"), Role::Other("wizard".into()));
	}

	#[test]
	fn unknown_kind_keeps_its_name() {
		let kind = RelationshipKind::parse("Nemesis");
		assert_eq!(kind, RelationshipKind::Other("nemesis".into()));
		assert_eq!(kind.name(), "nemesis");
	}

	#[test]
	fn kind_option_values_select_their_kind() {
		for kind in RelationshipKind::ALL {
			let value = kind.name().to_string();
			assert_eq!(RelationshipKind::parse(&value), kind);
		}
	}

	#[test]
	fn relationship_reads_stored_field_names() {
		let json = r#"{
			"id": "1700000000000",
			"fromCharacterId": "a",
			"toCharacterId": "b",
			"type": "ally",
			"strength": 3,
			"description": "old friends",
			"isDirectional": false
		}"#;
		let rel: Relationship = serde_json::from_str(json).unwrap();
		assert_eq!(rel.from_id, "a");
		assert_eq!(rel.to_id, "b");
		assert_eq!(rel.kind, RelationshipKind::Ally);
		assert_eq!(rel.strength, 3);
		assert!(!rel.directional);

		let back = serde_json::to_value(&rel).unwrap();
		assert_eq!(back["type"], "ally");
		assert_eq!(back["fromCharacterId"], "a");
		assert_eq!(back["isDirectional"], false);
	}

	#[test]
	fn entity_reads_optional_position_and_ignores_extra_fields() {
		let json = r#"[
			{"id": "a", "name": "Ada", "role": "Protagonist", "description": "lead", "x": 10, "y": 20},
			{"id": "b", "name": "Bo"}
		]"#;
		let entities: Vec<Entity> = serde_json::from_str(json).unwrap();
		assert_eq!(entities[0].role, Role::Protagonist);
		assert_eq!(entities[0].position, Some(Point::new(10.0, 20.0)));
		assert_eq!(entities[1].role, Role::Minor);
		assert_eq!(entities[1].position, None);
	}

	#[test]
	fn entity_without_hint_serializes_without_coordinates() {
		let value = serde_json::to_value(Entity::new("a", "Ada", Role::Minor)).unwrap();
		assert!(value.get("x").is_none());
		assert_eq!(value["role"], "minor");
	}
}
