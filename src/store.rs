//! Access to the story records kept in browser local storage.
//!
//! Records are JSON arrays under `chronicle-*` keys and are always read and
//! written whole. A missing key reads as an empty list.

use std::cell::RefCell;
use std::collections::HashMap;

use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::components::relationship_graph::{Entity, Relationship};
use crate::world::WorldElement;

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("storage unavailable: {0}")]
	Unavailable(String),
	#[error("malformed records under {key}: {source}")]
	Json {
		key: String,
		#[source]
		source: serde_json::Error,
	},
	#[error("failed to write {key}: {message}")]
	Write { key: String, message: String },
}

/// Minimal string key-value storage.
pub trait KeyValue {
	fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
	fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl KeyValue for web_sys::Storage {
	fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
		web_sys::Storage::get_item(self, key)
			.map_err(|e| StoreError::Unavailable(format!("{e:?}")))
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
		web_sys::Storage::set_item(self, key, value).map_err(|e| StoreError::Write {
			key: key.to_string(),
			message: format!("{e:?}"),
		})
	}
}

impl<K: KeyValue + ?Sized> KeyValue for Box<K> {
	fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
		(**self).get_item(key)
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
		(**self).set_item(key, value)
	}
}

/// In-memory storage; records last as long as the page.
#[derive(Debug, Default)]
pub struct MemoryBackend {
	items: RefCell<HashMap<String, String>>,
}

impl KeyValue for MemoryBackend {
	fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.items.borrow().get(key).cloned())
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.items.borrow_mut().insert(key.to_string(), value.to_string());
		Ok(())
	}
}

pub fn characters_key(story_id: &str) -> String {
	format!("chronicle-characters-{story_id}")
}

pub fn world_key(story_id: &str) -> String {
	format!("chronicle-world-{story_id}")
}

pub fn relationships_key(scope_id: &str) -> String {
	format!("chronicle-relationships-{scope_id}")
}

/// Relationship scope of a character-scoped view: character ids are
/// prefixed with their story id, so the scope is everything before the
/// first `-`.
pub fn relationship_scope(entity_id: &str) -> &str {
	entity_id.split('-').next().unwrap_or(entity_id)
}

pub struct StoryStore<B> {
	backend: B,
}

impl StoryStore<web_sys::Storage> {
	/// Store over `window.localStorage`.
	pub fn local() -> Result<Self, StoreError> {
		let window =
			web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
		let storage = window
			.local_storage()
			.map_err(|e| StoreError::Unavailable(format!("{e:?}")))?
			.ok_or_else(|| StoreError::Unavailable("localStorage disabled".into()))?;
		Ok(Self::new(storage))
	}
}

impl StoryStore<Box<dyn KeyValue>> {
	/// `localStorage` when the browser allows it, page memory otherwise.
	pub fn open() -> Self {
		match StoryStore::<web_sys::Storage>::local() {
			Ok(store) => Self::new(Box::new(store.backend)),
			Err(e) => {
				warn!("{e}; keeping story records in memory");
				Self::new(Box::new(MemoryBackend::default()))
			}
		}
	}
}

impl<B: KeyValue> StoryStore<B> {
	pub fn new(backend: B) -> Self {
		Self { backend }
	}

	pub fn list_entities(&self, story_id: &str) -> Result<Vec<Entity>, StoreError> {
		self.read(&characters_key(story_id))
	}

	pub fn save_entities(&self, story_id: &str, entities: &[Entity]) -> Result<(), StoreError> {
		self.write(&characters_key(story_id), entities)
	}

	pub fn list_world_elements(&self, story_id: &str) -> Result<Vec<WorldElement>, StoreError> {
		self.read(&world_key(story_id))
	}

	pub fn save_world_elements(
		&self,
		story_id: &str,
		elements: &[WorldElement],
	) -> Result<(), StoreError> {
		self.write(&world_key(story_id), elements)
	}

	pub fn list_relationships(&self, scope_id: &str) -> Result<Vec<Relationship>, StoreError> {
		self.read(&relationships_key(scope_id))
	}

	pub fn save_relationships(
		&self,
		scope_id: &str,
		relationships: &[Relationship],
	) -> Result<(), StoreError> {
		self.write(&relationships_key(scope_id), relationships)
	}

	fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
		let Some(raw) = self.backend.get_item(key)? else {
			return Ok(Vec::new());
		};
		serde_json::from_str(&raw).map_err(|source| StoreError::Json {
			key: key.to_string(),
			source,
		})
	}

	fn write<T: Serialize>(&self, key: &str, records: &[T]) -> Result<(), StoreError> {
		let raw = serde_json::to_string(records).map_err(|source| StoreError::Json {
			key: key.to_string(),
			source,
		})?;
		self.backend.set_item(key, &raw)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::relationship_graph::{RelationshipKind, Role};

	fn store() -> StoryStore<MemoryBackend> {
		StoryStore::new(MemoryBackend::default())
	}

	#[test]
	fn missing_keys_read_as_empty() {
		let s = store();
		assert!(s.list_entities("story1").unwrap().is_empty());
		assert!(s.list_relationships("story1").unwrap().is_empty());
		assert!(s.list_world_elements("story1").unwrap().is_empty());
	}

	#[test]
	fn relationships_are_written_whole() {
		let s = store();
		let rel = Relationship {
			id: "1".into(),
			from_id: "a".into(),
			to_id: "b".into(),
			kind: RelationshipKind::Mentor,
			strength: 4,
			description: "teaches".into(),
			directional: true,
		};
		s.save_relationships("story1", &[rel.clone()]).unwrap();
		assert_eq!(s.list_relationships("story1").unwrap(), vec![rel.clone()]);

		s.save_relationships("story1", &[]).unwrap();
		assert!(s.list_relationships("story1").unwrap().is_empty());
		assert!(s.list_relationships("story2").unwrap().is_empty());
	}

	#[test]
	fn reads_records_written_by_the_editor() {
		let backend = MemoryBackend::default();
		backend
			.set_item(
				"chronicle-characters-s1",
				r#"[{"id":"s1-a","name":"Ada","role":"protagonist","description":"","traits":[]}]"#,
			)
			.unwrap();
		let s = StoryStore::new(backend);
		let entities = s.list_entities("s1").unwrap();
		assert_eq!(entities, vec![Entity::new("s1-a", "Ada", Role::Protagonist)]);
	}

	#[test]
	fn malformed_records_report_their_key() {
		let backend = MemoryBackend::default();
		backend.set_item("chronicle-relationships-s1", "{not json").unwrap();
		let err = StoryStore::new(backend).list_relationships("s1").unwrap_err();
		match err {
			StoreError::Json { key, .. } => assert_eq!(key, "chronicle-relationships-s1"),
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn boxed_backends_share_the_key_scheme() {
		let s: StoryStore<Box<dyn KeyValue>> = StoryStore::new(Box::new(MemoryBackend::default()));
		let el = WorldElement {
			id: "w1".into(),
			name: "Vel".into(),
			element_type: "location".into(),
			category: "City".into(),
			connections: vec!["Order of Ash (rival)".into()],
		};
		s.save_world_elements("s1", &[el.clone()]).unwrap();
		assert_eq!(s.list_world_elements("s1").unwrap(), vec![el]);
		assert!(s.backend.get_item("chronicle-world-s1").unwrap().is_some());
	}

	#[test]
	fn scope_is_the_story_prefix() {
		assert_eq!(relationship_scope("1700000000-3"), "1700000000");
		assert_eq!(relationship_scope("plain"), "plain");
		assert_eq!(relationship_scope(""), "");
	}
}
