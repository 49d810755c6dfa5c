use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info};

use crate::components::relationship_graph::{
	Entity, GraphConfig, LayoutMode, Relationship, RelationshipDraft, RelationshipGraph,
	RelationshipKind, Role,
};
use crate::store::{StoreError, StoryStore, relationship_scope};
use crate::world::{WorldElement, world_graph_input};

/// Story shown on the home page; seeded with sample records on first visit.
const DEMO_STORY_ID: &str = "1700000000";

fn sample_characters() -> Vec<Entity> {
	[
		("1", "Elena Vance", Role::Protagonist),
		("2", "Marcus Thorne", Role::Antagonist),
		("3", "Iris Calloway", Role::Deuteragonist),
		("4", "Tobias Reed", Role::Supporting),
		("5", "Wren Hollis", Role::LoveInterest),
		("6", "Old Garrick", Role::Minor),
	]
	.into_iter()
	.map(|(n, name, role)| Entity::new(format!("{DEMO_STORY_ID}-{n}"), name, role))
	.collect()
}

fn sample_relationships() -> Vec<Relationship> {
	let id = |n: u32| format!("{DEMO_STORY_ID}-{n}");
	[
		(1, 2, RelationshipKind::Enemy, 5, "Sworn to stop his rise"),
		(1, 3, RelationshipKind::Family, 4, "Estranged sisters"),
		(1, 4, RelationshipKind::Ally, 3, ""),
		(1, 5, RelationshipKind::Romantic, 4, ""),
		(6, 1, RelationshipKind::Mentor, 2, "Taught her the old maps"),
		(3, 2, RelationshipKind::Professional, 2, ""),
		(4, 5, RelationshipKind::Friendship, 3, ""),
	]
	.into_iter()
	.enumerate()
	.map(|(i, (from, to, kind, strength, description))| {
		RelationshipDraft {
			strength,
			description: description.to_string(),
			directional: kind == RelationshipKind::Mentor,
			..RelationshipDraft::between(id(from), id(to), kind)
		}
		.into_relationship(format!("seed-{i}"))
	})
	.collect()
}

fn sample_world() -> Vec<WorldElement> {
	let element = |n: u32, name: &str, ty: &str, category: &str, connections: &[&str]| WorldElement {
		id: format!("{DEMO_STORY_ID}-w{n}"),
		name: name.to_string(),
		element_type: ty.to_string(),
		category: category.to_string(),
		connections: connections.iter().map(|c| c.to_string()).collect(),
	};
	vec![
		element(
			1,
			"Grand Library",
			"location",
			"Institution",
			&["Order of Ash (rival)", "Port Veil (ally)", "Elena Vance", "Tide Magic (mentor)"],
		),
		element(2, "Order of Ash", "organization", "Secret Society", &["Grand Library (enemy)"]),
		element(3, "Port Veil", "location", "City", &[]),
		element(4, "Tide Magic", "system", "Magic System", &[]),
	]
}

/// Stored records, or the seed when none are stored yet. Unreadable records
/// are logged and shown as empty.
fn load_or_seed<T>(
	what: &str,
	loaded: Result<Vec<T>, StoreError>,
	seed: fn() -> Vec<T>,
	save: impl FnOnce(&[T]) -> Result<(), StoreError>,
) -> Vec<T> {
	match loaded {
		Ok(records) if !records.is_empty() => records,
		Ok(_) => {
			let records = seed();
			info!("seeding {} sample {what}", records.len());
			if let Err(e) = save(&records) {
				error!("failed to store sample {what}: {e}");
			}
			records
		}
		Err(e) => {
			error!("failed to load {what}: {e}");
			Vec::new()
		}
	}
}

/// Story relationship map, the protagonist's own map and the connection
/// map of a world element.
#[component]
pub fn Home() -> impl IntoView {
	let store = Rc::new(StoryStore::open());

	let characters = load_or_seed(
		"characters",
		store.list_entities(DEMO_STORY_ID),
		sample_characters,
		|records| store.save_entities(DEMO_STORY_ID, records),
	);
	let focal = characters
		.iter()
		.find(|c| c.role == Role::Protagonist)
		.or_else(|| characters.first())
		.map(|c| c.id.clone());
	let scope = focal
		.as_deref()
		.map(relationship_scope)
		.unwrap_or(DEMO_STORY_ID)
		.to_string();
	let relationships = load_or_seed(
		"relationships",
		store.list_relationships(&scope),
		sample_relationships,
		|records| store.save_relationships(&scope, records),
	);
	let world = load_or_seed(
		"world elements",
		store.list_world_elements(DEMO_STORY_ID),
		sample_world,
		|records| store.save_world_elements(DEMO_STORY_ID, records),
	);

	let characters = RwSignal::new(characters);
	let relationships = RwSignal::new(relationships);

	// Both character maps share one relationship list; persist it after
	// every add, but not on the initial read.
	let store_save = store.clone();
	Effect::new(move |prev: Option<()>| {
		let list = relationships.get();
		if prev.is_none() {
			return;
		}
		match store_save.save_relationships(&scope, &list) {
			Ok(()) => info!("saved {} relationships", list.len()),
			Err(e) => error!("{e}"),
		}
	});

	let world_map = world.first().map(|element| {
		let (entities, links) = world_graph_input(element, &world);
		view! {
			<section class="world-map">
				<h2>{format!("{} connections", element.name)}</h2>
				<RelationshipGraph
					entities=Signal::stored(entities)
					relationships=RwSignal::new(links)
					focal=element.id.clone()
					layout=LayoutMode::Circle
					config=GraphConfig::character()
				/>
			</section>
		}
	});

	let character_map = focal.map(|focal_id| {
		let name = characters.with_untracked(|cs| {
			cs.iter()
				.find(|c| c.id == focal_id)
				.map(|c| c.name.clone())
				.unwrap_or_default()
		});
		view! {
			<section class="character-map">
				<h2>{format!("{name}'s relationships")}</h2>
				<RelationshipGraph
					entities=characters
					relationships=relationships
					focal=focal_id
					layout=LayoutMode::Circle
					config=GraphConfig::character()
				/>
			</section>
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<main class="relationship-maps">
				<section class="story-map">
					<h1>"Character Relationships"</h1>
					<p class="subtitle">"Drag to pan. Scroll to zoom. Hover a character to highlight it."</p>
					<RelationshipGraph entities=characters relationships=relationships height=480.0 />
				</section>
				{character_map}
				{world_map}
			</main>
		</ErrorBoundary>
	}
}
