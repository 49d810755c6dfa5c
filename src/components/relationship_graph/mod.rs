mod analysis;
mod component;
mod config;
mod model;
mod palette;
mod render;
mod state;
mod types;

pub use component::RelationshipGraph;
pub use config::{GraphConfig, LayoutMode};
pub use types::{Entity, Relationship, RelationshipDraft, RelationshipKind, Role};
