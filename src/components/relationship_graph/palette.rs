use super::types::{RelationshipKind, Role};

/// Neutral gray used for every role or relationship type without an entry.
pub const FALLBACK_COLOR: &str = "#6b7280";

pub const FOCAL_RING_COLOR: &str = "#fbbf24";
pub const HOVER_OUTLINE_COLOR: &str = "#ffffff";
pub const LABEL_COLOR: &str = "#ffffff";
pub const ROLE_LABEL_COLOR: &str = "rgba(0,0,0,0.7)";

pub fn role_color(role: &Role) -> &'static str {
	match role {
		Role::Protagonist => "#3b82f6",
		Role::Antagonist => "#ef4444",
		Role::Supporting => "#10b981",
		Role::Minor => "#6b7280",
		Role::Deuteragonist => "#8b5cf6",
		Role::LoveInterest => "#ec4899",
		Role::Location | Role::City => "#3B82F6",
		Role::Organization | Role::Institution => "#8B5CF6",
		Role::System | Role::NaturalArea => "#10B981",
		Role::Culture | Role::MagicSystem => "#F59E0B",
		Role::History | Role::Government => "#EF4444",
		Role::SecretSociety => "#7C3AED",
		Role::Other(_) => FALLBACK_COLOR,
	}
}

pub fn kind_color(kind: &RelationshipKind) -> &'static str {
	match kind {
		RelationshipKind::Family => "#f59e0b",
		RelationshipKind::Romantic => "#ec4899",
		RelationshipKind::Friendship => "#10b981",
		RelationshipKind::Rivalry => "#f97316",
		RelationshipKind::Mentor => "#8b5cf6",
		RelationshipKind::Enemy => "#ef4444",
		RelationshipKind::Ally => "#3b82f6",
		RelationshipKind::Professional => "#6b7280",
		RelationshipKind::Other(_) => FALLBACK_COLOR,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_labels_fall_back_to_gray() {
		assert_eq!(role_color(&Role::parse("time traveller")), FALLBACK_COLOR);
		assert_eq!(kind_color(&RelationshipKind::parse("nemesis")), FALLBACK_COLOR);
	}

	#[test]
	fn lookups_are_case_normalized() {
		assert_eq!(role_color(&Role::parse("ANTAGONIST")), "#ef4444");
		assert_eq!(kind_color(&RelationshipKind::parse("Ally")), "#3b82f6");
		assert_eq!(role_color(&Role::parse("secret society")), "#7C3AED");
	}
}
