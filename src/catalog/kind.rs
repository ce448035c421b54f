use std::fmt;

/// The five entity kinds, in the order the phases run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Tag,
    Studio,
    Actor,
    Scene,
    Marker,
}

impl EntityKind {
    pub const PHASE_ORDER: [EntityKind; 5] = [
        EntityKind::Tag,
        EntityKind::Studio,
        EntityKind::Actor,
        EntityKind::Scene,
        EntityKind::Marker,
    ];

    /// Phase label used in logs and the summary table.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Tag => "Tags",
            EntityKind::Studio => "Studios",
            EntityKind::Actor => "Actors",
            EntityKind::Scene => "Scenes",
            EntityKind::Marker => "Markers",
        }
    }

    /// Only these kinds are deduplicated by name against the destination.
    pub fn is_named(self) -> bool {
        matches!(
            self,
            EntityKind::Tag | EntityKind::Studio | EntityKind::Actor
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
