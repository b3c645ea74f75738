//! Typed identifiers for Compass records
//!
//! Every entity kind gets its own ULID newtype (sortable, unique) so that a
//! meeting id can never be passed where a task id is expected.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

macro_rules! id_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub Ulid);

        impl $name {
            /// Generate a new random id
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ulid::DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Ulid::from_string(s)?))
            }
        }
    };
}

id_type!(StudentId, "Unique student identifier");
id_type!(CounselorId, "Unique counselor identifier");
id_type!(SchoolId, "Unique school/university identifier");
id_type!(RoadmapId, "Unique roadmap identifier");
id_type!(MeetingTemplateId, "Unique counselor meeting template identifier");
id_type!(AgendaItemTemplateId, "Unique agenda item template identifier");
id_type!(TaskTemplateId, "Unique task template identifier");
id_type!(MeetingId, "Unique counselor meeting instance identifier");
id_type!(AgendaItemId, "Unique agenda item instance identifier");
id_type!(TaskId, "Unique task instance identifier");
id_type!(DecisionId, "Unique student-university decision identifier");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_generation_is_unique() {
        let a = TaskId::new();
        let b = TaskId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn id_round_trips_through_display() {
        let id = MeetingId::new();
        let parsed: MeetingId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn id_serde_round_trip() {
        let id = StudentId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: StudentId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
