//! Compass roadmap services
//!
//! The two core flows of the counseling system:
//! - [`RoadmapApplier`]: instantiate a roadmap's template tree (meetings,
//!   agenda items, tasks) for one student, atomically, with optional
//!   per-application tailoring via [`RoadmapSelection`].
//! - [`TrackerUpdater`]: move tasks through their lifecycle and propagate
//!   template-declared status updates onto the student's per-school
//!   application tracker rows.
//!
//! Plus [`MeetingScheduler`] for putting the created meetings on the
//! calendar, rendering [`NotificationPayload`]s along the way. Delivery is
//! behind the [`NotificationSink`] trait; everything here is synchronous and
//! transactional over [`compass_store::MemoryStore`].

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod applier;
pub mod error;
pub mod meetings;
pub mod notify;
pub mod selection;
pub mod tracker;

pub use applier::{AppliedRoadmap, RoadmapApplier, UnappliedRoadmap};
pub use error::RoadmapError;
pub use meetings::MeetingScheduler;
pub use notify::{
    NotificationKind, NotificationPayload, NotificationSink, NullSink, Recipient,
};
pub use selection::{AgendaItemSelection, MeetingSelection, RoadmapSelection};
pub use tracker::{on_task_status_change, TrackerPropagation, TrackerUpdater};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the roadmap services
    pub use crate::{
        AppliedRoadmap, MeetingScheduler, NotificationKind, NotificationPayload,
        NotificationSink, RoadmapApplier, RoadmapError, RoadmapSelection, TrackerPropagation,
        TrackerUpdater,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
