//! Layout engine for inspection-round schedules: visible window, day slots,
//! filtering, bar geometry, lane assignment and navigation state.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod filter;
pub mod layout;
pub mod navigation;
pub mod rows;
pub mod slots;
pub mod storage;
pub mod window;

pub use domain::{RoundPriority, RoundStatus, ScheduledEvent, TimeSlot, ViewMode, ViewWindow};
pub use engine::{TimelineEngine, TimelineView};
pub use error::{ConfigError, StorageError, TimelineError};
pub use filter::{EventFilter, filter_events};
pub use layout::{LayoutEntry, LayoutOptions, RangePolicy, TimelineLayout, compute_layout, compute_timeline};
pub use navigation::{Navigation, NavigationController, ZoomRange};
pub use rows::{LaneOrder, LayoutMode, RowAssignment};
pub use slots::generate_slots;
pub use window::compute_window;
