use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::domain::{ScheduledEvent, TimeSlot, ViewMode, ViewWindow};
use crate::error::TimelineError;
use crate::filter::EventFilter;
use crate::layout::{LayoutOptions, TimelineLayout, compute_timeline};
use crate::navigation::NavigationController;
use crate::slots::{generate_slots, today_slot_index};

/// Everything a rendering surface needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineView {
    pub window: ViewWindow,
    pub view_mode: ViewMode,
    pub slots: Vec<TimeSlot>,
    pub today_index: Option<usize>,
    pub filtered_ids: Vec<String>,
    pub layout: TimelineLayout,
    pub zoom: f64,
    #[serde(skip)]
    pub skipped: Vec<TimelineError>,
}

impl TimelineView {
    pub fn event<'a>(&self, events: &'a [ScheduledEvent], id: &str) -> Option<&'a ScheduledEvent> {
        events.iter().find(|event| event.id == id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimelineEngine {
    pub options: LayoutOptions,
}

impl TimelineEngine {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    /// Runs range, slots, filter and layout for the current navigation state.
    /// Holds no state between calls.
    pub fn compute(
        &self,
        events: &[ScheduledEvent],
        navigation: &NavigationController,
        filter: &EventFilter,
        today: NaiveDate,
    ) -> TimelineView {
        let window = navigation.window();
        let slots = generate_slots(&window);
        let filtered = filter.apply(events);
        let layout = compute_timeline(&slots, &filtered, &self.options);
        debug!(
            start = %window.start,
            end = %window.end,
            rounds = events.len(),
            filtered = filtered.len(),
            entries = layout.entries.len(),
            "recomputed timeline"
        );

        TimelineView {
            window,
            view_mode: navigation.view_mode(),
            today_index: today_slot_index(&slots, today),
            slots,
            filtered_ids: filtered.into_iter().map(|event| event.id).collect(),
            skipped: layout.skipped.clone(),
            layout,
            zoom: navigation.zoom(),
        }
    }
}
