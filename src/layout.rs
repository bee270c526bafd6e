use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{ScheduledEvent, TimeSlot};
use crate::error::TimelineError;
use crate::rows::{LaneOrder, LayoutMode};
use crate::slots::slot_index;

/// What to do with a round whose start or end falls outside the visible slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Only rounds whose start and end days are both on screen get a bar.
    #[default]
    DropOutOfRange,
    /// Rounds overlapping the window are cut at its edges.
    ClampToWindow,
}

impl Display for RangePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RangePolicy::DropOutOfRange => write!(f, "drop"),
            RangePolicy::ClampToWindow => write!(f, "clamp"),
        }
    }
}

impl FromStr for RangePolicy {
    type Err = TimelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "drop" | "drop_out_of_range" => Ok(RangePolicy::DropOutOfRange),
            "clamp" | "clamp_to_window" => Ok(RangePolicy::ClampToWindow),
            _ => Err(TimelineError::InvalidField {
                field: "range policy",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutOptions {
    pub mode: LayoutMode,
    pub range_policy: RangePolicy,
    pub lane_order: LaneOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpan {
    pub start_slot_index: usize,
    pub end_slot_index: usize,
    pub clipped_start: bool,
    pub clipped_end: bool,
}

impl SlotSpan {
    pub fn slot_count(&self) -> usize {
        self.end_slot_index - self.start_slot_index + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutEntry {
    pub event_id: String,
    pub row_index: usize,
    pub start_slot_index: usize,
    pub end_slot_index: usize,
    pub left_percent: f64,
    pub width_percent: f64,
    pub clipped_start: bool,
    pub clipped_end: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneLayout {
    pub label: String,
    pub event_ids: Vec<String>,
    /// One entry per slot listing the ids of lane rounds covering that day.
    pub days: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct TimelineLayout {
    pub lanes: Vec<LaneLayout>,
    pub entries: Vec<LayoutEntry>,
    #[serde(skip)]
    pub skipped: Vec<TimelineError>,
}

/// Locates `event` in `slots`, or `None` when the policy keeps it off screen.
pub fn map_event(slots: &[TimeSlot], event: &ScheduledEvent, policy: RangePolicy) -> Option<SlotSpan> {
    match policy {
        RangePolicy::DropOutOfRange => {
            let start_slot_index = slot_index(slots, event.start_date)?;
            let end_slot_index = slot_index(slots, event.end_date)?;
            Some(SlotSpan {
                start_slot_index,
                end_slot_index,
                clipped_start: false,
                clipped_end: false,
            })
        }
        RangePolicy::ClampToWindow => {
            let first = slots.first()?.date;
            let last = slots.last()?.date;
            if event.end_date < first || event.start_date > last {
                return None;
            }
            let clipped_start = event.start_date < first;
            let clipped_end = event.end_date > last;
            let start_slot_index = slot_index(slots, event.start_date.max(first))?;
            let end_slot_index = slot_index(slots, event.end_date.min(last))?;
            Some(SlotSpan {
                start_slot_index,
                end_slot_index,
                clipped_start,
                clipped_end,
            })
        }
    }
}

pub fn compute_layout(slots: &[TimeSlot], events: &[ScheduledEvent], options: &LayoutOptions) -> Vec<LayoutEntry> {
    compute_timeline(slots, events, options).entries
}

/// Full layout: bars plus, per lane, which rounds sit on each day.
///
/// Rounds with an inconsistent span are skipped and reported in
/// `TimelineLayout::skipped`; everything else is laid out normally. Lanes are
/// assigned over every consistent round, so a round outside the window keeps
/// an (empty) lane of its own in Gantt mode.
pub fn compute_timeline(slots: &[TimeSlot], events: &[ScheduledEvent], options: &LayoutOptions) -> TimelineLayout {
    let mut skipped = Vec::new();
    let mut valid = Vec::with_capacity(events.len());
    for event in events {
        match event.check_span() {
            Ok(()) => valid.push(event.clone()),
            Err(err) => {
                warn!(event_id = %event.id, "skipping round: {err}");
                skipped.push(err);
            }
        }
    }

    let assignment = options.mode.row_assignment(options.lane_order).assign(&valid);

    let mut entries = Vec::new();
    for (event, row_index) in valid.iter().zip(assignment.rows.iter().copied()) {
        if let Some(span) = map_event(slots, event, options.range_policy) {
            entries.push(layout_entry(event, row_index, span, slots.len()));
        }
    }

    let mut days = vec![vec![Vec::new(); slots.len()]; assignment.lanes.len()];
    for (event, row_index) in valid.iter().zip(assignment.rows.iter().copied()) {
        for (slot_index, slot) in slots.iter().enumerate() {
            if event.covers(slot.date) {
                days[row_index][slot_index].push(event.id.clone());
            }
        }
    }

    let lanes = assignment
        .lanes
        .into_iter()
        .zip(days)
        .map(|(lane, days)| LaneLayout {
            label: lane.label,
            event_ids: lane.event_ids,
            days,
        })
        .collect();

    TimelineLayout {
        lanes,
        entries,
        skipped,
    }
}

fn layout_entry(event: &ScheduledEvent, row_index: usize, span: SlotSpan, slot_count: usize) -> LayoutEntry {
    let slot_count = slot_count as f64;
    LayoutEntry {
        event_id: event.id.clone(),
        row_index,
        start_slot_index: span.start_slot_index,
        end_slot_index: span.end_slot_index,
        left_percent: span.start_slot_index as f64 / slot_count * 100.0,
        width_percent: span.slot_count() as f64 / slot_count * 100.0,
        clipped_start: span.clipped_start,
        clipped_end: span.clipped_end,
    }
}
