use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::ScheduledEvent;
use crate::error::TimelineError;

/// Gantt gives each round its own lane; Timeline groups rounds by department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    Gantt,
    Timeline,
}

impl LayoutMode {
    pub fn row_assignment(self, lane_order: LaneOrder) -> RowAssignment {
        match self {
            LayoutMode::Gantt => RowAssignment::PerEvent,
            LayoutMode::Timeline => RowAssignment::PerDepartment(lane_order),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LayoutMode::Gantt => LayoutMode::Timeline,
            LayoutMode::Timeline => LayoutMode::Gantt,
        }
    }
}

impl Display for LayoutMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutMode::Gantt => write!(f, "gantt"),
            LayoutMode::Timeline => write!(f, "timeline"),
        }
    }
}

impl FromStr for LayoutMode {
    type Err = TimelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gantt" => Ok(LayoutMode::Gantt),
            "timeline" | "grouped" => Ok(LayoutMode::Timeline),
            _ => Err(TimelineError::InvalidField {
                field: "layout mode",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneOrder {
    #[default]
    FirstSeen,
    Alphabetical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAssignment {
    PerEvent,
    PerDepartment(LaneOrder),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lane {
    pub label: String,
    pub event_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaneAssignment {
    pub lanes: Vec<Lane>,
    /// `rows[i]` is the lane of `events[i]`.
    pub rows: Vec<usize>,
}

impl RowAssignment {
    pub fn assign(&self, events: &[ScheduledEvent]) -> LaneAssignment {
        match self {
            RowAssignment::PerEvent => assign_per_event(events),
            RowAssignment::PerDepartment(order) => assign_per_department(events, *order),
        }
    }
}

fn assign_per_event(events: &[ScheduledEvent]) -> LaneAssignment {
    let lanes = events
        .iter()
        .map(|event| Lane {
            label: event.title.clone(),
            event_ids: vec![event.id.clone()],
        })
        .collect();
    LaneAssignment {
        lanes,
        rows: (0..events.len()).collect(),
    }
}

fn assign_per_department(events: &[ScheduledEvent], order: LaneOrder) -> LaneAssignment {
    let mut lanes: Vec<Lane> = Vec::new();
    let mut lane_by_department: BTreeMap<&str, usize> = BTreeMap::new();
    let mut rows = Vec::with_capacity(events.len());

    for event in events {
        let lane_index = *lane_by_department
            .entry(event.department.as_str())
            .or_insert_with(|| {
                lanes.push(Lane {
                    label: event.department.clone(),
                    event_ids: Vec::new(),
                });
                lanes.len() - 1
            });
        lanes[lane_index].event_ids.push(event.id.clone());
        rows.push(lane_index);
    }

    if order == LaneOrder::Alphabetical {
        // BTreeMap iterates in key order, which gives the alphabetical rank.
        let mut remap = vec![0; lanes.len()];
        for (rank, lane_index) in lane_by_department.values().enumerate() {
            remap[*lane_index] = rank;
        }
        let mut ordered = lanes.into_iter().enumerate().collect::<Vec<_>>();
        ordered.sort_by_key(|(index, _)| remap[*index]);
        lanes = ordered.into_iter().map(|(_, lane)| lane).collect();
        for row in &mut rows {
            *row = remap[*row];
        }
    }

    LaneAssignment { lanes, rows }
}
