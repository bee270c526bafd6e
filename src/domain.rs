use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Scheduled,
    InProgress,
    Completed,
    Overdue,
}

impl RoundStatus {
    pub const ALL: [RoundStatus; 4] = [
        RoundStatus::Scheduled,
        RoundStatus::InProgress,
        RoundStatus::Completed,
        RoundStatus::Overdue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoundStatus::Scheduled => "scheduled",
            RoundStatus::InProgress => "in_progress",
            RoundStatus::Completed => "completed",
            RoundStatus::Overdue => "overdue",
        }
    }
}

impl FromStr for RoundStatus {
    type Err = TimelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value.trim())
            .ok_or_else(|| TimelineError::InvalidField {
                field: "status",
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl RoundPriority {
    pub const ALL: [RoundPriority; 4] = [
        RoundPriority::Low,
        RoundPriority::Medium,
        RoundPriority::High,
        RoundPriority::Urgent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoundPriority::Low => "low",
            RoundPriority::Medium => "medium",
            RoundPriority::High => "high",
            RoundPriority::Urgent => "urgent",
        }
    }
}

impl FromStr for RoundPriority {
    type Err = TimelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str() == value.trim())
            .ok_or_else(|| TimelineError::InvalidField {
                field: "priority",
                value: value.to_string(),
            })
    }
}

/// An inspection round projected onto the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub id: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RoundStatus,
    pub priority: RoundPriority,
    pub department: String,
    #[serde(default)]
    pub assigned_to: Vec<String>,
}

impl ScheduledEvent {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        department: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start_date,
            end_date,
            status: RoundStatus::Scheduled,
            priority: RoundPriority::Medium,
            department: department.into(),
            assigned_to: Vec::new(),
        }
    }

    pub fn check_span(&self) -> Result<(), TimelineError> {
        if self.end_date < self.start_date {
            return Err(TimelineError::InconsistentEventSpan {
                event_id: self.id.clone(),
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Week,
    Month,
}

impl Display for ViewMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::Week => write!(f, "week"),
            ViewMode::Month => write!(f, "month"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = TimelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(ViewMode::Week),
            "month" => Ok(ViewMode::Month),
            _ => Err(TimelineError::InvalidField {
                field: "view mode",
                value: value.to_string(),
            }),
        }
    }
}

/// The inclusive range of days currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ViewWindow {
    pub fn day_count(&self) -> usize {
        ((self.end - self.start).num_days() + 1).max(0) as usize
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeSlot {
    pub date: NaiveDate,
}
