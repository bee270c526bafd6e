use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{RoundPriority, RoundStatus, ScheduledEvent};
use crate::error::{StorageError, TimelineError};
use crate::window::parse_date;

const ROUNDS_MARKER: &str = "=== ROUNDS ===";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScheduleHeader {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub facility: Option<String>,
    #[serde(default)]
    pub departments: Vec<String>,
}

impl Default for ScheduleHeader {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            facility: None,
            departments: Vec::new(),
        }
    }
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRound {
    pub line: usize,
    pub id: String,
    pub error: TimelineError,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedSchedule {
    pub header: ScheduleHeader,
    pub events: Vec<ScheduledEvent>,
    pub skipped: Vec<SkippedRound>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Number(value) => value.to_string(),
            RawId::Text(value) => value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRound {
    id: RawId,
    title: String,
    start_date: String,
    end_date: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    department: String,
    #[serde(default)]
    assigned_to: Vec<String>,
}

impl RawRound {
    fn into_event(self) -> Result<ScheduledEvent, (String, TimelineError)> {
        let id = self.id.into_string();
        let convert = || -> Result<ScheduledEvent, TimelineError> {
            let status = match &self.status {
                Some(raw) => raw.parse::<RoundStatus>()?,
                None => RoundStatus::Scheduled,
            };
            let priority = match &self.priority {
                Some(raw) => raw.parse::<RoundPriority>()?,
                None => RoundPriority::Medium,
            };
            Ok(ScheduledEvent {
                id: id.clone(),
                title: self.title.clone(),
                start_date: parse_date(&self.start_date)?,
                end_date: parse_date(&self.end_date)?,
                status,
                priority,
                department: self.department.clone(),
                assigned_to: self.assigned_to.clone(),
            })
        };
        convert().map_err(|err| (id.clone(), err))
    }
}

pub fn load_schedule(path: &Path) -> Result<LoadedSchedule, StorageError> {
    let raw = fs::read_to_string(path)?;
    let schedule = parse_schedule(&raw)?;
    debug!(
        path = %path.display(),
        rounds = schedule.events.len(),
        skipped = schedule.skipped.len(),
        "loaded schedule"
    );
    Ok(schedule)
}

/// Parses a TOML header, the rounds marker, then one JSON round per line.
///
/// Unparseable JSON fails the whole load. A round with a bad date, status or
/// priority is skipped and reported so the rest of the schedule still loads.
pub fn parse_schedule(raw: &str) -> Result<LoadedSchedule, StorageError> {
    if raw.trim().is_empty() {
        return Ok(LoadedSchedule::default());
    }

    let lines = raw.lines().collect::<Vec<_>>();
    let marker = lines.iter().position(|line| line.trim() == ROUNDS_MARKER);
    let (header_lines, round_lines) = match marker {
        Some(index) => (&lines[..index], &lines[index + 1..]),
        None => (&lines[..], &lines[lines.len()..]),
    };
    let first_round_line = header_lines.len() + 2;

    let header_blob = header_lines.join("\n");
    let header: ScheduleHeader = toml::from_str(&header_blob)?;

    let mut events = Vec::new();
    let mut skipped = Vec::new();
    for (offset, line) in round_lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = first_round_line + offset;
        let round: RawRound = serde_json::from_str(line).map_err(|source| StorageError::JsonDecode {
            line: line_number,
            source,
        })?;
        match round.into_event() {
            Ok(event) => events.push(event),
            Err((id, error)) => {
                warn!(line = line_number, round = %id, "skipping round: {error}");
                skipped.push(SkippedRound {
                    line: line_number,
                    id,
                    error,
                });
            }
        }
    }

    Ok(LoadedSchedule {
        header,
        events,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use super::{load_schedule, parse_schedule};
    use crate::domain::{RoundPriority, RoundStatus};
    use crate::error::{StorageError, TimelineError};

    const SAMPLE: &str = r#"schema_version = 1
facility = "St. Example General"
departments = ["Cardiology", "Pharmacy"]
=== ROUNDS ===
{"id": 7, "title": "Hand hygiene", "start_date": "2024-01-08", "end_date": "2024-01-10", "status": "in_progress", "priority": "high", "department": "Cardiology", "assigned_to": ["A. Nurse"]}

{"id": "ph-2", "title": "Fridge temps", "start_date": "2024-01-09", "end_date": "2024-01-09", "department": "Pharmacy"}
{"id": 9, "title": "Typo", "start_date": "2024-13-01", "end_date": "2024-01-09", "department": "Pharmacy"}
{"id": 10, "title": "Odd status", "start_date": "2024-01-01", "end_date": "2024-01-02", "status": "paused", "department": "ICU"}
{"id": 11, "title": "Backwards", "start_date": "2024-01-05", "end_date": "2024-01-02", "department": "ICU"}
"#;

    #[test]
    fn loads_header_and_rounds_skipping_bad_records() {
        let schedule = parse_schedule(SAMPLE).expect("schedule should parse");
        assert_eq!(schedule.header.facility.as_deref(), Some("St. Example General"));
        assert_eq!(schedule.header.departments, vec!["Cardiology", "Pharmacy"]);

        let ids = schedule.events.iter().map(|event| event.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["7", "ph-2", "11"]);

        let first = &schedule.events[0];
        assert_eq!(first.status, RoundStatus::InProgress);
        assert_eq!(first.priority, RoundPriority::High);
        assert_eq!(first.start_date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(first.assigned_to, vec!["A. Nurse"]);

        let defaulted = &schedule.events[1];
        assert_eq!(defaulted.status, RoundStatus::Scheduled);
        assert_eq!(defaulted.priority, RoundPriority::Medium);

        assert_eq!(schedule.skipped.len(), 2);
        assert_eq!(schedule.skipped[0].line, 8);
        assert_eq!(schedule.skipped[0].id, "9");
        assert!(matches!(schedule.skipped[0].error, TimelineError::InvalidDate { .. }));
        assert!(matches!(
            schedule.skipped[1].error,
            TimelineError::InvalidField { field: "status", .. }
        ));
    }

    #[test]
    fn malformed_json_reports_line_number() {
        let raw = "facility = \"X\"\n=== ROUNDS ===\n{\"id\": 1, \"title\": \n";
        match parse_schedule(raw) {
            Err(StorageError::JsonDecode { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected json error, got {other:?}"),
        }
    }

    #[test]
    fn empty_and_header_only_files_have_no_rounds() {
        assert!(parse_schedule("").expect("empty parses").events.is_empty());
        let schedule = parse_schedule("facility = \"Only header\"\n").expect("header parses");
        assert!(schedule.events.is_empty());
        assert_eq!(schedule.header.schema_version, 1);
    }

    #[test]
    fn reads_schedule_from_disk() {
        let path = temp_file("rounds_timeline_storage.schedule");
        fs::write(&path, SAMPLE).expect("write should succeed");
        let schedule = load_schedule(&path).expect("load should succeed");
        assert_eq!(schedule.events.len(), 3);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = temp_file("rounds_timeline_missing.schedule");
        assert!(matches!(load_schedule(&path), Err(StorageError::Io(_))));
    }

    fn temp_file(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("{}_{}", name, std::process::id()));
        path
    }
}
