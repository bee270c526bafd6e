use std::env;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::PathBuf;

use chrono::{NaiveDate, Weekday};
use serde::Deserialize;
use tracing::debug;

use crate::domain::ViewMode;
use crate::error::ConfigError;
use crate::layout::{LayoutOptions, RangePolicy};
use crate::navigation::{NavigationController, ZoomRange};
use crate::rows::{LaneOrder, LayoutMode};

const CONFIG_FILE: &str = "config.toml";
const APP_DIR: &str = "rounds_timeline";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	pub first_day_of_week: Weekday,
	pub default_view: ViewMode,
	pub layout: LayoutMode,
	pub range_policy: RangePolicy,
	pub lane_order: LaneOrder,
	pub zoom: ZoomRange,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			first_day_of_week: Weekday::Sun,
			default_view: ViewMode::Week,
			layout: LayoutMode::Gantt,
			range_policy: RangePolicy::DropOutOfRange,
			lane_order: LaneOrder::FirstSeen,
			zoom: ZoomRange::default(),
		}
	}
}

impl EngineConfig {
	pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(raw)?)
	}

	pub fn layout_options(&self) -> LayoutOptions {
		LayoutOptions {
			mode: self.layout,
			range_policy: self.range_policy,
			lane_order: self.lane_order,
		}
	}

	pub fn navigation(&self, anchor: NaiveDate) -> NavigationController {
		NavigationController::new(anchor, self.default_view)
			.with_first_day_of_week(self.first_day_of_week)
			.with_zoom_range(self.zoom)
	}
}

/// Loads the config from `--config`, `ROUNDS_TIMELINE_CONFIG`, or the user
/// config dir. Only an explicitly named file has to exist.
pub fn load_config(cli_path: Option<PathBuf>) -> Result<EngineConfig, ConfigError> {
	let explicit = cli_path.or_else(|| non_empty_env_path("ROUNDS_TIMELINE_CONFIG"));
	let path = match explicit {
		Some(path) => path,
		None => {
			let path = config_dir().join(CONFIG_FILE);
			if !path.exists() {
				debug!(path = %path.display(), "no config file, using defaults");
				return Ok(EngineConfig::default());
			}
			path
		}
	};

	let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
		path: path.display().to_string(),
		source,
	})?;
	debug!(path = %path.display(), "loaded config");
	EngineConfig::from_toml_str(&raw)
}

pub fn resolve_schedule_path(cli_path: Option<PathBuf>) -> Result<PathBuf, Error> {
	if let Some(path) = cli_path {
		return Ok(absolutize(path));
	}

	if let Some(path) = non_empty_env_path("ROUNDS_SCHEDULE") {
		return Ok(absolutize(path));
	}

	Err(Error::new(
		ErrorKind::NotFound,
		"no schedule selected: pass --schedule <path> or set ROUNDS_SCHEDULE",
	))
}

fn non_empty_env_path(name: &str) -> Option<PathBuf> {
	env::var_os(name)
		.map(PathBuf::from)
		.filter(|path| !path.as_os_str().is_empty())
}

fn config_dir() -> PathBuf {
	#[cfg(target_os = "windows")]
	{
		if let Some(path) = env::var_os("APPDATA") {
			return PathBuf::from(path).join(APP_DIR);
		}
	}

	if let Some(path) = env::var_os("XDG_CONFIG_HOME") {
		return PathBuf::from(path).join(APP_DIR);
	}

	if let Some(path) = env::var_os("HOME") {
		return PathBuf::from(path).join(".config").join(APP_DIR);
	}

	PathBuf::from(".rounds_timeline")
}

fn absolutize(path: PathBuf) -> PathBuf {
	let path = if path.is_absolute() {
		path
	} else if let Ok(cwd) = env::current_dir() {
		cwd.join(path)
	} else {
		path
	};

	if path.exists() {
		fs::canonicalize(&path).unwrap_or(path)
	} else {
		path
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use chrono::{NaiveDate, Weekday};

	use super::{EngineConfig, load_config, resolve_schedule_path};
	use crate::domain::ViewMode;
	use crate::error::ConfigError;
	use crate::layout::RangePolicy;
	use crate::rows::{LaneOrder, LayoutMode};

	#[test]
	fn empty_config_uses_defaults() {
		let config = EngineConfig::from_toml_str("").expect("empty config parses");
		assert_eq!(config, EngineConfig::default());
		assert_eq!(config.first_day_of_week, Weekday::Sun);
	}

	#[test]
	fn parses_every_key() {
		let raw = r#"
first_day_of_week = "mon"
default_view = "month"
layout = "timeline"
range_policy = "clamp_to_window"
lane_order = "alphabetical"

[zoom]
min = 0.25
max = 4.0
"#;
		let config = EngineConfig::from_toml_str(raw).expect("config parses");
		assert_eq!(config.first_day_of_week, Weekday::Mon);
		assert_eq!(config.default_view, ViewMode::Month);
		assert_eq!(config.layout, LayoutMode::Timeline);
		assert_eq!(config.range_policy, RangePolicy::ClampToWindow);
		assert_eq!(config.lane_order, LaneOrder::Alphabetical);
		assert_eq!(config.zoom.max, 4.0);
		assert_eq!(config.zoom.step, 0.25);
	}

	#[test]
	fn rejects_unknown_view() {
		assert!(matches!(
			EngineConfig::from_toml_str("default_view = \"year\""),
			Err(ConfigError::TomlDecode(_))
		));
	}

	#[test]
	fn navigation_is_seeded_from_config() {
		let config = EngineConfig::from_toml_str("first_day_of_week = \"monday\"\ndefault_view = \"week\"")
			.expect("config parses");
		let nav = config.navigation(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
		assert_eq!(nav.window().start, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
	}

	#[test]
	fn explicit_config_path_must_exist() {
		let mut path = std::env::temp_dir();
		path.push(format!("rounds_timeline_missing_config_{}.toml", std::process::id()));
		assert!(matches!(load_config(Some(path)), Err(ConfigError::Io { .. })));
	}

	#[test]
	fn explicit_config_path_is_read() {
		let mut path = std::env::temp_dir();
		path.push(format!("rounds_timeline_config_{}.toml", std::process::id()));
		fs::write(&path, "layout = \"timeline\"\n").expect("write should succeed");
		let config = load_config(Some(path.clone())).expect("config loads");
		assert_eq!(config.layout, LayoutMode::Timeline);
		let _ = fs::remove_file(path);
	}

	#[test]
	fn cli_schedule_path_wins() {
		let path = resolve_schedule_path(Some("rounds.schedule".into())).expect("path resolves");
		assert!(path.is_absolute());
		assert!(path.ends_with("rounds.schedule"));
	}
}
