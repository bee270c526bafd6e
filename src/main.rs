mod ui;

use std::error::Error;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rounds_timeline::config::{load_config, resolve_schedule_path};
use rounds_timeline::domain::{ScheduledEvent, ViewMode};
use rounds_timeline::engine::{TimelineEngine, TimelineView};
use rounds_timeline::filter::EventFilter;
use rounds_timeline::layout::RangePolicy;
use rounds_timeline::rows::LayoutMode;
use rounds_timeline::slots::generate_slots;
use rounds_timeline::storage::{LoadedSchedule, load_schedule};
use rounds_timeline::window::{compute_window, format_date, parse_date};

use crate::ui::run_dashboard;

const LOG_ENV: &str = "ROUNDS_TIMELINE_LOG";

#[derive(Debug, Parser)]
#[command(name = "rounds-timeline", about = "Timeline and Gantt view of inspection rounds")]
struct Cli {
	#[arg(long, env = "ROUNDS_SCHEDULE")]
	schedule: Option<PathBuf>,
	#[arg(long)]
	config: Option<PathBuf>,
	#[arg(long)]
	log_file: Option<PathBuf>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Args)]
struct WindowArgs {
	/// Date inside the window, YYYY-MM-DD. Defaults to today.
	#[arg(long)]
	anchor: Option<String>,
	#[arg(long)]
	mode: Option<ViewMode>,
	#[arg(long)]
	json: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
	Dashboard,
	Window(WindowArgs),
	Slots(WindowArgs),
	Layout {
		#[command(flatten)]
		window: WindowArgs,
		#[arg(long)]
		layout: Option<LayoutMode>,
		#[arg(long)]
		search: Option<String>,
		#[arg(long = "department")]
		departments: Vec<String>,
		#[arg(long)]
		policy: Option<RangePolicy>,
	},
	Check,
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();
	let command = cli.command.unwrap_or(Command::Dashboard);
	init_logging(cli.log_file.as_ref(), matches!(command, Command::Dashboard))?;

	let config = load_config(cli.config)?;
	let today = Local::now().date_naive();

	match command {
		Command::Dashboard => {
			let schedule = open_schedule(cli.schedule)?;
			run_dashboard(&schedule, &config)?;
		}
		Command::Window(args) => {
			let anchor = resolve_anchor(args.anchor.as_deref(), today)?;
			let mode = args.mode.unwrap_or(config.default_view);
			let window = compute_window(anchor, mode, config.first_day_of_week);
			if args.json {
				println!("{}", serde_json::to_string_pretty(&window)?);
			} else {
				println!(
					"{} {} -> {} ({} days)",
					mode,
					format_date(window.start),
					format_date(window.end),
					window.day_count()
				);
			}
		}
		Command::Slots(args) => {
			let anchor = resolve_anchor(args.anchor.as_deref(), today)?;
			let mode = args.mode.unwrap_or(config.default_view);
			let slots = generate_slots(&compute_window(anchor, mode, config.first_day_of_week));
			if args.json {
				println!("{}", serde_json::to_string_pretty(&slots)?);
			} else {
				for (index, slot) in slots.iter().enumerate() {
					let marker = if slot.date == today { " *" } else { "" };
					println!("{index:>2}  {}  {}{marker}", format_date(slot.date), slot.date.format("%a"));
				}
			}
		}
		Command::Layout {
			window,
			layout,
			search,
			departments,
			policy,
		} => {
			let schedule = open_schedule(cli.schedule)?;
			let anchor = resolve_anchor(window.anchor.as_deref(), today)?;

			let mut options = config.layout_options();
			if let Some(layout) = layout {
				options.mode = layout;
			}
			if let Some(policy) = policy {
				options.range_policy = policy;
			}

			let mut nav = config.navigation(anchor);
			if let Some(mode) = window.mode {
				nav.set_view_mode(mode);
			}
			let filter = EventFilter::new(search.unwrap_or_default(), departments);
			let view = TimelineEngine::new(options).compute(&schedule.events, &nav, &filter, today);

			if window.json {
				println!("{}", serde_json::to_string_pretty(&view)?);
			} else {
				print_layout(&view, &schedule.events, options.mode);
			}
		}
		Command::Check => {
			let schedule = open_schedule(cli.schedule)?;
			print_check(&schedule);
		}
	}

	Ok(())
}

fn init_logging(log_file: Option<&PathBuf>, owns_terminal: bool) -> Result<(), Box<dyn Error>> {
	let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

	match log_file {
		Some(path) => {
			let file = OpenOptions::new().create(true).append(true).open(path)?;
			tracing_subscriber::fmt()
				.with_env_filter(filter)
				.with_ansi(false)
				.with_writer(Mutex::new(file))
				.init();
		}
		None if owns_terminal => {}
		None => {
			tracing_subscriber::fmt()
				.with_env_filter(filter)
				.with_writer(std::io::stderr)
				.init();
		}
	}

	Ok(())
}

fn open_schedule(cli_path: Option<PathBuf>) -> Result<LoadedSchedule, Box<dyn Error>> {
	let path = resolve_schedule_path(cli_path)?;
	let schedule = load_schedule(&path).map_err(|err| format!("{}: {err}", path.display()))?;
	Ok(schedule)
}

fn resolve_anchor(input: Option<&str>, today: NaiveDate) -> Result<NaiveDate, Box<dyn Error>> {
	match input {
		Some(raw) => Ok(parse_date(raw)?),
		None => Ok(today),
	}
}

fn print_layout(view: &TimelineView, events: &[ScheduledEvent], mode: LayoutMode) {
	println!(
		"{} {} -> {} | {} slots | {} of {} rounds match",
		view.view_mode,
		format_date(view.window.start),
		format_date(view.window.end),
		view.slots.len(),
		view.filtered_ids.len(),
		events.len()
	);

	for (row_index, lane) in view.layout.lanes.iter().enumerate() {
		match mode {
			LayoutMode::Gantt => {
				let Some(entry) = view.layout.entries.iter().find(|entry| entry.row_index == row_index) else {
					println!("{row_index:>3}  {:<32}  (outside window)", lane.label);
					continue;
				};
				println!(
					"{row_index:>3}  {:<32}  slots {:>2}..={:<2}  left {:>6.2}%  width {:>6.2}%{}{}",
					lane.label,
					entry.start_slot_index,
					entry.end_slot_index,
					entry.left_percent,
					entry.width_percent,
					if entry.clipped_start { "  <clipped" } else { "" },
					if entry.clipped_end { "  clipped>" } else { "" },
				);
			}
			LayoutMode::Timeline => {
				let cells = lane
					.days
					.iter()
					.map(|ids| if ids.is_empty() { ".".to_string() } else { ids.len().to_string() })
					.collect::<Vec<_>>()
					.join(" ");
				println!("{row_index:>3}  {:<24}  {cells}", lane.label);
			}
		}
	}

	for error in &view.skipped {
		println!("skipped: {error}");
	}
}

fn print_check(schedule: &LoadedSchedule) {
	if let Some(facility) = &schedule.header.facility {
		println!("facility: {facility}");
	}
	println!("rounds loaded: {}", schedule.events.len());

	for skipped in &schedule.skipped {
		println!("line {}: round {} skipped: {}", skipped.line, skipped.id, skipped.error);
	}

	let mut inconsistent = 0;
	for event in &schedule.events {
		if let Err(err) = event.check_span() {
			inconsistent += 1;
			println!("{err}");
		}
	}

	if schedule.skipped.is_empty() && inconsistent == 0 {
		println!("no problems found");
	} else {
		println!(
			"{} record(s) skipped, {} round(s) with end before start",
			schedule.skipped.len(),
			inconsistent
		);
	}
}
