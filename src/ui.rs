use std::error::Error;
use std::io;
use std::time::Duration as StdDuration;

use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, ExecutableCommand};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};

use rounds_timeline::config::EngineConfig;
use rounds_timeline::domain::{RoundPriority, RoundStatus, ScheduledEvent, ViewMode};
use rounds_timeline::engine::{TimelineEngine, TimelineView};
use rounds_timeline::filter::{EventFilter, departments_of};
use rounds_timeline::layout::{LayoutEntry, LayoutOptions, RangePolicy};
use rounds_timeline::navigation::{Navigation, NavigationController};
use rounds_timeline::rows::LayoutMode;
use rounds_timeline::storage::LoadedSchedule;

const LABEL_WIDTH: usize = 20;
const WEEK_SLOT_COLUMNS: f64 = 8.0;
const MONTH_SLOT_COLUMNS: f64 = 3.0;
const FOCUSED_PANEL_BORDER_COLOR: Color = Color::Yellow;
const HIGHLIGHT_BACKGROUND_COLOR: Color = Color::Rgb(42, 45, 52);
const TODAY_COLOR: Color = Color::LightYellow;

/// Fixed look for each round status.
struct StatusStyle {
	glyph: char,
	label: &'static str,
	color: Color,
}

const STATUS_STYLES: [StatusStyle; 4] = [
	StatusStyle {
		glyph: '=',
		label: "scheduled",
		color: Color::LightBlue,
	},
	StatusStyle {
		glyph: '~',
		label: "in progress",
		color: Color::LightYellow,
	},
	StatusStyle {
		glyph: '#',
		label: "completed",
		color: Color::LightGreen,
	},
	StatusStyle {
		glyph: '!',
		label: "overdue",
		color: Color::LightRed,
	},
];

fn status_style(status: RoundStatus) -> &'static StatusStyle {
	match status {
		RoundStatus::Scheduled => &STATUS_STYLES[0],
		RoundStatus::InProgress => &STATUS_STYLES[1],
		RoundStatus::Completed => &STATUS_STYLES[2],
		RoundStatus::Overdue => &STATUS_STYLES[3],
	}
}

fn priority_marker(priority: RoundPriority) -> (&'static str, Style) {
	match priority {
		RoundPriority::Low => ("low", Style::default().fg(Color::DarkGray)),
		RoundPriority::Medium => ("med", Style::default()),
		RoundPriority::High => ("HIGH", Style::default().fg(Color::Yellow)),
		RoundPriority::Urgent => (
			"URGENT",
			Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
		),
	}
}

pub fn run_dashboard(schedule: &LoadedSchedule, config: &EngineConfig) -> Result<(), Box<dyn Error>> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, schedule, config);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	schedule: &LoadedSchedule,
	config: &EngineConfig,
) -> Result<(), Box<dyn Error>> {
	let today = Local::now().date_naive();
	let mut app = App::new(config, today, schedule);

	loop {
		let today = Local::now().date_naive();
		let view = TimelineEngine::new(app.options).compute(&schedule.events, &app.nav, &app.filter, today);
		app.clamp_selection(&view);
		terminal.draw(|frame| draw_dashboard(frame, &app, &view, schedule))?;

		if event::poll(StdDuration::from_millis(250))? {
			if let CEvent::Key(key) = event::read()? {
				if key.kind != KeyEventKind::Press {
					continue;
				}

				let should_quit = match &app.mode {
					InputMode::Prompt(_) => handle_prompt_key(&mut app, key.code),
					InputMode::Select(_) => handle_select_key(&mut app, key.code),
					InputMode::Normal => handle_normal_key(&mut app, key.code, today),
				};

				if should_quit {
					break;
				}
			}
		}
	}

	Ok(())
}

fn draw_dashboard(frame: &mut Frame, app: &App, view: &TimelineView, schedule: &LoadedSchedule) {
	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Length(3), Constraint::Min(8), Constraint::Length(5)])
		.split(frame.area());

	let body = Layout::default()
		.direction(Direction::Horizontal)
		.constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
		.split(layout[1]);

	render_header(frame, layout[0], app, view, schedule);
	render_chart_panel(frame, body[0], app, view, &schedule.events);
	render_details_panel(frame, body[1], app, view, &schedule.events);
	render_footer(frame, layout[2], app);

	if let InputMode::Select(select) = &app.mode {
		render_select_popup(frame, select, &app.filter);
	}
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, view: &TimelineView, schedule: &LoadedSchedule) {
	let facility = schedule.header.facility.as_deref().unwrap_or("Inspection rounds");
	let filter_text = if app.filter.is_empty() {
		"none".to_string()
	} else {
		let mut parts = Vec::new();
		if !app.filter.search_term.trim().is_empty() {
			parts.push(format!("\"{}\"", app.filter.search_term.trim()));
		}
		if !app.filter.departments.is_empty() {
			parts.push(app.filter.departments.iter().cloned().collect::<Vec<_>>().join(", "));
		}
		parts.join(" + ")
	};

	let line = Line::from(vec![
		Span::styled(facility.to_string(), Style::default().add_modifier(Modifier::BOLD)),
		Span::raw(format!(
			" | {} {} - {} | {} | {} | zoom {:.2}x | {} of {} rounds | filter {}",
			view.view_mode,
			view.window.start.format("%d %b %Y"),
			view.window.end.format("%d %b %Y"),
			app.options.mode,
			app.options.range_policy,
			view.zoom,
			view.filtered_ids.len(),
			schedule.events.len(),
			filter_text,
		)),
	]);
	let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Rounds"));
	frame.render_widget(header, area);
}

fn render_chart_panel(frame: &mut Frame, area: Rect, app: &App, view: &TimelineView, events: &[ScheduledEvent]) {
	let block = Block::default()
		.borders(Borders::ALL)
		.title(match app.options.mode {
			LayoutMode::Gantt => "Gantt",
			LayoutMode::Timeline => "Timeline by department",
		})
		.border_style(Style::default().fg(FOCUSED_PANEL_BORDER_COLOR));
	let inner = block.inner(area);
	frame.render_widget(block, area);

	let parts = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Length(1), Constraint::Min(1)])
		.split(inner);

	let slot_columns = slot_columns(view.view_mode, view.zoom);
	frame.render_widget(Paragraph::new(day_header_line(view, slot_columns)), parts[0]);

	let items = view
		.layout
		.lanes
		.iter()
		.enumerate()
		.map(|(row_index, lane)| {
			let mut spans = vec![Span::raw(fit(&lane.label, LABEL_WIDTH))];
			match app.options.mode {
				LayoutMode::Gantt => {
					let entry = view.layout.entries.iter().find(|entry| entry.row_index == row_index);
					let event = lane.event_ids.first().and_then(|id| view.event(events, id));
					spans.extend(gantt_bar_spans(entry, event, view.slots.len() * slot_columns));
				}
				LayoutMode::Timeline => {
					spans.extend(day_cell_spans(&lane.days, events, view, slot_columns));
				}
			}
			ListItem::new(Line::from(spans))
		})
		.collect::<Vec<_>>();

	let mut state = ListState::default();
	if !items.is_empty() {
		state.select(Some(app.selected_row.min(items.len() - 1)));
	}

	let list = List::new(if items.is_empty() {
		vec![ListItem::new("(no rounds match the current filters)")]
	} else {
		items
	})
	.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR).add_modifier(Modifier::BOLD));
	frame.render_stateful_widget(list, parts[1], &mut state);
}

fn day_header_line(view: &TimelineView, slot_columns: usize) -> Line<'static> {
	let mut spans = vec![Span::raw(fit("", LABEL_WIDTH))];
	for (index, slot) in view.slots.iter().enumerate() {
		let label = if slot_columns >= 6 {
			format!("{} {:>2}", slot.date.format("%a"), slot.date.day())
		} else {
			format!("{:>2}", slot.date.day())
		};
		let mut style = if slot.date.weekday().num_days_from_monday() >= 5 {
			Style::default().fg(Color::DarkGray)
		} else {
			Style::default()
		};
		if view.today_index == Some(index) {
			style = style.fg(Color::Black).bg(TODAY_COLOR).add_modifier(Modifier::BOLD);
		}
		spans.push(Span::styled(fit(&label, slot_columns), style));
	}
	Line::from(spans)
}

fn gantt_bar_spans(
	entry: Option<&LayoutEntry>,
	event: Option<&ScheduledEvent>,
	chart_columns: usize,
) -> Vec<Span<'static>> {
	let (Some(entry), Some(event)) = (entry, event) else {
		return vec![Span::styled(
			" ".repeat(chart_columns),
			Style::default().fg(Color::DarkGray),
		)];
	};

	let (left, width) = bar_columns(entry, chart_columns);
	let style = status_style(event.status);
	let mut bar = String::with_capacity(width);
	for index in 0..width {
		let glyph = if index == 0 && entry.clipped_start {
			'<'
		} else if index + 1 == width && entry.clipped_end {
			'>'
		} else {
			style.glyph
		};
		bar.push(glyph);
	}

	let right = chart_columns.saturating_sub(left + width);
	vec![
		Span::raw(" ".repeat(left)),
		Span::styled(bar, Style::default().fg(style.color).add_modifier(Modifier::BOLD)),
		Span::raw(" ".repeat(right)),
	]
}

/// Converts layout percentages into terminal columns.
fn bar_columns(entry: &LayoutEntry, chart_columns: usize) -> (usize, usize) {
	let columns = chart_columns as f64;
	let left = ((entry.left_percent / 100.0) * columns).round() as usize;
	let width = ((entry.width_percent / 100.0) * columns).round().max(1.0) as usize;
	let left = left.min(chart_columns.saturating_sub(1));
	(left, width.min(chart_columns - left))
}

fn day_cell_spans(
	days: &[Vec<String>],
	events: &[ScheduledEvent],
	view: &TimelineView,
	slot_columns: usize,
) -> Vec<Span<'static>> {
	days.iter()
		.map(|ids| {
			let Some(first) = ids.first().and_then(|id| view.event(events, id)) else {
				return Span::styled(fit(" .", slot_columns), Style::default().fg(Color::DarkGray));
			};
			let style = status_style(first.status);
			let text = if ids.len() == 1 {
				format!(" {}", style.glyph)
			} else {
				format!(" {}{}", style.glyph, ids.len())
			};
			Span::styled(
				fit(&text, slot_columns),
				Style::default().fg(style.color).add_modifier(Modifier::BOLD),
			)
		})
		.collect()
}

fn render_details_panel(frame: &mut Frame, area: Rect, app: &App, view: &TimelineView, events: &[ScheduledEvent]) {
	let mut lines = Vec::new();
	match view.layout.lanes.get(app.selected_row) {
		None => lines.push(Line::from("(nothing selected)")),
		Some(lane) => {
			lines.push(Line::from(Span::styled(
				lane.label.clone(),
				Style::default().add_modifier(Modifier::BOLD),
			)));
			for id in &lane.event_ids {
				let Some(event) = view.event(events, id) else {
					continue;
				};
				let style = status_style(event.status);
				let (priority, priority_style) = priority_marker(event.priority);
				lines.push(Line::from(""));
				lines.push(Line::from(vec![
					Span::styled(format!("{} ", style.glyph), Style::default().fg(style.color)),
					Span::raw(event.title.clone()),
				]));
				lines.push(Line::from(format!(
					"  {} -> {}",
					event.start_date.format("%d %b"),
					event.end_date.format("%d %b")
				)));
				lines.push(Line::from(vec![
					Span::styled(format!("  {}", style.label), Style::default().fg(style.color)),
					Span::raw(" | "),
					Span::styled(priority, priority_style),
					Span::raw(format!(" | {}", event.department)),
				]));
				if !event.assigned_to.is_empty() {
					lines.push(Line::from(format!("  team: {}", event.assigned_to.join(", "))));
				}
				if !view.layout.entries.iter().any(|entry| entry.event_id == event.id) {
					lines.push(Line::from(Span::styled(
						"  (no bar in this window)",
						Style::default().fg(Color::DarkGray),
					)));
				}
			}
		}
	}

	if !view.skipped.is_empty() {
		lines.push(Line::from(""));
		lines.push(Line::from(Span::styled(
			format!("{} round(s) hidden: end before start", view.skipped.len()),
			Style::default().fg(Color::LightRed),
		)));
	}

	let panel = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Details"));
	frame.render_widget(panel, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
	let footer_lines = match &app.mode {
		InputMode::Normal => vec![
			Line::from("n/p or arrows move window | t today | w week | m month | g gantt/timeline | r drop/clamp | q quit"),
			Line::from("j/k select row | +/- zoom | / search | d departments | c clear filters"),
			Line::from(app.status.clone()),
		],
		InputMode::Prompt(prompt) => vec![
			Line::from(prompt.title.clone()),
			Line::from(format!("> {}", prompt.input)),
			Line::from("Enter apply | Esc cancel"),
		],
		InputMode::Select(select) => vec![
			Line::from(select.title.clone()),
			Line::from(format!(
				"Selected: {}",
				select.selected_option().map(String::as_str).unwrap_or("(none)")
			)),
			Line::from("j/k or arrows move | Enter toggle | Esc done"),
		],
	};

	let footer = Paragraph::new(footer_lines).block(Block::default().borders(Borders::ALL).title("Shortcuts"));
	frame.render_widget(footer, area);
}

fn render_select_popup(frame: &mut Frame, select: &SelectState, filter: &EventFilter) {
	let area = centered_rect(50, 55, frame.area());
	frame.render_widget(Clear, area);

	let items = if select.options.is_empty() {
		vec![ListItem::new("(no departments)")]
	} else {
		select
			.options
			.iter()
			.map(|department| {
				let mark = if filter.departments.contains(department) { "[x]" } else { "[ ]" };
				ListItem::new(format!("{mark} {department}"))
			})
			.collect::<Vec<_>>()
	};

	let list = List::new(items)
		.block(Block::default().borders(Borders::ALL).title(select.title.clone()))
		.highlight_symbol(">> ")
		.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR));

	let mut state = ListState::default();
	if !select.options.is_empty() {
		state.select(Some(select.selected.min(select.options.len().saturating_sub(1))));
	}
	frame.render_stateful_widget(list, area, &mut state);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
	let popup_layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([
			Constraint::Percentage((100 - percent_y) / 2),
			Constraint::Percentage(percent_y),
			Constraint::Percentage((100 - percent_y) / 2),
		])
		.split(area);
	Layout::default()
		.direction(Direction::Horizontal)
		.constraints([
			Constraint::Percentage((100 - percent_x) / 2),
			Constraint::Percentage(percent_x),
			Constraint::Percentage((100 - percent_x) / 2),
		])
		.split(popup_layout[1])[1]
}

fn handle_normal_key(app: &mut App, code: KeyCode, today: NaiveDate) -> bool {
	match code {
		KeyCode::Char('q') => return true,
		KeyCode::Char('n') | KeyCode::Right => app.navigate(Navigation::Next, today),
		KeyCode::Char('p') | KeyCode::Left => app.navigate(Navigation::Previous, today),
		KeyCode::Char('t') => app.navigate(Navigation::Today, today),
		KeyCode::Char('w') => {
			app.nav.set_view_mode(ViewMode::Week);
			app.status = "Week view".to_string();
		}
		KeyCode::Char('m') => {
			app.nav.set_view_mode(ViewMode::Month);
			app.status = "Month view".to_string();
		}
		KeyCode::Char('g') => {
			app.options.mode = app.options.mode.toggled();
			app.selected_row = 0;
			app.status = format!("{} layout", app.options.mode);
		}
		KeyCode::Char('r') => {
			app.options.range_policy = match app.options.range_policy {
				RangePolicy::DropOutOfRange => RangePolicy::ClampToWindow,
				RangePolicy::ClampToWindow => RangePolicy::DropOutOfRange,
			};
			app.status = format!("Out-of-window rounds: {}", app.options.range_policy);
		}
		KeyCode::Char('+') | KeyCode::Char('=') => {
			app.nav.zoom_in();
			app.status = format!("Zoom {:.2}x", app.nav.zoom());
		}
		KeyCode::Char('-') => {
			app.nav.zoom_out();
			app.status = format!("Zoom {:.2}x", app.nav.zoom());
		}
		KeyCode::Down | KeyCode::Char('j') => app.selected_row = app.selected_row.saturating_add(1),
		KeyCode::Up | KeyCode::Char('k') => app.selected_row = app.selected_row.saturating_sub(1),
		KeyCode::Char('/') => {
			let mut prompt = PromptState::new("Search title or department");
			prompt.input = app.filter.search_term.clone();
			app.mode = InputMode::Prompt(prompt);
		}
		KeyCode::Char('d') => {
			app.mode = InputMode::Select(SelectState::new("Departments", app.department_options.clone()));
		}
		KeyCode::Char('c') => {
			app.filter.clear();
			app.selected_row = 0;
			app.status = "Filters cleared".to_string();
		}
		_ => {}
	}

	false
}

fn handle_prompt_key(app: &mut App, code: KeyCode) -> bool {
	match code {
		KeyCode::Esc => {
			app.mode = InputMode::Normal;
			app.status = "Search cancelled".to_string();
		}
		KeyCode::Backspace => {
			if let InputMode::Prompt(prompt) = &mut app.mode {
				prompt.input.pop();
			}
		}
		KeyCode::Char(value) => {
			if let InputMode::Prompt(prompt) = &mut app.mode {
				prompt.input.push(value);
			}
		}
		KeyCode::Enter => {
			if let InputMode::Prompt(prompt) = std::mem::replace(&mut app.mode, InputMode::Normal) {
				app.filter.set_search(prompt.input.trim());
				app.selected_row = 0;
				app.status = if prompt.input.trim().is_empty() {
					"Search cleared".to_string()
				} else {
					format!("Searching for \"{}\"", prompt.input.trim())
				};
			}
		}
		_ => {}
	}

	false
}

fn handle_select_key(app: &mut App, code: KeyCode) -> bool {
	match code {
		KeyCode::Esc => {
			app.mode = InputMode::Normal;
			app.selected_row = 0;
			app.status = if app.filter.departments.is_empty() {
				"All departments".to_string()
			} else {
				format!("{} department(s) selected", app.filter.departments.len())
			};
		}
		KeyCode::Up | KeyCode::Char('k') => {
			if let InputMode::Select(select) = &mut app.mode {
				select.move_selection(-1);
			}
		}
		KeyCode::Down | KeyCode::Char('j') => {
			if let InputMode::Select(select) = &mut app.mode {
				select.move_selection(1);
			}
		}
		KeyCode::Enter | KeyCode::Char(' ') => {
			let department = match &app.mode {
				InputMode::Select(select) => select.selected_option().cloned(),
				_ => None,
			};
			if let Some(department) = department {
				app.filter.toggle_department(&department);
			}
		}
		_ => {}
	}

	false
}

/// Terminal columns per day; zoom scales this and nothing else.
fn slot_columns(view_mode: ViewMode, zoom: f64) -> usize {
	let base = match view_mode {
		ViewMode::Week => WEEK_SLOT_COLUMNS,
		ViewMode::Month => MONTH_SLOT_COLUMNS,
	};
	(base * zoom).round().max(1.0) as usize
}

fn fit(text: &str, width: usize) -> String {
	let mut out = text.chars().take(width).collect::<String>();
	let used = out.chars().count();
	out.extend(std::iter::repeat_n(' ', width - used));
	out
}

#[derive(Debug, Clone)]
struct PromptState {
	title: String,
	input: String,
}

impl PromptState {
	fn new(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			input: String::new(),
		}
	}
}

#[derive(Debug, Clone)]
struct SelectState {
	title: String,
	options: Vec<String>,
	selected: usize,
}

impl SelectState {
	fn new(title: impl Into<String>, options: Vec<String>) -> Self {
		Self {
			title: title.into(),
			options,
			selected: 0,
		}
	}

	fn move_selection(&mut self, delta: i32) {
		if self.options.is_empty() {
			self.selected = 0;
			return;
		}

		if delta > 0 {
			self.selected = (self.selected + delta as usize).min(self.options.len() - 1);
		} else {
			self.selected = self.selected.saturating_sub(delta.unsigned_abs() as usize);
		}
	}

	fn selected_option(&self) -> Option<&String> {
		self.options.get(self.selected)
	}
}

#[derive(Debug, Clone)]
enum InputMode {
	Normal,
	Prompt(PromptState),
	Select(SelectState),
}

#[derive(Debug, Clone)]
struct App {
	nav: NavigationController,
	filter: EventFilter,
	options: LayoutOptions,
	department_options: Vec<String>,
	selected_row: usize,
	mode: InputMode,
	status: String,
}

impl App {
	fn new(config: &EngineConfig, today: NaiveDate, schedule: &LoadedSchedule) -> Self {
		let mut department_options = schedule.header.departments.clone();
		for department in departments_of(&schedule.events) {
			if !department_options.contains(&department) {
				department_options.push(department);
			}
		}

		let status = if schedule.skipped.is_empty() {
			"Ready".to_string()
		} else {
			format!("Ready | {} record(s) skipped while loading", schedule.skipped.len())
		};

		Self {
			nav: config.navigation(today),
			filter: EventFilter::default(),
			options: config.layout_options(),
			department_options,
			selected_row: 0,
			mode: InputMode::Normal,
			status,
		}
	}

	fn navigate(&mut self, navigation: Navigation, today: NaiveDate) {
		self.nav.navigate(navigation, today);
		self.status = format!("Anchor {}", self.nav.anchor().format("%a %d %b %Y"));
	}

	fn clamp_selection(&mut self, view: &TimelineView) {
		if view.layout.lanes.is_empty() {
			self.selected_row = 0;
		} else {
			self.selected_row = self.selected_row.min(view.layout.lanes.len() - 1);
		}
	}
}
