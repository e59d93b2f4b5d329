use std::collections::HashSet;
use std::error::Error;
use std::io;
use std::time::Duration as StdDuration;

use chrono::{Duration, Local, NaiveDate};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::terminal::{
	EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, window_size,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};

use crate::activity::{self, ActivityAction, ActivityFeedState};
use crate::api::{FitnessApi, LocalJournal};
use crate::calendar::{self, CalendarAction, CalendarState, first_day_of_month, month_bounds, month_key};
use crate::records::{PainScore, RecordKind, SleepScore, TemporalRecord, Workout, parse_record_date};
use crate::view::{
	DualModeView, ViewMode, group_items_by_date, render_month_grid, render_week_vertical,
	shift_month,
};

const FOCUSED_PANEL_BORDER_COLOR: Color = Color::Yellow;
const INACTIVE_PANEL_BORDER_COLOR: Color = Color::DarkGray;
const HIGHLIGHT_BACKGROUND_COLOR: Color = Color::Rgb(42, 45, 52);
const APPROX_CELL_WIDTH_PX: u16 = 8;

pub fn run_dashboard(backend: &mut LocalJournal) -> Result<(), Box<dyn Error>> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend_io = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend_io)?;

	let result = run_event_loop(&mut terminal, backend);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	backend: &mut LocalJournal,
) -> Result<(), Box<dyn Error>> {
	let today = Local::now().date_naive();
	let initial_width = viewport_width(terminal.size()?.width);
	let mut calendar_state = CalendarState::new(today);
	let mut feed_state = ActivityFeedState::default();
	let mut app = App::new(today, initial_width);

	load_initial_feed(backend, &mut feed_state, &mut app);

	loop {
		if app.shown_month != calendar_state.current_month {
			app.failed_months.clear();
			app.shown_month = calendar_state.current_month;
		}
		let month = calendar_state.current_month;
		ensure_partition_loaded(backend, &mut calendar_state, month, &mut app.failed_months);
		if app.view.mode() == ViewMode::Vertical {
			let week_end = app.view.week_start() + Duration::days(6);
			ensure_partition_loaded(backend, &mut calendar_state, week_end, &mut app.failed_months);
		}
		app.clamp_feed_selection(&feed_state);
		terminal.draw(|frame| draw_dashboard(frame, &app, &calendar_state, &feed_state))?;

		if event::poll(StdDuration::from_millis(250))? {
			match event::read()? {
				CEvent::Key(key) => {
					if key.kind != KeyEventKind::Press {
						continue;
					}

					let should_quit = match &app.mode {
						InputMode::Prompt(_) => handle_prompt_key(
							&mut app,
							key.code,
							backend,
							&mut calendar_state,
							&mut feed_state,
						),
						InputMode::Select(_) => handle_select_key(
							&mut app,
							key.code,
							backend,
							&mut calendar_state,
							&mut feed_state,
						),
						InputMode::Normal => handle_normal_key(
							&mut app,
							key.code,
							backend,
							&mut calendar_state,
							&mut feed_state,
						),
					};

					if should_quit {
						break;
					}
				}
				CEvent::Resize(columns, _) => {
					app.view
						.handle_resize(viewport_width(columns), calendar_state.current_month);
				}
				_ => {}
			}
		}
	}

	Ok(())
}

fn viewport_width(columns: u16) -> u16 {
	match window_size() {
		Ok(size) if size.width > 0 => size.width,
		_ => columns.saturating_mul(APPROX_CELL_WIDTH_PX),
	}
}

fn ensure_partition_loaded(
	backend: &impl FitnessApi,
	state: &mut CalendarState,
	day: NaiveDate,
	failed_months: &mut HashSet<String>,
) {
	let key = month_key(day);
	if state.has_fetched(&key) || state.loading || failed_months.contains(&key) {
		return;
	}

	*state = calendar::reduce(state, CalendarAction::SetLoading(true));
	let (start, end) = month_bounds(day);
	match backend.fetch_month_range(start, end) {
		Ok(data) => {
			*state = calendar::reduce(state, CalendarAction::SetError(None));
			*state = calendar::reduce(
				state,
				CalendarAction::AppendMonthData {
					month_key: key.clone(),
					workouts: data.workouts,
					pain_scores: data.pain_scores,
					sleep_scores: data.sleep_scores,
				},
			);
			*state = calendar::reduce(state, CalendarAction::MarkMonthFetched(key));
		}
		Err(err) => {
			failed_months.insert(key);
			*state = calendar::reduce(
				state,
				CalendarAction::SetError(Some(format!("month fetch failed: {err}"))),
			);
		}
	}
	*state = calendar::reduce(state, CalendarAction::SetLoading(false));
}

fn load_initial_feed(backend: &LocalJournal, state: &mut ActivityFeedState, app: &mut App) {
	match backend.fetch_activity_page(0) {
		Ok(page) => {
			app.feed_month_label = page.month_label;
			*state = activity::reduce(
				state,
				ActivityAction::LoadInitial {
					items: page.items,
					total: page.total,
				},
			);
		}
		Err(err) => {
			*state = activity::reduce(
				state,
				ActivityAction::SetError(Some(format!("feed fetch failed: {err}"))),
			);
		}
	}
}

fn load_more_feed(backend: &LocalJournal, state: &mut ActivityFeedState, app: &mut App) {
	if !state.has_more() {
		app.status = "No more activity to load".to_string();
		return;
	}

	*state = activity::reduce(state, ActivityAction::SetLoadingMore(true));
	match backend.fetch_activity_page(state.offset + 1) {
		Ok(page) => {
			if page.month_label.is_some() {
				app.feed_month_label = page.month_label;
			}
			*state = activity::reduce(
				state,
				ActivityAction::AppendPage {
					items: page.items,
					total: Some(page.total),
				},
			);
			app.status = format!("Loaded page {}", state.offset);
		}
		Err(err) => {
			*state = activity::reduce(state, ActivityAction::SetLoadingMore(false));
			*state = activity::reduce(
				state,
				ActivityAction::SetError(Some(format!("feed fetch failed: {err}"))),
			);
		}
	}
}

fn draw_dashboard(
	frame: &mut Frame,
	app: &App,
	calendar_state: &CalendarState,
	feed_state: &ActivityFeedState,
) {
	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Min(12), Constraint::Length(5)])
		.split(frame.area());

	let body = Layout::default()
		.direction(Direction::Horizontal)
		.constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
		.split(layout[0]);

	render_calendar_region(frame, body[0], app, calendar_state);
	render_feed_panel(frame, body[1], app, feed_state);
	render_footer(frame, layout[1], app, calendar_state, feed_state);

	if feed_state.add_menu_open {
		render_add_menu(frame);
	}

	if let InputMode::Select(select) = &app.mode {
		render_select_popup(frame, select);
	}
}

fn render_calendar_region(frame: &mut Frame, area: Rect, app: &App, state: &CalendarState) {
	let border = border_style(app.focus == FocusPane::Calendar);

	if let Some(error) = &state.error {
		let block = Block::default()
			.borders(Borders::ALL)
			.title("Calendar")
			.border_style(border);
		let paragraph = Paragraph::new(Line::from(Span::styled(
			error.clone(),
			Style::default().fg(Color::LightRed),
		)))
		.block(block);
		frame.render_widget(paragraph, area);
		return;
	}

	let items = calendar_items(state);
	let grouped = group_items_by_date(&items);

	match app.view.mode() {
		ViewMode::Grid => render_month_grid(
			frame,
			area,
			state.current_month,
			app.selected_day,
			&grouped,
			border,
			&grid_item_marker,
		),
		ViewMode::Vertical => render_week_vertical(
			frame,
			area,
			app.view.week_start(),
			app.selected_day,
			&grouped,
			border,
			&vertical_item_line,
		),
	}
}

fn calendar_items(state: &CalendarState) -> Vec<TemporalRecord> {
	let mut items = Vec::with_capacity(
		state.workouts.len() + state.pain_scores.len() + state.sleep_scores.len(),
	);
	items.extend(state.workouts.iter().cloned().map(TemporalRecord::Workout));
	items.extend(state.pain_scores.iter().cloned().map(TemporalRecord::PainScore));
	items.extend(state.sleep_scores.iter().cloned().map(TemporalRecord::SleepScore));
	items
}

fn kind_glyph(kind: RecordKind) -> (&'static str, Color) {
	match kind {
		RecordKind::Workout => ("W", Color::LightGreen),
		RecordKind::PainScore => ("P", Color::LightRed),
		RecordKind::SleepScore => ("S", Color::LightBlue),
	}
}

fn grid_item_marker(item: &TemporalRecord) -> Span<'static> {
	let (glyph, color) = kind_glyph(item.kind());
	Span::styled(glyph, Style::default().fg(color))
}

fn vertical_item_line(item: &TemporalRecord) -> Line<'static> {
	let (glyph, color) = kind_glyph(item.kind());
	let mut spans = vec![
		Span::styled(
			glyph.to_string(),
			Style::default().fg(color).add_modifier(Modifier::BOLD),
		),
		Span::raw(format!(" {}", item.title())),
	];
	if let TemporalRecord::Workout(workout) = item {
		if let Some(minutes) = workout.duration_minutes {
			spans.push(Span::styled(
				format!(" ({minutes} min)"),
				Style::default().fg(Color::DarkGray),
			));
		}
	}
	Line::from(spans)
}

fn render_feed_panel(frame: &mut Frame, area: Rect, app: &App, state: &ActivityFeedState) {
	let border = border_style(app.focus == FocusPane::Feed);

	if let Some(error) = &state.error {
		let block = Block::default()
			.borders(Borders::ALL)
			.title("Activity")
			.border_style(border);
		let paragraph = Paragraph::new(Line::from(Span::styled(
			error.clone(),
			Style::default().fg(Color::LightRed),
		)))
		.block(block);
		frame.render_widget(paragraph, area);
		return;
	}

	let visible = state.visible_items();
	let mut items = visible
		.iter()
		.map(|item| ListItem::new(feed_item_line(item)))
		.collect::<Vec<_>>();
	if items.is_empty() {
		items.push(ListItem::new("(no activity)"));
	}
	if state.has_more() {
		items.push(ListItem::new(Line::from(Span::styled(
			if state.is_loading_more {
				"loading more..."
			} else {
				"-- press m to load more --"
			},
			Style::default().fg(Color::DarkGray),
		))));
	}

	let title = format!(
		"Activity {} | {}/{} {}",
		filter_badge(state),
		visible.len(),
		state.total_count,
		app.feed_month_label.as_deref().unwrap_or("")
	);

	let mut list_state = ListState::default();
	if !visible.is_empty() {
		list_state.select(Some(app.feed_index.min(visible.len() - 1)));
	}

	let list = List::new(items)
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title(title.trim_end().to_string())
				.border_style(border),
		)
		.highlight_style(
			Style::default()
				.bg(HIGHLIGHT_BACKGROUND_COLOR)
				.add_modifier(Modifier::BOLD),
		);

	frame.render_stateful_widget(list, area, &mut list_state);
}

fn feed_item_line(item: &TemporalRecord) -> Line<'static> {
	let (glyph, color) = kind_glyph(item.kind());
	Line::from(vec![
		Span::styled(
			item.date().format("%Y-%m-%d").to_string(),
			Style::default().fg(Color::DarkGray),
		),
		Span::raw(" "),
		Span::styled(
			glyph.to_string(),
			Style::default().fg(color).add_modifier(Modifier::BOLD),
		),
		Span::raw(format!(" {}", item.title())),
	])
}

fn filter_badge(state: &ActivityFeedState) -> String {
	let flag = |enabled: bool, glyph: &str| if enabled { glyph } else { "-" }.to_string();
	format!(
		"[{}{}{}]",
		flag(state.show_workouts, "W"),
		flag(state.show_pain_scores, "P"),
		flag(state.show_sleep_scores, "S")
	)
}

fn render_footer(
	frame: &mut Frame,
	area: Rect,
	app: &App,
	calendar_state: &CalendarState,
	feed_state: &ActivityFeedState,
) {
	let footer_lines = match &app.mode {
		InputMode::Normal => {
			let navigation = match app.view.mode() {
				ViewMode::Grid => "n/N month | t today | arrows/hjkl day",
				ViewMode::Vertical => "n/N week | t today | arrows/hjkl day",
			};
			let mut status = app.status.clone();
			if calendar_state.loading {
				status = format!("{status} | loading month...");
			}
			if feed_state.is_deleting {
				status = format!("{status} | deleting...");
			}
			vec![
				Line::from(format!(
					"Tab pane | {navigation} | m load more | 1/2/3 filters | a all | q quit"
				)),
				Line::from("o add record | d delete (activity pane) | r refresh"),
				Line::from(status),
			]
		}
		InputMode::Prompt(prompt) => vec![
			Line::from(prompt.title.clone()),
			Line::from(format!("> {}", prompt.input)),
			Line::from("Enter submit | Esc cancel"),
		],
		InputMode::Select(select) => vec![
			Line::from(select.title.clone()),
			Line::from(format!(
				"Selected: {}",
				select
					.selected_option()
					.map(|option| option.label.as_str())
					.unwrap_or("(none)")
			)),
			Line::from("j/k or arrows move | Enter choose | Esc cancel"),
		],
	};

	let footer = Paragraph::new(footer_lines)
		.block(Block::default().borders(Borders::ALL).title("Shortcuts"));
	frame.render_widget(footer, area);
}

fn render_add_menu(frame: &mut Frame) {
	let area = centered_rect(40, 30, frame.area());
	frame.render_widget(Clear, area);

	let lines = vec![
		Line::from("w  add workout"),
		Line::from("p  add pain score"),
		Line::from("s  add sleep score"),
		Line::from(Span::styled(
			"Esc close",
			Style::default().fg(Color::DarkGray),
		)),
	];
	let menu =
		Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Add record"));
	frame.render_widget(menu, area);
}

fn render_select_popup(frame: &mut Frame, select: &SelectState) {
	let area = centered_rect(62, 40, frame.area());
	frame.render_widget(Clear, area);

	let items = select
		.options
		.iter()
		.map(|option| ListItem::new(option.label.clone()).style(option.style))
		.collect::<Vec<_>>();

	let list = List::new(items)
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title(select.title.clone()),
		)
		.highlight_symbol(">> ")
		.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR));

	let mut state = ListState::default();
	if !select.options.is_empty() {
		state.select(Some(select.selected.min(select.options.len() - 1)));
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

fn handle_normal_key(
	app: &mut App,
	code: KeyCode,
	backend: &mut LocalJournal,
	calendar_state: &mut CalendarState,
	feed_state: &mut ActivityFeedState,
) -> bool {
	if feed_state.add_menu_open {
		handle_add_menu_key(app, code, feed_state);
		return false;
	}

	match code {
		KeyCode::Char('q') | KeyCode::Esc => true,
		KeyCode::Tab | KeyCode::BackTab => {
			app.focus = app.focus.toggled();
			false
		}
		KeyCode::Char('o') => {
			*feed_state = activity::reduce(feed_state, ActivityAction::ToggleAddMenu);
			false
		}
		KeyCode::Up | KeyCode::Char('k') => {
			match app.focus {
				FocusPane::Calendar => app.shift_selected_day(-7, calendar_state),
				FocusPane::Feed => app.move_feed_selection(-1, feed_state),
			}
			false
		}
		KeyCode::Down | KeyCode::Char('j') => {
			match app.focus {
				FocusPane::Calendar => app.shift_selected_day(7, calendar_state),
				FocusPane::Feed => app.move_feed_selection(1, feed_state),
			}
			false
		}
		KeyCode::Left | KeyCode::Char('h') => {
			if app.focus == FocusPane::Calendar {
				app.shift_selected_day(-1, calendar_state);
			}
			false
		}
		KeyCode::Right | KeyCode::Char('l') => {
			if app.focus == FocusPane::Calendar {
				app.shift_selected_day(1, calendar_state);
			}
			false
		}
		KeyCode::Char('n') => {
			app.navigate_forward(calendar_state);
			false
		}
		KeyCode::Char('N') => {
			app.navigate_backward(calendar_state);
			false
		}
		KeyCode::Char('t') => {
			app.navigate_today(calendar_state);
			false
		}
		KeyCode::Char('m') => {
			load_more_feed(backend, feed_state, app);
			false
		}
		KeyCode::Char('r') => {
			load_initial_feed(backend, feed_state, app);
			app.status = "Activity refreshed".to_string();
			false
		}
		KeyCode::Char('1') => {
			*feed_state =
				activity::reduce(feed_state, ActivityAction::ToggleFilter(RecordKind::Workout));
			false
		}
		KeyCode::Char('2') => {
			*feed_state = activity::reduce(
				feed_state,
				ActivityAction::ToggleFilter(RecordKind::PainScore),
			);
			false
		}
		KeyCode::Char('3') => {
			*feed_state = activity::reduce(
				feed_state,
				ActivityAction::ToggleFilter(RecordKind::SleepScore),
			);
			false
		}
		KeyCode::Char('a') => {
			*feed_state = activity::reduce(feed_state, ActivityAction::ShowAllFilters);
			false
		}
		KeyCode::Char('d') => {
			if app.focus != FocusPane::Feed {
				app.status = "Focus the Activity pane to delete a record".to_string();
				return false;
			}

			let visible = feed_state.visible_items();
			let Some(item) = visible.get(app.feed_index) else {
				app.status = "No selected record to delete".to_string();
				return false;
			};
			app.mode = InputMode::Select(build_delete_record_select(item));
			false
		}
		_ => false,
	}
}

fn handle_add_menu_key(app: &mut App, code: KeyCode, feed_state: &mut ActivityFeedState) {
	let close = |feed_state: &mut ActivityFeedState| {
		*feed_state = activity::reduce(feed_state, ActivityAction::ToggleAddMenu);
	};

	match code {
		KeyCode::Esc | KeyCode::Char('o') => close(feed_state),
		KeyCode::Char('w') => {
			close(feed_state);
			app.mode = InputMode::Prompt(PromptState::new(
				"Workout date (YYYY-MM-DD, empty = today)",
				PromptKind::WorkoutDate,
			));
		}
		KeyCode::Char('p') => {
			close(feed_state);
			app.mode = InputMode::Prompt(PromptState::new(
				"Pain score date (YYYY-MM-DD, empty = today)",
				PromptKind::PainDate,
			));
		}
		KeyCode::Char('s') => {
			close(feed_state);
			app.mode = InputMode::Prompt(PromptState::new(
				"Sleep score date (YYYY-MM-DD, empty = today)",
				PromptKind::SleepDate,
			));
		}
		_ => {}
	}
}

fn handle_prompt_key(
	app: &mut App,
	code: KeyCode,
	backend: &mut LocalJournal,
	calendar_state: &mut CalendarState,
	feed_state: &mut ActivityFeedState,
) -> bool {
	match code {
		KeyCode::Esc => {
			app.mode = InputMode::Normal;
			app.status = "Input cancelled".to_string();
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
			let prompt = match std::mem::replace(&mut app.mode, InputMode::Normal) {
				InputMode::Prompt(prompt) => prompt,
				other => {
					app.mode = other;
					return false;
				}
			};

			match submit_prompt(prompt.clone(), backend) {
				Ok(PromptOutcome::NextPrompt(next_prompt)) => {
					app.mode = InputMode::Prompt(next_prompt);
				}
				Ok(PromptOutcome::Added { record, message }) => {
					apply_added_record(record, backend, calendar_state, feed_state, app);
					app.status = message;
				}
				Err(err) => {
					app.mode = InputMode::Prompt(prompt);
					app.status = format!("error: {err}");
				}
			}
		}
		_ => {}
	}

	false
}

fn handle_select_key(
	app: &mut App,
	code: KeyCode,
	backend: &mut LocalJournal,
	calendar_state: &mut CalendarState,
	feed_state: &mut ActivityFeedState,
) -> bool {
	match code {
		KeyCode::Esc => {
			app.mode = InputMode::Normal;
			app.status = "Selection cancelled".to_string();
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
		KeyCode::Enter => {
			let select = match std::mem::replace(&mut app.mode, InputMode::Normal) {
				InputMode::Select(select) => select,
				other => {
					app.mode = other;
					return false;
				}
			};

			submit_select(app, select, backend, calendar_state, feed_state);
		}
		_ => {}
	}

	false
}

fn submit_prompt(prompt: PromptState, backend: &mut LocalJournal) -> Result<PromptOutcome, String> {
	match prompt.kind {
		PromptKind::WorkoutDate => {
			let date = prompt_date(&prompt.input)?;
			Ok(PromptOutcome::NextPrompt(PromptState::new(
				"Workout description",
				PromptKind::WorkoutDescription { date },
			)))
		}
		PromptKind::WorkoutDescription { date } => {
			let description = required_text(&prompt.input, "workout description")?;
			Ok(PromptOutcome::NextPrompt(PromptState::new(
				"Duration in minutes (optional)",
				PromptKind::WorkoutDuration { date, description },
			)))
		}
		PromptKind::WorkoutDuration { date, description } => {
			let duration_minutes = match optional_text(&prompt.input) {
				Some(raw) => Some(
					raw.parse::<u32>()
						.map_err(|_| format!("invalid duration '{raw}', expected minutes"))?,
				),
				None => None,
			};
			let id = backend
				.add_workout(date, description.clone(), duration_minutes, None)
				.map_err(|err| err.to_string())?;
			let record = TemporalRecord::Workout(Workout {
				id,
				date,
				description,
				duration_minutes,
				notes: None,
			});
			Ok(PromptOutcome::Added {
				message: format!("added workout on {date}"),
				record,
			})
		}
		PromptKind::PainDate => {
			let date = prompt_date(&prompt.input)?;
			Ok(PromptOutcome::NextPrompt(PromptState::new(
				"Pain score (0-10)",
				PromptKind::PainScoreValue { date },
			)))
		}
		PromptKind::PainScoreValue { date } => {
			let score = prompt_score(&prompt.input)?;
			let id = backend
				.add_pain_score(date, score, None)
				.map_err(|err| err.to_string())?;
			let record = TemporalRecord::PainScore(PainScore {
				id,
				date,
				score,
				notes: None,
			});
			Ok(PromptOutcome::Added {
				message: format!("added pain score {score}/10 on {date}"),
				record,
			})
		}
		PromptKind::SleepDate => {
			let date = prompt_date(&prompt.input)?;
			Ok(PromptOutcome::NextPrompt(PromptState::new(
				"Sleep score (0-10)",
				PromptKind::SleepScoreValue { date },
			)))
		}
		PromptKind::SleepScoreValue { date } => {
			let score = prompt_score(&prompt.input)?;
			let id = backend
				.add_sleep_score(date, score, None)
				.map_err(|err| err.to_string())?;
			let record = TemporalRecord::SleepScore(SleepScore {
				id,
				date,
				score,
				notes: None,
			});
			Ok(PromptOutcome::Added {
				message: format!("added sleep score {score}/10 on {date}"),
				record,
			})
		}
	}
}

fn submit_select(
	app: &mut App,
	select: SelectState,
	backend: &mut LocalJournal,
	calendar_state: &mut CalendarState,
	feed_state: &mut ActivityFeedState,
) {
	let Some(option) = select.selected_option() else {
		app.status = "no option selected".to_string();
		return;
	};

	match (&select.kind, option.confirms) {
		(SelectKind::DeleteRecordConfirm { kind, id, label }, true) => {
			delete_record(app, backend, calendar_state, feed_state, *kind, *id, label);
		}
		(SelectKind::DeleteRecordConfirm { .. }, false) => {
			app.status = "Delete cancelled".to_string();
		}
	}
}

fn delete_record(
	app: &mut App,
	backend: &mut LocalJournal,
	calendar_state: &mut CalendarState,
	feed_state: &mut ActivityFeedState,
	kind: RecordKind,
	id: i64,
	label: &str,
) {
	*feed_state = activity::reduce(feed_state, ActivityAction::SetDeleting(true));
	let result = match kind {
		RecordKind::Workout => backend.delete_workout(id),
		RecordKind::PainScore => backend.delete_pain_score(id),
		RecordKind::SleepScore => backend.delete_sleep_score(id),
	};

	match result {
		Ok(()) => {
			*feed_state = activity::reduce(feed_state, ActivityAction::DeleteItem { kind, id });
			*calendar_state = CalendarState::new(calendar_state.current_month);
			app.status = format!("deleted {label}");
		}
		Err(err) => {
			app.status = format!("error: delete failed: {err}");
		}
	}
	*feed_state = activity::reduce(feed_state, ActivityAction::SetDeleting(false));
}

fn apply_added_record(
	record: TemporalRecord,
	backend: &LocalJournal,
	calendar_state: &mut CalendarState,
	feed_state: &mut ActivityFeedState,
	app: &mut App,
) {
	let month = month_key(record.date());
	let mut workouts = Vec::new();
	let mut pain_scores = Vec::new();
	let mut sleep_scores = Vec::new();
	match record {
		TemporalRecord::Workout(workout) => workouts.push(workout),
		TemporalRecord::PainScore(pain_score) => pain_scores.push(pain_score),
		TemporalRecord::SleepScore(sleep_score) => sleep_scores.push(sleep_score),
	}
	*calendar_state = calendar::reduce(
		calendar_state,
		CalendarAction::AppendMonthData {
			month_key: month,
			workouts,
			pain_scores,
			sleep_scores,
		},
	);

	load_initial_feed(backend, feed_state, app);
}

fn build_delete_record_select(item: &TemporalRecord) -> SelectState {
	let label = format!("{} {} ({})", item.kind().label(), item.title(), item.date());
	let options = vec![
		SelectOption::new(
			"Delete",
			true,
			Style::default()
				.fg(Color::LightRed)
				.add_modifier(Modifier::BOLD),
		),
		SelectOption::new("Cancel", false, Style::default()),
	];

	let mut select = SelectState::new(
		format!("Delete {label}?"),
		SelectKind::DeleteRecordConfirm {
			kind: item.kind(),
			id: item.id(),
			label,
		},
		options,
	);
	select.selected = 1;
	select
}

fn prompt_date(input: &str) -> Result<NaiveDate, String> {
	match optional_text(input) {
		Some(raw) => parse_record_date(&raw),
		None => Ok(Local::now().date_naive()),
	}
}

fn prompt_score(input: &str) -> Result<u8, String> {
	let raw = required_text(input, "score")?;
	let score = raw
		.parse::<u8>()
		.map_err(|_| format!("invalid score '{raw}', expected 0-10"))?;
	if score > 10 {
		return Err(format!("score out of range: {score} (expected 0-10)"));
	}
	Ok(score)
}

fn required_text(input: &str, field_name: &str) -> Result<String, String> {
	let value = input.trim();
	if value.is_empty() {
		Err(format!("{field_name} is required"))
	} else {
		Ok(value.to_string())
	}
}

fn optional_text(input: &str) -> Option<String> {
	let value = input.trim();
	if value.is_empty() {
		None
	} else {
		Some(value.to_string())
	}
}

fn border_style(focused: bool) -> Style {
	if focused {
		Style::default()
			.fg(FOCUSED_PANEL_BORDER_COLOR)
			.add_modifier(Modifier::BOLD)
	} else {
		Style::default().fg(INACTIVE_PANEL_BORDER_COLOR)
	}
}

#[derive(Debug, Clone)]
enum PromptOutcome {
	NextPrompt(PromptState),
	Added {
		record: TemporalRecord,
		message: String,
	},
}

#[derive(Debug, Clone)]
struct PromptState {
	title: String,
	input: String,
	kind: PromptKind,
}

impl PromptState {
	fn new(title: impl Into<String>, kind: PromptKind) -> Self {
		Self {
			title: title.into(),
			input: String::new(),
			kind,
		}
	}
}

#[derive(Debug, Clone)]
enum PromptKind {
	WorkoutDate,
	WorkoutDescription {
		date: NaiveDate,
	},
	WorkoutDuration {
		date: NaiveDate,
		description: String,
	},
	PainDate,
	PainScoreValue {
		date: NaiveDate,
	},
	SleepDate,
	SleepScoreValue {
		date: NaiveDate,
	},
}

#[derive(Debug, Clone)]
struct SelectState {
	title: String,
	options: Vec<SelectOption>,
	selected: usize,
	kind: SelectKind,
}

impl SelectState {
	fn new(title: impl Into<String>, kind: SelectKind, options: Vec<SelectOption>) -> Self {
		Self {
			title: title.into(),
			options,
			selected: 0,
			kind,
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

	fn selected_option(&self) -> Option<&SelectOption> {
		self.options.get(self.selected)
	}
}

#[derive(Debug, Clone)]
struct SelectOption {
	label: String,
	confirms: bool,
	style: Style,
}

impl SelectOption {
	fn new(label: impl Into<String>, confirms: bool, style: Style) -> Self {
		Self {
			label: label.into(),
			confirms,
			style,
		}
	}
}

#[derive(Debug, Clone)]
enum SelectKind {
	DeleteRecordConfirm {
		kind: RecordKind,
		id: i64,
		label: String,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusPane {
	Calendar,
	Feed,
}

impl FocusPane {
	fn toggled(self) -> Self {
		match self {
			FocusPane::Calendar => FocusPane::Feed,
			FocusPane::Feed => FocusPane::Calendar,
		}
	}
}

#[derive(Debug, Clone)]
enum InputMode {
	Normal,
	Prompt(PromptState),
	Select(SelectState),
}

struct App {
	focus: FocusPane,
	view: DualModeView,
	selected_day: NaiveDate,
	feed_index: usize,
	feed_month_label: Option<String>,
	mode: InputMode,
	status: String,
	shown_month: NaiveDate,
	failed_months: HashSet<String>,
}

impl App {
	fn new(today: NaiveDate, viewport_width: u16) -> Self {
		Self {
			focus: FocusPane::Calendar,
			view: DualModeView::new(today, viewport_width),
			selected_day: today,
			feed_index: 0,
			feed_month_label: None,
			mode: InputMode::Normal,
			status: "Ready".to_string(),
			shown_month: first_day_of_month(today),
			failed_months: HashSet::new(),
		}
	}

	fn clamp_feed_selection(&mut self, feed_state: &ActivityFeedState) {
		let visible = feed_state.visible_items().len();
		if visible == 0 {
			self.feed_index = 0;
		} else {
			self.feed_index = self.feed_index.min(visible - 1);
		}
	}

	fn shift_selected_day(&mut self, delta_days: i64, calendar_state: &mut CalendarState) {
		self.selected_day += Duration::days(delta_days);
		self.follow_selected_day(calendar_state);
	}

	fn navigate_forward(&mut self, calendar_state: &mut CalendarState) {
		match self.view.mode() {
			ViewMode::Grid => self.shift_selected_month(1, calendar_state),
			ViewMode::Vertical => self.shift_week(1, calendar_state),
		}
	}

	fn navigate_backward(&mut self, calendar_state: &mut CalendarState) {
		match self.view.mode() {
			ViewMode::Grid => self.shift_selected_month(-1, calendar_state),
			ViewMode::Vertical => self.shift_week(-1, calendar_state),
		}
	}

	fn navigate_today(&mut self, calendar_state: &mut CalendarState) {
		let today = Local::now().date_naive();
		self.selected_day = today;
		if self.view.mode() == ViewMode::Vertical {
			self.view.goto_week_of(today, |_| {});
		}
		*calendar_state = calendar::reduce(calendar_state, CalendarAction::SetMonth(today));
	}

	fn shift_selected_month(&mut self, delta_months: i32, calendar_state: &mut CalendarState) {
		self.selected_day = shift_month(self.selected_day, delta_months);
		*calendar_state =
			calendar::reduce(calendar_state, CalendarAction::SetMonth(self.selected_day));
	}

	fn shift_week(&mut self, delta_weeks: i64, calendar_state: &mut CalendarState) {
		let mut new_week = None;
		self.view.shift_week(delta_weeks, |week| new_week = Some(week));
		if let Some(week) = new_week {
			self.selected_day = week;
			*calendar_state = calendar::reduce(calendar_state, CalendarAction::SetMonth(week));
		}
	}

	fn follow_selected_day(&mut self, calendar_state: &mut CalendarState) {
		if month_key(self.selected_day) != month_key(calendar_state.current_month) {
			*calendar_state =
				calendar::reduce(calendar_state, CalendarAction::SetMonth(self.selected_day));
		}
	}

	fn move_feed_selection(&mut self, delta: i32, feed_state: &ActivityFeedState) {
		let visible = feed_state.visible_items().len();
		if visible == 0 {
			self.feed_index = 0;
			return;
		}

		if delta > 0 {
			self.feed_index = (self.feed_index + delta as usize).min(visible - 1);
		} else {
			self.feed_index = self.feed_index.saturating_sub(delta.unsigned_abs() as usize);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::collections::HashSet;
	use std::fs;

	use chrono::NaiveDate;

	use crate::api::{ActivityPage, ApiError, FitnessApi, LocalJournal, MonthRangeData};
	use crate::calendar::{CalendarState, month_key};

	use super::{ensure_partition_loaded, optional_text, prompt_date, prompt_score, required_text};

	fn day(raw: &str) -> NaiveDate {
		NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("test date must parse")
	}

	struct OfflineBackend {
		month_fetches: RefCell<u32>,
	}

	impl OfflineBackend {
		fn new() -> Self {
			Self {
				month_fetches: RefCell::new(0),
			}
		}

		fn fetches(&self) -> u32 {
			*self.month_fetches.borrow()
		}
	}

	impl FitnessApi for OfflineBackend {
		fn fetch_month_range(
			&self,
			_start: NaiveDate,
			_end: NaiveDate,
		) -> Result<MonthRangeData, ApiError> {
			*self.month_fetches.borrow_mut() += 1;
			Err(ApiError::Domain("backend offline".to_string()))
		}

		fn fetch_activity_page(&self, _offset: u32) -> Result<ActivityPage, ApiError> {
			Err(ApiError::Domain("backend offline".to_string()))
		}

		fn add_workout(
			&mut self,
			_date: NaiveDate,
			_description: String,
			_duration_minutes: Option<u32>,
			_notes: Option<String>,
		) -> Result<i64, ApiError> {
			Err(ApiError::Domain("backend offline".to_string()))
		}

		fn add_pain_score(
			&mut self,
			_date: NaiveDate,
			_score: u8,
			_notes: Option<String>,
		) -> Result<i64, ApiError> {
			Err(ApiError::Domain("backend offline".to_string()))
		}

		fn add_sleep_score(
			&mut self,
			_date: NaiveDate,
			_score: u8,
			_notes: Option<String>,
		) -> Result<i64, ApiError> {
			Err(ApiError::Domain("backend offline".to_string()))
		}

		fn delete_workout(&mut self, _id: i64) -> Result<(), ApiError> {
			Err(ApiError::Domain("backend offline".to_string()))
		}

		fn delete_pain_score(&mut self, _id: i64) -> Result<(), ApiError> {
			Err(ApiError::Domain("backend offline".to_string()))
		}

		fn delete_sleep_score(&mut self, _id: i64) -> Result<(), ApiError> {
			Err(ApiError::Domain("backend offline".to_string()))
		}
	}

	#[test]
	fn failed_month_is_not_refetched_until_navigation_returns() {
		let backend = OfflineBackend::new();
		let mut state = CalendarState::new(day("2026-02-10"));
		let mut failed = HashSet::new();

		let month = state.current_month;
		ensure_partition_loaded(&backend, &mut state, month, &mut failed);
		assert_eq!(backend.fetches(), 1);
		assert!(state.error.is_some());
		assert!(!state.has_fetched("2026-02"));

		ensure_partition_loaded(&backend, &mut state, month, &mut failed);
		ensure_partition_loaded(&backend, &mut state, month, &mut failed);
		assert_eq!(backend.fetches(), 1);

		failed.clear();
		ensure_partition_loaded(&backend, &mut state, month, &mut failed);
		assert_eq!(backend.fetches(), 2);
	}

	#[test]
	fn vertical_week_pulls_both_months_it_spans() {
		let mut path = std::env::temp_dir();
		path.push(format!("trainlog_ui_week_span.journal_{}", std::process::id()));
		let _ = fs::remove_file(&path);
		let mut backend = LocalJournal::open(&path).expect("open should succeed");
		backend
			.add_workout(day("2026-02-02"), "Squats".to_string(), None, None)
			.expect("add should succeed");

		let week_start = day("2026-01-26");
		let mut state = CalendarState::new(week_start);
		let mut failed = HashSet::new();

		let month = state.current_month;
		ensure_partition_loaded(&backend, &mut state, month, &mut failed);
		let week_end = week_start + chrono::Duration::days(6);
		ensure_partition_loaded(&backend, &mut state, week_end, &mut failed);

		assert!(state.has_fetched(&month_key(month)));
		assert!(state.has_fetched(&month_key(week_end)));
		assert_eq!(state.workouts.len(), 1);
		let _ = fs::remove_file(path);
	}

	#[test]
	fn empty_date_input_defaults_to_today() {
		let today = chrono::Local::now().date_naive();
		assert_eq!(prompt_date("  "), Ok(today));
		assert_eq!(prompt_date("2026-02-14"), Ok(chrono::NaiveDate::from_ymd_opt(2026, 2, 14).expect("test date must be valid")));
	}

	#[test]
	fn scores_outside_zero_to_ten_are_rejected() {
		assert_eq!(prompt_score("7"), Ok(7));
		assert!(prompt_score("11").is_err());
		assert!(prompt_score("-1").is_err());
		assert!(prompt_score("").is_err());
	}

	#[test]
	fn text_helpers_trim_and_distinguish_required() {
		assert!(required_text("  ", "field").is_err());
		assert_eq!(required_text(" squats ", "field").as_deref(), Ok("squats"));
		assert_eq!(optional_text("  "), None);
		assert_eq!(optional_text(" 45 ").as_deref(), Some("45"));
	}
}
