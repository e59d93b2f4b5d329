use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::calendar::first_day_of_month;
use crate::records::TemporalRecord;

pub const VERTICAL_BREAKPOINT: u16 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
	Grid,
	Vertical,
}

pub fn mode_for_width(viewport_width: u16) -> ViewMode {
	if viewport_width < VERTICAL_BREAKPOINT {
		ViewMode::Vertical
	} else {
		ViewMode::Grid
	}
}

#[derive(Debug, Clone)]
pub struct DualModeView {
	mode: ViewMode,
	week_start: NaiveDate,
}

impl DualModeView {
	pub fn new(current_month: NaiveDate, viewport_width: u16) -> Self {
		Self {
			mode: mode_for_width(viewport_width),
			week_start: start_of_week(first_day_of_month(current_month)),
		}
	}

	pub fn mode(&self) -> ViewMode {
		self.mode
	}

	pub fn week_start(&self) -> NaiveDate {
		self.week_start
	}

	pub fn handle_resize(&mut self, viewport_width: u16, current_month: NaiveDate) {
		let next = mode_for_width(viewport_width);
		if next == ViewMode::Vertical && self.mode == ViewMode::Grid {
			self.week_start = start_of_week(first_day_of_month(current_month));
		}
		self.mode = next;
	}

	pub fn shift_week(&mut self, delta_weeks: i64, mut on_week_change: impl FnMut(NaiveDate)) {
		self.week_start += Duration::days(7 * delta_weeks);
		on_week_change(self.week_start);
	}

	pub fn goto_week_of(&mut self, day: NaiveDate, mut on_week_change: impl FnMut(NaiveDate)) {
		self.week_start = start_of_week(day);
		on_week_change(self.week_start);
	}
}

pub fn shift_month(day: NaiveDate, delta: i32) -> NaiveDate {
	let mut year = day.year();
	let mut month = day.month() as i32 + delta;
	while month > 12 {
		year += 1;
		month -= 12;
	}
	while month < 1 {
		year -= 1;
		month += 12;
	}
	let month_u32 = month as u32;
	let max_day = days_in_month(year, month_u32);
	let target_day = day.day().min(max_day);
	NaiveDate::from_ymd_opt(year, month_u32, target_day).expect("shifted month date must be valid")
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
	let first_of_next = if month == 12 {
		NaiveDate::from_ymd_opt(year + 1, 1, 1).expect("next year date should be valid")
	} else {
		NaiveDate::from_ymd_opt(year, month + 1, 1).expect("next month date should be valid")
	};
	(first_of_next - Duration::days(1)).day()
}

pub fn start_of_week(day: NaiveDate) -> NaiveDate {
	let days_from_monday = day.weekday().number_from_monday() as i64 - 1;
	day - Duration::days(days_from_monday)
}

pub fn group_items_by_date<'a>(
	items: &'a [TemporalRecord],
) -> BTreeMap<NaiveDate, Vec<&'a TemporalRecord>> {
	let mut grouped: BTreeMap<NaiveDate, Vec<&TemporalRecord>> = BTreeMap::new();
	for item in items {
		grouped.entry(item.date()).or_default().push(item);
	}
	grouped
}

fn selected_day_style() -> Style {
	Style::default()
		.fg(Color::Black)
		.bg(Color::Yellow)
		.add_modifier(Modifier::BOLD)
}

pub fn render_month_grid(
	frame: &mut Frame,
	area: Rect,
	month: NaiveDate,
	selected_day: NaiveDate,
	items_by_date: &BTreeMap<NaiveDate, Vec<&TemporalRecord>>,
	border_style: Style,
	render_item: &dyn Fn(&TemporalRecord) -> Span<'static>,
) {
	let month = first_day_of_month(month);
	let mut lines = Vec::new();
	lines.push(Line::from(format!("{} {}", month.format("%B"), month.year())));
	lines.push(Line::from("Mo Tu We Th Fr Sa Su"));

	let first_weekday = month.weekday().number_from_monday() as usize - 1;
	let total_days = days_in_month(month.year(), month.month());
	let mut day_counter = 1u32;
	for week in 0..6 {
		if day_counter > total_days && week > 0 {
			break;
		}

		let mut number_spans = Vec::new();
		let mut marker_spans = Vec::new();
		let mut week_day_counter = day_counter;
		for weekday_index in 0..7 {
			let before_first = week == 0 && weekday_index < first_weekday;
			let after_last = week_day_counter > total_days;
			if before_first || after_last {
				number_spans.push(Span::raw("   "));
				marker_spans.push(Span::raw("   "));
				continue;
			}

			let date = NaiveDate::from_ymd_opt(month.year(), month.month(), week_day_counter)
				.expect("calendar day must be valid");
			let day_items = items_by_date.get(&date).map(Vec::as_slice).unwrap_or(&[]);

			let mut style = Style::default();
			if date == selected_day {
				style = selected_day_style();
			} else if !day_items.is_empty() {
				style = style.fg(Color::LightYellow).add_modifier(Modifier::BOLD);
			}
			number_spans.push(Span::styled(format!("{week_day_counter:>2} "), style));

			for item in day_items.iter().take(2) {
				marker_spans.push(render_item(item));
			}
			let used = day_items.len().min(2);
			if day_items.len() > 2 {
				marker_spans.push(Span::styled("+", Style::default().fg(Color::DarkGray)));
			} else {
				marker_spans.push(Span::raw(" ".repeat(3 - used)));
			}

			week_day_counter += 1;
		}
		day_counter = week_day_counter;

		lines.push(Line::from(number_spans));
		lines.push(Line::from(marker_spans));
	}

	let block = Block::default()
		.borders(Borders::ALL)
		.title("Calendar")
		.border_style(border_style);
	frame.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn render_week_vertical(
	frame: &mut Frame,
	area: Rect,
	week_start: NaiveDate,
	selected_day: NaiveDate,
	items_by_date: &BTreeMap<NaiveDate, Vec<&TemporalRecord>>,
	border_style: Style,
	render_item: &dyn Fn(&TemporalRecord) -> Line<'static>,
) {
	let week_end = week_start + Duration::days(6);
	let mut lines = Vec::new();
	for offset in 0..7 {
		let date = week_start + Duration::days(offset);
		let heading_style = if date == selected_day {
			selected_day_style()
		} else {
			Style::default().add_modifier(Modifier::BOLD)
		};
		lines.push(Line::from(Span::styled(
			date.format("%a %d %b").to_string(),
			heading_style,
		)));

		match items_by_date.get(&date) {
			Some(day_items) if !day_items.is_empty() => {
				for item in day_items {
					let mut rendered = render_item(item);
					rendered.spans.insert(0, Span::raw("  "));
					lines.push(rendered);
				}
			}
			_ => lines.push(Line::from(Span::styled(
				"  (nothing logged)",
				Style::default().fg(Color::DarkGray),
			))),
		}
	}

	let block = Block::default()
		.borders(Borders::ALL)
		.title(format!(
			"Week {} - {}",
			week_start.format("%d %b"),
			week_end.format("%d %b")
		))
		.border_style(border_style);
	frame.render_widget(Paragraph::new(lines).block(block), area);
}
