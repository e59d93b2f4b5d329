use std::error::Error;
use std::path::PathBuf;

use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use rand::Rng;

mod activity;
mod api;
mod calendar;
mod journals;
mod merge;
mod records;
mod storage;
mod ui;
mod view;

use api::{FitnessApi, LocalJournal};
use calendar::month_bounds;
use records::{TemporalRecord, parse_record_date};
use view::{group_items_by_date, shift_month};

#[derive(Debug, Parser)]
#[command(name = "trainlog", about = "Terminal-first fitness tracker", version)]
struct Cli {
	/// Journal file to operate on; falls back to TRAINLOG_JOURNAL, then the
	/// most recently used journal
	#[arg(long, global = true)]
	journal: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Create an empty journal file at the resolved path
	Init,
	/// Open the interactive dashboard (the default)
	Dashboard,
	/// Log a workout
	AddWorkout {
		description: String,
		/// Date as YYYY-MM-DD; defaults to today
		#[arg(long)]
		date: Option<String>,
		/// Duration in minutes
		#[arg(long)]
		duration: Option<u32>,
		#[arg(long)]
		notes: Option<String>,
	},
	/// Log a pain score (0-10)
	AddPain {
		score: u8,
		#[arg(long)]
		date: Option<String>,
		#[arg(long)]
		notes: Option<String>,
	},
	/// Log a sleep score (0-10)
	AddSleep {
		score: u8,
		#[arg(long)]
		date: Option<String>,
		#[arg(long)]
		notes: Option<String>,
	},
	/// Print one page of the activity feed, newest first
	Activity {
		/// Zero-based page index
		#[arg(long, default_value_t = 0)]
		page: u32,
	},
	/// Print all records of one month grouped by day
	Month {
		/// Month as YYYY-MM; defaults to the current month
		month: Option<String>,
	},
	/// Delete a workout by id
	DeleteWorkout { id: i64 },
	/// Delete a pain score by id
	DeletePain { id: i64 },
	/// Delete a sleep score by id
	DeleteSleep { id: i64 },
	/// Fill the journal with generated sample data
	Demo {
		/// How many months back to generate
		#[arg(long, default_value_t = 3)]
		months: u32,
	},
	/// List recently used journal files, most recent first
	Journals {
		#[arg(long, default_value_t = 10)]
		limit: usize,
	},
}

fn main() {
	let cli = Cli::parse();
	if let Err(err) = run(cli) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
	let command = cli.command.unwrap_or(Command::Dashboard);

	let registry = journals::JournalRegistry::from_env();

	if let Command::Journals { limit } = &command {
		let recent = registry.recent(*limit)?;
		if recent.is_empty() {
			println!("no recent journals");
		}
		for path in recent {
			println!("{}", path.display());
		}
		return Ok(());
	}

	let path = registry.resolve(cli.journal)?;
	let mut backend = LocalJournal::open(&path)?;
	if let Err(err) = registry.touch(backend.path()) {
		eprintln!("warning: could not update recent journals: {err}");
	}

	match command {
		Command::Init => {
			storage::save_journal(backend.path(), backend.journal())?;
			println!("initialized journal at {}", backend.path().display());
		}
		Command::Dashboard => ui::run_dashboard(&mut backend)?,
		Command::AddWorkout {
			description,
			date,
			duration,
			notes,
		} => {
			let date = parse_optional_date(date)?;
			let id = backend.add_workout(date, description, duration, notes)?;
			println!("added workout {id} on {date}");
		}
		Command::AddPain { score, date, notes } => {
			let date = parse_optional_date(date)?;
			let id = backend.add_pain_score(date, score, notes)?;
			println!("added pain score {id} ({score}/10) on {date}");
		}
		Command::AddSleep { score, date, notes } => {
			let date = parse_optional_date(date)?;
			let id = backend.add_sleep_score(date, score, notes)?;
			println!("added sleep score {id} ({score}/10) on {date}");
		}
		Command::Activity { page } => print_activity_page(&backend, page)?,
		Command::Month { month } => {
			let month = match month {
				Some(raw) => parse_month(&raw)?,
				None => Local::now().date_naive(),
			};
			print_month(&backend, month)?;
		}
		Command::DeleteWorkout { id } => {
			backend.delete_workout(id)?;
			println!("deleted workout {id}");
		}
		Command::DeletePain { id } => {
			backend.delete_pain_score(id)?;
			println!("deleted pain score {id}");
		}
		Command::DeleteSleep { id } => {
			backend.delete_sleep_score(id)?;
			println!("deleted sleep score {id}");
		}
		Command::Demo { months } => generate_demo_data(&mut backend, months)?,
		Command::Journals { .. } => unreachable!("handled before journal resolution"),
	}

	Ok(())
}

fn print_activity_page(backend: &LocalJournal, page: u32) -> Result<(), Box<dyn Error>> {
	let fetched = backend.fetch_activity_page(page)?;
	println!(
		"activity page {page}: {} of {} records{}",
		fetched.items.len(),
		fetched.total,
		fetched
			.month_label
			.map(|label| format!(" (from {label})"))
			.unwrap_or_default()
	);
	for item in &fetched.items {
		println!(
			"{}  {:<11}  #{:<4}  {}",
			item.date(),
			item.kind().label(),
			item.id(),
			item.title()
		);
	}
	Ok(())
}

fn print_month(backend: &LocalJournal, month: NaiveDate) -> Result<(), Box<dyn Error>> {
	let (start, end) = month_bounds(month);
	let data = backend.fetch_month_range(start, end)?;

	let mut items = Vec::new();
	items.extend(data.workouts.into_iter().map(TemporalRecord::Workout));
	items.extend(data.pain_scores.into_iter().map(TemporalRecord::PainScore));
	items.extend(data.sleep_scores.into_iter().map(TemporalRecord::SleepScore));

	println!("{} ({} records)", month.format("%B %Y"), items.len());
	for (day, day_items) in group_items_by_date(&items) {
		println!("{}", day.format("%a %d"));
		for item in day_items {
			println!("  {:<11}  #{:<4}  {}", item.kind().label(), item.id(), item.title());
		}
	}
	Ok(())
}

fn generate_demo_data(backend: &mut LocalJournal, months: u32) -> Result<(), Box<dyn Error>> {
	const SESSIONS: [&str; 8] = [
		"Easy run 5k",
		"Squats 5x5",
		"Bench press 3x8",
		"Deadlifts 3x5",
		"Row intervals",
		"Mobility session",
		"Long walk",
		"Swim 1500m",
	];

	let mut rng = rand::thread_rng();
	let today = Local::now().date_naive();
	let mut day = shift_month(today, -(months.min(120) as i32));
	let mut added = 0usize;

	while day <= today {
		if rng.gen_bool(0.55) {
			let description = SESSIONS[rng.gen_range(0..SESSIONS.len())].to_string();
			backend.add_workout(day, description, Some(rng.gen_range(20..=90)), None)?;
			added += 1;
		}
		if rng.gen_bool(0.8) {
			backend.add_sleep_score(day, rng.gen_range(4..=9), None)?;
			added += 1;
		}
		if rng.gen_bool(0.35) {
			backend.add_pain_score(day, rng.gen_range(0..=5), None)?;
			added += 1;
		}
		day += Duration::days(1);
	}

	println!("added {added} demo records to {}", backend.path().display());
	Ok(())
}

fn parse_optional_date(raw: Option<String>) -> Result<NaiveDate, String> {
	match raw {
		Some(raw) => parse_record_date(&raw),
		None => Ok(Local::now().date_naive()),
	}
}

fn parse_month(raw: &str) -> Result<NaiveDate, String> {
	NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
		.map_err(|_| format!("invalid month '{raw}', expected YYYY-MM"))
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;

	use super::{parse_month, parse_optional_date};

	#[test]
	fn month_argument_expects_year_dash_month() {
		assert_eq!(
			parse_month("2026-02"),
			Ok(NaiveDate::from_ymd_opt(2026, 2, 1).expect("test date must be valid"))
		);
		assert!(parse_month("2026").is_err());
		assert!(parse_month("2026-13").is_err());
	}

	#[test]
	fn missing_date_argument_defaults_to_today() {
		let today = chrono::Local::now().date_naive();
		assert_eq!(parse_optional_date(None), Ok(today));
		assert_eq!(
			parse_optional_date(Some("2026-02-14T08:30:00".to_string())),
			Ok(NaiveDate::from_ymd_opt(2026, 2, 14).expect("test date must be valid"))
		);
	}
}
