use std::env;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const RECENT_FILE: &str = "recent.json";
const RECENT_CAP: usize = 50;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecentList {
	journals: Vec<PathBuf>,
}

pub struct JournalRegistry {
	state_dir: PathBuf,
}

impl JournalRegistry {
	pub fn from_env() -> Self {
		Self {
			state_dir: default_state_dir(),
		}
	}

	pub fn with_state_dir(state_dir: impl Into<PathBuf>) -> Self {
		Self {
			state_dir: state_dir.into(),
		}
	}

	pub fn resolve(&self, cli_path: Option<PathBuf>) -> Result<PathBuf, Error> {
		self.resolve_from(cli_path, env::var_os("TRAINLOG_JOURNAL").map(PathBuf::from))
	}

	fn resolve_from(
		&self,
		cli_path: Option<PathBuf>,
		env_path: Option<PathBuf>,
	) -> Result<PathBuf, Error> {
		let chosen = cli_path.or_else(|| env_path.filter(|path| !path.as_os_str().is_empty()));
		if let Some(path) = chosen {
			return Ok(absolutize(path));
		}

		self.recent(1)?.pop().ok_or_else(|| {
			Error::new(
				ErrorKind::NotFound,
				"no journal selected: pass --journal <path>, set TRAINLOG_JOURNAL, or pick one from `journals`",
			)
		})
	}

	pub fn touch(&self, path: &Path) -> Result<(), Error> {
		let path = absolutize(path.to_path_buf());
		let mut list = self.load_list()?;
		list.journals.retain(|entry| entry != &path);
		list.journals.insert(0, path);
		list.journals.truncate(RECENT_CAP);
		self.store_list(&list)
	}

	pub fn recent(&self, limit: usize) -> Result<Vec<PathBuf>, Error> {
		let mut list = self.load_list()?;
		list.journals.truncate(limit);
		Ok(list.journals)
	}

	fn load_list(&self) -> Result<RecentList, Error> {
		let raw = match fs::read_to_string(self.recent_path()) {
			Ok(raw) => raw,
			Err(err) if err.kind() == ErrorKind::NotFound => return Ok(RecentList::default()),
			Err(err) => return Err(err),
		};

		serde_json::from_str(&raw).map_err(|err| {
			Error::new(
				ErrorKind::InvalidData,
				format!("recent journal list is corrupt: {err}"),
			)
		})
	}

	fn store_list(&self, list: &RecentList) -> Result<(), Error> {
		fs::create_dir_all(&self.state_dir)?;
		let raw = serde_json::to_string_pretty(list).map_err(|err| {
			Error::new(
				ErrorKind::InvalidData,
				format!("could not encode recent journal list: {err}"),
			)
		})?;
		fs::write(self.recent_path(), raw)
	}

	fn recent_path(&self) -> PathBuf {
		self.state_dir.join(RECENT_FILE)
	}
}

fn default_state_dir() -> PathBuf {
	if let Some(path) = env::var_os("TRAINLOG_STATE_DIR") {
		return PathBuf::from(path);
	}

	#[cfg(target_os = "windows")]
	{
		if let Some(path) = env::var_os("LOCALAPPDATA") {
			return PathBuf::from(path).join("trainlog");
		}
	}

	if let Some(path) = env::var_os("XDG_STATE_HOME") {
		return PathBuf::from(path).join("trainlog");
	}

	if let Some(path) = env::var_os("HOME") {
		return PathBuf::from(path)
			.join(".local")
			.join("state")
			.join("trainlog");
	}

	PathBuf::from(".trainlog")
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
