use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 3;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub database_url: String,
	pub max_connections: u32,
	pub acquire_timeout: Duration,
	/// filter used when `RUST_LOG` is unset
	pub log_level: String,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			database_url: DEFAULT_DATABASE_URL.to_string(),
			max_connections: DEFAULT_MAX_CONNECTIONS,
			acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
			log_level: DEFAULT_LOG_LEVEL.to_string(),
		}
	}
}

impl Config {
	/// Reads `.env` when present, then the process environment.
	///
	/// - `DATABASE_URL` (default `sqlite::memory:`)
	/// - `LIBRARY_MAX_CONNECTIONS` (default 5)
	/// - `LIBRARY_ACQUIRE_TIMEOUT_SECS` (default 3)
	/// - `LIBRARY_LOG_LEVEL` (default `info`)
	pub fn from_env() -> Result<Self> {
		dotenvy::dotenv().ok();
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut config = Config::default();
		if let Some(url) = lookup("DATABASE_URL") {
			config.database_url = url;
		}
		if let Some(raw) = lookup("LIBRARY_MAX_CONNECTIONS") {
			config.max_connections = parse_number("LIBRARY_MAX_CONNECTIONS", &raw)?;
			if config.max_connections == 0 {
				return Err(Error::Config("LIBRARY_MAX_CONNECTIONS must be at least 1".to_string()));
			}
		}
		if let Some(raw) = lookup("LIBRARY_ACQUIRE_TIMEOUT_SECS") {
			config.acquire_timeout = Duration::from_secs(parse_number("LIBRARY_ACQUIRE_TIMEOUT_SECS", &raw)?);
		}
		if let Some(level) = lookup("LIBRARY_LOG_LEVEL") {
			let level = level.trim();
			if level.is_empty() {
				return Err(Error::Config("LIBRARY_LOG_LEVEL is empty".to_string()));
			}
			config.log_level = level.to_string();
		}
		// the in-memory database lives only as long as its one connection
		if config.is_memory() {
			config.max_connections = 1;
		}
		Ok(config)
	}

	pub fn in_memory() -> Self {
		Config {
			max_connections: 1,
			..Config::default()
		}
	}

	pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
		self.database_url = url.into();
		if self.is_memory() {
			self.max_connections = 1;
		}
		self
	}

	pub fn is_memory(&self) -> bool {
		self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
	}
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
	raw.trim()
		.parse()
		.map_err(|_| Error::Config(format!("{key} is not a valid number: {raw:?}")))
}
