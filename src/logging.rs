use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// `RUST_LOG` wins over `config.log_level`.
pub fn filter(config: &Config) -> EnvFilter {
	EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Installs the global subscriber for a host process.
pub fn init(config: &Config) {
	fmt()
		.with_env_filter(filter(config))
		.with_target(true)
		.with_line_number(true)
		.init();
}

/// Debug level, captured by the test harness. Safe to call from every test.
pub fn init_test() {
	let _ = fmt()
		.with_env_filter(EnvFilter::new("debug"))
		.with_test_writer()
		.try_init();
}
