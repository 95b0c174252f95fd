//! Logger setup for the `jotter` binary. The library only emits records
//! through the [`log`] facade; installing a logger is left to the caller.

use env_logger::{Builder, Env};
use std::io::Write;

/// The environment variable holding the log filter (e.g. `jotter=debug`).
pub const LOG_ENV: &str = "JOTTER_LOG";

/// Installs an [`env_logger`] logger. The filter comes from [`LOG_ENV`],
/// falling back to `info`, or to `warn` when `quiet` is set.
pub fn init_logging(quiet: bool) {
    let default_filter = if quiet { "warn" } else { "info" };
    Builder::from_env(Env::default().filter_or(LOG_ENV, default_filter))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}
