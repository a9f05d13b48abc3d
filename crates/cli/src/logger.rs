//! `env_logger` setup for the `log` facade.

use std::io::Write;

use log::{Level, LevelFilter};

/// Level selected by `-v` (repeatable) and `-q`.
pub(crate) fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger. A second call keeps the first logger.
pub(crate) fn init(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format(|buf, record| {
            // Advisory levels read like the diagnostics; debug output names its module.
            match record.level() {
                Level::Error => writeln!(buf, "error: {}", record.args()),
                Level::Warn => writeln!(buf, "warning: {}", record.args()),
                Level::Info => writeln!(buf, "info: {}", record.args()),
                level => writeln!(
                    buf,
                    "{}[{}]: {}",
                    level.as_str().to_ascii_lowercase(),
                    record.target(),
                    record.args()
                ),
            }
        })
        .try_init();
}
