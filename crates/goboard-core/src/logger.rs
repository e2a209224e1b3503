//! Stderr logging for front ends.
//!
//! Library code only emits `log` records. Records from the `goboard*` crates
//! pass at the configured level; other targets (image codecs, argument
//! parsing) are capped at `warn` so a debug run shows recognition output only.
//! Lines look like `[  0.042s DEBUG detect::grid] message`.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

const OWN_PREFIX: &str = "goboard";
#[cfg(any(feature = "tracing", test))]
const OWN_CRATES: [&str; 4] = ["goboard", "goboard_core", "goboard_detect", "goboard_render"];
const FOREIGN_CAP: Level = Level::Warn;

struct RecognitionLogger {
    level: LevelFilter,
    started: Instant,
}

impl RecognitionLogger {
    fn accepts(&self, level: Level, target: &str) -> bool {
        if level > self.level {
            return false;
        }
        target.starts_with(OWN_PREFIX) || level <= FOREIGN_CAP
    }
}

/// `goboard_detect::grid` → `detect::grid`; foreign targets unchanged.
fn short_target(target: &str) -> &str {
    target
        .strip_prefix("goboard_")
        .or_else(|| target.strip_prefix("goboard::"))
        .unwrap_or(target)
}

impl Log for RecognitionLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.accepts(metadata.level(), metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let elapsed = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{elapsed:7.3}s {:>5} {}] {}",
            record.level(),
            short_target(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<RecognitionLogger> = OnceLock::new();

/// Install the stderr logger once; later calls keep the first level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| RecognitionLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// `EnvFilter` directives for `level` on the recognition crates, capped at
/// `warn` for every other target.
#[cfg(any(feature = "tracing", test))]
fn default_directives(level: LevelFilter) -> String {
    let own = level.to_string().to_ascii_lowercase();
    let mut directives = level.min(LevelFilter::Warn).to_string().to_ascii_lowercase();
    for krate in OWN_CRATES {
        directives.push_str(&format!(",{krate}={own}"));
    }
    directives
}

/// Install a `tracing` subscriber honoring `RUST_LOG`; without it, `level`
/// applies to the recognition crates and `warn` elsewhere.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let builder = fmt().with_env_filter(filter).with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder.with_timer(fmt::time::Uptime::default()).finish().try_init()
    };
}
