// Mon Feb 02 2026 - Alex

use env_logger::{Builder, Env, Target, WriteStyle};
use log::LevelFilter;
use std::io::Write;
use std::time::Instant;

pub struct LoggingUtils;

impl LoggingUtils {
    pub fn level_from_str(s: &str) -> LevelFilter {
        match s.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info,
        }
    }
}

/// Installs the process-wide env_logger backend.
///
/// Lines go to stdout as `<timestamp> [LEVEL] message`. `RUST_LOG`, when set,
/// wins over `level`. Safe to call more than once; later calls are ignored.
pub fn init_logging(level: LevelFilter, color: bool) {
    let env = Env::default().default_filter_or(level.to_string().to_lowercase());

    let mut builder = Builder::from_env(env);
    builder
        .target(Target::Stdout)
        .write_style(if color { WriteStyle::Auto } else { WriteStyle::Never })
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{} [{style}{}{style:#}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        });

    builder.try_init().ok();
}

pub struct ScopedTimer {
    name: String,
    start: Instant,
}

impl ScopedTimer {
    pub fn new(name: &str) -> Self {
        log::debug!("[TIMER] {} started", name);
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        log::debug!("[TIMER] {} took {:.2}ms", self.name, elapsed.as_secs_f64() * 1000.0);
    }
}
