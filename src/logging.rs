//! Logger setup for the binary: env_logger, optionally writing to a file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;
use order_history_gen::LoggingConfig;

/// Parses a level name; unknown names fall back to `debug`.
pub fn level_or_debug(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Debug)
}

/// Creates the parent directory of `path`. If that fails the log goes to the
/// bare file name in the working directory.
fn prepare_log_path(path: &Path) -> (PathBuf, Option<String>) {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => match std::fs::create_dir_all(dir) {
            Ok(()) => (path.to_path_buf(), None),
            Err(e) => {
                let fallback = path
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("order-history.log"));
                let warning = format!(
                    "failed to create log directory path={} error={}; logging to {}",
                    path.display(),
                    e,
                    fallback.display()
                );
                (fallback, Some(warning))
            }
        },
        _ => (path.to_path_buf(), None),
    }
}

/// Installs the global logger. `RUST_LOG` overrides the configured level.
pub fn init(config: &LoggingConfig, level_override: Option<&str>) -> anyhow::Result<()> {
    let level = level_or_debug(level_override.unwrap_or(&config.level));
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.parse_default_env();
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {} {}: {}",
            buf.timestamp_millis(),
            record.target(),
            record.level(),
            record.args()
        )
    });

    let mut warning = None;
    if let Some(path) = &config.file {
        let (path, warn) = prepare_log_path(path);
        warning = warn;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(config.append)
            .truncate(!config.append)
            .open(&path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init()?;

    if let Some(warning) = warning {
        log::warn!("{}", warning);
    }
    Ok(())
}
