use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();
static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// `$HOME/.local/share/lumisyncrs/logs/app.log`
pub fn log_file_path() -> Result<PathBuf, Error> {
    let home = std::env::var_os("HOME")
        .ok_or_else(|| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))?;

    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("lumisyncrs")
        .join("logs")
        .join("app.log"))
}

/// Append this crate's debug-level logs to [`log_file_path`]. Records from
/// other crates (midir backends) are filtered out. Returns the log path.
pub fn init_logger() -> Result<PathBuf, Error> {
    let path = log_file_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let log_file = OpenOptions::new().create(true).append(true).open(&path)?;

    INIT.call_once(|| {
        let config = ConfigBuilder::new()
            .add_filter_allow_str("lumisyncrs")
            .set_time_format_rfc3339()
            .build();
        if WriteLogger::init(LevelFilter::Debug, config, log_file).is_ok() {
            LOGGER_INITIALIZED.store(true, Ordering::SeqCst);
        }
    });

    if LOGGER_INITIALIZED.load(Ordering::SeqCst) {
        Ok(path)
    } else {
        Err(Error::new(ErrorKind::Other, "Logger initialization failed"))
    }
}
