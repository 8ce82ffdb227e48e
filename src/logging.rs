use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::config::LoggingConfig;

/// Installs a JSON-lines subscriber writing to the configured log file.
///
/// The dashboard owns stdout, so nothing is installed when no file is set.
pub fn init_tracing_json(logging: &LoggingConfig) -> Result<()> {
    let Some(path) = logging.file.as_deref() else {
        return Ok(());
    };

    ensure_parent_dir(path)?;
    let file = File::create(path)?;
    let filter = EnvFilter::try_new(&logging.level)
        .map_err(|e| eyre!("invalid log level {:?}: {e}", logging.level))?;

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| eyre!("failed to set tracing subscriber: {e}"))?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_file_installs_nothing() {
        let logging = LoggingConfig::default();
        assert!(init_tracing_json(&logging).is_ok());
    }

    #[test]
    fn parent_dirs_are_created() {
        let dir = std::env::temp_dir().join("statwatch_logging_test").join("nested");
        let _ = fs::remove_dir_all(&dir);
        ensure_parent_dir(&dir.join("run.log")).unwrap();
        assert!(dir.is_dir());
        let _ = fs::remove_dir_all(&dir);
    }
}
