//! Backend de la fachada `log`.
//!
//! Escribe en stderr y reenvía al panel las líneas del propio crate a partir
//! de `Info`, de modo que registrar y emitir al panel son una sola operación.

use super::hub::LogHub;
use crate::error::WatchError;
use chrono::Utc;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::Write;
use std::sync::Arc;

const CRATE_TARGET: &str = "executor_watch";

pub struct HubLogger {
    hub: Arc<LogHub>,
    level: LevelFilter,
}

impl HubLogger {
    pub fn new(hub: Arc<LogHub>, level: LevelFilter) -> Self {
        Self { hub, level }
    }

    /// Instala el logger global. Solo puede hacerse una vez por proceso.
    pub fn install(hub: Arc<LogHub>, level: LevelFilter) -> Result<(), WatchError> {
        log::set_boxed_logger(Box::new(Self::new(hub, level)))
            .map_err(|e| WatchError::Config(format!("logger already installed: {}", e)))?;
        log::set_max_level(level);
        Ok(())
    }

    fn forwards_to_hub(record: &Record<'_>) -> bool {
        record.level() <= Level::Info && record.target().starts_with(CRATE_TARGET)
    }
}

impl Log for HubLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = record.args().to_string();
        let stderr = std::io::stderr();
        let mut out = stderr.lock();
        let _ = writeln!(
            out,
            "{} - {} - {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            message
        );

        if Self::forwards_to_hub(record) {
            self.hub.publish(&message);
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

pub fn parse_level(raw: Option<&str>) -> Result<LevelFilter, WatchError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(LevelFilter::Info),
        Some(value) => value
            .parse::<LevelFilter>()
            .map_err(|_| WatchError::Config(format!("invalid LOG_LEVEL: {}", value))),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn record<'a>(level: Level, target: &'a str, args: std::fmt::Arguments<'a>) -> Record<'a> {
        Record::builder().level(level).target(target).args(args).build()
    }

    #[test]
    fn forwards_crate_info_lines_to_hub() {
        let hub = Arc::new(LogHub::new(10));
        let logger = HubLogger::new(Arc::clone(&hub), LevelFilter::Debug);

        logger.log(&record(Level::Info, "executor_watch::scheduler", format_args!("tick")));
        logger.log(&record(Level::Debug, "executor_watch::scheduler", format_args!("detalle")));
        logger.log(&record(Level::Warn, "hyper::proto", format_args!("ruido")));

        let history = hub.history();
        assert_eq!(history.len(), 1);
        assert!(history[0].ends_with("] tick"));
    }

    #[test]
    fn respects_level_filter() {
        let hub = Arc::new(LogHub::new(10));
        let logger = HubLogger::new(Arc::clone(&hub), LevelFilter::Warn);
        logger.log(&record(Level::Info, "executor_watch", format_args!("oculto")));
        assert!(hub.history().is_empty());
    }

    #[test]
    fn parses_log_level() {
        assert_eq!(parse_level(None).unwrap(), LevelFilter::Info);
        assert_eq!(parse_level(Some("debug")).unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level(Some(" WARN ")).unwrap(), LevelFilter::Warn);
        assert!(parse_level(Some("verbose")).is_err());
    }

    #[test]
    fn global_logger_feeds_shared_hub() {
        let hub = test_support::global_hub();
        log::info!("marker-global-logger-feed");
        assert!(hub
            .history()
            .iter()
            .any(|line| line.ends_with("marker-global-logger-feed")));
    }
}
