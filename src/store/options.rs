use std::fmt;
use std::sync::Arc;

use log::{Level, Log, Metadata, Record};

const DEFAULT_LOG_TARGET: &str = "docstore";

/// Construction-time settings of a [`Driver`](crate::Driver).
///
/// ```
/// use docstore_kit::Options;
///
/// let options = Options::new().with_sync(false).with_log_target("app::db");
/// assert!(!options.sync());
/// ```
#[derive(Clone)]
pub struct Options {
    logger: Option<Arc<dyn Log>>,
    log_target: String,
    sync: bool,
}

impl Options {
    /// Global `log` logger, fsync before rename.
    pub fn new() -> Self {
        Self {
            logger: None,
            log_target: DEFAULT_LOG_TARGET.to_string(),
            sync: true,
        }
    }

    /// Sends the driver's diagnostics to `logger` instead of the global logger.
    pub fn with_logger(mut self, logger: Arc<dyn Log>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_log_target(mut self, target: &str) -> Self {
        self.log_target = target.to_string();
        self
    }

    /// If `true`, the temp file is flushed to disk before it replaces the record.
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    pub fn sync(&self) -> bool {
        self.sync
    }

    pub fn log_target(&self) -> &str {
        &self.log_target
    }

    pub(crate) fn into_sink(self) -> Sink {
        Sink {
            logger: self.logger,
            target: self.log_target,
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("logger", &self.logger.as_ref().map(|_| "custom"))
            .field("log_target", &self.log_target)
            .field("sync", &self.sync)
            .finish()
    }
}

/// Leveled diagnostics output owned by a driver.
pub(crate) struct Sink {
    logger: Option<Arc<dyn Log>>,
    target: String,
}

impl Sink {
    pub fn emit(&self, level: Level, module_path: &'static str, args: fmt::Arguments<'_>) {
        let logger: &dyn Log = match &self.logger {
            Some(logger) => logger.as_ref(),
            None => {
                if level > log::max_level() {
                    return;
                }
                log::logger()
            }
        };

        let metadata = Metadata::builder().level(level).target(&self.target).build();
        if !logger.enabled(&metadata) {
            return;
        }
        logger.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .module_path_static(Some(module_path))
                .build(),
        );
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").field("target", &self.target).finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Logger that keeps every record it receives.
    #[derive(Default)]
    pub struct CaptureLogger {
        records: Mutex<Vec<(Level, String, String)>>,
        modules: Mutex<Vec<Option<String>>>,
    }

    impl CaptureLogger {
        pub fn records(&self) -> Vec<(Level, String, String)> {
            self.records.lock().clone()
        }

        /// Module path of every record, in arrival order.
        pub fn modules(&self) -> Vec<Option<String>> {
            self.modules.lock().clone()
        }

        pub fn messages(&self) -> Vec<String> {
            self.records().into_iter().map(|(_, _, msg)| msg).collect()
        }
    }

    impl Log for CaptureLogger {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.records.lock().push((
                record.level(),
                record.target().to_string(),
                record.args().to_string(),
            ));
            self.modules.lock().push(record.module_path().map(str::to_string));
        }

        fn flush(&self) {}
    }
}
