/*
 * Global logger
 *
 * A single LoggerInner lives behind a OnceCell + Mutex. Until it is
 * initialized, lines at Info and above go to stderr so early setup messages
 * are not lost. Writes are synchronous: the engine logs from setup and
 * teardown paths, never from a hot loop.
 */

use chrono::Utc;
use once_cell::sync::OnceCell;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::config::{LogConfig, LogLevel};
use crate::outputs::{create_log_output, LogOutput};

static LOGGER_INSTANCE: OnceCell<Mutex<LoggerInner>> = OnceCell::new();

const UNINITIALIZED_THRESHOLD: LogLevel = LogLevel::Info;

struct LoggerInner {
    config: Option<LogConfig>,
    output: Option<Box<dyn LogOutput>>,
}

impl LoggerInner {
    fn new() -> Self {
        LoggerInner {
            config: None,
            output: None,
        }
    }

    fn init_with_config(&mut self, config: LogConfig) -> Result<(), String> {
        let output = create_log_output(&config)?;
        if let Some(mut previous) = self.output.replace(output) {
            let _ = previous.flush();
        }
        self.config = Some(config);
        Ok(())
    }

    fn threshold(&self) -> LogLevel {
        self.config
            .as_ref()
            .map(|c| c.threshold)
            .unwrap_or(UNINITIALIZED_THRESHOLD)
    }

    fn log(&mut self, level: LogLevel, message: &str, context: Option<&str>, file: &str, line: u32, module: &str) {
        if level < self.threshold() {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let formatted = format_log_message(&timestamp, level, message, context, file, line, module);

        match self.output {
            Some(ref mut output) => {
                if let Err(e) = output.write_log(&formatted) {
                    eprintln!("Failed to write log: {}", e);
                }
            }
            None => {
                let _ = writeln!(io::stderr(), "{}", formatted);
            }
        }
    }
}

pub(crate) fn format_log_message(
    timestamp: &str,
    level: LogLevel,
    message: &str,
    context: Option<&str>,
    file: &str,
    line: u32,
    module: &str,
) -> String {
    let level_str = level.as_str();
    match context {
        Some(ctx) => format!(
            "{} [{}] [{}:{}] [{}] {} | {}",
            timestamp, level_str, file, line, module, message, ctx
        ),
        None => format!(
            "{} [{}] [{}:{}] [{}] {}",
            timestamp, level_str, file, line, module, message
        ),
    }
}

fn instance() -> &'static Mutex<LoggerInner> {
    LOGGER_INSTANCE.get_or_init(|| Mutex::new(LoggerInner::new()))
}

pub struct Logger;

impl Logger {
    /// Initializes from `inspect_config.toml` in the working directory.
    pub fn init() {
        if let Err(e) = Self::init_with_config_file("inspect_config.toml") {
            eprintln!("Failed to initialize logger: {}", e);
        }
    }

    pub fn init_with_config_file(config_path: &str) -> Result<(), String> {
        let config = LogConfig::from_file(config_path)?;
        Self::init_with_config(config)
    }

    /// Installs `config`, replacing any earlier configuration.
    pub fn init_with_config(config: LogConfig) -> Result<(), String> {
        let mut guard = instance().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.init_with_config(config)
    }

    /// Whether a message at `level` would currently be written.
    pub fn enabled(level: LogLevel) -> bool {
        match instance().lock() {
            Ok(guard) => level >= guard.threshold(),
            Err(_) => true,
        }
    }

    pub fn debug(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Debug, message, context, file, line, module)
    }

    pub fn info(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Info, message, context, file, line, module)
    }

    pub fn warn(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Warn, message, context, file, line, module)
    }

    pub fn error(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Error, message, context, file, line, module)
    }

    /// Flushes the active output, if any.
    pub fn flush() -> Result<(), String> {
        let mut guard = instance().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.output {
            Some(ref mut output) => output.flush(),
            None => Ok(()),
        }
    }

    fn log_with_metadata(level: LogLevel, message: &str, context: Option<String>, file: &str, line: u32, module: &str) {
        let file_name = Path::new(file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file);

        match instance().lock() {
            Ok(mut logger) => logger.log(level, message, context.as_deref(), file_name, line, module),
            Err(_) => {
                let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
                let entry = format_log_message(&timestamp, level, message, Some("MUTEX POISONED"), file_name, line, module);
                let _ = writeln!(io::stderr(), "{}", entry);
            }
        }
    }
}
