/*
 * Logger configuration
 *
 * The configuration lives in the [logging] table of the engine's TOML file
 * (a bare table without the wrapper is accepted too). It selects where log
 * lines go (console or file) and the minimum severity that gets written.
 * Level and type names are matched case-insensitively.
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Log severity levels, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(serde::de::Error::unknown_variant(
                &s,
                &["debug", "info", "warn", "warning", "error"],
            )),
        }
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Where formatted log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogType {
    Console,
    File,
}

impl<'de> Deserialize<'de> for LogType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "console" => Ok(LogType::Console),
            "file" => Ok(LogType::File),
            _ => Err(serde::de::Error::unknown_variant(&s, &["console", "file"])),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(rename = "type")]
    pub log_type: LogType,

    /// Minimum level that gets written.
    pub threshold: LogLevel,

    /// Log file name, required when `type = "file"`.
    #[serde(default)]
    pub file_path: Option<String>,

    /// Folder the log file is placed in. Created on demand.
    #[serde(default)]
    pub log_folder: Option<String>,

    /// Flush the file after every line.
    #[serde(default)]
    pub force_flush: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            log_type: LogType::Console,
            threshold: LogLevel::Info,
            file_path: None,
            log_folder: None,
            force_flush: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigWrapper {
    logging: LogConfig,
}

impl LogConfig {
    /// Reads the configuration from a TOML file.
    ///
    /// A missing file is not an error: the defaults (console, info) are used.
    pub fn from_file(file_path: &str) -> Result<Self, String> {
        let config_str = match fs::read_to_string(file_path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!(
                    "Warning: could not read config file '{}': {}. Using defaults.",
                    file_path, e
                );
                return Ok(LogConfig::default());
            }
        };

        Self::from_toml_str(&config_str)
    }

    /// Parses either a document with a `[logging]` table or a bare logging table.
    pub fn from_toml_str(config_str: &str) -> Result<Self, String> {
        match toml::from_str::<ConfigWrapper>(config_str) {
            Ok(wrapper) => Ok(wrapper.logging),
            Err(e) => toml::from_str::<LogConfig>(config_str)
                .map_err(|_| format!("Failed to parse logging config: {}", e)),
        }
    }

    /// Full path of the log file, joined with `log_folder` when one is set.
    pub fn resolved_file_path(&self) -> Result<PathBuf, String> {
        let file_path = self
            .file_path
            .as_ref()
            .ok_or_else(|| "File path not specified in logging configuration".to_string())?;

        Ok(match &self.log_folder {
            Some(folder) => Path::new(folder).join(file_path),
            None => PathBuf::from(file_path),
        })
    }
}
