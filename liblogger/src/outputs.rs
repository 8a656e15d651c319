/*
 * Log output backends
 *
 * ConsoleOutput writes to stdout, FileOutput appends to a file and optionally
 * flushes after every line. Both implement LogOutput; create_log_output picks
 * one from the configuration.
 */

use std::fs::{File, OpenOptions};
use std::io::{self, Write};

use crate::config::{LogConfig, LogType};

pub trait LogOutput: Send {
    fn write_log(&mut self, formatted_message: &str) -> Result<(), String>;

    fn flush(&mut self) -> Result<(), String> {
        Ok(())
    }
}

pub struct ConsoleOutput;

impl LogOutput for ConsoleOutput {
    fn write_log(&mut self, formatted_message: &str) -> Result<(), String> {
        writeln!(io::stdout(), "{}", formatted_message)
            .map_err(|e| format!("Failed to write to console: {}", e))
    }

    fn flush(&mut self) -> Result<(), String> {
        io::stdout()
            .flush()
            .map_err(|e| format!("Failed to flush console output: {}", e))
    }
}

pub struct FileOutput {
    file: File,
    force_flush: bool,
}

impl FileOutput {
    pub fn new(config: &LogConfig) -> Result<Self, String> {
        let path = config.resolved_file_path()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create log directory: {}", e))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| format!("Failed to open log file '{}': {}", path.display(), e))?;

        Ok(FileOutput {
            file,
            force_flush: config.force_flush,
        })
    }
}

impl LogOutput for FileOutput {
    fn write_log(&mut self, formatted_message: &str) -> Result<(), String> {
        self.file
            .write_all(formatted_message.as_bytes())
            .and_then(|_| self.file.write_all(b"\n"))
            .map_err(|e| format!("Failed to write to log file: {}", e))?;

        if self.force_flush {
            self.flush()?;
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), String> {
        self.file
            .flush()
            .map_err(|e| format!("Failed to flush log file: {}", e))
    }
}

pub fn create_log_output(config: &LogConfig) -> Result<Box<dyn LogOutput>, String> {
    match config.log_type {
        LogType::Console => Ok(Box::new(ConsoleOutput)),
        LogType::File => Ok(Box::new(FileOutput::new(config)?)),
    }
}
