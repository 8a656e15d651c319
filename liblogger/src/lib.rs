/*
 * Public surface of the logging crate
 *
 * Re-exports the Logger entry points and the configuration types, and defines
 * the log_debug!/log_info!/log_warn!/log_error! macros. The macros capture the
 * call site (file, line, module) so callers only supply the message and an
 * optional context string.
 */

mod config;
mod logger;
mod outputs;

pub use config::{LogConfig, LogLevel, LogType};
pub use logger::Logger;

#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        $crate::Logger::debug($message, None, file!(), line!(), module_path!())
    };
    ($message:expr, $context:expr) => {
        $crate::Logger::debug($message, $context, file!(), line!(), module_path!())
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::Logger::info($message, None, file!(), line!(), module_path!())
    };
    ($message:expr, $context:expr) => {
        $crate::Logger::info($message, $context, file!(), line!(), module_path!())
    };
}

#[macro_export]
macro_rules! log_warn {
    ($message:expr) => {
        $crate::Logger::warn($message, None, file!(), line!(), module_path!())
    };
    ($message:expr, $context:expr) => {
        $crate::Logger::warn($message, $context, file!(), line!(), module_path!())
    };
}

#[macro_export]
macro_rules! log_error {
    ($message:expr) => {
        $crate::Logger::error($message, None, file!(), line!(), module_path!())
    };
    ($message:expr, $context:expr) => {
        $crate::Logger::error($message, $context, file!(), line!(), module_path!())
    };
}
