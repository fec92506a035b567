//! Terminal logging with colored module prefixes.
//!
//! ```ignore
//! log!("load"; "{} failed: {}", source, err);
//! debug!("select"; "{} of {} candidates survived", kept, total);
//! ```
//!
//! Everything goes to stderr so stdout stays reserved for extracted colors.

use std::io::{stderr, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::style::Stylize;

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Log a message with a colored module prefix
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Write one log line to stderr.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut err = stderr().lock();
    writeln!(err, "{prefix} {message}").ok();
    err.flush().ok();
}

fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "load" | "error" => prefix.red().bold().to_string(),
        "quantize" => prefix.blue().bold().to_string(),
        "select" => prefix.green().bold().to_string(),
        _ => prefix.yellow().bold().to_string(),
    }
}
