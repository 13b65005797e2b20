/// Structured logging for the flood dashboard
///
/// Provides context-rich logging with component and broker/topic
/// identifiers, timestamps, and severity levels. Supports both console
/// output and file-based logging for unattended kiosk operation.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Mqtt,
    Parser,
    Dashboard,
    Config,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Mqtt => write!(f, "MQTT"),
            Component::Parser => write!(f, "PARSE"),
            Component::Dashboard => write!(f, "DASH"),
            Component::Config => write!(f, "CFG"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Transient - the transport retries on its own (network blip, broker restart)
    Transient,
    /// Needs attention - wrong host/port, refused credentials, TLS problems
    Configuration,
    /// Unknown - cannot tell from the error text
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Transient => write!(f, "TRANSIENT"),
            FailureType::Configuration => write!(f, "CONFIGURATION"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
    /// Send every console line to stderr, leaving stdout for machine-readable output
    stderr_only: bool,
}

impl Logger {
    pub fn new(
        min_level: LogLevel,
        log_file: Option<String>,
        console_timestamps: bool,
        stderr_only: bool,
    ) -> Self {
        Logger {
            min_level,
            log_file,
            console_timestamps,
            stderr_only,
        }
    }

    /// Initialize the global logger
    pub fn init(self) {
        *global() = Some(self);
    }

    /// Errors and warnings always go to stderr; the rest only in stderr-only mode.
    fn writes_to_stderr(&self, level: LogLevel) -> bool {
        self.stderr_only || level >= LogLevel::Warning
    }

    /// Console text for one entry.
    fn console_line(
        &self,
        level: LogLevel,
        component: Component,
        context_part: &str,
        message: &str,
        log_entry: &str,
    ) -> String {
        if self.console_timestamps {
            return log_entry.to_string();
        }
        match level {
            LogLevel::Error => format!("   ✗ {}{}: {}", component, context_part, message),
            LogLevel::Warning => format!("   ⚠ {}{}: {}", component, context_part, message),
            LogLevel::Info => format!("   {}", message),
            LogLevel::Debug => format!("   [DEBUG] {}", message),
        }
    }

    fn log(&self, level: LogLevel, component: Component, context: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let context_part = context.map(|c| format!(" [{}]", c)).unwrap_or_default();
        let log_entry = format!(
            "{} {} {}{}: {}",
            timestamp, level, component, context_part, message
        );

        // Console output
        let line = self.console_line(level, component, &context_part, message, &log_entry);
        if self.writes_to_stderr(level) {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// A panic while printing must not silence every later log line.
fn global() -> MutexGuard<'static, Option<Logger>> {
    LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger.
///
/// With `stderr_only` set, informational lines also go to stderr so that
/// stdout carries nothing but the program's own output (e.g. JSON lines).
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
    stderr_only: bool,
) {
    Logger::new(min_level, log_file.map(String::from), console_timestamps, stderr_only).init();
}

fn emit(level: LogLevel, component: Component, context: Option<&str>, message: &str) {
    if let Some(logger) = global().as_ref() {
        logger.log(level, component, context, message);
    }
}

/// Log a general informational message
pub fn info(component: Component, context: Option<&str>, message: &str) {
    emit(LogLevel::Info, component, context, message);
}

/// Log a warning message
pub fn warn(component: Component, context: Option<&str>, message: &str) {
    emit(LogLevel::Warning, component, context, message);
}

/// Log an error message
pub fn error(component: Component, context: Option<&str>, message: &str) {
    emit(LogLevel::Error, component, context, message);
}

/// Log a debug message
pub fn debug(component: Component, context: Option<&str>, message: &str) {
    emit(LogLevel::Debug, component, context, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a broker connection failure from its error text
pub fn classify_connection_failure(error_message: &str) -> FailureType {
    let msg = error_message.to_ascii_lowercase();

    // DNS failures, refused credentials and TLS problems will not fix themselves
    if msg.contains("failed to lookup")
        || msg.contains("name or service not known")
        || msg.contains("not authorized")
        || msg.contains("bad user name or password")
        || msg.contains("tls")
    {
        FailureType::Configuration
    }
    // Dropped sockets and timeouts are retried by the transport
    else if msg.contains("connection refused")
        || msg.contains("connection reset")
        || msg.contains("connection aborted")
        || msg.contains("timed out")
        || msg.contains("timeout")
        || msg.contains("broken pipe")
        || msg.contains("network")
    {
        FailureType::Transient
    } else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a broker connection failure with automatic classification
pub fn log_connection_failure(broker: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_connection_failure(&error_msg);

    let message = format!("connection failed [{}]: {}", failure_type, error_msg);

    match failure_type {
        FailureType::Transient => warn(Component::Mqtt, Some(broker), &message),
        FailureType::Configuration => error(Component::Mqtt, Some(broker), &message),
        FailureType::Unknown => warn(Component::Mqtt, Some(broker), &message),
    }
}

/// Log a rejected payload. The payload is shown (lossily decoded and
/// truncated) so malformed publishers can be identified.
pub fn log_payload_rejection(topic: &str, payload: &[u8], err: &dyn std::error::Error) {
    let message = format!(
        "payload rejected, keeping last reading: {} (payload: {:?})",
        err,
        preview(payload, 80)
    );
    warn(Component::Parser, Some(topic), &message);
}

fn preview(payload: &[u8], max_chars: usize) -> String {
    let text = String::from_utf8_lossy(payload);
    if text.chars().count() <= max_chars {
        text.into_owned()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push('…');
        cut
    }
}

// ---------------------------------------------------------------------------
// Ingest Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of accepted vs rejected payloads
pub fn log_ingest_summary(accepted: u64, rejected: u64) {
    let total = accepted + rejected;
    let message = format!(
        "Ingest summary: {}/{} payloads accepted, {} rejected",
        accepted, total, rejected
    );

    if rejected == 0 {
        info(Component::Dashboard, None, &message);
    } else if accepted == 0 {
        error(Component::Dashboard, None, &message);
    } else {
        warn(Component::Dashboard, None, &message);
    }
}
