//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable, die Vorrang vor der Datei hat:
//! - `KW_LOG_LEVEL`: Filter (trace/debug/info/warn/error oder EnvFilter-Direktiven)
//! - `KW_LOG_FORMAT`: Format (text/json)

use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "KW_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "KW_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// Faellt auf `info` / `text` zurueck, wenn weder Umgebung noch
/// Konfiguration einen gueltigen Wert liefern.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env(ENV_LOG_LEVEL)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format = format_aufloesen(std::env::var(ENV_LOG_FORMAT).ok(), format);

    match format {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_current_span(true)
                .init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Waehlt das Format: Umgebung vor Konfiguration, Unbekanntes wird `text`
pub fn format_aufloesen(aus_env: Option<String>, konfiguriert: &str) -> &'static str {
    let gewaehlt = aus_env.as_deref().unwrap_or(konfiguriert);
    if gewaehlt == "json" {
        "json"
    } else {
        "text"
    }
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
