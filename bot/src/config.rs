//! Bot-Konfiguration
//!
//! Wird beim Start aus einer TOML- oder JSON-Datei geladen. Die Schluessel
//! liegen flach auf oberster Ebene (wie in der bisherigen `config.json`),
//! nur das Logging hat einen eigenen Abschnitt. Alle Felder haben
//! Standardwerte, sodass der Bot ohne Konfigurationsdatei startet.

use std::fmt;

use anyhow::Context;
use kanalwart_lobby::LobbyKonfig;
use kanalwart_observability::logging::{log_format_gueltig, log_level_gueltig};
use serde::{Deserialize, Serialize};

/// Vollstaendige Bot-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Verbindung und Query-Login
    #[serde(flatten)]
    pub verbindung: VerbindungsEinstellungen,
    /// Lobby, Kanaele und Berechtigungen
    #[serde(flatten)]
    pub lobby: LobbyKonfig,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// ServerQuery-Verbindung
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerbindungsEinstellungen {
    /// Hostname oder IP des Servers
    #[serde(rename = "address")]
    pub adresse: String,
    /// ServerQuery-Port
    #[serde(rename = "queryport", alias = "query_port")]
    pub query_port: u16,
    /// Voice-Port des virtuellen Servers (fuer `use`)
    #[serde(rename = "serverport", alias = "server_port")]
    pub server_port: u16,
    /// Query-Login
    #[serde(rename = "username")]
    pub benutzername: String,
    /// Query-Passwort
    #[serde(rename = "password")]
    pub passwort: String,
    /// Anzeigename des Query-Clients (optional)
    #[serde(rename = "botName", alias = "bot_name")]
    pub bot_name: Option<String>,
}

impl Default for VerbindungsEinstellungen {
    fn default() -> Self {
        Self {
            adresse: "localhost".into(),
            query_port: 10011,
            server_port: 9987,
            benutzername: "serveradmin".into(),
            passwort: String::new(),
            bot_name: None,
        }
    }
}

impl fmt::Debug for VerbindungsEinstellungen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerbindungsEinstellungen")
            .field("adresse", &self.adresse)
            .field("query_port", &self.query_port)
            .field("server_port", &self.server_port)
            .field("benutzername", &self.benutzername)
            .field("passwort", &"***")
            .field("bot_name", &self.bot_name)
            .finish()
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl BotConfig {
    /// Laedt die Konfiguration aus einer TOML- oder JSON-Datei (nach Endung).
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => Self::parsen(pfad, &inhalt)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Konfigurationsdatei '{pfad}' nicht lesbar"))
            }
        };

        config
            .validieren()
            .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
        Ok(config)
    }

    /// Prueft Lobby- und Logging-Werte
    ///
    /// Ein unbekanntes Log-Level wuerde als Target-Direktive gelesen und
    /// jede Ausgabe unterdruecken, auch Fehler.
    pub fn validieren(&self) -> Result<(), String> {
        self.lobby.validieren()?;
        if !log_level_gueltig(&self.logging.level) {
            return Err(format!(
                "logging.level muss trace, debug, info, warn oder error sein, nicht '{}'",
                self.logging.level
            ));
        }
        if !log_format_gueltig(&self.logging.format) {
            return Err(format!(
                "logging.format muss text oder json sein, nicht '{}'",
                self.logging.format
            ));
        }
        Ok(())
    }

    fn parsen(pfad: &str, inhalt: &str) -> anyhow::Result<Self> {
        if pfad.ends_with(".json") {
            serde_json::from_str(inhalt)
                .with_context(|| format!("Konfigurationsfehler in '{pfad}'"))
        } else {
            toml::from_str(inhalt).with_context(|| format!("Konfigurationsfehler in '{pfad}'"))
        }
    }
}
