//! Fehlertypen fuer den ServerQuery-Client

use thiserror::Error;

/// Fehler-Id des Servers fuer "channel name is already in use"
pub const FEHLER_KANALNAME_VERGEBEN: u32 = 771;

/// Einordnung eines Fehlers fuer Wiederholungsentscheidungen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fehlerart {
    /// Gleicher Befehl mit anderen Parametern kann gelingen (z.B. Namenskollision)
    Wiederholbar,
    /// Wiederholen ist zwecklos (Rechte, Verbindung weg, kaputte Antwort)
    Fatal,
    /// Transport kann die Ursache nicht unterscheiden
    Unbekannt,
}

/// Alle moeglichen Fehler im Query-Crate
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    #[error("Verbindung getrennt")]
    Getrennt,

    #[error("Server-Fehler {id}: {msg}")]
    Server {
        id: u32,
        msg: String,
        extra: Option<String>,
    },

    #[error("Protokollfehler: {0}")]
    Protokoll(String),

    #[error("Ungueltige Antwort: {0}")]
    UngueltigeAntwort(String),

    #[error("{0}")]
    Sonstiges(String),
}

pub type QueryResult<T> = Result<T, QueryError>;

impl QueryError {
    /// Erstellt einen Server-Fehler ohne Zusatztext
    pub fn server(id: u32, msg: impl Into<String>) -> Self {
        Self::Server {
            id,
            msg: msg.into(),
            extra: None,
        }
    }

    /// Ordnet den Fehler fuer Wiederholungen ein
    pub fn art(&self) -> Fehlerart {
        match self {
            Self::Server { id, .. } if *id == FEHLER_KANALNAME_VERGEBEN => Fehlerart::Wiederholbar,
            Self::Sonstiges(_) => Fehlerart::Unbekannt,
            _ => Fehlerart::Fatal,
        }
    }

    /// Gibt die Server-Fehler-Id zurueck, falls vorhanden
    pub fn server_id(&self) -> Option<u32> {
        match self {
            Self::Server { id, .. } => Some(*id),
            _ => None,
        }
    }
}
