//! Fehlertypen fuer die Lobby-Logik

use kanalwart_query::QueryError;
use thiserror::Error;

/// Alle moeglichen Fehler im Lobby-Crate
#[derive(Debug, Error)]
pub enum LobbyError {
    #[error("Query-Fehler: {0}")]
    Query(#[from] QueryError),

    #[error("Kanal konnte nach {versuche} Versuchen nicht erstellt werden")]
    ZuVieleVersuche { versuche: u32 },

    #[error("Ungueltige Antwort: {0}")]
    UngueltigeAntwort(String),
}

pub type LobbyResult<T> = Result<T, LobbyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = LobbyError::ZuVieleVersuche { versuche: 6 };
        assert_eq!(e.to_string(), "Kanal konnte nach 6 Versuchen nicht erstellt werden");
    }

    #[test]
    fn query_fehler_konvertierung() {
        let e: LobbyError = QueryError::server(2568, "insufficient client permissions").into();
        assert!(matches!(e, LobbyError::Query(_)));
        assert!(e.to_string().contains("2568"));
    }
}
