//! tokio-util Codec fuer ServerQuery-Verbindungen
//!
//! ## Zeilen-Format
//!
//! ```text
//! TS3\n\r                                   <- Begruessung, Zeile 1
//! Welcome to the ... ServerQuery ...\n\r    <- Begruessung, Zeile 2
//! cid=5\n\r                                 <- Daten
//! error id=0 msg=ok\n\r                     <- Abschluss
//! notifyclientmoved ctid=1 clid=7\n\r       <- jederzeit moeglich
//! ```
//!
//! Der Server beendet Zeilen mit `\n\r`. Der Codec trennt an `\n` und
//! entfernt das fuehrende `\r` der Folgezeile.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::befehl::Befehl;
use crate::error::QueryError;
use crate::parser::{parse_zeile, Zeile};

/// Standard-maximale Zeilenlaenge (64 KiB)
pub const DEFAULT_MAX_ZEILENLAENGE: usize = 64 * 1024;

/// Anzahl der Begruessungszeilen nach dem Verbindungsaufbau
const BEGRUESSUNG_ZEILEN: u8 = 2;

/// Erste Zeile, die ein ServerQuery-Server nach dem Connect sendet
pub const BEGRUESSUNG_KENNUNG: &str = "TS3";

/// Dekodierte Eingangszeile
#[derive(Debug, Clone, PartialEq)]
pub enum Eingang {
    /// Eine der beiden Begruessungszeilen
    Begruessung(String),
    /// Jede weitere Zeile
    Zeile(Zeile),
}

/// Codec fuer `Framed<TcpStream, QueryCodec>`
#[derive(Debug, Clone)]
pub struct QueryCodec {
    max_zeilenlaenge: usize,
    begruessung_offen: u8,
}

impl QueryCodec {
    /// Erstellt einen neuen `QueryCodec` mit Standard-Limits
    pub fn new() -> Self {
        Self::with_max_laenge(DEFAULT_MAX_ZEILENLAENGE)
    }

    /// Erstellt einen `QueryCodec` mit benutzerdefinierter maximaler Zeilenlaenge
    pub fn with_max_laenge(max_zeilenlaenge: usize) -> Self {
        Self {
            max_zeilenlaenge,
            begruessung_offen: BEGRUESSUNG_ZEILEN,
        }
    }
}

impl Default for QueryCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for QueryCodec {
    type Item = Eingang;
    type Error = QueryError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(pos) = src.iter().position(|b| *b == b'\n') else {
                if src.len() > self.max_zeilenlaenge {
                    return Err(QueryError::Protokoll(format!(
                        "Zeile zu lang: {} Bytes (Maximum: {} Bytes)",
                        src.len(),
                        self.max_zeilenlaenge
                    )));
                }
                return Ok(None);
            };

            let roh = src.split_to(pos + 1);
            let text = std::str::from_utf8(&roh)
                .map_err(|_| QueryError::Protokoll("Zeile ist kein UTF-8".into()))?;
            let zeile = text.trim_matches(|c| c == '\r' || c == '\n');
            if zeile.is_empty() {
                continue;
            }

            if self.begruessung_offen > 0 {
                if self.begruessung_offen == BEGRUESSUNG_ZEILEN && zeile != BEGRUESSUNG_KENNUNG {
                    return Err(QueryError::Protokoll(format!(
                        "Kein ServerQuery-Server, erste Zeile: {zeile}"
                    )));
                }
                self.begruessung_offen -= 1;
                return Ok(Some(Eingang::Begruessung(zeile.to_string())));
            }

            return parse_zeile(zeile).map(|z| Some(Eingang::Zeile(z)));
        }
    }
}

impl Encoder<Befehl> for QueryCodec {
    type Error = QueryError;

    fn encode(&mut self, befehl: Befehl, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let zeile = befehl.zeile();
        dst.reserve(zeile.len() + 1);
        dst.put_slice(zeile.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}
