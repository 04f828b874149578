//! TCP-Verbindung zu einem ServerQuery-Server
//!
//! Nutzt den [`QueryCodec`] fuer das Zeilenformat. Eine Lese-Task verteilt
//! eingehende Zeilen: Benachrichtigungen gehen an den Broadcast-Kanal,
//! alles andere an den gerade wartenden Befehl.

use futures_util::stream::{SplitSink, StreamExt};
use futures_util::SinkExt;
use kanalwart_core::{ClientId, KanalId, LobbyEreignis};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;

use async_trait::async_trait;

use crate::befehl::{Antwort, Befehl, Datensatz};
use crate::codec::{Eingang, QueryCodec};
use crate::error::{QueryError, QueryResult};
use crate::parser::Zeile;
use crate::transport::QueryTransport;

/// Puffergroesse fuer noch nicht abgeholte Antwortzeilen
const ANTWORT_PUFFER: usize = 64;

/// Puffergroesse des Ereignis-Broadcasts
const EREIGNIS_PUFFER: usize = 128;

type Schreiber = SplitSink<Framed<TcpStream, QueryCodec>, Befehl>;

/// Schreibseite plus Antwortzeilen; wird pro Befehl exklusiv gesperrt
struct SendeSeite {
    schreiber: Schreiber,
    antworten: mpsc::Receiver<Zeile>,
}

/// ServerQuery-Client ueber TCP
pub struct QueryClient {
    sende_seite: Mutex<SendeSeite>,
    /// Vorlage fuer neue Abonnements; der Sender lebt nur in der Lese-Task
    ereignis_vorlage: broadcast::Receiver<LobbyEreignis>,
    leser: JoinHandle<()>,
}

impl QueryClient {
    /// Baut eine TCP-Verbindung auf und liest die Begruessung
    pub async fn verbinden(adresse: &str, port: u16) -> QueryResult<Self> {
        tracing::info!(adresse, port, "Verbinde mit ServerQuery");
        let stream = TcpStream::connect((adresse, port)).await?;
        Self::von_stream(stream).await
    }

    /// Uebernimmt einen bereits verbundenen Stream
    pub async fn von_stream(stream: TcpStream) -> QueryResult<Self> {
        let (schreiber, mut eingaenge) = Framed::new(stream, QueryCodec::new()).split();

        // Begruessung: "TS3" + Willkommenszeile
        let mut gelesen = 0;
        while gelesen < 2 {
            match eingaenge.next().await {
                Some(Ok(Eingang::Begruessung(zeile))) => {
                    tracing::debug!(zeile = %zeile, "Begruessung empfangen");
                    gelesen += 1;
                }
                Some(Ok(Eingang::Zeile(zeile))) => {
                    return Err(QueryError::Protokoll(format!(
                        "Unerwartete Zeile waehrend der Begruessung: {zeile:?}"
                    )));
                }
                Some(Err(e)) => return Err(e),
                None => return Err(QueryError::Getrennt),
            }
        }

        let (antwort_tx, antworten) = mpsc::channel(ANTWORT_PUFFER);
        let (ereignis_tx, ereignis_vorlage) = broadcast::channel(EREIGNIS_PUFFER);

        let leser = tokio::spawn(async move {
            while let Some(eingang) = eingaenge.next().await {
                match eingang {
                    Ok(Eingang::Zeile(Zeile::Benachrichtigung { name, datensaetze })) => {
                        for ereignis in ereignisse_aus_benachrichtigung(&name, &datensaetze) {
                            // Fehler heisst nur: gerade niemand abonniert
                            let _ = ereignis_tx.send(ereignis);
                        }
                    }
                    Ok(Eingang::Zeile(zeile)) => {
                        if antwort_tx.send(zeile).await.is_err() {
                            break;
                        }
                    }
                    Ok(Eingang::Begruessung(zeile)) => {
                        tracing::debug!(zeile = %zeile, "Verspaetete Begruessungszeile ignoriert");
                    }
                    Err(e) => {
                        tracing::warn!(fehler = %e, "Lesefehler auf ServerQuery-Verbindung");
                        break;
                    }
                }
            }
            tracing::info!("ServerQuery-Verbindung beendet");
        });

        Ok(Self {
            sende_seite: Mutex::new(SendeSeite {
                schreiber,
                antworten,
            }),
            ereignis_vorlage,
            leser,
        })
    }
}

impl Drop for QueryClient {
    fn drop(&mut self) {
        self.leser.abort();
    }
}

#[async_trait]
impl QueryTransport for QueryClient {
    async fn senden(&self, befehl: Befehl) -> QueryResult<Antwort> {
        let mut seite = self.sende_seite.lock().await;

        // Reste eines abgebrochenen Befehls verwerfen
        while let Ok(rest) = seite.antworten.try_recv() {
            tracing::debug!(zeile = ?rest, "Verwaiste Antwortzeile verworfen");
        }

        tracing::trace!(befehl = ?befehl, "Sende Befehl");
        seite.schreiber.send(befehl).await?;

        let mut datensaetze = Vec::new();
        loop {
            match seite.antworten.recv().await {
                Some(Zeile::Daten(mut daten)) => datensaetze.append(&mut daten),
                Some(Zeile::Fehler { id: 0, .. }) => return Ok(Antwort { datensaetze }),
                Some(Zeile::Fehler { id, msg, extra }) => {
                    return Err(QueryError::Server { id, msg, extra })
                }
                Some(Zeile::Benachrichtigung { name, .. }) => {
                    tracing::debug!(name = %name, "Benachrichtigung im Antwortpfad ignoriert");
                }
                None => return Err(QueryError::Getrennt),
            }
        }
    }

    fn ereignisse_abonnieren(&self) -> broadcast::Receiver<LobbyEreignis> {
        self.ereignis_vorlage.resubscribe()
    }
}

/// Wandelt eine `notify*`-Zeile in Lobby-Ereignisse um
///
/// Eine Benachrichtigung kann mehrere Clients betreffen (mit `|` getrennt).
pub fn ereignisse_aus_benachrichtigung(name: &str, datensaetze: &[Datensatz]) -> Vec<LobbyEreignis> {
    let bauen: fn(ClientId, KanalId) -> LobbyEreignis = match name {
        "clientmoved" => |clid, ctid| LobbyEreignis::ClientVerschoben { clid, ctid },
        "cliententerview" => |clid, ctid| LobbyEreignis::ClientBetreten { clid, ctid },
        _ => {
            tracing::debug!(name, "Benachrichtigung ignoriert");
            return Vec::new();
        }
    };

    datensaetze
        .iter()
        .filter_map(|d| match (d.id::<ClientId>("clid"), d.id::<KanalId>("ctid")) {
            (Ok(clid), Ok(ctid)) => Some(bauen(clid, ctid)),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(name, fehler = %e, "Benachrichtigung mit ungueltigen Ids verworfen");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_datensaetze;

    #[test]
    fn verschoben_wird_erkannt() {
        let ds = parse_datensaetze("ctid=1 reasonid=1 invokerid=2 clid=7");
        let ev = ereignisse_aus_benachrichtigung("clientmoved", &ds);
        assert_eq!(
            ev,
            vec![LobbyEreignis::ClientVerschoben {
                clid: ClientId(7),
                ctid: KanalId(1)
            }]
        );
    }

    #[test]
    fn mehrere_clients_in_einer_zeile() {
        let ds = parse_datensaetze("ctid=4 reasonid=1 clid=2|clid=3");
        // Zweiter Datensatz ohne ctid ist ungueltig und faellt weg
        let ev = ereignisse_aus_benachrichtigung("clientmoved", &ds);
        assert_eq!(ev.len(), 1);
        assert_eq!(ev[0].client(), ClientId(2));
    }

    #[test]
    fn betreten_wird_erkannt() {
        let ds = parse_datensaetze(r"cfid=0 ctid=1 reasonid=0 clid=12 client_nickname=Bob");
        let ev = ereignisse_aus_benachrichtigung("cliententerview", &ds);
        assert_eq!(
            ev,
            vec![LobbyEreignis::ClientBetreten {
                clid: ClientId(12),
                ctid: KanalId(1)
            }]
        );
    }

    #[test]
    fn andere_benachrichtigungen_werden_ignoriert() {
        let ds = parse_datensaetze("cfid=1 ctid=0 reasonid=8 clid=5");
        assert!(ereignisse_aus_benachrichtigung("clientleftview", &ds).is_empty());
    }
}
