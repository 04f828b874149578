//! Transport-Schnittstelle zwischen Bot-Logik und ServerQuery-Verbindung
//!
//! Die Lobby-Logik kennt nur diesen Trait. Produktiv steckt dahinter der
//! [`QueryClient`](crate::QueryClient), in Tests ein aufzeichnender Mock.

use async_trait::async_trait;
use kanalwart_core::LobbyEreignis;
use tokio::sync::broadcast;

use crate::befehl::{Antwort, Befehl};
use crate::error::QueryResult;

#[async_trait]
pub trait QueryTransport: Send + Sync + 'static {
    /// Sendet einen Befehl und wartet auf dessen vollstaendige Antwort
    ///
    /// Implementierungen muessen nebenlaeufige Aufrufe serialisieren oder
    /// korrekt zuordnen.
    async fn senden(&self, befehl: Befehl) -> QueryResult<Antwort>;

    /// Abonniert alle zukuenftigen Lobby-Ereignisse
    fn ereignisse_abonnieren(&self) -> broadcast::Receiver<LobbyEreignis>;
}
