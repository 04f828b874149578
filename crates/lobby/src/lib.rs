//! kanalwart-lobby – Private Kanaele fuer Clients in der Lobby
//!
//! Dieses Crate implementiert:
//! - KanalProvisionierer: Kanal anlegen, bei Namenskollision mit Zahlensuffix erneut
//! - LobbyHandler: reagiert auf `clientmoved` / `cliententerview` in der Lobby
//! - Berechtigungspruefung ueber Servergruppen
//! - Zufaellige Kanal-Passwoerter
//!
//! Alle Befehle laufen ueber den [`QueryTransport`](kanalwart_query::QueryTransport).

pub mod autorisierung;
pub mod error;
pub mod handler;
pub mod konfig;
pub mod passwort;
pub mod provisioner;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use error::{LobbyError, LobbyResult};
pub use handler::{Behandlung, ClientSitzung, LobbyHandler};
pub use konfig::LobbyKonfig;
pub use passwort::KanalPasswort;
pub use provisioner::{ErstellterKanal, KanalProvisionierer};
