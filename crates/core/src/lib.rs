//! kanalwart-core – Gemeinsame Typen fuer alle Kanalwart-Crates
//!
//! Enthaelt die Id-Newtypes des ServerQuery-Protokolls und die
//! Lobby-Ereignisse, die vom Transport an den Bot gemeldet werden.

pub mod event;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use event::LobbyEreignis;
pub use types::{ClientId, DatenbankId, GruppenId, KanalId, UngueltigeId};
