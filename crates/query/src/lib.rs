//! kanalwart-query – ServerQuery-Client
//!
//! Implementiert die Client-Seite des zeilenbasierten ServerQuery-Protokolls:
//! - **parser**: Escaping und Zerlegung von Antwort-, Fehler- und Notify-Zeilen
//! - **codec**: `tokio_util` Codec fuer `Framed`-Verbindungen
//! - **befehl**: Befehle mit Parametern und geparste Antworten
//! - **transport**: `QueryTransport`-Trait, gegen den der Bot programmiert ist
//! - **client**: TCP-Implementierung mit serialisierten Anfragen
//!
//! Das Protokoll kennt keine Request-Ids. Es darf daher immer nur ein Befehl
//! unterwegs sein; [`QueryClient`] stellt das mit einem Mutex sicher.

pub mod befehl;
pub mod client;
pub mod codec;
pub mod error;
pub mod parser;
pub mod transport;

pub use befehl::{Antwort, Befehl, Datensatz};
pub use client::QueryClient;
pub use codec::QueryCodec;
pub use error::{Fehlerart, QueryError, QueryResult};
pub use transport::QueryTransport;
