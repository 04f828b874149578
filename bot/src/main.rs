//! Kanalwart – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Bot.

use anyhow::Result;
use kanalwart_bot::{config::BotConfig, Bot};
use kanalwart_observability::logging_initialisieren;

#[tokio::main]
async fn main() -> Result<()> {
    // Pfad aus Umgebungsvariable, sonst erstes Argument, sonst Standard
    let config_pfad = std::env::var("KANALWART_CONFIG")
        .ok()
        .or_else(|| std::env::args().nth(1))
        .unwrap_or_else(|| "kanalwart.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let config = BotConfig::laden(&config_pfad)?;

    logging_initialisieren(&config.logging.level, &config.logging.format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "Kanalwart wird initialisiert"
    );

    Bot::neu(config).starten().await
}
