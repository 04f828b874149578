//! kanalwart-bot – Bibliotheks-Root
//!
//! Verbindet sich per ServerQuery, meldet sich an und beobachtet die Lobby.
//! Jeder Client, der in die Lobby verschoben wird, bekommt ueber den
//! [`LobbyHandler`] einen eigenen Kanal.

pub mod config;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use config::BotConfig;
use kanalwart_core::KanalId;
use kanalwart_lobby::LobbyHandler;
use kanalwart_query::{Befehl, QueryClient, QueryError, QueryTransport};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Abstand zwischen zwei `whoami`, damit der Server die Verbindung nicht schliesst
pub const KEEPALIVE_INTERVALL: Duration = Duration::from_secs(60);

/// Haelt die Konfiguration bis zum Start zusammen
pub struct Bot {
    pub config: BotConfig,
}

impl Bot {
    pub fn neu(config: BotConfig) -> Self {
        Self { config }
    }

    /// Verbindet sich und laeuft bis Ctrl-C oder Verbindungsverlust
    pub async fn starten(self) -> Result<()> {
        let verbindung = &self.config.verbindung;
        let client = QueryClient::verbinden(&verbindung.adresse, verbindung.query_port)
            .await
            .with_context(|| {
                format!(
                    "ServerQuery unter {}:{} nicht erreichbar",
                    verbindung.adresse, verbindung.query_port
                )
            })?;

        let laufzeit = BotLaufzeit::neu(Arc::new(client), &self.config);
        laufzeit
            .ausfuehren(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(fehler = %e, "Ctrl-C-Handler nicht verfuegbar");
                    std::future::pending::<()>().await;
                }
            })
            .await
    }
}

/// Laufender Bot auf einem beliebigen Transport
pub struct BotLaufzeit {
    transport: Arc<dyn QueryTransport>,
    config: BotConfig,
    keepalive_intervall: Duration,
}

impl BotLaufzeit {
    pub fn neu(transport: Arc<dyn QueryTransport>, config: &BotConfig) -> Self {
        Self {
            transport,
            config: config.clone(),
            keepalive_intervall: KEEPALIVE_INTERVALL,
        }
    }

    /// Anderes Keep-alive-Intervall (Tests)
    pub fn mit_keepalive_intervall(mut self, intervall: Duration) -> Self {
        self.keepalive_intervall = intervall;
        self
    }

    /// Startreihenfolge:
    /// 1. Ereignisse abonnieren (vor der Registrierung, damit nichts verloren geht)
    /// 2. Login, virtuellen Server waehlen, optional Nickname setzen
    /// 3. Kanal-Ereignisse fuer die Lobby registrieren
    /// 4. Keep-alive starten und Ereignisse verarbeiten bis `shutdown` fertig ist
    ///
    /// Fehler beim Hochfahren brechen sofort ab. Ein Verbindungsverlust
    /// beendet den Lauf mit Fehler, ein Shutdown ohne.
    pub async fn ausfuehren<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut ereignisse = self.transport.ereignisse_abonnieren();
        self.hochfahren().await?;

        tracing::info!(
            lobby = %self.config.lobby.lobby_kanal,
            eltern = %self.config.lobby.eltern_kanal,
            "Verbunden, warte auf Clients in der Lobby"
        );

        let keepalive = self.keepalive_starten();
        let lobby = self.config.lobby.lobby_kanal;
        let handler = Arc::new(LobbyHandler::neu(
            self.transport.clone(),
            Arc::new(self.config.lobby.clone()),
        ));

        tokio::pin!(shutdown);
        let ergebnis = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown-Signal empfangen, Bot wird beendet");
                    break Ok(());
                }
                empfangen = ereignisse.recv() => match empfangen {
                    Ok(ereignis) => {
                        if !handler.betrifft_lobby(&ereignis) {
                            continue;
                        }
                        tracing::debug!(
                            ereignis = ereignis.protokollname(),
                            clid = %ereignis.client(),
                            "Lobby-Ereignis"
                        );
                        let handler = handler.clone();
                        tokio::spawn(async move {
                            let behandlung = handler.ereignis_behandeln(ereignis).await;
                            tracing::debug!(behandlung = ?behandlung, "Ereignis behandelt");
                        });
                    }
                    Err(RecvError::Lagged(verpasst)) => {
                        tracing::warn!(verpasst, "Ereignisse verpasst, Verarbeitung zu langsam");
                    }
                    Err(RecvError::Closed) => {
                        tracing::error!(lobby = %lobby, "ServerQuery-Verbindung verloren");
                        break Err(anyhow::Error::new(QueryError::Getrennt));
                    }
                },
            }
        };

        keepalive.abort();
        ergebnis
    }

    async fn hochfahren(&self) -> Result<()> {
        let verbindung = &self.config.verbindung;

        self.senden(
            Befehl::neu("login")
                .param("client_login_name", &verbindung.benutzername)
                .param("client_login_password", &verbindung.passwort),
        )
        .await
        .with_context(|| format!("Login als '{}' fehlgeschlagen", verbindung.benutzername))?;

        self.senden(Befehl::neu("use").param("port", verbindung.server_port))
            .await
            .with_context(|| {
                format!("Virtueller Server auf Port {} nicht waehlbar", verbindung.server_port)
            })?;

        if let Some(name) = verbindung.bot_name.as_deref().filter(|n| !n.is_empty()) {
            self.senden(Befehl::neu("clientupdate").param("client_nickname", name))
                .await
                .with_context(|| format!("Nickname '{name}' nicht setzbar"))?;
        }

        self.ereignisse_registrieren(self.config.lobby.lobby_kanal)
            .await
            .context("Registrierung fuer Kanal-Ereignisse fehlgeschlagen")?;
        Ok(())
    }

    async fn ereignisse_registrieren(&self, lobby: KanalId) -> Result<(), QueryError> {
        self.senden(
            Befehl::neu("servernotifyregister")
                .param("event", "channel")
                .param("id", lobby),
        )
        .await
    }

    async fn senden(&self, befehl: Befehl) -> Result<(), QueryError> {
        self.transport.senden(befehl).await.map(drop)
    }

    /// Sendet regelmaessig `whoami`; Fehler werden nur geloggt
    fn keepalive_starten(&self) -> JoinHandle<()> {
        let transport = self.transport.clone();
        let intervall = self.keepalive_intervall;

        tokio::spawn(async move {
            let mut takt = tokio::time::interval(intervall);
            takt.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // erster Tick kommt sofort
            takt.tick().await;

            loop {
                takt.tick().await;
                if let Err(e) = transport.senden(Befehl::neu("whoami")).await {
                    tracing::warn!(fehler = %e, "Keep-alive fehlgeschlagen");
                }
            }
        })
    }
}
