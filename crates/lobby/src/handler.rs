//! Ereignisbehandlung fuer die Lobby
//!
//! Ablauf fuer einen in die Lobby verschobenen Client:
//! 1. `clientinfo` laden (Nickname, Datenbank-Id, Icon, Servergruppen)
//! 2. Berechtigung pruefen, sonst kicken + Nachricht
//! 3. Kanal mit Zufallspasswort anlegen (Ausweichnamen bei Kollision)
//! 4. Kanal-Icon setzen, Client verschieben, Kanalgruppe zuweisen
//! 5. Passwort per Privatnachricht senden
//!
//! Schritte 3-5 laufen strikt nacheinander. Jeder Fehler fuehrt zu Kick plus
//! allgemeiner Fehlermeldung; Details landen nur im Log.
//!
//! Clients, die sich direkt in die Lobby verbinden (`cliententerview`),
//! werden ohne Pruefung gekickt.

use std::collections::BTreeSet;
use std::sync::Arc;

use kanalwart_core::{ClientId, DatenbankId, GruppenId, KanalId, LobbyEreignis};
use kanalwart_query::{Befehl, Datensatz, QueryResult, QueryTransport};

use crate::autorisierung::{ist_berechtigt, servergruppen_parsen};
use crate::error::{LobbyError, LobbyResult};
use crate::konfig::LobbyKonfig;
use crate::passwort::KanalPasswort;
use crate::provisioner::KanalProvisionierer;

/// Ausweichnamen pro Client: `name`, `name1` ... `name5`
pub const MAX_NAMENSVERSUCHE: u32 = 5;

/// `reasonid` fuer einen Kick aus dem Kanal (5 waere ein Server-Kick)
const KICK_AUS_KANAL: u32 = 4;

const KICK_GRUND_FEHLER: &str = "Error trying to create the channel";
const KICK_GRUND_BETRETEN: &str = "Channel not allowed";
const NACHRICHT_FEHLER: &str =
    "Error trying to create a channel, please try again later or contact an admin if this persists";
const NACHRICHT_PASSWORT: &str = "The password for your new channel is: ";

/// Ergebnis einer Ereignisbehandlung
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behandlung {
    /// Ereignis betrifft nicht die Lobby
    Ignoriert,
    /// Client hat die Lobby direkt betreten und wurde gekickt
    BetretenAbgelehnt,
    /// Client ohne berechtigte Servergruppe
    Abgewiesen,
    /// Client sitzt in seinem neuen Kanal
    Bereitgestellt { cid: KanalId, name: String },
    /// Ablauf abgebrochen, Client wurde gekickt und benachrichtigt
    Fehlgeschlagen,
}

/// Clientdaten fuer die Dauer einer Ereignisbehandlung
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSitzung {
    pub clid: ClientId,
    pub nickname: String,
    pub datenbank_id: DatenbankId,
    pub icon_id: i64,
    pub servergruppen: BTreeSet<GruppenId>,
}

impl ClientSitzung {
    /// Baut die Sitzung aus der `clientinfo`-Antwort
    pub fn aus_clientinfo(clid: ClientId, info: &Datensatz) -> LobbyResult<Self> {
        let nickname = info.pflichtfeld("client_nickname")?.to_string();
        let datenbank_id = info.id::<DatenbankId>("client_database_id")?;
        let icon_id = match info.feld("client_icon_id") {
            Some(roh) => roh.trim().parse::<i64>().map_err(|_| {
                LobbyError::UngueltigeAntwort(format!("Ungueltige client_icon_id: {roh}"))
            })?,
            None => 0,
        };
        let servergruppen = info
            .feld("client_servergroups")
            .map(servergruppen_parsen)
            .unwrap_or_default();

        Ok(Self {
            clid,
            nickname,
            datenbank_id,
            icon_id,
            servergruppen,
        })
    }
}

pub struct LobbyHandler {
    transport: Arc<dyn QueryTransport>,
    konfig: Arc<LobbyKonfig>,
    provisionierer: KanalProvisionierer,
}

impl LobbyHandler {
    pub fn neu(transport: Arc<dyn QueryTransport>, konfig: Arc<LobbyKonfig>) -> Self {
        let provisionierer = KanalProvisionierer::neu(transport.clone(), konfig.clone());
        Self {
            transport,
            konfig,
            provisionierer,
        }
    }

    /// true wenn das Ereignis in der beobachteten Lobby spielt
    pub fn betrifft_lobby(&self, ereignis: &LobbyEreignis) -> bool {
        ereignis.zielkanal() == self.konfig.lobby_kanal
    }

    /// Einstiegspunkt fuer beide Ereignisarten
    pub async fn ereignis_behandeln(&self, ereignis: LobbyEreignis) -> Behandlung {
        if !self.betrifft_lobby(&ereignis) {
            return Behandlung::Ignoriert;
        }

        match ereignis {
            LobbyEreignis::ClientVerschoben { clid, .. } => self.client_verschoben(clid).await,
            LobbyEreignis::ClientBetreten { clid, .. } => self.client_betreten(clid).await,
        }
    }

    /// Client wurde in die Lobby verschoben
    pub async fn client_verschoben(&self, clid: ClientId) -> Behandlung {
        let sitzung = match self.client_info_laden(clid).await {
            Ok(s) => s,
            Err(e) => return self.fehler_melden(clid, &e).await,
        };

        if !ist_berechtigt(&sitzung.servergruppen, &self.konfig.erlaubte_gruppen) {
            tracing::info!(
                clid = %clid,
                nickname = %sitzung.nickname,
                "Client hat keine Berechtigung fuer einen eigenen Kanal"
            );
            self.abweisen(clid).await;
            return Behandlung::Abgewiesen;
        }

        match self.kanal_bereitstellen(&sitzung).await {
            Ok(behandlung) => behandlung,
            Err(e) => self.fehler_melden(clid, &e).await,
        }
    }

    /// Client hat sich direkt in die Lobby verbunden
    pub async fn client_betreten(&self, clid: ClientId) -> Behandlung {
        tracing::info!(clid = %clid, "Client direkt in der Lobby, wird gekickt");
        if let Err(e) = self.kicken(clid, KICK_GRUND_BETRETEN).await {
            tracing::error!(clid = %clid, fehler = %e, "Kick fehlgeschlagen");
        }
        Behandlung::BetretenAbgelehnt
    }

    async fn client_info_laden(&self, clid: ClientId) -> LobbyResult<ClientSitzung> {
        let antwort = self
            .transport
            .senden(Befehl::neu("clientinfo").param("clid", clid))
            .await?;
        ClientSitzung::aus_clientinfo(clid, antwort.erster_pflicht()?)
    }

    /// Erfolgspfad: Kanal anlegen, Icon, verschieben, Gruppe, Passwort
    async fn kanal_bereitstellen(&self, sitzung: &ClientSitzung) -> LobbyResult<Behandlung> {
        let passwort = KanalPasswort::generieren();

        let kanal = self
            .provisionierer
            .naechsten_freien_kanal_erstellen(
                self.konfig.eltern_kanal,
                &sitzung.nickname,
                &passwort,
                MAX_NAMENSVERSUCHE,
            )
            .await?;

        self.kanal_icon_setzen(kanal.cid, sitzung.icon_id).await?;
        self.client_verschieben(sitzung.clid, kanal.cid, &passwort).await?;
        self.kanalgruppe_zuweisen(sitzung.datenbank_id, kanal.cid).await?;
        self.nachricht_senden(
            sitzung.clid,
            &format!("{NACHRICHT_PASSWORT}{}", passwort.klartext()),
        )
        .await?;

        tracing::info!(
            clid = %sitzung.clid,
            cid = %kanal.cid,
            name = %kanal.name,
            "Client in eigenen Kanal verschoben"
        );
        Ok(Behandlung::Bereitgestellt {
            cid: kanal.cid,
            name: kanal.name,
        })
    }

    /// Kick ohne Grund plus konfigurierte Nachricht, beides unabhaengig
    async fn abweisen(&self, clid: ClientId) {
        if let Err(e) = self.kicken(clid, "").await {
            tracing::error!(clid = %clid, fehler = %e, "Kick fehlgeschlagen");
        }
        if let Err(e) = self
            .nachricht_senden(clid, &self.konfig.keine_berechtigung_nachricht)
            .await
        {
            tracing::error!(clid = %clid, fehler = %e, "Nachricht senden fehlgeschlagen");
        }
    }

    /// Loggt den Fehler, kickt und benachrichtigt den Client allgemein
    async fn fehler_melden(&self, clid: ClientId, fehler: &LobbyError) -> Behandlung {
        tracing::error!(clid = %clid, fehler = %fehler, "Kanal-Bereitstellung fehlgeschlagen");

        if let Err(e) = self.kicken(clid, KICK_GRUND_FEHLER).await {
            tracing::error!(clid = %clid, fehler = %e, "Kick fehlgeschlagen");
        }
        if let Err(e) = self.nachricht_senden(clid, NACHRICHT_FEHLER).await {
            tracing::error!(clid = %clid, fehler = %e, "Nachricht senden fehlgeschlagen");
        }
        Behandlung::Fehlgeschlagen
    }

    async fn kanal_icon_setzen(&self, cid: KanalId, icon_id: i64) -> QueryResult<()> {
        self.transport
            .senden(
                Befehl::neu("channeledit")
                    .param("cid", cid)
                    .param("channel_icon_id", icon_id),
            )
            .await
            .map(drop)
    }

    async fn client_verschieben(
        &self,
        clid: ClientId,
        cid: KanalId,
        passwort: &KanalPasswort,
    ) -> QueryResult<()> {
        self.transport
            .senden(
                Befehl::neu("clientmove")
                    .param("clid", clid)
                    .param("cid", cid)
                    .param("pwd", passwort.klartext()),
            )
            .await
            .map(drop)
    }

    async fn kanalgruppe_zuweisen(&self, cldbid: DatenbankId, cid: KanalId) -> QueryResult<()> {
        self.transport
            .senden(
                Befehl::neu("setclientchannelgroup")
                    .param("cgid", self.konfig.kanalgruppe)
                    .param("cldbid", cldbid)
                    .param("cid", cid),
            )
            .await
            .map(drop)
    }

    async fn nachricht_senden(&self, clid: ClientId, text: &str) -> QueryResult<()> {
        self.transport
            .senden(
                Befehl::neu("sendtextmessage")
                    .param("target", clid)
                    .param("targetmode", 1)
                    .param("msg", text),
            )
            .await
            .map(drop)
    }

    async fn kicken(&self, clid: ClientId, grund: &str) -> QueryResult<()> {
        self.transport
            .senden(
                Befehl::neu("clientkick")
                    .param("clid", clid)
                    .param("reasonid", KICK_AUS_KANAL)
                    .param("reasonmsg", grund),
            )
            .await
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sitzung_aus_clientinfo() {
        let info: Datensatz = [
            ("client_nickname", "Alice"),
            ("client_database_id", "12"),
            ("client_icon_id", "4294967295"),
            ("client_servergroups", "3,7,12"),
        ]
        .into_iter()
        .collect();

        let s = ClientSitzung::aus_clientinfo(ClientId(5), &info).unwrap();
        assert_eq!(s.nickname, "Alice");
        assert_eq!(s.datenbank_id, DatenbankId(12));
        assert_eq!(s.icon_id, 4_294_967_295);
        assert_eq!(s.servergruppen.len(), 3);
        assert!(s.servergruppen.contains(&GruppenId(7)));
    }

    #[test]
    fn sitzung_ohne_optionale_felder() {
        let info: Datensatz = [("client_nickname", "Bob"), ("client_database_id", "3")]
            .into_iter()
            .collect();

        let s = ClientSitzung::aus_clientinfo(ClientId(1), &info).unwrap();
        assert_eq!(s.icon_id, 0);
        assert!(s.servergruppen.is_empty());
    }

    #[test]
    fn sitzung_ohne_nickname() {
        let info: Datensatz = [("client_database_id", "3")].into_iter().collect();
        assert!(ClientSitzung::aus_clientinfo(ClientId(1), &info).is_err());
    }
}
