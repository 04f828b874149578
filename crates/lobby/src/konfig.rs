//! Lobby-Konfiguration
//!
//! Die Schluessel entsprechen der bisherigen `config.json` (camelCase),
//! snake_case wird zusaetzlich akzeptiert. Alle Felder haben Standardwerte.

use kanalwart_core::{GruppenId, KanalId};
use serde::{Deserialize, Serialize};

/// Standardtext fuer Clients ohne passende Servergruppe
pub const STANDARD_KEINE_BERECHTIGUNG: &str = "You do not have permission to make a channel";

/// Alles, was Provisionierer und Handler zur Laufzeit brauchen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyKonfig {
    /// Beobachteter Kanal, in dem Clients einen eigenen Kanal anfordern
    #[serde(rename = "listenChannel", alias = "listen_channel")]
    pub lobby_kanal: KanalId,
    /// Elternkanal fuer neu angelegte Kanaele
    #[serde(rename = "channelId", alias = "channel_id")]
    pub eltern_kanal: KanalId,
    /// Berechtigte Servergruppen (leer = alle erlaubt)
    #[serde(rename = "groupIds", alias = "group_ids")]
    pub erlaubte_gruppen: Vec<GruppenId>,
    /// Codec-Id fuer neue Kanaele
    pub codec: u8,
    /// Codec-Qualitaet fuer neue Kanaele
    #[serde(rename = "codec_quality", alias = "codecQuality")]
    pub codec_qualitaet: u8,
    /// Kanalgruppe, die der Client im neuen Kanal erhaelt
    #[serde(rename = "channelGroupId", alias = "channel_group_id")]
    pub kanalgruppe: GruppenId,
    /// Nachricht an abgewiesene Clients
    #[serde(rename = "noPermissionMessage", alias = "no_permission_message")]
    pub keine_berechtigung_nachricht: String,
    /// Lebensdauer neuer Kanaele, wird als `channel_flag_<typ>=1` gesendet
    #[serde(rename = "channelType", alias = "channel_type")]
    pub kanal_typ: String,
    /// Bei jedem Fehler (nicht nur Namenskollision) mit neuem Namen wiederholen
    #[serde(rename = "retryOnAnyError", alias = "retry_on_any_error")]
    pub bei_jedem_fehler_wiederholen: bool,
}

impl Default for LobbyKonfig {
    fn default() -> Self {
        Self {
            lobby_kanal: KanalId(1),
            eltern_kanal: KanalId(1),
            erlaubte_gruppen: Vec::new(),
            codec: 5,
            codec_qualitaet: 10,
            kanalgruppe: GruppenId(5),
            keine_berechtigung_nachricht: STANDARD_KEINE_BERECHTIGUNG.into(),
            kanal_typ: "permanent".into(),
            bei_jedem_fehler_wiederholen: false,
        }
    }
}

impl LobbyKonfig {
    /// Prueft Werte, die der Server sonst erst beim ersten Kanal ablehnen wuerde
    pub fn validieren(&self) -> Result<(), String> {
        if !matches!(self.kanal_typ.as_str(), "permanent" | "semi_permanent" | "temporary") {
            return Err(format!(
                "channelType muss permanent, semi_permanent oder temporary sein, nicht '{}'",
                self.kanal_typ
            ));
        }
        if self.codec_qualitaet > 10 {
            return Err(format!(
                "codec_quality muss zwischen 0 und 10 liegen, nicht {}",
                self.codec_qualitaet
            ));
        }
        Ok(())
    }

    /// Parametername des Lebensdauer-Flags fuer `channelcreate`
    pub fn kanal_flag(&self) -> String {
        format!("channel_flag_{}", self.kanal_typ)
    }
}
