//! Kanal-Bereitstellung mit Ausweichnamen
//!
//! Versucht `name`, dann `name1`, `name2`, ... bis `name<max_versuche>`.
//! Beschreibung und Thema lauten immer `Channel for <name>` mit dem
//! urspruenglichen Namen, auch wenn ein Ausweichname verwendet wird.

use std::sync::Arc;

use kanalwart_core::KanalId;
use kanalwart_query::{Antwort, Befehl, Fehlerart, QueryError, QueryResult, QueryTransport};

use crate::error::{LobbyError, LobbyResult};
use crate::konfig::LobbyKonfig;
use crate::passwort::KanalPasswort;

/// Ein erfolgreich angelegter Kanal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErstellterKanal {
    pub cid: KanalId,
    /// Tatsaechlich vergebener Name (ggf. mit Suffix)
    pub name: String,
}

pub struct KanalProvisionierer {
    transport: Arc<dyn QueryTransport>,
    konfig: Arc<LobbyKonfig>,
}

impl KanalProvisionierer {
    pub fn neu(transport: Arc<dyn QueryTransport>, konfig: Arc<LobbyKonfig>) -> Self {
        Self { transport, konfig }
    }

    /// Legt einen Kanal mit dem naechsten freien Namen an
    ///
    /// Es gibt hoechstens `max_versuche + 1` Versuche. Nur wiederholbare
    /// Fehler (Namenskollision) oder nicht einordenbare Fehler fuehren zu
    /// einem weiteren Versuch, es sei denn `retryOnAnyError` ist gesetzt.
    pub async fn naechsten_freien_kanal_erstellen(
        &self,
        eltern: KanalId,
        basisname: &str,
        passwort: &KanalPasswort,
        max_versuche: u32,
    ) -> LobbyResult<ErstellterKanal> {
        let mut versuch = 0;

        loop {
            let name = if versuch == 0 {
                basisname.to_string()
            } else {
                format!("{basisname}{versuch}")
            };

            match self.kanal_erstellen(eltern, &name, basisname, passwort).await {
                Ok(antwort) => {
                    // Kanal existiert bereits; eine kaputte Antwort darf keinen zweiten erzeugen
                    let cid = antwort
                        .erster_pflicht()
                        .and_then(|d| d.id::<KanalId>("cid"))
                        .map_err(|e| LobbyError::UngueltigeAntwort(e.to_string()))?;
                    tracing::info!(cid = %cid, name = %name, versuch, "Kanal erstellt");
                    return Ok(ErstellterKanal { cid, name });
                }
                Err(e) => {
                    tracing::warn!(name = %name, versuch, fehler = %e, "Kanal erstellen fehlgeschlagen");

                    if !self.ist_wiederholbar(&e) {
                        return Err(e.into());
                    }
                    if versuch == max_versuche {
                        return Err(LobbyError::ZuVieleVersuche {
                            versuche: versuch + 1,
                        });
                    }
                    versuch += 1;
                }
            }
        }
    }

    fn ist_wiederholbar(&self, fehler: &QueryError) -> bool {
        self.konfig.bei_jedem_fehler_wiederholen
            || matches!(fehler.art(), Fehlerart::Wiederholbar | Fehlerart::Unbekannt)
    }

    async fn kanal_erstellen(
        &self,
        eltern: KanalId,
        name: &str,
        basisname: &str,
        passwort: &KanalPasswort,
    ) -> QueryResult<Antwort> {
        let beschreibung = format!("Channel for {basisname}");
        let befehl = Befehl::neu("channelcreate")
            .param("cpid", eltern)
            .param("channel_name", name)
            .param("channel_description", &beschreibung)
            .param("channel_topic", &beschreibung)
            .param("channel_password", passwort.klartext())
            .param("channel_codec", self.konfig.codec)
            .param("channel_codec_quality", self.konfig.codec_qualitaet)
            .param(self.konfig.kanal_flag(), 1);

        self.transport.senden(befehl).await
    }
}
