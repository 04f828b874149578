//! Ereignisse, die der Query-Transport an den Bot weiterreicht
//!
//! Nur die beiden fuer die Lobby relevanten Benachrichtigungen werden
//! typisiert. Alle anderen `notify*`-Zeilen verwirft der Transport.

use serde::{Deserialize, Serialize};

use crate::types::{ClientId, KanalId};

/// Ein Client ist in einem beobachteten Kanal aufgetaucht
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LobbyEreignis {
    /// `notifyclientmoved`: Client wurde in den Kanal `ctid` verschoben
    ClientVerschoben { clid: ClientId, ctid: KanalId },
    /// `notifycliententerview`: Client hat sich verbunden und ist direkt in `ctid` gelandet
    ClientBetreten { clid: ClientId, ctid: KanalId },
}

impl LobbyEreignis {
    /// Sitzungs-Id des betroffenen Clients
    pub fn client(&self) -> ClientId {
        match self {
            Self::ClientVerschoben { clid, .. } | Self::ClientBetreten { clid, .. } => *clid,
        }
    }

    /// Zielkanal des Ereignisses
    pub fn zielkanal(&self) -> KanalId {
        match self {
            Self::ClientVerschoben { ctid, .. } | Self::ClientBetreten { ctid, .. } => *ctid,
        }
    }

    /// Name der zugehoerigen Benachrichtigung im Protokoll
    pub fn protokollname(&self) -> &'static str {
        match self {
            Self::ClientVerschoben { .. } => "clientmoved",
            Self::ClientBetreten { .. } => "cliententerview",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zugriff_auf_client_und_kanal() {
        let e = LobbyEreignis::ClientVerschoben {
            clid: ClientId(4),
            ctid: KanalId(1),
        };
        assert_eq!(e.client(), ClientId(4));
        assert_eq!(e.zielkanal(), KanalId(1));
        assert_eq!(e.protokollname(), "clientmoved");
    }

    #[test]
    fn betreten_protokollname() {
        let e = LobbyEreignis::ClientBetreten {
            clid: ClientId(9),
            ctid: KanalId(3),
        };
        assert_eq!(e.protokollname(), "cliententerview");
        assert_eq!(e.zielkanal(), KanalId(3));
    }

    #[test]
    fn event_ist_serde_kompatibel() {
        let e = LobbyEreignis::ClientBetreten {
            clid: ClientId(2),
            ctid: KanalId(1),
        };
        let json = serde_json::to_string(&e).unwrap();
        let zurueck: LobbyEreignis = serde_json::from_str(&json).unwrap();
        assert_eq!(e, zurueck);
    }
}
