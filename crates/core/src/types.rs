//! Identifikationstypen des ServerQuery-Protokolls
//!
//! Der Server vergibt alle Ids als Ganzzahlen. Die Newtypes verhindern,
//! dass z.B. eine Client-Id versehentlich als Datenbank-Id verwendet wird
//! (`setclientchannelgroup` erwartet die Datenbank-Id, `clientmove` die
//! Sitzungs-Id).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fehler beim Parsen einer Id aus einem Protokollwert
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ungueltige {art}: '{wert}'")]
pub struct UngueltigeId {
    pub art: &'static str,
    pub wert: String,
}

macro_rules! query_id {
    ($(#[$meta:meta])* $name:ident, $art:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Gibt den rohen Zahlenwert zurueck
            pub fn inner(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = UngueltigeId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map($name).map_err(|_| UngueltigeId {
                    art: $art,
                    wert: s.to_string(),
                })
            }
        }

        impl From<u64> for $name {
            fn from(wert: u64) -> Self {
                $name(wert)
            }
        }
    };
}

query_id!(
    /// Sitzungs-Id eines verbundenen Clients (`clid`)
    ClientId,
    "Client-Id"
);

query_id!(
    /// Kanal-Id (`cid`, `cpid`, `ctid`)
    KanalId,
    "Kanal-Id"
);

query_id!(
    /// Dauerhafte Datenbank-Id eines Clients (`cldbid`)
    DatenbankId,
    "Datenbank-Id"
);

query_id!(
    /// Id einer Server- oder Kanalgruppe (`sgid`, `cgid`)
    GruppenId,
    "Gruppen-Id"
);
