//! Zufaellige Kanal-Passwoerter
//!
//! Das Passwort geht genau einmal per Privatnachricht an den Client.
//! Debug-Ausgaben zeigen es nie im Klartext.

use std::fmt;

use rand::Rng;

/// Laenge eines generierten Kanal-Passworts
pub const PASSWORT_LAENGE: usize = 10;

const ZEICHEN: &[u8] = b"abcdefghijkmnopqrstuvwxyz23456789";

#[derive(Clone, PartialEq, Eq)]
pub struct KanalPasswort(String);

impl KanalPasswort {
    /// Generiert ein neues Passwort mit [`PASSWORT_LAENGE`] Zeichen
    pub fn generieren() -> Self {
        let mut rng = rand::thread_rng();
        let passwort = (0..PASSWORT_LAENGE)
            .map(|_| ZEICHEN[rng.gen_range(0..ZEICHEN.len())] as char)
            .collect();
        Self(passwort)
    }

    /// Klartext fuer `channel_password`, `pwd` und die Privatnachricht
    pub fn klartext(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KanalPasswort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KanalPasswort(***)")
    }
}
