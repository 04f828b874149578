//! Berechtigungspruefung ueber Servergruppen

use std::collections::BTreeSet;

use kanalwart_core::GruppenId;

/// Zerlegt `client_servergroups` in eine Gruppenmenge
///
/// Der Server liefert eine kommagetrennte Liste oder eine einzelne Id.
/// Nicht-numerische Eintraege werden ignoriert.
pub fn servergruppen_parsen(roh: &str) -> BTreeSet<GruppenId> {
    roh.split(',')
        .map(str::trim)
        .filter(|teil| !teil.is_empty())
        .filter_map(|teil| match teil.parse::<GruppenId>() {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::debug!(fehler = %e, "Servergruppe ignoriert");
                None
            }
        })
        .collect()
}

/// Leere Erlaubnisliste erlaubt jeden, sonst genuegt eine gemeinsame Gruppe
pub fn ist_berechtigt(client_gruppen: &BTreeSet<GruppenId>, erlaubt: &[GruppenId]) -> bool {
    erlaubt.is_empty() || erlaubt.iter().any(|g| client_gruppen.contains(g))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gruppen(ids: &[u64]) -> BTreeSet<GruppenId> {
        ids.iter().copied().map(GruppenId).collect()
    }

    #[test]
    fn einzelne_gruppe() {
        assert_eq!(servergruppen_parsen("3"), gruppen(&[3]));
    }

    #[test]
    fn mehrere_gruppen() {
        assert_eq!(servergruppen_parsen("3,7,12"), gruppen(&[3, 7, 12]));
    }

    #[test]
    fn leerzeichen_und_muell() {
        assert_eq!(servergruppen_parsen(" 3, x ,,7 "), gruppen(&[3, 7]));
        assert!(servergruppen_parsen("").is_empty());
    }

    #[test]
    fn leere_erlaubnisliste_erlaubt_alle() {
        assert!(ist_berechtigt(&gruppen(&[9]), &[]));
        assert!(ist_berechtigt(&gruppen(&[]), &[]));
    }

    #[test]
    fn schnittmenge_noetig() {
        let erlaubt = [GruppenId(6), GruppenId(8)];
        assert!(ist_berechtigt(&gruppen(&[2, 8]), &erlaubt));
        assert!(!ist_berechtigt(&gruppen(&[2, 7]), &erlaubt));
        assert!(!ist_berechtigt(&gruppen(&[]), &erlaubt));
    }
}
