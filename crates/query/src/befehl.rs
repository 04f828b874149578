//! Befehle und Antworten des ServerQuery-Protokolls

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{QueryError, QueryResult};
use crate::parser::encode_value;

/// Parameter, deren Werte nie in Debug-Ausgaben landen duerfen
const GEHEIME_PARAMETER: &[&str] = &["client_login_password", "channel_password", "pwd"];

/// Ein ausgehender Befehl: `name key1=value1 key2=value2`
#[derive(Clone, PartialEq, Eq)]
pub struct Befehl {
    name: String,
    parameter: Vec<(String, String)>,
}

impl Befehl {
    pub fn neu(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter: Vec::new(),
        }
    }

    /// Haengt einen Parameter an (Reihenfolge bleibt erhalten)
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.parameter.push((key.into(), value.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gibt den Wert eines Parameters zurueck
    pub fn wert(&self, key: &str) -> Option<&str> {
        self.parameter
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Serialisiert den Befehl als Protokollzeile (ohne Zeilenende)
    pub fn zeile(&self) -> String {
        let mut zeile = self.name.clone();
        for (key, value) in &self.parameter {
            zeile.push(' ');
            zeile.push_str(key);
            zeile.push('=');
            zeile.push_str(&encode_value(value));
        }
        zeile
    }
}

impl fmt::Debug for Befehl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut liste = f.debug_map();
        liste.entry(&"befehl", &self.name);
        for (key, value) in &self.parameter {
            if GEHEIME_PARAMETER.contains(&key.as_str()) {
                liste.entry(key, &"***");
            } else {
                liste.entry(key, value);
            }
        }
        liste.finish()
    }
}

/// Ein einzelner Datensatz einer Antwort oder Benachrichtigung
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Datensatz {
    felder: HashMap<String, String>,
}

impl Datensatz {
    pub fn einfuegen(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.felder.insert(key.into(), value.into());
    }

    /// Gibt ein Feld als String zurueck
    pub fn feld(&self, key: &str) -> Option<&str> {
        self.felder.get(key).map(|s| s.as_str())
    }

    /// Gibt ein Pflichtfeld zurueck oder einen Fehler
    pub fn pflichtfeld(&self, key: &str) -> QueryResult<&str> {
        self.feld(key)
            .ok_or_else(|| QueryError::UngueltigeAntwort(format!("Pflichtfeld fehlt: {key}")))
    }

    /// Parst ein Pflichtfeld in einen Id-Typ oder eine Zahl
    pub fn id<T: FromStr>(&self, key: &str) -> QueryResult<T> {
        let s = self.pflichtfeld(key)?;
        s.parse::<T>().map_err(|_| {
            QueryError::UngueltigeAntwort(format!("Ungueltiger Wert fuer '{key}': {s}"))
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Datensatz {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut datensatz = Datensatz::default();
        for (k, v) in iter {
            datensatz.einfuegen(k, v);
        }
        datensatz
    }
}

/// Erfolgreiche Antwort auf einen Befehl (alle Datenzeilen vor `error id=0`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Antwort {
    pub datensaetze: Vec<Datensatz>,
}

impl Antwort {
    /// Antwort ohne Nutzdaten (`error id=0 msg=ok` direkt nach dem Befehl)
    pub fn leer() -> Self {
        Self::default()
    }

    /// Antwort mit genau einem Datensatz
    pub fn mit_datensatz(datensatz: Datensatz) -> Self {
        Self {
            datensaetze: vec![datensatz],
        }
    }

    pub fn erster(&self) -> Option<&Datensatz> {
        self.datensaetze.first()
    }

    /// Gibt den ersten Datensatz zurueck oder einen Fehler
    pub fn erster_pflicht(&self) -> QueryResult<&Datensatz> {
        self.erster()
            .ok_or_else(|| QueryError::UngueltigeAntwort("Antwort ohne Daten".into()))
    }

    /// Feld aus dem ersten Datensatz
    pub fn feld(&self, key: &str) -> Option<&str> {
        self.erster().and_then(|d| d.feld(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn befehl_zeile_mit_escapes() {
        let b = Befehl::neu("sendtextmessage")
            .param("targetmode", 1)
            .param("target", 5)
            .param("msg", "Hallo Welt");
        assert_eq!(b.zeile(), r"sendtextmessage targetmode=1 target=5 msg=Hallo\sWelt");
        assert_eq!(b.wert("target"), Some("5"));
        assert_eq!(b.wert("fehlt"), None);
    }

    #[test]
    fn befehl_ohne_parameter() {
        assert_eq!(Befehl::neu("whoami").zeile(), "whoami");
    }

    #[test]
    fn debug_verbirgt_passwoerter() {
        let b = Befehl::neu("clientmove")
            .param("clid", 3)
            .param("cid", 9)
            .param("pwd", "geheim123");
        let ausgabe = format!("{b:?}");
        assert!(!ausgabe.contains("geheim123"));
        assert!(ausgabe.contains("clientmove"));
        assert!(ausgabe.contains("***"));
    }

    #[test]
    fn pflichtfeld_fehlt() {
        let d: Datensatz = [("cid", "4")].into_iter().collect();
        assert_eq!(d.pflichtfeld("cid").unwrap(), "4");
        assert!(d.pflichtfeld("channel_name").is_err());
    }

    #[test]
    fn id_parsen() {
        let d: Datensatz = [("cid", "17"), ("kaputt", "x")].into_iter().collect();
        let cid: u64 = d.id("cid").unwrap();
        assert_eq!(cid, 17);
        assert!(d.id::<u64>("kaputt").is_err());
    }

    #[test]
    fn antwort_ohne_daten() {
        let a = Antwort::leer();
        assert!(a.erster().is_none());
        assert!(a.erster_pflicht().is_err());
        assert_eq!(a.feld("cid"), None);
    }
}
