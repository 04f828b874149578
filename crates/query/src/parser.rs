//! Zeilenparser fuer das ServerQuery-Protokoll
//!
//! Jede Zeile des Servers gehoert zu genau einer Klasse:
//!   error id=0 msg=ok                      -> Abschluss einer Antwort
//!   notifyclientmoved ctid=5 clid=3        -> asynchrone Benachrichtigung
//!   cid=1 channel_name=Lobby|cid=2 ...     -> Datenzeile (Datensaetze mit | getrennt)
//!
//! Sonderzeichen in Werten werden mit Backslash escaped:
//!   \s = Leerzeichen, \p = Pipe, \/ = Slash, \\ = Backslash, \n, \r, \t, ...

use crate::befehl::Datensatz;
use crate::error::{QueryError, QueryResult};

/// Eine klassifizierte Zeile vom Server
#[derive(Debug, Clone, PartialEq)]
pub enum Zeile {
    /// `error id=.. msg=..` – schliesst jede Antwort ab, `id=0` bedeutet Erfolg
    Fehler {
        id: u32,
        msg: String,
        extra: Option<String>,
    },
    /// `notify<name> ...` – Name ohne das Praefix `notify`
    Benachrichtigung {
        name: String,
        datensaetze: Vec<Datensatz>,
    },
    /// Nutzdaten einer Antwort
    Daten(Vec<Datensatz>),
}

/// Klassifiziert eine bereits von Zeilenende-Zeichen befreite Zeile
pub fn parse_zeile(zeile: &str) -> QueryResult<Zeile> {
    let (kopf, rest) = match zeile.split_once(' ') {
        Some((kopf, rest)) => (kopf, rest),
        None => (zeile, ""),
    };

    if kopf == "error" {
        return parse_fehlerzeile(rest);
    }

    if let Some(name) = kopf.strip_prefix("notify") {
        if name.is_empty() {
            return Err(QueryError::Protokoll("Benachrichtigung ohne Namen".into()));
        }
        return Ok(Zeile::Benachrichtigung {
            name: name.to_string(),
            datensaetze: parse_datensaetze(rest),
        });
    }

    Ok(Zeile::Daten(parse_datensaetze(zeile)))
}

fn parse_fehlerzeile(rest: &str) -> QueryResult<Zeile> {
    let felder = parse_datensatz(rest);
    let id_roh = felder
        .feld("id")
        .ok_or_else(|| QueryError::Protokoll("Fehlerzeile ohne id".into()))?;
    let id = id_roh
        .parse::<u32>()
        .map_err(|_| QueryError::Protokoll(format!("Ungueltige Fehler-Id: {id_roh}")))?;

    Ok(Zeile::Fehler {
        id,
        msg: felder.feld("msg").unwrap_or_default().to_string(),
        extra: felder.feld("extra_msg").map(str::to_string),
    })
}

/// Zerlegt eine Datenzeile in ihre mit `|` getrennten Datensaetze
pub fn parse_datensaetze(zeile: &str) -> Vec<Datensatz> {
    if zeile.trim().is_empty() {
        return Vec::new();
    }
    zeile.split('|').map(parse_datensatz).collect()
}

/// Zerlegt einen einzelnen Datensatz `k1=v1 k2=v2 flag`
fn parse_datensatz(teil: &str) -> Datensatz {
    let mut datensatz = Datensatz::default();
    for token in teil.split(' ').filter(|t| !t.is_empty()) {
        match token.split_once('=') {
            Some((key, value)) => datensatz.einfuegen(key, decode_value(value)),
            // Schluessel ohne Wert, z.B. "-permanent" oder "TS3"
            None => datensatz.einfuegen(token, String::new()),
        }
    }
    datensatz
}

/// Dekodiert Escape-Sequenzen in einem Wert-String
pub fn decode_value(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => result.push('\\'),
            Some('/') => result.push('/'),
            Some('s') => result.push(' '),
            Some('p') => result.push('|'),
            Some('a') => result.push('\u{7}'),
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('v') => result.push('\u{b}'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

/// Kodiert einen Wert fuer die Ausgabe (Escape-Sequenzen einfuegen)
pub fn encode_value(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '/' => result.push_str("\\/"),
            ' ' => result.push_str("\\s"),
            '|' => result.push_str("\\p"),
            '\u{7}' => result.push_str("\\a"),
            '\u{8}' => result.push_str("\\b"),
            '\u{c}' => result.push_str("\\f"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\u{b}' => result.push_str("\\v"),
            other => result.push(other),
        }
    }
    result
}
