//! Aufzeichnender QueryTransport mit vorgegebenen Antworten pro Befehl

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kanalwart_core::LobbyEreignis;
use kanalwart_query::{Antwort, Befehl, Datensatz, QueryResult, QueryTransport};
use tokio::sync::broadcast;

pub struct MockTransport {
    aufrufe: Mutex<Vec<Befehl>>,
    skript: Mutex<HashMap<String, VecDeque<QueryResult<Antwort>>>>,
    ereignisse: broadcast::Sender<LobbyEreignis>,
}

impl MockTransport {
    pub fn neu() -> Arc<Self> {
        let (ereignisse, _) = broadcast::channel(16);
        Arc::new(Self {
            aufrufe: Mutex::new(Vec::new()),
            skript: Mutex::new(HashMap::new()),
            ereignisse,
        })
    }

    /// Reiht ein Ergebnis fuer den naechsten Aufruf von `befehl` ein
    ///
    /// Ohne eingereihtes Ergebnis antwortet der Mock mit einer leeren Antwort.
    pub fn antwort(&self, befehl: &str, ergebnis: QueryResult<Antwort>) {
        self.skript
            .lock()
            .unwrap()
            .entry(befehl.to_string())
            .or_default()
            .push_back(ergebnis);
    }

    pub fn aufrufe(&self) -> Vec<Befehl> {
        self.aufrufe.lock().unwrap().clone()
    }

    pub fn befehlsnamen(&self) -> Vec<String> {
        self.aufrufe().iter().map(|b| b.name().to_string()).collect()
    }

    pub fn aufrufe_von(&self, name: &str) -> Vec<Befehl> {
        self.aufrufe().into_iter().filter(|b| b.name() == name).collect()
    }
}

#[async_trait]
impl QueryTransport for MockTransport {
    async fn senden(&self, befehl: Befehl) -> QueryResult<Antwort> {
        let name = befehl.name().to_string();
        self.aufrufe.lock().unwrap().push(befehl);
        self.skript
            .lock()
            .unwrap()
            .get_mut(&name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(Antwort::leer()))
    }

    fn ereignisse_abonnieren(&self) -> broadcast::Receiver<LobbyEreignis> {
        self.ereignisse.subscribe()
    }
}

/// `clientinfo`-Antwort mit den Feldern, die der Handler auswertet
pub fn clientinfo(nickname: &str, cldbid: u64, icon: i64, servergruppen: &str) -> Antwort {
    let datensatz: Datensatz = [
        ("client_nickname", nickname.to_string()),
        ("client_database_id", cldbid.to_string()),
        ("client_icon_id", icon.to_string()),
        ("client_servergroups", servergruppen.to_string()),
    ]
    .into_iter()
    .collect();
    Antwort::mit_datensatz(datensatz)
}

/// `channelcreate`-Antwort mit neuer Kanal-Id
pub fn kanal_angelegt(cid: u64) -> Antwort {
    Antwort::mit_datensatz([("cid", cid.to_string())].into_iter().collect())
}
