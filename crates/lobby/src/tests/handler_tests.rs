//! Unit-Tests fuer den LobbyHandler

use std::sync::Arc;

use kanalwart_core::{ClientId, GruppenId, KanalId, LobbyEreignis};
use kanalwart_query::error::FEHLER_KANALNAME_VERGEBEN;
use kanalwart_query::QueryError;

use super::mock_transport::{clientinfo, kanal_angelegt, MockTransport};
use crate::{Behandlung, LobbyHandler, LobbyKonfig};

const LOBBY: KanalId = KanalId(1);

fn handler(mock: &Arc<MockTransport>, konfig: LobbyKonfig) -> LobbyHandler {
    LobbyHandler::neu(mock.clone(), Arc::new(konfig))
}

fn verschoben(clid: u64) -> LobbyEreignis {
    LobbyEreignis::ClientVerschoben {
        clid: ClientId(clid),
        ctid: LOBBY,
    }
}

fn konfig_mit_gruppen(gruppen: &[u64]) -> LobbyKonfig {
    LobbyKonfig {
        lobby_kanal: LOBBY,
        eltern_kanal: KanalId(30),
        erlaubte_gruppen: gruppen.iter().copied().map(GruppenId).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_berechtigter_client_bekommt_kanal() {
    let mock = MockTransport::neu();
    mock.antwort("clientinfo", Ok(clientinfo("Alice", 77, -12345, "6,8")));
    mock.antwort("channelcreate", Ok(kanal_angelegt(42)));

    let ergebnis = handler(&mock, konfig_mit_gruppen(&[8]))
        .ereignis_behandeln(verschoben(5))
        .await;

    assert_eq!(
        ergebnis,
        Behandlung::Bereitgestellt {
            cid: KanalId(42),
            name: "Alice".into()
        }
    );
    assert_eq!(
        mock.befehlsnamen(),
        vec![
            "clientinfo",
            "channelcreate",
            "channeledit",
            "clientmove",
            "setclientchannelgroup",
            "sendtextmessage",
        ]
    );

    let aufrufe = mock.aufrufe();
    assert_eq!(aufrufe[0].wert("clid"), Some("5"));

    let erstellen = &aufrufe[1];
    assert_eq!(erstellen.wert("cpid"), Some("30"));
    let passwort = erstellen.wert("channel_password").unwrap().to_string();
    assert_eq!(passwort.len(), 10);

    let icon = &aufrufe[2];
    assert_eq!(icon.wert("cid"), Some("42"));
    assert_eq!(icon.wert("channel_icon_id"), Some("-12345"));

    let verschieben = &aufrufe[3];
    assert_eq!(verschieben.wert("clid"), Some("5"));
    assert_eq!(verschieben.wert("cid"), Some("42"));
    assert_eq!(verschieben.wert("pwd"), Some(passwort.as_str()));

    let gruppe = &aufrufe[4];
    assert_eq!(gruppe.wert("cgid"), Some("5"));
    assert_eq!(gruppe.wert("cldbid"), Some("77"));
    assert_eq!(gruppe.wert("cid"), Some("42"));

    let nachricht = &aufrufe[5];
    assert_eq!(nachricht.wert("target"), Some("5"));
    assert_eq!(nachricht.wert("targetmode"), Some("1"));
    assert_eq!(
        nachricht.wert("msg").map(str::to_string),
        Some(format!("The password for your new channel is: {passwort}"))
    );
}

#[tokio::test]
async fn test_leere_erlaubnisliste_erlaubt_jede_gruppe() {
    let mock = MockTransport::neu();
    mock.antwort("clientinfo", Ok(clientinfo("Bob", 3, 0, "9")));
    mock.antwort("channelcreate", Ok(kanal_angelegt(50)));

    let ergebnis = handler(&mock, konfig_mit_gruppen(&[]))
        .ereignis_behandeln(verschoben(2))
        .await;

    assert!(matches!(ergebnis, Behandlung::Bereitgestellt { .. }));
    assert!(mock.aufrufe_von("clientkick").is_empty());
}

#[tokio::test]
async fn test_unberechtigter_client_wird_abgewiesen() {
    let mock = MockTransport::neu();
    mock.antwort("clientinfo", Ok(clientinfo("Mallory", 9, 0, "3,7")));

    let konfig = LobbyKonfig {
        keine_berechtigung_nachricht: "Kein Kanal fuer dich".into(),
        ..konfig_mit_gruppen(&[6, 8])
    };
    let ergebnis = handler(&mock, konfig).ereignis_behandeln(verschoben(4)).await;

    assert_eq!(ergebnis, Behandlung::Abgewiesen);
    assert_eq!(
        mock.befehlsnamen(),
        vec!["clientinfo", "clientkick", "sendtextmessage"]
    );

    let kick = &mock.aufrufe_von("clientkick")[0];
    assert_eq!(kick.wert("clid"), Some("4"));
    assert_eq!(kick.wert("reasonid"), Some("4"));
    assert_eq!(kick.wert("reasonmsg"), Some(""));

    let nachricht = &mock.aufrufe_von("sendtextmessage")[0];
    assert_eq!(nachricht.wert("msg"), Some("Kein Kanal fuer dich"));
}

#[tokio::test]
async fn test_abweisung_sendet_nachricht_auch_wenn_kick_scheitert() {
    let mock = MockTransport::neu();
    mock.antwort("clientinfo", Ok(clientinfo("Mallory", 9, 0, "3")));
    mock.antwort("clientkick", Err(QueryError::server(512, "invalid clientID")));

    let ergebnis = handler(&mock, konfig_mit_gruppen(&[6]))
        .ereignis_behandeln(verschoben(4))
        .await;

    assert_eq!(ergebnis, Behandlung::Abgewiesen);
    assert_eq!(mock.aufrufe_von("sendtextmessage").len(), 1);
}

#[tokio::test]
async fn test_fehler_in_kette_fuehrt_zu_kick_und_nachricht() {
    let mock = MockTransport::neu();
    mock.antwort("clientinfo", Ok(clientinfo("Alice", 77, 0, "8")));
    mock.antwort("channelcreate", Ok(kanal_angelegt(42)));
    mock.antwort("clientmove", Err(QueryError::server(768, "invalid channelID")));

    let ergebnis = handler(&mock, konfig_mit_gruppen(&[]))
        .ereignis_behandeln(verschoben(5))
        .await;

    assert_eq!(ergebnis, Behandlung::Fehlgeschlagen);
    assert_eq!(
        mock.befehlsnamen(),
        vec![
            "clientinfo",
            "channelcreate",
            "channeledit",
            "clientmove",
            "clientkick",
            "sendtextmessage",
        ]
    );

    let kick = &mock.aufrufe_von("clientkick")[0];
    assert_eq!(kick.wert("reasonmsg"), Some("Error trying to create the channel"));

    let nachricht = mock.aufrufe_von("sendtextmessage")[0]
        .wert("msg")
        .unwrap()
        .to_string();
    assert!(nachricht.contains("please try again later"));
    // Technische Details bleiben im Log
    assert!(!nachricht.contains("invalid channelID"));
}

#[tokio::test]
async fn test_kollisionen_ausgeschoepft() {
    let mock = MockTransport::neu();
    mock.antwort("clientinfo", Ok(clientinfo("Alice", 77, 0, "8")));
    for _ in 0..6 {
        mock.antwort(
            "channelcreate",
            Err(QueryError::server(FEHLER_KANALNAME_VERGEBEN, "channel name is already in use")),
        );
    }

    let ergebnis = handler(&mock, konfig_mit_gruppen(&[]))
        .ereignis_behandeln(verschoben(5))
        .await;

    assert_eq!(ergebnis, Behandlung::Fehlgeschlagen);
    assert_eq!(mock.aufrufe_von("channelcreate").len(), 6);
    assert!(mock.aufrufe_von("clientmove").is_empty());
    assert_eq!(mock.aufrufe_von("clientkick").len(), 1);
}

#[tokio::test]
async fn test_clientinfo_fehler() {
    let mock = MockTransport::neu();
    mock.antwort("clientinfo", Err(QueryError::server(512, "invalid clientID")));

    let ergebnis = handler(&mock, konfig_mit_gruppen(&[]))
        .ereignis_behandeln(verschoben(5))
        .await;

    assert_eq!(ergebnis, Behandlung::Fehlgeschlagen);
    assert_eq!(
        mock.befehlsnamen(),
        vec!["clientinfo", "clientkick", "sendtextmessage"]
    );
}

#[tokio::test]
async fn test_direkt_betreten_wird_gekickt() {
    let mock = MockTransport::neu();

    let ergebnis = handler(&mock, konfig_mit_gruppen(&[]))
        .ereignis_behandeln(LobbyEreignis::ClientBetreten {
            clid: ClientId(8),
            ctid: LOBBY,
        })
        .await;

    assert_eq!(ergebnis, Behandlung::BetretenAbgelehnt);
    assert_eq!(mock.befehlsnamen(), vec!["clientkick"]);
    let kick = &mock.aufrufe()[0];
    assert_eq!(kick.wert("clid"), Some("8"));
    assert_eq!(kick.wert("reasonmsg"), Some("Channel not allowed"));
}

#[tokio::test]
async fn test_andere_kanaele_werden_ignoriert() {
    let mock = MockTransport::neu();
    let h = handler(&mock, konfig_mit_gruppen(&[]));

    let moved = LobbyEreignis::ClientVerschoben {
        clid: ClientId(5),
        ctid: KanalId(99),
    };
    let entered = LobbyEreignis::ClientBetreten {
        clid: ClientId(5),
        ctid: KanalId(99),
    };
    assert!(!h.betrifft_lobby(&moved));
    assert_eq!(h.ereignis_behandeln(moved).await, Behandlung::Ignoriert);
    assert_eq!(h.ereignis_behandeln(entered).await, Behandlung::Ignoriert);
    assert!(mock.aufrufe().is_empty());
}

#[tokio::test]
async fn test_passwort_ist_pro_client_neu() {
    let mock = MockTransport::neu();
    mock.antwort("clientinfo", Ok(clientinfo("A", 1, 0, "8")));
    mock.antwort("clientinfo", Ok(clientinfo("B", 2, 0, "8")));
    mock.antwort("channelcreate", Ok(kanal_angelegt(10)));
    mock.antwort("channelcreate", Ok(kanal_angelegt(11)));

    let h = handler(&mock, konfig_mit_gruppen(&[]));
    h.ereignis_behandeln(verschoben(1)).await;
    h.ereignis_behandeln(verschoben(2)).await;

    let passwoerter: Vec<String> = mock
        .aufrufe_von("clientmove")
        .iter()
        .map(|b| b.wert("pwd").unwrap().to_string())
        .collect();
    assert_eq!(passwoerter.len(), 2);
    assert_ne!(passwoerter[0], passwoerter[1]);
}
