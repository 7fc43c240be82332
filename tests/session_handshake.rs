//! Connect, greeting, and authentication behavior.

mod common;

use builderport::client::{BuilderPortError, Session, SessionState};
use common::Step::{Recv, Send};

#[tokio::test]
async fn connect_and_authenticate_success() {
    let server = common::spawn(vec![
        Send(&["Welcome to MikkiMUD status port", ""]),
        Recv("hello secret 1"),
        Send(&["OK"]),
        Recv("quit"),
    ])
    .await;

    let mut session = Session::new("127.0.0.1", server.port, "secret");
    session.connect().await.expect("connect should succeed");
    assert!(session.is_authenticated());
    assert_eq!(session.state(), SessionState::Authenticated);

    session.disconnect().await;
    assert_eq!(session.state(), SessionState::Closed);
    server.finish().await;
}

#[tokio::test]
async fn auth_failure_raises_401_and_stays_greeted() {
    let server = common::spawn(vec![
        Send(&["Welcome to MikkiMUD status port"]),
        Recv("hello badtoken 1"),
        Send(&["ERROR 401 YmFk"]),
    ])
    .await;

    let mut session = Session::new("127.0.0.1", server.port, "badtoken");
    match session.connect().await {
        Err(BuilderPortError::Protocol { code, message }) => {
            assert_eq!(code, 401);
            assert_eq!(message, "Authentication failed: ERROR 401 YmFk");
        }
        other => panic!("expected auth failure, got {other:?}"),
    }
    assert!(!session.is_authenticated());
    assert_eq!(session.state(), SessionState::Greeted);
    server.finish().await;
}

#[tokio::test]
async fn greeting_loop_stops_after_five_banners() {
    let server = common::spawn(vec![
        Send(&[
            "MikkiMUD banner one",
            "MikkiMUD banner two",
            "MikkiMUD banner three",
            "MikkiMUD banner four",
            "MikkiMUD banner five",
        ]),
        Recv("hello secret 1"),
        Send(&["OK"]),
    ])
    .await;

    let mut session = Session::new("127.0.0.1", server.port, "secret");
    session.connect().await.expect("connect should succeed");
    assert!(session.is_authenticated());
    server.finish().await;
}

#[tokio::test]
async fn quiet_server_after_one_banner_still_authenticates() {
    // Only one banner, then silence: the greeting loop must give up
    // waiting and proceed to the hello exchange.
    let server = common::spawn(vec![
        Send(&["MikkiMUD status port ready"]),
        Recv("hello secret 1"),
        Send(&["", "OK"]),
    ])
    .await;

    let mut session = Session::new("127.0.0.1", server.port, "secret");
    session.connect().await.expect("connect should succeed");
    assert!(session.is_authenticated());
    server.finish().await;
}

#[tokio::test]
async fn operations_without_transport_report_not_connected() {
    let mut session = Session::new("127.0.0.1", 9, "secret");
    match session.get_room(1204).await {
        Err(BuilderPortError::NotConnected) => {}
        other => panic!("expected NotConnected, got {other:?}"),
    }
    match session.list_zones().await {
        Err(BuilderPortError::NotConnected) => {}
        other => panic!("expected NotConnected, got {other:?}"),
    }
}

#[tokio::test]
async fn peer_close_mid_reply_maps_to_not_connected() {
    let server = common::spawn(vec![
        Send(&["Welcome to MikkiMUD status port"]),
        Recv("hello secret 1"),
        Send(&["OK"]),
        Recv("wld_list"),
        // Script ends here: the connection drops before any reply.
    ])
    .await;

    let mut session = Session::new("127.0.0.1", server.port, "secret");
    session.connect().await.expect("connect should succeed");
    match session.list_zones().await {
        Err(BuilderPortError::NotConnected) => {}
        other => panic!("expected NotConnected, got {other:?}"),
    }
    server.finish().await;
}
