//! Integration tests for the DSM session lifecycle.
//!
//! These tests run the client against a local mock HTTP server and
//! verify the login flow, token reuse, the one-shot re-login retry on
//! session expiry, and that terminal auth failures are never retried.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use dsm_client::{AuthReason, DsmClient, DsmConfig, DsmError};
use mockito::{Matcher, Server, ServerGuard};

const PLAYER_API: &str = "SYNO.AudioStation.RemotePlayer";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn client_for(server: &ServerGuard) -> DsmClient {
    init_tracing();
    let host_with_port = server.host_with_port();
    let (host, port) = host_with_port
        .split_once(':')
        .expect("mock server address should be host:port");
    let config = DsmConfig::new(host, "admin", "secret")
        .use_https(false)
        .port(port.parse().expect("mock server port"));
    DsmClient::new(config).expect("client construction")
}

fn sid_matcher(sid: &str) -> Matcher {
    Matcher::UrlEncoded("_sid".into(), sid.into())
}

/// Auth endpoint that hands out sid-1, sid-2, ... on successive logins.
fn mock_auth_sequence(server: &mut ServerGuard, expected_logins: usize) -> mockito::Mock {
    let counter = Arc::new(AtomicUsize::new(0));
    server
        .mock("GET", "/webapi/auth.cgi")
        .match_query(Matcher::UrlEncoded("method".into(), "login".into()))
        .with_body_from_request(move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            format!(r#"{{"success":true,"data":{{"sid":"sid-{}"}}}}"#, n).into_bytes()
        })
        .expect(expected_logins)
        .create()
}

#[test]
fn login_once_then_reuse_token() {
    let mut server = Server::new();
    let auth = mock_auth_sequence(&mut server, 1);
    let entry = server
        .mock("GET", "/webapi/entry.cgi")
        .match_query(sid_matcher("sid-1"))
        .with_body(r#"{"success":true,"data":{"players":[]}}"#)
        .expect(2)
        .create();

    let client = client_for(&server);
    for _ in 0..2 {
        let envelope = client.get(PLAYER_API, "list", 3, &[]).expect("call succeeds");
        assert_eq!(envelope["success"], true);
    }

    auth.assert();
    entry.assert();
}

#[test]
fn invalid_credentials_surface_without_retry() {
    let mut server = Server::new();
    let auth = server
        .mock("GET", "/webapi/auth.cgi")
        .match_query(Matcher::UrlEncoded("method".into(), "login".into()))
        .with_body(r#"{"success":false,"error":{"code":400}}"#)
        .expect(1)
        .create();

    let client = client_for(&server);
    let err = client.get(PLAYER_API, "list", 3, &[]).unwrap_err();
    assert!(matches!(
        err,
        DsmError::Auth(AuthReason::InvalidCredentials)
    ));

    auth.assert();
}

#[test]
fn two_factor_required_is_reported() {
    let mut server = Server::new();
    server
        .mock("GET", "/webapi/auth.cgi")
        .match_query(Matcher::Any)
        .with_body(r#"{"success":false,"error":{"code":403}}"#)
        .create();

    let client = client_for(&server);
    let err = client.login().unwrap_err();
    assert!(matches!(err, DsmError::Auth(AuthReason::TwoFactorRequired)));
}

#[test]
fn expired_session_triggers_exactly_one_relogin() {
    let mut server = Server::new();
    let auth = mock_auth_sequence(&mut server, 2);
    let expired = server
        .mock("GET", "/webapi/entry.cgi")
        .match_query(sid_matcher("sid-1"))
        .with_body(r#"{"success":false,"error":{"code":119}}"#)
        .expect(1)
        .create();
    let retried = server
        .mock("GET", "/webapi/entry.cgi")
        .match_query(sid_matcher("sid-2"))
        .with_body(r#"{"success":true,"data":{"total":4}}"#)
        .expect(1)
        .create();

    let client = client_for(&server);
    let envelope = client
        .get(PLAYER_API, "getplaylist", 3, &[])
        .expect("retry against fresh token succeeds");
    assert_eq!(envelope["data"]["total"], 4);

    auth.assert();
    expired.assert();
    retried.assert();
}

#[test]
fn second_expiry_surfaces_error_without_looping() {
    let mut server = Server::new();
    let auth = mock_auth_sequence(&mut server, 2);
    let entry = server
        .mock("GET", "/webapi/entry.cgi")
        .match_query(Matcher::Any)
        .with_body(r#"{"success":false,"error":{"code":106}}"#)
        .expect(2)
        .create();

    let client = client_for(&server);
    let err = client.get(PLAYER_API, "getplaylist", 3, &[]).unwrap_err();
    match err {
        DsmError::Api { api, code } => {
            assert_eq!(api, PLAYER_API);
            assert_eq!(code, 106);
        }
        other => panic!("expected Api error, got {:?}", other),
    }

    auth.assert();
    entry.assert();
}

#[test]
fn concurrent_expiries_share_one_relogin() {
    let mut server = Server::new();
    // Initial login plus exactly one re-login, no matter how the two
    // failing callers interleave: whichever reaches reauthenticate
    // second finds the token already rotated and reuses it.
    let auth = mock_auth_sequence(&mut server, 2);
    let expired = server
        .mock("GET", "/webapi/entry.cgi")
        .match_query(sid_matcher("sid-1"))
        .with_body(r#"{"success":false,"error":{"code":106}}"#)
        .expect_at_least(1)
        .expect_at_most(2)
        .create();
    let retried = server
        .mock("GET", "/webapi/entry.cgi")
        .match_query(sid_matcher("sid-2"))
        .with_body(r#"{"success":true,"data":{"total":4}}"#)
        .expect(2)
        .create();

    let client = client_for(&server);
    client.login().expect("eager login");
    let barrier = Barrier::new(2);
    thread::scope(|scope| {
        for _ in 0..2 {
            scope.spawn(|| {
                barrier.wait();
                let envelope = client
                    .get(PLAYER_API, "getplaylist", 3, &[])
                    .expect("call succeeds after shared re-login");
                assert_eq!(envelope["data"]["total"], 4);
            });
        }
    });

    auth.assert();
    expired.assert();
    retried.assert();
}

#[test]
fn transport_failure_surfaces_without_second_login() {
    let mut server = Server::new();
    let auth = mock_auth_sequence(&mut server, 1);
    let entry = server
        .mock("GET", "/webapi/entry.cgi")
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(1)
        .create();

    let client = client_for(&server);
    let err = client.get(PLAYER_API, "list", 3, &[]).unwrap_err();
    assert!(matches!(err, DsmError::Network(_)));

    // Only session-expired API codes get the one-shot retry.
    auth.assert();
    entry.assert();
}

#[test]
fn logical_rejection_is_not_an_error() {
    let mut server = Server::new();
    mock_auth_sequence(&mut server, 1);
    let auth_count = server
        .mock("POST", "/webapi/entry.cgi")
        .with_body(r#"{"success":false}"#)
        .expect(1)
        .create();

    let client = client_for(&server);
    let envelope = client
        .post(PLAYER_API, "updateplaylist", 3, &[])
        .expect("logical rejection returns the envelope");
    assert_eq!(envelope["success"], false);

    auth_count.assert();
}

#[test]
fn device_error_code_surfaces_without_relogin() {
    let mut server = Server::new();
    let auth = mock_auth_sequence(&mut server, 1);
    server
        .mock("GET", "/webapi/entry.cgi")
        .match_query(Matcher::Any)
        .with_body(r#"{"success":false,"error":{"code":555}}"#)
        .expect(1)
        .create();

    let client = client_for(&server);
    let err = client.get(PLAYER_API, "list", 3, &[]).unwrap_err();
    assert!(matches!(err, DsmError::Api { code: 555, .. }));
    assert!(!err.is_session_expired());

    auth.assert();
}

#[test]
fn device_token_from_login_is_surfaced() {
    let mut server = Server::new();
    server
        .mock("GET", "/webapi/auth.cgi")
        .match_query(Matcher::Any)
        .with_body(r#"{"success":true,"data":{"sid":"sid-1","did":"token-9"}}"#)
        .create();

    let client = client_for(&server);
    client.login().expect("login succeeds");
    assert_eq!(client.device_token().as_deref(), Some("token-9"));
}

#[test]
fn configured_device_token_is_sent_on_login() {
    let mut server = Server::new();
    let auth = server
        .mock("GET", "/webapi/auth.cgi")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("method".into(), "login".into()),
            Matcher::UrlEncoded("device_id".into(), "token-9".into()),
        ]))
        .with_body(r#"{"success":true,"data":{"sid":"sid-1"}}"#)
        .expect(1)
        .create();

    let host_with_port = server.host_with_port();
    let (host, port) = host_with_port.split_once(':').expect("host:port");
    let config = DsmConfig::new(host, "admin", "secret")
        .use_https(false)
        .port(port.parse().expect("port"))
        .device_token("token-9");
    let client = DsmClient::new(config).expect("client construction");
    client.login().expect("login succeeds");

    auth.assert();
}
