//! Session establishment and the request loop, v2c and v3.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use snmp_southbound::message::{Message, SecurityLevel};
use snmp_southbound::pdu::Pdu;
use snmp_southbound::transport::{MockTransport, MockUsmAgent, ResponseBuilder};
use snmp_southbound::v3::{
    AuthProtocol, LocalizedKey, PrivKey, PrivProtocol, UsmCredentialCache, UsmSecurityParams,
};
use snmp_southbound::{
    AuthKind, DeviceConnectionProfile, Error, ErrorKind, Intent, PrivKind, Session,
    SessionBuilder, Value, VarBind,
};

fn v3_profile() -> DeviceConnectionProfile {
    DeviceConnectionProfile::v3(SWITCH_HOST, V3_USER)
        .with_auth(AuthKind::Sha1, AUTH_PASSWORD)
        .with_privacy(PrivKind::Aes, PRIV_PASSWORD)
}

fn agent(boots: u32, time: u32) -> MockUsmAgent {
    let auth_key =
        LocalizedKey::derive(AuthProtocol::Sha1, AUTH_PASSWORD.as_bytes(), ENGINE_ID).unwrap();
    let priv_key = PrivKey::derive(
        AuthProtocol::Sha1,
        PrivProtocol::Aes128,
        PRIV_PASSWORD.as_bytes(),
        ENGINE_ID,
    )
    .unwrap();
    MockUsmAgent::new(ENGINE_ID, boots, time, V3_USER).with_keys(auth_key, Some(priv_key))
}

fn sys_name_response() -> Pdu {
    Pdu::response(0, vec![VarBind::new(sys_name(), Value::from("TSN-G5008"))])
}

async fn open_v3(mock: &MockTransport, retries: u32) -> Session<MockTransport> {
    let discovery = agent(3, 1000);
    mock.queue_reply(move |request| discovery.discovery_report(request).unwrap());

    SessionBuilder::new(Arc::new(UsmCredentialCache::new()))
        .retries(retries)
        .build_with(mock, &v3_profile(), Duration::from_millis(100), Intent::Read)
        .await
        .unwrap()
}

#[tokio::test]
async fn v2c_session_uses_read_community() {
    init_tracing();
    let session = SessionBuilder::new(Arc::new(UsmCredentialCache::new()))
        .build_with(&mock(), &v2c_profile(), Duration::from_secs(2), Intent::Read)
        .await
        .unwrap();

    assert_eq!(session.community(), b"public");
    assert_eq!(session.target(), switch_addr());
    assert_eq!(session.timeout(), Duration::from_secs(2));
}

#[tokio::test]
async fn v3_auth_priv_get() {
    init_tracing();
    let mock = mock();
    let mut session = open_v3(&mock, 0).await;
    assert_eq!(session.security_level(), Some(SecurityLevel::AuthPriv));

    let responder = agent(3, 1000);
    mock.queue_reply(move |request| responder.respond(request, sys_name_response()).unwrap());

    let map = session.get(&["1.3.6.1.2.1.1.5.0"]).await.unwrap();
    assert_eq!(map.get("1.3.6.1.2.1.1.5.0"), Some("TSN-G5008"));

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    match requests[1].message().unwrap() {
        Message::V3(message) => {
            assert_eq!(message.security_level(), SecurityLevel::AuthPriv);
            assert!(message.scoped_pdu().is_none(), "scoped PDU must be encrypted");
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn v3_not_in_time_window_resyncs_and_resends() {
    init_tracing();
    let mock = mock();
    let mut session = open_v3(&mock, 1).await;

    // Agent rebooted since discovery
    let rebooted = agent(4, 12);
    let reporter = rebooted.clone();
    mock.queue_reply(move |request| reporter.report(request, 2).unwrap());
    mock.queue_reply(move |request| rebooted.respond(request, sys_name_response()).unwrap());

    let map = session.get(&["1.3.6.1.2.1.1.5.0"]).await.unwrap();
    assert_eq!(map.len(), 1);

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    let Message::V3(resent) = requests[2].message().unwrap() else {
        panic!("expected v3 request");
    };
    let usm = UsmSecurityParams::decode(resent.security_params.clone()).unwrap();
    assert_eq!(usm.engine_boots, 4);
    assert!(usm.engine_time >= 12);
}

#[tokio::test]
async fn v3_wrong_digest_report_is_crypto_error() {
    init_tracing();
    let mock = mock();
    let mut session = open_v3(&mock, 0).await;

    let reporter = agent(3, 1000);
    mock.queue_reply(move |request| reporter.report(request, 5).unwrap());

    let err = session.get(&["1.3.6.1.2.1.1.5.0"]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Crypto);
    assert!(matches!(err.root(), Error::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn v3_tampered_response_fails_authentication() {
    init_tracing();
    let mock = mock();
    let mut session = open_v3(&mock, 0).await;

    let responder = agent(3, 1000);
    mock.queue_reply(move |request| {
        let mut data = responder
            .respond(request, sys_name_response())
            .unwrap()
            .to_vec();
        let last = data.len() - 1;
        data[last] ^= 0x01;
        data.into()
    });

    let err = session.get(&["1.3.6.1.2.1.1.5.0"]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Crypto);
}

#[tokio::test]
async fn v3_discovery_failure_is_connect_error() {
    init_tracing();
    let err = SessionBuilder::new(Arc::new(UsmCredentialCache::new()))
        .retries(1)
        .build_with(&mock(), &v3_profile(), Duration::from_millis(20), Intent::Read)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connect);
    assert_eq!(err.target(), Some(switch_addr()));
}

#[tokio::test]
async fn timeout_after_retries_reports_attempts() {
    init_tracing();
    let mock = mock();
    let mut session = SessionBuilder::new(Arc::new(UsmCredentialCache::new()))
        .retries(2)
        .build_with(&mock, &v2c_profile(), Duration::from_millis(20), Intent::Read)
        .await
        .unwrap();

    let err = session.get(&["1.3.6.1.2.1.1.5.0"]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(matches!(err.root(), Error::Timeout { retries: 2, .. }));
    assert_eq!(mock.requests().len(), 3);
}

#[tokio::test]
async fn stale_response_does_not_consume_attempt() {
    init_tracing();
    let mock = mock();
    mock.queue_raw_response(
        ResponseBuilder::new(0)
            .varbind(sys_name(), Value::from("stale"))
            .build_v2c(COMMUNITY_RO.as_bytes()),
    );
    mock.queue_response(v2c_reply(sys_name(), Value::from("fresh")));

    let mut session = SessionBuilder::new(Arc::new(UsmCredentialCache::new()))
        .retries(0)
        .build_with(&mock, &v2c_profile(), Duration::from_millis(100), Intent::Read)
        .await
        .unwrap();

    let map = session.get(&["1.3.6.1.2.1.1.5.0"]).await.unwrap();
    assert_eq!(map.get("1.3.6.1.2.1.1.5.0"), Some("fresh"));
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn credential_cache_shared_across_sessions() {
    init_tracing();
    let cache = Arc::new(UsmCredentialCache::new());
    let builder = SessionBuilder::new(cache.clone());

    for _ in 0..2 {
        let mock = mock();
        let discovery = agent(3, 1000);
        mock.queue_reply(move |request| discovery.discovery_report(request).unwrap());
        builder
            .build_with(&mock, &v3_profile(), Duration::from_millis(100), Intent::Write)
            .await
            .unwrap();
    }

    assert_eq!(cache.len(), 1);
    assert!(cache.contains(V3_USER, &bytes::Bytes::from_static(ENGINE_ID)));
}
