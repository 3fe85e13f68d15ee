//! Ordered SET transactions.

mod common;

use common::*;
use snmp_southbound::codec::{PortSet, ports_to_hex};
use snmp_southbound::transport::ResponseBuilder;
use snmp_southbound::{Error, ErrorKind, ErrorStatus, SetEntry, Value, oid};

fn ok_reply() -> bytes::Bytes {
    ResponseBuilder::new(1)
        .varbind(oid!(1, 3, 6, 1), Value::Null)
        .build_v2c(COMMUNITY_RW.as_bytes())
}

fn vlan_entries() -> Vec<SetEntry> {
    let egress = ports_to_hex(&PortSet::from([1, 2, 9]));
    vec![
        SetEntry::new(format!("{VLAN_ROW_STATUS}.10"), "4", 'i'),
        SetEntry::new(format!("{VLAN_STATIC_NAME}.10"), "TSN-stream", 's'),
        SetEntry::new(format!("{VLAN_EGRESS_PORTS}.10"), egress, 'x'),
    ]
}

#[tokio::test]
async fn set_applies_entries_in_order() {
    init_tracing();
    let mock = mock();
    for _ in 0..3 {
        mock.queue_response(ok_reply());
    }

    southbound(&mock).set(&v2c_profile(), &vlan_entries()).await.unwrap();

    let sent: Vec<_> = mock
        .requests()
        .iter()
        .map(|r| r.pdu().unwrap().varbinds[0].clone())
        .collect();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].value, Value::Integer(4));
    assert_eq!(sent[1].value, Value::from("TSN-stream"));
    assert_eq!(sent[2].oid, vlan_egress_ports(10));
    match &sent[2].value {
        Value::OctetString(bytes) => {
            assert_eq!(bytes.len(), 16);
            assert_eq!(&bytes[..2], &[0xC0u8, 0x80]);
        }
        other => panic!("unexpected value {other:?}"),
    }
}

#[tokio::test]
async fn set_stops_at_rejected_entry() {
    init_tracing();
    let mock = mock();
    mock.queue_response(ok_reply());
    mock.queue_response(
        ResponseBuilder::new(1)
            .varbind(vlan_static_name(10), Value::from("TSN-stream"))
            .error_status(ErrorStatus::WrongLength)
            .error_index(1)
            .build_v2c(COMMUNITY_RW.as_bytes()),
    );
    // Never requested
    mock.queue_response(ok_reply());

    let entries = vlan_entries();
    let err = southbound(&mock).set(&v2c_profile(), &entries).await.unwrap_err();

    let (failed, applied) = err.set_failure().expect("set failure context");
    assert_eq!(failed, &entries[1]);
    assert_eq!(applied, &entries[..1]);
    assert_eq!(err.kind(), ErrorKind::Agent);
    assert_eq!(err.target(), Some(switch_addr()));
    assert!(matches!(
        err.root(),
        Error::Snmp { status: ErrorStatus::WrongLength, .. }
    ));
    assert_eq!(mock.requests().len(), 2);
    assert_eq!(mock.queued_response_count(), 1);
}

#[tokio::test]
async fn set_bind_failure_reports_entry() {
    init_tracing();
    let mock = mock();
    mock.queue_response(ok_reply());

    let entries = [
        SetEntry::new(format!("{VLAN_ROW_STATUS}.20"), "4", 'i'),
        SetEntry::new(format!("{VLAN_EGRESS_PORTS}.20"), "0xZZ", 'x'),
    ];
    let err = southbound(&mock).set(&v2c_profile(), &entries).await.unwrap_err();

    let (failed, applied) = err.set_failure().unwrap();
    assert_eq!(failed.type_char, 'x');
    assert_eq!(applied.len(), 1);
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn set_timeout_after_partial_apply() {
    init_tracing();
    let mock = mock();
    mock.queue_response(ok_reply());

    let err = southbound(&mock)
        .set(&v2c_profile(), &vlan_entries())
        .await
        .unwrap_err();

    let (failed, applied) = err.set_failure().unwrap();
    assert_eq!(failed.value, "TSN-stream");
    assert_eq!(applied.len(), 1);
    assert_eq!(err.kind(), ErrorKind::Timeout);
}
