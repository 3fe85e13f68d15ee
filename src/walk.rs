//! GET, GETNEXT walks and GETBULK walks.
//!
//! Results are decoded to strings as they arrive and collected into an
//! [`OidValueMap`]. A walk whose very first reply already lies outside the
//! requested subtree returns [`WalkOutcome::Skip`]: the table is simply not
//! populated on this device, which callers treat differently from a failure.

use std::collections::{HashMap, HashSet};

use tracing::instrument;

use crate::codec::decode_value;
use crate::error::{DecodeErrorKind, Error, ErrorStatus, Operation, Result};
use crate::oid::Oid;
use crate::pdu::Pdu;
use crate::session::Session;
use crate::transport::Transport;
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

/// OID to decoded value, in the order the agent returned them.
///
/// Keys are dotted decimal without a leading dot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OidValueMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl OidValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. An overwritten entry keeps its position.
    pub fn insert(&mut self, oid: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let oid = oid.into();
        let value = value.into();
        match self.index.get(&oid) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.index.insert(oid.clone(), self.entries.len());
                self.entries.push((oid, value));
                None
            }
        }
    }

    pub fn get(&self, oid: &str) -> Option<&str> {
        self.index
            .get(oid)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains_key(&self, oid: &str) -> bool {
        self.index.contains_key(oid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(oid, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }
}

impl IntoIterator for OidValueMap {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OidValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for OidValueMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Result of a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkOutcome {
    Values(OidValueMap),
    /// The subtree is empty on this agent.
    Skip,
}

impl WalkOutcome {
    pub fn is_skip(&self) -> bool {
        matches!(self, WalkOutcome::Skip)
    }

    pub fn values(&self) -> Option<&OidValueMap> {
        match self {
            WalkOutcome::Values(map) => Some(map),
            WalkOutcome::Skip => None,
        }
    }

    /// The collected values; empty for [`WalkOutcome::Skip`].
    pub fn into_values(self) -> OidValueMap {
        match self {
            WalkOutcome::Values(map) => map,
            WalkOutcome::Skip => OidValueMap::new(),
        }
    }
}

/// Check whether `oid` lies strictly inside the subtree rooted at `base`.
///
/// Compares against the next sibling of `base` (last arc plus one), so
/// `1.3.6.1.2.1.2.2.1.8.3` is inside `1.3.6.1.2.1.2.2.1.8` and
/// `1.3.6.1.2.1.2.2.1.9.1` is not.
pub fn in_subtree(oid: &Oid, base: &Oid) -> bool {
    match base.next_sibling() {
        Some(sibling) => oid > base && *oid < sibling,
        None => oid.len() > base.len() && oid.starts_with(base),
    }
}

/// Decode `vb` into `map`, or log and skip a value with no rendering.
///
/// Returns whether a value was inserted.
fn collect(map: &mut OidValueMap, vb: &VarBind) -> bool {
    match decode_value(&vb.value) {
        Some(text) => {
            map.insert(vb.oid.to_string(), text);
            true
        }
        None => {
            tracing::trace!(
                target: "snmp_southbound::walk",
                { snmp.oid = %vb.oid, value = %vb.value },
                "skipping value with no string rendering"
            );
            false
        }
    }
}

fn first_varbind(response: Pdu) -> Result<VarBind> {
    response
        .varbinds
        .into_iter()
        .next()
        .ok_or_else(|| Error::decode(0, DecodeErrorKind::EmptyResponse))
}

impl<T: Transport> Session<T> {
    /// GET each OID in turn.
    ///
    /// The response OID must equal the requested one. An exception value
    /// (noSuchObject, noSuchInstance) fails the call; a value with no string
    /// rendering is left out of the map.
    #[instrument(level = "debug", skip_all, fields(snmp.target = %self.target()))]
    pub async fn get<S: AsRef<str>>(&mut self, oids: &[S]) -> Result<OidValueMap> {
        let target = self.target();
        let mut map = OidValueMap::new();
        for oid in oids {
            let oid = oid.as_ref();
            self.get_one(oid, &mut map)
                .await
                .map_err(|e| e.in_operation(Operation::Get, target, Some(oid)))?;
        }
        Ok(map)
    }

    async fn get_one(&mut self, oid: &str, map: &mut OidValueMap) -> Result<()> {
        let requested = Oid::parse(oid)?;
        let id = self.next_request_id();
        let vb = first_varbind(
            self.request(Pdu::get_request(id, std::slice::from_ref(&requested)))
                .await?,
        )?;

        if vb.oid != requested {
            return Err(Error::OidMismatch {
                requested,
                returned: vb.oid,
            });
        }
        if vb.value.is_exception() {
            return Err(Error::Exception {
                oid: vb.oid,
                value: vb.value,
            });
        }
        collect(map, &vb);
        Ok(())
    }

    /// Walk the subtree under `base` with GETNEXT.
    #[instrument(level = "debug", skip_all, fields(snmp.target = %self.target(), snmp.oid = base))]
    pub async fn walk_next(&mut self, base: &str) -> Result<WalkOutcome> {
        let target = self.target();
        self.walk_next_inner(base)
            .await
            .map_err(|e| e.in_operation(Operation::WalkNext, target, Some(base)))
    }

    async fn walk_next_inner(&mut self, base: &str) -> Result<WalkOutcome> {
        let base = Oid::parse(base)?;
        let mut cursor = base.clone();
        let mut map = OidValueMap::new();
        let mut requests = 0u32;

        loop {
            let id = self.next_request_id();
            let first = requests == 0;
            requests += 1;

            let response = match self
                .request(Pdu::get_next_request(id, std::slice::from_ref(&cursor)))
                .await
            {
                Ok(response) => response,
                // SNMPv1 signals the end of the MIB view with noSuchName.
                Err(Error::Snmp {
                    status: ErrorStatus::NoSuchName,
                    ..
                }) if self.version() == Version::V1 => {
                    if first {
                        return Ok(WalkOutcome::Skip);
                    }
                    break;
                }
                Err(e) => return Err(e),
            };
            let vb = first_varbind(response)?;

            if first {
                if matches!(vb.value, Value::EndOfMibView)
                    || !in_subtree(&vb.oid, &base)
                    || vb.value.is_missing()
                {
                    tracing::debug!(
                        target: "snmp_southbound::walk",
                        { snmp.oid = %base, returned = %vb.oid },
                        "subtree empty"
                    );
                    return Ok(WalkOutcome::Skip);
                }
            } else {
                if matches!(vb.value, Value::EndOfMibView) {
                    break;
                }
                if vb.oid <= cursor {
                    return Err(Error::NonIncreasingOid {
                        previous: cursor,
                        current: vb.oid,
                    });
                }
                if !in_subtree(&vb.oid, &base) {
                    break;
                }
                if vb.value.is_missing() {
                    return Err(Error::Exception {
                        oid: vb.oid,
                        value: vb.value,
                    });
                }
            }

            let usable = collect(&mut map, &vb);
            if first && !usable {
                tracing::debug!(
                    target: "snmp_southbound::walk",
                    { snmp.oid = %base, returned = %vb.oid },
                    "first value has no rendering, subtree empty"
                );
                return Ok(WalkOutcome::Skip);
            }
            cursor = vb.oid;
        }

        tracing::debug!(
            target: "snmp_southbound::walk",
            { snmp.oid = %base, requests, values = map.len() },
            "walk complete"
        );
        Ok(WalkOutcome::Values(map))
    }

    /// Walk the subtree under `base` with GETBULK (non-repeaters 0).
    ///
    /// A batch stops early at the first varbind outside the subtree or at an
    /// OID already collected, and that ends the walk. SNMPv1 has no GETBULK,
    /// so v1 sessions walk with GETNEXT instead.
    #[instrument(
        level = "debug",
        skip_all,
        fields(snmp.target = %self.target(), snmp.oid = base, max_repetitions = max_repetitions)
    )]
    pub async fn walk_bulk(&mut self, base: &str, max_repetitions: u32) -> Result<WalkOutcome> {
        let target = self.target();
        if !self.version().supports_bulk() {
            tracing::debug!(
                target: "snmp_southbound::walk",
                { snmp.oid = base },
                "GETBULK not available on SNMPv1, walking with GETNEXT"
            );
            return self
                .walk_next_inner(base)
                .await
                .map_err(|e| e.in_operation(Operation::WalkBulk, target, Some(base)));
        }

        self.walk_bulk_inner(base, max_repetitions)
            .await
            .map_err(|e| e.in_operation(Operation::WalkBulk, target, Some(base)))
    }

    async fn walk_bulk_inner(&mut self, base: &str, max_repetitions: u32) -> Result<WalkOutcome> {
        let base = Oid::parse(base)?;
        let max_repetitions = i32::try_from(max_repetitions.max(1)).unwrap_or(i32::MAX);
        let mut cursor = base.clone();
        let mut seen = HashSet::new();
        let mut map = OidValueMap::new();
        let mut rounds = 0u32;

        loop {
            let id = self.next_request_id();
            let first_round = rounds == 0;
            rounds += 1;

            let response = self
                .request(Pdu::get_bulk(
                    id,
                    0,
                    max_repetitions,
                    std::slice::from_ref(&cursor),
                ))
                .await?;

            let mut accepted = 0usize;
            let mut stopped = false;
            for vb in response.varbinds {
                if matches!(vb.value, Value::EndOfMibView)
                    || !in_subtree(&vb.oid, &base)
                    || seen.contains(&vb.oid)
                {
                    stopped = true;
                    break;
                }
                if vb.oid <= cursor {
                    return Err(Error::NonIncreasingOid {
                        previous: cursor,
                        current: vb.oid,
                    });
                }
                if vb.value.is_missing() {
                    if first_round && accepted == 0 {
                        stopped = true;
                        break;
                    }
                    return Err(Error::Exception {
                        oid: vb.oid,
                        value: vb.value,
                    });
                }

                collect(&mut map, &vb);
                seen.insert(vb.oid.clone());
                cursor = vb.oid;
                accepted += 1;
            }

            // Unrenderable values advance the cursor but do not count as data.
            if first_round && map.is_empty() {
                tracing::debug!(
                    target: "snmp_southbound::walk",
                    { snmp.oid = %base, accepted },
                    "subtree empty"
                );
                return Ok(WalkOutcome::Skip);
            }
            if accepted == 0 || stopped {
                break;
            }
        }

        tracing::debug!(
            target: "snmp_southbound::walk",
            { snmp.oid = %base, rounds, values = map.len() },
            "bulk walk complete"
        );
        Ok(WalkOutcome::Values(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::oid;
    use crate::transport::{MockTransport, ResponseBuilder};
    use bytes::Bytes;
    use std::time::Duration;

    const IF_OPER_STATUS: &str = "1.3.6.1.2.1.2.2.1.8";

    fn session(mock: &MockTransport, version: Version) -> Session<MockTransport> {
        Session::new(
            mock.clone(),
            version,
            Bytes::from_static(b"public"),
            Duration::from_millis(100),
            0,
        )
    }

    fn mock() -> MockTransport {
        MockTransport::new("192.0.2.30:161".parse().unwrap())
    }

    fn reply(oid: Oid, value: Value) -> Bytes {
        ResponseBuilder::new(1).varbind(oid, value).build_v2c(b"public")
    }

    #[test]
    fn test_in_subtree() {
        let base = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8);
        assert!(in_subtree(&oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 3), &base));
        assert!(!in_subtree(&base, &base));
        assert!(!in_subtree(&oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 9, 1), &base));
        assert!(!in_subtree(&oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 7, 5), &base));
    }

    #[test]
    fn test_oid_value_map_keeps_order() {
        let mut map = OidValueMap::new();
        map.insert("1.3.6.1.2", "b");
        map.insert("1.3.6.1.1", "a");
        assert_eq!(map.insert("1.3.6.1.2", "c").as_deref(), Some("b"));
        assert_eq!(map.keys().collect::<Vec<_>>(), ["1.3.6.1.2", "1.3.6.1.1"]);
        assert_eq!(map.get("1.3.6.1.2"), Some("c"));
        assert_eq!(map.len(), 2);
    }

    #[tokio::test]
    async fn test_walk_next_single_leaf() {
        let mock = mock();
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 3), Value::Integer(1)));
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 9, 1), Value::TimeTicks(0)));

        let outcome = session(&mock, Version::V2c).walk_next(IF_OPER_STATUS).await.unwrap();
        let map = outcome.into_values();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("1.3.6.1.2.1.2.2.1.8.3"), Some("1"));
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_walk_next_skip_on_first_probe() {
        let mock = mock();
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 9, 1), Value::TimeTicks(0)));
        let outcome = session(&mock, Version::V2c).walk_next(IF_OPER_STATUS).await.unwrap();
        assert!(outcome.is_skip());

        let mock = self::mock();
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8), Value::EndOfMibView));
        let outcome = session(&mock, Version::V2c).walk_next(IF_OPER_STATUS).await.unwrap();
        assert!(outcome.is_skip());
    }

    #[tokio::test]
    async fn test_walk_next_rejects_non_increasing() {
        let mock = mock();
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 5), Value::Integer(1)));
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 5), Value::Integer(1)));

        let err = session(&mock, Version::V2c).walk_next(IF_OPER_STATUS).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(matches!(err.root(), Error::NonIncreasingOid { .. }));
        assert!(matches!(
            err,
            Error::Operation { operation: Operation::WalkNext, .. }
        ));
    }

    #[tokio::test]
    async fn test_walk_next_v1_no_such_name_ends_walk() {
        let mock = mock();
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 1), Value::Integer(2))
                .build_v1(b"public"),
        );
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 1), Value::Null)
                .error_status(ErrorStatus::NoSuchName)
                .error_index(1)
                .build_v1(b"public"),
        );

        let map = session(&mock, Version::V1)
            .walk_next(IF_OPER_STATUS)
            .await
            .unwrap()
            .into_values();
        assert_eq!(map.get("1.3.6.1.2.1.2.2.1.8.1"), Some("2"));
    }

    #[tokio::test]
    async fn test_walk_next_skips_unrenderable_values() {
        let mock = mock();
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 1), Value::Integer(2)));
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 2), Value::Null));
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 3), Value::Integer(1)));
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 9, 1), Value::Integer(1)));

        let map = session(&mock, Version::V2c)
            .walk_next(IF_OPER_STATUS)
            .await
            .unwrap()
            .into_values();
        assert_eq!(
            map.keys().collect::<Vec<_>>(),
            ["1.3.6.1.2.1.2.2.1.8.1", "1.3.6.1.2.1.2.2.1.8.3"]
        );
        let cursor = mock.requests()[2].pdu().unwrap().varbinds[0].oid.clone();
        assert_eq!(cursor, oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 2));
    }

    #[tokio::test]
    async fn test_walk_next_unrenderable_first_value_is_skip() {
        let mock = mock();
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 1), Value::Null));

        let outcome = session(&mock, Version::V2c).walk_next(IF_OPER_STATUS).await.unwrap();
        assert!(outcome.is_skip());
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_walk_bulk_stops_at_subtree_end() {
        let mock = mock();
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 1), Value::Integer(1))
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 2), Value::Integer(2))
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 9, 1), Value::TimeTicks(5))
                .build_v2c(b"public"),
        );

        let map = session(&mock, Version::V2c)
            .walk_bulk(IF_OPER_STATUS, 5)
            .await
            .unwrap()
            .into_values();
        assert_eq!(map.len(), 2);
        assert_eq!(mock.requests().len(), 1);

        let pdu = mock.requests()[0].pdu().unwrap();
        assert_eq!(pdu.error_status, 0);
        assert_eq!(pdu.error_index, 5);
    }

    #[tokio::test]
    async fn test_walk_bulk_continues_from_last_accepted() {
        let mock = mock();
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 1), Value::Integer(1))
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 2), Value::Integer(2))
                .build_v2c(b"public"),
        );
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 3), Value::Integer(1))
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 3), Value::Integer(1))
                .build_v2c(b"public"),
        );

        let map = session(&mock, Version::V2c)
            .walk_bulk(IF_OPER_STATUS, 2)
            .await
            .unwrap()
            .into_values();
        assert_eq!(map.len(), 3);

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1].pdu().unwrap().varbinds[0].oid,
            oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 2)
        );
    }

    #[tokio::test]
    async fn test_walk_bulk_empty_first_round_is_skip() {
        let mock = mock();
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 9, 1), Value::Integer(0)));
        let outcome = session(&mock, Version::V2c)
            .walk_bulk(IF_OPER_STATUS, 5)
            .await
            .unwrap();
        assert_eq!(outcome, WalkOutcome::Skip);
    }

    #[tokio::test]
    async fn test_walk_bulk_unrenderable_first_round_is_skip() {
        let mock = mock();
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 1), Value::Null)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 9, 1), Value::Integer(1))
                .build_v2c(b"public"),
        );

        let outcome = session(&mock, Version::V2c)
            .walk_bulk(IF_OPER_STATUS, 5)
            .await
            .unwrap();
        assert_eq!(outcome, WalkOutcome::Skip);
    }

    #[tokio::test]
    async fn test_walk_bulk_first_round_with_some_data_is_values() {
        let mock = mock();
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 1), Value::Null)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 2), Value::Integer(1))
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 9, 1), Value::Integer(1))
                .build_v2c(b"public"),
        );

        let map = session(&mock, Version::V2c)
            .walk_bulk(IF_OPER_STATUS, 5)
            .await
            .unwrap()
            .into_values();
        assert_eq!(map.keys().collect::<Vec<_>>(), ["1.3.6.1.2.1.2.2.1.8.2"]);
    }

    #[tokio::test]
    async fn test_walk_bulk_on_v1_reports_bulk_operation() {
        let mock = mock();
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 4), Value::Integer(1))
                .build_v1(b"public"),
        );
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 2), Value::Integer(1))
                .build_v1(b"public"),
        );

        let err = session(&mock, Version::V1)
            .walk_bulk(IF_OPER_STATUS, 5)
            .await
            .unwrap_err();
        assert!(matches!(err.root(), Error::NonIncreasingOid { .. }));
        assert!(matches!(
            err,
            Error::Operation { operation: Operation::WalkBulk, .. }
        ));
    }

    #[tokio::test]
    async fn test_walk_bulk_on_v1_uses_getnext() {
        let mock = mock();
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 1), Value::Integer(1))
                .build_v1(b"public"),
        );
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 9, 1), Value::Integer(1))
                .build_v1(b"public"),
        );

        let map = session(&mock, Version::V1)
            .walk_bulk(IF_OPER_STATUS, 5)
            .await
            .unwrap()
            .into_values();
        assert_eq!(map.len(), 1);
        let pdu = mock.requests()[0].pdu().unwrap();
        assert_eq!(pdu.pdu_type, crate::pdu::PduType::GetNextRequest);
    }

    #[tokio::test]
    async fn test_get_checks_returned_oid() {
        let mock = mock();
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("TSN-G5008")));
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 1, 6, 0), Value::from("lab")));

        let mut session = session(&mock, Version::V2c);
        let map = session.get(&["1.3.6.1.2.1.1.5.0"]).await.unwrap();
        assert_eq!(map.get("1.3.6.1.2.1.1.5.0"), Some("TSN-G5008"));

        let err = session.get(&["1.3.6.1.2.1.1.1.0"]).await.unwrap_err();
        assert!(matches!(err.root(), Error::OidMismatch { .. }));
        assert!(matches!(
            err,
            Error::Operation { operation: Operation::Get, oid: Some(ref oid), .. }
                if &**oid == "1.3.6.1.2.1.1.1.0"
        ));
    }

    #[tokio::test]
    async fn test_get_exception_is_agent_error() {
        let mock = mock();
        mock.queue_response(reply(oid!(1, 3, 6, 1, 2, 1, 1, 9, 0), Value::NoSuchObject));
        let err = session(&mock, Version::V2c)
            .get(&["1.3.6.1.2.1.1.9.0"])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Agent);
    }
}
