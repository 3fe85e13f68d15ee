//! Authoritative engine state and USM Report handling (RFC 3414 Sections 3 and 4).

use std::net::SocketAddr;
use std::time::Instant;

use bytes::Bytes;

use super::UsmSecurityParams;
use crate::error::{AuthErrorKind, CryptoErrorKind, Error, Result};
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};

/// Largest value msgAuthoritativeEngineTime may take.
pub const MAX_ENGINE_TIME: u32 = 2_147_483_647;

/// usmStats: counters are `usmStats.N.0`.
const USM_STATS: [u32; 9] = [1, 3, 6, 1, 6, 3, 15, 1, 1];

/// Engine identity and clock as learned from the agent.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub engine_id: Bytes,
    pub engine_boots: u32,
    /// Engine time at `synced_at`.
    pub engine_time: u32,
    pub synced_at: Instant,
}

impl EngineState {
    pub fn new(engine_id: Bytes, engine_boots: u32, engine_time: u32) -> Self {
        Self {
            engine_id,
            engine_boots,
            engine_time,
            synced_at: Instant::now(),
        }
    }

    /// Agent's engine time now, extrapolated from the last sync.
    pub fn estimated_time(&self) -> u32 {
        let elapsed = u32::try_from(self.synced_at.elapsed().as_secs()).unwrap_or(u32::MAX);
        self.engine_time.saturating_add(elapsed).min(MAX_ENGINE_TIME)
    }

    /// Adopt the boots/time an authenticated message carried, if they are newer.
    pub fn update_time(&mut self, boots: u32, time: u32) -> bool {
        let newer = boots > self.engine_boots
            || (boots == self.engine_boots && time > self.estimated_time());
        if newer {
            self.resync(boots, time);
        }
        newer
    }

    /// Unconditionally take boots/time from a notInTimeWindow Report.
    pub fn resync(&mut self, boots: u32, time: u32) {
        self.engine_boots = boots;
        self.engine_time = time;
        self.synced_at = Instant::now();
    }
}

/// Extract engine state from the USM parameters of a discovery Report.
pub fn parse_discovery_response(security_params: &Bytes) -> Result<EngineState> {
    let usm = UsmSecurityParams::decode(security_params.clone())?;
    if usm.engine_id.is_empty() {
        return Err(Error::UnknownEngineId { target: None });
    }
    Ok(EngineState::new(
        usm.engine_id,
        usm.engine_boots,
        usm.engine_time,
    ))
}

/// Reason carried by a USM Report PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsmReport {
    UnsupportedSecLevel,
    NotInTimeWindow,
    UnknownUserName,
    UnknownEngineId,
    WrongDigest,
    DecryptionError,
    /// Any other report counter.
    Other(Option<Oid>),
}

impl UsmReport {
    /// Classify a PDU; `None` unless it is a Report.
    pub fn classify(pdu: &Pdu) -> Option<Self> {
        if pdu.pdu_type != PduType::Report {
            return None;
        }
        let Some(vb) = pdu.varbinds.first() else {
            return Some(Self::Other(None));
        };

        let arcs = vb.oid.arcs();
        let counter = match arcs {
            [prefix @ .., n, 0] if prefix == USM_STATS => Some(*n),
            _ => None,
        };

        Some(match counter {
            Some(1) => Self::UnsupportedSecLevel,
            Some(2) => Self::NotInTimeWindow,
            Some(3) => Self::UnknownUserName,
            Some(4) => Self::UnknownEngineId,
            Some(5) => Self::WrongDigest,
            Some(6) => Self::DecryptionError,
            _ => Self::Other(Some(vb.oid.clone())),
        })
    }

    /// The typed error a Report surfaces as when it cannot be recovered from.
    pub fn into_error(self, target: SocketAddr) -> Error {
        let target = Some(target);
        match self {
            Self::UnsupportedSecLevel => {
                Error::auth(target, AuthErrorKind::UnsupportedSecurityLevel)
            }
            Self::NotInTimeWindow => Error::NotInTimeWindow { target },
            Self::UnknownUserName => Error::auth(target, AuthErrorKind::NoUser),
            Self::UnknownEngineId => Error::UnknownEngineId { target },
            Self::WrongDigest => Error::auth(target, AuthErrorKind::HmacMismatch),
            Self::DecryptionError => {
                Error::decrypt(target, CryptoErrorKind::ReportedDecryptionError)
            }
            Self::Other(oid) => Error::UnexpectedReport { target, oid },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::oid;
    use crate::value::Value;
    use crate::varbind::VarBind;

    fn report(oid: Oid) -> Pdu {
        let mut pdu = Pdu::response(1, vec![VarBind::new(oid, Value::Counter32(1))]);
        pdu.pdu_type = PduType::Report;
        pdu
    }

    #[test]
    fn test_classify_usm_stats() {
        let cases = [
            (1, UsmReport::UnsupportedSecLevel),
            (2, UsmReport::NotInTimeWindow),
            (3, UsmReport::UnknownUserName),
            (4, UsmReport::UnknownEngineId),
            (5, UsmReport::WrongDigest),
            (6, UsmReport::DecryptionError),
        ];
        for (arc, expected) in cases {
            let pdu = report(oid!(1, 3, 6, 1, 6, 3, 15, 1, 1).child(arc).child(0));
            assert_eq!(UsmReport::classify(&pdu), Some(expected));
        }
    }

    #[test]
    fn test_classify_non_report() {
        let pdu = Pdu::response(1, vec![]);
        assert_eq!(UsmReport::classify(&pdu), None);

        // snmpUnknownPDUHandlers is an MPD counter, not USM
        let other = oid!(1, 3, 6, 1, 6, 3, 11, 2, 1, 3, 0);
        assert_eq!(
            UsmReport::classify(&report(other.clone())),
            Some(UsmReport::Other(Some(other)))
        );
    }

    #[test]
    fn test_report_errors_are_typed() {
        let target: SocketAddr = "192.0.2.9:161".parse().unwrap();
        assert_eq!(UsmReport::WrongDigest.into_error(target).kind(), ErrorKind::Crypto);
        assert_eq!(UsmReport::UnknownUserName.into_error(target).kind(), ErrorKind::Crypto);
        assert_eq!(UsmReport::UnknownEngineId.into_error(target).kind(), ErrorKind::Connect);
        assert_eq!(UsmReport::NotInTimeWindow.into_error(target).kind(), ErrorKind::Protocol);
        assert_eq!(UsmReport::Other(None).into_error(target).target(), Some(target));
    }

    #[test]
    fn test_parse_discovery_response() {
        let engine_id = Bytes::from_static(b"\x80\x00\x1f\x88\x04sw1");
        let params = UsmSecurityParams::new(engine_id, 4, 900, Bytes::new());
        let state = parse_discovery_response(&params.encode()).unwrap();
        assert_eq!(&state.engine_id[..], b"\x80\x00\x1f\x88\x04sw1");
        assert_eq!(state.engine_boots, 4);
        assert!(state.estimated_time() >= 900);

        let empty = UsmSecurityParams::empty().encode();
        assert!(matches!(
            parse_discovery_response(&empty),
            Err(Error::UnknownEngineId { .. })
        ));
    }

    #[test]
    fn test_update_time_only_moves_forward() {
        let mut state = EngineState::new(Bytes::from_static(b"e"), 2, 500);
        assert!(!state.update_time(1, 10_000));
        assert!(!state.update_time(2, 400));
        assert!(state.update_time(2, 10_000));
        assert!(state.update_time(3, 5));
        assert_eq!((state.engine_boots, state.engine_time), (3, 5));
    }

    #[test]
    fn test_estimated_time_capped() {
        let state = EngineState::new(Bytes::from_static(b"e"), 1, MAX_ENGINE_TIME);
        assert_eq!(state.estimated_time(), MAX_ENGINE_TIME);
    }
}
