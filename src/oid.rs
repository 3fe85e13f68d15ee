//! Object Identifier (OID) type.
//!
//! OIDs are stored as owned arc sequences. Short OIDs (the common case for
//! switch MIBs) stay inline without a heap allocation.

use crate::error::{DecodeErrorKind, Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of arcs (sub-identifiers) allowed in an OID (RFC 2578 Section 3.5).
pub const MAX_OID_LEN: usize = 128;

/// Object Identifier.
///
/// Ordering is lexicographic by arc, which is the SNMP ordering used by
/// GETNEXT/GETBULK.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from arc values.
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted decimal notation (e.g. "1.3.6.1.2.1.1.1.0").
    ///
    /// A single leading dot is accepted (".1.3.6.1"), as agents and net-snmp
    /// tools print OIDs that way.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix('.').unwrap_or(trimmed);
        if body.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }

        let mut arcs = SmallVec::new();
        for part in body.split('.') {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s));
            }
            let arc: u32 = part
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
        }

        let oid = Self { arcs };
        oid.validate()
            .map_err(|e| match e {
                Error::InvalidOid { kind, .. } => Error::invalid_oid_with_input(kind, s),
                other => other,
            })?;
        Ok(oid)
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Check if the OID has no arcs.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check if this OID starts with another OID.
    ///
    /// Every OID starts with itself.
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.arcs.len() >= other.arcs.len() && self.arcs[..other.arcs.len()] == other.arcs[..]
    }

    /// Check if this OID lies in the subtree rooted at `base` (including `base` itself).
    pub fn is_subtree_of(&self, base: &Oid) -> bool {
        self.starts_with(base)
    }

    /// Get the parent OID (all arcs except the last).
    pub fn parent(&self) -> Option<Oid> {
        if self.arcs.is_empty() {
            None
        } else {
            Some(Self::from_slice(&self.arcs[..self.arcs.len() - 1]))
        }
    }

    /// Create a child OID by appending an arc.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Self { arcs }
    }

    /// The first OID after this whole subtree: the last arc incremented by one.
    ///
    /// `1.3.6.1.2.1.2.2.1.8` yields `1.3.6.1.2.1.2.2.1.9`. Returns `None` for
    /// an empty OID or when the last arc is already `u32::MAX`.
    pub fn next_sibling(&self) -> Option<Oid> {
        let (last, head) = self.arcs.split_last()?;
        let mut arcs: SmallVec<[u32; 16]> = SmallVec::from_slice(head);
        arcs.push(last.checked_add(1)?);
        Some(Self { arcs })
    }

    /// Validate arc constraints for BER encoding (X.690 Section 8.19.4).
    pub fn validate(&self) -> Result<()> {
        if self.arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                count: self.arcs.len(),
                max: MAX_OID_LEN,
            }));
        }
        let Some(&first) = self.arcs.first() else {
            return Ok(());
        };
        if first > 2 {
            return Err(Error::invalid_oid(OidErrorKind::InvalidFirstArc(first)));
        }
        if let Some(&second) = self.arcs.get(1) {
            let out_of_range = if first < 2 {
                second >= 40
            } else {
                second > u32::MAX - 80
            };
            if out_of_range {
                return Err(Error::invalid_oid(OidErrorKind::InvalidSecondArc {
                    first,
                    second,
                }));
            }
        }
        Ok(())
    }

    /// Encode the OID content octets (without tag and length).
    pub fn to_ber_smallvec(&self) -> SmallVec<[u8; 64]> {
        let mut bytes = SmallVec::new();
        let Some(&first) = self.arcs.first() else {
            return bytes;
        };

        // The first two arcs share one subidentifier. arc2 may exceed 127 when arc1=2.
        let second = self.arcs.get(1).copied().unwrap_or(0);
        encode_subidentifier(&mut bytes, first.saturating_mul(40).saturating_add(second));

        for &arc in self.arcs.iter().skip(2) {
            encode_subidentifier(&mut bytes, arc);
        }
        bytes
    }

    /// Decode OID content octets.
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::empty());
        }

        let mut arcs = SmallVec::new();
        let (first_subid, mut pos) = decode_subidentifier(data, 0)?;
        match first_subid {
            0..=39 => {
                arcs.push(0);
                arcs.push(first_subid);
            }
            40..=79 => {
                arcs.push(1);
                arcs.push(first_subid - 40);
            }
            _ => {
                arcs.push(2);
                arcs.push(first_subid - 80);
            }
        }

        while pos < data.len() {
            let (arc, next) = decode_subidentifier(data, pos)?;
            arcs.push(arc);
            pos = next;
            if arcs.len() > MAX_OID_LEN {
                return Err(Error::decode(
                    pos,
                    DecodeErrorKind::OidTooLong {
                        count: arcs.len(),
                        max: MAX_OID_LEN,
                    },
                ));
            }
        }

        Ok(Self { arcs })
    }
}

fn encode_subidentifier(bytes: &mut SmallVec<[u8; 64]>, value: u32) {
    if value == 0 {
        bytes.push(0);
        return;
    }
    let mut groups = [0u8; 5];
    let mut count = 0;
    let mut v = value;
    while v > 0 {
        groups[count] = (v & 0x7F) as u8;
        v >>= 7;
        count += 1;
    }
    for i in (0..count).rev() {
        let continuation = if i > 0 { 0x80 } else { 0 };
        bytes.push(groups[i] | continuation);
    }
}

/// Decode one base-128 subidentifier starting at `start`. Returns (value, next position).
fn decode_subidentifier(data: &[u8], start: usize) -> Result<(u32, usize)> {
    let mut value: u32 = 0;
    let mut pos = start;
    loop {
        let Some(&byte) = data.get(pos) else {
            return Err(Error::decode(pos, DecodeErrorKind::InvalidOidEncoding));
        };
        if value > (u32::MAX >> 7) {
            return Err(Error::decode(pos, DecodeErrorKind::IntegerOverflow));
        }
        value = (value << 7) | u32::from(byte & 0x7F);
        pos += 1;
        if byte & 0x80 == 0 {
            return Ok((value, pos));
        }
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::new(arcs)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.cmp(&other.arcs)
    }
}

/// Build an [`Oid`] from literal arcs.
///
/// ```
/// use snmp_southbound::oid;
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), "1.3.6.1.2.1.1.1.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}
