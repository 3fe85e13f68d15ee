// Allow large error types - the Error enum includes OIDs inline for debugging convenience.
#![allow(clippy::result_large_err)]

//! # snmp-southbound
//!
//! SNMP southbound protocol engine for TSN switch configuration.
//!
//! The engine opens one session per device operation (SNMPv1, v2c or v3 with
//! USM authentication and privacy), walks OID subtrees with GETNEXT or
//! GETBULK, decodes values into strings, converts switch-specific encodings
//! (port bitmaps, MAC address index suffixes) and applies ordered SET
//! transactions that stop at the first failing entry.
//!
//! ## Walking a subtree
//!
//! ```rust,no_run
//! use snmp_southbound::{DeviceConnectionProfile, Intent, SessionBuilder, UsmCredentialCache};
//! use snmp_southbound::walk::WalkOutcome;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), snmp_southbound::Error> {
//!     let cache = Arc::new(UsmCredentialCache::new());
//!     let profile = DeviceConnectionProfile::v2c("192.168.127.253", "public", "private");
//!
//!     let mut session = SessionBuilder::new(cache)
//!         .build(&profile, Duration::from_secs(2), Intent::Read)
//!         .await?;
//!
//!     match session.walk_next("1.3.6.1.2.1.2.2.1.8").await? {
//!         WalkOutcome::Values(map) => {
//!             for (oid, value) in map.iter() {
//!                 println!("{oid} = {value}");
//!             }
//!         }
//!         WalkOutcome::Skip => println!("ifOperStatus not populated"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Ordered SET transaction over SNMPv3
//!
//! ```rust,no_run
//! use snmp_southbound::{
//!     AuthKind, DeviceConnectionProfile, Intent, PrivKind, SessionBuilder, SetEntry,
//!     UsmCredentialCache,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), snmp_southbound::Error> {
//!     let cache = Arc::new(UsmCredentialCache::new());
//!     let profile = DeviceConnectionProfile::v3("192.168.127.253", "admin")
//!         .with_auth(AuthKind::Sha1, "authpass123")
//!         .with_privacy(PrivKind::Aes, "privpass123");
//!
//!     let mut session = SessionBuilder::new(cache)
//!         .build(&profile, Duration::from_secs(10), Intent::Write)
//!         .await?;
//!
//!     let entries = [
//!         SetEntry::new("1.3.6.1.2.1.17.7.1.4.3.1.5.10", "4", 'i'),
//!         SetEntry::new("1.3.6.1.2.1.17.7.1.4.3.1.2.10", "0x03", 'x'),
//!     ];
//!     session.set_many(&entries).await
//! }
//! ```

pub mod ber;
pub mod codec;
pub mod config;
pub mod error;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod prelude;
pub mod profile;
pub mod session;
pub mod set;
pub mod southbound;
pub mod transport;
pub mod v3;
pub mod value;
pub mod varbind;
pub mod version;
pub mod walk;

pub(crate) mod util;

pub use codec::{CodecError, PortSet};
pub use config::{EngineConfig, OperationClass, Timeouts};
pub use error::{Error, ErrorKind, ErrorStatus, Operation, Result};
pub use oid::Oid;
pub use profile::{AuthKind, DeviceConnectionProfile, Intent, PrivKind};
pub use session::{Session, SessionBuilder};
pub use set::{SetEntry, SetType};
pub use southbound::{Connector, Southbound, UdpConnector};
pub use v3::UsmCredentialCache;
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;
pub use walk::{OidValueMap, WalkOutcome};
