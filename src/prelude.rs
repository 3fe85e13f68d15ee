//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use snmp_southbound::prelude::*;
//! ```
//!
//! This imports:
//! - Engine entry points: [`Southbound`], [`SessionBuilder`], [`Session`]
//! - Inputs: [`DeviceConnectionProfile`], [`SetEntry`], [`EngineConfig`]
//! - Results: [`OidValueMap`], [`WalkOutcome`], [`Error`], [`Result`]
//! - The [`oid!`] macro

pub use crate::config::{EngineConfig, OperationClass, Timeouts};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::oid::Oid;
pub use crate::profile::{AuthKind, DeviceConnectionProfile, Intent, PrivKind};
pub use crate::session::{Session, SessionBuilder};
pub use crate::set::SetEntry;
pub use crate::southbound::Southbound;
pub use crate::v3::UsmCredentialCache;
pub use crate::value::Value;
pub use crate::version::Version;
pub use crate::walk::{OidValueMap, WalkOutcome};

#[doc(no_inline)]
pub use crate::oid;
