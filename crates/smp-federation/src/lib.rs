//! # smp-federation
//!
//! Federation configuration and the federation registry.
//!
//! A federation is a named metadata source with a pinned signing
//! certificate. The registry is assembled once at startup and is read-only
//! afterwards.
//!
//! ## Modules
//!
//! - [`config`] - configuration entries as read from the config file
//! - [`registry`] - [`FederationRegistryBuilder`] and [`FederationRegistry`]
//! - [`error`] - [`FederationError`]
//!
//! ## Example
//!
//! ```ignore
//! use smp_federation::{FederationConfigEntry, FederationRegistry};
//!
//! let registry = FederationRegistry::from_config(&[FederationConfigEntry::new(
//!     "SwedenConnect",
//!     "https://md.swedenconnect.se/role/sp.xml",
//!     "/etc/smp/sc-metadata.crt",
//! )])?;
//! let entry = registry.resolve("swedenconnect")?;
//! ```

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod registry;

pub use config::FederationConfigEntry;
pub use error::{FederationError, FederationResult};
pub use registry::{FederationEntry, FederationRegistry, FederationRegistryBuilder};
