//! # devtrack-providers
//!
//! External capabilities consumed by the tracking engine:
//! - [`DeviceProvider`]: device roster, location queries, session lifecycle
//!   and single-shot device commands
//! - [`AddressResolver`]: reverse geocoding that never fails past its boundary
//!
//! Implementations:
//! - [`NominatimResolver`] for OpenStreetMap reverse geocoding
//! - [`CoordinateResolver`] when geocoding is disabled
//! - [`DemoProvider`], a simulated roster for unattended runs

pub mod demo;
pub mod error;
pub mod provider;
pub mod resolver;

pub use demo::DemoProvider;
pub use error::ProviderError;
pub use provider::{DeviceProvider, LostModeRequest, Notification};
pub use resolver::{
    AddressResolver, CoordinateResolver, NominatimResolver, ADDRESS_LOOKUP_FAILED,
    ADDRESS_NOT_FOUND,
};
