//! Device- and network-aware image loading policy.
//!
//! [`compute_profile`] samples the platform once, [`compute_decision`] maps the profile onto
//! quality and preload parameters, and [`image::OptimizedImage`] models how an image element
//! consumes that decision: placeholder, visibility gate, format candidates, fallback.

pub mod capability;
pub mod conditional;
pub mod decision;
pub mod image;
pub mod policy;
pub mod profile;
pub mod visibility;

pub use capability::{
    CapabilityProvider, CapabilitySnapshot, ClientHints, EffectiveConnectionType,
    NetworkInformation,
};
pub use conditional::ConditionalLoading;
pub use decision::{compute_decision, ConnectionType, LoadingDecision, VideoQuality};
pub use policy::AdaptiveLoading;
pub use profile::{compute_profile, DeviceProfile};
