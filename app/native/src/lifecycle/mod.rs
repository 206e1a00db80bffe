//! Banner lifecycle: scheduling, mounting and teardown.
//!
//! - [`scheduler`] - per-surface debounce and settle state machine
//! - [`controller`] - reacts to host and banner events, owns the registry
//! - [`service`] - async loop that drives the controller

pub mod controller;
pub mod scheduler;
pub mod service;

pub use controller::{BannerController, HostEvent};
pub use scheduler::{Ready, SurfaceScheduler, SurfaceState};
pub use service::{BannerService, BannerServiceHandle, ServiceError};
