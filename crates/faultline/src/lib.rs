// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Error reporting SDK for Rust applications.
//!
//! Faultline turns application faults into size-bounded telemetry events,
//! applies user policy (severity, release-stage filtering, callback-based
//! mutation and suppression), associates events with an in-progress usage
//! session, and ships them through a pluggable delivery gateway, without
//! ever crashing the host application.
//!
//! # Example
//!
//! ```ignore
//! use faultline::{Client, Config};
//!
//! let config = Config::builder()
//!     .api_key("your_api_key")
//!     .release_stage("staging")
//!     .app_version(env!("CARGO_PKG_VERSION"))
//!     .build()?;
//! let client = Client::new(config);
//!
//! client.leave_breadcrumb("cache warmed");
//!
//! if let Err(e) = do_something() {
//!     client.notify(faultline::Fault::error(e));
//! }
//!
//! client.flush().await;
//! ```

pub mod client;
pub mod config;
pub mod delivery;
pub mod error;
pub mod fault;
pub mod logger;
pub mod plugin;
pub mod session;

mod breadcrumbs;
mod dispatch;

pub use client::Client;
pub use config::{Config, ConfigBuilder, Endpoints, NotifyOptions, OnError};
pub use delivery::{Delivery, DeliveryFactory, HttpDelivery};
pub use dispatch::NotifyCallback;
pub use error::{ConfigError, DeliveryError};
pub use fault::Fault;
pub use logger::{Logger, NoopLogger, TracingLogger};
pub use plugin::Plugin;
pub use session::{SessionDelegate, StandardSessionDelegate};

// Re-export the data model for callers that only depend on this crate.
pub use faultline_core::{
	AppInfo, Breadcrumb, BreadcrumbType, DeviceInfo, Event, EventPayload, Exception, Metadata,
	Notifier, Session, SessionPayload, SessionSnapshot, Severity, SeverityReason, StackFrame, User,
};
