// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Core types for the Faultline error reporting system.
//!
//! This crate provides the wire-serializable data model shared by the SDK
//! and any transport or platform layer: events and their exception chains,
//! severity and its tagged justification, breadcrumbs, namespaced metadata,
//! sessions, and the payload envelopes handed to a delivery gateway. It
//! contains no I/O; the notification pipeline lives in the `faultline`
//! crate.

pub mod breadcrumb;
pub mod error;
pub mod event;
pub mod exception;
pub mod metadata;
pub mod payload;
pub mod session;
pub mod severity;

pub use breadcrumb::{Breadcrumb, BreadcrumbType};
pub use error::{CoreError, Result};
pub use event::{AppInfo, DeviceInfo, Event, OriginalError, User};
pub use exception::{Exception, StackFrame};
pub use metadata::Metadata;
pub use payload::{EventPayload, Notifier, SessionPayload};
pub use session::{Session, SessionEvents, SessionId, SessionSnapshot};
pub use severity::{Severity, SeverityReason};
