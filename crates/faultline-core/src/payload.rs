// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Wire payload envelopes handed to the delivery gateway.

use serde::Serialize;

use crate::event::Event;
use crate::session::SessionSnapshot;

/// Identity of the reporting library, included with every payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notifier {
	pub name: String,
	pub version: String,
	pub url: String,
}

impl Default for Notifier {
	fn default() -> Self {
		Self {
			name: "Faultline Rust".to_string(),
			version: env!("CARGO_PKG_VERSION").to_string(),
			url: "https://github.com/faultline/faultline-rust".to_string(),
		}
	}
}

/// A batch of events for the notify endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EventPayload {
	pub notifier: Notifier,
	pub events: Vec<Event>,
}

impl EventPayload {
	/// Wraps a single event, which is how the pipeline always delivers.
	#[must_use]
	pub fn single(event: Event) -> Self {
		Self {
			notifier: Notifier::default(),
			events: vec![event],
		}
	}
}

/// A session report for the sessions endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionPayload {
	pub notifier: Notifier,
	pub session: SessionSnapshot,
}

impl SessionPayload {
	#[must_use]
	pub fn new(session: SessionSnapshot) -> Self {
		Self {
			notifier: Notifier::default(),
			session,
		}
	}
}
