// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Session lifecycle delegation.
//!
//! Sessions are strictly opt-in: the client only tracks them once a
//! delegate has been injected, which keeps persistence and transport
//! concerns out of the core. A delegate receives the client and returns
//! the handle subsequent notifies should go through.

use faultline_core::Session;

use crate::client::Client;

/// Strategy for starting a usage session.
pub trait SessionDelegate: Send + Sync {
	/// Starts a session for `client` and returns a session-bound handle.
	fn start_session(&self, client: &Client) -> Client;
}

/// Stock delegate: creates a session, reports it through the client's
/// delivery gateway, and returns the bound handle.
#[derive(Debug, Default)]
pub struct StandardSessionDelegate;

impl SessionDelegate for StandardSessionDelegate {
	fn start_session(&self, client: &Client) -> Client {
		let bound = client.with_session(Session::new());
		bound.send_session();
		bound
	}
}
