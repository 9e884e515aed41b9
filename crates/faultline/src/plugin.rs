// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Plugin registration: how platform layers extend the client.

use crate::client::Client;

/// An extension registered against the client at configure time, typically
/// a framework-specific fault interceptor.
pub trait Plugin: Send + Sync {
	fn name(&self) -> &str {
		""
	}

	fn description(&self) -> &str {
		""
	}

	/// Called synchronously when the plugin is registered. Panics here
	/// propagate to the caller of `use_plugin`; the registry does not
	/// contain them.
	fn init(&self, client: &Client);
}
