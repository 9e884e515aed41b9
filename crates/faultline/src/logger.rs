// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! The injectable logger capability.
//!
//! The SDK reports its own diagnostics through whichever logger the
//! configuration installed. The default forwards to `tracing`; configuring
//! an explicitly absent logger silences the SDK entirely.

/// Four-method logging capability.
pub trait Logger: Send + Sync {
	fn debug(&self, message: &str);
	fn info(&self, message: &str);
	fn warn(&self, message: &str);
	fn error(&self, message: &str);
}

/// Default logger, forwarding to the `tracing` macros.
#[derive(Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
	fn debug(&self, message: &str) {
		tracing::debug!("{message}");
	}

	fn info(&self, message: &str) {
		tracing::info!("{message}");
	}

	fn warn(&self, message: &str) {
		tracing::warn!("{message}");
	}

	fn error(&self, message: &str) {
		tracing::error!("{message}");
	}
}

/// Logger that discards everything.
#[derive(Debug, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
	fn debug(&self, _message: &str) {}
	fn info(&self, _message: &str) {}
	fn warn(&self, _message: &str) {}
	fn error(&self, _message: &str) {}
}
