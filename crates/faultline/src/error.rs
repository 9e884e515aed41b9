// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the SDK.

use thiserror::Error;

/// Configuration rejected at build time.
///
/// Validation runs over every option before failing, so the report names
/// all violations at once rather than the first one found.
#[derive(Debug, Error)]
#[error("invalid configuration: {}", .violations.join("; "))]
pub struct ConfigError {
	/// One entry per invalid option.
	pub violations: Vec<String>,
}

/// Errors surfaced by a delivery gateway.
///
/// These never escape `notify` synchronously; they only reach the caller
/// through the optional completion callback.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Server returned an error response.
	#[error("server error (status {status}): {message}")]
	ServerError {
		status: u16,
		message: String,
	},

	/// Rate limited by the server.
	#[error("rate limited, retry after {retry_after_secs:?} seconds")]
	RateLimited {
		retry_after_secs: Option<u64>,
	},

	/// The gateway refused the payload.
	#[error("delivery rejected: {0}")]
	Rejected(String),
}
