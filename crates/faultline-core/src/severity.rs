// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Severity levels and the tagged justification for how they were chosen.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Reported importance of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	Info,
	Warning,
	Error,
}

impl Default for Severity {
	fn default() -> Self {
		Self::Warning
	}
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Info => write!(f, "info"),
			Self::Warning => write!(f, "warning"),
			Self::Error => write!(f, "error"),
		}
	}
}

impl FromStr for Severity {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"info" => Ok(Self::Info),
			"warning" => Ok(Self::Warning),
			"error" => Ok(Self::Error),
			_ => Err(CoreError::InvalidSeverity(s.to_string())),
		}
	}
}

/// Why an event carries the severity it does.
///
/// Serialized on the wire as `{"type": "handledException"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SeverityReason {
	UnhandledException,
	HandledException,
	UserSpecifiedSeverity,
	UserCallbackSetSeverity,
	Log,
}

impl Default for SeverityReason {
	fn default() -> Self {
		Self::HandledException
	}
}

impl fmt::Display for SeverityReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UnhandledException => write!(f, "unhandledException"),
			Self::HandledException => write!(f, "handledException"),
			Self::UserSpecifiedSeverity => write!(f, "userSpecifiedSeverity"),
			Self::UserCallbackSetSeverity => write!(f, "userCallbackSetSeverity"),
			Self::Log => write!(f, "log"),
		}
	}
}

impl FromStr for SeverityReason {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"unhandledException" => Ok(Self::UnhandledException),
			"handledException" => Ok(Self::HandledException),
			"userSpecifiedSeverity" => Ok(Self::UserSpecifiedSeverity),
			"userCallbackSetSeverity" => Ok(Self::UserCallbackSetSeverity),
			"log" => Ok(Self::Log),
			_ => Err(CoreError::InvalidSeverityReason(s.to_string())),
		}
	}
}

impl SeverityReason {
	/// The default severity implied by this reason when the caller didn't
	/// pick one explicitly.
	#[must_use]
	pub fn default_severity(&self) -> Severity {
		match self {
			Self::UnhandledException => Severity::Error,
			Self::Log => Severity::Info,
			_ => Severity::Warning,
		}
	}
}
