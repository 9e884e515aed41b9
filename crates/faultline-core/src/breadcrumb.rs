// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Breadcrumb types (diagnostic markers preceding a fault).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A timestamped diagnostic marker retained in the client's ring buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
	pub timestamp: DateTime<Utc>,
	#[serde(rename = "type")]
	pub breadcrumb_type: BreadcrumbType,
	pub message: String,
	#[serde(rename = "metaData")]
	pub metadata: Map<String, Value>,
}

impl Breadcrumb {
	/// Creates a breadcrumb stamped with the current time.
	#[must_use]
	pub fn new(
		message: impl Into<String>,
		breadcrumb_type: BreadcrumbType,
		metadata: Map<String, Value>,
	) -> Self {
		Self {
			timestamp: Utc::now(),
			breadcrumb_type,
			message: message.into(),
			metadata,
		}
	}
}

/// The kind of activity a breadcrumb records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreadcrumbType {
	Manual,
	Error,
	Navigation,
	State,
	Log,
	Process,
	Request,
	User,
}

impl Default for BreadcrumbType {
	fn default() -> Self {
		Self::Manual
	}
}

impl fmt::Display for BreadcrumbType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Manual => write!(f, "manual"),
			Self::Error => write!(f, "error"),
			Self::Navigation => write!(f, "navigation"),
			Self::State => write!(f, "state"),
			Self::Log => write!(f, "log"),
			Self::Process => write!(f, "process"),
			Self::Request => write!(f, "request"),
			Self::User => write!(f, "user"),
		}
	}
}

impl FromStr for BreadcrumbType {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"manual" => Ok(Self::Manual),
			"error" => Ok(Self::Error),
			"navigation" => Ok(Self::Navigation),
			"state" => Ok(Self::State),
			"log" => Ok(Self::Log),
			"process" => Ok(Self::Process),
			"request" => Ok(Self::Request),
			"user" => Ok(Self::User),
			_ => Err(CoreError::InvalidBreadcrumbType(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn breadcrumb_type_roundtrip(breadcrumb_type in prop_oneof![
			Just(BreadcrumbType::Manual),
			Just(BreadcrumbType::Error),
			Just(BreadcrumbType::Navigation),
			Just(BreadcrumbType::State),
			Just(BreadcrumbType::Log),
			Just(BreadcrumbType::Process),
			Just(BreadcrumbType::Request),
			Just(BreadcrumbType::User),
		]) {
			let s = breadcrumb_type.to_string();
			let parsed: BreadcrumbType = s.parse().unwrap();
			prop_assert_eq!(breadcrumb_type, parsed);
		}
	}

	#[test]
	fn test_wire_form_uses_type_and_metadata_keys() {
		let crumb = Breadcrumb::new("user tapped login", BreadcrumbType::User, Map::new());
		let json = serde_json::to_value(&crumb).unwrap();
		assert_eq!(json["type"], "user");
		assert_eq!(json["message"], "user tapped login");
		assert!(json.get("metaData").is_some());
	}
}
