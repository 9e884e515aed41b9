// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! The canonical representation of one reportable fault.
//!
//! An event is built by the notification pipeline per `notify` call and is
//! mutable for the lifetime of the callback chain; everything it references
//! is a private copy (metadata, breadcrumbs, session snapshot), never live
//! client state.

use serde::Serialize;
use std::sync::Arc;

use crate::breadcrumb::Breadcrumb;
use crate::exception::Exception;
use crate::metadata::Metadata;
use crate::session::SessionSnapshot;
use crate::severity::{Severity, SeverityReason};

/// Application facts attached to every event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub release_stage: Option<String>,
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	pub app_type: Option<String>,
}

/// Device facts attached to every event. Collection of these values is a
/// platform collaborator's job; the core only carries them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hostname: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub os_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub os_version: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub runtime_version: Option<String>,
}

/// The user the fault affected, if known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct User {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}

/// Opaque handle to the fault object a report originated from.
pub type OriginalError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// A single reportable fault in wire-serializable form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
	/// Ordered exception chain; the first entry is the reported fault.
	pub exceptions: Vec<Exception>,
	pub severity: Severity,
	pub severity_reason: SeverityReason,
	pub unhandled: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub context: Option<String>,
	#[serde(rename = "metaData")]
	pub metadata: Metadata,
	pub breadcrumbs: Vec<Breadcrumb>,
	pub app: AppInfo,
	pub device: DeviceInfo,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user: Option<User>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub session: Option<SessionSnapshot>,
	/// The fault `notify` was called with, when it was an actual error
	/// value. Never serialized.
	#[serde(skip)]
	original: Option<OriginalError>,
}

impl Event {
	/// Creates an event with the given exception chain and severity
	/// resolution. Everything else starts empty and is filled in by the
	/// pipeline.
	#[must_use]
	pub fn new(
		exceptions: Vec<Exception>,
		severity: Severity,
		severity_reason: SeverityReason,
		unhandled: bool,
	) -> Self {
		Self {
			exceptions,
			severity,
			severity_reason,
			unhandled,
			context: None,
			metadata: Metadata::new(),
			breadcrumbs: Vec::new(),
			app: AppInfo::default(),
			device: DeviceInfo::default(),
			user: None,
			session: None,
			original: None,
		}
	}

	/// Class name of the primary exception.
	#[must_use]
	pub fn error_class(&self) -> &str {
		self
			.exceptions
			.first()
			.map(|e| e.error_class.as_str())
			.unwrap_or("")
	}

	/// Message of the primary exception.
	#[must_use]
	pub fn error_message(&self) -> &str {
		self
			.exceptions
			.first()
			.map(|e| e.message.as_str())
			.unwrap_or("")
	}

	/// Merges one key into a metadata tab on this event's private copy.
	pub fn update_metadata(
		&mut self,
		tab: impl Into<String>,
		key: impl Into<String>,
		value: impl Into<serde_json::Value>,
	) {
		self.metadata.add(tab, key, value);
	}

	/// Removes a metadata tab from this event's private copy.
	pub fn clear_metadata(&mut self, tab: &str) {
		self.metadata.clear_tab(tab);
	}

	pub fn set_original(&mut self, original: OriginalError) {
		self.original = Some(original);
	}

	/// The original fault object, when the report came from an error value.
	#[must_use]
	pub fn original(&self) -> Option<&OriginalError> {
		self.original.as_ref()
	}
}
