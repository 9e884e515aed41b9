// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Exception chain and stack frame types.

use serde::{Deserialize, Serialize};

/// One frame of a stacktrace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub method: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub file: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub line_number: Option<u32>,
	/// Whether the frame belongs to application code rather than a
	/// dependency or the standard library.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub in_project: Option<bool>,
}

impl StackFrame {
	/// Creates a frame with just a method name.
	#[must_use]
	pub fn named(method: impl Into<String>) -> Self {
		Self {
			method: Some(method.into()),
			..Self::default()
		}
	}
}

/// One entry of an event's exception chain.
///
/// The first exception of a chain is the fault that was reported; any
/// following entries are its underlying causes, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exception {
	pub error_class: String,
	pub message: String,
	pub stacktrace: Vec<StackFrame>,
}

impl Exception {
	/// Creates an exception with an empty stacktrace.
	#[must_use]
	pub fn new(error_class: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error_class: error_class.into(),
			message: message.into(),
			stacktrace: Vec::new(),
		}
	}

	/// Attaches a stacktrace.
	#[must_use]
	pub fn with_stacktrace(mut self, stacktrace: Vec<StackFrame>) -> Self {
		self.stacktrace = stacktrace;
		self
	}
}
