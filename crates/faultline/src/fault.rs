// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Fault input normalization.
//!
//! `notify` accepts heterogeneous input: real error values, bare strings,
//! `{name, message}` pairs, and arbitrary JSON from dynamic callers. All
//! of it resolves here, once, into a canonical exception chain; later
//! pipeline stages never probe the input shape again. Malformed input is
//! converted into a reportable usage-error event, never raised.

use std::backtrace::Backtrace;
use std::sync::Arc;

use faultline_core::{Exception, OriginalError, StackFrame};
use serde_json::Value;

/// The class name used for faults that don't carry one of their own.
const GENERIC_ERROR_CLASS: &str = "Error";
/// The class name of synthesized bad-input reports.
const USAGE_ERROR_CLASS: &str = "UsageError";

/// Any value passed to `notify` representing a problem to report.
#[derive(Clone)]
pub enum Fault {
	/// A real error value.
	Error {
		original: OriginalError,
		class: String,
	},
	/// A bare description; reported with a synthetic class name.
	Message(String),
	/// An explicit class name and message.
	Named { name: String, message: String },
	/// Dynamic input of no particular shape.
	Value(Value),
	/// `notify` was invoked with nothing to report.
	Nothing,
}

impl Fault {
	/// Wraps an error value, recording its concrete type as the class name.
	#[must_use]
	pub fn error<E>(error: E) -> Self
	where
		E: std::error::Error + Send + Sync + 'static,
	{
		Self::Error {
			class: short_type_name(std::any::type_name::<E>()).to_string(),
			original: Arc::new(error),
		}
	}

	/// Wraps an already-shared error value under the given class name.
	#[must_use]
	pub fn shared(original: OriginalError, class: impl Into<String>) -> Self {
		Self::Error {
			original,
			class: class.into(),
		}
	}

	/// An explicit class name and message.
	#[must_use]
	pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Named {
			name: name.into(),
			message: message.into(),
		}
	}
}

impl From<&str> for Fault {
	fn from(message: &str) -> Self {
		Self::Message(message.to_string())
	}
}

impl From<String> for Fault {
	fn from(message: String) -> Self {
		Self::Message(message)
	}
}

impl From<Value> for Fault {
	fn from(value: Value) -> Self {
		Self::Value(value)
	}
}

/// The canonical form a fault resolves to at pipeline entry.
pub(crate) struct NormalizedFault {
	/// Ordered exception chain, reported fault first.
	pub exceptions: Vec<Exception>,
	/// The original error value, kept on the event as an opaque handle.
	pub original: Option<OriginalError>,
	/// Raw input that couldn't be interpreted, preserved for the reserved
	/// metadata tab so the call information isn't silently lost.
	pub discarded_input: Option<Value>,
}

pub(crate) fn normalize(fault: Fault) -> NormalizedFault {
	match fault {
		Fault::Error { original, class } => {
			let mut exceptions = vec![
				Exception::new(class, original.to_string()).with_stacktrace(capture_stacktrace()),
			];
			// walk the cause chain, outermost first
			let mut cause = original.source();
			while let Some(err) = cause {
				exceptions.push(Exception::new(GENERIC_ERROR_CLASS, err.to_string()));
				cause = err.source();
			}
			NormalizedFault {
				exceptions,
				original: Some(original),
				discarded_input: None,
			}
		}
		Fault::Message(message) => NormalizedFault {
			exceptions: vec![
				Exception::new(GENERIC_ERROR_CLASS, message).with_stacktrace(capture_stacktrace()),
			],
			original: None,
			discarded_input: None,
		},
		Fault::Named { name, message } => NormalizedFault {
			exceptions: vec![Exception::new(name, message).with_stacktrace(capture_stacktrace())],
			original: None,
			discarded_input: None,
		},
		Fault::Value(value) => normalize_value(value),
		Fault::Nothing => usage_error("nothing", None),
	}
}

fn normalize_value(value: Value) -> NormalizedFault {
	match value {
		Value::String(message) => normalize(Fault::Message(message)),
		Value::Number(number) => normalize(Fault::Message(number.to_string())),
		Value::Object(map) => {
			let name = map.get("name").and_then(Value::as_str).map(str::to_owned);
			let message = map.get("message").and_then(Value::as_str).map(str::to_owned);
			match (name, message) {
				(Some(name), Some(message)) => normalize(Fault::Named { name, message }),
				_ => usage_error("unsupported object", Some(Value::Object(map))),
			}
		}
		Value::Array(_) => usage_error("unsupported object", Some(value)),
		Value::Bool(_) => usage_error("boolean", Some(value)),
		Value::Null => usage_error("null", None),
	}
}

/// Synthesizes the reportable event for unusable input, naming the exact
/// offending kind in the message.
fn usage_error(kind: &str, discarded_input: Option<Value>) -> NormalizedFault {
	NormalizedFault {
		exceptions: vec![Exception::new(
			USAGE_ERROR_CLASS,
			format!("notify() expected an error, message, or {{name, message}} object, got {kind}"),
		)
		.with_stacktrace(capture_stacktrace())],
		original: None,
		discarded_input,
	}
}

/// Captures the current stacktrace with the reporting library's own frames
/// filtered off the top, so the first frame a reader sees is the user's
/// call site.
pub(crate) fn capture_stacktrace() -> Vec<StackFrame> {
	let backtrace = Backtrace::force_capture();
	let mut frames = parse_backtrace(&backtrace.to_string());
	let first_user_frame = frames
		.iter()
		.position(|frame| {
			frame
				.method
				.as_deref()
				.map(|method| !is_reporter_frame(method))
				.unwrap_or(false)
		})
		.unwrap_or(0);
	frames.drain(..first_user_frame);
	frames
}

/// Parses the std backtrace formatter output into frames.
///
/// The format is a numbered function line optionally followed by an
/// indented `at file:line:col` line for that frame.
fn parse_backtrace(bt_string: &str) -> Vec<StackFrame> {
	let mut frames: Vec<StackFrame> = Vec::new();

	for line in bt_string.lines() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		if let Some(location) = line.strip_prefix("at ") {
			if let Some(frame) = frames.last_mut() {
				if frame.file.is_none() {
					let (file, line_number) = parse_location(location);
					frame.file = file;
					frame.line_number = line_number;
				}
			}
			continue;
		}

		// "N: function_name"
		let Some(idx) = line.find(':') else { continue };
		if line[..idx].trim().parse::<u32>().is_err() {
			continue;
		}
		let function = line[idx + 1..].trim();
		if function.is_empty() {
			continue;
		}

		frames.push(StackFrame {
			method: Some(function.to_string()),
			file: None,
			line_number: None,
			in_project: Some(is_in_project_frame(function)),
		});
	}

	frames
}

/// Splits `path/to/file.rs:12:34` into the path and line number.
fn parse_location(location: &str) -> (Option<String>, Option<u32>) {
	let mut parts = location.rsplitn(3, ':');
	let _column = parts.next();
	let line_number = parts.next().and_then(|s| s.parse().ok());
	let file = parts.next().map(|s| s.to_string());
	match file {
		Some(file) => (Some(file), line_number),
		// no line:col suffix at all
		None => (Some(location.to_string()), None),
	}
}

/// Frames belonging to this library or to backtrace capture itself; these
/// are filtered off the top of every captured stack.
fn is_reporter_frame(function: &str) -> bool {
	const REPORTER_PREFIXES: &[&str] = &[
		"faultline::",
		"<faultline::",
		"faultline_core::",
		"<faultline_core::",
		"std::backtrace",
		"backtrace::",
		"<backtrace::",
	];
	REPORTER_PREFIXES
		.iter()
		.any(|prefix| function.starts_with(prefix))
}

/// Heuristic for whether a frame is application code rather than the
/// standard library or a common runtime crate.
fn is_in_project_frame(function: &str) -> bool {
	const SYSTEM_PREFIXES: &[&str] = &[
		"std::",
		"core::",
		"alloc::",
		"<std::",
		"<core::",
		"<alloc::",
		"tokio::",
		"<tokio::",
		"futures::",
		"<futures::",
		"test::",
		"rust_begin_unwind",
		"rust_panic",
		"__rust_",
		"_rust_",
		"__libc_start",
		"main",
	];
	!SYSTEM_PREFIXES
		.iter()
		.any(|prefix| function.starts_with(prefix))
		&& !is_reporter_frame(function)
}

/// Last path segment of a fully-qualified type name, generics stripped.
fn short_type_name(full: &str) -> &str {
	let base = full.split('<').next().unwrap_or(full);
	base.rsplit("::").next().unwrap_or(base)
}
