// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Namespaced key/value metadata attached to clients and events.
//!
//! Metadata is grouped into named tabs, each a flat mapping of key to JSON
//! value. Cloning the store is a deep copy, which is what gives events
//! their private view of client-level metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A tree of `tab -> key -> value` diagnostic data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
	tabs: BTreeMap<String, Map<String, Value>>,
}

impl Metadata {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Merges a single key into a tab, creating the tab if needed.
	pub fn add(&mut self, tab: impl Into<String>, key: impl Into<String>, value: impl Into<Value>) {
		self
			.tabs
			.entry(tab.into())
			.or_default()
			.insert(key.into(), value.into());
	}

	/// Merges every key of a JSON object into a tab. Non-object values are
	/// ignored rather than replacing the tab wholesale.
	pub fn merge(&mut self, tab: impl Into<String>, values: Value) {
		if let Value::Object(map) = values {
			let entry = self.tabs.entry(tab.into()).or_default();
			for (key, value) in map {
				entry.insert(key, value);
			}
		}
	}

	/// Merges every tab of another store over this one, key by key.
	pub fn extend(&mut self, other: Metadata) {
		for (tab, values) in other.tabs {
			let entry = self.tabs.entry(tab).or_default();
			for (key, value) in values {
				entry.insert(key, value);
			}
		}
	}

	/// Removes a whole tab.
	pub fn clear_tab(&mut self, tab: &str) {
		self.tabs.remove(tab);
	}

	/// Removes one key from a tab; the tab itself is dropped once empty.
	pub fn clear_key(&mut self, tab: &str, key: &str) {
		if let Some(entry) = self.tabs.get_mut(tab) {
			entry.remove(key);
			if entry.is_empty() {
				self.tabs.remove(tab);
			}
		}
	}

	#[must_use]
	pub fn tab(&self, tab: &str) -> Option<&Map<String, Value>> {
		self.tabs.get(tab)
	}

	#[must_use]
	pub fn get(&self, tab: &str, key: &str) -> Option<&Value> {
		self.tabs.get(tab).and_then(|entry| entry.get(key))
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.tabs.is_empty()
	}
}
