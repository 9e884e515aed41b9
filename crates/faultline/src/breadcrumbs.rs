// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Bounded, insertion-ordered log of recent breadcrumbs.

use std::collections::VecDeque;

use faultline_core::Breadcrumb;

/// Fixed-capacity FIFO of breadcrumbs. The capacity comes from the
/// configuration and is fixed for the client's lifetime; a capacity of 0
/// retains nothing.
#[derive(Debug)]
pub(crate) struct BreadcrumbLog {
	capacity: usize,
	entries: VecDeque<Breadcrumb>,
}

impl BreadcrumbLog {
	pub(crate) fn new(capacity: usize) -> Self {
		Self {
			capacity,
			entries: VecDeque::with_capacity(capacity),
		}
	}

	/// Appends a breadcrumb, evicting the oldest entries past capacity.
	/// Breadcrumbs without a message are dropped, not stored.
	pub(crate) fn push(&mut self, breadcrumb: Breadcrumb) {
		if breadcrumb.message.is_empty() || self.capacity == 0 {
			return;
		}
		self.entries.push_back(breadcrumb);
		while self.entries.len() > self.capacity {
			self.entries.pop_front();
		}
	}

	/// Copies the current contents in insertion order.
	pub(crate) fn snapshot(&self) -> Vec<Breadcrumb> {
		self.entries.iter().cloned().collect()
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use faultline_core::BreadcrumbType;
	use proptest::prelude::*;
	use serde_json::Map;

	fn crumb(message: &str) -> Breadcrumb {
		Breadcrumb::new(message, BreadcrumbType::Manual, Map::new())
	}

	#[test]
	fn test_caps_length_at_capacity() {
		let mut log = BreadcrumbLog::new(3);
		log.push(crumb("malted rye"));
		assert_eq!(log.len(), 1);
		log.push(crumb("medium sliced white hovis"));
		assert_eq!(log.len(), 2);
		log.push(crumb("pumperninkel"));
		assert_eq!(log.len(), 3);
		log.push(crumb("seedy farmhouse"));
		assert_eq!(log.len(), 3);

		let messages: Vec<_> = log
			.snapshot()
			.into_iter()
			.map(|b| b.message)
			.collect();
		assert_eq!(
			messages,
			vec!["medium sliced white hovis", "pumperninkel", "seedy farmhouse"]
		);
	}

	#[test]
	fn test_empty_message_is_dropped() {
		let mut log = BreadcrumbLog::new(10);
		log.push(crumb(""));
		assert_eq!(log.len(), 0);
	}

	#[test]
	fn test_zero_capacity_retains_nothing() {
		let mut log = BreadcrumbLog::new(0);
		for _ in 0..5 {
			log.push(crumb("toast"));
		}
		assert_eq!(log.len(), 0);
	}

	proptest! {
		#[test]
		fn never_exceeds_capacity(capacity in 0..50usize, count in 0..200usize) {
			let mut log = BreadcrumbLog::new(capacity);
			for i in 0..count {
				log.push(crumb(&format!("crumb {i}")));
			}
			prop_assert_eq!(log.len(), count.min(capacity));
		}
	}

	#[test]
	fn test_snapshot_is_a_copy() {
		let mut log = BreadcrumbLog::new(5);
		log.push(crumb("one"));
		let snapshot = log.snapshot();
		log.push(crumb("two"));
		assert_eq!(snapshot.len(), 1);
		assert_eq!(log.len(), 2);
	}
}
