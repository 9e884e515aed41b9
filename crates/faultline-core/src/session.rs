// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Session types for usage-session error accounting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
	#[must_use]
	pub fn new() -> Self {
		Self(Uuid::now_v7())
	}
}

impl Default for SessionId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for SessionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for SessionId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// A single usage period, accumulating handled/unhandled event counts.
///
/// The live session is owned by the client; events only ever hold a
/// [`SessionSnapshot`] frozen at notify time, so a session that is later
/// replaced keeps the counts every already-captured event saw.
#[derive(Debug, Clone)]
pub struct Session {
	pub id: SessionId,
	pub started_at: DateTime<Utc>,
	handled: u64,
	unhandled: u64,
}

impl Session {
	#[must_use]
	pub fn new() -> Self {
		Self {
			id: SessionId::new(),
			started_at: Utc::now(),
			handled: 0,
			unhandled: 0,
		}
	}

	/// Counts one event against this session.
	pub fn record(&mut self, unhandled: bool) {
		if unhandled {
			self.unhandled += 1;
		} else {
			self.handled += 1;
		}
	}

	#[must_use]
	pub fn handled(&self) -> u64 {
		self.handled
	}

	#[must_use]
	pub fn unhandled(&self) -> u64 {
		self.unhandled
	}

	/// Freezes the current state into the read-only view events carry.
	#[must_use]
	pub fn snapshot(&self) -> SessionSnapshot {
		SessionSnapshot {
			id: self.id,
			started_at: self.started_at,
			events: SessionEvents {
				handled: self.handled,
				unhandled: self.unhandled,
			},
		}
	}
}

impl Default for Session {
	fn default() -> Self {
		Self::new()
	}
}

/// Frozen, wire-serializable view of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
	pub id: SessionId,
	pub started_at: DateTime<Utc>,
	pub events: SessionEvents,
}

/// Event counts at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvents {
	pub handled: u64,
	pub unhandled: u64,
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn session_id_roundtrip(uuid_bytes in any::<[u8; 16]>()) {
			let uuid = Uuid::from_bytes(uuid_bytes);
			let id = SessionId(uuid);
			let s = id.to_string();
			let parsed: SessionId = s.parse().unwrap();
			prop_assert_eq!(id, parsed);
		}
	}

	#[test]
	fn test_record_counts() {
		let mut session = Session::new();
		session.record(false);
		session.record(false);
		session.record(true);
		assert_eq!(session.handled(), 2);
		assert_eq!(session.unhandled(), 1);
	}

	#[test]
	fn test_snapshot_is_frozen() {
		let mut session = Session::new();
		session.record(true);
		let snapshot = session.snapshot();
		session.record(true);
		session.record(false);

		assert_eq!(snapshot.events.unhandled, 1);
		assert_eq!(snapshot.events.handled, 0);
		assert_eq!(session.unhandled(), 2);
	}

	#[test]
	fn test_snapshot_wire_form() {
		let session = Session::new();
		let json = serde_json::to_value(session.snapshot()).unwrap();
		assert!(json.get("startedAt").is_some());
		assert_eq!(json["events"]["handled"], 0);
		assert_eq!(json["events"]["unhandled"], 0);
	}
}
