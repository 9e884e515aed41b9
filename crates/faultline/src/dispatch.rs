// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Background dispatch of payloads to the delivery gateway.
//!
//! The pipeline's synchronous portion ends at an unbounded channel; a
//! single background task drains it in FIFO order, awaits the gateway, and
//! fires completion callbacks. Discarded events (release-stage gate,
//! callback veto) travel the same channel so their callbacks fire with the
//! same asynchronous contract as delivered ones.

use std::sync::Arc;

use faultline_core::{Event, EventPayload, SessionPayload};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::delivery::Delivery;
use crate::error::DeliveryError;
use crate::logger::Logger;

/// Completion callback for one `notify` call: `(delivery error, event)`.
pub type NotifyCallback = Box<dyn FnOnce(Option<DeliveryError>, Event) + Send + 'static>;

pub(crate) enum Dispatch {
	/// Ship an event batch, then fire the callback with the outcome.
	Deliver {
		payload: EventPayload,
		callback: Option<NotifyCallback>,
	},
	/// The event is not being sent; fire the callback anyway.
	Discard {
		event: Event,
		callback: Option<NotifyCallback>,
	},
	/// Ship a session report. Failures are logged, not surfaced.
	Session { payload: SessionPayload },
	/// Acknowledge once everything enqueued earlier has been processed.
	Flush { ack: oneshot::Sender<()> },
}

#[derive(Clone)]
pub(crate) struct Dispatcher {
	tx: mpsc::UnboundedSender<Dispatch>,
}

impl Dispatcher {
	/// Spawns the dispatch task on the current runtime.
	pub(crate) fn spawn(delivery: Arc<dyn Delivery>, logger: Arc<dyn Logger>) -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		tokio::spawn(run(rx, delivery, logger));
		Self { tx }
	}

	/// Hands a command to the background task. If the task is gone the
	/// command's callback still fires, inline, so the completion contract
	/// holds even during teardown.
	pub(crate) fn enqueue(&self, command: Dispatch) {
		if let Err(mpsc::error::SendError(command)) = self.tx.send(command) {
			match command {
				Dispatch::Deliver {
					payload,
					callback: Some(callback),
				} => {
					if let Some(event) = payload.events.into_iter().next() {
						callback(None, event);
					}
				}
				Dispatch::Discard {
					event,
					callback: Some(callback),
				} => callback(None, event),
				_ => {}
			}
		}
	}

	/// Waits for every previously enqueued command to be processed.
	pub(crate) async fn flush(&self) {
		let (ack_tx, ack_rx) = oneshot::channel();
		if self.tx.send(Dispatch::Flush { ack: ack_tx }).is_ok() {
			let _ = ack_rx.await;
		}
	}
}

async fn run(
	mut rx: mpsc::UnboundedReceiver<Dispatch>,
	delivery: Arc<dyn Delivery>,
	logger: Arc<dyn Logger>,
) {
	while let Some(command) = rx.recv().await {
		match command {
			Dispatch::Deliver { payload, callback } => {
				let result = delivery.send_event(&payload).await;
				match &result {
					Ok(()) => debug!("event delivered"),
					Err(e) => {
						warn!(error = %e, "event delivery failed");
						logger.error(&format!("event delivery failed: {e}"));
					}
				}
				if let Some(callback) = callback {
					if let Some(event) = payload.events.into_iter().next() {
						callback(result.err(), event);
					}
				}
			}
			Dispatch::Discard { event, callback } => {
				if let Some(callback) = callback {
					callback(None, event);
				}
			}
			Dispatch::Session { payload } => {
				if let Err(e) = delivery.send_session(&payload).await {
					warn!(error = %e, "session delivery failed");
					logger.warn(&format!("session delivery failed: {e}"));
				}
			}
			Dispatch::Flush { ack } => {
				let _ = ack.send(());
			}
		}
	}
}
