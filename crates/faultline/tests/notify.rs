// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end notification pipeline tests against a recording delivery
//! gateway.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use faultline::{
	Client, Config, Delivery, DeliveryError, DeliveryFactory, Event, EventPayload, Fault,
	NotifyOptions, SessionPayload, Severity, StandardSessionDelegate,
};
use serde_json::{json, Value};

/// Records every payload it sees, in wire form.
#[derive(Default)]
struct RecordingDelivery {
	events: Mutex<Vec<Value>>,
	sessions: Mutex<Vec<Value>>,
	fail_events: AtomicBool,
}

impl RecordingDelivery {
	fn event_payloads(&self) -> Vec<Value> {
		self.events.lock().unwrap().clone()
	}

	fn session_payloads(&self) -> Vec<Value> {
		self.sessions.lock().unwrap().clone()
	}

	/// First event of the nth delivered payload.
	fn event(&self, n: usize) -> Value {
		self.event_payloads()[n]["events"][0].clone()
	}
}

#[async_trait]
impl Delivery for RecordingDelivery {
	async fn send_event(&self, payload: &EventPayload) -> Result<(), DeliveryError> {
		if self.fail_events.load(Ordering::SeqCst) {
			return Err(DeliveryError::Rejected("flerp".to_string()));
		}
		self
			.events
			.lock()
			.unwrap()
			.push(serde_json::to_value(payload).unwrap());
		Ok(())
	}

	async fn send_session(&self, payload: &SessionPayload) -> Result<(), DeliveryError> {
		self
			.sessions
			.lock()
			.unwrap()
			.push(serde_json::to_value(payload).unwrap());
		Ok(())
	}
}

fn recording_client(configure: impl FnOnce(faultline::ConfigBuilder) -> faultline::ConfigBuilder)
	-> (Client, Arc<RecordingDelivery>) {
	let delivery = Arc::new(RecordingDelivery::default());
	let for_factory = Arc::clone(&delivery);
	let factory: Arc<dyn DeliveryFactory> = Arc::new(move |_: &Config| -> Arc<dyn Delivery> {
		Arc::clone(&for_factory) as Arc<dyn Delivery>
	});

	let config = configure(Config::builder().api_key("API_KEY_YEAH").no_logger())
		.delivery_factory(factory)
		.build()
		.unwrap();
	(Client::new(config), delivery)
}

/// Collects `(had_error, primary message)` from completion callbacks.
#[derive(Default)]
struct CallbackSpy {
	calls: Mutex<Vec<(Option<String>, String)>>,
}

impl CallbackSpy {
	fn callback(spy: &Arc<Self>) -> faultline::NotifyCallback {
		let spy = Arc::clone(spy);
		Box::new(move |error: Option<DeliveryError>, event: Event| {
			spy.calls
				.lock()
				.unwrap()
				.push((error.map(|e| e.to_string()), event.error_message().to_string()));
		})
	}

	fn calls(&self) -> Vec<(Option<String>, String)> {
		self.calls.lock().unwrap().clone()
	}
}

#[tokio::test]
async fn delivers_an_error_event() {
	let (client, delivery) = recording_client(|b| b);

	client.notify(Fault::from("oh em gee"));
	client.flush().await;

	let event = delivery.event(0);
	assert_eq!(event["severity"], "warning");
	assert_eq!(event["severityReason"], json!({ "type": "handledException" }));
	assert_eq!(event["unhandled"], false);
	let payload = &delivery.event_payloads()[0];
	assert!(payload["notifier"]["name"].is_string());
}

#[tokio::test]
async fn supports_manually_setting_severity() {
	let (client, delivery) = recording_client(|b| b);

	client.notify_with(
		Fault::from("oh em gee"),
		NotifyOptions::default().severity(Severity::Error),
		None,
	);
	client.flush().await;

	let event = delivery.event(0);
	assert_eq!(event["severity"], "error");
	assert_eq!(
		event["severityReason"],
		json!({ "type": "userSpecifiedSeverity" })
	);
}

#[tokio::test]
async fn supports_setting_severity_via_callback() {
	let (client, delivery) = recording_client(|b| b);

	client.notify_with(
		Fault::from("oh em gee"),
		NotifyOptions::default().on_error(|event| {
			event.severity = Severity::Info;
			true
		}),
		None,
	);
	client.flush().await;

	let event = delivery.event(0);
	assert_eq!(event["severity"], "info");
	assert_eq!(
		event["severityReason"],
		json!({ "type": "userCallbackSetSeverity" })
	);
}

#[tokio::test]
async fn unhandled_option_defaults_to_error_severity() {
	let (client, delivery) = recording_client(|b| b);

	client.notify_with(
		Fault::named("err", "bad"),
		NotifyOptions::default().unhandled(),
		None,
	);
	client.flush().await;

	let event = delivery.event(0);
	assert_eq!(event["severity"], "error");
	assert_eq!(
		event["severityReason"],
		json!({ "type": "unhandledException" })
	);
	assert_eq!(event["unhandled"], true);
}

#[tokio::test]
async fn callback_returning_false_prevents_send_but_completion_still_fires() {
	let (client, delivery) = recording_client(|b| b);
	let spy = Arc::new(CallbackSpy::default());

	client.notify_with(
		Fault::from("111"),
		NotifyOptions::default().on_error(|_| false),
		Some(CallbackSpy::callback(&spy)),
	);
	client.flush().await;

	assert!(delivery.event_payloads().is_empty());
	let calls = spy.calls();
	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0], (None, "111".to_string()));
}

#[tokio::test]
async fn tolerates_panics_in_callbacks() {
	let (client, delivery) = recording_client(|b| {
		b.on_error(|_| panic!("Ooops")).on_error(|event| {
			event.update_metadata("checks", "second_ran", true);
			true
		})
	});

	client.notify(Fault::from("oh no!"));
	client.flush().await;

	let event = delivery.event(0);
	assert_eq!(event["exceptions"][0]["message"], "oh no!");
	assert_eq!(event["metaData"]["checks"]["second_ran"], true);
}

#[tokio::test]
async fn release_stage_gate_prevents_send_but_completion_still_fires() {
	let (client, delivery) = recording_client(|b| b.enabled_release_stages(["qa"]));
	let spy = Arc::new(CallbackSpy::default());

	client.notify_with(
		Fault::from("oh em eff gee"),
		NotifyOptions::default(),
		Some(CallbackSpy::callback(&spy)),
	);
	client.flush().await;

	assert!(delivery.event_payloads().is_empty());
	assert_eq!(spy.calls(), vec![(None, "oh em eff gee".to_string())]);
}

#[tokio::test]
async fn configured_release_stage_is_gated() {
	let (client, delivery) = recording_client(|b| {
		b.release_stage("staging").enabled_release_stages(["production"])
	});

	client.notify(Fault::from("oh em eff gee"));
	client.flush().await;

	assert!(delivery.event_payloads().is_empty());
}

#[tokio::test]
async fn client_level_release_stage_override_is_gated() {
	let (client, delivery) = recording_client(|b| b.enabled_release_stages(["production"]));
	client.set_app_release_stage("staging");

	client.notify(Fault::from("oh em eff gee"));
	client.flush().await;

	assert!(delivery.event_payloads().is_empty());
}

#[tokio::test]
async fn release_stage_is_reported_in_event_app() {
	let (client, delivery) = recording_client(|b| {
		b.release_stage("staging").enabled_release_stages(["staging"])
	});

	client.notify(Fault::from("oh em eff gee"));
	client.flush().await;

	assert_eq!(delivery.event(0)["app"]["releaseStage"], "staging");
}

#[tokio::test]
async fn client_override_takes_precedence_over_configured_stage() {
	let (client, delivery) = recording_client(|b| {
		b.release_stage("staging").enabled_release_stages(["testing"])
	});
	client.set_app_release_stage("testing");

	client.notify(Fault::from("oh em eff gee"));
	client.flush().await;

	assert_eq!(delivery.event(0)["app"]["releaseStage"], "testing");
}

#[tokio::test]
async fn app_version_is_populated_from_config() {
	let (client, delivery) = recording_client(|b| b.app_version("1.2.3"));

	client.notify(Fault::from("oh em eff gee"));
	client.flush().await;

	assert_eq!(delivery.event(0)["app"]["version"], "1.2.3");
}

#[tokio::test]
async fn handles_all_kinds_of_bad_input() {
	let (client, delivery) = recording_client(|b| b);

	client.notify(Fault::Nothing);
	client.notify(Fault::from(json!(null)));
	client.notify(Fault::from(json!({ "name": "some message" })));
	client.notify(Fault::from(json!(1)));
	client.notify(Fault::from("errrororor"));

	client.flush().await;

	let message = |n: usize| delivery.event(n)["exceptions"][0]["message"].clone();
	assert_eq!(
		message(0),
		"notify() expected an error, message, or {name, message} object, got nothing"
	);
	assert_eq!(
		message(1),
		"notify() expected an error, message, or {name, message} object, got null"
	);
	assert_eq!(
		message(2),
		"notify() expected an error, message, or {name, message} object, got unsupported object"
	);
	assert_eq!(message(3), "1");
	assert_eq!(message(4), "errrororor");
}

#[tokio::test]
async fn unusable_input_is_folded_into_reserved_metadata() {
	let (client, delivery) = recording_client(|b| b);

	client.notify(Fault::from(json!({ "name": "some message" })));
	client.flush().await;

	let event = delivery.event(0);
	assert_eq!(
		event["metaData"]["notifier"]["notifyArgs"],
		json!({ "name": "some message" })
	);
}

#[tokio::test]
async fn supports_name_message_pairs() {
	let (client, delivery) = recording_client(|b| b);

	client.notify(Fault::from(json!({
		"name": "UnknownThing",
		"message": "found a thing that couldn't be dealt with"
	})));
	client.flush().await;

	let exception = delivery.event(0)["exceptions"][0].clone();
	assert_eq!(exception["errorClass"], "UnknownThing");
	assert_eq!(
		exception["message"],
		"found a thing that couldn't be dealt with"
	);
	if let Some(top_method) = exception["stacktrace"][0]["method"].as_str() {
		assert!(
			!top_method.starts_with("faultline::"),
			"reporter frames should be filtered, got {top_method}"
		);
	}
}

#[tokio::test]
async fn leaves_a_breadcrumb_of_the_error_but_not_on_itself() {
	let (client, delivery) = recording_client(|b| b);

	client.notify(Fault::error(std::io::Error::new(
		std::io::ErrorKind::Other,
		"foobar",
	)));
	client.flush().await;

	let crumbs = client.breadcrumbs();
	assert_eq!(crumbs.len(), 1);
	assert_eq!(crumbs[0].breadcrumb_type, faultline::BreadcrumbType::Error);
	assert_eq!(crumbs[0].message, "Error");
	assert!(crumbs[0].metadata.get("stacktrace").is_none());

	// the event that generated the breadcrumb never sees it
	let event = delivery.event(0);
	assert_eq!(event["breadcrumbs"].as_array().unwrap().len(), 0);

	// but the next event does
	client.notify(Fault::from("again"));
	client.flush().await;
	let event = delivery.event(1);
	assert_eq!(event["breadcrumbs"].as_array().unwrap().len(), 1);
	assert_eq!(event["breadcrumbs"][0]["type"], "error");
}

#[tokio::test]
async fn completion_callback_reports_success() {
	let (client, _delivery) = recording_client(|b| b);
	let spy = Arc::new(CallbackSpy::default());

	client.notify_with(Fault::from("111"), NotifyOptions::default(), Some(CallbackSpy::callback(&spy)));
	client.flush().await;

	assert_eq!(spy.calls(), vec![(None, "111".to_string())]);
}

#[tokio::test]
async fn completion_callback_reports_delivery_errors() {
	let (client, delivery) = recording_client(|b| b);
	delivery.fail_events.store(true, Ordering::SeqCst);
	let spy = Arc::new(CallbackSpy::default());

	client.notify_with(Fault::from("111"), NotifyOptions::default(), Some(CallbackSpy::callback(&spy)));
	client.flush().await;

	let calls = spy.calls();
	assert_eq!(calls.len(), 1);
	let (error, message) = &calls[0];
	assert!(error.as_deref().unwrap().contains("flerp"));
	assert_eq!(message, "111");
}

#[tokio::test]
async fn original_error_is_attached_to_the_event() {
	let (client, _delivery) = recording_client(|b| b);

	let seen = Arc::new(Mutex::new(false));
	let seen_in_callback = Arc::clone(&seen);
	client.notify_with(
		Fault::error(std::io::Error::new(std::io::ErrorKind::Other, "111")),
		NotifyOptions::default(),
		Some(Box::new(move |_error, event| {
			*seen_in_callback.lock().unwrap() = event.original().is_some();
		})),
	);
	client.flush().await;

	assert!(*seen.lock().unwrap());
}

#[tokio::test]
async fn session_counts_are_attached_to_events() {
	let (client, delivery) = recording_client(|b| b);
	client.set_session_delegate(Arc::new(StandardSessionDelegate));

	let session_client = client.start_session();
	for _ in 0..6 {
		session_client.notify(Fault::from("broke"));
	}
	for _ in 0..4 {
		session_client.notify_with(
			Fault::named("err", "bad"),
			NotifyOptions::default().unhandled(),
			None,
		);
	}
	session_client.flush().await;

	// the session itself was reported once
	assert_eq!(delivery.session_payloads().len(), 1);

	let last = delivery.event(9);
	assert_eq!(last["session"]["events"]["handled"], 6);
	assert_eq!(last["session"]["events"]["unhandled"], 4);

	// the base client remains sessionless
	client.notify(Fault::from("solo"));
	client.flush().await;
	assert!(delivery.event(10).get("session").is_none());
}

#[tokio::test]
async fn starting_a_new_session_freezes_the_old_one() {
	let (client, _delivery) = recording_client(|b| b);
	client.set_session_delegate(Arc::new(StandardSessionDelegate));

	let first = client.start_session();
	first.notify(Fault::from("broke"));
	let first_snapshot = first.current_session().unwrap();

	let second = client.start_session();
	second.notify(Fault::from("broke again"));
	second.flush().await;

	assert_eq!(first.current_session().unwrap().events.handled, 1);
	assert_eq!(second.current_session().unwrap().events.handled, 1);
	assert_ne!(first_snapshot.id, second.current_session().unwrap().id);
}

#[tokio::test]
async fn per_event_metadata_overlays_the_client_snapshot() {
	let (client, delivery) = recording_client(|b| b);
	client.add_metadata("request", "url", "/checkout");

	let mut overlay = faultline::Metadata::new();
	overlay.add("request", "attempt", 2);

	client.notify_with(
		Fault::from("boom"),
		NotifyOptions {
			metadata: Some(overlay),
			..NotifyOptions::default()
		},
		None,
	);
	client.flush().await;

	let event = delivery.event(0);
	assert_eq!(event["metaData"]["request"]["url"], "/checkout");
	assert_eq!(event["metaData"]["request"]["attempt"], 2);
	// overlay never leaked back into the client store
	assert!(client.metadata().get("request", "attempt").is_none());
}

#[tokio::test]
async fn events_preserve_enqueue_order() {
	let (client, delivery) = recording_client(|b| b);

	for n in 0..5 {
		client.notify(Fault::from(format!("event {n}")));
	}
	client.flush().await;

	let messages: Vec<_> = (0..5)
		.map(|n| delivery.event(n)["exceptions"][0]["message"].as_str().unwrap().to_string())
		.collect();
	assert_eq!(
		messages,
		vec!["event 0", "event 1", "event 2", "event 3", "event 4"]
	);
}
