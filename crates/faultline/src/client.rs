// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! The error reporting client and its notification pipeline.
//!
//! A `Client` can only be constructed from a validated [`Config`], so every
//! operation on it runs against settled configuration. All shared state is
//! mutated synchronously inside the call that triggered it; the only
//! asynchronous boundary is the dispatch channel to the delivery gateway,
//! which means reentrant `notify` calls can never interleave one call's
//! mutations with another's.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use faultline_core::{
	AppInfo, Breadcrumb, BreadcrumbType, DeviceInfo, Event, EventPayload, Metadata, Session,
	SessionPayload, SessionSnapshot, Severity, SeverityReason, User,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::breadcrumbs::BreadcrumbLog;
use crate::config::{Config, NotifyOptions};
use crate::delivery::{Delivery, HttpDelivery};
use crate::dispatch::{Dispatch, Dispatcher, NotifyCallback};
use crate::fault::{normalize, Fault};
use crate::logger::Logger;
use crate::plugin::Plugin;
use crate::session::SessionDelegate;

/// Reserved metadata tab for call information the pipeline preserved on the
/// caller's behalf.
const NOTIFIER_TAB: &str = "notifier";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(rwlock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
	rwlock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(rwlock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
	rwlock.write().unwrap_or_else(PoisonError::into_inner)
}

struct Inner {
	config: Config,
	logger: Arc<dyn Logger>,
	dispatcher: Dispatcher,
	metadata: Mutex<Metadata>,
	breadcrumbs: Mutex<BreadcrumbLog>,
	app: RwLock<AppInfo>,
	device: RwLock<DeviceInfo>,
	user: RwLock<Option<User>>,
	context: RwLock<Option<String>>,
	session_delegate: RwLock<Option<Arc<dyn SessionDelegate>>>,
	plugins: Mutex<Vec<Arc<dyn Plugin>>>,
	closed: AtomicBool,
}

/// Error reporting client.
///
/// Cloning is cheap and every clone shares the same state; a clone carrying
/// a session (from [`start_session`]) counts its notifies against that
/// session while the base client keeps reporting sessionless.
///
/// [`start_session`]: Client::start_session
#[derive(Clone)]
pub struct Client {
	inner: Arc<Inner>,
	session: Option<Arc<Mutex<Session>>>,
}

impl Client {
	/// Creates a client from validated configuration, installing the
	/// logger and delivery gateway and spawning the dispatch task.
	///
	/// Must be called within a Tokio runtime.
	#[must_use]
	pub fn new(config: Config) -> Self {
		let logger = Arc::clone(&config.logger);
		let delivery: Arc<dyn Delivery> = match &config.delivery_factory {
			Some(factory) => factory.create(&config),
			None => Arc::new(HttpDelivery::new(&config)),
		};
		let dispatcher = Dispatcher::spawn(delivery, Arc::clone(&logger));

		let app = AppInfo {
			version: config.app_version.clone(),
			release_stage: None,
			app_type: config.app_type.clone(),
		};
		let device = DeviceInfo {
			os_name: Some(std::env::consts::OS.to_string()),
			..DeviceInfo::default()
		};
		let max_breadcrumbs = config.max_breadcrumbs;

		info!(release_stage = %config.release_stage, "Faultline client configured");

		Self {
			inner: Arc::new(Inner {
				config,
				logger,
				dispatcher,
				metadata: Mutex::new(Metadata::new()),
				breadcrumbs: Mutex::new(BreadcrumbLog::new(max_breadcrumbs)),
				app: RwLock::new(app),
				device: RwLock::new(device),
				user: RwLock::new(None),
				context: RwLock::new(None),
				session_delegate: RwLock::new(None),
				plugins: Mutex::new(Vec::new()),
				closed: AtomicBool::new(false),
			}),
			session: None,
		}
	}

	/// Convenience for `Config::builder()`.
	#[must_use]
	pub fn builder() -> crate::config::ConfigBuilder {
		Config::builder()
	}

	/// Reports a fault with default options and no completion callback.
	pub fn notify(&self, fault: impl Into<Fault>) {
		self.notify_with(fault, NotifyOptions::default(), None);
	}

	/// Reports a fault.
	///
	/// The synchronous portion (normalization, severity resolution,
	/// release-stage gating, the `on_error` chain, session accounting, and
	/// breadcrumb bookkeeping) completes before this returns; delivery
	/// happens on the dispatch task and the completion callback fires with
	/// `(delivery error, event)` once, whether or not the event was sent.
	pub fn notify_with(
		&self,
		fault: impl Into<Fault>,
		options: NotifyOptions,
		callback: Option<NotifyCallback>,
	) {
		let normalized = normalize(fault.into());

		let unhandled = options.unhandled;
		let (severity, severity_reason) = if unhandled {
			(
				options.severity.unwrap_or(Severity::Error),
				SeverityReason::UnhandledException,
			)
		} else if let Some(severity) = options.severity {
			(severity, SeverityReason::UserSpecifiedSeverity)
		} else {
			(Severity::Warning, SeverityReason::HandledException)
		};

		let mut event = Event::new(normalized.exceptions, severity, severity_reason, unhandled);
		if let Some(original) = normalized.original {
			event.set_original(original);
		}

		// private metadata copy: client snapshot, per-call overlay, then
		// any preserved raw input under the reserved tab
		let mut metadata = lock(&self.inner.metadata).clone();
		if let Some(overlay) = options.metadata {
			metadata.extend(overlay);
		}
		if let Some(raw) = normalized.discarded_input {
			metadata.add(NOTIFIER_TAB, "notifyArgs", raw);
		}
		event.metadata = metadata;

		event.context = options
			.context
			.or_else(|| read(&self.inner.context).clone())
			.or_else(|| self.inner.config.context.clone());

		let app_override = read(&self.inner.app).clone();
		let effective_stage = app_override
			.release_stage
			.unwrap_or_else(|| self.inner.config.release_stage.clone());
		event.app = AppInfo {
			version: app_override.version,
			release_stage: Some(effective_stage.clone()),
			app_type: app_override.app_type,
		};
		event.device = read(&self.inner.device).clone();
		event.user = read(&self.inner.user).clone();

		if self.inner.closed.load(Ordering::SeqCst) {
			self.inner.logger.warn("notify() called after shutdown; event discarded");
			warn!("notify() called after shutdown; event discarded");
			if let Some(callback) = callback {
				callback(None, event);
			}
			return;
		}

		if !self.inner.config.release_stage_enabled(&effective_stage) {
			debug!(stage = %effective_stage, "event not sent: release stage not enabled");
			self.inner.dispatcher.enqueue(Dispatch::Discard { event, callback });
			return;
		}

		let pre_callback_severity = event.severity;
		let mut send = true;
		for on_error in self
			.inner
			.config
			.on_error
			.iter()
			.chain(options.on_error.iter())
		{
			match catch_unwind(AssertUnwindSafe(|| (**on_error)(&mut event))) {
				Ok(true) => {}
				Ok(false) => {
					send = false;
					break;
				}
				Err(_) => {
					self
						.inner
						.logger
						.error("fault caught in onError callback; continuing");
					warn!("fault caught in onError callback; continuing");
				}
			}
		}
		if event.severity != pre_callback_severity {
			event.severity_reason = SeverityReason::UserCallbackSetSeverity;
		}
		if !send {
			debug!("event not sent: onError callback returned false");
			self.inner.dispatcher.enqueue(Dispatch::Discard { event, callback });
			return;
		}

		if let Some(cell) = &self.session {
			let mut session = lock(cell);
			session.record(event.unhandled);
			event.session = Some(session.snapshot());
		}

		{
			let mut crumbs = lock(&self.inner.breadcrumbs);
			// snapshot first, so an event never contains the breadcrumb
			// recorded about itself
			event.breadcrumbs = crumbs.snapshot();

			let mut crumb_metadata = Map::new();
			crumb_metadata.insert("errorClass".to_string(), Value::from(event.error_class()));
			crumb_metadata.insert("errorMessage".to_string(), Value::from(event.error_message()));
			crumb_metadata.insert("severity".to_string(), Value::from(event.severity.to_string()));
			crumbs.push(Breadcrumb::new(
				event.error_class().to_string(),
				BreadcrumbType::Error,
				crumb_metadata,
			));
		}

		self.inner.dispatcher.enqueue(Dispatch::Deliver {
			payload: EventPayload::single(event),
			callback,
		});
	}

	/// Appends a manual breadcrumb.
	pub fn leave_breadcrumb(&self, message: impl Into<String>) {
		self.leave_breadcrumb_with(message, Map::new(), BreadcrumbType::Manual);
	}

	/// Appends a breadcrumb with metadata and an explicit type. Entries
	/// without a message are dropped.
	pub fn leave_breadcrumb_with(
		&self,
		message: impl Into<String>,
		metadata: Map<String, Value>,
		breadcrumb_type: BreadcrumbType,
	) {
		let message = message.into();
		if message.is_empty() {
			return;
		}
		lock(&self.inner.breadcrumbs).push(Breadcrumb::new(message, breadcrumb_type, metadata));
	}

	/// Current breadcrumb trail, oldest first.
	#[must_use]
	pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
		lock(&self.inner.breadcrumbs).snapshot()
	}

	/// Merges one key into a client metadata tab.
	pub fn add_metadata(
		&self,
		tab: impl Into<String>,
		key: impl Into<String>,
		value: impl Into<Value>,
	) {
		lock(&self.inner.metadata).add(tab, key, value);
	}

	/// Merges every key of a JSON object into a client metadata tab.
	pub fn merge_metadata(&self, tab: impl Into<String>, values: Value) {
		lock(&self.inner.metadata).merge(tab, values);
	}

	/// Removes a whole metadata tab.
	pub fn clear_metadata(&self, tab: &str) {
		lock(&self.inner.metadata).clear_tab(tab);
	}

	/// Removes one key from a metadata tab.
	pub fn clear_metadata_key(&self, tab: &str, key: &str) {
		lock(&self.inner.metadata).clear_key(tab, key);
	}

	/// Snapshot of the client-level metadata store.
	#[must_use]
	pub fn metadata(&self) -> Metadata {
		lock(&self.inner.metadata).clone()
	}

	/// Overrides the release stage reported on events, taking precedence
	/// over the configured stage.
	pub fn set_app_release_stage(&self, stage: impl Into<String>) {
		write(&self.inner.app).release_stage = Some(stage.into());
	}

	pub fn set_app_version(&self, version: impl Into<String>) {
		write(&self.inner.app).version = Some(version.into());
	}

	pub fn set_app_type(&self, app_type: impl Into<String>) {
		write(&self.inner.app).app_type = Some(app_type.into());
	}

	/// Replaces the device facts reported on events. Collecting them is a
	/// platform collaborator's job.
	pub fn set_device(&self, device: DeviceInfo) {
		*write(&self.inner.device) = device;
	}

	pub fn set_user(&self, user: User) {
		*write(&self.inner.user) = Some(user);
	}

	pub fn clear_user(&self) {
		*write(&self.inner.user) = None;
	}

	pub fn set_context(&self, context: impl Into<String>) {
		*write(&self.inner.context) = Some(context.into());
	}

	/// Injects the strategy used by [`start_session`].
	///
	/// [`start_session`]: Client::start_session
	pub fn set_session_delegate(&self, delegate: Arc<dyn SessionDelegate>) {
		*write(&self.inner.session_delegate) = Some(delegate);
	}

	/// Starts a usage session through the injected delegate, returning the
	/// session-bound handle to notify through. Without a delegate this
	/// logs a warning and returns an unchanged handle; sessions are
	/// strictly opt-in.
	#[must_use]
	pub fn start_session(&self) -> Client {
		let delegate = read(&self.inner.session_delegate).clone();
		match delegate {
			Some(delegate) => delegate.start_session(self),
			None => {
				self
					.inner
					.logger
					.warn("No session delegate provided, sessions will not be tracked");
				warn!("no session delegate provided, sessions will not be tracked");
				self.clone()
			}
		}
	}

	/// Binds a handle to the given session. Replaces this handle's session
	/// reference only; events already captured keep their frozen snapshots.
	#[must_use]
	pub fn with_session(&self, session: Session) -> Client {
		Client {
			inner: Arc::clone(&self.inner),
			session: Some(Arc::new(Mutex::new(session))),
		}
	}

	/// Reports the bound session through the delivery gateway.
	pub fn send_session(&self) {
		if let Some(cell) = &self.session {
			let snapshot = lock(cell).snapshot();
			self.inner.dispatcher.enqueue(Dispatch::Session {
				payload: SessionPayload::new(snapshot),
			});
		}
	}

	/// Frozen view of the session this handle is bound to, if any.
	#[must_use]
	pub fn current_session(&self) -> Option<SessionSnapshot> {
		self.session.as_ref().map(|cell| lock(cell).snapshot())
	}

	/// Registers a plugin and runs its `init` synchronously. Registration
	/// order is preserved; `init` panics propagate to the caller.
	pub fn use_plugin(&self, plugin: Arc<dyn Plugin>) {
		lock(&self.inner.plugins).push(Arc::clone(&plugin));
		plugin.init(self);
	}

	/// Waits until everything enqueued so far has been dispatched.
	pub async fn flush(&self) {
		self.inner.dispatcher.flush().await;
	}

	/// Drains the dispatcher and stops accepting events. Safe to call more
	/// than once.
	pub async fn shutdown(&self) {
		if self.inner.closed.swap(true, Ordering::SeqCst) {
			return;
		}
		self.inner.dispatcher.flush().await;
		info!("Faultline client shut down");
	}

	#[must_use]
	pub fn is_closed(&self) -> bool {
		self.inner.closed.load(Ordering::SeqCst)
	}
}
