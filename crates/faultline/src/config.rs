// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Configuration model: user options validated once into an immutable
//! settings object.
//!
//! Validation collects every violation before failing so a misconfigured
//! integration gets one complete report instead of a fix-one-rerun loop.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use faultline_core::{Event, Severity};

use crate::delivery::DeliveryFactory;
use crate::error::ConfigError;
use crate::logger::{Logger, NoopLogger, TracingLogger};

/// Hosted endpoint for event batches.
pub const DEFAULT_NOTIFY_ENDPOINT: &str = "https://notify.faultline.dev";
/// Hosted endpoint for session reports.
pub const DEFAULT_SESSIONS_ENDPOINT: &str = "https://sessions.faultline.dev";

const DEFAULT_MAX_BREADCRUMBS: usize = 20;
const MAX_BREADCRUMBS_LIMIT: usize = 100;

/// Where payloads are shipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
	pub notify: String,
	pub sessions: String,
}

impl Default for Endpoints {
	fn default() -> Self {
		Self {
			notify: DEFAULT_NOTIFY_ENDPOINT.to_string(),
			sessions: DEFAULT_SESSIONS_ENDPOINT.to_string(),
		}
	}
}

/// An `on_error` callback. Runs synchronously with the mutable event;
/// returning `false` aborts delivery of that event.
pub type OnError = Arc<dyn Fn(&mut Event) -> bool + Send + Sync>;

enum LoggerSetting {
	/// Nothing configured: forward to `tracing`.
	Default,
	/// Explicitly no logger.
	None,
	Custom(Arc<dyn Logger>),
}

/// Immutable, validated client settings.
pub struct Config {
	pub(crate) api_key: String,
	pub(crate) endpoints: Endpoints,
	pub(crate) release_stage: String,
	pub(crate) enabled_release_stages: Option<BTreeSet<String>>,
	pub(crate) app_version: Option<String>,
	pub(crate) app_type: Option<String>,
	pub(crate) context: Option<String>,
	pub(crate) max_breadcrumbs: usize,
	pub(crate) request_timeout: Duration,
	pub(crate) on_error: Vec<OnError>,
	pub(crate) logger: Arc<dyn Logger>,
	pub(crate) delivery_factory: Option<Arc<dyn DeliveryFactory>>,
}

impl Config {
	#[must_use]
	pub fn builder() -> ConfigBuilder {
		ConfigBuilder::new()
	}

	#[must_use]
	pub fn api_key(&self) -> &str {
		&self.api_key
	}

	#[must_use]
	pub fn endpoints(&self) -> &Endpoints {
		&self.endpoints
	}

	#[must_use]
	pub fn release_stage(&self) -> &str {
		&self.release_stage
	}

	#[must_use]
	pub fn max_breadcrumbs(&self) -> usize {
		self.max_breadcrumbs
	}

	#[must_use]
	pub fn request_timeout(&self) -> Duration {
		self.request_timeout
	}

	/// Whether the given release stage is allowed to send events. An absent
	/// or empty enabled set allows every stage.
	#[must_use]
	pub fn release_stage_enabled(&self, stage: &str) -> bool {
		match &self.enabled_release_stages {
			Some(stages) if !stages.is_empty() => stages.contains(stage),
			_ => true,
		}
	}
}

impl std::fmt::Debug for Config {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Config")
			.field("endpoints", &self.endpoints)
			.field("release_stage", &self.release_stage)
			.field("enabled_release_stages", &self.enabled_release_stages)
			.field("app_version", &self.app_version)
			.field("app_type", &self.app_type)
			.field("max_breadcrumbs", &self.max_breadcrumbs)
			.field("on_error_count", &self.on_error.len())
			.finish_non_exhaustive()
	}
}

/// Builder for [`Config`]. Validation happens once, in [`build`].
///
/// [`build`]: ConfigBuilder::build
pub struct ConfigBuilder {
	api_key: Option<String>,
	endpoints: Endpoints,
	release_stage: String,
	enabled_release_stages: Option<BTreeSet<String>>,
	app_version: Option<String>,
	app_type: Option<String>,
	context: Option<String>,
	max_breadcrumbs: usize,
	request_timeout: Duration,
	on_error: Vec<OnError>,
	logger: LoggerSetting,
	delivery_factory: Option<Arc<dyn DeliveryFactory>>,
}

impl ConfigBuilder {
	#[must_use]
	pub fn new() -> Self {
		Self {
			api_key: None,
			endpoints: Endpoints::default(),
			release_stage: "production".to_string(),
			enabled_release_stages: None,
			app_version: None,
			app_type: None,
			context: None,
			max_breadcrumbs: DEFAULT_MAX_BREADCRUMBS,
			request_timeout: Duration::from_secs(30),
			on_error: Vec::new(),
			logger: LoggerSetting::Default,
			delivery_factory: None,
		}
	}

	/// Sets the project API key. Required.
	pub fn api_key(mut self, key: impl Into<String>) -> Self {
		self.api_key = Some(key.into());
		self
	}

	/// Overrides the notify/sessions endpoints.
	pub fn endpoints(mut self, notify: impl Into<String>, sessions: impl Into<String>) -> Self {
		self.endpoints = Endpoints {
			notify: notify.into(),
			sessions: sessions.into(),
		};
		self
	}

	/// Sets the deployment stage reported with every event.
	///
	/// Example: `production`, `staging`, `development`
	pub fn release_stage(mut self, stage: impl Into<String>) -> Self {
		self.release_stage = stage.into();
		self
	}

	/// Restricts reporting to the given stages. An empty set means every
	/// stage reports.
	pub fn enabled_release_stages<I, S>(mut self, stages: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.enabled_release_stages = Some(stages.into_iter().map(Into::into).collect());
		self
	}

	/// Sets the application version.
	///
	/// Example: `1.2.3` or a git commit SHA
	pub fn app_version(mut self, version: impl Into<String>) -> Self {
		self.app_version = Some(version.into());
		self
	}

	/// Sets the application type (e.g. worker kind, service role).
	pub fn app_type(mut self, app_type: impl Into<String>) -> Self {
		self.app_type = Some(app_type.into());
		self
	}

	/// Sets the default context reported with events.
	pub fn context(mut self, context: impl Into<String>) -> Self {
		self.context = Some(context.into());
		self
	}

	/// Sets the breadcrumb ring buffer capacity (0..=100).
	pub fn max_breadcrumbs(mut self, max: usize) -> Self {
		self.max_breadcrumbs = max;
		self
	}

	/// Sets the HTTP request timeout for the default delivery gateway.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	/// Appends an `on_error` callback. Callbacks run in registration order
	/// before per-call callbacks.
	pub fn on_error<F>(mut self, callback: F) -> Self
	where
		F: Fn(&mut Event) -> bool + Send + Sync + 'static,
	{
		self.on_error.push(Arc::new(callback));
		self
	}

	/// Installs a custom logger.
	pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
		self.logger = LoggerSetting::Custom(logger);
		self
	}

	/// Explicitly disables SDK logging.
	pub fn no_logger(mut self) -> Self {
		self.logger = LoggerSetting::None;
		self
	}

	/// Installs a custom delivery gateway factory. Without one, the HTTP
	/// gateway bound to the configured endpoints is used.
	pub fn delivery_factory(mut self, factory: Arc<dyn DeliveryFactory>) -> Self {
		self.delivery_factory = Some(factory);
		self
	}

	/// Validates every option and produces the immutable configuration.
	pub fn build(self) -> Result<Config, ConfigError> {
		let mut violations = Vec::new();

		let api_key = self.api_key.unwrap_or_default();
		if api_key.trim().is_empty() {
			violations.push("apiKey is required and must be a non-empty string".to_string());
		}
		if self.max_breadcrumbs > MAX_BREADCRUMBS_LIMIT {
			violations.push(format!(
				"maxBreadcrumbs must be between 0 and {MAX_BREADCRUMBS_LIMIT}"
			));
		}
		if self.endpoints.notify.trim().is_empty() {
			violations.push("endpoints.notify must be a non-empty URL".to_string());
		}
		if self.endpoints.sessions.trim().is_empty() {
			violations.push("endpoints.sessions must be a non-empty URL".to_string());
		}
		if self.release_stage.trim().is_empty() {
			violations.push("releaseStage must be a non-empty string".to_string());
		}

		if !violations.is_empty() {
			return Err(ConfigError { violations });
		}

		let logger: Arc<dyn Logger> = match self.logger {
			LoggerSetting::Default => Arc::new(TracingLogger),
			LoggerSetting::None => Arc::new(NoopLogger),
			LoggerSetting::Custom(logger) => logger,
		};

		Ok(Config {
			api_key,
			endpoints: Endpoints {
				notify: self.endpoints.notify.trim_end_matches('/').to_string(),
				sessions: self.endpoints.sessions.trim_end_matches('/').to_string(),
			},
			release_stage: self.release_stage,
			enabled_release_stages: self.enabled_release_stages,
			app_version: self.app_version,
			app_type: self.app_type,
			context: self.context,
			max_breadcrumbs: self.max_breadcrumbs,
			request_timeout: self.request_timeout,
			on_error: self.on_error,
			logger,
			delivery_factory: self.delivery_factory,
		})
	}
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Per-call options for `notify`.
#[derive(Clone, Default)]
pub struct NotifyOptions {
	/// Explicit severity; recorded with reason `userSpecifiedSeverity`.
	pub severity: Option<Severity>,
	/// Marks the event unhandled; defaults severity to `error` with reason
	/// `unhandledException`.
	pub unhandled: bool,
	/// Context for this event only.
	pub context: Option<String>,
	/// Metadata merged over the client snapshot for this event only.
	pub metadata: Option<faultline_core::Metadata>,
	/// Callbacks run after the configured chain, in order.
	pub on_error: Vec<OnError>,
}

impl NotifyOptions {
	#[must_use]
	pub fn severity(mut self, severity: Severity) -> Self {
		self.severity = Some(severity);
		self
	}

	#[must_use]
	pub fn unhandled(mut self) -> Self {
		self.unhandled = true;
		self
	}

	#[must_use]
	pub fn context(mut self, context: impl Into<String>) -> Self {
		self.context = Some(context.into());
		self
	}

	#[must_use]
	pub fn on_error<F>(mut self, callback: F) -> Self
	where
		F: Fn(&mut Event) -> bool + Send + Sync + 'static,
	{
		self.on_error.push(Arc::new(callback));
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_minimal_config_builds() {
		let config = Config::builder().api_key("API_KEY_YEAH").build().unwrap();
		assert_eq!(config.api_key(), "API_KEY_YEAH");
		assert_eq!(config.release_stage(), "production");
		assert_eq!(config.max_breadcrumbs(), DEFAULT_MAX_BREADCRUMBS);
	}

	#[test]
	fn test_missing_api_key_fails() {
		let result = Config::builder().build();
		let err = result.err().unwrap();
		assert_eq!(err.violations.len(), 1);
		assert!(err.violations[0].contains("apiKey"));
	}

	#[test]
	fn test_all_violations_reported_together() {
		let result = Config::builder()
			.api_key("")
			.max_breadcrumbs(500)
			.release_stage("")
			.build();

		let err = result.err().unwrap();
		assert_eq!(err.violations.len(), 3);
		let message = err.to_string();
		assert!(message.contains("apiKey"));
		assert!(message.contains("maxBreadcrumbs"));
		assert!(message.contains("releaseStage"));
	}

	#[test]
	fn test_endpoints_are_normalized() {
		let config = Config::builder()
			.api_key("k")
			.endpoints("https://notify.example.com/", "https://sessions.example.com/")
			.build()
			.unwrap();
		assert!(!config.endpoints().notify.ends_with('/'));
		assert!(!config.endpoints().sessions.ends_with('/'));
	}

	#[test]
	fn test_release_stage_gating() {
		let config = Config::builder()
			.api_key("k")
			.enabled_release_stages(["qa", "staging"])
			.build()
			.unwrap();
		assert!(config.release_stage_enabled("qa"));
		assert!(!config.release_stage_enabled("production"));

		let open = Config::builder().api_key("k").build().unwrap();
		assert!(open.release_stage_enabled("anything"));

		let empty = Config::builder()
			.api_key("k")
			.enabled_release_stages(Vec::<String>::new())
			.build()
			.unwrap();
		assert!(empty.release_stage_enabled("production"));
	}

	#[test]
	fn test_max_breadcrumbs_zero_is_valid() {
		let config = Config::builder().api_key("k").max_breadcrumbs(0).build();
		assert!(config.is_ok());
	}
}
