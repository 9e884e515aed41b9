// Copyright (c) 2025 Faultline contributors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Delivery gateway: the transport contract the pipeline ships through.
//!
//! The core never implements retry or backoff; a gateway makes one attempt
//! and surfaces the outcome. The HTTP gateway here is the default produced
//! when no custom factory is configured.

use async_trait::async_trait;
use faultline_core::{EventPayload, SessionPayload};
use std::sync::Arc;
use tracing::debug;

use crate::config::{Config, Endpoints};
use crate::error::DeliveryError;

/// SDK identification sent with every request.
const NOTIFIER_USER_AGENT: &str = concat!("faultline-rust/", env!("CARGO_PKG_VERSION"));
/// Wire format revision.
const PAYLOAD_VERSION: &str = "4";

/// Transport contract for shipping event and session payloads.
#[async_trait]
pub trait Delivery: Send + Sync {
	async fn send_event(&self, payload: &EventPayload) -> Result<(), DeliveryError>;
	async fn send_session(&self, payload: &SessionPayload) -> Result<(), DeliveryError>;
}

/// Produces a delivery gateway bound to a client's configuration.
pub trait DeliveryFactory: Send + Sync {
	fn create(&self, config: &Config) -> Arc<dyn Delivery>;
}

impl<F> DeliveryFactory for F
where
	F: Fn(&Config) -> Arc<dyn Delivery> + Send + Sync,
{
	fn create(&self, config: &Config) -> Arc<dyn Delivery> {
		self(config)
	}
}

/// Default gateway: JSON over HTTP to the configured endpoints.
pub struct HttpDelivery {
	http_client: reqwest::Client,
	api_key: String,
	endpoints: Endpoints,
}

impl HttpDelivery {
	/// Builds a gateway bound to the configuration's endpoints, API key,
	/// and request timeout.
	#[must_use]
	pub fn new(config: &Config) -> Self {
		let http_client = reqwest::Client::builder()
			.user_agent(NOTIFIER_USER_AGENT)
			.timeout(config.request_timeout())
			.build()
			.expect("failed to build HTTP client");

		Self {
			http_client,
			api_key: config.api_key().to_string(),
			endpoints: config.endpoints().clone(),
		}
	}

	async fn post<T: serde::Serialize + Sync>(
		&self,
		url: &str,
		payload: &T,
	) -> Result<(), DeliveryError> {
		debug!(url = %url, "sending payload");

		let response = self
			.http_client
			.post(url)
			.header("Faultline-Api-Key", &self.api_key)
			.header("Faultline-Payload-Version", PAYLOAD_VERSION)
			.json(payload)
			.send()
			.await?;

		if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
			let retry_after = response
				.headers()
				.get("Retry-After")
				.and_then(|v| v.to_str().ok())
				.and_then(|s| s.parse().ok());
			return Err(DeliveryError::RateLimited {
				retry_after_secs: retry_after,
			});
		}

		if !response.status().is_success() {
			let status = response.status().as_u16();
			let message = response.text().await.unwrap_or_default();
			return Err(DeliveryError::ServerError { status, message });
		}

		Ok(())
	}
}

#[async_trait]
impl Delivery for HttpDelivery {
	async fn send_event(&self, payload: &EventPayload) -> Result<(), DeliveryError> {
		self.post(&self.endpoints.notify, payload).await
	}

	async fn send_session(&self, payload: &SessionPayload) -> Result<(), DeliveryError> {
		self.post(&self.endpoints.sessions, payload).await
	}
}
