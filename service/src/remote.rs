// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! HTTP client for the vault backend.
//!
//! The backend exposes the same `/v1/request` contract as this service, so
//! the client re-encodes the service models into the shared REST models and
//! relays the backend's status codes as [`VaultError::Http`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::auth::Caller;
use crate::configuration::ApiSecret;
use crate::constants::{BACKEND_TIMEOUT, REQUEST_ROUTE_SEGMENTS};
use crate::models::{
    CertificateRequestRecordApiModel, CertificateRequestRecordQueryResponseApiModel,
    FinishRequestApiModel, StartNewKeyPairRequestApiModel, StartSigningRequestApiModel,
};
use crate::vault::{
    CertificateRequestRecord, CertificateRequestState, CertificateRequests, FinishRequestResult,
    NewKeyPairRequest, SigningRequest, VaultError,
};

const MAX_ERROR_MESSAGE_LENGTH: usize = 512;

#[derive(Debug, Clone)]
pub struct RemoteCertificateRequests {
    http: reqwest::Client,
    base_url: Url,
    token: Option<ApiSecret>,
}

impl RemoteCertificateRequests {
    pub fn new(base_url: &str, token: Option<ApiSecret>) -> Result<Self, VaultError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| VaultError::Config(format!("invalid backend url {base_url:?}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(VaultError::Config(format!(
                "backend url {base_url} cannot be used as a base"
            )));
        }

        let http = reqwest::Client::builder().timeout(BACKEND_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, VaultError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| VaultError::Config(format!("backend url {} has no path", self.base_url)))?
            .pop_if_empty()
            .extend(REQUEST_ROUTE_SEGMENTS)
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, VaultError> {
        let builder = self.http.request(method, self.url(segments)?);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        })
    }

    /// Clone that authenticates to the vault with the caller's token.
    fn delegate_for(&self, caller: &Caller) -> Self {
        let mut delegate = self.clone();
        if let Some(token) = &caller.token {
            delegate.token = Some(token.clone());
        }
        delegate
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, VaultError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!("[service] failed to read vault error body: {:?}", err);
                String::new()
            }
        };
        tracing::debug!("[service] vault responded {} for request", status);
        Err(VaultError::Http {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, VaultError> {
        let body = self.send(builder).await?.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| VaultError::InvalidResponse(err.to_string()))
    }
}

/// Extracts the `message` of a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    match message.char_indices().nth(MAX_ERROR_MESSAGE_LENGTH) {
        Some((index, _)) => message[..index].to_string(),
        None => message,
    }
}

#[async_trait]
impl CertificateRequests for RemoteCertificateRequests {
    #[tracing::instrument(skip(self, request))]
    async fn start_signing_request(&self, request: SigningRequest) -> Result<String, VaultError> {
        let body = StartSigningRequestApiModel::from(&request);
        let builder = self.request(Method::POST, &["sign"])?.json(&body);
        self.send_json(builder).await
    }

    #[tracing::instrument(skip(self, request))]
    async fn start_new_key_pair_request(
        &self,
        request: NewKeyPairRequest,
    ) -> Result<String, VaultError> {
        let body = StartNewKeyPairRequestApiModel::from(&request);
        let builder = self.request(Method::POST, &["newkeypair"])?.json(&body);
        self.send_json(builder).await
    }

    #[tracing::instrument(skip(self))]
    async fn approve(&self, request_id: &str, rejected: bool) -> Result<(), VaultError> {
        let rejected = if rejected { "true" } else { "false" };
        let builder = self.request(Method::POST, &[request_id, "approve", rejected])?;
        self.send(builder).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn accept(&self, request_id: &str) -> Result<(), VaultError> {
        let builder = self.request(Method::POST, &[request_id, "accept"])?;
        self.send(builder).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn query(
        &self,
        application_id: Option<&str>,
        state: Option<CertificateRequestState>,
    ) -> Result<Vec<CertificateRequestRecord>, VaultError> {
        let builder = match (application_id, state) {
            (Some(application_id), _) => self.request(Method::GET, &["app", application_id])?,
            (None, Some(state)) => self.request(Method::GET, &["state", state.as_str()])?,
            (None, None) => self.request(Method::GET, &[])?,
        };
        let response: CertificateRequestRecordQueryResponseApiModel =
            self.send_json(builder).await?;

        let records = response
            .requests
            .into_iter()
            .map(CertificateRequestRecord::from)
            // the app route does not filter by state, so narrow it here
            .filter(|record| state.is_none_or(|state| record.state == state))
            .collect();

        Ok(records)
    }

    #[tracing::instrument(skip(self))]
    async fn read(&self, request_id: &str) -> Result<CertificateRequestRecord, VaultError> {
        let builder = self.request(Method::GET, &[request_id])?;
        let record: CertificateRequestRecordApiModel = self.send_json(builder).await?;
        Ok(record.into())
    }

    #[tracing::instrument(skip(self))]
    async fn finish_request(
        &self,
        request_id: &str,
        application_id: &str,
    ) -> Result<FinishRequestResult, VaultError> {
        let builder = self.request(Method::POST, &[request_id, application_id, "finish"])?;
        let model: FinishRequestApiModel = self.send_json(builder).await?;
        FinishRequestResult::try_from(model).map_err(VaultError::InvalidResponse)
    }

    fn on_behalf_of(&self, caller: &Caller) -> Arc<dyn CertificateRequests> {
        Arc::new(self.delegate_for(caller))
    }
}
