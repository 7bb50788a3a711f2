// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::constants::{MAX_ERROR_MESSAGE_LENGTH, REQUEST_ROUTE_SEGMENTS};
use crate::errors::VaultClientError;
use crate::models::{
    CertificateRequestRecordApiModel, CreateNewKeyPairRequestApiModel,
    CreateSigningRequestApiModel, FetchRequestResultApiModel, Secret,
};

/// Certificate request operations of the vault service.
#[async_trait]
pub trait OpcVault: Send + Sync {
    /// Returns the vault's id of the new request.
    async fn create_signing_request(
        &self,
        model: &CreateSigningRequestApiModel,
    ) -> Result<String, VaultClientError>;

    async fn create_new_key_pair_request(
        &self,
        model: &CreateNewKeyPairRequestApiModel,
    ) -> Result<String, VaultClientError>;

    async fn approve_certificate_request(
        &self,
        request_id: &str,
        rejected: bool,
    ) -> Result<(), VaultClientError>;

    async fn accept_certificate_request(&self, request_id: &str) -> Result<(), VaultClientError>;

    async fn fetch_certificate_request_result(
        &self,
        request_id: &str,
        application_id: &str,
    ) -> Result<FetchRequestResultApiModel, VaultClientError>;

    async fn read_certificate_request(
        &self,
        request_id: &str,
    ) -> Result<CertificateRequestRecordApiModel, VaultClientError>;
}

#[derive(Debug, Clone)]
pub struct OpcVaultClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<Secret>,
}

impl OpcVaultClient {
    pub fn new(
        base_url: &str,
        token: Option<Secret>,
        timeout: Duration,
    ) -> Result<Self, VaultClientError> {
        let base_url = Url::parse(base_url).map_err(|err| {
            VaultClientError::Config(format!("invalid vault url {base_url:?}: {err}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(VaultClientError::Config(format!(
                "vault url {base_url} cannot be used as a base"
            )));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, VaultClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| VaultClientError::Config(format!("vault url {} has no path", self.base_url)))?
            .pop_if_empty()
            .extend(REQUEST_ROUTE_SEGMENTS)
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, VaultClientError> {
        let builder = self.http.request(method, self.url(segments)?);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, VaultClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!("[gds] failed to read vault error body: {:?}", err);
                String::new()
            }
        };
        Err(VaultClientError::Http {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, VaultClientError> {
        let response = self.send(builder).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| VaultClientError::Decode(err.to_string()))
    }
}

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
impl OpcVault for OpcVaultClient {
    #[tracing::instrument(skip(self, model), fields(application_id = %model.application_id))]
    async fn create_signing_request(
        &self,
        model: &CreateSigningRequestApiModel,
    ) -> Result<String, VaultClientError> {
        let builder = self.request(Method::POST, &["sign"])?.json(model);
        self.send_json(builder).await
    }

    #[tracing::instrument(skip(self, model), fields(application_id = %model.application_id))]
    async fn create_new_key_pair_request(
        &self,
        model: &CreateNewKeyPairRequestApiModel,
    ) -> Result<String, VaultClientError> {
        let builder = self.request(Method::POST, &["newkeypair"])?.json(model);
        self.send_json(builder).await
    }

    #[tracing::instrument(skip(self))]
    async fn approve_certificate_request(
        &self,
        request_id: &str,
        rejected: bool,
    ) -> Result<(), VaultClientError> {
        let rejected = if rejected { "true" } else { "false" };
        let builder = self.request(Method::POST, &[request_id, "approve", rejected])?;
        self.send(builder).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn accept_certificate_request(&self, request_id: &str) -> Result<(), VaultClientError> {
        let builder = self.request(Method::POST, &[request_id, "accept"])?;
        self.send(builder).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_certificate_request_result(
        &self,
        request_id: &str,
        application_id: &str,
    ) -> Result<FetchRequestResultApiModel, VaultClientError> {
        let builder = self.request(Method::POST, &[request_id, application_id, "finish"])?;
        self.send_json(builder).await
    }

    #[tracing::instrument(skip(self))]
    async fn read_certificate_request(
        &self,
        request_id: &str,
    ) -> Result<CertificateRequestRecordApiModel, VaultClientError> {
        let builder = self.request(Method::GET, &[request_id])?;
        self.send_json(builder).await
    }
}
