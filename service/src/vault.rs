// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! The vault client interface the controller delegates to.
//!
//! The signing-request workflow (approval, issuance, storage) is owned by the
//! vault backend. This module only describes the operations the controller
//! forwards and the service-side shapes of their results.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use crate::auth::Caller;
use crate::configuration::ApiSecret;

/// Lifecycle state of a certificate request as reported by the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateRequestState {
    New,
    Approved,
    Rejected,
    Accepted,
    Deleted,
    Revoked,
    Removed,
}

impl CertificateRequestState {
    pub const ALL: [CertificateRequestState; 7] = [
        Self::New,
        Self::Approved,
        Self::Rejected,
        Self::Accepted,
        Self::Deleted,
        Self::Revoked,
        Self::Removed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Accepted => "Accepted",
            Self::Deleted => "Deleted",
            Self::Revoked => "Revoked",
            Self::Removed => "Removed",
        }
    }
}

impl fmt::Display for CertificateRequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertificateRequestState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown certificate request state {s:?}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrivateKeyFormat {
    #[serde(rename = "PFX", alias = "pfx", alias = "Pfx")]
    Pfx,
    #[serde(rename = "PEM", alias = "pem", alias = "Pem")]
    Pem,
}

/// Private key bytes returned by the vault, wiped on drop.
#[derive(Clone, PartialEq, Eq, ZeroizeOnDrop)]
pub struct PrivateKey(Vec<u8>);

impl PrivateKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey([REDACTED; {} bytes])", self.0.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
    pub application_id: String,
    pub certificate_group_id: String,
    pub certificate_type_id: String,
    /// DER encoded PKCS#10 request.
    pub certificate_request: Vec<u8>,
    pub authority_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewKeyPairRequest {
    pub application_id: String,
    pub certificate_group_id: String,
    pub certificate_type_id: String,
    pub subject_name: String,
    pub domain_names: Vec<String>,
    pub private_key_format: PrivateKeyFormat,
    pub private_key_password: Option<ApiSecret>,
    pub authority_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequestRecord {
    pub request_id: String,
    pub application_id: String,
    pub state: CertificateRequestState,
    pub certificate_group_id: String,
    pub certificate_type_id: String,
    /// `true` when the request carries a CSR, `false` for a new key pair.
    pub signing_request: bool,
    pub subject_name: Option<String>,
    pub domain_names: Option<Vec<String>>,
    pub private_key_format: Option<PrivateKeyFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishRequestResult {
    pub state: CertificateRequestState,
    pub certificate_group_id: Option<String>,
    pub certificate_type_id: Option<String>,
    pub signed_certificate: Option<Vec<u8>>,
    pub private_key_format: Option<PrivateKeyFormat>,
    pub private_key: Option<PrivateKey>,
    pub authority_id: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum VaultError {
    #[error("vault returned HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("vault request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid vault response: {0}")]
    InvalidResponse(String),
    #[error("invalid vault configuration: {0}")]
    Config(String),
}

/// Operations the controller forwards to the certificate vault.
#[async_trait]
pub trait CertificateRequests: Send + Sync {
    async fn start_signing_request(&self, request: SigningRequest) -> Result<String, VaultError>;

    async fn start_new_key_pair_request(
        &self,
        request: NewKeyPairRequest,
    ) -> Result<String, VaultError>;

    async fn approve(&self, request_id: &str, rejected: bool) -> Result<(), VaultError>;

    async fn accept(&self, request_id: &str) -> Result<(), VaultError>;

    async fn query(
        &self,
        application_id: Option<&str>,
        state: Option<CertificateRequestState>,
    ) -> Result<Vec<CertificateRequestRecord>, VaultError>;

    async fn read(&self, request_id: &str) -> Result<CertificateRequestRecord, VaultError>;

    async fn finish_request(
        &self,
        request_id: &str,
        application_id: &str,
    ) -> Result<FinishRequestResult, VaultError>;

    /// Returns a client that acts with the identity of `caller`.
    fn on_behalf_of(&self, caller: &Caller) -> Arc<dyn CertificateRequests>;
}
