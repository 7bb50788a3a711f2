// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Wire models of the vault's `/v1/request` REST contract.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Password or bearer token, zeroized on drop and redacted in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl std::str::FromStr for Secret {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("secret must not be empty".to_string());
        }
        Ok(Self::new(s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSigningRequestApiModel {
    pub application_id: String,
    pub certificate_group_id: String,
    pub certificate_type_id: String,
    /// Base64 DER PKCS#10 request.
    pub certificate_request: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNewKeyPairRequestApiModel {
    pub application_id: String,
    pub certificate_group_id: String,
    pub certificate_type_id: String,
    pub subject_name: String,
    pub domain_names: Vec<String>,
    pub private_key_format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_password: Option<Secret>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequestRecordApiModel {
    pub request_id: String,
    pub application_id: String,
    pub state: String,
    pub certificate_group_id: String,
    pub certificate_type_id: String,
    pub signing_request: bool,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub domain_names: Option<Vec<String>>,
    #[serde(default)]
    pub private_key_format: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequestResultApiModel {
    pub request_id: String,
    pub application_id: String,
    pub state: String,
    #[serde(default)]
    pub certificate_group_id: Option<String>,
    #[serde(default)]
    pub certificate_type_id: Option<String>,
    #[serde(default)]
    pub signed_certificate: Option<String>,
    #[serde(default)]
    pub private_key_format: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub authority_id: Option<String>,
}

impl fmt::Debug for FetchRequestResultApiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchRequestResultApiModel")
            .field("request_id", &self.request_id)
            .field("application_id", &self.application_id)
            .field("state", &self.state)
            .field("certificate_group_id", &self.certificate_group_id)
            .field("certificate_type_id", &self.certificate_type_id)
            .field("signed_certificate", &self.signed_certificate.is_some())
            .field("private_key_format", &self.private_key_format)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("authority_id", &self.authority_id)
            .finish()
    }
}
