// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use crate::auth::Role;
use crate::constants::REQUEST_TIMEOUT;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct ServiceOptions {
    #[arg(long, default_value = "127.0.0.1", env("OPCVAULT_HTTP_HOST"))]
    pub host: String,
    #[arg(long, default_value = "8080", env("OPCVAULT_HTTP_PORT"))]
    pub port: u16,
    /// Base URL of the vault backend that owns the request workflow.
    #[arg(long, default_value = "http://127.0.0.1:9090", env("OPCVAULT_BACKEND_URL"))]
    pub backend_url: String,
    /// Bearer token this service presents to the vault backend.
    #[arg(long, env("OPCVAULT_BACKEND_TOKEN"))]
    pub backend_token: Option<ApiSecret>,
    /// Comma separated `role:token` pairs accepted from callers.
    #[arg(long, env("OPCVAULT_API_KEYS"), value_delimiter = ',')]
    pub api_keys: Vec<ApiKey>,
    #[arg(long, default_value = "true", env("OPCVAULT_AUTH_REQUIRED"), action = ArgAction::Set)]
    pub auth_required: bool,
    /// Seconds a request may take before it is answered with 408.
    #[arg(long, default_value = "30", env("OPCVAULT_REQUEST_TIMEOUT_SECS"))]
    pub request_timeout_secs: u64,
}

impl ServiceOptions {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServiceOptions {
    fn default() -> Self {
        ServiceOptions {
            host: "127.0.0.1".to_string(),
            port: 8080,
            backend_url: "http://127.0.0.1:9090".to_string(),
            backend_token: None,
            api_keys: Vec::new(),
            auth_required: true,
            request_timeout_secs: REQUEST_TIMEOUT.as_secs(),
        }
    }
}

/// A bearer token or password, wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct ApiSecret(String);

impl ApiSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl FromStr for ApiSecret {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("token must not be empty".to_string());
        }
        Ok(Self::new(s.trim()))
    }
}

/// A caller credential: the role granted to whoever presents `token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub role: Role,
    pub token: ApiSecret,
}

impl FromStr for ApiKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (role, token) = s
            .split_once(':')
            .ok_or_else(|| format!("expected role:token, got {s:?}"))?;
        Ok(Self {
            role: role.parse()?,
            token: token.parse()?,
        })
    }
}
