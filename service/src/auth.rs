// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Caller authentication and authorization policies.
//!
//! Handlers declare the policy they require by taking an [`Authorized`]
//! extractor, e.g. `Authorized<CanWrite>`. The extractor resolves the bearer
//! token against the configured [`ApiKey`](crate::configuration::ApiKey)s and
//! rejects the request before the handler body runs.
//!
//! | Policy | Roles |
//! |--------|-------|
//! | [`CanRead`] | any authenticated caller |
//! | [`CanWrite`] | `Writer`, `Administrator` |
//! | [`CanManage`] | `Approver`, `Administrator` |

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::application::AppState;
use crate::configuration::{ApiKey, ApiSecret};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reader,
    Writer,
    Approver,
    Administrator,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reader" => Ok(Role::Reader),
            "writer" => Ok(Role::Writer),
            "approver" => Ok(Role::Approver),
            "administrator" | "admin" => Ok(Role::Administrator),
            other => Err(format!("unknown role {other:?}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Reader => "reader",
            Role::Writer => "writer",
            Role::Approver => "approver",
            Role::Administrator => "administrator",
        };
        f.write_str(name)
    }
}

/// An authorization policy a route can demand.
pub trait Policy: Send + Sync + 'static {
    const NAME: &'static str;

    fn allows(role: Role) -> bool;
}

pub struct CanRead;
pub struct CanWrite;
pub struct CanManage;

impl Policy for CanRead {
    const NAME: &'static str = "CanRead";

    fn allows(_role: Role) -> bool {
        true
    }
}

impl Policy for CanWrite {
    const NAME: &'static str = "CanWrite";

    fn allows(role: Role) -> bool {
        matches!(role, Role::Writer | Role::Administrator)
    }
}

impl Policy for CanManage {
    const NAME: &'static str = "CanManage";

    fn allows(role: Role) -> bool {
        matches!(role, Role::Approver | Role::Administrator)
    }
}

/// The authenticated identity behind a request.
#[derive(Debug, Clone)]
pub struct Caller {
    pub role: Role,
    /// The token the caller presented; `None` when authentication is disabled.
    pub token: Option<ApiSecret>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self {
            role: Role::Administrator,
            token: None,
        }
    }
}

/// Extractor proving the caller satisfies policy `P`.
pub struct Authorized<P: Policy> {
    pub caller: Caller,
    _policy: PhantomData<P>,
}

impl<P: Policy> Authorized<P> {
    fn new(caller: Caller) -> Self {
        Self {
            caller,
            _policy: PhantomData,
        }
    }
}

impl<P: Policy> FromRequestParts<Arc<AppState>> for Authorized<P> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if !state.options.auth_required {
            return Ok(Self::new(Caller::anonymous()));
        }

        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let caller = authenticate(&state.options.api_keys, token).ok_or_else(|| {
            tracing::warn!("[service] rejected unknown bearer token");
            AppError::Unauthorized
        })?;

        if !P::allows(caller.role) {
            tracing::warn!(
                "[service] role {} does not satisfy policy {}",
                caller.role,
                P::NAME
            );
            return Err(AppError::Forbidden);
        }

        Ok(Self::new(caller))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Looks up the API key matching `token`, comparing in constant time.
fn authenticate(api_keys: &[ApiKey], token: &str) -> Option<Caller> {
    api_keys
        .iter()
        .find(|key| key.token.expose().as_bytes().ct_eq(token.as_bytes()).into())
        .map(|key| Caller {
            role: key.role,
            token: Some(key.token.clone()),
        })
}
