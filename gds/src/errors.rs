// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use crate::status::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum VaultClientError {
    #[error("vault returned HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("vault request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid vault response: {0}")]
    Decode(String),
    #[error("invalid vault configuration: {0}")]
    Config(String),
}

/// Error returned to the GDS, carrying the OPC UA status of the failure.
#[derive(thiserror::Error, Debug)]
#[error("{status}: {message}")]
pub struct ServiceResultError {
    pub status: StatusCode,
    pub message: String,
    #[source]
    pub source: Option<VaultClientError>,
}

impl ServiceResultError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
        }
    }

    /// Translates a vault failure for `operation`.
    pub fn from_vault(operation: Operation, err: VaultClientError) -> Self {
        let status = translate(operation, &err);
        tracing::warn!("[gds] {:?} failed with {}: {}", operation, status, err);
        Self {
            status,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    StartSigningRequest,
    StartNewKeyPairRequest,
    ApproveRequest,
    AcceptRequest,
    FinishRequest,
    ReadRequest,
}

impl Operation {
    fn not_found(self) -> StatusCode {
        match self {
            Operation::StartNewKeyPairRequest => StatusCode::BadNodeIdUnknown,
            _ => StatusCode::BadNotFound,
        }
    }

    /// Status for any HTTP failure without a dedicated mapping.
    fn fallback(self) -> StatusCode {
        match self {
            Operation::StartSigningRequest => StatusCode::BadNotSupported,
            Operation::ApproveRequest | Operation::AcceptRequest => StatusCode::BadUserAccessDenied,
            Operation::StartNewKeyPairRequest
            | Operation::FinishRequest
            | Operation::ReadRequest => StatusCode::BadRequestNotAllowed,
        }
    }
}

pub fn translate(operation: Operation, err: &VaultClientError) -> StatusCode {
    match err {
        VaultClientError::Http { status, .. } => match status {
            400 => StatusCode::BadInvalidArgument,
            401 | 403 => StatusCode::BadUserAccessDenied,
            404 => operation.not_found(),
            _ => operation.fallback(),
        },
        VaultClientError::Transport(_) | VaultClientError::Decode(_) => {
            StatusCode::BadCommunicationError
        }
        VaultClientError::Config(_) => StatusCode::BadUnexpectedError,
    }
}
