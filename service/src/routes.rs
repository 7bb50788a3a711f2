// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! HTTP route handlers for the certificate request controller.
//!
//! All request routes live under `/v1/request`:
//!
//! | Method | Path | Policy | Handler |
//! |--------|------|--------|---------|
//! | POST | `/sign` | CanWrite | [`start_signing_request`] |
//! | POST | `/newkeypair` | CanWrite | [`start_new_key_pair_request`] |
//! | POST | `/{requestId}/approve/{rejected}` | CanManage | [`approve_certificate_request`] |
//! | POST | `/{requestId}/accept` | CanWrite | [`accept_certificate_request`] |
//! | GET | `/` | CanRead | [`query_requests`] |
//! | GET | `/app/{appId}` | CanRead | [`query_app_requests`] |
//! | GET | `/state/{state}` | CanRead | [`query_state_requests`] |
//! | GET | `/{requestId}` | CanRead | [`read_certificate_request`] |
//! | POST | `/{requestId}/{applicationId}/finish` | CanWrite | [`finish_request`] |
//!
//! `GET /health` is served without authentication.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde_json::json;
use validator::Validate;

use crate::application::AppState;
use crate::auth::{Authorized, CanManage, CanRead, CanWrite};
use crate::errors::AppError;
use crate::models::{
    CertificateRequestRecordApiModel, CertificateRequestRecordQueryResponseApiModel,
    FinishRequestApiModel, StartNewKeyPairRequestApiModel, StartSigningRequestApiModel,
};
use crate::vault::CertificateRequestState;

/// Health check endpoint.
///
/// # Response
///
/// ```json
/// {"status": "ok"}
/// ```
pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Start a new signing request.
///
/// The CSR may be base64 DER or PEM. Returns the vault request id as a JSON
/// string.
#[tracing::instrument(name = "StartSigningRequest", skip(state, auth, body))]
pub async fn start_signing_request(
    State(state): State<Arc<AppState>>,
    auth: Authorized<CanWrite>,
    body: Result<Json<StartSigningRequestApiModel>, JsonRejection>,
) -> Result<Json<String>, AppError> {
    let Json(request) = json_body(body)?;
    validate(&request)?;
    let signing_request = request
        .to_service_model()
        .map_err(AppError::ValidationError)?;

    tracing::debug!(
        "[service] {} starts signing request for application {}",
        auth.caller.role,
        signing_request.application_id
    );

    let request_id = state
        .certificate_requests
        .start_signing_request(signing_request)
        .await?;

    Ok(Json(request_id))
}

/// Start a new key pair request.
#[tracing::instrument(name = "StartNewKeyPairRequest", skip(state, auth, body))]
pub async fn start_new_key_pair_request(
    State(state): State<Arc<AppState>>,
    auth: Authorized<CanWrite>,
    body: Result<Json<StartNewKeyPairRequestApiModel>, JsonRejection>,
) -> Result<Json<String>, AppError> {
    let Json(request) = json_body(body)?;
    validate(&request)?;

    tracing::debug!(
        "[service] {} starts key pair request for application {}",
        auth.caller.role,
        request.application_id
    );

    let request_id = state
        .certificate_requests
        .start_new_key_pair_request(request.to_service_model())
        .await?;

    Ok(Json(request_id))
}

/// Approve or reject a request, acting on behalf of the caller.
#[tracing::instrument(name = "ApproveCertificateRequest", skip(state, auth, path))]
pub async fn approve_certificate_request(
    State(state): State<Arc<AppState>>,
    auth: Authorized<CanManage>,
    path: Result<Path<(String, bool)>, PathRejection>,
) -> Result<(), AppError> {
    let Path((request_id, rejected)) = path_params(path)?;

    tracing::info!(
        "[service] {} request {} (by {})",
        if rejected { "rejecting" } else { "approving" },
        request_id,
        auth.caller.role
    );

    let on_behalf_of = state.certificate_requests.on_behalf_of(&auth.caller);
    on_behalf_of.approve(&request_id, rejected).await?;

    Ok(())
}

/// Accept a request; the vault may then delete the private key.
#[tracing::instrument(name = "AcceptCertificateRequest", skip(state, _auth))]
pub async fn accept_certificate_request(
    State(state): State<Arc<AppState>>,
    _auth: Authorized<CanWrite>,
    Path(request_id): Path<String>,
) -> Result<(), AppError> {
    state.certificate_requests.accept(&request_id).await?;
    Ok(())
}

/// Query all certificate requests.
#[tracing::instrument(name = "QueryRequests", skip(state, _auth))]
pub async fn query_requests(
    State(state): State<Arc<AppState>>,
    _auth: Authorized<CanRead>,
) -> Result<Json<CertificateRequestRecordQueryResponseApiModel>, AppError> {
    let results = state.certificate_requests.query(None, None).await?;
    Ok(Json(CertificateRequestRecordQueryResponseApiModel::new(
        results,
    )))
}

/// Query certificate requests of one application.
#[tracing::instrument(name = "QueryAppRequests", skip(state, _auth))]
pub async fn query_app_requests(
    State(state): State<Arc<AppState>>,
    _auth: Authorized<CanRead>,
    Path(app_id): Path<String>,
) -> Result<Json<CertificateRequestRecordQueryResponseApiModel>, AppError> {
    let results = state.certificate_requests.query(Some(&app_id), None).await?;
    Ok(Json(CertificateRequestRecordQueryResponseApiModel::new(
        results,
    )))
}

/// Query certificate requests in one state, e.g. `/state/approved`.
#[tracing::instrument(name = "QueryStateRequests", skip(state, _auth))]
pub async fn query_state_requests(
    State(state): State<Arc<AppState>>,
    _auth: Authorized<CanRead>,
    Path(request_state): Path<String>,
) -> Result<Json<CertificateRequestRecordQueryResponseApiModel>, AppError> {
    let request_state: CertificateRequestState =
        request_state.parse().map_err(AppError::ValidationError)?;
    let results = state
        .certificate_requests
        .query(None, Some(request_state))
        .await?;
    Ok(Json(CertificateRequestRecordQueryResponseApiModel::new(
        results,
    )))
}

/// Read a certificate request.
#[tracing::instrument(name = "ReadCertificateRequest", skip(state, _auth))]
pub async fn read_certificate_request(
    State(state): State<Arc<AppState>>,
    _auth: Authorized<CanRead>,
    Path(request_id): Path<String>,
) -> Result<Json<CertificateRequestRecordApiModel>, AppError> {
    let result = state.certificate_requests.read(&request_id).await?;
    Ok(Json(CertificateRequestRecordApiModel::new(&request_id, result)))
}

/// Complete a certificate request and fetch its result.
///
/// Certificate and private key are only present once the vault approved the
/// request.
#[tracing::instrument(name = "FinishRequest", skip(state, _auth))]
pub async fn finish_request(
    State(state): State<Arc<AppState>>,
    _auth: Authorized<CanWrite>,
    Path((request_id, application_id)): Path<(String, String)>,
) -> Result<Json<FinishRequestApiModel>, AppError> {
    let result = state
        .certificate_requests
        .finish_request(&request_id, &application_id)
        .await?;

    tracing::debug!("[service] request {} finished in state {}", request_id, result.state);

    Ok(Json(FinishRequestApiModel::new(
        &request_id,
        &application_id,
        result,
    )))
}

fn validate(request: &impl Validate) -> Result<(), AppError> {
    request.validate().map_err(|e| {
        tracing::error!("[service] validation failed: {}", e);
        AppError::ValidationError(e.to_string())
    })
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<Json<T>, AppError> {
    body.map_err(|rejection| {
        tracing::warn!("[service] rejected request body: {}", rejection.body_text());
        if rejection.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::ValidationError(rejection.body_text())
        }
    })
}

fn path_params<T>(path: Result<Path<T>, PathRejection>) -> Result<Path<T>, AppError> {
    path.map_err(|rejection| AppError::ValidationError(rejection.body_text()))
}
