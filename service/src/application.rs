// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use crate::configuration::ServiceOptions;
use crate::constants::{
    BUFFER_CAPACITY, MAX_REQUEST_BODY_SIZE, RATE_LIMIT_PERIOD, RATE_LIMIT_REQUESTS,
};
use crate::errors::AppError;
use crate::routes;
use crate::vault::CertificateRequests;
use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::serve::Serve;
use axum::{BoxError, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower::buffer::BufferLayer;
use tower::limit::RateLimitLayer;
use tower::load_shed::LoadShedLayer;
use tower::load_shed::error::Overloaded;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub options: ServiceOptions,
    pub certificate_requests: Arc<dyn CertificateRequests>,
}

pub struct Application {
    port: u16,
    server: Serve<TcpListener, Router, Router>,
}

impl Application {
    pub async fn build(
        options: ServiceOptions,
        certificate_requests: Arc<dyn CertificateRequests>,
    ) -> Result<Self, std::io::Error> {
        let address = format!("{}:{}", options.host, options.port);
        let listener = TcpListener::bind(address).await?;
        let server = run(listener, options.clone(), certificate_requests)?;
        let port = server.local_addr()?.port();

        tracing::info!("[service] listening at http://{}:{}", options.host, port);

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

#[tracing::instrument(skip(listener, certificate_requests))]
pub fn run(
    listener: TcpListener,
    options: ServiceOptions,
    certificate_requests: Arc<dyn CertificateRequests>,
) -> Result<Serve<TcpListener, Router, Router>, std::io::Error> {
    let app = create_router(options, certificate_requests);
    Ok(axum::serve(listener, app))
}

/// Builds the controller router with the production middleware stack:
/// body limit, load shedding, rate limit, request timeout and HTTP tracing.
pub fn create_router(
    options: ServiceOptions,
    certificate_requests: Arc<dyn CertificateRequests>,
) -> Router {
    if !options.auth_required {
        tracing::warn!("[service] authorization is disabled, all callers are administrators");
    }

    let request_timeout = options.request_timeout();
    let state = Arc::new(AppState {
        options,
        certificate_requests,
    });

    let requests = Router::new()
        .route("/v1/request", get(routes::query_requests))
        .route("/v1/request/sign", post(routes::start_signing_request))
        .route("/v1/request/newkeypair", post(routes::start_new_key_pair_request))
        .route("/v1/request/app/{appId}", get(routes::query_app_requests))
        .route("/v1/request/state/{state}", get(routes::query_state_requests))
        .route("/v1/request/{requestId}", get(routes::read_certificate_request))
        .route(
            "/v1/request/{requestId}/accept",
            post(routes::accept_certificate_request),
        )
        .route(
            "/v1/request/{requestId}/approve/{rejected}",
            post(routes::approve_certificate_request),
        )
        .route(
            "/v1/request/{requestId}/{applicationId}/finish",
            post(routes::finish_request),
        )
        .with_state(state);

    Router::new()
        .route("/health", get(routes::health))
        .merge(requests)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(LoadShedLayer::new())
                .layer(BufferLayer::new(BUFFER_CAPACITY))
                .layer(RateLimitLayer::new(RATE_LIMIT_REQUESTS, RATE_LIMIT_PERIOD))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
}

async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        tracing::warn!("[service] request timed out");
        AppError::Timeout
    } else if err.is::<Overloaded>() {
        tracing::warn!("[service] shedding load, request buffer is full");
        AppError::Overloaded
    } else {
        tracing::error!("[service] middleware error: {:?}", err);
        AppError::InternalServerError
    }
}
