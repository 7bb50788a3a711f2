// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! # OPC Vault Service
//!
//! REST gateway for OPC UA certificate requests.
//!
//! This crate exposes the certificate request controller used by Global
//! Discovery Servers and operators. Every call is authorized against a policy
//! and forwarded to the certificate vault backend, which owns the signing
//! request workflow.
//!
//! ## Architecture
//!
//! ```text
//! GDS / operator -> HTTP API -> Service (this crate) -> HTTP -> Vault backend
//! ```
//!
//! ## Modules
//!
//! - [`application`]: HTTP server setup with Axum, rate limiting, and timeouts
//! - [`auth`]: Bearer token authentication and `CanRead`/`CanWrite`/`CanManage` policies
//! - [`configuration`]: CLI argument parsing with clap
//! - [`constants`]: Configuration constants for the application
//! - [`errors`]: Application error types with HTTP response mapping
//! - [`models`]: REST request/response models with validation
//! - [`remote`]: reqwest client for the vault backend
//! - [`routes`]: HTTP route handlers for `/v1/request`
//! - [`vault`]: The vault client interface and service models
//!
//! ## Usage
//!
//! ```bash
//! opcvault-service --port 8080 --backend-url http://vault:9090 \
//!     --api-keys writer:w-token,approver:a-token
//! ```
//!
//! ## Security Considerations
//!
//! - Tokens, passwords and private keys are zeroized on drop and redacted in logs
//! - Request validation enforces strict size limits
//! - Rate limiting (100 req/s) and load shedding protect the vault backend
//! - Request timeout (30 seconds by default) prevents resource exhaustion

pub mod application;
pub mod auth;
pub mod configuration;
pub mod constants;
pub mod errors;
pub mod models;
pub mod remote;
pub mod routes;
pub mod vault;
