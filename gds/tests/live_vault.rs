// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Smoke tests against a deployed vault.
//!
//! Set `OPCVAULT_TEST_URL` (and `OPCVAULT_TEST_TOKEN` when the vault requires
//! one) to run them. They are skipped for pull request builds.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use opcvault_gds::certificate_request::{CertificateRequest, OpcVaultCertificateRequest};
use opcvault_gds::client::OpcVaultClient;
use opcvault_gds::constants::{DEFAULT_NAMESPACE_INDEX, VAULT_TIMEOUT};
use opcvault_gds::models::Secret;
use opcvault_gds::node_id::NodeId;
use opcvault_gds::status::StatusCode;

#[test]
fn test_pull_request_variable_is_case_insensitive() {
    assert!(common::names_pull_request("42"));
    assert!(!common::names_pull_request("false"));
    assert!(!common::names_pull_request("False"));
    assert!(!common::names_pull_request("FALSE"));
    assert!(!common::names_pull_request(""));
}

fn live_provider() -> Option<OpcVaultCertificateRequest> {
    let url = common::live_vault_url()?;
    let token = common::live_vault_token().map(Secret::new);
    let client = OpcVaultClient::new(&url, token, VAULT_TIMEOUT).unwrap();
    Some(OpcVaultCertificateRequest::new(
        Arc::new(client),
        DEFAULT_NAMESPACE_INDEX,
    ))
}

#[tokio::test]
async fn test_finish_unknown_request_is_not_found() {
    let Some(provider) = live_provider() else {
        eprintln!("skipping: no live vault configured");
        return;
    };

    let application_id = NodeId::string(DEFAULT_NAMESPACE_INDEX, "opcvault-live-test-app");
    let request_id = NodeId::string(DEFAULT_NAMESPACE_INDEX, "opcvault-live-test-missing");

    let err = provider
        .finish_request(&application_id, &request_id)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BadNotFound);
}

#[tokio::test]
async fn test_start_signing_request_rejects_unknown_application() {
    let Some(provider) = live_provider() else {
        eprintln!("skipping: no live vault configured");
        return;
    };

    let err = provider
        .start_signing_request(
            &NodeId::numeric(DEFAULT_NAMESPACE_INDEX, 1),
            "Default",
            "RsaSha256ApplicationCertificateType",
            &[0x30],
            None,
        )
        .await
        .unwrap_err();
    // numeric ids never reach the vault
    assert_eq!(err.status, StatusCode::BadNotFound);
}
