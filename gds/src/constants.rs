// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::time::Duration;

pub const DEFAULT_VAULT_URL: &str = "http://127.0.0.1:8080";

/// Namespace the GDS assigns to vault-backed nodes unless configured otherwise.
pub const DEFAULT_NAMESPACE_INDEX: u16 = 2;

pub const VAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum characters of a vault error body kept in error messages
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 512;

pub const REQUEST_ROUTE_SEGMENTS: [&str; 2] = ["v1", "request"];

pub const INVALID_APPLICATION_ID: &str = "The ApplicationId is invalid.";
pub const INVALID_REQUEST_ID: &str = "The RequestId is invalid.";
pub const UNSUPPORTED_CERTIFICATE_TYPE: &str =
    "The CertificateTypeId does not refer to a supported CertificateType.";
pub const UNSUPPORTED_CERTIFICATE_GROUP: &str =
    "The CertificateGroupId does not refer to a supported CertificateGroup.";
pub const APPLICATION_ID_MISMATCH: &str = "The ApplicationId does not match the request.";
