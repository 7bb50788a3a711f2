// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::time::Duration;

/// Path segments the request controller is mounted under (`/v1/request`).
pub const REQUEST_ROUTE_SEGMENTS: [&str; 2] = ["v1", "request"];

pub const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024; // 1 MiB
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const RATE_LIMIT_REQUESTS: u64 = 100;
pub const RATE_LIMIT_PERIOD: Duration = Duration::from_secs(1);
pub const BUFFER_CAPACITY: usize = 1024;

pub const BACKEND_TIMEOUT: Duration = Duration::from_secs(20);

// Validation constants for request models
pub const MAX_ID_LENGTH: u64 = 256;
pub const MAX_SUBJECT_NAME_LENGTH: u64 = 1024;
pub const MAX_DOMAIN_NAME_LENGTH: usize = 253;
pub const MAX_DOMAIN_NAMES_COUNT: usize = 100;
pub const MAX_PASSWORD_LENGTH: u64 = 1024;
pub const MAX_CERTIFICATE_REQUEST_LENGTH: u64 = 64 * 1024;

/// PEM labels accepted for PKCS#10 requests
pub const CSR_PEM_TAGS: [&str; 2] = ["CERTIFICATE REQUEST", "NEW CERTIFICATE REQUEST"];
