// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

#![allow(dead_code)]

/// `true` when running a CI build for a pull request, which has no access to
/// vault credentials.
pub fn is_pull_request() -> bool {
    std::env::var("TRAVIS_PULL_REQUEST").is_ok_and(|value| names_pull_request(&value))
}

/// CI sets the variable to the pull request number, or to `false`.
pub fn names_pull_request(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.eq_ignore_ascii_case("false")
}

/// URL of a live vault to test against, if one is configured and usable.
pub fn live_vault_url() -> Option<String> {
    if is_pull_request() {
        return None;
    }
    std::env::var("OPCVAULT_TEST_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

pub fn live_vault_token() -> Option<String> {
    std::env::var("OPCVAULT_TEST_TOKEN").ok().filter(|token| !token.is_empty())
}
