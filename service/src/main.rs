// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use clap::Parser;
use opcvault_service::application::Application;
use opcvault_service::configuration::ServiceOptions;
use opcvault_service::remote::RemoteCertificateRequests;
use std::{io::Error, sync::Arc};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        // this needs to be set to remove duplicated information in the log.
        .with_current_span(false)
        // ANSI color codes are noise in collected JSON logs.
        .with_ansi(false)
        // remove the name of the function from every log entry
        .with_target(false)
        .init();

    // get configuration options from arguments or environment variables
    let options = ServiceOptions::parse();

    tracing::info!("[service] {:?}", &options);

    if options.auth_required && options.api_keys.is_empty() {
        tracing::warn!("[service] no api keys configured, every request will be rejected");
    }

    let certificate_requests =
        RemoteCertificateRequests::new(&options.backend_url, options.backend_token.clone())
            .map_err(Error::other)?;

    tracing::info!("[service] forwarding requests to {}", options.backend_url);

    let application = Application::build(options, Arc::new(certificate_requests)).await?;

    application.run_until_stopped().await
}
