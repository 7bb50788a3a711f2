// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use data_encoding::BASE64;
use opcvault_gds::certificate_request::{
    CertificateRequest, NewKeyPairParameters, OpcVaultCertificateRequest,
};
use opcvault_gds::client::OpcVaultClient;
use opcvault_gds::configuration::{Command, GdsOptions};
use opcvault_gds::constants::VAULT_TIMEOUT;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

const CSR_PEM_TAGS: [&str; 2] = ["CERTIFICATE REQUEST", "NEW CERTIFICATE REQUEST"];

/// Accepts a DER file as is, or a PEM encoded certificate request.
fn decode_der_or_pem(contents: &[u8]) -> Result<Vec<u8>> {
    if !contents.starts_with(b"-----BEGIN") {
        return Ok(contents.to_vec());
    }

    let block = pem::parse(contents).context("invalid PEM file")?;
    if !CSR_PEM_TAGS.contains(&block.tag()) {
        return Err(anyhow!("PEM block {:?} is not a certificate request", block.tag()));
    }
    Ok(block.contents().to_vec())
}

async fn execute(provider: &OpcVaultCertificateRequest, command: Command) -> Result<Value> {
    let output = match command {
        Command::Sign {
            application_id,
            certificate_group_id,
            certificate_type_id,
            csr,
            authority_id,
        } => {
            let contents = tokio::fs::read(&csr)
                .await
                .with_context(|| format!("failed to read {}", csr.display()))?;
            let certificate_request = decode_der_or_pem(&contents)?;
            let request_id = provider
                .start_signing_request(
                    &application_id,
                    &certificate_group_id,
                    &certificate_type_id,
                    &certificate_request,
                    authority_id.as_deref(),
                )
                .await?;
            json!({ "requestId": request_id.to_string() })
        }
        Command::NewKeyPair {
            application_id,
            certificate_group_id,
            certificate_type_id,
            subject_name,
            domain_names,
            private_key_format,
            private_key_password,
            authority_id,
        } => {
            let request_id = provider
                .start_new_key_pair_request(NewKeyPairParameters {
                    application_id,
                    certificate_group_id,
                    certificate_type_id,
                    subject_name,
                    domain_names,
                    private_key_format,
                    private_key_password,
                    authority_id,
                })
                .await?;
            json!({ "requestId": request_id.to_string() })
        }
        Command::Approve { request_id, reject } => {
            provider.approve_request(&request_id, reject).await?;
            json!({ "requestId": request_id.to_string(), "rejected": reject })
        }
        Command::Accept { request_id } => {
            provider.accept_request(&request_id, &[]).await?;
            json!({ "requestId": request_id.to_string(), "accepted": true })
        }
        Command::Finish {
            application_id,
            request_id,
        } => {
            let result = provider.finish_request(&application_id, &request_id).await?;
            json!({
                "requestId": request_id.to_string(),
                "state": result.state,
                "certificateGroupId": result.certificate_group_id,
                "certificateTypeId": result.certificate_type_id,
                "signedCertificate": result.signed_certificate.as_deref().map(|c| BASE64.encode(c)),
                "privateKey": result.private_key.as_ref().map(|k| BASE64.encode(k.as_bytes())),
            })
        }
        Command::Read {
            application_id,
            request_id,
        } => {
            let result = provider.read_request(&application_id, &request_id).await?;
            json!({
                "requestId": request_id.to_string(),
                "state": result.state,
                "certificateGroupId": result.certificate_group_id,
                "certificateTypeId": result.certificate_type_id,
                "subjectName": result.subject_name,
                "domainNames": result.domain_names,
                "privateKeyFormat": result.private_key_format,
            })
        }
    };

    Ok(output)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        // stdout carries the command result
        .with_writer(std::io::stderr)
        .with_current_span(false)
        .with_ansi(false)
        .with_target(false)
        .init();

    let options = GdsOptions::parse();

    tracing::info!("[gds] {:?}", &options);

    let client = OpcVaultClient::new(&options.url, options.token.clone(), VAULT_TIMEOUT)?;
    let mut provider = OpcVaultCertificateRequest::new(Arc::new(client), options.namespace_index);
    provider.initialize();

    let output = execute(&provider, options.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
