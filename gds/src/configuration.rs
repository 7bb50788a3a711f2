// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::constants::{DEFAULT_NAMESPACE_INDEX, DEFAULT_VAULT_URL};
use crate::models::Secret;
use crate::node_id::NodeId;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct GdsOptions {
    /// Base URL of the vault service.
    #[arg(long, default_value = DEFAULT_VAULT_URL, env("OPCVAULT_URL"))]
    pub url: String,
    #[arg(long, env("OPCVAULT_TOKEN"))]
    pub token: Option<Secret>,
    /// Namespace of the vault-backed application and request nodes.
    #[arg(long, default_value_t = DEFAULT_NAMESPACE_INDEX, env("OPCVAULT_NAMESPACE_INDEX"))]
    pub namespace_index: u16,
    #[command(subcommand)]
    pub command: Command,
}

/// Node ids use the OPC UA text form, e.g. `ns=2;s=app-1`.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Submit a PKCS#10 signing request read from a DER or PEM file.
    Sign {
        #[arg(long)]
        application_id: NodeId,
        #[arg(long)]
        certificate_group_id: String,
        #[arg(long)]
        certificate_type_id: String,
        #[arg(long)]
        csr: PathBuf,
        #[arg(long)]
        authority_id: Option<String>,
    },
    /// Ask the vault to generate a key pair and certificate.
    NewKeyPair {
        #[arg(long)]
        application_id: NodeId,
        #[arg(long)]
        certificate_group_id: String,
        #[arg(long)]
        certificate_type_id: String,
        #[arg(long)]
        subject_name: String,
        #[arg(long = "domain-name")]
        domain_names: Vec<String>,
        #[arg(long, default_value = "PFX")]
        private_key_format: String,
        #[arg(long, env("OPCVAULT_PRIVATE_KEY_PASSWORD"))]
        private_key_password: Option<Secret>,
        #[arg(long)]
        authority_id: Option<String>,
    },
    Approve {
        #[arg(long)]
        request_id: NodeId,
        #[arg(long)]
        reject: bool,
    },
    Accept {
        #[arg(long)]
        request_id: NodeId,
    },
    /// Fetch the outcome of a request.
    Finish {
        #[arg(long)]
        application_id: NodeId,
        #[arg(long)]
        request_id: NodeId,
    },
    Read {
        #[arg(long)]
        application_id: NodeId,
        #[arg(long)]
        request_id: NodeId,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_finish_command() {
        let options = GdsOptions::try_parse_from([
            "opcvault-gds",
            "--url",
            "http://vault.local",
            "finish",
            "--application-id",
            "ns=2;s=app-1",
            "--request-id",
            "ns=2;s=req-1",
        ])
        .unwrap();

        assert_eq!(options.url, "http://vault.local");
        let Command::Finish {
            application_id,
            request_id,
        } = options.command
        else {
            panic!("expected finish");
        };
        assert_eq!(application_id, NodeId::string(2, "app-1"));
        assert_eq!(request_id, NodeId::string(2, "req-1"));
    }

    #[test]
    fn test_parse_new_key_pair_domain_names() {
        let options = GdsOptions::try_parse_from([
            "opcvault-gds",
            "--namespace-index",
            "3",
            "new-key-pair",
            "--application-id",
            "ns=3;s=app-1",
            "--certificate-group-id",
            "Default",
            "--certificate-type-id",
            "RsaSha256ApplicationCertificateType",
            "--subject-name",
            "CN=Test",
            "--domain-name",
            "a.example.com",
            "--domain-name",
            "b.example.com",
        ])
        .unwrap();

        assert_eq!(options.namespace_index, 3);
        let Command::NewKeyPair {
            domain_names,
            private_key_format,
            ..
        } = options.command
        else {
            panic!("expected new-key-pair");
        };
        assert_eq!(domain_names, vec!["a.example.com", "b.example.com"]);
        assert_eq!(private_key_format, "PFX");
    }

    #[test]
    fn test_rejects_malformed_node_id() {
        let result = GdsOptions::try_parse_from([
            "opcvault-gds",
            "accept",
            "--request-id",
            "req-1",
        ]);
        assert!(result.is_err());
    }
}
