// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! GDS certificate request provider backed by the vault service.
//!
//! Every operation maps the GDS node ids onto vault ids, validates the
//! arguments the GDS cannot check itself, calls the vault, and translates
//! vault failures into [`ServiceResultError`]s.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use data_encoding::BASE64;
use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::client::OpcVault;
use crate::constants::{
    APPLICATION_ID_MISMATCH, INVALID_APPLICATION_ID, INVALID_REQUEST_ID,
    UNSUPPORTED_CERTIFICATE_GROUP, UNSUPPORTED_CERTIFICATE_TYPE,
};
use crate::errors::{Operation, ServiceResultError};
use crate::models::{CreateNewKeyPairRequestApiModel, CreateSigningRequestApiModel, Secret};
use crate::node_id::{NodeId, node_id_from_service_id, service_id_from_node_id};
use crate::status::StatusCode;

/// Request states visible to the GDS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CertificateRequestState {
    New,
    Approved,
    Rejected,
    Accepted,
}

impl FromStr for CertificateRequestState {
    type Err = ServiceResultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "accepted" => Ok(Self::Accepted),
            _ => Err(ServiceResultError::new(
                StatusCode::BadInvalidState,
                format!("The certificate request is in an unsupported state {s:?}."),
            )),
        }
    }
}

/// Private key material issued with a new key pair.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(Vec<u8>);

impl PrivateKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct NewKeyPairParameters {
    pub application_id: NodeId,
    pub certificate_group_id: String,
    pub certificate_type_id: String,
    pub subject_name: String,
    pub domain_names: Vec<String>,
    pub private_key_format: String,
    pub private_key_password: Option<Secret>,
    pub authority_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishRequestResult {
    pub state: CertificateRequestState,
    pub certificate_group_id: Option<String>,
    pub certificate_type_id: Option<String>,
    pub signed_certificate: Option<Vec<u8>>,
    pub private_key: Option<PrivateKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequestResult {
    pub state: CertificateRequestState,
    pub certificate_group_id: String,
    pub certificate_type_id: String,
    pub certificate_request: Option<Vec<u8>>,
    pub subject_name: Option<String>,
    pub domain_names: Option<Vec<String>>,
    pub private_key_format: Option<String>,
    pub private_key_password: Option<Secret>,
}

#[async_trait]
pub trait CertificateRequest: Send + Sync {
    fn initialize(&mut self);

    fn namespace_index(&self) -> u16;

    fn set_namespace_index(&mut self, namespace_index: u16);

    async fn start_signing_request(
        &self,
        application_id: &NodeId,
        certificate_group_id: &str,
        certificate_type_id: &str,
        certificate_request: &[u8],
        authority_id: Option<&str>,
    ) -> Result<NodeId, ServiceResultError>;

    async fn start_new_key_pair_request(
        &self,
        parameters: NewKeyPairParameters,
    ) -> Result<NodeId, ServiceResultError>;

    async fn approve_request(
        &self,
        request_id: &NodeId,
        is_rejected: bool,
    ) -> Result<(), ServiceResultError>;

    async fn accept_request(
        &self,
        request_id: &NodeId,
        signed_certificate: &[u8],
    ) -> Result<(), ServiceResultError>;

    async fn finish_request(
        &self,
        application_id: &NodeId,
        request_id: &NodeId,
    ) -> Result<FinishRequestResult, ServiceResultError>;

    async fn read_request(
        &self,
        application_id: &NodeId,
        request_id: &NodeId,
    ) -> Result<ReadRequestResult, ServiceResultError>;
}

pub struct OpcVaultCertificateRequest {
    vault: Arc<dyn OpcVault>,
    namespace_index: u16,
}

impl OpcVaultCertificateRequest {
    pub fn new(vault: Arc<dyn OpcVault>, namespace_index: u16) -> Self {
        Self {
            vault,
            namespace_index,
        }
    }

    fn service_id(
        &self,
        node_id: &NodeId,
        status: StatusCode,
        message: &str,
    ) -> Result<String, ServiceResultError> {
        service_id_from_node_id(node_id, self.namespace_index)
            .ok_or_else(|| ServiceResultError::new(status, message))
    }

    fn request_and_application_ids(
        &self,
        application_id: &NodeId,
        request_id: &NodeId,
    ) -> Result<(String, String), ServiceResultError> {
        let request_id =
            self.service_id(request_id, StatusCode::BadInvalidArgument, INVALID_REQUEST_ID)?;
        let application_id = self.service_id(
            application_id,
            StatusCode::BadInvalidArgument,
            INVALID_APPLICATION_ID,
        )?;
        Ok((request_id, application_id))
    }
}

fn check_certificate_ids(
    certificate_group_id: &str,
    certificate_type_id: &str,
) -> Result<(), ServiceResultError> {
    if certificate_type_id.trim().is_empty() {
        return Err(ServiceResultError::new(
            StatusCode::BadInvalidArgument,
            UNSUPPORTED_CERTIFICATE_TYPE,
        ));
    }
    if certificate_group_id.trim().is_empty() {
        return Err(ServiceResultError::new(
            StatusCode::BadInvalidArgument,
            UNSUPPORTED_CERTIFICATE_GROUP,
        ));
    }
    Ok(())
}

fn decode(field: &str, value: &str) -> Result<Vec<u8>, ServiceResultError> {
    BASE64.decode(value.as_bytes()).map_err(|err| {
        ServiceResultError::new(
            StatusCode::BadDecodingError,
            format!("The {field} returned by the vault is not valid base64: {err}"),
        )
    })
}

#[async_trait]
impl CertificateRequest for OpcVaultCertificateRequest {
    fn initialize(&mut self) {}

    fn namespace_index(&self) -> u16 {
        self.namespace_index
    }

    fn set_namespace_index(&mut self, namespace_index: u16) {
        self.namespace_index = namespace_index;
    }

    #[tracing::instrument(name = "StartSigningRequest", skip(self, certificate_request))]
    async fn start_signing_request(
        &self,
        application_id: &NodeId,
        certificate_group_id: &str,
        certificate_type_id: &str,
        certificate_request: &[u8],
        authority_id: Option<&str>,
    ) -> Result<NodeId, ServiceResultError> {
        let application_id =
            self.service_id(application_id, StatusCode::BadNotFound, INVALID_APPLICATION_ID)?;
        check_certificate_ids(certificate_group_id, certificate_type_id)?;

        let model = CreateSigningRequestApiModel {
            application_id,
            certificate_group_id: certificate_group_id.to_string(),
            certificate_type_id: certificate_type_id.to_string(),
            certificate_request: BASE64.encode(certificate_request),
            authority_id: authority_id.map(str::to_string),
        };

        let request_id = self
            .vault
            .create_signing_request(&model)
            .await
            .map_err(|err| ServiceResultError::from_vault(Operation::StartSigningRequest, err))?;

        tracing::info!("[gds] created signing request {}", request_id);
        Ok(node_id_from_service_id(&request_id, self.namespace_index))
    }

    #[tracing::instrument(name = "StartNewKeyPairRequest", skip(self, parameters))]
    async fn start_new_key_pair_request(
        &self,
        parameters: NewKeyPairParameters,
    ) -> Result<NodeId, ServiceResultError> {
        let application_id = self.service_id(
            &parameters.application_id,
            StatusCode::BadInvalidArgument,
            INVALID_APPLICATION_ID,
        )?;
        check_certificate_ids(
            &parameters.certificate_group_id,
            &parameters.certificate_type_id,
        )?;

        let model = CreateNewKeyPairRequestApiModel {
            application_id,
            certificate_group_id: parameters.certificate_group_id,
            certificate_type_id: parameters.certificate_type_id,
            subject_name: parameters.subject_name,
            domain_names: parameters.domain_names,
            private_key_format: parameters.private_key_format,
            private_key_password: parameters.private_key_password,
            authority_id: parameters.authority_id,
        };

        let request_id = self
            .vault
            .create_new_key_pair_request(&model)
            .await
            .map_err(|err| {
                ServiceResultError::from_vault(Operation::StartNewKeyPairRequest, err)
            })?;

        tracing::info!("[gds] created new key pair request {}", request_id);
        Ok(node_id_from_service_id(&request_id, self.namespace_index))
    }

    #[tracing::instrument(name = "ApproveRequest", skip(self))]
    async fn approve_request(
        &self,
        request_id: &NodeId,
        is_rejected: bool,
    ) -> Result<(), ServiceResultError> {
        let request_id =
            self.service_id(request_id, StatusCode::BadInvalidArgument, INVALID_REQUEST_ID)?;

        self.vault
            .approve_certificate_request(&request_id, is_rejected)
            .await
            .map_err(|err| ServiceResultError::from_vault(Operation::ApproveRequest, err))
    }

    /// The vault already holds the signed certificate, so it is not sent.
    #[tracing::instrument(name = "AcceptRequest", skip(self, _signed_certificate))]
    async fn accept_request(
        &self,
        request_id: &NodeId,
        _signed_certificate: &[u8],
    ) -> Result<(), ServiceResultError> {
        let request_id =
            self.service_id(request_id, StatusCode::BadInvalidArgument, INVALID_REQUEST_ID)?;

        self.vault
            .accept_certificate_request(&request_id)
            .await
            .map_err(|err| ServiceResultError::from_vault(Operation::AcceptRequest, err))
    }

    #[tracing::instrument(name = "FinishRequest", skip(self))]
    async fn finish_request(
        &self,
        application_id: &NodeId,
        request_id: &NodeId,
    ) -> Result<FinishRequestResult, ServiceResultError> {
        let (request_id, application_id) =
            self.request_and_application_ids(application_id, request_id)?;

        let response = self
            .vault
            .fetch_certificate_request_result(&request_id, &application_id)
            .await
            .map_err(|err| ServiceResultError::from_vault(Operation::FinishRequest, err))?;

        let state: CertificateRequestState = response.state.parse()?;
        if state != CertificateRequestState::Approved {
            return Ok(FinishRequestResult {
                state,
                certificate_group_id: None,
                certificate_type_id: None,
                signed_certificate: None,
                private_key: None,
            });
        }

        let signed_certificate = response
            .signed_certificate
            .as_deref()
            .map(|value| decode("signed certificate", value))
            .transpose()?;
        let private_key = response
            .private_key
            .as_deref()
            .map(|value| decode("private key", value).map(PrivateKey))
            .transpose()?;

        Ok(FinishRequestResult {
            state,
            certificate_group_id: response.certificate_group_id,
            certificate_type_id: response.certificate_type_id,
            signed_certificate,
            private_key,
        })
    }

    #[tracing::instrument(name = "ReadRequest", skip(self))]
    async fn read_request(
        &self,
        application_id: &NodeId,
        request_id: &NodeId,
    ) -> Result<ReadRequestResult, ServiceResultError> {
        let (request_id, application_id) =
            self.request_and_application_ids(application_id, request_id)?;

        let record = self
            .vault
            .read_certificate_request(&request_id)
            .await
            .map_err(|err| ServiceResultError::from_vault(Operation::ReadRequest, err))?;

        if record.application_id != application_id {
            return Err(ServiceResultError::new(
                StatusCode::BadInvalidArgument,
                APPLICATION_ID_MISMATCH,
            ));
        }

        Ok(ReadRequestResult {
            state: record.state.parse()?,
            certificate_group_id: record.certificate_group_id,
            certificate_type_id: record.certificate_type_id,
            certificate_request: None,
            subject_name: record.subject_name,
            domain_names: record.domain_names,
            private_key_format: record.private_key_format,
            private_key_password: None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::errors::VaultClientError;
    use crate::models::{CertificateRequestRecordApiModel, FetchRequestResultApiModel};

    const NS: u16 = 2;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Sign(CreateSigningRequestApiModel),
        NewKeyPair(String),
        Approve(String, bool),
        Accept(String),
        Fetch(String, String),
        Read(String),
    }

    #[derive(Default)]
    struct FakeVault {
        calls: Mutex<Vec<Call>>,
        failure: Option<u16>,
        state: Option<&'static str>,
    }

    impl FakeVault {
        fn failing(status: u16) -> Self {
            Self {
                failure: Some(status),
                ..Default::default()
            }
        }

        fn in_state(state: &'static str) -> Self {
            Self {
                state: Some(state),
                ..Default::default()
            }
        }

        fn record(&self, call: Call) -> Result<(), VaultClientError> {
            self.calls.lock().unwrap().push(call);
            match self.failure {
                Some(status) => Err(VaultClientError::Http {
                    status,
                    message: "failure".to_string(),
                }),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OpcVault for FakeVault {
        async fn create_signing_request(
            &self,
            model: &CreateSigningRequestApiModel,
        ) -> Result<String, VaultClientError> {
            self.record(Call::Sign(model.clone()))?;
            Ok("req-1".to_string())
        }

        async fn create_new_key_pair_request(
            &self,
            model: &CreateNewKeyPairRequestApiModel,
        ) -> Result<String, VaultClientError> {
            self.record(Call::NewKeyPair(model.application_id.clone()))?;
            Ok("09087e75-8e5e-499b-954f-f2a9603db28a".to_string())
        }

        async fn approve_certificate_request(
            &self,
            request_id: &str,
            rejected: bool,
        ) -> Result<(), VaultClientError> {
            self.record(Call::Approve(request_id.to_string(), rejected))
        }

        async fn accept_certificate_request(
            &self,
            request_id: &str,
        ) -> Result<(), VaultClientError> {
            self.record(Call::Accept(request_id.to_string()))
        }

        async fn fetch_certificate_request_result(
            &self,
            request_id: &str,
            application_id: &str,
        ) -> Result<FetchRequestResultApiModel, VaultClientError> {
            self.record(Call::Fetch(request_id.to_string(), application_id.to_string()))?;
            Ok(FetchRequestResultApiModel {
                request_id: request_id.to_string(),
                application_id: application_id.to_string(),
                state: self.state.unwrap_or("Approved").to_string(),
                certificate_group_id: Some("Default".to_string()),
                certificate_type_id: Some("RsaSha256ApplicationCertificateType".to_string()),
                signed_certificate: Some("AQID".to_string()),
                private_key_format: Some("PFX".to_string()),
                private_key: Some("BAU=".to_string()),
                authority_id: None,
            })
        }

        async fn read_certificate_request(
            &self,
            request_id: &str,
        ) -> Result<CertificateRequestRecordApiModel, VaultClientError> {
            self.record(Call::Read(request_id.to_string()))?;
            Ok(CertificateRequestRecordApiModel {
                request_id: request_id.to_string(),
                application_id: "app-1".to_string(),
                state: self.state.unwrap_or("New").to_string(),
                certificate_group_id: "Default".to_string(),
                certificate_type_id: "RsaSha256ApplicationCertificateType".to_string(),
                signing_request: false,
                subject_name: Some("CN=Test".to_string()),
                domain_names: Some(vec!["host.example.com".to_string()]),
                private_key_format: Some("PEM".to_string()),
            })
        }
    }

    fn provider(vault: &Arc<FakeVault>) -> OpcVaultCertificateRequest {
        OpcVaultCertificateRequest::new(vault.clone(), NS)
    }

    fn app() -> NodeId {
        NodeId::string(NS, "app-1")
    }

    fn req() -> NodeId {
        NodeId::string(NS, "req-1")
    }

    fn key_pair_parameters(application_id: NodeId) -> NewKeyPairParameters {
        NewKeyPairParameters {
            application_id,
            certificate_group_id: "Default".to_string(),
            certificate_type_id: "RsaSha256ApplicationCertificateType".to_string(),
            subject_name: "CN=Test".to_string(),
            domain_names: vec![],
            private_key_format: "PEM".to_string(),
            private_key_password: None,
            authority_id: None,
        }
    }

    #[tokio::test]
    async fn test_start_signing_request() {
        let vault = Arc::new(FakeVault::default());
        let node = provider(&vault)
            .start_signing_request(&app(), "Default", "Rsa", &[0x30, 0x82], Some("ca"))
            .await
            .unwrap();

        assert_eq!(node, NodeId::string(NS, "req-1"));
        let Call::Sign(model) = &vault.calls()[0] else {
            panic!("expected a signing request");
        };
        assert_eq!(model.application_id, "app-1");
        assert_eq!(model.certificate_request, "MII=");
        assert_eq!(model.authority_id.as_deref(), Some("ca"));
    }

    #[tokio::test]
    async fn test_start_signing_request_validation_order() {
        let vault = Arc::new(FakeVault::default());
        let provider = provider(&vault);

        let err = provider
            .start_signing_request(&NodeId::string(9, "app-1"), "", "", &[], None)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BadNotFound);
        assert_eq!(err.message, INVALID_APPLICATION_ID);

        let err = provider
            .start_signing_request(&app(), "", " ", &[], None)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BadInvalidArgument);
        assert_eq!(err.message, UNSUPPORTED_CERTIFICATE_TYPE);

        let err = provider
            .start_signing_request(&app(), "", "Rsa", &[], None)
            .await
            .unwrap_err();
        assert_eq!(err.message, UNSUPPORTED_CERTIFICATE_GROUP);

        assert!(vault.calls().is_empty());
    }

    #[tokio::test]
    async fn test_start_signing_request_translates_vault_errors() {
        let vault = Arc::new(FakeVault::failing(500));
        let err = provider(&vault)
            .start_signing_request(&app(), "Default", "Rsa", &[1], None)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BadNotSupported);
    }

    #[tokio::test]
    async fn test_start_new_key_pair_request() {
        let vault = Arc::new(FakeVault::default());
        let node = provider(&vault)
            .start_new_key_pair_request(key_pair_parameters(app()))
            .await
            .unwrap();
        assert!(matches!(node.identifier, crate::node_id::Identifier::Guid(_)));
        assert_eq!(vault.calls(), vec![Call::NewKeyPair("app-1".to_string())]);

        let err = provider(&vault)
            .start_new_key_pair_request(key_pair_parameters(NodeId::NULL))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BadInvalidArgument);
        assert_eq!(err.message, INVALID_APPLICATION_ID);
    }

    #[tokio::test]
    async fn test_start_new_key_pair_request_unknown_application() {
        let vault = Arc::new(FakeVault::failing(404));
        let err = provider(&vault)
            .start_new_key_pair_request(key_pair_parameters(app()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BadNodeIdUnknown);
    }

    #[tokio::test]
    async fn test_approve_and_accept() {
        let vault = Arc::new(FakeVault::default());
        let provider = provider(&vault);
        provider.approve_request(&req(), true).await.unwrap();
        provider.accept_request(&req(), &[1, 2, 3]).await.unwrap();
        assert_eq!(
            vault.calls(),
            vec![
                Call::Approve("req-1".to_string(), true),
                Call::Accept("req-1".to_string())
            ]
        );

        let err = provider
            .approve_request(&NodeId::numeric(NS, 4), false)
            .await
            .unwrap_err();
        assert_eq!(err.message, INVALID_REQUEST_ID);
    }

    #[tokio::test]
    async fn test_approve_conflict_is_access_denied() {
        let vault = Arc::new(FakeVault::failing(409));
        let err = provider(&vault).approve_request(&req(), false).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BadUserAccessDenied);
    }

    #[tokio::test]
    async fn test_finish_request_approved() {
        let vault = Arc::new(FakeVault::default());
        let result = provider(&vault).finish_request(&app(), &req()).await.unwrap();

        assert_eq!(result.state, CertificateRequestState::Approved);
        assert_eq!(result.certificate_group_id.as_deref(), Some("Default"));
        assert_eq!(result.signed_certificate, Some(vec![1, 2, 3]));
        assert_eq!(result.private_key.unwrap().as_bytes(), &[4, 5]);
        assert_eq!(
            vault.calls(),
            vec![Call::Fetch("req-1".to_string(), "app-1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_finish_request_pending_returns_state_only() {
        let vault = Arc::new(FakeVault::in_state("new"));
        let result = provider(&vault).finish_request(&app(), &req()).await.unwrap();
        assert_eq!(result.state, CertificateRequestState::New);
        assert!(result.signed_certificate.is_none());
        assert!(result.private_key.is_none());
        assert!(result.certificate_group_id.is_none());
    }

    #[tokio::test]
    async fn test_finish_request_unknown_state() {
        let vault = Arc::new(FakeVault::in_state("Revoked"));
        let err = provider(&vault).finish_request(&app(), &req()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BadInvalidState);
    }

    #[tokio::test]
    async fn test_finish_request_checks_request_id_first() {
        let vault = Arc::new(FakeVault::default());
        let err = provider(&vault)
            .finish_request(&NodeId::NULL, &NodeId::NULL)
            .await
            .unwrap_err();
        assert_eq!(err.message, INVALID_REQUEST_ID);

        let err = provider(&vault)
            .finish_request(&NodeId::NULL, &req())
            .await
            .unwrap_err();
        assert_eq!(err.message, INVALID_APPLICATION_ID);
        assert!(vault.calls().is_empty());
    }

    #[tokio::test]
    async fn test_read_request() {
        let vault = Arc::new(FakeVault::default());
        let result = provider(&vault).read_request(&app(), &req()).await.unwrap();
        assert_eq!(result.state, CertificateRequestState::New);
        assert_eq!(result.subject_name.as_deref(), Some("CN=Test"));
        assert!(result.certificate_request.is_none());
        assert!(result.private_key_password.is_none());

        let err = provider(&vault)
            .read_request(&NodeId::string(NS, "app-2"), &req())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BadInvalidArgument);
        assert_eq!(err.message, APPLICATION_ID_MISMATCH);
    }

    #[test]
    fn test_namespace_index() {
        let vault = Arc::new(FakeVault::default());
        let mut provider = provider(&vault);
        provider.initialize();
        provider.set_namespace_index(5);
        assert_eq!(provider.namespace_index(), 5);
    }

    #[test]
    fn test_state_parse_is_case_insensitive() {
        assert_eq!(
            "ACCEPTED".parse::<CertificateRequestState>().unwrap(),
            CertificateRequestState::Accepted
        );
        assert!("Deleted".parse::<CertificateRequestState>().is_err());
    }
}
