// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! REST request/response models.
//!
//! Field names follow the camelCase JSON contract shared with GDS clients and
//! the vault backend. Binary payloads travel as standard base64.

use std::fmt;

use data_encoding::BASE64;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::configuration::ApiSecret;
use crate::constants::{
    CSR_PEM_TAGS, MAX_CERTIFICATE_REQUEST_LENGTH, MAX_DOMAIN_NAME_LENGTH, MAX_DOMAIN_NAMES_COUNT,
    MAX_ID_LENGTH, MAX_PASSWORD_LENGTH, MAX_SUBJECT_NAME_LENGTH,
};
use crate::vault::{
    CertificateRequestRecord, CertificateRequestState, FinishRequestResult, NewKeyPairRequest,
    PrivateKey, PrivateKeyFormat, SigningRequest,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartSigningRequestApiModel {
    #[validate(length(min = 1, max = MAX_ID_LENGTH))]
    pub application_id: String,

    #[validate(length(min = 1, max = MAX_ID_LENGTH))]
    pub certificate_group_id: String,

    #[validate(length(min = 1, max = MAX_ID_LENGTH))]
    pub certificate_type_id: String,

    /// Base64 DER or PEM encoded PKCS#10 request.
    #[validate(length(min = 1, max = MAX_CERTIFICATE_REQUEST_LENGTH))]
    pub certificate_request: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = MAX_ID_LENGTH))]
    pub authority_id: Option<String>,
}

impl StartSigningRequestApiModel {
    /// Converts to the service model, decoding the CSR to DER bytes.
    pub fn to_service_model(&self) -> Result<SigningRequest, String> {
        Ok(SigningRequest {
            application_id: self.application_id.clone(),
            certificate_group_id: self.certificate_group_id.clone(),
            certificate_type_id: self.certificate_type_id.clone(),
            certificate_request: decode_certificate_request(&self.certificate_request)?,
            authority_id: self.authority_id.clone(),
        })
    }
}

impl From<&SigningRequest> for StartSigningRequestApiModel {
    fn from(request: &SigningRequest) -> Self {
        Self {
            application_id: request.application_id.clone(),
            certificate_group_id: request.certificate_group_id.clone(),
            certificate_type_id: request.certificate_type_id.clone(),
            certificate_request: BASE64.encode(&request.certificate_request),
            authority_id: request.authority_id.clone(),
        }
    }
}

/// Decodes a CSR given either as bare base64 DER or as a PEM block.
pub fn decode_certificate_request(value: &str) -> Result<Vec<u8>, String> {
    if value.contains("-----BEGIN") {
        let block = pem::parse(value)
            .map_err(|err| format!("certificate request PEM block is invalid: {err}"))?;
        if !CSR_PEM_TAGS.contains(&block.tag()) {
            return Err(format!(
                "PEM block {:?} is not a certificate request",
                block.tag()
            ));
        }
        if block.contents().is_empty() {
            return Err("certificate request is empty".to_string());
        }
        return Ok(block.contents().to_vec());
    }

    let compact: String = value.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err("certificate request is empty".to_string());
    }

    BASE64
        .decode(compact.as_bytes())
        .map_err(|err| format!("certificate request is not valid base64: {err}"))
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartNewKeyPairRequestApiModel {
    #[validate(length(min = 1, max = MAX_ID_LENGTH))]
    pub application_id: String,

    #[validate(length(min = 1, max = MAX_ID_LENGTH))]
    pub certificate_group_id: String,

    #[validate(length(min = 1, max = MAX_ID_LENGTH))]
    pub certificate_type_id: String,

    #[validate(length(min = 1, max = MAX_SUBJECT_NAME_LENGTH))]
    pub subject_name: String,

    #[serde(default)]
    #[validate(custom(function = "validate_domain_names"))]
    pub domain_names: Vec<String>,

    pub private_key_format: PrivateKeyFormat,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_password"))]
    pub private_key_password: Option<ApiSecret>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = MAX_ID_LENGTH))]
    pub authority_id: Option<String>,
}

impl StartNewKeyPairRequestApiModel {
    pub fn to_service_model(&self) -> NewKeyPairRequest {
        NewKeyPairRequest {
            application_id: self.application_id.clone(),
            certificate_group_id: self.certificate_group_id.clone(),
            certificate_type_id: self.certificate_type_id.clone(),
            subject_name: self.subject_name.clone(),
            domain_names: self.domain_names.clone(),
            private_key_format: self.private_key_format,
            private_key_password: self.private_key_password.clone(),
            authority_id: self.authority_id.clone(),
        }
    }
}

impl From<&NewKeyPairRequest> for StartNewKeyPairRequestApiModel {
    fn from(request: &NewKeyPairRequest) -> Self {
        Self {
            application_id: request.application_id.clone(),
            certificate_group_id: request.certificate_group_id.clone(),
            certificate_type_id: request.certificate_type_id.clone(),
            subject_name: request.subject_name.clone(),
            domain_names: request.domain_names.clone(),
            private_key_format: request.private_key_format,
            private_key_password: request.private_key_password.clone(),
            authority_id: request.authority_id.clone(),
        }
    }
}

fn validate_domain_names(domain_names: &[String]) -> Result<(), ValidationError> {
    if domain_names.len() > MAX_DOMAIN_NAMES_COUNT {
        return Err(ValidationError::new("too_many_domain_names"));
    }
    if domain_names
        .iter()
        .any(|name| name.trim().is_empty() || name.len() > MAX_DOMAIN_NAME_LENGTH)
    {
        return Err(ValidationError::new("invalid_domain_name"));
    }
    Ok(())
}

fn validate_password(password: &ApiSecret) -> Result<(), ValidationError> {
    if password.expose().len() as u64 > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::new("password_too_long"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequestRecordApiModel {
    pub request_id: String,
    pub application_id: String,
    pub state: CertificateRequestState,
    pub certificate_group_id: String,
    pub certificate_type_id: String,
    pub signing_request: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_format: Option<PrivateKeyFormat>,
}

impl CertificateRequestRecordApiModel {
    /// Builds the response model for `request_id`, which takes precedence
    /// over whatever id the vault echoed back.
    pub fn new(request_id: &str, record: CertificateRequestRecord) -> Self {
        Self {
            request_id: request_id.to_string(),
            ..record.into()
        }
    }
}

impl From<CertificateRequestRecord> for CertificateRequestRecordApiModel {
    fn from(record: CertificateRequestRecord) -> Self {
        Self {
            request_id: record.request_id,
            application_id: record.application_id,
            state: record.state,
            certificate_group_id: record.certificate_group_id,
            certificate_type_id: record.certificate_type_id,
            signing_request: record.signing_request,
            subject_name: record.subject_name,
            domain_names: record.domain_names,
            private_key_format: record.private_key_format,
        }
    }
}

impl From<CertificateRequestRecordApiModel> for CertificateRequestRecord {
    fn from(model: CertificateRequestRecordApiModel) -> Self {
        Self {
            request_id: model.request_id,
            application_id: model.application_id,
            state: model.state,
            certificate_group_id: model.certificate_group_id,
            certificate_type_id: model.certificate_type_id,
            signing_request: model.signing_request,
            subject_name: model.subject_name,
            domain_names: model.domain_names,
            private_key_format: model.private_key_format,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequestRecordQueryResponseApiModel {
    pub requests: Vec<CertificateRequestRecordApiModel>,
    pub next_page_link: Option<String>,
}

impl CertificateRequestRecordQueryResponseApiModel {
    pub fn new(records: Vec<CertificateRequestRecord>) -> Self {
        Self {
            requests: records.into_iter().map(Into::into).collect(),
            next_page_link: None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishRequestApiModel {
    pub request_id: String,
    pub application_id: String,
    pub state: CertificateRequestState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_type_id: Option<String>,
    /// Base64 DER certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_format: Option<PrivateKeyFormat>,
    /// Base64 PFX or PEM private key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority_id: Option<String>,
}

impl FinishRequestApiModel {
    pub fn new(request_id: &str, application_id: &str, result: FinishRequestResult) -> Self {
        Self {
            request_id: request_id.to_string(),
            application_id: application_id.to_string(),
            state: result.state,
            certificate_group_id: result.certificate_group_id.clone(),
            certificate_type_id: result.certificate_type_id.clone(),
            signed_certificate: result.signed_certificate.as_deref().map(|c| BASE64.encode(c)),
            private_key_format: result.private_key_format,
            private_key: result.private_key.as_ref().map(|k| BASE64.encode(k.as_bytes())),
            authority_id: result.authority_id.clone(),
        }
    }
}

impl TryFrom<FinishRequestApiModel> for FinishRequestResult {
    type Error = String;

    fn try_from(model: FinishRequestApiModel) -> Result<Self, Self::Error> {
        let decode = |field: &str, value: &str| {
            BASE64
                .decode(value.as_bytes())
                .map_err(|err| format!("{field} is not valid base64: {err}"))
        };

        let signed_certificate = model
            .signed_certificate
            .as_deref()
            .map(|value| decode("signedCertificate", value))
            .transpose()?;
        let private_key = model
            .private_key
            .as_deref()
            .map(|value| decode("privateKey", value).map(PrivateKey::new))
            .transpose()?;

        Ok(Self {
            state: model.state,
            certificate_group_id: model.certificate_group_id.clone(),
            certificate_type_id: model.certificate_type_id.clone(),
            signed_certificate,
            private_key_format: model.private_key_format,
            private_key,
            authority_id: model.authority_id.clone(),
        })
    }
}

// Custom Debug implementation to keep private keys out of the logs
impl fmt::Debug for FinishRequestApiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinishRequestApiModel")
            .field("request_id", &self.request_id)
            .field("application_id", &self.application_id)
            .field("state", &self.state)
            .field("certificate_group_id", &self.certificate_group_id)
            .field("certificate_type_id", &self.certificate_type_id)
            .field("signed_certificate", &self.signed_certificate.is_some())
            .field("private_key_format", &self.private_key_format)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("authority_id", &self.authority_id)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signing_request_json() -> serde_json::Value {
        serde_json::json!({
            "applicationId": "app-1",
            "certificateGroupId": "Default",
            "certificateTypeId": "RsaSha256ApplicationCertificateType",
            "certificateRequest": "MIIBAQ=="
        })
    }

    #[test]
    fn test_signing_request_uses_camel_case() {
        let model: StartSigningRequestApiModel =
            serde_json::from_value(signing_request_json()).unwrap();
        assert_eq!(model.application_id, "app-1");
        assert!(model.authority_id.is_none());
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_signing_request_rejects_empty_group() {
        let mut json = signing_request_json();
        json["certificateGroupId"] = serde_json::json!("");
        let model: StartSigningRequestApiModel = serde_json::from_value(json).unwrap();
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_decode_base64_csr() {
        assert_eq!(decode_certificate_request("MIIBAQ==").unwrap(), vec![0x30, 0x82, 0x01, 0x01]);
    }

    #[test]
    fn test_decode_pem_csr() {
        let pem = "-----BEGIN CERTIFICATE REQUEST-----\nMIIBAQ==\n-----END CERTIFICATE REQUEST-----\n";
        assert_eq!(decode_certificate_request(pem).unwrap(), vec![0x30, 0x82, 0x01, 0x01]);
    }

    #[test]
    fn test_decode_new_certificate_request_pem() {
        let der: Vec<u8> = (0..120u8).collect();
        let block = pem::Pem::new("NEW CERTIFICATE REQUEST", der.clone());
        let encoded = pem::encode(&block);
        assert_eq!(decode_certificate_request(&encoded).unwrap(), der);
    }

    #[test]
    fn test_decode_rejects_other_pem_labels() {
        let encoded = pem::encode(&pem::Pem::new("CERTIFICATE", vec![0x30, 0x82]));
        assert!(decode_certificate_request(&encoded).is_err());
    }

    #[test]
    fn test_decode_csr_errors() {
        assert!(decode_certificate_request("not base64!").is_err());
        assert!(decode_certificate_request("   ").is_err());
        assert!(decode_certificate_request("-----BEGIN CERTIFICATE REQUEST-----").is_err());
    }

    #[test]
    fn test_new_key_pair_validation() {
        let json = serde_json::json!({
            "applicationId": "app-1",
            "certificateGroupId": "Default",
            "certificateTypeId": "RsaSha256ApplicationCertificateType",
            "subjectName": "CN=Test",
            "domainNames": ["host.example.com", " "],
            "privateKeyFormat": "PEM"
        });
        let model: StartNewKeyPairRequestApiModel = serde_json::from_value(json).unwrap();
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_record_model_takes_path_request_id() {
        let record = CertificateRequestRecord {
            request_id: "ignored".to_string(),
            application_id: "app-1".to_string(),
            state: CertificateRequestState::New,
            certificate_group_id: "Default".to_string(),
            certificate_type_id: "RsaSha256ApplicationCertificateType".to_string(),
            signing_request: true,
            subject_name: None,
            domain_names: None,
            private_key_format: None,
        };
        let model = CertificateRequestRecordApiModel::new("req-7", record);
        assert_eq!(model.request_id, "req-7");
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["signingRequest"], true);
        assert!(json.get("subjectName").is_none());
    }

    #[test]
    fn test_finish_model_encodes_and_decodes_binary_fields() {
        let result = FinishRequestResult {
            state: CertificateRequestState::Approved,
            certificate_group_id: Some("Default".to_string()),
            certificate_type_id: None,
            signed_certificate: Some(vec![1, 2, 3]),
            private_key_format: Some(PrivateKeyFormat::Pfx),
            private_key: Some(PrivateKey::new(vec![4, 5])),
            authority_id: None,
        };
        let model = FinishRequestApiModel::new("req-1", "app-1", result.clone());
        assert_eq!(model.signed_certificate.as_deref(), Some("AQID"));
        assert!(!format!("{model:?}").contains("BAU="));

        let decoded = FinishRequestResult::try_from(model).unwrap();
        assert_eq!(decoded, result);
    }

    #[test]
    fn test_finish_model_rejects_bad_base64() {
        let model = FinishRequestApiModel {
            request_id: "req-1".to_string(),
            application_id: "app-1".to_string(),
            state: CertificateRequestState::Approved,
            certificate_group_id: None,
            certificate_type_id: None,
            signed_certificate: Some("***".to_string()),
            private_key_format: None,
            private_key: None,
            authority_id: None,
        };
        assert!(FinishRequestResult::try_from(model).is_err());
    }
}
