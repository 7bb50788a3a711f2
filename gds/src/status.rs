// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::fmt;

use serde::Serialize;

/// OPC UA status codes reported by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u32)]
pub enum StatusCode {
    BadUnexpectedError = 0x8001_0000,
    BadCommunicationError = 0x8005_0000,
    BadDecodingError = 0x8007_0000,
    BadNothingToDo = 0x800F_0000,
    BadCertificateUriInvalid = 0x8017_0000,
    BadUserAccessDenied = 0x801F_0000,
    BadNodeIdInvalid = 0x8033_0000,
    BadNodeIdUnknown = 0x8034_0000,
    BadNotSupported = 0x803D_0000,
    BadNotFound = 0x803E_0000,
    BadNotImplemented = 0x8040_0000,
    BadInvalidArgument = 0x80AB_0000,
    BadInvalidState = 0x80AF_0000,
    BadRequestNotAllowed = 0x80E4_0000,
}

impl StatusCode {
    pub const ALL: [StatusCode; 14] = [
        StatusCode::BadUnexpectedError,
        StatusCode::BadCommunicationError,
        StatusCode::BadDecodingError,
        StatusCode::BadNothingToDo,
        StatusCode::BadCertificateUriInvalid,
        StatusCode::BadUserAccessDenied,
        StatusCode::BadNodeIdInvalid,
        StatusCode::BadNodeIdUnknown,
        StatusCode::BadNotSupported,
        StatusCode::BadNotFound,
        StatusCode::BadNotImplemented,
        StatusCode::BadInvalidArgument,
        StatusCode::BadInvalidState,
        StatusCode::BadRequestNotAllowed,
    ];

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            StatusCode::BadUnexpectedError => "BadUnexpectedError",
            StatusCode::BadCommunicationError => "BadCommunicationError",
            StatusCode::BadDecodingError => "BadDecodingError",
            StatusCode::BadNothingToDo => "BadNothingToDo",
            StatusCode::BadCertificateUriInvalid => "BadCertificateUriInvalid",
            StatusCode::BadUserAccessDenied => "BadUserAccessDenied",
            StatusCode::BadNodeIdInvalid => "BadNodeIdInvalid",
            StatusCode::BadNodeIdUnknown => "BadNodeIdUnknown",
            StatusCode::BadNotSupported => "BadNotSupported",
            StatusCode::BadNotFound => "BadNotFound",
            StatusCode::BadNotImplemented => "BadNotImplemented",
            StatusCode::BadInvalidArgument => "BadInvalidArgument",
            StatusCode::BadInvalidState => "BadInvalidState",
            StatusCode::BadRequestNotAllowed => "BadRequestNotAllowed",
        }
    }

    /// Severity bits `10` mark a bad code.
    pub fn is_bad(self) -> bool {
        self.code() & 0xC000_0000 == 0x8000_0000
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08X})", self.name(), self.code())
    }
}

impl From<StatusCode> for u32 {
    fn from(status: StatusCode) -> Self {
        status.code()
    }
}

impl TryFrom<u32> for StatusCode {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        StatusCode::ALL
            .into_iter()
            .find(|status| status.code() == value)
            .ok_or(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_values() {
        assert_eq!(StatusCode::BadNotFound.code(), 0x803E_0000);
        assert_eq!(StatusCode::BadInvalidArgument.code(), 0x80AB_0000);
        assert_eq!(u32::from(StatusCode::BadRequestNotAllowed), 0x80E4_0000);
    }

    #[test]
    fn test_display_includes_name_and_code() {
        assert_eq!(
            StatusCode::BadUserAccessDenied.to_string(),
            "BadUserAccessDenied (0x801F0000)"
        );
    }

    #[test]
    fn test_try_from_u32() {
        for status in StatusCode::ALL {
            assert!(status.is_bad());
            assert_eq!(StatusCode::try_from(status.code()), Ok(status));
        }
        assert_eq!(StatusCode::try_from(0), Err(0));
    }
}
