//
// Copyright 2025 The CTFE Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The errors that can be raised while processing submissions.

use const_oid::ObjectIdentifier;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CtError>;

/// Canonical failure classes, used to map errors onto the RFC 6962 reply
/// conventions (everything client-caused is a 400, invariant breaches are
/// a 500).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InvalidArgument,
    FailedPrecondition,
    Unauthenticated,
    NotFound,
    Internal,
}

#[derive(Error, Debug)]
pub enum CtError {
    #[error("Unable to parse provided JSON.")]
    MalformedJson,

    #[error("Unable to parse provided chain.")]
    MalformedChain,

    #[error("empty submission")]
    EmptySubmission,

    #[error("x509 error: {0}")]
    X509(String),

    /// The parser cannot tell whether the extension is present, e.g. because
    /// the certificate carries more than one instance of it.
    #[error("could not determine presence of the {0} extension")]
    AmbiguousExtension(ObjectIdentifier),

    #[error("certificate has no {0} extension")]
    ExtensionNotFound(ObjectIdentifier),

    #[error("broken certificate chain: {0}")]
    ChainBroken(String),

    #[error("chain does not anchor to a trusted root")]
    UntrustedChain,

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("unknown key id {0}")]
    UnknownKeyId(String),

    #[error("unsupported signature algorithm")]
    UnsupportedAlgorithm,

    #[error("signed data submission is incomplete")]
    IncompleteSignedData,

    #[error("precertificate submission is missing its issuer")]
    MissingPrecertIssuer,

    #[error("submission is not a precertificate")]
    NotAPrecert,

    #[error("Entry not found.")]
    EntryNotFound,

    #[error("Couldn't find hash.")]
    HashNotFound,

    #[error("could not DER-encode the chain")]
    ReencodingFailed(#[source] der::Error),

    #[error("Serialization failed.")]
    Serialization(#[source] tls_codec::Error),
}

impl CtError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CtError::MalformedJson
            | CtError::MalformedChain
            | CtError::EmptySubmission
            | CtError::X509(_)
            | CtError::AmbiguousExtension(_)
            | CtError::ExtensionNotFound(_)
            | CtError::ChainBroken(_)
            | CtError::UnsupportedAlgorithm
            | CtError::IncompleteSignedData
            | CtError::NotAPrecert => ErrorClass::InvalidArgument,

            CtError::MissingPrecertIssuer => ErrorClass::FailedPrecondition,

            CtError::UntrustedChain | CtError::SignatureInvalid | CtError::UnknownKeyId(_) => {
                ErrorClass::Unauthenticated
            }

            // Misses reply 400 per the CT convention, like the classes above.
            CtError::EntryNotFound | CtError::HashNotFound => ErrorClass::NotFound,

            CtError::ReencodingFailed(_) | CtError::Serialization(_) => ErrorClass::Internal,
        }
    }
}
