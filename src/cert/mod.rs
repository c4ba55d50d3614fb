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

//! X.509 certificate model: loading, inspection and canonical DER
//! re-encoding, including the TBS editing needed for precertificates.

pub mod chain;
pub mod checker;
pub(crate) mod keyring;
#[cfg(test)]
pub(crate) mod testdata;

pub use chain::{CertChain, PreCertChain, SignedData};
pub use checker::{CertChecker, PrecertData};

use const_oid::ObjectIdentifier;
use der::{Decode, Encode};
use sha2::{Digest, Sha256};
use x509_cert::certificate::TbsCertificate;
use x509_cert::ext::pkix::ExtendedKeyUsage;
use x509_cert::ext::Extension;
use x509_cert::name::Name;

use crate::errors::{CtError, Result};

/// A loaded X.509 certificate.
///
/// The canonical DER bytes and the parsed view are kept together; a value of
/// this type only exists once parsing has succeeded, so every accessor is
/// total.
#[derive(Debug, Clone)]
pub struct Certificate {
    der: Vec<u8>,
    parsed: x509_cert::Certificate,
}

impl Certificate {
    /// Parses a certificate from its DER encoding.
    pub fn from_der(der_bytes: &[u8]) -> Result<Self> {
        let parsed = x509_cert::Certificate::from_der(der_bytes)
            .map_err(|e| CtError::X509(e.to_string()))?;
        Ok(Self {
            der: der_bytes.to_vec(),
            parsed,
        })
    }

    /// The canonical DER encoding this certificate was loaded from.
    pub fn to_der(&self) -> &[u8] {
        &self.der
    }

    pub(crate) fn parsed(&self) -> &x509_cert::Certificate {
        &self.parsed
    }

    pub fn subject(&self) -> &Name {
        &self.parsed.tbs_certificate.subject
    }

    pub fn issuer(&self) -> &Name {
        &self.parsed.tbs_certificate.issuer
    }

    /// Tri-valued extension presence check.
    ///
    /// `Ok(true)`/`Ok(false)` are definite answers; `Err` means presence
    /// could not be determined (the certificate carries duplicate instances
    /// of the extension) and callers must treat the certificate as invalid.
    pub fn has_extension(&self, oid: &ObjectIdentifier) -> Result<bool> {
        let Some(extensions) = &self.parsed.tbs_certificate.extensions else {
            return Ok(false);
        };
        match extensions.iter().filter(|ext| ext.extn_id == *oid).count() {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(CtError::AmbiguousExtension(*oid)),
        }
    }

    /// Whether the extended key usage extension names `oid`.
    pub fn has_extended_key_usage(&self, oid: &ObjectIdentifier) -> bool {
        match self.parsed.tbs_certificate.get::<ExtendedKeyUsage>() {
            Ok(Some((_, eku))) => eku.0.contains(oid),
            _ => false,
        }
    }

    /// RFC 6962-style key hash: SHA-256 over the DER encoding of the
    /// SubjectPublicKeyInfo.
    pub fn spki_sha256(&self) -> Result<[u8; 32]> {
        let spki = self
            .parsed
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(CtError::ReencodingFailed)?;
        Ok(Sha256::digest(&spki).into())
    }

    pub fn is_self_issued(&self) -> bool {
        let tbs = &self.parsed.tbs_certificate;
        tbs.issuer == tbs.subject
    }
}

/// An editable view of a certificate's TBS portion.
///
/// The precert transform needs a byte-exact DER output, so edits operate on
/// the parsed representation and the whole TBS is re-encoded; bytes are never
/// spliced.
#[derive(Debug, Clone)]
pub struct TbsCertificateView {
    tbs: TbsCertificate,
}

impl TbsCertificateView {
    pub fn new(cert: &Certificate) -> Self {
        Self {
            tbs: cert.parsed.tbs_certificate.clone(),
        }
    }

    /// Removes the named extension. An emptied extension list collapses to
    /// "no extensions", matching what a signer that never added the
    /// extension would have produced.
    pub fn delete_extension(&mut self, oid: &ObjectIdentifier) -> Result<()> {
        let present = self
            .tbs
            .extensions
            .as_ref()
            .is_some_and(|exts| exts.iter().any(|ext| ext.extn_id == *oid));
        if !present {
            return Err(CtError::ExtensionNotFound(*oid));
        }

        let remaining: Vec<Extension> = self
            .tbs
            .extensions
            .take()
            .unwrap_or_default()
            .into_iter()
            .filter(|ext| ext.extn_id != *oid)
            .collect();
        self.tbs.extensions = if remaining.is_empty() {
            None
        } else {
            Some(remaining)
        };
        Ok(())
    }

    /// Deterministic DER re-encoding of the edited TBS.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.tbs.to_der().map_err(CtError::ReencodingFailed)
    }
}
