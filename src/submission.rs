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

//! Turns decoded submissions into canonical log entries: sanity checks,
//! chain checking, and the precertificate transform.

use std::sync::Arc;

use const_oid::db::rfc6962::CT_PRECERT_SCTS;

use crate::cert::{
    CertChain, CertChecker, PreCertChain, PrecertData, SignedData, TbsCertificateView,
};
use crate::entry::LogEntry;
use crate::errors::{CtError, Result};

/// Validates submissions and prepares them for signing.
///
/// Shared read-only across worker threads; all mutation happens on the
/// chains handed in.
pub struct SubmissionHandler {
    checker: Arc<CertChecker>,
}

impl SubmissionHandler {
    pub fn new(checker: Arc<CertChecker>) -> Self {
        Self { checker }
    }

    pub fn checker(&self) -> &CertChecker {
        &self.checker
    }

    pub fn process_signed_data(&self, data: &SignedData) -> Result<LogEntry> {
        self.checker.check_signed_data(data)?;
        Ok(LogEntry::SignedData {
            key_id: data.key_id.clone(),
            data: data.data.clone(),
            signature: data.signature.clone(),
        })
    }

    /// May reorder or truncate `chain` to the canonical valid chain.
    pub fn process_x509(&self, chain: &mut CertChain) -> Result<LogEntry> {
        if chain.is_empty() {
            return Err(CtError::EmptySubmission);
        }
        self.checker.check_cert_chain(chain)?;

        // The chain is valid; nothing below is expected to fail.
        let leaf = chain.leaf().ok_or(CtError::EmptySubmission)?;
        Ok(LogEntry::X509 {
            leaf_certificate: leaf.to_der().to_vec(),
            certificate_chain: ders_after_leaf(chain),
        })
    }

    pub fn process_precert(&self, chain: &mut PreCertChain) -> Result<LogEntry> {
        let PrecertData {
            issuer_key_hash,
            tbs_certificate,
        } = self.checker.check_pre_cert_chain(chain)?;

        let leaf = chain.leaf().ok_or(CtError::EmptySubmission)?;
        Ok(LogEntry::Precert {
            issuer_key_hash,
            tbs_certificate,
            pre_certificate: leaf.to_der().to_vec(),
            precertificate_chain: ders_after_leaf(chain),
        })
    }
}

fn ders_after_leaf(chain: &CertChain) -> Vec<Vec<u8>> {
    chain
        .certs()
        .iter()
        .skip(1)
        .map(|cert| cert.to_der().to_vec())
        .collect()
}

/// Client-side reconstruction of the bytestring under an SCT signature from
/// an observed chain.
///
/// Inspects only the leaf (and its immediate issuer for precertificates);
/// the trust store is never consulted and no length limits are enforced.
pub fn x509_chain_to_entry(chain: &CertChain) -> Result<LogEntry> {
    let leaf = chain.leaf().ok_or(CtError::EmptySubmission)?;
    if leaf.has_extension(&CT_PRECERT_SCTS)? {
        // An embedded SCT list means this was logged as a precertificate;
        // rebuilding the signed bytes needs the issuer key.
        let issuer = chain.cert_at(1).ok_or(CtError::MissingPrecertIssuer)?;
        let mut tbs = TbsCertificateView::new(leaf);
        tbs.delete_extension(&CT_PRECERT_SCTS)?;
        Ok(LogEntry::Precert {
            issuer_key_hash: issuer.spki_sha256()?,
            tbs_certificate: tbs.to_der()?,
            pre_certificate: leaf.to_der().to_vec(),
            precertificate_chain: Vec::new(),
        })
    } else {
        Ok(LogEntry::X509 {
            leaf_certificate: leaf.to_der().to_vec(),
            certificate_chain: Vec::new(),
        })
    }
}
