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

//! Chain validation against the trust store, including the specialized
//! precertificate checks.

use std::collections::BTreeMap;

use const_oid::db::rfc6962::{CT_PRECERT_SCTS, CT_PRECERT_SIGNING_CERT};
use der::Encode;
use tracing::debug;

use crate::cert::keyring::{self, Keyring};
use crate::cert::{CertChain, Certificate, PreCertChain, SignedData, TbsCertificateView};
use crate::errors::{CtError, Result};

/// Output of a successful precertificate check.
#[derive(Debug, Clone)]
pub struct PrecertData {
    /// SHA-256 of the SPKI of the certificate that signed the leaf.
    pub issuer_key_hash: [u8; 32],
    /// DER of the leaf's TBS with the embedded SCT list removed.
    pub tbs_certificate: Vec<u8>,
}

/// Verifies submissions against a set of trusted root certificates.
///
/// The trust store is read-only after construction and shared by all worker
/// threads.
#[derive(Default)]
pub struct CertChecker {
    // Roots keyed by RFC 4514 subject string; several roots may share one
    // subject after a key rollover.
    trusted: BTreeMap<String, Vec<Certificate>>,
    keyring: Keyring,
}

impl CertChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a trusted root. Its key also becomes acceptable for signed-data
    /// submissions.
    pub fn add_trusted_certificate(&mut self, cert: Certificate) -> Result<()> {
        let spki = cert
            .parsed()
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(CtError::ReencodingFailed)?;
        let key_id = self.keyring.add_spki(&spki)?;
        debug!(
            subject = %cert.subject(),
            key_id = %hex::encode(key_id),
            "loaded trusted root"
        );
        self.trusted
            .entry(cert.subject().to_string())
            .or_default()
            .push(cert);
        Ok(())
    }

    /// Loads every CERTIFICATE block from PEM bytes into the trust store and
    /// returns how many were added.
    pub fn add_trusted_pem(&mut self, pem_bytes: &[u8]) -> Result<usize> {
        let blocks = pem::parse_many(pem_bytes).map_err(|e| CtError::X509(e.to_string()))?;
        let mut added = 0;
        for block in blocks {
            if block.tag() != "CERTIFICATE" {
                continue;
            }
            self.add_trusted_certificate(Certificate::from_der(block.contents())?)?;
            added += 1;
        }
        Ok(added)
    }

    /// An ordered view of the roots, keyed by subject name.
    pub fn trusted_certificates(&self) -> impl Iterator<Item = &Certificate> {
        self.trusted.values().flatten()
    }

    pub fn num_trusted_certificates(&self) -> usize {
        self.trusted.values().map(Vec::len).sum()
    }

    /// Verifies that the leaf chains to some trusted root.
    ///
    /// The chain is truncated to the canonical valid prefix: everything past
    /// the first certificate issued by a trusted root is dropped.
    pub fn check_cert_chain(&self, chain: &mut CertChain) -> Result<()> {
        if chain.is_empty() {
            return Err(CtError::EmptySubmission);
        }

        let certs = chain.certs();
        let mut anchored = None;
        for i in 0..certs.len() {
            if self.issuing_root(&certs[i]).is_some() {
                anchored = Some(i);
                break;
            }
            let Some(next) = certs.get(i + 1) else {
                return Err(CtError::UntrustedChain);
            };
            Self::verify_link(&certs[i], next)?;
        }

        let anchored = anchored.ok_or(CtError::UntrustedChain)?;
        chain.truncate(anchored + 1);
        Ok(())
    }

    /// Verifies a precertificate chain and produces the material that goes
    /// into the signed entry.
    ///
    /// The leaf must carry the embedded SCT list extension, or the
    /// certificate immediately above it must be a precertificate signing
    /// certificate. `issuer_key_hash` is computed from whichever certificate
    /// actually signed the leaf, i.e. `chain[1]`.
    pub fn check_pre_cert_chain(&self, chain: &mut PreCertChain) -> Result<PrecertData> {
        let (issuer_key_hash, tbs_certificate) = {
            let leaf = chain.leaf().ok_or(CtError::EmptySubmission)?;
            let embedded_scts = leaf.has_extension(&CT_PRECERT_SCTS)?;
            let issuer = chain.cert_at(1).ok_or(CtError::MissingPrecertIssuer)?;
            if !embedded_scts && !issuer.has_extended_key_usage(&CT_PRECERT_SIGNING_CERT) {
                return Err(CtError::NotAPrecert);
            }

            // The leaf link is verified here even if the anchor walk below
            // would already accept the leaf directly; chain[1] must really be
            // the certificate that signed it.
            Self::verify_link(leaf, issuer)?;

            let mut tbs = TbsCertificateView::new(leaf);
            if embedded_scts {
                tbs.delete_extension(&CT_PRECERT_SCTS)?;
            }
            (issuer.spki_sha256()?, tbs.to_der()?)
        };

        self.check_cert_chain(chain)?;
        Ok(PrecertData {
            issuer_key_hash,
            tbs_certificate,
        })
    }

    /// Verifies `signature` over `data` under the trusted key named by
    /// `key_id`.
    pub fn check_signed_data(&self, data: &SignedData) -> Result<()> {
        if data.key_id.is_empty() || data.data.is_empty() || data.signature.is_empty() {
            return Err(CtError::IncompleteSignedData);
        }
        self.keyring
            .verify(&data.key_id, &data.signature, &data.data)?;
        Ok(())
    }

    /// The trusted root that issued `cert`, if any.
    fn issuing_root(&self, cert: &Certificate) -> Option<&Certificate> {
        let candidates = self.trusted.get(&cert.issuer().to_string())?;
        candidates
            .iter()
            .find(|root| Self::verify_signature(cert, root).is_ok())
    }

    fn verify_link(cert: &Certificate, issuer: &Certificate) -> Result<()> {
        if issuer.subject() != cert.issuer() {
            return Err(CtError::ChainBroken(format!(
                "certificate issued by {}, next in chain is {}",
                cert.issuer(),
                issuer.subject()
            )));
        }
        Self::verify_signature(cert, issuer)
    }

    fn verify_signature(cert: &Certificate, issuer: &Certificate) -> Result<()> {
        let key = keyring::unparsed_key(&issuer.parsed().tbs_certificate.subject_public_key_info)?;
        let tbs = cert
            .parsed()
            .tbs_certificate
            .to_der()
            .map_err(CtError::ReencodingFailed)?;
        key.verify(&tbs, cert.parsed().signature.raw_bytes())
            .map_err(|_| CtError::SignatureInvalid)
    }
}
