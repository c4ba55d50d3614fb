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

//! Canonical log entries and the signed material surrounding them.

/// A validated submission in its canonical, signable form.
///
/// The variant tag and the payload always agree by construction, and the
/// payload is immutable once a handler returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    X509 {
        /// DER of the end-entity certificate.
        leaf_certificate: Vec<u8>,
        /// DER of the issuing certificates, leaf's issuer first.
        certificate_chain: Vec<Vec<u8>>,
    },
    Precert {
        /// SHA-256 of the SPKI of the certificate that signed the leaf.
        issuer_key_hash: [u8; 32],
        /// DER of the leaf's TBS with the embedded SCT list removed.
        tbs_certificate: Vec<u8>,
        /// DER of the precertificate exactly as submitted.
        pre_certificate: Vec<u8>,
        precertificate_chain: Vec<Vec<u8>>,
    },
    SignedData {
        key_id: Vec<u8>,
        data: Vec<u8>,
        signature: Vec<u8>,
    },
}

impl LogEntry {
    pub fn type_name(&self) -> &'static str {
        match self {
            LogEntry::X509 { .. } => "x509",
            LogEntry::Precert { .. } => "precert",
            LogEntry::SignedData { .. } => "signed_data",
        }
    }
}

/// A Signed Certificate Timestamp as produced by the signing frontend.
///
/// `signature` is the serialized digitally-signed struct and is embedded in
/// replies verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCertificateTimestamp {
    pub version: u8,
    pub log_id: [u8; 32],
    /// Milliseconds since the epoch.
    pub timestamp: u64,
    pub extensions: Vec<u8>,
    pub signature: Vec<u8>,
}

/// An entry as stored in the log, read back for get-entries.
#[derive(Debug, Clone)]
pub struct LoggedEntry {
    pub sequence: u64,
    pub entry: LogEntry,
    pub sct: SignedCertificateTimestamp,
}

/// What the signing frontend did with an accepted entry.
///
/// Duplicates still carry the (original) SCT so the reply can pretend the
/// entry was newly added.
#[derive(Debug, Clone)]
pub enum QueueOutcome {
    Queued(SignedCertificateTimestamp),
    AlreadyExists(SignedCertificateTimestamp),
    ResourceExhausted(String),
    Rejected(String),
}
