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

//! CT v1 binary serialization (RFC 6962 §3.4) of stored entries: the
//! `leaf_input` and `extra_data` blobs returned by get-entries, plus the
//! stored-SCT form handed to other log nodes.

use tls_codec::{SerializeBytes, Size, TlsByteVecU16, TlsByteVecU24, TlsSerializeBytes, TlsSize};

use crate::entry::{LogEntry, LoggedEntry, SignedCertificateTimestamp};
use crate::errors::{CtError, Result};

#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
#[repr(u8)]
enum Version {
    V1 = 0,
}

#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
#[repr(u8)]
enum MerkleLeafType {
    TimestampedEntry = 0,
}

#[derive(PartialEq, Debug)]
#[repr(u16)]
enum LogEntryType {
    X509Entry = 0,
    PrecertEntry = 1,
    // Nonstandard: generic signed blobs logged alongside certificates.
    SignedDataEntry = 2,
}

#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
struct PreCert {
    // opaque issuer_key_hash[32];
    issuer_key_hash: [u8; 32],
    // opaque TBSCertificate<1..2^24-1>;
    tbs_certificate: TlsByteVecU24,
}

#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
struct SignedBlob {
    key_id: TlsByteVecU16,
    data: TlsByteVecU24,
}

#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
#[repr(u16)]
enum SignedEntry {
    // opaque ASN.1Cert<1..2^24-1>;
    #[tls_codec(discriminant = "LogEntryType::X509Entry")]
    X509Entry(TlsByteVecU24),
    #[tls_codec(discriminant = "LogEntryType::PrecertEntry")]
    PrecertEntry(PreCert),
    #[tls_codec(discriminant = "LogEntryType::SignedDataEntry")]
    SignedDataEntry(SignedBlob),
}

#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
struct TimestampedEntry {
    timestamp: u64,
    signed_entry: SignedEntry,
    // opaque CtExtensions<0..2^16-1>;
    extensions: TlsByteVecU16,
}

#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
struct MerkleTreeLeaf {
    version: Version,
    leaf_type: MerkleLeafType,
    timestamped_entry: TimestampedEntry,
}

/// `ASN.1Cert chain<0..2^24-1>`: a u24-prefixed list of u24-prefixed certs.
#[derive(PartialEq, Debug)]
struct AsnCertChain(Vec<TlsByteVecU24>);

impl AsnCertChain {
    fn from_ders(ders: &[Vec<u8>]) -> Self {
        Self(ders.iter().map(|der| der.as_slice().into()).collect())
    }
}

impl Size for AsnCertChain {
    fn tls_serialized_len(&self) -> usize {
        3 + self.0.iter().map(Size::tls_serialized_len).sum::<usize>()
    }
}

impl SerializeBytes for AsnCertChain {
    fn tls_serialize(&self) -> std::result::Result<Vec<u8>, tls_codec::Error> {
        let body_len: usize = self.0.iter().map(Size::tls_serialized_len).sum();
        if body_len > 0xff_ffff {
            return Err(tls_codec::Error::InvalidVectorLength);
        }
        let mut out = Vec::with_capacity(3 + body_len);
        out.extend_from_slice(&(body_len as u32).to_be_bytes()[1..]);
        for cert in &self.0 {
            out.append(&mut cert.tls_serialize()?);
        }
        Ok(out)
    }
}

#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
struct X509ExtraData {
    certificate_chain: AsnCertChain,
}

#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
struct PrecertExtraData {
    pre_certificate: TlsByteVecU24,
    precertificate_chain: AsnCertChain,
}

// The serialized SCT is the version/id/timestamp/extensions prefix followed
// by the digitally-signed struct bytes verbatim.
#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
struct SctPrefix {
    version: u8,
    log_id: [u8; 32],
    timestamp: u64,
    extensions: TlsByteVecU16,
}

/// Serializes the `MerkleTreeLeaf` structure for a stored entry.
pub fn serialize_leaf(entry: &LoggedEntry) -> Result<Vec<u8>> {
    let signed_entry = match &entry.entry {
        LogEntry::X509 {
            leaf_certificate, ..
        } => SignedEntry::X509Entry(leaf_certificate.as_slice().into()),
        LogEntry::Precert {
            issuer_key_hash,
            tbs_certificate,
            ..
        } => SignedEntry::PrecertEntry(PreCert {
            issuer_key_hash: *issuer_key_hash,
            tbs_certificate: tbs_certificate.as_slice().into(),
        }),
        LogEntry::SignedData { key_id, data, .. } => SignedEntry::SignedDataEntry(SignedBlob {
            key_id: key_id.as_slice().into(),
            data: data.as_slice().into(),
        }),
    };

    let leaf = MerkleTreeLeaf {
        version: Version::V1,
        leaf_type: MerkleLeafType::TimestampedEntry,
        timestamped_entry: TimestampedEntry {
            timestamp: entry.sct.timestamp,
            signed_entry,
            extensions: entry.sct.extensions.as_slice().into(),
        },
    };
    leaf.tls_serialize().map_err(CtError::Serialization)
}

/// Serializes the `extra_data` blob: the material that is logged but not
/// covered by the leaf hash.
pub fn serialize_extra_data(entry: &LogEntry) -> Result<Vec<u8>> {
    match entry {
        LogEntry::X509 {
            certificate_chain, ..
        } => X509ExtraData {
            certificate_chain: AsnCertChain::from_ders(certificate_chain),
        }
        .tls_serialize(),
        LogEntry::Precert {
            pre_certificate,
            precertificate_chain,
            ..
        } => PrecertExtraData {
            pre_certificate: pre_certificate.as_slice().into(),
            precertificate_chain: AsnCertChain::from_ders(precertificate_chain),
        }
        .tls_serialize(),
        LogEntry::SignedData { signature, .. } => {
            TlsByteVecU16::from(signature.as_slice()).tls_serialize()
        }
    }
    .map_err(CtError::Serialization)
}

/// Serializes a stored SCT for the non-standard `include_scts` responses.
pub fn serialize_sct(sct: &SignedCertificateTimestamp) -> Result<Vec<u8>> {
    let mut out = SctPrefix {
        version: sct.version,
        log_id: sct.log_id,
        timestamp: sct.timestamp,
        extensions: sct.extensions.as_slice().into(),
    }
    .tls_serialize()
    .map_err(CtError::Serialization)?;
    out.extend_from_slice(&sct.signature);
    Ok(out)
}
