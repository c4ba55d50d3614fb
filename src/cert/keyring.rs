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

//! Trusted verification keys, addressed by their RFC 6962-style key id
//! (SHA-256 hash of the SubjectPublicKeyInfo).

use std::collections::HashMap;

use aws_lc_rs::signature::{self, UnparsedPublicKey};
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP_256_R_1};
use const_oid::ObjectIdentifier;
use der::Decode;
use sha2::{Digest, Sha256};
use thiserror::Error;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::errors::CtError;

// Ed25519 OID: 1.3.101.112
const ID_ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

#[derive(Error, Debug)]
pub enum KeyringError {
    #[error("malformed key")]
    KeyMalformed(#[from] x509_cert::der::Error),
    #[error("unsupported algorithm")]
    AlgoUnsupported,

    #[error("requested key not in keyring: {0}")]
    KeyNotFound(String),
    #[error("verification failed")]
    VerificationFailed,
}

type Result<T> = std::result::Result<T, KeyringError>;

impl From<KeyringError> for CtError {
    fn from(err: KeyringError) -> Self {
        match err {
            KeyringError::KeyMalformed(e) => CtError::X509(e.to_string()),
            KeyringError::AlgoUnsupported => CtError::UnsupportedAlgorithm,
            KeyringError::KeyNotFound(id) => CtError::UnknownKeyId(id),
            KeyringError::VerificationFailed => CtError::SignatureInvalid,
        }
    }
}

/// Picks the aws-lc-rs verification primitive matching a parsed SPKI.
pub(crate) fn unparsed_key(spki: &SubjectPublicKeyInfoOwned) -> Result<UnparsedPublicKey<Vec<u8>>> {
    // Ed25519 keys have no algorithm parameters.
    if spki.algorithm.oid == ID_ED25519 {
        return Ok(UnparsedPublicKey::new(
            &signature::ED25519,
            spki.subject_public_key.raw_bytes().to_owned(),
        ));
    }

    // RSA keys are verified as PKCS#1 v1.5 with SHA-256, the scheme CT logs
    // accept for chain and signed-data signatures.
    if spki.algorithm.oid == RSA_ENCRYPTION {
        return Ok(UnparsedPublicKey::new(
            &signature::RSA_PKCS1_2048_8192_SHA256,
            spki.subject_public_key.raw_bytes().to_owned(),
        ));
    }

    let params: ObjectIdentifier = match &spki.algorithm.parameters {
        Some(params) => params.decode_as()?,
        None => return Err(KeyringError::AlgoUnsupported),
    };

    match (spki.algorithm.oid, params) {
        (ID_EC_PUBLIC_KEY, SECP_256_R_1) => Ok(UnparsedPublicKey::new(
            &signature::ECDSA_P256_SHA256_ASN1,
            spki.subject_public_key.raw_bytes().to_owned(),
        )),
        _ => Err(KeyringError::AlgoUnsupported),
    }
}

struct Key {
    inner: UnparsedPublicKey<Vec<u8>>,
    fingerprint: [u8; 32],
}

impl Key {
    /// Creates a `Key` from a DER blob containing a SubjectPublicKeyInfo
    /// object.
    fn new(spki_bytes: &[u8]) -> Result<Self> {
        let spki = SubjectPublicKeyInfoOwned::from_der(spki_bytes)?;
        let fingerprint = Sha256::digest(spki_bytes).into();
        Ok(Self {
            inner: unparsed_key(&spki)?,
            fingerprint,
        })
    }
}

/// The set of keys trusted to sign signed-data submissions.
#[derive(Default)]
pub(crate) struct Keyring(HashMap<[u8; 32], Key>);

impl Keyring {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a DER-encoded SPKI; returns the key id it is addressed by.
    pub(crate) fn add_spki(&mut self, spki_bytes: &[u8]) -> Result<[u8; 32]> {
        let key = Key::new(spki_bytes)?;
        let fingerprint = key.fingerprint;
        self.0.insert(fingerprint, key);
        Ok(fingerprint)
    }

    /// Verifies `data` against a `signature` with the key named by `key_id`.
    pub(crate) fn verify(&self, key_id: &[u8], signature: &[u8], data: &[u8]) -> Result<()> {
        let id: [u8; 32] = key_id
            .try_into()
            .map_err(|_| KeyringError::KeyNotFound(hex::encode(key_id)))?;
        let key = self
            .0
            .get(&id)
            .ok_or_else(|| KeyringError::KeyNotFound(hex::encode(key_id)))?;

        key.inner.verify(data, signature).map_err(|e| {
            tracing::debug!("keyring verification failed: {:?}", e);
            KeyringError::VerificationFailed
        })?;

        Ok(())
    }
}
