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

//! Ordered certificate chains and signed-data submissions.

use std::ops::{Deref, DerefMut};

use crate::cert::Certificate;

/// An ordered sequence `[leaf, issuer1, ..., issuerN]`.
///
/// Certificates are owned by the chain once appended. Validation may reorder
/// or truncate the sequence to reflect the canonical valid chain.
#[derive(Debug, Clone, Default)]
pub struct CertChain {
    certs: Vec<Certificate>,
}

impl CertChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_certs(certs: Vec<Certificate>) -> Self {
        Self { certs }
    }

    /// Appends a certificate; ownership passes to the chain.
    pub fn add_cert(&mut self, cert: Certificate) {
        self.certs.push(cert);
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn leaf(&self) -> Option<&Certificate> {
        self.certs.first()
    }

    pub fn cert_at(&self, index: usize) -> Option<&Certificate> {
        self.certs.get(index)
    }

    pub fn certs(&self) -> &[Certificate] {
        &self.certs
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.certs.truncate(len);
    }
}

/// A certificate chain whose leaf is a precertificate.
#[derive(Debug, Clone, Default)]
pub struct PreCertChain(CertChain);

impl PreCertChain {
    pub fn from_chain(chain: CertChain) -> Self {
        Self(chain)
    }
}

impl Deref for PreCertChain {
    type Target = CertChain;

    fn deref(&self) -> &CertChain {
        &self.0
    }
}

impl DerefMut for PreCertChain {
    fn deref_mut(&mut self) -> &mut CertChain {
        &mut self.0
    }
}

/// A non-certificate signed blob: `signature` over `data` under the trusted
/// key identified by `key_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedData {
    pub key_id: Vec<u8>,
    pub data: Vec<u8>,
    pub signature: Vec<u8>,
}
