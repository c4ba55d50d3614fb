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

//! Request decoding: JSON bodies into typed submissions, query strings into
//! a parameter multimap.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;

use crate::cert::{CertChain, Certificate, SignedData};
use crate::errors::{CtError, Result};

#[derive(Deserialize)]
struct AddChainBody {
    chain: Vec<String>,
}

#[derive(Deserialize)]
struct AddSignedDataBody {
    keyid: String,
    signature: String,
    data: String,
}

/// Decodes an add-chain/add-pre-chain body: a JSON object whose `chain`
/// field is an array of base64 DER certificates. An empty array yields an
/// empty chain; the submission handler rejects it.
pub fn extract_chain(body: &[u8]) -> Result<CertChain> {
    let parsed: AddChainBody =
        serde_json::from_slice(body).map_err(|_| CtError::MalformedJson)?;

    let mut chain = CertChain::new();
    for encoded in &parsed.chain {
        let der = BASE64
            .decode(encoded)
            .map_err(|_| CtError::MalformedChain)?;
        let cert = Certificate::from_der(&der).map_err(|_| CtError::MalformedChain)?;
        chain.add_cert(cert);
    }
    Ok(chain)
}

/// Decodes an add-signed-data body: base64 `keyid`, `signature` and `data`.
pub fn extract_signed_data(body: &[u8]) -> Result<SignedData> {
    let parsed: AddSignedDataBody =
        serde_json::from_slice(body).map_err(|_| CtError::MalformedJson)?;

    let decode = |value: &str| BASE64.decode(value).map_err(|_| CtError::MalformedJson);
    Ok(SignedData {
        key_id: decode(&parsed.keyid)?,
        signature: decode(&parsed.signature)?,
        data: decode(&parsed.data)?,
    })
}

/// Parses a raw query string into a multimap. Duplicate keys are preserved
/// here; `get_param` flags them as invalid.
pub fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
    match raw {
        Some(query) => url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect(),
        None => Vec::new(),
    }
}

/// The value of `name`, or `None` when it is absent or supplied more than
/// once.
pub fn get_param(query: &[(String, String)], name: &str) -> Option<String> {
    let mut values = query.iter().filter(|(key, _)| key == name);
    let first = values.next()?;
    if values.next().is_some() {
        return None;
    }
    Some(first.1.clone())
}

/// Returns -1 on a missing, duplicated, unparsable or overflowing value, so
/// it is only suitable for parameters expected to be non-negative.
pub fn get_int_param(query: &[(String, String)], name: &str) -> i64 {
    get_param(query, name)
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(-1)
}

/// True iff the parameter is present exactly once with the literal value
/// `"true"`.
pub fn get_bool_param(query: &[(String, String)], name: &str) -> bool {
    get_param(query, name).as_deref() == Some("true")
}
