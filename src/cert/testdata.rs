//! A tiny in-memory CA for tests: deterministic P-256 certificates built
//! directly from `TbsCertificate`, so fixtures need no files and no OpenSSL.

use std::str::FromStr;
use std::time::Duration;

use const_oid::db::rfc5280::ID_CE_EXT_KEY_USAGE;
use const_oid::db::rfc5912::ECDSA_WITH_SHA_256;
use const_oid::db::rfc6962::{CT_PRECERT_SCTS, CT_PRECERT_SIGNING_CERT};
use der::asn1::{BitString, OctetString, UtcTime};
use der::{Decode, Encode};
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use p256::pkcs8::EncodePublicKey;
use rand_core::OsRng;
use x509_cert::certificate::TbsCertificate;
use x509_cert::ext::pkix::ExtendedKeyUsage;
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::time::{Time, Validity};
use x509_cert::Version;

use crate::cert::{CertChain, Certificate};

pub(crate) const ROOT_SUBJECT: &str = "CN=Test Root CA,O=ctfe tests";
pub(crate) const INTERMEDIATE_SUBJECT: &str = "CN=Test Issuing CA,O=ctfe tests";

pub(crate) fn new_key() -> SigningKey {
    SigningKey::random(&mut OsRng)
}

pub(crate) fn spki_der(key: &SigningKey) -> Vec<u8> {
    key.verifying_key()
        .to_public_key_der()
        .expect("encode spki")
        .as_bytes()
        .to_vec()
}

fn spki_for(key: &SigningKey) -> SubjectPublicKeyInfoOwned {
    SubjectPublicKeyInfoOwned::from_der(&spki_der(key)).expect("parse spki")
}

// Fixed validity keeps certificates with equal inputs byte-identical.
fn fixed_validity() -> Validity {
    let not_before = UtcTime::from_unix_duration(Duration::from_secs(1_704_067_200))
        .expect("not_before"); // 2024-01-01
    let not_after =
        UtcTime::from_unix_duration(Duration::from_secs(2_208_988_800)).expect("not_after"); // 2040-01-01
    Validity {
        not_before: Time::UtcTime(not_before),
        not_after: Time::UtcTime(not_after),
    }
}

/// Issues a certificate for `subject_key`, signed by `issuer_key` under the
/// `issuer` name.
pub(crate) fn issue(
    subject: &str,
    issuer: &str,
    subject_key: &SigningKey,
    issuer_key: &SigningKey,
    extensions: Vec<Extension>,
    serial: u8,
) -> Certificate {
    let tbs = TbsCertificate {
        version: Version::V3,
        serial_number: SerialNumber::new(&[serial]).expect("serial number"),
        signature: AlgorithmIdentifierOwned {
            oid: ECDSA_WITH_SHA_256,
            parameters: None,
        },
        issuer: Name::from_str(issuer).expect("issuer name"),
        validity: fixed_validity(),
        subject: Name::from_str(subject).expect("subject name"),
        subject_public_key_info: spki_for(subject_key),
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: if extensions.is_empty() {
            None
        } else {
            Some(extensions)
        },
    };

    let tbs_der = tbs.to_der().expect("encode tbs");
    let signature: Signature = issuer_key.sign(&tbs_der);
    let certificate = x509_cert::Certificate {
        tbs_certificate: tbs,
        signature_algorithm: AlgorithmIdentifierOwned {
            oid: ECDSA_WITH_SHA_256,
            parameters: None,
        },
        signature: BitString::from_bytes(signature.to_der().as_bytes()).expect("signature bits"),
    };

    Certificate::from_der(&certificate.to_der().expect("encode certificate"))
        .expect("reload certificate")
}

/// The embedded SCT list extension with an opaque payload.
pub(crate) fn sct_list_extension(payload: &[u8]) -> Extension {
    Extension {
        extn_id: CT_PRECERT_SCTS,
        critical: false,
        extn_value: OctetString::new(payload.to_vec()).expect("extension payload"),
    }
}

/// An extended key usage marking a precertificate signing certificate.
pub(crate) fn precert_signing_eku() -> Extension {
    let eku = ExtendedKeyUsage(vec![CT_PRECERT_SIGNING_CERT]);
    Extension {
        extn_id: ID_CE_EXT_KEY_USAGE,
        critical: true,
        extn_value: OctetString::new(eku.to_der().expect("encode eku")).expect("eku payload"),
    }
}

pub(crate) struct TestPki {
    pub root_key: SigningKey,
    pub root: Certificate,
    pub intermediate_key: SigningKey,
    pub intermediate: Certificate,
}

impl TestPki {
    /// `[leaf, intermediate]`, the usual submission shape.
    pub(crate) fn chain_to(&self, leaf: Certificate) -> CertChain {
        CertChain::from_certs(vec![leaf, self.intermediate.clone()])
    }
}

/// A root plus one issuing CA under it.
pub(crate) fn test_pki() -> TestPki {
    let root_key = new_key();
    let root = issue(ROOT_SUBJECT, ROOT_SUBJECT, &root_key, &root_key, vec![], 1);
    let intermediate_key = new_key();
    let intermediate = issue(
        INTERMEDIATE_SUBJECT,
        ROOT_SUBJECT,
        &intermediate_key,
        &root_key,
        vec![],
        2,
    );
    TestPki {
        root_key,
        root,
        intermediate_key,
        intermediate,
    }
}

/// A leaf under the intermediate, optionally with extra extensions.
pub(crate) fn leaf(pki: &TestPki, extensions: Vec<Extension>) -> Certificate {
    issue(
        "CN=leaf,O=ctfe tests",
        INTERMEDIATE_SUBJECT,
        &new_key(),
        &pki.intermediate_key,
        extensions,
        3,
    )
}
