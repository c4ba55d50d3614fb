//! Shared test fixtures: a tiny in-memory CA plus fakes for the node's
//! external collaborators.

#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
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

use ctfe::entry::{LogEntry, LoggedEntry, QueueOutcome, SignedCertificateTimestamp};
use ctfe::lookup::{
    AuditProof, ClusterStateController, EntryStore, LogLookup, PeerSelector, SignedTreeHead,
    SigningFrontend,
};
use ctfe::Certificate;

pub const ROOT_SUBJECT: &str = "CN=Test Root CA,O=ctfe tests";
pub const INTERMEDIATE_SUBJECT: &str = "CN=Test Issuing CA,O=ctfe tests";

pub fn new_key() -> SigningKey {
    SigningKey::random(&mut OsRng)
}

pub fn spki_der(key: &SigningKey) -> Vec<u8> {
    key.verifying_key()
        .to_public_key_der()
        .expect("encode spki")
        .as_bytes()
        .to_vec()
}

fn fixed_validity() -> Validity {
    let not_before =
        UtcTime::from_unix_duration(Duration::from_secs(1_704_067_200)).expect("not_before");
    let not_after =
        UtcTime::from_unix_duration(Duration::from_secs(2_208_988_800)).expect("not_after");
    Validity {
        not_before: Time::UtcTime(not_before),
        not_after: Time::UtcTime(not_after),
    }
}

pub fn issue(
    subject: &str,
    issuer: &str,
    subject_key: &SigningKey,
    issuer_key: &SigningKey,
    extensions: Vec<Extension>,
    serial: u8,
) -> Certificate {
    let spki = SubjectPublicKeyInfoOwned::from_der(&spki_der(subject_key)).expect("parse spki");
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
        subject_public_key_info: spki,
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

pub fn sct_list_extension(payload: &[u8]) -> Extension {
    Extension {
        extn_id: CT_PRECERT_SCTS,
        critical: false,
        extn_value: OctetString::new(payload.to_vec()).expect("extension payload"),
    }
}

pub fn precert_signing_eku() -> Extension {
    let eku = ExtendedKeyUsage(vec![CT_PRECERT_SIGNING_CERT]);
    Extension {
        extn_id: ID_CE_EXT_KEY_USAGE,
        critical: true,
        extn_value: OctetString::new(eku.to_der().expect("encode eku")).expect("eku payload"),
    }
}

pub struct TestPki {
    pub root_key: SigningKey,
    pub root: Certificate,
    pub intermediate_key: SigningKey,
    pub intermediate: Certificate,
}

pub fn test_pki() -> TestPki {
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

pub fn leaf(pki: &TestPki, extensions: Vec<Extension>) -> Certificate {
    issue(
        "CN=leaf,O=ctfe tests",
        INTERMEDIATE_SUBJECT,
        &new_key(),
        &pki.intermediate_key,
        extensions,
        3,
    )
}

pub fn test_sct() -> SignedCertificateTimestamp {
    SignedCertificateTimestamp {
        version: 0,
        log_id: [7; 32],
        timestamp: 1_234_567_890_123,
        extensions: Vec::new(),
        signature: vec![4, 3, 0, 4, 0xde, 0xad, 0xbe, 0xef],
    }
}

pub fn logged_x509(sequence: u64) -> LoggedEntry {
    LoggedEntry {
        sequence,
        entry: LogEntry::X509 {
            leaf_certificate: vec![0xde, 0xad],
            certificate_chain: Vec::new(),
        },
        sct: test_sct(),
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub entries: Vec<LoggedEntry>,
}

impl EntryStore for FakeStore {
    fn scan_entries(&self, start: u64) -> Box<dyn Iterator<Item = LoggedEntry> + '_> {
        Box::new(
            self.entries
                .iter()
                .filter(move |entry| entry.sequence >= start)
                .cloned(),
        )
    }
}

pub struct FakeLookup {
    pub sth: SignedTreeHead,
    pub proofs: HashMap<Vec<u8>, AuditProof>,
    pub consistency: Vec<Vec<u8>>,
}

impl Default for FakeLookup {
    fn default() -> Self {
        Self {
            sth: SignedTreeHead {
                tree_size: 100,
                timestamp: 1_234_567_890_000,
                sha256_root_hash: [5; 32],
                signature: vec![4, 3, 0, 2, 0x12, 0x34],
            },
            proofs: HashMap::new(),
            consistency: Vec::new(),
        }
    }
}

impl LogLookup for FakeLookup {
    fn latest_sth(&self) -> SignedTreeHead {
        self.sth.clone()
    }

    fn audit_proof(&self, leaf_hash: &[u8], _tree_size: u64) -> Option<AuditProof> {
        self.proofs.get(leaf_hash).cloned()
    }

    fn consistency_proof(&self, _first: u64, _second: u64) -> Vec<Vec<u8>> {
        self.consistency.clone()
    }
}

pub struct StaticController(pub bool);

impl ClusterStateController for StaticController {
    fn node_is_stale(&self) -> bool {
        self.0
    }
}

#[derive(Clone, Copy)]
pub enum QueueMode {
    Accept,
    Duplicate,
    Exhausted,
}

pub struct FakeFrontend {
    pub mode: QueueMode,
    pub seen: Mutex<Vec<LogEntry>>,
}

impl FakeFrontend {
    pub fn new(mode: QueueMode) -> Self {
        Self {
            mode,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl SigningFrontend for FakeFrontend {
    fn queue_entry(&self, entry: &LogEntry) -> QueueOutcome {
        self.seen.lock().unwrap().push(entry.clone());
        match self.mode {
            QueueMode::Accept => QueueOutcome::Queued(test_sct()),
            QueueMode::Duplicate => QueueOutcome::AlreadyExists(test_sct()),
            QueueMode::Exhausted => QueueOutcome::ResourceExhausted("Queue is full.".into()),
        }
    }
}

pub struct NoPeers;

impl PeerSelector for NoPeers {
    fn next_peer(&self) -> Option<url::Url> {
        None
    }
}

pub struct FixedPeer(pub url::Url);

impl PeerSelector for FixedPeer {
    fn next_peer(&self) -> Option<url::Url> {
        Some(self.0.clone())
    }
}
