//! # Mock Privacy Backend
//!
//! A deterministic, transparent [`PrivacyBackend`] for development and
//! testing. "Signatures" and "proofs" are SHA-256 digests that anyone can
//! recompute; the accumulator is a plain set of revoked witnesses.
//!
//! ## What It Enforces
//!
//! - A credential is bound to the claimer secret it was requested with.
//! - Every disclosed attribute is checked against the digest the attester
//!   signed, so a claimer cannot alter disclosed values.
//! - A presentation is bound to the nonce of the verifier session it
//!   answers and cannot be replayed into another session.
//! - Attester keys must be supplied by the verifier; unknown attesters fail.
//! - A witness present in the latest accumulator fails verification.
//! - `updated_after` rejects credentials refreshed before that instant.
//!
//! ## Security Warning
//!
//! **NOT PRIVATE.** Attribute digests are unsalted and the witness is
//! disclosed. This backend must not be used where zero-knowledge privacy is
//! required.

use std::collections::{BTreeMap, BTreeSet};

use kredo_core::{CanonicalBytes, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ZkError;
use crate::traits::{CombinedRequestBuilder, PartialPresentationRequest, PrivacyBackend};
use crate::types::{
    Accumulator, AttesterPrivateKey, AttesterPublicKey, PeAttestation, PeAttestationRequest,
    PeAttesterSession, PeClaimerSession, PeCredential, PeInitiateAttestation, PePresentation,
    PeRequest, PeSession, PeVerification, Witness,
};

const ATTESTER_TAG: &[u8] = b"kredo/mock-pe/attester";
const CLAIMER_TAG: &[u8] = b"kredo/mock-pe/claimer";
const CONTENTS: &str = "contents";

// ---------------------------------------------------------------------------
// Wire bodies
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicKeyBody {
    attester_id: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrivateKeyBody {
    attester_id: String,
    secret: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccumulatorBody {
    attester_id: String,
    version: u64,
    updated_at: Timestamp,
    revoked: BTreeSet<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitiateBody {
    attester_id: String,
    nonce: String,
}

#[derive(Serialize, Deserialize)]
struct AttesterSessionBody {
    nonce: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttestationRequestBody {
    nonce: String,
    attester_id: String,
    claim: Value,
    claimer_commitment: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimerSessionBody {
    attester_id: String,
    claim: Value,
}

/// Shared encoding of an issued attestation and the credential built from it.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignedClaimBody {
    attester_id: String,
    claim: Value,
    claimer_commitment: String,
    witness: String,
    accumulator_version: u64,
    accumulator_updated_at: Timestamp,
    signature: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WitnessBody {
    attester_id: String,
    witness: String,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubRequestBody {
    requested_attributes: Vec<String>,
    updated_after: Option<Timestamp>,
}

/// Shared encoding of the verifier session and the outgoing request.
#[derive(Serialize, Deserialize)]
struct RequestBody {
    nonce: String,
    requests: Vec<SubRequestBody>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProofBody {
    attester_id: String,
    attribute_digests: BTreeMap<String, String>,
    disclosed: BTreeMap<String, Value>,
    claimer_commitment: String,
    witness: String,
    accumulator_version: u64,
    accumulator_updated_at: Timestamp,
    signature: String,
    binding: String,
}

#[derive(Serialize, Deserialize)]
struct PresentationBody {
    nonce: String,
    proofs: Vec<ProofBody>,
}

/// What the attester signs.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialCore<'a> {
    attester_id: &'a str,
    claimer_commitment: &'a str,
    witness: &'a str,
    attribute_digests: &'a BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Digest helpers
// ---------------------------------------------------------------------------

fn hash_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    format!("0x{}", hex::encode(hasher.finalize()))
}

fn claimer_commitment(secret: &[u8; 32]) -> String {
    hash_hex(&[CLAIMER_TAG, secret])
}

/// Flatten a claim into absolute attribute paths: top-level members by name,
/// members of `contents` as `contents.<field>`.
fn flatten(claim: &Value) -> Result<BTreeMap<String, Value>, ZkError> {
    let obj = claim.as_object().ok_or(ZkError::ClaimNotAnObject)?;
    let mut out = BTreeMap::new();
    for (key, value) in obj {
        match value {
            Value::Object(fields) if key == CONTENTS => {
                for (field, v) in fields {
                    out.insert(format!("{CONTENTS}.{field}"), v.clone());
                }
            }
            other => {
                out.insert(key.clone(), other.clone());
            }
        }
    }
    Ok(out)
}

/// Inverse of [`flatten`] for a disclosed subset.
fn unflatten(disclosed: &BTreeMap<String, Value>) -> Value {
    let mut root = Map::new();
    for (path, value) in disclosed {
        match path.split_once('.') {
            Some((CONTENTS, field)) => {
                let contents = root
                    .entry(CONTENTS.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(fields) = contents {
                    fields.insert(field.to_string(), value.clone());
                }
            }
            _ => {
                root.insert(path.clone(), value.clone());
            }
        }
    }
    Value::Object(root)
}

fn attribute_digest(path: &str, value: &Value) -> Result<String, ZkError> {
    let canonical = CanonicalBytes::new(value)?;
    Ok(hash_hex(&[path.as_bytes(), b"\x00", canonical.as_bytes()]))
}

fn attribute_digests(attributes: &BTreeMap<String, Value>) -> Result<BTreeMap<String, String>, ZkError> {
    attributes
        .iter()
        .map(|(path, value)| Ok((path.clone(), attribute_digest(path, value)?)))
        .collect()
}

fn credential_digest(core: &CredentialCore<'_>) -> Result<String, ZkError> {
    let canonical = CanonicalBytes::new(core)?;
    Ok(hash_hex(&[canonical.as_bytes()]))
}

fn attester_signature(attester_id: &str, credential_digest: &str) -> String {
    hash_hex(&[ATTESTER_TAG, attester_id.as_bytes(), credential_digest.as_bytes()])
}

fn session_binding(nonce: &str, credential_digest: &str) -> String {
    hash_hex(&[nonce.as_bytes(), credential_digest.as_bytes()])
}

fn signed_digest(body: &SignedClaimBody) -> Result<String, ZkError> {
    let digests = attribute_digests(&flatten(&body.claim)?)?;
    credential_digest(&CredentialCore {
        attester_id: &body.attester_id,
        claimer_commitment: &body.claimer_commitment,
        witness: &body.witness,
        attribute_digests: &digests,
    })
}

fn ensure_same_attester(expected: &str, actual: &str) -> Result<(), ZkError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ZkError::AttesterMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Request builder
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MockRequestBuilder {
    requests: Vec<PartialPresentationRequest>,
}

impl CombinedRequestBuilder for MockRequestBuilder {
    fn request_presentation(&mut self, request: PartialPresentationRequest) {
        self.requests.push(request);
    }

    fn len(&self) -> usize {
        self.requests.len()
    }

    fn finalize(self: Box<Self>) -> Result<(PeSession, PeRequest), ZkError> {
        let body = RequestBody {
            nonce: Uuid::new_v4().to_string(),
            requests: self
                .requests
                .into_iter()
                .map(|r| SubRequestBody {
                    requested_attributes: r.requested_attributes,
                    updated_after: r.updated_after,
                })
                .collect(),
        };
        Ok((PeSession::encode(&body)?, PeRequest::encode(&body)?))
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Deterministic transparent privacy backend. **NOT PRIVATE.**
#[derive(Debug, Clone, Copy, Default)]
pub struct MockPrivacyBackend;

impl MockPrivacyBackend {
    pub fn new() -> Self {
        Self
    }

    fn check_proof(
        proof: &ProofBody,
        sub: &SubRequestBody,
        nonce: &str,
        accumulators: &[AccumulatorBody],
        attester_ids: &BTreeSet<String>,
    ) -> Result<(), &'static str> {
        if !attester_ids.contains(&proof.attester_id) {
            return Err("unknown attester");
        }

        let digest = credential_digest(&CredentialCore {
            attester_id: &proof.attester_id,
            claimer_commitment: &proof.claimer_commitment,
            witness: &proof.witness,
            attribute_digests: &proof.attribute_digests,
        })
        .map_err(|_| "credential digest")?;
        if proof.signature != attester_signature(&proof.attester_id, &digest) {
            return Err("attester signature");
        }
        if proof.binding != session_binding(nonce, &digest) {
            return Err("session binding");
        }

        for path in &sub.requested_attributes {
            if !proof.disclosed.contains_key(path) {
                return Err("requested attribute not disclosed");
            }
        }
        for (path, value) in &proof.disclosed {
            let expected = proof.attribute_digests.get(path).ok_or("undeclared attribute")?;
            let actual = attribute_digest(path, value).map_err(|_| "attribute digest")?;
            if &actual != expected {
                return Err("disclosed value altered");
            }
        }

        let latest = accumulators
            .iter()
            .filter(|a| a.attester_id == proof.attester_id)
            .max_by_key(|a| a.version)
            .ok_or("no accumulator for attester")?;
        if latest.revoked.contains(&proof.witness) {
            return Err("credential revoked");
        }
        if proof.accumulator_version > latest.version {
            return Err("accumulator version from the future");
        }
        if let Some(required) = sub.updated_after {
            if proof.accumulator_updated_at < required {
                return Err("accumulator state too old");
            }
        }
        Ok(())
    }
}

impl PrivacyBackend for MockPrivacyBackend {
    fn backend_name(&self) -> &str {
        "MockPrivacyBackend"
    }

    fn generate_attester_keys(
        &self,
        seed: &[u8; 32],
    ) -> Result<(AttesterPublicKey, AttesterPrivateKey), ZkError> {
        let attester_id = hash_hex(&[ATTESTER_TAG, seed]);
        let public = AttesterPublicKey::encode(&PublicKeyBody {
            attester_id: attester_id.clone(),
        })?;
        let private = AttesterPrivateKey::encode(&PrivateKeyBody {
            attester_id,
            secret: hex::encode(seed),
        })?;
        Ok((public, private))
    }

    fn create_accumulator(&self, attester: &AttesterPrivateKey) -> Result<Accumulator, ZkError> {
        let key: PrivateKeyBody = attester.decode()?;
        Accumulator::encode(&AccumulatorBody {
            attester_id: key.attester_id,
            version: 0,
            updated_at: Timestamp::now(),
            revoked: BTreeSet::new(),
        })
    }

    fn initiate_attestation(
        &self,
        attester: &AttesterPrivateKey,
    ) -> Result<(PeAttesterSession, PeInitiateAttestation), ZkError> {
        let key: PrivateKeyBody = attester.decode()?;
        let nonce = Uuid::new_v4().to_string();
        Ok((
            PeAttesterSession::encode(&AttesterSessionBody {
                nonce: nonce.clone(),
            })?,
            PeInitiateAttestation::encode(&InitiateBody {
                attester_id: key.attester_id,
                nonce,
            })?,
        ))
    }

    fn request_attestation(
        &self,
        claimer_secret: &[u8; 32],
        claim: &Value,
        initiation: &PeInitiateAttestation,
        attester: &AttesterPublicKey,
    ) -> Result<(PeClaimerSession, PeAttestationRequest), ZkError> {
        let init: InitiateBody = initiation.decode()?;
        let key: PublicKeyBody = attester.decode()?;
        ensure_same_attester(&key.attester_id, &init.attester_id)?;
        flatten(claim)?;

        let session = PeClaimerSession::encode(&ClaimerSessionBody {
            attester_id: key.attester_id.clone(),
            claim: claim.clone(),
        })?;
        let request = PeAttestationRequest::encode(&AttestationRequestBody {
            nonce: init.nonce,
            attester_id: key.attester_id,
            claim: claim.clone(),
            claimer_commitment: claimer_commitment(claimer_secret),
        })?;
        Ok((session, request))
    }

    fn issue_attestation(
        &self,
        attester: &AttesterPrivateKey,
        session: &PeAttesterSession,
        request: &PeAttestationRequest,
        accumulator: &Accumulator,
    ) -> Result<(PeAttestation, Witness), ZkError> {
        let key: PrivateKeyBody = attester.decode()?;
        let session: AttesterSessionBody = session.decode()?;
        let request: AttestationRequestBody = request.decode()?;
        let accumulator: AccumulatorBody = accumulator.decode()?;
        if request.nonce != session.nonce {
            return Err(ZkError::SessionMismatch);
        }
        ensure_same_attester(&key.attester_id, &request.attester_id)?;
        ensure_same_attester(&key.attester_id, &accumulator.attester_id)?;

        let mut body = SignedClaimBody {
            attester_id: key.attester_id,
            claim: request.claim,
            claimer_commitment: request.claimer_commitment,
            witness: Uuid::new_v4().to_string(),
            accumulator_version: accumulator.version,
            accumulator_updated_at: accumulator.updated_at,
            signature: String::new(),
        };
        body.signature = attester_signature(&body.attester_id, &signed_digest(&body)?);
        tracing::debug!(attester = %body.attester_id, "privacy-enhanced attestation issued");

        let witness = Witness::encode(&WitnessBody {
            attester_id: body.attester_id.clone(),
            witness: body.witness.clone(),
        })?;
        Ok((PeAttestation::encode(&body)?, witness))
    }

    fn build_credential(
        &self,
        claimer_secret: &[u8; 32],
        session: &PeClaimerSession,
        attestation: &PeAttestation,
    ) -> Result<PeCredential, ZkError> {
        let session: ClaimerSessionBody = session.decode()?;
        let body: SignedClaimBody = attestation.decode()?;
        if session.claim != body.claim {
            return Err(ZkError::SessionMismatch);
        }
        ensure_same_attester(&session.attester_id, &body.attester_id)?;
        if body.claimer_commitment != claimer_commitment(claimer_secret) {
            return Err(ZkError::ClaimerMismatch);
        }
        if body.signature != attester_signature(&body.attester_id, &signed_digest(&body)?) {
            return Err(ZkError::InvalidSignature);
        }
        PeCredential::encode(&body)
    }

    fn revoke_attestation(
        &self,
        attester: &AttesterPrivateKey,
        accumulator: &Accumulator,
        witness: &Witness,
    ) -> Result<Accumulator, ZkError> {
        let key: PrivateKeyBody = attester.decode()?;
        let mut acc: AccumulatorBody = accumulator.decode()?;
        let witness: WitnessBody = witness.decode()?;
        ensure_same_attester(&key.attester_id, &acc.attester_id)?;
        ensure_same_attester(&key.attester_id, &witness.attester_id)?;

        acc.revoked.insert(witness.witness);
        acc.version += 1;
        acc.updated_at = Timestamp::now();
        tracing::debug!(attester = %acc.attester_id, version = acc.version, "accumulator updated");
        Accumulator::encode(&acc)
    }

    fn update_credential(
        &self,
        credential: &PeCredential,
        accumulator: &Accumulator,
    ) -> Result<PeCredential, ZkError> {
        let mut body: SignedClaimBody = credential.decode()?;
        let acc: AccumulatorBody = accumulator.decode()?;
        ensure_same_attester(&body.attester_id, &acc.attester_id)?;
        if acc.revoked.contains(&body.witness) {
            return Err(ZkError::CredentialRevoked);
        }
        body.accumulator_version = acc.version;
        body.accumulator_updated_at = acc.updated_at;
        PeCredential::encode(&body)
    }

    fn request_builder(&self) -> Box<dyn CombinedRequestBuilder> {
        Box::<MockRequestBuilder>::default()
    }

    fn build_presentation(
        &self,
        claimer_secret: &[u8; 32],
        credentials: &[PeCredential],
        request: &PeRequest,
        attester_keys: &[AttesterPublicKey],
    ) -> Result<PePresentation, ZkError> {
        let request: RequestBody = request.decode()?;
        if credentials.len() != request.requests.len() {
            return Err(ZkError::CredentialCount {
                expected: request.requests.len(),
                got: credentials.len(),
            });
        }
        let known: BTreeSet<String> = attester_keys
            .iter()
            .map(|k| k.decode::<PublicKeyBody>().map(|b| b.attester_id))
            .collect::<Result<_, _>>()?;
        let commitment = claimer_commitment(claimer_secret);

        let mut proofs = Vec::with_capacity(credentials.len());
        for (credential, sub) in credentials.iter().zip(&request.requests) {
            let body: SignedClaimBody = credential.decode()?;
            if body.claimer_commitment != commitment {
                return Err(ZkError::ClaimerMismatch);
            }
            if !known.contains(&body.attester_id) {
                return Err(ZkError::UnknownAttester {
                    attester: body.attester_id,
                });
            }
            if let Some(required) = sub.updated_after {
                if body.accumulator_updated_at < required {
                    return Err(ZkError::StaleAccumulator {
                        required,
                        actual: body.accumulator_updated_at,
                    });
                }
            }

            let attributes = flatten(&body.claim)?;
            let mut disclosed = BTreeMap::new();
            for path in &sub.requested_attributes {
                let value = attributes
                    .get(path)
                    .ok_or_else(|| ZkError::AttributeMissing { path: path.clone() })?;
                disclosed.insert(path.clone(), value.clone());
            }
            let digests = attribute_digests(&attributes)?;
            let digest = credential_digest(&CredentialCore {
                attester_id: &body.attester_id,
                claimer_commitment: &body.claimer_commitment,
                witness: &body.witness,
                attribute_digests: &digests,
            })?;
            proofs.push(ProofBody {
                binding: session_binding(&request.nonce, &digest),
                attester_id: body.attester_id,
                attribute_digests: digests,
                disclosed,
                claimer_commitment: body.claimer_commitment,
                witness: body.witness,
                accumulator_version: body.accumulator_version,
                accumulator_updated_at: body.accumulator_updated_at,
                signature: body.signature,
            });
        }

        PePresentation::encode(&PresentationBody {
            nonce: request.nonce,
            proofs,
        })
    }

    fn validate_accumulators(&self, accumulators: &[Accumulator]) -> Result<(), ZkError> {
        for accumulator in accumulators {
            accumulator.decode::<AccumulatorBody>()?;
        }
        Ok(())
    }

    fn validate_attester_keys(&self, attester_keys: &[AttesterPublicKey]) -> Result<(), ZkError> {
        for key in attester_keys {
            key.decode::<PublicKeyBody>()?;
        }
        Ok(())
    }

    fn verify_combined_presentation(
        &self,
        presentation: &PePresentation,
        session: &PeSession,
        accumulators: &[Accumulator],
        attester_keys: &[AttesterPublicKey],
    ) -> Result<PeVerification, ZkError> {
        let presentation: PresentationBody = presentation.decode()?;
        let session: RequestBody = session.decode()?;
        let accumulators: Vec<AccumulatorBody> = accumulators
            .iter()
            .map(Accumulator::decode)
            .collect::<Result<_, _>>()?;
        let attester_ids: BTreeSet<String> = attester_keys
            .iter()
            .map(|k| k.decode::<PublicKeyBody>().map(|b| b.attester_id))
            .collect::<Result<_, _>>()?;

        if presentation.nonce != session.nonce {
            tracing::warn!("presentation answers a different session");
            return Ok(PeVerification::rejected());
        }
        if presentation.proofs.len() != session.requests.len() {
            tracing::warn!(
                expected = session.requests.len(),
                got = presentation.proofs.len(),
                "presentation does not answer every sub-request"
            );
            return Ok(PeVerification::rejected());
        }

        let mut claims = Vec::with_capacity(presentation.proofs.len());
        for (index, (proof, sub)) in presentation.proofs.iter().zip(&session.requests).enumerate() {
            if let Err(reason) =
                Self::check_proof(proof, sub, &session.nonce, &accumulators, &attester_ids)
            {
                tracing::warn!(index, reason, "privacy-enhanced proof rejected");
                return Ok(PeVerification::rejected());
            }
            claims.push(unflatten(&proof.disclosed));
        }
        Ok(PeVerification {
            verified: true,
            claims,
        })
    }
}
