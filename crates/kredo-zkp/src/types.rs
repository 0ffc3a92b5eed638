//! Opaque wire types of the privacy-enhancement capability.
//!
//! Each type wraps the backend's own JSON encoding. Only the backend that
//! produced a value interprets it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ZkError;

macro_rules! opaque {
    ($($(#[$meta:meta])* $name:ident => $kind:literal;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub Value);

            impl $name {
                pub(crate) const KIND: &'static str = $kind;

                pub(crate) fn encode<T: Serialize>(inner: &T) -> Result<Self, ZkError> {
                    serde_json::to_value(inner)
                        .map(Self)
                        .map_err(|source| ZkError::Malformed { kind: Self::KIND, source })
                }

                pub(crate) fn decode<T: DeserializeOwned>(&self) -> Result<T, ZkError> {
                    serde_json::from_value(self.0.clone())
                        .map_err(|source| ZkError::Malformed { kind: Self::KIND, source })
                }
            }
        )*
    };
}

opaque! {
    /// An attester's public issuing key.
    AttesterPublicKey => "attester public key";
    /// An attester's private issuing key. Held by the attester only.
    AttesterPrivateKey => "attester private key";
    /// Revocation accumulator published by an attester.
    Accumulator => "accumulator";
    /// Revocation handle of one issued credential. Held by the attester.
    Witness => "witness";
    /// Attester-side state of one attestation exchange.
    PeAttesterSession => "attester session";
    /// First message of the attestation exchange, attester to claimer.
    PeInitiateAttestation => "initiate attestation";
    /// Claimer-side state of one attestation exchange.
    PeClaimerSession => "claimer session";
    /// Claimer's request for a privacy-enhanced attestation.
    PeAttestationRequest => "attestation request";
    /// Attester's signature over a claim, before the claimer finalizes it.
    PeAttestation => "attestation";
    /// Claimer-held privacy-enhanced credential.
    PeCredential => "credential";
    /// Verifier-private state of a combined presentation request.
    PeSession => "verifier session";
    /// Combined presentation request sent to the claimer.
    PeRequest => "presentation request";
    /// Combined presentation answering a [`PeRequest`].
    PePresentation => "presentation";
}

/// Result of verifying a combined presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeVerification {
    pub verified: bool,
    /// One disclosed partial claim per sub-request, empty if not verified.
    pub claims: Vec<Value>,
}

impl PeVerification {
    pub fn rejected() -> Self {
        Self {
            verified: false,
            claims: Vec::new(),
        }
    }
}
