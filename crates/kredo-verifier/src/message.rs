//! # Messages
//!
//! Everything exchanged between claimer, attester and verifier travels as a
//! [`Message`] with a tagged [`MessageBody`]. Receivers dispatch on the tag
//! and never on the shape of the payload.
//!
//! On the wire a message is sealed into an [`EncryptedMessage`]: the JSON
//! encoding is boxed for the receiver's X25519 key, and the sender signs
//! `SHA-256(sender box key ‖ ciphertext)` with its Ed25519 key so the
//! receiver can attribute the envelope before decrypting it.
//!
//! ## Security Invariant
//!
//! [`EncryptedMessage::decrypt`] returns a message only if the envelope is
//! addressed to the decrypting identity, the signature is from the envelope
//! sender, and the decrypted header (id, sender, receiver) equals the
//! envelope header.

use kredo_attestation::Attestation;
use kredo_core::{Address, ContentDigest, Timestamp};
use kredo_crypto::{verify, BoxPublicKey, Ed25519Signature, Identity, PublicIdentity};
use kredo_vc::{AttestedClaim, RequestForAttestation};
use kredo_zkp::{PeAttestation, PePresentation, PeRequest};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::VerifierError;

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAttestationForClaim {
    pub request_for_attestation: RequestForAttestation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttestationForClaim {
    pub attestation: Attestation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_enhanced: Option<PeAttestation>,
}

/// One schema-scoped slot of a claims request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctype_hash: Option<ContentDigest>,
    /// Absolute property paths the answer must disclose.
    pub properties: Vec<String>,
}

impl ClaimRequest {
    /// Claim field names requested under `contents.`.
    pub fn content_fields(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter_map(|p| p.strip_prefix("contents."))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestClaimsForCTypes {
    pub requests: Vec<ClaimRequest>,
    pub allow_privacy_enhancement: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_enhanced: Option<PeRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum MessageBody {
    RequestAttestationForClaim(RequestAttestationForClaim),
    SubmitAttestationForClaim(SubmitAttestationForClaim),
    RequestClaimsForCTypes(RequestClaimsForCTypes),
    SubmitClaimsForCTypesClassic(Vec<AttestedClaim>),
    SubmitClaimsForCTypesPe(PePresentation),
}

impl MessageBody {
    /// The wire tag of this body.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RequestAttestationForClaim(_) => "request-attestation-for-claim",
            Self::SubmitAttestationForClaim(_) => "submit-attestation-for-claim",
            Self::RequestClaimsForCTypes(_) => "request-claims-for-ctypes",
            Self::SubmitClaimsForCTypesClassic(_) => "submit-claims-for-ctypes-classic",
            Self::SubmitClaimsForCTypesPe(_) => "submit-claims-for-ctypes-pe",
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: String,
    pub created_at: Timestamp,
    pub sender: Address,
    pub receiver: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<String>,
    pub body: MessageBody,
}

impl Message {
    pub fn new(body: MessageBody, sender: Address, receiver: Address) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            created_at: Timestamp::now(),
            sender,
            receiver,
            in_reply_to: None,
            body,
        }
    }

    /// A message answering `request`, addressed back to its sender.
    pub fn reply_to(request: &Message, body: MessageBody) -> Self {
        Self {
            in_reply_to: Some(request.message_id.clone()),
            ..Self::new(body, request.receiver, request.sender)
        }
    }

    pub fn kind(&self) -> &'static str {
        self.body.kind()
    }

    /// Seal this message for `receiver`. `sender` must be the message sender.
    pub fn encrypt(
        &self,
        sender: &Identity,
        receiver: &PublicIdentity,
    ) -> Result<EncryptedMessage, VerifierError> {
        if &self.sender != sender.address() {
            return Err(VerifierError::EnvelopeMismatch { field: "sender" });
        }
        if self.receiver != receiver.address {
            return Err(VerifierError::EnvelopeMismatch { field: "receiver" });
        }
        let plaintext = serde_json::to_vec(self)?;
        let ciphertext = sender.encrypt_asymmetric(&plaintext, &receiver.box_public_key)?;
        let sender_box_key = sender.box_public_key();
        let hash = envelope_hash(&sender_box_key, &ciphertext);
        let signature = sender.sign(hash.as_bytes());

        tracing::debug!(
            message_id = %self.message_id,
            kind = self.kind(),
            receiver = %self.receiver,
            "message sealed"
        );
        Ok(EncryptedMessage {
            message_id: self.message_id.clone(),
            created_at: self.created_at,
            sender: self.sender,
            receiver: self.receiver,
            sender_box_key,
            ciphertext: hex::encode(ciphertext),
            hash,
            signature,
        })
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedMessage {
    pub message_id: String,
    pub created_at: Timestamp,
    pub sender: Address,
    pub receiver: Address,
    pub sender_box_key: BoxPublicKey,
    /// Hex-encoded box ciphertext.
    pub ciphertext: String,
    pub hash: ContentDigest,
    pub signature: Ed25519Signature,
}

impl EncryptedMessage {
    /// Open the envelope as `receiver`.
    pub fn decrypt(&self, receiver: &Identity) -> Result<Message, VerifierError> {
        if &self.receiver != receiver.address() {
            return Err(VerifierError::WrongReceiver {
                receiver: self.receiver,
                identity: *receiver.address(),
            });
        }
        let ciphertext = hex::decode(&self.ciphertext)
            .map_err(|e| kredo_crypto::CryptoError::Decryption(format!("ciphertext hex: {e}")))?;
        if envelope_hash(&self.sender_box_key, &ciphertext) != self.hash {
            return Err(VerifierError::EnvelopeHashMismatch);
        }
        if !verify(self.hash.as_bytes(), &self.signature, &self.sender) {
            tracing::warn!(message_id = %self.message_id, sender = %self.sender, "envelope signature rejected");
            return Err(VerifierError::EnvelopeSignatureInvalid {
                sender: self.sender,
            });
        }

        let plaintext = receiver.decrypt_asymmetric(&ciphertext, &self.sender_box_key)?;
        let message: Message = serde_json::from_slice(&plaintext)?;
        if message.message_id != self.message_id {
            return Err(VerifierError::EnvelopeMismatch { field: "messageId" });
        }
        if message.sender != self.sender {
            return Err(VerifierError::EnvelopeMismatch { field: "sender" });
        }
        if message.receiver != self.receiver {
            return Err(VerifierError::EnvelopeMismatch { field: "receiver" });
        }
        Ok(message)
    }
}

fn envelope_hash(sender_box_key: &BoxPublicKey, ciphertext: &[u8]) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(sender_box_key.0);
    hasher.update(ciphertext);
    ContentDigest::from_bytes(hasher.finalize().into())
}
