use kredo_core::Address;
use thiserror::Error;

/// Errors raised by the message layer and the verifier session protocol.
///
/// A presentation that simply fails to verify is not an error; it is a
/// [`crate::VerificationOutcome`] with `verified == false`.
#[derive(Error, Debug)]
pub enum VerifierError {
    /// A privacy-enhanced presentation arrived for a session that did not
    /// allow privacy enhancement.
    #[error("message type error: privacy-enhanced presentation not allowed by this session")]
    MessageTypeError,

    /// Accumulators or attester keys are absent, empty or not decodable
    /// by the backend.
    #[error(
        "privacy-enhanced verification needs accumulators and attester keys \
         (missing accumulators: {missing_accumulators}, missing keys: {missing_keys})"
    )]
    PrivacyEnhancementVerificationError {
        missing_accumulators: bool,
        missing_keys: bool,
    },

    #[error(
        "unsupported message type `{actual}`, expected submit-claims-for-ctypes-classic \
         or submit-claims-for-ctypes-pe"
    )]
    UnsupportedMessageType { actual: &'static str },

    #[error("expected a {expected} message, got {actual}")]
    UnexpectedMessage {
        expected: &'static str,
        actual: &'static str,
    },

    /// A claims request was answered with the wrong number of credentials.
    #[error("request has {expected} slot(s), got {got} credential(s)")]
    SlotCountMismatch { expected: usize, got: usize },

    /// A privacy-enhanced answer was attempted without the material for it.
    #[error("cannot answer privacy-enhanced request: {0}")]
    PrivacyEnhancementUnavailable(&'static str),

    #[error("no request builder entries; call request_presentation_for_ctype first")]
    EmptyRequest,

    /// The envelope is addressed to someone else.
    #[error("message addressed to {receiver}, not {identity}")]
    WrongReceiver { receiver: Address, identity: Address },

    #[error("ciphertext hash does not match envelope")]
    EnvelopeHashMismatch,

    #[error("envelope signature is not from sender {sender}")]
    EnvelopeSignatureInvalid { sender: Address },

    /// The decrypted message disagrees with the envelope around it.
    #[error("decrypted message does not match its envelope: {field}")]
    EnvelopeMismatch { field: &'static str },

    #[error("message encoding: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error(transparent)]
    Crypto(#[from] kredo_crypto::CryptoError),

    #[error(transparent)]
    Credential(#[from] kredo_vc::VcError),

    #[error(transparent)]
    Ledger(#[from] kredo_attestation::LedgerError),

    #[error(transparent)]
    Zk(#[from] kredo_zkp::ZkError),
}
