//! # kredo-verifier — Presentation Exchange
//!
//! The message layer and the verifier session protocol:
//!
//! - [`message`]: tagged message bodies and encrypted, signed envelopes.
//! - [`session`]: the verifier's request builder and private session.
//! - [`claimer`]: answering a presentation request from held credentials.
//! - [`verify`]: checking an answer in classic or privacy-enhanced mode.
//!
//! ```text
//! verifier: PresentationRequestBuilder ─finalize─▶ (VerifierSession, request)
//! claimer:  respond_to_claims_request(request, credentials) ─▶ answer
//! verifier: PresentationVerifier::verify_presentation(answer, session)
//! ```

pub mod claimer;
pub mod error;
pub mod message;
pub mod session;
pub mod verify;

pub use claimer::{respond_to_claims_request, PrivacyResponse, ResponseOptions};
pub use error::VerifierError;
pub use message::{
    ClaimRequest, EncryptedMessage, Message, MessageBody, RequestAttestationForClaim,
    RequestClaimsForCTypes, SubmitAttestationForClaim,
};
pub use session::{CTypePresentationRequest, PresentationRequestBuilder, VerifierSession};
pub use verify::{DisclosedClaim, PresentationVerifier, VerificationOutcome};
