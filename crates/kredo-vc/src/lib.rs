//! # kredo-vc — Claims, Requests and Presentations
//!
//! The claimer side of the protocol:
//!
//! - [`Claim`]: field values asserted under a CType, owned by an address.
//! - [`RequestForAttestation`]: a claim wrapped in a salted hash tree with an
//!   aggregate root hash signed by the claimer.
//! - [`AttestedClaim`]: a (possibly redacted) request plus its attestation.
//!   Legitimations are attested claims nested inside a request.
//! - [`Credential`]: the claimer's retained, unredacted request and
//!   attestation, optionally with a privacy-enhanced credential, from which
//!   disposable presentations are derived.
//!
//! ## Security Invariants
//!
//! - Every hashed unit has its own nonce. Redaction strips nonces and
//!   plaintext but keeps hashes, so the root hash still re-verifies.
//! - Redaction is a pure function. It returns a new value and never touches
//!   the claimer's retained original.
//! - Legitimation chains are depth-bounded by
//!   [`ProtocolConfig::max_legitimation_depth`](kredo_core::ProtocolConfig)
//!   and rejected when an ancestor root hash reappears.

pub mod attested;
pub mod claim;
pub mod credential;
pub mod error;
pub mod hash_tree;
pub mod request;

pub use attested::AttestedClaim;
pub use claim::{Claim, PartialClaim};
pub use credential::{Credential, PrivacyEnhancedIssuance};
pub use error::VcError;
pub use hash_tree::{ClaimHashTree, NonceHash};
pub use request::RequestForAttestation;
