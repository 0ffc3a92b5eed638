//! # kredo-attestation — Attestation Lifecycle
//!
//! An [`Attestation`] is an attester's vouching for the root hash of a
//! request for attestation. Its validity is never a local property: it is a
//! predicate evaluated against ledger state at query time.
//!
//! ## States
//!
//! ```text
//! Unattested ──(AddAttestation)──▶ Attested ──(RevokeAttestation)──▶ Revoked
//! ```
//!
//! `Revoked` is terminal. A second revocation is rejected by the ledger with
//! [`LedgerError::AlreadyRevoked`] and leaves the record untouched.
//!
//! ## Ledger Collaborator
//!
//! The [`Ledger`] trait is the synchronous request/response contract the
//! protocol consumes. [`InMemoryLedger`] is the reference implementation
//! used by tests and the CLI demo. Transport, fees and retries belong to
//! real ledger clients and are not modelled here.
//!
//! ## Crate Policy
//!
//! - Ledger-state errors are propagated unchanged and never retried.
//! - Every transaction is signed by its submitter over its canonical bytes.

pub mod attestation;
pub mod ctype;
pub mod error;
pub mod ledger;
pub mod memory;

pub use attestation::{AttestableRequest, Attestation, AttestationStatus};
pub use ctype::CTypeLedgerExt;
pub use error::{AttestationError, LedgerError};
pub use ledger::{CTypeRecord, DelegationNode, Ledger, SignedTransaction, Transaction};
pub use memory::InMemoryLedger;
