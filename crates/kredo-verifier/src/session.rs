//! # Verifier Session
//!
//! A verifier states what it wants to see with a
//! [`PresentationRequestBuilder`], one call per schema-scoped slot, then
//! finalizes it into a private [`VerifierSession`] and a
//! `request-claims-for-ctypes` [`Message`] for the claimer.
//!
//! The builder is single use: `finalize` consumes it. The session never
//! leaves the verifier and is intentionally not serializable.

use kredo_core::{Address, ContentDigest, Timestamp};
use kredo_crypto::{Identity, PublicIdentity};
use kredo_zkp::{CombinedRequestBuilder, PartialPresentationRequest, PeSession, PrivacyBackend};

use crate::error::VerifierError;
use crate::message::{ClaimRequest, Message, MessageBody, RequestClaimsForCTypes};

pub const CTYPE_HASH_PATH: &str = "ctypeHash";
pub const LEGITIMATIONS_PATH: &str = "legitimations";
pub const DELEGATION_ID_PATH: &str = "delegationId";

/// What one slot of a presentation request asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CTypePresentationRequest {
    /// Require a claim of this CType. Also requests the `ctypeHash` path.
    pub ctype_hash: Option<ContentDigest>,
    /// Claim field names to disclose.
    pub properties: Vec<String>,
    pub legitimations: bool,
    pub delegation: bool,
    /// Privacy-enhanced answers must carry revocation state newer than this.
    pub updated_after: Option<Timestamp>,
}

impl CTypePresentationRequest {
    fn property_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .properties
            .iter()
            .map(|p| format!("contents.{p}"))
            .collect();
        if self.ctype_hash.is_some() {
            paths.push(CTYPE_HASH_PATH.to_string());
        }
        if self.legitimations {
            paths.push(LEGITIMATIONS_PATH.to_string());
        }
        if self.delegation {
            paths.push(DELEGATION_ID_PATH.to_string());
        }
        paths
    }
}

pub struct PresentationRequestBuilder {
    requests: Vec<ClaimRequest>,
    privacy: Box<dyn CombinedRequestBuilder>,
}

impl PresentationRequestBuilder {
    pub fn new(backend: &dyn PrivacyBackend) -> Self {
        Self {
            requests: Vec::new(),
            privacy: backend.request_builder(),
        }
    }

    /// Append a slot. The privacy-enhanced sub-request receives only the
    /// paths that exist inside a claim (`contents.*` and `ctypeHash`).
    pub fn request_presentation_for_ctype(&mut self, request: CTypePresentationRequest) -> &mut Self {
        let properties = request.property_paths();
        let claim_paths = properties
            .iter()
            .filter(|p| p.starts_with("contents.") || p.as_str() == CTYPE_HASH_PATH)
            .cloned()
            .collect();
        self.privacy.request_presentation(PartialPresentationRequest {
            requested_attributes: claim_paths,
            updated_after: request.updated_after,
        });
        self.requests.push(ClaimRequest {
            ctype_hash: request.ctype_hash,
            properties,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Conclude the request. Returns the verifier-private session and the
    /// message for `claimer`.
    pub fn finalize(
        self,
        allow_privacy_enhancement: bool,
        verifier: &Identity,
        claimer: &PublicIdentity,
    ) -> Result<(VerifierSession, Message), VerifierError> {
        if self.requests.is_empty() {
            return Err(VerifierError::EmptyRequest);
        }
        let (pe_session, pe_request) = self.privacy.finalize()?;

        let message = Message::new(
            MessageBody::RequestClaimsForCTypes(RequestClaimsForCTypes {
                requests: self.requests.clone(),
                allow_privacy_enhancement,
                privacy_enhanced: allow_privacy_enhancement.then_some(pe_request),
            }),
            *verifier.address(),
            claimer.address,
        );
        tracing::info!(
            message_id = %message.message_id,
            slots = self.requests.len(),
            allow_privacy_enhancement,
            "presentation request finalized"
        );

        let session = VerifierSession {
            request_id: message.message_id.clone(),
            verifier: *verifier.address(),
            claimer: claimer.address,
            requests: self.requests,
            allow_privacy_enhancement,
            pe_session,
        };
        Ok((session, message))
    }
}

impl std::fmt::Debug for PresentationRequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentationRequestBuilder")
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}

/// Verifier-private state of one presentation request.
#[derive(Debug, Clone)]
pub struct VerifierSession {
    request_id: String,
    verifier: Address,
    claimer: Address,
    requests: Vec<ClaimRequest>,
    allow_privacy_enhancement: bool,
    pe_session: PeSession,
}

impl VerifierSession {
    /// Message id of the request this session belongs to.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn verifier(&self) -> &Address {
        &self.verifier
    }

    pub fn claimer(&self) -> &Address {
        &self.claimer
    }

    pub fn requests(&self) -> &[ClaimRequest] {
        &self.requests
    }

    /// Requested property paths, one list per slot.
    pub fn requested_properties(&self) -> impl Iterator<Item = &[String]> {
        self.requests.iter().map(|r| r.properties.as_slice())
    }

    pub fn allows_privacy_enhancement(&self) -> bool {
        self.allow_privacy_enhancement
    }

    pub(crate) fn pe_session(&self) -> &PeSession {
        &self.pe_session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kredo_zkp::MockPrivacyBackend;

    fn verifier() -> Identity {
        Identity::from_seed([0x0E; 32])
    }

    fn claimer() -> PublicIdentity {
        Identity::from_seed([0xC1; 32]).public_identity()
    }

    #[test]
    fn paths_include_markers() {
        let request = CTypePresentationRequest {
            ctype_hash: Some(ContentDigest::from_bytes([1u8; 32])),
            properties: vec!["name".into()],
            legitimations: true,
            delegation: true,
            updated_after: None,
        };
        assert_eq!(
            request.property_paths(),
            vec!["contents.name", "ctypeHash", "legitimations", "delegationId"]
        );
    }

    #[test]
    fn finalize_builds_addressed_request() {
        let backend = MockPrivacyBackend::new();
        let mut builder = PresentationRequestBuilder::new(&backend);
        builder
            .request_presentation_for_ctype(CTypePresentationRequest {
                properties: vec!["name".into()],
                ..Default::default()
            })
            .request_presentation_for_ctype(CTypePresentationRequest {
                properties: vec!["age".into()],
                ..Default::default()
            });
        assert_eq!(builder.len(), 2);

        let (session, message) = builder.finalize(false, &verifier(), &claimer()).unwrap();
        assert_eq!(message.receiver, claimer().address);
        assert_eq!(session.request_id(), message.message_id);
        assert_eq!(
            session.requested_properties().collect::<Vec<_>>(),
            vec![&["contents.name".to_string()][..], &["contents.age".to_string()][..]]
        );
        let MessageBody::RequestClaimsForCTypes(body) = &message.body else {
            panic!("unexpected body {}", message.kind());
        };
        assert!(body.privacy_enhanced.is_none());
        assert!(!session.allows_privacy_enhancement());
    }

    #[test]
    fn privacy_request_travels_only_when_allowed() {
        let backend = MockPrivacyBackend::new();
        let mut builder = PresentationRequestBuilder::new(&backend);
        builder.request_presentation_for_ctype(CTypePresentationRequest {
            properties: vec!["name".into()],
            ..Default::default()
        });
        let (session, message) = builder.finalize(true, &verifier(), &claimer()).unwrap();
        let MessageBody::RequestClaimsForCTypes(body) = &message.body else {
            panic!("unexpected body {}", message.kind());
        };
        assert!(body.privacy_enhanced.is_some());
        assert!(session.allows_privacy_enhancement());
    }

    #[test]
    fn empty_builder_cannot_finalize() {
        let backend = MockPrivacyBackend::new();
        let builder = PresentationRequestBuilder::new(&backend);
        assert!(matches!(
            builder.finalize(false, &verifier(), &claimer()),
            Err(VerifierError::EmptyRequest)
        ));
    }
}
