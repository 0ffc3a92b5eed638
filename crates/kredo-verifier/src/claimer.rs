//! Claimer side of the presentation exchange: answer a
//! `request-claims-for-ctypes` message from held credentials.

use kredo_crypto::Identity;
use kredo_vc::{Credential, VcError};
use kredo_zkp::{AttesterPublicKey, PrivacyBackend};

use crate::error::VerifierError;
use crate::message::{Message, MessageBody};

/// Material for a privacy-enhanced answer.
#[derive(Clone, Copy)]
pub struct PrivacyResponse<'a> {
    pub backend: &'a dyn PrivacyBackend,
    pub attester_keys: &'a [AttesterPublicKey],
}

#[derive(Clone, Copy, Default)]
pub struct ResponseOptions<'a> {
    /// Answer with a privacy-enhanced proof when the request allows it.
    pub privacy: Option<PrivacyResponse<'a>>,
}

/// Build the reply to `request`, using `credentials[i]` for slot `i`.
///
/// Classic answers disclose exactly the requested `contents.*` fields of
/// each credential plus its owner, which binds the claimer signature.
/// Withholding the owner takes a privacy-enhanced answer.
pub fn respond_to_claims_request(
    claimer: &Identity,
    request: &Message,
    credentials: &[Credential],
    options: ResponseOptions<'_>,
) -> Result<Message, VerifierError> {
    if &request.receiver != claimer.address() {
        return Err(VerifierError::WrongReceiver {
            receiver: request.receiver,
            identity: *claimer.address(),
        });
    }
    let MessageBody::RequestClaimsForCTypes(content) = &request.body else {
        return Err(VerifierError::UnexpectedMessage {
            expected: "request-claims-for-ctypes",
            actual: request.kind(),
        });
    };
    if credentials.len() != content.requests.len() {
        return Err(VerifierError::SlotCountMismatch {
            expected: content.requests.len(),
            got: credentials.len(),
        });
    }

    let body = match options.privacy {
        Some(privacy) if content.allow_privacy_enhancement => {
            let pe_request = content.privacy_enhanced.as_ref().ok_or(
                VerifierError::PrivacyEnhancementUnavailable("request carries no privacy-enhanced part"),
            )?;
            let secret = claimer
                .privacy_secret()
                .ok_or(VcError::IdentityNotPrivacyEnabled)?;
            let pe_credentials = credentials
                .iter()
                .map(|c| {
                    c.privacy_enhanced().cloned().ok_or(
                        VerifierError::PrivacyEnhancementUnavailable(
                            "credential has no privacy-enhanced part",
                        ),
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            let presentation = privacy.backend.build_presentation(
                secret,
                &pe_credentials,
                pe_request,
                privacy.attester_keys,
            )?;
            MessageBody::SubmitClaimsForCTypesPe(presentation)
        }
        _ => MessageBody::SubmitClaimsForCTypesClassic(
            credentials
                .iter()
                .zip(&content.requests)
                .map(|(credential, slot)| {
                    credential.create_presentation(&slot.content_fields(), false)
                })
                .collect(),
        ),
    };

    tracing::debug!(
        in_reply_to = %request.message_id,
        kind = body.kind(),
        slots = credentials.len(),
        "claims request answered"
    );
    Ok(Message::reply_to(request, body))
}
