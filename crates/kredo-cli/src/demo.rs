//! # Demo Subcommand
//!
//! Runs the whole protocol against the in-memory ledger and the mock
//! privacy backend, printing one line per step:
//!
//! 1. attester registers a CType,
//! 2. claimer requests attestation of `{name: "Ralph", age: 12}`,
//! 3. attester checks the request and stores the attestation,
//! 4. claimer presents with nothing disclosed; the presentation verifies,
//! 5. a verifier requests `name` and accepts the claimer's answer,
//! 6. attester revokes; the same presentation no longer verifies.
//!
//! Exit code 0 when every step behaved as expected.

use anyhow::{ensure, Result};
use clap::Args;
use kredo_attestation::{Attestation, CTypeLedgerExt, InMemoryLedger, Ledger};
use kredo_core::{LedgerConfig, ProtocolConfig};
use kredo_crypto::{Identity, IdentityOptions};
use kredo_schema::CType;
use kredo_vc::{Claim, Credential, RequestForAttestation};
use kredo_verifier::{
    respond_to_claims_request, CTypePresentationRequest, PresentationRequestBuilder,
    PresentationVerifier, ResponseOptions,
};
use kredo_zkp::MockPrivacyBackend;
use serde_json::json;

#[derive(Args, Debug)]
pub struct DemoArgs {}

pub fn run_demo(_args: &DemoArgs, protocol: &ProtocolConfig, ledger: &LedgerConfig) -> Result<u8> {
    let ledger = InMemoryLedger::with_config(ledger.clone());
    let backend = MockPrivacyBackend::new();
    let (attester, _) = Identity::generate(IdentityOptions::default())?;
    let (claimer, _) = Identity::generate(IdentityOptions::default())?;
    let (verifier, _) = Identity::generate(IdentityOptions::default())?;

    let ctype = CType::from_schema(
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer" }
            }
        }),
        Some(*attester.address()),
    )?;
    ledger.submit(&ctype.store(&attester)?)?;
    step(1, format!("CType {} registered by {}", ctype.hash(), attester.address()));

    let claim = Claim::from_ctype_and_contents(
        &ctype,
        json!({ "name": "Ralph", "age": 12 })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        *claimer.address(),
    )?;
    let request = RequestForAttestation::build(&claim, &claimer, vec![], None)?;
    step(2, format!("request for attestation {}", request.root_hash));

    request.verify_data_with(protocol)?;
    let attestation = Attestation::create(&request, &attester.public_identity(), None);
    ledger.submit(&attestation.store(&attester)?)?;
    let credential = Credential::from_request_and_attestation(&claimer, &request, attestation, None)?;
    step(3, format!("attested, {} attestation(s) on ledger", ledger.attestation_count()));

    let presentation = credential.create_presentation::<&str>(&[], false);
    ensure!(
        presentation.request.claim.contents.is_empty(),
        "presentation disclosed contents"
    );
    presentation.request.verify_data_with(protocol)?;
    ensure!(
        presentation.verify(&ledger, protocol)?,
        "fresh presentation did not verify"
    );
    step(4, "empty presentation verifies".to_string());

    let mut builder = PresentationRequestBuilder::new(&backend);
    builder.request_presentation_for_ctype(CTypePresentationRequest {
        ctype_hash: Some(ctype.hash()),
        properties: vec!["name".to_string()],
        ..Default::default()
    });
    let (session, ask) = builder.finalize(false, &verifier, &claimer.public_identity())?;
    let sealed = ask.encrypt(&verifier, &claimer.public_identity())?;
    let answer = respond_to_claims_request(
        &claimer,
        &sealed.decrypt(&claimer)?,
        std::slice::from_ref(&credential),
        ResponseOptions::default(),
    )?;
    let answer = answer
        .encrypt(&claimer, &verifier.public_identity())?
        .decrypt(&verifier)?;
    let outcome = PresentationVerifier::new(&ledger, &backend, protocol)
        .verify_presentation(&answer, &session, None, None)?;
    ensure!(outcome.verified, "verifier rejected the answer");
    step(5, format!("verifier accepted {} claim(s)", outcome.claims.len()));

    ledger.submit(&Attestation::revoke(
        credential.attestation().claim_hash,
        &attester,
    )?)?;
    ensure!(
        !presentation.verify(&ledger, protocol)?,
        "revoked presentation still verifies"
    );
    step(6, "revoked, presentation no longer verifies".to_string());
    Ok(0)
}

fn step(n: u8, what: String) {
    tracing::info!(step = n, "{what}");
    println!("[{n}] {what}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_clean() {
        let code = run_demo(
            &DemoArgs {},
            &ProtocolConfig::default(),
            &LedgerConfig::default(),
        )
        .unwrap();
        assert_eq!(code, 0);
    }
}
