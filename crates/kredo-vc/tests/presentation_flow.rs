//! End-to-end claimer / attester / verifier flow against the in-memory
//! ledger: build, attest, present, verify, revoke.

use kredo_attestation::{Attestation, CTypeLedgerExt, InMemoryLedger, Ledger, LedgerError};
use kredo_core::ProtocolConfig;
use kredo_crypto::Identity;
use kredo_schema::CType;
use kredo_vc::{AttestedClaim, Claim, Credential, RequestForAttestation, VcError};
use serde_json::{json, Map, Value};

struct World {
    ledger: InMemoryLedger,
    attester: Identity,
    claimer: Identity,
    ctype: CType,
}

fn contents(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn world() -> World {
    let attester = Identity::from_seed([0xA1; 32]);
    let claimer = Identity::from_seed([0xC1; 32]);
    let ctype = CType::from_schema(
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer" }
            }
        }),
        Some(*attester.address()),
    )
    .unwrap();
    let ledger = InMemoryLedger::new();
    ledger.submit(&ctype.store(&attester).unwrap()).unwrap();
    World {
        ledger,
        attester,
        claimer,
        ctype,
    }
}

fn attest(world: &World, contents_json: Value) -> Credential {
    let claim = Claim::from_ctype_and_contents(
        &world.ctype,
        contents(contents_json),
        *world.claimer.address(),
    )
    .unwrap();
    let request = RequestForAttestation::build(&claim, &world.claimer, vec![], None).unwrap();

    // Attester side: the request must be intact before vouching for it.
    request.verify_data().unwrap();
    let attestation = Attestation::create(&request, &world.attester.public_identity(), None);
    world
        .ledger
        .submit(&attestation.store(&world.attester).unwrap())
        .unwrap();

    Credential::from_request_and_attestation(&world.claimer, &request, attestation, None).unwrap()
}

#[test]
fn ralph_presents_nothing_and_is_later_revoked() {
    let world = world();
    let config = ProtocolConfig::default();
    let credential = attest(&world, json!({ "name": "Ralph", "age": 12 }));

    let presentation = credential.create_presentation::<&str>(&[], false);
    assert!(presentation.request.claim.contents.is_empty());
    assert_eq!(
        presentation.request.claim.owner.as_ref(),
        Some(world.claimer.address())
    );
    presentation.request.verify_data().unwrap();
    assert!(presentation.verify(&world.ledger, &config).unwrap());

    let revoke = Attestation::revoke(presentation.attestation.claim_hash, &world.attester).unwrap();
    world.ledger.submit(&revoke).unwrap();
    assert!(!presentation.verify(&world.ledger, &config).unwrap());
    assert!(!presentation.verify(&world.ledger, &config).unwrap());

    // A second revocation is rejected and leaves the record revoked.
    let again = Attestation::revoke(presentation.attestation.claim_hash, &world.attester).unwrap();
    assert!(matches!(
        world.ledger.submit(&again),
        Err(LedgerError::AlreadyRevoked { .. })
    ));
    assert!(!presentation.verify(&world.ledger, &config).unwrap());
}

#[test]
fn selective_disclosure_keeps_presentation_verifiable() {
    let world = world();
    let config = ProtocolConfig::default();
    let credential = attest(&world, json!({ "name": "Ralph", "age": 12 }));

    let presentation = credential.create_presentation(&["name"], false);
    assert_eq!(
        presentation.get_attributes().into_iter().collect::<Vec<_>>(),
        vec!["name".to_string()]
    );
    assert!(presentation.request.claim_hash_tree["age"].nonce.is_none());
    assert!(presentation.verify(&world.ledger, &config).unwrap());

    // Without the owner nothing binds the claimer signature.
    let anonymous = credential.create_presentation(&["name"], true);
    assert!(anonymous.request.claim.owner.is_none());
    assert_eq!(anonymous.request.root_hash, presentation.request.root_hash);
    assert!(!anonymous.verify(&world.ledger, &config).unwrap());

    // The retained credential is not affected by the redaction.
    assert_eq!(credential.request().claim.contents.len(), 2);
    assert!(credential.request().claim.owner.is_some());
}

#[test]
fn schema_violations_stop_claim_construction() {
    let world = world();
    let result = Claim::from_ctype_and_contents(
        &world.ctype,
        contents(json!({ "name": "Ralph", "age": "twelve" })),
        *world.claimer.address(),
    );
    assert!(matches!(result, Err(VcError::Schema(_))));
}

#[test]
fn attester_vouches_with_legitimation() {
    let world = world();
    let config = ProtocolConfig::default();
    let authority = attest(&world, json!({ "name": "Attester Guild" }));

    let claim = Claim::from_ctype_and_contents(
        &world.ctype,
        contents(json!({ "name": "Ralph" })),
        *world.claimer.address(),
    )
    .unwrap();
    let legitimation = authority.create_presentation(&["name"], false);
    let request =
        RequestForAttestation::build(&claim, &world.claimer, vec![legitimation], None).unwrap();
    let attestation = Attestation::create(&request, &world.attester.public_identity(), None);
    world
        .ledger
        .submit(&attestation.store(&world.attester).unwrap())
        .unwrap();

    let presented = AttestedClaim::new(request.redact::<&str>(&[], false), attestation);
    assert!(presented.verify(&world.ledger, &config).unwrap());

    // Revoking the embedded legitimation invalidates the parent.
    let revoke = Attestation::revoke(authority.attestation().claim_hash, &world.attester).unwrap();
    world.ledger.submit(&revoke).unwrap();
    assert!(!presented.verify(&world.ledger, &config).unwrap());
}

#[test]
fn compressed_presentation_survives_transport() {
    let world = world();
    let credential = attest(&world, json!({ "name": "Ralph", "age": 12 }));
    let presentation = credential.create_presentation(&["age"], false);

    let wire = serde_json::to_string(&presentation.compress().unwrap()).unwrap();
    let restored = AttestedClaim::decompress(serde_json::from_str(&wire).unwrap()).unwrap();
    assert_eq!(restored, presentation);
    assert!(restored
        .verify(&world.ledger, &ProtocolConfig::default())
        .unwrap());
}
