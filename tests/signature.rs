use course_payments::domain::error::PaymentError;
use course_payments::webhook::signature::{sign, verify, SignatureVerifier};

const SECRET: &str = "whsec_course_payments_test";

#[test]
fn signed_payload_verifies() {
    let payload = br#"{"type":"TRANSACTION","obj":{"id":1}}"#;
    let signature = sign(payload, SECRET);
    assert!(verify(payload, &signature, SECRET));
}

#[test]
fn payload_bit_flip_rejects() {
    let payload = b"{\"amount_cents\":50000}".to_vec();
    let signature = sign(&payload, SECRET);

    let mut tampered = payload.clone();
    tampered[3] ^= 0x01;
    assert!(!verify(&tampered, &signature, SECRET));
}

#[test]
fn signature_bit_flip_rejects() {
    let payload = b"{\"amount_cents\":50000}";
    let signature = sign(payload, SECRET);

    let mut chars: Vec<char> = signature.chars().collect();
    chars[0] = if chars[0] == '0' { '1' } else { '0' };
    let tampered: String = chars.into_iter().collect();
    assert!(!verify(payload, &tampered, SECRET));
}

#[test]
fn wrong_secret_rejects() {
    let payload = b"{}";
    let signature = sign(payload, SECRET);
    assert!(!verify(payload, &signature, "some-other-secret"));
}

#[test]
fn malformed_hex_rejects() {
    assert!(!verify(b"{}", "zz-not-hex", SECRET));
}

#[test]
fn truncated_signature_rejects() {
    let payload = b"{}";
    let signature = sign(payload, SECRET);
    assert!(!verify(payload, &signature[..signature.len() - 2], SECRET));
}

#[test]
fn empty_signature_rejects() {
    assert!(!verify(b"{}", "", SECRET));
}

#[test]
fn verifier_accepts_valid_signature() {
    let verifier = SignatureVerifier::new(Some(SECRET.to_string()));
    let payload = b"payload bytes";
    let signature = sign(payload, SECRET);
    assert!(verifier.require(payload, &signature).is_ok());
}

#[test]
fn verifier_rejects_mismatch() {
    let verifier = SignatureVerifier::new(Some(SECRET.to_string()));
    let result = verifier.require(b"payload", &sign(b"other payload", SECRET));
    assert!(matches!(result, Err(PaymentError::SignatureInvalid)));
}

#[test]
fn missing_secret_fails_closed() {
    let verifier = SignatureVerifier::new(None);
    let payload = b"payload";
    let result = verifier.require(payload, &sign(payload, SECRET));
    assert!(matches!(result, Err(PaymentError::WebhookSecretMissing)));
}

#[test]
fn empty_secret_counts_as_missing() {
    let verifier = SignatureVerifier::new(Some(String::new()));
    assert!(!verifier.has_secret());
}
