//! Signature oracle used to gate writes.
//!
//! An address is the hex SHA-256 of a compressed secp256k1 public key. A
//! signature is base64 of 65 bytes: the recovery id followed by the compact
//! ECDSA signature over SHA-256 of the message. Verification recovers the
//! public key, derives its address and compares it with the claimed one.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{ChainError, Result};

static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Checks that `signature` over `message` was produced by the owner of `address`.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, address: &str, message: &str, signature: &str) -> bool;
}

impl<F> SignatureVerifier for F
where
    F: Fn(&str, &str, &str) -> bool + Send + Sync,
{
    fn verify(&self, address: &str, message: &str, signature: &str) -> bool {
        self(address, message, signature)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Verifier;

impl SignatureVerifier for Secp256k1Verifier {
    fn verify(&self, address: &str, message: &str, signature: &str) -> bool {
        match recover_address(message, signature) {
            Ok(recovered) => recovered == address,
            Err(e) => {
                debug!("signature recovery failed: {e}");
                false
            }
        }
    }
}

fn message_digest(message: &str) -> Message {
    let digest: [u8; 32] = Sha256::digest(message.as_bytes()).into();
    Message::from_digest(digest)
}

pub fn address_of(public_key: &PublicKey) -> String {
    hex::encode(Sha256::digest(public_key.serialize()))
}

/// Fresh random secret key, hex-encoded.
pub fn generate_secret_hex() -> String {
    let secret = SecretKey::new(&mut secp256k1::rand::thread_rng());
    hex::encode(secret.secret_bytes())
}

/// Address owned by the given hex-encoded secret key.
pub fn address_from_secret_hex(secret_hex: &str) -> Result<String> {
    let secret = secret_from_hex(secret_hex)?;
    Ok(address_of(&PublicKey::from_secret_key(
        &SECP256K1_CONTEXT,
        &secret,
    )))
}

fn secret_from_hex(secret_hex: &str) -> Result<SecretKey> {
    let bytes = hex::decode(secret_hex.trim())
        .map_err(|e| ChainError::Decoding(format!("secret key hex: {e}")))?;
    SecretKey::from_slice(&bytes).map_err(|e| ChainError::Decoding(format!("secret key: {e}")))
}

/// Sign `message` with a hex-encoded secret key, producing a signature
/// accepted by [`Secp256k1Verifier`].
pub fn sign_message(secret_hex: &str, message: &str) -> Result<String> {
    let secret = secret_from_hex(secret_hex)?;
    let signature = SECP256K1_CONTEXT.sign_ecdsa_recoverable(&message_digest(message), &secret);
    let (recovery_id, compact) = signature.serialize_compact();
    let mut bytes = Vec::with_capacity(65);
    bytes.push(recovery_id.to_i32() as u8);
    bytes.extend_from_slice(&compact);
    Ok(STANDARD.encode(bytes))
}

/// Recover the signer's address from a base64 recoverable signature.
pub fn recover_address(message: &str, signature: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(signature.trim())
        .map_err(|e| ChainError::Decoding(format!("signature base64: {e}")))?;
    let Some((&recovery_byte, compact)) = bytes.split_first() else {
        return Err(ChainError::Decoding("empty signature".into()));
    };
    if compact.len() != 64 {
        return Err(ChainError::Decoding(format!(
            "signature must be 65 bytes, got {}",
            bytes.len()
        )));
    }
    let recovery_id = RecoveryId::from_i32(i32::from(recovery_byte))
        .map_err(|e| ChainError::Decoding(format!("recovery id: {e}")))?;
    let signature = RecoverableSignature::from_compact(compact, recovery_id)
        .map_err(|e| ChainError::Decoding(format!("signature: {e}")))?;
    let public_key = SECP256K1_CONTEXT
        .recover_ecdsa(&message_digest(message), &signature)
        .map_err(|e| ChainError::Decoding(format!("public key recovery: {e}")))?;
    Ok(address_of(&public_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "4242424242424242424242424242424242424242424242424242424242424242";
    const OTHER_SECRET: &str = "0101010101010101010101010101010101010101010101010101010101010101";

    #[test]
    fn address_is_hex_sha256() {
        let address = address_from_secret_hex(SECRET).unwrap();
        assert_eq!(address.len(), 64);
        assert!(hex::decode(&address).is_ok());
    }

    #[test]
    fn verifies_own_signature() {
        let address = address_from_secret_hex(SECRET).unwrap();
        let message = "someaddr:1600000000:starRegistry";
        let signature = sign_message(SECRET, message).unwrap();
        assert!(Secp256k1Verifier.verify(&address, message, &signature));
    }

    #[test]
    fn rejects_other_signer_and_other_message() {
        let address = address_from_secret_hex(SECRET).unwrap();
        let message = "someaddr:1600000000:starRegistry";
        let forged = sign_message(OTHER_SECRET, message).unwrap();
        assert!(!Secp256k1Verifier.verify(&address, message, &forged));

        let signature = sign_message(SECRET, message).unwrap();
        assert!(!Secp256k1Verifier.verify(&address, "someaddr:1600000001:starRegistry", &signature));
    }

    #[test]
    fn garbage_signature_is_false_not_error() {
        let address = address_from_secret_hex(SECRET).unwrap();
        assert!(!Secp256k1Verifier.verify(&address, "m", "aslk3rjasflka309rufjifasd;jcf0f2jjfojd20jrgj[qeadjv"));
        assert!(!Secp256k1Verifier.verify(&address, "m", ""));
        assert!(!Secp256k1Verifier.verify(&address, "m", &STANDARD.encode([7u8; 10])));
    }

    #[test]
    fn generated_keys_sign() {
        let secret = generate_secret_hex();
        let address = address_from_secret_hex(&secret).unwrap();
        let signature = sign_message(&secret, "m").unwrap();
        assert!(Secp256k1Verifier.verify(&address, "m", &signature));
        assert_ne!(secret, generate_secret_hex());
    }

    #[test]
    fn closures_are_verifiers() {
        let always = |_: &str, _: &str, _: &str| true;
        assert!(always.verify("a", "b", "c"));
    }

    #[test]
    fn bad_secret_is_decoding_error() {
        assert!(matches!(
            sign_message("zz", "m").unwrap_err(),
            ChainError::Decoding(_)
        ));
    }
}
