//! Keypair generation, PEM (de)serialization and ECDSA secp256k1 signing.
//!
//! Signing is over SHA-256 of the canonical transaction payload:
//! `k256::ecdsa::SigningKey` hashes with SHA-256 before the ECDSA step, so
//! callers only ever pass the raw message bytes.

use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rand_core::OsRng;

use crate::error::{Error, Result};

/// A secp256k1 keypair. Public keys travel the wire/disk as SubjectPublicKeyInfo
/// PEM text; private keys as unencrypted PKCS#8 PEM text.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Keypair {
    /// Generates a fresh keypair from the OS CSPRNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = *signing_key.verifying_key();
        Self { signing_key, verifying_key }
    }

    /// Reconstructs a keypair from a PKCS#8 PEM-encoded private key.
    pub fn from_private_pem(pem: &str) -> Result<Self> {
        let signing_key =
            SigningKey::from_pkcs8_pem(pem).map_err(|e| Error::Other(format!("bad private key PEM: {e}")))?;
        let verifying_key = *signing_key.verifying_key();
        Ok(Self { signing_key, verifying_key })
    }

    /// Returns this keypair's public key as a SubjectPublicKeyInfo PEM string.
    pub fn public_pem(&self) -> String {
        self.verifying_key
            .to_public_key_pem(LineEnding::LF)
            .expect("verifying key always PEM-encodable")
    }

    /// Returns this keypair's private key as a PKCS#8 PEM string.
    pub fn private_pem(&self) -> String {
        self.signing_key
            .to_pkcs8_pem(LineEnding::LF)
            .expect("signing key always PEM-encodable")
            .to_string()
    }

    /// Signs `message` and returns the hex-encoded signature.
    pub fn sign_hex(&self, message: &[u8]) -> String {
        let sig: Signature = self.signing_key.sign(message);
        hex::encode(sig.to_bytes())
    }
}

/// Verifies `signature_hex` over `message` against a SubjectPublicKeyInfo PEM
/// public key. Returns `Ok(())` on success, `Err(Error::BadSignature)` on any
/// parse or verification failure — callers never need to distinguish "bad
/// PEM" from "bad signature", both reject the transaction.
pub fn verify_hex(pubkey_pem: &str, message: &[u8], signature_hex: &str) -> Result<()> {
    let verifying_key =
        VerifyingKey::from_public_key_pem(pubkey_pem).map_err(|_| Error::BadSignature)?;
    let sig_bytes = hex::decode(signature_hex).map_err(|_| Error::BadSignature)?;
    let signature = Signature::from_slice(&sig_bytes).map_err(|_| Error::BadSignature)?;
    verifying_key
        .verify(message, &signature)
        .map_err(|_| Error::BadSignature)
}
