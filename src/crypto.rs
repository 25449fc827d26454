//! Secret codec — AES-256-GCM with PBKDF2-HMAC-SHA256 key derivation.
//!
//! Secrets are encrypted before they reach the backing store. A blob is
//! `base64(nonce || ciphertext+tag)` with a fresh random nonce per
//! encryption. Decryption collapses every failure mode — bad encoding,
//! truncated data, wrong password, tampered ciphertext — into `None`,
//! so callers cannot tell a wrong password apart from corruption.
//!
//! Key material is zeroized as soon as the cipher is done with it.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

/// Salt used by installations that predate per-installation salts.
/// Publicly known, shared across installs — kept only so old blobs
/// still decrypt. New setups generate a random salt instead.
pub const LEGACY_SALT: &[u8] = b"utm-manager-v1";

/// PBKDF2 work factor. High enough that each password guess costs
/// real CPU time.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Length of a generated per-installation salt in bytes.
pub const SALT_LEN: usize = 16;

/// Derive a 256-bit key from the master password. Deterministic for a
/// given (password, salt) pair. The caller zeroizes the result.
pub fn derive_key(password: &str, salt: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Generate a fresh random per-installation salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Encrypt a secret under the master password.
///
/// Returns `base64(nonce || ciphertext+tag)`. Every call draws a fresh
/// nonce, so encrypting the same plaintext twice yields different blobs.
pub fn encrypt(plaintext: &str, password: &str, salt: &[u8]) -> String {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let mut key = derive_key(password, salt);
    let cipher = Aes256Gcm::new_from_slice(&key).expect("key length");
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .expect("AES-GCM encryption failed");
    key.zeroize();

    let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);
    BASE64.encode(combined)
}

/// Decrypt a blob produced by [`encrypt`].
///
/// Returns `None` on: empty blob, empty password, invalid base64, data
/// no longer than the nonce, authentication failure, non-UTF-8 or empty
/// plaintext. Never panics on malformed input.
pub fn decrypt(blob: &str, password: &str, salt: &[u8]) -> Option<String> {
    if blob.is_empty() || password.is_empty() {
        return None;
    }

    let combined = BASE64.decode(blob).ok()?;
    if combined.len() <= NONCE_LEN {
        return None;
    }
    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);

    let mut key = derive_key(password, salt);
    let cipher = Aes256Gcm::new_from_slice(&key).expect("key length");
    let result = cipher.decrypt(Nonce::from_slice(nonce_bytes), ciphertext);
    key.zeroize();

    let mut plaintext = result.ok()?;
    let decoded = String::from_utf8(plaintext.clone()).ok();
    plaintext.zeroize();

    let decoded = decoded?;
    if decoded.is_empty() {
        return None;
    }
    Some(decoded)
}
