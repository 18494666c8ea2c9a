//! Public-key sealing of individual secrets (X25519 + XSalsa20-Poly1305).
//!
//! Every secret is sealed by a fresh ephemeral keypair towards the
//! vault's master public key.  The record keeps the ephemeral public
//! key and the nonce; only the master private key can rebuild the
//! shared box key and open it.

use crypto_box::aead::{Aead, AeadCore, Nonce, OsRng};
use crypto_box::SalsaBox;
pub use crypto_box::{PublicKey, SecretKey};
use zeroize::Zeroizing;

use crate::errors::{Result, ShroudError};

/// Size of X25519 public and secret keys in bytes.
pub const KEY_LEN: usize = 32;

/// Size of the XSalsa20-Poly1305 nonce in bytes.
pub const NONCE_LEN: usize = 24;

/// A freshly generated X25519 keypair.
pub struct Keypair {
    pub public: PublicKey,
    pub secret: SecretKey,
}

/// Output of `seal_asymmetric`: everything needed (besides the
/// recipient's secret key) to open the payload again.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub sender_public: PublicKey,
    pub nonce: Vec<u8>,
}

/// Generate a keypair from the operating system CSPRNG.
pub fn generate_keypair() -> Keypair {
    let secret = SecretKey::generate(&mut OsRng);
    let public = secret.public_key();
    Keypair { public, secret }
}

/// Seal `plaintext` for `recipient`.
///
/// When `sender` is `None` an ephemeral keypair is generated for this
/// call alone; when `nonce` is `None` a random one is drawn.
pub fn seal_asymmetric(
    plaintext: &[u8],
    recipient: &PublicKey,
    sender: Option<&SecretKey>,
    nonce: Option<&[u8]>,
) -> Result<Sealed> {
    let ephemeral;
    let sender = match sender {
        Some(secret) => secret,
        None => {
            ephemeral = generate_keypair();
            &ephemeral.secret
        }
    };

    let nonce = match nonce {
        Some(bytes) if bytes.len() == NONCE_LEN => Nonce::<SalsaBox>::clone_from_slice(bytes),
        Some(bytes) => {
            return Err(ShroudError::SealFailed(format!(
                "nonce must be {NONCE_LEN} bytes, got {}",
                bytes.len()
            )))
        }
        None => SalsaBox::generate_nonce(&mut OsRng),
    };

    let salsa_box = SalsaBox::new(recipient, sender);
    let ciphertext = salsa_box
        .encrypt(&nonce, plaintext)
        .map_err(|e| ShroudError::SealFailed(format!("box encryption error: {e}")))?;

    Ok(Sealed {
        ciphertext,
        sender_public: sender.public_key(),
        nonce: nonce.to_vec(),
    })
}

/// Open a payload sealed by `seal_asymmetric`.
///
/// Failures are reported as `OpenFailed`, never as
/// `AuthenticationFailed`: by the time a secret is opened the master
/// password has already been verified, so a failure here means the
/// record itself is damaged.
pub fn open_asymmetric(
    ciphertext: &[u8],
    sender_public: &PublicKey,
    nonce: &[u8],
    recipient: &SecretKey,
) -> Result<Zeroizing<Vec<u8>>> {
    if nonce.len() != NONCE_LEN {
        return Err(ShroudError::OpenFailed(format!(
            "nonce must be {NONCE_LEN} bytes, got {}",
            nonce.len()
        )));
    }

    let salsa_box = SalsaBox::new(sender_public, recipient);
    let plaintext = salsa_box
        .decrypt(Nonce::<SalsaBox>::from_slice(nonce), ciphertext)
        .map_err(|_| ShroudError::OpenFailed("box authentication failed".into()))?;

    Ok(Zeroizing::new(plaintext))
}

/// Parse a 32-byte public key.
pub fn public_key_from_bytes(bytes: &[u8]) -> Option<PublicKey> {
    let array: [u8; KEY_LEN] = bytes.try_into().ok()?;
    Some(PublicKey::from(array))
}

/// Parse a 32-byte secret key.  The temporary copy is wiped.
pub fn secret_key_from_bytes(bytes: &[u8]) -> Option<SecretKey> {
    let array: Zeroizing<[u8; KEY_LEN]> = Zeroizing::new(bytes.try_into().ok()?);
    Some(SecretKey::from(*array))
}
