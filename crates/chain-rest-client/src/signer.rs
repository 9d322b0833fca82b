//! RSA signing of handshake challenges.
//!
//! Signatures are PKCS#1 v1.5 over SHA-256, hex-encoded.

use std::fmt;
use std::path::{Path, PathBuf};

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::{SigningKey, VerifyingKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{Keypair, SignatureEncoding, Signer as _};
use rsa::RsaPrivateKey;
use sha2::Sha256;
use thiserror::Error;

/// Signing key could not be loaded.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("failed to read private key {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("private key is not a PEM encoded PKCS#1 or PKCS#8 key")]
    Malformed,

    #[error("private key is not an RSA key")]
    NotRsa,
}

/// Signs challenge strings with an RSA private key.
#[derive(Clone)]
pub struct Signer {
    key: SigningKey<Sha256>,
}

impl Signer {
    /// Load a PEM private key file.
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self, KeyError> {
        let path = path.as_ref();
        let pem = std::fs::read_to_string(path).map_err(|source| KeyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_pem(&pem)
    }

    /// Parse a PEM private key, PKCS#8 (`PRIVATE KEY`) or PKCS#1 (`RSA PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let key = match RsaPrivateKey::from_pkcs8_pem(pem) {
            Ok(key) => key,
            // Well-formed PKCS#8 carrying some other algorithm
            Err(rsa::pkcs8::Error::PublicKey(_)) => return Err(KeyError::NotRsa),
            Err(_) => RsaPrivateKey::from_pkcs1_pem(pem).map_err(|_| KeyError::Malformed)?,
        };
        Ok(Self {
            key: SigningKey::<Sha256>::new(key),
        })
    }

    /// Sign `plain`, returning the lower-case hex signature.
    pub fn sign(&self, plain: &str) -> String {
        let signature = self.key.sign(plain.as_bytes());
        hex::encode(signature.to_bytes())
    }

    /// Public half, for verifying signatures.
    pub fn verifying_key(&self) -> VerifyingKey<Sha256> {
        self.key.verifying_key()
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

/// Sign `plain` with the private key stored at `key_path`.
pub fn sign(plain: &str, key_path: impl AsRef<Path>) -> Result<String, KeyError> {
    Ok(Signer::from_pem_file(key_path)?.sign(plain))
}
