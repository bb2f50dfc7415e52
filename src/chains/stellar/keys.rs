use crate::chains::stellar::errors::{StellarError, StellarResult};
use ed25519_dalek::{Signer, SigningKey};
use std::fmt;
use stellar_strkey::ed25519::{PrivateKey as StrkeyPrivateKey, PublicKey as StrkeyPublicKey};
use stellar_xdr::next::SignatureHint;

/// Secret seed (`S...`) of the administrative account. Never printed.
#[derive(Clone)]
pub struct AdminSecret(String);

impl AdminSecret {
    pub fn new(seed: impl Into<String>) -> Self {
        Self(seed.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminSecret([REDACTED])")
    }
}

impl fmt::Display for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Signing identity derived from an [`AdminSecret`].
#[derive(Clone)]
pub struct AdminKeypair {
    signing_key: SigningKey,
    public_address: String,
}

impl AdminKeypair {
    pub fn from_secret(secret: &AdminSecret) -> StellarResult<Self> {
        // Decode errors can echo the seed; never forward them.
        let private = StrkeyPrivateKey::from_string(secret.expose().trim())
            .map_err(|_| StellarError::config_error("admin secret seed is malformed"))?;
        Ok(Self::from_signing_key(SigningKey::from_bytes(&private.0)))
    }

    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_address = StrkeyPublicKey(signing_key.verifying_key().to_bytes()).to_string().as_str().to_owned();
        Self {
            signing_key,
            public_address,
        }
    }

    pub fn public_address(&self) -> &str {
        &self.public_address
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Last four bytes of the public key, as the network expects next to each signature.
    pub fn signature_hint(&self) -> SignatureHint {
        let bytes = self.public_key_bytes();
        SignatureHint([bytes[28], bytes[29], bytes[30], bytes[31]])
    }

    pub fn sign(&self, payload: &[u8]) -> StellarResult<[u8; 64]> {
        self.signing_key
            .try_sign(payload)
            .map(|signature| signature.to_bytes())
            .map_err(|_| StellarError::signing_error("failed to sign transaction hash"))
    }
}

impl fmt::Debug for AdminKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminKeypair")
            .field("public_address", &self.public_address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: [u8; 32] = [7u8; 32];

    fn seed_string() -> String {
        StrkeyPrivateKey(SEED).to_string().as_str().to_owned()
    }

    #[test]
    fn test_keypair_from_secret_derives_public_address() {
        let secret = AdminSecret::new(seed_string());
        let keypair = AdminKeypair::from_secret(&secret).unwrap();

        let expected = SigningKey::from_bytes(&SEED).verifying_key().to_bytes();
        assert_eq!(keypair.public_key_bytes(), expected);
        assert!(keypair.public_address().starts_with('G'));
        assert_eq!(keypair.public_address().len(), 56);
        assert_eq!(keypair.signature_hint().0, expected[28..32]);
    }

    #[test]
    fn test_malformed_secret_is_config_error() {
        let secret = AdminSecret::new("SNOTAREALSEED");
        assert!(matches!(
            AdminKeypair::from_secret(&secret),
            Err(StellarError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_secret_never_printed() {
        let seed = seed_string();
        let secret = AdminSecret::new(seed.clone());
        let keypair = AdminKeypair::from_secret(&secret).unwrap();

        assert!(!format!("{:?}", secret).contains(&seed));
        assert!(!format!("{}", secret).contains(&seed));
        assert!(!format!("{:?}", keypair).contains(&seed));

        let err = AdminKeypair::from_secret(&AdminSecret::new("SBADSEEDVALUE")).unwrap_err();
        assert!(!err.to_string().contains("SBADSEEDVALUE"));
    }

    #[test]
    fn test_signature_verifies() {
        use ed25519_dalek::{Signature, Verifier};

        let keypair = AdminKeypair::from_signing_key(SigningKey::from_bytes(&SEED));
        let sig = keypair.sign(b"payload").unwrap();
        let verifying = SigningKey::from_bytes(&SEED).verifying_key();
        assert!(verifying
            .verify(b"payload", &Signature::from_bytes(&sig))
            .is_ok());
    }
}
