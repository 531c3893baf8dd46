//! Owner identity issued through signed cookies.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::entities::Owner;
use crate::error::StoreError;
use crate::utils::code_generator::random_hex;

type HmacSha256 = Hmac<Sha256>;

/// Random bytes in a freshly issued owner id.
const OWNER_ID_BYTES: usize = 16;

/// Issues and verifies owner tokens of the form `<owner>.<hex HMAC-SHA256>`.
///
/// The MAC is keyed by a server-side secret, so a client can carry its owner
/// id around but cannot pick someone else's.
#[derive(Clone)]
pub struct IdentityService {
    secret: Vec<u8>,
}

impl IdentityService {
    /// Creates a service keyed by `secret`.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Creates a service keyed by a random per-process secret.
    ///
    /// Tokens issued by one process are rejected by the next.
    pub fn ephemeral() -> Result<Self, StoreError> {
        Ok(Self::new(random_hex(32)?))
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length")
    }

    /// Signs `owner` into a cookie value.
    pub fn sign(&self, owner: &Owner) -> String {
        let mut mac = self.mac();
        mac.update(owner.as_str().as_bytes());
        format!("{}.{}", owner, hex::encode(mac.finalize().into_bytes()))
    }

    /// Returns the owner carried by `token` if its signature checks out.
    pub fn verify(&self, token: &str) -> Option<Owner> {
        let (owner, signature) = token.rsplit_once('.')?;
        if owner.is_empty() {
            return None;
        }

        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac();
        mac.update(owner.as_bytes());
        mac.verify_slice(&signature).ok()?;

        Some(Owner::new(owner))
    }

    /// Mints a new random owner.
    pub fn issue(&self) -> Result<Owner, StoreError> {
        Ok(Owner::new(random_hex(OWNER_ID_BYTES)?))
    }

    /// Returns the owner in `token`, or a fresh one when the token is missing
    /// or forged. The flag is `true` for a fresh owner.
    pub fn resolve(&self, token: Option<&str>) -> Result<(Owner, bool), StoreError> {
        match token.and_then(|t| self.verify(t)) {
            Some(owner) => Ok((owner, false)),
            None => Ok((self.issue()?, true)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> IdentityService {
        IdentityService::new("test-signing-secret")
    }

    #[test]
    fn test_sign_then_verify() {
        let service = service();
        let owner = Owner::from("u1");

        let token = service.sign(&owner);
        assert!(token.starts_with("u1."));
        assert_eq!(service.verify(&token), Some(owner));
    }

    #[test]
    fn test_tampered_owner_rejected() {
        let service = service();
        let token = service.sign(&Owner::from("u1"));
        let forged = token.replacen("u1", "u2", 1);

        assert_eq!(service.verify(&forged), None);
    }

    #[test]
    fn test_other_secret_rejected() {
        let token = service().sign(&Owner::from("u1"));

        assert_eq!(IdentityService::new("other").verify(&token), None);
    }

    #[test]
    fn test_garbage_rejected() {
        let service = service();

        assert_eq!(service.verify(""), None);
        assert_eq!(service.verify("no-signature"), None);
        assert_eq!(service.verify(".abcd"), None);
        assert_eq!(service.verify("u1.not-hex"), None);
    }

    #[test]
    fn test_resolve_issues_fresh_owner_for_missing_token() {
        let service = service();

        let (owner, fresh) = service.resolve(None).unwrap();
        assert!(fresh);
        assert_eq!(owner.as_str().len(), 32);

        let token = service.sign(&owner);
        let (same, fresh) = service.resolve(Some(&token)).unwrap();
        assert!(!fresh);
        assert_eq!(same, owner);
    }

    #[test]
    fn test_ephemeral_services_do_not_share_tokens() {
        let first = IdentityService::ephemeral().unwrap();
        let second = IdentityService::ephemeral().unwrap();

        let token = first.sign(&Owner::from("u1"));
        assert_eq!(second.verify(&token), None);
    }
}
