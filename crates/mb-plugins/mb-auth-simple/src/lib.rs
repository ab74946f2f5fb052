//! # mb-auth-simple
//!
//! Argon2-based implementation of `IdentityProvider`.
//! Keeps accounts in process memory; passwords are hashed with a per-account
//! salt and a deployment-wide pepper.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use mb_core::models::IdentityUser;
use mb_core::traits::{IdentityError, IdentityProvider};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use uuid::Uuid;

pub struct SimpleIdentityProvider {
    /// Mixed into every hash; rotating it invalidates all stored passwords
    pepper: Arc<SecretString>,
    /// PHC-format password hashes keyed by lowercased email
    accounts: DashMap<String, String>,
}

impl SimpleIdentityProvider {
    pub fn new(pepper: SecretString) -> Self {
        Self {
            pepper: Arc::new(pepper),
            accounts: DashMap::new(),
        }
    }
}

fn hasher(pepper: &SecretString) -> anyhow::Result<Argon2<'_>> {
    Argon2::new_with_secret(
        pepper.expose_secret().as_bytes(),
        Algorithm::Argon2id,
        Version::V0x13,
        Params::default(),
    )
    .map_err(|e| anyhow::anyhow!("argon2 setup failed: {e}"))
}

fn hash_password(pepper: &SecretString, password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(hasher(pepper)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?
        .to_string())
}

#[async_trait]
impl IdentityProvider for SimpleIdentityProvider {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<IdentityUser, IdentityError> {
        let key = email.to_lowercase();
        if self.accounts.contains_key(&key) {
            return Err(IdentityError::EmailTaken(email.to_string()));
        }

        // Argon2 is CPU-bound; keep it off the async workers.
        let pepper = Arc::clone(&self.pepper);
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&pepper, &password))
            .await
            .map_err(|e| anyhow::anyhow!("password hashing task failed: {e}"))??;

        match self.accounts.entry(key) {
            Entry::Occupied(_) => Err(IdentityError::EmailTaken(email.to_string())),
            Entry::Vacant(slot) => {
                let user = IdentityUser {
                    uid: Uuid::new_v4().simple().to_string(),
                    email: email.to_string(),
                    display_name: display_name.to_string(),
                };
                debug!(uid = %user.uid, "identity created");
                slot.insert(password_hash);
                Ok(user)
            }
        }
    }
}
