//! User registration and profile maintenance.

use std::sync::Arc;

use tracing::info;

use crate::error::{AppError, Result};
use crate::models::UserProfile;
use crate::traits::{IdentityError, IdentityProvider, ProfileStore};

pub struct ProfileService {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { identity, profiles }
    }

    /// Creates the identity, then the matching profile document.
    pub async fn register(&self, email: &str, password: &str, username: &str) -> Result<UserProfile> {
        if [email, password, username].iter().any(|s| s.trim().is_empty()) {
            return Err(AppError::validation("email, password and username are required"));
        }

        // Profiles outlive the identity provider's own records across restarts.
        if self.profiles.find_profile_by_email(email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "an account already exists for {email}"
            )));
        }

        let user = self
            .identity
            .create_user(email, password, username)
            .await
            .map_err(|e| match e {
                IdentityError::EmailTaken(email) => {
                    AppError::Conflict(format!("an account already exists for {email}"))
                }
                IdentityError::Provider(e) => AppError::Store(e),
            })?;

        let profile = UserProfile::new_member(user.uid, user.email, username.to_string());
        self.profiles.put_profile(profile.clone()).await?;

        info!(uid = %profile.uid, "user registered");
        Ok(profile)
    }

    pub async fn get(&self, uid: &str) -> Result<UserProfile> {
        self.profiles
            .get_profile(uid)
            .await?
            .ok_or_else(|| AppError::not_found("User", uid))
    }

    pub async fn update_bio(&self, uid: &str, bio: &str) -> Result<UserProfile> {
        self.profiles
            .update_bio(uid, bio)
            .await?
            .ok_or_else(|| AppError::not_found("User", uid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IdentityUser;
    use crate::traits::{MockIdentityProvider, MockProfileStore};

    #[tokio::test]
    async fn register_writes_default_profile() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_create_user().returning(|email, _, name| {
            Ok(IdentityUser {
                uid: "uid-1".into(),
                email: email.to_string(),
                display_name: name.to_string(),
            })
        });
        let mut profiles = MockProfileStore::new();
        profiles.expect_find_profile_by_email().returning(|_| Ok(None));
        profiles
            .expect_put_profile()
            .withf(|p| p.uid == "uid-1" && p.website_role == "user" && p.bio.is_empty())
            .times(1)
            .returning(|_| Ok(()));

        let profile = ProfileService::new(Arc::new(identity), Arc::new(profiles))
            .register("a@example.com", "hunter22", "alice")
            .await
            .unwrap();
        assert_eq!(profile.username, "alice");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_create_user()
            .returning(|email, _, _| Err(IdentityError::EmailTaken(email.to_string())));
        let mut profiles = MockProfileStore::new();
        profiles.expect_find_profile_by_email().returning(|_| Ok(None));
        profiles.expect_put_profile().never();

        let err = ProfileService::new(Arc::new(identity), Arc::new(profiles))
            .register("a@example.com", "hunter22", "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn existing_profile_email_is_a_conflict_before_identity_creation() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_create_user().never();
        let mut profiles = MockProfileStore::new();
        profiles
            .expect_find_profile_by_email()
            .withf(|email| email == "a@example.com")
            .returning(|email| {
                Ok(Some(UserProfile::new_member(
                    "uid-0".into(),
                    email.to_string(),
                    "alice".into(),
                )))
            });
        profiles.expect_put_profile().never();

        let err = ProfileService::new(Arc::new(identity), Arc::new(profiles))
            .register("a@example.com", "hunter22", "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
