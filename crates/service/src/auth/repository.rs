use async_trait::async_trait;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError>;
    /// The user and the name of its role, read together.
    async fn find_user_with_role(&self, id: i32) -> Result<Option<(AuthUser, Option<String>)>, AuthError>;
    async fn create_user(&self, username: &str, password_hash: String, role_id: i32) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: i32) -> Result<Option<Credentials>, AuthError>;
    async fn role_name(&self, role_id: i32) -> Result<Option<String>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    struct Inner {
        users: HashMap<i32, AuthUser>,
        creds: HashMap<i32, Credentials>,
        roles: HashMap<i32, String>,
        next_id: i32,
    }

    #[derive(Default)]
    pub struct MockAuthRepository {
        inner: Mutex<Inner>,
    }

    impl MockAuthRepository {
        fn lock(&self) -> MutexGuard<'_, Inner> {
            // a panicking test must not poison the others
            self.inner.lock().unwrap_or_else(|e| e.into_inner())
        }

        /// Register a role and return its id.
        pub fn add_role(&self, name: &str) -> i32 {
            let mut inner = self.lock();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.roles.insert(id, name.to_string());
            id
        }

        /// Drop a user, simulating deletion after a token was issued.
        pub fn remove_user(&self, id: i32) {
            let mut inner = self.lock();
            inner.users.remove(&id);
            inner.creds.remove(&id);
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
            let inner = self.lock();
            Ok(inner.users.values().find(|u| u.username == username).cloned())
        }

        async fn find_user_with_role(&self, id: i32) -> Result<Option<(AuthUser, Option<String>)>, AuthError> {
            let inner = self.lock();
            Ok(inner.users.get(&id).map(|u| (u.clone(), inner.roles.get(&u.role_id).cloned())))
        }

        async fn create_user(&self, username: &str, password_hash: String, role_id: i32) -> Result<AuthUser, AuthError> {
            let mut inner = self.lock();
            if inner.users.values().any(|u| u.username == username) {
                return Err(AuthError::Validation("username taken".into()));
            }
            if !inner.roles.contains_key(&role_id) {
                return Err(AuthError::Validation("unknown role".into()));
            }
            inner.next_id += 1;
            let id = inner.next_id;
            let user = AuthUser { id, username: username.to_string(), role_id };
            inner.users.insert(id, user.clone());
            inner.creds.insert(id, Credentials { user_id: id, password_hash });
            Ok(user)
        }

        async fn get_credentials(&self, user_id: i32) -> Result<Option<Credentials>, AuthError> {
            let inner = self.lock();
            Ok(inner.creds.get(&user_id).cloned())
        }

        async fn role_name(&self, role_id: i32) -> Result<Option<String>, AuthError> {
            let inner = self.lock();
            Ok(inner.roles.get(&role_id).cloned())
        }
    }
}
