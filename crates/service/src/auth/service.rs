use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use tracing::{debug, info, instrument, warn};

use super::domain::{AuthSession, AuthUser, Claims, LoginInput};
use super::errors::AuthError;
use super::password::verify_password;
use super::repository::AuthRepository;

/// Access tokens live for 15 minutes unless configured otherwise.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self { jwt_secret: jwt_secret.into(), token_ttl: DEFAULT_TOKEN_TTL }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Authenticate a user and issue an access token.
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::{AuthRepository, mock::MockAuthRepository}};
    /// use service::auth::{domain::LoginInput, password::hash_password};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let role = repo.add_role("admin");
    /// tokio_test::block_on(repo.create_user("ana", hash_password("Passw0rd").unwrap(), role)).unwrap();
    /// let svc = AuthService::new(repo, AuthConfig::new("secret"));
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "ana".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.username, "ana");
    /// assert_eq!(session.role, "admin");
    /// assert!(!session.access_token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        if input.username.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Unauthorized);
        }
        let user = self.repo
            .find_user_by_username(input.username.trim())
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !verify_password(&input.password, &cred.password_hash) {
            warn!(user_id = user.id, "login_rejected");
            return Err(AuthError::Unauthorized);
        }

        let role = self.repo.role_name(user.role_id).await?.unwrap_or_default();
        let access_token = self.issue_token(&user, &role)?;
        info!(user_id = user.id, role = %role, "user_logged_in");
        Ok(AuthSession { user, role, access_token })
    }

    /// Sign an HS256 access token for `user`.
    pub fn issue_token(&self, user: &AuthUser, role: &str) -> Result<String, AuthError> {
        let iat = chrono::Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: user.id.to_string(),
            role: role.to_string(),
            iat,
            exp: iat + self.cfg.token_ttl.as_secs(),
        };
        encode(&JwtHeader::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Check signature and expiry, returning the claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let key = DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        match decode::<Claims>(token, &key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(AuthError::TokenExpired),
            Err(e) => Err(AuthError::TokenError(e.to_string())),
        }
    }

    /// Load the user behind a token together with its current role name.
    pub async fn current_user(&self, user_id: i32) -> Result<(AuthUser, String), AuthError> {
        let (user, role) = self.repo.find_user_with_role(user_id).await?.ok_or(AuthError::Unauthorized)?;
        Ok((user, role.unwrap_or_default()))
    }

    /// Require `user_id` to hold `required_role`, read from storage at call time
    /// so role changes take effect before the token expires.
    #[instrument(skip(self))]
    pub async fn authorize(&self, user_id: i32, required_role: &str) -> Result<AuthUser, AuthError> {
        let (user, role) = self.current_user(user_id).await?;
        if role != required_role {
            debug!(user_id, role = %role, "role_check_failed");
            return Err(AuthError::Forbidden);
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::auth::repository::mock::MockAuthRepository;

    async fn seeded() -> (Arc<MockAuthRepository>, AuthService<MockAuthRepository>, AuthUser) {
        let repo = Arc::new(MockAuthRepository::default());
        let admin = repo.add_role("admin");
        let user = repo.create_user("root", hash_password("rootpass").unwrap(), admin).await.unwrap();
        let svc = AuthService::new(repo.clone(), AuthConfig::new("unit-secret"));
        (repo, svc, user)
    }

    fn login(u: &str, p: &str) -> LoginInput {
        LoginInput { username: u.into(), password: p.into() }
    }

    #[tokio::test]
    async fn login_issues_token_with_user_subject() {
        let (_, svc, user) = seeded().await;
        let session = svc.login(login("root", "rootpass")).await.unwrap();
        let claims = svc.verify_token(&session.access_token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL.as_secs());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let (_, svc, _) = seeded().await;
        assert!(matches!(svc.login(login("root", "nope")).await, Err(AuthError::Unauthorized)));
        assert!(matches!(svc.login(login("ghost", "rootpass")).await, Err(AuthError::Unauthorized)));
        assert!(matches!(svc.login(login("", "")).await, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn tokens_from_another_secret_are_rejected() {
        let (repo, svc, user) = seeded().await;
        let other = AuthService::new(repo, AuthConfig::new("other-secret"));
        let token = other.issue_token(&user, "admin").unwrap();
        assert!(matches!(svc.verify_token(&token), Err(AuthError::TokenError(_))));
        assert!(matches!(svc.verify_token("garbage"), Err(AuthError::TokenError(_))));
    }

    #[tokio::test]
    async fn expired_tokens_are_rejected() {
        let (_, svc, user) = seeded().await;
        let past = chrono::Utc::now().timestamp() as u64 - 3600;
        let claims = Claims { sub: user.id.to_string(), role: "admin".into(), iat: past - 60, exp: past };
        let token = encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(b"unit-secret")).unwrap();
        assert!(matches!(svc.verify_token(&token), Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn authorize_checks_current_role() {
        let (repo, svc, admin) = seeded().await;
        let reader = repo.add_role("reader");
        let plain = repo.create_user("plain", hash_password("plainpass").unwrap(), reader).await.unwrap();

        assert_eq!(svc.authorize(admin.id, "admin").await.unwrap().id, admin.id);
        assert!(matches!(svc.authorize(plain.id, "admin").await, Err(AuthError::Forbidden)));

        repo.remove_user(admin.id);
        assert!(matches!(svc.authorize(admin.id, "admin").await, Err(AuthError::Unauthorized)));
    }
}
