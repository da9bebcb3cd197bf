/// Registration, login and token refresh.
use chrono::Utc;
use crypto_core::JwtKeys;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::db::UserStore;
use crate::error::{AppError, Result};
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::security::{hash_password, verify_password};

const EMAIL_TAKEN: &str = "Email already registered.";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Tokens issued at login.
#[derive(Debug)]
pub struct LoginTokens {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AccountService {
    users: Arc<dyn UserStore>,
    jwt: Arc<JwtKeys>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, jwt: Arc<JwtKeys>) -> Self {
        Self { users, jwt }
    }

    /// Create the account and return it with a 12-hour access token.
    pub async fn register(&self, req: RegisterRequest) -> Result<(User, String)> {
        req.validate()?;

        let email = req.email.trim().to_string();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::BadRequest(EMAIL_TAKEN.to_string()));
        }

        let (account_type, govt_id_type) = match (req.account_type, req.govt_id_type) {
            (Some(account), Some(govt)) => (account, govt),
            _ => {
                return Err(AppError::Validation(
                    "All required fields must be filled.".to_string(),
                ))
            }
        };

        let user = User {
            id: Uuid::new_v4(),
            username: req.username.trim().to_string(),
            contact: req
                .contact
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            email,
            password_hash: hash_password(&req.password)?,
            account_type,
            govt_id_type,
            govt_id_number: req.govt_id_number.trim().to_string(),
            created_at: Utc::now(),
        };

        let user = self.users.insert(&user).await.map_err(|e| match e {
            AppError::Conflict(_) => AppError::BadRequest(EMAIL_TAKEN.to_string()),
            other => other,
        })?;

        let token = self.jwt.generate_access_token(user.id)?;
        tracing::info!(user_id = %user.id, account_type = %user.account_type, "user registered");
        Ok((user, token))
    }

    /// Verify credentials; unknown email and wrong password look the same.
    pub async fn login(&self, req: LoginRequest) -> Result<(User, LoginTokens)> {
        if req.validate().is_err() {
            return Err(AppError::BadRequest(INVALID_CREDENTIALS.to_string()));
        }

        let user = self
            .users
            .find_by_email(req.email.trim())
            .await?
            .ok_or_else(|| AppError::BadRequest(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&req.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "login rejected: wrong password");
            return Err(AppError::BadRequest(INVALID_CREDENTIALS.to_string()));
        }

        let tokens = LoginTokens {
            access_token: self.jwt.generate_access_token(user.id)?,
            refresh_token: self.jwt.generate_refresh_token(user.id)?,
        };
        tracing::info!(user_id = %user.id, "user logged in");
        Ok((user, tokens))
    }

    /// Exchange a refresh token for a short-lived access token.
    pub fn refresh(&self, refresh_token: &str) -> Result<String> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(|_| AppError::Forbidden("Forbidden".to_string()))?;
        let user_id = claims
            .claims
            .user_id()
            .map_err(|_| AppError::Forbidden("Forbidden".to_string()))?;

        Ok(self.jwt.generate_refreshed_access_token(user_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{AccountType, GovtIdType};

    fn service() -> AccountService {
        let jwt = JwtKeys::new("access-secret-for-tests", "refresh-secret-for-tests").unwrap();
        AccountService::new(Arc::new(MemoryStore::new()), Arc::new(jwt))
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            username: "Asha".into(),
            contact: Some("9999999999".into()),
            email: email.into(),
            password: "correct-horse".into(),
            account_type: Some(AccountType::Seller),
            govt_id_type: Some(GovtIdType::Passport),
            govt_id_number: "P1234567".into(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = service();
        let (user, token) = service
            .register(register_request("asha@example.com"))
            .await
            .unwrap();
        assert_ne!(user.password_hash, "correct-horse");
        assert_eq!(
            service.jwt.user_id_from_access_token(&token).unwrap(),
            user.id
        );

        let (logged_in, tokens) = service
            .login(login_request("ASHA@example.com", "correct-horse"))
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(service.jwt.validate_refresh_token(&tokens.refresh_token).is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_bad_request() {
        let service = service();
        service
            .register(register_request("dup@example.com"))
            .await
            .unwrap();
        let err = service
            .register(register_request("dup@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == EMAIL_TAKEN));
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let service = service();
        service
            .register(register_request("asha@example.com"))
            .await
            .unwrap();

        for req in [
            login_request("nobody@example.com", "correct-horse"),
            login_request("asha@example.com", "wrong-horse"),
            login_request("", ""),
        ] {
            let err = service.login(req).await.unwrap_err();
            assert_eq!(err.to_string(), INVALID_CREDENTIALS);
        }
    }

    #[tokio::test]
    async fn test_refresh() {
        let service = service();
        let user_id = Uuid::new_v4();
        let refresh = service.jwt.generate_refresh_token(user_id).unwrap();

        let access = service.refresh(&refresh).unwrap();
        assert_eq!(service.jwt.user_id_from_access_token(&access).unwrap(), user_id);

        let access_token = service.jwt.generate_access_token(user_id).unwrap();
        assert!(matches!(
            service.refresh(&access_token),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(service.refresh("garbage"), Err(AppError::Forbidden(_))));
    }
}
