use crate::api::error::AppError;
use crate::entities::{prelude::*, users};
use crate::utils::auth::create_jwt;
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

const USER_ID_PREFIX: &str = "bkp-";
const USER_ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const USER_ID_LEN: usize = 8;
const USER_ID_ATTEMPTS: usize = 10;

pub struct UserService;

impl UserService {
    fn generate_user_id() -> String {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let suffix: String = (0..USER_ID_LEN)
            .map(|_| USER_ID_CHARSET[rng.gen_range(0..USER_ID_CHARSET.len())] as char)
            .collect();
        format!("{USER_ID_PREFIX}{suffix}")
    }

    /// Generate a handle that is not yet taken, retrying a bounded number of
    /// times against the database.
    async fn generate_unique_user_id(db: &DatabaseConnection) -> Result<String, AppError> {
        for _ in 0..USER_ID_ATTEMPTS {
            let candidate = Self::generate_user_id();
            let taken = Users::find()
                .filter(users::Column::UserId.eq(&candidate))
                .one(db)
                .await?
                .is_some();
            if !taken {
                return Ok(candidate);
            }
        }
        Err(AppError::Internal(
            "failed to generate a unique user id".to_string(),
        ))
    }

    pub fn hash_password(password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
        let argon2 = Argon2::default();
        let parsed_hash =
            argon2::PasswordHash::new(hash).map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub async fn register_user(
        db: &DatabaseConnection,
        username: &str,
        password: &str,
    ) -> Result<users::Model, AppError> {
        let existing = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("username already exists".to_string()));
        }

        let user_id = Self::generate_unique_user_id(db).await?;
        let password_hash = Self::hash_password(password)?;
        let now = Utc::now();

        let user = users::ActiveModel {
            user_id: Set(user_id),
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let user = user.insert(db).await?;
        Ok(user)
    }

    /// Both an unknown username and a wrong password map to the same error so
    /// the response does not reveal which usernames exist.
    pub async fn login_user(
        db: &DatabaseConnection,
        jwt_secret: &str,
        username: &str,
        password: &str,
    ) -> Result<(users::Model, String), AppError> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid username or password".to_string()))?;

        if !Self::verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized(
                "invalid username or password".to_string(),
            ));
        }

        let token = create_jwt(&user.user_id, &user.username, jwt_secret)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok((user, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_shape() {
        let id = UserService::generate_user_id();
        assert_eq!(id.len(), USER_ID_PREFIX.len() + USER_ID_LEN);
        assert!(id.starts_with(USER_ID_PREFIX));
        assert!(
            id[USER_ID_PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = UserService::hash_password("secret1").unwrap();
        assert!(UserService::verify_password("secret1", &hash).unwrap());
        assert!(!UserService::verify_password("secret2", &hash).unwrap());
    }
}
