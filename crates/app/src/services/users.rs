use crate::config::LeaderboardParams;
use crate::error::{AppError, Result};
use crate::services::{SharedConfig, missing_user, open_db};
use crate::util::time::now_rfc3339;
use gather_core::UserProfile;
use gather_db::Db;

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 32;
const MAX_USER_ID_LEN: usize = 64;
const DEFAULT_LEADERBOARD_LIMIT: u32 = 50;
const MAX_LEADERBOARD_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: String,
    pub country_code: Option<String>,
    pub referred_by: Option<String>,
}

#[derive(Clone)]
pub struct UsersService {
    config: SharedConfig,
}

impl UsersService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// Registers the authenticated user. The id is the stable identifier the
    /// auth layer verified, not something callers get to invent per request.
    pub fn register(&self, user_id: &str, input: &RegisterUser) -> Result<UserProfile> {
        let db = self.db()?;
        let user_id = normalize_user_id(user_id)?;
        let username = normalize_username(&input.username)?;
        let country_code = match input.country_code.as_deref() {
            Some(code) => Some(normalize_country(code)?),
            None => None,
        };
        if db.get_user(&user_id)?.is_some() {
            return Err(AppError::InvalidInput(format!(
                "user {user_id} is already registered"
            )));
        }
        if db.get_user_by_username(&username)?.is_some() {
            return Err(AppError::InvalidInput(format!(
                "username {username} is already taken"
            )));
        }

        let now = now_rfc3339();
        let user = db.create_user(&user_id, &username, country_code.as_deref(), &now)?;

        // Unknown referrer names are dropped rather than failing the signup.
        if let Some(referrer_name) = input.referred_by.as_deref() {
            match db.get_user_by_username(referrer_name)? {
                Some(referrer) if referrer.id != user.id => {
                    db.record_referral(&user.id, &referrer.id, &now)?;
                }
                Some(_) => {}
                None => {
                    tracing::debug!(referrer = referrer_name, "referrer not found, skipping");
                }
            }
        }

        tracing::info!(user_id = user.id, username, "registered user");
        Ok(user)
    }

    pub fn profile(&self, user_id: &str) -> Result<UserProfile> {
        let db = self.db()?;
        db.get_user(user_id)?.ok_or_else(|| missing_user(user_id))
    }

    pub fn leaderboard(&self, params: &LeaderboardParams) -> Result<Vec<UserProfile>> {
        let db = self.db()?;
        let limit = params
            .limit
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
            .clamp(1, MAX_LEADERBOARD_LIMIT);
        let offset = params.offset.unwrap_or(0);
        let country = match params.country.as_deref() {
            Some(code) => Some(normalize_country(code)?),
            None => None,
        };
        Ok(db.leaderboard(limit, offset, country.as_deref())?)
    }
}

fn normalize_user_id(user_id: &str) -> Result<String> {
    let user_id = user_id.trim();
    if user_id.is_empty() || user_id.len() > MAX_USER_ID_LEN {
        return Err(AppError::InvalidInput(format!(
            "user id must be 1-{MAX_USER_ID_LEN} characters"
        )));
    }
    if !user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::InvalidInput(
            "user id may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }
    Ok(user_id.to_string())
}

fn normalize_username(username: &str) -> Result<String> {
    let username = username.trim();
    if username.len() < MIN_USERNAME_LEN || username.len() > MAX_USERNAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "username must be {MIN_USERNAME_LEN}-{MAX_USERNAME_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::InvalidInput(
            "username may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }
    Ok(username.to_string())
}

fn normalize_country(code: &str) -> Result<String> {
    let code = code.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::InvalidInput(format!(
            "invalid country code {code}"
        )));
    }
    Ok(code.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(normalize_username("ab").is_err());
        assert!(normalize_username("has space").is_err());
        assert!(normalize_username(&"x".repeat(33)).is_err());
        assert_eq!(normalize_username("  dev_one  ").unwrap(), "dev_one");
    }

    #[test]
    fn country_codes_normalize_to_uppercase() {
        assert_eq!(normalize_country("nl").unwrap(), "NL");
        assert!(normalize_country("NLD").is_err());
        assert!(normalize_country("1A").is_err());
    }

    #[test]
    fn user_id_rules() {
        assert!(normalize_user_id("").is_err());
        assert!(normalize_user_id("   ").is_err());
        assert!(normalize_user_id(&"x".repeat(65)).is_err());
        assert!(normalize_user_id("id with space").is_err());
        assert_eq!(normalize_user_id(" auth0-123 ").unwrap(), "auth0-123");
    }
}
