use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Account status lifecycle. A successful payment never activates an
/// account directly: it parks it in `PendingApproval` until an admin
/// reviews it.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    PendingApproval,
    Disabled,
}

impl std::str::FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "pending_approval" => Ok(AccountStatus::PendingApproval),
            "disabled" => Ok(AccountStatus::Disabled),
            _ => Err(format!("Invalid account status: {}", s)),
        }
    }
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::PendingApproval => "pending_approval",
            AccountStatus::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String, // admin, user
    pub mobile: Option<String>,
    pub company_name: Option<String>,
    pub domain: Option<String>,
    pub number_of_users: Option<i32>,
    pub plan_type: Option<String>,
    pub subscription_duration: Option<String>,
    pub renewal_date: Option<NaiveDate>,
    pub account_status: String, // active, pending_approval, disabled
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// User view returned over HTTP. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub mobile: Option<String>,
    pub company_name: Option<String>,
    pub domain: Option<String>,
    pub number_of_users: Option<i32>,
    pub plan_type: Option<String>,
    pub subscription_duration: Option<String>,
    pub renewal_date: Option<NaiveDate>,
    pub account_status: String,
    pub created_at: NaiveDateTime,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            mobile: user.mobile,
            company_name: user.company_name,
            domain: user.domain,
            number_of_users: user.number_of_users,
            plan_type: user.plan_type,
            subscription_duration: user.subscription_duration,
            renewal_date: user.renewal_date,
            account_status: user.account_status,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    pub name: String,
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    pub mobile: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Admin-side update. Every field optional; omitted fields keep their
/// current value. This is also the manual approval path: an admin moves
/// `account_status` from pending_approval to active here.
#[derive(Debug, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub domain: Option<String>,
    pub number_of_users: Option<i32>,
    pub plan_type: Option<String>,
    pub subscription_duration: Option<String>,
    pub account_status: Option<String>,
    pub renewal_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn account_status_round_trips() {
        for status in [
            AccountStatus::Active,
            AccountStatus::PendingApproval,
            AccountStatus::Disabled,
        ] {
            assert_eq!(AccountStatus::from_str(status.as_str()).unwrap(), status);
        }
        claim::assert_err!(AccountStatus::from_str("suspended"));
    }

    #[test]
    fn profile_drops_the_password_hash() {
        let user = User {
            id: 1,
            name: "Test".into(),
            email: "test@example.com".into(),
            password: "$argon2id$...".into(),
            role: "user".into(),
            mobile: None,
            company_name: None,
            domain: None,
            number_of_users: None,
            plan_type: None,
            subscription_duration: None,
            renewal_date: None,
            account_status: "active".into(),
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        };

        let profile = UserProfile::from(user);
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password").is_none());
    }
}
