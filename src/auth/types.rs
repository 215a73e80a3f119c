//! Authentication Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MSG_ACCOUNT_CREATED: &str = "Account created successfully!";
pub const MSG_DUPLICATE_EMAIL: &str = "User with this email already exists!";
pub const MSG_CREATE_FAILED: &str = "Error creating account. Please try again.";
pub const MSG_LOGIN_OK: &str = "Login successful!";
pub const MSG_LOGIN_FAILED: &str = "Error logging in. Please try again.";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password!";

/// A registered account as persisted in the user list.
///
/// The password is kept and compared as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis_opt", default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Signup payload handed to `AuthManager::register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// Outcome of a register or login call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl AuthResult {
    pub fn succeeded(message: &str, user: User) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            user: Some(user),
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            user: None,
        }
    }
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2024-05-01T09:30:00.000Z`
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

mod iso_millis_opt {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => super::iso_millis::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_user() -> User {
        User {
            id: "1714555800000".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "engine1".to_string(),
            phone: "+44 20 7946 0000".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            last_login: None,
        }
    }

    #[test]
    fn test_user_wire_format() {
        let value = serde_json::to_value(sample_user()).unwrap();

        assert_eq!(value["firstName"], "Ada");
        assert_eq!(value["lastName"], "Lovelace");
        assert_eq!(value["createdAt"], "2024-05-01T09:30:00.000Z");
        assert!(value["lastLogin"].is_null());
        assert!(value.get("first_name").is_none());
    }

    #[test]
    fn test_user_parses_browser_written_record() {
        let raw = r#"{
            "id": "1700000000000",
            "firstName": "A",
            "lastName": "B",
            "email": "a@b.com",
            "password": "secret1",
            "phone": "123",
            "createdAt": "2023-11-14T22:13:20.000Z",
            "lastLogin": "2023-11-15T08:00:00.250Z"
        }"#;

        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.last_login.unwrap().timestamp_subsec_millis(), 250);
        assert_eq!(user.full_name(), "A B");
    }

    #[test]
    fn test_missing_last_login_defaults_to_none() {
        let raw = r#"{"id":"1","firstName":"A","lastName":"B","email":"a@b.com",
            "password":"p","phone":"1","createdAt":"2023-11-14T22:13:20.000Z"}"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.last_login, None);
    }

    #[test]
    fn test_failed_result_has_no_user() {
        let result = AuthResult::failed(MSG_INVALID_CREDENTIALS);
        assert!(!result.success);
        assert!(result.user.is_none());
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("user").is_none());
    }
}
