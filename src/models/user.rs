//! User profile model for local storage and the profile API.

use serde::{Deserialize, Serialize};

/// Region used when no profile (or an incomplete one) is stored.
pub const DEFAULT_STATE: &str = "india";
/// Language used when no profile (or an incomplete one) is stored.
pub const DEFAULT_LANGUAGE: &str = "telugu";

/// Signed-in user's profile, persisted in client-local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Identity provider user ID
    #[serde(rename = "userId", alias = "user_id", default)]
    pub user_id: Option<String>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Preferred region (e.g. "india", "kerala")
    #[serde(default)]
    pub state: Option<String>,
    /// Preferred content language
    #[serde(default)]
    pub language: Option<String>,
    /// Avatar URL
    #[serde(alias = "photoUrl", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Profile payload sent to `POST /user/profile`.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub state: String,
    pub language: String,
    pub photo_url: String,
}

/// Registration payload sent to `POST /user/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub display_name: String,
}

/// Region/language pair used to parametrize feed requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub state: String,
    pub language: String,
}

impl Locale {
    /// Resolve the locale from an optional profile, falling back per field.
    ///
    /// Empty strings are treated the same as missing values.
    pub fn resolve(profile: Option<&UserProfile>) -> Self {
        let pick = |value: Option<&String>, default: &str| {
            value
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            state: pick(profile.and_then(|p| p.state.as_ref()), DEFAULT_STATE),
            language: pick(profile.and_then(|p| p.language.as_ref()), DEFAULT_LANGUAGE),
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::resolve(None)
    }
}

/// Generated avatar for users and channels without a picture.
pub fn fallback_avatar_url(name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=random",
        urlencoding::encode(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_falls_back_per_field() {
        assert_eq!(
            Locale::resolve(None),
            Locale {
                state: "india".to_string(),
                language: "telugu".to_string()
            }
        );

        let partial = UserProfile {
            user_id: Some("u1".to_string()),
            email: None,
            state: Some("kerala".to_string()),
            language: Some(String::new()),
            photo_url: None,
        };
        let locale = Locale::resolve(Some(&partial));
        assert_eq!(locale.state, "kerala");
        assert_eq!(locale.language, "telugu");
    }

    #[test]
    fn profile_reads_stored_record_keys() {
        let json = r#"{"userId":"abc","email":"a@b.c","state":"goa","language":"konkani","photo_url":"https://x/y.png"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.user_id.as_deref(), Some("abc"));
        assert_eq!(profile.photo_url.as_deref(), Some("https://x/y.png"));

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["userId"], "abc");
    }

    #[test]
    fn fallback_avatar_is_url_encoded() {
        assert_eq!(
            fallback_avatar_url("Ravi Teja"),
            "https://ui-avatars.com/api/?name=Ravi%20Teja&background=random"
        );
    }
}
