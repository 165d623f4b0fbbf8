//! Wire types for the saved-articles API

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Server timestamp format, always UTC
pub const SERVER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Tokens issued on login
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    pub refresh_token: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticlesEnvelope {
    #[serde(default)]
    pub items: Vec<RemoteArticle>,
}

/// One saved article as the server reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteArticle {
    pub id: i64,
    pub url: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub archived: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub favorited: bool,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl RemoteArticle {
    /// `date_added` parsed as UTC, `None` when missing or malformed
    #[must_use]
    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        self.date_added.as_deref().and_then(parse_server_date)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateArticlePayload<'a> {
    pub url: &'a str,
    pub favorited: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchivePayload {
    pub archived: bool,
}

/// Parse `yyyy-MM-dd HH:mm:ss` (UTC); RFC 3339 is accepted as well
#[must_use]
pub fn parse_server_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, SERVER_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

/// Flags arrive as `0`/`1`, booleans, or occasionally strings
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => false,
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        Some(Flag::Text(s)) => matches!(s.trim(), "1" | "true" | "TRUE" | "True"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn flags_accept_ints_and_bools() {
        let json = r#"{"items":[
            {"id":1,"url":"https://a.com/","archived":1,"favorited":0,"date_added":"2024-01-02 03:04:05","updated_at":"x"},
            {"id":2,"url":"https://b.com/","archived":false,"favorited":true},
            {"id":3,"url":"https://c.com/","archived":null,"favorited":"1"}
        ]}"#;
        let envelope: ArticlesEnvelope = serde_json::from_str(json).expect("valid envelope");
        let flags: Vec<(bool, bool)> = envelope
            .items
            .iter()
            .map(|a| (a.archived, a.favorited))
            .collect();
        assert_eq!(flags, vec![(true, false), (false, true), (false, true)]);
    }

    #[test]
    fn server_dates_parse_as_utc() {
        let expected = Utc
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .expect("valid time");
        assert_eq!(parse_server_date("2024-01-02 03:04:05"), Some(expected));
        assert_eq!(parse_server_date("2024-01-02T03:04:05Z"), Some(expected));
        assert_eq!(parse_server_date("yesterday"), None);
    }

    #[test]
    fn login_response_without_refresh_token() {
        let resp: LoginResponse = serde_json::from_str(r#"{"token":"abc"}"#).expect("valid login");
        assert_eq!(resp.refresh_token, None);
        let resp: LoginResponse =
            serde_json::from_str(r#"{"token":"abc","refreshToken":"r"}"#).expect("valid login");
        assert_eq!(resp.refresh_token.as_deref(), Some("r"));
    }
}
