use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// One booking from the public schedule, decoded field by field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    #[schema(example = "2026-01-22")]
    pub date: String,
    #[schema(example = "10:00 - 12:00")]
    pub time: String,
    #[schema(example = "GMI35S_V3NJJ")]
    pub course: String,
    #[schema(example = "Ulrika Artursson Wissa")]
    pub instructor: String,
    #[schema(example = "Samtal298")]
    pub room: String,
    #[schema(example = "Handledning")]
    pub session_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleResponse {
    #[schema(example = "success")]
    pub status: String,
    pub schema: Vec<ScheduleEntry>,
}

impl ScheduleResponse {
    pub fn success(schema: Vec<ScheduleEntry>) -> Self {
        Self {
            status: "success".to_string(),
            schema,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsFeed {
    pub source: String,
    pub count: usize,
    pub articles: Vec<NewsArticle>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Friend {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub status: String,
}

/// Incoming body for creating or updating a friend.
///
/// Every field is optional at the wire level so missing fields surface as a
/// validation error instead of a body rejection. An explicit `null` counts as
/// present: `id` becomes `Some(Value::Null)` and text fields `Some(None)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FriendPayload {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i64>)]
    pub id: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub status: Option<Option<String>>,
}

/// Marks a key that appears in the body, whatever its value.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Sanitized partial update for an existing friend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

impl FriendUpdate {
    pub fn apply(self, friend: &mut Friend) {
        if let Some(name) = self.name {
            friend.name = name;
        }
        if let Some(email) = self.email {
            friend.email = email;
        }
        if let Some(status) = self.status {
            friend.status = status;
        }
    }
}
