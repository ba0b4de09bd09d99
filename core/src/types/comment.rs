use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coerce::{self, timestamp};
use crate::decode::{decode, unwrap_record, Payload};
use crate::error::ApiError;
use crate::types::User;

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub comment_id: u64,
    pub user: User,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Deserialize)]
struct CommentWire {
    #[serde(with = "coerce::id")]
    id: u64,
    user: Value,
    #[serde(default)]
    body: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CommentWire> for Comment {
    type Error = ApiError;

    fn try_from(wire: CommentWire) -> Result<Self, Self::Error> {
        Ok(Comment {
            comment_id: wire.id,
            user: User::from_value(&wire.user)?,
            body: wire.body,
            created_at: timestamp("created_at", &wire.created_at)?,
            updated_at: timestamp("updated_at", &wire.updated_at)?,
        })
    }
}

impl Comment {
    pub fn decode<'a>(payload: impl Into<Payload<'a>>) -> Result<Self, ApiError> {
        let value = decode(payload)?;
        Self::from_value(unwrap_record(&value)?)
    }

    pub fn from_value(value: &Value) -> Result<Self, ApiError> {
        CommentWire::deserialize(value).map_err(ApiError::from).and_then(Comment::try_from)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn comment() -> Value {
        json!({
            "id": 231876,
            "user": {
                "id": 1,
                "username": "kyle",
                "name": "Kyle Bragger",
                "url": "http://forrst.com/people/kyle",
                "is_a": "developer & designer"
            },
            "body": "Nice work!",
            "created_at": "2011-03-30 08:14:00",
            "updated_at": "2011-03-30 08:14:00"
        })
    }

    #[test]
    fn maps_comment() {
        let comment = Comment::from_value(&comment()).unwrap();
        assert_eq!(comment.comment_id, 231876);
        assert_eq!(comment.body, "Nice work!");
        assert!(comment.user.is_developer_and_designer());
        assert_eq!(comment.created_at, comment.updated_at);
    }

    #[test]
    fn embedded_user_errors_propagate() {
        let mut value = comment();
        value["user"].as_object_mut().unwrap().remove("is_a");
        assert!(matches!(Comment::from_value(&value), Err(ApiError::Decode(_))));
    }

    #[test]
    fn bad_created_at_is_fatal() {
        let mut value = comment();
        value["created_at"] = json!("2011-03-30T08:14:00Z");
        assert!(matches!(
            Comment::from_value(&value),
            Err(ApiError::TimestampParse { field: "created_at", .. })
        ));
    }
}
