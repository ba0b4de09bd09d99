use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::coerce::{self, timestamp};
use crate::decode::{decode, unwrap_record, Payload};
use crate::error::ApiError;
use crate::gateway::Forrst;
use crate::http::Transport;
use crate::types::{Comment, User};

/// A single post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub post_id: u64,
    /// Short slug used in post URLs; interchangeable with `post_id` for lookup.
    pub tiny_id: String,
    pub post_type: PostType,
    pub post_url: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub user: User,
    pub published: bool,
    /// `false` means viewers must be logged in.
    pub public: bool,
    pub title: String,
    /// External URL of a link post.
    pub url: Option<String>,
    /// The code of a code post, or the question of a question post.
    pub content: Option<String>,
    pub description: Option<String>,
    pub formatted_description: Option<String>,
    pub formatted_content: Option<String>,
    pub statistics: PostStatistics,
    pub tags: Vec<String>,
    /// All `None` unless this is a snap.
    pub snaps: Snaps,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostStatistics {
    pub comments: u64,
    pub likes: u64,
}

/// Screenshot URLs of a snap post, by size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snaps {
    #[serde(rename(deserialize = "mega_url"))]
    pub extra_large: Option<String>,
    #[serde(rename(deserialize = "keith_url"))]
    pub keith: Option<String>,
    #[serde(rename(deserialize = "large_url"))]
    pub large: Option<String>,
    #[serde(rename(deserialize = "medium_url"))]
    pub medium: Option<String>,
    #[serde(rename(deserialize = "small_url"))]
    pub small: Option<String>,
    #[serde(rename(deserialize = "thumb_url"))]
    pub thumbnail: Option<String>,
    #[serde(rename(deserialize = "original_url"))]
    pub original: Option<String>,
}

impl Snaps {
    pub fn is_empty(&self) -> bool {
        *self == Snaps::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PostType {
    Code,
    Snap,
    Question,
    Link,
    /// A type this client does not know about, kept verbatim.
    Other(String),
}

impl PostType {
    pub fn as_str(&self) -> &str {
        match self {
            PostType::Code => "code",
            PostType::Snap => "snap",
            PostType::Question => "question",
            PostType::Link => "link",
            PostType::Other(raw) => raw,
        }
    }
}

impl From<&str> for PostType {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "code" => PostType::Code,
            "snap" => PostType::Snap,
            "question" => PostType::Question,
            "link" => PostType::Link,
            other => PostType::Other(other.to_string()),
        }
    }
}

impl FromStr for PostType {
    type Err = ApiError;

    /// Strict parse for caller input; only the four known types are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match PostType::from(s) {
            PostType::Other(raw) => Err(ApiError::InvalidOption {
                key: "type".to_string(),
                value: raw,
            }),
            known => Ok(known),
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PostType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

#[derive(Deserialize)]
struct PostWire {
    id: RawId,
    tiny_id: Option<String>,
    post_type: String,
    post_url: String,
    created_at: String,
    updated_at: String,
    user: Value,
    #[serde(default, with = "coerce::flag")]
    published: bool,
    #[serde(default, with = "coerce::flag")]
    public: bool,
    title: String,
    url: Option<String>,
    content: Option<String>,
    description: Option<String>,
    formatted_description: Option<String>,
    formatted_content: Option<String>,
    #[serde(default, with = "coerce::count")]
    comment_count: u64,
    #[serde(default, with = "coerce::count")]
    like_count: u64,
    #[serde(default, with = "coerce::tags")]
    tags: Vec<String>,
    #[serde(default)]
    snaps: Option<Snaps>,
}

impl TryFrom<PostWire> for Post {
    type Error = ApiError;

    fn try_from(wire: PostWire) -> Result<Self, Self::Error> {
        let (post_id, id_text) = match wire.id {
            RawId::Number(n) => (n, n.to_string()),
            RawId::Text(s) => {
                let n = s
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::Decode(format!("invalid post id {s:?}")))?;
                (n, s)
            }
        };

        Ok(Post {
            post_id,
            tiny_id: wire.tiny_id.filter(|s| !s.is_empty()).unwrap_or(id_text),
            post_type: PostType::from(wire.post_type.as_str()),
            post_url: wire.post_url,
            created_at: timestamp("created_at", &wire.created_at)?,
            updated_at: timestamp("updated_at", &wire.updated_at)?,
            user: User::from_value(&wire.user)?,
            published: wire.published,
            public: wire.public,
            title: wire.title,
            url: wire.url.filter(|s| !s.is_empty()),
            content: wire.content,
            description: wire.description,
            formatted_description: wire.formatted_description,
            formatted_content: wire.formatted_content,
            statistics: PostStatistics {
                comments: wire.comment_count,
                likes: wire.like_count,
            },
            tags: wire.tags,
            snaps: wire.snaps.unwrap_or_default(),
        })
    }
}

impl Post {
    /// Map a post object (already out of its envelope).
    pub fn decode<'a>(payload: impl Into<Payload<'a>>) -> Result<Self, ApiError> {
        let value = decode(payload)?;
        Self::from_value(unwrap_record(&value)?)
    }

    pub fn from_value(value: &Value) -> Result<Self, ApiError> {
        PostWire::deserialize(value).map_err(ApiError::from).and_then(Post::try_from)
    }

    pub fn is_code(&self) -> bool {
        self.post_type == PostType::Code
    }

    pub fn is_snap(&self) -> bool {
        self.post_type == PostType::Snap
    }

    pub fn is_question(&self) -> bool {
        self.post_type == PostType::Question
    }

    pub fn is_link(&self) -> bool {
        self.post_type == PostType::Link
    }

    /// Fetch the comments on this post. Issues a request on every call.
    pub fn comments<T: Transport>(&self, forrst: &Forrst<T>) -> Result<Vec<Comment>, ApiError> {
        forrst.post_comments(self.post_id)
    }
}
