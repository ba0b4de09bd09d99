use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::coerce::{self, split_tokens};
use crate::decode::{decode, unwrap_record, Payload};
use crate::error::ApiError;
use crate::gateway::Forrst;
use crate::http::Transport;
use crate::params::UserPostsOptions;
use crate::types::Post;

/// A Forrst member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub user_id: u64,
    pub username: String,
    pub name: String,
    /// Profile page on forrst.com.
    pub url: String,
    pub homepage: Option<String>,
    /// Whether the user is listed in the Forrst.me directory.
    pub listed: bool,
    pub twitter: Option<String>,
    pub bio: Option<String>,
    pub statistics: UserStatistics,
    pub photos: Photos,
    /// Never empty.
    pub roles: Vec<Role>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserStatistics {
    pub comments: u64,
    pub likes: u64,
    pub followers: u64,
    pub following: u64,
    pub posts: u64,
}

/// Avatar URLs by size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photos {
    #[serde(rename(deserialize = "xl_url"))]
    pub extra_large: Option<String>,
    #[serde(rename(deserialize = "large_url"))]
    pub large: Option<String>,
    #[serde(rename(deserialize = "medium_url"))]
    pub medium: Option<String>,
    #[serde(rename(deserialize = "small_url"))]
    pub small: Option<String>,
    #[serde(rename(deserialize = "thumb_url"))]
    pub thumbnail: Option<String>,
}

/// What a user describes themselves as (`is_a`).
///
/// Unrecognised roles are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Developer,
    Designer,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Developer => "developer",
            Role::Designer => "designer",
            Role::Other(raw) => raw,
        }
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        match raw {
            "developer" => Role::Developer,
            "designer" => Role::Designer,
            other => Role::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// `"developer & designer"` → `[Developer, Designer]`, duplicates dropped.
pub(crate) fn parse_roles(raw: &str) -> Vec<Role> {
    let mut roles: Vec<Role> = Vec::new();
    for role in split_tokens(raw, '&').map(Role::from) {
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    roles
}

#[derive(Deserialize)]
struct UserWire {
    #[serde(with = "coerce::id")]
    id: u64,
    username: String,
    name: String,
    url: String,
    homepage_url: Option<String>,
    #[serde(default, with = "coerce::flag")]
    in_directory: bool,
    twitter: Option<String>,
    bio: Option<String>,
    #[serde(default, with = "coerce::count")]
    comments: u64,
    #[serde(default, with = "coerce::count")]
    likes: u64,
    #[serde(default, with = "coerce::count")]
    followers: u64,
    #[serde(default, with = "coerce::count")]
    following: u64,
    #[serde(default, with = "coerce::count")]
    posts: u64,
    #[serde(default)]
    photos: Option<Photos>,
    #[serde(default)]
    is_a: Option<String>,
    #[serde(default, with = "coerce::tags")]
    tag_string: Vec<String>,
}

impl TryFrom<UserWire> for User {
    type Error = ApiError;

    fn try_from(wire: UserWire) -> Result<Self, Self::Error> {
        let roles = wire.is_a.as_deref().map(parse_roles).unwrap_or_default();
        if roles.is_empty() {
            return Err(ApiError::Decode(format!("user {} has no role (`is_a`)", wire.username)));
        }

        Ok(User {
            user_id: wire.id,
            username: wire.username,
            name: wire.name,
            url: wire.url,
            homepage: wire.homepage_url.filter(|s| !s.is_empty()),
            listed: wire.in_directory,
            twitter: wire.twitter.filter(|s| !s.is_empty()),
            bio: wire.bio,
            statistics: UserStatistics {
                comments: wire.comments,
                likes: wire.likes,
                followers: wire.followers,
                following: wire.following,
                posts: wire.posts,
            },
            photos: wire.photos.unwrap_or_default(),
            roles,
            tags: wire.tag_string,
        })
    }
}

impl User {
    /// Map a user object (already out of its envelope).
    pub fn decode<'a>(payload: impl Into<Payload<'a>>) -> Result<Self, ApiError> {
        let value = decode(payload)?;
        Self::from_value(unwrap_record(&value)?)
    }

    pub fn from_value(value: &Value) -> Result<Self, ApiError> {
        UserWire::deserialize(value).map_err(ApiError::from).and_then(User::try_from)
    }

    /// Developer and nothing else.
    pub fn is_developer(&self) -> bool {
        self.roles == [Role::Developer]
    }

    /// Designer and nothing else.
    pub fn is_designer(&self) -> bool {
        self.roles == [Role::Designer]
    }

    pub fn is_developer_and_designer(&self) -> bool {
        self.roles.contains(&Role::Developer) && self.roles.contains(&Role::Designer)
    }

    /// Fetch this user's posts. Issues a request on every call.
    pub fn posts<T: Transport>(
        &self,
        forrst: &Forrst<T>,
        options: &UserPostsOptions,
    ) -> Result<Vec<Post>, ApiError> {
        forrst.user_posts(&self.username, options)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn yorick() -> Value {
        json!({
            "id": 6998,
            "username": "YorickPeterse",
            "name": "Yorick Peterse",
            "url": "http://forrst.com/people/YorickPeterse",
            "homepage_url": "http://yorickpeterse.com/",
            "in_directory": true,
            "twitter": "YorickPeterse",
            "bio": "<p>Ruby developer</p>",
            "comments": "61",
            "likes": "105",
            "followers": "69",
            "following": "44",
            "posts": "32",
            "photos": {
                "xl_url": "http://forrst.com/photos/xl.png",
                "large_url": "http://forrst.com/photos/large.png",
                "medium_url": "http://forrst.com/photos/medium.png",
                "small_url": "http://forrst.com/photos/small.png",
                "thumb_url": "http://forrst.com/photos/thumb.png"
            },
            "is_a": "developer",
            "tag_string": "ruby, ramaze,rack"
        })
    }

    #[test]
    fn maps_renamed_and_coerced_fields() {
        let user = User::from_value(&yorick()).unwrap();
        assert_eq!(user.user_id, 6998);
        assert_eq!(user.homepage.as_deref(), Some("http://yorickpeterse.com/"));
        assert!(user.listed);
        assert_eq!(user.statistics.posts, 32);
        assert_eq!(user.statistics.followers, 69);
        assert_eq!(user.photos.extra_large.as_deref(), Some("http://forrst.com/photos/xl.png"));
        assert_eq!(user.tags, vec!["ruby", "ramaze", "rack"]);
        assert_eq!(user.roles, vec![Role::Developer]);
    }

    #[test]
    fn text_and_value_decode_to_same_record() {
        let value = yorick();
        let text = value.to_string();
        assert_eq!(User::decode(text.as_str()).unwrap(), User::decode(&value).unwrap());
    }

    #[test]
    fn missing_tags_and_photos_default() {
        let mut value = yorick();
        let object = value.as_object_mut().unwrap();
        object.remove("tag_string");
        object.remove("photos");
        let user = User::from_value(&value).unwrap();
        assert!(user.tags.is_empty());
        assert_eq!(user.photos, Photos::default());
    }

    #[test]
    fn role_predicates() {
        let mut value = yorick();
        value["is_a"] = json!("developer & designer");
        let user = User::from_value(&value).unwrap();
        assert_eq!(user.roles, vec![Role::Developer, Role::Designer]);
        assert!(user.is_developer_and_designer());
        assert!(!user.is_developer());
        assert!(!user.is_designer());

        let user = User::from_value(&yorick()).unwrap();
        assert!(user.is_developer());
        assert!(!user.is_designer());
        assert!(!user.is_developer_and_designer());
    }

    #[test]
    fn unknown_roles_are_preserved() {
        assert_eq!(
            parse_roles(" designer &  illustrator & designer "),
            vec![Role::Designer, Role::Other("illustrator".to_string())]
        );
    }

    #[test]
    fn missing_role_is_rejected() {
        let mut value = yorick();
        value["is_a"] = json!(" & ");
        assert!(matches!(User::from_value(&value), Err(ApiError::Decode(_))));
    }

    #[test]
    fn missing_username_is_a_decode_error() {
        let mut value = yorick();
        value.as_object_mut().unwrap().remove("username");
        assert!(matches!(User::from_value(&value), Err(ApiError::Decode(_))));
    }

    #[test]
    fn roles_serialize_as_strings() {
        let user = User::from_value(&yorick()).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["roles"], json!(["developer"]));
        assert_eq!(json["statistics"]["posts"], 32);
    }

    #[test]
    fn decode_accepts_full_users_info_body() {
        let body = json!({"stat": "ok", "in": 0.0113, "resp": yorick()}).to_string();
        let user = User::decode(body).unwrap();
        assert_eq!(user, User::from_value(&yorick()).unwrap());
    }
}
