//! Lookup selectors and listing options.
//!
//! # Design
//! Every endpoint that accepts "an id or a handle" takes a [`Selector`], so
//! the XOR rule is enforced by the type rather than re-checked per endpoint.
//! Listing options are one struct per endpoint; the struct's fields are the
//! complete set of parameters that endpoint forwards. Unset fields never
//! reach the query string.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::types::PostType;

type Query = Vec<(String, String)>;

/// Identifies a single user or post: by numeric id, or by its handle
/// (a username or a post's tiny id).
///
/// Ids convert from `u64` only, so integer literals need a suffix when passed
/// through `impl Into<Selector>`:
///
/// ```
/// use forrst_core::Selector;
///
/// assert_eq!(Selector::from(6998_u64), Selector::ById(6998));
/// assert_eq!(Selector::from("YPj"), Selector::ByHandle("YPj".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    ById(u64),
    ByHandle(String),
}

impl Selector {
    /// Render the single identifying query pair; `handle_key` names the
    /// parameter a handle is sent as (`username`, `tiny_id`).
    pub fn query(&self, handle_key: &str) -> Result<Query, ApiError> {
        match self {
            Selector::ById(id) => Ok(vec![("id".to_string(), id.to_string())]),
            Selector::ByHandle(handle) if handle.trim().is_empty() => {
                Err(ApiError::InvalidSelector("empty handle".to_string()))
            }
            Selector::ByHandle(handle) => {
                Ok(vec![(handle_key.to_string(), handle.trim().to_string())])
            }
        }
    }
}

impl From<u64> for Selector {
    fn from(id: u64) -> Self {
        Selector::ById(id)
    }
}

impl From<&str> for Selector {
    fn from(handle: &str) -> Self {
        Selector::ByHandle(handle.to_string())
    }
}

impl From<String> for Selector {
    fn from(handle: String) -> Self {
        Selector::ByHandle(handle)
    }
}

/// Selectors coming from untyped input: a non-negative integer selects by id,
/// a non-empty string by handle, anything else is rejected.
impl TryFrom<&Value> for Selector {
    type Error = ApiError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) => n.as_u64().map(Selector::ById).ok_or_else(|| {
                ApiError::InvalidSelector(format!("{n} is not a non-negative integer"))
            }),
            Value::String(s) if !s.trim().is_empty() => Ok(Selector::ByHandle(s.clone())),
            Value::String(_) => Err(ApiError::InvalidSelector("empty handle".to_string())),
            other => Err(ApiError::InvalidSelector(format!(
                "expected an integer id or a string handle, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Recent,
    Popular,
    Best,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Recent => "recent",
            Sort::Popular => "popular",
            Sort::Best => "best",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sort {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(Sort::Recent),
            "popular" => Ok(Sort::Popular),
            "best" => Ok(Sort::Best),
            other => Err(ApiError::InvalidOption {
                key: "sort".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Options for `posts/list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostListOptions {
    pub post_type: Option<PostType>,
    pub sort: Option<Sort>,
    pub page: Option<u32>,
}

impl PostListOptions {
    pub fn post_type(mut self, post_type: PostType) -> Self {
        self.post_type = Some(post_type);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn query(&self) -> Query {
        let mut query = Vec::new();
        push(&mut query, "post_type", self.post_type.as_ref());
        push(&mut query, "sort", self.sort.as_ref());
        push(&mut query, "page", self.page.as_ref());
        query
    }
}

/// Filters forwarded by `User::posts` to `users/posts`.
///
/// Only `limit`, `type` and `after` exist on this endpoint; use
/// [`UserPostsOptions::from_pairs`] to build one from loosely-typed input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPostsOptions {
    pub limit: Option<u32>,
    pub post_type: Option<PostType>,
    /// Only return posts with an id lower than this one.
    pub after: Option<u64>,
}

impl UserPostsOptions {
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn post_type(mut self, post_type: PostType) -> Self {
        self.post_type = Some(post_type);
        self
    }

    pub fn after(mut self, after: u64) -> Self {
        self.after = Some(after);
        self
    }

    /// Keep `limit`, `type` and `after`; drop every other key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOption` if an allowed key carries a malformed value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = UserPostsOptions::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "limit" => options.limit = Some(parse_option(key, value)?),
                "type" => options.post_type = Some(value.parse()?),
                "after" => options.after = Some(parse_option(key, value)?),
                other => debug!(key = other, "dropping unsupported user posts option"),
            }
        }
        Ok(options)
    }

    pub fn query(&self) -> Query {
        let mut query = Vec::new();
        push(&mut query, "limit", self.limit.as_ref());
        push(&mut query, "type", self.post_type.as_ref());
        push(&mut query, "after", self.after.as_ref());
        query
    }
}

/// Options for `posts/all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllPostsOptions {
    /// Only return posts with an id lower than this one.
    pub after: Option<u64>,
}

impl AllPostsOptions {
    pub fn after(after: u64) -> Self {
        Self { after: Some(after) }
    }

    pub fn query(&self) -> Query {
        let mut query = Vec::new();
        push(&mut query, "after", self.after.as_ref());
        query
    }
}

fn push<T: fmt::Display>(query: &mut Query, key: &str, value: Option<&T>) {
    if let Some(value) = value {
        query.push((key.to_string(), value.to_string()));
    }
}

fn parse_option<T: FromStr>(key: &str, value: &str) -> Result<T, ApiError> {
    value.trim().parse().map_err(|_| ApiError::InvalidOption {
        key: key.to_string(),
        value: value.to_string(),
    })
}
