//! Stateless HTTP request builder and response parser for the Forrst API.
//!
//! # Design
//! `ForrstClient` holds only its immutable `Config` and carries no state
//! between calls. Each endpoint is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Envelope locations are fixed per endpoint here rather than inferred from
//! the payload.

use serde_json::Value;
use tracing::trace;

use crate::config::Config;
use crate::decode::{check_status, decode, open_envelope};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::params::{AllPostsOptions, PostListOptions, Selector, UserPostsOptions};
use crate::types::{Comment, Post, Stats, User};

pub const STATS_PATH: &str = "stats";
pub const USER_INFO_PATH: &str = "users/info";
pub const USER_POSTS_PATH: &str = "users/posts";
pub const POST_LIST_PATH: &str = "posts/list";
pub const POST_ALL_PATH: &str = "posts/all";
pub const POST_SHOW_PATH: &str = "posts/show";
pub const POST_COMMENTS_PATH: &str = "posts/comments";

/// Synchronous, stateless request builder/response parser.
#[derive(Debug, Clone)]
pub struct ForrstClient {
    config: Config,
}

impl ForrstClient {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn build_stats(&self) -> HttpRequest {
        self.get(STATS_PATH, Vec::new())
    }

    pub fn build_user(&self, selector: &Selector) -> Result<HttpRequest, ApiError> {
        Ok(self.get(USER_INFO_PATH, selector.query("username")?))
    }

    pub fn build_user_posts(
        &self,
        username: &str,
        options: &UserPostsOptions,
    ) -> Result<HttpRequest, ApiError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ApiError::InvalidSelector("empty username".to_string()));
        }
        let mut query = vec![("username".to_string(), username.to_string())];
        query.extend(options.query());
        Ok(self.get(USER_POSTS_PATH, query))
    }

    pub fn build_post_list(&self, options: &PostListOptions) -> HttpRequest {
        self.get(POST_LIST_PATH, options.query())
    }

    pub fn build_all_posts(&self, options: &AllPostsOptions) -> HttpRequest {
        self.get(POST_ALL_PATH, options.query())
    }

    pub fn build_post(&self, selector: &Selector) -> Result<HttpRequest, ApiError> {
        Ok(self.get(POST_SHOW_PATH, selector.query("tiny_id")?))
    }

    pub fn build_post_comments(&self, post_id: u64) -> HttpRequest {
        self.get(POST_COMMENTS_PATH, vec![("id".to_string(), post_id.to_string())])
    }

    pub fn parse_stats(&self, response: HttpResponse) -> Result<Stats, ApiError> {
        let body = body(&response)?;
        Stats::from_value(open_envelope(&body, &["resp"])?)
    }

    pub fn parse_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        let body = body(&response)?;
        User::from_value(open_envelope(&body, &["resp"])?)
    }

    pub fn parse_user_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        self.parse_posts(response)
    }

    pub fn parse_post_list(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        self.parse_posts(response)
    }

    pub fn parse_all_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        self.parse_posts(response)
    }

    pub fn parse_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        let body = body(&response)?;
        Post::from_value(open_envelope(&body, &["resp"])?)
    }

    pub fn parse_post_comments(&self, response: HttpResponse) -> Result<Vec<Comment>, ApiError> {
        let body = body(&response)?;
        map_list(open_envelope(&body, &["resp", "comments"])?, Comment::from_value)
    }

    fn parse_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        let body = body(&response)?;
        map_list(open_envelope(&body, &["resp", "posts"])?, Post::from_value)
    }

    fn get(&self, path: &str, query: Vec<(String, String)>) -> HttpRequest {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), self.config.user_agent.clone()),
        ];
        if let Some(token) = &self.config.access_token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token.secret())));
        }
        HttpRequest {
            path: format!("{}{path}", self.config.base_url()),
            query,
            headers,
        }
    }
}

fn body(response: &HttpResponse) -> Result<Value, ApiError> {
    check_status(response)?;
    Ok(decode(response.body.as_str())?.into_owned())
}

/// Map every element; the first failure aborts the whole list.
fn map_list<T>(
    value: &Value,
    map: impl Fn(&Value) -> Result<T, ApiError>,
) -> Result<Vec<T>, ApiError> {
    let items = value
        .as_array()
        .ok_or_else(|| ApiError::Decode(format!("expected an array, got {value}")))?;
    trace!(count = items.len(), "mapping list payload");
    items.iter().map(map).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PostType;

    fn client() -> ForrstClient {
        ForrstClient::new(Config::new().with_endpoint("http://localhost:3000/api/v2")).unwrap()
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    const USER: &str = r#"{"id":6998,"username":"YorickPeterse","name":"Yorick Peterse",
        "url":"http://forrst.com/people/YorickPeterse","is_a":"developer","posts":"32"}"#;

    fn post(id: u64, created_at: &str) -> String {
        format!(
            r#"{{"id":{id},"post_type":"code","post_url":"http://forrst.com/posts/{id}",
            "created_at":"{created_at}","updated_at":"2011-03-29 12:03:41","user":{USER},
            "published":true,"public":true,"title":"Post {id}","content":"puts 1"}}"#
        )
    }

    #[test]
    fn build_stats_produces_correct_request() {
        let req = client().build_stats();
        assert_eq!(req.path, "http://localhost:3000/api/v2/stats");
        assert!(req.query.is_empty());
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.header("user-agent").unwrap().starts_with("forrst-rs/"));
        assert!(req.header("authorization").is_none());
    }

    #[test]
    fn token_is_sent_on_every_request() {
        let client = ForrstClient::new(Config::new().with_access_token("abc123")).unwrap();
        for req in [
            client.build_stats(),
            client.build_post_list(&PostListOptions::default()),
            client.build_post_comments(1),
        ] {
            assert_eq!(req.header("Authorization"), Some("Bearer abc123"));
        }
    }

    #[test]
    fn build_user_by_id_and_username() {
        let req = client().build_user(&Selector::ById(6998)).unwrap();
        assert_eq!(req.path, "http://localhost:3000/api/v2/users/info");
        assert_eq!(req.query_value("id"), Some("6998"));
        assert_eq!(req.query_value("username"), None);

        let req = client().build_user(&Selector::from("YorickPeterse")).unwrap();
        assert_eq!(req.query_value("username"), Some("YorickPeterse"));
        assert_eq!(req.query_value("id"), None);
    }

    #[test]
    fn build_post_by_tiny_id() {
        let req = client().build_post(&Selector::from("YPj")).unwrap();
        assert_eq!(req.path, "http://localhost:3000/api/v2/posts/show");
        assert_eq!(req.query, vec![("tiny_id".to_string(), "YPj".to_string())]);
    }

    #[test]
    fn build_user_posts_merges_options() {
        let options = UserPostsOptions::default().limit(5).post_type(PostType::Code);
        let req = client().build_user_posts("YorickPeterse", &options).unwrap();
        assert_eq!(req.path, "http://localhost:3000/api/v2/users/posts");
        assert_eq!(
            req.query,
            vec![
                ("username".to_string(), "YorickPeterse".to_string()),
                ("limit".to_string(), "5".to_string()),
                ("type".to_string(), "code".to_string()),
            ]
        );
    }

    #[test]
    fn build_user_posts_rejects_empty_username() {
        let err = client().build_user_posts("", &UserPostsOptions::default()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidSelector(_)));
    }

    #[test]
    fn parse_user_opens_resp() {
        let user = client().parse_user(ok(&format!(r#"{{"stat":"ok","resp":{USER}}}"#))).unwrap();
        assert_eq!(user.username, "YorickPeterse");
        assert_eq!(user.statistics.posts, 32);
    }

    #[test]
    fn parse_post_list_maps_every_element() {
        let body = format!(
            r#"{{"stat":"ok","resp":{{"posts":[{},{}]}}}}"#,
            post(86456, "2011-03-30 10:00:00"),
            post(86455, "2011-03-30 09:00:00")
        );
        let posts = client().parse_post_list(ok(&body)).unwrap();
        assert_eq!(posts.iter().map(|p| p.post_id).collect::<Vec<_>>(), vec![86456, 86455]);
    }

    #[test]
    fn parse_post_list_fails_whole_list_on_one_bad_element() {
        let body = format!(
            r#"{{"stat":"ok","resp":{{"posts":[{},{}]}}}}"#,
            post(86456, "2011-03-30 10:00:00"),
            post(86455, "last tuesday")
        );
        let err = client().parse_post_list(ok(&body)).unwrap_err();
        assert!(matches!(err, ApiError::TimestampParse { field: "created_at", .. }));
    }

    #[test]
    fn parse_comments_requires_array() {
        let err = client()
            .parse_post_comments(ok(r#"{"stat":"ok","resp":{"comments":{}}}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn parse_stats_success() {
        let stats = client()
            .parse_stats(ok(r#"{"stat":"ok","resp":{"rate_limit":"150","calls_made":"2"}}"#))
            .unwrap();
        assert_eq!(stats, Stats { rate_limit: 150, calls_made: 2 });
    }

    #[test]
    fn parse_user_not_found() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: String::new(),
        };
        assert_eq!(client().parse_user(response).unwrap_err(), ApiError::NotFound);
    }

    #[test]
    fn parse_fail_envelope_is_upstream() {
        let err = client()
            .parse_post(ok(r#"{"stat":"fail","resp":{"error":"post not found"}}"#))
            .unwrap_err();
        assert!(
            matches!(err, ApiError::Upstream { ref message, .. } if message == "post not found")
        );
    }

    #[test]
    fn parse_bad_json() {
        let err = client().parse_stats(ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let err = ForrstClient::new(Config::new().with_endpoint("forrst.com")).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
        let config = Config::new().with_endpoint("http://forrst.com/api/v2/?env=sandbox");
        assert!(matches!(ForrstClient::new(config), Err(ApiError::Config(_))));
    }
}
