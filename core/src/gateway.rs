//! Gateways: one network round-trip plus decode/map per call.
//!
//! `Forrst` pairs a [`ForrstClient`] with a [`Transport`]. Calls block until
//! the transport returns. Nothing is retried or cached, so two identical
//! calls issue two requests.

use std::fmt;

use tracing::{debug, warn};

use crate::client::ForrstClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::params::{AllPostsOptions, PostListOptions, Selector, UserPostsOptions};
use crate::transport::UreqTransport;
use crate::types::{Comment, Post, Stats, User};

pub struct Forrst<T = UreqTransport> {
    client: ForrstClient,
    transport: T,
}

impl<T> fmt::Debug for Forrst<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forrst").field("client", &self.client).finish_non_exhaustive()
    }
}

impl Forrst<UreqTransport> {
    /// Client over the blocking `ureq` transport.
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Forrst<T> {
    pub fn with_transport(config: Config, transport: T) -> Result<Self, ApiError> {
        Ok(Self { client: ForrstClient::new(config)?, transport })
    }

    pub fn client(&self) -> &ForrstClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Rate limit and calls made for the configured credentials.
    pub fn stats(&self) -> Result<Stats, ApiError> {
        let response = self.send(self.client.build_stats())?;
        self.client.parse_stats(response)
    }

    pub fn find_user(&self, selector: impl Into<Selector>) -> Result<User, ApiError> {
        let request = self.client.build_user(&selector.into())?;
        let response = self.send(request)?;
        self.client.parse_user(response)
    }

    pub fn find_user_by_id(&self, user_id: u64) -> Result<User, ApiError> {
        self.find_user(Selector::ById(user_id))
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<User, ApiError> {
        self.find_user(Selector::from(username))
    }

    pub fn user_posts(
        &self,
        username: &str,
        options: &UserPostsOptions,
    ) -> Result<Vec<Post>, ApiError> {
        let request = self.client.build_user_posts(username, options)?;
        let response = self.send(request)?;
        self.client.parse_user_posts(response)
    }

    pub fn list_posts(&self, options: &PostListOptions) -> Result<Vec<Post>, ApiError> {
        let response = self.send(self.client.build_post_list(options))?;
        self.client.parse_post_list(response)
    }

    /// Every post on the site, newest first, optionally below an id cursor.
    pub fn all_posts(&self, options: &AllPostsOptions) -> Result<Vec<Post>, ApiError> {
        let response = self.send(self.client.build_all_posts(options))?;
        self.client.parse_all_posts(response)
    }

    pub fn show_post(&self, selector: impl Into<Selector>) -> Result<Post, ApiError> {
        let request = self.client.build_post(&selector.into())?;
        let response = self.send(request)?;
        self.client.parse_post(response)
    }

    pub fn post_comments(&self, post_id: u64) -> Result<Vec<Comment>, ApiError> {
        let response = self.send(self.client.build_post_comments(post_id))?;
        self.client.parse_post_comments(response)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(path = %request.path, query = ?request.query, "GET");
        match self.transport.execute(&request) {
            Ok(response) => {
                debug!(path = %request.path, status = response.status, "response");
                Ok(response)
            }
            Err(e) => {
                warn!(path = %request.path, error = %e, "request failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::types::PostType;

    const USER: &str = r#"{"id":"6998","username":"YorickPeterse","name":"Yorick Peterse",
        "url":"http://forrst.com/people/YorickPeterse","is_a":"developer","posts":"32"}"#;

    fn post_json(id: u64) -> String {
        format!(
            r#"{{"id":{id},"tiny_id":"t{id}","post_type":"code",
            "post_url":"http://forrst.com/posts/{id}",
            "created_at":"2011-03-29 12:03:41","updated_at":"2011-03-29 12:03:41","user":{USER},
            "published":true,"public":true,"title":"Post {id}","content":"puts 1"}}"#
        )
    }

    /// Canned transport that records every request it sees.
    struct Recorder {
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Recorder {
        fn new() -> Self {
            Self { seen: RefCell::new(Vec::new()) }
        }
    }

    impl Transport for Recorder {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.borrow_mut().push(request.clone());
            let body = match request.path.rsplit_once("/api/v2/").map(|(_, p)| p) {
                Some("users/info") => format!(r#"{{"stat":"ok","resp":{USER}}}"#),
                Some("users/posts") | Some("posts/list") | Some("posts/all") => format!(
                    r#"{{"stat":"ok","resp":{{"posts":[{},{}]}}}}"#,
                    post_json(2),
                    post_json(1)
                ),
                Some("posts/show") => format!(r#"{{"stat":"ok","resp":{}}}"#, post_json(1)),
                Some("posts/comments") => format!(
                    r#"{{"stat":"ok","resp":{{"comments":[{{"id":5,"user":{USER},"body":"hi",
                    "created_at":"2011-03-29 12:03:41","updated_at":"2011-03-29 12:03:41"}}]}}}}"#
                ),
                _ => {
                    return Ok(HttpResponse {
                        status: 404,
                        headers: Vec::new(),
                        body: String::new(),
                    })
                }
            };
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body,
            })
        }
    }

    fn forrst() -> Forrst<Recorder> {
        Forrst::with_transport(Config::new().with_endpoint("http://mock/api/v2/"), Recorder::new())
            .unwrap()
    }

    fn seen(forrst: &Forrst<Recorder>) -> std::cell::Ref<'_, Vec<HttpRequest>> {
        forrst.transport().seen.borrow()
    }

    #[test]
    fn id_and_username_lookups_agree() {
        let forrst = forrst();
        assert_eq!(
            forrst.find_user_by_id(6998).unwrap(),
            forrst.find_user_by_username("YorickPeterse").unwrap()
        );
        let seen = seen(&forrst);
        assert_eq!(seen[0].query_value("id"), Some("6998"));
        assert_eq!(seen[1].query_value("username"), Some("YorickPeterse"));
    }

    #[test]
    fn user_posts_accessor_scopes_to_username() {
        let forrst = forrst();
        let user = forrst.find_user(6998_u64).unwrap();
        let posts = user
            .posts(&forrst, &UserPostsOptions::default().post_type(PostType::Code).limit(2))
            .unwrap();
        assert_eq!(posts.len(), 2);

        let seen = seen(&forrst);
        let request = &seen[1];
        assert!(request.path.ends_with("/users/posts"));
        assert_eq!(request.query_value("username"), Some("YorickPeterse"));
        assert_eq!(request.query_value("type"), Some("code"));
        assert_eq!(request.query_value("limit"), Some("2"));
        assert_eq!(request.query_value("after"), None);
    }

    #[test]
    fn accessors_are_not_cached() {
        let forrst = forrst();
        let post = forrst.show_post("t1").unwrap();
        let first = post.comments(&forrst).unwrap();
        let second = post.comments(&forrst).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].body, "hi");

        let seen = seen(&forrst);
        assert_eq!(seen.len(), 3);
        assert!(seen[1..].iter().all(|r| r.query_value("id") == Some("1")));
    }

    #[test]
    fn invalid_selector_never_reaches_transport() {
        let forrst = forrst();
        let err = forrst.show_post("").unwrap_err();
        assert!(matches!(err, ApiError::InvalidSelector(_)));
        assert!(seen(&forrst).is_empty());
    }

    #[test]
    fn transport_errors_pass_through() {
        let failing = |_: &HttpRequest| -> Result<HttpResponse, ApiError> {
            Err(ApiError::Transport("connection refused".to_string()))
        };
        let forrst = Forrst::with_transport(Config::new(), failing).unwrap();
        assert_eq!(
            forrst.stats().unwrap_err(),
            ApiError::Transport("connection refused".to_string())
        );
    }

    #[test]
    fn all_posts_sends_cursor() {
        let forrst = forrst();
        let posts = forrst.all_posts(&AllPostsOptions::after(3)).unwrap();
        assert_eq!(posts[0].post_id, 2);
        assert_eq!(seen(&forrst)[0].query_value("after"), Some("3"));
    }
}
