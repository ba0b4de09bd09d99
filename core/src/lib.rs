//! Blocking client for the Forrst v2 API.
//!
//! # Overview
//! Maps Forrst's loosely-typed JSON (numeric strings, renamed keys, optional
//! sub-objects) into immutable records: [`User`], [`Post`], [`Comment`] and
//! [`Stats`].
//!
//! # Design
//! - `ForrstClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern).
//! - `Forrst` pairs it with a [`Transport`] to give one-call gateways
//!   (`find_user`, `show_post`, `list_posts`, ...). The default transport is
//!   blocking `ureq`.
//! - Related records are fetched on demand: [`User::posts`] and
//!   [`Post::comments`] issue a request each time they are called.
//!
//! ```no_run
//! use forrst_core::{Config, Forrst, UserPostsOptions};
//!
//! let forrst = Forrst::new(Config::new().with_access_token("token"))?;
//! let user = forrst.find_user("YorickPeterse")?;
//! // Numeric lookups need a `u64`: `find_user(6998_u64)` or `find_user_by_id(6998)`.
//! assert_eq!(forrst.find_user(6998_u64)?, forrst.find_user_by_id(6998)?);
//! for post in user.posts(&forrst, &UserPostsOptions::default().limit(5))? {
//!     println!("{} ({} comments)", post.title, post.statistics.comments);
//! }
//! # Ok::<(), forrst_core::ApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod gateway;
pub mod http;
pub mod params;
pub mod transport;
pub mod types;

pub use client::ForrstClient;
pub use config::Config;
pub use decode::{decode, Payload};
pub use error::{ApiError, ConfigError, ErrorKind};
pub use gateway::Forrst;
pub use http::{HttpRequest, HttpResponse, Transport};
pub use params::{AllPostsOptions, PostListOptions, Selector, Sort, UserPostsOptions};
pub use transport::UreqTransport;
pub use types::{
    Comment, Photos, Post, PostStatistics, PostType, Role, Snaps, Stats, User, UserStatistics,
};
