//! Domain records and their mappers.
//!
//! # Design
//! Each record has a private `*Wire` struct that mirrors the server's JSON
//! (names, loose scalar encodings) and a `TryFrom` into the public record,
//! which is where renames, defaults, and strict checks happen. Records are
//! plain immutable values; related collections are fetched through methods
//! (`User::posts`, `Post::comments`), never stored.

mod coerce;
mod comment;
mod post;
mod stats;
mod user;

pub use coerce::TIMESTAMP_FORMAT;
pub use comment::Comment;
pub use post::{Post, PostStatistics, PostType, Snaps};
pub use stats::Stats;
pub use user::{Photos, Role, User, UserStatistics};
