//! Fetch tweet JSON by numeric ID, in rate-limit-aware batches.
//!
//! The crate retrieves tweets from Twitter's `statuses/lookup` endpoint and
//! produces two views of each: the untouched raw payload, and a projected
//! copy that keeps only a whitelist of (possibly nested) fields, suitable
//! for display or storage without dragging the whole object along.
//!
//! The moving parts:
//!
//! - [`PathTree`] compiles a list of dotted field paths into a nested
//!   keep/recurse structure.
//! - [`project_str`] applies a [`PathTree`] to a raw JSON document,
//!   returning a pruned copy (or an error envelope for malformed input).
//! - [`partition`] chunks an id list at the API's per-call cap.
//! - [`TweetFetcher`] drives the sequential batch loop against a
//!   [`TweetLookup`] collaborator, dozing when the server-reported quota
//!   is nearly exhausted.
//! - [`TwitterLookupClient`] is the real HTTP collaborator, OAuth 1.0a
//!   signed via [`reqwest`].

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod batch;
mod client;
mod config;
mod error;
mod fetch;
mod oauth;
mod paths;
mod project;
mod ratelimit;

pub use batch::{partition, parse_ids, MAX_LOOKUP_BATCH};
pub use client::TwitterLookupClient;
pub use config::{FetchConfig, ProxyConfig};
pub use error::{FetchError, FetchResult};
pub use fetch::{LookupPage, TweetFetcher, TweetLookup};
pub use paths::{parse_path_spec, PathNode, PathTree, DEFAULT_FIELDS};
pub use project::{error_envelope, project, project_str};
pub use ratelimit::RateLimitStatus;
