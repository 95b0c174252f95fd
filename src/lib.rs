//! The library code for the `jotter` front-page generator. A build is broken
//! down into four steps:
//!
//! 1. Parsing post records from source files on disk ([`crate::parser`])
//! 2. Validating and ordering them into a content store ([`crate::store`])
//! 3. Rendering the store's posts into a single listing page
//!    ([`crate::render`])
//! 4. Writing the listing, and an Atom feed when the site has a url
//!    ([`crate::build`], [`crate::feed`])
//!
//! The store is the only place that decides whether a post is malformed: a
//! post without a title, url or date stops the build with a
//! [`store::MalformedPostError`] before anything is written. Rendering is a
//! pure function of the ordered posts.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod feed;
pub mod logging;
pub mod markdown;
pub mod parser;
pub mod post;
pub mod render;
pub mod store;
