//! Defines the [`ContentStore`], the validated and ordered collection of
//! [`Post`]s that the renderer reads from, and [`MalformedPostError`], the
//! only error the store raises.

use std::collections::HashSet;
use std::fmt;

use crate::post::{parse_date, Post, PostRecord};

/// A read-only collection of posts ordered by date, most recent first.
#[derive(Clone, Debug, Default)]
pub struct ContentStore {
    posts: Vec<Post>,
}

impl ContentStore {
    /// Validates `records` and builds a store from them. Fails on the first
    /// malformed record; no partial store is ever produced.
    pub fn from_records<I>(records: I) -> Result<ContentStore, MalformedPostError>
    where
        I: IntoIterator<Item = PostRecord>,
    {
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut posts = Vec::new();
        for record in records {
            let entry = record.entry.clone();
            let post = validate(record)?;
            if !seen_urls.insert(post.url.clone()) {
                return Err(MalformedPostError {
                    entry,
                    problem: Problem::DuplicateUrl(post.url),
                });
            }
            posts.push(post);
        }

        // Ties on date fall back to the url so the order is total.
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.url.cmp(&b.url)));
        Ok(ContentStore { posts })
    }

    /// Returns every post, most recent first.
    pub fn list_posts(&self) -> &[Post] {
        &self.posts
    }

    /// Looks up a post by its url.
    pub fn get(&self, url: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.url == url)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

fn validate(record: PostRecord) -> Result<Post, MalformedPostError> {
    let PostRecord {
        entry,
        title,
        url,
        date,
        excerpt,
        external_code_ref,
        body,
        draft,
    } = record;

    let malformed = |problem| MalformedPostError {
        entry: entry.clone(),
        problem,
    };

    let title = required(title).ok_or_else(|| malformed(Problem::MissingField("title")))?;
    // The loader derives a missing url from the date, so a bad date is
    // reported before a missing url.
    let date = required(date).ok_or_else(|| malformed(Problem::MissingField("date")))?;
    let date = parse_date(&date).ok_or_else(|| malformed(Problem::InvalidDate(date.clone())))?;
    let url = required(url).ok_or_else(|| malformed(Problem::MissingField("url")))?;

    Ok(Post {
        title,
        url,
        date,
        excerpt: excerpt.filter(|e| !e.trim().is_empty()),
        external_code_ref: external_code_ref.filter(|r| !r.trim().is_empty()),
        body,
        draft,
    })
}

/// Treats blank text as absent.
fn required(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}

/// Returned when a post record can't be turned into a [`Post`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed post `{entry}`: {problem}")]
pub struct MalformedPostError {
    /// Identifies the offending record (its source path when loaded from
    /// disk).
    pub entry: String,

    /// What is wrong with it.
    pub problem: Problem,
}

/// The ways a post record can be malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// A required field is absent or blank.
    MissingField(&'static str),

    /// The date isn't of the form `YYYY-MM-DD`.
    InvalidDate(String),

    /// Another record already uses this url.
    DuplicateUrl(String),
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Problem::MissingField(field) => write!(f, "missing required field `{}`", field),
            Problem::InvalidDate(date) => write!(f, "invalid date `{}`", date),
            Problem::DuplicateUrl(url) => write!(f, "url `{}` is already in use", url),
        }
    }
}
