//! Support for creating Atom feeds from a list of posts.

use std::io::Write;

use atom_syndication::{Entry, Error as AtomError, Feed, Link, Person, Text};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use url::{ParseError as UrlParseError, Url};

use crate::config::Author;
use crate::post::Post;

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub title: &'a str,

    /// The absolute site root. Post urls are resolved against it, and it
    /// doubles as the feed id.
    pub site_url: &'a Url,
    pub author: Option<&'a Author>,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// [`Post`]s and writes the result to a [`std::io::Write`]. Entries keep the
/// order of `posts`.
pub fn write_feed<W: Write>(config: &FeedConfig, posts: &[Post], w: W) -> Result<()> {
    feed(config, posts)?.write_to(w)?;
    Ok(())
}

fn feed(config: &FeedConfig, posts: &[Post]) -> Result<Feed> {
    let mut feed = Feed::default();
    feed.set_title(config.title);
    feed.set_id(config.site_url.to_string());
    // The newest post dates the feed, which keeps output reproducible.
    let newest = posts.iter().map(|p| p.date).max();
    if let Some(updated) = newest.and_then(midnight) {
        feed.set_updated(updated);
    } else if let Some(epoch) = NaiveDate::from_ymd_opt(1970, 1, 1).and_then(midnight) {
        feed.set_updated(epoch);
    }
    feed.set_authors(author_to_people(config.author));
    feed.set_links(vec![alternate(config.site_url.to_string())]);
    feed.set_entries(feed_entries(config, posts)?);
    Ok(feed)
}

fn feed_entries(config: &FeedConfig, posts: &[Post]) -> Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = Vec::with_capacity(posts.len());

    for post in posts {
        // Root-relative urls resolve under the site url's path, the same
        // place the listing links to.
        let relative = if post.url.starts_with("//") {
            post.url.as_str()
        } else {
            post.url.trim_start_matches('/')
        };
        let url = config.site_url.join(relative)?;
        let mut entry = Entry::default();
        entry.set_id(url.to_string());
        entry.set_title(post.title.as_str());
        if let Some(date) = midnight(post.date) {
            entry.set_updated(date);
            entry.set_published(Some(date));
        }
        entry.set_authors(author_to_people(config.author));
        entry.set_links(vec![alternate(url.to_string())]);
        entry.set_summary(post.excerpt.as_ref().map(|e| Text::html(e.as_str())));
        entries.push(entry);
    }
    Ok(entries)
}

/// Posts carry calendar dates only; they're published at midnight UTC.
fn midnight(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| Utc.from_utc_datetime(&dt).into())
}

fn alternate(href: String) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel("alternate");
    link
}

fn author_to_people(author: Option<&Author>) -> Vec<Person> {
    match author {
        Some(author) => {
            let mut person = Person::default();
            person.set_name(author.name.as_str());
            person.set_email(author.email.clone());
            vec![person]
        }
        None => Vec::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants inlude I/O, Atom, and
/// URL issues.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned when there is an Atom-related error.
    #[error(transparent)]
    Atom(#[from] AtomError),

    /// Returned when a post url can't be resolved against the site url.
    #[error("Resolving post url: {0}")]
    UrlParse(#[from] UrlParseError),
}
