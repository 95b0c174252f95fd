//! Defines the [`Post`] and [`PostRecord`] types. A [`PostRecord`] is what
//! the loader pulls out of a source file; every metadata field is optional
//! because deciding what is malformed is the job of
//! [`crate::store::ContentStore`]. A [`Post`] is the validated, immutable
//! form that the store hands to the renderer.

use chrono::NaiveDate;

/// A validated blog entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    /// The title of the post, as plain text.
    pub title: String,

    /// The link to the rendered post, relative to the site root (e.g.,
    /// `/2014/05/01/validation.html`). Unique within a store.
    pub url: String,

    /// The publication date, used for ordering and display.
    pub date: NaiveDate,

    /// A short HTML summary shown in the listing.
    pub excerpt: Option<String>,

    /// A link to source code accompanying the post (the `github` front-matter
    /// key).
    pub external_code_ref: Option<String>,

    /// The post body rendered to HTML.
    pub body: String,

    /// Whether the post was loaded from the drafts directory.
    pub draft: bool,
}

impl Post {
    /// The date formatted for display and for templates (`YYYY-MM-DD`).
    pub fn display_date(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// The format of post dates in front matter, file names, and output.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An unvalidated post as produced by the authoring/loading step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostRecord {
    /// Identifies the record in error messages, usually the source path.
    pub entry: String,
    pub title: Option<String>,
    pub url: Option<String>,

    /// The raw date text. Anything after the leading `YYYY-MM-DD` (e.g., a
    /// Jekyll time-of-day and offset) is ignored.
    pub date: Option<String>,
    pub excerpt: Option<String>,
    pub external_code_ref: Option<String>,
    pub body: String,
    pub draft: bool,
}

impl PostRecord {
    /// Creates an empty record for `entry`. Mostly useful for building
    /// records by hand.
    pub fn new(entry: impl Into<String>) -> PostRecord {
        PostRecord {
            entry: entry.into(),
            ..PostRecord::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> PostRecord {
        self.title = Some(title.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> PostRecord {
        self.url = Some(url.into());
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> PostRecord {
        self.date = Some(date.into());
        self
    }

    pub fn excerpt(mut self, excerpt: impl Into<String>) -> PostRecord {
        self.excerpt = Some(excerpt.into());
        self
    }

    pub fn external_code_ref(mut self, link: impl Into<String>) -> PostRecord {
        self.external_code_ref = Some(link.into());
        self
    }
}

/// Parses the leading `YYYY-MM-DD` of a date string. Front matter dates may
/// carry a trailing time and offset (`2014-05-01 10:00:00 -0500` or
/// `2014-05-01T10:00:00Z`); only the calendar date is kept. The time must be
/// separated from the date by whitespace or `T`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let (head, rest) = match (s.get(..10), s.get(10..)) {
        (Some(head), Some(rest)) => (head, rest),
        _ => (s, ""),
    };
    let separated = rest.is_empty()
        || rest.starts_with('T')
        || rest.starts_with(char::is_whitespace);
    if !separated {
        return None;
    }
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
}
