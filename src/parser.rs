//! Defines the [`Parser`] type and its [`Error`]. Also defines the logic for
//! reading post source files from disk into [`PostRecord`]s. Parsing doesn't
//! decide whether a record is complete; see
//! [`crate::store::ContentStore::from_records`] for that.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::markdown;
use crate::post::{parse_date, PostRecord, DATE_FORMAT};

/// Jekyll treats both of these as Markdown posts.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Parses [`PostRecord`] objects from source files.
pub struct Parser<'a> {
    /// `site_directory` is the root of the site sources. Record entries are
    /// source paths relative to it (e.g., `_posts/2014-05-01-monads.md`).
    site_directory: &'a Path,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(site_directory: &'a Path) -> Parser<'a> {
        Parser { site_directory }
    }

    /// Searches `directory` recursively for post files (extension `.md`) and
    /// returns a record for each, in path order. Each post file must be
    /// structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with fields `title`, `date`, and optionally `url`
    ///    (or `permalink`), `excerpt` and `github`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Validation without exceptions
    /// date: 2014-05-01
    /// github: https://github.com/example/validation
    /// ---
    /// # Validation
    ///
    /// ...
    /// ```
    ///
    /// `draft` marks the records as drafts. Drafts may omit the date, in
    /// which case the file's modification time is used. A missing directory
    /// yields no records.
    pub fn parse_directory(&self, directory: &Path, draft: bool) -> Result<Vec<PostRecord>> {
        if !directory.is_dir() {
            log::debug!("no post directory at `{}`", directory.display());
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let walker = WalkDir::new(directory)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
        for result in walker {
            let entry = result?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if is_markdown(path) {
                records.push(self.parse_post(path, draft)?);
            } else {
                log::warn!("skipping `{}`: not a Markdown file", path.display());
            }
        }
        Ok(records)
    }

    /// Parses a single [`PostRecord`] from the source file at `path`,
    /// annotating any failure with the file's path.
    pub fn parse_post(&self, path: &Path, draft: bool) -> Result<PostRecord> {
        match self._parse_post(path, draft) {
            Ok(record) => {
                log::debug!("parsed `{}`", record.entry);
                Ok(record)
            }
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(&self, path: &Path, draft: bool) -> Result<PostRecord> {
        use std::io::Read;
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;

        let mut record = parse_source(&self.entry(path), file_stem(path), &contents)?;
        record.draft = draft;

        // Jekyll dates undated drafts by their modification time.
        if draft && record.date.is_none() {
            let modified: DateTime<Utc> = std::fs::metadata(path)?.modified()?.into();
            let date = modified.format(DATE_FORMAT).to_string();
            if record.url.is_none() {
                let (_, slug) = split_file_stem(file_stem(path));
                record.url = derive_url(&date, &slug);
            }
            record.date = Some(date);
        }
        Ok(record)
    }

    fn entry(&self, path: &Path) -> String {
        path.strip_prefix(self.site_directory)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

fn is_hidden(file_name: &std::ffi::OsStr) -> bool {
    file_name.to_str().map_or(false, |s| s.starts_with('.'))
}

fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or_default()
}

/// Parses a post from its source text. `entry` identifies the record and
/// `file_stem` is the source file name less its extension, from which the
/// date and slug may be derived (`2014-05-01-some-title`).
pub fn parse_source(entry: &str, file_stem: &str, input: &str) -> Result<PostRecord> {
    let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
    let yaml = &input[yaml_start..yaml_stop];
    let frontmatter: Frontmatter = if yaml.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    let (file_date, slug) = split_file_stem(file_stem);
    let body = markdown::to_html(&input[body_start..]);
    let excerpt = match &frontmatter.excerpt {
        Some(excerpt) => Some(markdown::to_inline_html(excerpt)),
        None => markdown::fold(&body).map(str::to_owned),
    };

    let date = frontmatter.date.or_else(|| file_date.map(str::to_owned));
    let url = match (frontmatter.url, &date) {
        (Some(url), _) => Some(url),
        (None, Some(date)) => derive_url(date, &slug),
        (None, None) => None,
    };
    Ok(PostRecord {
        entry: entry.to_owned(),
        title: frontmatter.title,
        url,
        date,
        excerpt,
        external_code_ref: frontmatter.github,
        body,
        draft: false,
    })
}

/// Locates the YAML between the fences and the start of the body. Returns
/// `(yaml_start, yaml_stop, body_start)`. The closing fence must sit on a
/// line of its own.
fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
    const FENCE: &str = "---";
    if !input.starts_with(FENCE) {
        return Err(Error::FrontmatterMissingStartFence);
    }
    let yaml_start = FENCE.len();
    let closing = format!("\n{}", FENCE);
    match input[yaml_start..].find(&closing) {
        None => Err(Error::FrontmatterMissingEndFence),
        Some(offset) => {
            let yaml_stop = yaml_start + offset + 1;
            let after_fence = yaml_stop + FENCE.len();
            // skip whatever remains of the fence line
            let body_start = match input[after_fence..].find('\n') {
                Some(newline) => after_fence + newline + 1,
                None => input.len(),
            };
            Ok((yaml_start, yaml_stop, body_start))
        }
    }
}

/// Splits a Jekyll-style file stem (`2014-05-01-Some Title`) into its date
/// prefix, if any, and the slugified remainder (`some-title`).
fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| MARKDOWN_EXTENSIONS.contains(&ext))
}

fn split_file_stem(stem: &str) -> (Option<&str>, String) {
    match (stem.get(..10), stem.get(10..11)) {
        (Some(date), Some("-")) if parse_date(date).is_some() => {
            (Some(date), slug::slugify(&stem[11..]))
        }
        _ => (None, slug::slugify(stem)),
    }
}

/// Derives the Jekyll `date` permalink, `/{YYYY}/{MM}/{DD}/{slug}.html`, for
/// records whose front matter doesn't set a url. Without a valid date or a
/// slug there is nothing to derive.
fn derive_url(date: &str, slug: &str) -> Option<String> {
    let date = parse_date(date)?;
    if slug.is_empty() {
        return None;
    }
    Some(format!("{}{}.html", date.format("/%Y/%m/%d/"), slug))
}

#[derive(Deserialize, Default)]
struct Frontmatter {
    /// The title of the post.
    #[serde(default)]
    title: Option<String>,

    /// The date of the post. Jekyll allows a time and offset after the date.
    #[serde(default)]
    date: Option<String>,

    /// An explicit link for the post, overriding the derived one.
    #[serde(default, alias = "permalink")]
    url: Option<String>,

    /// A markdown summary for the listing.
    #[serde(default)]
    excerpt: Option<String>,

    /// A link to accompanying source code.
    #[serde(default)]
    github: Option<String>,
}

/// Represents the result of a [`PostRecord`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`PostRecord`] object.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    #[error("Post must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    #[error("Missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for WalkDir I/O errors.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// An error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, #[source] Box<Error>),
}

impl Error {
    /// Strips annotations, returning the underlying error.
    pub fn root(&self) -> &Error {
        match self {
            Error::Annotated(_, err) => err.root(),
            err => err,
        }
    }
}

/// Collects records from the posts directory and, when `drafts` is given,
/// the drafts directory.
pub fn parse_site(
    site_directory: &Path,
    posts_directory: &Path,
    drafts_directory: Option<&Path>,
) -> Result<Vec<PostRecord>> {
    let parser = Parser::new(site_directory);
    let mut records = parser.parse_directory(posts_directory, false)?;
    if let Some(drafts_directory) = drafts_directory {
        records.extend(parser.parse_directory(drafts_directory, true)?);
    }
    Ok(records)
}
