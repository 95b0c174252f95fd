//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the front page: parsing the post records
//! ([`crate::parser`]), validating and ordering them ([`crate::store`]),
//! rendering the listing ([`crate::render`]), and generating the Atom feed
//! ([`crate::feed`]).

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::feed::{write_feed, Error as FeedError, FeedConfig};
use crate::parser::{self, Error as ParseError};
use crate::render::{Error as RenderError, Renderer};
use crate::store::{ContentStore, MalformedPostError};

/// The name of the listing page in the output directory.
pub const INDEX_FILE: &str = "index.html";

/// The name of the Atom feed in the output directory.
pub const FEED_FILE: &str = "feed.xml";

/// What a build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// The number of posts listed, drafts included.
    pub posts: usize,

    /// How many of those were drafts.
    pub drafts: usize,

    /// The listing page.
    pub index: PathBuf,

    /// The feed, if a site url is configured.
    pub feed: Option<PathBuf>,
}

/// Builds the front page from a [`Config`] object. Every post is parsed,
/// validated and rendered, and the feed generated, before anything is
/// written, so a failing build leaves the output directory untouched.
pub fn build_site(config: &Config) -> Result<BuildSummary> {
    // collect all posts
    let records = parser::parse_site(
        &config.site_directory,
        &config.posts_directory,
        config.drafts_directory.as_deref(),
    )?;
    let store = ContentStore::from_records(records)?;
    let posts = store.list_posts();
    log::info!("loaded {} posts", posts.len());

    // Render everything in memory first so a failure leaves the output
    // directory untouched.
    let renderer = match &config.index_template {
        Some(path) => Renderer::from_file(&config.title, path)?,
        None => Renderer::new(&config.title)?,
    }
    .with_base_path(&config.base_path);
    let html = renderer.render(posts)?;

    let feed = match &config.site_url {
        Some(site_url) => {
            let mut xml: Vec<u8> = Vec::new();
            write_feed(
                &FeedConfig {
                    title: &config.title,
                    site_url,
                    author: config.author.as_ref(),
                },
                posts,
                &mut xml,
            )?;
            Some(xml)
        }
        None => {
            log::debug!("no site url configured; skipping the feed");
            None
        }
    };

    fs::create_dir_all(&config.destination).map_err(|err| Error::Write {
        path: config.destination.clone(),
        err,
    })?;

    let index = config.destination.join(INDEX_FILE);
    write(&index, html.as_bytes())?;

    let feed = match feed {
        Some(xml) => {
            let path = config.destination.join(FEED_FILE);
            write(&path, &xml)?;
            Some(path)
        }
        None => None,
    };

    Ok(BuildSummary {
        posts: posts.len(),
        drafts: posts.iter().filter(|p| p.draft).count(),
        index,
        feed,
    })
}

fn write(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).map_err(|err| Error::Write {
        path: path.to_owned(),
        err,
    })?;
    log::info!("wrote {}", path.display());
    Ok(())
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing,
/// validation, rendering, writing the feed, and writing output files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for errors during parsing.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Returned when a post record is missing something it needs.
    #[error(transparent)]
    Malformed(#[from] MalformedPostError),

    /// Returned for errors loading or applying the listing template.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Returned for errors writing the feed.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// Returned for I/O problems while writing output files.
    #[error("Writing '{path}': {err}")]
    Write {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
}
