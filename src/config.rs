//! Loads site configuration from a Jekyll-style `_config.yml`. The file is
//! looked up from a starting directory and then each of its ancestors, and
//! all relative paths in it are resolved against the directory it lives in.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use url::Url;

/// The name of the site configuration file.
pub const CONFIG_FILE: &str = "_config.yml";

/// The site author, credited in the feed.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

/// Jekyll lets `author` be a bare name or a mapping.
#[derive(Deserialize)]
#[serde(untagged)]
enum AuthorField {
    Name(String),
    Full(Author),
}

impl From<AuthorField> for Author {
    fn from(field: AuthorField) -> Author {
        match field {
            AuthorField::Name(name) => Author { name, email: None },
            AuthorField::Full(author) => author,
        }
    }
}

fn default_title() -> String {
    String::from("Blog")
}

fn default_posts_dir() -> PathBuf {
    PathBuf::from("_posts")
}

fn default_drafts_dir() -> PathBuf {
    PathBuf::from("_drafts")
}

fn default_destination() -> PathBuf {
    PathBuf::from("_site")
}

/// A blank `url` (Jekyll's scaffold ships `url: ""`) means no site url.
fn deserialize_url<'de, D>(deserializer: D) -> std::result::Result<Option<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => Url::parse(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

#[derive(Deserialize)]
struct Project {
    #[serde(default = "default_title")]
    title: String,

    #[serde(default, deserialize_with = "deserialize_url")]
    url: Option<Url>,

    #[serde(default)]
    author: Option<AuthorField>,

    #[serde(default)]
    index_template: Option<PathBuf>,

    #[serde(default = "default_posts_dir")]
    posts_dir: PathBuf,

    #[serde(default = "default_drafts_dir")]
    drafts_dir: PathBuf,

    #[serde(default = "default_destination")]
    destination: PathBuf,
}

impl Default for Project {
    fn default() -> Project {
        Project {
            title: default_title(),
            url: None,
            author: None,
            index_template: None,
            posts_dir: default_posts_dir(),
            drafts_dir: default_drafts_dir(),
            destination: default_destination(),
        }
    }
}

/// YAML with no content at all is a null document, which won't deserialize
/// into a mapping.
fn is_blank(source: &str) -> bool {
    source.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Overrides coming from the command line.
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Whether to include posts from the drafts directory.
    pub drafts: bool,

    /// Where to write the site, instead of the configured `destination`.
    pub destination: Option<PathBuf>,
}

/// The resolved site configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The site title, shown on the listing and in the feed.
    pub title: String,

    /// The absolute site root, always ending in `/`. The feed is only built
    /// when this is set.
    pub site_url: Option<Url>,

    /// The path of the site url without its trailing slash (e.g., `/blog`),
    /// or empty when the site is served from the root or has no url.
    /// Root-relative post links in the listing are prefixed with it.
    pub base_path: String,

    pub author: Option<Author>,

    /// The directory holding `_config.yml`.
    pub site_directory: PathBuf,

    pub posts_directory: PathBuf,

    /// The drafts directory, present only when drafts are enabled.
    pub drafts_directory: Option<PathBuf>,

    /// A custom listing template. The built-in one is used otherwise.
    pub index_template: Option<PathBuf>,

    /// The output directory.
    pub destination: PathBuf,
}

impl Config {
    /// Searches `dir` and then its ancestors for [`CONFIG_FILE`] and loads
    /// the first one found.
    pub fn from_directory(dir: &Path, options: &Options) -> Result<Config> {
        let mut current = Some(dir);
        while let Some(dir) = current {
            let path = dir.join(CONFIG_FILE);
            if path.is_file() {
                return Config::from_project_file(&path, options);
            }
            current = dir.parent();
        }
        Err(Error::NotFound(dir.to_owned()))
    }

    /// Loads the configuration file at `path`.
    pub fn from_project_file(path: &Path, options: &Options) -> Result<Config> {
        let source = fs::read_to_string(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = if is_blank(&source) {
            Project::default()
        } else {
            serde_yaml::from_str(&source).map_err(|err| Error::Parse {
                path: path.to_owned(),
                err,
            })?
        };
        let site_directory = match path.parent() {
            Some(dir) => dir.to_owned(),
            None => return Err(Error::NoParent(path.to_owned())),
        };

        log::debug!("loaded configuration from `{}`", path.display());
        let site_url = project.url.map(with_trailing_slash);
        let base_path = site_url
            .as_ref()
            .map(|url| url.path().trim_end_matches('/').to_owned())
            .unwrap_or_default();
        Ok(Config {
            title: project.title,
            site_url,
            base_path,
            author: project.author.map(Author::from),
            posts_directory: site_directory.join(&project.posts_dir),
            drafts_directory: if options.drafts {
                Some(site_directory.join(&project.drafts_dir))
            } else {
                None
            },
            index_template: project
                .index_template
                .map(|relpath| site_directory.join(relpath)),
            destination: match &options.destination {
                Some(destination) => destination.clone(),
                None => site_directory.join(&project.destination),
            },
            site_directory,
        })
    }
}

/// Without the slash, [`Url::join`] would treat the last path segment as a
/// file name and drop it.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem locating or loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when no configuration file exists in the directory or any of
    /// its ancestors.
    #[error("Could not find `_config.yml` in `{0}` or any parent directory")]
    NotFound(PathBuf),

    /// Returned when the configuration file can't be opened.
    #[error("Opening configuration file `{path}`: {err}")]
    Open {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when the configuration file isn't valid.
    #[error("Loading configuration `{path}`: {err}")]
    Parse {
        path: PathBuf,
        #[source]
        err: serde_yaml::Error,
    },

    /// Returned when the configuration path has no parent directory.
    #[error("Can't get parent directory for configuration file `{0}`")]
    NoParent(PathBuf),
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() -> Result<()> {
        let site = tempfile::tempdir().unwrap();
        fs::write(site.path().join(CONFIG_FILE), "title: Notes\n").unwrap();

        let config = Config::from_directory(site.path(), &Options::default())?;
        assert_eq!("Notes", config.title);
        assert_eq!(None, config.site_url);
        assert_eq!("", config.base_path);
        assert_eq!(None, config.author);
        assert_eq!(site.path(), config.site_directory);
        assert_eq!(site.path().join("_posts"), config.posts_directory);
        assert_eq!(None, config.drafts_directory);
        assert_eq!(site.path().join("_site"), config.destination);
        assert_eq!(None, config.index_template);
        Ok(())
    }

    #[test]
    fn test_blank_url() -> Result<()> {
        let site = tempfile::tempdir().unwrap();
        fs::write(site.path().join(CONFIG_FILE), "title: Notes\nurl: \"\"\n").unwrap();

        let config = Config::from_directory(site.path(), &Options::default())?;
        assert_eq!(None, config.site_url);
        assert_eq!("", config.base_path);
        Ok(())
    }

    #[test]
    fn test_empty_files() -> Result<()> {
        for source in &["", "\n", "# just a comment\n", "---\n"] {
            let site = tempfile::tempdir().unwrap();
            fs::write(site.path().join(CONFIG_FILE), source).unwrap();

            let config = Config::from_directory(site.path(), &Options::default())?;
            assert_eq!("Blog", config.title);
            assert_eq!(None, config.site_url);
            assert_eq!(site.path().join("_posts"), config.posts_directory);
            assert_eq!(site.path().join("_site"), config.destination);
        }
        Ok(())
    }

    #[test]
    fn test_base_path() -> Result<()> {
        let site = tempfile::tempdir().unwrap();
        fs::write(site.path().join(CONFIG_FILE), "url: https://example.com\n").unwrap();
        let config = Config::from_directory(site.path(), &Options::default())?;
        assert_eq!("", config.base_path);

        fs::write(site.path().join(CONFIG_FILE), "url: https://example.com/blog/\n").unwrap();
        let config = Config::from_directory(site.path(), &Options::default())?;
        assert_eq!("/blog", config.base_path);
        Ok(())
    }

    #[test]
    fn test_found_in_ancestor() -> Result<()> {
        let site = tempfile::tempdir().unwrap();
        let nested = site.path().join("_posts").join("scala");
        fs::create_dir_all(&nested).unwrap();
        fs::write(site.path().join(CONFIG_FILE), "title: Notes\n").unwrap();

        let config = Config::from_directory(&nested, &Options::default())?;
        assert_eq!(site.path(), config.site_directory);
        Ok(())
    }

    #[test]
    fn test_everything_set() -> Result<()> {
        let site = tempfile::tempdir().unwrap();
        fs::write(
            site.path().join(CONFIG_FILE),
            "title: Notes
url: https://example.com/blog
author:
  name: Jo
  email: jo@example.com
index_template: _layouts/index.html
posts_dir: articles
drafts_dir: wip
destination: public
",
        )
        .unwrap();

        let options = Options {
            drafts: true,
            destination: Some(PathBuf::from("/tmp/elsewhere")),
        };
        let config = Config::from_directory(site.path(), &options)?;
        assert_eq!(
            Some("https://example.com/blog/"),
            config.site_url.as_ref().map(Url::as_str)
        );
        assert_eq!(
            Some(Author {
                name: String::from("Jo"),
                email: Some(String::from("jo@example.com")),
            }),
            config.author
        );
        assert_eq!(
            Some(site.path().join("_layouts/index.html")),
            config.index_template
        );
        assert_eq!(site.path().join("articles"), config.posts_directory);
        assert_eq!(Some(site.path().join("wip")), config.drafts_directory);
        assert_eq!(PathBuf::from("/tmp/elsewhere"), config.destination);
        Ok(())
    }

    #[test]
    fn test_author_as_name() -> Result<()> {
        let site = tempfile::tempdir().unwrap();
        fs::write(site.path().join(CONFIG_FILE), "author: Jo\n").unwrap();

        let config = Config::from_directory(site.path(), &Options::default())?;
        assert_eq!("Blog", config.title);
        assert_eq!(
            Some(Author {
                name: String::from("Jo"),
                email: None,
            }),
            config.author
        );
        Ok(())
    }

    #[test]
    fn test_invalid_config() {
        let site = tempfile::tempdir().unwrap();
        fs::write(site.path().join(CONFIG_FILE), "url: not a url\n").unwrap();

        match Config::from_directory(site.path(), &Options::default()) {
            Err(Error::Parse { .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
