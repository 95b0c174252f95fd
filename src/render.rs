//! Renders an ordered slice of [`Post`]s into a single HTML listing page.
//! The page is produced by a [`gtmpl`] template: either the built-in
//! [`DEFAULT_TEMPLATE`] or a custom one loaded from the site sources.
//!
//! Templates receive an object with two fields:
//!
//! * `site_title`: the (escaped) site title.
//! * `posts`: an array of post objects with fields `title`, `url`, `date`,
//!   `code_url`, `excerpt` and `draft`. Absent optional fields are nil, so
//!   `{{if .code_url}}` does what you'd expect.
//!
//! Root-relative post urls are prefixed with the renderer's base path, so a
//! site served from `https://example.com/blog/` links to `/blog/...`.
//! Every text field except `excerpt` is HTML-escaped before it reaches the
//! template. The excerpt is already HTML and is passed through as-is.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use gtmpl::{Context, Template};
use gtmpl_value::Value;

use crate::markdown::escape;
use crate::post::Post;

/// The built-in listing layout.
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{.site_title}}</title>
</head>
<body>
<h1>{{.site_title}}</h1>
<ul class="posts">
{{range .posts}}<li{{if .draft}} class="draft"{{end}}><span class="date">{{.date}}</span> <a href="{{.url}}">{{.title}}</a>{{if .code_url}} <a class="code" href="{{.code_url}}">code</a>{{end}}{{if .excerpt}}
<div class="excerpt">{{.excerpt}}</div>{{end}}</li>
{{end}}</ul>
</body>
</html>
"#;

/// Turns posts into a listing page. Rendering holds no state between calls:
/// the same posts always produce the same bytes.
pub struct Renderer {
    template: Template,
    site_title: String,
    base_path: String,
}

impl Renderer {
    /// Creates a renderer with the built-in layout.
    pub fn new(site_title: &str) -> Result<Renderer> {
        Renderer::from_source(site_title, DEFAULT_TEMPLATE)
    }

    /// Creates a renderer from template text.
    pub fn from_source(site_title: &str, source: &str) -> Result<Renderer> {
        let mut template = Template::default();
        template.parse(source).map_err(Error::ParseTemplate)?;
        Ok(Renderer {
            template,
            site_title: site_title.to_owned(),
            base_path: String::new(),
        })
    }

    /// Sets the path the site is served under (e.g., `/blog`). Post urls
    /// starting with a single `/` are prefixed with it.
    pub fn with_base_path(mut self, base_path: &str) -> Renderer {
        self.base_path = base_path.trim_end_matches('/').to_owned();
        self
    }

    /// Creates a renderer from a template file.
    pub fn from_file(site_title: &str, path: &Path) -> Result<Renderer> {
        let source = fs::read_to_string(path).map_err(|err| Error::OpenTemplateFile {
            path: path.to_owned(),
            err,
        })?;
        Renderer::from_source(site_title, &source)
    }

    /// Renders `posts`, in the order given, into an HTML document. An empty
    /// slice renders an empty list.
    pub fn render(&self, posts: &[Post]) -> Result<String> {
        let context = Context::from(self.to_value(posts)).map_err(Error::Template)?;
        let mut out: Vec<u8> = Vec::new();
        self.template
            .execute(&mut out, &context)
            .map_err(Error::Template)?;
        Ok(String::from_utf8(out)?)
    }

    /// Converts the listing into a [`Value`]. The result is a
    /// [`Value::Object`] with fields `site_title` and `posts`.
    fn to_value(&self, posts: &[Post]) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "site_title".to_owned(),
            Value::String(escape(&self.site_title)),
        );
        m.insert(
            "posts".to_owned(),
            Value::Array(posts.iter().map(|p| self.post_value(p)).collect()),
        );
        Value::Object(m)
    }

    /// Converts a [`Post`] into a [`Value::Object`] for templating.
    fn post_value(&self, post: &Post) -> Value {
        post_object(post, &self.link(&post.url))
    }

    fn link(&self, url: &str) -> String {
        if url.starts_with('/') && !url.starts_with("//") {
            format!("{}{}", self.base_path, url)
        } else {
            url.to_owned()
        }
    }
}

fn post_object(post: &Post, url: &str) -> Value {
    let optional = |opt: &Option<String>, escaped: bool| match opt {
        Some(s) if escaped => Value::String(escape(s)),
        Some(s) => Value::String(s.clone()),
        None => Value::Nil,
    };

    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("title".to_owned(), Value::String(escape(&post.title)));
    m.insert("url".to_owned(), Value::String(escape(url)));
    m.insert("date".to_owned(), Value::String(post.display_date()));
    m.insert(
        "code_url".to_owned(),
        optional(&post.external_code_ref, true),
    );
    m.insert("excerpt".to_owned(), optional(&post.excerpt, false));
    m.insert("draft".to_owned(), Value::Bool(post.draft));
    Value::Object(m)
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or applying a listing template. The built-in
/// template never produces one when rendering.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    #[error("Opening template file '{path}': {err}")]
    OpenTemplateFile {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for errors parsing template files.
    #[error("Parsing template: {0}")]
    ParseTemplate(String),

    /// An error during templating.
    #[error("Rendering template: {0}")]
    Template(String),

    /// Returned when a template produces bytes that aren't UTF-8.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn post(title: &str, url: &str, (y, m, d): (i32, u32, u32)) -> Post {
        Post {
            title: title.to_owned(),
            url: url.to_owned(),
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            excerpt: None,
            external_code_ref: None,
            body: String::new(),
            draft: false,
        }
    }

    #[test]
    fn test_one_item_per_post_in_given_order() -> Result<()> {
        // already ordered most-recent-first, as the store hands them over
        let posts = vec![
            post("B", "/b", (2014, 5, 1)),
            post("A", "/a", (2014, 4, 1)),
        ];
        let html = Renderer::new("Blog")?.render(&posts)?;

        assert_eq!(2, html.matches("<li").count());
        let b = html.find(r#"<a href="/b">B</a>"#).unwrap();
        let a = html.find(r#"<a href="/a">A</a>"#).unwrap();
        assert!(b < a);
        assert!(html.contains(r#"<span class="date">2014-05-01</span>"#));
        Ok(())
    }

    #[test]
    fn test_render_is_idempotent() -> Result<()> {
        let mut with_extras = post("A", "/a", (2014, 4, 1));
        with_extras.excerpt = Some(String::from("<p>Summary</p>"));
        with_extras.external_code_ref = Some(String::from("https://github.com/example/a"));
        let posts = vec![post("B", "/b", (2014, 5, 1)), with_extras];

        let renderer = Renderer::new("Blog")?;
        assert_eq!(renderer.render(&posts)?, renderer.render(&posts)?);
        Ok(())
    }

    #[test]
    fn test_code_link_only_when_present() -> Result<()> {
        let mut with_code = post("With code", "/with", (2014, 5, 1));
        with_code.external_code_ref = Some(String::from("https://github.com/example/with"));
        let without_code = post("Without code", "/without", (2014, 4, 1));

        let renderer = Renderer::new("Blog")?;
        let html = renderer.render(&[with_code])?;
        assert!(html.contains(r#"<a class="code" href="https://github.com/example/with">code</a>"#));

        let html = renderer.render(&[without_code])?;
        assert!(!html.contains(r#"class="code""#));
        Ok(())
    }

    #[test]
    fn test_excerpt_only_when_present() -> Result<()> {
        let mut with_excerpt = post("A", "/a", (2014, 4, 1));
        with_excerpt.excerpt = Some(String::from("<p>Monads, <em>briefly</em>.</p>"));

        let renderer = Renderer::new("Blog")?;
        let html = renderer.render(&[with_excerpt])?;
        assert!(html.contains(
            r#"<div class="excerpt"><p>Monads, <em>briefly</em>.</p></div>"#
        ));

        let html = renderer.render(&[post("B", "/b", (2014, 5, 1))])?;
        assert!(!html.contains("excerpt"));
        Ok(())
    }

    #[test]
    fn test_empty_renders_empty_list() -> Result<()> {
        let html = Renderer::new("Blog")?.render(&[])?;
        assert!(html.contains("<ul class=\"posts\">\n</ul>"));
        assert!(!html.contains("<li"));
        Ok(())
    }

    #[test]
    fn test_text_is_escaped() -> Result<()> {
        let posts = vec![post("Option<A> & Either", "/a?x=1&y=2", (2014, 4, 1))];
        let html = Renderer::new("Tom & Jerry")?.render(&posts)?;
        assert!(html.contains("<title>Tom &amp; Jerry</title>"));
        assert!(html.contains(
            r#"<a href="/a?x=1&amp;y=2">Option&lt;A&gt; &amp; Either</a>"#
        ));
        Ok(())
    }

    #[test]
    fn test_base_path_prefixes_root_relative_urls() -> Result<()> {
        let posts = vec![
            post("Local", "/2014/05/01/local.html", (2014, 5, 1)),
            post("Elsewhere", "https://example.org/x.html", (2014, 4, 1)),
            post("Protocol relative", "//example.org/y.html", (2014, 3, 1)),
        ];
        let html = Renderer::new("Blog")?.with_base_path("/blog/").render(&posts)?;
        assert!(html.contains(r#"<a href="/blog/2014/05/01/local.html">Local</a>"#));
        assert!(html.contains(r#"<a href="https://example.org/x.html">Elsewhere</a>"#));
        assert!(html.contains(r#"<a href="//example.org/y.html">Protocol relative</a>"#));

        let html = Renderer::new("Blog")?.with_base_path("").render(&posts)?;
        assert!(html.contains(r#"<a href="/2014/05/01/local.html">Local</a>"#));
        Ok(())
    }

    #[test]
    fn test_drafts_are_marked() -> Result<()> {
        let mut draft = post("WIP", "/wip", (2014, 6, 1));
        draft.draft = true;
        let html = Renderer::new("Blog")?.render(&[draft])?;
        assert!(html.contains(r#"<li class="draft">"#));
        Ok(())
    }

    #[test]
    fn test_custom_template() -> Result<()> {
        let renderer = Renderer::from_source(
            "Blog",
            "{{range .posts}}[{{.title}}]{{end}}",
        )?;
        let posts = vec![post("B", "/b", (2014, 5, 1)), post("A", "/a", (2014, 4, 1))];
        assert_eq!("[B][A]", renderer.render(&posts)?);
        Ok(())
    }

    #[test]
    fn test_custom_template_parse_error() {
        match Renderer::from_source("Blog", "{{range .posts}}") {
            Err(Error::ParseTemplate(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected a parse error"),
        }
    }

    #[test]
    fn test_missing_template_file() {
        match Renderer::from_file("Blog", Path::new("./does/not/exist.html")) {
            Err(Error::OpenTemplateFile { .. }) => {}
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected an open error"),
        }
    }
}
