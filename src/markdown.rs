//! Markdown to HTML conversion for post bodies and excerpts, plus the
//! `<!-- more -->` fold that splits an excerpt off the top of a body.

use pulldown_cmark::escape::escape_html;
use pulldown_cmark::{html, Event, Options, Parser, Tag};

/// Separates the excerpt from the rest of a post body.
pub const FOLD_TAG: &str = "<!-- more -->";

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Converts a markdown document to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options()));
    out
}

/// Converts a short markdown snippet (e.g., a front-matter excerpt) to HTML
/// without the enclosing paragraph, so a one-line excerpt renders inline.
pub fn to_inline_html(markdown: &str) -> String {
    let mut out = String::new();
    html::push_html(
        &mut out,
        Parser::new_ext(markdown, options()).filter(|ev| {
            !matches!(ev, Event::Start(Tag::Paragraph) | Event::End(Tag::Paragraph))
        }),
    );
    out.trim().to_owned()
}

/// Returns the HTML above the fold, if the rendered body has one.
pub fn fold(body: &str) -> Option<&str> {
    body.find(FOLD_TAG).map(|i| body[..i].trim_end())
}

/// Escapes text for inclusion in HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a `String` can't fail.
    let _ = escape_html(&mut out, text);
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_html() {
        assert_eq!(
            "<h1>Hello</h1>\n<p>Plain <em>world</em></p>\n",
            to_html("# Hello\n\nPlain *world*\n")
        );
    }

    #[test]
    fn test_to_inline_html() {
        assert_eq!(
            "Validation with <code>Either</code>",
            to_inline_html("Validation with `Either`")
        );
    }

    #[test]
    fn test_fold_survives_rendering() {
        let body = to_html("First paragraph.\n\n<!-- more -->\n\nThe rest.\n");
        assert_eq!(Some("<p>First paragraph.</p>"), fold(&body));
    }

    #[test]
    fn test_no_fold() {
        assert_eq!(None, fold("<p>Only one part.</p>\n"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            "Option&lt;A&gt; &amp; &quot;B&quot;",
            escape("Option<A> & \"B\"")
        );
    }
}
