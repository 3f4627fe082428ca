use std::{borrow::Borrow, cmp::Ordering, sync::OnceLock};

use pulldown_cmark::{html, Event, Options, Parser};
use regex::Regex;

use super::data::ArticleMetadata;

pub(super) fn sort_article<T: Borrow<ArticleMetadata>>(a: &T, b: &T) -> Ordering {
    match (a.borrow().date, b.borrow().date) {
        (Some(ref a_date), Some(ref b_date)) => b_date.cmp(a_date),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => b.borrow().title.cmp(&a.borrow().title),
    }
}

pub(super) fn render_markdown(body: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(body, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        _ => event,
    });

    let mut body_html = String::new();
    html::push_html(&mut body_html, parser);
    body_html
}

/// File-name-safe form of a tag. Also used by the `tag_slug` template helper.
pub(crate) fn slugify(tag: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"[^\p{L}\p{N}_-]+").expect("valid slug pattern"));
    pattern
        .replace_all(tag.trim(), "-")
        .trim_matches('-')
        .to_lowercase()
}
