use std::io::Write;

use anyhow::Context as _;
use atom_syndication::{Category, Content, Entry, Feed, FixedDateTime, Link};
use chrono::{NaiveDate, NaiveTime};
use log::{info, warn};

use super::{
    data::ArticleMetadata,
    utils::{render_markdown, sort_article},
};

fn to_datetime(date: NaiveDate) -> FixedDateTime {
    date.and_time(NaiveTime::MIN).and_utc().fixed_offset()
}

fn absolute_url(blog_url: &str, path: &str) -> String {
    format!("{}/{}", blog_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn build_entry(blog_url: &str, article: &ArticleMetadata, date: NaiveDate) -> Entry {
    let url = absolute_url(blog_url, &article.path.to_string_lossy());

    let mut link = Link::default();
    link.set_href(url.clone());

    let mut content = Content::default();
    content.set_content_type(Some("html".to_string()));
    content.set_value(Some(render_markdown(&article.body)));

    let categories = article
        .tags
        .iter()
        .map(|tag| {
            let mut category = Category::default();
            category.set_term(tag.clone());
            category
        })
        .collect::<Vec<_>>();

    let mut entry = Entry::default();
    entry.set_id(url);
    entry.set_title(article.title.clone());
    entry.set_updated(to_datetime(date));
    entry.set_published(Some(to_datetime(date)));
    entry.set_links(vec![link]);
    entry.set_categories(categories);
    entry.set_content(Some(content));
    entry
}

/// Atom feed of the dated articles, newest first.
///
/// `None` when nothing is dated, or when `blog_url` is empty: Atom ids and links must be
/// absolute.
pub(super) fn build_feed(
    blog_name: &str,
    blog_url: &str,
    articles: &[ArticleMetadata],
) -> Option<Feed> {
    if blog_url.trim().is_empty() {
        warn!("BLOG_URL is not set. skipping feed.xml");
        return None;
    }

    let mut dated: Vec<&ArticleMetadata> = articles.iter().filter(|a| a.date.is_some()).collect();
    dated.sort_by(sort_article);
    let Some(updated) = dated.first().and_then(|a| a.date) else {
        info!("no dated articles. skipping feed.xml");
        return None;
    };

    let entries = dated
        .iter()
        .filter_map(|a| a.date.map(|date| build_entry(blog_url, a, date)))
        .collect::<Vec<_>>();

    let mut link = Link::default();
    link.set_href(absolute_url(blog_url, ""));

    let mut feed = Feed::default();
    feed.set_id(absolute_url(blog_url, "feed.xml"));
    feed.set_title(blog_name.to_string());
    feed.set_updated(to_datetime(updated));
    feed.set_links(vec![link]);
    feed.set_entries(entries);
    Some(feed)
}

pub(super) fn write_feed<W: Write>(feed: &Feed, writer: W) -> anyhow::Result<()> {
    feed.write_to(writer).context("while writing feed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::*;

    fn article(title: &str, date: Option<NaiveDate>) -> ArticleMetadata {
        ArticleMetadata {
            title: title.to_string(),
            tags: vec!["ruby".to_string()],
            date,
            commit: None,
            extra: BTreeMap::new(),
            path: PathBuf::from(format!("{title}.html")),
            body: "Hello *world*".to_string(),
        }
    }

    #[test]
    fn test_feed_contains_dated_articles_newest_first() {
        let articles = vec![
            article("old", NaiveDate::from_ymd_opt(2020, 1, 1)),
            article("draft", None),
            article("new", NaiveDate::from_ymd_opt(2021, 1, 1)),
        ];
        let feed = build_feed("diary", "https://example.com/", &articles).unwrap();

        assert_eq!(feed.entries().len(), 2);
        assert_eq!(feed.entries()[0].title().value, "new");
        assert_eq!(feed.entries()[0].id(), "https://example.com/new.html");
        assert_eq!(feed.updated(), &to_datetime(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()));
        assert_eq!(feed.entries()[1].categories()[0].term(), "ruby");
    }

    #[test]
    fn test_feed_without_dates() {
        let articles = vec![article("draft", None)];
        assert!(build_feed("diary", "https://example.com", &articles).is_none());
    }

    #[test]
    fn test_feed_requires_blog_url() {
        let articles = vec![article("post", NaiveDate::from_ymd_opt(2020, 5, 5))];
        assert!(build_feed("diary", "", &articles).is_none());
        assert!(build_feed("diary", "  ", &articles).is_none());
    }

    #[test]
    fn test_write_feed() {
        let articles = vec![article("post", NaiveDate::from_ymd_opt(2020, 5, 5))];
        let feed = build_feed("diary", "https://example.com", &articles).unwrap();
        let mut out = Vec::new();
        write_feed(&feed, &mut out).unwrap();
        let xml = String::from_utf8(out).unwrap();
        assert!(xml.contains("<feed"));
        assert!(xml.contains("https://example.com/post.html"));
        assert!(xml.contains("&lt;em&gt;world&lt;/em&gt;"));
    }
}
