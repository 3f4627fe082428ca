use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use log::warn;
use serde::Serialize;

use super::utils::slugify;
use crate::document::Document;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub(super) struct ArticleMetadata {
    pub title: String,
    pub tags: Vec<String>,
    pub date: Option<NaiveDate>,
    pub commit: Option<String>,
    pub extra: BTreeMap<String, String>,
    pub path: PathBuf,

    #[serde(skip_serializing)]
    pub body: String,
}

impl ArticleMetadata {
    /// `source` is relative to the article directory. The resulting `path` points at the
    /// generated page relative to the site root.
    pub fn from_document(document: Document, source: &Path) -> Self {
        let (mut metadata, body) = document.into_parts();

        let mut path = source.to_path_buf();
        path.set_extension("html");

        let title = metadata.remove("title").unwrap_or_else(|| {
            source
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        });

        // `tag` was the key of older posts
        let tags = metadata
            .remove("tags")
            .or_else(|| metadata.remove("tag"))
            .map(|v| parse_tags(&v))
            .unwrap_or_default();
        let tags = retain_sluggable(tags, source);

        let date = metadata
            .remove("date")
            .and_then(|v| match NaiveDate::parse_from_str(&v, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(e) => {
                    warn!("Ignoring invalid date {:?} in {:?}: {}", v, source, e);
                    None
                }
            });

        let commit = metadata.remove("commit").filter(|c| !c.is_empty());

        Self {
            title,
            tags,
            date,
            commit,
            extra: metadata,
            path,
            body,
        }
    }

    /// Pseudo entry standing for a sub-directory in listings.
    pub fn directory(name: String, path: &Path) -> Self {
        Self {
            title: name,
            tags: vec![],
            date: None,
            commit: None,
            extra: BTreeMap::new(),
            path: path.join("index.html"),
            body: String::new(),
        }
    }
}

fn parse_tags(value: &str) -> Vec<String> {
    let value = value.trim();
    let value = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);
    value
        .split(',')
        .map(|t| t.trim().trim_matches(|c: char| c == '"' || c == '\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tag pages are named by slug, so a tag with an empty slug has no page and tags sharing a
/// slug share one.
fn retain_sluggable(tags: Vec<String>, source: &Path) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|tag| {
            let slug = slugify(tag);
            if slug.is_empty() {
                warn!("Ignoring tag {:?} in {:?}: no usable characters", tag, source);
                return false;
            }
            seen.insert(slug)
        })
        .collect()
}

#[derive(Serialize, Debug)]
pub(super) struct ArticlePageData<'a> {
    pub blog_name: &'a str,
    pub body: String,
    pub meta: &'a ArticleMetadata,
}

#[derive(Serialize, Debug)]
pub(super) struct ListPageData<'a> {
    pub blog_name: &'a str,
    pub title: String,
    pub path: PathBuf,
    pub articles: Vec<&'a ArticleMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(input: &str, source: &str) -> ArticleMetadata {
        ArticleMetadata::from_document(Document::parse(input), Path::new(source))
    }

    #[test]
    fn test_known_keys() {
        let meta = article(
            "---\ntitle: Ruby attributes\ndate: 2021-03-04\ntags: ruby, struct\ncommit: 1a2b3c\n---\nBody\n",
            "2021/attributes.md",
        );
        assert_eq!(meta.title, "Ruby attributes");
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2021, 3, 4));
        assert_eq!(meta.tags, vec!["ruby", "struct"]);
        assert_eq!(meta.commit.as_deref(), Some("1a2b3c"));
        assert_eq!(meta.path, PathBuf::from("2021/attributes.html"));
        assert_eq!(meta.body, "Body\n");
        assert!(meta.extra.is_empty());
    }

    #[test]
    fn test_missing_keys_fall_back() {
        let meta = article("Just a body", "notes.md");
        assert_eq!(meta.title, "notes");
        assert!(meta.tags.is_empty());
        assert_eq!(meta.date, None);
        assert_eq!(meta.commit, None);
        assert_eq!(meta.body, "Just a body");
    }

    #[test]
    fn test_invalid_date_is_ignored() {
        let meta = article("---\ntitle: X\ndate: yesterday\n---\n", "x.md");
        assert_eq!(meta.title, "X");
        assert_eq!(meta.date, None);
    }

    #[test]
    fn test_singular_tag_key() {
        let meta = article("---\ntag: diary\n---\n", "x.md");
        assert_eq!(meta.tags, vec!["diary"]);
    }

    #[test]
    fn test_bracketed_tags() {
        assert_eq!(
            parse_tags("[ruby, \"dry-rb\", , 'virtus']"),
            vec!["ruby", "dry-rb", "virtus"]
        );
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn test_punctuation_only_tags_are_dropped() {
        let meta = article("---\ntags: ++, ruby, #\n---\n", "x.md");
        assert_eq!(meta.tags, vec!["ruby"]);
    }

    #[test]
    fn test_tags_sharing_a_slug_are_merged() {
        let meta = article("---\ntags: Ruby, ruby, C, C++\n---\n", "x.md");
        assert_eq!(meta.tags, vec!["Ruby", "C"]);
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let meta = article("---\nlayout: post\n---\n", "x.md");
        assert_eq!(meta.extra.get("layout").map(String::as_str), Some("post"));
    }

    #[test]
    fn test_directory_entry() {
        let meta = ArticleMetadata::directory("2021".to_string(), Path::new("2021"));
        assert_eq!(meta.path, PathBuf::from("2021/index.html"));
        assert_eq!(meta.date, None);
    }
}
