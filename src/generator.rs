use std::{
    collections::{HashMap, HashSet, VecDeque},
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context as _};
use either::Either;
use fs_extra::dir::CopyOptions;
use log::{debug, info};

use crate::{context::Context, document::Document};

mod data;
mod feed;
mod utils;

use data::{ArticleMetadata, ArticlePageData, ListPageData};
use utils::{render_markdown, sort_article};

pub(crate) use utils::slugify;

const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| MARKDOWN_EXTENSIONS.contains(&e))
}

fn preprocess_file(ctx: &Context, file_path: &Path) -> anyhow::Result<ArticleMetadata> {
    let content = std::fs::read_to_string(ctx.article_dir.join(file_path))?;
    let document = Document::parse(&content);
    debug!(
        "{:?}: title {:?}, {} metadata entries, {} bytes of body",
        file_path,
        document.get("title"),
        document.metadata().len(),
        document.body().len()
    );
    Ok(ArticleMetadata::from_document(document, file_path))
}

/// Output files of one run. Every page may be written only once, so a post can never be
/// silently replaced by a listing (`index.md`, `tags/*.md`) or by another post.
struct Pages<'a> {
    out_dir: &'a Path,
    written: HashSet<PathBuf>,
}

impl<'a> Pages<'a> {
    fn new(out_dir: &'a Path) -> Self {
        Self {
            out_dir,
            written: HashSet::new(),
        }
    }

    fn create(&mut self, page: &Path) -> anyhow::Result<BufWriter<File>> {
        if !self.written.insert(page.to_path_buf()) {
            bail!(
                "{:?} is generated more than once. rename the post that collides with it",
                page
            );
        }
        let path = self.out_dir.join(page);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let fd = File::create(&path).with_context(|| format!("while creating {:?}", path))?;
        Ok(BufWriter::new(fd))
    }
}

fn generate_article(
    ctx: &Context,
    pages: &mut Pages,
    metadata: &ArticleMetadata,
) -> anyhow::Result<()> {
    let fd = pages.create(&metadata.path)?;

    let data = ArticlePageData {
        blog_name: &ctx.blog_name,
        body: render_markdown(&metadata.body),
        meta: metadata,
    };
    ctx.handlebars
        .render_to_write("article", &data, fd)
        .with_context(|| format!("while generating from {:?}", metadata.path))?;
    Ok(())
}

fn generate_list(
    ctx: &Context,
    pages: &mut Pages,
    template: &str,
    page: &Path,
    data: &ListPageData,
) -> anyhow::Result<()> {
    let fd = pages.create(page)?;
    ctx.handlebars
        .render_to_write(template, data, fd)
        .with_context(|| format!("while generating list for {:?}", data.title))?;
    Ok(())
}

pub(crate) fn generate(ctx: &Context) -> anyhow::Result<()> {
    fs_extra::dir::remove(&ctx.out_dir)?;
    fs_extra::dir::create_all(&ctx.out_dir, false)?;

    // copy `public_dir`
    let mut cp_opts = CopyOptions::new();
    cp_opts.copy_inside = true;
    cp_opts.content_only = true;
    cp_opts.overwrite = true;
    fs_extra::dir::copy(&ctx.public_dir, &ctx.out_dir, &cp_opts)
        .with_context(|| format!("while copying {:?}", ctx.public_dir))?;

    // master data
    let mut articles = vec![];

    // left: index of `articles` / right: directory(pseudo entry data)
    let mut directories: HashMap<PathBuf, Vec<Either<usize, ArticleMetadata>>> = HashMap::new();
    // slug -> (display name, indices of `articles`)
    let mut tags: HashMap<String, (String, Vec<usize>)> = HashMap::new();

    // traversing `article_dir`
    let mut q = VecDeque::new();
    q.push_back(PathBuf::new());
    while let Some(path) = q.pop_front() {
        let entries_in_current_path = directories.entry(path.clone()).or_default();

        for entry in std::fs::read_dir(ctx.article_dir.join(&path))? {
            let entry = entry?;
            let meta = entry.metadata()?;
            let entry_path = path.join(entry.file_name());

            if meta.is_dir() {
                q.push_back(entry_path.clone());
                let directory_name = entry.file_name().to_string_lossy().to_string();
                entries_in_current_path
                    .push(Either::Right(ArticleMetadata::directory(directory_name, &entry_path)));
            } else if meta.is_file() {
                if !is_markdown(&entry_path) {
                    debug!("skipping {:?}: not a markdown file", entry_path);
                    continue;
                }
                let article_meta = preprocess_file(ctx, &entry_path)
                    .with_context(|| format!("while preprocessing {:?}", entry_path))?;
                for tag in article_meta.tags.iter() {
                    tags.entry(slugify(tag))
                        .or_insert_with(|| (tag.to_string(), vec![]))
                        .1
                        .push(articles.len());
                }
                entries_in_current_path.push(Either::Left(articles.len()));
                articles.push(article_meta);
            }
        }
    }
    info!("loaded {} articles", articles.len());

    let mut pages = Pages::new(&ctx.out_dir);

    // generate article pages
    for article in articles.iter() {
        generate_article(ctx, &mut pages, article)?;
    }

    // generate index page
    {
        let mut entries: Vec<&ArticleMetadata> = articles.iter().collect();
        entries.sort_by(sort_article);
        let data = ListPageData {
            blog_name: &ctx.blog_name,
            title: "index".to_string(),
            path: PathBuf::from("/"),
            articles: entries,
        };
        generate_list(ctx, &mut pages, "index", Path::new("index.html"), &data)?;
    }

    // generate directory index pages
    for (dir_name, entry) in directories.iter() {
        // index page
        if dir_name.as_os_str().is_empty() {
            continue;
        }

        let mut entries: Vec<&ArticleMetadata> = entry
            .iter()
            .map(|e| match e {
                Either::Left(idx) => &articles[*idx],
                Either::Right(meta) => meta,
            })
            .collect();
        entries.sort_by(sort_article);

        let data = ListPageData {
            blog_name: &ctx.blog_name,
            title: dir_name.to_string_lossy().to_string(),
            path: dir_name.clone(),
            articles: entries,
        };
        generate_list(ctx, &mut pages, "list", &dir_name.join("index.html"), &data)?;
    }

    // generate tag pages
    for (slug, (tag, article_indices)) in tags.iter() {
        let mut entries: Vec<&ArticleMetadata> =
            article_indices.iter().map(|idx| &articles[*idx]).collect();
        entries.sort_by(sort_article);

        let data = ListPageData {
            blog_name: &ctx.blog_name,
            title: format!("Tag: {}", tag),
            path: PathBuf::from("/tags").join(slug),
            articles: entries,
        };
        let page = Path::new("tags").join(format!("{slug}.html"));
        generate_list(ctx, &mut pages, "list", &page, &data)?;
    }

    // generate feed
    if let Some(feed) = feed::build_feed(&ctx.blog_name, &ctx.blog_url, &articles) {
        let fd = pages.create(Path::new("feed.xml"))?;
        feed::write_feed(&feed, fd)?;
    }

    Ok(())
}
