use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context as _};
use clap::{command, value_parser, Arg, ArgMatches};
use log::info;

use context::Context;
use document::Document;
use generator::generate;
use renderer::generate_renderer;

mod context;
mod document;
mod generator;
mod renderer;

fn dir_arg<'a>(matches: &'a ArgMatches, name: &str) -> anyhow::Result<&'a PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .with_context(|| format!("{name} is not given"))
}

fn dump<W: Write>(path: &Path, mut writer: W) -> anyhow::Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("while reading {:?}", path))?;
    let document = Document::parse(&content);
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = command!()
        .args([
            Arg::new("article_dir")
                .help("Directory path of articles")
                .value_parser(value_parser!(PathBuf))
                .default_value("posts"),
            Arg::new("out_dir")
                .help("Directory path of output. Existing contents will be removed.")
                .value_parser(value_parser!(PathBuf))
                .default_value("out"),
            Arg::new("public_dir")
                .help("Directory path of public. Contents will be copied as it is.")
                .value_parser(value_parser!(PathBuf))
                .default_value("public"),
            Arg::new("template_dir")
                .help("Directory of template")
                .value_parser(value_parser!(PathBuf))
                .default_value("template"),
            Arg::new("dump")
                .long("dump")
                .value_name("FILE")
                .help("Parse a single document, print its metadata and body as JSON, and exit")
                .value_parser(value_parser!(PathBuf)),
        ])
        .get_matches();

    if let Some(path) = matches.get_one::<PathBuf>("dump") {
        return dump(path, BufWriter::new(std::io::stdout().lock()));
    }

    let article_dir = dir_arg(&matches, "article_dir")?;
    if !article_dir.is_dir() {
        bail!("article_dir must be a directory.");
    }
    let out_dir = dir_arg(&matches, "out_dir")?;
    if out_dir.exists() && !out_dir.is_dir() {
        bail!("if out_dir exists, it must be directory.");
    }
    let public_dir = dir_arg(&matches, "public_dir")?;
    if !public_dir.is_dir() {
        bail!("public_dir must be a directory.")
    }
    let template_dir = dir_arg(&matches, "template_dir")?;
    if !template_dir.is_dir() {
        bail!("template_dir must be a directory.")
    }

    let ctx = Context {
        article_dir: article_dir.to_owned(),
        out_dir: out_dir.to_owned(),
        public_dir: public_dir.to_owned(),
        blog_name: std::env::var("BLOG_NAME").unwrap_or_default(),
        blog_url: std::env::var("BLOG_URL").unwrap_or_default(),
        handlebars: generate_renderer(template_dir)?,
    };

    generate(&ctx)?;
    info!("generated site into {:?}", ctx.out_dir);

    Ok(())
}
