use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use handlebars::{handlebars_helper, Handlebars};

use crate::generator::slugify;

handlebars_helper!(breadcrumbs: |path: str| {
    let path = Path::new(path);
    let mut current_path = PathBuf::from("/");
    let mut res = String::new();
    let mut components = path.components();
    if path.has_root() {
        components.next();
    }
    res.push_str("<a href=\"/\">/</a> ");
    for (i, c) in components.enumerate() {
        current_path.push(c);
        let name = current_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default(); // file_prefix: unstable
        let _ = write!(
            res,
            "{}<a href=\"{}\">{}</a>",
            if i == 0 { "" } else { " / " },
            current_path.to_string_lossy(),
            handlebars::html_escape(&name)
        );
    }

    res
});

fn clamp(len: usize, bound: u64) -> usize {
    usize::try_from(bound).map_or(len, |b| b.min(len))
}

handlebars_helper!(slice_until: |lst: array, upper: u64| lst[..clamp(lst.len(), upper)].to_owned());
handlebars_helper!(slice_since: |lst: array, lower: u64| lst[clamp(lst.len(), lower)..].to_owned());
handlebars_helper!(slice: |lst: array, lower: u64, upper: u64| {
    let upper = clamp(lst.len(), upper);
    lst[clamp(upper, lower)..upper].to_owned()
});
handlebars_helper!(tag_slug: |tag: str| slugify(tag));

fn register_helpers(handlebars: &mut Handlebars<'static>) {
    handlebars.register_helper("breadcrumbs", Box::new(breadcrumbs));
    handlebars.register_helper("slice", Box::new(slice));
    handlebars.register_helper("slice_since", Box::new(slice_since));
    handlebars.register_helper("slice_until", Box::new(slice_until));
    handlebars.register_helper("tag_slug", Box::new(tag_slug));
}

pub(crate) fn generate_renderer(template_dir: &Path) -> anyhow::Result<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    register_helpers(&mut handlebars);
    for name in ["index", "article", "list"] {
        handlebars
            .register_template_file(name, template_dir.join(format!("{name}.hbs")))
            .with_context(|| format!("{name}.hbs"))?;
    }
    handlebars.register_partial(
        "layout",
        std::fs::read_to_string(template_dir.join("layout.hbs")).context("layout.hbs")?,
    )?;

    Ok(handlebars)
}
