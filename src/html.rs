//! Static assets and `index.html` generation.
//!
//! Everything in `public/` is copied verbatim into the output, except
//! `index.html`, which is rendered: `%PUBLIC_URL%` is substituted and the
//! entry stylesheets and scripts emitted by the bundler are referenced.

use std::{fs, path::Path};

use walkdir::WalkDir;

use crate::error::Result;

/// Placeholder replaced by the public URL in `index.html`.
pub const PUBLIC_URL_PLACEHOLDER: &str = "%PUBLIC_URL%";

/// Copy `public_dir` into `dest`, skipping `html_file`.
///
/// A missing `public_dir` copies nothing.
///
/// # Returns
///
/// The number of files copied.
///
/// # Errors
///
/// Returns an I/O error if a directory cannot be created or a file copied.
pub fn copy_public_folder(public_dir: &Path, dest: &Path, html_file: &Path) -> Result<usize> {
    if !public_dir.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;

    for entry in WalkDir::new(public_dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(public_dir) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if path != html_file {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Render the `index.html` template.
///
/// # Arguments
///
/// * `template` - Contents of `public/index.html`
/// * `public_url` - Replacement for `%PUBLIC_URL%`, without trailing slash
/// * `styles` - Stylesheet URLs, linked at the end of `<head>`
/// * `scripts` - Script URLs, loaded at the end of `<body>`
#[must_use]
pub fn render_index(template: &str, public_url: &str, styles: &[String], scripts: &[String]) -> String {
    let mut html = template.replace(PUBLIC_URL_PLACEHOLDER, public_url);

    let links: String = styles
        .iter()
        .map(|href| format!("<link href=\"{href}\" rel=\"stylesheet\">"))
        .collect();
    let tags: String = scripts
        .iter()
        .map(|src| format!("<script defer=\"defer\" src=\"{src}\"></script>"))
        .collect();

    insert_before(&mut html, "</head>", &links);
    insert_before(&mut html, "</body>", &tags);

    html
}

/// Insert `content` before the last `marker`, or append it when absent.
fn insert_before(html: &mut String, marker: &str, content: &str) {
    if content.is_empty() {
        return;
    }

    match html.rfind(marker) {
        Some(idx) => html.insert_str(idx, content),
        None => html.push_str(content),
    }
}

/// Read the template at `html_file`, render it and write it to `dest`.
///
/// # Errors
///
/// Returns an I/O error if the template cannot be read or the output written.
pub fn write_index(
    html_file: &Path,
    dest: &Path,
    public_url: &str,
    styles: &[String],
    scripts: &[String],
) -> Result<()> {
    let template = fs::read_to_string(html_file)?;
    let rendered = render_index(&template, public_url, styles, scripts);

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, rendered)?;

    Ok(())
}
