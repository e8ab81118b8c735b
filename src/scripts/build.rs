//! The `build` script: a production build into `build/` with a gzip size report.

use std::fs;

use colored::Colorize;
use tracing::{debug, info};

use crate::{
    bundler::{Bundler, Mode},
    error::{Error, Result},
    html::{copy_public_folder, write_index},
    manifest::ManifestReader,
    paths::{ProjectPaths, ensure_slash},
    report::{FileSizeReport, clear_directory, measure_file_sizes},
};

use super::{bundle_config, open_command, spinner};

/// Build the app for production.
///
/// Sizes of the previous build are recorded before the build directory is
/// emptied, so the report can show how much every asset changed.
///
/// The `homepage` used for the hosting hints is read through `reader`.
///
/// # Returns
///
/// The printed size report.
///
/// # Errors
///
/// - [`Error::DelegatedBuild`] if the bundler reported compile errors
/// - [`Error::AssetRead`] if an emitted asset cannot be read back
/// - I/O errors while preparing the build directory
pub fn build(
    paths: &ProjectPaths,
    bundler: &impl Bundler,
    reader: &impl ManifestReader,
) -> Result<FileSizeReport> {
    let app = paths.app();

    let previous = measure_file_sizes(&app.app_build)?;
    debug!(
        "Recorded {} asset sizes from the previous build",
        previous.len()
    );
    clear_directory(&app.app_build)?;
    fs::create_dir_all(&app.app_build)?;

    let copied = copy_public_folder(&app.app_public, &app.app_build, &app.app_html)?;
    debug!("Copied {copied} public files");

    let progress = spinner("Creating an optimized production build...");
    let stats = bundler.run(&bundle_config(app, Mode::Production, &app.app_build));
    progress.finish_and_clear();
    let stats = stats?;

    if stats.has_errors() {
        return Err(Error::DelegatedBuild {
            messages: stats.errors,
        });
    }

    if app.app_html.is_file() {
        let public_url = ensure_slash(&app.served_path, false);
        let url = |name: &str| format!("{}{name}", app.served_path);
        let styles: Vec<String> = stats.entries_with_extension(".css").map(url).collect();
        let scripts: Vec<String> = stats.entries_with_extension(".js").map(url).collect();
        write_index(
            &app.app_html,
            &app.app_build.join("index.html"),
            &public_url,
            &styles,
            &scripts,
        )?;
    }

    if stats.has_warnings() {
        println!("{}", "Compiled with warnings.".yellow());
        println!();
        for warning in &stats.warnings {
            println!("{warning}");
            println!();
        }
    } else {
        println!("{}", "Compiled successfully.".green());
        println!();
    }

    let report = FileSizeReport::from_assets(
        &app.app_build,
        stats.assets.iter().map(|a| a.name.as_str()),
        &previous,
    )?;
    info!("Measured {} assets", report.assets().len());

    println!("File sizes after gzip:");
    println!();
    report.print();
    println!();

    let homepage = reader
        .read(&app.app_package_json)?
        .and_then(|m| m.homepage().map(str::to_string));
    for line in hosting_instructions(homepage.as_deref(), &app.served_path) {
        println!("{line}");
    }
    println!();

    Ok(report)
}

/// Deployment hints printed after a successful build.
///
/// # Arguments
///
/// * `homepage` - The `homepage` field of `package.json`
/// * `served_path` - The URL path the build was made for
#[must_use]
pub fn hosting_instructions(homepage: Option<&str>, served_path: &str) -> Vec<String> {
    let control_hint = format!(
        "You can control this with the {} field in your {}.",
        "homepage".green(),
        "package.json".cyan()
    );
    let hosted_at = format!(
        "The project was built assuming it is hosted at {}.",
        served_path.green()
    );
    let command = |bin: &str, rest: &str| format!("  {}{}", bin.blue(), rest.cyan());

    if let Some(homepage) = homepage.filter(|h| h.contains(".github.io/")) {
        return vec![
            format!("You can now deploy them to {}:", homepage.green()),
            String::new(),
            format!(
                "  {}{}{}",
                "git".blue(),
                " commit -am ".cyan(),
                "\"Save local changes\"".yellow()
            ),
            command("git", " checkout -B gh-pages"),
            command("git", " add -f build"),
            format!(
                "  {}{}{}",
                "git".blue(),
                " commit -am ".cyan(),
                "\"Rebuild website\"".yellow()
            ),
            command("git", " filter-branch -f --prune-empty --subdirectory-filter build"),
            command("git", " push -f origin gh-pages"),
            command("git", " checkout -"),
            String::new(),
            hosted_at,
            control_hint,
        ];
    }

    if served_path != "/" {
        return vec![hosted_at, control_hint];
    }

    let mut lines = vec![
        "You can now deploy them or serve them with a static server:".to_string(),
        String::new(),
        command("npm", " install -g pushstate-server"),
        command("pushstate-server", " build"),
        command(open_command(), " http://localhost:9000"),
        String::new(),
        "The project was built assuming it is hosted at the server root.".to_string(),
    ];

    if homepage.is_some() {
        lines.push(control_hint);
    } else {
        lines.extend([
            format!(
                "To override this, specify the {} in your {}.",
                "homepage".green(),
                "package.json".cyan()
            ),
            "For example, add this to build it for GitHub Pages:".to_string(),
            String::new(),
            format!(
                "  {}{}{}{}",
                "\"homepage\"".green(),
                ": ".cyan(),
                "\"http://myname.github.io/myapp\"".green(),
                ",".cyan()
            ),
        ]);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::strip_ansi;

    fn plain(lines: &[String]) -> String {
        strip_ansi(&lines.join("\n"))
    }

    #[test]
    fn test_github_pages_instructions() {
        let text = plain(&hosting_instructions(
            Some("http://user.github.io/project"),
            "/project/",
        ));

        assert!(text.starts_with("You can now deploy them to http://user.github.io/project:"));
        assert!(text.contains("git checkout -B gh-pages"));
        assert!(text.contains("hosted at /project/."));
    }

    #[test]
    fn test_sub_path_instructions() {
        let lines: Vec<String> =
            hosting_instructions(Some("http://mywebsite.com/project"), "/project/")
                .iter()
                .map(|l| strip_ansi(l))
                .collect();

        assert_eq!(
            lines,
            vec![
                "The project was built assuming it is hosted at /project/.",
                "You can control this with the homepage field in your package.json.",
            ]
        );
    }

    #[test]
    fn test_server_root_without_homepage() {
        let text = plain(&hosting_instructions(None, "/"));

        assert!(text.contains("pushstate-server build"));
        assert!(text.contains("hosted at the server root."));
        assert!(text.contains("To override this, specify the homepage"));
        assert!(text.contains("\"homepage\": \"http://myname.github.io/myapp\","));
    }

    #[test]
    fn test_server_root_with_homepage() {
        let text = plain(&hosting_instructions(Some("http://mywebsite.com"), "/"));

        assert!(text.contains("hosted at the server root."));
        assert!(text.contains("You can control this with the homepage field"));
        assert!(!text.contains("To override this"));
    }
}
