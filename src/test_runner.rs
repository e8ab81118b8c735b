//! Test runner configuration.
//!
//! The test runner itself is external; this module only produces the
//! configuration it is started with, serialized as camelCase JSON.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{bundler::BINARY_ASSET_EXTENSIONS, paths::AppPaths};

/// Ignore build output, docs and dependencies when looking for tests.
pub const TEST_PATH_IGNORE_PATTERN: &str = "<rootDir>/(build|docs|node_modules)/";

/// Files under `__tests__/`, or named `*.test.js(x)` / `*.spec.js(x)`.
pub const TEST_REGEX: &str = r"(/__tests__/.*|\.(test|spec))\.(js|jsx)$";

/// Configuration handed to the test runner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunnerConfig {
    /// Extensions tried, in order, when resolving an import.
    pub module_file_extensions: Vec<String>,

    /// Import pattern to stub module substituted for it.
    pub module_name_mapper: BTreeMap<String, String>,

    /// Files loaded before every test file.
    pub setup_files: Vec<String>,

    pub test_path_ignore_patterns: Vec<String>,
    pub test_environment: String,
    pub test_regex: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,

    /// Source transform; dropped once ejected, where the project's own
    /// transform configuration applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_preprocessor: Option<String>,
}

impl TestRunnerConfig {
    /// Build the configuration.
    ///
    /// # Arguments
    ///
    /// * `resolve` - Maps a path relative to the tool's directory to the
    ///   string written into the configuration
    /// * `root_dir` - Optional test root directory
    /// * `is_ejecting` - Whether the configuration is written into an ejected
    ///   project
    /// * `paths` - Resolved project paths
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use spa_scripts::test_runner::TestRunnerConfig;
    /// # fn example(paths: &spa_scripts::paths::AppPaths) {
    /// let config = TestRunnerConfig::create(
    ///     |p| format!("<rootDir>/{p}"),
    ///     None,
    ///     true,
    ///     paths,
    /// );
    /// # }
    /// ```
    pub fn create(
        resolve: impl Fn(&str) -> String,
        root_dir: Option<&str>,
        is_ejecting: bool,
        paths: &AppPaths,
    ) -> Self {
        let mut setup_files = vec![resolve("config/polyfills.js")];
        if paths.tests_setup.exists() {
            // Relative to the root so no absolute path ends up in an ejected
            // configuration.
            setup_files.push("<rootDir>/src/setupTests.js".to_string());
        }

        let binary_pattern = format!(r"^.+\.({})$", BINARY_ASSET_EXTENSIONS.join("|"));
        let module_name_mapper = BTreeMap::from([
            (binary_pattern, resolve("config/jest/FileStub.js")),
            (r"^.+\.css$".to_string(), resolve("config/jest/CSSStub.js")),
        ]);

        Self {
            module_file_extensions: vec!["jsx".into(), "js".into(), "json".into()],
            module_name_mapper,
            setup_files,
            test_path_ignore_patterns: vec![TEST_PATH_IGNORE_PATTERN.to_string()],
            test_environment: "node".to_string(),
            test_regex: TEST_REGEX.to_string(),
            root_dir: root_dir.map(str::to_string),
            script_preprocessor: (!is_ejecting).then(|| resolve("config/jest/transform.js")),
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::Path};
    use tempfile::TempDir;

    fn app_paths(root: &Path) -> AppPaths {
        let src = root.join("src");
        AppPaths {
            dotenv: root.join(".env"),
            app_path: root.to_path_buf(),
            app_build: root.join("build"),
            app_public: root.join("public"),
            app_html: root.join("public/index.html"),
            app_index_js: src.join("index.js"),
            app_package_json: root.join("package.json"),
            app_src: src.clone(),
            yarn_lock_file: root.join("yarn.lock"),
            tests_setup: src.join("setupTests.js"),
            app_node_modules: root.join("node_modules"),
            public_url: None,
            served_path: "/".to_string(),
            src_paths: vec![src],
        }
    }

    fn own(p: &str) -> String {
        format!("/own/{p}")
    }

    #[test]
    fn test_default_configuration() {
        let temp_dir = TempDir::new().unwrap();
        let config = TestRunnerConfig::create(own, None, false, &app_paths(temp_dir.path()));

        assert_eq!(config.module_file_extensions, vec!["jsx", "js", "json"]);
        assert_eq!(config.setup_files, vec!["/own/config/polyfills.js"]);
        assert_eq!(
            config.test_path_ignore_patterns,
            vec!["<rootDir>/(build|docs|node_modules)/"]
        );
        assert_eq!(config.test_environment, "node");
        assert_eq!(config.test_regex, r"(/__tests__/.*|\.(test|spec))\.(js|jsx)$");
        assert_eq!(config.root_dir, None);
        assert_eq!(
            config.script_preprocessor.as_deref(),
            Some("/own/config/jest/transform.js")
        );
    }

    #[test]
    fn test_module_name_mapper_stubs_assets() {
        let temp_dir = TempDir::new().unwrap();
        let config = TestRunnerConfig::create(own, None, false, &app_paths(temp_dir.path()));

        assert_eq!(
            config.module_name_mapper[r"^.+\.css$"],
            "/own/config/jest/CSSStub.js"
        );
        let (binary_pattern, stub) = config
            .module_name_mapper
            .iter()
            .find(|(k, _)| k.contains("png"))
            .unwrap();
        assert!(binary_pattern.starts_with(r"^.+\.(jpg|jpeg|png|gif"));
        assert!(binary_pattern.ends_with("oga)$"));
        assert_eq!(stub, "/own/config/jest/FileStub.js");
    }

    #[test]
    fn test_setup_tests_included_when_present() {
        let temp_dir = TempDir::new().unwrap();
        let paths = app_paths(temp_dir.path());
        fs::create_dir_all(&paths.app_src).unwrap();
        fs::write(&paths.tests_setup, "// setup").unwrap();

        let config = TestRunnerConfig::create(own, None, false, &paths);

        assert_eq!(
            config.setup_files,
            vec!["/own/config/polyfills.js", "<rootDir>/src/setupTests.js"]
        );
    }

    #[test]
    fn test_ejecting_drops_preprocessor_and_sets_root() {
        let temp_dir = TempDir::new().unwrap();
        let config = TestRunnerConfig::create(
            |p| format!("<rootDir>/{p}"),
            Some("/project"),
            true,
            &app_paths(temp_dir.path()),
        );

        assert!(config.script_preprocessor.is_none());
        assert_eq!(config.root_dir.as_deref(), Some("/project"));
        assert_eq!(config.setup_files, vec!["<rootDir>/config/polyfills.js"]);
    }

    #[test]
    fn test_json_uses_camel_case_and_skips_absent_fields() {
        let temp_dir = TempDir::new().unwrap();
        let config = TestRunnerConfig::create(own, None, true, &app_paths(temp_dir.path()));

        let json: serde_json::Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();

        assert!(json.get("moduleFileExtensions").is_some());
        assert!(json.get("testPathIgnorePatterns").is_some());
        assert!(json.get("rootDir").is_none());
        assert!(json.get("scriptPreprocessor").is_none());
    }
}
