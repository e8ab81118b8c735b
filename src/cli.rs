use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use spa_scripts::{
    config::{FileConfig, ServerOptions},
    paths::ResolveOptions,
};

#[derive(Args)]
pub(crate) struct StartArgs {
    /// Compile once and exit with 0 on a clean compile, 1 otherwise
    #[arg(long)]
    smoke_test: bool,

    /// Host the development server binds to
    #[arg(long)]
    host: Option<String>,

    /// Port the development server listens on
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Don't open a browser tab
    #[arg(long)]
    no_open: bool,
}

#[derive(Args)]
pub(crate) struct EjectArgs {
    /// Don't ask for confirmation
    #[arg(short = 'y', long)]
    pub(crate) yes: bool,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Create an optimized production build in build/
    Build,

    /// Run the development server
    Start(StartArgs),

    /// Copy the build configuration into the project
    Eject(EjectArgs),

    #[command(external_subcommand)]
    External(Vec<String>),
}

#[derive(Parser)]
#[command(name = "spa-scripts")]
#[command(about = "Build, serve and eject single-page web applications")]
#[command(version, allow_external_subcommands = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Command>,

    /// URL the app is served from, overriding the homepage field of package.json
    #[arg(long, env = "PUBLIC_URL", global = true)]
    public_url: Option<String>,

    /// Path to the bundler executable
    #[arg(long, global = true)]
    bundler: Option<PathBuf>,

    /// Show diagnostic logs on stderr
    #[arg(short = 'v', long, global = true)]
    pub(crate) verbose: bool,
}

impl Cli {
    pub(crate) fn resolve_options(
        &self,
        file_config: &FileConfig,
        app_directory: PathBuf,
        own_directory: PathBuf,
    ) -> ResolveOptions {
        ResolveOptions {
            app_directory,
            own_directory,
            public_url: self
                .public_url
                .clone()
                .or_else(|| file_config.public_url.clone()),
        }
    }

    pub(crate) fn bundler_path(&self, file_config: &FileConfig) -> Option<PathBuf> {
        self.bundler.clone().or_else(|| file_config.bundler_path())
    }
}

impl StartArgs {
    pub(crate) fn server_options(&self, file_config: &FileConfig) -> ServerOptions {
        let defaults = ServerOptions::default();
        let server = &file_config.server;

        ServerOptions {
            host: self
                .host
                .clone()
                .or_else(|| server.host.clone())
                .unwrap_or(defaults.host),
            port: self.port.or(server.port).unwrap_or(defaults.port),
            open_browser: !self.no_open && server.open_browser.unwrap_or(defaults.open_browser),
            smoke_test: self.smoke_test,
        }
    }
}
