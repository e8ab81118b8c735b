//! Development server configuration.

/// Default host the development server binds to.
pub const DEFAULT_HOST: &str = "localhost";

/// Default development server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Resolved options of the `start` script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerOptions {
    pub host: String,
    pub port: u16,

    /// Whether to open a browser tab once the server is starting
    pub open_browser: bool,

    /// Compile once and exit instead of serving
    pub smoke_test: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            open_browser: true,
            smoke_test: false,
        }
    }
}

impl ServerOptions {
    /// The address the browser is pointed at.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}
