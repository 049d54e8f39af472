use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::errors::WikiError;
use crate::types::Title;

/// What `/` serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootMode {
    /// Render a listing of every stored title
    Index,
    /// Redirect to the view of a fixed page
    Redirect(Title),
}

/// Application configuration and constants
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub template_dir: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    pub root: RootMode,
    pub index_heading: String,
}

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FRONT_PAGE: &str = "FrontPage";
const DEFAULT_INDEX_HEADING: &str = "Wiki index";

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            template_dir: PathBuf::from("templates"),
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            root: RootMode::Index,
            index_heading: DEFAULT_INDEX_HEADING.to_string(),
        }
    }

    /// Read configuration from `WIKI_*` environment variables.
    ///
    /// Call `dotenv::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, WikiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup, falling back to
    /// defaults for absent keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WikiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(dir) = lookup("WIKI_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("WIKI_TEMPLATE_DIR") {
            config.template_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup("WIKI_HOST") {
            config.host = host
                .trim()
                .parse::<IpAddr>()
                .map_err(|_| WikiError::Config(format!("WIKI_HOST is not an IP address: {:?}", host)))?;
        }
        if let Some(port) = lookup("WIKI_PORT") {
            config.port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| WikiError::Config(format!("WIKI_PORT is not a port number: {:?}", port)))?;
        }
        if let Some(heading) = lookup("WIKI_INDEX_HEADING") {
            config.index_heading = heading;
        }

        let front_page = lookup("WIKI_FRONT_PAGE").unwrap_or_else(|| DEFAULT_FRONT_PAGE.to_string());
        config.root = match lookup("WIKI_ROOT").as_deref().map(str::trim) {
            None | Some("index") => RootMode::Index,
            Some("redirect") => {
                let title = front_page
                    .parse::<Title>()
                    .map_err(|e| WikiError::Config(format!("WIKI_FRONT_PAGE: {}", e)))?;
                RootMode::Redirect(title)
            }
            Some(other) => {
                return Err(WikiError::Config(format!(
                    "WIKI_ROOT must be \"index\" or \"redirect\", got {:?}",
                    other
                )));
            }
        };

        Ok(config)
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
