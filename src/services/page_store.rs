use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info, warn, error};

use crate::errors::WikiError;
use crate::types::{Page, Title};

const PAGE_SUFFIX: &str = ".txt";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Title-keyed page persistence, one `{title}.txt` file per page
#[derive(Debug, Clone)]
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    /// Create a store over an existing directory
    pub fn new(root: PathBuf) -> Self {
        debug!("Creating PageStore with data directory: {:?}", root);
        Self { root }
    }

    /// Create the data directory if needed and return a store over it
    pub fn open(root: PathBuf) -> Result<Self, WikiError> {
        fs::create_dir_all(&root).map_err(|e| {
            error!("Failed to create data directory {:?}: {}", root, e);
            WikiError::Io(e)
        })?;
        Ok(Self::new(root))
    }

    /// On-disk location of a page
    pub fn path_for(&self, title: &Title) -> PathBuf {
        self.root.join(format!("{}{}", title, PAGE_SUFFIX))
    }

    /// Read a page. A page that was never saved yields `WikiError::NotFound`.
    pub fn load(&self, title: &Title) -> Result<Page, WikiError> {
        let path = self.path_for(title);
        match fs::read(&path) {
            Ok(body) => {
                debug!("Loaded page '{}', {} bytes", title, body.len());
                Ok(Page::new(title.clone(), body))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No stored page for '{}'", title);
                Err(WikiError::NotFound)
            }
            Err(e) => {
                warn!("Failed to read page {:?}: {}", path, e);
                Err(WikiError::Io(e))
            }
        }
    }

    /// Write the page body as the complete contents of its file.
    ///
    /// The body lands in a hidden temporary file first and is renamed over the
    /// target, so concurrent readers see either the old or the new body.
    pub fn save(&self, page: &Page) -> Result<(), WikiError> {
        let target = self.path_for(&page.title);
        let temp = self.temp_path_for(&page.title);

        if let Err(e) = write_owner_only(&temp, &page.body).and_then(|_| fs::rename(&temp, &target)) {
            error!("Failed to save page {:?}: {}", target, e);
            let _ = fs::remove_file(&temp);
            return Err(WikiError::Io(e));
        }

        info!("Saved page '{}', {} bytes", page.title, page.body.len());
        Ok(())
    }

    /// Titles of every stored page, sorted
    pub fn list(&self) -> Result<Vec<Title>, WikiError> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            error!("Failed to read data directory {:?}: {}", self.root, e);
            WikiError::Io(e)
        })?;

        let mut titles = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };
            // follows symlinks, matching what `load` can read
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue; // in-flight temporaries
            }
            match name.strip_suffix(PAGE_SUFFIX).map(str::parse::<Title>) {
                Some(Ok(title)) => titles.push(title),
                _ => debug!("Skipping non-page entry: {}", name),
            }
        }

        titles.sort();
        debug!("Listed {} pages in {:?}", titles.len(), self.root);
        Ok(titles)
    }

    fn temp_path_for(&self, title: &Title) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(".{}.{}-{}.tmp", title, std::process::id(), n))
    }
}

fn write_owner_only(path: &Path, body: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(body)?;
    file.sync_all()
}
