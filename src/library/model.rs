use std::path::PathBuf;
use std::time::Duration;

/// One playable audio file found under the media directory.
#[derive(Debug, Clone)]
pub struct LocalSession {
    pub path: PathBuf,
    /// File stem; the startup overlay matches this against catalog ids.
    pub stem: String,
    /// Tagged title when the file has one, otherwise the stem.
    pub title: String,
    pub duration: Option<Duration>,
}
