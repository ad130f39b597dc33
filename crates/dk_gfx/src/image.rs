use std::fmt;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lazy byte source for image content.
///
/// Nothing is read until a native image is actually requested; a source may be opened more than
/// once if its image is released and requested again.
pub trait ImageSource: Send + Sync {
    fn open(&self) -> io::Result<Box<dyn Read>>;
}

/// Image content read from a file on first use.
#[derive(Debug, Clone)]
pub struct FileSource(pub PathBuf);

impl ImageSource for FileSource {
    fn open(&self) -> io::Result<Box<dyn Read>> {
        let file = File::open(&self.0)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Image content already held in memory (embedded assets, tests).
#[derive(Debug, Clone)]
pub struct MemorySource(pub Arc<[u8]>);

impl ImageSource for MemorySource {
    fn open(&self) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(Cursor::new(Arc::clone(&self.0))))
    }
}

/// Image descriptor.
///
/// Identity is the `uri` alone: two descriptors with the same uri share one cached native image
/// regardless of where their bytes come from.
#[derive(Clone)]
pub struct Image {
    pub uri: String,
    pub source: Option<Arc<dyn ImageSource>>,
}

impl Image {
    pub fn new(uri: impl Into<String>, source: Arc<dyn ImageSource>) -> Self {
        Self {
            uri: uri.into(),
            source: Some(source),
        }
    }

    /// Descriptor backed by a file path, with a `file:` uri.
    pub fn file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::new(
            format!("file:{}", path.display()),
            Arc::new(FileSource(path.to_path_buf())),
        )
    }

    pub fn from_bytes(uri: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::new(uri, Arc::new(MemorySource(bytes.into())))
    }

    /// Descriptor with no byte source. Resolving it always fails.
    pub fn unbacked(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            source: None,
        }
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for Image {}

impl Hash for Image {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("uri", &self.uri)
            .field("has_source", &self.has_source())
            .finish()
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}
