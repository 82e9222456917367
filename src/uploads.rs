//! Uploaded files: name sanitizing, the extension allow-list, and the
//! on-disk upload areas.

use crate::error::{Error, Result};
use log::debug;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Extensions accepted for homework attachments and submissions.
pub const ALLOWED_SUBMIT_EXT: [&str; 4] = ["pdf", "txt", "zip", "rar"];

/// A file received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Name as sent by the client, unsanitized.
    pub filename: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Convenience constructor.
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Directory an upload lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadArea {
    /// `uploads/homework/`: attachments and admission photos.
    Homework,
    /// `uploads/submissions/`: student work.
    Submissions,
}

impl UploadArea {
    fn dir_name(self) -> &'static str {
        match self {
            UploadArea::Homework => "homework",
            UploadArea::Submissions => "submissions",
        }
    }
}

/// Where a saved upload ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Prefixed name inside the area directory.
    pub stored_name: String,
    /// Sanitized client name, without the prefix.
    pub original_name: String,
    /// Full path of the written file.
    pub path: PathBuf,
}

/// `true` when the text after the last dot is on the allow-list
/// (case-insensitive). Names without a dot are rejected.
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_SUBMIT_EXT.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Reduce a client-supplied name to a safe file name.
///
/// The name is NFKD-decomposed and reduced to ASCII, so `ü` becomes `u`.
/// Path separators become spaces, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped, and leading/trailing `.` and `_`
/// are trimmed. An empty result becomes `upload`.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Random 32-hex-char prefix for stored names.
fn unique_prefix() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Upload directories under one root.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    base_dir: PathBuf,
}

impl UploadStore {
    /// Use `root` for uploads, creating both area directories. Paths recorded
    /// in records are made relative to `base_dir` when possible.
    pub fn new(base_dir: impl AsRef<Path>, root: impl AsRef<Path>) -> Result<Self> {
        let store = Self {
            root: root.as_ref().to_path_buf(),
            base_dir: base_dir.as_ref().to_path_buf(),
        };
        for area in [UploadArea::Homework, UploadArea::Submissions] {
            std::fs::create_dir_all(store.area_dir(area))?;
        }
        Ok(store)
    }

    /// Directory for `area`.
    pub fn area_dir(&self, area: UploadArea) -> PathBuf {
        self.root.join(area.dir_name())
    }

    /// Sanitize the name, prefix it with `<tag-><hex>-`, and write the bytes.
    pub fn save(&self, area: UploadArea, tag: Option<&str>, upload: &Upload) -> Result<StoredUpload> {
        let original_name = secure_filename(&upload.filename);
        let stored_name = match tag {
            Some(tag) => format!("{tag}-{}-{original_name}", unique_prefix()),
            None => format!("{}-{original_name}", unique_prefix()),
        };
        let path = self.area_dir(area).join(&stored_name);
        std::fs::write(&path, &upload.bytes)?;
        debug!("stored upload {} ({} bytes)", path.display(), upload.bytes.len());
        Ok(StoredUpload {
            stored_name,
            original_name,
            path,
        })
    }

    /// Read a stored file back by name. Names that could escape the area
    /// directory are reported as missing.
    pub fn open(&self, area: UploadArea, name: &str) -> Result<Vec<u8>> {
        let plain = {
            let mut parts = Path::new(name).components();
            matches!((parts.next(), parts.next()), (Some(Component::Normal(_)), None))
        };
        if !plain || name.contains('\\') {
            return Err(Error::NotFound(name.to_string()));
        }
        std::fs::read(self.area_dir(area).join(name)).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(name.to_string()),
            _ => Error::Io(e.to_string()),
        })
    }

    /// `path` relative to the base directory, with `/` separators, for
    /// storing in records.
    pub fn display_path(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.base_dir).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
