//! Disk I/O helpers and document normalization.
//!
//! The rename-over approach is close to atomic on most platforms. On NTFS
//! (Windows) it's reliable; on FAT32 or network shares there are no hard
//! guarantees.

use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys tried, in order, when a document wraps its list in an object.
pub const ENVELOPE_KEYS: [&str; 6] = [
    "students",
    "teachers",
    "admins",
    "homework",
    "submissions",
    "pending_admissions",
];

/// Sibling temp path used by [`atomic_write`]: `students.json` becomes
/// `students.json.tmp`.
pub fn temp_path(path: &Path) -> PathBuf {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    path.with_extension(format!("{ext}.tmp"))
}

/// First half of an atomic write: put `bytes` in the temp sibling and sync
/// it. The target is untouched until [`commit_temp`] runs.
pub fn write_temp(path: &Path, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let tmp = temp_path(path);
    let mut file = std::fs::File::create(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(tmp)
}

/// Second half of an atomic write: rename the temp file over the target.
pub fn commit_temp(tmp: &Path, path: &Path) -> std::io::Result<()> {
    std::fs::rename(tmp, path)
}

/// Write `bytes` to `<path>.tmp` and then rename over `path`. This avoids
/// leaving a half-written file if the process crashes mid-write.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = write_temp(path, bytes)?;
    commit_temp(&tmp, path)
}

/// Extract the record list from a parsed document.
///
/// Arrays are returned as-is. Objects are searched for the first
/// [`ENVELOPE_KEYS`] entry holding an array, then for a single array-valued
/// entry. Anything else yields `None` and the caller uses its default.
pub fn normalize(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => {
            for key in ENVELOPE_KEYS {
                if let Some(Value::Array(_)) = map.get(key) {
                    if let Some(Value::Array(items)) = map.remove(key) {
                        return Some(items);
                    }
                }
            }
            let mut arrays = map.into_iter().filter_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            });
            match (arrays.next(), arrays.next()) {
                (Some(only), None) => Some(only),
                _ => None,
            }
        }
        _ => None,
    }
}
