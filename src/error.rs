//! Unified error type for portal operations.
//!
//! The document store itself never returns these: load and save absorb every
//! I/O and parse failure. They surface from construction (bad directories,
//! bad config) and from the portal services (auth, uploads, lookups).

/// Things that can go wrong when using the portal.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// File system problem (create dir, read upload, write upload).
    Io(String),
    /// Failed to serialize a record or collection.
    Serialize(String),
    /// Failed to deserialize bytes or a record.
    Deserialize(String),
    /// Bad configuration (empty path, missing env value, etc.).
    Config(String),
    /// A referenced record or file does not exist.
    NotFound(String),
    /// The session's role may not perform this operation.
    Unauthorized(String),
    /// Login was attempted for a role the portal does not know.
    UnknownRole(String),
    /// No user matched the supplied identifier and password.
    InvalidCredentials,
    /// An upload was required but none (or an unnamed one) was given.
    MissingFile,
    /// The upload's extension is not on the allow-list.
    DisallowedFile(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(msg) => write!(f, "i/o error: {msg}"),
            Error::Serialize(msg) => write!(f, "serialization error: {msg}"),
            Error::Deserialize(msg) => write!(f, "deserialization error: {msg}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::NotFound(what) => write!(f, "not found: {what}"),
            Error::Unauthorized(msg) => write!(f, "not authorized: {msg}"),
            Error::UnknownRole(role) => write!(f, "unknown role: {role}"),
            Error::InvalidCredentials => write!(f, "invalid credentials"),
            Error::MissingFile => write!(f, "no file selected"),
            Error::DisallowedFile(name) => {
                write!(f, "file type not allowed (pdf, txt, zip, rar): {name}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(err.to_string())
        } else {
            Error::Io(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.to_string())
        } else if err.is_syntax() || err.is_eof() || err.is_data() {
            Error::Deserialize(err.to_string())
        } else {
            Error::Serialize(err.to_string())
        }
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
