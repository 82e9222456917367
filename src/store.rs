//! Core document store and its builder.

use crate::driver::{FsDriver, StorageDriver};
use crate::error::Result;
use crate::model::Collection;
use crate::persist::normalize;
use crate::repository::Repository;
use crate::serializer::{JsonSerializer, Serializer};
use log::{debug, error, warn};
use serde_json::Value;
use std::path::Path;

/// Crash-tolerant store of named JSON collections.
///
/// [`load`](Self::load) and [`save`](Self::save) never fail: a missing or
/// corrupt document is replaced by the caller's default, and a failed atomic
/// write falls back to a direct one. Each call reads or writes a whole
/// collection; concurrent read-modify-write sequences are last-write-wins.
pub struct DocumentStore<D = FsDriver> {
    driver: D,
    serializer: JsonSerializer,
}

impl DocumentStore<FsDriver> {
    /// Open (or create) a store rooted at `data_dir` with pretty JSON.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::builder(FsDriver::new(data_dir)?).build())
    }
}

impl<D: StorageDriver> DocumentStore<D> {
    /// Start configuring a store over `driver`. Call
    /// [`.build()`](DocumentStoreBuilder::build) when ready.
    pub fn builder(driver: D) -> DocumentStoreBuilder<D> {
        DocumentStoreBuilder::new(driver)
    }

    /// The underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Typed view over one collection.
    pub fn collection<T: Collection>(&self) -> Repository<'_, T, D> {
        Repository::new(self)
    }

    /// Load the named collection.
    ///
    /// Missing and unparseable documents are overwritten with `default`,
    /// which is returned. Object envelopes are unwrapped (see
    /// [`normalize`]); any other shape yields `default` without touching
    /// the file.
    pub fn load(&self, name: &str, default: &[Value]) -> Vec<Value> {
        let bytes = match self.driver.read(name) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("{} missing, writing default", self.driver.describe(name));
                self.save(name, default);
                return default.to_vec();
            }
            Err(e) => {
                warn!("cannot read {}: {e}; resetting", self.driver.describe(name));
                self.save(name, default);
                return default.to_vec();
            }
        };

        let doc = match self.serializer.deserialize(&bytes) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("{} is corrupt ({e}); resetting", self.driver.describe(name));
                self.save(name, default);
                return default.to_vec();
            }
        };

        normalize(doc).unwrap_or_else(|| {
            debug!(
                "{} has no usable record list, using default",
                self.driver.describe(name)
            );
            default.to_vec()
        })
    }

    /// Persist `records` as the whole named collection.
    ///
    /// Tries an atomic replace first; on failure writes directly, giving up
    /// atomicity rather than the data. A failure of both is logged only.
    pub fn save(&self, name: &str, records: &[Value]) {
        let bytes = match self.serializer.serialize(records) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("cannot serialize {name}: {e}");
                return;
            }
        };
        if let Err(e) = self.driver.write_atomic(name, &bytes) {
            warn!(
                "atomic write of {} failed ({e}); writing in place",
                self.driver.describe(name)
            );
            if let Err(e) = self.driver.write_direct(name, &bytes) {
                error!("write of {} failed: {e}", self.driver.describe(name));
            }
        }
    }
}

impl<D> std::fmt::Debug for DocumentStore<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("pretty", &self.serializer.is_pretty())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures a [`DocumentStore`].
///
/// ```rust,no_run
/// use school_portal_store::{DocumentStore, FsDriver};
///
/// let store = DocumentStore::builder(FsDriver::new("data").unwrap())
///     .pretty(false)
///     .build();
/// let students = store.load("students.json", &[]);
/// store.save("students.json", &students);
/// ```
pub struct DocumentStoreBuilder<D> {
    driver: D,
    pretty: bool,
}

impl<D: StorageDriver> DocumentStoreBuilder<D> {
    fn new(driver: D) -> Self {
        Self {
            driver,
            pretty: true,
        }
    }

    /// Write human-readable JSON with indentation (default: pretty).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Finish configuration.
    pub fn build(self) -> DocumentStore<D> {
        let serializer = if self.pretty {
            JsonSerializer::pretty()
        } else {
            JsonSerializer::new()
        };
        DocumentStore {
            driver: self.driver,
            serializer,
        }
    }
}

impl<D> std::fmt::Debug for DocumentStoreBuilder<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStoreBuilder")
            .field("pretty", &self.pretty)
            .finish_non_exhaustive()
    }
}
