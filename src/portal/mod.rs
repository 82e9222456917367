//! School portal services: the request-handling logic that sits on top of
//! the document store.
//!
//! Every operation loads the collections it needs, works on them in memory,
//! and writes whole collections back. Nothing is locked between the load and
//! the save, so two overlapping operations on one collection are
//! last-write-wins.

mod admissions;
mod auth;
mod dashboard;
mod homework;

pub use admissions::{AdmissionDecision, AdmissionForm};
pub use auth::{CurrentUser, Role, Session};
pub use dashboard::{
    AdminDashboard, HomeworkStatus, ParentDashboard, StudentDashboard, StudentProgress,
    TeacherActivity, TeacherDashboard, TeacherHomework,
};
pub use homework::HomeworkForm;

use crate::config::PortalConfig;
use crate::driver::{FsDriver, StorageDriver};
use crate::error::Result;
use crate::model::{Admin, Collection, Homework, PendingAdmission, Student, Submission, Teacher};
use crate::store::DocumentStore;
use crate::uploads::UploadStore;
use log::info;
use serde_json::{json, Value};

/// Portal services over a document store and an upload directory.
pub struct Portal<D = FsDriver> {
    store: DocumentStore<D>,
    uploads: UploadStore,
}

impl Portal<FsDriver> {
    /// Open the portal on the file system layout described by `config`,
    /// creating directories and default documents as needed.
    pub fn open(config: &PortalConfig) -> Result<Self> {
        let driver = FsDriver::new(config.data_dir())?;
        Self::with_driver(config, driver)
    }
}

impl<D: StorageDriver> Portal<D> {
    /// Open the portal with collections kept in `driver`. Uploads still go
    /// to `config.upload_dir()`.
    pub fn with_driver(config: &PortalConfig, driver: D) -> Result<Self> {
        let store = DocumentStore::builder(driver)
            .pretty(config.is_pretty())
            .build();
        let uploads = UploadStore::new(config.base_dir(), config.upload_dir())?;
        let portal = Self { store, uploads };
        portal.init();
        Ok(portal)
    }

    /// Touch every collection so missing or corrupt documents are replaced
    /// by their defaults (one seeded admin, empty lists elsewhere).
    pub fn init(&self) {
        self.store.collection::<Student>().load();
        self.store.collection::<Teacher>().load();
        self.store.collection::<Admin>().load();
        self.store.collection::<Homework>().load();
        self.store.collection::<Submission>().load();
        self.store.collection::<PendingAdmission>().load();
        info!(
            "portal collections ready ({}, {}, {}, {}, {}, {})",
            Student::FILE_NAME,
            Teacher::FILE_NAME,
            Admin::FILE_NAME,
            Homework::FILE_NAME,
            Submission::FILE_NAME,
            PendingAdmission::FILE_NAME,
        );
    }

    /// The underlying store.
    pub fn store(&self) -> &DocumentStore<D> {
        &self.store
    }

    /// The upload directories.
    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    /// Liveness payload.
    pub fn status(&self) -> Value {
        json!({ "ok": true })
    }
}

impl<D> std::fmt::Debug for Portal<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Portal")
            .field("store", &self.store)
            .field("uploads", &self.uploads)
            .finish()
    }
}
