//! Crash-tolerant JSON collection store, and the school portal services
//! built on it.
//!
//! Every collection (students, teachers, admins, homework, submissions,
//! pending admissions) is one JSON document. Loading never fails: missing or
//! corrupt documents are replaced by defaults, and lists wrapped in an
//! object are unwrapped. Saving replaces the document atomically, falling
//! back to a plain write if the atomic path fails.
//!
//! ```rust,no_run
//! use school_portal_store::{Portal, PortalConfig, AdmissionForm};
//!
//! let portal = Portal::open(&PortalConfig::new("/srv/school")).unwrap();
//! let form = AdmissionForm { name: Some("Ali".into()), ..Default::default() };
//! portal.submit_admission(form, None).unwrap();
//!
//! let admin = portal.login("admin", "admin", "admin123").unwrap();
//! let dash = portal.admin_dashboard(&admin).unwrap();
//! println!("{} pending", dash.pending.len());
//! ```
//!
//! **Single-process only.** Each operation loads whole collections and saves
//! them back without locking, so overlapping writers to one collection are
//! last-write-wins, and several processes sharing a data directory will
//! clobber each other.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod driver;
pub mod error;
pub mod model;
pub mod persist;
pub mod portal;
pub mod repository;
pub mod serializer;
pub mod store;
pub mod uploads;

pub use config::PortalConfig;
pub use driver::{FsDriver, MemoryDriver, StorageDriver};
pub use error::{Error, Result};
pub use model::{Admin, Collection, Homework, PendingAdmission, Student, Submission, Teacher};
pub use portal::{AdmissionDecision, AdmissionForm, HomeworkForm, Portal, Role, Session};
pub use repository::{IdIndex, Repository};
pub use store::{DocumentStore, DocumentStoreBuilder};
pub use uploads::{Upload, UploadArea, UploadStore};
