//! Admission requests and the admin decision on them.

use super::{Portal, Role, Session};
use crate::driver::StorageDriver;
use crate::error::{Error, Result};
use crate::model::{new_id, timestamp, PendingAdmission, Student};
use crate::uploads::{Upload, UploadArea};
use log::info;
use serde::Deserialize;
use serde_json::Map;

/// Password given to accepted students, and to applicants who leave the
/// password field blank.
pub(crate) const DEFAULT_STUDENT_PASSWORD: &str = "changeme";

/// Fields of the public admission form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AdmissionForm {
    /// Applicant's full name.
    pub name: Option<String>,
    /// Father's name, later used for parent login.
    pub father_name: Option<String>,
    /// Class applied for.
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    /// School attended before applying.
    pub previous_school: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Contact email address.
    pub email: Option<String>,
    /// National identity number.
    pub cnic: Option<String>,
    /// Blank or absent means `changeme`.
    pub password: Option<String>,
}

/// What an admin does with a pending admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Admit as a student.
    Accept,
    /// Drop the request.
    Decline,
}

impl AdmissionDecision {
    /// `"accept"` accepts; any other action declines.
    pub fn from_action(action: &str) -> Self {
        if action == "accept" {
            AdmissionDecision::Accept
        } else {
            AdmissionDecision::Decline
        }
    }
}

impl<D: StorageDriver> Portal<D> {
    /// Queue an admission request. A photo, if given, is stored in the
    /// homework upload area and recorded by its path relative to the base
    /// directory.
    pub fn submit_admission(
        &self,
        form: AdmissionForm,
        photo: Option<&Upload>,
    ) -> Result<PendingAdmission> {
        let photo = match photo.filter(|p| !p.filename.is_empty()) {
            Some(upload) => {
                let stored = self
                    .uploads
                    .save(UploadArea::Homework, Some("admission"), upload)?;
                Some(self.uploads.display_path(&stored.path))
            }
            None => None,
        };
        let password = form
            .password
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_STUDENT_PASSWORD.to_string());

        let record = PendingAdmission {
            id: new_id(),
            name: form.name,
            father_name: form.father_name,
            class_name: form.class_name,
            previous_school: form.previous_school,
            phone: form.phone,
            email: form.email,
            cnic: form.cnic,
            photo,
            created_at: Some(timestamp()),
            password: Some(password),
            extra: Map::new(),
        };
        self.store
            .collection::<PendingAdmission>()
            .append(record.clone());
        info!("admission {} submitted", record.id);
        Ok(record)
    }

    /// Accept or decline a pending admission (admin only).
    ///
    /// Accepting creates a student with a fresh id and the default password,
    /// then drops the pending record. Returns the new student on accept.
    pub fn decide_admission(
        &self,
        session: &Session,
        admission_id: &str,
        decision: AdmissionDecision,
    ) -> Result<Option<Student>> {
        self.require_role(session, Role::Admin)?;

        let pending = self.store.collection::<PendingAdmission>();
        let item = pending
            .find(admission_id)
            .ok_or_else(|| Error::NotFound(format!("admission {admission_id}")))?;

        let student = match decision {
            AdmissionDecision::Accept => {
                let student = Student {
                    id: new_id(),
                    name: item.name,
                    father_name: item.father_name,
                    class_name: item.class_name,
                    previous_school: item.previous_school,
                    phone: item.phone,
                    email: item.email,
                    cnic: item.cnic,
                    photo: item.photo,
                    password: Some(DEFAULT_STUDENT_PASSWORD.to_string()),
                    created_at: Some(timestamp()),
                    extra: Map::new(),
                };
                self.store.collection::<Student>().append(student.clone());
                info!("admission {admission_id} accepted as student {}", student.id);
                Some(student)
            }
            AdmissionDecision::Decline => {
                info!("admission {admission_id} declined");
                None
            }
        };

        pending.remove_where(|p| p.id == admission_id);
        Ok(student)
    }
}
