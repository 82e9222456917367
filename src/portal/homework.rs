//! Setting homework, submitting work, and fetching the stored files.

use super::{Portal, Session};
use crate::driver::StorageDriver;
use crate::error::{Error, Result};
use crate::model::{new_id, timestamp, Homework, Submission};
use crate::uploads::{allowed_file, Upload, UploadArea};
use log::info;
use serde::Deserialize;
use serde_json::Map;

/// Fields a teacher fills in when setting homework.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HomeworkForm {
    /// Short title.
    pub title: Option<String>,
    /// Free-text instructions.
    pub description: Option<String>,
    /// Class the homework is for.
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    /// Due date, kept as entered.
    pub due_date: Option<String>,
    /// Expiry date, kept as entered.
    pub expiry_date: Option<String>,
}

impl<D: StorageDriver> Portal<D> {
    /// Create homework as the logged-in teacher, with an optional
    /// attachment from the allow-listed types.
    pub fn create_homework(
        &self,
        session: &Session,
        form: HomeworkForm,
        attachment: Option<&Upload>,
    ) -> Result<Homework> {
        let teacher = self.require_teacher(session)?;

        let attachment = attachment.filter(|a| !a.filename.is_empty());
        if let Some(upload) = attachment {
            if !allowed_file(&upload.filename) {
                return Err(Error::DisallowedFile(upload.filename.clone()));
            }
        }
        let file = match attachment {
            Some(upload) => Some(self.uploads.save(UploadArea::Homework, None, upload)?.stored_name),
            None => None,
        };

        let homework = Homework {
            id: new_id(),
            teacher_id: Some(teacher.id),
            title: form.title,
            description: form.description,
            class_name: form.class_name,
            due_date: form.due_date,
            expiry_date: form.expiry_date,
            file,
            created_at: Some(timestamp()),
            extra: Map::new(),
        };
        self.store.collection::<Homework>().append(homework.clone());
        info!("homework {} created", homework.id);
        Ok(homework)
    }

    /// Record a submission by the logged-in student.
    ///
    /// The homework id is not checked against `homework.json`; repeated
    /// submissions each get their own record.
    pub fn submit_homework(
        &self,
        session: &Session,
        homework_id: &str,
        upload: Option<&Upload>,
    ) -> Result<Submission> {
        let student = self.require_student(session)?;
        let upload = upload
            .filter(|u| !u.filename.is_empty())
            .ok_or(Error::MissingFile)?;
        if !allowed_file(&upload.filename) {
            return Err(Error::DisallowedFile(upload.filename.clone()));
        }
        let stored = self.uploads.save(UploadArea::Submissions, None, upload)?;

        let submission = Submission {
            id: new_id(),
            homework_id: Some(homework_id.to_string()),
            student_id: Some(student.id),
            filename: Some(stored.stored_name),
            original_name: Some(stored.original_name),
            uploaded_at: Some(timestamp()),
            extra: Map::new(),
        };
        self.store
            .collection::<Submission>()
            .append(submission.clone());
        info!("submission {} for homework {homework_id}", submission.id);
        Ok(submission)
    }

    /// Bytes of a homework attachment. Open to anyone.
    pub fn homework_file(&self, name: &str) -> Result<Vec<u8>> {
        self.uploads.open(UploadArea::Homework, name)
    }

    /// Bytes of a submitted file. Teachers only.
    pub fn submission_file(&self, session: &Session, name: &str) -> Result<Vec<u8>> {
        self.require_teacher(session)?;
        self.uploads.open(UploadArea::Submissions, name)
    }
}
