//! Record types for every collection the portal persists.
//!
//! Records are loosely typed on disk: ids may be strings or numbers, fields
//! may be missing or null, and hand-edited files may carry extra keys. The
//! types here read all scalar fields as text, keep unknown keys in `extra`,
//! and write them back unchanged.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A record type stored as one JSON document.
pub trait Collection: Serialize + DeserializeOwned + Clone {
    /// Document name under the data directory.
    const FILE_NAME: &'static str;

    /// Records written when the document is missing or corrupt.
    fn defaults() -> Vec<Self> {
        Vec::new()
    }

    /// The record's id, compared as text.
    fn id(&self) -> &str;
}

/// Fresh random record id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current UTC time, ISO-8601 without an offset
/// (`2024-05-01T09:30:00.123456`).
pub fn timestamp() -> String {
    Utc::now()
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// An admitted student.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Record id.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    /// Full name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    /// Father's name; parents log in with it.
    #[serde(default, deserialize_with = "lenient_text")]
    pub father_name: Option<String>,
    /// Class the student is in.
    #[serde(rename = "class", default, deserialize_with = "lenient_text")]
    pub class_name: Option<String>,
    /// School attended before admission.
    #[serde(default, deserialize_with = "lenient_text")]
    pub previous_school: Option<String>,
    /// Contact phone number.
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    /// Email address; a student login identifier.
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    /// National identity number; a student login identifier.
    #[serde(default, deserialize_with = "lenient_text")]
    pub cnic: Option<String>,
    /// Photo path relative to the base directory.
    #[serde(default, deserialize_with = "lenient_text")]
    pub photo: Option<String>,
    /// Stored in plain text.
    #[serde(default, deserialize_with = "lenient_text")]
    pub password: Option<String>,
    /// When the record was created.
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    /// Fields this type does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Collection for Student {
    const FILE_NAME: &'static str = "students.json";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A teacher, serving one class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    /// Record id.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    /// Login name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub username: Option<String>,
    /// Email address, also accepted at login.
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    /// Stored in plain text.
    #[serde(default, deserialize_with = "lenient_text")]
    pub password: Option<String>,
    /// Class the teacher serves.
    #[serde(rename = "class", default, deserialize_with = "lenient_text")]
    pub class_name: Option<String>,
    /// Fields this type does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Collection for Teacher {
    const FILE_NAME: &'static str = "teachers.json";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A portal administrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    /// Record id.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    /// Login name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub username: Option<String>,
    /// Email address, also accepted at login.
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    /// Stored in plain text.
    #[serde(default, deserialize_with = "lenient_text")]
    pub password: Option<String>,
    /// Fields this type does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Collection for Admin {
    const FILE_NAME: &'static str = "admin.json";

    /// One seeded account so a fresh install can log in.
    fn defaults() -> Vec<Self> {
        vec![Admin {
            id: "admin".into(),
            username: Some("admin".into()),
            email: Some("admin@example.com".into()),
            password: Some("admin123".into()),
            extra: Map::new(),
        }]
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Homework set by a teacher for a class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Homework {
    /// Record id.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    /// Id of the teacher who set it.
    #[serde(default, deserialize_with = "lenient_text")]
    pub teacher_id: Option<String>,
    /// Short title.
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    /// Free-text instructions.
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    /// Class the homework is for.
    #[serde(rename = "class", default, deserialize_with = "lenient_text")]
    pub class_name: Option<String>,
    /// Due date as entered.
    #[serde(default, deserialize_with = "lenient_text")]
    pub due_date: Option<String>,
    /// Expiry date as entered.
    #[serde(default, deserialize_with = "lenient_text")]
    pub expiry_date: Option<String>,
    /// Stored attachment name under `uploads/homework/`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub file: Option<String>,
    /// When the record was created.
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    /// Fields this type does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Collection for Homework {
    const FILE_NAME: &'static str = "homework.json";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One upload event. A student may submit the same homework many times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Record id.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    /// Homework this answers. Not checked against `homework.json`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub homework_id: Option<String>,
    /// Id of the submitting student.
    #[serde(default, deserialize_with = "lenient_text")]
    pub student_id: Option<String>,
    /// Stored name under `uploads/submissions/`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub filename: Option<String>,
    /// Sanitized client file name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub original_name: Option<String>,
    /// When the file was received.
    #[serde(default, deserialize_with = "lenient_text")]
    pub uploaded_at: Option<String>,
    /// Fields this type does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Collection for Submission {
    const FILE_NAME: &'static str = "submissions.json";

    fn id(&self) -> &str {
        &self.id
    }
}

/// An admission request waiting for an admin decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingAdmission {
    /// Record id.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    /// Applicant's full name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    /// Applicant's father's name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub father_name: Option<String>,
    /// Class applied for.
    #[serde(rename = "class", default, deserialize_with = "lenient_text")]
    pub class_name: Option<String>,
    /// School attended before applying.
    #[serde(default, deserialize_with = "lenient_text")]
    pub previous_school: Option<String>,
    /// Contact phone number.
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    /// Contact email address.
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    /// National identity number.
    #[serde(default, deserialize_with = "lenient_text")]
    pub cnic: Option<String>,
    /// Photo path relative to the base directory.
    #[serde(default, deserialize_with = "lenient_text")]
    pub photo: Option<String>,
    /// When the request was made.
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    /// Password chosen on the form, or the default.
    #[serde(default, deserialize_with = "lenient_text")]
    pub password: Option<String>,
    /// Fields this type does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Collection for PendingAdmission {
    const FILE_NAME: &'static str = "admissions-pending.json";

    fn id(&self) -> &str {
        &self.id
    }
}
