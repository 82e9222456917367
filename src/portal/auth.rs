//! Logins, sessions and role checks.

use super::Portal;
use crate::driver::StorageDriver;
use crate::error::{Error, Result};
use crate::model::{Admin, Student, Teacher};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Roles that log in with an identifier and password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Logs in with cnic or email.
    Student,
    /// Logs in with username or email.
    Teacher,
    /// Logs in with username or email.
    Admin,
}

impl Role {
    /// Lowercase name, as used in login paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            other => Err(Error::UnknownRole(other.to_string())),
        }
    }
}

/// Cross-request login state. Opaque to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Session {
    /// A student, teacher or admin, identified by record id.
    Staff {
        /// Which collection `user_id` points into.
        kind: Role,
        /// Record id of the logged-in user.
        user_id: String,
    },
    /// A parent, logged in on behalf of one child.
    Parent {
        /// Student record id.
        child_id: String,
        /// Student name at login time.
        child_name: Option<String>,
        /// Student class at login time.
        child_class: Option<String>,
    },
}

impl Session {
    /// Role of a staff session; `None` for parents.
    pub fn role(&self) -> Option<Role> {
        match self {
            Session::Staff { kind, .. } => Some(*kind),
            Session::Parent { .. } => None,
        }
    }
}

/// The record behind a staff session.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentUser {
    /// A student session.
    Student(Student),
    /// A teacher session.
    Teacher(Teacher),
    /// An admin session.
    Admin(Admin),
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("").trim()
}

fn password_matches(stored: &Option<String>, given: &str) -> bool {
    stored.as_deref().unwrap_or("") == given
}

impl<D: StorageDriver> Portal<D> {
    /// Log in as `role` ("student", "teacher" or "admin").
    ///
    /// Identifier and password are trimmed. Students match on cnic or email,
    /// teachers and admins on username or email; the password must always
    /// match as well.
    pub fn login(&self, role: &str, identifier: &str, password: &str) -> Result<Session> {
        let role: Role = role.parse()?;
        let identifier = identifier.trim();
        let password = password.trim();

        let user_id = match role {
            Role::Student => self
                .store
                .collection::<Student>()
                .load()
                .into_iter()
                .find(|s| {
                    password_matches(&s.password, password)
                        && (field(&s.cnic) == identifier || field(&s.email) == identifier)
                })
                .map(|s| s.id),
            Role::Teacher => self
                .store
                .collection::<Teacher>()
                .load()
                .into_iter()
                .find(|t| {
                    (field(&t.username) == identifier || field(&t.email) == identifier)
                        && password_matches(&t.password, password)
                })
                .map(|t| t.id),
            Role::Admin => self
                .store
                .collection::<Admin>()
                .load()
                .into_iter()
                .find(|a| {
                    (field(&a.username) == identifier || field(&a.email) == identifier)
                        && password_matches(&a.password, password)
                })
                .map(|a| a.id),
        };

        match user_id {
            Some(user_id) => {
                info!("{role} {user_id} logged in");
                Ok(Session::Staff {
                    kind: role,
                    user_id,
                })
            }
            None => {
                debug!("rejected {role} login for {identifier:?}");
                Err(Error::InvalidCredentials)
            }
        }
    }

    /// Log in as the parent of the student whose father name matches
    /// (trimmed, case-insensitive) and whose password matches exactly.
    pub fn parent_login(&self, father_name: &str, password: &str) -> Result<Session> {
        let father_name = father_name.trim().to_lowercase();
        let password = password.trim();
        let child = self
            .store
            .collection::<Student>()
            .load()
            .into_iter()
            .find(|s| {
                field(&s.father_name).to_lowercase() == father_name
                    && password_matches(&s.password, password)
            })
            .ok_or(Error::InvalidCredentials)?;
        info!("parent of student {} logged in", child.id);
        Ok(Session::Parent {
            child_id: child.id,
            child_name: child.name,
            child_class: child.class_name,
        })
    }

    /// Re-read the record behind a staff session. `None` for parents and for
    /// users deleted since login.
    pub fn current_user(&self, session: &Session) -> Option<CurrentUser> {
        let Session::Staff { kind, user_id } = session else {
            return None;
        };
        match kind {
            Role::Student => self
                .store
                .collection::<Student>()
                .find(user_id)
                .map(CurrentUser::Student),
            Role::Teacher => self
                .store
                .collection::<Teacher>()
                .find(user_id)
                .map(CurrentUser::Teacher),
            Role::Admin => self
                .store
                .collection::<Admin>()
                .find(user_id)
                .map(CurrentUser::Admin),
        }
    }

    pub(crate) fn require_role(&self, session: &Session, role: Role) -> Result<()> {
        if session.role() == Some(role) {
            Ok(())
        } else {
            Err(Error::Unauthorized(format!("{role} login required")))
        }
    }

    pub(crate) fn require_teacher(&self, session: &Session) -> Result<Teacher> {
        self.require_role(session, Role::Teacher)?;
        match self.current_user(session) {
            Some(CurrentUser::Teacher(t)) => Ok(t),
            _ => Err(Error::Unauthorized("teacher account not found".into())),
        }
    }

    pub(crate) fn require_student(&self, session: &Session) -> Result<Student> {
        self.require_role(session, Role::Student)?;
        match self.current_user(session) {
            Some(CurrentUser::Student(s)) => Ok(s),
            _ => Err(Error::Unauthorized("student account not found".into())),
        }
    }
}
