//! Per-role dashboards assembled from several collections.

use super::{Portal, Role, Session};
use crate::driver::StorageDriver;
use crate::error::{Error, Result};
use crate::model::{Homework, PendingAdmission, Student, Submission, Teacher};
use crate::repository::{group_by, IdIndex};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Homework plus whether a given student has submitted it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeworkStatus {
    /// The homework record.
    #[serde(flatten)]
    pub homework: Homework,
    /// At least one submission exists.
    pub submitted: bool,
}

/// What a teacher sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherDashboard {
    /// The logged-in teacher.
    pub teacher: Teacher,
    /// Every student, regardless of class.
    pub students: Vec<Student>,
    /// Homework this teacher set.
    pub homeworks: Vec<Homework>,
    /// Submissions for any of this teacher's homework.
    pub submissions: Vec<Submission>,
}

/// What a student sees: homework for their class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentDashboard {
    /// The logged-in student.
    pub student: Student,
    /// Homework for the student's class.
    pub homeworks: Vec<HomeworkStatus>,
}

/// One row of the admin's student table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentProgress {
    /// The student.
    pub student: Student,
    /// Homework set for the student's class.
    pub total_hw: usize,
    /// Submission events by the student, repeats included.
    pub submitted: usize,
}

/// One row of the admin's teacher table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherActivity {
    /// The teacher.
    pub teacher: Teacher,
    /// Homework records naming this teacher.
    pub homeworks_given: usize,
}

/// What an admin sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminDashboard {
    /// Every student with their progress.
    pub students: Vec<StudentProgress>,
    /// Every teacher with their homework count.
    pub teachers: Vec<TeacherActivity>,
    /// Admission requests awaiting a decision.
    pub pending: Vec<PendingAdmission>,
}

/// A teacher of the child's class, with all of that teacher's homework.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherHomework {
    /// The teacher record.
    #[serde(flatten)]
    pub teacher: Teacher,
    /// That teacher's homework, flagged for the child.
    pub homeworks: Vec<HomeworkStatus>,
}

/// What a parent sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentDashboard {
    /// The child's name as of login.
    pub child_name: Option<String>,
    /// Teachers of the child's class.
    pub teachers: Vec<TeacherHomework>,
}

/// Ids of homework that `student_id` has submitted at least once.
fn submitted_by<'a>(submissions: &'a [Submission], student_id: &str) -> HashSet<&'a str> {
    submissions
        .iter()
        .filter(|s| s.student_id.as_deref() == Some(student_id))
        .filter_map(|s| s.homework_id.as_deref())
        .collect()
}

fn count_by<'a, T, F>(records: &'a [T], key: F) -> HashMap<&'a str, usize>
where
    F: Fn(&'a T) -> Option<&'a str>,
{
    let mut counts = HashMap::new();
    for record in records {
        if let Some(k) = key(record) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }
    counts
}

impl<D: StorageDriver> Portal<D> {
    /// Dashboard for the logged-in teacher.
    pub fn teacher_dashboard(&self, session: &Session) -> Result<TeacherDashboard> {
        let teacher = self.require_teacher(session)?;
        let students = self.store.collection::<Student>().load();
        let homeworks: Vec<Homework> = self
            .store
            .collection::<Homework>()
            .load()
            .into_iter()
            .filter(|h| h.teacher_id.as_deref() == Some(teacher.id.as_str()))
            .collect();
        let own = IdIndex::build(&homeworks);
        let submissions: Vec<Submission> = self
            .store
            .collection::<Submission>()
            .load()
            .into_iter()
            .filter(|s| s.homework_id.as_deref().map_or(false, |id| own.contains(id)))
            .collect();

        Ok(TeacherDashboard {
            teacher,
            students,
            homeworks,
            submissions,
        })
    }

    /// Dashboard for the logged-in student.
    pub fn student_dashboard(&self, session: &Session) -> Result<StudentDashboard> {
        let student = self.require_student(session)?;
        let submissions = self.store.collection::<Submission>().load();
        let done = submitted_by(&submissions, &student.id);
        let homeworks: Vec<HomeworkStatus> = self
            .store
            .collection::<Homework>()
            .load()
            .into_iter()
            .filter(|h| h.class_name == student.class_name)
            .map(|h| HomeworkStatus {
                submitted: done.contains(h.id.as_str()),
                homework: h,
            })
            .collect();

        Ok(StudentDashboard { student, homeworks })
    }

    /// Per-student progress, per-teacher activity and the admission queue.
    pub fn admin_dashboard(&self, session: &Session) -> Result<AdminDashboard> {
        self.require_role(session, Role::Admin)?;
        let students = self.store.collection::<Student>().load();
        let teachers = self.store.collection::<Teacher>().load();
        let homework = self.store.collection::<Homework>().load();
        let submissions = self.store.collection::<Submission>().load();
        let pending = self.store.collection::<PendingAdmission>().load();

        let mut per_class: HashMap<Option<&str>, usize> = HashMap::new();
        for h in &homework {
            *per_class.entry(h.class_name.as_deref()).or_insert(0) += 1;
        }
        let per_student = count_by(&submissions, |s| s.student_id.as_deref());
        let per_teacher = count_by(&homework, |h| h.teacher_id.as_deref());

        let students: Vec<StudentProgress> = students
            .into_iter()
            .map(|s| StudentProgress {
                total_hw: per_class.get(&s.class_name.as_deref()).copied().unwrap_or(0),
                submitted: per_student.get(s.id.as_str()).copied().unwrap_or(0),
                student: s,
            })
            .collect();
        let teachers: Vec<TeacherActivity> = teachers
            .into_iter()
            .map(|t| TeacherActivity {
                homeworks_given: per_teacher.get(t.id.as_str()).copied().unwrap_or(0),
                teacher: t,
            })
            .collect();

        Ok(AdminDashboard {
            students,
            teachers,
            pending,
        })
    }

    /// Teachers of the child's class and how the child is doing on each
    /// piece of their homework.
    pub fn parent_dashboard(&self, session: &Session) -> Result<ParentDashboard> {
        let Session::Parent {
            child_id,
            child_name,
            child_class,
        } = session
        else {
            return Err(Error::Unauthorized("parent login required".into()));
        };

        let homework = self.store.collection::<Homework>().load();
        let submissions = self.store.collection::<Submission>().load();
        let by_teacher = group_by(&homework, |h| h.teacher_id.as_deref());
        let done = submitted_by(&submissions, child_id);

        let teachers: Vec<TeacherHomework> = self
            .store
            .collection::<Teacher>()
            .load()
            .into_iter()
            .filter(|t| t.class_name == *child_class)
            .map(|teacher| {
                let homeworks: Vec<HomeworkStatus> = by_teacher
                    .get(&Some(teacher.id.as_str()))
                    .map(|list| {
                        list.iter()
                            .map(|h| HomeworkStatus {
                                homework: (*h).clone(),
                                submitted: done.contains(h.id.as_str()),
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                TeacherHomework { teacher, homeworks }
            })
            .collect();

        Ok(ParentDashboard {
            child_name: child_name.clone(),
            teachers,
        })
    }
}
