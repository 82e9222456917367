use school_portal_store::portal::CurrentUser;
use school_portal_store::{
    AdmissionDecision, AdmissionForm, Collection, Error, Homework, HomeworkForm, PendingAdmission,
    Portal, PortalConfig, Session, Student, Submission, Teacher, Upload,
};
use serde_json::json;
use tempfile::TempDir;

fn open(dir: &TempDir) -> Portal {
    Portal::open(&PortalConfig::new(dir.path())).unwrap()
}

fn seed_teacher(portal: &Portal, id: &str, username: &str, class: &str) {
    portal.store().collection::<Teacher>().append(Teacher {
        id: id.into(),
        username: Some(username.into()),
        email: Some(format!("{username}@school.test")),
        password: Some("pw".into()),
        class_name: Some(class.into()),
        ..Default::default()
    });
}

fn seed_student(portal: &Portal, id: &str, name: &str, class: &str) {
    portal.store().collection::<Student>().append(Student {
        id: id.into(),
        name: Some(name.into()),
        father_name: Some(format!("{name} Senior")),
        class_name: Some(class.into()),
        email: Some(format!("{}@school.test", name.to_lowercase())),
        cnic: Some(format!("cnic-{id}")),
        password: Some("changeme".into()),
        ..Default::default()
    });
}

fn admin(portal: &Portal) -> Session {
    portal.login("admin", "admin", "admin123").unwrap()
}

fn staff(kind: school_portal_store::Role, user_id: &str) -> Session {
    Session::Staff {
        kind,
        user_id: user_id.into(),
    }
}

// ---- init ---------------------------------------------------------------------

#[test]
fn open_materializes_every_collection() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    let data = dir.path().join("data");
    for name in [
        "students.json",
        "teachers.json",
        "homework.json",
        "submissions.json",
        "admissions-pending.json",
    ] {
        assert_eq!(std::fs::read_to_string(data.join(name)).unwrap(), "[]", "{name}");
    }
    let admins: serde_json::Value =
        serde_json::from_slice(&std::fs::read(data.join("admin.json")).unwrap()).unwrap();
    assert_eq!(
        admins,
        json!([{"id": "admin", "username": "admin", "email": "admin@example.com", "password": "admin123"}])
    );
    assert!(dir.path().join("uploads/homework").is_dir());
    assert!(dir.path().join("uploads/submissions").is_dir());
    assert_eq!(portal.status(), json!({"ok": true}));
}

#[test]
fn reopening_keeps_existing_data() {
    let dir = tempfile::tempdir().unwrap();
    seed_teacher(&open(&dir), "t1", "khan", "5");
    let portal = open(&dir);
    assert_eq!(portal.store().collection::<Teacher>().load().len(), 1);
}

// ---- admissions ---------------------------------------------------------------

#[test]
fn accepted_admission_becomes_a_student() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    let form = AdmissionForm {
        name: Some("Ali".into()),
        father_name: Some("Akbar".into()),
        class_name: Some("5".into()),
        password: Some("secret".into()),
        ..Default::default()
    };
    let pending = portal.submit_admission(form, None).unwrap();
    assert_eq!(pending.password.as_deref(), Some("secret"));

    let student = portal
        .decide_admission(&admin(&portal), &pending.id, AdmissionDecision::Accept)
        .unwrap()
        .unwrap();

    let students = portal.store().collection::<Student>().load();
    let alis: Vec<_> = students.iter().filter(|s| s.name.as_deref() == Some("Ali")).collect();
    assert_eq!(alis.len(), 1);
    assert_eq!(alis[0].password.as_deref(), Some("changeme"));
    assert_eq!(alis[0].class_name.as_deref(), Some("5"));
    assert_eq!(alis[0].id, student.id);
    assert_ne!(student.id, pending.id);

    let left = portal.store().collection::<PendingAdmission>().load();
    assert!(left.iter().all(|p| p.id != pending.id));
}

#[test]
fn declined_admission_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    let pending = portal
        .submit_admission(AdmissionForm::default(), None)
        .unwrap();
    let created = portal
        .decide_admission(
            &admin(&portal),
            &pending.id,
            AdmissionDecision::from_action("decline"),
        )
        .unwrap();
    assert!(created.is_none());
    assert!(portal.store().collection::<PendingAdmission>().load().is_empty());
    assert!(portal.store().collection::<Student>().load().is_empty());
}

#[test]
fn blank_password_defaults_to_changeme() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    let form = AdmissionForm {
        password: Some(String::new()),
        ..Default::default()
    };
    let pending = portal.submit_admission(form, None).unwrap();
    assert_eq!(pending.password.as_deref(), Some("changeme"));
    assert!(pending.created_at.is_some());
}

#[test]
fn admission_photo_is_stored_with_relative_path() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    let photo = Upload::new("my face.jpg", b"jpeg".to_vec());
    let pending = portal
        .submit_admission(AdmissionForm::default(), Some(&photo))
        .unwrap();
    let path = pending.photo.unwrap();
    assert!(path.starts_with("uploads/homework/admission-"), "{path}");
    assert!(path.ends_with("-my_face.jpg"));
    assert_eq!(std::fs::read(dir.path().join(&path)).unwrap(), b"jpeg");
}

#[test]
fn accepting_leaves_existing_students_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    let existing = vec![
        json!({"id": 7, "name": "Old", "class": 5, "password": "pw"}),
        json!({"id": "s2", "photo": {"path": "a.jpg"}}),
    ];
    portal.store().save(Student::FILE_NAME, &existing);

    let form = AdmissionForm {
        name: Some("Ali".into()),
        ..Default::default()
    };
    let pending = portal.submit_admission(form, None).unwrap();
    portal
        .decide_admission(&admin(&portal), &pending.id, AdmissionDecision::Accept)
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("data/students.json")).unwrap())
            .unwrap();
    assert_eq!(raw[0], existing[0]);
    assert_eq!(raw[1], existing[1]);
    assert_eq!(raw[2]["name"], "Ali");
    assert_eq!(raw.as_array().unwrap().len(), 3);
}

#[test]
fn deciding_requires_admin_and_known_id() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    let pending = portal
        .submit_admission(AdmissionForm::default(), None)
        .unwrap();

    let err = portal
        .decide_admission(&admin(&portal), "nope", AdmissionDecision::Accept)
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let teacher = staff(school_portal_store::Role::Teacher, "t1");
    let err = portal
        .decide_admission(&teacher, &pending.id, AdmissionDecision::Accept)
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
    assert_eq!(portal.store().collection::<PendingAdmission>().load().len(), 1);
}

// ---- login --------------------------------------------------------------------

#[test]
fn teacher_logs_in_by_username_or_email() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    seed_teacher(&portal, "t1", "khan", "5");

    for id in ["khan", " khan@school.test "] {
        let session = portal.login("teacher", id, " pw ").unwrap();
        assert_eq!(session, staff(school_portal_store::Role::Teacher, "t1"));
    }
    assert_eq!(
        portal.login("teacher", "khan", "wrong").unwrap_err(),
        Error::InvalidCredentials
    );
    assert!(matches!(
        portal.login("janitor", "khan", "pw"),
        Err(Error::UnknownRole(_))
    ));
}

#[test]
fn student_login_always_checks_password() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    seed_student(&portal, "s1", "Ali", "5");

    assert!(portal.login("student", "cnic-s1", "changeme").is_ok());
    assert!(portal.login("student", "ali@school.test", "changeme").is_ok());
    assert_eq!(
        portal.login("student", "cnic-s1", "wrong").unwrap_err(),
        Error::InvalidCredentials
    );
    assert_eq!(
        portal.login("student", "cnic-s1", "").unwrap_err(),
        Error::InvalidCredentials
    );
}

#[test]
fn numeric_ids_in_hand_edited_files_still_match() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    portal.store().save(
        Teacher::FILE_NAME,
        &[json!({"id": 17, "username": "num", "password": 1234, "class": 5})],
    );
    let session = portal.login("teacher", "num", "1234").unwrap();
    match portal.current_user(&session) {
        Some(CurrentUser::Teacher(t)) => {
            assert_eq!(t.id, "17");
            assert_eq!(t.class_name.as_deref(), Some("5"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn parent_login_matches_father_name_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    seed_student(&portal, "s1", "Ali", "5");

    let session = portal.parent_login("  ali SENIOR ", "changeme").unwrap();
    assert_eq!(
        session,
        Session::Parent {
            child_id: "s1".into(),
            child_name: Some("Ali".into()),
            child_class: Some("5".into()),
        }
    );
    assert_eq!(
        portal.parent_login("Ali Senior", "nope").unwrap_err(),
        Error::InvalidCredentials
    );
    assert!(portal.current_user(&session).is_none());
}

#[test]
fn deleted_user_has_no_current_user() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    seed_teacher(&portal, "t1", "khan", "5");
    let session = portal.login("teacher", "khan", "pw").unwrap();
    portal
        .store()
        .collection::<Teacher>()
        .remove_where(|t| t.id == "t1");
    assert!(portal.current_user(&session).is_none());
    assert!(matches!(
        portal.teacher_dashboard(&session),
        Err(Error::Unauthorized(_))
    ));
}

// ---- homework & submissions ---------------------------------------------------

fn homework_form(title: &str, class: &str) -> HomeworkForm {
    HomeworkForm {
        title: Some(title.into()),
        class_name: Some(class.into()),
        due_date: Some("2024-06-01".into()),
        ..Default::default()
    }
}

#[test]
fn homework_attachment_must_be_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    seed_teacher(&portal, "t1", "khan", "5");
    let teacher = portal.login("teacher", "khan", "pw").unwrap();

    let bad = Upload::new("virus.exe", b"MZ".to_vec());
    let err = portal
        .create_homework(&teacher, homework_form("Maths", "5"), Some(&bad))
        .unwrap_err();
    assert!(matches!(err, Error::DisallowedFile(_)));
    assert!(portal.store().collection::<Homework>().load().is_empty());

    let good = Upload::new("sheet.PDF", b"%PDF".to_vec());
    let hw = portal
        .create_homework(&teacher, homework_form("Maths", "5"), Some(&good))
        .unwrap();
    assert_eq!(hw.teacher_id.as_deref(), Some("t1"));
    let file = hw.file.unwrap();
    assert!(file.ends_with("-sheet.PDF"));
    assert_eq!(portal.homework_file(&file).unwrap(), b"%PDF");
}

#[test]
fn homework_without_class_stores_null() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    seed_teacher(&portal, "t1", "khan", "5");
    let teacher = portal.login("teacher", "khan", "pw").unwrap();
    let form = HomeworkForm {
        title: Some("Reading".into()),
        ..Default::default()
    };
    portal.create_homework(&teacher, form, None).unwrap();

    let raw = portal.store().load(Homework::FILE_NAME, &[]);
    assert_eq!(raw[0]["class"], serde_json::Value::Null);
    assert_eq!(raw[0]["file"], serde_json::Value::Null);
}

#[test]
fn only_teachers_create_homework() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    let err = portal
        .create_homework(&admin(&portal), homework_form("x", "5"), None)
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
}

#[test]
fn submissions_validate_the_upload() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    seed_student(&portal, "s1", "Ali", "5");
    let student = portal.login("student", "cnic-s1", "changeme").unwrap();

    assert_eq!(
        portal.submit_homework(&student, "h1", None).unwrap_err(),
        Error::MissingFile
    );
    assert_eq!(
        portal
            .submit_homework(&student, "h1", Some(&Upload::new("", b"x".to_vec())))
            .unwrap_err(),
        Error::MissingFile
    );
    assert!(matches!(
        portal.submit_homework(&student, "h1", Some(&Upload::new("a.docx", b"x".to_vec()))),
        Err(Error::DisallowedFile(_))
    ));
    assert!(portal.store().collection::<Submission>().load().is_empty());
}

#[test]
fn repeated_submissions_are_all_kept() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    seed_student(&portal, "s1", "Ali", "5");
    seed_teacher(&portal, "t1", "khan", "5");
    let student = portal.login("student", "cnic-s1", "changeme").unwrap();
    let teacher = portal.login("teacher", "khan", "pw").unwrap();

    let first = portal
        .submit_homework(&student, "h1", Some(&Upload::new("v1.txt", b"one".to_vec())))
        .unwrap();
    portal
        .submit_homework(&student, "h1", Some(&Upload::new("v2.txt", b"two".to_vec())))
        .unwrap();
    assert_eq!(portal.store().collection::<Submission>().load().len(), 2);
    assert_eq!(first.original_name.as_deref(), Some("v1.txt"));
    assert_eq!(first.student_id.as_deref(), Some("s1"));

    let stored = first.filename.unwrap();
    assert_eq!(portal.submission_file(&teacher, &stored).unwrap(), b"one");
    assert!(matches!(
        portal.submission_file(&student, &stored),
        Err(Error::Unauthorized(_))
    ));
}

// ---- dashboards ---------------------------------------------------------------

struct School {
    _dir: TempDir,
    portal: Portal,
    maths: Homework,
    art: Homework,
}

/// Two teachers of class 5, one of class 6; Ali in class 5 submitted maths twice.
fn school() -> School {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    seed_teacher(&portal, "t1", "khan", "5");
    seed_teacher(&portal, "t2", "butt", "5");
    seed_teacher(&portal, "t3", "shah", "6");
    seed_student(&portal, "s1", "Ali", "5");
    seed_student(&portal, "s2", "Sara", "6");

    let t1 = portal.login("teacher", "khan", "pw").unwrap();
    let t2 = portal.login("teacher", "butt", "pw").unwrap();
    let t3 = portal.login("teacher", "shah", "pw").unwrap();
    let maths = portal.create_homework(&t1, homework_form("Maths", "5"), None).unwrap();
    let art = portal.create_homework(&t2, homework_form("Art", "5"), None).unwrap();
    portal.create_homework(&t3, homework_form("Urdu", "6"), None).unwrap();

    let ali = portal.login("student", "cnic-s1", "changeme").unwrap();
    for _ in 0..2 {
        portal
            .submit_homework(&ali, &maths.id, Some(&Upload::new("m.pdf", b"m".to_vec())))
            .unwrap();
    }
    School {
        _dir: dir,
        portal,
        maths,
        art,
    }
}

#[test]
fn student_dashboard_flags_submitted_homework() {
    let s = school();
    let ali = s.portal.login("student", "cnic-s1", "changeme").unwrap();
    let dash = s.portal.student_dashboard(&ali).unwrap();
    assert_eq!(dash.student.id, "s1");
    let flags: Vec<(&str, bool)> = dash
        .homeworks
        .iter()
        .map(|h| (h.homework.title.as_deref().unwrap(), h.submitted))
        .collect();
    assert_eq!(flags, vec![("Maths", true), ("Art", false)]);

    let v = serde_json::to_value(&dash.homeworks[0]).unwrap();
    assert_eq!(v["submitted"], json!(true));
    assert_eq!(v["class"], json!("5"));
}

#[test]
fn teacher_dashboard_shows_own_homework_and_submissions() {
    let s = school();
    let khan = s.portal.login("teacher", "khan", "pw").unwrap();
    let dash = s.portal.teacher_dashboard(&khan).unwrap();
    assert_eq!(dash.homeworks, vec![s.maths.clone()]);
    assert_eq!(dash.submissions.len(), 2);
    assert_eq!(dash.students.len(), 2);

    let butt = s.portal.login("teacher", "butt", "pw").unwrap();
    let dash = s.portal.teacher_dashboard(&butt).unwrap();
    assert_eq!(dash.homeworks, vec![s.art.clone()]);
    assert!(dash.submissions.is_empty());
}

#[test]
fn admin_dashboard_aggregates() {
    let s = school();
    s.portal
        .submit_admission(AdmissionForm::default(), None)
        .unwrap();
    let dash = s.portal.admin_dashboard(&admin(&s.portal)).unwrap();

    let progress: Vec<(&str, usize, usize)> = dash
        .students
        .iter()
        .map(|p| (p.student.id.as_str(), p.total_hw, p.submitted))
        .collect();
    assert_eq!(progress, vec![("s1", 2, 2), ("s2", 1, 0)]);

    let activity: Vec<(&str, usize)> = dash
        .teachers
        .iter()
        .map(|a| (a.teacher.id.as_str(), a.homeworks_given))
        .collect();
    assert_eq!(activity, vec![("t1", 1), ("t2", 1), ("t3", 1)]);
    assert_eq!(dash.pending.len(), 1);

    let ali = s.portal.login("student", "cnic-s1", "changeme").unwrap();
    assert!(matches!(
        s.portal.admin_dashboard(&ali),
        Err(Error::Unauthorized(_))
    ));
}

#[test]
fn parent_dashboard_lists_class_teachers() {
    let s = school();
    let parent = s.portal.parent_login("ali senior", "changeme").unwrap();
    let dash = s.portal.parent_dashboard(&parent).unwrap();
    assert_eq!(dash.child_name.as_deref(), Some("Ali"));

    let view: Vec<(&str, Vec<bool>)> = dash
        .teachers
        .iter()
        .map(|t| {
            (
                t.teacher.id.as_str(),
                t.homeworks.iter().map(|h| h.submitted).collect(),
            )
        })
        .collect();
    assert_eq!(view, vec![("t1", vec![true]), ("t2", vec![false])]);

    let khan = s.portal.login("teacher", "khan", "pw").unwrap();
    assert!(matches!(
        s.portal.parent_dashboard(&khan),
        Err(Error::Unauthorized(_))
    ));
}

#[test]
fn dangling_references_are_ignored() {
    let s = school();
    s.portal.store().collection::<Submission>().append(Submission {
        id: "orphan".into(),
        homework_id: Some("no-such-homework".into()),
        student_id: Some("s1".into()),
        ..Default::default()
    });
    let khan = s.portal.login("teacher", "khan", "pw").unwrap();
    assert_eq!(s.portal.teacher_dashboard(&khan).unwrap().submissions.len(), 2);
}

// ---- known boundary -----------------------------------------------------------

/// Overlapping load-modify-save sequences are not serialized: the later save
/// wins and the earlier append is lost. This documents the boundary; it is
/// not a guarantee callers should rely on.
#[test]
fn overlapping_read_modify_write_is_last_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    let portal = open(&dir);
    let repo = portal.store().collection::<Teacher>();

    let mut first = repo.load();
    let mut second = repo.load();
    first.push(Teacher {
        id: "a".into(),
        ..Default::default()
    });
    second.push(Teacher {
        id: "b".into(),
        ..Default::default()
    });
    repo.save(&first);
    repo.save(&second);

    let ids: Vec<String> = repo.load().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["b".to_string()]);
}

#[test]
fn portal_runs_on_an_in_memory_driver() {
    let dir = tempfile::tempdir().unwrap();
    let portal = Portal::with_driver(
        &PortalConfig::new(dir.path()),
        school_portal_store::MemoryDriver::default(),
    )
    .unwrap();
    let session = portal.login("admin", "admin@example.com", "admin123").unwrap();
    assert!(portal.admin_dashboard(&session).unwrap().students.is_empty());
    assert!(!dir.path().join("data").exists());
}
