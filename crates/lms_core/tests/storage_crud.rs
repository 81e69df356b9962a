use lms_core::{
    Badge, CollectionRepository, Course, Entity, IdGenerator, LmsStore, MemoryStorage, NewCourse,
    NewUser, StorageBackend, User, UserRole,
};

fn fixed_clock() -> i64 {
    1_720_000_000_000
}

#[test]
fn created_user_reads_back_with_generated_id_and_created_at() {
    let store = LmsStore::with_id_generator(MemoryStorage::new(), IdGenerator::with_clock(fixed_clock));

    let created = store
        .users()
        .create_user(NewUser::new("Ana", "ana@acme.test", UserRole::Employee))
        .unwrap();

    let all = store.collection::<User>().load_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], created);
    assert_eq!(all[0].id, "1720000000000");
    assert_eq!(all[0].created_at, fixed_clock());
    assert_eq!(all[0].name, "Ana");
}

#[test]
fn ids_stay_unique_when_created_in_the_same_millisecond() {
    let store = LmsStore::with_id_generator(MemoryStorage::new(), IdGenerator::with_clock(fixed_clock));
    let users = store.users();
    let first = users
        .create_user(NewUser::new("A", "a@acme.test", UserRole::Employee))
        .unwrap();
    let second = users
        .create_user(NewUser::new("B", "b@acme.test", UserRole::Employee))
        .unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.created_at, second.created_at);
}

#[test]
fn filtering_by_assigned_to_returns_exactly_the_written_courses() {
    let store = LmsStore::in_memory();
    let courses = store.courses();
    let a = courses.create_course(NewCourse::new("A", "x")).unwrap();
    let b = courses.create_course(NewCourse::new("B", "x")).unwrap();
    let c = courses.create_course(NewCourse::new("C", "x")).unwrap();

    courses.assign_course(&a.id, &["u1".to_string()]).unwrap();
    courses
        .assign_course(&b.id, &["u2".to_string(), "u1".to_string()])
        .unwrap();
    courses.assign_course(&c.id, &["u2".to_string()]).unwrap();

    let ids = courses
        .courses_for_user("u1")
        .unwrap()
        .into_iter()
        .map(|course| course.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![a.id, b.id]);
    assert!(courses.courses_for_user("u3").unwrap().is_empty());
}

#[test]
fn delete_removes_exactly_one_record_and_keeps_the_rest() {
    let store = LmsStore::in_memory();
    let users = store.users();
    let created = ["A", "B", "C"]
        .into_iter()
        .map(|name| {
            users
                .create_user(NewUser::new(name, format!("{name}@acme.test"), UserRole::Candidate))
                .unwrap()
        })
        .collect::<Vec<_>>();

    assert!(users.delete_user(&created[1].id).unwrap());
    assert!(!users.delete_user(&created[1].id).unwrap());

    let remaining = users.list_users().unwrap();
    assert_eq!(remaining, vec![created[0].clone(), created[2].clone()]);
}

#[test]
fn awarding_a_badge_twice_does_not_duplicate_it() {
    let store = LmsStore::in_memory();
    let user = store
        .users()
        .create_user(NewUser::new("Ana", "ana@acme.test", UserRole::Employee))
        .unwrap();
    let badge = store
        .engagement()
        .create_badge(Badge::new("Finisher", "trophy", 50))
        .unwrap();

    store.engagement().award_badge(&user.id, &badge.id).unwrap();
    let awarded = store
        .engagement()
        .award_badge(&user.id, &badge.id)
        .unwrap()
        .unwrap();

    assert_eq!(awarded.badges, vec![badge.id.clone()]);
    assert_eq!(awarded.points, 50);
    assert_eq!(store.messaging().notifications_for(&user.id).unwrap().len(), 1);
    assert_eq!(store.engagement().badges_for_user(&user.id).unwrap(), vec![badge]);
}

#[test]
fn missing_records_are_none_not_errors() {
    let store = LmsStore::in_memory();
    assert!(store.users().get_user("nope").unwrap().is_none());
    assert!(store.courses().update_course("nope", |_| {}).unwrap().is_none());
    assert!(!store.courses().delete_course("nope").unwrap());
}

#[test]
fn persisted_layout_is_one_json_array_per_key() {
    let storage = MemoryStorage::new();
    let store = LmsStore::new(&storage);
    store
        .users()
        .create_user(NewUser::new("Ana", "ana@acme.test", UserRole::Hr))
        .unwrap();
    store.courses().create_course(NewCourse::new("A", "x")).unwrap();

    let raw = storage.get_item(User::KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let users = value.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["role"], "hr");
    assert!(users[0].get("createdAt").is_some());

    assert_eq!(storage.keys().unwrap(), vec![Course::KEY, User::KEY]);
}

#[test]
fn collections_written_by_another_client_are_read_as_is() {
    let storage = MemoryStorage::new();
    storage
        .set_item(
            Course::KEY,
            r#"[{"id":"1","title":"Legacy","assignedTo":["u9"],"createdAt":5}]"#,
        )
        .unwrap();

    let repo = CollectionRepository::<Course, _>::new(&storage);
    let course = repo.get("1").unwrap().unwrap();
    assert_eq!(course.title, "Legacy");
    assert!(course.is_assigned_to("u9"));
    assert!(course.lessons.is_empty());
}
