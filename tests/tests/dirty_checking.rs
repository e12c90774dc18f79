use tests::models::Person;
use tests::store;

use torpor::Value;
use torpor_core::driver::Operation;

#[tokio::test]
async fn clean_merge_issues_no_write() {
    let (db, log) = store().await.unwrap();
    let mut session = db.session();

    let person = session.persist(Person::new("user1", 33)).await.unwrap();
    session.merge(&person).await.unwrap();

    assert!(!log.has_update_by_key(), "nothing changed, nothing to write");
}

#[tokio::test]
async fn clean_merge_after_find_issues_no_write() {
    let (db, log) = store().await.unwrap();

    let mut session = db.session();
    session.persist(Person::new("user1", 33)).await.unwrap();
    drop(session);

    // The snapshot taken at load time is the baseline.
    let mut session = db.session();
    let person = session.find::<Person>(1).await.unwrap();
    session.merge(&person).await.unwrap();

    assert!(!log.has_update_by_key());
}

#[tokio::test]
async fn dirty_merge_writes_exactly_once() {
    let (db, log) = store().await.unwrap();
    let mut session = db.session();

    let person = session.persist(Person::new("user1", 33)).await.unwrap();

    session.get_mut(&person).unwrap().name = "user2".into();
    session.merge(&person).await.unwrap();

    assert_eq!(log.count(|op| matches!(op, Operation::UpdateByKey(_))), 1);

    // The merge refreshed the snapshot, so merging again is a no-op.
    session.merge(&person).await.unwrap();
    assert_eq!(log.count(|op| matches!(op, Operation::UpdateByKey(_))), 1);
}

#[tokio::test]
async fn merged_changes_are_visible_to_later_sessions() {
    let (db, _log) = store().await.unwrap();

    let mut session = db.session();
    let person = session.persist(Person::new("user1", 33)).await.unwrap();
    assert_eq!(session.get(&person).unwrap().id, Some(1));
    drop(session);

    let mut session = db.session();
    let person = session.find::<Person>(1).await.unwrap();
    assert_eq!(session.get(&person).unwrap().name, "user1");

    session.get_mut(&person).unwrap().name = "user2".into();
    session.merge(&person).await.unwrap();
    drop(session);

    let mut session = db.session();
    let person = session.find::<Person>(1).await.unwrap();
    assert_eq!(session.get(&person).unwrap().name, "user2");
}

#[tokio::test]
async fn update_targets_only_the_dirty_row() {
    let (db, log) = store().await.unwrap();
    let mut session = db.session();

    let first = session.persist(Person::new("user1", 33)).await.unwrap();
    let second = session.persist(Person::new("user2", 44)).await.unwrap();

    session.get_mut(&second).unwrap().age = 45;
    session.merge(&first).await.unwrap();
    session.merge(&second).await.unwrap();

    log.with_ops(|ops| {
        let updates: Vec<_> = ops
            .iter()
            .filter_map(|op| match &op.operation {
                Operation::UpdateByKey(update) => Some(update),
                _ => None,
            })
            .collect();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].key, Value::I64(2));
        assert_eq!(updates[0].row[2], Value::I64(45));
    });
}

#[tokio::test]
async fn changing_the_key_is_rejected() {
    let (db, _log) = store().await.unwrap();
    let mut session = db.session();

    let person = session.persist(Person::new("user1", 33)).await.unwrap();
    session.get_mut(&person).unwrap().id = Some(99);

    let err = session.merge(&person).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "primary key of `Person` changed from I64(1) to I64(99) while managed"
    );
}
