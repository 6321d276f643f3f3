use rusqlite::Connection;
use sitebook_core::db::{open_db, open_db_in_memory};
use sitebook_core::{
    BillEntryChanges, BillEntryDraft, EntryRepository, EntryStore, LifecycleService, QueryService,
    RepoError, ServiceError, SqliteEntryRepository,
};
use std::sync::{Arc, Barrier};
use std::thread;

fn tower_a_cement() -> BillEntryDraft {
    BillEntryDraft {
        project_name: "Tower A".to_string(),
        date: "2024-01-01".to_string(),
        material: "Cement".to_string(),
        description: "50 bags".to_string(),
        bill_amount: 500.0,
        payment_to: "Supplier X".to_string(),
        payment_by: "Office".to_string(),
        payment_method: "Cash".to_string(),
    }
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn created_entry_reads_back_with_identical_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let lifecycle = LifecycleService::new(repo);
    let query = QueryService::new(repo);

    let id = lifecycle.create_entry(&tower_a_cement()).unwrap();
    assert_eq!(id, 1);

    let loaded = query.get_entry(id).unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.fields, tower_a_cement());
}

#[test]
fn invalid_amounts_are_rejected_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let lifecycle = LifecycleService::new(SqliteEntryRepository::try_new(&conn).unwrap());

    for amount in [0.0, -1.0, f64::NAN] {
        let mut draft = tower_a_cement();
        draft.bill_amount = amount;
        let err = lifecycle.create_entry(&draft).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)), "amount {amount}");
    }

    let mut blank = tower_a_cement();
    blank.material = String::new();
    assert!(matches!(
        lifecycle.create_entry(&blank).unwrap_err(),
        ServiceError::Validation(message) if message.contains("material")
    ));

    assert_eq!(count(&conn, "bill_entries"), 0);
}

#[test]
fn repository_insert_also_validates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let mut draft = tower_a_cement();
    draft.payment_method = " ".to_string();
    assert!(matches!(
        repo.insert_entry(&draft).unwrap_err(),
        RepoError::Validation(_)
    ));
    assert_eq!(count(&conn, "bill_entries"), 0);
}

#[test]
fn ids_are_never_reused_after_soft_delete() {
    let conn = open_db_in_memory().unwrap();
    let lifecycle = LifecycleService::new(SqliteEntryRepository::try_new(&conn).unwrap());

    let first = lifecycle.create_entry(&tower_a_cement()).unwrap();
    lifecycle.soft_delete(first).unwrap();
    let second = lifecycle.create_entry(&tower_a_cement()).unwrap();

    assert!(second > first);
}

#[test]
fn update_overwrites_all_fields_but_keeps_project() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let lifecycle = LifecycleService::new(repo);
    let query = QueryService::new(repo);

    let id = lifecycle.create_entry(&tower_a_cement()).unwrap();
    let changes = BillEntryChanges {
        date: "2024-03-05".to_string(),
        material: "Steel".to_string(),
        description: "12mm rods".to_string(),
        bill_amount: 1250.5,
        payment_to: "Supplier Y".to_string(),
        payment_by: "Site Office".to_string(),
        payment_method: "Bank Transfer".to_string(),
    };
    lifecycle.update_entry(id, &changes).unwrap();

    let loaded = query.get_entry(id).unwrap();
    assert_eq!(loaded.fields.project_name, "Tower A");
    assert_eq!(loaded.fields.material, "Steel");
    assert_eq!(loaded.fields.bill_amount, 1250.5);
    assert_eq!(loaded.fields.payment_method, "Bank Transfer");
}

#[test]
fn update_does_not_revalidate_amount() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let lifecycle = LifecycleService::new(repo);

    let id = lifecycle.create_entry(&tower_a_cement()).unwrap();
    let changes = BillEntryChanges {
        date: "2024-01-01".to_string(),
        material: "Cement".to_string(),
        description: "refund".to_string(),
        bill_amount: -50.0,
        payment_to: "Supplier X".to_string(),
        payment_by: "Office".to_string(),
        payment_method: "Cash".to_string(),
    };
    lifecycle.update_entry(id, &changes).unwrap();

    let loaded = QueryService::new(repo).get_entry(id).unwrap();
    assert_eq!(loaded.fields.bill_amount, -50.0);
}

#[test]
fn non_finite_update_is_rejected_and_entry_stays_readable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let lifecycle = LifecycleService::new(repo);
    let query = QueryService::new(repo);

    let id = lifecycle.create_entry(&tower_a_cement()).unwrap();
    for amount in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
        let changes = BillEntryChanges {
            date: "2024-01-02".to_string(),
            material: "Cement".to_string(),
            description: "overflow".to_string(),
            bill_amount: amount,
            payment_to: "Supplier X".to_string(),
            payment_by: "Office".to_string(),
            payment_method: "Cash".to_string(),
        };
        assert!(
            matches!(
                lifecycle.update_entry(id, &changes).unwrap_err(),
                ServiceError::Validation(_)
            ),
            "amount {amount}"
        );
    }

    assert_eq!(query.get_entry(id).unwrap().fields, tower_a_cement());
    let listed = query.list_entries_by_project("Tower A", None, None).unwrap();
    assert_eq!(listed.len(), 1);
    lifecycle.soft_delete(id).unwrap();
}

#[test]
fn update_unknown_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let lifecycle = LifecycleService::new(SqliteEntryRepository::try_new(&conn).unwrap());

    let changes = BillEntryChanges {
        date: "2024-01-01".to_string(),
        material: "Cement".to_string(),
        description: "ghost".to_string(),
        bill_amount: 1.0,
        payment_to: "Nobody".to_string(),
        payment_by: "Office".to_string(),
        payment_method: "Cash".to_string(),
    };
    assert!(matches!(
        lifecycle.update_entry(42, &changes).unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[test]
fn soft_delete_then_restore_round_trips_fields_with_new_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let lifecycle = LifecycleService::new(repo);
    let query = QueryService::new(repo);

    let id = lifecycle.create_entry(&tower_a_cement()).unwrap();
    assert_eq!(id, 1);

    let archived_id = lifecycle.soft_delete(id).unwrap();
    assert_eq!(archived_id, 1);
    assert!(matches!(query.get_entry(id), Err(ServiceError::NotFound(_))));
    assert_eq!(count(&conn, "bill_entries"), 0);

    let archived = query.list_archived_by_project("Tower A").unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].id, archived_id);
    assert_eq!(archived[0].fields, tower_a_cement());

    let restored_id = lifecycle.restore(archived_id).unwrap();
    assert_eq!(restored_id, 2);
    assert_eq!(query.get_entry(restored_id).unwrap().fields, tower_a_cement());
    assert!(query.list_archived_by_project("Tower A").unwrap().is_empty());
    assert!(matches!(
        query.get_archived_entry(archived_id),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn soft_delete_missing_id_leaves_both_stores_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let lifecycle = LifecycleService::new(SqliteEntryRepository::try_new(&conn).unwrap());
    lifecycle.create_entry(&tower_a_cement()).unwrap();

    let err = lifecycle.soft_delete(999).unwrap_err();
    assert_eq!(err, ServiceError::NotFound("Bill entry not found".to_string()));
    assert_eq!(count(&conn, "bill_entries"), 1);
    assert_eq!(count(&conn, "deleted_entries"), 0);

    let err = lifecycle.restore(999).unwrap_err();
    assert_eq!(
        err,
        ServiceError::NotFound("Entry not found in deleted entries".to_string())
    );
    assert_eq!(count(&conn, "bill_entries"), 1);
    assert_eq!(count(&conn, "deleted_entries"), 0);
}

#[test]
fn second_soft_delete_of_same_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let lifecycle = LifecycleService::new(SqliteEntryRepository::try_new(&conn).unwrap());
    let id = lifecycle.create_entry(&tower_a_cement()).unwrap();

    lifecycle.soft_delete(id).unwrap();
    assert!(matches!(
        lifecycle.soft_delete(id).unwrap_err(),
        ServiceError::NotFound(_)
    ));
    assert_eq!(count(&conn, "deleted_entries"), 1);
}

#[test]
fn failed_source_delete_rolls_back_archive_insert() {
    let conn = open_db_in_memory().unwrap();
    let lifecycle = LifecycleService::new(SqliteEntryRepository::try_new(&conn).unwrap());
    let id = lifecycle.create_entry(&tower_a_cement()).unwrap();

    conn.execute_batch(
        "CREATE TRIGGER block_entry_delete BEFORE DELETE ON bill_entries
         BEGIN
            SELECT RAISE(ABORT, 'delete blocked');
         END;",
    )
    .unwrap();

    let err = lifecycle.soft_delete(id).unwrap_err();
    assert!(matches!(err, ServiceError::Storage(_)));
    assert_eq!(err.public_message(), "internal storage error");
    assert_eq!(count(&conn, "bill_entries"), 1);
    assert_eq!(count(&conn, "deleted_entries"), 0);
    assert!(conn.is_autocommit());
}

#[test]
fn failed_archive_delete_rolls_back_restore_insert() {
    let conn = open_db_in_memory().unwrap();
    let lifecycle = LifecycleService::new(SqliteEntryRepository::try_new(&conn).unwrap());
    let id = lifecycle.create_entry(&tower_a_cement()).unwrap();
    let archived_id = lifecycle.soft_delete(id).unwrap();

    conn.execute_batch(
        "CREATE TRIGGER block_archive_delete BEFORE DELETE ON deleted_entries
         BEGIN
            SELECT RAISE(ABORT, 'delete blocked');
         END;",
    )
    .unwrap();

    let err = lifecycle.restore(archived_id).unwrap_err();
    assert!(matches!(err, ServiceError::Storage(_)));
    assert_eq!(count(&conn, "bill_entries"), 0);
    assert_eq!(count(&conn, "deleted_entries"), 1);
    assert!(conn.is_autocommit());
}

#[test]
fn source_delete_affecting_no_rows_rolls_back_archive_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let id = LifecycleService::new(repo)
        .create_entry(&tower_a_cement())
        .unwrap();

    conn.execute_batch(
        "CREATE TRIGGER skip_entry_delete BEFORE DELETE ON bill_entries
         BEGIN
            SELECT RAISE(IGNORE);
         END;",
    )
    .unwrap();

    let err = repo.move_entry(EntryStore::Active, id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::EntryNotFound {
            store: EntryStore::Active,
            ..
        }
    ));
    assert_eq!(count(&conn, "bill_entries"), 1);
    assert_eq!(count(&conn, "deleted_entries"), 0);
}

#[test]
fn archive_delete_affecting_no_rows_rolls_back_restore_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let lifecycle = LifecycleService::new(repo);
    let id = lifecycle.create_entry(&tower_a_cement()).unwrap();
    let archived_id = lifecycle.soft_delete(id).unwrap();

    conn.execute_batch(
        "CREATE TRIGGER skip_archive_delete BEFORE DELETE ON deleted_entries
         BEGIN
            SELECT RAISE(IGNORE);
         END;",
    )
    .unwrap();

    let err = repo.move_entry(EntryStore::Archived, archived_id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::EntryNotFound {
            store: EntryStore::Archived,
            ..
        }
    ));
    assert_eq!(count(&conn, "bill_entries"), 0);
    assert_eq!(count(&conn, "deleted_entries"), 1);
}

#[test]
fn concurrent_soft_deletes_archive_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.sqlite3");

    let id = {
        let conn = open_db(&path).unwrap();
        LifecycleService::new(SqliteEntryRepository::try_new(&conn).unwrap())
            .create_entry(&tower_a_cement())
            .unwrap()
    };

    let barrier = Arc::new(Barrier::new(2));
    let handles = (0..2)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let path = path.clone();
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let lifecycle =
                    LifecycleService::new(SqliteEntryRepository::try_new(&conn).unwrap());
                barrier.wait();
                lifecycle.soft_delete(id)
            })
        })
        .collect::<Vec<_>>();

    let results = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect::<Vec<_>>();

    let successes = results.iter().filter(|result| result.is_ok()).count();
    let not_found = results
        .iter()
        .filter(|result| matches!(result, Err(ServiceError::NotFound(_))))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(not_found, 1);

    let conn = open_db(&path).unwrap();
    assert_eq!(count(&conn, "bill_entries"), 0);
    assert_eq!(count(&conn, "deleted_entries"), 1);
}
