use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{CreateRunCmd, Engine, EngineError, RunStatus, UpdateRunCmd};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn exec(db: &DatabaseConnection, sql: &str, values: Vec<sea_orm::Value>) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(backend, sql, values))
        .await
        .unwrap();
}

struct Fixture {
    store_id: String,
    kg: Uuid,
    box_unit: Uuid,
    flour: Uuid,
    sugar: Uuid,
    flour_lot: Uuid,
}

/// Seeds the reference data every test starts from: store "store-1" operated
/// by "alice" (and a second employee "mallory" without operator rights), a
/// Kilogram and a Box unit, items Flour and Sugar, and one 100 kg Flour lot.
async fn seed(db: &DatabaseConnection) -> Fixture {
    exec(
        db,
        "INSERT INTO employees (id, name, password) VALUES (?, ?, ?)",
        vec!["alice".into(), "Alice".into(), "password".into()],
    )
    .await;
    exec(
        db,
        "INSERT INTO employees (id, name, password) VALUES (?, ?, ?)",
        vec!["mallory".into(), "Mallory".into(), "password".into()],
    )
    .await;
    exec(
        db,
        "INSERT INTO stores (id, name) VALUES (?, ?)",
        vec!["store-1".into(), "Main store".into()],
    )
    .await;
    exec(
        db,
        "INSERT INTO store_operators (store_id, employee_id) VALUES (?, ?)",
        vec!["store-1".into(), "alice".into()],
    )
    .await;

    let kg = Uuid::new_v4();
    let box_unit = Uuid::new_v4();
    exec(
        db,
        "INSERT INTO units (id, name, abbreviation) VALUES (?, ?, ?)",
        vec![kg.to_string().into(), "Kilogram".into(), "KG".into()],
    )
    .await;
    exec(
        db,
        "INSERT INTO units (id, name, abbreviation) VALUES (?, ?, ?)",
        vec![box_unit.to_string().into(), "Box".into(), "BX".into()],
    )
    .await;

    let flour = Uuid::new_v4();
    let sugar = Uuid::new_v4();
    exec(
        db,
        "INSERT INTO items (id, name) VALUES (?, ?)",
        vec![flour.to_string().into(), "Flour".into()],
    )
    .await;
    exec(
        db,
        "INSERT INTO items (id, name) VALUES (?, ?)",
        vec![sugar.to_string().into(), "Sugar".into()],
    )
    .await;

    let flour_lot = Uuid::new_v4();
    exec(
        db,
        "INSERT INTO inventory_lots (id, item_id, store_id, unit_id, quantity) \
         VALUES (?, ?, ?, ?, ?)",
        vec![
            flour_lot.to_string().into(),
            flour.to_string().into(),
            "store-1".into(),
            kg.to_string().into(),
            100.0_f64.into(),
        ],
    )
    .await;

    Fixture {
        store_id: "store-1".to_string(),
        kg,
        box_unit,
        flour,
        sugar,
        flour_lot,
    }
}

async fn lot_quantity(db: &DatabaseConnection, lot_id: Uuid) -> f64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT quantity FROM inventory_lots WHERE id = ?",
            vec![lot_id.to_string().into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "quantity").unwrap()
}

async fn count_rows(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

fn base_cmd(fixture: &Fixture) -> CreateRunCmd {
    CreateRunCmd::new(
        &fixture.store_id,
        "alice",
        fixture.kg,
        fixture.box_unit,
        40.0,
        100.0,
    )
}

#[tokio::test]
async fn depletes_stock_and_creates_a_pending_run() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let creation = engine
        .create_run(base_cmd(&fixture).item(fixture.flour, "Flour", 40.0))
        .await
        .unwrap();

    assert_eq!(creation.run.status, RunStatus::Pending);
    assert_eq!(creation.run.actual_output, None);
    assert_eq!(creation.run.items.len(), 1);
    assert_eq!(creation.run.items[0].requested_qty, 40.0);

    assert_eq!(creation.depletions.len(), 1);
    let record = &creation.depletions[0];
    assert_eq!(record.quantity, 40.0);
    assert_eq!(record.remaining, 60.0);
    assert_eq!(record.category, "DEPLETION");
    assert_eq!(record.recorded_by, "alice");

    assert_eq!(lot_quantity(&db, fixture.flour_lot).await, 60.0);
    assert_eq!(count_rows(&db, "manufacturing_runs").await, 1);
    assert_eq!(count_rows(&db, "depletion_records").await, 1);
}

#[tokio::test]
async fn insufficient_stock_fails_and_leaves_everything_untouched() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let err = engine
        .create_run(base_cmd(&fixture).item(fixture.flour, "Flour", 150.0))
        .await
        .unwrap_err();

    match err {
        EngineError::DepletionFailed(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(
                failures[0].to_string(),
                "Flour: Insufficient stock. Available: 100, Required: 150"
            );
        }
        other => panic!("expected DepletionFailed, got {other:?}"),
    }

    assert_eq!(lot_quantity(&db, fixture.flour_lot).await, 100.0);
    assert_eq!(count_rows(&db, "manufacturing_runs").await, 0);
    assert_eq!(count_rows(&db, "depletion_records").await, 0);
}

#[tokio::test]
async fn a_packing_only_unit_is_rejected_as_primary() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let cmd = CreateRunCmd::new(
        &fixture.store_id,
        "alice",
        fixture.box_unit,
        fixture.box_unit,
        40.0,
        100.0,
    )
    .item(fixture.flour, "Flour", 40.0);
    let err = engine.create_run(cmd).await.unwrap_err();

    assert_eq!(
        err,
        EngineError::InvalidUnit("Box (BX) is not a litre or kilogram unit".to_string())
    );
    assert_eq!(lot_quantity(&db, fixture.flour_lot).await, 100.0);
}

#[tokio::test]
async fn unknown_store_is_rejected() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let cmd = CreateRunCmd::new("nowhere", "alice", fixture.kg, fixture.box_unit, 40.0, 100.0)
        .item(fixture.flour, "Flour", 40.0);
    let err = engine.create_run(cmd).await.unwrap_err();

    assert_eq!(err, EngineError::KeyNotFound("store not exists".to_string()));
}

#[tokio::test]
async fn unknown_operator_is_rejected() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let cmd = CreateRunCmd::new(
        &fixture.store_id,
        "ghost",
        fixture.kg,
        fixture.box_unit,
        40.0,
        100.0,
    )
    .item(fixture.flour, "Flour", 40.0);
    let err = engine.create_run(cmd).await.unwrap_err();

    assert_eq!(
        err,
        EngineError::KeyNotFound("employee not exists".to_string())
    );
}

#[tokio::test]
async fn an_employee_outside_the_operator_set_is_forbidden() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let cmd = CreateRunCmd::new(
        &fixture.store_id,
        "mallory",
        fixture.kg,
        fixture.box_unit,
        40.0,
        100.0,
    )
    .item(fixture.flour, "Flour", 40.0);
    let err = engine.create_run(cmd).await.unwrap_err();

    assert!(matches!(err, EngineError::Forbidden(_)));
    assert_eq!(lot_quantity(&db, fixture.flour_lot).await, 100.0);
}

#[tokio::test]
async fn an_unknown_item_aborts_before_any_depletion() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let cmd = base_cmd(&fixture)
        .item(fixture.flour, "Flour", 40.0)
        .item(Uuid::new_v4(), "Mystery", 1.0);
    let err = engine.create_run(cmd).await.unwrap_err();

    assert_eq!(
        err,
        EngineError::KeyNotFound("one or more items not exists".to_string())
    );
    assert_eq!(lot_quantity(&db, fixture.flour_lot).await, 100.0);
    assert_eq!(count_rows(&db, "manufacturing_runs").await, 0);
}

#[tokio::test]
async fn all_item_failures_are_reported_together() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    // Sugar exists as an item but has no lot in the store; Flour is short.
    let cmd = base_cmd(&fixture)
        .item(fixture.flour, "Flour", 150.0)
        .item(fixture.sugar, "Sugar", 10.0);
    let err = engine.create_run(cmd).await.unwrap_err();

    match err {
        EngineError::DepletionFailed(failures) => {
            assert_eq!(failures.len(), 2);
            assert_eq!(
                failures[0].to_string(),
                "Flour: Insufficient stock. Available: 100, Required: 150"
            );
            assert_eq!(failures[1].to_string(), "Sugar: Not found in store inventory");
        }
        other => panic!("expected DepletionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn one_failing_item_rolls_back_the_whole_run() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    // Flour alone could be depleted, but Sugar has no lot: nothing may stick.
    let cmd = base_cmd(&fixture)
        .item(fixture.flour, "Flour", 40.0)
        .item(fixture.sugar, "Sugar", 10.0);
    let err = engine.create_run(cmd).await.unwrap_err();

    assert!(matches!(err, EngineError::DepletionFailed(_)));
    assert_eq!(lot_quantity(&db, fixture.flour_lot).await, 100.0);
    assert_eq!(count_rows(&db, "manufacturing_runs").await, 0);
    assert_eq!(count_rows(&db, "depletion_records").await, 0);
}

#[tokio::test]
async fn a_lot_in_the_wrong_unit_does_not_satisfy_a_request() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    // Sugar is stocked, but only in boxes.
    exec(
        &db,
        "INSERT INTO inventory_lots (id, item_id, store_id, unit_id, quantity) \
         VALUES (?, ?, ?, ?, ?)",
        vec![
            Uuid::new_v4().to_string().into(),
            fixture.sugar.to_string().into(),
            "store-1".into(),
            fixture.box_unit.to_string().into(),
            30.0_f64.into(),
        ],
    )
    .await;

    let cmd = base_cmd(&fixture).item(fixture.sugar, "Sugar", 10.0);
    let err = engine.create_run(cmd).await.unwrap_err();

    match err {
        EngineError::DepletionFailed(failures) => {
            assert_eq!(
                failures[0].to_string(),
                "Sugar: Not available in the required unit (Kilogram (KG))"
            );
        }
        other => panic!("expected DepletionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn completion_derives_the_yield_variance_status() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let cases = [
        (95.0, RunStatus::WastageDetected),
        (97.0, RunStatus::Normal),
        (110.0, RunStatus::GoodUtilization),
    ];
    for (actual, expected) in cases {
        let creation = engine
            .create_run(base_cmd(&fixture).item(fixture.flour, "Flour", 10.0))
            .await
            .unwrap();

        let completed = engine.complete_run(creation.run.id, actual).await.unwrap();
        assert_eq!(completed.status, expected);
        assert_eq!(completed.actual_output, Some(actual));

        let stored = engine.run(creation.run.id).await.unwrap();
        assert_eq!(stored.status, expected);
        assert_eq!(stored.actual_output, Some(actual));
    }
}

#[tokio::test]
async fn completion_is_one_shot() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let creation = engine
        .create_run(base_cmd(&fixture).item(fixture.flour, "Flour", 10.0))
        .await
        .unwrap();

    engine.complete_run(creation.run.id, 95.0).await.unwrap();
    let err = engine.complete_run(creation.run.id, 110.0).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyCompleted(_)));

    // The first completion is untouched by the rejected second one.
    let stored = engine.run(creation.run.id).await.unwrap();
    assert_eq!(stored.status, RunStatus::WastageDetected);
    assert_eq!(stored.actual_output, Some(95.0));
}

#[tokio::test]
async fn completing_a_missing_run_is_not_found() {
    let (engine, db) = engine_with_db().await;
    seed(&db).await;

    let err = engine.complete_run(Uuid::new_v4(), 10.0).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("run not exists".to_string()));
}

#[tokio::test]
async fn update_patches_fields_without_touching_inventory() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let creation = engine
        .create_run(base_cmd(&fixture).item(fixture.flour, "Flour", 40.0))
        .await
        .unwrap();

    let updated = engine
        .update_run(
            UpdateRunCmd::new(creation.run.id)
                .estimated_output(120.0)
                .note("second shift"),
        )
        .await
        .unwrap();

    assert_eq!(updated.estimated_output, 120.0);
    assert_eq!(updated.note.as_deref(), Some("second shift"));
    // Patching never re-triggers depletion.
    assert_eq!(lot_quantity(&db, fixture.flour_lot).await, 60.0);
}

#[tokio::test]
async fn update_replaces_the_items_payload_verbatim() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let creation = engine
        .create_run(base_cmd(&fixture).item(fixture.flour, "Flour", 40.0))
        .await
        .unwrap();

    let updated = engine
        .update_run(UpdateRunCmd::new(creation.run.id).items(vec![
            engine::RunItemRequest::new(fixture.sugar, "Sugar", 7.5),
        ]))
        .await
        .unwrap();

    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.items[0].item_name, "Sugar");
    assert_eq!(updated.items[0].requested_qty, 7.5);
    // Sugar has no lot at all, yet the patch went through: the payload is a
    // historical record, not a depletion request.
    assert_eq!(lot_quantity(&db, fixture.flour_lot).await, 60.0);
    assert_eq!(count_rows(&db, "depletion_records").await, 1);
}

#[tokio::test]
async fn update_checks_existence_of_patched_references() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let creation = engine
        .create_run(base_cmd(&fixture).item(fixture.flour, "Flour", 40.0))
        .await
        .unwrap();

    let err = engine
        .update_run(UpdateRunCmd::new(creation.run.id).store_id("nowhere"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("store not exists".to_string()));

    let err = engine
        .update_run(UpdateRunCmd::new(creation.run.id).primary_unit_id(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("unit not exists".to_string()));

    // Existence is the only constraint on update: a packing-only unit may be
    // patched in as primary without the classification gate.
    let updated = engine
        .update_run(UpdateRunCmd::new(creation.run.id).primary_unit_id(fixture.box_unit))
        .await
        .unwrap();
    assert_eq!(updated.primary_unit_id, fixture.box_unit);
}

#[tokio::test]
async fn delete_removes_the_record_but_not_the_consumption() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let creation = engine
        .create_run(base_cmd(&fixture).item(fixture.flour, "Flour", 40.0))
        .await
        .unwrap();

    let deleted = engine.delete_run(creation.run.id).await.unwrap();
    assert_eq!(deleted.id, creation.run.id);

    assert_eq!(count_rows(&db, "manufacturing_runs").await, 0);
    // Already-consumed stock is not restored.
    assert_eq!(lot_quantity(&db, fixture.flour_lot).await, 60.0);

    let err = engine.delete_run(creation.run.id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("run not exists".to_string()));
}

#[tokio::test]
async fn list_returns_every_run() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let first = engine
        .create_run(base_cmd(&fixture).item(fixture.flour, "Flour", 10.0))
        .await
        .unwrap();
    let second = engine
        .create_run(base_cmd(&fixture).item(fixture.flour, "Flour", 10.0))
        .await
        .unwrap();

    let runs = engine.list_runs().await.unwrap();
    assert_eq!(runs.len(), 2);
    let ids: Vec<_> = runs.iter().map(|run| run.id).collect();
    assert!(ids.contains(&first.run.id));
    assert!(ids.contains(&second.run.id));
}

#[tokio::test]
async fn an_empty_item_list_is_rejected_up_front() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let err = engine.create_run(base_cmd(&fixture)).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn non_positive_quantities_are_rejected_up_front() {
    let (engine, db) = engine_with_db().await;
    let fixture = seed(&db).await;

    let err = engine
        .create_run(base_cmd(&fixture).item(fixture.flour, "Flour", 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert_eq!(lot_quantity(&db, fixture.flour_lot).await, 100.0);
}
