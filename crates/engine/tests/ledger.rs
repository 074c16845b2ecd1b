use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    CategoryKind, CreateTransactionCmd, Engine, EngineError, TransferCmd, UpdateTransactionCmd,
    WalletKind,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection, Uuid) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build();
    let main_wallet_id = engine.register("alice", "password").await.unwrap();
    (engine, db, main_wallet_id)
}

async fn engine_with_file_db() -> (Engine, DatabaseConnection, Uuid, String, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build();
    let main_wallet_id = engine.register("alice", "password").await.unwrap();

    (engine, db, main_wallet_id, url, path)
}

async fn income_category(engine: &Engine) -> Uuid {
    engine
        .new_category("alice", "Wages", "#00ff00", CategoryKind::Income)
        .await
        .unwrap()
}

async fn expense_category(engine: &Engine) -> Uuid {
    engine
        .new_category("alice", "Shopping", "#ff0000", CategoryKind::Expense)
        .await
        .unwrap()
}

async fn balance_of(engine: &Engine, wallet_id: Uuid) -> i64 {
    engine.wallet("alice", wallet_id).await.unwrap().balance_minor
}

#[tokio::test]
async fn register_creates_main_wallet_with_zero_balance() {
    let (engine, _db, main_wallet_id) = engine_with_db().await;

    let wallet = engine.wallet("alice", main_wallet_id).await.unwrap();
    assert_eq!(wallet.kind, WalletKind::Main);
    assert_eq!(wallet.balance_minor, 0);
    assert_eq!(wallet.name, "Main");

    let wallets = engine.list_wallets("alice").await.unwrap();
    assert_eq!(wallets.len(), 1);
}

#[tokio::test]
async fn register_rejects_duplicate_username() {
    let (engine, _db, _main) = engine_with_db().await;

    let err = engine.register("alice", "other").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn balance_follows_the_ledger_step_by_step() {
    let (engine, _db, _main) = engine_with_db().await;
    let wallet_id = engine
        .new_wallet("alice", "Rainy day", WalletKind::Savings, 100_000)
        .await
        .unwrap();
    let income = income_category(&engine).await;
    let expense = expense_category(&engine).await;

    assert_eq!(balance_of(&engine, wallet_id).await, 100_000);

    let salary = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            wallet_id,
            income,
            20_000,
            Utc::now(),
            "salary",
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, wallet_id).await, 120_000);

    let groceries = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            wallet_id,
            expense,
            7_550,
            Utc::now(),
            "groceries",
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, wallet_id).await, 112_450);

    engine
        .update_transaction(
            UpdateTransactionCmd::new("alice", groceries.id).amount_minor(10_000),
        )
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, wallet_id).await, 110_000);

    engine.delete_transaction("alice", salary.id).await.unwrap();
    assert_eq!(balance_of(&engine, wallet_id).await, 90_000);
}

#[tokio::test]
async fn create_then_delete_restores_the_balance() {
    let (engine, _db, wallet_id) = engine_with_db().await;
    let expense = expense_category(&engine).await;

    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            wallet_id,
            expense,
            1_234,
            Utc::now(),
            "coffee",
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, wallet_id).await, -1_234);

    engine.delete_transaction("alice", tx.id).await.unwrap();
    assert_eq!(balance_of(&engine, wallet_id).await, 0);

    let txs = engine
        .list_transactions_for_wallet("alice", wallet_id, 50)
        .await
        .unwrap();
    assert!(txs.is_empty());
}

#[tokio::test]
async fn refund_on_an_expense_category_credits_the_wallet() {
    let (engine, _db, wallet_id) = engine_with_db().await;
    let expense = expense_category(&engine).await;

    engine
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                wallet_id,
                expense,
                5_000,
                Utc::now(),
                "returned shoes",
            )
            .refund(),
        )
        .await
        .unwrap();

    assert_eq!(balance_of(&engine, wallet_id).await, 5_000);
}

#[tokio::test]
async fn update_without_effect_changes_keeps_the_balance() {
    let (engine, _db, wallet_id) = engine_with_db().await;
    let expense = expense_category(&engine).await;

    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            wallet_id,
            expense,
            2_000,
            Utc::now(),
            "lunch",
        ))
        .await
        .unwrap();

    let updated = engine
        .update_transaction(
            UpdateTransactionCmd::new("alice", tx.id).description("team lunch"),
        )
        .await
        .unwrap();
    assert_eq!(updated.description, "team lunch");
    assert_eq!(updated.amount_minor, 2_000);
    assert_eq!(balance_of(&engine, wallet_id).await, -2_000);

    // Re-submitting the stored values is a no-op for the balance too.
    engine
        .update_transaction(
            UpdateTransactionCmd::new("alice", tx.id)
                .amount_minor(2_000)
                .category_id(expense)
                .is_refund(false),
        )
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, wallet_id).await, -2_000);
}

#[tokio::test]
async fn update_flipping_the_category_kind_reverses_the_effect() {
    let (engine, _db, wallet_id) = engine_with_db().await;
    let income = income_category(&engine).await;
    let expense = expense_category(&engine).await;

    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            wallet_id,
            expense,
            3_000,
            Utc::now(),
            "mislabeled",
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, wallet_id).await, -3_000);

    engine
        .update_transaction(UpdateTransactionCmd::new("alice", tx.id).category_id(income))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, wallet_id).await, 3_000);
}

#[tokio::test]
async fn update_moving_wallets_adjusts_both_balances() {
    let (engine, _db, main_wallet_id) = engine_with_db().await;
    let savings_id = engine
        .new_wallet("alice", "Savings", WalletKind::Savings, 0)
        .await
        .unwrap();
    let expense = expense_category(&engine).await;

    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            main_wallet_id,
            expense,
            4_000,
            Utc::now(),
            "paid from the wrong account",
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, main_wallet_id).await, -4_000);
    assert_eq!(balance_of(&engine, savings_id).await, 0);

    engine
        .update_transaction(UpdateTransactionCmd::new("alice", tx.id).wallet_id(savings_id))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, main_wallet_id).await, 0);
    assert_eq!(balance_of(&engine, savings_id).await, -4_000);
}

#[tokio::test]
async fn create_rejects_nonpositive_amounts() {
    let (engine, _db, wallet_id) = engine_with_db().await;
    let expense = expense_category(&engine).await;

    for amount in [0, -500] {
        let err = engine
            .create_transaction(CreateTransactionCmd::new(
                "alice",
                wallet_id,
                expense,
                amount,
                Utc::now(),
                "bogus",
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}

#[tokio::test]
async fn overflowing_balance_rejects_the_write_and_keeps_the_ledger() {
    let (engine, _db, _main) = engine_with_db().await;
    let wallet_id = engine
        .new_wallet("alice", "Vault", WalletKind::Savings, i64::MAX - 50)
        .await
        .unwrap();
    let income = income_category(&engine).await;

    let err = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            wallet_id,
            income,
            100,
            Utc::now(),
            "one coin too many",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // The rejected row must not survive the rollback.
    assert_eq!(balance_of(&engine, wallet_id).await, i64::MAX - 50);
    let txs = engine
        .list_transactions_for_wallet("alice", wallet_id, 50)
        .await
        .unwrap();
    assert!(txs.is_empty());
}

#[tokio::test]
async fn create_rejects_the_transfer_markers_as_category() {
    let (engine, db, wallet_id) = engine_with_db().await;

    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT id FROM categories WHERE user_id IS NULL AND name = 'OUTGOING_TRANSFER';"
                .to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    let marker_id: String = row.try_get("", "id").unwrap();
    let marker_id = Uuid::parse_str(&marker_id).unwrap();

    let err = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            wallet_id,
            marker_id,
            1_000,
            Utc::now(),
            "sneaky",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn transfer_is_zero_sum_and_links_both_legs() {
    let (engine, _db, main_wallet_id) = engine_with_db().await;
    let savings_id = engine
        .new_wallet("alice", "Savings", WalletKind::Savings, 50_000)
        .await
        .unwrap();
    let income = income_category(&engine).await;
    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            main_wallet_id,
            income,
            30_000,
            Utc::now(),
            "salary",
        ))
        .await
        .unwrap();

    let total_before =
        balance_of(&engine, main_wallet_id).await + balance_of(&engine, savings_id).await;

    let (outgoing, incoming) = engine
        .transfer(TransferCmd::new(
            "alice",
            main_wallet_id,
            savings_id,
            10_000,
            Utc::now(),
            "monthly savings",
        ))
        .await
        .unwrap();

    assert_eq!(balance_of(&engine, main_wallet_id).await, 20_000);
    assert_eq!(balance_of(&engine, savings_id).await, 60_000);
    let total_after =
        balance_of(&engine, main_wallet_id).await + balance_of(&engine, savings_id).await;
    assert_eq!(total_before, total_after);

    assert!(outgoing.transfer_id.is_some());
    assert_eq!(outgoing.transfer_id, incoming.transfer_id);
    assert_eq!(outgoing.wallet_id, main_wallet_id);
    assert_eq!(incoming.wallet_id, savings_id);
}

#[tokio::test]
async fn transfer_rejects_same_wallet_and_nonpositive_amount() {
    let (engine, _db, main_wallet_id) = engine_with_db().await;
    let savings_id = engine
        .new_wallet("alice", "Savings", WalletKind::Savings, 0)
        .await
        .unwrap();

    let err = engine
        .transfer(TransferCmd::new(
            "alice",
            main_wallet_id,
            main_wallet_id,
            1_000,
            Utc::now(),
            "to itself",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .transfer(TransferCmd::new(
            "alice",
            main_wallet_id,
            savings_id,
            0,
            Utc::now(),
            "nothing",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn transfer_legs_cannot_be_edited() {
    let (engine, _db, main_wallet_id) = engine_with_db().await;
    let savings_id = engine
        .new_wallet("alice", "Savings", WalletKind::Savings, 0)
        .await
        .unwrap();

    let (outgoing, _incoming) = engine
        .transfer(TransferCmd::new(
            "alice",
            main_wallet_id,
            savings_id,
            5_000,
            Utc::now(),
            "seed",
        ))
        .await
        .unwrap();

    let err = engine
        .update_transaction(
            UpdateTransactionCmd::new("alice", outgoing.id).amount_minor(9_000),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn deleting_one_transfer_leg_removes_the_pair() {
    let (engine, _db, main_wallet_id) = engine_with_db().await;
    let savings_id = engine
        .new_wallet("alice", "Savings", WalletKind::Savings, 0)
        .await
        .unwrap();

    let (_outgoing, incoming) = engine
        .transfer(TransferCmd::new(
            "alice",
            main_wallet_id,
            savings_id,
            5_000,
            Utc::now(),
            "seed",
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, main_wallet_id).await, -5_000);
    assert_eq!(balance_of(&engine, savings_id).await, 5_000);

    engine
        .delete_transaction("alice", incoming.id)
        .await
        .unwrap();

    assert_eq!(balance_of(&engine, main_wallet_id).await, 0);
    assert_eq!(balance_of(&engine, savings_id).await, 0);
    for wallet_id in [main_wallet_id, savings_id] {
        let txs = engine
            .list_transactions_for_wallet("alice", wallet_id, 50)
            .await
            .unwrap();
        assert!(txs.is_empty());
    }
}

#[tokio::test]
async fn transactions_carry_their_tag_and_payee() {
    let (engine, _db, wallet_id) = engine_with_db().await;
    let expense = expense_category(&engine).await;
    let tag_id = engine.new_tag("alice", "holiday").await.unwrap();
    let payee_id = engine.new_payee("alice", "Corner shop").await.unwrap();

    let tx = engine
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                wallet_id,
                expense,
                1_500,
                Utc::now(),
                "souvenirs",
            )
            .tag_id(tag_id)
            .payee_id(payee_id),
        )
        .await
        .unwrap();
    assert_eq!(tx.tag_id, Some(tag_id));
    assert_eq!(tx.payee_id, Some(payee_id));

    // A tag belonging to nobody is rejected before anything is written.
    let err = engine
        .create_transaction(
            CreateTransactionCmd::new(
                "alice",
                wallet_id,
                expense,
                1_500,
                Utc::now(),
                "orphan tag",
            )
            .tag_id(Uuid::new_v4()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert_eq!(balance_of(&engine, wallet_id).await, -1_500);
}

#[tokio::test]
async fn wallet_names_are_unique_per_user_case_insensitively() {
    let (engine, _db, _main) = engine_with_db().await;

    engine
        .new_wallet("alice", "Savings", WalletKind::Savings, 0)
        .await
        .unwrap();
    let err = engine
        .new_wallet("alice", "savings", WalletKind::Investment, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn only_one_main_wallet_per_user() {
    let (engine, _db, _main) = engine_with_db().await;

    let err = engine
        .new_wallet("alice", "Second main", WalletKind::Main, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn wallet_with_history_cannot_be_deleted() {
    let (engine, _db, _main) = engine_with_db().await;
    let wallet_id = engine
        .new_wallet("alice", "Savings", WalletKind::Savings, 0)
        .await
        .unwrap();
    let expense = expense_category(&engine).await;

    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            wallet_id,
            expense,
            100,
            Utc::now(),
            "snack",
        ))
        .await
        .unwrap();

    let err = engine.delete_wallet("alice", wallet_id).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let empty_id = engine
        .new_wallet("alice", "Empty", WalletKind::Savings, 0)
        .await
        .unwrap();
    engine.delete_wallet("alice", empty_id).await.unwrap();
    let err = engine.wallet("alice", empty_id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn listings_hide_the_transfer_markers() {
    let (engine, _db, _main) = engine_with_db().await;
    let own = expense_category(&engine).await;

    let categories = engine.list_categories("alice").await.unwrap();
    assert!(categories.iter().any(|c| c.id == own));
    assert!(categories.iter().any(|c| c.user_id.is_none()));
    assert!(!categories
        .iter()
        .any(|c| c.name == engine::OUTGOING_TRANSFER || c.name == engine::INCOMING_TRANSFER));
}

#[tokio::test]
async fn foreign_wallets_are_invisible() {
    let (engine, _db, alices_wallet) = engine_with_db().await;
    engine.register("bob", "hunter2").await.unwrap();

    let err = engine.wallet("bob", alices_wallet).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let expense = expense_category(&engine).await;
    let err = engine
        .create_transaction(CreateTransactionCmd::new(
            "bob",
            alices_wallet,
            expense,
            1_000,
            Utc::now(),
            "not mine",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn recompute_repairs_a_corrupted_cached_balance() {
    let (engine, db, wallet_id) = engine_with_db().await;
    let income = income_category(&engine).await;
    let expense = expense_category(&engine).await;

    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            wallet_id,
            income,
            10_000,
            Utc::now(),
            "salary",
        ))
        .await
        .unwrap();
    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            wallet_id,
            expense,
            2_500,
            Utc::now(),
            "groceries",
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, wallet_id).await, 7_500);

    // Consistent ledger: recompute is a no-op.
    engine.recompute_balances("alice").await.unwrap();
    assert_eq!(balance_of(&engine, wallet_id).await, 7_500);

    // Corrupt the cached column behind the engine's back.
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE wallets SET balance_minor = ? WHERE id = ?",
        vec![999_999i64.into(), wallet_id.to_string().into()],
    ))
    .await
    .unwrap();
    assert_eq!(balance_of(&engine, wallet_id).await, 999_999);

    engine.recompute_balances("alice").await.unwrap();
    assert_eq!(balance_of(&engine, wallet_id).await, 7_500);
}

#[tokio::test]
async fn concurrent_creates_keep_the_balance_invariant() {
    let (engine, _db, wallet_id, _url, path) = engine_with_file_db().await;
    let income = income_category(&engine).await;

    let first = engine.create_transaction(CreateTransactionCmd::new(
        "alice",
        wallet_id,
        income,
        1_000,
        Utc::now(),
        "first",
    ));
    let second = engine.create_transaction(CreateTransactionCmd::new(
        "alice",
        wallet_id,
        income,
        2_000,
        Utc::now(),
        "second",
    ));
    let (first, second) = tokio::join!(first, second);

    // Whatever won the race, the cached balance must equal the sum of
    // the transaction rows that actually landed.
    let mut expected = 0;
    if first.is_ok() {
        expected += 1_000;
    }
    if second.is_ok() {
        expected += 2_000;
    }
    for result in [&first, &second] {
        if let Err(err) = result {
            assert!(matches!(err, EngineError::Conflict(_)));
        }
    }
    assert_eq!(balance_of(&engine, wallet_id).await, expected);

    let txs = engine
        .list_transactions_for_wallet("alice", wallet_id, 50)
        .await
        .unwrap();
    assert_eq!(
        txs.len(),
        usize::from(first.is_ok()) + usize::from(second.is_ok())
    );

    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn restart_engine_reads_same_state() {
    let (engine, db, wallet_id, url, path) = engine_with_file_db().await;
    let income = income_category(&engine).await;

    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            wallet_id,
            income,
            1_000,
            Utc::now(),
            "salary",
        ))
        .await
        .unwrap();

    drop(engine);
    drop(db);

    let db2 = Database::connect(&url).await.unwrap();
    let engine2 = Engine::builder().database(db2.clone()).build();

    let wallet = engine2.wallet("alice", wallet_id).await.unwrap();
    assert_eq!(wallet.balance_minor, 1_000);

    drop(db2);
    let _ = std::fs::remove_file(path);
}
