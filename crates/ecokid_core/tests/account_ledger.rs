use ecokid_core::db::{open_db, open_db_in_memory};
use ecokid_core::{AccountLedger, EconomyError, ManualClock, SqliteAccountRepository};
use std::thread;

const STUDENT: &str = "student-0412";

#[test]
fn ensure_account_seeds_balance_once() {
    let conn = open_db_in_memory().unwrap();
    let ledger = AccountLedger::new(SqliteAccountRepository::new(&conn), 10);

    assert!(ledger.ensure_account(STUDENT).unwrap());
    ledger.credit(STUDENT, 4).unwrap();
    assert!(!ledger.ensure_account(STUDENT).unwrap());

    let account = ledger.get_account(STUDENT).unwrap();
    assert_eq!(account.account_id, "acc_student-0412");
    assert_eq!(account.balance, 14);

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM accounts;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn account_timestamps_follow_the_ledger_clock() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(1_700_000_000_000);
    let ledger = AccountLedger::with_clock(SqliteAccountRepository::new(&conn), &clock, 10);

    ledger.ensure_account(STUDENT).unwrap();
    clock.advance(60_000);
    ledger.credit(STUDENT, 1).unwrap();

    let stamps: (i64, i64) = conn
        .query_row(
            "SELECT created_at, updated_at FROM accounts WHERE user_id = ?1;",
            [STUDENT],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(stamps, (1_700_000_000_000, 1_700_000_060_000));

    clock.advance(60_000);
    ledger.debit(STUDENT, 3).unwrap();
    let updated_at: i64 = conn
        .query_row(
            "SELECT updated_at FROM accounts WHERE user_id = ?1;",
            [STUDENT],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(updated_at, 1_700_000_120_000);
}

#[test]
fn missing_account_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let ledger = AccountLedger::new(SqliteAccountRepository::new(&conn), 10);

    assert!(matches!(
        ledger.get_balance("ghost"),
        Err(EconomyError::NotFound { entity: "account", ref key }) if key == "ghost"
    ));
    assert!(matches!(
        ledger.credit("ghost", 1),
        Err(EconomyError::NotFound { .. })
    ));
    assert!(matches!(
        ledger.debit("ghost", 1),
        Err(EconomyError::NotFound { .. })
    ));
}

#[test]
fn credit_and_debit_return_new_balance() {
    let conn = open_db_in_memory().unwrap();
    let ledger = AccountLedger::new(SqliteAccountRepository::new(&conn), 10);
    ledger.ensure_account(STUDENT).unwrap();

    assert_eq!(ledger.credit(STUDENT, 1).unwrap(), 11);
    assert_eq!(ledger.debit(STUDENT, 3).unwrap(), 8);
    assert_eq!(ledger.get_balance(STUDENT).unwrap(), 8);
}

#[test]
fn debit_is_not_floored_at_zero() {
    let conn = open_db_in_memory().unwrap();
    let ledger = AccountLedger::new(SqliteAccountRepository::new(&conn), 2);
    ledger.ensure_account(STUDENT).unwrap();

    assert_eq!(ledger.debit(STUDENT, 3).unwrap(), -1);
    assert_eq!(ledger.get_balance(STUDENT).unwrap(), -1);
}

#[test]
fn non_positive_amounts_are_rejected_without_mutation() {
    let conn = open_db_in_memory().unwrap();
    let ledger = AccountLedger::new(SqliteAccountRepository::new(&conn), 10);
    ledger.ensure_account(STUDENT).unwrap();

    assert!(matches!(
        ledger.credit(STUDENT, 0),
        Err(EconomyError::InvalidAmount(0))
    ));
    assert!(matches!(
        ledger.debit(STUDENT, -5),
        Err(EconomyError::InvalidAmount(-5))
    ));
    assert_eq!(ledger.get_balance(STUDENT).unwrap(), 10);
}

#[test]
fn concurrent_credits_from_separate_connections_all_apply() {
    const WORKERS: usize = 8;
    const CREDITS_PER_WORKER: usize = 25;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("economy.sqlite3");
    {
        let conn = open_db(&path).unwrap();
        AccountLedger::new(SqliteAccountRepository::new(&conn), 10)
            .ensure_account(STUDENT)
            .unwrap();
    }

    thread::scope(|scope| {
        for _ in 0..WORKERS {
            scope.spawn(|| {
                let conn = open_db(&path).unwrap();
                let ledger = AccountLedger::new(SqliteAccountRepository::new(&conn), 10);
                for _ in 0..CREDITS_PER_WORKER {
                    ledger.credit(STUDENT, 1).unwrap();
                }
            });
        }
    });

    let conn = open_db(&path).unwrap();
    let ledger = AccountLedger::new(SqliteAccountRepository::new(&conn), 10);
    assert_eq!(
        ledger.get_balance(STUDENT).unwrap(),
        10 + (WORKERS * CREDITS_PER_WORKER) as i64
    );
}
