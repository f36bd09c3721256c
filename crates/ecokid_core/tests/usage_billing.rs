use ecokid_core::db::open_db_in_memory;
use ecokid_core::{
    AccountLedger, Charge, EconomyError, ManualClock, QuotaTracker, ResetRule,
    SqliteAccountRepository, SqliteUsageRepository, UsageBiller, WEEK_MS,
};

const STUDENT: &str = "student-0412";
const START_MS: i64 = 1_700_000_000_000;
const RULE: ResetRule = ResetRule {
    period_ms: WEEK_MS,
    free_uses: 1,
};

#[test]
fn free_use_first_then_three_points() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(START_MS);
    let ledger = AccountLedger::new(SqliteAccountRepository::new(&conn), 10);
    let quota = QuotaTracker::new(SqliteUsageRepository::new(&conn), &clock, RULE);
    ledger.ensure_account(STUDENT).unwrap();
    quota.ensure_usage(STUDENT).unwrap();
    let biller = UsageBiller::new(&ledger, &quota, 3);

    assert_eq!(biller.charge_for_ai_action(STUDENT).unwrap(), Charge::FreeUse);
    assert_eq!(quota.get_usage(STUDENT).unwrap().free_usage_count, 0);
    assert_eq!(ledger.get_balance(STUDENT).unwrap(), 10);

    assert_eq!(
        biller.charge_for_ai_action(STUDENT).unwrap(),
        Charge::Points {
            amount: 3,
            balance: 7
        }
    );
    assert_eq!(quota.get_usage(STUDENT).unwrap().free_usage_count, 0);
    assert_eq!(ledger.get_balance(STUDENT).unwrap(), 7);
}

#[test]
fn weekly_reset_makes_the_next_charge_free_again() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(START_MS);
    let ledger = AccountLedger::new(SqliteAccountRepository::new(&conn), 10);
    let quota = QuotaTracker::new(SqliteUsageRepository::new(&conn), &clock, RULE);
    ledger.ensure_account(STUDENT).unwrap();
    quota.ensure_usage(STUDENT).unwrap();
    let biller = UsageBiller::new(&ledger, &quota, 3);

    biller.charge_for_ai_action(STUDENT).unwrap();
    clock.advance(WEEK_MS + 1);
    assert_eq!(biller.charge_for_ai_action(STUDENT).unwrap(), Charge::FreeUse);
    assert_eq!(ledger.get_balance(STUDENT).unwrap(), 10);
}

#[test]
fn charge_debits_even_below_cost() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(START_MS);
    let ledger = AccountLedger::new(SqliteAccountRepository::new(&conn), 1);
    let quota = QuotaTracker::new(
        SqliteUsageRepository::new(&conn),
        &clock,
        ResetRule {
            period_ms: WEEK_MS,
            free_uses: 0,
        },
    );
    ledger.ensure_account(STUDENT).unwrap();
    quota.ensure_usage(STUDENT).unwrap();
    let biller = UsageBiller::new(&ledger, &quota, 3);

    assert!(matches!(
        biller.precheck(STUDENT),
        Err(EconomyError::InsufficientFunds {
            balance: 1,
            required: 3
        })
    ));
    assert_eq!(
        biller.charge_for_ai_action(STUDENT).unwrap(),
        Charge::Points {
            amount: 3,
            balance: -2
        }
    );
}

#[test]
fn precheck_passes_with_free_use_or_enough_points() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(START_MS);
    let ledger = AccountLedger::new(SqliteAccountRepository::new(&conn), 3);
    let quota = QuotaTracker::new(SqliteUsageRepository::new(&conn), &clock, RULE);
    ledger.ensure_account(STUDENT).unwrap();
    quota.ensure_usage(STUDENT).unwrap();
    let biller = UsageBiller::new(&ledger, &quota, 3);

    biller.precheck(STUDENT).unwrap();
    biller.charge_for_ai_action(STUDENT).unwrap();
    biller.precheck(STUDENT).unwrap();
    biller.charge_for_ai_action(STUDENT).unwrap();
    assert!(matches!(
        biller.precheck(STUDENT),
        Err(EconomyError::InsufficientFunds {
            balance: 0,
            required: 3
        })
    ));
}

#[test]
fn uninitialized_student_cannot_be_charged() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(START_MS);
    let ledger = AccountLedger::new(SqliteAccountRepository::new(&conn), 10);
    let quota = QuotaTracker::new(SqliteUsageRepository::new(&conn), &clock, RULE);
    let biller = UsageBiller::new(&ledger, &quota, 3);

    assert!(matches!(
        biller.charge_for_ai_action("ghost"),
        Err(EconomyError::NotFound { .. })
    ));
}
