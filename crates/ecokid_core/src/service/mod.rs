//! Core use-case services.
//!
//! # Responsibility
//! - `AccountLedger` and `QuotaTracker` own every write to balances and
//!   free-use counters.
//! - `UsageBiller`, `ModerationGate` and `CommentAdmission` compose them into
//!   the value-creating and value-consuming flows.
//! - `EconomyDesk` is the caller-facing facade over one connection.
//!
//! # Invariants
//! - Services never bypass repository contracts.
//! - Every failure either aborts before any mutation or is reported as a
//!   distinct partial outcome (`RewardFailed`, `BillingFailed`).

pub mod admission;
pub mod billing;
pub mod desk;
pub mod error;
pub mod ledger;
pub mod moderation;
pub mod quota;
