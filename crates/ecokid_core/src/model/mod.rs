//! Domain model for the student economy.
//!
//! # Responsibility
//! - Define the records owned by the ledger, quota tracker and comment
//!   admission.
//! - Keep pure state rules (lazy reset, comment validity) next to the data.
//!
//! # Invariants
//! - Exactly one `Account` and one `AiUsage` exist per student `user_id`.
//! - A stored `Comment` always has `is_passed == true`.

pub mod account;
pub mod article;
pub mod comment;
pub mod usage;
