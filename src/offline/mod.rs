//! Offline (idle) XP accrual with an append-only grant ledger.

pub mod ledger;
pub mod scheduler;
pub mod store;

pub use ledger::{CharacterId, Ledger, LedgerEntry};
pub use scheduler::{plan_accrual, run_cycle, AccrualFailure, AccrualPlan, CycleReport, OfflineConfig};
pub use store::{
    AccrualCharacter, AccrualGrant, AccrualStore, MemoryStore, StoreError, StoreSnapshot,
    StoredCharacter,
};
