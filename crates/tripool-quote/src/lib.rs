//! Pure quoting for the tripool strategy: how much to send into the pool,
//! how many shares to burn on the way out, and what the position is worth.
//! Nothing here talks to a collaborator except through values passed in.

pub mod deposit;
pub mod oracle;
pub mod withdraw;

pub use deposit::{plan_deposit, DepositPlan, DepositRequest};
pub use oracle::value_of;
pub use withdraw::{plan_withdraw_all, plan_withdrawal, WithdrawAllPlan, WithdrawalPlan};
