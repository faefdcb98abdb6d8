pub mod amount;
pub mod expense;
pub mod ledger;
pub mod member;
pub mod settlement;
