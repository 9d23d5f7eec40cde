pub mod decision;
pub mod ledger;
pub mod proximity;
pub mod selector;
