pub mod ledger;

pub use ledger::PunishmentLedger;
