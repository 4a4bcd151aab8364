#![doc(test(attr(deny(warnings))))]

//! School Core offers the fee-ledger, payroll, promotion, and scheduling
//! engines that power higher level school administration workflows.

pub mod config;
pub mod core;
pub mod errors;
pub mod school;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("School Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
