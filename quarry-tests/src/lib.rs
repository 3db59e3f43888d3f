mod crud;
mod entities;
mod lifecycle;
mod mock;
mod transactions;

pub use crud::crud;
pub use entities::*;
pub use lifecycle::lifecycle;
pub use mock::*;
pub use transactions::transactions;

use log::LevelFilter;
use quarry::SqlWriter;
use std::{env, sync::Arc};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Session scenarios every dialect must pass, run against the mock backend.
pub fn execute_tests(writer: Arc<dyn SqlWriter>) {
    lifecycle(writer.clone());
    transactions(writer.clone());
    crud(writer);
}
