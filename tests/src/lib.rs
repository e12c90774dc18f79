pub mod exec_log;
pub use exec_log::ExecLog;

pub mod logging_driver;
pub use logging_driver::LoggingDriver;

pub mod models;

use models::{Invoice, InvoiceLine, Order, OrderItem, Person, Profile, Tag, User};

use torpor::{Db, Result};
use torpor_driver_memory::Memory;

/// Builds a database over a fresh in-memory store with every test model
/// registered, plus a handle to the driver operation log.
pub async fn store() -> Result<(Db, ExecLog)> {
    let driver = LoggingDriver::new(Box::new(Memory::new()));
    let log = driver.log();

    let db = Db::builder()
        .register::<Person>()
        .register::<Order>()
        .register::<OrderItem>()
        .register::<Invoice>()
        .register::<InvoiceLine>()
        .register::<User>()
        .register::<Profile>()
        .register::<Tag>()
        .build(Box::new(driver))
        .await?;

    Ok((db, log))
}
