//! Lightweight sqlite wrapper on top of the libsqlite3-sys crate, intended for
//! simple read oriented queries against tile stores.
//! For serious database work, use rusqlite or sqlx.

mod connection;
mod row;
mod statement;

#[derive(Debug, Copy, Clone)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
    Create,
}

pub use connection::Connection;
pub use row::Row;
pub use statement::Statement;

pub type Error = inf::Error;
pub type Result<T> = inf::Result<T>;
