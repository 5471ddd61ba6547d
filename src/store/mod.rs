//! Storage backends. Each store implements every repository trait so that
//! writes spanning tournaments and matches commit together.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
