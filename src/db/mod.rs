mod changes;
mod schema;
mod snapshot;

pub use schema::Database;
