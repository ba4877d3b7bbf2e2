mod connection_slot;
mod in_memory_test;
mod tokio_postgres;

pub use self::connection_slot::ConnectionSlot;
pub use self::in_memory_test::{
    InMemoryTestDriver, InMemoryTestResponseBuilder, RecordedQuery, TestResponse,
};
pub use self::tokio_postgres::TokioPostgresDriver;
