//! Storage Adapters
//!
//! Implementations of the SessionStore and IntakeStore ports.
//!
//! ## Available Adapters
//!
//! - **InMemorySessionStore** - Sessions in memory with idle TTL and capacity eviction
//! - **CsvIntakeStore** - Registrations appended to a CSV file
//! - **InMemoryIntakeStore** - Registrations in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{CsvIntakeStore, InMemorySessionStore};
//!
//! let sessions = InMemorySessionStore::new(3600, 10_000);
//! let intake = CsvIntakeStore::new("files/cadastros.csv");
//! ```

mod csv_intake_store;
mod in_memory_intake_store;
mod in_memory_session_store;

pub use csv_intake_store::{CsvIntakeStore, CSV_HEADER};
pub use in_memory_intake_store::InMemoryIntakeStore;
pub use in_memory_session_store::{
    InMemorySessionStore, DEFAULT_IDLE_TTL_SECS, DEFAULT_MAX_SESSIONS,
};
