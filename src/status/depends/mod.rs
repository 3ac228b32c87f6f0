//! Submódulos dependientes para el módulo de estado.

pub mod diff;
pub mod fetcher;
pub mod record;

pub use diff::{became_available, build_snapshot, diff, Snapshot, Transition};
pub use fetcher::{parse_records, FetchError, StatusFetcher, StatusSource};
pub use record::{DisplayAttributes, Record};
