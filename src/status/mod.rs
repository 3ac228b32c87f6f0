//! Módulo de estado de executors.
//!
//! Consulta la API de WEAO y compara snapshots consecutivos, delegando la
//! lógica a los submódulos en `depends/`.

pub mod depends;

pub use depends::{
    became_available, build_snapshot, diff, parse_records, DisplayAttributes, FetchError, Record,
    Snapshot, StatusFetcher, StatusSource, Transition,
};
