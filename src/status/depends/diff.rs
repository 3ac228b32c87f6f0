//! Comparación de snapshots.
//!
//! Reglas:
//! - las claves son el nombre del executor; en un mismo lote gana el último
//! - un snapshot previo vacío solo siembra, nunca notifica
//! - hay transición solo para claves presentes en ambos lados que pasan de
//!   `Some(false)` a `Some(true)`
//! - las claves nuevas no notifican y las desaparecidas se descartan

use super::record::Record;
use std::collections::BTreeMap;

/// Estado del mundo tras la última consulta exitosa
pub type Snapshot = BTreeMap<String, Record>;

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub name: String,
    pub previous: Record,
    pub current: Record,
}

pub fn build_snapshot(records: Vec<Record>) -> Snapshot {
    let mut snapshot = Snapshot::new();
    for record in records {
        snapshot.insert(record.name.clone(), record);
    }
    snapshot
}

pub fn became_available(previous: &Record, current: &Record) -> bool {
    previous.available == Some(false) && current.available == Some(true)
}

/// Devuelve el nuevo snapshot y las transiciones, ordenadas por nombre.
pub fn diff(previous: &Snapshot, records: Vec<Record>) -> (Snapshot, Vec<Transition>) {
    let current = build_snapshot(records);

    if previous.is_empty() {
        return (current, Vec::new());
    }

    let transitions = current
        .iter()
        .filter_map(|(name, now)| {
            let before = previous.get(name)?;
            became_available(before, now).then(|| Transition {
                name: name.clone(),
                previous: before.clone(),
                current: now.clone(),
            })
        })
        .collect();

    (current, transitions)
}
