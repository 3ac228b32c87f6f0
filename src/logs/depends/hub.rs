//! Buffer circular de logs con difusión a los clientes del panel.
//!
//! Cada línea publicada se guarda (capacidad fija) y se reenvía por un canal
//! `broadcast`. Un cliente nuevo recibe primero el historial y después las
//! líneas en vivo, sin huecos ni duplicados.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;

/// Capacidad del historial que se reproduce a cada cliente nuevo
pub const LOG_HISTORY_CAPACITY: usize = 50;

const BROADCAST_CAPACITY: usize = 256;

#[derive(Debug)]
pub struct LogHub {
    history: Mutex<VecDeque<String>>,
    capacity: usize,
    log_tx: broadcast::Sender<String>,
}

impl LogHub {
    pub fn new(capacity: usize) -> Self {
        let (log_tx, _log_rx) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            history: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            log_tx,
        }
    }

    /// Formatea `message` con la hora UTC actual y lo publica.
    pub fn publish(&self, message: &str) -> String {
        self.publish_at(Utc::now(), message)
    }

    pub fn publish_at(&self, at: DateTime<Utc>, message: &str) -> String {
        let line = format_line(at, message);
        self.push_line(line.clone());
        line
    }

    /// Añade una línea ya formateada al historial y la difunde.
    pub fn push_line(&self, line: String) {
        let mut history = self.lock_history();
        if self.capacity == 0 {
            let _ = self.log_tx.send(line);
            return;
        }
        while history.len() >= self.capacity {
            history.pop_front();
        }
        history.push_back(line.clone());
        // Sin suscriptores `send` falla; no es un error para nosotros.
        let _ = self.log_tx.send(line);
    }

    pub fn history(&self) -> Vec<String> {
        self.lock_history().iter().cloned().collect()
    }

    /// Historial y suscripción tomados bajo el mismo candado.
    pub fn attach(&self) -> (Vec<String>, broadcast::Receiver<String>) {
        let history = self.lock_history();
        let rx = self.log_tx.subscribe();
        (history.iter().cloned().collect(), rx)
    }

    pub fn subscriber_count(&self) -> usize {
        self.log_tx.receiver_count()
    }

    fn lock_history(&self) -> MutexGuard<'_, VecDeque<String>> {
        // Un pánico a mitad de un push no deja el buffer en un estado inválido.
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for LogHub {
    fn default() -> Self {
        Self::new(LOG_HISTORY_CAPACITY)
    }
}

pub fn format_line(at: DateTime<Utc>, message: &str) -> String {
    format!("[{}] {}", at.format("%H:%M:%S UTC"), message)
}
