//! Manejo de conexiones WebSocket del panel en vivo.
//!
//! Al conectar se envía el historial una sola vez; después cada línea nueva.
//! El cliente no tiene control: los mensajes entrantes se ignoran.

use crate::error::WatchError;
use crate::logs::LogHub;
use crate::metrics::MetricsCollector;
use axum::extract::ws::{Message, WebSocket};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

/// Trama enviada al navegador: `{"event": "...", "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum DashboardEvent {
    NewLog(String),
    History(Vec<String>),
}

impl DashboardEvent {
    pub fn to_frame(&self) -> Result<String, WatchError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Clone)]
pub struct LogSocket {
    hub: Arc<LogHub>,
}

impl LogSocket {
    pub fn new(hub: Arc<LogHub>) -> Self {
        Self { hub }
    }

    pub async fn handle_connection(&self, mut socket: WebSocket) {
        let _client = MetricsCollector::track_dashboard_client();
        log::info!("--> [Web Console] A user connected to the status page.");

        let (history, mut log_rx) = self.hub.attach();
        if send_event(&mut socket, &DashboardEvent::History(history)).await.is_ok() {
            loop {
                tokio::select! {
                    msg = socket.recv() => {
                        match msg {
                            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                            _ => {}
                        }
                    }

                    line = log_rx.recv() => {
                        match line {
                            Ok(line) => {
                                if send_event(&mut socket, &DashboardEvent::NewLog(line)).await.is_err() {
                                    break;
                                }
                            }
                            Err(RecvError::Lagged(skipped)) => {
                                log::debug!("dashboard: slow client, {} lines skipped", skipped);
                            }
                            Err(RecvError::Closed) => break,
                        }
                    }
                }
            }
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &DashboardEvent) -> Result<(), WatchError> {
    let frame = event.to_frame()?;
    socket
        .send(Message::Text(frame))
        .await
        .map_err(|e| WatchError::Dashboard(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_use_event_and_data_keys() {
        let frame = DashboardEvent::NewLog("[00:00:00 UTC] hola".into()).to_frame().unwrap();
        assert_eq!(frame, r#"{"event":"new_log","data":"[00:00:00 UTC] hola"}"#);

        let frame = DashboardEvent::History(vec!["a".into(), "b".into()]).to_frame().unwrap();
        assert_eq!(frame, r#"{"event":"history","data":["a","b"]}"#);
    }
}
