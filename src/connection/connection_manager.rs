use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::connection::transport::{Session, Transport};
use crate::error::TransportError;
use crate::events::{EventSender, MonitorEvent};
use crate::ingest::snapshot_ingestor::SnapshotIngestor;
use crate::scheduling::refresh_scheduler::RefreshTrigger;
use crate::store::snapshot_store::SnapshotStore;
use crate::types::connection_state::ConnectionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Refresh,
    Stop,
}

enum SessionEnd {
    Stopped,
    Failed(TransportError),
}

fn refresh_request() -> String {
    json!({ "action": "get_store_data" }).to_string()
}

/// Cloneable entry point for asking the network worker to refresh, usable from any task.
#[derive(Clone)]
pub struct ConnectionHandle {
    commands: mpsc::UnboundedSender<Command>,
    store: Arc<SnapshotStore>,
    shutdown: Arc<AtomicBool>,
}

impl ConnectionHandle {
    /// Returns `false` when the request was dropped because the session is not up.
    pub fn request_refresh(&self) -> bool {
        if self.is_shut_down() {
            debug!("refresh dropped, connection is shut down");
            return false;
        }

        let state = self.store.connection_state();
        if state != ConnectionState::Connected {
            debug!(%state, "refresh dropped, not connected");
            return false;
        }

        self.commands.send(Command::Refresh).is_ok()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

impl RefreshTrigger for ConnectionHandle {
    fn request_refresh(&self) -> bool {
        ConnectionHandle::request_refresh(self)
    }

    fn is_shut_down(&self) -> bool {
        ConnectionHandle::is_shut_down(self)
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("state", &self.store.connection_state())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

/// Owns the streaming session: connects, asks for data, forwards inbound
/// payloads to the ingestor and reconnects after any transport failure.
pub struct ConnectionManager {
    worker: Option<ConnectionWorker>,
    commands: Option<mpsc::UnboundedReceiver<Command>>,
    task: Option<JoinHandle<()>>,
    handle: ConnectionHandle,
    events: EventSender,
}

impl ConnectionManager {
    pub fn new(
        endpoint: impl Into<String>,
        reconnect_delay: Duration,
        transport: Arc<dyn Transport>,
        ingestor: Arc<SnapshotIngestor>,
        store: Arc<SnapshotStore>,
        events: EventSender,
    ) -> Self {
        let (commands_sender, commands) = mpsc::unbounded_channel();

        let handle = ConnectionHandle {
            commands: commands_sender,
            store: Arc::clone(&store),
            shutdown: Arc::new(AtomicBool::new(false)),
        };

        let worker = ConnectionWorker {
            endpoint: endpoint.into(),
            reconnect_delay,
            transport,
            ingestor,
            store,
            events: events.clone(),
        };

        Self {
            worker: Some(worker),
            commands: Some(commands),
            task: None,
            handle,
            events,
        }
    }

    pub fn handle(&self) -> ConnectionHandle {
        self.handle.clone()
    }

    #[cfg(test)]
    pub fn state(&self) -> ConnectionState {
        self.handle.store.connection_state()
    }

    /// Spawns the network worker. Calling it again, or after `stop`, does nothing.
    pub fn start(&mut self) {
        if self.handle.is_shut_down() {
            debug!("start ignored, connection manager was stopped");
            return;
        }

        let (Some(worker), Some(commands)) = (self.worker.take(), self.commands.take()) else {
            debug!("start ignored, connection worker already running");
            return;
        };

        self.task = Some(tokio::spawn(worker.run(commands)));
    }

    /// Closes the session, ends the retry loop and waits for the worker to exit.
    pub async fn stop(&mut self) {
        self.handle.shutdown.store(true, Ordering::SeqCst);
        let _ = self.handle.commands.send(Command::Stop);

        self.worker = None;
        self.commands = None;

        if let Some(task) = self.task.take() {
            if let Err(error) = task.await {
                error!(?error, "connection worker panicked");
            }
        }

        if self.handle.store.set_connection_state(ConnectionState::Disconnected) {
            info!("connection stopped");
            let _ = self
                .events
                .send(MonitorEvent::ConnectionStateChanged(ConnectionState::Disconnected));
        }
    }
}

struct ConnectionWorker {
    endpoint: String,
    reconnect_delay: Duration,
    transport: Arc<dyn Transport>,
    ingestor: Arc<SnapshotIngestor>,
    store: Arc<SnapshotStore>,
    events: EventSender,
}

impl ConnectionWorker {
    async fn run(self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            self.transition(ConnectionState::Connecting);

            let end = tokio::select! {
                connected = self.transport.connect(&self.endpoint) => match connected {
                    Ok(session) => self.run_session(session, &mut commands).await,
                    Err(error) => SessionEnd::Failed(error),
                },
                _ = wait_for_stop(&mut commands) => SessionEnd::Stopped,
            };

            let error = match end {
                SessionEnd::Stopped => break,
                SessionEnd::Failed(error) => error,
            };

            warn!(%error, delay = ?self.reconnect_delay, "websocket connection failed, reconnecting");
            self.transition(ConnectionState::Reconnecting);

            tokio::select! {
                _ = tokio::time::sleep(self.reconnect_delay) => {}
                _ = wait_for_stop(&mut commands) => break,
            }
        }

        info!("connection worker exited");
    }

    async fn run_session(
        &self,
        mut session: Box<dyn Session>,
        commands: &mut mpsc::UnboundedReceiver<Command>,
    ) -> SessionEnd {
        self.transition(ConnectionState::Connected);
        info!(endpoint = %self.endpoint, "websocket connected");

        if let Err(error) = session.send(refresh_request()).await {
            return SessionEnd::Failed(error);
        }

        loop {
            tokio::select! {
                message = session.recv() => match message {
                    Ok(text) => self.forward(&text),
                    Err(error) => return SessionEnd::Failed(error),
                },
                command = commands.recv() => match command {
                    Some(Command::Refresh) => {
                        debug!("requesting store data");
                        if let Err(error) = session.send(refresh_request()).await {
                            return SessionEnd::Failed(error);
                        }
                    }
                    Some(Command::Stop) | None => {
                        session.close().await;
                        return SessionEnd::Stopped;
                    }
                },
            }
        }
    }

    fn forward(&self, text: &str) {
        match self.ingestor.ingest(text) {
            Ok(outcome) => debug!(?outcome, "payload ingested"),
            Err(error) => warn!(%error, "dropping unparseable payload"),
        }
    }

    fn transition(&self, state: ConnectionState) {
        if self.store.set_connection_state(state) {
            info!(%state, status = state.status_label(), "connection state changed");
            let _ = self.events.send(MonitorEvent::ConnectionStateChanged(state));
        }
    }
}

/// Resolves once a stop arrives or every handle is gone; refreshes seen meanwhile are dropped.
async fn wait_for_stop(commands: &mut mpsc::UnboundedReceiver<Command>) {
    loop {
        match commands.recv().await {
            Some(Command::Refresh) => debug!("refresh dropped, not connected"),
            Some(Command::Stop) | None => return,
        }
    }
}
