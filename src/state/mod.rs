//! Shared application state and the domain state modules.

pub mod draft;
pub mod game;
pub mod roster;
pub mod score;

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::storage::{MemoryStore, SessionHandle, SessionStore},
};

/// Cheaply cloneable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Handle used to push messages to a connected draft client.
#[derive(Clone)]
pub struct ClientConnection {
    /// Connection identifier, unique per WebSocket.
    pub id: Uuid,
    /// Outbound writer channel for this connection.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state: the injected session store, the registry of
/// live WebSocket connections, and the runtime configuration.
pub struct AppState {
    store: Arc<dyn SessionStore>,
    connections: DashMap<Uuid, ClientConnection>,
    config: AppConfig,
}

impl AppState {
    /// Construct the state with an in-memory session store.
    pub fn new(config: AppConfig) -> SharedState {
        Self::with_store(Arc::new(MemoryStore::new()), config)
    }

    /// Construct the state around an injected store implementation.
    pub fn with_store(store: Arc<dyn SessionStore>, config: AppConfig) -> SharedState {
        Arc::new(Self {
            store,
            connections: DashMap::new(),
            config,
        })
    }

    /// The session store.
    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    /// Look up a session handle, translating a miss into the service error.
    pub fn session(&self, code: &str) -> Result<SessionHandle, crate::error::ServiceError> {
        self.store
            .get(code)
            .ok_or_else(|| crate::error::ServiceError::SessionNotFound(code.to_string()))
    }

    /// Registry of active client sockets keyed by connection id.
    pub fn connections(&self) -> &DashMap<Uuid, ClientConnection> {
        &self.connections
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
