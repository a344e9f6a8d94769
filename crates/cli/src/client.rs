// SPDX-License-Identifier: MIT

//! Thin client for talking to `cairnd` over its Unix socket: one request in,
//! one response out per call, matching the wire protocol's request/response
//! shape exactly.

use cairn_wire::{read_message, write_message, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to cairnd at {path}: {source}")]
    Connect { path: String, source: std::io::Error },

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("cairnd error: {0}")]
    Daemon(String),

    #[error("unexpected response from cairnd")]
    UnexpectedResponse,
}

pub struct DaemonClient {
    socket_path: std::path::PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: impl Into<std::path::PathBuf>) -> Self {
        Self { socket_path: socket_path.into() }
    }

    async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let mut stream = UnixStream::connect(&self.socket_path).await.map_err(|source| ClientError::Connect {
            path: self.socket_path.display().to_string(),
            source,
        })?;
        write_message(&mut stream, request).await?;
        let response: Response = read_message(&mut stream).await?;
        if let Response::Error { message } = response {
            return Err(ClientError::Daemon(message));
        }
        Ok(response)
    }

    pub async fn spawn(&self, task_text: String, priority: cairn_core::Priority) -> Result<cairn_core::AgentId, ClientError> {
        let request = Request::Spawn { task_text, priority, source: None };
        match self.send(&request).await? {
            Response::Spawned { agent_id } => Ok(agent_id),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn accept(&self, agent_id: cairn_core::AgentId) -> Result<(), ClientError> {
        let request = Request::Accept { agent_id };
        match self.send(&request).await? {
            Response::Accepted { .. } => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn reject(&self, agent_id: cairn_core::AgentId) -> Result<(), ClientError> {
        let request = Request::Reject { agent_id };
        match self.send(&request).await? {
            Response::Rejected { .. } => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn get_lifecycle(
        &self,
        agent_id: cairn_core::AgentId,
    ) -> Result<Option<cairn_core::LifecycleRecord>, ClientError> {
        let request = Request::GetLifecycle { agent_id };
        match self.send(&request).await? {
            Response::Lifecycle { record } => Ok(record),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn list_lifecycles(&self) -> Result<Vec<cairn_core::LifecycleRecord>, ClientError> {
        match self.send(&Request::ListLifecycles).await? {
            Response::Lifecycles { records } => Ok(records),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
