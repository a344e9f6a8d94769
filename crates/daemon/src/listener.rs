// SPDX-License-Identifier: MIT

//! Unix-socket listener: accepts connections and dispatches each framed
//! `cairn_wire::Request` to the [`Orchestrator`], one spawned task per
//! connection so a slow or stuck client never blocks another.

use crate::orchestrator::Orchestrator;
use cairn_wire::{read_message, write_message, ProtocolError, Request, Response};
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;

pub struct Listener {
    socket: UnixListener,
    orchestrator: Arc<Orchestrator>,
}

impl Listener {
    pub fn new(socket: UnixListener, orchestrator: Arc<Orchestrator>) -> Self {
        Self { socket, orchestrator }
    }

    /// Accepts connections until `cancel` fires. Already-accepted connections
    /// run to completion even after cancellation; this call returns once the
    /// accept loop itself stops.
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = self.socket.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => {
                            let orchestrator = Arc::clone(&self.orchestrator);
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, &orchestrator).await {
                                    tracing::debug!(error = %e, "connection ended with an error");
                                }
                            });
                        }
                        Err(e) => tracing::warn!(error = %e, "accept error"),
                    }
                }
            }
        }
    }
}

async fn handle_connection(mut stream: UnixStream, orchestrator: &Arc<Orchestrator>) -> Result<(), ProtocolError> {
    let request: Request = read_message(&mut stream).await?;
    tracing::debug!(request = ?request, "received request");
    let response = handle_request(request, orchestrator).await;
    write_message(&mut stream, &response).await
}

async fn handle_request(request: Request, orchestrator: &Arc<Orchestrator>) -> Response {
    match request {
        Request::Spawn { task_text, priority, source: _ } => match orchestrator.spawn(task_text, priority).await {
            Ok(agent_id) => Response::Spawned { agent_id },
            Err(e) => Response::Error { message: e.to_string() },
        },
        Request::Accept { agent_id } => match orchestrator.accept(&agent_id).await {
            Ok(()) => Response::Accepted { agent_id },
            Err(e) => Response::Error { message: e.to_string() },
        },
        Request::Reject { agent_id } => match orchestrator.reject(&agent_id).await {
            Ok(()) => Response::Rejected { agent_id },
            Err(e) => Response::Error { message: e.to_string() },
        },
        Request::GetLifecycle { agent_id } => match orchestrator.get_lifecycle(&agent_id).await {
            Ok(record) => Response::Lifecycle { record },
            Err(e) => Response::Error { message: e.to_string() },
        },
        Request::ListLifecycles => match orchestrator.list_lifecycles().await {
            Ok(records) => Response::Lifecycles { records },
            Err(e) => Response::Error { message: e.to_string() },
        },
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
