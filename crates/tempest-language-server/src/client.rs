//! Outgoing side of the connection.
//!
//! [`Client`] hands messages to a single writer task through a bounded channel,
//! so responses and log notifications reach the editor in the order they were
//! produced.

use lsp_types::notification::{LogMessage, Notification};
use lsp_types::{LogMessageParams, MessageType};
use serde_json::Value;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::framing::write_message;
use crate::protocol::make_notification;

/// Channel buffer capacity for outgoing messages.
const OUTGOING_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct Client {
    tx: mpsc::Sender<Value>,
}

impl Client {
    /// Create a client and the writer task draining it into `writer`.
    ///
    /// The task ends once every `Client` clone is dropped and the channel is
    /// drained, or when a write fails.
    pub fn spawn<W>(writer: W) -> (Self, JoinHandle<()>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(OUTGOING_CHANNEL_CAPACITY);
        let handle = tokio::spawn(write_loop(rx, writer));
        (Self { tx }, handle)
    }

    /// A client whose messages land in `tx`, for tests.
    pub fn from_sender(tx: mpsc::Sender<Value>) -> Self {
        Self { tx }
    }

    /// Queue a raw message.
    pub async fn send(&self, msg: Value) {
        if self.tx.send(msg).await.is_err() {
            tracing::warn!("client connection closed; dropping outgoing message");
        }
    }

    /// Send a `window/logMessage` notification.
    pub async fn log_message(&self, typ: MessageType, message: impl Into<String>) {
        let params = LogMessageParams {
            typ,
            message: message.into(),
        };
        match serde_json::to_value(params) {
            Ok(params) => self.send(make_notification(LogMessage::METHOD, params)).await,
            Err(e) => tracing::error!("failed to serialize log message: {e}"),
        }
    }
}

async fn write_loop<W>(mut rx: mpsc::Receiver<Value>, mut writer: W)
where
    W: AsyncWrite + Unpin,
{
    while let Some(msg) = rx.recv().await {
        let serialized = match serde_json::to_string(&msg) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("failed to serialize outgoing message: {e}");
                continue;
            }
        };
        tracing::trace!(direction = "server->client", %serialized);
        if let Err(e) = write_message(&mut writer, &serialized).await {
            tracing::warn!("failed to write to client: {e}");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::MessageReader;
    use serde_json::json;

    #[tokio::test]
    async fn test_messages_are_framed_in_order() {
        let (client_side, server_side) = tokio::io::duplex(4096);
        let (client, writer) = Client::spawn(server_side);

        client.log_message(MessageType::INFO, "first").await;
        client.send(json!({"jsonrpc": "2.0", "id": 1, "result": null})).await;
        drop(client);
        writer.await.unwrap();

        let mut reader = MessageReader::new(client_side);
        let first: Value =
            serde_json::from_str(&reader.next_message().await.unwrap().unwrap()).unwrap();
        assert_eq!(first["method"], "window/logMessage");
        assert_eq!(first["params"]["type"], 3);
        assert_eq!(first["params"]["message"], "first");

        let second: Value =
            serde_json::from_str(&reader.next_message().await.unwrap().unwrap()).unwrap();
        assert_eq!(second["id"], 1);
    }
}
