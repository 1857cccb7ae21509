//! The language server: lifecycle, document sync and view analysis.
//!
//! [`run`] owns the read loop. Incoming messages are handled one at a time on
//! the loop task, so document state needs no locking; everything outgoing goes
//! through the [`Client`] writer task.

use lsp_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    InitializeResult, MessageType, ServerCapabilities, ServerInfo, TextDocumentItem,
    TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions, Uri,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tempest_php_parser::PhpParser;
use tempest_view_intelligence::{
    ViewAnalysisReport, ViewAnalysisResult, ViewIntelligence, ViewTarget,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tree_sitter::Tree;

use crate::client::Client;
use crate::config::ServerConfig;
use crate::document::{Document, DocumentStore};
use crate::framing::MessageReader;
use crate::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, Incoming, METHOD_NOT_FOUND, PARSE_ERROR,
    SERVER_NOT_INITIALIZED, VIEW_CALLS_METHOD, ViewCallsParams, make_error_response,
    make_response,
};

/// Name reported in the `initialize` result.
pub const SERVER_NAME: &str = "Tempest Language Server";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    ShuttingDown,
}

/// What the read loop should do after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug)]
pub struct TempestLanguageServer {
    config: ServerConfig,
    target: ViewTarget,
    parser: PhpParser,
    client: Client,
    documents: DocumentStore,
    state: LifecycleState,
}

impl TempestLanguageServer {
    /// # Errors
    ///
    /// Fails if the PHP grammar cannot be loaded.
    pub fn new(config: ServerConfig, client: Client) -> anyhow::Result<Self> {
        let parser = PhpParser::new()?;
        Ok(Self {
            target: config.view_target(),
            config,
            parser,
            client,
            documents: DocumentStore::new(),
            state: LifecycleState::Uninitialized,
        })
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Handle one raw message body.
    pub async fn handle_message(&mut self, raw: &str) -> Flow {
        let msg: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("failed to parse client JSON: {e}");
                let message = format!("Parse error: {e}");
                self.client
                    .send(make_error_response(Value::Null, PARSE_ERROR, &message))
                    .await;
                return Flow::Continue;
            }
        };

        tracing::debug!(direction = "client->server", %msg);

        match Incoming::classify(msg) {
            Incoming::Request { id, method, params } => {
                let response = self.handle_request(id, &method, params);
                self.client.send(response).await;
                Flow::Continue
            }
            Incoming::Notification { method, params } => {
                self.handle_notification(&method, params).await
            }
            Incoming::Response { id } => {
                tracing::debug!(%id, "ignoring response from client");
                Flow::Continue
            }
            Incoming::Invalid { id, reason } => {
                self.client
                    .send(make_error_response(id, INVALID_REQUEST, &reason))
                    .await;
                Flow::Continue
            }
        }
    }

    fn handle_request(&mut self, id: Value, method: &str, params: Value) -> Value {
        match self.state {
            LifecycleState::Uninitialized if method != "initialize" => {
                return make_error_response(id, SERVER_NOT_INITIALIZED, "Server not initialized");
            }
            LifecycleState::ShuttingDown => {
                return make_error_response(id, INVALID_REQUEST, "Server is shutting down");
            }
            _ => {}
        }

        match method {
            "initialize" => {
                if self.state == LifecycleState::Initialized {
                    return make_error_response(id, INVALID_REQUEST, "Server already initialized");
                }
                self.state = LifecycleState::Initialized;
                tracing::info!("initialize");
                match serde_json::to_value(initialize_result()) {
                    Ok(result) => make_response(id, result),
                    Err(e) => make_error_response(id, INTERNAL_ERROR, &e.to_string()),
                }
            }
            "shutdown" => {
                self.state = LifecycleState::ShuttingDown;
                tracing::info!("shutdown requested");
                make_response(id, Value::Null)
            }
            VIEW_CALLS_METHOD => match parse_params::<ViewCallsParams>(params) {
                Ok(params) => self.view_calls(id, &params.text_document.uri),
                Err(message) => make_error_response(id, INVALID_PARAMS, &message),
            },
            other => {
                make_error_response(id, METHOD_NOT_FOUND, &format!("Method not found: {other}"))
            }
        }
    }

    async fn handle_notification(&mut self, method: &str, params: Value) -> Flow {
        if method == "exit" {
            tracing::info!("exit");
            return Flow::Exit;
        }
        if self.state != LifecycleState::Initialized {
            tracing::debug!(method, state = ?self.state, "dropping notification");
            return Flow::Continue;
        }

        match method {
            "initialized" => {
                self.client.log_message(MessageType::INFO, "server initialized!").await;
            }
            "textDocument/didOpen" => {
                if let Some(params) =
                    notification_params::<DidOpenTextDocumentParams>(method, params)
                {
                    self.register_document(params.text_document).await;
                }
            }
            "textDocument/didChange" => {
                if let Some(params) =
                    notification_params::<DidChangeTextDocumentParams>(method, params)
                {
                    self.change_document(params).await;
                }
            }
            "textDocument/didClose" => {
                if let Some(params) =
                    notification_params::<DidCloseTextDocumentParams>(method, params)
                {
                    self.unregister_document(&params.text_document.uri).await;
                }
            }
            other => tracing::debug!(method = other, "ignoring notification"),
        }
        Flow::Continue
    }

    /// Parse, analyze and store a newly opened document.
    pub async fn register_document(&mut self, item: TextDocumentItem) {
        let TextDocumentItem {
            uri,
            language_id,
            version,
            text,
        } = item;

        let name = uri.as_str();

        if !self.config.accepts_language(&language_id) {
            self.log(MessageType::WARNING, format!("Skipping non-PHP document: {name}"))
                .await;
            return;
        }

        let Some(tree) = self.parse(name, &text).await else {
            return;
        };

        let message = if self.config.log_parse_tree {
            format!(
                "Registered document {name}, parsed as:\n\n {}",
                tree.root_node().to_sexp()
            )
        } else {
            format!("Registered document {name}")
        };
        self.log(MessageType::INFO, message).await;

        let analysis = self.analyze(name, &tree, &text).await;
        self.documents.insert(Document {
            uri,
            language_id,
            version,
            text,
            tree,
            analysis,
        });
    }

    /// Apply a full-content change to an open document.
    async fn change_document(&mut self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let name = uri.as_str();

        let Some(current) = self.documents.get(&uri).map(|doc| doc.version) else {
            self.log(MessageType::WARNING, format!("Ignoring change for unknown document: {name}"))
                .await;
            return;
        };
        if version < current {
            tracing::debug!(uri = name, version, current, "ignoring stale change");
            return;
        }

        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        if change.range.is_some() {
            tracing::warn!(uri = name, "ignoring ranged change; only full sync is supported");
            return;
        }

        let Some(tree) = self.parse(name, &change.text).await else {
            return;
        };
        let analysis = self.analyze(name, &tree, &change.text).await;

        if let Some(doc) = self.documents.get_mut(&uri) {
            doc.version = version;
            doc.text = change.text;
            doc.tree = tree;
            doc.analysis = analysis;
        }
        tracing::debug!(uri = uri.as_str(), version, "document updated");
    }

    pub async fn unregister_document(&mut self, uri: &Uri) {
        let name = uri.as_str();
        if self.documents.remove(uri).is_some() {
            self.log(MessageType::INFO, format!("Unregistered document {name}"))
                .await;
        } else {
            tracing::debug!(uri = name, "close for unknown document");
        }
    }

    async fn parse(&self, uri: &str, text: &str) -> Option<Tree> {
        match self.parser.parse(text, None) {
            Ok(tree) => Some(tree),
            Err(e) => {
                tracing::debug!(%uri, "parse failed: {e}");
                self.log(MessageType::ERROR, format!("Could not parse document: {uri}"))
                    .await;
                None
            }
        }
    }

    async fn analyze(&self, uri: &str, tree: &Tree, text: &str) -> Option<ViewAnalysisResult> {
        match ViewIntelligence::analyze(tree, text, &self.target) {
            Ok(result) => {
                tracing::debug!(%uri, calls = result.call_count(), "view analysis complete");
                if self.config.report_to_client {
                    for line in ViewAnalysisReport::lines(&result, uri) {
                        self.client.log_message(MessageType::INFO, line).await;
                    }
                }
                Some(result)
            }
            Err(e) => {
                self.log(MessageType::ERROR, format!("View analysis failed for {uri}: {e}"))
                    .await;
                None
            }
        }
    }

    fn view_calls(&self, id: Value, uri: &Uri) -> Value {
        let name = uri.as_str();
        let Some(doc) = self.documents.get(uri) else {
            return make_error_response(id, INVALID_PARAMS, &format!("Unknown document: {name}"));
        };
        let Some(analysis) = &doc.analysis else {
            return make_error_response(id, INTERNAL_ERROR, &format!("No view analysis for {name}"));
        };

        let mut imports = Vec::with_capacity(analysis.imports.len());
        for (name, import_type) in &analysis.imports {
            let mut entry = match serde_json::to_value(import_type) {
                Ok(v) => v,
                Err(e) => return make_error_response(id, INTERNAL_ERROR, &e.to_string()),
            };
            if let Value::Object(map) = &mut entry {
                map.insert("name".to_string(), Value::String(name.clone()));
            }
            imports.push(entry);
        }

        make_response(
            id,
            json!({
                "uri": doc.uri.as_str(),
                "version": doc.version,
                "imports": imports,
                "calls": analysis.calls,
            }),
        )
    }

    /// Log to both the editor and the local trace output.
    async fn log(&self, typ: MessageType, message: String) {
        match typ {
            MessageType::ERROR => tracing::error!("{message}"),
            MessageType::WARNING => tracing::warn!("{message}"),
            _ => tracing::info!("{message}"),
        }
        self.client.log_message(typ, message).await;
    }
}

/// Full document sync with open/close notifications; nothing else is offered.
fn initialize_result() -> InitializeResult {
    InitializeResult {
        capabilities: ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    ..Default::default()
                },
            )),
            ..Default::default()
        },
        server_info: Some(ServerInfo {
            name: SERVER_NAME.to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, String> {
    serde_json::from_value(params).map_err(|e| format!("Invalid params: {e}"))
}

/// Notifications cannot be answered, so bad params are only logged.
fn notification_params<T: DeserializeOwned>(method: &str, params: Value) -> Option<T> {
    match parse_params(params) {
        Ok(p) => Some(p),
        Err(message) => {
            tracing::warn!(method, "{message}");
            None
        }
    }
}

/// Serve the protocol on `input`/`output` until `exit` or EOF.
///
/// Returns `true` if `shutdown` was received before the loop ended, which is
/// what decides the process exit code.
///
/// # Errors
///
/// Returns an error if the grammar cannot be loaded or the input stream is
/// not valid framed JSON-RPC.
pub async fn run<R, W>(config: ServerConfig, input: R, output: W) -> anyhow::Result<bool>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (client, writer) = Client::spawn(output);
    let mut server = TempestLanguageServer::new(config, client)?;
    let mut reader = MessageReader::new(input);

    let result = loop {
        let raw = match reader.next_message().await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::info!("client EOF, shutting down");
                break Ok(());
            }
            Err(e) => break Err(e),
        };
        if server.handle_message(&raw).await == Flow::Exit {
            break Ok(());
        }
    };

    let clean = server.state() == LifecycleState::ShuttingDown;
    // Dropping the server drops the last client handle so the writer drains.
    drop(server);
    if let Err(e) = writer.await {
        tracing::warn!("writer task failed: {e}");
    }

    result?;
    Ok(clean)
}
