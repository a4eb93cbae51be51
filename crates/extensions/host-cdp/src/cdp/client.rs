//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::protocol::{BrowserVersion, CdpEvent, CdpRequest, CdpResponse, PageInfo};
use super::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>>;
type EventRoutes = Arc<RwLock<HashMap<String, mpsc::UnboundedSender<CdpEvent>>>>;

const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Request/response plumbing shared by the client and its page sessions.
pub(crate) struct Transport {
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: Pending,
}

impl Transport {
    /// Send a CDP command and wait for its response.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(|s| s.to_string()),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        {
            let mut ws = self.ws_tx.lock().await;
            if let Err(e) = ws.send(Message::Text(json.into())).await {
                self.pending.lock().remove(&id);
                return Err(e.into());
            }
        }

        match tokio::time::timeout(CALL_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }
}

/// CDP client connected to one browser.
pub struct CdpClient {
    http_endpoint: String,
    transport: Arc<Transport>,
    routes: EventRoutes,
    _recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome at the given endpoint (e.g. `http://localhost:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = url::Url::parse(endpoint)?.as_str().trim_end_matches('/').to_string();

        let version_url = format!("{}/json/version", http_endpoint);
        debug!("Fetching browser version from {}", version_url);

        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;

        let (ws_stream, _) = tokio_tungstenite::connect_async(&version.web_socket_debugger_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let routes: EventRoutes = Arc::new(RwLock::new(HashMap::new()));

        let recv_task = tokio::spawn(Self::receive_loop(
            ws_source,
            pending.clone(),
            routes.clone(),
        ));

        debug!("Connected to {} at {}", version.browser, version.web_socket_debugger_url);

        Ok(Self {
            http_endpoint,
            transport: Arc::new(Transport {
                ws_tx: tokio::sync::Mutex::new(ws_sink),
                request_id: AtomicU64::new(1),
                pending,
            }),
            routes,
            _recv_task: recv_task,
        })
    }

    async fn receive_loop(mut ws_source: WsSource, pending: Pending, routes: EventRoutes) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => match serde_json::from_str::<CdpResponse>(&text) {
                    Ok(resp) => Self::dispatch(resp, &pending, &routes).await,
                    Err(e) => warn!("Failed to parse CDP message: {}", e),
                },
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        // Dropping the senders fails in-flight calls and ends every event stream.
        pending.lock().clear();
        routes.write().await.clear();
    }

    async fn dispatch(resp: CdpResponse, pending: &Pending, routes: &EventRoutes) {
        if let Some(id) = resp.id {
            let Some(tx) = pending.lock().remove(&id) else {
                return;
            };
            let result = match resp.error {
                Some(error) => Err(CdpError::Protocol {
                    code: error.code,
                    message: error.message,
                }),
                None => Ok(resp.result.unwrap_or(Value::Null)),
            };
            let _ = tx.send(result);
            return;
        }

        let Some(method) = resp.method else {
            return;
        };
        let params = resp.params.unwrap_or(Value::Null);

        // Browser-level detach notices name the session in their params.
        let session_id = resp
            .session_id
            .or_else(|| params["sessionId"].as_str().map(|s| s.to_string()))
            .unwrap_or_default();

        trace!("CDP event {} for session {:?}", method, session_id);
        let routes = routes.read().await;
        if let Some(tx) = routes.get(&session_id) {
            let _ = tx.send(CdpEvent { method, params });
        }
    }

    /// List all targets from the HTTP endpoint.
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>, CdpError> {
        let url = format!("{}/json/list", self.http_endpoint);
        let pages: Vec<PageInfo> = reqwest::get(&url).await?.json().await?;
        Ok(pages)
    }

    /// Attach to `target_id`, or to the first open page when `None`.
    pub async fn attach(&self, target_id: Option<&str>) -> Result<PageSession, CdpError> {
        let target_id = match target_id {
            Some(id) => id.to_string(),
            None => self
                .list_pages()
                .await?
                .into_iter()
                .find(|p| p.is_page())
                .map(|p| p.id)
                .ok_or_else(|| CdpError::PageNotFound("no open page".to_string()))?,
        };

        let result = self
            .transport
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
                None,
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.routes.write().await.insert(session_id.clone(), event_tx);

        let session = PageSession::new(target_id, session_id, self.transport.clone(), event_rx);
        session.enable_domains().await?;
        Ok(session)
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self._recv_task.abort();
    }
}
