//! One WebSocket to one browser target, multiplexing RPC and events.
//!
//! Grounded on the teacher's `csa-acp` connection/transport split (session
//! lifecycle as an options-carrying struct) and spec.md §9's suggested
//! shape: a dedicated reader task pushing frames into a per-request
//! completion map keyed by id, with a waiter that races the completion
//! against a timeout.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::config::CdpConfig;
use crate::discovery;
use crate::error::CdpError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type EventHandler = Arc<dyn Fn(Value) + Send + Sync>;

struct Inner {
    write: Mutex<futures_util::stream::SplitSink<WsStream, Message>>,
    next_id: AtomicI64,
    pending: Mutex<HashMap<i64, oneshot::Sender<Value>>>,
    handlers: Mutex<HashMap<String, EventHandler>>,
    stop: AtomicBool,
    connected: AtomicBool,
}

pub struct CdpSession {
    inner: Arc<Inner>,
    config: CdpConfig,
    reader: Option<tokio::task::JoinHandle<()>>,
}

impl CdpSession {
    /// Implements spec.md §4.2's connect sequence: HTTP discovery, then
    /// WebSocket dial (optionally through an HTTP CONNECT proxy tunnel).
    pub async fn connect(config: CdpConfig) -> Result<Self, CdpError> {
        let client = reqwest::Client::new();
        let ws_url = discovery::resolve_websocket_url(&client, &config).await?;

        let stream = if let (false, Some(proxy_host), Some(proxy_port)) =
            (config.no_proxy, config.proxy_host.clone(), config.proxy_port)
        {
            dial_through_proxy(&ws_url, &proxy_host, proxy_port, &config).await?
        } else {
            let (stream, _resp) = tokio_tungstenite::connect_async(&ws_url)
                .await
                .map_err(CdpError::Ws)?;
            stream
        };

        let (write, mut read) = stream.split();

        let inner = Arc::new(Inner {
            write: Mutex::new(write),
            next_id: AtomicI64::new(1),
            pending: Mutex::new(HashMap::new()),
            handlers: Mutex::new(HashMap::new()),
            stop: AtomicBool::new(false),
            connected: AtomicBool::new(true),
        });

        let reader_inner = inner.clone();
        let reader = tokio::spawn(async move {
            loop {
                if reader_inner.stop.load(Ordering::Relaxed) {
                    break;
                }
                match tokio::time::timeout(Duration::from_millis(1000), read.next()).await {
                    Ok(Some(Ok(Message::Text(text)))) => {
                        if let Ok(frame) = serde_json::from_str::<Value>(&text) {
                            dispatch_frame(&reader_inner, frame).await;
                        }
                    }
                    Ok(Some(Ok(_))) => {
                        // binary/ping/pong/close frames carry no application data here
                    }
                    Ok(Some(Err(_))) | Ok(None) => {
                        reader_inner.connected.store(false, Ordering::Relaxed);
                        break;
                    }
                    Err(_) => {
                        // read-timeout: non-fatal, loop back to poll the stop flag
                    }
                }
            }
        });

        Ok(Self {
            inner,
            config,
            reader: Some(reader),
        })
    }

    pub fn config(&self) -> &CdpConfig {
        &self.config
    }

    /// Registers an event handler for `method`. Replaces any previous
    /// handler for the same method, matching spec.md's "at most one
    /// registered handler per method" ordering guarantee.
    pub async fn on_event<F>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.inner
            .handlers
            .lock()
            .await
            .insert(method.into(), Arc::new(handler));
    }

    /// Sends `{id, method, params}` and waits up to `command_timeout` for
    /// the matching response.
    pub async fn send_command(&self, method: &str, params: Value) -> Result<Value, CdpError> {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.inner.pending.lock().await.insert(id, tx);

        let frame = json!({ "id": id, "method": method, "params": params });
        {
            let mut write = self.inner.write.lock().await;
            write
                .send(Message::Text(frame.to_string().into()))
                .await
                .map_err(CdpError::Ws)?;
        }

        let response = tokio::time::timeout(self.config.command_timeout, rx).await;
        match response {
            Ok(Ok(value)) => {
                if let Some(error) = value.get("error") {
                    let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
                    let message = error
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string();
                    return Err(CdpError::Protocol { code, message });
                }
                Ok(value)
            }
            Ok(Err(_)) => Err(CdpError::Connection("reader task dropped".into())),
            Err(_) => {
                self.inner.pending.lock().await.remove(&id);
                Err(CdpError::Timeout)
            }
        }
    }

    /// `Runtime.evaluate` with expression `1`; success if the response
    /// carries a `result` object.
    pub async fn health_check(&self) -> Result<bool, CdpError> {
        let resp = self
            .send_command("Runtime.evaluate", json!({ "expression": "1" }))
            .await?;
        Ok(resp.get("result").is_some())
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Relaxed)
    }

    /// Flips the stop flag, joins the reader task (bounded wait), closes
    /// the socket ignoring errors. Idempotent.
    pub async fn disconnect(&mut self) {
        self.inner.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.reader.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
        let mut write = self.inner.write.lock().await;
        let _ = write.close().await;
        self.inner.connected.store(false, Ordering::Relaxed);
    }
}

async fn dispatch_frame(inner: &Arc<Inner>, frame: Value) {
    if let Some(id) = frame.get("id").and_then(Value::as_i64) {
        if let Some(tx) = inner.pending.lock().await.remove(&id) {
            let _ = tx.send(frame);
        }
        return;
    }
    if let Some(method) = frame.get("method").and_then(Value::as_str) {
        let handler = inner.handlers.lock().await.get(method).cloned();
        if let Some(handler) = handler {
            let params = frame.get("params").cloned().unwrap_or(Value::Null);
            handler(params);
        }
    }
}

async fn dial_through_proxy(
    ws_url: &str,
    proxy_host: &str,
    proxy_port: u16,
    config: &CdpConfig,
) -> Result<WsStream, CdpError> {
    let target = url::Url::parse(ws_url).map_err(|e| CdpError::ProxyConfig(e.to_string()))?;
    let target_host = target
        .host_str()
        .ok_or_else(|| CdpError::ProxyConfig("websocket url has no host".into()))?;
    let target_port = target.port_or_known_default().unwrap_or(80);

    let mut stream = TcpStream::connect((proxy_host, proxy_port))
        .await
        .map_err(|e| CdpError::ProxyConnection(e.to_string()))?;

    let mut connect_req = format!(
        "CONNECT {target_host}:{target_port} HTTP/1.1\r\nHost: {target_host}:{target_port}\r\n"
    );
    if let Some(user) = &config.proxy_username {
        use base64::Engine;
        let pass = config.proxy_password.clone().unwrap_or_default();
        let creds = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{pass}"));
        connect_req.push_str(&format!("Proxy-Authorization: Basic {creds}\r\n"));
    }
    connect_req.push_str("\r\n");

    stream
        .write_all(connect_req.as_bytes())
        .await
        .map_err(|e| CdpError::ProxyConnection(e.to_string()))?;

    let mut buf = [0u8; 512];
    let n = stream
        .read(&mut buf)
        .await
        .map_err(|e| CdpError::ProxyConnection(e.to_string()))?;
    let response = String::from_utf8_lossy(&buf[..n]);
    if !response.contains(" 200 ") {
        return Err(CdpError::ProxyConnection(format!(
            "proxy CONNECT failed: {response}"
        )));
    }

    let tls_stream = MaybeTlsStream::Plain(stream);
    let (ws, _resp) = tokio_tungstenite::client_async(ws_url, tls_stream)
        .await
        .map_err(CdpError::Ws)?;
    Ok(ws)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_counter_is_monotonic() {
        let counter = AtomicI64::new(1);
        let a = counter.fetch_add(1, Ordering::SeqCst);
        let b = counter.fetch_add(1, Ordering::SeqCst);
        assert!(b > a);
    }
}
