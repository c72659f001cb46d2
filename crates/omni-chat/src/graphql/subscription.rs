//! GraphQL subscriptions over WebSocket.
//!
//! The Omni Chat server exposes one WebSocket route per subscription topic.
//! After the connection opens, the client sends two text frames in order: the
//! raw access token, then `{"query": <document>}`. Every frame the server
//! sends afterwards is a GraphQL response whose `data` holds a single entry.
//!
//! ```text
//! Connecting --handshake sent--> Open --error frame--> Failed
//!      |                          |----transport error--> Errored
//!      |                          |----close()/close frame--> Closed
//!      +--close()--> Closed       +----frame--> Open
//! ```
//!
//! There is no reconnect. A dropped connection is terminal; open a new
//! subscription to resume.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use url::Url;

use super::response::GraphQlResponse;
use crate::config::WsApiConfig;
use crate::error::{ApiError, Result};
use crate::targets;

/// Lifecycle of a subscription.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Opening the connection and sending the handshake.
    #[default]
    Connecting,
    /// Handshake sent; frames are being delivered.
    Open,
    /// The server sent an error frame (or an unreadable one) and the client closed the connection.
    Failed,
    /// Closed without error, by the handle or by the server's close frame.
    Closed,
    /// The transport failed or dropped.
    Errored,
}

impl SubscriptionState {
    /// Check whether no further frames will be delivered.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Closed | Self::Errored)
    }
}

/// Command sent to the subscription task.
enum Command {
    Close,
}

/// Shared between the handle and its task.
struct Shared {
    /// Set once the caller asks to close. No callback fires afterwards.
    closed: AtomicBool,
}

impl Shared {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Handle to a running subscription.
///
/// Dropping the handle closes the subscription.
#[must_use = "dropping the handle closes the subscription"]
pub struct SubscriptionHandle {
    command_tx: mpsc::UnboundedSender<Command>,
    shared: Arc<Shared>,
    state_rx: watch::Receiver<SubscriptionState>,
}

impl SubscriptionHandle {
    /// Close the subscription.
    ///
    /// Safe to call any number of times and in any state. After the first
    /// call neither callback is invoked again.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(target: targets::SUBSCRIPTION, "Closing subscription");
        // The task may already be gone after a terminal failure.
        let _ = self.command_tx.send(Command::Close);
    }

    /// Get the current state.
    ///
    /// A task that died without settling, e.g. because a callback panicked,
    /// reports [`SubscriptionState::Errored`].
    pub fn state(&self) -> SubscriptionState {
        let state = *self.state_rx.borrow();
        if !state.is_terminal() && self.state_rx.has_changed().is_err() {
            return SubscriptionState::Errored;
        }
        state
    }

    /// Wait until the subscription reaches a terminal state.
    pub async fn terminated(&self) -> SubscriptionState {
        let mut state_rx = self.state_rx.clone();
        match state_rx.wait_for(SubscriptionState::is_terminal).await {
            Ok(state) => *state,
            // The task is gone without having settled.
            Err(_) => SubscriptionState::Errored,
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// The caller's callbacks, gated on the shared closed flag.
struct Listener<M, E> {
    on_message: M,
    on_error: Option<E>,
    shared: Arc<Shared>,
}

impl<M, E> Listener<M, E> {
    fn error_reported(&self) -> bool {
        self.on_error.is_none()
    }

    fn message<T>(&mut self, message: T)
    where
        M: FnMut(T),
    {
        if !self.shared.is_closed() {
            (self.on_message)(message);
        }
    }

    fn error(&mut self, err: ApiError)
    where
        E: FnOnce(ApiError),
    {
        if self.shared.is_closed() {
            return;
        }
        if let Some(on_error) = self.on_error.take() {
            on_error(err);
        }
    }
}

/// Open a subscription.
///
/// Returns immediately; the connection, handshake, and delivery run on a
/// spawned tokio task, so this must be called within a tokio runtime.
///
/// `on_message` is called once per data frame, in arrival order, with the
/// value of the frame's single `data` entry. `on_error` is called at most
/// once, when the subscription fails: with the mapped first error of an error
/// frame, or with [`ApiError::Connection`] for transport failures and frames
/// that don't deserialize into `T`.
///
/// # Example
///
/// ```ignore
/// let handle = subscribe::<TypingStatusesSubscription, _, _>(
///     &ws_config,
///     &access_token,
///     "/typing-statuses-subscription",
///     TypingStatuses::DOCUMENT,
///     |status| println!("{status:?}"),
///     |err| eprintln!("subscription failed: {err}"),
/// );
/// // ...
/// handle.close();
/// ```
pub fn subscribe<T, M, E>(
    config: &WsApiConfig,
    credential: &str,
    path: &str,
    document: &str,
    on_message: M,
    on_error: E,
) -> SubscriptionHandle
where
    T: DeserializeOwned + Send + 'static,
    M: FnMut(T) + Send + 'static,
    E: FnOnce(ApiError) + Send + 'static,
{
    open::<T, M, E>(config, credential, path, document, None, on_message, on_error)
}

/// Open a subscription whose frames carry their value under `operation`.
pub(crate) fn subscribe_operation<T, M, E>(
    config: &WsApiConfig,
    credential: &str,
    path: &str,
    document: &str,
    operation: &str,
    on_message: M,
    on_error: E,
) -> SubscriptionHandle
where
    T: DeserializeOwned + Send + 'static,
    M: FnMut(T) + Send + 'static,
    E: FnOnce(ApiError) + Send + 'static,
{
    open::<T, M, E>(config, credential, path, document, Some(operation), on_message, on_error)
}

fn open<T, M, E>(
    config: &WsApiConfig,
    credential: &str,
    path: &str,
    document: &str,
    operation: Option<&str>,
    on_message: M,
    on_error: E,
) -> SubscriptionHandle
where
    T: DeserializeOwned + Send + 'static,
    M: FnMut(T) + Send + 'static,
    E: FnOnce(ApiError) + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::unbounded_channel::<Command>();
    // The sender lives in the task, so the handle sees it go if the task dies.
    let (state_tx, state_rx) = watch::channel(SubscriptionState::Connecting);
    let shared = Arc::new(Shared {
        closed: AtomicBool::new(false),
    });

    let session = Session {
        url: config.subscription_url(path),
        credential: credential.to_owned(),
        document: document.to_owned(),
        operation: operation.map(str::to_owned),
    };
    let listener = Listener {
        on_message,
        on_error: Some(on_error),
        shared: shared.clone(),
    };

    tokio::spawn(run::<T, M, E>(session, command_rx, state_tx, listener));

    SubscriptionHandle {
        command_tx,
        shared,
        state_rx,
    }
}

/// What the task needs to connect, handshake, and decode frames.
struct Session {
    url: Result<Url>,
    credential: String,
    document: String,
    /// Result key to read from each frame; `None` takes the single entry.
    operation: Option<String>,
}

async fn run<T, M, E>(
    session: Session,
    mut commands: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<SubscriptionState>,
    mut listener: Listener<M, E>,
) where
    T: DeserializeOwned,
    M: FnMut(T),
    E: FnOnce(ApiError),
{
    let state = drive::<T, M, E>(session, &mut commands, &state_tx, &mut listener).await;
    let state = settle(state, listener.shared.is_closed(), listener.error_reported());
    tracing::debug!(target: targets::SUBSCRIPTION, state = ?state, "Subscription ended");
    state_tx.send_replace(state);
}

/// Final state once the task stops.
///
/// A close requested by the caller wins, unless a failure was already
/// reported through `on_error`.
fn settle(state: SubscriptionState, closed: bool, error_reported: bool) -> SubscriptionState {
    if closed && !error_reported {
        SubscriptionState::Closed
    } else {
        state
    }
}

async fn drive<T, M, E>(
    session: Session,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    state_tx: &watch::Sender<SubscriptionState>,
    listener: &mut Listener<M, E>,
) -> SubscriptionState
where
    T: DeserializeOwned,
    M: FnMut(T),
    E: FnOnce(ApiError),
{
    let Session {
        url,
        credential,
        document,
        operation,
    } = session;

    let request = match url.and_then(|url| Ok(url.as_str().into_client_request()?)) {
        Ok(request) => request,
        Err(err) => {
            listener.error(err);
            return SubscriptionState::Errored;
        }
    };

    tracing::debug!(target: targets::SUBSCRIPTION, uri = %request.uri(), "Connecting subscription");

    let ws_stream = tokio::select! {
        result = tokio_tungstenite::connect_async(request) => match result {
            Ok((ws_stream, _response)) => ws_stream,
            Err(err) => {
                listener.error(err.into());
                return SubscriptionState::Errored;
            }
        },
        // Close command, or the handle was dropped.
        _ = commands.recv() => return SubscriptionState::Closed,
    };

    let (mut write, mut read) = ws_stream.split();

    let envelope = serde_json::json!({ "query": document }).to_string();
    for frame in [credential, envelope] {
        if let Err(err) = write.send(Message::Text(frame.into())).await {
            listener.error(err.into());
            return SubscriptionState::Errored;
        }
    }

    tracing::debug!(target: targets::SUBSCRIPTION, "Subscription handshake sent");
    state_tx.send_replace(SubscriptionState::Open);

    loop {
        tokio::select! {
            _ = commands.recv() => {
                let _ = write.send(Message::Close(None)).await;
                return SubscriptionState::Closed;
            }

            msg = read.next() => {
                let payload = match msg {
                    Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
                    Some(Ok(Message::Binary(data))) => data.to_vec(),
                    Some(Ok(Message::Close(_frame))) => {
                        tracing::debug!(target: targets::SUBSCRIPTION, "Server closed subscription");
                        return SubscriptionState::Closed;
                    }
                    Some(Ok(_)) => {
                        // Ping, pong, and raw frames are handled by tungstenite.
                        continue;
                    }
                    Some(Err(err)) => {
                        listener.error(err.into());
                        return SubscriptionState::Errored;
                    }
                    None => {
                        listener.error(ApiError::Connection("Subscription connection dropped".into()));
                        return SubscriptionState::Errored;
                    }
                };

                tracing::trace!(target: targets::SUBSCRIPTION, bytes = payload.len(), "Received subscription frame");

                match parse_frame::<T>(&payload, operation.as_deref()) {
                    Ok(message) => listener.message(message),
                    Err(err) => {
                        listener.error(err);
                        let _ = write.send(Message::Close(None)).await;
                        return SubscriptionState::Failed;
                    }
                }
            }
        }
    }
}

/// Decode one subscription frame.
///
/// Reads the `operation` entry of the frame's data, or its single entry when
/// no operation is named.
fn parse_frame<T: DeserializeOwned>(payload: &[u8], operation: Option<&str>) -> Result<T> {
    let response: GraphQlResponse = serde_json::from_slice(payload)?;
    if let Some(err) = response.error() {
        return Err(err);
    }
    let data = match operation {
        Some(operation) => response.data.and_then(|mut data| data.remove(operation)),
        None => response.into_single_data(),
    };
    let data =
        data.ok_or_else(|| ApiError::Connection("Subscription frame carried no data".into()))?;
    Ok(serde_json::from_value(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WsProtocol;
    use crate::error::DomainError;
    use serde_json::Value;

    #[test]
    fn test_parse_data_frame() {
        let value: Value =
            parse_frame(br#"{"data":{"subscribeToMessages":{"__typename":"CreatedSubscription"}}}"#, None)
                .unwrap();
        assert_eq!(value["__typename"], "CreatedSubscription");
    }

    #[test]
    fn test_parse_named_operation() {
        let payload = br#"{"data":{"aaa":1,"subscribeToMessages":2}}"#;
        let value: i32 = parse_frame(payload, Some("subscribeToMessages")).unwrap();
        assert_eq!(value, 2);

        let result: Result<i32> = parse_frame(payload, Some("subscribeToAccounts"));
        assert!(matches!(result, Err(ApiError::Connection(_))));
    }

    #[test]
    fn test_parse_error_frame() {
        let result: Result<Value> = parse_frame(br#"{"errors":[{"message":"INVALID_CHAT_ID"}]}"#, None);
        assert_eq!(result, Err(ApiError::Domain(DomainError::InvalidChatId)));
    }

    #[test]
    fn test_parse_malformed_frame() {
        let result: Result<Value> = parse_frame(b"not json", None);
        assert!(matches!(result, Err(ApiError::Connection(_))));
        let result: Result<Value> = parse_frame(b"{}", None);
        assert!(matches!(result, Err(ApiError::Connection(_))));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SubscriptionState::Connecting.is_terminal());
        assert!(!SubscriptionState::Open.is_terminal());
        assert!(SubscriptionState::Failed.is_terminal());
        assert!(SubscriptionState::Closed.is_terminal());
        assert!(SubscriptionState::Errored.is_terminal());
    }

    #[test]
    fn test_settle() {
        use SubscriptionState::*;
        assert_eq!(settle(Open, true, false), Closed);
        assert_eq!(settle(Errored, true, false), Closed);
        // A failure already reported through on_error keeps its state.
        assert_eq!(settle(Failed, true, true), Failed);
        assert_eq!(settle(Errored, true, true), Errored);
        assert_eq!(settle(Failed, false, true), Failed);
        assert_eq!(settle(Closed, false, false), Closed);
    }

    #[tokio::test]
    async fn test_invalid_url_reports_error() {
        let config = WsApiConfig::new(WsProtocol::Ws, "bad host");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = subscribe::<Value, _, _>(
            &config,
            "token",
            "/messages-subscription",
            "subscription S{s}",
            |_| {},
            move |err| {
                let _ = tx.send(err);
            },
        );
        assert!(matches!(rx.recv().await, Some(ApiError::Connection(_))));
        assert_eq!(handle.terminated().await, SubscriptionState::Errored);
    }
}
