//! Subscription channel tests against a local WebSocket server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use omni_chat::graphql::{TypingStatuses, TypingStatusesSubscription};
use omni_chat::{
    ApiError, DomainError, SubscriptionState, WsApiConfig, WsProtocol, subscribe, subscribe_to,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::{WebSocketStream, accept_async};

type ServerStream = WebSocketStream<tokio::net::TcpStream>;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn bind() -> (TcpListener, WsApiConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, WsApiConfig::new(WsProtocol::Ws, addr.to_string()))
}

async fn accept(listener: &TcpListener) -> ServerStream {
    let (stream, _) = listener.accept().await.unwrap();
    accept_async(stream).await.unwrap()
}

async fn next_text(ws: &mut ServerStream) -> String {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return text.as_str().to_owned(),
            Some(Ok(_)) => continue,
            other => panic!("expected a text frame, got {other:?}"),
        }
    }
}

fn data_frame(value: Value) -> Message {
    Message::Text(json!({"data": {"subscribeToTypingStatuses": value}}).to_string().into())
}

#[tokio::test]
async fn test_handshake_then_messages_then_error() {
    let (listener, config) = bind().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        assert_eq!(next_text(&mut ws).await, "access-token");
        let envelope: Value = serde_json::from_str(&next_text(&mut ws).await).unwrap();
        assert_eq!(envelope, json!({"query": "subscription S { s }"}));

        for n in 0..3 {
            ws.send(data_frame(json!({"n": n}))).await.unwrap();
        }
        ws.send(Message::Text(
            json!({"errors": [{"message": "INVALID_CHAT_ID"}]}).to_string().into(),
        ))
        .await
        .unwrap();
        // Sent after the error frame; must never be delivered.
        let _ = ws.send(data_frame(json!({"n": 99}))).await;

        // The client closes the connection after the error.
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    });

    let (message_tx, mut message_rx) = mpsc::unbounded_channel();
    let (error_tx, mut error_rx) = mpsc::unbounded_channel();
    let handle = subscribe::<Value, _, _>(
        &config,
        "access-token",
        "/typing-statuses-subscription",
        "subscription S { s }",
        move |message| {
            let _ = message_tx.send(message);
        },
        move |err| {
            let _ = error_tx.send(err);
        },
    );

    let state = tokio::time::timeout(TIMEOUT, handle.terminated()).await.unwrap();
    assert_eq!(state, SubscriptionState::Failed);

    let mut messages = Vec::new();
    while let Ok(message) = message_rx.try_recv() {
        messages.push(message);
    }
    assert_eq!(messages, vec![json!({"n": 0}), json!({"n": 1}), json!({"n": 2})]);

    assert_eq!(
        error_rx.try_recv().unwrap(),
        ApiError::Domain(DomainError::InvalidChatId)
    );
    assert!(error_rx.try_recv().is_err());

    tokio::time::timeout(TIMEOUT, server).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_close_is_idempotent_and_silences_callbacks() {
    let (listener, config) = bind().await;
    let (closed_tx, closed_rx) = tokio::sync::oneshot::channel();

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        next_text(&mut ws).await;
        next_text(&mut ws).await;
        ws.send(data_frame(json!({"n": 0}))).await.unwrap();
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
        let _ = closed_tx.send(());
    });

    let (message_tx, mut message_rx) = mpsc::unbounded_channel();
    let (error_tx, mut error_rx) = mpsc::unbounded_channel::<ApiError>();
    let handle = subscribe::<Value, _, _>(
        &config,
        "token",
        "/typing-statuses-subscription",
        "subscription S { s }",
        move |message| {
            let _ = message_tx.send(message);
        },
        move |err| {
            let _ = error_tx.send(err);
        },
    );

    let first = tokio::time::timeout(TIMEOUT, message_rx.recv()).await.unwrap();
    assert_eq!(first, Some(json!({"n": 0})));
    assert_eq!(handle.state(), SubscriptionState::Open);

    handle.close();
    handle.close();

    tokio::time::timeout(TIMEOUT, closed_rx).await.unwrap().unwrap();
    let state = tokio::time::timeout(TIMEOUT, handle.terminated()).await.unwrap();
    assert_eq!(state, SubscriptionState::Closed);
    handle.close();

    assert!(error_rx.try_recv().is_err());
    tokio::time::timeout(TIMEOUT, server).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_server_close_ends_without_error() {
    let (listener, config) = bind().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        next_text(&mut ws).await;
        next_text(&mut ws).await;
        ws.close(None).await.unwrap();
    });

    let (error_tx, mut error_rx) = mpsc::unbounded_channel::<ApiError>();
    let handle = subscribe::<Value, _, _>(
        &config,
        "token",
        "/typing-statuses-subscription",
        "subscription S { s }",
        |_| {},
        move |err| {
            let _ = error_tx.send(err);
        },
    );

    let state = tokio::time::timeout(TIMEOUT, handle.terminated()).await.unwrap();
    assert_eq!(state, SubscriptionState::Closed);
    assert!(error_rx.try_recv().is_err());
    tokio::time::timeout(TIMEOUT, server).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_unreachable_server_reports_connection_error() {
    let (listener, config) = bind().await;
    drop(listener);

    let (error_tx, mut error_rx) = mpsc::unbounded_channel();
    let handle = subscribe::<Value, _, _>(
        &config,
        "token",
        "/messages-subscription",
        "subscription S { s }",
        |_| {},
        move |err| {
            let _ = error_tx.send(err);
        },
    );

    let err = tokio::time::timeout(TIMEOUT, error_rx.recv()).await.unwrap();
    assert!(matches!(err, Some(ApiError::Connection(_))));
    assert_eq!(handle.terminated().await, SubscriptionState::Errored);
}

#[tokio::test]
async fn test_dropped_connection_reports_connection_error() {
    let (listener, config) = bind().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        next_text(&mut ws).await;
        next_text(&mut ws).await;
        ws.send(data_frame(json!({"n": 0}))).await.unwrap();
        // Drop the TCP stream without a close frame.
        drop(ws);
    });

    let (message_tx, mut message_rx) = mpsc::unbounded_channel();
    let (error_tx, mut error_rx) = mpsc::unbounded_channel();
    let handle = subscribe::<Value, _, _>(
        &config,
        "token",
        "/typing-statuses-subscription",
        "subscription S { s }",
        move |message| {
            let _ = message_tx.send(message);
        },
        move |err| {
            let _ = error_tx.send(err);
        },
    );

    let state = tokio::time::timeout(TIMEOUT, handle.terminated()).await.unwrap();
    assert_eq!(state, SubscriptionState::Errored);

    assert_eq!(message_rx.try_recv().unwrap(), json!({"n": 0}));
    assert!(message_rx.try_recv().is_err());
    assert!(matches!(error_rx.try_recv(), Ok(ApiError::Connection(_))));
    assert!(error_rx.try_recv().is_err());

    tokio::time::timeout(TIMEOUT, server).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_panicking_callback_ends_subscription() {
    let (listener, config) = bind().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        next_text(&mut ws).await;
        next_text(&mut ws).await;
        ws.send(data_frame(json!({"n": 0}))).await.unwrap();
        // The client task dies and its socket goes with it.
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    });

    let (error_tx, mut error_rx) = mpsc::unbounded_channel::<ApiError>();
    let handle = subscribe::<Value, _, _>(
        &config,
        "token",
        "/typing-statuses-subscription",
        "subscription S { s }",
        |_message| panic!("callback failed"),
        move |err| {
            let _ = error_tx.send(err);
        },
    );

    let state = tokio::time::timeout(TIMEOUT, handle.terminated()).await.unwrap();
    assert_eq!(state, SubscriptionState::Errored);
    assert_eq!(handle.state(), SubscriptionState::Errored);
    assert!(error_rx.try_recv().is_err());

    tokio::time::timeout(TIMEOUT, server).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_typed_topic() {
    let (listener, config) = bind().await;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_hdr_async(
            stream,
            |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
                assert_eq!(request.uri().path(), "/typing-statuses-subscription");
                Ok(response)
            },
        )
        .await
        .unwrap();
        next_text(&mut ws).await;
        let envelope: Value = serde_json::from_str(&next_text(&mut ws).await).unwrap();
        assert!(
            envelope["query"]
                .as_str()
                .unwrap()
                .contains("subscribeToTypingStatuses")
        );

        ws.send(data_frame(
            json!({"__typename": "CreatedSubscription", "placeholder": ""}),
        ))
        .await
        .unwrap();
        ws.send(data_frame(json!({
            "__typename": "TypingStatus",
            "chatId": 1,
            "userId": 2,
            "isTyping": true
        })))
        .await
        .unwrap();
        // Not a TypingStatusesSubscription; fails the subscription.
        ws.send(data_frame(json!({"__typename": "Bogus"})))
            .await
            .unwrap();
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    });

    let (message_tx, mut message_rx) = mpsc::unbounded_channel();
    let (error_tx, mut error_rx) = mpsc::unbounded_channel();
    let handle = subscribe_to::<TypingStatuses, _, _>(
        &config,
        "token",
        move |message| {
            let _ = message_tx.send(message);
        },
        move |err| {
            let _ = error_tx.send(err);
        },
    );

    let state = tokio::time::timeout(TIMEOUT, handle.terminated()).await.unwrap();
    assert_eq!(state, SubscriptionState::Failed);

    assert!(matches!(
        message_rx.try_recv().unwrap(),
        TypingStatusesSubscription::CreatedSubscription { .. }
    ));
    assert_eq!(
        message_rx.try_recv().unwrap(),
        TypingStatusesSubscription::TypingStatus {
            chat_id: 1,
            user_id: 2,
            is_typing: true
        }
    );
    assert!(message_rx.try_recv().is_err());
    assert!(matches!(error_rx.try_recv(), Ok(ApiError::Connection(_))));

    tokio::time::timeout(TIMEOUT, server).await.unwrap().unwrap();
}
