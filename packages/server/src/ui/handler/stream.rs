//! Streaming chat connection handler.
//!
//! A `GET /chat` request attaches a subscriber to the room and turns the
//! response body into an endless sequence of newline-terminated lines.
//!
//! ```text
//! room ──frames──▶ SubscriberReceiver ──writer task──▶ body channel ──▶ socket
//! ```
//!
//! The writer task waits on the next frame, on the body receiver being dropped
//! (the client went away), on the idle deadline and on server shutdown, all in
//! one `select!`. Whatever ends it, it detaches the subscriber exactly once.

use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use futures_util::stream::{self, Stream};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};

use crate::{
    domain::{Nickname, RoomId},
    ui::state::AppState,
    usecase::Subscription,
};

use super::error::HandlerError;

/// Frames buffered between the writer task and the HTTP body
const BODY_BUFFER: usize = 16;

/// Number of filler lines sent before the first frame
const PREAMBLE_FILLER_LINES: usize = 13;

/// Query parameters for a streaming connection
#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    #[serde(rename = "roomID")]
    pub room_id: String,
    pub nickname: String,
}

/// Why a writer stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamEnd {
    /// The HTTP body was dropped
    ClientDisconnected,
    /// The room released the subscriber (replaced or removed)
    Released,
    /// No frame arrived within the idle timeout
    IdleTimeout,
    /// The server is shutting down
    Shutdown,
}

/// Open a streaming connection to a room (`GET /chat`)
pub async fn chat_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChatQuery>,
) -> Result<Response, HandlerError> {
    let room_id = RoomId::try_from(query.room_id)?;
    let nickname = Nickname::try_from(query.nickname)?;

    let subscription = state
        .join_room_usecase
        .execute(&room_id, nickname)
        .await?;
    tracing::info!(
        "'{}' attached to room '{}' (subscriber {})",
        subscription.nickname,
        room_id,
        subscription.receiver.id()
    );

    let (body_tx, body_rx) = mpsc::channel(BODY_BUFFER);
    writer_loop(state, subscription, body_tx);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        Body::from_stream(body_stream(body_rx)),
    )
        .into_response())
}

/// Turn the writer's channel into a response body stream.
fn body_stream(rx: mpsc::Receiver<String>) -> impl Stream<Item = Result<String, Infallible>> {
    stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|frame| (Ok(frame), rx))
    })
}

/// Comment lines that make browsers start rendering a `text/plain` stream
/// immediately instead of buffering the first kilobyte.
fn preamble() -> String {
    let mut text =
        String::from("# ~1KB of junk to force browsers to start rendering immediately: \n");
    for _ in 0..PREAMBLE_FILLER_LINES {
        text.push_str("# ");
        text.push_str(&"x".repeat(78));
        text.push('\n');
    }
    text
}

/// Spawns the task that drains the subscriber into the response body and
/// detaches it when the connection ends.
fn writer_loop(
    state: Arc<AppState>,
    mut subscription: Subscription,
    body: mpsc::Sender<String>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let end = if body.send(preamble()).await.is_err() {
            StreamEnd::ClientDisconnected
        } else {
            pump(&mut subscription, &body, state.idle_timeout, state.shutdown.clone()).await
        };

        let Subscription {
            room,
            nickname,
            receiver,
        } = subscription;
        let subscriber_id = receiver.id();
        // Release the queue before leaving so late frames are not buffered.
        drop(receiver);

        tracing::info!(
            "Stream of '{}' in room '{}' ended: {:?}",
            nickname,
            room.id(),
            end
        );
        match state
            .leave_room_usecase
            .detach(room.id(), nickname.clone(), subscriber_id)
            .await
        {
            Ok(true) => tracing::info!("'{}' detached from room '{}'", nickname, room.id()),
            Ok(false) => tracing::debug!(
                "Subscriber {} of '{}' was already replaced",
                subscriber_id,
                nickname
            ),
            Err(e) => tracing::warn!("Failed to detach '{}': {}", nickname, e),
        }
    })
}

/// Forward frames until one of the end conditions fires.
///
/// A frame taken from the room waits in `pending` until the body has room for
/// it, so a client that stops reading never keeps the writer from noticing
/// shutdown or the idle deadline.
async fn pump(
    subscription: &mut Subscription,
    body: &mpsc::Sender<String>,
    idle_timeout: Option<Duration>,
    mut shutdown: watch::Receiver<bool>,
) -> StreamEnd {
    let mut pending: Option<String> = None;

    loop {
        let idle = async {
            match idle_timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };
        let stopping = async {
            // A dropped sender means nobody can request shutdown any more.
            if shutdown.wait_for(|stopping| *stopping).await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = body.closed() => return StreamEnd::ClientDisconnected,
            _ = stopping => return StreamEnd::Shutdown,
            _ = idle => return StreamEnd::IdleTimeout,
            frame = subscription.receiver.recv(), if pending.is_none() => match frame {
                Some(frame) => pending = Some(frame),
                None => return StreamEnd::Released,
            },
            permit = body.reserve(), if pending.is_some() => match (permit, pending.take()) {
                (Ok(permit), Some(frame)) => permit.send(frame),
                (Ok(_), None) => {}
                (Err(_), _) => return StreamEnd::ClientDisconnected,
            },
        }
    }
}
