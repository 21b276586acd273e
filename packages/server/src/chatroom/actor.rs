//! Chatroom actor.
//!
//! The actor is the only code that touches `members` and `history`. Every
//! mutation arrives as a [`RoomEvent`] on one inbox and is applied to
//! completion before the next event is read, so no locks are needed.

use std::{collections::HashMap, sync::Arc};

use chatroom_shared::time::Clock;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{Message, MessageBody, Nickname, Notification, RoomId, RoomTitle, Timestamp};

use super::subscriber::{EnqueueError, Enqueued, Subscriber, SubscriberId};

/// Commands consumed by the room's event loop
#[derive(Debug)]
pub(crate) enum RoomEvent {
    /// Register `subscriber` under `nickname`, replacing any previous one
    Join {
        nickname: Nickname,
        subscriber: Subscriber,
    },
    /// Remove `nickname`; when `subscriber_id` is set, only if it is still
    /// the registered subscriber. `reply` receives whether a member was removed.
    Leave {
        nickname: Nickname,
        subscriber_id: Option<SubscriberId>,
        reply: Option<oneshot::Sender<bool>>,
    },
    /// Append a message to the history and broadcast it
    Say { author: Nickname, body: MessageBody },
    /// Read-only view of the room state with at most `recent` messages
    Snapshot {
        recent: usize,
        reply: oneshot::Sender<RoomSnapshot>,
    },
}

/// Member state as seen by a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberInfo {
    pub nickname: Nickname,
    pub subscriber_id: SubscriberId,
    pub pending_frames: usize,
    pub dropped_frames: u64,
}

/// Point-in-time copy of a room's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub title: RoomTitle,
    /// Members sorted by nickname
    pub members: Vec<MemberInfo>,
    /// Number of messages accepted so far
    pub message_count: usize,
    /// The most recent messages in acceptance order
    pub recent_messages: Vec<Message>,
}

impl RoomSnapshot {
    pub fn member_nicknames(&self) -> Vec<&Nickname> {
        self.members.iter().map(|m| &m.nickname).collect()
    }
}

pub(crate) struct ChatroomActor {
    id: RoomId,
    title: RoomTitle,
    /// 接続中のメンバーと配信キュー
    members: HashMap<Nickname, Subscriber>,
    /// メッセージ履歴（追記のみ）
    history: Vec<Message>,
    clock: Arc<dyn Clock>,
    events: mpsc::UnboundedReceiver<RoomEvent>,
}

impl ChatroomActor {
    pub(crate) fn new(
        id: RoomId,
        title: RoomTitle,
        clock: Arc<dyn Clock>,
        events: mpsc::UnboundedReceiver<RoomEvent>,
    ) -> Self {
        Self {
            id,
            title,
            members: HashMap::new(),
            history: Vec::new(),
            clock,
            events,
        }
    }

    /// Run the event loop until every handle to the room is dropped.
    pub(crate) async fn run(mut self) {
        tracing::info!("Room '{}' ({}) is running", self.id, self.title);

        while let Some(event) = self.events.recv().await {
            self.handle(event);
        }

        tracing::info!(
            "Room '{}' stopped with {} member(s) and {} message(s)",
            self.id,
            self.members.len(),
            self.history.len()
        );
    }

    fn handle(&mut self, event: RoomEvent) {
        match event {
            RoomEvent::Join {
                nickname,
                subscriber,
            } => self.join(nickname, subscriber),
            RoomEvent::Leave {
                nickname,
                subscriber_id,
                reply,
            } => {
                let removed = self.leave(nickname, subscriber_id);
                if let Some(reply) = reply {
                    let _ = reply.send(removed);
                }
            }
            RoomEvent::Say { author, body } => self.say(author, body),
            RoomEvent::Snapshot { recent, reply } => {
                if reply.send(self.snapshot(recent)).is_err() {
                    tracing::debug!("Snapshot requester for room '{}' went away", self.id);
                }
            }
        }
    }

    fn join(&mut self, nickname: Nickname, subscriber: Subscriber) {
        let subscriber_id = subscriber.id();
        if let Some(previous) = self.members.insert(nickname.clone(), subscriber) {
            // Dropping the old subscriber ends the previous stream.
            tracing::info!(
                "'{}' rejoined room '{}', replacing subscriber {} with {}",
                nickname,
                self.id,
                previous.id(),
                subscriber_id
            );
        } else {
            tracing::info!(
                "'{}' joined room '{}' (subscriber {})",
                nickname,
                self.id,
                subscriber_id
            );
        }

        self.broadcast(&Notification::Joined(nickname));
    }

    fn leave(&mut self, nickname: Nickname, subscriber_id: Option<SubscriberId>) -> bool {
        let registered = match (self.members.get(&nickname), subscriber_id) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(current), Some(id)) => current.id() == id,
        };
        if !registered {
            tracing::debug!(
                "Ignoring leave of '{}' from room '{}': not a current member",
                nickname,
                self.id
            );
            return false;
        }

        self.members.remove(&nickname);
        tracing::info!("'{}' left room '{}'", nickname, self.id);
        self.broadcast(&Notification::Left(nickname));
        true
    }

    fn say(&mut self, author: Nickname, body: MessageBody) {
        if !self.members.contains_key(&author) {
            tracing::debug!(
                "Accepting message from non-member '{}' in room '{}'",
                author,
                self.id
            );
        }

        let message = Message::new(
            author,
            self.id.clone(),
            body,
            Timestamp::new(self.clock.now_millis()),
        );
        self.history.push(message.clone());
        self.broadcast(&Notification::Said(message));
    }

    /// Deliver a notification to every member without blocking.
    fn broadcast(&self, notification: &Notification) {
        let frame = notification.to_frame();
        for (nickname, subscriber) in &self.members {
            match subscriber.enqueue(frame.clone()) {
                Ok(Enqueued::Queued) => {}
                Ok(Enqueued::EvictedOldest) => {
                    tracing::debug!(
                        "Evicted oldest pending frame for '{}' in room '{}'",
                        nickname,
                        self.id
                    );
                }
                Err(EnqueueError::Full) => {
                    tracing::debug!(
                        "Dropped frame for slow subscriber '{}' in room '{}'",
                        nickname,
                        self.id
                    );
                }
                Err(EnqueueError::Disconnected) => {
                    // Its writer sends Leave on the way out.
                    tracing::debug!(
                        "Subscriber '{}' in room '{}' already disconnected",
                        nickname,
                        self.id
                    );
                }
            }
        }
    }

    /// Copies only the last `recent` messages of the history.
    fn snapshot(&self, recent: usize) -> RoomSnapshot {
        let mut members: Vec<MemberInfo> = self
            .members
            .iter()
            .map(|(nickname, subscriber)| MemberInfo {
                nickname: nickname.clone(),
                subscriber_id: subscriber.id(),
                pending_frames: subscriber.pending(),
                dropped_frames: subscriber.dropped_frames(),
            })
            .collect();
        members.sort_by(|a, b| a.nickname.cmp(&b.nickname));

        RoomSnapshot {
            id: self.id.clone(),
            title: self.title.clone(),
            members,
            message_count: self.history.len(),
            recent_messages: self.history[self.history.len().saturating_sub(recent)..].to_vec(),
        }
    }
}
