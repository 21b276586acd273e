//! Handle to a running chatroom actor.

use std::sync::Arc;

use chatroom_shared::time::Clock;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{MessageBody, Nickname, RoomError, RoomId, RoomTitle};

use super::{
    actor::{ChatroomActor, RoomEvent, RoomSnapshot},
    subscriber::{self, SubscriberConfig, SubscriberId, SubscriberReceiver},
};

/// Cloneable reference to one room's event loop
///
/// Every operation is a non-blocking send into the room's inbox; the only
/// awaiting operation is [`ChatroomHandle::snapshot`], which waits for the
/// room to answer.
#[derive(Debug, Clone)]
pub struct ChatroomHandle {
    id: RoomId,
    title: RoomTitle,
    subscriber_config: SubscriberConfig,
    events: mpsc::UnboundedSender<RoomEvent>,
}

impl ChatroomHandle {
    /// Spawn the room's event loop on the current tokio runtime.
    pub fn spawn(
        id: RoomId,
        title: RoomTitle,
        subscriber_config: SubscriberConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (events, inbox) = mpsc::unbounded_channel();
        let actor = ChatroomActor::new(id.clone(), title.clone(), clock, inbox);
        tokio::spawn(actor.run());

        Self {
            id,
            title,
            subscriber_config,
            events,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn title(&self) -> &RoomTitle {
        &self.title
    }

    /// Attach a new subscriber under `nickname`.
    ///
    /// The returned receiver must be drained by the caller's writer.
    pub fn join(&self, nickname: Nickname) -> Result<SubscriberReceiver, RoomError> {
        let (subscriber, receiver) = subscriber::channel(self.subscriber_config);
        self.send(RoomEvent::Join {
            nickname,
            subscriber,
        })?;
        Ok(receiver)
    }

    /// Remove `nickname` from the room, whichever connection it is on.
    pub fn leave(&self, nickname: Nickname) -> Result<(), RoomError> {
        self.send(RoomEvent::Leave {
            nickname,
            subscriber_id: None,
            reply: None,
        })
    }

    /// Remove `nickname` only if `subscriber_id` is still its registered
    /// subscriber, and report whether it was.
    ///
    /// A connection that was replaced by a newer one for the same nickname
    /// gets `Ok(false)` and leaves the room untouched.
    pub async fn leave_subscriber(
        &self,
        nickname: Nickname,
        subscriber_id: SubscriberId,
    ) -> Result<bool, RoomError> {
        let (reply, response) = oneshot::channel();
        self.send(RoomEvent::Leave {
            nickname,
            subscriber_id: Some(subscriber_id),
            reply: Some(reply),
        })?;
        response.await.map_err(|_| self.closed())
    }

    /// Post a message to the room.
    pub fn say(&self, author: Nickname, body: MessageBody) -> Result<(), RoomError> {
        self.send(RoomEvent::Say { author, body })
    }

    /// Fetch a copy of the room state carrying at most `recent_messages`
    /// of the latest messages.
    ///
    /// The snapshot reflects every event sent through this handle before the
    /// call.
    pub async fn snapshot(&self, recent_messages: usize) -> Result<RoomSnapshot, RoomError> {
        let (reply, response) = oneshot::channel();
        self.send(RoomEvent::Snapshot {
            recent: recent_messages,
            reply,
        })?;
        response.await.map_err(|_| self.closed())
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }

    fn send(&self, event: RoomEvent) -> Result<(), RoomError> {
        self.events.send(event).map_err(|_| self.closed())
    }

    fn closed(&self) -> RoomError {
        RoomError::Closed(self.id.to_string())
    }
}
