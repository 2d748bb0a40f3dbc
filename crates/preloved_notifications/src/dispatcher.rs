//! Notification fan-out.
//!
//! A domain action produces a [`NotificationEvent`]. The dispatcher works out
//! the copy, persists one record for the recipient and then makes a single
//! best-effort push. Push failures are logged and reported in the outcome,
//! never raised. Event sources should call [`NotificationDispatcher::notify`],
//! which also downgrades dispatch errors to log lines so the domain write
//! always succeeds.

use preloved_common::models::{NewNotification, NotificationKind, NotificationRecord};
use preloved_common::push::{PushMessage, PushReceipt};
use preloved_common::services::{NotificationStore, PushSender};
use preloved_common::{validation_error, PrelovedError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::templates::{self, FALLBACK_ACTOR_NAME};

/// The user whose action triggered a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub display_name: String,
}

impl Actor {
    pub fn new(id: i64, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    /// Display name, or "Someone" when blank.
    pub fn name(&self) -> &str {
        let name = self.display_name.trim();
        if name.is_empty() {
            FALLBACK_ACTOR_NAME
        } else {
            name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A top-level comment; the recipient is the product owner.
    Comment {
        actor: Actor,
        recipient_id: i64,
        product_id: i64,
        comment_id: i64,
    },
    /// A reply; the recipient is the author of the parent comment.
    Reply {
        actor: Actor,
        recipient_id: i64,
        product_id: i64,
        comment_id: i64,
    },
    Wishlist {
        actor: Actor,
        recipient_id: i64,
        product_id: i64,
        product_name: String,
    },
    ProfileVisit {
        actor: Actor,
        recipient_id: i64,
    },
    System {
        recipient_id: i64,
        title: String,
        body: String,
        product_id: Option<i64>,
    },
}

impl NotificationEvent {
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationEvent::Comment { .. } => NotificationKind::Comment,
            NotificationEvent::Reply { .. } => NotificationKind::Reply,
            NotificationEvent::Wishlist { .. } => NotificationKind::Wishlist,
            NotificationEvent::ProfileVisit { .. } => NotificationKind::ProfileVisit,
            NotificationEvent::System { .. } => NotificationKind::System,
        }
    }

    pub fn recipient_id(&self) -> i64 {
        match self {
            NotificationEvent::Comment { recipient_id, .. }
            | NotificationEvent::Reply { recipient_id, .. }
            | NotificationEvent::Wishlist { recipient_id, .. }
            | NotificationEvent::ProfileVisit { recipient_id, .. }
            | NotificationEvent::System { recipient_id, .. } => *recipient_id,
        }
    }

    pub fn actor(&self) -> Option<&Actor> {
        match self {
            NotificationEvent::Comment { actor, .. }
            | NotificationEvent::Reply { actor, .. }
            | NotificationEvent::Wishlist { actor, .. }
            | NotificationEvent::ProfileVisit { actor, .. } => Some(actor),
            NotificationEvent::System { .. } => None,
        }
    }

    pub fn product_id(&self) -> Option<i64> {
        match self {
            NotificationEvent::Comment { product_id, .. }
            | NotificationEvent::Reply { product_id, .. }
            | NotificationEvent::Wishlist { product_id, .. } => Some(*product_id),
            NotificationEvent::System { product_id, .. } => *product_id,
            NotificationEvent::ProfileVisit { .. } => None,
        }
    }

    pub fn comment_id(&self) -> Option<i64> {
        match self {
            NotificationEvent::Comment { comment_id, .. }
            | NotificationEvent::Reply { comment_id, .. } => Some(*comment_id),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), DispatchError> {
        if self.recipient_id() <= 0 {
            return Err(DispatchError::Validation(format!(
                "recipient id must be positive, got {}",
                self.recipient_id()
            )));
        }
        match self {
            NotificationEvent::Wishlist { product_name, .. } if product_name.trim().is_empty() => {
                Err(DispatchError::Validation(
                    "wishlist notification needs a product name".to_string(),
                ))
            }
            NotificationEvent::System { title, .. } if title.trim().is_empty() => Err(
                DispatchError::Validation("system notification needs a title".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

/// What happened on the push leg.
#[derive(Debug, Clone, PartialEq)]
pub enum PushStatus {
    Sent(PushReceipt),
    Failed(String),
    /// No push sender is configured.
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The actor is the recipient. Nothing stored, nothing pushed.
    Skipped,
    Delivered {
        record: NotificationRecord,
        push: PushStatus,
    },
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("invalid notification: {0}")]
    Validation(String),

    #[error("failed to store notification: {0}")]
    Persistence(PrelovedError),
}

impl From<DispatchError> for PrelovedError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Validation(message) => validation_error(message),
            DispatchError::Persistence(inner) => inner,
        }
    }
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    push: Option<Arc<dyn PushSender>>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn NotificationStore>, push: Option<Arc<dyn PushSender>>) -> Self {
        Self { store, push }
    }

    /// Persists a record for the event's recipient, then pushes it.
    ///
    /// # Errors
    ///
    /// * `Validation` for a non-positive recipient, a wishlist event without
    ///   a product name or a system event without a title
    /// * `Persistence` when the store rejects the record; no push is attempted
    pub async fn dispatch(
        &self,
        event: NotificationEvent,
    ) -> Result<DispatchOutcome, DispatchError> {
        event.validate()?;

        let recipient_id = event.recipient_id();
        let kind = event.kind();
        if event.actor().map(|a| a.id) == Some(recipient_id) {
            debug!(recipient_id, %kind, "Actor is the recipient; not notifying");
            return Ok(DispatchOutcome::Skipped);
        }

        let copy = templates::render(&event);
        let record = self
            .store
            .create(NewNotification {
                recipient_user_id: recipient_id,
                actor_user_id: event.actor().map(|a| a.id),
                kind,
                title: copy.title,
                body: copy.body,
                related_product_id: event.product_id(),
                related_comment_id: event.comment_id(),
            })
            .await
            .map_err(DispatchError::Persistence)?;

        info!(
            recipient_id,
            %kind,
            notification_id = record.id,
            "Notification stored"
        );

        let push = self.push_record(&record).await;
        Ok(DispatchOutcome::Delivered { record, push })
    }

    async fn push_record(&self, record: &NotificationRecord) -> PushStatus {
        let Some(sender) = self.push.as_ref() else {
            return PushStatus::Disabled;
        };

        let mut message = PushMessage::new(
            record.recipient_user_id,
            record.title.clone(),
            record.body.clone(),
        )
        .with_data("type", record.kind.as_str())
        .with_data("notification_id", record.id.to_string());
        if let Some(product_id) = record.related_product_id {
            message = message.with_data("product_id", product_id.to_string());
        }
        if let Some(comment_id) = record.related_comment_id {
            message = message.with_data("comment_id", comment_id.to_string());
        }
        if let (NotificationKind::ProfileVisit, Some(visitor_id)) =
            (record.kind, record.actor_user_id)
        {
            message = message.with_data("visitor_id", visitor_id.to_string());
        }

        match sender.push(message).await {
            Ok(receipt) => {
                debug!(
                    recipient_id = record.recipient_user_id,
                    kind = %record.kind,
                    protocol = %receipt.protocol,
                    "Push sent"
                );
                PushStatus::Sent(receipt)
            }
            Err(e) => {
                warn!(
                    recipient_id = record.recipient_user_id,
                    kind = %record.kind,
                    protocol = ?e.protocol(),
                    error = %e,
                    "Push failed; notification kept"
                );
                PushStatus::Failed(e.to_string())
            }
        }
    }

    /// Removes the wishlist notification(s) an un-wishlist reverses.
    ///
    /// Every record by `actor_id` for `(recipient, product)` goes. With none,
    /// the newest record without an actor goes instead. Records by another
    /// actor are never touched. Returns how many were removed.
    pub async fn retract_wishlist(
        &self,
        actor_id: i64,
        recipient_id: i64,
        product_id: i64,
    ) -> Result<usize, DispatchError> {
        if recipient_id <= 0 {
            return Err(DispatchError::Validation(format!(
                "recipient id must be positive, got {}",
                recipient_id
            )));
        }
        if actor_id == recipient_id {
            return Ok(0);
        }

        let records = self
            .store
            .find_wishlist(recipient_id, product_id)
            .await
            .map_err(DispatchError::Persistence)?;

        let exact: Vec<i64> = records
            .iter()
            .filter(|r| r.actor_user_id == Some(actor_id))
            .map(|r| r.id)
            .collect();
        let targets = if exact.is_empty() {
            // newest first, so the first actorless row is the most recent
            records
                .iter()
                .find(|r| r.actor_user_id.is_none())
                .map(|r| vec![r.id])
                .unwrap_or_default()
        } else {
            exact
        };

        let mut removed = 0;
        for id in targets {
            if self
                .store
                .delete(recipient_id, id)
                .await
                .map_err(DispatchError::Persistence)?
            {
                removed += 1;
            }
        }

        info!(recipient_id, product_id, actor_id, removed, "Wishlist notification retracted");
        Ok(removed)
    }

    /// [`dispatch`](Self::dispatch) with errors downgraded to log lines.
    pub async fn notify(&self, event: NotificationEvent) -> Option<DispatchOutcome> {
        let recipient_id = event.recipient_id();
        let kind = event.kind();
        match self.dispatch(event).await {
            Ok(outcome) => Some(outcome),
            Err(e @ DispatchError::Persistence(_)) => {
                error!(recipient_id, %kind, error = %e, "Notification dispatch failed");
                None
            }
            Err(e) => {
                warn!(recipient_id, %kind, error = %e, "Notification dispatch rejected");
                None
            }
        }
    }

    /// [`retract_wishlist`](Self::retract_wishlist) with errors downgraded to log lines.
    pub async fn retract_wishlist_quietly(
        &self,
        actor_id: i64,
        recipient_id: i64,
        product_id: i64,
    ) -> usize {
        match self
            .retract_wishlist(actor_id, recipient_id, product_id)
            .await
        {
            Ok(removed) => removed,
            Err(e) => {
                error!(recipient_id, product_id, error = %e, "Wishlist retraction failed");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use preloved_common::push::{PushError, PushProtocol};
    use preloved_common::services::BoxFuture;
    use preloved_db::MemoryStore;

    #[derive(Default)]
    struct RecordingPush {
        sent: Mutex<Vec<PushMessage>>,
        fail: bool,
    }

    impl PushSender for RecordingPush {
        fn push(&self, message: PushMessage) -> BoxFuture<'_, PushReceipt, PushError> {
            self.sent.lock().push(message);
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    Err(PushError::Api {
                        protocol: PushProtocol::Legacy,
                        status: 401,
                        message: "Unauthorized".to_string(),
                    })
                } else {
                    Ok(PushReceipt {
                        protocol: PushProtocol::V1,
                        message_id: Some("projects/p/messages/1".to_string()),
                    })
                }
            })
        }
    }

    struct BrokenStore;

    impl NotificationStore for BrokenStore {
        fn create(
            &self,
            _notification: NewNotification,
        ) -> BoxFuture<'_, NotificationRecord, PrelovedError> {
            Box::pin(async { Err(PrelovedError::DatabaseError("disk full".to_string())) })
        }
        fn list_for_recipient(
            &self,
            _user_id: i64,
        ) -> BoxFuture<'_, Vec<NotificationRecord>, PrelovedError> {
            Box::pin(async { Ok(Vec::new()) })
        }
        fn mark_read(&self, _user_id: i64, _id: i64) -> BoxFuture<'_, bool, PrelovedError> {
            Box::pin(async { Ok(false) })
        }
        fn mark_all_read(&self, _user_id: i64) -> BoxFuture<'_, u64, PrelovedError> {
            Box::pin(async { Ok(0) })
        }
        fn unread_count(&self, _user_id: i64) -> BoxFuture<'_, i64, PrelovedError> {
            Box::pin(async { Ok(0) })
        }
        fn delete(&self, _user_id: i64, _id: i64) -> BoxFuture<'_, bool, PrelovedError> {
            Box::pin(async { Ok(false) })
        }
        fn find_wishlist(
            &self,
            _recipient_id: i64,
            _product_id: i64,
        ) -> BoxFuture<'_, Vec<NotificationRecord>, PrelovedError> {
            Box::pin(async { Err(PrelovedError::DatabaseError("disk full".to_string())) })
        }
    }

    fn setup(fail_push: bool) -> (Arc<MemoryStore>, Arc<RecordingPush>, NotificationDispatcher) {
        let store = Arc::new(MemoryStore::new());
        let push = Arc::new(RecordingPush {
            fail: fail_push,
            ..RecordingPush::default()
        });
        let dispatcher = NotificationDispatcher::new(store.clone(), Some(push.clone()));
        (store, push, dispatcher)
    }

    fn wishlist(actor: i64, owner: i64, product: i64) -> NotificationEvent {
        NotificationEvent::Wishlist {
            actor: Actor::new(actor, "Dina"),
            recipient_id: owner,
            product_id: product,
            product_name: "Vintage Lamp".to_string(),
        }
    }

    #[tokio::test]
    async fn actor_is_recipient_is_skipped() {
        let (store, push, dispatcher) = setup(false);

        let outcome = dispatcher.dispatch(wishlist(1, 1, 10)).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Skipped);
        assert_eq!(store.notification_count(), 0);
        assert!(push.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn comment_is_stored_for_owner_and_pushed() {
        let (store, push, dispatcher) = setup(false);

        let outcome = dispatcher
            .dispatch(NotificationEvent::Comment {
                actor: Actor::new(2, "Dina"),
                recipient_id: 1,
                product_id: 10,
                comment_id: 20,
            })
            .await
            .unwrap();

        let DispatchOutcome::Delivered { record, push: status } = outcome else {
            panic!("expected a delivered outcome");
        };
        assert_eq!(record.recipient_user_id, 1);
        assert_eq!(record.actor_user_id, Some(2));
        assert_eq!(record.kind, NotificationKind::Comment);
        assert_eq!(record.body, "Dina commented on your post");
        assert!(!record.is_read);
        assert!(matches!(status, PushStatus::Sent(_)));

        assert_eq!(store.list_for_recipient(1).await.unwrap().len(), 1);
        assert!(store.list_for_recipient(2).await.unwrap().is_empty());

        let sent = push.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient_id, 1);
        assert_eq!(sent[0].title, "Your post got a comment");
        assert_eq!(sent[0].data["type"], "comment");
        assert_eq!(sent[0].data["product_id"], "10");
        assert_eq!(sent[0].data["comment_id"], "20");
    }

    #[tokio::test]
    async fn invalid_events_store_and_push_nothing() {
        let (store, push, dispatcher) = setup(false);

        let events = vec![
            wishlist(2, 0, 10),
            NotificationEvent::Wishlist {
                actor: Actor::new(2, "Dina"),
                recipient_id: 1,
                product_id: 10,
                product_name: " ".to_string(),
            },
            NotificationEvent::System {
                recipient_id: 1,
                title: String::new(),
                body: "body".to_string(),
                product_id: None,
            },
        ];
        for event in events {
            assert!(matches!(
                dispatcher.dispatch(event).await,
                Err(DispatchError::Validation(_))
            ));
        }
        assert_eq!(store.notification_count(), 0);
        assert!(push.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn persistence_failure_skips_push() {
        let push = Arc::new(RecordingPush::default());
        let dispatcher = NotificationDispatcher::new(Arc::new(BrokenStore), Some(push.clone()));

        let result = dispatcher.dispatch(wishlist(2, 1, 10)).await;
        assert!(matches!(result, Err(DispatchError::Persistence(_))));
        assert!(push.sent.lock().is_empty());

        assert!(dispatcher.notify(wishlist(2, 1, 10)).await.is_none());
        assert_eq!(dispatcher.retract_wishlist_quietly(2, 1, 10).await, 0);
    }

    #[tokio::test]
    async fn push_failure_keeps_record() {
        let (store, push, dispatcher) = setup(true);

        let outcome = dispatcher.dispatch(wishlist(2, 1, 10)).await.unwrap();
        match outcome {
            DispatchOutcome::Delivered {
                push: PushStatus::Failed(reason),
                ..
            } => assert!(reason.contains("401")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(push.sent.lock().len(), 1);
        assert_eq!(store.unread_count(1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn no_sender_means_push_disabled() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = NotificationDispatcher::new(store.clone(), None);

        let outcome = dispatcher
            .dispatch(NotificationEvent::ProfileVisit {
                actor: Actor::new(2, ""),
                recipient_id: 1,
            })
            .await
            .unwrap();
        let DispatchOutcome::Delivered { record, push } = outcome else {
            panic!("expected a delivered outcome");
        };
        assert_eq!(push, PushStatus::Disabled);
        assert_eq!(record.body, "Someone visited your profile");
    }

    #[tokio::test]
    async fn retraction_removes_only_the_actors_records() {
        let (store, _push, dispatcher) = setup(false);
        dispatcher.dispatch(wishlist(2, 1, 10)).await.unwrap();
        dispatcher.dispatch(wishlist(3, 1, 10)).await.unwrap();
        dispatcher.dispatch(wishlist(2, 1, 11)).await.unwrap();

        assert_eq!(dispatcher.retract_wishlist(2, 1, 10).await.unwrap(), 1);
        let left = store.find_wishlist(1, 10).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].actor_user_id, Some(3));
        assert_eq!(store.find_wishlist(1, 11).await.unwrap().len(), 1);

        // nothing left for actor 2 and no actorless row
        assert_eq!(dispatcher.retract_wishlist(2, 1, 10).await.unwrap(), 0);
        assert_eq!(store.find_wishlist(1, 10).await.unwrap().len(), 1);

        assert_eq!(dispatcher.retract_wishlist(1, 1, 10).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn retraction_falls_back_to_newest_actorless_row() {
        let (store, _push, dispatcher) = setup(false);
        let legacy = |body: &str| NewNotification {
            recipient_user_id: 1,
            actor_user_id: None,
            kind: NotificationKind::Wishlist,
            title: "Your product was wishlisted".to_string(),
            body: body.to_string(),
            related_product_id: Some(10),
            related_comment_id: None,
        };
        let older = store.create(legacy("old")).await.unwrap();
        let newer = store.create(legacy("new")).await.unwrap();

        assert_eq!(dispatcher.retract_wishlist(2, 1, 10).await.unwrap(), 1);
        let left = store.find_wishlist(1, 10).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, older.id);
        assert_ne!(left[0].id, newer.id);
    }

    #[tokio::test]
    async fn unread_count_tracks_dispatches_and_reads() {
        let (store, _push, dispatcher) = setup(false);
        let mut ids = Vec::new();
        for actor in 2..7 {
            if let DispatchOutcome::Delivered { record, .. } =
                dispatcher.dispatch(wishlist(actor, 1, 10)).await.unwrap()
            {
                ids.push(record.id);
            }
        }
        assert_eq!(ids.len(), 5);

        assert!(store.mark_read(1, ids[0]).await.unwrap());
        assert!(store.mark_read(1, ids[1]).await.unwrap());
        // a repeated read is not a second distinct read
        assert!(!store.mark_read(1, ids[1]).await.unwrap());
        assert_eq!(store.unread_count(1).await.unwrap(), 3);
    }
}
