//! Friend graph workflow: the request/accept/deny lifecycle between two
//! users and the documents representing it.
//!
//! Mutual friendship is stored as two one-directional edges, one under each
//! user's `friends` subcollection. The accept path is a three-effect
//! multi-write with no transaction: edges are keyed by the friend's id so a
//! retry cannot double-create them, and a partial failure is logged
//! distinctly from a total failure before being surfaced to the caller.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use doc_store::{server_timestamp, DocumentStore, Query};

use crate::error::{AppError, Result};
use crate::models::collections::{friend_requests_of, friends_of, USERS};
use crate::models::{FriendEdge, FriendRequest, User};

#[derive(Clone)]
pub struct FriendService {
    store: Arc<dyn DocumentStore>,
}

impl FriendService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn load_user(&self, user_id: Uuid) -> Result<User> {
        let data = self
            .store
            .get(USERS, &user_id.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;
        Ok(serde_json::from_value(data)?)
    }

    /// Strangers -> RequestPending(sender).
    ///
    /// Keyed by the sender's id under the recipient's `friendRequests`
    /// subcollection, so a re-send overwrites rather than duplicates.
    pub async fn send_request(&self, sender: Uuid, recipient: Uuid) -> Result<()> {
        if sender == recipient {
            return Err(AppError::BadRequest(
                "cannot send a friend request to yourself".to_string(),
            ));
        }
        // both sides must exist before any write
        self.load_user(recipient).await?;
        let sender_doc = self.load_user(sender).await?;

        let request = json!({
            "senderId": sender.to_string(),
            "displayName": sender_doc.display_name,
            "email": sender_doc.email,
            "photoURL": sender_doc.photo_url(),
            "sentAt": server_timestamp(),
            "status": "pending",
        });
        self.store
            .set(&friend_requests_of(recipient), &sender.to_string(), request)
            .await?;

        tracing::debug!("friend request sent: {} -> {}", sender, recipient);
        Ok(())
    }

    /// RequestPending(sender) -> Friends.
    ///
    /// Three effects, in order: edge recipient->sender, edge
    /// sender->recipient, delete of the request. Also clears a reverse
    /// pending request so no pending request remains between the pair.
    pub async fn accept_request(&self, recipient: Uuid, sender: Uuid) -> Result<()> {
        let request_path = friend_requests_of(recipient);
        let pending = self
            .store
            .get(&request_path, &sender.to_string())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("no pending request from {sender} to {recipient}"))
            })?;
        let _request: FriendRequest = serde_json::from_value(pending)?;

        let recipient_doc = self.load_user(recipient).await?;
        let sender_doc = self.load_user(sender).await?;

        // effect (a): edge under the recipient pointing at the sender
        self.store
            .set(
                &friends_of(recipient),
                &sender.to_string(),
                edge_doc(sender, &sender_doc),
            )
            .await?;

        // effect (b): reverse edge under the sender
        if let Err(e) = self
            .store
            .set(
                &friends_of(sender),
                &recipient.to_string(),
                edge_doc(recipient, &recipient_doc),
            )
            .await
        {
            tracing::error!(
                "partial friend accept: edge {}->{} written, reverse edge failed: {}",
                recipient,
                sender,
                e
            );
            return Err(e.into());
        }

        // effect (c): the accepted request is removed
        if let Err(e) = self.store.delete(&request_path, &sender.to_string()).await {
            tracing::error!(
                "partial friend accept: edges {}<->{} written, request delete failed: {}",
                recipient,
                sender,
                e
            );
            return Err(e.into());
        }

        // a reverse pending request (sender had one from the recipient) is
        // superseded by the accepted friendship
        if let Err(e) = self
            .store
            .delete(&friend_requests_of(sender), &recipient.to_string())
            .await
        {
            tracing::error!(
                "partial friend accept: edges {}<->{} written, reverse request delete failed: {}",
                recipient,
                sender,
                e
            );
            return Err(e.into());
        }

        // denormalized counters, best effort
        for user_id in [recipient, sender] {
            if let Err(e) = self
                .store
                .update(
                    USERS,
                    &user_id.to_string(),
                    vec![doc_store::FieldOp::increment("friendsCount", 1)],
                )
                .await
            {
                tracing::warn!("friendsCount increment failed for {}: {}", user_id, e);
            }
        }

        tracing::info!("friend request accepted: {} <-> {}", recipient, sender);
        Ok(())
    }

    /// RequestPending(sender) -> Strangers. Deletes the request only.
    pub async fn deny_request(&self, recipient: Uuid, sender: Uuid) -> Result<()> {
        self.store
            .delete(&friend_requests_of(recipient), &sender.to_string())
            .await?;
        tracing::debug!("friend request denied: {} -> {}", sender, recipient);
        Ok(())
    }

    /// All pending requests addressed to `recipient`.
    pub async fn pending_requests(&self, recipient: Uuid) -> Result<Vec<FriendRequest>> {
        let docs = self
            .store
            .query(
                &friend_requests_of(recipient),
                Query::new().order_by_desc("sentAt"),
            )
            .await?;
        let mut requests = Vec::with_capacity(docs.len());
        for doc in docs {
            match serde_json::from_value::<FriendRequest>(doc.data) {
                Ok(request) => requests.push(request),
                Err(e) => tracing::warn!("skipping malformed friend request {}: {}", doc.id, e),
            }
        }
        Ok(requests)
    }

    /// The viewer's friend set, derived from their one-directional edges.
    pub async fn friend_ids_of(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        let docs = self
            .store
            .query(&friends_of(user_id), Query::new())
            .await?;
        let mut ids = HashSet::with_capacity(docs.len());
        for doc in docs {
            match serde_json::from_value::<FriendEdge>(doc.data) {
                Ok(edge) => {
                    ids.insert(edge.friend_id);
                }
                Err(e) => tracing::warn!("skipping malformed friend edge {}: {}", doc.id, e),
            }
        }
        Ok(ids)
    }

    /// Edge count under the user's `friends` subcollection.
    pub async fn friend_count(&self, user_id: Uuid) -> Result<usize> {
        let docs = self
            .store
            .query(&friends_of(user_id), Query::new())
            .await?;
        Ok(docs.len())
    }

    /// Whether `sender` already has a pending request addressed to
    /// `recipient`.
    pub async fn request_sent(&self, sender: Uuid, recipient: Uuid) -> Result<bool> {
        Ok(self
            .store
            .get(&friend_requests_of(recipient), &sender.to_string())
            .await?
            .is_some())
    }
}

fn edge_doc(friend_id: Uuid, friend: &User) -> serde_json::Value {
    json!({
        "friendId": friend_id.to_string(),
        "displayName": friend.display_name,
        "email": friend.email,
        "acceptedAt": server_timestamp(),
    })
}
