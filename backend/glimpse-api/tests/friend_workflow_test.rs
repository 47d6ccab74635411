mod common;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use glimpse_api::error::AppError;
use glimpse_api::models::collections::{friend_requests_of, friends_of};
use glimpse_api::models::User;
use glimpse_api::services::friends::FriendService;

use common::{seed_user, test_store};
use doc_store::{Document, DocumentStore, FieldOp, MemoryStore, Query, StoreError, StoreResult};

/// Store that refuses keyed writes to one collection path, for exercising
/// mid-sequence write failures.
struct UnreliableStore {
    inner: MemoryStore,
    refuse_set_path: std::sync::Mutex<Option<String>>,
}

impl UnreliableStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            refuse_set_path: std::sync::Mutex::new(None),
        }
    }

    fn refuse_set(&self, path: String) {
        *self.refuse_set_path.lock().unwrap() = Some(path);
    }
}

#[async_trait]
impl DocumentStore for UnreliableStore {
    async fn get(&self, path: &str, id: &str) -> StoreResult<Option<Value>> {
        self.inner.get(path, id).await
    }

    async fn query(&self, path: &str, query: Query) -> StoreResult<Vec<Document>> {
        self.inner.query(path, query).await
    }

    async fn insert(&self, path: &str, data: Value) -> StoreResult<String> {
        self.inner.insert(path, data).await
    }

    async fn set(&self, path: &str, id: &str, data: Value) -> StoreResult<()> {
        if self.refuse_set_path.lock().unwrap().as_deref() == Some(path) {
            return Err(StoreError::Backend(format!("write refused: {path}/{id}")));
        }
        self.inner.set(path, id, data).await
    }

    async fn create(&self, path: &str, id: &str, data: Value) -> StoreResult<()> {
        self.inner.create(path, id, data).await
    }

    async fn update(&self, path: &str, id: &str, ops: Vec<FieldOp>) -> StoreResult<()> {
        self.inner.update(path, id, ops).await
    }

    async fn delete(&self, path: &str, id: &str) -> StoreResult<()> {
        self.inner.delete(path, id).await
    }
}

#[actix_rt::test]
async fn self_request_is_rejected_without_writes() {
    let store = test_store();
    let ada = seed_user(&store, "ada", "ada@example.com").await;
    let friends = FriendService::new(store.clone());

    let err = friends.send_request(ada, ada).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let requests = store
        .query(&friend_requests_of(ada), Query::new())
        .await
        .unwrap();
    assert!(requests.is_empty());
}

#[actix_rt::test]
async fn request_to_unknown_user_is_not_found() {
    let store = test_store();
    let ada = seed_user(&store, "ada", "ada@example.com").await;
    let friends = FriendService::new(store.clone());

    let err = friends
        .send_request(ada, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[actix_rt::test]
async fn resend_keeps_a_single_pending_request() {
    let store = test_store();
    let ada = seed_user(&store, "ada", "ada@example.com").await;
    let bob = seed_user(&store, "bob", "bob@example.com").await;
    let friends = FriendService::new(store.clone());

    friends.send_request(ada, bob).await.unwrap();
    friends.send_request(ada, bob).await.unwrap();

    let pending = friends.pending_requests(bob).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].sender_id, ada);
    assert_eq!(pending[0].status, "pending");
}

#[actix_rt::test]
async fn deny_then_resend_leaves_one_request() {
    let store = test_store();
    let ada = seed_user(&store, "ada", "ada@example.com").await;
    let bob = seed_user(&store, "bob", "bob@example.com").await;
    let friends = FriendService::new(store.clone());

    friends.send_request(ada, bob).await.unwrap();
    friends.deny_request(bob, ada).await.unwrap();
    assert!(friends.pending_requests(bob).await.unwrap().is_empty());
    assert!(friends.friend_ids_of(bob).await.unwrap().is_empty());

    friends.send_request(ada, bob).await.unwrap();
    assert_eq!(friends.pending_requests(bob).await.unwrap().len(), 1);
}

#[actix_rt::test]
async fn accept_builds_both_edges_and_clears_requests() {
    let store = test_store();
    let ada = seed_user(&store, "ada", "ada@example.com").await;
    let bob = seed_user(&store, "bob", "bob@example.com").await;
    let friends = FriendService::new(store.clone());

    friends.send_request(ada, bob).await.unwrap();
    // crossing request in the other direction
    friends.send_request(bob, ada).await.unwrap();

    friends.accept_request(bob, ada).await.unwrap();

    assert!(friends.friend_ids_of(bob).await.unwrap().contains(&ada));
    assert!(friends.friend_ids_of(ada).await.unwrap().contains(&bob));
    // no pending request remains in either direction
    assert!(friends.pending_requests(bob).await.unwrap().is_empty());
    assert!(friends.pending_requests(ada).await.unwrap().is_empty());

    for user_id in [ada, bob] {
        let data = store
            .get(glimpse_api::models::collections::USERS, &user_id.to_string())
            .await
            .unwrap()
            .unwrap();
        let user: User = serde_json::from_value(data).unwrap();
        assert_eq!(user.friends_count, 1);
    }
}

#[actix_rt::test]
async fn failed_reverse_edge_surfaces_and_keeps_the_forward_edge() {
    let unreliable = Arc::new(UnreliableStore::new());
    let store: Arc<dyn DocumentStore> = unreliable.clone();
    let ada = seed_user(&store, "ada", "ada@example.com").await;
    let bob = seed_user(&store, "bob", "bob@example.com").await;

    let friends = FriendService::new(store.clone());
    friends.send_request(ada, bob).await.unwrap();

    // the reverse edge lands under the sender's friends subcollection;
    // refusing that path fails the accept sequence after its first write
    unreliable.refuse_set(friends_of(ada));

    let err = friends.accept_request(bob, ada).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Store(StoreError::Backend(_))
    ));

    // the already-written forward edge persists; the divergence is
    // surfaced, not silently repaired
    assert!(friends.friend_ids_of(bob).await.unwrap().contains(&ada));
    assert!(friends.friend_ids_of(ada).await.unwrap().is_empty());

    // the pending request survives, so the accept can be retried
    let pending = friends.pending_requests(bob).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].sender_id, ada);

    // no counter moved
    for user_id in [ada, bob] {
        let data = store
            .get(glimpse_api::models::collections::USERS, &user_id.to_string())
            .await
            .unwrap()
            .unwrap();
        let user: User = serde_json::from_value(data).unwrap();
        assert_eq!(user.friends_count, 0);
    }

    // lifting the refusal lets the retried accept complete
    unreliable.refuse_set(String::new());
    friends.accept_request(bob, ada).await.unwrap();
    assert!(friends.friend_ids_of(ada).await.unwrap().contains(&bob));
    assert!(friends.pending_requests(bob).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn accept_without_pending_request_is_not_found() {
    let store = test_store();
    let ada = seed_user(&store, "ada", "ada@example.com").await;
    let bob = seed_user(&store, "bob", "bob@example.com").await;
    let friends = FriendService::new(store.clone());

    let err = friends.accept_request(bob, ada).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[actix_rt::test]
async fn double_accept_fails_and_edges_stay_single() {
    let store = test_store();
    let ada = seed_user(&store, "ada", "ada@example.com").await;
    let bob = seed_user(&store, "bob", "bob@example.com").await;
    let friends = FriendService::new(store.clone());

    friends.send_request(ada, bob).await.unwrap();
    friends.accept_request(bob, ada).await.unwrap();

    let err = friends.accept_request(bob, ada).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let edges = store.query(&friends_of(bob), Query::new()).await.unwrap();
    assert_eq!(edges.len(), 1);
    let edges = store.query(&friends_of(ada), Query::new()).await.unwrap();
    assert_eq!(edges.len(), 1);
}
