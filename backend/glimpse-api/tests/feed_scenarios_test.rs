mod common;

use serde_json::json;

use doc_store::server_timestamp;
use glimpse_api::models::collections::POSTS;
use glimpse_api::models::PrivacyMode;
use glimpse_api::services::feed::FeedService;
use glimpse_api::services::friends::FriendService;

use common::{seed_post, seed_user, test_store};

fn feed_service(store: &std::sync::Arc<dyn doc_store::DocumentStore>) -> FeedService {
    FeedService::new(store.clone(), FriendService::new(store.clone()))
}

#[actix_rt::test]
async fn public_posts_reach_everyone() {
    let store = test_store();
    let ada = seed_user(&store, "ada", "ada@example.com").await;
    let bob = seed_user(&store, "bob", "bob@example.com").await;
    seed_post(&store, ada, "ada", PrivacyMode::Public, "sunrise").await;

    let feed = feed_service(&store);
    assert_eq!(feed.assemble_feed(Some(bob)).await.unwrap().len(), 1);
    assert_eq!(feed.assemble_feed(Some(ada)).await.unwrap().len(), 1);
    assert_eq!(feed.assemble_feed(None).await.unwrap().len(), 1);
}

#[actix_rt::test]
async fn private_posts_are_owner_only() {
    let store = test_store();
    let ada = seed_user(&store, "ada", "ada@example.com").await;
    let bob = seed_user(&store, "bob", "bob@example.com").await;
    seed_post(&store, ada, "ada", PrivacyMode::Private, "diary").await;

    // even a full friendship does not open a private post
    let friends = FriendService::new(store.clone());
    friends.send_request(bob, ada).await.unwrap();
    friends.accept_request(ada, bob).await.unwrap();

    let feed = feed_service(&store);
    assert_eq!(feed.assemble_feed(Some(ada)).await.unwrap().len(), 1);
    assert!(feed.assemble_feed(Some(bob)).await.unwrap().is_empty());
    assert!(feed.assemble_feed(None).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn friends_only_opens_after_accept() {
    let store = test_store();
    let ada = seed_user(&store, "ada", "ada@example.com").await;
    let bob = seed_user(&store, "bob", "bob@example.com").await;
    seed_post(&store, ada, "ada", PrivacyMode::FriendsOnly, "picnic").await;

    let feed = feed_service(&store);
    let friends = FriendService::new(store.clone());

    // stranger: hidden
    assert!(feed.assemble_feed(Some(bob)).await.unwrap().is_empty());

    // pending request: still hidden
    friends.send_request(bob, ada).await.unwrap();
    assert!(feed.assemble_feed(Some(bob)).await.unwrap().is_empty());

    // accepted: visible
    friends.accept_request(ada, bob).await.unwrap();
    let visible = feed.assemble_feed(Some(bob)).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].caption, "picnic");
}

#[actix_rt::test]
async fn unrecognized_privacy_mode_is_hidden_from_others() {
    let store = test_store();
    let ada = seed_user(&store, "ada", "ada@example.com").await;
    let bob = seed_user(&store, "bob", "bob@example.com").await;
    store
        .insert(
            POSTS,
            json!({
                "userId": ada.to_string(),
                "username": "ada",
                "imageUrl": "https://media.test/x.jpg",
                "caption": "mystery",
                "privacyMode": "Followers",
                "likesCount": 0,
                "likedBy": [],
                "createdAt": server_timestamp(),
            }),
        )
        .await
        .unwrap();

    let feed = feed_service(&store);
    assert!(feed.assemble_feed(Some(bob)).await.unwrap().is_empty());
    assert!(feed.assemble_feed(None).await.unwrap().is_empty());
    // the author still sees their own post
    assert_eq!(feed.assemble_feed(Some(ada)).await.unwrap().len(), 1);
}

#[actix_rt::test]
async fn feed_is_newest_first_and_filter_preserves_order() {
    let store = test_store();
    let ada = seed_user(&store, "ada", "ada@example.com").await;
    let bob = seed_user(&store, "bob", "bob@example.com").await;

    seed_post(&store, ada, "ada", PrivacyMode::Public, "first").await;
    seed_post(&store, ada, "ada", PrivacyMode::Private, "hidden").await;
    seed_post(&store, ada, "ada", PrivacyMode::Public, "second").await;
    seed_post(&store, ada, "ada", PrivacyMode::Public, "third").await;

    let feed = feed_service(&store);
    let items = feed.assemble_feed(Some(bob)).await.unwrap();
    let captions: Vec<&str> = items.iter().map(|i| i.caption.as_str()).collect();
    assert_eq!(captions, vec!["third", "second", "first"]);
}

#[actix_rt::test]
async fn liked_flag_follows_the_viewer() {
    let store = test_store();
    let ada = seed_user(&store, "ada", "ada@example.com").await;
    let bob = seed_user(&store, "bob", "bob@example.com").await;
    let post_id = seed_post(&store, ada, "ada", PrivacyMode::Public, "sunset").await;

    let posts = glimpse_api::services::posts::PostService::new(store.clone());
    posts.like(bob, &post_id).await.unwrap();

    let feed = feed_service(&store);
    let for_bob = feed.assemble_feed(Some(bob)).await.unwrap();
    assert!(for_bob[0].liked);
    assert_eq!(for_bob[0].likes_count, 1);

    let for_ada = feed.assemble_feed(Some(ada)).await.unwrap();
    assert!(!for_ada[0].liked);
}
