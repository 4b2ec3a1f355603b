// tests/feed_flow_tests.rs

use feed_backend::{
    config::Config,
    feed::{
        PgFeedStore,
        store::{AccountStatus, PostLookup},
    },
    routes,
    state::AppState,
};
use sqlx::{PgPool, postgres::PgPoolOptions};

async fn connect() -> PgPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    pool
}

async fn spawn_app() -> String {
    let pool = connect().await;

    let config = Config {
        database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
        jwt_secret: "feed_flow_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
        feed_item_timeout_ms: 2_000,
    };

    let app = routes::create_router(AppState::new(pool, config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Registers and logs in a fresh user. Returns (user id, token).
async fn signup(client: &reqwest::Client, address: &str, prefix: &str) -> (i64, String) {
    let username = format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8]);
    let password = "password123";

    let registered = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({"username": username, "password": password, "name": username}))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();

    let login = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({"username": username, "password": password}))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();

    (
        registered["id"].as_i64().expect("id missing"),
        login["token"].as_str().expect("Token not found").to_string(),
    )
}

async fn create_post(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    metadata: serde_json::Value,
) -> i64 {
    let response = client
        .post(format!("{}/api/posts", address))
        .bearer_auth(token)
        .json(&serde_json::json!({"content": "hello feed", "categoryId": 1, "metadata": metadata}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    response.json::<serde_json::Value>().await.unwrap()["id"]
        .as_i64()
        .unwrap()
}

async fn share_post(client: &reqwest::Client, address: &str, token: &str, post_id: i64) -> i64 {
    let response = client
        .post(format!("{}/api/posts/{}/share", address, post_id))
        .bearer_auth(token)
        .json(&serde_json::json!({"message": "look at this"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    response.json::<serde_json::Value>().await.unwrap()["id"]
        .as_i64()
        .unwrap()
}

/// Finds the feed item rendered for a share.
async fn feed_item_for_share(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    share_id: i64,
) -> serde_json::Value {
    let items = client
        .get(format!("{}/api/feed?limit=100", address))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json::<Vec<serde_json::Value>>()
        .await
        .unwrap();

    items
        .into_iter()
        .find(|item| item["sharedBy"]["id"].as_i64() == Some(share_id))
        .expect("share missing from feed")
}

async fn delete_post(client: &reqwest::Client, address: &str, token: &str, post_id: i64) {
    let response = client
        .delete(format!("{}/api/posts/{}", address, post_id))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);
}

#[tokio::test]
async fn share_of_deleted_post_credits_real_author() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (author_id, author_token) = signup(&client, &address, "fa").await;
    let (sharer_id, sharer_token) = signup(&client, &address, "fs").await;

    let post_id = create_post(&client, &address, &author_token, serde_json::json!({})).await;
    let share_id = share_post(&client, &address, &sharer_token, post_id).await;

    // Live share first
    let item = feed_item_for_share(&client, &address, &sharer_token, share_id).await;
    assert_eq!(item["content"], "hello feed");
    assert_eq!(item["isShareOwner"], true);

    // Act
    delete_post(&client, &address, &author_token, post_id).await;
    let item = feed_item_for_share(&client, &address, &sharer_token, share_id).await;

    // Assert
    assert_eq!(item["metadata"]["reason"], "ORIGINAL_POST_DELETED");
    assert_eq!(item["author"]["id"], author_id);
    assert_eq!(item["sharedBy"]["userId"], sharer_id);
    assert_eq!(item["isPostOwner"], false);
    assert_eq!(item["isShareOwner"], true);
}

#[tokio::test]
async fn share_of_deleted_anonymous_post_stays_anonymous() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, author_token) = signup(&client, &address, "fa").await;
    let (_, sharer_token) = signup(&client, &address, "fs").await;

    let post_id = create_post(
        &client,
        &address,
        &author_token,
        serde_json::json!({"isAnonymous": true}),
    )
    .await;
    let share_id = share_post(&client, &address, &sharer_token, post_id).await;
    delete_post(&client, &address, &author_token, post_id).await;

    let item = feed_item_for_share(&client, &address, &sharer_token, share_id).await;

    assert_eq!(item["metadata"]["reason"], "ORIGINAL_POST_DELETED");
    assert_eq!(item["author"]["id"], 0);
    assert_eq!(item["author"]["name"], "Usuário Anônimo");
}

#[tokio::test]
async fn string_true_is_not_anonymous() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (author_id, author_token) = signup(&client, &address, "fa").await;
    let (_, sharer_token) = signup(&client, &address, "fs").await;

    let post_id = create_post(
        &client,
        &address,
        &author_token,
        serde_json::json!({"isAnonymous": "true"}),
    )
    .await;
    let share_id = share_post(&client, &address, &sharer_token, post_id).await;

    // Visible and placeholder renderings agree on the author.
    let item = feed_item_for_share(&client, &address, &sharer_token, share_id).await;
    assert_eq!(item["author"]["id"], author_id);

    delete_post(&client, &address, &author_token, post_id).await;
    let item = feed_item_for_share(&client, &address, &sharer_token, share_id).await;
    assert_eq!(item["metadata"]["reason"], "ORIGINAL_POST_DELETED");
    assert_eq!(item["author"]["id"], author_id);
}

#[tokio::test]
async fn deleted_author_account_hides_shared_post() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, author_token) = signup(&client, &address, "fa").await;
    let (_, sharer_token) = signup(&client, &address, "fs").await;

    let post_id = create_post(&client, &address, &author_token, serde_json::json!({})).await;
    let share_id = share_post(&client, &address, &sharer_token, post_id).await;

    let response = client
        .delete(format!("{}/api/users/me", address))
        .bearer_auth(&author_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let item = feed_item_for_share(&client, &address, &sharer_token, share_id).await;

    assert_eq!(item["metadata"]["reason"], "ORIGINAL_AUTHOR_DELETED");
    assert_eq!(item["author"]["id"], 0);
    assert_eq!(item["author"]["name"], "Usuário Removido");
}

#[tokio::test]
async fn shares_by_deleted_sharers_leave_the_feed() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, author_token) = signup(&client, &address, "fa").await;
    let (_, sharer_token) = signup(&client, &address, "fs").await;

    let post_id = create_post(&client, &address, &author_token, serde_json::json!({})).await;
    let share_id = share_post(&client, &address, &sharer_token, post_id).await;

    client
        .delete(format!("{}/api/users/me", address))
        .bearer_auth(&sharer_token)
        .send()
        .await
        .unwrap();

    let items = client
        .get(format!("{}/api/feed?limit=100", address))
        .bearer_auth(&author_token)
        .send()
        .await
        .unwrap()
        .json::<Vec<serde_json::Value>>()
        .await
        .unwrap();

    assert!(
        items
            .iter()
            .all(|item| item["sharedBy"]["id"].as_i64() != Some(share_id))
    );
}

#[tokio::test]
async fn store_reads_authorship_from_deleted_rows() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (author_id, author_token) = signup(&client, &address, "fa").await;

    let post_id = create_post(
        &client,
        &address,
        &author_token,
        serde_json::json!({"isAnonymous": true}),
    )
    .await;
    delete_post(&client, &address, &author_token, post_id).await;

    let store = PgFeedStore::new(connect().await);

    let author = store
        .find_post_author(post_id)
        .await
        .unwrap()
        .expect("author of a soft-deleted post");
    assert_eq!(author.id, author_id);
    assert!(author.is_anonymous);
    assert!(store.find_post_by_id(post_id).await.unwrap().is_none());

    assert!(!store.is_account_deleted(author_id).await.unwrap());
    assert!(store.is_account_deleted(i64::MAX).await.unwrap());
}
