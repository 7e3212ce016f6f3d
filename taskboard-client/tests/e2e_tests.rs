/// End-to-end tests
///
/// Serves the real router over an in-memory store on a local port and
/// drives it with `ApiClient`.

use std::sync::Arc;

use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_client::{resolve, ApiClient, ClientError, MemoryTokenStorage, Navigation, View};
use taskboard_shared::models::{NewTask, Role, TaskChanges, TaskStatus};
use taskboard_shared::store::memory::MemoryStore;
use tokio::net::TcpListener;

async fn spawn_server() -> String {
    let config = Config::from_lookup(|key| match key {
        "STORE_BACKEND" => Some("memory".to_string()),
        "JWT_SECRET" => Some("e2e-secret-key-at-least-32-bytes-long".to_string()),
        _ => None,
    })
    .expect("Test configuration should be valid");

    let app = build_router(AppState::new(Arc::new(MemoryStore::new()), config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Arc::new(MemoryTokenStorage::new())).unwrap()
}

#[tokio::test]
async fn test_task_lifecycle() {
    let base_url = spawn_server().await;
    let client = client(&base_url);

    let output = client
        .register("Ada", "ada@example.com", "secret1", None)
        .await
        .unwrap();
    assert_eq!(output.message, "User registered successfully");
    assert!(client.is_authenticated());

    let created = client
        .create_tasks(vec![
            NewTask::new("first"),
            NewTask::new("second").with_description("details"),
        ])
        .await
        .unwrap();
    assert_eq!(created.len(), 2);
    assert!(created.iter().all(|t| t.status == TaskStatus::Todo));

    let listed = client.list_tasks().await.unwrap();
    assert_eq!(listed.len(), 2);

    let target = created[0].id;
    let updated = client
        .update_task(
            target,
            TaskChanges {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, target);
    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.title, "first");

    client.delete_task(target).await.unwrap();

    let remaining = client.list_tasks().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(remaining.iter().all(|t| t.id != target));

    let err = client.delete_task(target).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_login_and_logout() {
    let base_url = spawn_server().await;

    client(&base_url)
        .register("Ada", "ada@example.com", "secret1", None)
        .await
        .unwrap();

    let client = client(&base_url);
    assert!(!client.is_authenticated());

    client.login("ada@example.com", "secret1").await.unwrap();
    let profile = client.me().await.unwrap();
    assert_eq!(profile.email, "ada@example.com");

    client.logout();
    assert!(matches!(
        client.list_tasks().await,
        Err(ClientError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_api_errors_carry_server_message() {
    let base_url = spawn_server().await;
    let client = client(&base_url);

    client
        .register("Ada", "ada@example.com", "secret1", None)
        .await
        .unwrap();

    match client
        .register("Ada", "ada@example.com", "secret1", None)
        .await
    {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "Email already exists");
        }
        other => panic!("expected conflict, got {:?}", other),
    }

    match client.login("ada@example.com", "wrong-password").await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("expected invalid credentials, got {:?}", other),
    }
}

#[tokio::test]
async fn test_register_with_role() {
    let base_url = spawn_server().await;

    let user = client(&base_url);
    user.register("Bob", "bob@example.com", "secret1", None)
        .await
        .unwrap();

    let admin = client(&base_url);
    admin
        .register("Root", "root@example.com", "secret1", Some(Role::Admin))
        .await
        .unwrap();

    assert_eq!(user.me().await.unwrap().role, Role::User);
    assert_eq!(admin.me().await.unwrap().role, Role::Admin);
}

#[tokio::test]
async fn test_navigation_follows_session() {
    let base_url = spawn_server().await;
    let client = client(&base_url);

    assert_eq!(
        resolve("/dashboard", client.storage().as_ref()),
        Navigation::Redirect(View::Login)
    );

    client
        .register("Ada", "ada@example.com", "secret1", None)
        .await
        .unwrap();
    assert_eq!(
        resolve("/dashboard", client.storage().as_ref()),
        Navigation::Render(View::Dashboard)
    );

    client.logout();
    assert_eq!(
        resolve("/create-task", client.storage().as_ref()),
        Navigation::Redirect(View::Login)
    );
}
