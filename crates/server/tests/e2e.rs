use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use configs::StorageConfig;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use service::ResourceStores;
use tokio::net::TcpListener;
use uuid::Uuid;

use server::routes;

struct TestApp {
    base_url: String,
    data_dir: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

async fn start_server() -> anyhow::Result<TestApp> {
    // isolated data dir per test run
    let data_dir = std::env::temp_dir().join(format!("rbac_store_e2e_{}", Uuid::new_v4()));
    let cfg = StorageConfig { data_dir: data_dir.clone(), ..StorageConfig::default() };
    let app: Router = routes::build_router(ResourceStores::open(&cfg), routes::build_cors());

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, data_dir })
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_users_create_delete_list() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let res = c.post(format!("{}/users", app.base_url)).json(&json!({"name": "Ann"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    assert_eq!(res.json::<Value>().await?, json!({"id": 1, "name": "Ann"}));

    let res = c.post(format!("{}/users", app.base_url)).json(&json!({"name": "Bo"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    assert_eq!(res.json::<Value>().await?, json!({"id": 2, "name": "Bo"}));

    let res = c.delete(format!("{}/users/1", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    assert!(res.bytes().await?.is_empty());

    let res = c.get(format!("{}/users", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!([{"id": 2, "name": "Bo"}]));

    // whole collection is on disk, pretty-printed
    let text = tokio::fs::read_to_string(app.data_dir.join("users.json")).await?;
    assert_eq!(serde_json::from_str::<Value>(&text)?, json!([{"id": 2, "name": "Bo"}]));
    assert!(text.contains("\n  {\n    \"id\": 2,"));
    Ok(())
}

#[tokio::test]
async fn e2e_update_roles_and_permissions() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    c.post(format!("{}/roles", app.base_url)).json(&json!({"name": "admin", "level": 1})).send().await?;
    let res = c.put(format!("{}/roles/1", app.base_url)).json(&json!({"level": 9, "id": 77})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"id": 1, "name": "admin", "level": 9}));

    let res = c.put(format!("{}/permissions/5", app.base_url)).json(&json!({"name": "x"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Not Found");

    let res = c.get(format!("{}/permissions", app.base_url)).send().await?;
    assert_eq!(res.json::<Value>().await?, json!([]));
    assert!(app.data_dir.join("roles.json").is_file());
    assert!(!app.data_dir.join("permission.json").exists());
    Ok(())
}

#[tokio::test]
async fn e2e_parallel_posts_get_distinct_ids() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();
    let mut handles = Vec::new();
    for i in 0..20 {
        let c = c.clone();
        let url = format!("{}/permissions", app.base_url);
        handles.push(tokio::spawn(async move { c.post(url).json(&json!({"n": i})).send().await }));
    }
    for h in handles {
        assert_eq!(h.await??.status(), HttpStatusCode::CREATED);
    }
    let list = c.get(format!("{}/permissions", app.base_url)).send().await?.json::<Vec<Value>>().await?;
    let mut ids: Vec<i64> = list.iter().filter_map(|r| r["id"].as_i64()).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    Ok(())
}
