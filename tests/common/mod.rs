#![allow(dead_code)]

use axum::Router;

use clause_chat::client::BackendClient;
use clause_chat::config::Config;

/// Serve a stub backend on an ephemeral port, returning its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn client_for(base_url: &str) -> BackendClient {
    let config = Config::from_base_url(base_url);
    BackendClient::new(&config).unwrap()
}
