//! Minimal backend instance for trying the router locally.
//!
//! `mock-backend <port>` serves `/health`, `/process` and any other path
//! with a JSON body naming the port it runs on.

use axum::{extract::{Path, State}, routing::get, Json, Router};
use clap::Parser;
use serde_json::{json, Value};
use std::net::SocketAddr;

#[derive(Parser)]
#[command(name = "mock-backend")]
struct Cli {
    port: u16,
}

async fn health(State(port): State<u16>) -> Json<Value> {
    Json(json!({ "status": "OK", "port": port }))
}

async fn process(State(port): State<u16>) -> Json<Value> {
    Json(json!({ "message": "request processed", "port": port }))
}

async fn any_path(State(port): State<u16>, Path(path): Path<String>) -> Json<Value> {
    Json(json!({ "message": format!("processed path: /{}", path), "port": port }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let app = Router::new()
        .route("/health", get(health))
        .route("/process", get(process))
        .route("/{*path}", get(any_path))
        .with_state(cli.port);

    let addr = SocketAddr::from(([127, 0, 0, 1], cli.port));
    println!("mock backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
