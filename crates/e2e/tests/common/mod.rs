//! In-process stand-in for the node bridge

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use ats_e2e::playwright::PlaywrightHandle;

/// Every request the fake bridge received, as (method, params)
pub type Calls = Arc<Mutex<Vec<(String, Value)>>>;

/// Serve bridge requests with `handler` on a background task
pub fn fake_bridge<F>(mut handler: F) -> (PlaywrightHandle, Calls)
where
    F: FnMut(&str, &Value) -> Result<Value, String> + Send + 'static,
{
    let (ours, theirs) = tokio::io::duplex(64 * 1024);
    let (reader, writer) = tokio::io::split(ours);
    let calls: Calls = Arc::default();
    let log = calls.clone();

    tokio::spawn(async move {
        let (read, mut write) = tokio::io::split(theirs);
        let mut lines = BufReader::new(read).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let request: Value = serde_json::from_str(&line).expect("request is JSON");
            let id = request["id"].clone();
            let method = request["method"].as_str().unwrap_or_default().to_string();
            let params = request["params"].clone();
            log.lock().unwrap().push((method.clone(), params.clone()));

            let reply = match handler(&method, &params) {
                Ok(result) => json!({ "id": id, "ok": true, "result": result }),
                Err(error) => json!({ "id": id, "ok": false, "error": error }),
            };
            if write.write_all(format!("{}\n", reply).as_bytes()).await.is_err() {
                break;
            }
        }
    });

    let handle = PlaywrightHandle::with_transport(reader, writer, Duration::from_secs(5));
    (handle, calls)
}

pub fn methods(calls: &Calls) -> Vec<String> {
    calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
}

/// Compact form of a locator chain: known selectors become short tokens and
/// `nth` parts become `#`, with their indices returned separately
pub fn shape(params: &Value) -> (String, Vec<usize>) {
    let mut tokens = Vec::new();
    let mut indices = Vec::new();

    for part in params["locator"].as_array().cloned().unwrap_or_default() {
        match part["kind"].as_str().unwrap_or_default() {
            "css" => {
                let selector = part["selector"].as_str().unwrap_or_default();
                let token = if selector.contains("col-md") {
                    "col"
                } else if selector == ".card-body" {
                    "body"
                } else if selector == ".card:has(.card-title)" {
                    "card"
                } else if selector.contains("card-header") {
                    "header"
                } else if selector.contains(".card-title") {
                    "title"
                } else if selector.contains("div.card") {
                    "position"
                } else {
                    selector
                };
                tokens.push(token.to_string());
            }
            "nth" => {
                tokens.push("#".to_string());
                indices.push(part["index"].as_u64().unwrap_or_default() as usize);
            }
            "role" => tokens.push(format!("role:{}", part["name"]["pattern"].as_str().unwrap_or_default())),
            "label" => tokens.push(format!("label:{}", part["text"].as_str().unwrap_or_default())),
            other => tokens.push(other.to_string()),
        }
    }

    (tokens.join(" "), indices)
}
