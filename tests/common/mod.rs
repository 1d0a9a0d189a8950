//! Shared test helpers: an in-memory transport with scripted responses.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use actinia_client::{ClientConfig, Transport, TransportError};
use async_trait::async_trait;
use serde_json::{Value, json};

pub const BASE: &str = "http://actinia.test/";

/// Serves queued responses per URL and records every request it sees.
///
/// A URL with a single queued response keeps answering with it; longer queues
/// are consumed in order. Unknown URLs answer with HTTP 404.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, TransportError>>>>,
    requests: Mutex<Vec<(String, Option<Value>)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `path`, relative to `{BASE}latest/` unless it is absolute.
    pub fn on(self, path: &str, body: Value) -> Self {
        self.push(path, Ok(body));
        self
    }

    pub fn on_error(self, path: &str, code: u16) -> Self {
        self.push(
            path,
            Err(TransportError::Status {
                code,
                body: "scripted failure".to_string(),
            }),
        );
        self
    }

    fn push(&self, path: &str, response: Result<Value, TransportError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(url(path))
            .or_default()
            .push_back(response);
    }

    pub fn requests(&self) -> Vec<(String, Option<Value>)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        let target = url(path);
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| *u == target)
            .count()
    }

    fn answer(&self, url: &str) -> Result<Value, TransportError> {
        let mut responses = self.responses.lock().unwrap();
        let Some(queue) = responses.get_mut(url) else {
            return Err(TransportError::Status {
                code: 404,
                body: url.to_string(),
            });
        };
        let next = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().map(clone_response)
        };
        next.unwrap_or(Err(TransportError::Status {
            code: 404,
            body: url.to_string(),
        }))
    }
}

fn clone_response(response: &Result<Value, TransportError>) -> Result<Value, TransportError> {
    match response {
        Ok(v) => Ok(v.clone()),
        Err(TransportError::Status { code, body }) => Err(TransportError::Status {
            code: *code,
            body: body.clone(),
        }),
        Err(other) => Err(TransportError::UnexpectedShape(other.to_string())),
    }
}

pub fn url(path: &str) -> String {
    if path.starts_with("http") {
        path.to_string()
    } else {
        format!("{}latest/{}", BASE, path)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<Value, TransportError> {
        self.requests.lock().unwrap().push((url.to_string(), None));
        self.answer(url)
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), Some(body.clone())));
        self.answer(url)
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::new(BASE)
}

/// A parameter record the way the service describes module parameters.
pub fn param(name: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{} parameter", name),
        "optional": false,
        "schema": { "type": "string" }
    })
}

pub fn module_detail(id: &str, inputs: &[&str], outputs: &[&str]) -> Value {
    json!({
        "id": id,
        "description": format!("{} module", id),
        "parameters": inputs.iter().map(|n| param(n)).collect::<Vec<_>>(),
        "returns": outputs.iter().map(|n| param(n)).collect::<Vec<_>>(),
    })
}

pub fn module_list(ids: &[&str]) -> Value {
    json!({
        "status": "success",
        "processes": ids
            .iter()
            .map(|id| json!({"id": id, "description": format!("{} module", id)}))
            .collect::<Vec<_>>(),
    })
}
