//! In-memory [`HttpTransport`] for unit tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::transport::{Credential, HttpResponse, HttpTransport};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub token: String,
    pub body: Option<Value>,
}

enum Scripted {
    Response(HttpResponse),
    Unreachable(String),
}

/// Records every request. Answers from a scripted queue first; once the
/// queue is empty, a stateful fake serves objects stored by URL, and a
/// plain fake answers 500.
#[derive(Default)]
pub struct FakeTransport {
    scripted: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
    store: Option<Mutex<BTreeMap<String, Value>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake remote that remembers created objects.
    pub fn stateful() -> Self {
        Self {
            store: Some(Mutex::new(BTreeMap::new())),
            ..Self::default()
        }
    }

    /// Seed the stateful store with an existing object at `url`.
    pub fn insert(&self, url: &str, object: Value) {
        if let Some(store) = &self.store {
            store.lock().unwrap().insert(url.to_string(), object);
        }
    }

    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.scripted
            .lock()
            .unwrap()
            .push_back(Scripted::Response(HttpResponse::new(status, body)));
    }

    pub fn push_unreachable(&self, message: impl Into<String>) {
        self.scripted
            .lock()
            .unwrap()
            .push_back(Scripted::Unreachable(message.into()));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    fn handle(
        &self,
        method: &'static str,
        url: &str,
        credential: &Credential,
        body: Option<&Value>,
    ) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            token: credential.token().to_string(),
            body: body.cloned(),
        });

        if let Some(next) = self.scripted.lock().unwrap().pop_front() {
            return match next {
                Scripted::Response(resp) => Ok(resp),
                Scripted::Unreachable(message) => Err(TransportError::request(url, message)),
            };
        }

        let Some(store) = &self.store else {
            return Ok(HttpResponse::new(500, "no scripted response"));
        };
        let mut store = store.lock().unwrap();
        let resp = match method {
            "GET" => match store.get(url) {
                Some(object) => HttpResponse::new(200, object.to_string()),
                None => HttpResponse::new(404, ""),
            },
            "POST" => {
                let body = body.cloned().unwrap_or(Value::Null);
                let name = body.get("name").and_then(Value::as_str).unwrap_or_default();
                let item = format!("{url}/{}", urlencoding::encode(name));
                if store.contains_key(&item) {
                    HttpResponse::new(409, "already exists")
                } else {
                    store.insert(item, body.clone());
                    HttpResponse::new(200, body.to_string())
                }
            }
            "DELETE" => match store.remove(url) {
                Some(_) => HttpResponse::new(200, "{}"),
                None => HttpResponse::new(404, ""),
            },
            _ => HttpResponse::new(405, ""),
        };
        Ok(resp)
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, url: &str, credential: &Credential) -> Result<HttpResponse, TransportError> {
        self.handle("GET", url, credential, None)
    }

    async fn post_json(
        &self,
        url: &str,
        credential: &Credential,
        body: &Value,
    ) -> Result<HttpResponse, TransportError> {
        self.handle("POST", url, credential, Some(body))
    }

    async fn delete(
        &self,
        url: &str,
        credential: &Credential,
    ) -> Result<HttpResponse, TransportError> {
        self.handle("DELETE", url, credential, None)
    }
}
