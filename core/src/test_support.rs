//! Scripted in-memory `Transport` for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

#[derive(Debug, Clone)]
enum Script {
    Reply { status: u16, body: String, delay: Duration },
    NetworkFailure,
}

/// Replies are keyed by method and full path. Unscripted requests get 404.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeTransport {
    routes: Arc<Mutex<HashMap<(HttpMethod, String), Script>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
        self.reply_after(method, path, status, body, Duration::ZERO);
    }

    pub(crate) fn reply_after(&self, method: HttpMethod, path: &str, status: u16, body: &str, delay: Duration) {
        let script = Script::Reply {
            status,
            body: body.to_string(),
            delay,
        };
        self.routes.lock().unwrap().insert((method, path.to_string()), script);
    }

    pub(crate) fn network_failure(&self, method: HttpMethod, path: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Script::NetworkFailure);
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

impl Transport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let script = self
            .routes
            .lock()
            .unwrap()
            .get(&(request.method, request.path.clone()))
            .cloned();
        self.requests.lock().unwrap().push(request);

        match script {
            Some(Script::Reply { status, body, delay }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(HttpResponse {
                    status,
                    headers: Vec::new(),
                    body,
                })
            }
            Some(Script::NetworkFailure) => Err(ApiError::Network("connection refused".to_string())),
            None => Ok(HttpResponse {
                status: 404,
                headers: Vec::new(),
                body: String::new(),
            }),
        }
    }
}
