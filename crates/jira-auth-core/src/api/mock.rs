//! Scripted transport for tests.
//!
//! `MockTransport` replays queued responses in order and records every
//! request it is asked to execute, so tests can assert both on outcomes and on
//! what went over the "wire". Clones share the same queue and recording.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures::future::{self, FutureExt};
use reqwest::Method;
use serde_json::Value;
use url::Url;

use super::{ApiRequest, ApiResponse, Cookie, Transport, TransportError};

const MOCK_BASE_URL: &str = "https://jira.test/";

enum MockReply {
    Response {
        status: u16,
        cookies: Vec<Cookie>,
        body: Vec<u8>,
    },
    BodyError {
        status: u16,
        message: String,
    },
    Error(String),
}

#[derive(Default)]
struct MockState {
    replies: VecDeque<MockReply>,
    requests: Vec<ApiRequest>,
    build_failure: Option<String>,
}

#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the recording from others
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a response with a raw body
    pub fn queue_response(&self, status: u16, cookies: Vec<Cookie>, body: impl Into<Vec<u8>>) {
        self.state().replies.push_back(MockReply::Response {
            status,
            cookies,
            body: body.into(),
        });
    }

    /// Queue a response with a JSON body
    pub fn queue_json(&self, status: u16, cookies: Vec<Cookie>, body: &Value) {
        self.queue_response(status, cookies, body.to_string());
    }

    /// Queue a response whose status arrives but whose body fails to read
    pub fn queue_body_error(&self, status: u16, message: &str) {
        self.state().replies.push_back(MockReply::BodyError {
            status,
            message: message.to_string(),
        });
    }

    /// Queue a network failure with no response
    pub fn queue_error(&self, message: &str) {
        self.state()
            .replies
            .push_back(MockReply::Error(message.to_string()));
    }

    /// Make the next `build_request` call fail
    pub fn fail_next_build(&self, message: &str) {
        self.state().build_failure = Some(message.to_string());
    }

    /// Requests executed so far, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }

    pub fn queued_reply_count(&self) -> usize {
        self.state().replies.len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiRequest, TransportError> {
        if let Some(message) = self.state().build_failure.take() {
            return Err(TransportError::InvalidRequest(message));
        }
        let url = Url::parse(MOCK_BASE_URL)?.join(path.trim_start_matches('/'))?;
        Ok(ApiRequest::new(method, url, body))
    }

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let reply = {
            let mut state = self.state();
            state.requests.push(request);
            state.replies.pop_front()
        };

        match reply {
            Some(MockReply::Response {
                status,
                cookies,
                body,
            }) => Ok(ApiResponse::from_bytes(status, cookies, body)),
            Some(MockReply::BodyError { status, message }) => {
                let body = future::ready(Err(TransportError::Connection(message))).boxed();
                Ok(ApiResponse::new(status, Vec::new(), body))
            }
            Some(MockReply::Error(message)) => Err(TransportError::Connection(message)),
            None => Err(TransportError::Connection(
                "No queued response in MockTransport".to_string(),
            )),
        }
    }
}
