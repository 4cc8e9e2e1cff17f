use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::http_client::{OutboundRequest, RawReply, Transport, TransportError};

/// Records every outbound request and answers from a queue of canned replies.
#[derive(Default)]
pub struct SpyTransport {
    calls: Mutex<Vec<OutboundRequest>>,
    replies: Mutex<VecDeque<Result<RawReply, TransportError>>>,
}

impl SpyTransport {
    pub fn replying(status: StatusCode, body: &str) -> Self {
        let spy = Self::default();
        spy.push(Ok(RawReply {
            status,
            body: body.to_string(),
        }));
        spy
    }

    pub fn failing(err: TransportError) -> Self {
        let spy = Self::default();
        spy.push(Err(err));
        spy
    }

    pub fn push(&self, reply: Result<RawReply, TransportError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<OutboundRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for SpyTransport {
    async fn post_json(&self, request: OutboundRequest) -> Result<RawReply, TransportError> {
        self.calls.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Request {
                    cause: "no canned reply left".into(),
                })
            })
    }
}
