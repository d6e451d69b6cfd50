//! Scripted transport for exercising the upstream layer without a network.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
    thread,
    time::Duration,
};

use crate::upstream::client::{RawResponse, Transport};

type Reply = Result<RawResponse, String>;

/// Replies are queued per URL; the last queued reply repeats once the rest
/// are used up. Unknown URLs answer 404.
///
/// With a latency set, every call takes that long, or fails as timed out
/// when the attempt's timeout is shorter.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<HashMap<String, usize>>,
    latency: Mutex<Duration>,
}

impl FakeTransport {
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn reply(&self, url: &str, status: u16, body: &str) {
        self.push(
            url,
            Ok(RawResponse {
                status,
                body: body.to_string(),
            }),
        );
    }

    pub fn fail(&self, url: &str, reason: &str) {
        self.push(url, Err(reason.to_string()));
    }

    fn push(&self, url: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl Transport for FakeTransport {
    fn get_text(&self, url: &str, timeout: Duration) -> Result<RawResponse, String> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            thread::sleep(latency.min(timeout));
            if latency > timeout {
                return Err("timed out".to_string());
            }
        }

        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Ok(RawResponse {
                status: 404,
                body: String::new(),
            }),
        }
    }
}
