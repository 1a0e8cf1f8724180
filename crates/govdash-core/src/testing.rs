//! Test doubles shared by the retry and controller tests.

use crate::error::FetchError;
use crate::retry::Sleeper;
use crate::source::ProposalSource;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn proposal_json(key: &str, created_at: &str) -> Value {
    proposal_json_window(key, created_at, "2024-06-01T00:00:00Z", "2024-06-04T00:00:00Z")
}

pub fn proposal_json_window(key: &str, created_at: &str, activated_at: &str, ends_at: &str) -> Value {
    json!({
        "key": key,
        "title": format!("Proposal {key}"),
        "link": format!("https://vote.example.org/proposal/{key}"),
        "options": ["For", "Against"],
        "optionVotes": [100, 25],
        "index": 1,
        "proposer": "proposer",
        "canceledAt": null,
        "createdAt": created_at,
        "activatedAt": activated_at,
        "votingEndsAt": ends_at,
        "queuedAt": null,
        "type": 0
    })
}

/// Plays back canned responses in order, then fails.
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Value, FetchError>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<Value, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProposalSource for ScriptedSource {
    fn fetch(&self, _limit: u32) -> impl Future<Output = Result<Value, FetchError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transport("script exhausted".into())));
        std::future::ready(next)
    }
}

/// Records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.delays.lock().unwrap().push(duration);
        std::future::ready(())
    }
}
