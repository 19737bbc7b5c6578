//! Scripted collaborators shared by use case tests

use crate::ports::progress::RunProgress;
use crate::ports::provider_client::{ProviderClient, ProviderError};
use assembly_domain::{
    AgentId, GenerationConfig, Roster, RosterEntry, RunManifest, RunStatus,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub(crate) const YES: &str = r#"{"vote": "yes", "statement": "We support this."}"#;

/// One scripted provider reply
#[derive(Clone)]
pub(crate) enum Reply {
    Text(String),
    Fail(ProviderError),
    /// Never answers within any sane timeout
    Hang,
}

impl Reply {
    pub(crate) fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Provider whose replies are scripted per key
///
/// A call matches the first key contained in its system or user prompt.
/// Each key's replies are consumed in order; the last one repeats.
pub(crate) struct ScriptedProvider {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    default: Reply,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            default: Reply::text(YES),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_default(mut self, reply: Reply) -> Self {
        self.default = reply;
        self
    }

    pub(crate) fn script(self, key: &str, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(key.to_string(), replies.into());
        self
    }

    pub(crate) fn calls_for(&self, key: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|k| *k == key).count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next_reply(&self, system: &str, user: &str) -> Reply {
        let mut scripts = self.scripts.lock().unwrap();
        let key = scripts
            .keys()
            .find(|k| system.contains(k.as_str()) || user.contains(k.as_str()))
            .cloned();
        let Some(key) = key else {
            self.calls.lock().unwrap().push(system.to_string());
            return self.default.clone();
        };
        self.calls.lock().unwrap().push(key.clone());
        let queue = scripts.get_mut(&key).unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or_else(|| self.default.clone())
        }
    }
}

#[async_trait]
impl ProviderClient for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        system: &str,
        user: &str,
        _config: &GenerationConfig,
    ) -> Result<String, ProviderError> {
        match self.next_reply(system, user) {
            Reply::Text(text) => Ok(text),
            Reply::Fail(error) => Err(error),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
        }
    }
}

/// Progress recorder that can cancel the run after N dispatches
pub(crate) struct RecordingProgress {
    cancel_after: Option<(usize, CancellationToken)>,
    pub(crate) dispatched: Mutex<Vec<AgentId>>,
    pub(crate) resolved: Mutex<Vec<(AgentId, String)>>,
    pub(crate) status: Mutex<Option<RunStatus>>,
}

impl RecordingProgress {
    pub(crate) fn new() -> Self {
        Self {
            cancel_after: None,
            dispatched: Mutex::new(Vec::new()),
            resolved: Mutex::new(Vec::new()),
            status: Mutex::new(None),
        }
    }

    pub(crate) fn cancelling_after(n: usize, token: CancellationToken) -> Self {
        Self {
            cancel_after: Some((n, token)),
            ..Self::new()
        }
    }
}

impl RunProgress for RecordingProgress {
    fn on_run_start(&self, _manifest: &RunManifest, _already_resolved: usize) {}

    fn on_task_dispatched(&self, identity: &AgentId) {
        let mut dispatched = self.dispatched.lock().unwrap();
        dispatched.push(identity.clone());
        if let Some((n, token)) = &self.cancel_after {
            if dispatched.len() >= *n {
                token.cancel();
            }
        }
    }

    fn on_task_resolved(&self, identity: &AgentId, _display_name: &str, category: &str) {
        self.resolved
            .lock()
            .unwrap()
            .push((identity.clone(), category.to_string()));
    }

    fn on_run_complete(&self, status: RunStatus) {
        *self.status.lock().unwrap() = Some(status);
    }
}

/// Roster whose personas are the slugs themselves
pub(crate) fn roster(slugs: &[&str]) -> Roster {
    Roster::new(
        slugs
            .iter()
            .map(|s| RosterEntry::from_slug(s, *s).unwrap())
            .collect(),
    )
    .unwrap()
}
