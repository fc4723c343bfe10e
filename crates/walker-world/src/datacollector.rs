//! Named metric reporters and the per-step log they feed.

use crate::agent::Agent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use walker_core::AgentId;

/// A single recorded metric value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Int(v) => *v as f64,
            MetricValue::Float(v) => *v,
        }
    }
}

impl From<usize> for MetricValue {
    fn from(v: usize) -> Self {
        MetricValue::Int(v as i64)
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Int(v)
    }
}

impl From<i32> for MetricValue {
    fn from(v: i32) -> Self {
        MetricValue::Int(v as i64)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

pub type ModelReporter<S> = Box<dyn Fn(&S) -> MetricValue + Send + Sync>;
pub type AgentReporter = Box<dyn Fn(&dyn Agent) -> MetricValue + Send + Sync>;

/// One agent-level value captured at a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub step: u64,
    pub agent_id: AgentId,
    pub name: String,
    pub value: MetricValue,
}

/// Values captured for one step, not yet appended to the log
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub step: u64,
    pub model: Vec<(String, MetricValue)>,
    pub agents: Vec<AgentRecord>,
}

/// Serializable view of the whole log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsTable {
    pub steps: Vec<u64>,
    pub model_vars: BTreeMap<String, Vec<MetricValue>>,
    pub agent_records: Vec<AgentRecord>,
}

/// Registry of reporters over a state `S` plus the append-only log
pub struct DataCollector<S> {
    model_reporters: Vec<(String, ModelReporter<S>)>,
    agent_reporters: Vec<(String, AgentReporter)>,
    steps: Vec<u64>,
    model_vars: BTreeMap<String, Vec<MetricValue>>,
    agent_records: Vec<AgentRecord>,
}

impl<S> DataCollector<S> {
    pub fn new() -> Self {
        Self {
            model_reporters: Vec::new(),
            agent_reporters: Vec::new(),
            steps: Vec::new(),
            model_vars: BTreeMap::new(),
            agent_records: Vec::new(),
        }
    }

    /// Register a model-level reporter; a reporter with the same name is replaced
    pub fn add_model_reporter<F>(&mut self, name: impl Into<String>, reporter: F)
    where
        F: Fn(&S) -> MetricValue + Send + Sync + 'static,
    {
        let name = name.into();
        self.model_reporters.retain(|(existing, _)| *existing != name);
        self.model_vars.entry(name.clone()).or_default();
        self.model_reporters.push((name, Box::new(reporter)));
    }

    /// Register an agent-level reporter; a reporter with the same name is replaced
    pub fn add_agent_reporter<F>(&mut self, name: impl Into<String>, reporter: F)
    where
        F: Fn(&dyn Agent) -> MetricValue + Send + Sync + 'static,
    {
        let name = name.into();
        self.agent_reporters.retain(|(existing, _)| *existing != name);
        self.agent_reporters.push((name, Box::new(reporter)));
    }

    pub fn with_model_reporter<F>(mut self, name: impl Into<String>, reporter: F) -> Self
    where
        F: Fn(&S) -> MetricValue + Send + Sync + 'static,
    {
        self.add_model_reporter(name, reporter);
        self
    }

    pub fn reporter_names(&self) -> Vec<&str> {
        self.model_reporters.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Evaluate every reporter against `state` and `agents`
    pub fn snapshot<'a>(
        &self,
        step: u64,
        state: &S,
        agents: impl IntoIterator<Item = &'a dyn Agent>,
    ) -> Snapshot {
        let model = self
            .model_reporters
            .iter()
            .map(|(name, reporter)| (name.clone(), reporter(state)))
            .collect();

        let mut records = Vec::new();
        if !self.agent_reporters.is_empty() {
            for agent in agents {
                for (name, reporter) in &self.agent_reporters {
                    records.push(AgentRecord {
                        step,
                        agent_id: agent.id(),
                        name: name.clone(),
                        value: reporter(agent),
                    });
                }
            }
        }

        Snapshot {
            step,
            model,
            agents: records,
        }
    }

    /// Append a snapshot to the log
    pub fn record(&mut self, snapshot: Snapshot) {
        self.steps.push(snapshot.step);
        for (name, value) in snapshot.model {
            self.model_vars.entry(name).or_default().push(value);
        }
        self.agent_records.extend(snapshot.agents);
    }

    /// Number of recorded steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[u64] {
        &self.steps
    }

    pub fn model_series(&self, name: &str) -> Option<&[MetricValue]> {
        self.model_vars.get(name).map(Vec::as_slice)
    }

    pub fn model_vars(&self) -> &BTreeMap<String, Vec<MetricValue>> {
        &self.model_vars
    }

    pub fn agent_records(&self) -> &[AgentRecord] {
        &self.agent_records
    }

    /// Most recent value of a model reporter
    pub fn latest(&self, name: &str) -> Option<MetricValue> {
        self.model_vars.get(name).and_then(|series| series.last().copied())
    }

    pub fn table(&self) -> MetricsTable {
        MetricsTable {
            steps: self.steps.clone(),
            model_vars: self.model_vars.clone(),
            agent_records: self.agent_records.clone(),
        }
    }
}

impl<S> Default for DataCollector<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for DataCollector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataCollector")
            .field("model_reporters", &self.reporter_names())
            .field("agent_reporters", &self.agent_reporters.len())
            .field("steps", &self.steps.len())
            .finish()
    }
}
