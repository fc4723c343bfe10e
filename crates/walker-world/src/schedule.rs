//! Activation scheduling.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use walker_core::{ActivationOrder, AgentId};

/// Tracks registered agents and hands out one activation order per round
#[derive(Debug, Clone)]
pub struct Scheduler {
    order: ActivationOrder,
    agents: Vec<AgentId>,
    steps: u64,
}

impl Scheduler {
    pub fn new(order: ActivationOrder) -> Self {
        Self {
            order,
            agents: Vec::new(),
            steps: 0,
        }
    }

    /// Register an agent; registering twice is a no-op
    pub fn add(&mut self, id: AgentId) {
        if !self.agents.contains(&id) {
            self.agents.push(id);
        }
    }

    pub fn remove(&mut self, id: AgentId) -> bool {
        let before = self.agents.len();
        self.agents.retain(|other| *other != id);
        self.agents.len() != before
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Completed rounds
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn order(&self) -> ActivationOrder {
        self.order
    }

    pub fn agents(&self) -> &[AgentId] {
        &self.agents
    }

    /// Activation order for the next round; advances the round counter
    pub fn next_round(&mut self, rng: &mut ChaCha8Rng) -> Vec<AgentId> {
        let mut round = self.agents.clone();
        if self.order == ActivationOrder::Shuffled {
            round.shuffle(rng);
        }
        self.steps += 1;
        round
    }
}
