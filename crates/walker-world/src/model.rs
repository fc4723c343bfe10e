//! The random walk model: grid, schedule, metrics and random source.

use crate::agent::{Agent, RandomWalker};
use crate::datacollector::DataCollector;
use crate::grid::MultiGrid;
use crate::schedule::Scheduler;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, trace};
use walker_core::{AgentId, Error, ModelConfig, Position, Result};

/// Model reporter capturing the number of scheduled agents
pub const AGENT_COUNT: &str = "Agent Count";

pub struct Model {
    config: ModelConfig,
    seed: u64,
    grid: MultiGrid,
    schedule: Scheduler,
    agents: BTreeMap<AgentId, Box<dyn Agent>>,
    datacollector: DataCollector<Model>,
    rng: ChaCha8Rng,
    running: bool,
}

impl Model {
    /// Create `num_agents` walkers, each on a uniformly random cell
    #[instrument(skip(config), fields(num_agents = config.num_agents, width = config.width, height = config.height))]
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = MultiGrid::new(config.width, config.height, config.torus)?;
        let schedule = Scheduler::new(config.activation);
        let datacollector =
            DataCollector::new().with_model_reporter(AGENT_COUNT, |m: &Model| {
                m.schedule.agent_count().into()
            });

        let mut model = Self {
            config,
            seed,
            grid,
            schedule,
            agents: BTreeMap::new(),
            datacollector,
            rng,
            running: true,
        };

        for i in 0..model.config.num_agents {
            model.spawn_walker(AgentId(i as u64))?;
        }

        info!(
            seed = model.seed,
            torus = model.config.torus,
            activation = ?model.config.activation,
            "Model initialized with {} agents",
            model.agents.len()
        );

        Ok(model)
    }

    fn spawn_walker(&mut self, id: AgentId) -> Result<()> {
        self.schedule.add(id);
        let x = self.rng.gen_range(0..self.grid.width);
        let y = self.rng.gen_range(0..self.grid.height);
        let pos = Position::new(x, y);

        self.grid.place_agent(id, pos)?;
        self.agents.insert(id, Box::new(RandomWalker::new(id, pos)));
        trace!(agent_id = %id, x, y, "Placed agent");
        Ok(())
    }

    /// Record the metric snapshot, then activate every agent once
    pub fn step(&mut self) -> Result<()> {
        let step = self.schedule.steps();

        let snapshot = {
            let state: &Model = self;
            state.datacollector.snapshot(step, state, state.agents())
        };
        self.datacollector.record(snapshot);

        for id in self.schedule.next_round(&mut self.rng) {
            self.activate(id)?;
        }

        debug!(step, agents = self.agents.len(), "Step complete");
        Ok(())
    }

    fn activate(&mut self, id: AgentId) -> Result<()> {
        let agent = self.agents.get_mut(&id).ok_or(Error::UnknownAgent(id))?;
        let from = agent.position();
        let next = agent.next_position(&self.grid, &mut self.rng);
        let landed = self.grid.move_agent(id, next)?;
        agent.set_position(landed);

        trace!(
            agent_id = %id,
            from_x = from.x,
            from_y = from.y,
            to_x = landed.x,
            to_y = landed.y,
            "Agent moved"
        );
        Ok(())
    }

    /// Step up to `steps` times, stopping early once the model stops running
    pub fn run(&mut self, steps: u64) -> Result<u64> {
        let mut completed = 0;
        while completed < steps && self.running {
            self.step()?;
            completed += 1;
        }
        Ok(completed)
    }

    pub fn stop(&mut self) {
        if self.running {
            info!(step = self.steps(), "Model stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Completed steps
    pub fn steps(&self) -> u64 {
        self.schedule.steps()
    }

    /// Seed the random source was built from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn grid(&self) -> &MultiGrid {
        &self.grid
    }

    pub fn schedule(&self) -> &Scheduler {
        &self.schedule
    }

    pub fn datacollector(&self) -> &DataCollector<Model> {
        &self.datacollector
    }

    pub fn datacollector_mut(&mut self) -> &mut DataCollector<Model> {
        &mut self.datacollector
    }

    pub fn agent(&self, id: AgentId) -> Option<&dyn Agent> {
        self.agents.get(&id).map(|a| a.as_ref() as &dyn Agent)
    }

    pub fn agents(&self) -> impl Iterator<Item = &dyn Agent> + '_ {
        self.agents.values().map(|a| a.as_ref() as &dyn Agent)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Agent positions ordered by id
    pub fn positions(&self) -> Vec<(AgentId, Position)> {
        self.agents.iter().map(|(id, a)| (*id, a.position())).collect()
    }
}
