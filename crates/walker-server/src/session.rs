//! The model instance shared by every connected browser.

use crate::protocol::{ClientMessage, ServerMessage};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use walker_core::{ModelConfig, Result};
use walker_world::{CanvasGrid, GridFrame, MetricsTable, Model, AGENT_COUNT};

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub step: u64,
    pub running: bool,
    pub seed: u64,
    pub agent_count: usize,
}

pub struct Session {
    params: RwLock<ModelConfig>,
    model: Mutex<Model>,
    canvas: CanvasGrid,
}

impl Session {
    pub fn new(params: ModelConfig, canvas: CanvasGrid) -> Result<Self> {
        let model = Model::new(params.clone())?;
        Ok(Self {
            params: RwLock::new(params),
            model: Mutex::new(model),
            canvas,
        })
    }

    pub fn params(&self) -> ModelConfig {
        self.params.read().clone()
    }

    /// Update a parameter used by the next reset
    #[instrument(skip(self, value))]
    pub fn submit_param(&self, name: &str, value: &serde_json::Value) -> Result<ModelConfig> {
        let mut params = self.params.write();
        params.set_param(name, value)?;
        debug!(%value, "Parameter updated");
        Ok(params.clone())
    }

    /// Rebuild the model from the current parameters
    #[instrument(skip(self))]
    pub fn reset(&self) -> Result<(u64, GridFrame)> {
        let params = self.params();
        let model = Model::new(params)?;
        let mut current = self.model.lock();
        *current = model;
        info!(seed = current.seed(), "Model reset");
        Ok((current.steps(), self.canvas.render(&current)))
    }

    /// Advance one step; `None` once the model has stopped running
    pub fn step(&self) -> Result<Option<(u64, GridFrame)>> {
        let mut model = self.model.lock();
        if !model.is_running() {
            return Ok(None);
        }

        model.step()?;

        if let Some(count) = model.datacollector().latest(AGENT_COUNT) {
            crate::record_gauge!("agent_count", count.as_f64(), step => model.steps());
        }
        Ok(Some((model.steps(), self.canvas.render(&model))))
    }

    /// Clear the running flag; later steps are refused until a reset
    pub fn stop(&self) {
        self.model.lock().stop();
    }

    pub fn frame(&self) -> (u64, GridFrame) {
        let model = self.model.lock();
        (model.steps(), self.canvas.render(&model))
    }

    pub fn metrics(&self) -> MetricsTable {
        self.model.lock().datacollector().table()
    }

    pub fn status(&self) -> SessionStatus {
        let model = self.model.lock();
        SessionStatus {
            step: model.steps(),
            running: model.is_running(),
            seed: model.seed(),
            agent_count: model.agent_count(),
        }
    }

    /// Answer one browser message
    ///
    /// Every `get_step` advances one step regardless of the step it names.
    pub fn handle(&self, message: ClientMessage) -> ServerMessage {
        let reply = match message {
            ClientMessage::GetParams => Ok(ServerMessage::ModelParams {
                params: self.params(),
            }),
            ClientMessage::Reset => self
                .reset()
                .map(|(step, frame)| ServerMessage::VizState {
                    step,
                    data: vec![frame],
                }),
            ClientMessage::GetStep { step } => {
                debug!(requested_step = step, "Step requested");
                self.step().map(|stepped| match stepped {
                    Some((step, frame)) => ServerMessage::VizState {
                        step,
                        data: vec![frame],
                    },
                    None => ServerMessage::End,
                })
            }
            ClientMessage::SubmitParams { param, value } => self
                .submit_param(&param, &value)
                .map(|params| ServerMessage::ParamsUpdated { params }),
        };

        reply.unwrap_or_else(|e| {
            warn!("Request failed: {}", e);
            ServerMessage::Error {
                message: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use walker_core::CanvasConfig;
    use walker_world::agent_portrayal;

    fn session(seed: u64) -> Session {
        Session::new(
            ModelConfig::default().with_seed(seed),
            CanvasGrid::from_config(agent_portrayal, &CanvasConfig::default()),
        )
        .unwrap()
    }

    fn drawn(frame: &GridFrame) -> usize {
        frame.values().map(Vec::len).sum()
    }

    #[test]
    fn test_step_returns_frame() {
        let session = session(1);
        let (step, frame) = session.step().unwrap().unwrap();
        assert_eq!(step, 1);
        assert_eq!(drawn(&frame), 10);
        assert_eq!(session.status().step, 1);
    }

    #[test]
    fn test_get_step_advances_one_step_whatever_it_names() {
        let session = session(2);
        for (requested, expected) in [(99, 1), (0, 2), (2, 3)] {
            match session.handle(ClientMessage::GetStep { step: requested }) {
                ServerMessage::VizState { step, .. } => assert_eq!(step, expected),
                other => panic!("expected viz_state, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_stopped_session_ends() {
        let session = session(1);
        session.stop();
        assert!(session.step().unwrap().is_none());
        assert_eq!(
            session.handle(ClientMessage::GetStep { step: 1 }),
            ServerMessage::End
        );
    }

    #[test]
    fn test_reset_uses_submitted_params() {
        let session = session(2);
        session.step().unwrap();

        session.submit_param("num_agents", &json!(4)).unwrap();
        assert_eq!(session.status().agent_count, 10);

        let (step, frame) = session.reset().unwrap();
        assert_eq!(step, 0);
        assert_eq!(drawn(&frame), 4);
        assert_eq!(session.status().agent_count, 4);
        assert!(session.metrics().steps.is_empty());
    }

    #[test]
    fn test_seeded_reset_replays() {
        let session = session(99);
        let (_, first) = session.step().unwrap().unwrap();

        session.reset().unwrap();
        let (_, replay) = session.step().unwrap().unwrap();
        assert_eq!(first, replay);
    }

    #[test]
    fn test_handle_dispatch() {
        let session = session(3);

        match session.handle(ClientMessage::GetParams) {
            ServerMessage::ModelParams { params } => assert_eq!(params.num_agents, 10),
            other => panic!("unexpected reply: {:?}", other),
        }

        match session.handle(ClientMessage::GetStep { step: 1 }) {
            ServerMessage::VizState { step, data } => {
                assert_eq!(step, 1);
                assert_eq!(data.len(), 1);
            }
            other => panic!("unexpected reply: {:?}", other),
        }

        let reply = session.handle(ClientMessage::SubmitParams {
            param: "gravity".to_string(),
            value: json!(1),
        });
        assert!(matches!(reply, ServerMessage::Error { .. }));

        let reply = session.handle(ClientMessage::SubmitParams {
            param: "width".to_string(),
            value: json!(0),
        });
        assert!(matches!(reply, ServerMessage::Error { .. }));
        assert_eq!(session.params().width, 10);
    }

    #[test]
    fn test_metrics_track_agent_count() {
        let session = session(4);
        for _ in 0..3 {
            session.step().unwrap();
        }
        let metrics = session.metrics();
        assert_eq!(metrics.steps, vec![0, 1, 2]);
        assert_eq!(metrics.model_vars[AGENT_COUNT].len(), 3);
    }
}
