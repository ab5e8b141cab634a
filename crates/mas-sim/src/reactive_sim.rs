//! The local reactive regime: index refresh, sensing, decision, and motion
//! passes.

use std::time::Instant;

use mas_agent::{NoisePolicy, ReactiveAgent};
use mas_core::SimParams;
use mas_space::{IndexEntry, NeighborIndex};

use crate::observer::{at_sample_boundary, ReactiveSample, SimObserver};

/// Manager of the local reactive controller regime.
pub struct ReactiveSim {
    pub params: SimParams,
    pub agents: Vec<ReactiveAgent>,
    pub index: NeighborIndex,
    pub sim_time: f64,
    /// Sensing queries issued so far (cumulative across trials).
    pub sensing_calls: u64,
    /// Set once everyone stands still, so the standstill is reported once.
    all_stopped: bool,
}

impl ReactiveSim {
    pub fn new(params: SimParams, policy: NoisePolicy) -> Self {
        let params = params.validated();
        let agents = (0..params.num_agents)
            .map(|i| ReactiveAgent::new(mas_core::AgentId(i as u32), policy, &params))
            .collect();

        let mut sim = Self {
            index: NeighborIndex::from_params(&params),
            agents,
            sim_time: 0.0,
            sensing_calls: 0,
            all_stopped: false,
            params,
        };
        sim.refresh_index();
        sim
    }

    // ── Per-step update ───────────────────────────────────────────────────

    pub fn update(&mut self) {
        // Skip the re-index while every agent stood still last step — no
        // position changed, so the snapshot is already current. In-place
        // rotations can unblock the system again, hence report, not stop.
        let any_moving = self.agents.iter().any(|a| a.fwd_speed != 0.0);
        if any_moving || self.sim_time == 0.0 {
            self.all_stopped = false;
            self.refresh_index();
        } else if !self.all_stopped {
            tracing::debug!(sim_time = self.sim_time, "every agent is blocked");
            self.all_stopped = true;
        }

        self.sensing_pass();
        self.sensing_calls += self.agents.len() as u64;

        for agent in &mut self.agents {
            agent.decision_update(&self.params);
        }
        for agent in &mut self.agents {
            agent.position_update(&self.params, self.sim_time);
        }

        self.sim_time += self.params.dt;
    }

    #[cfg(not(feature = "parallel"))]
    fn sensing_pass(&mut self) {
        for agent in &mut self.agents {
            agent.sensing_update(&self.index, &self.params, self.sim_time);
        }
    }

    #[cfg(feature = "parallel")]
    fn sensing_pass(&mut self) {
        use rayon::prelude::*;

        let index = &self.index;
        let params = &self.params;
        let now = self.sim_time;
        self.agents
            .par_iter_mut()
            .for_each(|agent| agent.sensing_update(index, params, now));
    }

    fn refresh_index(&mut self) {
        let entries: Vec<IndexEntry> = self
            .agents
            .iter()
            .map(|a| IndexEntry { id: a.id, pose: a.pose })
            .collect();
        self.index.refresh(&entries);
    }

    // ── Trials ────────────────────────────────────────────────────────────

    pub fn reset(&mut self) {
        // the clock is zeroed first: agents stamp it as goal_birth_time
        self.sim_time = 0.0;
        self.all_stopped = false;
        let params = self.params.clone();
        for agent in &mut self.agents {
            agent.reset(&params);
        }
        // freshly rolled poses are out of order; rebuild the index
        self.refresh_index();
    }

    pub fn run_trial(&mut self, length: f64, trial: u32, observer: &mut dyn SimObserver) {
        self.reset();
        let started = Instant::now();

        while self.sim_time < length {
            if at_sample_boundary(self.sim_time, self.params.save_data_interval) {
                self.emit_sample(trial, started, observer);
            }
            self.update();
        }
        self.emit_sample(trial, started, observer);
    }

    pub fn run_trials(&mut self, trials: u32, length: f64, observer: &mut dyn SimObserver) {
        for trial in 0..trials {
            self.run_trial(length, trial, observer);
        }
        observer.on_run_end();
    }

    fn emit_sample(&self, trial: u32, started: Instant, observer: &mut dyn SimObserver) {
        observer.on_reactive_sample(&ReactiveSample {
            trial,
            sim_time: self.sim_time,
            params: &self.params,
            agents: &self.agents,
            sensing_calls: self.sensing_calls,
            runtime_ms: started.elapsed().as_millis(),
        });
    }
}
