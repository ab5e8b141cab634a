//! The cooperative discrete regime: plan pass, motion pass, trials.

use std::time::Instant;

use mas_agent::GridAgent;
use mas_core::{AgentId, SimParams, SimRng, SiteId};
use mas_plan::{AstarPlanner, ReservationTable};
use mas_space::SpaceGrid;

use crate::observer::{at_sample_boundary, PlannerSample, SimObserver};
use crate::{SimError, SimResult};

/// Manager of the cooperative discrete planner regime.
///
/// Holds the only shared mutable structure of the regime — the reservation
/// table — and drives the strictly ordered per-tick passes:
///
/// 1. plan pass (goal bookkeeping, plan acquisition, conflict resolution),
/// 2. motion pass,
/// 3. clock advance (1.0, or 0.5 on the half-unit time grid),
/// 4. travel-angle pass (cosmetic).
///
/// Reservations written while agent `i` plans are visible to every agent
/// after it in the same tick.
pub struct PlannerSim {
    pub params: SimParams,
    pub grid: SpaceGrid,
    pub table: ReservationTable,
    pub planner: AstarPlanner,
    pub agents: Vec<GridAgent>,
    pub sim_time: f64,
    rng: SimRng,
}

impl PlannerSim {
    pub fn new(params: SimParams) -> SimResult<Self> {
        let params = params.validated();

        let cells = params.cells_per_side * params.cells_per_side;
        if params.num_agents > cells {
            return Err(SimError::Config(format!(
                "{} agents cannot fit a {} cell grid",
                params.num_agents, cells
            )));
        }

        let grid = SpaceGrid::new(
            params.r_upper,
            params.cells_per_side,
            params.periodic,
            params.diags,
        );
        let agents = (0..params.num_agents)
            .map(|i| GridAgent::new(AgentId(i as u32)))
            .collect();

        let mut sim = Self {
            grid,
            table: ReservationTable::new(),
            planner: AstarPlanner::new(params.diags_take_longer, params.time_steps),
            agents,
            sim_time: 0.0,
            rng: SimRng::new(params.seed),
            params,
        };
        sim.reset();
        Ok(sim)
    }

    /// The simulated time one tick advances.
    #[inline]
    pub fn time_step(&self) -> f64 {
        if self.params.diags_take_longer { 0.5 } else { 1.0 }
    }

    // ── Per-tick update ───────────────────────────────────────────────────

    pub fn update(&mut self) {
        // plan pass, in id order
        for i in 0..self.agents.len() {
            if self.agents[i].at_goal() {
                let goal = self.fresh_goal(self.agents[i].cur_pos);
                self.agents[i].goal_reached(goal, self.sim_time);
            }
            if self.agents[i].plan.is_empty() {
                self.planner.acquire_plan(
                    &self.grid,
                    &mut self.table,
                    self.agents.as_mut_slice(),
                    AgentId(i as u32),
                    self.sim_time,
                    self.params.sensing_range,
                    self.params.sensing_angle,
                );
            }
        }

        // motion pass
        for agent in &mut self.agents {
            agent.update_motion(&self.grid);
        }

        self.sim_time += self.time_step();

        // cosmetic pass for agents that still hold a plan
        for agent in &mut self.agents {
            agent.update_travel_angle();
        }
    }

    /// A random goal cell different from `not` — standing start on the new
    /// goal would count it as instantly reached.
    fn fresh_goal(&mut self, not: SiteId) -> SiteId {
        loop {
            let goal = self.grid.random_site(&mut self.rng);
            if goal != not {
                return goal;
            }
        }
    }

    // ── Trials ────────────────────────────────────────────────────────────

    /// Zero the clock, drop every reservation, re-roll all starts and goals,
    /// and reserve each agent's start cell at time zero.
    pub fn reset(&mut self) {
        self.sim_time = 0.0;
        self.table.clear();

        for agent in &mut self.agents {
            agent.reset();
        }
        for i in 0..self.agents.len() {
            let start = loop {
                let s = self.grid.random_site(&mut self.rng);
                if !self.table.reserved(0.0, s) {
                    break s;
                }
            };
            let id = AgentId(i as u32);
            self.agents[i].cur_pos = start;
            self.table.make_reservation(0.0, start, id);
            self.agents[i].goal = self.fresh_goal(start);
        }
    }

    /// Run one trial of `length` simulated time units, sampling at the
    /// configured interval plus once at the end.
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
        observer.on_planner_sample(&PlannerSample {
            trial,
            sim_time: self.sim_time,
            params: &self.params,
            agents: &self.agents,
            stats: self.planner.stats,
            runtime_ms: started.elapsed().as_millis(),
        });
    }
}
