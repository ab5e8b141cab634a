//! The local reactive agent: continuous motion toward random goals, stopping
//! whenever anything is sensed in the forward cone, optionally perturbing
//! its heading with configured noise.

use std::collections::VecDeque;

use mas_core::{normalize, AgentId, AgentRng, Pose, SimParams};
use mas_space::{NeighborIndex, SensorHit};

/// How many recent poses a reactive agent remembers.
const TRAIL_LEN: usize = 40;

// ── NoisePolicy ───────────────────────────────────────────────────────────────

/// How a reactive agent picks its travel angle.
///
/// The policy set is closed (it is what the underlying study compares), so a
/// tagged variant on one agent type is preferred over a trait here; the two
/// noisy policies share all their state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoisePolicy {
    /// Head straight for the goal, re-aimed every step.
    Direct,
    /// Redraw a noisy heading at the start of each run phase and hold it.
    ConstNoise,
    /// Like `ConstNoise`, but the noisy heading is applied only with
    /// probability `noise_prob` — and, with `conditional_noise`, only while
    /// the agent is blocked.
    GatedNoise,
}

// ── ReactiveAgent ─────────────────────────────────────────────────────────────

/// An agent of the local reactive regime.
pub struct ReactiveAgent {
    pub id: AgentId,
    pub pose: Pose,
    pub goal: Pose,
    pub policy: NoisePolicy,

    pub fwd_speed: f64,
    pub turn_speed: f64,
    pub travel_angle: f64,
    /// Something is in the vision cone; the agent holds still.
    pub stop: bool,
    pub sensed: Vec<SensorHit>,

    pub goals_reached: u32,
    pub goal_birth_time: f64,
    pub trail: VecDeque<Pose>,

    // run-phase bookkeeping for the noisy policies
    runsteps: u32,
    phase_count: u32,

    rng: AgentRng,
}

impl ReactiveAgent {
    pub fn new(id: AgentId, policy: NoisePolicy, params: &SimParams) -> Self {
        let mut agent = Self {
            id,
            pose: Pose::default(),
            goal: Pose::default(),
            policy,
            fwd_speed: 0.0,
            turn_speed: 0.0,
            travel_angle: 0.0,
            stop: false,
            sensed: Vec::new(),
            goals_reached: 0,
            goal_birth_time: 0.0,
            trail: VecDeque::with_capacity(TRAIL_LEN),
            runsteps: params.avg_runsteps,
            phase_count: 0,
            rng: AgentRng::new(params.seed, id),
        };
        agent.reset(params);
        agent
    }

    /// Re-roll start and goal, zero speeds and counters, for a new trial.
    pub fn reset(&mut self, params: &SimParams) {
        self.pose = params.random_pose(&mut self.rng);
        self.goal = params.random_pose(&mut self.rng);
        self.fwd_speed = 0.0;
        self.turn_speed = 0.0;
        self.travel_angle = 0.0;
        self.stop = false;
        self.sensed.clear();
        self.goals_reached = 0;
        self.goal_birth_time = 0.0;
        self.trail.clear();
        self.phase_count = 0;
    }

    // ── Per-step passes ───────────────────────────────────────────────────

    /// Sensing pass: goal acceptance, then one cone query against the
    /// start-of-step index snapshot. Writes only this agent's fields.
    pub fn sensing_update(&mut self, index: &NeighborIndex, params: &SimParams, now: f64) {
        if self.pose.distance(&self.goal) < params.goal_tolerance {
            self.goal_reached(params, now);
        }

        self.sensed = index.sense(self.id, self.pose, params);
        self.stop = !self.sensed.is_empty();
    }

    /// Decision pass: choose the travel angle and speeds.
    pub fn decision_update(&mut self, params: &SimParams) {
        match self.policy {
            NoisePolicy::Direct => {
                self.travel_angle = self.angle_to_goal(params);
                self.steer(params);
            }
            NoisePolicy::ConstNoise | NoisePolicy::GatedNoise => {
                if self.phase_count >= self.runsteps {
                    self.phase_count = 0;
                }
                if self.phase_count == 0 {
                    self.begin_phase(params);
                }
                self.steer(params);
                self.phase_count += 1;
            }
        }
    }

    /// Motion pass: integrate speeds over `dt` in the agent's own frame,
    /// then wrap into the arena if it is periodic.
    pub fn position_update(&mut self, params: &SimParams, now: f64) {
        let dp = Pose::new(
            self.fwd_speed * params.dt,
            0.0,
            0.0,
            normalize(self.turn_speed * params.dt),
        );
        self.pose = self.pose + dp;

        if params.periodic {
            let s = 2.0 * params.r_upper;
            let out = self.pose.x < -s / 2.0
                || self.pose.x > s / 2.0
                || self.pose.y < -s / 2.0
                || self.pose.y > s / 2.0;
            if out {
                let x = (self.pose.x + s / 2.0).rem_euclid(s) - s / 2.0;
                let y = (self.pose.y + s / 2.0).rem_euclid(s) - s / 2.0;
                self.pose.x = x;
                self.pose.y = y;
            }
        }

        // sample the trail on half-second boundaries
        if (now % 0.5).abs() <= 1e-4 {
            self.update_trail();
        }
    }

    // ── Steering internals ────────────────────────────────────────────────

    /// Global angle straight to the goal, through the nearest periodic image
    /// when the arena wraps.
    pub fn angle_to_goal(&self, params: &SimParams) -> f64 {
        let goal = if params.periodic {
            mas_core::nearest_periodic(self.pose, self.goal, params.r_upper)
        } else {
            self.goal
        };
        (goal.y - self.pose.y).atan2(goal.x - self.pose.x)
    }

    /// Start a run phase: re-roll its length and draw the travel angle for
    /// the active policy.
    fn begin_phase(&mut self, params: &SimParams) {
        self.runsteps = if params.randomize_runsteps {
            let avg = params.avg_runsteps as f64;
            let lower = (avg / 2.0).round() as i64;
            let upper = (3.0 * avg / 2.0).round() as i64;
            self.rng.unif_int(lower, upper) as u32
        } else {
            params.avg_runsteps
        };

        self.travel_angle = match self.policy {
            NoisePolicy::Direct => self.angle_to_goal(params),
            NoisePolicy::ConstNoise => self.noisy_angle(params),
            NoisePolicy::GatedNoise => {
                let straight = self.angle_to_goal(params);
                let noisy = self.noisy_angle(params);
                // with conditional noise the perturbation only applies while
                // blocked; either way it fires with probability noise_prob
                if (!params.conditional_noise || self.stop)
                    && self.rng.unif(0.0, 1.0) <= params.noise_prob
                {
                    noisy
                } else {
                    straight
                }
            }
        };

        // instantaneous turning snaps the heading at phase start
        if params.turnspeed == -1.0 {
            self.pose.a = self.travel_angle;
            self.turn_speed = 0.0;
        }
    }

    /// Goal angle plus the configured perturbation: uniform over `(-π, π]`
    /// when `anglenoise` is −1, else Normal(`anglebias`, `anglenoise`).
    fn noisy_angle(&mut self, params: &SimParams) -> f64 {
        let eta = if params.anglenoise == -1.0 {
            self.rng.unif(-std::f64::consts::PI, std::f64::consts::PI)
        } else {
            self.rng.normal(params.anglebias, params.anglenoise)
        };
        self.angle_to_goal(params) + eta
    }

    /// Apply the speed and turn rules shared by every policy.
    fn steer(&mut self, params: &SimParams) {
        self.fwd_speed = if self.stop { 0.0 } else { params.cruisespeed };

        if params.turnspeed == -1.0 {
            if self.policy == NoisePolicy::Direct {
                self.pose.a = self.travel_angle;
            }
            self.turn_speed = 0.0;
        } else {
            let a_error = normalize(self.travel_angle - self.pose.a);
            self.turn_speed = params.turnspeed * a_error;
        }
    }

    // ── Goal lifecycle ────────────────────────────────────────────────────

    fn goal_reached(&mut self, params: &SimParams, now: f64) {
        self.goal = params.random_pose(&mut self.rng);
        self.goals_reached += 1;
        self.goal_birth_time = now;
        self.phase_count = 0;
    }

    fn update_trail(&mut self) {
        self.trail.push_back(self.pose);
        if self.trail.len() > TRAIL_LEN {
            self.trail.pop_front();
        }
    }
}
