//! The discrete-planner agent.

use std::collections::VecDeque;

use mas_core::{AgentId, SiteId};
use mas_plan::{Plan, PlanHost};
use mas_space::SpaceGrid;

/// How many recent cells a grid agent remembers.
const TRAIL_LEN: usize = 6;

/// An agent of the cooperative discrete regime.
///
/// Owns its position, goal, and the plan the planner installed for it. All
/// planning (and plan abortion by the conflict protocol) goes through the
/// manager; the agent itself only consumes the plan.
pub struct GridAgent {
    pub id: AgentId,
    pub cur_pos: SiteId,
    pub goal: SiteId,
    pub plan: Plan,
    pub trail: VecDeque<SiteId>,
    pub goals_reached: u32,
    pub goal_birth_time: f64,
    /// Heading shown for this agent, taken from its next non-wait step.
    pub travel_angle: f64,
}

impl GridAgent {
    /// A bare agent; the manager assigns its start and goal (and reserves
    /// the start) during trial reset.
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            cur_pos: SiteId::default(),
            goal: SiteId::default(),
            plan: Plan::new(),
            trail: VecDeque::with_capacity(TRAIL_LEN),
            goals_reached: 0,
            goal_birth_time: 0.0,
            travel_angle: 0.0,
        }
    }

    /// Is the agent standing on its goal?
    #[inline]
    pub fn at_goal(&self) -> bool {
        self.cur_pos == self.goal
    }

    /// Goal-reached bookkeeping: count it, adopt the new goal, stamp its
    /// birth time.
    pub fn goal_reached(&mut self, new_goal: SiteId, now: f64) {
        self.goals_reached += 1;
        self.goal = new_goal;
        self.goal_birth_time = now;
    }

    /// Consume the next plan step, if any, honoring the boundary rule of
    /// the arena (wrap when periodic, stay put when a step would land
    /// off-grid).
    pub fn update_motion(&mut self, grid: &SpaceGrid) {
        if let Some(step) = self.plan.pop_next() {
            self.cur_pos = grid.apply_step(self.cur_pos, step);
        }
        self.update_trail();
    }

    /// Face the direction of the next non-wait step. Purely cosmetic — the
    /// heading is logged but never steers anything.
    pub fn update_travel_angle(&mut self) {
        if let Some(step) = self.plan.upcoming().find(|s| !s.is_wait()) {
            self.travel_angle = step.angle();
        }
    }

    fn update_trail(&mut self) {
        self.trail.push_back(self.cur_pos);
        if self.trail.len() > TRAIL_LEN {
            self.trail.pop_front();
        }
    }

    /// Clear per-trial state. Positions and goals are re-rolled by the
    /// manager, which also owns the reservation table.
    pub fn reset(&mut self) {
        self.plan.clear();
        self.trail.clear();
        self.goals_reached = 0;
        self.goal_birth_time = 0.0;
        self.travel_angle = 0.0;
    }
}

// ── PlanHost over agent storage ───────────────────────────────────────────────

/// The conflict protocol reaches blockers through the manager's agent slice;
/// agent ids index it directly.
impl PlanHost for [GridAgent] {
    fn position_of(&self, agent: AgentId) -> SiteId {
        self[agent.index()].cur_pos
    }

    fn goal_of(&self, agent: AgentId) -> SiteId {
        self[agent.index()].goal
    }

    fn take_plan(&mut self, agent: AgentId) -> Plan {
        std::mem::take(&mut self[agent.index()].plan)
    }

    fn install_plan(&mut self, agent: AgentId, plan: Plan) {
        self[agent.index()].plan = plan;
    }
}
