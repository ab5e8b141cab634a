//! Conflict resolution: the plan-failure wait fallback and plan abortion.
//!
//! When a search exhausts the horizon, the requester tries to at least
//! reserve a wait in place. If another agent holds that slot, the holder's
//! plan is aborted (all of its future reservations are released), the wait
//! is reserved for the requester, and the holder replans immediately —
//! bounded to one level of recursion so two mutually blocked agents cannot
//! chase each other forever.

use mas_core::{AgentId, SiteId};
use mas_space::SpaceGrid;

use crate::plan::Plan;
use crate::planner::{AstarPlanner, SearchOutcome};
use crate::reservation::ReservationTable;

/// How many nested blocker replans the fallback may trigger. One level is
/// sufficient for the provided arenas; deeper chains resolve over the next
/// ticks as the aborted agents replan on their own turns.
pub const REPLAN_DEPTH_LIMIT: usize = 1;

// ── PlanHost ──────────────────────────────────────────────────────────────────

/// The planner's window into the agents it plans for.
///
/// The conflict protocol must read a blocker's state and swap its plan, but
/// the planner holds only agent ids; the simulation manager implements this
/// trait over its agent storage, which keeps ownership acyclic.
pub trait PlanHost {
    fn position_of(&self, agent: AgentId) -> SiteId;
    fn goal_of(&self, agent: AgentId) -> SiteId;
    /// Remove and return the agent's current plan, leaving it empty.
    fn take_plan(&mut self, agent: AgentId) -> Plan;
    fn install_plan(&mut self, agent: AgentId, plan: Plan);
}

// ── Protocol ──────────────────────────────────────────────────────────────────

impl AstarPlanner {
    /// Plan for `agent` and install the result, engaging the wait/abort
    /// fallback if the search fails.
    #[allow(clippy::too_many_arguments)]
    pub fn acquire_plan(
        &mut self,
        grid: &SpaceGrid,
        table: &mut ReservationTable,
        host: &mut dyn PlanHost,
        agent: AgentId,
        now: f64,
        sensing_range: f64,
        sensing_angle: f64,
    ) {
        self.plan_with_depth(grid, table, host, agent, now, sensing_range, sensing_angle, 0);
    }

    #[allow(clippy::too_many_arguments)]
    fn plan_with_depth(
        &mut self,
        grid: &SpaceGrid,
        table: &mut ReservationTable,
        host: &mut dyn PlanHost,
        agent: AgentId,
        now: f64,
        sensing_range: f64,
        sensing_angle: f64,
        depth: usize,
    ) {
        let start = host.position_of(agent);
        let goal = host.goal_of(agent);

        match self.search(grid, table, now, start, goal, sensing_range, sensing_angle, agent) {
            SearchOutcome::Found(plan) => host.install_plan(agent, plan),

            SearchOutcome::Exhausted => {
                // Reserve a wait in place for every half-time increment the
                // active time model needs to cover one full step.
                let incs: &[f64] = if self.diags_take_longer { &[0.5, 1.0] } else { &[1.0] };
                let mut plan = Plan::new();

                for &dt in incs {
                    match table.owner(now + dt, start) {
                        None => {
                            table.make_reservation(now + dt, start, agent);
                            plan.push(SiteId::new(0, 0));
                        }
                        // the slot is already ours (e.g. from an earlier
                        // fallback): wait without re-reserving
                        Some(holder) if holder == agent => {
                            plan.push(SiteId::new(0, 0));
                        }
                        Some(blocker) => {
                            tracing::debug!(%agent, %blocker, t = now + dt, "evicting blocker from wait slot");
                            self.abort_plan(grid, table, host, blocker, now);
                            table.make_reservation(now + dt, start, agent);
                            plan.push(SiteId::new(0, 0));

                            if depth < REPLAN_DEPTH_LIMIT {
                                self.stats.replans += 1;
                                self.plan_with_depth(
                                    grid, table, host, blocker, now,
                                    sensing_range, sensing_angle, depth + 1,
                                );
                            } else {
                                tracing::warn!(
                                    %agent, %blocker,
                                    "replan depth limit reached; blocker left to replan on its own turn"
                                );
                            }
                        }
                    }
                }

                host.install_plan(agent, plan);
            }
        }
    }

    /// Release every future reservation held through `agent`'s plan and
    /// clear the plan.
    ///
    /// The walk visits the plan's cell-times in execution order, including
    /// the wait intermediates of the half-unit time model. Each entry must
    /// be owned by `agent`; mismatches are diagnosed and left in place. The
    /// agent's current-time reservation is not touched — it still stands on
    /// that cell.
    pub fn abort_plan(
        &mut self,
        grid: &SpaceGrid,
        table: &mut ReservationTable,
        host: &mut dyn PlanHost,
        agent: AgentId,
        now: f64,
    ) {
        self.stats.aborts += 1;

        let plan = host.take_plan(agent);
        let dt = if self.diags_take_longer { 0.5 } else { 1.0 };
        let mut t = now;
        let mut loc = host.position_of(agent);

        for step in plan.upcoming() {
            loc = grid.apply_step(loc, step);
            t += dt;
            match table.owner(t, loc) {
                Some(holder) if holder == agent => table.erase(t, loc),
                Some(holder) => {
                    tracing::warn!(t, %loc, %holder, %agent, "abort found a reservation owned by someone else");
                }
                None => {
                    tracing::warn!(t, %loc, %agent, "abort expected a reservation that was never made");
                }
            }
        }
    }
}
