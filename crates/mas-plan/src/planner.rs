//! Forward A* search in `(x, y, t)` with reservation and visibility filters.
//!
//! # Time model
//!
//! With `diags_take_longer` unset, every step (including a wait) advances
//! time by 1. With it set, time is discretized at 0.5: axis steps and waits
//! take 1.0 and diagonal steps take 1.5, with the cell of origin reserved at
//! the intermediate half-steps.
//!
//! # Cost model
//!
//! Edge cost equals the distance heuristic, which charges 1 for waiting
//! (waiting must not be free) and `1.5` per diagonal — a rational stand-in
//! for √2 that stays on the half-unit time grid.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use rustc_hash::{FxHashMap, FxHashSet};

use mas_core::{in_vision_cone, nearest_periodic, AgentId, SiteId};
use mas_space::SpaceGrid;

use crate::plan::Plan;
use crate::reservation::{Reservation, ReservationTable};

// ── Stats ─────────────────────────────────────────────────────────────────────

/// Planner call counters, written to the trials file.
///
/// Counters accumulate for the lifetime of the planner (across trials).
#[derive(Copy, Clone, Debug, Default)]
pub struct PlannerStats {
    /// Calls to [`AstarPlanner::search`].
    pub search_calls: u64,
    /// Candidate-step validity checks (reservation plus visibility).
    pub step_checks: u64,
    /// Blocker replans triggered by the conflict protocol.
    pub replans: u64,
    /// Plan aborts performed by the conflict protocol.
    pub aborts: u64,
}

// ── Search bookkeeping ────────────────────────────────────────────────────────

/// Best known way to reach a `(t, x, y)` state.
#[derive(Copy, Clone, Debug)]
struct Node {
    parent: Option<SiteId>,
    g: f64,
}

/// Open-list entry. Ordered so the binary heap pops the lowest `f` first,
/// preferring deeper (larger `t`) states on ties, then the lexicographically
/// smallest cell.
#[derive(Copy, Clone, Debug)]
struct OpenNode {
    f: f64,
    g: f64,
    t: f64,
    pos: SiteId,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| self.t.total_cmp(&other.t))
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

// ── Outcome ───────────────────────────────────────────────────────────────────

/// What a search produced.
#[derive(Debug)]
pub enum SearchOutcome {
    /// A plan to the goal; its reservations are already in the table.
    Found(Plan),
    /// No path to the goal within the time horizon. Nothing was reserved;
    /// the conflict protocol decides what happens next.
    Exhausted,
}

// ── AstarPlanner ──────────────────────────────────────────────────────────────

/// The cooperative A* planner.
pub struct AstarPlanner {
    /// Diagonal steps take 1.5 time units and time runs on the 0.5 grid.
    pub diags_take_longer: bool,
    /// Nodes at or beyond this time are not expanded.
    pub horizon: f64,
    pub stats: PlannerStats,
}

impl AstarPlanner {
    pub fn new(diags_take_longer: bool, horizon: f64) -> Self {
        Self { diags_take_longer, horizon, stats: PlannerStats::default() }
    }

    // ── Heuristic ─────────────────────────────────────────────────────────

    /// Distance heuristic, also used as the exact edge cost.
    ///
    /// `h(a, a) == 1` so that waiting is charged like a move. Periodic
    /// arenas measure against the nearest image of `b`.
    pub fn heuristic(&self, grid: &SpaceGrid, a: SiteId, b: SiteId) -> f64 {
        if a == b {
            return 1.0;
        }

        let b = grid.wrapped_toward(a, b);
        let dx = (a.idx - b.idx).abs() as f64;
        let dy = (a.idy - b.idy).abs() as f64;

        if grid.diagonals {
            // diagonal shortcuts cover min(dx, dy) at 1.5 each
            let diag = dx.min(dy);
            (dx + dy) - 2.0 * diag + 1.5 * diag
        } else {
            dx + dy
        }
    }

    /// Travel time of the step from `a` to `b` under the active time model.
    #[inline]
    fn travel_time(&self, grid: &SpaceGrid, a: SiteId, b: SiteId) -> f64 {
        if self.diags_take_longer {
            self.heuristic(grid, a, b)
        } else {
            1.0
        }
    }

    // ── Search ────────────────────────────────────────────────────────────

    /// A* from `start` at time `now` to `goal`, honoring the reservations
    /// other agents have made and the requester's own sensing cone.
    ///
    /// On success the returned plan's reservations (including half-step
    /// intermediates in slower-diagonals mode) are already written to the
    /// table, owned by `agent`.
    #[allow(clippy::too_many_arguments)]
    pub fn search(
        &mut self,
        grid: &SpaceGrid,
        table: &mut ReservationTable,
        now: f64,
        start: SiteId,
        goal: SiteId,
        sensing_range: f64,
        sensing_angle: f64,
        agent: AgentId,
    ) -> SearchOutcome {
        self.stats.search_calls += 1;
        tracing::debug!(%agent, %start, %goal, now, "searching for a plan");

        let mut details: FxHashMap<Reservation, Node> = FxHashMap::default();
        details.insert(Reservation::new(now, start), Node { parent: None, g: 0.0 });

        let mut open = BinaryHeap::new();
        open.push(OpenNode { f: 0.0, g: 0.0, t: now, pos: start });

        while let Some(cur) = open.pop() {
            // skip entries superseded by a cheaper route to the same state
            match details.get(&Reservation::new(cur.t, cur.pos)) {
                Some(node) if node.g < cur.g => continue,
                _ => {}
            }

            if cur.pos == goal {
                return SearchOutcome::Found(self.recover_plan(
                    grid, table, &details, start, goal, cur.t, now, agent,
                ));
            }

            if cur.t >= self.horizon {
                continue;
            }

            for &nbr in grid.neighbors_and_me(cur.pos) {
                let travel = self.travel_time(grid, cur.pos, nbr);
                let arrival = cur.t + travel;
                let new_g = cur.g + self.heuristic(grid, cur.pos, nbr);

                if self.step_blocked(
                    grid, table, cur.pos, nbr, cur.t, sensing_range, sensing_angle, agent,
                ) {
                    continue;
                }

                let key = Reservation::new(arrival, nbr);
                let better = match details.get(&key) {
                    None => true,
                    Some(existing) => new_g < existing.g,
                };
                if better {
                    details.insert(key, Node { parent: Some(cur.pos), g: new_g });
                    open.push(OpenNode {
                        f: new_g + self.heuristic(grid, nbr, goal),
                        g: new_g,
                        t: arrival,
                        pos: nbr,
                    });
                }
            }
        }

        tracing::debug!(%agent, %start, %goal, "no path to goal within the horizon");
        SearchOutcome::Exhausted
    }

    // ── Step validity ─────────────────────────────────────────────────────

    /// Is the step from `cur` (arrived at `cur_t`) to `nbr` ruled out by a
    /// reservation or by the sensing cone?
    #[allow(clippy::too_many_arguments)]
    fn step_blocked(
        &mut self,
        grid: &SpaceGrid,
        table: &ReservationTable,
        cur: SiteId,
        nbr: SiteId,
        cur_t: f64,
        sensing_range: f64,
        sensing_angle: f64,
        agent: AgentId,
    ) -> bool {
        self.stats.step_checks += 1;

        let travel = self.travel_time(grid, cur, nbr);
        let image = grid.wrapped_toward(cur, nbr);
        let delta = image - cur;

        // the cell we arrive in must be free at arrival time
        if table.reserved(cur_t + travel, nbr) {
            return true;
        }
        // on the half-unit grid we also occupy the cell of origin at the
        // intermediate half-steps
        if self.diags_take_longer {
            let blocked = if delta.l1() > 1 {
                table.reserved(cur_t + 0.5, cur) || table.reserved(cur_t + 1.0, cur)
            } else {
                table.reserved(cur_t + 0.5, cur)
            };
            if blocked {
                return true;
            }
        }

        // waits have no heading, so no cone to violate
        if delta.is_wait() {
            return false;
        }

        let t_check = if self.diags_take_longer { cur_t + travel - 0.5 } else { cur_t };
        self.cone_occupied(
            grid, table, cur, delta.angle(), t_check, sensing_range, sensing_angle, agent,
        )
    }

    // ── Visibility ────────────────────────────────────────────────────────

    /// Would an agent at `from`, heading `heading`, have any reserved cell
    /// inside its sensing cone at time `t`?
    ///
    /// Breadth-first flood from `from` over cells whose centers lie in the
    /// open cone; every visited cell (the seed included) is tested against
    /// the table. Reservations owned by `ignore` do not count — an agent
    /// never blocks its own cone. Pass [`AgentId::INVALID`] to count every
    /// owner.
    #[allow(clippy::too_many_arguments)]
    pub fn cone_occupied(
        &self,
        grid: &SpaceGrid,
        table: &ReservationTable,
        from: SiteId,
        heading: f64,
        t: f64,
        sensing_range: f64,
        sensing_angle: f64,
        ignore: AgentId,
    ) -> bool {
        let mut observer = grid.center_pose(from);
        observer.a = heading;

        let mut visited: FxHashSet<SiteId> = FxHashSet::default();
        visited.insert(from);
        let mut queue: VecDeque<SiteId> = VecDeque::new();
        queue.push_back(from);

        while let Some(cur) = queue.pop_front() {
            if let Some(owner) = table.owner(t, cur) {
                if owner != ignore {
                    return true;
                }
            }

            for &nbr in grid.neighbors(cur) {
                if visited.contains(&nbr) {
                    continue;
                }
                let mut pose = grid.center_pose(nbr);
                if grid.periodic {
                    pose = nearest_periodic(observer, pose, grid.half_size);
                }
                if in_vision_cone(observer, pose, sensing_range, sensing_angle).in_cone {
                    visited.insert(nbr);
                    queue.push_back(nbr);
                }
            }
        }

        false
    }

    // ── Plan recovery ─────────────────────────────────────────────────────

    /// Trace parent pointers from `(goal, goal_reached_time)` back to
    /// `(start, now)`, reserving every cell-time on the way and padding the
    /// plan with explicit waits for the half-step intermediates.
    #[allow(clippy::too_many_arguments)]
    fn recover_plan(
        &self,
        grid: &SpaceGrid,
        table: &mut ReservationTable,
        details: &FxHashMap<Reservation, Node>,
        start: SiteId,
        goal: SiteId,
        goal_reached_time: f64,
        now: f64,
        agent: AgentId,
    ) -> Plan {
        let mut plan = Plan::new();
        let mut time = goal_reached_time;
        let mut s = goal;

        while !(s == start && (time - now).abs() < 1e-9) {
            table.make_reservation(time, s, agent);

            let parent = match details.get(&Reservation::new(time, s)).and_then(|n| n.parent) {
                Some(parent) => parent,
                None => {
                    tracing::warn!(time, %s, "plan trace hit a state that was never recorded");
                    break;
                }
            };
            // unit step in nearest-image form, so seam crossings in a
            // periodic arena classify correctly
            let step = grid.wrapped_toward(parent, s) - parent;
            s = parent;

            if self.diags_take_longer {
                plan.push(step);
                if step.l1() <= 1 {
                    // axis move or wait: two half-steps in the origin cell
                    table.make_reservation(time - 0.5, s, agent);
                    plan.push(SiteId::new(0, 0));
                    time -= 1.0;
                } else {
                    // diagonal: three half-steps
                    table.make_reservation(time - 0.5, s, agent);
                    plan.push(SiteId::new(0, 0));
                    table.make_reservation(time - 1.0, s, agent);
                    plan.push(SiteId::new(0, 0));
                    time -= 1.5;
                }
            } else {
                plan.push(step);
                time -= 1.0;
            }

            if time < now - 1e-9 {
                tracing::warn!(time, now, "time underran the trace start while recovering a plan");
                break;
            }
        }

        plan
    }
}
