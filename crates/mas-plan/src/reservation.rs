//! The space-time reservation table.
//!
//! A reservation is a commitment that one agent owns one cell at one time.
//! Times are half-unit quantized; the key stores `round(2·t)` as an integer,
//! so two times hash and compare equal exactly when their half-step counts
//! coincide — float equality never enters the picture.

use rustc_hash::FxHashMap;

use mas_core::{AgentId, SiteId};

// ── Reservation ───────────────────────────────────────────────────────────────

/// A `(time, cell)` key on the half-unit time grid.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Reservation {
    half_steps: i64,
    pub site: SiteId,
}

impl Reservation {
    /// Quantize `t` to the half-unit grid. A time that is not a multiple of
    /// 0.5 indicates a planner bug and is diagnosed before rounding.
    pub fn new(t: f64, site: SiteId) -> Self {
        let doubled = 2.0 * t;
        if (doubled - doubled.round()).abs() > 1e-5 {
            tracing::warn!(t, %site, "reservation time is not a multiple of 0.5");
        }
        Self { half_steps: doubled.round() as i64, site }
    }

    /// The canonical time this key stands for.
    #[inline]
    pub fn time(&self) -> f64 {
        self.half_steps as f64 * 0.5
    }
}

// ── ReservationTable ──────────────────────────────────────────────────────────

/// Mapping from `(time, cell)` to the owning agent.
///
/// The table is the only shared mutable structure of the discrete regime;
/// every mutation carries the acting agent's id so ownership violations can
/// be diagnosed at the call site.
#[derive(Default)]
pub struct ReservationTable {
    inner: FxHashMap<Reservation, AgentId>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `(t, site)` for `agent`.
    ///
    /// Double-booking indicates a planner bug: it is diagnosed prominently,
    /// then the entry is overwritten so the run can recover.
    pub fn make_reservation(&mut self, t: f64, site: SiteId, agent: AgentId) {
        let key = Reservation::new(t, site);
        if let Some(&holder) = self.inner.get(&key) {
            tracing::warn!(t, %site, %holder, %agent, "overwriting an existing reservation");
        }
        tracing::trace!(t, %site, %agent, "reservation made");
        self.inner.insert(key, agent);
    }

    /// Is `(t, site)` reserved by anyone?
    #[inline]
    pub fn reserved(&self, t: f64, site: SiteId) -> bool {
        self.inner.contains_key(&Reservation::new(t, site))
    }

    /// Who owns `(t, site)`, if anyone.
    #[inline]
    pub fn owner(&self, t: f64, site: SiteId) -> Option<AgentId> {
        self.inner.get(&Reservation::new(t, site)).copied()
    }

    /// Remove `(t, site)`. Erasing an entry that was never made is
    /// diagnosed — the table must only shrink by what was inserted.
    pub fn erase(&mut self, t: f64, site: SiteId) {
        if self.inner.remove(&Reservation::new(t, site)).is_none() {
            tracing::warn!(t, %site, "erasing a reservation that was never made");
        }
    }

    /// Drop every reservation (between trials).
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate all `(reservation, owner)` pairs — the inspection surface for
    /// external verification.
    pub fn iter(&self) -> impl Iterator<Item = (&Reservation, &AgentId)> {
        self.inner.iter()
    }
}
