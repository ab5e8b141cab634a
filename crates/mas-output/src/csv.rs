//! The CSV logging observer.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use mas_sim::{PlannerSample, ReactiveSample, SimObserver};

use crate::row::{PlannerAgentRow, PlannerTrialRow, ReactiveAgentRow, ReactiveTrialRow};
use crate::{OutputError, OutputResult};

/// Format a float field at the fixed output precision.
#[inline]
fn f2(v: f64) -> String {
    format!("{v:.2}")
}

#[inline]
fn b01(v: bool) -> String {
    (v as u8).to_string()
}

/// Writes the agents and trials files for one simulation regime.
///
/// The observer methods have no return value, so write errors are stored
/// internally; check [`take_error`][Self::take_error] after the run.
pub struct CsvLogger {
    agents: Writer<File>,
    trials: Writer<File>,
    finished: bool,
    last_error: Option<OutputError>,
}

impl CsvLogger {
    /// Open the two files of the discrete planner regime and write their
    /// header rows.
    pub fn planner(agents_path: &Path, trials_path: &Path) -> OutputResult<Self> {
        let mut agents = Writer::from_path(agents_path)?;
        agents.write_record([
            "trial", "periodic", "num_robots", "sim_time", "robot_id", "x_pos", "y_pos",
            "goal_birth_time", "goals_reached", "addtl_data",
        ])?;

        let mut trials = Writer::from_path(trials_path)?;
        trials.write_record([
            "num_robots", "periodic", "trial", "sim_time", "search_calls", "step_checks",
            "replans", "runtime_ms",
        ])?;

        Ok(Self { agents, trials, finished: false, last_error: None })
    }

    /// Open the two files of the local reactive regime and write their
    /// header rows.
    pub fn reactive(agents_path: &Path, trials_path: &Path) -> OutputResult<Self> {
        let mut agents = Writer::from_path(agents_path)?;
        agents.write_record([
            "trial", "periodic", "num_robots", "noise", "noise_prob", "sim_time", "robot_id",
            "x_pos", "y_pos", "angle", "goal_x_pos", "goal_y_pos", "goal_birth_time",
            "goals_reached", "stopped", "nearby_robot", "addtl_data",
        ])?;

        let mut trials = Writer::from_path(trials_path)?;
        trials.write_record([
            "num_robots", "noise", "periodic", "trial", "sim_time", "noise_type",
            "sensing_call_count", "runtime_ms",
        ])?;

        Ok(Self { agents, trials, finished: false, last_error: None })
    }

    /// Take the stored write error (if any) after the run.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush both files. Idempotent.
    pub fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.agents.flush()?;
        self.trials.flush()?;
        Ok(())
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }

    // ── Row writers ───────────────────────────────────────────────────────

    fn write_planner_agent(&mut self, row: &PlannerAgentRow) -> OutputResult<()> {
        self.agents.write_record(&[
            row.trial.to_string(),
            b01(row.periodic),
            row.num_robots.to_string(),
            f2(row.sim_time),
            row.robot_id.to_string(),
            row.x_pos.to_string(),
            row.y_pos.to_string(),
            f2(row.goal_birth_time),
            row.goals_reached.to_string(),
            row.addtl_data.clone(),
        ])?;
        Ok(())
    }

    fn write_planner_trial(&mut self, row: &PlannerTrialRow) -> OutputResult<()> {
        self.trials.write_record(&[
            row.num_robots.to_string(),
            b01(row.periodic),
            row.trial.to_string(),
            f2(row.sim_time),
            row.search_calls.to_string(),
            row.step_checks.to_string(),
            row.replans.to_string(),
            row.runtime_ms.to_string(),
        ])?;
        Ok(())
    }

    fn write_reactive_agent(&mut self, row: &ReactiveAgentRow) -> OutputResult<()> {
        self.agents.write_record(&[
            row.trial.to_string(),
            b01(row.periodic),
            row.num_robots.to_string(),
            f2(row.noise),
            f2(row.noise_prob),
            f2(row.sim_time),
            row.robot_id.to_string(),
            f2(row.x_pos),
            f2(row.y_pos),
            f2(row.angle),
            f2(row.goal_x_pos),
            f2(row.goal_y_pos),
            f2(row.goal_birth_time),
            row.goals_reached.to_string(),
            b01(row.stopped),
            row.nearby_robot.map(|id| id.to_string()).unwrap_or_default(),
            row.addtl_data.clone(),
        ])?;
        Ok(())
    }

    fn write_reactive_trial(&mut self, row: &ReactiveTrialRow) -> OutputResult<()> {
        self.trials.write_record(&[
            row.num_robots.to_string(),
            f2(row.noise),
            b01(row.periodic),
            row.trial.to_string(),
            f2(row.sim_time),
            row.noise_type.clone(),
            row.sensing_calls.to_string(),
            row.runtime_ms.to_string(),
        ])?;
        Ok(())
    }
}

// ── Observer glue ─────────────────────────────────────────────────────────────

impl SimObserver for CsvLogger {
    fn on_planner_sample(&mut self, sample: &PlannerSample<'_>) {
        for agent in sample.agents {
            let row = PlannerAgentRow {
                trial: sample.trial,
                periodic: sample.params.periodic,
                num_robots: sample.params.num_agents,
                sim_time: sample.sim_time,
                robot_id: agent.id.0,
                x_pos: agent.cur_pos.idx,
                y_pos: agent.cur_pos.idy,
                goal_birth_time: agent.goal_birth_time,
                goals_reached: agent.goals_reached,
                addtl_data: sample.params.addtl_data.clone(),
            };
            let result = self.write_planner_agent(&row);
            self.store_err(result);
        }

        let row = PlannerTrialRow {
            num_robots: sample.params.num_agents,
            periodic: sample.params.periodic,
            trial: sample.trial,
            sim_time: sample.sim_time,
            search_calls: sample.stats.search_calls,
            step_checks: sample.stats.step_checks,
            replans: sample.stats.replans,
            runtime_ms: sample.runtime_ms,
        };
        let result = self.write_planner_trial(&row);
        self.store_err(result);
    }

    fn on_reactive_sample(&mut self, sample: &ReactiveSample<'_>) {
        for agent in sample.agents {
            let base = ReactiveAgentRow {
                trial: sample.trial,
                periodic: sample.params.periodic,
                num_robots: sample.params.num_agents,
                noise: sample.params.anglenoise,
                noise_prob: sample.params.noise_prob,
                sim_time: sample.sim_time,
                robot_id: agent.id.0,
                x_pos: agent.pose.x,
                y_pos: agent.pose.y,
                angle: agent.pose.a,
                goal_x_pos: agent.goal.x,
                goal_y_pos: agent.goal.y,
                goal_birth_time: agent.goal_birth_time,
                goals_reached: agent.goals_reached,
                stopped: agent.stop,
                nearby_robot: None,
                addtl_data: sample.params.addtl_data.clone(),
            };

            if agent.stop {
                // one row per sensed neighbor
                for hit in &agent.sensed {
                    let row = ReactiveAgentRow { nearby_robot: Some(hit.id.0), ..base.clone() };
                    let result = self.write_reactive_agent(&row);
                    self.store_err(result);
                }
            } else {
                let result = self.write_reactive_agent(&base);
                self.store_err(result);
            }
        }

        let row = ReactiveTrialRow {
            num_robots: sample.params.num_agents,
            noise: sample.params.anglenoise,
            periodic: sample.params.periodic,
            trial: sample.trial,
            sim_time: sample.sim_time,
            noise_type: sample.params.addtl_data.clone(),
            sensing_calls: sample.sensing_calls,
            runtime_ms: sample.runtime_ms,
        };
        let result = self.write_reactive_trial(&row);
        self.store_err(result);
    }

    fn on_run_end(&mut self) {
        let result = self.finish();
        self.store_err(result);
    }
}
