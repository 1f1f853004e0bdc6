//! Battery Management System
//!
//! The controller owns the pack, the thresholds and the fault log. Each tick it
//! drives the pack with the current commanded on the previous tick, evaluates
//! every threshold against the resulting snapshot, updates the operating state,
//! and computes the current and balancing plan for the next tick.
//!
//! Warning clears by itself once every metric is back inside its warning level.
//! Critical is latched: the commanded current stays at zero until `reset`.
//!
//! Every command is clamped to what the pack can carry without any cell
//! passing its hard current ceiling, given the present split and the bleed
//! planned for the same tick.

use std::fmt;

use electrical::{BalancingCommand, Pack, PackSnapshot};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use simcore::{ConfigurationError, Model, ModelError, SimContext};

use crate::balancing::plan_balancing;
use crate::config::{ControlConfig, RunConfig};
use crate::discharge::discharge_ceiling;
use crate::error::BmsError;
use crate::fault::{FaultLog, FaultRecord};
use crate::profile::{Demand, LoadProfile};
use crate::summary::{RunStatistics, RunSummary};
use crate::taper::ChargeTaper;
use crate::telemetry::{TelemetrySink, TickRecord};
use crate::thresholds::{Severity, ThresholdConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingState {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl fmt::Display for OperatingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            OperatingState::Normal => "normal",
            OperatingState::Warning => "warning",
            OperatingState::Critical => "critical",
        })
    }
}

#[derive(Debug, Clone)]
pub struct BatteryManagementSystem {
    pack: Pack,
    thresholds: ThresholdConfig,
    config: ControlConfig,
    taper: Box<dyn ChargeTaper>,
    state: OperatingState,
    faults: FaultLog,
    demand: Demand,
    /// Current the pack will be driven with on the next tick (A)
    commanded_current: f64,
    /// Bleed plan for the next tick
    balancing: BalancingCommand,
    tick: u64,
    statistics: RunStatistics,
    last_snapshot: PackSnapshot,
}

impl BatteryManagementSystem {
    /// Wrap `pack` in a controller. Thresholds and tuning are validated first.
    pub fn new(pack: Pack, thresholds: ThresholdConfig, config: ControlConfig) -> Result<Self, ConfigurationError> {
        thresholds.validate()?;
        config.validate(&thresholds)?;
        let cell_ceiling = pack
            .cells()
            .map(|cell| cell.constants.max_abs_current_a)
            .fold(f64::INFINITY, f64::min);
        config.validate_ceilings(pack.parallel(), cell_ceiling)?;
        let taper = config.charge.taper.strategy();
        let last_snapshot = pack.measure();
        Ok(Self {
            pack,
            thresholds,
            config,
            taper,
            state: OperatingState::Normal,
            faults: FaultLog::new(),
            demand: Demand::Rest,
            commanded_current: 0.0,
            balancing: BalancingCommand::none(),
            tick: 0,
            statistics: RunStatistics::default(),
            last_snapshot,
        })
    }

    /// Replace the configured taper strategy.
    pub fn with_taper(mut self, taper: Box<dyn ChargeTaper>) -> Self {
        self.taper = taper;
        self
    }

    pub fn pack(&self) -> &Pack {
        &self.pack
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn control_config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn state(&self) -> OperatingState {
        self.state
    }

    pub fn faults(&self) -> &FaultLog {
        &self.faults
    }

    pub fn demand(&self) -> Demand {
        self.demand
    }

    /// Current that the next tick will apply (A, positive = discharge).
    pub fn commanded_current(&self) -> f64 {
        self.commanded_current
    }

    pub fn pending_balancing(&self) -> &BalancingCommand {
        &self.balancing
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn statistics(&self) -> &RunStatistics {
        &self.statistics
    }

    /// Snapshot of the pack as it stands, without stepping.
    pub fn measure(&self) -> PackSnapshot {
        self.pack.measure()
    }

    /// Change the operator demand. The next tick's current is recomputed from
    /// the latest snapshot; in Critical it stays at zero.
    pub fn set_demand(&mut self, demand: Demand) {
        if demand != self.demand {
            debug!("demand {:?} -> {:?}", self.demand, demand);
        }
        self.demand = demand;
        self.commanded_current = match self.state {
            OperatingState::Critical => 0.0,
            _ => self.command_for(&self.last_snapshot),
        };
    }

    /// Current to command for `snapshot` under the present demand.
    ///
    /// The pack must still be in the state `snapshot` describes, and the
    /// balancing plan must already be the one the command will run with.
    fn command_for(&self, snapshot: &PackSnapshot) -> f64 {
        let requested = match self.demand {
            Demand::Rest => 0.0,
            Demand::Charge { current } => {
                let base = current.min(self.config.charge.max_current_a);
                let allowed = base * self.taper.factor(snapshot, &self.thresholds, &self.config.charge);
                if allowed > 0.0 { -allowed } else { 0.0 }
            }
            Demand::Discharge { current } => {
                current.min(discharge_ceiling(snapshot, &self.thresholds, &self.config.discharge))
            }
        };
        let commanded = self.pack.current_limits(&self.balancing).clamp(requested);
        if commanded != requested {
            debug!(
                "tick {}: {:.3} A held to {:.3} A by the cell current ceiling",
                self.tick, requested, commanded
            );
        }
        commanded
    }

    fn transition(&mut self, next: OperatingState) {
        if next == self.state {
            return;
        }
        match next {
            OperatingState::Critical => {
                error!("tick {}: entering critical state, current forced to zero", self.tick)
            }
            OperatingState::Warning if self.state == OperatingState::Normal => {
                warn!("tick {}: entering warning state", self.tick)
            }
            OperatingState::Warning => {}
            OperatingState::Normal => info!("tick {}: all metrics back within limits", self.tick),
        }
        self.state = next;
    }

    /// Run one control tick.
    ///
    /// An invalid step leaves the pack, state and fault log untouched.
    pub fn tick(&mut self, ctx: SimContext) -> Result<TickRecord, ModelError> {
        let applied_current = self.commanded_current;
        let snapshot = self.pack.apply_balanced(
            applied_current,
            &self.balancing,
            ctx.ambient_temperature,
            ctx.dt,
        )?;
        let balanced_cells = self.balancing.cells();

        let violations = self.thresholds.evaluate(&snapshot);
        let mut new_faults = Vec::with_capacity(violations.len());
        for violation in &violations {
            let record = FaultRecord::from_violation(self.tick, violation);
            match record.severity {
                Severity::Warning => warn!("{record}"),
                Severity::Critical => error!("{record}"),
            }
            self.faults.append(record);
            new_faults.push(record);
        }

        let worst = violations.iter().map(|v| v.severity).max();
        let next_state = match (self.state, worst) {
            (OperatingState::Critical, _) | (_, Some(Severity::Critical)) => OperatingState::Critical,
            (_, Some(Severity::Warning)) => OperatingState::Warning,
            (_, None) => OperatingState::Normal,
        };
        self.transition(next_state);

        if self.state == OperatingState::Critical {
            self.commanded_current = 0.0;
            self.balancing = BalancingCommand::none();
        } else {
            self.balancing = plan_balancing(&snapshot, &self.config.balancing);
            self.commanded_current = self.command_for(&snapshot);
            if !self.balancing.is_empty() {
                debug!(
                    "tick {}: spread {:.4} V, bleeding cells {:?}",
                    self.tick,
                    snapshot.imbalance,
                    self.balancing.cells()
                );
            }
        }

        self.statistics.observe(&snapshot, self.state, ctx.dt);
        let record = TickRecord {
            tick: self.tick,
            time_s: ctx.t,
            state: self.state,
            applied_current,
            next_current: self.commanded_current,
            new_faults,
            balanced_cells,
            snapshot: snapshot.clone(),
        };
        self.last_snapshot = snapshot;
        self.tick += 1;
        Ok(record)
    }

    /// Drive the controller from `profile` for `run.ticks` ticks, or until the
    /// configured number of consecutive Critical ticks.
    pub fn run<S: TelemetrySink + ?Sized>(
        &mut self,
        run: &RunConfig,
        profile: &LoadProfile,
        sink: &mut S,
    ) -> Result<RunSummary, BmsError> {
        run.validate()?;
        profile.validate()?;
        info!(
            "running {} ticks of {} s on a {}S{}P pack at {} °C ambient",
            run.ticks,
            run.dt_s,
            self.pack.series(),
            self.pack.parallel(),
            run.ambient_temperature_c
        );

        let mut ctx = SimContext::new(run.dt_s, self.statistics.elapsed_s(), run.ambient_temperature_c);
        let mut critical_streak = 0;
        for _ in 0..run.ticks {
            let demand = profile.demand_at(ctx.t);
            if demand != self.demand {
                self.set_demand(demand);
            }
            let record = self.tick(ctx)?;
            sink.record(&record);

            critical_streak = match record.state {
                OperatingState::Critical => critical_streak + 1,
                _ => 0,
            };
            if run.halt_after_critical_ticks.is_some_and(|limit| critical_streak >= limit) {
                info!("halting after {critical_streak} consecutive critical ticks");
                break;
            }
            ctx = ctx.advance();
        }

        let summary = self.summary();
        sink.finish(&summary);
        Ok(summary)
    }

    /// Summary of everything run so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary::new(&self.statistics, &self.faults, self.state, &self.last_snapshot)
    }
}

impl Model for BatteryManagementSystem {
    /// Clear a latched Critical state. The fault log is kept; balancing and
    /// the next command are planned again from the last snapshot, and the
    /// next tick re-evaluates every threshold.
    fn reset(&mut self) {
        if self.state != OperatingState::Normal {
            info!("tick {}: reset from {} state", self.tick, self.state);
        }
        self.state = OperatingState::Normal;
        self.balancing = plan_balancing(&self.last_snapshot, &self.config.balancing);
        self.commanded_current = self.command_for(&self.last_snapshot);
    }
}
