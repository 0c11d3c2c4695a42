use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, SimulationError};
use super::spatial::CELL_SIZE;

/// Simulation parameters supplied by the presentation layer.
///
/// Every field may be changed at runtime through
/// [`Ecosystem::set_params`](super::ecosystem::Ecosystem::set_params), which
/// validates the new values before they reach the tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    /// World width, centred on the origin.
    pub world_width: f32,
    /// World height, centred on the origin.
    pub world_height: f32,
    /// Resources placed when the ecosystem is created.
    pub starting_resources: usize,
    /// Hard cap on live resources.
    pub max_resources: usize,
    /// Resources rained into the world per second.
    pub resources_per_second: f32,
    /// Resource units credited by a single resource.
    pub resource_value: f32,
    /// Random nodes are spawned while fewer species than this are alive.
    pub min_active_species: usize,
    /// Seconds between movement refreshes; scales the per-tick resource cost.
    pub tick_interval: f32,
    /// Thrust multiplier applied to every node.
    pub speed_multiplier: f32,
    /// When set, thrust costs resources on top of the flat feed rate.
    pub movement_costs_resources: bool,
    /// Inverts the collision winner: the smaller metric consumes.
    pub smaller_consumes: bool,
    /// Allows perceiving and consuming members of the same species.
    pub cannibalism: bool,
    /// Compares kinetic energy instead of radius on node contact.
    pub greater_energy_consumes: bool,
    /// Enables founding new species on divergent offspring.
    pub speciation: bool,
    /// Mean relative divergence above which offspring found a new species.
    pub speciation_threshold: f32,
    /// Enables node-vs-node consumption.
    pub nodes_are_consumed: bool,
    /// Enables death by starvation.
    pub starvation: bool,
    /// Enables movement integration.
    pub nodes_move: bool,
    /// Enables asexual reproduction.
    pub asexual_reproduction: bool,
    /// Nodes farther than this from the origin are culled by the doomed sweep.
    pub max_distance_from_origin: f32,
    /// Seconds between doomed sweeps.
    pub doomed_sweep_interval: f32,
    /// Seconds between starvation checks.
    pub starvation_check_interval: f32,
    /// Seconds a node may not consume after reproducing.
    pub prey_cooldown: f32,
    /// Seconds per age increment for nodes and species.
    pub age_interval: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            world_width: 3000.0,
            world_height: 6000.0,
            starting_resources: 400,
            max_resources: 1700,
            resources_per_second: 20.0,
            resource_value: 1.0,
            min_active_species: 40,
            tick_interval: 0.25,
            speed_multiplier: 400.0,
            movement_costs_resources: true,
            smaller_consumes: false,
            cannibalism: false,
            greater_energy_consumes: false,
            speciation: true,
            speciation_threshold: 0.04,
            nodes_are_consumed: true,
            starvation: true,
            nodes_move: true,
            asexual_reproduction: true,
            max_distance_from_origin: 3000.0,
            doomed_sweep_interval: 10.0,
            starvation_check_interval: 2.0,
            prey_cooldown: 2.0,
            age_interval: 1.0,
        }
    }
}

/// Shortest accepted period for the interval timers, in seconds.
pub const MIN_TIMER_INTERVAL: f32 = 0.01;

const MAX_MIN_ACTIVE_SPECIES: usize = 100;

impl Params {
    /// Checks every field against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.float_fields() {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }

        for (field, value, min, max) in self.float_ranges() {
            if !(min..=max).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value: value as f64,
                    min: min as f64,
                    max: max as f64,
                });
            }
        }

        if self.min_active_species > MAX_MIN_ACTIVE_SPECIES {
            return Err(ConfigError::OutOfRange {
                field: "min_active_species",
                value: self.min_active_species as f64,
                min: 0.0,
                max: MAX_MIN_ACTIVE_SPECIES as f64,
            });
        }

        if self.world_width < CELL_SIZE || self.world_height < CELL_SIZE {
            return Err(ConfigError::WorldTooSmall {
                width: self.world_width,
                height: self.world_height,
                cell_size: CELL_SIZE,
            });
        }

        Ok(())
    }

    /// Returns the nearest configuration that passes [`Params::validate`].
    ///
    /// Non-finite values fall back to their defaults.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };

        let mut out = self.clone();
        out.resources_per_second =
            finite_or(self.resources_per_second, defaults.resources_per_second).clamp(0.0, 100.0);
        out.speed_multiplier =
            finite_or(self.speed_multiplier, defaults.speed_multiplier).clamp(100.0, 1000.0);
        out.speciation_threshold =
            finite_or(self.speciation_threshold, defaults.speciation_threshold).clamp(0.0, 1.0);
        out.tick_interval =
            finite_or(self.tick_interval, defaults.tick_interval).clamp(f32::EPSILON, 1.0);
        out.min_active_species = self.min_active_species.min(MAX_MIN_ACTIVE_SPECIES);
        out.world_width = finite_or(self.world_width, defaults.world_width).max(CELL_SIZE);
        out.world_height = finite_or(self.world_height, defaults.world_height).max(CELL_SIZE);
        out.resource_value = finite_or(self.resource_value, defaults.resource_value).max(0.0);
        out.max_distance_from_origin =
            finite_or(self.max_distance_from_origin, defaults.max_distance_from_origin).max(0.0);
        out.doomed_sweep_interval = finite_or(self.doomed_sweep_interval, defaults.doomed_sweep_interval)
            .max(MIN_TIMER_INTERVAL);
        out.starvation_check_interval =
            finite_or(self.starvation_check_interval, defaults.starvation_check_interval)
                .max(MIN_TIMER_INTERVAL);
        out.prey_cooldown = finite_or(self.prey_cooldown, defaults.prey_cooldown).max(0.0);
        out.age_interval =
            finite_or(self.age_interval, defaults.age_interval).max(MIN_TIMER_INTERVAL);
        out
    }

    /// Parses and validates parameters from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SimulationError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Loads and validates parameters from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Resources burned per movement update by a node of the given radius.
    pub fn feed_rate(&self, radius: f32) -> f32 {
        radius * 0.005 * self.tick_interval
    }

    fn float_fields(&self) -> [(&'static str, f32); 12] {
        [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("resources_per_second", self.resources_per_second),
            ("resource_value", self.resource_value),
            ("tick_interval", self.tick_interval),
            ("speed_multiplier", self.speed_multiplier),
            ("speciation_threshold", self.speciation_threshold),
            ("max_distance_from_origin", self.max_distance_from_origin),
            ("doomed_sweep_interval", self.doomed_sweep_interval),
            ("starvation_check_interval", self.starvation_check_interval),
            ("prey_cooldown", self.prey_cooldown),
            ("age_interval", self.age_interval),
        ]
    }

    fn float_ranges(&self) -> [(&'static str, f32, f32, f32); 10] {
        [
            ("resources_per_second", self.resources_per_second, 0.0, 100.0),
            ("speed_multiplier", self.speed_multiplier, 100.0, 1000.0),
            ("speciation_threshold", self.speciation_threshold, 0.0, 1.0),
            ("tick_interval", self.tick_interval, f32::EPSILON, 1.0),
            ("resource_value", self.resource_value, 0.0, f32::INFINITY),
            ("max_distance_from_origin", self.max_distance_from_origin, 0.0, f32::INFINITY),
            ("prey_cooldown", self.prey_cooldown, 0.0, f32::INFINITY),
            (
                "doomed_sweep_interval",
                self.doomed_sweep_interval,
                MIN_TIMER_INTERVAL,
                f32::INFINITY,
            ),
            (
                "starvation_check_interval",
                self.starvation_check_interval,
                MIN_TIMER_INTERVAL,
                f32::INFINITY,
            ),
            ("age_interval", self.age_interval, MIN_TIMER_INTERVAL, f32::INFINITY),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Params::default().validate(), Ok(()));
    }

    #[test]
    fn threshold_out_of_range_is_rejected_and_clamped() {
        let params = Params {
            speciation_threshold: 1.5,
            ..Params::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::OutOfRange {
                field: "speciation_threshold",
                ..
            })
        ));
        let clamped = params.clamped();
        assert!((clamped.speciation_threshold - 1.0).abs() < f32::EPSILON);
        assert_eq!(clamped.validate(), Ok(()));
    }

    #[test]
    fn nan_falls_back_to_default_when_clamped() {
        let params = Params {
            tick_interval: f32::NAN,
            ..Params::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::NonFinite {
                field: "tick_interval"
            })
        );
        assert!((params.clamped().tick_interval - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn vanishing_timer_intervals_are_rejected_and_clamped() {
        for params in [
            Params {
                age_interval: 1e-9,
                ..Params::default()
            },
            Params {
                starvation_check_interval: 0.0,
                ..Params::default()
            },
            Params {
                doomed_sweep_interval: 1e-6,
                ..Params::default()
            },
        ] {
            assert!(matches!(
                params.validate(),
                Err(ConfigError::OutOfRange { min, .. }) if (min - MIN_TIMER_INTERVAL as f64).abs() < 1e-9
            ));
            let clamped = params.clamped();
            assert_eq!(clamped.validate(), Ok(()));
            assert!(clamped.age_interval >= MIN_TIMER_INTERVAL);
            assert!(clamped.starvation_check_interval >= MIN_TIMER_INTERVAL);
            assert!(clamped.doomed_sweep_interval >= MIN_TIMER_INTERVAL);
        }
    }

    #[test]
    fn feed_rate_scales_with_radius_and_interval() {
        let params = Params::default();
        assert!((params.feed_rate(10.0) - 0.0125).abs() < 1e-6);
    }
}
