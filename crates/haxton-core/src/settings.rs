//! Configuration loading and typed settings for the Haxton bot.
//!
//! The canonical configuration lives in `haxton-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure, and
//! provides a loader that reads and parses the file. Every field has a
//! default, so an empty file (or no file at all) yields a working bot
//! that only farms forts and catches everything nearby.

use std::path::Path;
use std::time::Duration;

use haxton_types::{GeoCoordinate, RecycleRule, Species};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level bot settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Settings {
    /// Movement between forts.
    #[serde(default)]
    pub walking: WalkingSettings,

    /// Catching nearby creatures while walking.
    #[serde(default)]
    pub catching: CatchingSettings,

    /// Duplicate transfer policy.
    #[serde(default)]
    pub transfer: TransferSettings,

    /// Evolution policy.
    #[serde(default)]
    pub evolve: EvolveSettings,

    /// Item discard policy.
    #[serde(default)]
    pub recycle: RecycleSettings,

    /// Lucky egg activation behavior.
    #[serde(default)]
    pub lucky_egg: LuckyEggSettings,

    /// Loop delays.
    #[serde(default)]
    pub timings: TimingSettings,

    /// Simulated world parameters (used by the `haxton-bot` binary).
    #[serde(default)]
    pub simulation: SimulationSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load settings from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse settings from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yml::from_str(yaml)?;
        Ok(settings)
    }

    /// Whether the transfer loop starts enabled.
    pub const fn transfer_initially_enabled(&self) -> bool {
        self.transfer.enabled
    }

    /// Whether the evolution loop starts enabled.
    pub const fn evolve_initially_enabled(&self) -> bool {
        self.evolve.evolve_all_with_enough_candy || self.evolve.evolve_all_above_iv
    }

    /// Whether the recycling loop starts enabled.
    pub fn recycle_initially_enabled(&self) -> bool {
        !self.recycle.rules.is_empty()
    }
}

/// Walking configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WalkingSettings {
    /// Walking speed in kilometers per hour.
    #[serde(default = "default_speed_kmh")]
    pub speed_kmh: f64,
}

impl Default for WalkingSettings {
    fn default() -> Self {
        Self {
            speed_kmh: default_speed_kmh(),
        }
    }
}

/// Catching configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatchingSettings {
    /// Delay after each catch attempt except the last in a snapshot.
    #[serde(default = "default_delay_between_catches_ms")]
    pub delay_between_catches_ms: u64,

    /// Whether [`not_to_catch`](Self::not_to_catch) is applied.
    #[serde(default)]
    pub use_not_to_catch_filter: bool,

    /// Species that are never encountered.
    #[serde(default)]
    pub not_to_catch: Vec<Species>,
}

impl CatchingSettings {
    /// Whether sightings of `species` are skipped.
    pub fn excludes(&self, species: &Species) -> bool {
        self.use_not_to_catch_filter && self.not_to_catch.contains(species)
    }

    /// Delay after a catch attempt that is not the last one.
    pub const fn delay_between_catches(&self) -> Duration {
        Duration::from_millis(self.delay_between_catches_ms)
    }
}

impl Default for CatchingSettings {
    fn default() -> Self {
        Self {
            delay_between_catches_ms: default_delay_between_catches_ms(),
            use_not_to_catch_filter: false,
            not_to_catch: Vec::new(),
        }
    }
}

/// Duplicate transfer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferSettings {
    /// Whether the transfer loop starts enabled.
    #[serde(default)]
    pub enabled: bool,

    /// Duplicates at or above this CP are kept.
    #[serde(default = "default_keep_min_cp")]
    pub keep_min_cp: u32,

    /// Duplicates strictly above this IV percentage are kept.
    #[serde(default = "default_keep_min_iv_percentage")]
    pub keep_min_iv_percentage: f64,

    /// Ask the inventory to keep duplicates that can still evolve.
    #[serde(default)]
    pub keep_creatures_that_can_evolve: bool,

    /// Ask the inventory to rank duplicates by IV instead of CP.
    #[serde(default)]
    pub prioritize_iv_over_cp: bool,

    /// Species never transferred.
    #[serde(default)]
    pub not_to_transfer: Vec<Species>,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            keep_min_cp: default_keep_min_cp(),
            keep_min_iv_percentage: default_keep_min_iv_percentage(),
            keep_creatures_that_can_evolve: false,
            prioritize_iv_over_cp: false,
            not_to_transfer: Vec::new(),
        }
    }
}

/// Evolution configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EvolveSettings {
    /// Evolve every creature with enough candy.
    #[serde(default)]
    pub evolve_all_with_enough_candy: bool,

    /// Evolve creatures above [`evolve_above_iv_value`](Self::evolve_above_iv_value).
    #[serde(default)]
    pub evolve_all_above_iv: bool,

    /// IV percentage a creature must reach to be evolved when
    /// [`evolve_all_above_iv`](Self::evolve_all_above_iv) is the only
    /// evolve mode.
    #[serde(default = "default_evolve_above_iv_value")]
    pub evolve_above_iv_value: f64,

    /// Activate a lucky egg before each evolution pass.
    #[serde(default)]
    pub use_lucky_eggs_while_evolving: bool,

    /// Species allowed to evolve (empty = all).
    #[serde(default)]
    pub to_evolve: Vec<Species>,
}

impl EvolveSettings {
    /// IV floor passed to the inventory when listing evolve candidates.
    ///
    /// `None` when evolving everything with enough candy, which already
    /// includes every creature above the floor.
    pub const fn min_iv(&self) -> Option<f64> {
        if self.evolve_all_above_iv && !self.evolve_all_with_enough_candy {
            Some(self.evolve_above_iv_value)
        } else {
            None
        }
    }
}

impl Default for EvolveSettings {
    fn default() -> Self {
        Self {
            evolve_all_with_enough_candy: false,
            evolve_all_above_iv: false,
            evolve_above_iv_value: default_evolve_above_iv_value(),
            use_lucky_eggs_while_evolving: false,
            to_evolve: Vec::new(),
        }
    }
}

/// Item discard configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecycleSettings {
    /// Per-kind keep limits. An empty list disables recycling.
    #[serde(default)]
    pub rules: Vec<RecycleRule>,
}

/// Lucky egg configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LuckyEggSettings {
    /// Record the activation time so the next egg waits for the boost
    /// window to elapse.
    ///
    /// `false` keeps the historical behavior where the timestamp is never
    /// written and the held count is the only gate. This is a known defect
    /// kept for parity; set `true` to use the corrected gate.
    #[serde(default)]
    pub record_activation: bool,
}

/// Loop delays, in milliseconds unless noted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingSettings {
    /// Pause after claiming a fort.
    #[serde(default = "default_fort_visit_delay_ms")]
    pub fort_visit_delay_ms: u64,

    /// Pause before each encounter attempt.
    #[serde(default = "default_catch_throttle_ms")]
    pub catch_throttle_ms: u64,

    /// Pause between transfer passes.
    #[serde(default = "default_pass_ms")]
    pub transfer_pass_ms: u64,

    /// Pause between evolution passes.
    #[serde(default = "default_pass_ms")]
    pub evolve_pass_ms: u64,

    /// Pause between recycling passes.
    #[serde(default = "default_pass_ms")]
    pub recycle_pass_ms: u64,

    /// Pause after each discarded stack.
    #[serde(default = "default_recycle_item_delay_ms")]
    pub recycle_item_delay_ms: u64,

    /// Pause after activating a lucky egg.
    #[serde(default = "default_lucky_egg_settle_ms")]
    pub lucky_egg_settle_ms: u64,

    /// How long a lucky egg stays active, in seconds.
    #[serde(default = "default_lucky_egg_window_secs")]
    pub lucky_egg_window_secs: u64,

    /// Pause before rediscovering forts after an empty map (0 = just yield).
    #[serde(default)]
    pub rediscover_delay_ms: u64,

    /// Upper bound on the nearby-sighting fetch made during each walk step.
    #[serde(default = "default_nearby_fetch_timeout_ms")]
    pub nearby_fetch_timeout_ms: u64,
}

impl TimingSettings {
    /// Pause after claiming a fort.
    pub const fn fort_visit_delay(&self) -> Duration {
        Duration::from_millis(self.fort_visit_delay_ms)
    }

    /// Pause before each encounter attempt.
    pub const fn catch_throttle(&self) -> Duration {
        Duration::from_millis(self.catch_throttle_ms)
    }

    /// Pause between transfer passes.
    pub const fn transfer_pass(&self) -> Duration {
        Duration::from_millis(self.transfer_pass_ms)
    }

    /// Pause between evolution passes.
    pub const fn evolve_pass(&self) -> Duration {
        Duration::from_millis(self.evolve_pass_ms)
    }

    /// Pause between recycling passes.
    pub const fn recycle_pass(&self) -> Duration {
        Duration::from_millis(self.recycle_pass_ms)
    }

    /// Pause after each discarded stack.
    pub const fn recycle_item_delay(&self) -> Duration {
        Duration::from_millis(self.recycle_item_delay_ms)
    }

    /// Pause after activating a lucky egg.
    pub const fn lucky_egg_settle(&self) -> Duration {
        Duration::from_millis(self.lucky_egg_settle_ms)
    }

    /// How long a lucky egg stays active.
    pub const fn lucky_egg_window(&self) -> Duration {
        Duration::from_secs(self.lucky_egg_window_secs)
    }

    /// Pause before rediscovering forts after an empty map.
    pub const fn rediscover_delay(&self) -> Duration {
        Duration::from_millis(self.rediscover_delay_ms)
    }

    /// Upper bound on the nearby-sighting fetch.
    pub const fn nearby_fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.nearby_fetch_timeout_ms)
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            fort_visit_delay_ms: default_fort_visit_delay_ms(),
            catch_throttle_ms: default_catch_throttle_ms(),
            transfer_pass_ms: default_pass_ms(),
            evolve_pass_ms: default_pass_ms(),
            recycle_pass_ms: default_pass_ms(),
            recycle_item_delay_ms: default_recycle_item_delay_ms(),
            lucky_egg_settle_ms: default_lucky_egg_settle_ms(),
            lucky_egg_window_secs: default_lucky_egg_window_secs(),
            rediscover_delay_ms: 0,
            nearby_fetch_timeout_ms: default_nearby_fetch_timeout_ms(),
        }
    }
}

/// Parameters for the in-memory simulated world.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationSettings {
    /// Where the player starts.
    #[serde(default = "default_origin")]
    pub origin: GeoCoordinate,

    /// Number of forts scattered around the origin.
    #[serde(default = "default_fort_count")]
    pub fort_count: u32,

    /// Radius of the scatter, in meters.
    #[serde(default = "default_radius_m")]
    pub radius_m: f64,

    /// Random seed for reproducible worlds.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            fort_count: default_fort_count(),
            radius_m: default_radius_m(),
            seed: default_seed(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit one JSON object per event instead of human-readable lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_speed_kmh() -> f64 {
    50.0
}

const fn default_delay_between_catches_ms() -> u64 {
    2_000
}

const fn default_keep_min_cp() -> u32 {
    1_250
}

const fn default_keep_min_iv_percentage() -> f64 {
    95.0
}

const fn default_evolve_above_iv_value() -> f64 {
    95.0
}

const fn default_fort_visit_delay_ms() -> u64 {
    1_000
}

const fn default_catch_throttle_ms() -> u64 {
    500
}

const fn default_pass_ms() -> u64 {
    30_000
}

const fn default_recycle_item_delay_ms() -> u64 {
    500
}

const fn default_lucky_egg_settle_ms() -> u64 {
    2_000
}

const fn default_lucky_egg_window_secs() -> u64 {
    30 * 60
}

const fn default_nearby_fetch_timeout_ms() -> u64 {
    10_000
}

const fn default_origin() -> GeoCoordinate {
    GeoCoordinate::new(40.785_091, -73.968_285)
}

const fn default_fort_count() -> u32 {
    12
}

const fn default_radius_m() -> f64 {
    600.0
}

const fn default_seed() -> u64 {
    42
}

fn default_log_level() -> String {
    "info".to_owned()
}
