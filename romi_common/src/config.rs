//! Controller configuration types and TOML loading.
//!
//! `ControllerConfig` is the single file loaded at startup
//! (`config/controller.toml`). Every field has a default carrying the
//! shipped firmware constants, so a missing file or empty table yields a
//! controller that runs out of the box against the simulation adapter.

use crate::consts::CYCLE_TIME_US;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

fn default_drive() -> String {
    "simulation".to_string()
}

fn default_cycle_time_us() -> u32 {
    CYCLE_TIME_US
}

// Motor electrical constants and loop gains (DRV8302 + 24 V gimbal motor).

fn default_pole_pairs() -> u32 {
    7
}
fn default_voltage_supply() -> f64 {
    24.0
}
fn default_phase_resistance() -> f64 {
    0.039
}
fn default_phase_inductance() -> f64 {
    0.000024
}
fn default_voltage_limit() -> f64 {
    20.0
}
fn default_current_limit() -> f64 {
    15.0
}
fn default_velocity_limit() -> f64 {
    15.0
}
fn default_voltage_sensor_align() -> f64 {
    6.0
}
fn default_angle_p() -> f64 {
    15.0
}
fn default_angle_d() -> f64 {
    0.1
}
fn default_velocity_p() -> f64 {
    0.1
}
fn default_velocity_i() -> f64 {
    5.0
}
fn default_velocity_filter_tf() -> f64 {
    0.02
}

// Quadrature encoder wiring.

fn default_pin_a() -> u8 {
    2
}
fn default_pin_b() -> u8 {
    3
}
fn default_resolution() -> u32 {
    2048
}

// DRV8302 power-stage pin map.

fn default_phase_a() -> u8 {
    9
}
fn default_phase_b() -> u8 {
    10
}
fn default_phase_c() -> u8 {
    11
}
fn default_enable() -> u8 {
    8
}
fn default_m_pwm() -> u8 {
    6
}
fn default_m_oc() -> u8 {
    5
}
fn default_oc_adj() -> u8 {
    7
}

/// Main configuration loaded from `controller.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Drive adapter name resolved through the drive registry.
    #[serde(default = "default_drive")]
    pub drive: String,

    /// Control cycle time in microseconds.
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,

    /// Motor electrical constants and control-loop gains.
    #[serde(default)]
    pub motor: MotorConfig,

    /// Quadrature encoder wiring.
    #[serde(default)]
    pub sensor: SensorConfig,

    /// Power-stage pin map.
    #[serde(default)]
    pub power_stage: PowerStageConfig,
}

impl ControllerConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load from a TOML file, falling back to defaults when the file is
    /// absent. Parse and validation failures still fail startup.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let config = match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::FileNotFound) => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the controller configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.drive.is_empty() {
            return Err(ConfigError::ValidationError(
                "drive name cannot be empty".to_string(),
            ));
        }
        if self.cycle_time_us == 0 {
            return Err(ConfigError::ValidationError(
                "cycle_time_us must be greater than 0".to_string(),
            ));
        }
        self.motor.validate()?;
        self.sensor.validate()?;
        self.power_stage.validate()?;
        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            drive: default_drive(),
            cycle_time_us: default_cycle_time_us(),
            motor: MotorConfig::default(),
            sensor: SensorConfig::default(),
            power_stage: PowerStageConfig::default(),
        }
    }
}

/// Motor electrical constants and control-loop gains applied by the
/// configure step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorConfig {
    /// Rotor pole-pair count.
    #[serde(default = "default_pole_pairs")]
    pub pole_pairs: u32,

    /// DC link voltage [V].
    #[serde(default = "default_voltage_supply")]
    pub voltage_supply: f64,

    /// Stator phase resistance [Ω].
    #[serde(default = "default_phase_resistance")]
    pub phase_resistance: f64,

    /// Stator phase inductance [H].
    #[serde(default = "default_phase_inductance")]
    pub phase_inductance: f64,

    /// Modulation voltage limit [V]. Must not exceed `voltage_supply`.
    #[serde(default = "default_voltage_limit")]
    pub voltage_limit: f64,

    /// Phase current limit [A].
    #[serde(default = "default_current_limit")]
    pub current_limit: f64,

    /// Shaft velocity limit [rad/s].
    #[serde(default = "default_velocity_limit")]
    pub velocity_limit: f64,

    /// Voltage used during sensor-align calibration [V].
    #[serde(default = "default_voltage_sensor_align")]
    pub voltage_sensor_align: f64,

    /// Angle loop proportional gain.
    #[serde(default = "default_angle_p")]
    pub angle_p: f64,

    /// Angle loop derivative gain.
    #[serde(default = "default_angle_d")]
    pub angle_d: f64,

    /// Velocity loop proportional gain.
    #[serde(default = "default_velocity_p")]
    pub velocity_p: f64,

    /// Velocity loop integral gain.
    #[serde(default = "default_velocity_i")]
    pub velocity_i: f64,

    /// Velocity low-pass filter time constant [s].
    #[serde(default = "default_velocity_filter_tf")]
    pub velocity_filter_tf: f64,
}

impl MotorConfig {
    /// Validate the motor configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pole_pairs == 0 {
            return Err(ConfigError::ValidationError(
                "pole_pairs must be greater than 0".to_string(),
            ));
        }
        if self.voltage_supply <= 0.0 {
            return Err(ConfigError::ValidationError(
                "voltage_supply must be greater than 0".to_string(),
            ));
        }
        if self.voltage_limit <= 0.0 || self.voltage_limit > self.voltage_supply {
            return Err(ConfigError::ValidationError(format!(
                "voltage_limit must be in (0, {}]",
                self.voltage_supply
            )));
        }
        if self.voltage_sensor_align <= 0.0 || self.voltage_sensor_align > self.voltage_limit {
            return Err(ConfigError::ValidationError(format!(
                "voltage_sensor_align must be in (0, {}]",
                self.voltage_limit
            )));
        }
        if self.current_limit <= 0.0 {
            return Err(ConfigError::ValidationError(
                "current_limit must be greater than 0".to_string(),
            ));
        }
        if self.velocity_limit <= 0.0 {
            return Err(ConfigError::ValidationError(
                "velocity_limit must be greater than 0".to_string(),
            ));
        }
        if self.phase_resistance <= 0.0 {
            return Err(ConfigError::ValidationError(
                "phase_resistance must be greater than 0".to_string(),
            ));
        }
        if self.angle_p <= 0.0 {
            return Err(ConfigError::ValidationError(
                "angle_p must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            pole_pairs: default_pole_pairs(),
            voltage_supply: default_voltage_supply(),
            phase_resistance: default_phase_resistance(),
            phase_inductance: default_phase_inductance(),
            voltage_limit: default_voltage_limit(),
            current_limit: default_current_limit(),
            velocity_limit: default_velocity_limit(),
            voltage_sensor_align: default_voltage_sensor_align(),
            angle_p: default_angle_p(),
            angle_d: default_angle_d(),
            velocity_p: default_velocity_p(),
            velocity_i: default_velocity_i(),
            velocity_filter_tf: default_velocity_filter_tf(),
        }
    }
}

/// Quadrature encoder wiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Encoder channel A pin.
    #[serde(default = "default_pin_a")]
    pub pin_a: u8,

    /// Encoder channel B pin.
    #[serde(default = "default_pin_b")]
    pub pin_b: u8,

    /// Encoder pulses per revolution. Quadrature decoding yields
    /// `4 × resolution` counts per revolution.
    #[serde(default = "default_resolution")]
    pub resolution: u32,
}

impl SensorConfig {
    /// Counts per mechanical revolution after quadrature decoding.
    #[inline]
    pub const fn counts_per_rev(&self) -> u32 {
        self.resolution * 4
    }

    /// Validate the sensor configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution == 0 {
            return Err(ConfigError::ValidationError(
                "sensor resolution must be greater than 0".to_string(),
            ));
        }
        if self.pin_a == self.pin_b {
            return Err(ConfigError::ValidationError(format!(
                "sensor pins A and B must differ (both {})",
                self.pin_a
            )));
        }
        Ok(())
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            pin_a: default_pin_a(),
            pin_b: default_pin_b(),
            resolution: default_resolution(),
        }
    }
}

/// DRV8302 power-stage pin map claimed by the setup step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerStageConfig {
    /// Phase A PWM pin.
    #[serde(default = "default_phase_a")]
    pub phase_a: u8,

    /// Phase B PWM pin.
    #[serde(default = "default_phase_b")]
    pub phase_b: u8,

    /// Phase C PWM pin.
    #[serde(default = "default_phase_c")]
    pub phase_c: u8,

    /// Gate driver enable pin.
    #[serde(default = "default_enable")]
    pub enable: u8,

    /// PWM mode select pin (3-PWM when high).
    #[serde(default = "default_m_pwm")]
    pub m_pwm: u8,

    /// Over-current mode pin (cycle-by-cycle limiting when low).
    #[serde(default = "default_m_oc")]
    pub m_oc: u8,

    /// Over-current threshold adjust pin.
    #[serde(default = "default_oc_adj")]
    pub oc_adj: u8,
}

impl PowerStageConfig {
    /// Validate the power-stage configuration. All seven pins must be
    /// distinct.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pins = [
            self.phase_a,
            self.phase_b,
            self.phase_c,
            self.enable,
            self.m_pwm,
            self.m_oc,
            self.oc_adj,
        ];
        let mut seen = std::collections::HashSet::new();
        for pin in pins {
            if !seen.insert(pin) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate power-stage pin: {pin}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PowerStageConfig {
    fn default() -> Self {
        Self {
            phase_a: default_phase_a(),
            phase_b: default_phase_b(),
            phase_c: default_phase_c(),
            enable: default_enable(),
            m_pwm: default_m_pwm(),
            m_oc: default_m_oc(),
            oc_adj: default_oc_adj(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_controller_config_default() {
        let config = ControllerConfig::default();
        assert_eq!(config.drive, "simulation");
        assert_eq!(config.cycle_time_us, CYCLE_TIME_US);
        assert_eq!(config.motor.pole_pairs, 7);
        assert_eq!(config.sensor.counts_per_rev(), 8192);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_cycle_time_zero() {
        let mut config = ControllerConfig::default();
        config.cycle_time_us = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_drive_name() {
        let mut config = ControllerConfig::default();
        config.drive = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_voltage_limit_above_supply() {
        let mut config = ControllerConfig::default();
        config.motor.voltage_limit = config.motor.voltage_supply + 1.0;
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_align_voltage_above_limit() {
        let mut config = ControllerConfig::default();
        config.motor.voltage_sensor_align = config.motor.voltage_limit + 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_pole_pairs() {
        let mut config = ControllerConfig::default();
        config.motor.pole_pairs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_sensor_pins_must_differ() {
        let mut config = ControllerConfig::default();
        config.sensor.pin_b = config.sensor.pin_a;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_duplicate_power_stage_pin() {
        let mut config = ControllerConfig::default();
        config.power_stage.oc_adj = config.power_stage.enable;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Duplicate"));
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"cycle_time_us = 500

[motor]
pole_pairs = 11
velocity_limit = 30.0
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = ControllerConfig::load(file.path()).unwrap();
        assert_eq!(config.cycle_time_us, 500);
        assert_eq!(config.motor.pole_pairs, 11);
        assert_eq!(config.motor.velocity_limit, 30.0);
        // Untouched fields keep their defaults.
        assert_eq!(config.drive, "simulation");
        assert_eq!(config.motor.voltage_supply, 24.0);
        assert_eq!(config.power_stage.enable, 8);
    }

    #[test]
    fn test_load_file_not_found() {
        let result = ControllerConfig::load(Path::new("/nonexistent/controller.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn test_load_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid toml {{{{").unwrap();

        let result = ControllerConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            ControllerConfig::load_or_default(Path::new("/nonexistent/controller.toml")).unwrap();
        assert_eq!(config.drive, "simulation");
    }

    #[test]
    fn test_load_or_default_rejects_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "cycle_time_us = 0\n").unwrap();
        file.flush().unwrap();

        let result = ControllerConfig::load_or_default(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
