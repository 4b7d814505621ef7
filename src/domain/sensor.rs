// Sensor channel domain model
use super::telemetry::Record;
use serde::Serialize;

/// Physical sensor an anomaly can be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SensorChannel {
    #[serde(rename = "Engine RPM Sensor")]
    EngineRpm,
    #[serde(rename = "Engine Temperature Sensor")]
    EngineTemperature,
    #[serde(rename = "Engine Load Sensor")]
    EngineLoad,
    #[serde(rename = "Battery Voltage Sensor")]
    BatteryVoltage,
}

impl SensorChannel {
    /// Attribution order; ties in magnitude keep this order.
    pub const ALL: [SensorChannel; 4] = [
        SensorChannel::EngineRpm,
        SensorChannel::EngineTemperature,
        SensorChannel::EngineLoad,
        SensorChannel::BatteryVoltage,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            SensorChannel::EngineRpm => "Engine RPM Sensor",
            SensorChannel::EngineTemperature => "Engine Temperature Sensor",
            SensorChannel::EngineLoad => "Engine Load Sensor",
            SensorChannel::BatteryVoltage => "Battery Voltage Sensor",
        }
    }

    /// Residual this sensor is judged by.
    pub fn residual(self, record: &Record) -> f64 {
        match self {
            SensorChannel::EngineRpm => record.rpm_residual,
            SensorChannel::EngineTemperature => record.temp_residual,
            SensorChannel::EngineLoad => record.load_residual,
            SensorChannel::BatteryVoltage => record.voltage_residual,
        }
    }
}

impl std::fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
