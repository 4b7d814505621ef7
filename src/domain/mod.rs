// Domain layer - Value types shared by every pipeline stage
pub mod diagnostic;
pub mod error;
pub mod sensor;
pub mod telemetry;
