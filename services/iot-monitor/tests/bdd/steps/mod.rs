//! BDD step definitions for the IoT monitor

pub mod dashboard_steps;
pub mod reducer_steps;
pub mod subscriber_steps;
