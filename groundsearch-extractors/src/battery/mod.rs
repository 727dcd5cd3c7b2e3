//! Battery information extraction.
//!
//! Determines whether a product contains a battery and, if it does, the
//! count, weight, type, chemistry, rechargeability, brand and how the
//! battery is fitted.
//!
//! Products without a battery produce a row with `contains_battery = No`,
//! `battery_integration = None` and every other battery column empty.

mod prompt;
mod strategy;

pub use prompt::{battery_prompt, battery_schema};
pub use strategy::BatteryInfoStrategy;
