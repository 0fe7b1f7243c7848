//! Vehicle categories offered by captains and requested by riders.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Auto,
    Car,
    #[serde(alias = "motorcycle")]
    Moto,
}

impl VehicleType {
    pub const ALL: [VehicleType; 3] = [VehicleType::Auto, VehicleType::Car, VehicleType::Moto];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Car => "car",
            Self::Moto => "moto",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "car" => Ok(Self::Car),
            "moto" | "motorcycle" => Ok(Self::Moto),
            other => Err(CoreError::Validation(format!(
                "Unknown vehicle type '{other}'. Expected one of: auto, car, moto"
            ))),
        }
    }
}

impl TryFrom<String> for VehicleType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
