use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The tenant organizations served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Company {
    EcoSoul,
    ThriveBrands,
}

impl Company {
    pub const ALL: [Company; 2] = [Company::EcoSoul, Company::ThriveBrands];

    /// Value sent in the `company` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EcoSoul => "EcoSoul",
            Self::ThriveBrands => "ThriveBrands",
        }
    }

    /// URL slug, as used by the web console routes.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::EcoSoul => "ecosoul",
            Self::ThriveBrands => "thrive-brands",
        }
    }

    pub(crate) fn employees_path(&self) -> &'static str {
        match self {
            Self::EcoSoul => "/employee/getEcoSoulEmployees",
            Self::ThriveBrands => "/employee/getThriveBrandsEmployees",
        }
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Company {
    type Err = String;

    /// Accepts the display name or the slug, ignoring case, spaces, `-` and `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "ecosoul" => Ok(Self::EcoSoul),
            "thrivebrands" => Ok(Self::ThriveBrands),
            _ => Err(format!(
                "unknown company '{s}' (expected one of: ecosoul, thrive-brands)"
            )),
        }
    }
}
