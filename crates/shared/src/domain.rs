use serde::{Deserialize, Serialize};

pub const UNKNOWN_NAME: &str = "Unknown";
pub const MISSING_TEXT: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub name: String,
    pub symbol: String,
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            name: UNKNOWN_NAME.to_string(),
            symbol: String::new(),
        }
    }
}

/// A normalized catalog entry. Every field carries a concrete value; absent
/// remote fields are replaced by the sentinels produced by `Country::default()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub common_name: String,
    pub official_name: String,
    pub population: u64,
    pub flag_url: String,
    pub languages: Vec<String>,
    pub capital: String,
    pub region: String,
    pub subregion: String,
    pub currencies: Vec<Currency>,
    pub area: f64,
    pub timezones: Vec<String>,
}

impl Default for Country {
    fn default() -> Self {
        Self {
            code: String::new(),
            common_name: UNKNOWN_NAME.to_string(),
            official_name: UNKNOWN_NAME.to_string(),
            population: 0,
            flag_url: String::new(),
            languages: Vec::new(),
            capital: MISSING_TEXT.to_string(),
            region: MISSING_TEXT.to_string(),
            subregion: MISSING_TEXT.to_string(),
            currencies: Vec::new(),
            area: 0.0,
            timezones: Vec::new(),
        }
    }
}

/// Orders countries by display name, case-sensitive. The sort is stable so
/// entries sharing a name keep their remote order.
pub fn sort_by_common_name(countries: &mut [Country]) {
    countries.sort_by(|a, b| a.common_name.cmp(&b.common_name));
}
