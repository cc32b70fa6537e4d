use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{sort_by_common_name, Country, Currency};

/// Fields requested for listing and search results.
pub const LIST_FIELDS: &str = "name,flags,cca3,capital,population";
/// Fields requested for a single-country detail lookup.
pub const DETAIL_FIELDS: &str =
    "name,cca3,population,flags,languages,capital,region,subregion,currencies,area,timezones";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryPayload {
    #[serde(default)]
    pub name: Option<NamePayload>,
    #[serde(default)]
    pub cca3: Option<String>,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default)]
    pub flags: Option<FlagsPayload>,
    /// Keyed by ISO 639-3 code; values are display names.
    #[serde(default)]
    pub languages: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub capital: Option<Vec<String>>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub subregion: Option<String>,
    /// Keyed by ISO 4217 code.
    #[serde(default)]
    pub currencies: Option<BTreeMap<String, CurrencyPayload>>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub timezones: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamePayload {
    #[serde(default)]
    pub common: Option<String>,
    #[serde(default)]
    pub official: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlagsPayload {
    #[serde(default)]
    pub png: Option<String>,
    #[serde(default)]
    pub svg: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencyPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// The alpha lookup answers with a bare object when `fields` is given and
/// with a list otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    // Listed first: with every field defaulted, a struct would also accept a
    // one-element sequence.
    Many(Vec<CountryPayload>),
    One(Box<CountryPayload>),
}

impl OneOrMany {
    pub fn into_first(self) -> Option<CountryPayload> {
        match self {
            OneOrMany::One(payload) => Some(*payload),
            OneOrMany::Many(payloads) => payloads.into_iter().next(),
        }
    }
}

pub fn normalize_country(payload: CountryPayload) -> Country {
    let defaults = Country::default();
    let name = payload.name.unwrap_or_default();
    let flags = payload.flags.unwrap_or_default();

    Country {
        code: payload.cca3.unwrap_or(defaults.code),
        common_name: non_blank(name.common).unwrap_or(defaults.common_name),
        official_name: non_blank(name.official).unwrap_or(defaults.official_name),
        population: payload.population.unwrap_or(defaults.population),
        flag_url: flags.png.or(flags.svg).unwrap_or(defaults.flag_url),
        languages: payload
            .languages
            .map(|languages| languages.into_values().collect())
            .unwrap_or(defaults.languages),
        capital: payload
            .capital
            .and_then(|capitals| capitals.into_iter().next())
            .and_then(|capital| non_blank(Some(capital)))
            .unwrap_or(defaults.capital),
        region: non_blank(payload.region).unwrap_or(defaults.region),
        subregion: non_blank(payload.subregion).unwrap_or(defaults.subregion),
        currencies: payload
            .currencies
            .map(|currencies| currencies.into_values().map(normalize_currency).collect())
            .unwrap_or(defaults.currencies),
        area: payload
            .area
            .filter(|area| area.is_finite() && *area >= 0.0)
            .unwrap_or(defaults.area),
        timezones: payload.timezones.unwrap_or(defaults.timezones),
    }
}

/// Normalizes a listing payload and orders it by display name.
pub fn normalize_countries(payloads: Vec<CountryPayload>) -> Vec<Country> {
    let mut countries: Vec<Country> = payloads.into_iter().map(normalize_country).collect();
    sort_by_common_name(&mut countries);
    countries
}

fn normalize_currency(payload: CurrencyPayload) -> Currency {
    let defaults = Currency::default();
    Currency {
        name: non_blank(payload.name).unwrap_or(defaults.name),
        symbol: payload.symbol.unwrap_or(defaults.symbol),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
