use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Regions offered by the region selector, in display order.
pub const REGIONS: &[&str] = &["Africa", "Americas", "Asia", "Europe", "Oceania"];

/// One country record as served by the REST Countries v3.1 API.
///
/// Only `code`, `name.common`, `region` and `languages` drive filtering.
/// Everything else is display payload and defaults when the API omits it,
/// which it does whenever a request restricts `fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Country {
    #[serde(rename = "cca3")]
    pub code: String,
    pub name: CountryName,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub languages: Option<BTreeMap<String, String>>,
    pub population: u64,
    pub capital: Vec<String>,
    pub tld: Vec<String>,
    pub currencies: BTreeMap<String, Currency>,
    pub borders: Vec<String>,
    pub flags: Flags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryName {
    pub common: String,
    pub official: String,
    #[serde(rename = "nativeName")]
    pub native_name: BTreeMap<String, NativeName>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeName {
    pub common: String,
    pub official: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Currency {
    pub name: String,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flags {
    pub png: Option<String>,
    pub svg: Option<String>,
    pub alt: Option<String>,
}

impl Country {
    pub fn common_name(&self) -> &str {
        &self.name.common
    }

    pub fn capital(&self) -> &str {
        self.capital.first().map(String::as_str).unwrap_or("N/A")
    }

    pub fn tld(&self) -> &str {
        self.tld.first().map(String::as_str).unwrap_or("N/A")
    }

    /// First native common name, keyed by language code.
    pub fn native_name(&self) -> Option<&str> {
        self.name
            .native_name
            .values()
            .next()
            .map(|name| name.common.as_str())
    }

    pub fn currency_names(&self) -> String {
        self.currencies
            .values()
            .map(|currency| currency.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn language_names(&self) -> Vec<&str> {
        self.languages
            .iter()
            .flat_map(|languages| languages.values())
            .map(String::as_str)
            .collect()
    }

    pub fn speaks(&self, language: &str) -> bool {
        self.languages
            .as_ref()
            .is_some_and(|languages| languages.values().any(|name| name == language))
    }

    pub fn flag(&self) -> Option<&str> {
        self.flags.svg.as_deref().or(self.flags.png.as_deref())
    }
}

/// Formats a population with comma thousands separators.
pub fn format_population(population: u64) -> String {
    let digits = population.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
