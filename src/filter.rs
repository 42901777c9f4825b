//! Country filtering.
//!
//! [`apply`] and [`derive_languages`] are pure functions over a country
//! list. [`CountryFilter`] owns the list plus the current [`FilterCriteria`]
//! and recomputes the visible subset every time either one changes.

use std::collections::BTreeSet;
use std::fmt;

use crate::country::Country;

/// Label of the "no constraint" option in the region and language selectors.
pub const ALL: &str = "All";

/// One filter axis: either unconstrained or pinned to a single value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Maps a selector label back to a selection; `"All"` is the sentinel.
    pub fn from_label(label: &str) -> Self {
        if label == ALL {
            Selection::All
        } else {
            Selection::Only(label.to_string())
        }
    }

    pub fn as_label(&self) -> &str {
        match self {
            Selection::All => ALL,
            Selection::Only(value) => value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search_term: String,
    pub region: Selection,
    pub language: Selection,
}

impl FilterCriteria {
    /// The combined predicate, with the search term lower-cased up front.
    pub fn predicate(&self) -> impl Fn(&Country) -> bool + '_ {
        let term = self.search_term.to_lowercase();
        move |country: &Country| {
            if !term.is_empty() && !country.common_name().to_lowercase().contains(&term) {
                return false;
            }
            if let Selection::Only(region) = &self.region {
                if country.region.as_deref() != Some(region.as_str()) {
                    return false;
                }
            }
            if let Selection::Only(language) = &self.language {
                if !country.speaks(language) {
                    return false;
                }
            }
            true
        }
    }

    pub fn matches(&self, country: &Country) -> bool {
        self.predicate()(country)
    }
}

/// Returns `"All"` followed by every distinct language name, sorted.
pub fn derive_languages(countries: &[Country]) -> Vec<String> {
    let names: BTreeSet<&str> = countries
        .iter()
        .flat_map(|country| country.language_names())
        .collect();
    std::iter::once(ALL)
        .chain(names)
        .map(str::to_string)
        .collect()
}

/// Countries satisfying every active predicate, in input order.
pub fn apply<'a>(countries: &'a [Country], criteria: &FilterCriteria) -> Vec<&'a Country> {
    let matches = criteria.predicate();
    countries.iter().filter(|country| matches(*country)).collect()
}

fn matching_indices(countries: &[Country], criteria: &FilterCriteria) -> Vec<usize> {
    let matches = criteria.predicate();
    countries
        .iter()
        .enumerate()
        .filter(|(_, country)| matches(*country))
        .map(|(index, _)| index)
        .collect()
}

/// Stateful filter over an owned country list.
#[derive(Debug, Default)]
pub struct CountryFilter {
    countries: Vec<Country>,
    criteria: FilterCriteria,
    languages: Vec<String>,
    // Indices into `countries`, ascending.
    visible: Vec<usize>,
}

impl CountryFilter {
    pub fn new(countries: Vec<Country>) -> Self {
        let mut filter = Self::default();
        filter.set_countries(countries);
        filter
    }

    /// Replaces the source list. The language options are re-derived and a
    /// language selection that no longer exists falls back to "All".
    pub fn set_countries(&mut self, countries: Vec<Country>) {
        self.countries = countries;
        self.languages = derive_languages(&self.countries);
        if let Selection::Only(language) = &self.criteria.language {
            if !self.languages.iter().skip(1).any(|name| name == language) {
                self.criteria.language = Selection::All;
            }
        }
        self.refresh();
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.criteria.search_term = term.into();
        self.refresh();
    }

    pub fn set_region(&mut self, region: Selection) {
        self.criteria.region = region;
        self.refresh();
    }

    pub fn set_language(&mut self, language: Selection) {
        self.criteria.language = language;
        self.refresh();
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn visible(&self) -> impl ExactSizeIterator<Item = &Country> + '_ {
        self.visible.iter().map(|&index| &self.countries[index])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_at(&self, position: usize) -> Option<&Country> {
        self.visible
            .get(position)
            .map(|&index| &self.countries[index])
    }

    fn refresh(&mut self) {
        self.visible = matching_indices(&self.countries, &self.criteria);
    }
}
