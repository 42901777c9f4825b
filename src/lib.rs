//! World Explorer: browse, search and bookmark countries from the
//! REST Countries API in the terminal.

pub mod api;
pub mod app;
pub mod config;
pub mod country;
pub mod error;
pub mod filter;
pub mod logging;
pub mod picker;
pub mod session;
pub mod textarea;
pub mod ui;

pub use error::{Error, Result};
pub use filter::{CountryFilter, FilterCriteria, Selection, apply, derive_languages};
