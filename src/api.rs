use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
use crate::country::Country;
use crate::error::{Error, Result};

/// Fields requested for the browse list. The upstream rejects `/all`
/// without an explicit field list.
const LIST_FIELDS: &str = "name,cca3,capital,region,population,flags,languages";

/// Anything that can hand out country records.
pub trait CountrySource {
    fn all(&self) -> Result<Vec<Country>>;
    fn by_code(&self, code: &str) -> Result<Country>;
    fn by_codes(&self, codes: &[String]) -> Result<Vec<Country>>;
}

pub struct RestCountriesApi {
    pub client: reqwest::blocking::Client,
    pub base_url: String,
}

impl RestCountriesApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "requesting countries");
        let response = self.client.get(&url).query(query).send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            warn!(%url, %status, "country API returned an error");
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(Error::NotFound(path.to_string()));
            }
            return Err(Error::Status { status, body });
        }

        let body = response.text()?;
        serde_json::from_str(&body).map_err(|err| Error::Decode(err.to_string()))
    }
}

impl CountrySource for RestCountriesApi {
    fn all(&self) -> Result<Vec<Country>> {
        self.get("/all", &[("fields", LIST_FIELDS)])
    }

    fn by_code(&self, code: &str) -> Result<Country> {
        let countries: Vec<Country> = self.get(&format!("/alpha/{code}"), &[])?;
        countries
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(code.to_string()))
    }

    fn by_codes(&self, codes: &[String]) -> Result<Vec<Country>> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let joined = codes.join(",");
        self.get("/alpha", &[("codes", joined.as_str())])
    }
}
