use serde::Deserialize;
use thiserror::Error;

use crate::record::SourceRecord;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network or HTTP request error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Details payload has an empty collection")]
    EmptyCollection,
}

/// Source of preprint metadata, keyed by (source server, DOI).
///
/// `Ok(None)` means the service answered with a non-success status; the
/// caller decides what to do with the identifier.
pub trait FetchRecords {
    fn fetch(
        &self,
        source_key: &str,
        external_doi: &str,
    ) -> Result<Option<SourceRecord>, FetchError>;
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    collection: Vec<SourceRecord>,
}

/// Blocking client for the bioRxiv-style details endpoint
/// (`{base_url}/{source_key}/{doi}`).
pub struct DetailsApi {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl DetailsApi {
    pub fn new(base_url: &str) -> Self {
        DetailsApi {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl FetchRecords for DetailsApi {
    fn fetch(
        &self,
        source_key: &str,
        external_doi: &str,
    ) -> Result<Option<SourceRecord>, FetchError> {
        let url = format!("{}/{}/{}", self.base_url, source_key, external_doi);
        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let details: DetailsResponse = response.json()?;
        // The collection lists revisions oldest first; the last entry is
        // the current one.
        let record = details
            .collection
            .into_iter()
            .last()
            .ok_or(FetchError::EmptyCollection)?;
        Ok(Some(record))
    }
}
