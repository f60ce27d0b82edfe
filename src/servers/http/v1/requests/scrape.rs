//! `Scrape` request for the HTTP tracker.
use bittrack_primitives::info_hash::InfoHash;
use thiserror::Error;

use crate::servers::http::percent_encoding::percent_decode_info_hash;
use crate::servers::http::v1::query::Query;

const INFO_HASH: &str = "info_hash";

/// The `scrape` request after validation.
#[derive(Debug, PartialEq, Eq)]
pub struct Scrape {
    pub info_hash: InfoHash,
}

/// A validation failure. The display form is the exact `failure reason`
/// message sent to the client.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseScrapeError {
    #[error("Invalid get parameters; Missing: {params}")]
    MissingParams { params: String },
    #[error("Invalid length of info_hash.")]
    InvalidInfoHashLength,
}

impl TryFrom<&Query> for Scrape {
    type Error = ParseScrapeError;

    fn try_from(query: &Query) -> Result<Self, Self::Error> {
        let Some(raw_param) = query.get_param(INFO_HASH) else {
            return Err(ParseScrapeError::MissingParams {
                params: INFO_HASH.to_owned(),
            });
        };

        let info_hash =
            percent_decode_info_hash(&raw_param).map_err(|_| ParseScrapeError::InvalidInfoHashLength)?;

        Ok(Self { info_hash })
    }
}

#[cfg(test)]
mod tests {
    use super::Scrape;
    use crate::servers::http::v1::query::Query;

    #[test]
    fn it_should_parse_a_scrape_request() {
        let query = Query::from(vec![("info_hash", "%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0")]);

        let scrape = Scrape::try_from(&query).unwrap();

        assert_eq!(
            scrape.info_hash,
            "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse().unwrap()
        );
    }

    #[test]
    fn it_should_fail_when_the_info_hash_is_missing() {
        let query = Query::from(vec![("peer_id", "-qB00000000000000001")]);

        assert_eq!(
            Scrape::try_from(&query).unwrap_err().to_string(),
            "Invalid get parameters; Missing: info_hash"
        );
    }

    #[test]
    fn it_should_fail_when_the_info_hash_has_the_wrong_length() {
        let query = Query::from(vec![("info_hash", "abc")]);

        assert_eq!(
            Scrape::try_from(&query).unwrap_err().to_string(),
            "Invalid length of info_hash."
        );
    }
}
