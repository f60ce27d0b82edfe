//! `Scrape` response for the HTTP tracker.
use std::collections::BTreeMap;

use bittrack_bencode::{ben_int, ben_map, Value};

use crate::core::ScrapeData;

/// The bencoded `scrape` response: one entry per scraped torrent, keyed by
/// the raw 20 infohash bytes.
///
/// ```rust
/// use bittrack::core::ScrapeData;
/// use bittrack::servers::http::v1::responses::scrape::Bencoded;
/// use bittrack_primitives::info_hash::InfoHash;
/// use bittrack_primitives::swarm_metadata::SwarmMetadata;
///
/// let info_hash = InfoHash([0x69; 20]);
/// let mut scrape_data = ScrapeData::empty();
/// scrape_data.add_file(
///     &info_hash,
///     SwarmMetadata {
///         complete: 1,
///         downloaded: 2,
///         incomplete: 3,
///     },
/// );
///
/// let body = Bencoded::from(scrape_data).body();
///
/// let expected = b"d5:filesd20:iiiiiiiiiiiiiiiiiiiid8:completei1e10:downloadedi2e10:incompletei3eeee";
/// assert_eq!(body, expected.to_vec());
/// ```
#[derive(Debug, PartialEq, Eq, Default)]
pub struct Bencoded {
    scrape_data: ScrapeData,
}

impl Bencoded {
    /// Returns the bencoded representation of the scrape data.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        let mut files = BTreeMap::new();

        for (info_hash, metadata) in &self.scrape_data.files {
            files.insert(
                info_hash.bytes().to_vec(),
                ben_map! {
                    "complete" => ben_int!(i64::from(metadata.complete)),
                    "downloaded" => ben_int!(i64::from(metadata.downloaded)),
                    "incomplete" => ben_int!(i64::from(metadata.incomplete)),
                },
            );
        }

        ben_map! {
            "files" => Value::Dict(files),
        }
        .encode()
    }
}

impl From<ScrapeData> for Bencoded {
    fn from(scrape_data: ScrapeData) -> Self {
        Self { scrape_data }
    }
}
