//! `Announce` request for the HTTP tracker.
//!
//! Data structures and logic for parsing and validating the `announce`
//! request.
use std::net::IpAddr;
use std::str::FromStr;

use bittrack_primitives::announce_event::AnnounceEvent;
use bittrack_primitives::info_hash::InfoHash;
use bittrack_primitives::peer;
use bittrack_primitives::NumberOfBytes;
use thiserror::Error;

use crate::servers::http::percent_encoding::{percent_decode_info_hash, percent_decode_peer_id};
use crate::servers::http::v1::query::Query;

// Query param names
const INFO_HASH: &str = "info_hash";
const PEER_ID: &str = "peer_id";
const PORT: &str = "port";
const UPLOADED: &str = "uploaded";
const DOWNLOADED: &str = "downloaded";
const LEFT: &str = "left";
const EVENT: &str = "event";
const COMPACT: &str = "compact";
const NO_PEER_ID: &str = "no_peer_id";
const IP: &str = "ip";

/// Params every announce must carry, in the order missing ones are
/// reported.
const REQUIRED_PARAMS: [&str; 6] = [INFO_HASH, PEER_ID, PORT, UPLOADED, DOWNLOADED, LEFT];

/// The `announce` request after validation, with every param in its domain
/// type.
///
/// The optional `ip` param is kept as parsed; resolving the effective peer
/// IP (param, configured default or connection address) is the service's
/// job because it needs the tracker configuration.
#[derive(Debug, PartialEq, Eq)]
pub struct Announce {
    pub info_hash: InfoHash,
    pub peer_id: peer::Id,
    pub port: u16,
    pub uploaded: NumberOfBytes,
    pub downloaded: NumberOfBytes,
    pub left: NumberOfBytes,
    pub event: AnnounceEvent,
    /// `compact=1` / `compact=0`, absent when the client did not say.
    pub compact: Option<bool>,
    /// Strip the `peer id` key from dictionary-mode responses.
    pub no_peer_id: bool,
    /// The self-reported address from the `ip` param.
    pub ip: Option<IpAddr>,
}

/// A validation failure. The display form is the exact `failure reason`
/// message sent to the client.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseAnnounceError {
    #[error("Invalid get parameters; Missing: {params}")]
    MissingParams { params: String },
    #[error("Invalid length of info_hash.")]
    InvalidInfoHashLength,
    #[error("Invalid length of peer_id.")]
    InvalidPeerIdLength,
    #[error("Invalid {param} value.")]
    InvalidParamValue { param: String },
    #[error("Invalid ip address.")]
    InvalidIp,
}

impl TryFrom<&Query> for Announce {
    type Error = ParseAnnounceError;

    fn try_from(query: &Query) -> Result<Self, Self::Error> {
        check_required_params(query)?;

        Ok(Self {
            info_hash: extract_info_hash(query)?,
            peer_id: extract_peer_id(query)?,
            port: extract_port(query)?,
            uploaded: extract_number_of_bytes(UPLOADED, query)?,
            downloaded: extract_number_of_bytes(DOWNLOADED, query)?,
            left: extract_number_of_bytes(LEFT, query)?,
            event: extract_event(query),
            compact: extract_flag(COMPACT, query)?,
            no_peer_id: extract_flag(NO_PEER_ID, query)?.unwrap_or(false),
            ip: extract_ip(query)?,
        })
    }
}

fn check_required_params(query: &Query) -> Result<(), ParseAnnounceError> {
    let missing: Vec<&str> = REQUIRED_PARAMS
        .into_iter()
        .filter(|param| !query.has_param(param))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ParseAnnounceError::MissingParams {
            params: missing.join(", "),
        })
    }
}

fn extract_info_hash(query: &Query) -> Result<InfoHash, ParseAnnounceError> {
    let raw_param = query.get_param(INFO_HASH).expect("required params were checked");
    percent_decode_info_hash(&raw_param).map_err(|_| ParseAnnounceError::InvalidInfoHashLength)
}

fn extract_peer_id(query: &Query) -> Result<peer::Id, ParseAnnounceError> {
    let raw_param = query.get_param(PEER_ID).expect("required params were checked");
    percent_decode_peer_id(&raw_param).map_err(|_| ParseAnnounceError::InvalidPeerIdLength)
}

/// An unsigned decimal: digits only, no sign, no empty string.
fn parse_unsigned(param: &str, raw_param: &str) -> Result<u64, ParseAnnounceError> {
    if raw_param.is_empty() || !raw_param.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ParseAnnounceError::InvalidParamValue {
            param: param.to_owned(),
        });
    }
    raw_param.parse().map_err(|_| ParseAnnounceError::InvalidParamValue {
        param: param.to_owned(),
    })
}

fn extract_port(query: &Query) -> Result<u16, ParseAnnounceError> {
    let raw_param = query.get_param(PORT).expect("required params were checked");
    let number = parse_unsigned(PORT, &raw_param)?;
    u16::try_from(number).map_err(|_| ParseAnnounceError::InvalidParamValue {
        param: PORT.to_owned(),
    })
}

fn extract_number_of_bytes(param: &str, query: &Query) -> Result<NumberOfBytes, ParseAnnounceError> {
    let raw_param = query.get_param(param).expect("required params were checked");
    let number = parse_unsigned(param, &raw_param)?;
    let number = i64::try_from(number).map_err(|_| ParseAnnounceError::InvalidParamValue {
        param: param.to_owned(),
    })?;
    Ok(NumberOfBytes::new(number))
}

/// Unknown event values are treated like a regular (event-less) announce;
/// only the three standard events change behavior.
fn extract_event(query: &Query) -> AnnounceEvent {
    match query.get_param(EVENT).as_deref() {
        Some("started") => AnnounceEvent::Started,
        Some("stopped") => AnnounceEvent::Stopped,
        Some("completed") => AnnounceEvent::Completed,
        _ => AnnounceEvent::None,
    }
}

fn extract_flag(param: &str, query: &Query) -> Result<Option<bool>, ParseAnnounceError> {
    match query.get_param(param).as_deref() {
        None => Ok(None),
        Some("1") => Ok(Some(true)),
        Some("0") => Ok(Some(false)),
        Some(_) => Err(ParseAnnounceError::InvalidParamValue {
            param: param.to_owned(),
        }),
    }
}

fn extract_ip(query: &Query) -> Result<Option<IpAddr>, ParseAnnounceError> {
    match query.get_param(IP) {
        None => Ok(None),
        Some(raw_param) => IpAddr::from_str(&raw_param)
            .map(Some)
            .map_err(|_| ParseAnnounceError::InvalidIp),
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use bittrack_primitives::announce_event::AnnounceEvent;
    use bittrack_primitives::peer;

    use super::{Announce, ParseAnnounceError};
    use crate::servers::http::v1::query::Query;

    const ENCODED_INFO_HASH: &str = "%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0";

    fn complete_params() -> Vec<(&'static str, &'static str)> {
        vec![
            ("info_hash", ENCODED_INFO_HASH),
            ("peer_id", "-qB00000000000000001"),
            ("port", "17548"),
            ("uploaded", "1"),
            ("downloaded", "2"),
            ("left", "3"),
        ]
    }

    fn parse(params: Vec<(&str, &str)>) -> Result<Announce, ParseAnnounceError> {
        Announce::try_from(&Query::from(params))
    }

    #[test]
    fn it_should_parse_a_complete_announce_request() {
        let announce = parse(complete_params()).unwrap();

        assert_eq!(
            announce,
            Announce {
                info_hash: "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse().unwrap(),
                peer_id: peer::Id(*b"-qB00000000000000001"),
                port: 17548,
                uploaded: bittrack_primitives::NumberOfBytes::new(1),
                downloaded: bittrack_primitives::NumberOfBytes::new(2),
                left: bittrack_primitives::NumberOfBytes::new(3),
                event: AnnounceEvent::None,
                compact: None,
                no_peer_id: false,
                ip: None,
            }
        );
    }

    #[test]
    fn it_should_report_a_single_missing_param() {
        let params = complete_params()
            .into_iter()
            .filter(|(name, _)| *name != "left")
            .collect();

        assert_eq!(
            parse(params).unwrap_err().to_string(),
            "Invalid get parameters; Missing: left"
        );
    }

    #[test]
    fn it_should_report_all_missing_params_in_canonical_order() {
        let params = complete_params()
            .into_iter()
            .filter(|(name, _)| *name != "uploaded" && *name != "left")
            .collect();

        assert_eq!(
            parse(params).unwrap_err().to_string(),
            "Invalid get parameters; Missing: uploaded, left"
        );
    }

    #[test]
    fn it_should_reject_an_info_hash_that_is_not_20_bytes() {
        let mut params = complete_params();
        params[0].1 = "%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B"; // 19 bytes

        assert_eq!(parse(params).unwrap_err().to_string(), "Invalid length of info_hash.");
    }

    #[test]
    fn it_should_reject_a_peer_id_that_is_not_20_bytes() {
        let mut params = complete_params();
        params[1].1 = "-qB001";

        assert_eq!(parse(params).unwrap_err().to_string(), "Invalid length of peer_id.");
    }

    #[test]
    fn it_should_reject_a_negative_port() {
        let mut params = complete_params();
        params[2].1 = "-1";

        assert_eq!(parse(params).unwrap_err().to_string(), "Invalid port value.");
    }

    #[test]
    fn it_should_reject_a_port_above_the_16_bit_range() {
        let mut params = complete_params();
        params[2].1 = "70000";

        assert_eq!(parse(params).unwrap_err().to_string(), "Invalid port value.");
    }

    #[test]
    fn it_should_reject_non_decimal_byte_counters() {
        for (index, param) in [(3, "uploaded"), (4, "downloaded"), (5, "left")] {
            let mut params = complete_params();
            params[index].1 = "+5";

            assert_eq!(
                parse(params).unwrap_err().to_string(),
                format!("Invalid {param} value.")
            );
        }
    }

    #[test]
    fn it_should_parse_the_standard_events_and_tolerate_unknown_ones() {
        for (value, expected) in [
            ("started", AnnounceEvent::Started),
            ("stopped", AnnounceEvent::Stopped),
            ("completed", AnnounceEvent::Completed),
            ("", AnnounceEvent::None),
            ("paused", AnnounceEvent::None),
        ] {
            let mut params = complete_params();
            params.push(("event", value));

            assert_eq!(parse(params).unwrap().event, expected);
        }
    }

    #[test]
    fn it_should_parse_the_compact_and_no_peer_id_flags() {
        let mut params = complete_params();
        params.push(("compact", "1"));
        params.push(("no_peer_id", "1"));

        let announce = parse(params).unwrap();

        assert_eq!(announce.compact, Some(true));
        assert!(announce.no_peer_id);
    }

    #[test]
    fn it_should_reject_a_compact_flag_that_is_not_zero_or_one() {
        let mut params = complete_params();
        params.push(("compact", "yes"));

        assert_eq!(parse(params).unwrap_err().to_string(), "Invalid compact value.");
    }

    #[test]
    fn it_should_parse_the_optional_ip_override() {
        let mut params = complete_params();
        params.push(("ip", "192.0.2.5"));

        assert_eq!(
            parse(params).unwrap().ip,
            Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 5)))
        );
    }

    #[test]
    fn it_should_reject_an_ip_override_that_is_not_an_ip_literal() {
        let mut params = complete_params();
        params.push(("ip", "localhost"));

        assert_eq!(parse(params).unwrap_err().to_string(), "Invalid ip address.");
    }
}
