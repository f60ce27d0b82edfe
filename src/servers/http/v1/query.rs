//! The `Query` struct used to parse and store the URL query parameters.
//!
//! Values are kept exactly as they appear on the wire, still
//! percent-encoded: `info_hash` and `peer_id` carry raw bytes that must not
//! go through a lossy UTF-8 decode, so each consumer percent-decodes its
//! own params.
use multimap::MultiMap;

type ParamName = String;
type ParamValue = String;

/// A URL query component, split into name/value pairs.
///
/// ```rust
/// use bittrack::servers::http::v1::query::Query;
///
/// let query = Query::from("port=17548&event=started");
///
/// assert_eq!(query.get_param("port").unwrap(), "17548");
/// assert_eq!(query.get_param("event").unwrap(), "started");
/// assert!(query.get_param("compact").is_none());
/// ```
#[derive(Debug, Default)]
pub struct Query {
    params: MultiMap<ParamName, ParamValue>,
}

impl Query {
    /// It returns the raw (still percent-encoded) value of a param, or
    /// `None` when the param is absent. When a param repeats, the first
    /// value wins.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<String> {
        self.params.get(name).cloned()
    }

    /// Whether the query carries the param at all, with or without a value.
    #[must_use]
    pub fn has_param(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }
}

impl From<&str> for Query {
    /// Splits a raw query string into pairs. The parse is lenient the way
    /// CGI parsers are: a fragment without `=` becomes a param with an
    /// empty value, and repeats are all kept.
    fn from(raw_query: &str) -> Self {
        let mut params: MultiMap<ParamName, ParamValue> = MultiMap::new();

        for raw_param in raw_query.trim().trim_start_matches('?').split('&') {
            if raw_param.is_empty() {
                continue;
            }
            match raw_param.split_once('=') {
                Some((name, value)) => params.insert(name.to_owned(), value.to_owned()),
                None => params.insert(raw_param.to_owned(), String::new()),
            }
        }

        Self { params }
    }
}

impl From<Vec<(&str, &str)>> for Query {
    fn from(raw_params: Vec<(&str, &str)>) -> Self {
        let mut params: MultiMap<ParamName, ParamValue> = MultiMap::new();

        for (name, value) in raw_params {
            params.insert(name.to_owned(), value.to_owned());
        }

        Self { params }
    }
}

#[cfg(test)]
mod tests {
    use super::Query;

    #[test]
    fn it_should_parse_a_query_string_into_params() {
        let query = Query::from("param1=value1&param2=value2");

        assert_eq!(query.get_param("param1").unwrap(), "value1");
        assert_eq!(query.get_param("param2").unwrap(), "value2");
    }

    #[test]
    fn it_should_return_the_first_value_of_a_repeated_param() {
        let query = Query::from("param1=value1&param1=value2");

        assert_eq!(query.get_param("param1").unwrap(), "value1");
    }

    #[test]
    fn it_should_keep_param_values_percent_encoded() {
        let query = Query::from("info_hash=%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0");

        assert_eq!(
            query.get_param("info_hash").unwrap(),
            "%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0"
        );
    }

    #[test]
    fn it_should_treat_a_bare_fragment_as_a_param_with_an_empty_value() {
        let query = Query::from("compact");

        assert!(query.has_param("compact"));
        assert_eq!(query.get_param("compact").unwrap(), "");
    }

    #[test]
    fn it_should_ignore_a_leading_question_mark_and_empty_fragments() {
        let query = Query::from("?a=1&&b=2");

        assert_eq!(query.get_param("a").unwrap(), "1");
        assert_eq!(query.get_param("b").unwrap(), "2");
    }

    #[test]
    fn it_should_be_buildable_from_name_value_pairs_for_tests() {
        let query = Query::from(vec![("port", "6881"), ("event", "stopped")]);

        assert_eq!(query.get_param("port").unwrap(), "6881");
        assert_eq!(query.get_param("event").unwrap(), "stopped");
    }
}
