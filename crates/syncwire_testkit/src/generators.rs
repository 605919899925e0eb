//! Property-based test generators using proptest.
//!
//! Provides strategies for generating options, URLs and payloads, including
//! ill-typed payloads that standardization must discard.

use proptest::prelude::*;
use serde_json::{json, Value};
use syncwire_core::{Headers, OperationType, Options, Params};

/// Strategy for generating query-string or header keys.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}").expect("Invalid regex")
}

/// Strategy for generating unencoded parameter values.
pub fn param_value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 ,.-]{0,16}").expect("Invalid regex")
}

/// Strategy for generating parameter maps with distinct keys.
pub fn params_strategy() -> impl Strategy<Value = Params> {
    prop::collection::vec((key_strategy(), param_value_strategy()), 0..6)
        .prop_map(|pairs| pairs.into_iter().collect())
}

/// Strategy for generating header maps.
pub fn headers_strategy() -> impl Strategy<Value = Headers> {
    prop::collection::vec(
        (
            prop::string::string_regex("X-[A-Z][a-z]{1,8}").expect("Invalid regex"),
            param_value_strategy(),
        ),
        0..4,
    )
    .prop_map(|pairs| pairs.into_iter().collect())
}

/// Strategy for generating base URLs without a query string.
pub fn base_url_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(key_strategy(), 1..4).prop_map(|segments| {
        let mut url = String::new();
        for segment in segments {
            url.push('/');
            url.push_str(&segment);
        }
        url
    })
}

/// Strategy for generating JSON objects.
pub fn json_object_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec((key_strategy(), any::<i32>()), 0..5).prop_map(|pairs| {
        let map: serde_json::Map<String, Value> =
            pairs.into_iter().map(|(k, v)| (k, json!(v))).collect();
        Value::Object(map)
    })
}

/// Strategy for generating payloads of any JSON kind.
pub fn payload_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => json_object_strategy(),
        1 => Just(Value::Null),
        1 => any::<bool>().prop_map(Value::Bool),
        1 => any::<i64>().prop_map(|n| json!(n)),
        1 => param_value_strategy().prop_map(Value::String),
        1 => prop::collection::vec(any::<u8>(), 0..4).prop_map(|v| json!(v)),
    ]
}

/// Strategy for generating operations.
pub fn operation_strategy() -> impl Strategy<Value = OperationType> {
    prop::sample::select(OperationType::ALL.to_vec())
}

/// Strategy for generating options with any subset of fields present.
pub fn options_strategy() -> impl Strategy<Value = Options> {
    (
        prop::option::of(payload_strategy()),
        prop::option::of(prop::sample::select(vec!["json", "text", "xml"])),
        prop::option::of(prop::sample::select(vec![
            "application/json",
            "text/plain",
            "application/x-www-form-urlencoded",
        ])),
        prop::option::of(params_strategy()),
        prop::option::of(headers_strategy()),
    )
        .prop_map(|(data, data_type, content_type, params, headers)| Options {
            data,
            data_type: data_type.map(String::from),
            content_type: content_type.map(String::from),
            params,
            headers,
            url: None,
        })
}

/// Case budget for a block of property tests.
///
/// `quick` suits properties over a single pure function; `thorough` suits
/// properties that chain several pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropTestConfig {
    /// Generated cases per property.
    pub cases: u32,
    /// Upper bound on shrinking steps after a failure.
    pub max_shrink_iters: u32,
}

impl PropTestConfig {
    /// A small budget for cheap, single-stage properties.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 64,
            max_shrink_iters: 256,
        }
    }

    /// A large budget for properties spanning several stages.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 512,
            max_shrink_iters: 4096,
        }
    }

    /// Overrides the number of cases.
    #[must_use]
    pub fn with_cases(mut self, cases: u32) -> Self {
        self.cases = cases;
        self
    }

    /// Builds the proptest runner configuration.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig::from(*self)
    }
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self::quick()
    }
}

impl From<PropTestConfig> for ProptestConfig {
    fn from(config: PropTestConfig) -> Self {
        ProptestConfig {
            cases: config.cases,
            max_shrink_iters: config.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budgets_map_onto_runner_config() {
        let runner = PropTestConfig::thorough().with_cases(7).to_proptest_config();
        assert_eq!(runner.cases, 7);
        assert_eq!(runner.max_shrink_iters, PropTestConfig::thorough().max_shrink_iters);
        assert!(PropTestConfig::quick().cases < PropTestConfig::thorough().cases);
        assert_eq!(PropTestConfig::default(), PropTestConfig::quick());
    }

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn base_urls_have_no_query(url in base_url_strategy()) {
            prop_assert!(url.starts_with('/'));
            prop_assert!(!url.contains('?'));
        }

        #[test]
        fn object_strategy_yields_objects(value in json_object_strategy()) {
            prop_assert!(value.is_object());
        }

        #[test]
        fn params_have_plain_keys(params in params_strategy()) {
            for key in params.keys() {
                prop_assert!(!key.is_empty());
                prop_assert!(!key.contains('='));
            }
        }
    }
}
