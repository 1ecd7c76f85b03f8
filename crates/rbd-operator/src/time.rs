//! Serde helpers to (de)serialize [`std::time::Duration`]s as human-readable
//! strings like `500ms`, `2s` or `1m 30s`, using [`humantime`].
//!
//! ```
//! # use std::time::Duration;
//! # use serde::Deserialize;
//! #[derive(Deserialize)]
//! struct Config {
//!     #[serde(with = "rbd_operator::time::duration")]
//!     timeout: Duration,
//! }
//! ```

pub mod duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&humantime::format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let input = String::deserialize(deserializer)?;
        humantime::parse_duration(&input).map_err(D::Error::custom)
    }
}

/// Same as [`duration`], but for optional durations.
pub mod option_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(duration) => {
                serializer.serialize_some(&humantime::format_duration(*duration).to_string())
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|input| humantime::parse_duration(&input).map_err(D::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
    struct Timeouts {
        #[serde(with = "super::duration")]
        connect: Duration,

        #[serde(default, with = "super::option_duration")]
        overall: Option<Duration>,
    }

    #[rstest]
    #[case(r#"{"connect": "500ms"}"#, Duration::from_millis(500), None)]
    #[case(
        r#"{"connect": "2s", "overall": "1m 30s"}"#,
        Duration::from_secs(2),
        Some(Duration::from_secs(90))
    )]
    #[case(r#"{"connect": "1s", "overall": null}"#, Duration::from_secs(1), None)]
    fn deserialize(
        #[case] input: &str,
        #[case] connect: Duration,
        #[case] overall: Option<Duration>,
    ) {
        let timeouts: Timeouts = serde_json::from_str(input).expect("input must deserialize");
        assert_eq!(timeouts, Timeouts { connect, overall });
    }

    #[test]
    fn deserialize_invalid() {
        let result = serde_json::from_str::<Timeouts>(r#"{"connect": "soon"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn serialize() {
        let timeouts = Timeouts {
            connect: Duration::from_millis(1500),
            overall: None,
        };

        assert_eq!(
            serde_json::to_string(&timeouts).expect("timeouts must serialize"),
            r#"{"connect":"1s 500ms","overall":null}"#
        );
    }
}
