//! This module provides the label sets attached to resources created by the
//! Rainbond operator.
//!
//! Labels are plain key/value maps, the same shape Kubernetes uses in
//! [`ObjectMeta::labels`](k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta::labels),
//! so the returned sets can be assigned directly.

use std::collections::BTreeMap;

pub mod consts;

/// A set of Kubernetes labels.
pub type Labels = BTreeMap<String, String>;

/// Well-known labels set by the operator.
pub mod well_known {
    use super::consts::{
        ACCESS_MODE_RWO, ACCESS_MODE_RWX, ACCESS_MODES_KEY, BELONG_TO_KEY, BELONG_TO_VALUE,
    };

    /// Creates the `belongTo=rainbond-operator` label.
    pub fn belong_to_operator() -> (String, String) {
        (BELONG_TO_KEY.to_owned(), BELONG_TO_VALUE.to_owned())
    }

    pub fn access_mode_rwx() -> (String, String) {
        (ACCESS_MODES_KEY.to_owned(), ACCESS_MODE_RWX.to_owned())
    }

    pub fn access_mode_rwo() -> (String, String) {
        (ACCESS_MODES_KEY.to_owned(), ACCESS_MODE_RWO.to_owned())
    }
}

/// Common sets of labels that apply for different use-cases.
pub mod sets {
    use super::{Labels, well_known};

    /// Returns the labels for a resource created by the operator, merged with
    /// the caller supplied `labels`.
    ///
    /// The operator labels take precedence: a caller supplied label using the
    /// same key as an operator label is dropped. Every other caller label is
    /// kept as is.
    pub fn rainbond<I, K, V>(labels: I) -> Labels
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut merged = Labels::from([well_known::belong_to_operator()]);

        for (key, value) in labels {
            merged.entry(key.into()).or_insert_with(|| value.into());
        }

        merged
    }

    /// Returns the labels of a volume claim with the `ReadWriteMany` access
    /// mode.
    pub fn access_mode_rwx() -> Labels {
        Labels::from([well_known::access_mode_rwx()])
    }

    /// Returns the labels of a volume claim with the `ReadWriteOnce` access
    /// mode.
    pub fn access_mode_rwo() -> Labels {
        Labels::from([well_known::access_mode_rwo()])
    }
}
