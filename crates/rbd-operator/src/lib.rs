//! Shared helpers of the Rainbond operator.
//!
//! - [`network`] selects the nodes the gateway can be installed on, by probing
//!   the gateway ports on every candidate node.
//! - [`kvp`] builds the labels attached to resources created by the operator.
//! - [`crd`] contains the `RainbondCluster` resource and its defaults.
//!
//! ## Crate Features
//!
//! - `clap` (default) enables the [`cli`] options and the `rbd-gateway-nodes`
//!   binary.

#[cfg(feature = "clap")]
pub mod cli;
pub mod constants;
pub mod crd;
pub mod kvp;
pub mod logging;
pub mod network;
pub mod time;

// External re-exports
pub use k8s_openapi;
pub use kube;
