//! Custom resources of the Rainbond operator, limited to the fields the
//! helpers in this crate read.

pub mod cluster;

pub use cluster::{ImageHub, K8sNode, RainbondCluster, RainbondClusterSpec};
