//! Network helpers of the operator: TCP port probes and the gateway node
//! filter built on top of them.

pub mod node_filter;
pub mod probe;

pub use node_filter::{
    NodeFilter, NodeFilterConfig, NodeVerdict, ProbeTarget, UnreachablePolicy,
    evaluate_nodes, filter_available_nodes,
};
pub use probe::{PortProbe, ProbeResult, TcpPortProbe};
