//! Selects the nodes `rbd-gateway` can be installed on.
//!
//! The gateway binds a fixed set of ports ([`GATEWAY_PORTS`]) on every node it
//! runs on, so a node where any of those ports is already taken can not host
//! it. Whether a port is taken is found out by connecting to it, see
//! [`PortProbe`].
//!
//! ```no_run
//! # use rbd_operator::{crd::K8sNode, network::node_filter::{NodeFilter, NodeFilterConfig}};
//! # async fn example() -> Result<(), rbd_operator::network::node_filter::Error> {
//! let nodes = vec![
//!     K8sNode::new("node-1", "10.0.0.1"),
//!     K8sNode::new("node-2", "10.0.0.2"),
//! ];
//!
//! let filter = NodeFilter::new(NodeFilterConfig::default())?;
//! let available = filter.filter(&nodes).await;
//! # Ok(())
//! # }
//! ```

use std::{collections::BTreeSet, fmt::Display, time::Duration};

use futures::{StreamExt, stream};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::{Snafu, ensure};
use tokio::time::Instant;
use tracing::{Level, instrument};

use crate::{
    constants::GATEWAY_PORTS,
    crd::K8sNode,
    network::probe::{PortProbe, ProbeResult, TcpPortProbe},
};

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum Error {
    #[snafu(display("the list of required ports must not be empty"))]
    EmptyPortList,

    #[snafu(display("port 0 can not be probed"))]
    InvalidPort,

    #[snafu(display("port {port} is listed more than once"))]
    DuplicatePort { port: u16 },

    #[snafu(display("at least one node must be probed at a time"))]
    ZeroConcurrency,

    #[snafu(display("the connect timeout must be greater than zero"))]
    ZeroTimeout,
}

/// Anything with an address which can be probed, typically a [`K8sNode`].
pub trait ProbeTarget {
    /// The host (IP address or hostname, without port) to probe.
    fn address(&self) -> &str;
}

impl ProbeTarget for K8sNode {
    fn address(&self) -> &str {
        &self.internal_ip
    }
}

impl ProbeTarget for String {
    fn address(&self) -> &str {
        self
    }
}

impl ProbeTarget for &str {
    fn address(&self) -> &str {
        self
    }
}

/// Decides how a probe which could not reach the node is interpreted.
///
/// A refused connection proves the port is free. A connect which times out or
/// fails otherwise proves nothing: the port might be free, or the node might
/// be down.
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[derive(Clone, Copy, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum UnreachablePolicy {
    /// Treat the port as free. Unreachable nodes are kept.
    #[default]
    AssumeFree,

    /// Treat the port as occupied. Unreachable nodes are excluded.
    AssumeOccupied,
}

/// Configuration of the gateway node filter.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFilterConfig {
    /// Ports which must be free, probed in this order.
    #[serde(default = "NodeFilterConfig::default_required_ports")]
    pub required_ports: Vec<u16>,

    /// Timeout of a single connect attempt, e.g. `500ms`.
    ///
    /// Only used to build the [`TcpPortProbe`] in [`NodeFilter::new`]. A probe
    /// passed to [`NodeFilter::with_probe`] or [`filter_available_nodes`]
    /// applies its own timeout.
    #[serde(
        default = "NodeFilterConfig::default_connect_timeout",
        with = "crate::time::duration"
    )]
    #[schemars(with = "String")]
    pub connect_timeout: Duration,

    /// How many nodes are probed at the same time. The ports of a single node
    /// are always probed one after another.
    #[serde(default = "NodeFilterConfig::default_max_concurrent_nodes")]
    pub max_concurrent_nodes: usize,

    #[serde(default)]
    pub unreachable_policy: UnreachablePolicy,

    /// How often an unreachable probe is repeated before the
    /// [`UnreachablePolicy`] is applied.
    #[serde(default)]
    pub unreachable_retries: u32,

    /// Overall time budget. Nodes which are not fully evaluated once it is
    /// used up are excluded.
    #[serde(default, with = "crate::time::option_duration")]
    #[schemars(with = "Option<String>")]
    pub deadline: Option<Duration>,
}

impl Default for NodeFilterConfig {
    fn default() -> Self {
        Self {
            required_ports: Self::default_required_ports(),
            connect_timeout: Self::default_connect_timeout(),
            max_concurrent_nodes: Self::default_max_concurrent_nodes(),
            unreachable_policy: UnreachablePolicy::default(),
            unreachable_retries: 0,
            deadline: None,
        }
    }
}

impl NodeFilterConfig {
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
    pub const DEFAULT_MAX_CONCURRENT_NODES: usize = 16;

    fn default_required_ports() -> Vec<u16> {
        GATEWAY_PORTS.to_vec()
    }

    const fn default_connect_timeout() -> Duration {
        Self::DEFAULT_CONNECT_TIMEOUT
    }

    const fn default_max_concurrent_nodes() -> usize {
        Self::DEFAULT_MAX_CONCURRENT_NODES
    }

    /// Creates the default configuration, probing `required_ports` instead of
    /// the gateway ports.
    pub fn with_required_ports(required_ports: impl IntoIterator<Item = u16>) -> Self {
        Self {
            required_ports: required_ports.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        ensure!(!self.required_ports.is_empty(), EmptyPortListSnafu);
        ensure!(!self.required_ports.contains(&0), InvalidPortSnafu);

        let mut seen = BTreeSet::new();
        for &port in &self.required_ports {
            ensure!(seen.insert(port), DuplicatePortSnafu { port });
        }

        ensure!(self.max_concurrent_nodes > 0, ZeroConcurrencySnafu);
        ensure!(!self.connect_timeout.is_zero(), ZeroTimeoutSnafu);

        Ok(())
    }
}

/// Why a node was kept or excluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeVerdict {
    /// All required ports are free (or unreachable, with
    /// [`UnreachablePolicy::AssumeFree`]).
    Available,

    /// Something already listens on `port`.
    PortOccupied { port: u16 },

    /// `port` could not be probed and [`UnreachablePolicy::AssumeOccupied`]
    /// is in effect.
    Unreachable { port: u16 },

    /// The overall deadline passed before the node was fully evaluated.
    DeadlineExceeded,
}

impl NodeVerdict {
    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

impl Display for NodeVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => f.write_str("available"),
            Self::PortOccupied { port } => write!(f, "port {port} is occupied"),
            Self::Unreachable { port } => write!(f, "port {port} could not be probed"),
            Self::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Returns the nodes where none of the required ports is occupied, in the
/// order they were passed in.
///
/// This never fails. Nodes which can not be reached are kept or dropped
/// according to [`NodeFilterConfig::unreachable_policy`]. The connect timeout
/// is the one `probe` was built with.
#[instrument(level = Level::TRACE, skip_all, fields(nodes = nodes.len()))]
pub async fn filter_available_nodes<'a, T, P>(
    nodes: &'a [T],
    config: &NodeFilterConfig,
    probe: &P,
) -> Vec<&'a T>
where
    T: ProbeTarget + Sync,
    P: PortProbe + ?Sized,
{
    evaluate_nodes(nodes, config, probe)
        .await
        .into_iter()
        .filter_map(|(node, verdict)| verdict.is_available().then_some(node))
        .collect()
}

/// Evaluates every node and returns it together with its [`NodeVerdict`], in
/// the order they were passed in.
///
/// Up to [`NodeFilterConfig::max_concurrent_nodes`] nodes are evaluated
/// concurrently. The ports of a single node are probed in order and probing
/// stops at the first occupied one. Once the deadline passed, no further port
/// is probed and every node which is not fully evaluated yet is excluded.
pub async fn evaluate_nodes<'a, T, P>(
    nodes: &'a [T],
    config: &NodeFilterConfig,
    probe: &P,
) -> Vec<(&'a T, NodeVerdict)>
where
    T: ProbeTarget + Sync,
    P: PortProbe + ?Sized,
{
    let deadline = config.deadline.map(|deadline| Instant::now() + deadline);

    stream::iter(nodes)
        .map(move |node| async move {
            let address = node.address();
            let evaluation = evaluate_node(address, config, deadline, probe);

            let verdict = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, evaluation)
                    .await
                    .unwrap_or_else(|_| {
                        tracing::debug!(
                            node.address = address,
                            "deadline exceeded before the node was fully probed, excluding node"
                        );
                        NodeVerdict::DeadlineExceeded
                    }),
                None => evaluation.await,
            };

            (node, verdict)
        })
        // `buffered` yields results in input order, regardless of which node
        // finishes first.
        .buffered(config.max_concurrent_nodes.max(1))
        .collect()
        .await
}

async fn evaluate_node<P>(
    address: &str,
    config: &NodeFilterConfig,
    deadline: Option<Instant>,
    probe: &P,
) -> NodeVerdict
where
    P: PortProbe + ?Sized,
{
    for &port in &config.required_ports {
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            tracing::debug!(
                node.address = address,
                port,
                "deadline exceeded before the node was fully probed, excluding node"
            );
            return NodeVerdict::DeadlineExceeded;
        }

        match probe_with_retries(address, port, config.unreachable_retries, probe).await {
            ProbeResult::Free => {}
            ProbeResult::Occupied => {
                tracing::debug!(
                    node.address = address,
                    port,
                    "the port is occupied, excluding node"
                );
                return NodeVerdict::PortOccupied { port };
            }
            ProbeResult::Unreachable => match config.unreachable_policy {
                UnreachablePolicy::AssumeFree => {}
                UnreachablePolicy::AssumeOccupied => {
                    tracing::debug!(
                        node.address = address,
                        port,
                        "the port could not be probed, excluding node"
                    );
                    return NodeVerdict::Unreachable { port };
                }
            },
        }
    }

    NodeVerdict::Available
}

async fn probe_with_retries<P>(address: &str, port: u16, retries: u32, probe: &P) -> ProbeResult
where
    P: PortProbe + ?Sized,
{
    let mut result = probe.probe(address, port).await;

    for attempt in 1..=retries {
        if result != ProbeResult::Unreachable {
            break;
        }

        tracing::trace!(node.address = address, port, attempt, "retrying probe");
        result = probe.probe(address, port).await;
    }

    result
}

/// A [`NodeFilterConfig`] bundled with the probe it runs, usually a
/// [`TcpPortProbe`].
#[derive(Debug)]
pub struct NodeFilter<P = TcpPortProbe> {
    config: NodeFilterConfig,
    probe: P,
}

impl NodeFilter<TcpPortProbe> {
    /// Creates a filter probing via TCP, using the configured connect timeout.
    pub fn new(config: NodeFilterConfig) -> Result<Self, Error> {
        let probe = TcpPortProbe::new(config.connect_timeout);
        Self::with_probe(config, probe)
    }
}

impl<P> NodeFilter<P>
where
    P: PortProbe,
{
    /// Creates a filter running `probe`. [`NodeFilterConfig::connect_timeout`]
    /// is not applied to it.
    pub fn with_probe(config: NodeFilterConfig, probe: P) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { config, probe })
    }

    pub fn config(&self) -> &NodeFilterConfig {
        &self.config
    }

    /// See [`filter_available_nodes`].
    pub async fn filter<'a, T>(&self, nodes: &'a [T]) -> Vec<&'a T>
    where
        T: ProbeTarget + Sync,
    {
        filter_available_nodes(nodes, &self.config, &self.probe).await
    }

    /// See [`evaluate_nodes`].
    pub async fn evaluate<'a, T>(&self, nodes: &'a [T]) -> Vec<(&'a T, NodeVerdict)>
    where
        T: ProbeTarget + Sync,
    {
        evaluate_nodes(nodes, &self.config, &self.probe).await
    }
}
