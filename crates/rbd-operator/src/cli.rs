//! Command line options of the gateway node filter.
//!
//! ```no_run
//! use clap::Parser;
//! use rbd_operator::{cli::NodeFilterOptions, network::NodeFilterConfig};
//!
//! #[derive(clap::Parser)]
//! struct Opts {
//!     #[command(flatten)]
//!     node_filter: NodeFilterOptions,
//! }
//!
//! # fn main() -> Result<(), rbd_operator::network::node_filter::Error> {
//! let opts = Opts::parse();
//! let config = NodeFilterConfig::try_from(opts.node_filter)?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use clap::Args;

use crate::{
    constants::GATEWAY_PORTS,
    network::node_filter::{Error, NodeFilterConfig, UnreachablePolicy},
};

#[derive(Debug, PartialEq, Eq, Args)]
#[command(next_help_heading = "Gateway Node Filter Options")]
pub struct NodeFilterOptions {
    /// Comma separated TCP ports which must be free on a node before the
    /// gateway can be installed on it. Probed in the given order.
    #[arg(long, env, value_delimiter = ',', default_values_t = GATEWAY_PORTS)]
    pub gateway_ports: Vec<u16>,

    /// Timeout of a single connect probe, e.g. `500ms` or `2s`.
    #[arg(long, env, default_value = "1s", value_parser = humantime::parse_duration)]
    pub probe_timeout: Duration,

    /// How many nodes are probed at the same time.
    #[arg(long, env, default_value_t = NodeFilterConfig::DEFAULT_MAX_CONCURRENT_NODES)]
    pub probe_concurrency: usize,

    /// How a port which could not be probed (timeout, unreachable host) is
    /// interpreted.
    #[arg(long, env, value_enum, default_value_t)]
    pub unreachable_policy: UnreachablePolicy,

    /// How often a probe which could not reach the node is repeated.
    #[arg(long, env, default_value_t = 0)]
    pub unreachable_retries: u32,

    /// Overall time budget for probing all nodes. Nodes which are not fully
    /// probed in time are excluded.
    #[arg(long, env, value_parser = humantime::parse_duration)]
    pub filter_deadline: Option<Duration>,
}

impl TryFrom<NodeFilterOptions> for NodeFilterConfig {
    type Error = Error;

    fn try_from(options: NodeFilterOptions) -> Result<Self, Self::Error> {
        let NodeFilterOptions {
            gateway_ports,
            probe_timeout,
            probe_concurrency,
            unreachable_policy,
            unreachable_retries,
            filter_deadline,
        } = options;

        let config = Self {
            required_ports: gateway_ports,
            connect_timeout: probe_timeout,
            max_concurrent_nodes: probe_concurrency,
            unreachable_policy,
            unreachable_retries,
            deadline: filter_deadline,
        };

        config.validate()?;
        Ok(config)
    }
}
