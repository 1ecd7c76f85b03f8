use clap::Parser;
use rbd_operator::{
    cli::NodeFilterOptions,
    logging,
    network::{NodeFilter, NodeFilterConfig, node_filter},
};
use snafu::{ResultExt, Snafu};

const APP_NAME: &str = "rbd-gateway-nodes";

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to initialize logging"))]
    InitLogging { source: logging::Error },

    #[snafu(display("invalid node filter configuration"))]
    InvalidConfig { source: node_filter::Error },
}

/// Prints the nodes rbd-gateway can be installed on, i.e. the nodes where none
/// of the gateway ports is in use.
#[derive(Debug, Parser)]
#[command(name = APP_NAME, author, version, about)]
struct Opts {
    /// Addresses (IP address or hostname) of the candidate nodes.
    #[arg(required = true)]
    addresses: Vec<String>,

    /// Print every node together with the reason it was kept or excluded,
    /// instead of only the available nodes.
    #[arg(long)]
    verdicts: bool,

    #[command(flatten)]
    node_filter: NodeFilterOptions,
}

#[snafu::report]
#[tokio::main]
async fn main() -> Result<(), Error> {
    let opts = Opts::parse();

    logging::initialize_logging("RBD_GATEWAY_NODES_LOG", APP_NAME).context(InitLoggingSnafu)?;

    let config = NodeFilterConfig::try_from(opts.node_filter).context(InvalidConfigSnafu)?;
    tracing::debug!(?config, "probing gateway ports");
    let filter = NodeFilter::new(config).context(InvalidConfigSnafu)?;

    if opts.verdicts {
        for (address, verdict) in filter.evaluate(&opts.addresses).await {
            println!("{address}\t{verdict}");
        }
    } else {
        for address in filter.filter(&opts.addresses).await {
            println!("{address}");
        }
    }

    Ok(())
}
