use std::time::Duration;

use rbd_operator::{
    crd::{K8sNode, RainbondCluster},
    network::{NodeFilter, NodeFilterConfig, NodeVerdict, UnreachablePolicy},
};
use tokio::net::TcpListener;

async fn listen(address: &str) -> (TcpListener, u16) {
    let listener = TcpListener::bind((address, 0))
        .await
        .expect("failed to bind listener");
    let port = listener
        .local_addr()
        .expect("listener must have a local address")
        .port();
    (listener, port)
}

/// Returns a port nothing listens on, on any loopback address.
async fn free_port() -> u16 {
    let (_, port) = listen("127.0.0.1").await;
    port
}

fn cluster(nodes: &[(&str, &str)]) -> RainbondCluster {
    let nodes_yaml: String = nodes
        .iter()
        .map(|(name, ip)| format!("    - name: {name}\n      internalIP: {ip}\n"))
        .collect();

    serde_yaml::from_str(&format!(
        "apiVersion: rainbond.io/v1alpha1
kind: RainbondCluster
metadata:
  name: rainbondcluster
  namespace: rbd-system
spec:
  nodesForGateway:
{nodes_yaml}"
    ))
    .expect("cluster must deserialize")
}

// Binding to 127.0.0.2 requires the whole 127.0.0.0/8 block to be routed to
// the loopback interface, which is the case on Linux.
#[cfg(target_os = "linux")]
#[tokio::test]
async fn node_with_listener_is_excluded() {
    let (_listener, occupied) = listen("127.0.0.2").await;
    let config =
        NodeFilterConfig::with_required_ports([free_port().await, free_port().await, occupied]);
    let filter = NodeFilter::new(config).expect("config must be valid");

    let cluster = cluster(&[
        ("node-1", "127.0.0.1"),
        ("node-2", "127.0.0.2"),
        ("node-3", "127.0.0.3"),
    ]);
    let nodes = &cluster.spec.nodes_for_gateway;

    let available = filter.filter(nodes).await;

    assert_eq!(available, [&nodes[0], &nodes[2]]);
}

#[tokio::test]
async fn all_clear_keeps_input() {
    let config = NodeFilterConfig::with_required_ports([free_port().await, free_port().await]);
    let filter = NodeFilter::new(config).expect("config must be valid");
    let nodes = vec![
        K8sNode::new("node-1", "127.0.0.1"),
        K8sNode::new("node-2", "localhost"),
    ];

    let available = filter.filter(&nodes).await;

    assert_eq!(available, nodes.iter().collect::<Vec<_>>());
}

#[tokio::test]
async fn unreachable_node_depends_on_policy() {
    let (_listener, occupied) = listen("127.0.0.1").await;
    let nodes = vec![
        K8sNode::new("reachable", "127.0.0.1"),
        // Reserved for documentation (RFC 5737), never answers
        K8sNode::new("unreachable", "192.0.2.1"),
        K8sNode::new("malformed", "not-an-ip:80"),
    ];

    let assume_free = NodeFilterConfig {
        required_ports: vec![occupied],
        connect_timeout: Duration::from_millis(200),
        ..Default::default()
    };
    let verdicts = NodeFilter::new(assume_free.clone())
        .expect("config must be valid")
        .evaluate(&nodes)
        .await;
    assert_eq!(
        verdicts,
        [
            (&nodes[0], NodeVerdict::PortOccupied { port: occupied }),
            (&nodes[1], NodeVerdict::Available),
            (&nodes[2], NodeVerdict::Available),
        ]
    );

    let assume_occupied = NodeFilterConfig {
        unreachable_policy: UnreachablePolicy::AssumeOccupied,
        ..assume_free
    };
    let available = NodeFilter::new(assume_occupied)
        .expect("config must be valid")
        .filter(&nodes)
        .await;
    assert!(available.is_empty());
}
