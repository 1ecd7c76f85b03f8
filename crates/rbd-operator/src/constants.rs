//! Names and defaults shared by every component of the Rainbond operator.

use const_format::concatcp;

/// The Rainbond-specific key prefix used for node labels.
const RAINBOND_KEY_PREFIX: &str = "rainbond.io/";

/// The namespace all Rainbond system components are installed into.
pub const NAMESPACE: &str = "rbd-system";

/// Default destination path the installation package is extracted to.
pub const DEFAULT_INSTALL_PACKAGE_DEST_PATH: &str = "/tmp/DefInstallPkgDestPath";

/// Name of the singleton `RainbondCluster` resource.
pub const RAINBOND_CLUSTER_NAME: &str = "rainbondcluster";

/// Name of the singleton `RainbondPackage` resource.
pub const RAINBOND_PACKAGE_NAME: &str = "rainbondpackage";

/// The image repository used when the cluster does not configure an image hub.
pub const DEFAULT_IMAGE_REPOSITORY: &str = "goodrain.me";

/// The storage class used when the cluster does not configure one.
pub const DEFAULT_STORAGE_CLASS: &str = "rainbondsssc";

pub const GRDATA_PVC: &str = "rbd-cpt-grdata";
pub const CACHE_PVC: &str = "rbd-chaos-cache";
pub const FOOBAR_PVC: &str = "foobar";

/// Node label selecting the nodes `rbd-gateway` is installed on.
pub const SPECIAL_GATEWAY_LABEL_KEY: &str = concatcp!(RAINBOND_KEY_PREFIX, "gateway");

/// Node label selecting the nodes `rbd-chaos` is installed on.
pub const SPECIAL_CHAOS_LABEL_KEY: &str = concatcp!(RAINBOND_KEY_PREFIX, "chaos");

pub const DEFAULT_HTTP_DOMAIN_SUFFIX: &str = "grapps.cn";

pub const ALIYUN_CSI_DISK_PLUGIN: &str = "aliyun-csi-disk-plugin";
pub const ALIYUN_CSI_DISK_PROVISIONER: &str = "aliyun-csi-disk-provisioner";
pub const ALIYUN_CSI_NAS_PLUGIN: &str = "aliyun-csi-nas-plugin";
pub const ALIYUN_CSI_NAS_PROVISIONER: &str = "aliyun-csi-nas-provisioner";

/// Name of the service account the operator runs as.
pub const SERVICE_ACCOUNT_NAME: &str = "rainbond-operator";

/// TCP ports `rbd-gateway` binds on every node it runs on, in the order they
/// are probed.
///
/// - `80` and `443` serve HTTP and HTTPS ingress traffic.
/// - `10254` is the health and metrics endpoint.
/// - `18080`, `8443`, `6060` and `7070` are used by the gateway internally.
pub const GATEWAY_PORTS: [u16; 7] = [80, 443, 10254, 18080, 8443, 6060, 7070];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_label_keys() {
        assert_eq!(SPECIAL_GATEWAY_LABEL_KEY, "rainbond.io/gateway");
        assert_eq!(SPECIAL_CHAOS_LABEL_KEY, "rainbond.io/chaos");
    }
}
