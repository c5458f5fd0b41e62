/// Node labels controlled by the mark/sweep cycle.
pub const MANAGED_LABELS: &[&str] = &[
    "Pod",
    "Deployment",
    "StatefulSet",
    "DaemonSet",
    "Service",
    "Ingress",
    "PersistentVolumeClaim",
    "ArgoApp",
    "VM",
    "Host",
    "UptimeMonitor",
    "Alert",
    "StoragePool",
    "Dataset",
    "Share",
    "StorageAlert",
    "App",
    "DNSRecord",
    "AccessPoint",
    "Switch",
    "NetworkDevice",
    "Dashboard",
    "ReverseProxy",
    "Device",
    "HAEntity",
    "TasmotaDevice",
    "CloudflareTunnel",
];

/// Labels the orphan GC never touches, regardless of connectivity or age.
pub const PROTECTED_LABELS: &[&str] =
&["Network", "Location", "Cluster", "ProxmoxNode", "NAS", "StoragePool"];

/// `(label, grace_days)` pairs; anything not listed falls through to the default tier.
pub const GRACE_TIERS: &[(&str, i64)] = &[
    ("Pod", 1),
    ("Alert", 1),
    ("Service", 7),
    ("Deployment", 7),
    ("StatefulSet", 7),
    ("DaemonSet", 7),
    ("Ingress", 7),
    ("UptimeMonitor", 7),
    ("PersistentVolumeClaim", 14),
    ("ArgoApp", 14),
    ("HAEntity", 14),
    ("Dashboard", 14),
    ("DNSRecord", 14),
    ("ReverseProxy", 14),
    ("CloudflareTunnel", 14),
    ("VM", 30),
    ("Host", 30),
    ("Device", 30),
    ("TasmotaDevice", 30),
    ("RunbookDocument", 30),
];

const DEFAULT_GRACE_DAYS: i64 = 14;

pub fn grace_days(label: &str) -> i64 {
    GRACE_TIERS
    .iter()
    .find(|(l, _)| *l == label)
    .map(|(_, days)| *days)
    .unwrap_or(DEFAULT_GRACE_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_label_uses_its_tier() {
        assert_eq!(grace_days("Pod"), 1);
        assert_eq!(grace_days("Host"), 30);
    }

    #[test]
    fn unknown_label_uses_default() {
        assert_eq!(grace_days("SomethingNew"), DEFAULT_GRACE_DAYS);
    }
}
