use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// A standalone Proxmox host (the homelab runs unclustered hosts, not a PVE cluster).
#[derive(Debug, Clone)]
pub struct ProxmoxHostConfig {
    pub url: String,
    pub token_id: String,
    pub token_secret: String,
}

#[derive(Debug, Clone)]
pub struct TrueNasInstanceConfig {
    pub url: String,
    pub api_key: String,
}

/// A kubeconfig path, or `None` for in-cluster service account auth.
pub type KubeconfigEntry = Option<PathBuf>;

#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,

    pub mcp_servers: HashMap<String, String>,
    pub kubeconfigs: HashMap<String, KubeconfigEntry>,

    pub gatus_url: Option<String>,

    pub proxmox_hosts: HashMap<String, ProxmoxHostConfig>,
    pub truenas_instances: HashMap<String, TrueNasInstanceConfig>,

    pub openrouter_api_key: Option<String>,
    pub specialist_model: String,
    pub synthesis_model: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        let mut mcp_servers = HashMap::new();
        mcp_servers.insert(
            "infrastructure".to_string(),
            env_or("INFRASTRUCTURE_MCP_URL", "http://infrastructure-mcp:8000"),
        );
        mcp_servers.insert(
            "knowledge".to_string(),
            env_or("KNOWLEDGE_MCP_URL", "http://knowledge-mcp:8000"),
        );
        mcp_servers.insert(
            "observability".to_string(),
            env_or("OBSERVABILITY_MCP_URL", "http://observability-mcp:8000"),
        );
        mcp_servers.insert("home".to_string(), env_or("HOME_MCP_URL", "http://home-mcp:8000"));
        mcp_servers.insert("media".to_string(), env_or("MEDIA_MCP_URL", "http://media-mcp:8000"));

        let mut kubeconfigs: HashMap<String, KubeconfigEntry> = HashMap::new();
        kubeconfigs.insert("agentic".to_string(), None);
        kubeconfigs.insert(
            "prod".to_string(),
            Some(PathBuf::from(env_or("KUBECONFIG_PROD", "/kubeconfigs/prod/kubeconfig"))),
        );
        kubeconfigs.insert(
            "monit".to_string(),
            Some(PathBuf::from(env_or("KUBECONFIG_MONIT", "/kubeconfigs/monit/kubeconfig"))),
        );

        let mut proxmox_hosts = HashMap::new();
        proxmox_hosts.insert(
            "ruapehu".to_string(),
            ProxmoxHostConfig {
                url: env_or("PROXMOX_RUAPEHU_URL", "https://proxmox.kernow.io"),
                token_id: env_or("PROXMOX_RUAPEHU_TOKEN_ID", ""),
                token_secret: env_or("PROXMOX_RUAPEHU_TOKEN_SECRET", ""),
            },
        );
        proxmox_hosts.insert(
            "carrick".to_string(),
            ProxmoxHostConfig {
                url: env_or("PROXMOX_CARRICK_URL", "https://proxmox.monit.kernow.io"),
                token_id: env_or("PROXMOX_CARRICK_TOKEN_ID", ""),
                token_secret: env_or("PROXMOX_CARRICK_TOKEN_SECRET", ""),
            },
        );

        let mut truenas_instances = HashMap::new();
        truenas_instances.insert(
            "hdd".to_string(),
            TrueNasInstanceConfig {
                url: env_or("TRUENAS_HDD_URL", "https://truenas.hdd.kernow.io"),
                api_key: env_or("TRUENAS_HDD_API_KEY", ""),
            },
        );
        truenas_instances.insert(
            "media".to_string(),
            TrueNasInstanceConfig {
                url: env_or("TRUENAS_MEDIA_URL", "https://truenas.kernow.io"),
                api_key: env_or("TRUENAS_MEDIA_API_KEY", ""),
            },
        );

        Ok(Config {
            neo4j_uri: env_or("NEO4J_URI", "bolt://neo4j:7687"),
            neo4j_user: env_or("NEO4J_USER", "neo4j"),
            neo4j_password: env_or("NEO4J_PASSWORD", ""),
            mcp_servers,
            kubeconfigs,
            gatus_url: env::var("GATUS_URL").ok(),
            proxmox_hosts,
            truenas_instances,
            openrouter_api_key: env::var("OPENROUTER_API_KEY").ok(),
            specialist_model: env_or("SPECIALIST_MODEL", "google/gemini-2.0-flash-001"),
            synthesis_model: env_or("SYNTHESIS_MODEL", "google/gemini-2.0-flash-001"),
        })
    }
}

/// OPNsense DHCP interface description -> graph network name.
pub fn dhcp_network_map() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("Production", "prod"),
        ("ArtificialIntelligence", "agentic"),
        ("Monit", "monit"),
    ])
}

/// MAC OUI vendor string -> coarse device type, used by the DHCP syncer.
pub fn manufacturer_device_type() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("espressif", "iot"),
        ("google", "smart_home"),
        ("nest", "smart_home"),
        ("apple", "personal"),
        ("ubiquiti", "network"),
        ("sonos", "media"),
        ("samsung", "smart_home"),
        ("amazon", "smart_home"),
        ("hp", "printer"),
        ("brother", "printer"),
        ("intel", "compute"),
        ("dell", "compute"),
        ("lenovo", "compute"),
        ("proxmox", "hypervisor"),
    ])
}

/// Home Assistant entity domains synced into the graph.
pub const HA_SYNC_DOMAINS: &[&str] = &[
    "light",
    "switch",
    "automation",
    "binary_sensor",
    "climate",
    "cover",
    "fan",
    "lock",
    "media_player",
    "sensor",
];

/// `sensor` domain entities are further filtered to these device_classes.
pub const SENSOR_DEVICE_CLASSES: &[&str] = &["battery", "power", "temperature", "energy"];

/// DNS record name substrings that bloat the graph without operational value.
pub const DNS_NOISE_PATTERNS: &[&str] = &[
    "wpad",
    "isatap",
    "teredo",
    "_acme-challenge",
    "_dmarc",
    "_spf",
    "_mta-sts",
    "autoconfig",
    "autodiscover",
    "_domainkey",
    "_kerberos",
    "gc._msdcs",
    "domaindnszones",
    "forestdnszones",
];
