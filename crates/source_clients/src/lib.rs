//! Thin, capability-typed clients for every external source system.
//! Each client swallows its own transport failures and returns an empty
//! result rather than propagating — the owning syncer decides what an
//! empty result means.

mod kube_client;
mod proxmox;
mod tool_client;
mod truenas;

pub use kube_client::KubeClient;
pub use proxmox::{extract_lxc_ip, extract_vm_ip, ProxmoxClient, ProxmoxHost};
pub use tool_client::{extract_list, ToolClient};
pub use truenas::{unwrap_nested_numeric, TrueNasClient, TrueNasInstance};
