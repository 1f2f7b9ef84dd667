//! Declarative catalog of Ilkbyte API operations.
//!
//! # Design
//! Every remote operation is a GET of a resource path with a set of query
//! parameters. Each variant of `Operation` holds the arguments of one
//! operation; `resource` and `params` turn it into the path and the wire
//! parameters. `Ilkbyte::invoke` is the only code that executes them.

use crate::params::Params;
use crate::types::{CreateServer, CronSchedule, DnsRecord, PowerAction};

/// One remote operation with its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    GetAccount,
    GetUsers,
    GetAllServers { page: u32 },
    GetActiveServers { page: u32 },
    GetPlans,
    CreateServer(&'a CreateServer),
    GetServer { server: &'a str },
    SetPower { server: &'a str, action: PowerAction },
    GetIps { server: &'a str },
    GetIpLogs { server: &'a str },
    SetIpRdns { server: &'a str, ip: &'a str, rdns: &'a str },
    GetSnapshots { server: &'a str },
    CreateSnapshot { server: &'a str },
    RestoreSnapshot { server: &'a str, snapshot: &'a str },
    UpdateSnapshot { server: &'a str, snapshot: &'a str },
    DeleteSnapshot { server: &'a str, snapshot: &'a str },
    SetCron { server: &'a str, schedule: &'a CronSchedule },
    DeleteCron { server: &'a str, cron: &'a str },
    GetBackups { server: &'a str },
    RestoreBackup { server: &'a str, backup: &'a str },
    GetDomains { page: u32 },
    CreateDomain { domain: &'a str, server: &'a str, ipv6: bool },
    GetDomain { domain: &'a str },
    AddDnsRecord { domain: &'a str, record: &'a DnsRecord },
    UpdateDnsRecord { domain: &'a str, record_id: u64, content: &'a str, priority: u32 },
    DeleteDnsRecord { domain: &'a str, record_id: u64 },
    DnsPush { domain: &'a str },
}

impl Operation<'_> {
    /// Resource path below the host. Identifiers are interpolated as given.
    pub fn resource(&self) -> String {
        match *self {
            Self::GetAccount => "account".to_string(),
            Self::GetUsers => "account/users".to_string(),
            Self::GetAllServers { .. } => "server/list/all".to_string(),
            Self::GetActiveServers { .. } => "server/list".to_string(),
            Self::GetPlans => "server/create".to_string(),
            Self::CreateServer(_) => "server/create/config".to_string(),
            Self::GetServer { server } => server_path(server, "show"),
            Self::SetPower { server, .. } => server_path(server, "power"),
            Self::GetIps { server } => server_path(server, "ip/list"),
            Self::GetIpLogs { server } => server_path(server, "ip/logs"),
            Self::SetIpRdns { server, .. } => server_path(server, "ip/rdns"),
            Self::GetSnapshots { server } => server_path(server, "snapshot"),
            Self::CreateSnapshot { server } => server_path(server, "snapshot/create"),
            Self::RestoreSnapshot { server, .. } => server_path(server, "snapshot/revert"),
            Self::UpdateSnapshot { server, .. } => server_path(server, "snapshot/update"),
            Self::DeleteSnapshot { server, .. } => server_path(server, "snapshot/delete"),
            Self::SetCron { server, .. } => server_path(server, "snapshot/cron/add"),
            Self::DeleteCron { server, .. } => server_path(server, "snapshot/cron/delete"),
            Self::GetBackups { server } => server_path(server, "backup"),
            Self::RestoreBackup { server, .. } => server_path(server, "backup/restore"),
            Self::GetDomains { .. } => "domain/list".to_string(),
            Self::CreateDomain { .. } => "domain/create".to_string(),
            Self::GetDomain { domain } => domain_path(domain, "show"),
            Self::AddDnsRecord { domain, .. } => domain_path(domain, "add"),
            Self::UpdateDnsRecord { domain, .. } => domain_path(domain, "update"),
            Self::DeleteDnsRecord { domain, .. } => domain_path(domain, "delete"),
            Self::DnsPush { domain } => domain_path(domain, "push"),
        }
    }

    /// Caller parameters under their wire names. Authentication is added
    /// later by the session.
    pub fn params(&self) -> Params {
        match *self {
            Self::GetAccount
            | Self::GetUsers
            | Self::GetPlans
            | Self::GetServer { .. }
            | Self::GetIps { .. }
            | Self::GetIpLogs { .. }
            | Self::GetSnapshots { .. }
            | Self::CreateSnapshot { .. }
            | Self::GetBackups { .. }
            | Self::GetDomain { .. }
            | Self::DnsPush { .. } => Params::new(),

            Self::GetAllServers { page }
            | Self::GetActiveServers { page }
            | Self::GetDomains { page } => Params::new().with("p", page),
            Self::CreateServer(input) => {
                let mut params = Params::new()
                    .with("username", input.username.as_str())
                    .with("name", input.name.as_str())
                    .with("os_id", input.os_id)
                    .with("app_id", input.app_id)
                    .with("package_id", input.package_id)
                    .with("sshkey", input.ssh_key.as_str());
                if let Some(password) = input.password.as_deref().filter(|p| !p.is_empty()) {
                    params.insert("password", password);
                }
                params
            }
            Self::SetPower { action, .. } => Params::new().with("set", action.as_str()),
            Self::SetIpRdns { ip, rdns, .. } => Params::new().with("ip", ip).with("rdns", rdns),
            Self::RestoreSnapshot { snapshot, .. }
            | Self::UpdateSnapshot { snapshot, .. }
            | Self::DeleteSnapshot { snapshot, .. } => Params::new().with("name", snapshot),
            Self::SetCron { schedule, .. } => Params::new()
                .with("name", schedule.name.as_str())
                .with("day", schedule.day)
                .with("hour", schedule.hour)
                .with("min", schedule.minute),
            Self::DeleteCron { cron, .. } => Params::new().with("name", cron),
            Self::RestoreBackup { backup, .. } => Params::new().with("backup_name", backup),
            Self::CreateDomain {
                domain,
                server,
                ipv6,
            } => Params::new()
                .with("domain", domain)
                .with("server", server)
                .with("ipv6", ipv6),
            Self::AddDnsRecord { record, .. } => Params::new()
                .with("record_name", record.name.as_str())
                .with("record_type", record.record_type.as_str())
                .with("record_content", record.content.as_str())
                .with("record_priority", record.priority),
            Self::UpdateDnsRecord {
                record_id,
                content,
                priority,
                ..
            } => Params::new()
                .with("record_id", record_id_value(record_id))
                .with("record_content", content)
                .with("record_priority", priority),
            Self::DeleteDnsRecord { record_id, .. } => {
                Params::new().with("record_id", record_id_value(record_id))
            }
        }
    }
}

fn server_path(server: &str, action: &str) -> String {
    format!("server/manage/{server}/{action}")
}

fn domain_path(domain: &str, action: &str) -> String {
    format!("domain/manage/{domain}/{action}")
}

// Ids above i64::MAX are sent as text.
fn record_id_value(id: u64) -> crate::params::ParamValue {
    match i64::try_from(id) {
        Ok(n) => n.into(),
        Err(_) => id.to_string().into(),
    }
}
