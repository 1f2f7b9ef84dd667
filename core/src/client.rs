//! Typed facade over the Ilkbyte API.
//!
//! # Design
//! `Ilkbyte` holds one `Session` and nothing else. Every public method builds
//! an `Operation` and hands it to `invoke`, which performs the request,
//! rejects non-2xx statuses and parses the body as JSON. Responses are
//! returned as `serde_json::Value`; their shape is not validated.

use serde_json::Value;
use tracing::warn;

use crate::config::Credentials;
use crate::error::{ConfigError, Error, ResponseBody};
use crate::http::{Transport, UreqTransport};
use crate::operation::Operation;
use crate::session::Session;
use crate::types::{CreateServer, CronSchedule, DnsRecord, PowerAction};

/// Result of an API call made through transport `T`.
pub type ApiResult<T> = Result<Value, Error<<T as Transport>::Error>>;

/// Blocking client for the Ilkbyte API.
///
/// Cheap to share: wrap it in an `Arc` to call it from several threads.
#[derive(Debug, Clone)]
pub struct Ilkbyte<T = UreqTransport> {
    session: Session<T>,
}

impl Ilkbyte<UreqTransport> {
    /// Create a client, taking each missing value from `ILKBYTE_HOST`,
    /// `ILKBYTE_SECRET_KEY` or `ILKBYTE_ACCESS_KEY`.
    ///
    /// Fails before any connection is attempted if a value is still missing.
    pub fn new(
        host: Option<&str>,
        secret_key: Option<&str>,
        access_key: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let credentials = Credentials::resolve(host, secret_key, access_key)?;
        Ok(Self::with_transport(credentials, UreqTransport::new()))
    }

    /// Create a client configured entirely from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(None, None, None)
    }
}

impl<T: Transport> Ilkbyte<T> {
    pub fn with_transport(credentials: Credentials, transport: T) -> Self {
        Self {
            session: Session::new(credentials, transport),
        }
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Execute one catalog operation and return its JSON body.
    pub fn invoke(&self, operation: Operation<'_>) -> ApiResult<T> {
        let resource = operation.resource();
        let response = self
            .session
            .get_resource(&resource, operation.params())
            .map_err(Error::Transport)?;

        if !response.is_success() {
            warn!(resource = %resource, status = response.status, "ilkbyte API error");
            return Err(Error::Api {
                status: response.status,
                body: ResponseBody::parse(&response.body),
            });
        }

        serde_json::from_str(&response.body).map_err(Error::Decode)
    }

    // Account

    pub fn get_account(&self) -> ApiResult<T> {
        self.invoke(Operation::GetAccount)
    }

    pub fn get_users(&self) -> ApiResult<T> {
        self.invoke(Operation::GetUsers)
    }

    // Servers

    /// All servers on the account, one page at a time (pages start at 1).
    pub fn get_all_servers(&self, page: u32) -> ApiResult<T> {
        self.invoke(Operation::GetAllServers { page })
    }

    /// Running servers only, one page at a time.
    pub fn get_active_servers(&self, page: u32) -> ApiResult<T> {
        self.invoke(Operation::GetActiveServers { page })
    }

    /// Plans, operating systems and applications available for new servers.
    pub fn get_plans(&self) -> ApiResult<T> {
        self.invoke(Operation::GetPlans)
    }

    pub fn create_server(&self, input: &CreateServer) -> ApiResult<T> {
        self.invoke(Operation::CreateServer(input))
    }

    pub fn get_server(&self, server: &str) -> ApiResult<T> {
        self.invoke(Operation::GetServer { server })
    }

    pub fn set_power(&self, server: &str, action: PowerAction) -> ApiResult<T> {
        self.invoke(Operation::SetPower { server, action })
    }

    pub fn get_ips(&self, server: &str) -> ApiResult<T> {
        self.invoke(Operation::GetIps { server })
    }

    pub fn get_ip_logs(&self, server: &str) -> ApiResult<T> {
        self.invoke(Operation::GetIpLogs { server })
    }

    /// Set the reverse DNS name of one of the server's addresses.
    pub fn set_ip_rdns(&self, server: &str, ip: &str, rdns: &str) -> ApiResult<T> {
        self.invoke(Operation::SetIpRdns { server, ip, rdns })
    }

    // Snapshots

    pub fn get_snapshots(&self, server: &str) -> ApiResult<T> {
        self.invoke(Operation::GetSnapshots { server })
    }

    pub fn create_snapshot(&self, server: &str) -> ApiResult<T> {
        self.invoke(Operation::CreateSnapshot { server })
    }

    /// Revert the server to the named snapshot.
    pub fn restore_snapshot(&self, server: &str, snapshot: &str) -> ApiResult<T> {
        self.invoke(Operation::RestoreSnapshot { server, snapshot })
    }

    /// Overwrite the named snapshot with the server's current state.
    pub fn update_snapshot(&self, server: &str, snapshot: &str) -> ApiResult<T> {
        self.invoke(Operation::UpdateSnapshot { server, snapshot })
    }

    pub fn delete_snapshot(&self, server: &str, snapshot: &str) -> ApiResult<T> {
        self.invoke(Operation::DeleteSnapshot { server, snapshot })
    }

    /// Schedule a recurring snapshot.
    pub fn set_cron(&self, server: &str, schedule: &CronSchedule) -> ApiResult<T> {
        self.invoke(Operation::SetCron { server, schedule })
    }

    pub fn delete_cron(&self, server: &str, cron: &str) -> ApiResult<T> {
        self.invoke(Operation::DeleteCron { server, cron })
    }

    // Backups

    pub fn get_backups(&self, server: &str) -> ApiResult<T> {
        self.invoke(Operation::GetBackups { server })
    }

    pub fn restore_backup(&self, server: &str, backup: &str) -> ApiResult<T> {
        self.invoke(Operation::RestoreBackup { server, backup })
    }

    // Domains and DNS

    pub fn get_domains(&self, page: u32) -> ApiResult<T> {
        self.invoke(Operation::GetDomains { page })
    }

    pub fn create_domain(&self, domain: &str, server: &str, ipv6: bool) -> ApiResult<T> {
        self.invoke(Operation::CreateDomain {
            domain,
            server,
            ipv6,
        })
    }

    pub fn get_domain(&self, domain: &str) -> ApiResult<T> {
        self.invoke(Operation::GetDomain { domain })
    }

    pub fn add_dns_record(&self, domain: &str, record: &DnsRecord) -> ApiResult<T> {
        self.invoke(Operation::AddDnsRecord { domain, record })
    }

    pub fn update_dns_record(
        &self,
        domain: &str,
        record_id: u64,
        content: &str,
        priority: u32,
    ) -> ApiResult<T> {
        self.invoke(Operation::UpdateDnsRecord {
            domain,
            record_id,
            content,
            priority,
        })
    }

    pub fn delete_dns_record(&self, domain: &str, record_id: u64) -> ApiResult<T> {
        self.invoke(Operation::DeleteDnsRecord { domain, record_id })
    }

    /// Publish pending record changes for the domain.
    pub fn dns_push(&self, domain: &str) -> ApiResult<T> {
        self.invoke(Operation::DnsPush { domain })
    }
}
