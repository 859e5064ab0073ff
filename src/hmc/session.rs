use crate::error::{Error, Result};
use crate::hmc::parse::{parse_logical_partitions, parse_logon_response, parse_managed_systems};
use crate::hmc::types::{ManagedSystem, Partition};
use crate::settings::HmcSettings;
use log::{debug, info, warn};
use quick_xml::escape::escape;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;

const LOGON_PATH: &str = "rest/api/web/Logon";
const MANAGED_SYSTEM_PATH: &str = "rest/api/uom/ManagedSystem";
const LOGICAL_PARTITION_PATH: &str = "rest/api/uom/LogicalPartition";

const LOGON_REQUEST_TYPE: &str = "application/vnd.ibm.powervm.web+xml; type=LogonRequest";
const LOGON_RESPONSE_TYPE: &str = "application/vnd.ibm.powervm.web+xml; type=LogonResponse";
const AUDIT_MEMENTO: &str = "Ansible HMC inventory";
const SESSION_HEADER: &str = "X-API-Session";

/// An authenticated HMC REST session. Log off with [`HmcSession::logoff`].
pub struct HmcSession {
    client: Client,
    base_url: String,
    token: String,
}

impl HmcSession {
    pub fn logon(settings: &HmcSettings) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!settings.ssl_verify)
            .build()?;
        let base_url = settings.base_url();
        let url = format!("{}{}", base_url, LOGON_PATH);

        debug!("Logging on to {} as {}", url, settings.user);
        let response = client
            .put(&url)
            .header("Content-Type", LOGON_REQUEST_TYPE)
            .header("Accept", LOGON_RESPONSE_TYPE)
            .header("X-Audit-Memento", AUDIT_MEMENTO)
            .body(logon_request(&settings.user, &settings.password))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Logon(format!("HTTP {} from {}", status, url)));
        }

        let token = parse_logon_response(&response.text()?)?;
        info!("Logged on to {}", base_url);

        Ok(HmcSession {
            client,
            base_url,
            token,
        })
    }

    /// GET a UOM resource and return the response body. `api` is either a
    /// path relative to the HMC base URL or an absolute URL.
    pub fn get(&self, api: &str, content_type: &str) -> Result<String> {
        let url = if api.starts_with("http") {
            api.to_string()
        } else {
            format!("{}{}", self.base_url, api)
        };
        let media_type = format!("application/vnd.ibm.powervm.uom+xml; type={}", content_type);

        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .header("Content-Type", &media_type)
            .header("Accept", &media_type)
            .header("X-Audit-Memento", AUDIT_MEMENTO)
            .header(SESSION_HEADER, &self.token)
            .send()?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            // The HMC answers an empty feed with no body.
            Ok(String::new())
        } else if status.is_success() {
            Ok(response.text()?)
        } else {
            Err(Error::Status {
                status,
                path: api.to_string(),
            })
        }
    }

    pub fn managed_systems(&self) -> Result<Vec<ManagedSystem>> {
        let body = self.get(MANAGED_SYSTEM_PATH, "ManagedSystem")?;
        let systems = parse_managed_systems(&body)?;
        info!("HMC reports {} managed systems", systems.len());
        Ok(systems)
    }

    pub fn logical_partitions(&self) -> Result<Vec<Partition>> {
        let body = self.get(LOGICAL_PARTITION_PATH, "LogicalPartition")?;
        let partitions = parse_logical_partitions(&body)?;
        info!("HMC reports {} logical partitions", partitions.len());
        Ok(partitions)
    }

    /// Release the session token. Failure is logged, never returned.
    pub fn logoff(self) {
        let url = format!("{}{}", self.base_url, LOGON_PATH);
        debug!("Logging off from {}", url);

        let result = self
            .client
            .delete(&url)
            .header("Content-Type", LOGON_REQUEST_TYPE)
            .header("Accept", LOGON_RESPONSE_TYPE)
            .header("X-Audit-Memento", AUDIT_MEMENTO)
            .header(SESSION_HEADER, &self.token)
            .send();

        match result {
            Ok(response) => check_logoff(response),
            Err(e) => warn!("HMC logoff failed: {}", e),
        }
    }
}

fn check_logoff(response: Response) {
    let status = response.status();
    if !status.is_success() {
        warn!("HMC logoff returned HTTP {}", status);
    }
}

fn logon_request(user: &str, password: &str) -> String {
    format!(
        r#"<LogonRequest xmlns="http://www.ibm.com/xmlns/systems/power/firmware/web/mc/2012_10/" schemaVersion="V1_0">
  <Metadata>
    <Atom/>
  </Metadata>
  <UserID kb="CUR" kxe="false">{}</UserID>
  <Password kb="CUR" kxe="false">{}</Password>
</LogonRequest>"#,
        escape(user),
        escape(password)
    )
}
