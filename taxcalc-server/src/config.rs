//! Server configuration loaded from an optional TOML file.

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Server configuration (TOML).
///
/// Missing fields default to values that reproduce the historical endpoint:
/// SOAP served at `/ws/endpoint` under the `myService` / `myPortName` names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address to bind the listener to (IPv4 or IPv6, no brackets).
    pub bind: String,

    /// Port to listen on.
    pub port: u16,

    /// Path of the SOAP endpoint (also serves `?wsdl`).
    pub soap_path: String,

    /// Allow cross-origin calls from any origin.
    pub cors_permissive: bool,

    pub soap: SoapNames,
}

/// Names published in the SOAP envelope and WSDL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SoapNames {
    pub service_name: String,
    pub port_name: String,
    pub port_type: String,
    pub target_namespace: String,
}

impl Default for SoapNames {
    fn default() -> Self {
        Self {
            service_name: "myService".to_string(),
            port_name: "myPortName".to_string(),
            port_type: "userPortType".to_string(),
            target_namespace: "http://service.webservice.demos.demo.example.com/".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            soap_path: "/ws/endpoint".to_string(),
            cors_permissive: true,
            soap: SoapNames::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bind.trim().is_empty() {
            return Err(anyhow!("bind must be non-empty"));
        }
        self.bind_ip()?;
        if self.port == 0 {
            return Err(anyhow!("port must be > 0"));
        }
        if !self.soap_path.starts_with('/') || self.soap_path.len() < 2 {
            return Err(anyhow!("soap_path must start with '/' and name a path"));
        }
        if self.soap_path.starts_with("/api") {
            return Err(anyhow!("soap_path must not be under /api"));
        }
        let names = [
            ("soap.service_name", &self.soap.service_name),
            ("soap.port_name", &self.soap.port_name),
            ("soap.port_type", &self.soap.port_type),
            ("soap.target_namespace", &self.soap.target_namespace),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(anyhow!("{field} must be non-empty"));
            }
        }
        Ok(())
    }

    fn bind_ip(&self) -> Result<IpAddr> {
        self.bind
            .parse()
            .with_context(|| format!("bind must be an IP address, got {:?}", self.bind))
    }

    /// Listener address; IPv6 binds are handled without manual bracketing.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(SocketAddr::new(self.bind_ip()?, self.port))
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ServerConfig::default()`.
pub fn load_config(path: &Path) -> Result<ServerConfig> {
    if !path.exists() {
        let cfg = ServerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ServerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
