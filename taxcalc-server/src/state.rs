//! Shared application state for the tax server.

use std::sync::Arc;

use taxcalc::facade::{PersonalIncomeTaxService, TaxService};

use crate::config::ServerConfig;

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Stateless tax service; shared without locking.
    pub service: Arc<dyn TaxService>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_service(config, Arc::new(PersonalIncomeTaxService::new()))
    }

    pub fn with_service(config: ServerConfig, service: Arc<dyn TaxService>) -> Self {
        Self {
            service,
            config: Arc::new(config),
        }
    }

    /// Address advertised in the WSDL `soap:address` element.
    ///
    /// Prefers the authority the caller used to reach us (`Host` header);
    /// otherwise falls back to the listener address, with `localhost`
    /// standing in for a wildcard bind.
    pub fn soap_location(&self, host: Option<&str>) -> String {
        let authority = match host {
            Some(host) => host.to_string(),
            None => self.listener_authority(),
        };
        format!("http://{authority}{}", self.config.soap_path)
    }

    fn listener_authority(&self) -> String {
        match self.config.socket_addr() {
            Ok(addr) if addr.ip().is_unspecified() => format!("localhost:{}", addr.port()),
            Ok(addr) => addr.to_string(),
            Err(_) => format!("{}:{}", self.config.bind, self.config.port),
        }
    }
}
