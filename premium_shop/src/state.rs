use std::net::IpAddr;

use anyhow::Result;
use common::{Database, GatewaySigner};

use crate::okpay::OkPayClient;

pub struct AppState {
    pub db: Database,
    pub signer: GatewaySigner,
    pub allowed_ips: Vec<IpAddr>,
    pub okpay: OkPayClient,
}

impl AppState {
    pub async fn new(
        database_url: &str,
        okpay_id: &str,
        okpay_secret: &str,
        allowed_ips: Vec<IpAddr>,
        server_domain: &str,
    ) -> Result<Self> {
        let db = Database::new(database_url).await?;
        log::info!("Database initialized successfully!");

        let signer = GatewaySigner::new(okpay_id, okpay_secret);
        let okpay = OkPayClient::new(signer.clone(), server_domain);

        Ok(AppState {
            db,
            signer,
            allowed_ips,
            okpay,
        })
    }

    /// True when the callback source passes the allow-list. An empty
    /// allow-list disables the check; an unknown peer address fails it.
    pub fn is_allowed_source(&self, ip: Option<IpAddr>) -> bool {
        if self.allowed_ips.is_empty() {
            return true;
        }
        match ip {
            Some(ip) => self.allowed_ips.contains(&ip),
            None => false,
        }
    }
}
