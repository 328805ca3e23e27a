use std::net::IpAddr;

use anyhow::Context;

use crate::state::AppState;

pub struct AppConfig {
    pub database_url: String,
    pub bind_host: String,
    pub bind_port: u16,
    pub okpay_id: String,
    pub okpay_secret: String,
    pub okpay_allowed_ips: Vec<IpAddr>,
    pub server_domain: String,
    pub order_timeout_minutes: i64,
    pub clean_interval_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_host = std::env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let bind_port = std::env::var("BIND_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("BIND_PORT must be a valid port number")?;

        let okpay_id = std::env::var("OKPAY_ID").context("OKPAY_ID must be set")?;

        let okpay_secret = std::env::var("OKPAY_SECRET").context("OKPAY_SECRET must be set")?;

        // Empty value means the source check is disabled.
        let okpay_allowed_ips = parse_allowed_ips(
            &std::env::var("OKPAY_ALLOWED_IPS").unwrap_or_default(),
        )?;

        let server_domain = std::env::var("SERVER_DOMAIN").unwrap_or_default();
        if server_domain.is_empty() {
            log::warn!("SERVER_DOMAIN not set, OkPay callback links will be incomplete");
        }

        let order_timeout_minutes = std::env::var("ORDER_TIMEOUT_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .context("ORDER_TIMEOUT_MINUTES must be an integer")?;

        let clean_interval_seconds = std::env::var("CLEAN_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "600".to_string())
            .parse::<u64>()
            .context("CLEAN_INTERVAL_SECONDS must be an integer")?;

        Ok(Self {
            database_url,
            bind_host,
            bind_port,
            okpay_id,
            okpay_secret,
            okpay_allowed_ips,
            server_domain,
            order_timeout_minutes,
            clean_interval_seconds,
        })
    }

    pub async fn create_app_state(&self) -> anyhow::Result<AppState> {
        AppState::new(
            &self.database_url,
            &self.okpay_id,
            &self.okpay_secret,
            self.okpay_allowed_ips.clone(),
            &self.server_domain,
        )
        .await
        .context("Failed to initialize AppState")
    }
}

fn parse_allowed_ips(raw: &str) -> anyhow::Result<Vec<IpAddr>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<IpAddr>()
                .context(format!("Invalid IP address in OKPAY_ALLOWED_IPS: `{}`", s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_ips() {
        let ips = parse_allowed_ips("10.0.0.1, 192.168.1.2").unwrap();
        assert_eq!(ips.len(), 2);
        assert_eq!(ips[0], "10.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn empty_list_is_allowed() {
        assert!(parse_allowed_ips("").unwrap().is_empty());
        assert!(parse_allowed_ips(" , ").unwrap().is_empty());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_allowed_ips("not-an-ip").is_err());
    }
}
