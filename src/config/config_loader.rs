use anyhow::Result;

use super::config_model::{Billing, Database, DotEnvyConfig, Gateway, Server};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let gateway = Gateway {
        base_url: std::env::var("GATEWAY_BASE_URL").expect("GATEWAY_BASE_URL is invalid"),
        server_key: std::env::var("GATEWAY_SERVER_KEY").expect("GATEWAY_SERVER_KEY is invalid"),
    };

    let billing = Billing {
        invoice_ttl_minutes: std::env::var("INVOICE_TTL_MINUTES")
            .unwrap_or_else(|_| "15".to_string())
            .parse()?,
        topup_ttl_minutes: std::env::var("TOPUP_TTL_MINUTES")
            .unwrap_or_else(|_| "15".to_string())
            .parse()?,
        sweep_interval_seconds: std::env::var("SWEEP_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()?,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        gateway,
        billing,
    })
}
