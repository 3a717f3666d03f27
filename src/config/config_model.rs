#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub gateway: Gateway,
    pub billing: Billing,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Gateway {
    pub base_url: String,
    pub server_key: String,
}

#[derive(Debug, Clone)]
pub struct Billing {
    pub invoice_ttl_minutes: i64,
    pub topup_ttl_minutes: i64,
    pub sweep_interval_seconds: u64,
}
