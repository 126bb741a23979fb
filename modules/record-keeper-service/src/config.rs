use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 5050;
const DEFAULT_BIND: &str = "127.0.0.1";
const DEFAULT_RECORDS_DIR: &str = "./records";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind: String,
    pub records_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = match lookup("RECORD_KEEPER_PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!(
                    "RECORD_KEEPER_PORT={:?} is not a valid port, using {}",
                    raw,
                    DEFAULT_PORT
                );
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        Self {
            port,
            bind: lookup("RECORD_KEEPER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            records_dir: lookup("RECORD_KEEPER_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RECORDS_DIR)),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
