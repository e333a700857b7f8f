use serde::Deserialize;

/// Authentication core configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub key: KeyConfig,
    #[serde(default)]
    pub hashing: HashingConfig,
}

/// Key material configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KeyConfig {
    /// Literal prefix of every issued key
    #[serde(default = "default_key_prefix")]
    pub prefix: String,
    /// Byte length of the random secret portion (hex-encoded in the key)
    #[serde(default = "default_secret_bytes")]
    pub secret_bytes: usize,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Deserialize)]
pub struct HashingConfig {
    /// Memory cost in KiB
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of iterations
    #[serde(default = "default_time_cost")]
    pub time_cost: u32,
    /// Degree of parallelism
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_key_prefix() -> String {
    "sk_".to_string()
}

fn default_secret_bytes() -> usize {
    32
}

fn default_memory_kib() -> u32 {
    65536 // 64 MiB
}

fn default_time_cost() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    4
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            prefix: default_key_prefix(),
            secret_bytes: default_secret_bytes(),
        }
    }
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            time_cost: default_time_cost(),
            parallelism: default_parallelism(),
        }
    }
}

impl AuthConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
