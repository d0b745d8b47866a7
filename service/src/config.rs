use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default Trello REST API base URL used when `TRELLO_BASE_URL` is not set.
pub const DEFAULT_TRELLO_BASE_URL: &str = "https://api.trello.com/1";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that are allowed to receive server responses.
    /// A single `*` allows any origin.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "*"
    )]
    pub allowed_origins: Vec<String>,

    /// The API key to use when calling the Trello REST API.
    #[arg(long, env)]
    trello_api_key: Option<String>,

    /// The API token to use when calling the Trello REST API.
    #[arg(long, env)]
    trello_api_token: Option<String>,

    /// The Trello board whose webhook events are relayed. Live clients are
    /// subscribed to this board unless they ask for another one.
    #[arg(long, env)]
    trello_board_id: Option<String>,

    /// The base URL of the Trello REST API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_TRELLO_BASE_URL)]
    trello_base_url: String,

    /// Timeout in seconds for a single call to the Trello REST API
    #[arg(long, env, default_value_t = 10)]
    pub upstream_timeout_secs: u64,

    /// Maximum number of undelivered events buffered per live connection before
    /// the connection is considered too slow and dropped
    #[arg(long, env, default_value_t = 64)]
    pub outbound_queue_capacity: usize,

    /// Respond 200 to webhook deliveries that don't map to a task event. Trello
    /// retries any delivery that doesn't get a 2xx, so turning this off makes
    /// unmodeled events come back.
    #[arg(
        long,
        env,
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub acknowledge_irrelevant_webhooks: bool,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "0.0.0.0")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 3000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Builds a Config from an explicit argument list instead of the process
    /// arguments. Environment variables are still consulted for unset flags.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Config::parse_from(args)
    }

    pub fn trello_api_key(&self) -> Option<String> {
        self.trello_api_key.clone()
    }

    pub fn trello_api_token(&self) -> Option<String> {
        self.trello_api_token.clone()
    }

    pub fn trello_board_id(&self) -> Option<String> {
        self.trello_board_id
            .clone()
            .filter(|board_id| !board_id.trim().is_empty())
    }

    /// Returns the Trello API base URL without a trailing slash.
    pub fn trello_base_url(&self) -> &str {
        self.trello_base_url.trim_end_matches('/')
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}
