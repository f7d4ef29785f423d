use {
    anyhow::Result,
    clap::{
        crate_authors,
        crate_description,
        crate_name,
        crate_version,
        Args,
        Parser,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    std::{
        fs,
        time::Duration,
    },
};

mod server;

#[derive(Parser, Debug)]
#[command(name = crate_name!())]
#[command(author = crate_authors!())]
#[command(about = crate_description!())]
#[command(version = crate_version!())]
pub enum Options {
    /// Run the dispute server service.
    Run(RunOptions),
}

#[derive(Args, Clone, Debug)]
pub struct RunOptions {
    /// Server Options
    #[command(flatten)]
    pub server: server::Options,

    #[command(flatten)]
    pub config: ConfigOptions,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Config Options")]
#[group(id = "Config")]
pub struct ConfigOptions {
    /// Path to a configuration file containing the dispute tuning parameters
    #[arg(long = "config")]
    #[arg(env = "DISPUTE_CONFIG")]
    #[arg(default_value = "config.yaml")]
    pub config: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dispute: DisputeConfig,
}

impl Config {
    pub fn load(path: &str) -> Result<Config> {
        let yaml_content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&yaml_content)?;
        Ok(config)
    }
}

/// Tuning of the closing rule. These are legal parameters of the auction,
/// set per deployment rather than hidden in the code.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisputeConfig {
    /// Fixed inactivity window after which an open item enters the random
    /// closing window. Resets on every accepted bid.
    #[serde(with = "humantime_serde", default = "default_quiet_period")]
    pub quiet_period: Duration,

    /// Upper bound of the once-sampled random closing window.
    #[serde(with = "humantime_serde", default = "default_random_window_max")]
    pub random_window_max: Duration,

    /// Per-room delta buffer. A subscriber that falls this many events
    /// behind is dropped from the room and must resynchronize.
    #[serde(default = "default_broadcast_channel_size")]
    pub broadcast_channel_size: usize,
}

impl Default for DisputeConfig {
    fn default() -> Self {
        Self {
            quiet_period:           default_quiet_period(),
            random_window_max:      default_random_window_max(),
            broadcast_channel_size: default_broadcast_channel_size(),
        }
    }
}

fn default_quiet_period() -> Duration {
    Duration::from_secs(2 * 60)
}

fn default_random_window_max() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_broadcast_channel_size() -> usize {
    1000
}
