use crate::input::ContentSource;
use crate::output::OutputFormat;
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};

pub const ENV_PREFIX: &str = "PORTAINER_API_CLI";

/// Environment variable bound to a flag: `PORTAINER_API_CLI_<PATH>_<FLAG>`,
/// where `path` is the subcommand chain (empty for global flags).
pub fn env_var_name(flag: &str, path: &[&str]) -> String {
    let mut parts = vec![ENV_PREFIX.to_string()];
    parts.extend(path.iter().map(|p| p.to_string()));
    parts.push(flag.to_string());
    parts.join("_").to_uppercase().replace('-', "_")
}

#[derive(Parser)]
#[command(
    name = "portainer-api-cli",
    version,
    about = "Manage swarm configs and stacks through the Portainer API"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Default)]
pub struct GlobalArgs {
    /// Username to connect to portainer
    #[arg(long, global = true, env = "PORTAINER_API_CLI_USERNAME")]
    pub username: Option<String>,
    /// Password to connect to portainer
    #[arg(
        long,
        global = true,
        env = "PORTAINER_API_CLI_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,
    /// Url of your portainer, e.g. http://portainer:9000
    #[arg(long, global = true, env = "PORTAINER_API_CLI_PORTAINERURL")]
    pub portainerurl: Option<String>,
    /// Endpoint to use [default: 1]
    #[arg(long, global = true, env = "PORTAINER_API_CLI_ENDPOINT")]
    pub endpoint: Option<String>,
    /// Request timeout in seconds [default: 30]
    #[arg(long, global = true, env = "PORTAINER_API_CLI_TIMEOUT")]
    pub timeout: Option<u64>,
    /// Skip TLS certificate validation; `--insecure-tls=false` overrides the config file
    #[arg(
        long,
        global = true,
        env = "PORTAINER_API_CLI_INSECURE_TLS",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub insecure_tls: Option<bool>,
    /// Log filter, e.g. info, debug or portainer_cli=trace
    #[arg(
        long,
        global = true,
        env = "PORTAINER_API_CLI_LOG_LEVEL",
        default_value = "info"
    )]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage swarm configs
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Manage swarm stacks
    Stack {
        #[command(subcommand)]
        command: StackCommands,
    },
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// List swarm configs
    #[command(visible_alias = "ls")]
    List(ConfigListArgs),
    /// Create a new swarm config
    Create(ConfigCreateArgs),
    /// Remove a swarm config
    Rm(ConfigRemoveArgs),
}

#[derive(Args)]
pub struct ConfigListArgs {
    /// Output format of data, h for human readable or json
    #[arg(
        short = 'o',
        long,
        env = "PORTAINER_API_CLI_CONFIG_LS_OUTPUT",
        value_enum,
        default_value_t = OutputFormat::Human
    )]
    pub output: OutputFormat,
}

#[derive(Args)]
pub struct ConfigCreateArgs {
    /// Name of config
    #[arg(long, env = "PORTAINER_API_CLI_CONFIG_CREATE_NAME")]
    pub name: String,
    /// Path to a file, or - for STDIN
    #[arg(long, env = "PORTAINER_API_CLI_CONFIG_CREATE_CONTENT")]
    pub content: ContentSource,
    /// Labels as key=value; repeat the flag or separate with commas
    #[arg(
        long,
        visible_alias = "label",
        env = "PORTAINER_API_CLI_CONFIG_CREATE_LABELS",
        value_delimiter = ','
    )]
    pub labels: Vec<String>,
}

#[derive(Args)]
pub struct ConfigRemoveArgs {
    /// Id of the config to remove
    #[arg(long, env = "PORTAINER_API_CLI_CONFIG_RM_ID")]
    pub id: String,
}

// ---------------------------------------------------------------------------
// Stack
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum StackCommands {
    /// Deploy a stack, or update it when it already exists
    Deploy(StackDeployArgs),
    /// List stacks
    #[command(visible_alias = "ls")]
    List(StackListArgs),
}

#[derive(Args)]
pub struct StackDeployArgs {
    /// Name of the stack you want to deploy
    #[arg(long, env = "PORTAINER_API_CLI_STACK_DEPLOY_NAME")]
    pub name: String,
    /// The id of your swarm
    #[arg(long, env = "PORTAINER_API_CLI_STACK_DEPLOY_SWARMID")]
    pub swarmid: String,
    /// Path to compose file, or - for STDIN
    #[arg(long, env = "PORTAINER_API_CLI_STACK_DEPLOY_COMPOSEPATH")]
    pub composepath: ContentSource,
    /// Stack environment variables as KEY=VALUE; repeatable
    #[arg(long = "env", env = "PORTAINER_API_CLI_STACK_DEPLOY_ENV", value_delimiter = ',')]
    pub env_vars: Vec<String>,
    /// Prune services no longer in the compose file when updating
    #[arg(long, env = "PORTAINER_API_CLI_STACK_DEPLOY_PRUNE")]
    pub prune: bool,
}

#[derive(Args)]
pub struct StackListArgs {
    /// Output format of data, h for human readable or json
    #[arg(
        short = 'o',
        long,
        env = "PORTAINER_API_CLI_STACK_LS_OUTPUT",
        value_enum,
        default_value_t = OutputFormat::Human
    )]
    pub output: OutputFormat,
}
