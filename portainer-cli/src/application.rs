use crate::api::{DeployOutcome, PortainerApi, Session, StackApi, deploy_or_update};
use crate::cli::{Cli, Commands, ConfigCommands, ConfigCreateArgs, StackCommands, StackDeployArgs};
use crate::config::{ConfigStore, Settings};
use crate::domain::{StackDeployRequest, parse_env_vars, parse_labels, validate_config_id};
use crate::output::{OutputFormat, render_configs, render_stacks};
use anyhow::{Context, Result};
use std::collections::BTreeMap;

/// A command with its input already read and validated, ready to run
/// against a logged-in session.
#[derive(Debug)]
pub enum Operation {
    ConfigList {
        output: OutputFormat,
    },
    ConfigCreate {
        name: String,
        content: Vec<u8>,
        labels: BTreeMap<String, String>,
    },
    ConfigRemove {
        id: String,
    },
    StackDeploy(StackDeployRequest),
    StackList {
        output: OutputFormat,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    let store = ConfigStore::new();
    let settings = Settings::resolve(&cli.global, store.load_effective()?)?;

    // Bad labels or an unreadable file should fail before we touch the network.
    let operation = prepare(cli.command, &settings.endpoint)?;

    let api = PortainerApi::new(&settings.client_options())?;
    let session = api
        .login(&settings.credentials())
        .await
        .with_context(|| format!("failed to log in to {}", settings.url))?;

    execute(&api, &session, &settings.endpoint, operation).await
}

pub fn prepare(command: Commands, endpoint: &str) -> Result<Operation> {
    let operation = match command {
        Commands::Config { command } => match command {
            ConfigCommands::List(args) => Operation::ConfigList {
                output: args.output,
            },
            ConfigCommands::Create(args) => prepare_config_create(args)?,
            ConfigCommands::Rm(args) => {
                validate_config_id(&args.id)?;
                Operation::ConfigRemove { id: args.id }
            }
        },
        Commands::Stack { command } => match command {
            StackCommands::Deploy(args) => prepare_stack_deploy(args, endpoint)?,
            StackCommands::List(args) => Operation::StackList {
                output: args.output,
            },
        },
    };
    Ok(operation)
}

fn prepare_config_create(args: ConfigCreateArgs) -> Result<Operation> {
    let labels = parse_labels(&args.labels)?;
    let content = args.content.read()?;
    Ok(Operation::ConfigCreate {
        name: args.name,
        content,
        labels,
    })
}

fn prepare_stack_deploy(args: StackDeployArgs, endpoint: &str) -> Result<Operation> {
    let env = parse_env_vars(&args.env_vars)?;
    let compose = args
        .composepath
        .read_to_string()
        .context("failed to read compose file")?;
    Ok(Operation::StackDeploy(StackDeployRequest {
        name: args.name,
        swarm_id: args.swarmid,
        endpoint: endpoint.to_string(),
        compose,
        env,
        prune: args.prune,
    }))
}

pub async fn execute(
    api: &PortainerApi,
    session: &Session,
    endpoint: &str,
    operation: Operation,
) -> Result<()> {
    match operation {
        Operation::ConfigList { output } => {
            let configs = api.list_configs(session, endpoint).await?;
            println!("{}", render_configs(&configs, output)?);
        }
        Operation::ConfigCreate {
            name,
            content,
            labels,
        } => {
            let created = api
                .create_config(session, endpoint, &name, &content, labels)
                .await
                .with_context(|| format!("failed to create config '{name}'"))?;
            println!("{}", created.id);
        }
        Operation::ConfigRemove { id } => {
            api.remove_config(session, endpoint, &id)
                .await
                .with_context(|| format!("failed to remove config '{id}'"))?;
            println!("config '{id}' removed");
        }
        Operation::StackDeploy(request) => {
            let outcome = deploy_or_update(api, session, &request)
                .await
                .with_context(|| format!("failed to deploy stack '{}'", request.name))?;
            let action = match &outcome {
                DeployOutcome::Created(_) => "created",
                DeployOutcome::Updated(_) => "updated",
            };
            let feedback = outcome.feedback();
            println!("stack '{}' {action} (id {})", feedback.name, feedback.id);
        }
        Operation::StackList { output } => {
            let stacks = api.list_stacks(session).await?;
            println!("{}", render_stacks(&stacks, output)?);
        }
    }
    Ok(())
}
