use std::{fs, io::{self, Write}};

use clap::Parser as _;

use crate::{
    cli::{Cli, Command},
    config::Config,
    executor::Executor,
    prelude::*,
    sales::Workload,
    target::BaseAddress,
};


mod attack;
mod cli;
mod config;
mod executor;
mod log;
mod prelude;
mod sales;
mod target;
mod util;


#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;


#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.cmd {
        Command::Run { users, iterations } => {
            let (config, workload) = setup(&cli)?;
            let mut load = config.load;
            if let Some(users) = *users {
                if users == 0 {
                    bail!("--users must be at least 1");
                }
                load.users = users;
            }
            if let Some(iterations) = *iterations {
                load.iterations = Some(iterations);
            }
            load.validate().map_err(|e| anyhow!("invalid load settings: {e}"))?;

            attack::run(&load, workload).await?;
        }

        Command::Once => {
            let (_, workload) = setup(&cli)?;
            Executor::new()?.run(&workload).await?.into_result()?;
        }

        Command::Check => {
            let (_, workload) = setup(&cli)?;
            let request = workload.create_request();
            println!("Config is valid.");
            println!("  {} {}", request.method(), request.url);
            println!("  body: {}", request.body.as_deref().unwrap_or_default());
        }

        Command::GenConfigTemplate { out } => {
            let template = config::template();
            match out {
                Some(path) => fs::write(path, &template)?,
                None => io::stdout().write_all(template.as_bytes())?,
            }
        }
    }

    Ok(())
}

/// Loads the config, initializes logging and prepares the workload.
fn setup(cli: &Cli) -> Result<(Config, Workload)> {
    let config = load_config(cli)?;
    log::init(&config.log)?;
    let workload = Workload::from_config(&config)?;
    Ok((config, workload))
}

/// Loads the config and applies the target overrides given on the command line.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = config::load(cli.config.as_deref())?;

    if let Some(environment) = &cli.environment {
        config.target.environment = environment.clone();
    }
    if let Some(address) = &cli.base_address {
        let address = BaseAddress::try_from(address.clone())
            .map_err(|e| anyhow!("invalid --base-address '{address}': {e}"))?;
        config.target.base_address = Some(address);
    }

    // Makes sure a changed `environment` still exists.
    config.target.base_address()?;

    Ok(config)
}
