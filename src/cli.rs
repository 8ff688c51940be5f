use std::path::PathBuf;


#[derive(clap::Parser)]
#[command(version, about)]
pub struct Cli {
    #[clap(subcommand)]
    pub cmd: Command,

    /// Specifies config file location. Default locations are: 'config.toml' and
    /// '/etc/sales-loadtest/config.toml'. Can also be set via env
    /// `SALES_LOADTEST_CONFIG_PATH`. Without any config file, all defaults are
    /// used.
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Selects one of the environments from `target.environments`, overriding
    /// `target.environment`.
    #[clap(long, global = true)]
    pub environment: Option<String>,

    /// Sends requests to this base address (e.g. `http://localhost:8080`),
    /// ignoring the configured environments.
    #[clap(long, global = true)]
    pub base_address: Option<String>,
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Runs the load test: virtual users repeatedly create sales.
    Run {
        /// Number of concurrent users. Overrides `load.users`.
        #[clap(short, long)]
        users: Option<usize>,

        /// Iterations per user, 0 meaning unlimited. Overrides `load.iterations`
        /// and cannot be combined with a non-zero `load.run_time`.
        #[clap(short, long)]
        iterations: Option<usize>,
    },

    /// Sends a single sale request and exits. Fails if the target does not
    /// respond with 2xx.
    Once,

    /// Checks the config and prints the request that would be sent, without
    /// sending anything.
    Check,

    /// Outputs a template of the configuration, including all config options
    /// with descriptions, great as a starting point.
    GenConfigTemplate {
        /// File to write it to. If unspecified, written to stdout.
        #[clap(short, long)]
        out: Option<PathBuf>,
    },
}
