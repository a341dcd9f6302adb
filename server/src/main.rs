use std::{io, net::IpAddr, path::PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use platform_obs::{ObsConfig, init_tracing};
use products_hr::{ClientConfig, GenderFilter, StatusFilter};
use roster_server::{
    AppConfig, AppState, EmployeeResource, ServeConfig,
    cli::{self, ExportFilters},
    load_seed,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Employee roster service and tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the in-memory employee REST resource.
    Serve(ServeCommand),
    /// Write the (optionally filtered) roster as CSV.
    Export(ExportCommand),
    /// Print headline counts of the roster.
    Summary(RemoteArgs),
    /// Sign in and persist the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the persisted session.
    Logout,
    /// Show the signed in user.
    Whoami,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,
    #[arg(long, default_value_t = 3000)]
    port: u16,
    #[arg(long, value_name = "FILE", help = "JSON employee list to start from")]
    seed: Option<PathBuf>,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[derive(Args, Debug)]
struct RemoteArgs {
    #[arg(long, env = "ROSTER_API_URL", help = "Employee collection URL")]
    url: Option<String>,
}

impl RemoteArgs {
    fn client(&self, config: &AppConfig) -> ClientConfig {
        match &self.url {
            Some(url) => ClientConfig {
                base_url: url.clone(),
                ..config.client.clone()
            },
            None => config.client.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct ExportCommand {
    #[command(flatten)]
    remote: RemoteArgs,
    #[arg(long)]
    search: Option<String>,
    #[arg(long, default_value = "all")]
    gender: GenderFilter,
    #[arg(long, default_value = "all")]
    status: StatusFilter,
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::from_env("roster"))?;
    let cli = Cli::parse();
    let app_config = AppConfig::load()?;
    match cli.command {
        Command::Serve(cmd) => run_server(cmd, app_config).await,
        Command::Export(cmd) => {
            let filters = ExportFilters {
                search: cmd.search,
                gender: cmd.gender,
                status: cmd.status,
            };
            let client = cmd.remote.client(&app_config);
            cli::run_export(&client, &filters, cmd.output.as_deref()).await?;
            Ok(())
        }
        Command::Summary(remote) => {
            let summary = cli::run_summary(&remote.client(&app_config)).await?;
            cli::print_summary(&summary, io::stdout().lock())?;
            Ok(())
        }
        Command::Login { email, password } => {
            let profile = cli::run_login(app_config.session_file.as_deref(), &email, &password)?;
            println!("Signed in as {} ({})", profile.name, profile.role);
            Ok(())
        }
        Command::Logout => cli::run_logout(app_config.session_file.as_deref()),
        Command::Whoami => {
            match cli::run_whoami(app_config.session_file.as_deref())? {
                Some(profile) => println!("{} <{}> {}", profile.name, profile.email, profile.role),
                None => println!("not signed in"),
            }
            Ok(())
        }
    }
}

async fn run_server(cmd: ServeCommand, config: AppConfig) -> Result<()> {
    let seed_path = cmd.seed.clone().or_else(|| config.seed_file.clone());
    let seed = match &seed_path {
        Some(path) => load_seed(path)?,
        None => Vec::new(),
    };
    info!(employees = seed.len(), "seeded employee resource");
    let state = AppState::new(EmployeeResource::new(seed), config);
    roster_server::serve((&cmd).into(), state).await
}
