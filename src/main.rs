use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::*;
use env_logger::Builder;
use log::{error, info, LevelFilter};
use prettytable::{row, Table};

use gs_stake_core::actions::parse_address;
use gs_stake_core::{
    ActionKind, ActionRequest, ActionResult, CancellationToken, PoolId, PoolRecord, Settings, StakeError,
    StakingClient,
};

#[derive(Parser)]
#[clap(author, version, about)]
/// Stake, unstake and inspect pools of the guardian staking contract
struct Cli {
    /// Subcommand to execute
    #[clap(subcommand)]
    command: Commands,

    /// Configuration file (TOML, YAML or JSON)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Log level for output
    #[clap(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List every pool with the user's position
    #[clap(alias = "ls")]
    Pools {
        /// Account to report on instead of the connected one
        #[clap(short, long)]
        user: Option<String>,

        /// Print records as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show guardian and user balances of a token
    Balances {
        /// Token contract address
        #[clap(short, long)]
        token: String,

        /// Account to report on instead of the connected one
        #[clap(short, long)]
        user: Option<String>,
    },

    /// Approve and stake tokens into a pool
    Stake {
        #[clap(short, long)]
        pool: PoolId,

        /// Human-decimal amount, e.g. 1.5
        #[clap(short, long)]
        amount: String,

        /// Token contract address
        #[clap(short, long)]
        token: String,
    },

    /// Withdraw staked tokens from a pool
    Unstake {
        #[clap(short, long)]
        pool: PoolId,

        /// Human-decimal amount, e.g. 1.5
        #[clap(short, long)]
        amount: String,

        /// Token contract address
        #[clap(short, long)]
        token: String,
    },

    /// Restake pending rewards
    Compound,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), StakeError> {
    let settings = Settings::load(cli.config.as_deref())?;
    info!(
        "Connecting to {} (guardian {}) on {}",
        settings.rpc_url,
        settings.guardian_address,
        settings.chain()
    );

    let client = StakingClient::connect(&settings).await?;
    info!("Connected as {}", client.session().account());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling");
            trigger.cancel();
        }
    });

    match cli.command {
        Commands::Pools { user, json } => {
            let records = match user {
                Some(user) => client.list_pools_for(parse_address(&user)?, &cancel).await?,
                None => client.list_pools(&cancel).await?,
            };
            if json {
                let out = serde_json::to_string_pretty(&records)
                    .map_err(|e| StakeError::Config(format!("cannot serialize pools: {}", e)))?;
                println!("{}", out);
            } else {
                print_pools(&records);
            }
        }
        Commands::Balances { token, user } => {
            let user = user.as_deref().map(parse_address).transpose()?;
            let balances = client.read_balances(parse_address(&token)?, user).await?;
            println!("{}", "Token balances".green().bold());
            println!("  Guardian: {}", balances.pool_balance);
            println!("  User:     {}", balances.user_balance);
        }
        Commands::Stake { pool, amount, token } => {
            let request = ActionRequest::new(pool, amount, parse_address(&token)?, ActionKind::Stake);
            report(&request.kind.to_string(), client.execute(&request, &cancel).await);
        }
        Commands::Unstake { pool, amount, token } => {
            let request = ActionRequest::new(pool, amount, parse_address(&token)?, ActionKind::Unstake);
            report(&request.kind.to_string(), client.execute(&request, &cancel).await);
        }
        Commands::Compound => {
            report("compound", client.compound(&cancel).await);
        }
    }

    Ok(())
}

fn print_pools(records: &[PoolRecord]) {
    if records.is_empty() {
        println!("{}", "No pools".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_titles(row![
        "Pool", "Token", "Total staked", "Reward/token", "APR %", "Staked", "Pending", "Multiplier", "Wallet"
    ]);
    for record in records {
        table.add_row(row![
            record.pool_id,
            record.token_address,
            r->record.total_staked,
            r->record.reward_per_token,
            r->record.apr,
            r->record.user_staked,
            r->record.pending_reward,
            r->record.multiplier,
            r->record.user_balance
        ]);
    }
    table.printstd();
}

fn report(action: &str, result: ActionResult) {
    if result.is_success() {
        println!("{} {}", action.green().bold(), "confirmed".green());
    } else {
        println!("{} {}", action.red().bold(), "failed".red());
        process::exit(2);
    }
}
