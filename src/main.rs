//! seedsweep 命令行入口
//!
//! `check`：逐地址查询余额；`sweep`：把余额归集到每行指定的收款地址。

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use seedsweep::{
    config::Config,
    domain::{ConfirmationPolicy, SweepReport},
    infrastructure::{logging::init_logging, CancelFlag, SolanaRpcClient, TokioDelay},
    service::{PriceOracle, SweepOrchestrator},
    utils::{load_job_file, load_seed_file, render_check_report, render_sweep_report},
};

#[derive(Parser)]
#[command(
    name = "seedsweep",
    about = "Check and sweep SOL balances of mnemonic-derived addresses",
    version
)]
struct Cli {
    /// TOML 配置文件（缺省读取 CONFIG_PATH）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Convention A 扫描的账户数
    #[arg(long, global = true)]
    num_accounts: Option<u32>,

    /// 以 JSON 输出报告
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report balances for every derived address.
    Check {
        /// One seed phrase per line.
        #[arg(long, default_value = "seed.txt")]
        seeds: PathBuf,
    },
    /// Sweep balances to the recipient given on each line.
    Sweep {
        /// `seed phrase;recipient` per line.
        #[arg(long, default_value = "to_send.txt")]
        jobs: PathBuf,
        /// Count transfers whose confirmation query failed as failures.
        #[arg(long)]
        strict_confirmation: bool,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var("CONFIG_PATH").ok().map(PathBuf::from));
    let mut config = Config::from_env_and_file(path)?;

    if let Some(url) = &cli.rpc_url {
        config.rpc.url = url.clone();
    }
    if let Some(n) = cli.num_accounts {
        config.sweep.num_accounts = n;
    }
    if let Command::Sweep {
        strict_confirmation: true,
        ..
    } = cli.command
    {
        config.sweep.confirmation_policy = ConfirmationPolicy::Strict;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn print_report(report: &SweepReport, text: String, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("Failed to serialize report")?
        );
    } else {
        print!("{}", text);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 加载环境变量
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 2. 配置
    let config = load_config(&cli)?;

    // 3. 日志（guard 持有到进程结束）
    let _log_guard = init_logging(&config.logging)?;
    tracing::info!(rpc = %config.rpc.url, num_accounts = config.sweep.num_accounts, "✅ Configuration loaded");

    // 4. Ctrl-C → 取消（在账户 / 钱包之间生效）
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("⚠️ Interrupt received, stopping after the current account");
                cancel.cancel();
            }
        });
    }

    // 5. 组装
    let rpc = Arc::new(SolanaRpcClient::new(
        config.rpc.url.clone(),
        config.rpc.timeout(),
    ));
    let orchestrator = SweepOrchestrator::from_config(&config, rpc, Arc::new(TokioDelay))?
        .with_cancel_flag(cancel);

    // 6. 执行
    match &cli.command {
        Command::Check { seeds } => {
            let phrases = load_seed_file(seeds)?;
            let price = PriceOracle::from_config(&config.price).get_quote().await;
            let report = orchestrator.run_check(&phrases).await;
            print_report(&report, render_check_report(&report, price), cli.json)?;
        }
        Command::Sweep { jobs, .. } => {
            let jobs = load_job_file(jobs)?;
            let report = orchestrator.run_sweep(&jobs).await;
            print_report(&report, render_sweep_report(&report), cli.json)?;
        }
    }

    tracing::info!("🎉 Done");
    Ok(())
}
