use color_eyre::eyre::{
    Result,
    eyre,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling,
};
use tracing_subscriber::EnvFilter;

mod client;
mod ui;

fn print_usage_and_exit() -> ! {
    println!(
        "Usage: double-or-nothing [--wallet <name>] [--wallet-dir <path>]\n\
         [--no-autoload] [--token] [--gas-pad <percent>] [--flip-delay-ms <ms>]\n\
         \n\
         Flags:\n\
           --wallet <name>       forc-wallet profile to connect with\n\
           --wallet-dir <path>   Override wallet directory (defaults to ~/.fuel/wallets)\n\
           --no-autoload         Skip reconnecting to the cached provider\n\
           --token               Wager the CHIP token instead of the native asset\n\
           --gas-pad <percent>   Headroom added to gas estimates (default 30)\n\
           --flip-delay-ms <ms>  Delay before the demo chain resolves a flip"
    );
    std::process::exit(0);
}

fn parse_cli_args() -> Result<client::AppConfig> {
    let mut config = client::AppConfig::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--wallet" => {
                let name = args
                    .next()
                    .ok_or_else(|| eyre!("--wallet requires a name argument"))?;
                config.wallet = Some(name);
            }
            "--wallet-dir" => {
                let dir = args
                    .next()
                    .ok_or_else(|| eyre!("--wallet-dir requires a path argument"))?;
                config.wallet_dir = Some(dir);
            }
            "--no-autoload" => config.auto_load = false,
            "--token" => config.token_game = true,
            "--gas-pad" => {
                let raw = args
                    .next()
                    .ok_or_else(|| eyre!("--gas-pad requires a percent argument"))?;
                let percent = raw
                    .parse::<u64>()
                    .map_err(|_| eyre!("--gas-pad expects a number, got '{raw}'"))?;
                config.gas_pad_percent = Some(percent);
            }
            "--flip-delay-ms" => {
                let raw = args
                    .next()
                    .ok_or_else(|| eyre!("--flip-delay-ms requires a value"))?;
                config.flip_delay_ms = raw
                    .parse::<u64>()
                    .map_err(|_| eyre!("--flip-delay-ms expects a number, got '{raw}'"))?;
            }
            "--help" | "-h" => print_usage_and_exit(),
            other => return Err(eyre!("Unknown flag '{other}', try --help")),
        }
    }
    Ok(config)
}

// The TUI owns the terminal, so logs roll into files under logs/.
fn init_tracing() -> WorkerGuard {
    let appender = rolling::daily("logs", "double-or-nothing.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let config = parse_cli_args()?;
    let _guard = init_tracing();
    client::run_app(config).await
}
