use clap::Parser;
use sensordash::cli::{
    command, handle_completions, handle_config_init, simulate, status, watch, Cli, Commands,
    ConfigCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Watch(args) => watch::run_watch(args).await,
        Commands::Status(args) => status::handle_status(&args).await.map(|out| println!("{}", out)),
        Commands::Toggle(args) => command::handle_toggle(&args)
            .await
            .map(|out| println!("{}", out)),
        Commands::Set(args) => command::handle_set(&args).await.map(|out| println!("{}", out)),
        Commands::Simulate(args) => simulate::run_simulate(args).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
