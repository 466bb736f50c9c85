use clap::Parser;
use kitsu_import::cli::{Cli, Commands};
use kitsu_import::{Config, run};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Init) = cli.command {
        let path = cli.config_path();
        if Config::create_default_if_missing(&path)? {
            println!("Config file created at {}. Edit it and run again.", path.display());
        } else {
            println!("Config file already exists at {}", path.display());
        }
        return Ok(());
    }

    let config = cli.load_config()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config))
}
