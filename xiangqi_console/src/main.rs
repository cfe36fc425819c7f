use clap::Parser;
use xiangqi_console::{Config, Engine};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::parse();
    let mut engine = Engine::from_config(&config)?;

    engine.run()
}
