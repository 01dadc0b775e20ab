use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use pdf_stm::StreamOptions;
mod commands;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    #[arg(long, default_value_t = 4096)]
    cache_size: usize,

    #[arg(long, default_value_t = 4096)]
    buffer_size: usize,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Encode a file with the given filters, in PDF `/Filter` order.
    Encode(commands::FilterArgs),
    /// Decode a file with the given filters, in PDF `/Filter` order.
    Decode(commands::FilterArgs),
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let options = StreamOptions {
        cache_size: cli.cache_size,
        filter_buffer_size: cli.buffer_size,
    };
    info!(
        "Process {:?} into {:?}",
        cli.input.display(),
        cli.output.display()
    );
    let res = match cli.command {
        Commands::Encode(args) => {
            commands::encode::command(&cli.input, &cli.output, options, &args)
        }
        Commands::Decode(args) => {
            commands::decode::command(&cli.input, &cli.output, options, &args)
        }
    };
    match res {
        Ok(n) => info!("wrote {} bytes", n),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
