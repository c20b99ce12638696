use std::process;

use clap::Parser;

mod clipboard;
mod generate;
mod request;
mod table;

#[derive(Parser)]
#[command(about = "Generate strong random passwords")]
enum Args {
    /// Generate passwords and print them to stdout.
    Generate(generate::GenerateArgs),
    /// Read a JSON password request from stdin and write the JSON response to stdout.
    Request {
        /// The request method; anything but POST is rejected.
        #[arg(long, default_value = "POST")]
        method: String,
        /// Print the status line and headers before the body.
        #[arg(long, short = 'i')]
        include: bool,
    },
}

fn run() -> Result<(), ProgError> {
    let args = Args::parse();

    match args {
        Args::Generate(args) => generate::generate(args)?,
        Args::Request { method, include } => request::respond(&method, include)?,
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => (),
        Err(ProgError::Other(err)) => {
            eprintln!("Error: {err:?}");
            process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ProgError {
    #[error("Only a single password can be copied to the clipboard; drop --count or --copy.")]
    CopyNeedsSinglePassword,
    #[error("The request was answered with {0}.")]
    RequestRejected(passgen::request::Status),
    #[error("Failed to generate a password: {0}")]
    Generate(passgen::GenerateError),
    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for ProgError {
    fn from(err: anyhow::Error) -> ProgError {
        ProgError::Other(err)
    }
}

impl From<passgen::GenerateError> for ProgError {
    fn from(err: passgen::GenerateError) -> ProgError {
        ProgError::Generate(err)
    }
}
