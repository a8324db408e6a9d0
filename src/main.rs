// Entry point for the eosign command-line tool
// Everything here is glue: parsing, config, and printing. The signing itself
// lives in the library so it can be reused without the CLI.
use clap::Parser;
use eosign::cli::SignRequest;
use eosign::{
    sign_transaction, u64_to_name, Command, Config, KeyFormat, Name, Opt, PrivateKey, Signature,
    SigningError,
};
use log::{error, info};
use std::path::Path;
use std::process;

fn main() {
    let opt = Opt::parse();

    // Config decides the log level, so it has to be read before logging exists
    let config = match load_config(opt.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let level = config
        .log_level_filter()
        .unwrap_or(log::LevelFilter::Info);
    env_logger::builder().filter_level(level).init();

    if let Err(e) = run_command(opt.command, &config) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> eosign::Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::new(),
    }
}

fn run_command(command: Command, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Pubkey { key, format } => {
            let key = PrivateKey::from_wif(&key)?;
            let format = format.unwrap_or(config.key_format);
            println!(
                "{}",
                key.public_key().to_string_as(format, &config.key_prefix)
            );
        }
        Command::Genkey { format } => {
            let format = format.unwrap_or(config.key_format);
            let key = PrivateKey::generate(format);
            let private = match format {
                KeyFormat::Legacy => key.to_wif(),
                KeyFormat::Modern => key.to_modern_string(),
            };
            println!("Private key: {}", private.as_str());
            println!(
                "Public key: {}",
                key.public_key().to_string_as(format, &config.key_prefix)
            );
        }
        Command::Name { text, value } => match (text, value) {
            (Some(text), _) => {
                let name: Name = text.parse()?;
                println!("{}", name.value());
            }
            (None, Some(value)) => println!("{}", u64_to_name(value)),
            (None, None) => return Err("Provide a name or --value".into()),
        },
        Command::Sign { request, key } => {
            let request = SignRequest::load(&request)?;
            let key = PrivateKey::from_wif(&key)?;
            let transaction = request.build_transaction(config.expiration())?;
            let signed = sign_transaction(&request.chain.chain_id, &transaction, &key)?;
            info!("Transaction id: {}", signed.id());
            println!("{}", signed.to_json()?);
        }
        Command::Recover { signature, digest } => {
            let signature: Signature = signature.parse()?;
            let digest = parse_digest(&digest)?;
            let public_key = signature.recover_public_key(&digest)?;
            println!(
                "{}",
                public_key.to_string_as(config.key_format, &config.key_prefix)
            );
        }
    }
    Ok(())
}

fn parse_digest(text: &str) -> eosign::Result<[u8; 32]> {
    let bytes = hex::decode(text)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| SigningError::LengthMismatch {
            expected: 32,
            actual: len,
        })
}
