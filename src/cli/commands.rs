use crate::wallet::KeyFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "eosign", about = "Offline EOSIO key and transaction signing")]
pub struct Opt {
    #[arg(long = "config", global = true, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "pubkey", about = "Print the public key of a private key")]
    Pubkey {
        #[arg(help = "Private key, 5... (WIF) or PVT_K1_...")]
        key: String,
        #[arg(long = "format", help = "Public key format (legacy, modern)")]
        format: Option<KeyFormat>,
    },
    #[command(name = "genkey", about = "Generate a new random key pair")]
    Genkey {
        #[arg(long = "format", help = "Key format (legacy, modern)")]
        format: Option<KeyFormat>,
    },
    #[command(name = "name", about = "Convert between an account name and its u64 value")]
    Name {
        #[arg(help = "Account or action name", required_unless_present = "value")]
        text: Option<String>,
        #[arg(long = "value", help = "u64 value to decode", conflicts_with = "text")]
        value: Option<u64>,
    },
    #[command(name = "sign", about = "Build and sign a transaction from a JSON request")]
    Sign {
        #[arg(long = "request", help = "JSON file with chain info and actions")]
        request: PathBuf,
        #[arg(long = "key", help = "Private key, 5... (WIF) or PVT_K1_...")]
        key: String,
    },
    #[command(
        name = "recover",
        about = "Recover the public key behind a signature"
    )]
    Recover {
        #[arg(long = "signature", help = "Signature, SIG_K1_...")]
        signature: String,
        #[arg(long = "digest", help = "Signed 32-byte digest as hex")]
        digest: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pubkey_with_format() {
        let opt = Opt::try_parse_from(["eosign", "pubkey", "5Kabc", "--format", "modern"]).unwrap();
        match opt.command {
            Command::Pubkey { key, format } => {
                assert_eq!(key, "5Kabc");
                assert_eq!(format, Some(KeyFormat::Modern));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_sign_with_global_config() {
        let opt = Opt::try_parse_from([
            "eosign",
            "sign",
            "--request",
            "tx.json",
            "--key",
            "5Kabc",
            "--config",
            "eosign.toml",
        ])
        .unwrap();
        assert_eq!(opt.config, Some(PathBuf::from("eosign.toml")));
        assert!(matches!(opt.command, Command::Sign { .. }));
    }

    #[test]
    fn test_name_needs_text_or_value() {
        assert!(Opt::try_parse_from(["eosign", "name"]).is_err());
        assert!(Opt::try_parse_from(["eosign", "name", "eosio", "--value", "1"]).is_err());
        assert!(Opt::try_parse_from(["eosign", "name", "--value", "1"]).is_ok());
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Opt::try_parse_from(["eosign", "genkey", "--format", "r1"]).is_err());
    }
}
