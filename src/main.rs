use std::{io, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use pkigen::{cmd, Config, X509Encoder};

#[derive(Parser)]
#[command(name = "pkigen", version, about = "Generate CRLs and CSRs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a new Certificate Revocation List
    #[command(after_help = cmd::gencrl::USAGE)]
    Gencrl {
        #[command(flatten)]
        signing: SigningArgs,

        /// INPUTFILE [TIME]
        #[arg(value_name = "ARGS")]
        args: Vec<String>,
    },

    /// Generate a CSR from a private key with an existing CSR JSON specification or certificate
    #[command(after_help = cmd::gencsr::USAGE)]
    Gencsr {
        #[command(flatten)]
        signing: SigningArgs,

        /// Hostname override, comma separated
        #[arg(long)]
        hostname: Option<String>,

        /// CSRJSON
        #[arg(value_name = "ARGS")]
        args: Vec<String>,
    },
}

#[derive(Args)]
struct SigningArgs {
    /// Certificate file
    #[arg(long)]
    cert: Option<PathBuf>,

    /// CA certificate file
    #[arg(long)]
    ca: Option<PathBuf>,

    /// CA private key file
    #[arg(long = "ca-key")]
    ca_key: Option<PathBuf>,

    /// Private key file
    #[arg(long)]
    key: Option<PathBuf>,

    /// Remote signer address
    #[arg(long)]
    remote: Option<String>,

    /// Signing config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl SigningArgs {
    fn into_config(self, hostname: Option<String>) -> Config {
        Config {
            cert_file: self.cert,
            ca_file: self.ca,
            ca_key_file: self.ca_key,
            key_file: self.key,
            hostname,
            remote: self.remote,
            config_file: self.config,
        }
    }
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Gencrl { signing, args } => {
            let config = signing.into_config(None);
            cmd::gencrl(&args, &config, &X509Encoder, &mut stdout)?;
        }

        Command::Gencsr {
            signing,
            hostname,
            args,
        } => {
            let config = signing.into_config(hostname);
            cmd::gencsr(&args, &config, &X509Encoder, &mut stdout)?;
        }
    }

    Ok(())
}
