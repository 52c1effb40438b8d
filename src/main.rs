//! Lagrange Operator Key Provisioning CLI
//!
//! Generates the operator's ECDSA key, records it in the env file and
//! imports it into the encrypted keystore.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use lagrange_keygen::env_file::PRIVATE_KEY_KEY;
use lagrange_keygen::{
    derive_public_point, verify, Backend, CastCli, Config, EnvFile, KeygenError, LocalWallet, PrivateKey,
    ProvisionReport, Provisioner, PublicPoint,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lagrange-keygen")]
#[command(about = "Provision a secp256k1 operator key for the Lagrange ZK prover network")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Env file to check and extend (default: .env)
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Keystore directory (default: lagrange-zk)
    #[arg(long, global = true)]
    keystore_dir: Option<PathBuf>,

    /// Keystore name (default: avs)
    #[arg(long, global = true)]
    keystore_name: Option<String>,

    /// Key generation and keystore backend
    #[arg(long, value_enum, global = true)]
    backend: Option<Backend>,

    /// Wallet CLI used by the cast backend (default: cast)
    #[arg(long, global = true)]
    cast_bin: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a key, append it to the env file and import it into the keystore (default)
    Generate,

    /// Print the public key coordinates for a private key
    Derive {
        /// 0x-prefixed private key (default: LAGRANGE_ECDSA_SK from the env file)
        #[arg(long)]
        private_key: Option<String>,

        /// Print JSON instead of KEY=VALUE lines
        #[arg(long)]
        json: bool,
    },

    /// Check that the env file and the keystore hold the same key
    Verify,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is reserved for operator output.
    // Override with RUST_LOG, e.g. RUST_LOG=lagrange_keygen=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("info,lagrange_keygen=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            let code = err
                .downcast_ref::<KeygenError>()
                .map(KeygenError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration, then let flags win over the environment
    let mut config = Config::from_env()?;
    if let Some(env_file) = cli.env_file {
        config.env_file = env_file;
    }
    if let Some(dir) = cli.keystore_dir {
        config.keystore.dir = dir;
    }
    if let Some(name) = cli.keystore_name {
        config.keystore.name = name;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(cast_bin) = cli.cast_bin {
        config.cast_bin = cast_bin;
    }
    config.validate()?;

    match cli.command.unwrap_or(Commands::Generate) {
        Commands::Generate => generate(&config).await,
        Commands::Derive { private_key, json } => derive(&config, private_key, json).await,
        Commands::Verify => verify_keystore(&config).await,
    }
}

async fn generate(config: &Config) -> Result<()> {
    println!("\n{}", "=".repeat(70));
    println!("  LAGRANGE OPERATOR KEY PROVISIONING");
    println!(
        "  Env file: {} | Keystore: {} | Backend: {}",
        config.env_file.display(),
        config.keystore.path().display(),
        config.backend
    );
    println!("{}\n", "=".repeat(70));

    let mut stdout = std::io::stdout();
    let report = match config.backend {
        Backend::Native => {
            Provisioner::new(LocalWallet, LocalWallet, &config.env_file, config.keystore.clone())
                .provision(&mut stdout)
                .await?
        }
        Backend::Cast => {
            let cast = CastCli::new(&config.cast_bin);
            Provisioner::new(cast.clone(), cast, &config.env_file, config.keystore.clone())
                .provision(&mut stdout)
                .await?
        }
    };

    print_summary(config, &report);
    Ok(())
}

fn print_summary(config: &Config, report: &ProvisionReport) {
    println!("\n{}", "-".repeat(70));
    println!("  Address:  {}", report.material.address);
    println!("  ECDSA_X:  {}", report.material.public.x);
    println!("  ECDSA_Y:  {}", report.material.public.y);
    println!("  Env file: {}", config.env_file.display());
    println!("  Keystore: {}", report.keystore_path.display());
    if report.removed_stale_keystore {
        println!("  {}", "Replaced a keystore left by an earlier run".yellow());
    }
    println!("{}", "-".repeat(70));
    println!(
        "{}",
        "The private key above is stored in plaintext in the env file. Keep a backup somewhere safe.".yellow()
    );
}

#[derive(Serialize)]
struct DerivedKey {
    address: String,
    #[serde(flatten)]
    public: PublicPoint,
}

async fn derive(config: &Config, private_key: Option<String>, json: bool) -> Result<()> {
    let key = match private_key {
        Some(hex) => PrivateKey::parse(&hex)?,
        None => {
            let env = EnvFile::load(&config.env_file).await?;
            PrivateKey::parse(env.require(PRIVATE_KEY_KEY)?)?
        }
    };

    let derived = DerivedKey {
        address: key.address().to_string(),
        public: derive_public_point(&key),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&derived)?);
    } else {
        println!("ECDSA_X={}", derived.public.x);
        println!("ECDSA_Y={}", derived.public.y);
        println!("# address {}", derived.address);
    }

    Ok(())
}

async fn verify_keystore(config: &Config) -> Result<()> {
    let address = verify(&config.env_file, &config.keystore).await?;

    println!(
        "{} {} matches {} ({})",
        "OK".green().bold(),
        config.keystore.path().display(),
        config.env_file.display(),
        address
    );
    Ok(())
}
