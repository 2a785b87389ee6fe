// src/bin/vault_tool.rs
//! vault-tool: offline conversions for encrypted vault files
//!
//! from-csv  CSV -> encrypted `.vault.json`
//! to-csv    encrypted `.vault.json` -> plaintext CSV (explicit confirmation)
//! list      titles/usernames/urls of a vault file, never passwords
//! generate  print a random password

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rpassword::prompt_password;
use tracing::{info, warn};

use encrypted_credential_vault::generator::DEFAULT_LENGTH;
use encrypted_credential_vault::{
    generate_password, load_config, logging, EncryptedVaultFile, GeneratorOptions, ImportOutcome, MasterPassword,
    VaultSession,
};

#[derive(Parser)]
#[command(name = "vault-tool", version, about = "Encrypted credential vault utilities")]
struct Cli {
    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Encrypt a CSV export into a vault file
    FromCsv {
        input: PathBuf,
        /// Defaults to `<export_dir>/vault-YYYY-MM-DD.vault.json`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decrypt a vault file to plaintext CSV
    ToCsv {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Skip the interactive confirmation
        #[arg(long)]
        yes: bool,
    },
    /// List entries without secrets
    List {
        input: PathBuf,
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Print a random password
    Generate {
        #[arg(short, long, default_value_t = DEFAULT_LENGTH)]
        length: usize,
        #[arg(long)]
        symbols: bool,
        #[arg(long)]
        no_digits: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match cli.command {
        Cmd::FromCsv { input, output } => from_csv(&input, output).await,
        Cmd::ToCsv { input, output, yes } => to_csv(&input, &output, yes).await,
        Cmd::List { input, query } => list(&input, &query).await,
        Cmd::Generate {
            length,
            symbols,
            no_digits,
        } => {
            let options = GeneratorOptions {
                symbols,
                digits: !no_digits,
                ..GeneratorOptions::default()
            };
            println!("{}", generate_password(length, options).expose_secret());
            Ok(())
        }
    }
}

fn ask_password(prompt: &str) -> Result<MasterPassword> {
    let password = prompt_password(prompt).context("Failed to read master password")?;
    Ok(MasterPassword::new(password))
}

fn ask_new_password() -> Result<MasterPassword> {
    let first = ask_password("New master password: ")?;
    let second = ask_password("Repeat master password: ")?;
    if first.expose_secret() != second.expose_secret() {
        bail!("Passwords do not match");
    }
    Ok(first)
}

async fn open_vault(input: &Path) -> Result<VaultSession> {
    let bytes = std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let file = EncryptedVaultFile::from_json(&bytes).context("Not a vault file")?;
    let password = ask_password("Master password: ")?;

    let mut session = VaultSession::new();
    match session
        .import_from_file(file, password)
        .await
        .context("Could not open vault")?
    {
        ImportOutcome::Applied { entries } => info!(entries, "vault opened"),
        ImportOutcome::Discarded => bail!("Vault import was superseded"),
    }
    Ok(session)
}

async fn from_csv(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let text = std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let mut session = VaultSession::new();
    let count = session.import_from_csv(&text);

    let password = ask_new_password()?;
    let exported = session.export_to_file(password).await.context("Encryption failed")?;

    let path = match output {
        Some(path) => path,
        None => {
            let dir = PathBuf::from(&load_config().paths.export_dir);
            std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
            dir.join(&exported.filename)
        }
    };
    std::fs::write(&path, &exported.bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(entries = count, path = %path.display(), "vault written");
    Ok(())
}

async fn to_csv(input: &Path, output: &Path, yes: bool) -> Result<()> {
    if !load_config().features.allow_insecure_export {
        bail!("Plaintext export disabled (features.allow_insecure_export = false)");
    }
    let session = open_vault(input).await?;

    if !yes && !confirm("The CSV will contain every password in cleartext. Continue? [y/N] ")? {
        warn!("plaintext export cancelled");
        return Ok(());
    }

    let csv = zeroize::Zeroizing::new(session.export_csv()?);
    std::fs::write(output, csv.as_bytes()).with_context(|| format!("Failed to write {}", output.display()))?;
    warn!(path = %output.display(), "plaintext CSV written, delete it when done");
    Ok(())
}

async fn list(input: &Path, query: &str) -> Result<()> {
    let session = open_vault(input).await?;
    for entry in session.search(query) {
        println!("{}\t{}\t{}", entry.title, entry.username, entry.url);
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
