use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mailping_lib::verifier::{
    DEFAULT_ATTEMPTS, DEFAULT_FQDN, DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_CONCURRENCY, DEFAULT_PORT,
    DEFAULT_SENDER, DEFAULT_TIMEOUT_MS,
};
use mailping_lib::{DisposableRegistry, VerificationOptions};

#[derive(Parser)]
#[command(name = "mailping-cli", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    #[command(flatten)]
    pub probe: ProbeArgs,

    /// format: human|json|ndjson|csv
    #[arg(long, env = "MAILPING_FORMAT", default_value = "human", global = true)]
    pub format: String,

    /// write report to file (JSON/NDJSON/CSV selon --format)
    #[arg(long, env = "MAILPING_OUT", global = true)]
    pub out: Option<String>,

    /// fichier de domaines jetables supplémentaires (un par ligne, `#` commentaires)
    #[arg(long, env = "MAILPING_DISPOSABLE_LIST", global = true)]
    pub disposable_list: Option<PathBuf>,

    /// logs détaillés (niveau debug, surchargé par RUST_LOG)
    #[arg(long, env = "MAILPING_DEBUG", global = true)]
    pub debug: bool,
}

#[derive(Args)]
pub struct ProbeArgs {
    /// port SMTP des serveurs MX
    #[arg(long, env = "MAILPING_PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    /// nom annoncé dans EHLO
    #[arg(long, env = "MAILPING_FQDN", default_value = DEFAULT_FQDN, global = true)]
    pub fqdn: String,

    /// enveloppe MAIL FROM
    #[arg(long, env = "MAILPING_SENDER", default_value = DEFAULT_SENDER, global = true)]
    pub sender: String,

    /// délai par tentative SMTP (ms), aussi utilisé pour le DNS
    #[arg(long = "timeout", env = "MAILPING_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS, global = true)]
    pub timeout_ms: u64,

    /// nombre de tentatives SMTP sur réponse 421/450/451
    #[arg(long, env = "MAILPING_ATTEMPTS", default_value_t = DEFAULT_ATTEMPTS, global = true)]
    pub attempts: u32,

    /// s'arrête après la résolution MX (VALID_IGNORED_SMTP)
    #[arg(long, env = "MAILPING_IGNORE_SMTP", global = true)]
    pub ignore_smtp: bool,

    /// taille maximale d'un lot
    #[arg(long, env = "MAILPING_MAX_BATCH_SIZE", default_value_t = DEFAULT_MAX_BATCH_SIZE, global = true)]
    pub max_batch_size: usize,

    /// vérifications simultanées dans un lot
    #[arg(long, env = "MAILPING_MAX_CONCURRENCY", default_value_t = DEFAULT_MAX_CONCURRENCY, global = true)]
    pub max_concurrency: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// vérifie une adresse (syntaxe, jetable, MX, SMTP)
    Ping { email: String },
    /// vérifie une liste d'adresses, découpée en lots de --max-batch-size
    Batch {
        emails: Vec<String>,
        /// lit des adresses depuis stdin (une par ligne)
        #[arg(long)]
        stdin: bool,
    },
    /// contrôle de syntaxe seul, sans réseau
    Syntax { email: String },
    /// résout les enregistrements MX du domaine de l'adresse
    Mx { email: String },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn options(&self) -> VerificationOptions {
        let probe = &self.probe;
        VerificationOptions {
            port: probe.port,
            fqdn: probe.fqdn.clone(),
            sender: probe.sender.clone(),
            timeout_ms: probe.timeout_ms,
            attempts: probe.attempts,
            ignore_smtp_verify: probe.ignore_smtp,
            debug: self.debug,
            max_batch_size: probe.max_batch_size,
            max_concurrency: probe.max_concurrency,
        }
    }

    pub fn disposable_registry(&self) -> Result<DisposableRegistry> {
        let registry = DisposableRegistry::new();
        let Some(path) = &self.disposable_list else {
            return Ok(registry);
        };
        let file =
            File::open(path).with_context(|| format!("open --disposable-list {}", path.display()))?;
        registry
            .extend_from_reader(BufReader::new(file))
            .with_context(|| format!("read --disposable-list {}", path.display()))
    }
}
