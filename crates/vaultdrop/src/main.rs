//! vaultdrop command-line client.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vaultdrop::{
    CipherSuite, ClientConfig, FileId, Recipient, RecipientPrivateKey, RecipientPublicKey,
    RemoteStore, Sender, Store,
};

#[derive(Parser, Debug)]
#[command(name = "vaultdrop", version, about = "Send files encrypted for one recipient")]
struct Cli {
    /// Server base URL (overrides VAULTDROP_SERVER_URL)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt a file and upload it
    Send {
        file: PathBuf,

        /// Recipient public key file (SPKI as PEM, hex or base64).
        /// Falls back to VAULTDROP_RECIPIENT_KEY.
        #[arg(long)]
        recipient_key: Option<PathBuf>,

        /// Use ChaCha20-Poly1305 for the body instead of AES-256-GCM
        #[arg(long)]
        chacha: bool,
    },

    /// Download and decrypt a file
    Fetch {
        id: FileId,

        /// Private key file (PKCS#8 as PEM, hex or base64)
        #[arg(long)]
        private_key: PathBuf,

        /// Output path; defaults to the original file name
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List stored records
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(server) = cli.server {
        config.server_url = server.trim_end_matches('/').to_string();
    }
    let store = RemoteStore::new(&config)?;

    match cli.command {
        Command::Send {
            file,
            recipient_key,
            chacha,
        } => {
            let recipient = match recipient_key {
                Some(path) => RecipientPublicKey::parse(&read_key(&path).await?)?,
                None => match config.recipient_public_key()? {
                    Some(key) => key,
                    None => bail!("no recipient key: pass --recipient-key or set VAULTDROP_RECIPIENT_KEY"),
                },
            };
            let mut sender = Sender::new(recipient, store);
            if chacha {
                sender = sender.with_suite(CipherSuite::ChaCha20Poly1305);
            }
            let receipt = sender
                .send_path(&file)
                .await
                .with_context(|| format!("sending {}", file.display()))?;
            println!("{}", receipt.id);
            eprintln!("sha256 {}", receipt.digest.to_hex());
        }

        Command::Fetch {
            id,
            private_key,
            out,
        } => {
            let key = RecipientPrivateKey::parse(&read_key(&private_key).await?)?;
            let file = Recipient::new(key, store).fetch(&id).await?;

            let out = out.unwrap_or_else(|| safe_output_name(&file.filename));
            tokio::fs::write(&out, &file.contents)
                .await
                .with_context(|| format!("writing {}", out.display()))?;
            println!("{}", out.display());
        }

        Command::List => {
            for record in store.list().await? {
                println!(
                    "{}  {}  {}",
                    record.id,
                    record.upload_timestamp.to_rfc3339(),
                    record.original_filename
                );
            }
        }
    }

    Ok(())
}

async fn read_key(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading key file {}", path.display()))
}

/// Last path component of a server-supplied name, so a record cannot
/// direct the write outside the working directory.
fn safe_output_name(name: &str) -> PathBuf {
    Path::new(name)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("download.bin"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "vaultdrop=warn".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
