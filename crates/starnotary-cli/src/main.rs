use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use starnotary_core::crypto::{address_from_secret_hex, generate_secret_hex, sign_message};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "starnotary-cli")]
#[command(about = "CLI client for the star notary node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:8200)
    #[arg(long, global = true, env = "STARNOTARY_NODE", default_value = "http://127.0.0.1:8200")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current chain height
    Height,
    /// Fetch a block by height or by hash
    Block {
        #[arg(long, conflicts_with = "hash")]
        height: Option<u64>,
        #[arg(long)]
        hash: Option<String>,
    },
    /// Ask the node for an ownership message to sign
    Request {
        #[arg(long)]
        address: String,
    },
    /// Register star data with a signed ownership message
    Submit {
        #[arg(long)]
        address: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        signature: String,
        /// Star data as JSON
        #[arg(long)]
        star: String,
    },
    /// List the stars registered to an address
    Stars {
        #[arg(long)]
        address: String,
    },
    /// Audit the whole chain
    Validate,
    /// Generate a new secret key and print its address (offline)
    Keygen,
    /// Print the address owned by a secret key (offline)
    Address {
        #[arg(long, env = "STARNOTARY_SECRET_KEY")]
        secret_key: String,
    },
    /// Sign an ownership message with a secret key (offline)
    Sign {
        #[arg(long, env = "STARNOTARY_SECRET_KEY")]
        secret_key: String,
        #[arg(long)]
        message: String,
    },
}

#[derive(Serialize)]
struct AddressIn<'a> {
    address: &'a str,
}

#[derive(Serialize)]
struct StarIn<'a> {
    address: &'a str,
    message: &'a str,
    signature: &'a str,
    star: serde_json::Value,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = cli.node.trim_end_matches('/');
    let client = reqwest::Client::new();

    let res = match cli.cmd {
        Command::Height => client.get(format!("{node}/chain/height")).send().await?,
        Command::Block { height, hash } => {
            let path = match (height, hash) {
                (Some(height), _) => format!("{node}/block/height/{height}"),
                (None, Some(hash)) => format!("{node}/block/hash/{hash}"),
                (None, None) => anyhow::bail!("pass --height or --hash"),
            };
            client.get(path).send().await?
        }
        Command::Request { address } => {
            client
                .post(format!("{node}/requestValidation"))
                .json(&AddressIn { address: &address })
                .send()
                .await?
        }
        Command::Submit {
            address,
            message,
            signature,
            star,
        } => {
            let star: serde_json::Value =
                serde_json::from_str(&star).context("--star must be valid JSON")?;
            client
                .post(format!("{node}/submitstar"))
                .json(&StarIn {
                    address: &address,
                    message: &message,
                    signature: &signature,
                    star,
                })
                .send()
                .await?
        }
        Command::Stars { address } => client.get(format!("{node}/blocks/{address}")).send().await?,
        Command::Validate => client.get(format!("{node}/validateChain")).send().await?,
        Command::Keygen => {
            let secret = generate_secret_hex();
            println!("secret_key: {secret}");
            println!("address: {}", address_from_secret_hex(&secret)?);
            return Ok(());
        }
        Command::Address { secret_key } => {
            println!("{}", address_from_secret_hex(&secret_key)?);
            return Ok(());
        }
        Command::Sign {
            secret_key,
            message,
        } => {
            println!("address: {}", address_from_secret_hex(&secret_key)?);
            println!("signature: {}", sign_message(&secret_key, &message)?);
            return Ok(());
        }
    };

    let status = res.status();
    let body = res.text().await?;
    debug!(%status, "node responded");
    println!("status: {}", status);
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}
