//! Viper Client
//!
//! A CLI tool for sending signed relays to the nodes of a Viper session.

mod config;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use config::ClientConfig;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use viper_core::{Aat, KeySigner, Node, Session};
use viper_relayer::{HttpProvider, RelayRequestOptions, Relayer, RelayerInput};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a fresh client key pair
    Keygen,

    /// Send one relay to a session node
    Relay(RelayArgs),

    /// Print the hash of an application authentication token
    HashAat {
        /// Path to the AAT JSON file
        #[arg(long)]
        aat: PathBuf,

        /// Application private key (hex) used to sign the token before printing it
        #[arg(long, env = "VIPER_APP_PRIVATE_KEY")]
        sign_with: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
struct RelayArgs {
    /// Path to the session JSON file
    #[arg(long)]
    session: PathBuf,

    /// Path to the AAT JSON file
    #[arg(long)]
    aat: PathBuf,

    /// Request body forwarded to the blockchain
    #[arg(long)]
    data: String,

    /// HTTP method of the relayed request
    #[arg(long)]
    method: Option<String>,

    /// Path of the relayed request
    #[arg(long, default_value = "")]
    path: String,

    /// Request header as key=value (repeatable)
    #[arg(long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Public key of the servicer to use instead of a random session node
    #[arg(long)]
    node: Option<String>,

    /// Chain identifier to relay to
    #[arg(long)]
    blockchain: Option<String>,

    /// Client private key (hex encoded)
    #[arg(long, env = "VIPER_PRIVATE_KEY")]
    private_key: Option<String>,

    /// Timeout for the relay round trip in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("Invalid header '{}', expected key=value", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid header '{}', key is empty", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            ClientConfig::from_file(path)
                .map_err(|e| anyhow!("Failed to load config {}: {}", path.display(), e))?
        }
        None if Path::new("config.toml").exists() => {
            info!("Automatically loading config from: config.toml");
            ClientConfig::from_file("config.toml")
                .map_err(|e| anyhow!("Failed to load config config.toml: {}", e))?
        }
        None => ClientConfig::from_env()
            .map_err(|e| anyhow!("Failed to load config from environment: {}", e))?,
    };
    config.validate()?;
    Ok(config)
}

/// Resolve `--node` against the session.
///
/// A key the session does not list is still passed through so the relayer
/// reports it as unauthorized.
fn resolve_node(session: &Session, public_key: &str) -> Node {
    session
        .nodes
        .iter()
        .find(|node| node.public_key == public_key)
        .cloned()
        .unwrap_or_else(|| Node::new(public_key, ""))
}

fn build_input(args: &RelayArgs, config: &ClientConfig, session: Session, aat: Aat) -> RelayerInput {
    let headers = if args.headers.is_empty() {
        None
    } else {
        Some(args.headers.iter().cloned().collect::<BTreeMap<_, _>>())
    };
    let node = args.node.as_deref().map(|pk| resolve_node(&session, pk));

    RelayerInput {
        blockchain: args
            .blockchain
            .clone()
            .unwrap_or_else(|| config.relay.blockchain.clone()),
        data: args.data.clone(),
        headers,
        method: args
            .method
            .clone()
            .unwrap_or_else(|| config.relay.method.clone()),
        node,
        path: args.path.clone(),
        aat: Some(aat),
        session: Some(session),
    }
}

async fn run_relay(args: RelayArgs, config: ClientConfig) -> Result<()> {
    let private_key = args
        .private_key
        .clone()
        .or_else(|| config.signer.private_key.clone())
        .ok_or_else(|| anyhow!("No client private key given (use --private-key or VIPER_PRIVATE_KEY)"))?;
    let signer = KeySigner::from_hex(&private_key)?;
    info!("Relaying as client {}", signer.public_key());

    let timeout = args
        .timeout_secs
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| config.timeout());

    let session: Session = read_json(&args.session)?;
    let aat: Aat = read_json(&args.aat)?;
    let input = build_input(&args, &config, session, aat);
    debug!("Relay input: {:?}", input);

    let relayer = Relayer::builder()
        .signer(signer)
        .provider(HttpProvider::new(timeout)?)
        .build();

    let options = RelayRequestOptions {
        timeout: Some(timeout),
    };
    let output = relayer.relay(&input, Some(&options)).await?;
    info!("Relay serviced by {}", output.node.public_key);

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_hash_aat(path: &Path, sign_with: Option<&str>) -> Result<()> {
    let aat: Aat = read_json(path)?;

    match sign_with {
        Some(app_key) => {
            let app_signer = KeySigner::from_hex(app_key)?;
            if app_signer.public_key().to_hex() != aat.app_pub_key {
                return Err(anyhow!(
                    "Signing key {} does not match the token's application key {}",
                    app_signer.public_key(),
                    aat.app_pub_key
                ));
            }
            let signed = aat.sign(&app_signer)?;
            println!("{}", serde_json::to_string_pretty(&signed)?);
        }
        None => println!("{}", aat.hash()?),
    }
    Ok(())
}

fn run_keygen() {
    let signer = KeySigner::generate();
    println!("Private key: {}", signer.private_key_hex());
    println!("Public key:  {}", signer.public_key());
    println!("Address:     {}", signer.address());
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(log_level.parse()?)
                .add_directive("hyper=warn".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Keygen => run_keygen(),
        Command::Relay(relay_args) => {
            let config = load_config(args.config.as_deref())?;
            run_relay(relay_args, config).await?;
        }
        Command::HashAat { aat, sign_with } => run_hash_aat(&aat, sign_with.as_deref())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use viper_core::SessionHeader;

    fn sample_session() -> Session {
        Session::new(
            SessionHeader {
                app_public_key: "a1b2".to_string(),
                chain: "0021".to_string(),
                session_height: 100,
            },
            vec![
                Node::new("AOG", "https://node1.example.com"),
                Node::new("BOG", "https://node2.example.com"),
            ],
        )
    }

    fn sample_args() -> RelayArgs {
        RelayArgs {
            session: PathBuf::from("session.json"),
            aat: PathBuf::from("aat.json"),
            data: "{}".to_string(),
            method: None,
            path: String::new(),
            headers: Vec::new(),
            node: None,
            blockchain: None,
            private_key: None,
            timeout_secs: None,
        }
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Content-Type=application/json").unwrap(),
            ("Content-Type".to_string(), "application/json".to_string())
        );
        assert_eq!(
            parse_header("X-Query = a=b").unwrap(),
            ("X-Query".to_string(), "a=b".to_string())
        );
        assert!(parse_header("no-separator").is_err());
        assert!(parse_header("=value").is_err());
    }

    #[test]
    fn test_cli_parses_relay_command() {
        let args = Args::try_parse_from([
            "viper-client",
            "relay",
            "--session",
            "s.json",
            "--aat",
            "a.json",
            "--data",
            "{}",
            "--header",
            "k=v",
            "--node",
            "AOG",
            "--debug",
        ])
        .unwrap();

        assert!(args.debug);
        match args.command {
            Command::Relay(relay) => {
                assert_eq!(relay.session, PathBuf::from("s.json"));
                assert_eq!(relay.headers, vec![("k".to_string(), "v".to_string())]);
                assert_eq!(relay.node.as_deref(), Some("AOG"));
            }
            other => panic!("Expected relay command, got {:?}", other),
        }
    }

    #[test]
    fn test_build_input_uses_config_defaults() {
        let config = ClientConfig::default();
        let input = build_input(&sample_args(), &config, sample_session(), Aat::new("0.0.1", "a1b2", "c3d4"));

        assert_eq!(input.blockchain, "0021");
        assert_eq!(input.method, "POST");
        assert!(input.headers.is_none());
        assert!(input.node.is_none());
        assert!(input.session.is_some());
        assert!(input.aat.is_some());
    }

    #[test]
    fn test_build_input_flags_override_config() {
        let mut args = sample_args();
        args.blockchain = Some("0040".to_string());
        args.method = Some("GET".to_string());
        args.headers = vec![("b".to_string(), "2".to_string()), ("a".to_string(), "1".to_string())];
        args.node = Some("BOG".to_string());

        let input = build_input(&args, &ClientConfig::default(), sample_session(), Aat::new("0.0.1", "a1b2", "c3d4"));

        assert_eq!(input.blockchain, "0040");
        assert_eq!(input.method, "GET");
        let headers = input.headers.unwrap();
        assert_eq!(headers.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(input.node.unwrap().service_url, "https://node2.example.com");
    }

    #[test]
    fn test_resolve_unknown_node_keeps_key() {
        let node = resolve_node(&sample_session(), "ZZZ");
        assert_eq!(node.public_key, "ZZZ");
        assert!(node.service_url.is_empty());
    }

    #[test]
    fn test_read_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aat.json");
        std::fs::write(&path, "not json").unwrap();

        let err = read_json::<Aat>(&path).unwrap_err();
        assert!(err.to_string().contains("aat.json"));

        std::fs::write(&path, r#"{"version":"0.0.1","app_pub_key":"a1b2","client_pub_key":"c3d4","signature":""}"#).unwrap();
        let aat: Aat = read_json(&path).unwrap();
        assert_eq!(aat.client_pub_key, "c3d4");
    }
}
