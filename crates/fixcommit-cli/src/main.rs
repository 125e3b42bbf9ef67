//! fixcommit CLI - canonicalize FIX messages, commit to them, and check proofs.

use clap::{Args, Parser, Subcommand};
use fixcommit_canonical::Delimiter;

mod commands;
mod input;
mod output;

use commands::{blob_get, commit, encode, leaves, prove, tree, verify};

#[derive(Parser)]
#[command(name = "fixcommit")]
#[command(about = "FIX descriptor canonicalization, Merkle commitment, and proof CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where a message comes from and how to read it.
#[derive(Args, Debug, Clone)]
pub struct MessageArgs {
    /// Input message file (or stdin if not provided)
    pub input: Option<String>,
    /// Pair separator: auto, pipe, soh, or newline
    #[arg(long, default_value_t = Delimiter::Auto)]
    pub delimiter: Delimiter,
    /// Group schema JSON file (default: built-in instrument schema)
    #[arg(long)]
    pub schema: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print canonical bytes as hex
    Encode {
        #[command(flatten)]
        message: MessageArgs,
        /// Print the extraction report to stderr
        #[arg(long)]
        report: bool,
    },
    /// Print the canonical tree as JSON
    Tree {
        #[command(flatten)]
        message: MessageArgs,
    },
    /// List committed leaves in commitment order
    Leaves {
        #[command(flatten)]
        message: MessageArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute the Merkle root and descriptor
    Commit {
        #[command(flatten)]
        message: MessageArgs,
        /// Append canonical bytes to this blob store file
        #[arg(long)]
        store: Option<String>,
        /// Dictionary hash to record in the descriptor (hex)
        #[arg(long)]
        dict_hash: Option<String>,
    },
    /// Produce an inclusion proof for one field
    Prove {
        #[command(flatten)]
        message: MessageArgs,
        /// Field path, e.g. 453.0.448
        #[arg(long)]
        path: String,
    },
    /// Verify a proof document against a root
    Verify {
        /// Proof JSON file (or stdin if not provided)
        proof: Option<String>,
        /// Root to verify against (default: the proof document's root)
        #[arg(long)]
        root: Option<String>,
    },
    /// Fetch canonical bytes from a blob store
    BlobGet {
        /// Path to blob store file
        store: String,
        /// Content digest (sha-256:<b64> or bare b64)
        #[arg(long)]
        digest: String,
        /// Descriptor JSON file to check the bytes against
        #[arg(long)]
        descriptor: Option<String>,
        /// Print the decoded tree instead of hex
        #[arg(long)]
        tree: bool,
        /// Treat a truncated store tail as end-of-file
        #[arg(long)]
        permissive: bool,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encode { message, report } => encode::run(message, report),
        Commands::Tree { message } => tree::run(message),
        Commands::Leaves { message, json } => leaves::run(message, json),
        Commands::Commit {
            message,
            store,
            dict_hash,
        } => commit::run(message, store, dict_hash),
        Commands::Prove { message, path } => prove::run(message, path),
        Commands::Verify { proof, root } => verify::run(proof, root),
        Commands::BlobGet {
            store,
            digest,
            descriptor,
            tree,
            permissive,
        } => blob_get::run(store, digest, descriptor, tree, permissive),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs to stderr, filtered by `RUST_LOG` (default: warn).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
