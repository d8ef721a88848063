//! # zdag
//!
//! Explodes Zcash blocks into content-addressed chunks on disk and assembles
//! them back.
//!
//! ```text
//! zdag explode --block 0004...ce08.hex --store ./chunks
//! zdag assemble --store ./chunks --root bahaacvra... --out block.hex
//! zdag inspect --store ./chunks bahaqcvra...
//! zdag cid block 00040fe8ec8471911baa1db1266ea15dd06b4a8a5c453883c000b031973dce08
//! zdag hash bahaacvra...
//! zdag demo --txs 9
//! ```
//!
//! The store directory defaults to `$ZDAG_STORE`.

mod logging;
mod store;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use zdag_core::{Codec, ContentAddress};
use zdag_graph::{
    decode_header_chunk, decode_tx_chunk, AssembleConfig, AssembledBlock, ChunkLoader,
    EncodedGraph, EncoderConfig, GraphEncoder, GraphReassembler,
};
use zdag_zcash::sample::sample_block;
use zdag_zcash::Block;

use crate::store::DirChunkStore;

// ─── CLI ───────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "zdag")]
#[command(about = "Content-addressed Zcash block graphs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a hex-encoded block into chunks and write them to the store
    Explode {
        /// File holding the block as hex
        #[arg(long)]
        block: PathBuf,
        #[arg(long, env = "ZDAG_STORE")]
        store: PathBuf,
        /// Also write the witness merkle
        #[arg(long)]
        witness: bool,
    },
    /// Rebuild a block from the store, starting at its header CID
    Assemble {
        #[arg(long, env = "ZDAG_STORE")]
        store: PathBuf,
        #[arg(long)]
        root: ContentAddress,
        /// Write the block as hex here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the decoded block as JSON
        #[arg(long)]
        json: bool,
        /// Skip hashing loaded chunks
        #[arg(long)]
        no_verify: bool,
    },
    /// Decode a single chunk
    Inspect {
        #[arg(long, env = "ZDAG_STORE")]
        store: PathBuf,
        address: ContentAddress,
    },
    /// Convert a block hash or txid to a CID
    Cid { kind: IdKind, hash: String },
    /// Convert a CID to a block hash or txid
    Hash { address: ContentAddress },
    /// Round-trip a synthetic block through a temporary store
    Demo {
        #[arg(long, default_value_t = 9)]
        txs: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long)]
        witness: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum IdKind {
    Block,
    Tx,
}

impl From<IdKind> for Codec {
    fn from(kind: IdKind) -> Self {
        match kind {
            IdKind::Block => Codec::ZcashBlock,
            IdKind::Tx => Codec::ZcashTx,
        }
    }
}

// ─── Pretty printing ──────────────────────────────────────────────────────

fn header(text: &str) {
    let bar = "═".repeat(60);
    println!("\n{}", bar.bright_cyan());
    println!("  {}", text.bold().bright_white());
    println!("{}", bar.bright_cyan());
}

fn section(text: &str) {
    println!("\n{} {}", "▸".bright_yellow(), text.bold());
}

fn field(name: &str, value: impl std::fmt::Display) {
    println!("  {} {:<22} {}", "•".bright_green(), name, value);
}

fn show_graph(graph: &EncodedGraph) {
    section("Graph");
    field("root", graph.root.to_string().bright_magenta());
    field("tx merkle root", graph.tx_root);
    if let Some(witness_root) = &graph.witness_root {
        field("witness merkle root", witness_root);
    }
    field("chunks", graph.stats.chunks);
    field("transactions", graph.stats.transactions);
    field("tx merkle nodes", graph.stats.tx_merkle_nodes);
    field("witness merkle nodes", graph.stats.witness_merkle_nodes);
    field("duplicates", graph.stats.duplicates);
}

fn show_assembled(assembled: &AssembledBlock) {
    section("Reassembly");
    field("block", assembled.block.hash().to_display_hex());
    field("bytes", assembled.binary.len());
    field("transactions", assembled.stats.transactions);
    field("chunks loaded", assembled.stats.chunks_loaded);
    field("cache hits", assembled.stats.cache_hits);
    field("merkle nodes", assembled.stats.merkle_nodes);
}

// ─── Commands ─────────────────────────────────────────────────────────────

fn encoder(witness: bool) -> GraphEncoder {
    GraphEncoder::with_config(EncoderConfig::builder().witness_merkle(witness).build())
}

async fn explode(block_file: PathBuf, store_dir: PathBuf, witness: bool) -> Result<()> {
    let text = tokio::fs::read_to_string(&block_file)
        .await
        .with_context(|| format!("reading {}", block_file.display()))?;
    let bytes = hex::decode(text.trim()).context("block file is not hex")?;
    let block = Block::decode(&bytes).context("decoding block")?;

    let graph = encoder(witness).encode(&block)?;

    let store = DirChunkStore::open(&store_dir).await?;
    let written = store.put_all(&graph.chunks).await?;

    header(&format!("Exploded block {}", block.hash().to_display_hex()));
    show_graph(&graph);
    field("new files", written);
    Ok(())
}

async fn assemble(
    store_dir: PathBuf,
    root: ContentAddress,
    out: Option<PathBuf>,
    json: bool,
    no_verify: bool,
) -> Result<()> {
    let store = DirChunkStore::open(&store_dir).await?;
    let reassembler =
        GraphReassembler::with_config(AssembleConfig::builder().verify_chunks(!no_verify).build());
    let assembled = reassembler.reassemble(&store, &root).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&assembled.block)?);
        return Ok(());
    }
    match out {
        Some(path) => {
            tokio::fs::write(&path, hex::encode(&assembled.binary))
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            header(&format!("Assembled {}", path.display()));
            show_assembled(&assembled);
        }
        None => println!("{}", hex::encode(&assembled.binary)),
    }
    Ok(())
}

async fn inspect(store_dir: PathBuf, address: ContentAddress) -> Result<()> {
    let store = DirChunkStore::open(&store_dir).await?;
    let bytes = store
        .load(&address)
        .await
        .with_context(|| format!("loading {}", address))?;
    let json = match address.codec() {
        Codec::ZcashBlock => serde_json::to_string_pretty(&decode_header_chunk(&bytes)?)?,
        Codec::ZcashTx => serde_json::to_string_pretty(&decode_tx_chunk(&bytes)?)?,
    };
    println!("{}", json);
    Ok(())
}

async fn demo(tx_count: usize, seed: u64, witness: bool) -> Result<()> {
    if tx_count == 0 {
        bail!("a block needs at least one transaction");
    }
    let dir = tempfile::tempdir()?;
    let store = DirChunkStore::open(dir.path()).await?;

    header(&format!("Demo: {} transactions, seed {}", tx_count, seed));
    let block = sample_block(tx_count, seed);
    let original = block.encode();
    field("block", block.hash().to_display_hex());
    field("bytes", original.len());

    let graph = encoder(witness).encode(&block)?;
    show_graph(&graph);
    store.put_all(&graph.chunks).await?;

    let assembled = GraphReassembler::new().reassemble(&store, &graph.root).await?;
    show_assembled(&assembled);

    if let Some(witness_root) = &graph.witness_root {
        let witnessed = GraphReassembler::new()
            .collect_transactions(&store, witness_root)
            .await?;
        field("witness transactions", witnessed.len());
    }

    if assembled.binary == original {
        println!(
            "\n  {} {}",
            "✓".bright_green().bold(),
            "Round trip is byte-exact".bright_green().bold()
        );
        Ok(())
    } else {
        println!(
            "\n  {} {}",
            "✗".bright_red().bold(),
            "Reassembled bytes differ".bright_red().bold()
        );
        bail!("round trip mismatch")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info");
    let cli = Cli::parse();

    match cli.command {
        Commands::Explode {
            block,
            store,
            witness,
        } => explode(block, store, witness).await,
        Commands::Assemble {
            store,
            root,
            out,
            json,
            no_verify,
        } => assemble(store, root, out, json, no_verify).await,
        Commands::Inspect { store, address } => inspect(store, address).await,
        Commands::Cid { kind, hash } => {
            let address = ContentAddress::from_display_hex(kind.into(), &hash)?;
            println!("{}", address);
            Ok(())
        }
        Commands::Hash { address } => {
            println!("{} {}", address.codec(), address.to_display_hex());
            Ok(())
        }
        Commands::Demo { txs, seed, witness } => demo(txs, seed, witness).await,
    }
}
