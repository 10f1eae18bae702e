use beadstock::catalog::{self, CategoryId};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::os::unix::net::UnixStream;

const SOCKET_PATH: &str = "/tmp/loopstone.sock";

#[derive(Parser, Debug)]
#[command(name = "beadstock", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// List catalog categories, or the products of one category
    List {
        /// Category id (e.g. "white", "purple")
        category: Option<String>,
    },
    /// Save the current design in the running designer
    Save,
    /// Clear the current design in the running designer
    Clear,
    /// Remove one placed bead by its instance id
    Remove { bead_id: String },
    /// Move a placed bead from one slot to another
    Reorder { from: usize, to: usize },
    /// Spin the ring by a number of degrees
    Rotate { degrees: f64 },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::List { category } => list(category),
        Commands::Save => send_command("save"),
        Commands::Clear => send_command("clear"),
        Commands::Remove { bead_id } => send_command(&format!("remove {}", bead_id)),
        Commands::Reorder { from, to } => send_command(&format!("reorder {} {}", from, to)),
        Commands::Rotate { degrees } => send_command(&format!("rotate {}", degrees)),
    }
}

fn list(category: Option<String>) -> anyhow::Result<()> {
    match category {
        None => {
            for c in catalog::categories() {
                println!("{}\t{}", c.id, c.label);
            }
        }
        Some(id) => {
            let id = CategoryId::new(id);
            let products = catalog::products_in(&id);
            if products.is_empty() {
                anyhow::bail!("No products in category '{}'", id);
            }
            for p in products {
                println!("{}\t{}\t{}mm\t¥{}", p.id, p.name, p.size_mm, p.price);
            }
        }
    }
    Ok(())
}

fn send_command(cmd: &str) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to the designer at {}: {}. Is loopstone running?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", cmd)?;
    Ok(())
}
