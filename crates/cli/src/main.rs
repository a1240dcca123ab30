//! Marmalade CLI - Cart inspection and mutation tools.
//!
//! # Usage
//!
//! ```bash
//! # Print the cart
//! marm-cli show
//!
//! # Add one unit of product 7
//! marm-cli add 7
//!
//! # Set product 7 to 3 units
//! marm-cli set 7 3
//!
//! # Remove product 7
//! marm-cli remove 7
//! ```
//!
//! Configuration comes from the environment; see `marmalade_cart::config`
//! for the variable list.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use marmalade_cart::config::CartConfig;
use marmalade_cart::{Cart, CartStore};
use marmalade_core::ProductId;

#[derive(Parser)]
#[command(name = "marm-cli")]
#[command(author, version, about = "Marmalade cart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart contents
    Show,
    /// Add one unit of a product to the cart
    Add {
        /// Product identifier
        product_id: i32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product identifier
        product_id: i32,
    },
    /// Set the absolute amount of a product already in the cart
    Set {
        /// Product identifier
        product_id: i32,

        /// New amount (at least 1)
        amount: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;
    let store = CartStore::from_config(&config).await?;

    match cli.command {
        Commands::Show => show(&store.cart().await),
        Commands::Add { product_id } => store.add_product(ProductId::new(product_id)).await?,
        Commands::Remove { product_id } => store.remove_product(ProductId::new(product_id)).await?,
        Commands::Set { product_id, amount } => {
            store
                .update_product_amount(ProductId::new(product_id), amount)
                .await?;
        }
    }

    Ok(())
}

#[allow(clippy::print_stdout)] // `show` exists to print
fn show(cart: &Cart) {
    if cart.is_empty() {
        println!("(cart is empty)");
        return;
    }

    for line in &cart.lines {
        println!(
            "{:>6}  {:<40} x{:<3} @ {:>8}  = {:>8}",
            line.id.as_i32(),
            line.title,
            line.amount,
            line.price,
            line.line_total()
        );
    }
    println!(
        "{} items, subtotal {}",
        cart.total_quantity(),
        cart.subtotal()
    );
}
