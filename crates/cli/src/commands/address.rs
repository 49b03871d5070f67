//! Address book commands.

use clap::Subcommand;
use nyraa_core::AddressId;
use nyraa_storefront::addresses::{AddressBook, SyncMode};
use nyraa_storefront::models::{Address, AddressKind};
use nyraa_storefront::{AppError, Storefront};

#[derive(Subcommand)]
pub enum AddressAction {
    /// List addresses (server copy when reachable, local otherwise)
    List,
    /// Add a new address
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        street: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        zip: String,
        #[arg(long, default_value = "India")]
        country: String,
        #[arg(long)]
        phone: String,
        /// Address kind (home, work, other)
        #[arg(long, default_value = "home")]
        kind: AddressKind,
        /// Make this the default address
        #[arg(long)]
        default: bool,
    },
    /// Remove an address
    Rm { id: i64 },
    /// Mark an address as the default
    Default { id: i64 },
    /// Push journaled offline changes and re-sync with the server
    Reconcile,
}

pub async fn run(app: &Storefront, action: AddressAction) -> Result<(), AppError> {
    let book = app.addresses();

    match action {
        AddressAction::List => {
            let addresses = book.list().await?;
            if addresses.is_empty() {
                println!("No addresses on file.");
            }
            for addr in &addresses {
                print_address(addr);
            }
            if book.mode() == SyncMode::Offline {
                println!("(offline: local copy shown; run `nyraa address reconcile` when the server is back)");
            }
        }
        AddressAction::Add {
            name,
            street,
            city,
            state,
            zip,
            country,
            phone,
            kind,
            default,
        } => {
            let address = Address {
                id: AddressBook::mint_id(),
                name,
                street,
                city,
                state,
                zip,
                country,
                phone,
                kind,
                is_default: default,
            };
            let saved = book.save(address).await?;
            println!("Address added (id {}).", saved.id);
        }
        AddressAction::Rm { id } => {
            book.delete(AddressId::new(id)).await?;
            println!("Address removed.");
        }
        AddressAction::Default { id } => {
            book.set_default(AddressId::new(id)).await?;
            println!("Default address updated.");
        }
        AddressAction::Reconcile => {
            let report = book.reconcile().await?;
            if report.dropped.is_empty() {
                println!("Address book in sync.");
            } else {
                println!(
                    "Address book re-synced; {} change(s) were rejected by the server:",
                    report.dropped.len()
                );
                for drop in &report.dropped {
                    println!("  {:?}: {}", drop.op, drop.reason);
                }
            }
        }
    }

    Ok(())
}

fn print_address(addr: &Address) {
    let marker = if addr.is_default { "*" } else { " " };
    println!(
        "{marker} [{}] {} - {}, {} {}, {} ({}) {}",
        addr.id, addr.name, addr.street, addr.city, addr.zip, addr.country, addr.kind, addr.phone
    );
}
