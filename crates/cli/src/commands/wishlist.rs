//! Wishlist commands.

use clap::Subcommand;
use nyraa_core::ProductId;
use nyraa_storefront::wishlist::WishlistItem;
use nyraa_storefront::{AppError, Storefront};
use rust_decimal::Decimal;

use super::money;

#[derive(Subcommand)]
pub enum WishlistAction {
    /// Show saved products
    List,
    /// Save a product (duplicates are ignored)
    Add {
        /// Product id
        #[arg(long)]
        id: i64,
        /// Product name
        #[arg(long)]
        name: String,
        /// Unit price
        #[arg(long, default_value_t = Decimal::ZERO)]
        price: Decimal,
        /// Image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Remove a saved product
    Rm { id: i64 },
}

pub fn run(app: &Storefront, action: WishlistAction) -> Result<(), AppError> {
    let wishlist = app.wishlist();

    match action {
        WishlistAction::List => {
            let items = wishlist.items();
            if items.is_empty() {
                println!("Your wishlist is empty.");
            }
            for item in &items {
                println!("  [{}] {}  {}", item.id, item.name, money(item.price));
            }
        }
        WishlistAction::Add {
            id,
            name,
            price,
            image,
        } => {
            wishlist.add(WishlistItem {
                id: ProductId::new(id),
                name,
                price,
                image,
                saved_at: chrono::Utc::now(),
            })?;
            println!("Saved. Wishlist holds {} item(s).", wishlist.items().len());
        }
        WishlistAction::Rm { id } => {
            wishlist.remove(ProductId::new(id))?;
            println!("Removed.");
        }
    }

    Ok(())
}
