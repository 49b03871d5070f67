//! Cart commands.

use clap::{Args, Subcommand};
use nyraa_core::ProductId;
use nyraa_storefront::cart::{Coupon, NewCartItem};
use nyraa_storefront::models::VariantSelection;
use nyraa_storefront::{AppError, Storefront};
use rust_decimal::Decimal;

use super::money;

#[derive(Args)]
pub struct VariantArgs {
    /// Variant color
    #[arg(long)]
    pub color: Option<String>,
    /// Variant size
    #[arg(long)]
    pub size: Option<String>,
    /// Variant type (e.g. ring, pendant)
    #[arg(long = "kind")]
    pub kind: Option<String>,
    /// Variant carat
    #[arg(long)]
    pub carat: Option<String>,
}

impl From<VariantArgs> for VariantSelection {
    fn from(args: VariantArgs) -> Self {
        Self {
            color: args.color,
            size: args.size,
            kind: args.kind,
            carat: args.carat,
        }
    }
}

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart and its totals
    List {
        /// Apply a coupon code to the displayed totals
        #[arg(long)]
        coupon: Option<String>,
    },
    /// Add a product (same product + variant increments quantity)
    Add {
        /// Product id
        #[arg(long)]
        id: i64,
        /// Product name
        #[arg(long)]
        name: String,
        /// Unit price
        #[arg(long)]
        price: Decimal,
        /// Image URL
        #[arg(long)]
        image: Option<String>,
        /// Quantity to add
        #[arg(long, default_value_t = 1)]
        qty: u32,
        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Remove a whole line
    Remove {
        /// Product id
        #[arg(long)]
        id: i64,
        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Set a line's quantity (0 removes the line)
    SetQty {
        /// Product id
        #[arg(long)]
        id: i64,
        /// New quantity
        #[arg(long)]
        qty: u32,
        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Empty the cart
    Clear,
}

pub fn run(app: &Storefront, action: CartAction) -> Result<(), AppError> {
    let cart = app.cart();

    match action {
        CartAction::List { coupon } => {
            let items = cart.items();
            if items.is_empty() {
                println!("Your cart is empty.");
                return Ok(());
            }

            for line in &items {
                let variant = line.variant.label();
                if variant.is_empty() {
                    println!(
                        "  {} x{}  @ {}  = {}",
                        line.name,
                        line.quantity,
                        money(line.price),
                        money(line.line_total())
                    );
                } else {
                    println!(
                        "  {} ({variant}) x{}  @ {}  = {}",
                        line.name,
                        line.quantity,
                        money(line.price),
                        money(line.line_total())
                    );
                }
            }

            let coupon = match coupon {
                Some(code) => match Coupon::parse(&code) {
                    Ok(c) => Some(c),
                    Err(e) => {
                        println!("  ({e}; no discount applied)");
                        None
                    }
                },
                None => None,
            };

            let totals = cart.totals(coupon.as_ref());
            println!("  --------");
            println!("  subtotal: {}", money(totals.subtotal));
            println!("  shipping: {}", money(totals.shipping));
            println!("  tax:      {}", money(totals.tax));
            if !totals.discount.is_zero() {
                println!("  discount: -{}", money(totals.discount));
            }
            println!("  total:    {}", money(totals.total));
        }
        CartAction::Add {
            id,
            name,
            price,
            image,
            qty,
            variant,
        } => {
            cart.add(
                NewCartItem {
                    product_id: ProductId::new(id),
                    name,
                    price,
                    image,
                    variant: variant.into(),
                },
                qty,
            )?;
            println!("Added. Cart now holds {} item(s).", cart.item_count());
        }
        CartAction::Remove { id, variant } => {
            cart.remove_line(ProductId::new(id), &variant.into())?;
            println!("Removed. Cart now holds {} item(s).", cart.item_count());
        }
        CartAction::SetQty { id, qty, variant } => {
            cart.set_quantity(ProductId::new(id), &variant.into(), qty)?;
            println!("Updated. Cart now holds {} item(s).", cart.item_count());
        }
        CartAction::Clear => {
            cart.clear()?;
            println!("Cart cleared.");
        }
    }

    Ok(())
}
