//! Checkout commands.

use clap::Subcommand;
use nyraa_core::{AddressId, PaymentMethod};
use nyraa_storefront::cart::Coupon;
use nyraa_storefront::checkout::OrderDraft;
use nyraa_storefront::{AppError, Storefront};

use super::money;

#[derive(Subcommand)]
pub enum CheckoutAction {
    /// Run the readiness gate and report the result
    Status,
    /// Submit the order
    Confirm {
        /// Shipping address id (defaults to the default address)
        #[arg(long)]
        address: Option<i64>,
        /// Payment method (creditCard, debitCard, upi, cashOnDelivery)
        #[arg(long, default_value = "creditCard")]
        payment: PaymentMethod,
        /// Coupon code
        #[arg(long)]
        coupon: Option<String>,
        /// Special instructions for the order
        #[arg(long, default_value = "")]
        notes: String,
    },
}

pub async fn run(app: &Storefront, action: CheckoutAction) -> Result<(), AppError> {
    match action {
        CheckoutAction::Status => status(app).await,
        CheckoutAction::Confirm {
            address,
            payment,
            coupon,
            notes,
        } => confirm(app, address, payment, coupon, notes).await,
    }
}

async fn status(app: &Storefront) -> Result<(), AppError> {
    let report = app.gate().probe().await.map_err(AppError::State)?;

    println!("server: {:?}", report.state.server);
    println!("auth:   {:?}", report.state.auth);
    println!(
        "system ready: {}",
        if report.state.system_ready() { "yes" } else { "no" }
    );

    let items = app.cart().item_count();
    println!("cart:   {items} item(s)");

    match app.addresses().default_address() {
        Some(addr) => println!("ship to: {} ({}, {})", addr.name, addr.city, addr.country),
        None => println!("ship to: no address on file"),
    }

    Ok(())
}

async fn confirm(
    app: &Storefront,
    address: Option<i64>,
    payment: PaymentMethod,
    coupon: Option<String>,
    notes: String,
) -> Result<(), AppError> {
    // Mirror the storefront behavior: the default address is preselected.
    let address_id = match address {
        Some(id) => Some(AddressId::new(id)),
        None => app.addresses().default_address().map(|a| a.id),
    };

    // Invalid codes reset the discount to zero rather than blocking the order.
    let coupon = coupon.and_then(|code| match Coupon::parse(&code) {
        Ok(c) => {
            println!("Coupon applied! 10% off your order.");
            Some(c)
        }
        Err(e) => {
            println!("{e}; no discount applied.");
            None
        }
    });

    let draft = OrderDraft {
        address_id,
        payment_method: payment,
        coupon,
        special_instructions: notes,
    };

    let receipt = app.checkout().place_order(&draft).await?;

    println!("Order placed successfully!");
    println!(
        "  order:  {}",
        receipt.order_number.as_deref().unwrap_or(&receipt.id)
    );
    for item in &receipt.items {
        println!("  {} x{} @ {}", item.name, item.quantity, money(item.price));
    }
    println!("  total:  {}", money(receipt.total));
    println!("  ship to: {}, {}", receipt.shipping_address.name, receipt.shipping_address.city);
    Ok(())
}
