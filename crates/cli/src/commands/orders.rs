//! Order history commands.

use clap::Subcommand;
use nyraa_core::OrderStatus;
use nyraa_storefront::models::Order;
use nyraa_storefront::{AppError, Storefront};

use super::money;

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List orders, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        /// Filter by status (pending, processing, shipped, delivered, cancelled)
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Show one order in full
    Show { id: String },
    /// Cancel an order (pending/processing only)
    Cancel {
        id: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Aggregate statistics
    Stats,
}

pub async fn run(app: &Storefront, action: OrdersAction) -> Result<(), AppError> {
    let orders = app.orders();

    match action {
        OrdersAction::List { page, limit, status } => {
            let result = orders.list(page, limit, status).await?;
            if result.orders.is_empty() {
                println!("No orders found.");
                return Ok(());
            }

            for order in &result.orders {
                println!(
                    "{}  {}  {}  {}",
                    order.order_number.as_deref().unwrap_or(&order.id),
                    order.order_date.format("%Y-%m-%d"),
                    order.status,
                    money(order.total)
                );
            }
            println!(
                "page {}/{} ({} total)",
                result.pagination.page, result.pagination.total_pages, result.pagination.total
            );
        }
        OrdersAction::Show { id } => {
            let order = orders.get(&id).await?;
            print_order(&order);
        }
        OrdersAction::Cancel { id, notes } => {
            let order = orders.cancel(&id, &notes).await?;
            println!(
                "Order {} cancelled.",
                order.order_number.as_deref().unwrap_or(&order.id)
            );
        }
        OrdersAction::Stats => {
            let stats = orders.stats().await?;
            println!("orders:    {}", stats.total_orders);
            println!("spent:     {}", money(stats.total_spent));
            println!("pending:   {}", stats.pending);
            println!("processing:{}", stats.processing);
            println!("shipped:   {}", stats.shipped);
            println!("delivered: {}", stats.delivered);
            println!("cancelled: {}", stats.cancelled);
        }
    }

    Ok(())
}

fn print_order(order: &Order) {
    println!(
        "Order {}",
        order.order_number.as_deref().unwrap_or(&order.id)
    );
    println!("  placed:  {}", order.order_date.format("%Y-%m-%d %H:%M"));
    println!("  status:  {}", order.status);
    for item in &order.items {
        let variant = item.variant.label();
        if variant.is_empty() {
            println!(
                "  {} x{} @ {}",
                item.product_name,
                item.quantity,
                money(item.unit_price)
            );
        } else {
            println!(
                "  {} ({variant}) x{} @ {}",
                item.product_name,
                item.quantity,
                money(item.unit_price)
            );
        }
    }
    println!("  subtotal: {}", money(order.subtotal));
    println!("  shipping: {}", money(order.shipping));
    println!("  tax:      {}", money(order.tax));
    if !order.discount.is_zero() {
        println!("  discount: -{}", money(order.discount));
    }
    println!("  total:    {}", money(order.total));
    println!(
        "  ship to:  {}, {} {}, {}",
        order.shipping_address.name,
        order.shipping_address.city,
        order.shipping_address.zip,
        order.shipping_address.country
    );

    if !order.status_history.is_empty() {
        println!("  history:");
        for change in &order.status_history {
            match &change.notes {
                Some(notes) => println!(
                    "    {} {} ({notes})",
                    change.timestamp.format("%Y-%m-%d %H:%M"),
                    change.status
                ),
                None => println!(
                    "    {} {}",
                    change.timestamp.format("%Y-%m-%d %H:%M"),
                    change.status
                ),
            }
        }
    }
}
