//! Cart commands.

use clap::Subcommand;

use marigold_core::{CartItemId, ProductId, VariantId};

use super::context::Context;
use super::CliError;

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the current cart
    Show,
    /// Add a product variant to the cart
    Add {
        /// Product id
        product_id: String,
        /// Variant id
        variant_id: String,
        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },
    /// Change an item's quantity
    Update {
        /// Cart item id
        item_id: String,
        #[arg(short, long)]
        quantity: u32,
    },
    /// Remove an item from the cart
    Remove {
        /// Cart item id
        item_id: String,
    },
}

pub async fn run(ctx: &Context, action: CartAction) -> Result<(), CliError> {
    // Every cart command starts from the server's view of the stored cart.
    ctx.cart.initialize().await;

    match action {
        CartAction::Show => {}
        CartAction::Add {
            product_id,
            variant_id,
            quantity,
        } => {
            let product = ctx.client.get_product(&ProductId::new(product_id)).await?;
            let variant_id = VariantId::new(variant_id);
            let variant = product
                .variants
                .iter()
                .find(|v| v.id == variant_id)
                .ok_or_else(|| {
                    CliError::Invalid(format!(
                        "product {} has no variant {variant_id}",
                        product.id
                    ))
                })?;
            ctx.cart.add_item(&product, variant, quantity).await;
        }
        CartAction::Update { item_id, quantity } => {
            ctx.cart
                .update_item_quantity(&CartItemId::new(item_id), quantity)
                .await;
        }
        CartAction::Remove { item_id } => {
            ctx.cart.remove_item(&CartItemId::new(item_id)).await;
        }
    }

    print_cart(ctx);
    Ok(())
}

fn print_cart(ctx: &Context) {
    let state = ctx.cart.state();
    let Some(cart) = state.cart.filter(|c| !c.items.is_empty()) else {
        println!("Your cart is empty");
        return;
    };

    println!("Cart {}", cart.id);
    for item in &cart.items {
        let attrs = item
            .attributes
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  {}  {} x{}  {}  {attrs}",
            item.id, item.name, item.quantity, item.price
        );
    }
    println!("Subtotal: {}", cart.subtotal);
}
