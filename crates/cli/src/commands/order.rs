//! Order commands: checkout, lookup, cancellation, and returns.

use clap::Subcommand;

use marigold_client::types::{Order, OrderDraft, PaymentMethod, ShippingDetails};
use marigold_core::{CartItemId, Email, OrderId, ReturnRequestId};

use super::context::Context;
use super::CliError;

#[derive(Subcommand)]
pub enum OrderAction {
    /// Place an order from the current cart
    Place {
        /// Recipient name
        #[arg(long)]
        name: String,
        #[arg(long)]
        line1: String,
        #[arg(long)]
        line2: Option<String>,
        #[arg(long)]
        city: String,
        #[arg(long)]
        postal_code: String,
        /// ISO country code
        #[arg(long)]
        country: String,
        #[arg(long)]
        phone: Option<String>,
        /// Payment method: card, paypal, or cod
        #[arg(long, default_value = "card")]
        payment: String,
        /// Contact email when checking out without signing in
        #[arg(long)]
        guest_email: Option<String>,
    },
    /// List the signed-in user's orders
    List,
    /// Look up a guest order by id and token
    Guest {
        order_id: String,
        token: String,
    },
    /// Cancel an order
    Cancel {
        order_id: String,
        /// Guest token, for orders placed without signing in
        #[arg(long)]
        token: Option<String>,
    },
    /// Open a return request for an order
    Return {
        order_id: String,
        #[arg(long)]
        reason: String,
        /// Order line item ids to return (repeatable)
        #[arg(long = "item")]
        items: Vec<String>,
        /// Supporting image URLs (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,
        #[arg(long)]
        token: Option<String>,
    },
    /// Comment on a return request
    Comment {
        return_id: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        token: Option<String>,
    },
}

pub async fn run(ctx: &Context, action: OrderAction) -> Result<(), CliError> {
    match action {
        OrderAction::Place {
            name,
            line1,
            line2,
            city,
            postal_code,
            country,
            phone,
            payment,
            guest_email,
        } => {
            ctx.cart.initialize().await;
            let cart_id = ctx
                .cart
                .cart_id()
                .ok_or_else(|| CliError::Invalid("the cart is empty".to_string()))?;

            let guest_email = guest_email
                .map(|e| Email::parse(&e))
                .transpose()
                .map_err(|e| CliError::Invalid(e.to_string()))?;

            let draft = OrderDraft {
                cart_id,
                shipping: ShippingDetails {
                    name,
                    line1,
                    line2,
                    city,
                    postal_code,
                    country,
                    phone,
                },
                payment_method: parse_payment(&payment)?,
                guest_email,
            };

            if let Some(order_id) = ctx.orders.create_order(&draft).await {
                let state = ctx.orders.state();
                if let Some(order) = &state.current {
                    print_order(order);
                }
                println!("Order id: {order_id}");
            }
        }
        OrderAction::List => {
            ctx.orders.fetch_my_orders().await;
            for order in &ctx.orders.state().my_orders {
                print_order_line(order);
            }
        }
        OrderAction::Guest { order_id, token } => {
            ctx.orders
                .fetch_guest_order(&OrderId::new(order_id), &token)
                .await;
            if let Some(order) = &ctx.orders.state().current {
                print_order(order);
            }
        }
        OrderAction::Cancel { order_id, token } => {
            ctx.orders
                .cancel_order(&OrderId::new(order_id), token.as_deref())
                .await;
        }
        OrderAction::Return {
            order_id,
            reason,
            items,
            images,
            token,
        } => {
            let item_ids: Vec<CartItemId> = items.into_iter().map(CartItemId::new).collect();
            ctx.orders
                .create_return_request(
                    &OrderId::new(order_id),
                    &reason,
                    &item_ids,
                    images,
                    token.as_deref(),
                )
                .await;
        }
        OrderAction::Comment {
            return_id,
            text,
            image,
            token,
        } => {
            ctx.orders
                .create_return_comment(
                    &ReturnRequestId::new(return_id),
                    text.as_deref(),
                    image,
                    token.as_deref(),
                )
                .await;
        }
    }
    Ok(())
}

fn parse_payment(value: &str) -> Result<PaymentMethod, CliError> {
    match value.to_ascii_lowercase().as_str() {
        "card" => Ok(PaymentMethod::Card),
        "paypal" => Ok(PaymentMethod::Paypal),
        "cod" | "cash" => Ok(PaymentMethod::CashOnDelivery),
        other => Err(CliError::Invalid(format!(
            "unknown payment method '{other}' (expected card, paypal, or cod)"
        ))),
    }
}

fn print_order_line(order: &Order) {
    println!(
        "{}  {}  {}  {}",
        order.id,
        order.created_at.format("%Y-%m-%d"),
        order.status,
        order.total
    );
}

fn print_order(order: &Order) {
    print_order_line(order);
    for item in &order.items {
        println!("  {} x{}  {}", item.name, item.quantity, item.price);
    }
    if let Some(token) = &order.guest_token {
        println!("Guest token: {token}");
    }
    for request in &order.return_requests {
        println!(
            "Return {}  {}  {}",
            request.id, request.status, request.reason
        );
        for comment in &request.comments {
            println!("  {}: {}", comment.author, comment.text.as_deref().unwrap_or("(image)"));
        }
    }
}
