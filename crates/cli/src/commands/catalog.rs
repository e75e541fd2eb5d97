//! Catalog browsing commands.

use clap::Subcommand;

use marigold_client::types::{Product, ProductQuery, SearchQuery};
use marigold_core::{CategoryId, ProductId};

use super::context::Context;
use super::CliError;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List products, optionally filtered by category
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
        /// Category id to filter by
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one product with its variants
    Show {
        /// Product id
        id: String,
    },
    /// Full-text product search
    Search {
        /// Search terms
        query: String,
        #[arg(long)]
        min_price: Option<rust_decimal::Decimal>,
        #[arg(long)]
        max_price: Option<rust_decimal::Decimal>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// List categories
    Categories,
    /// List current promotions
    Promotions,
    /// Show reviews for a product
    Reviews {
        /// Product id
        id: String,
    },
}

pub async fn run(ctx: &Context, action: CatalogAction) -> Result<(), CliError> {
    match action {
        CatalogAction::List {
            page,
            per_page,
            category,
        } => {
            let query = ProductQuery {
                page,
                per_page,
                category: category.map(CategoryId::new),
            };
            let products = ctx.client.list_products(&query).await?;
            println!(
                "{} products (page {}, {} per page)",
                products.total, products.page, products.per_page
            );
            for product in &products.items {
                print_product_line(product);
            }
        }
        CatalogAction::Show { id } => {
            let product = ctx.client.get_product(&ProductId::new(id)).await?;
            println!("{}  {}", product.id, product.name);
            println!("{}", product.price);
            if !product.description.is_empty() {
                println!("\n{}", product.description);
            }
            if !product.variants.is_empty() {
                println!("\nVariants:");
                for variant in &product.variants {
                    let attrs = variant
                        .attributes
                        .iter()
                        .map(|(k, v)| format!("{k}={v}"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let stock = if variant.in_stock { "" } else { "  (out of stock)" };
                    println!("  {}  {}  {attrs}{stock}", variant.id, variant.price);
                }
            }
        }
        CatalogAction::Search {
            query,
            min_price,
            max_price,
            page,
        } => {
            let query = SearchQuery {
                q: query,
                min_price,
                max_price,
                page,
            };
            let results = ctx.client.search_products(&query).await?;
            println!("{} results", results.total);
            for product in &results.items {
                print_product_line(product);
            }
        }
        CatalogAction::Categories => {
            for category in ctx.client.list_categories().await? {
                println!("{}  {}  ({})", category.id, category.name, category.slug);
            }
        }
        CatalogAction::Promotions => {
            for product in ctx.client.list_promotions().await? {
                print_product_line(&product);
            }
        }
        CatalogAction::Reviews { id } => {
            for review in ctx.client.product_reviews(&ProductId::new(id)).await? {
                println!(
                    "{}/5  {}  ({})",
                    review.rating,
                    review.author,
                    review.created_at.format("%Y-%m-%d")
                );
                println!("  {}", review.text);
            }
        }
    }
    Ok(())
}

fn print_product_line(product: &Product) {
    println!("{}  {}  {}", product.id, product.price, product.name);
}
