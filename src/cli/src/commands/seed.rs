//! Demo-data seeding command.
//!
//! Registers a demo customer and seller, lists the seller's token, creates a
//! product and places an order for it. Useful for poking at a fresh server.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::{json, Value};

use crate::client::ApiClient;

#[derive(Args)]
pub struct SeedArgs {
    /// Password for all seeded accounts
    #[arg(long, default_value = "demo-password")]
    password: String,

    /// Suffix for seeded email addresses, to keep reruns unique
    #[arg(long)]
    suffix: Option<String>,
}

pub async fn execute(args: SeedArgs, client: &ApiClient) -> Result<()> {
    let suffix = args
        .suffix
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string()[..8].to_string());

    // Seller with one product.
    let seller = client
        .post(
            "/api/auth/register/seller",
            &json!({
                "name": "Demo Seller",
                "shop_name": "Demo Goods",
                "email": format!("seller-{}@example.com", suffix),
                "password": args.password,
                "phone_no": "1234567890",
                "address": "1 Market Square",
            }),
            None,
        )
        .await?;
    let seller_token = token_of(&seller)?;
    let seller_id = id_of(&seller, "seller")?;
    println!("{} seller {}", "Registered".green().bold(), seller_id);
    println!(
        "  {} pending admin approval before the seller can list products",
        "Note:".yellow().bold()
    );

    // Customer.
    let customer = client
        .post(
            "/api/auth/register/customer",
            &json!({
                "name": "Demo Customer",
                "email": format!("customer-{}@example.com", suffix),
                "password": args.password,
                "phone_no": "0987654321",
                "address": "2 Harbor Lane",
            }),
            None,
        )
        .await?;
    let customer_token = token_of(&customer)?;
    let customer_id = id_of(&customer, "customer")?;
    println!("{} customer {}", "Registered".green().bold(), customer_id);

    // Product creation only works once an admin approves the seller; try it
    // and report either way.
    match client
        .post(
            "/api/products",
            &json!({
                "name": "Demo Lamp",
                "description": "A perfectly ordinary lamp",
                "price": 25.0,
                "discount": 10.0,
            }),
            Some(&seller_token),
        )
        .await
    {
        Ok(product) => {
            let product_id = id_of(&product, "product")?;
            println!("{} product {}", "Created".green().bold(), product_id);

            let order = client
                .post(
                    "/api/orders",
                    &json!({ "product_id": product_id, "quantity": 2 }),
                    Some(&customer_token),
                )
                .await?;
            println!(
                "{} order {}",
                "Placed".green().bold(),
                id_of(&order, "order")?
            );
        }
        Err(e) => {
            println!("{} {}", "Skipped product/order:".yellow().bold(), e);
        }
    }

    println!();
    println!("{}", "Seed complete.".bold());
    Ok(())
}

fn token_of(body: &Value) -> Result<String> {
    body.get("token")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .context("response carried no token")
}

fn id_of(body: &Value, resource: &str) -> Result<String> {
    body.get(resource)
        .and_then(|v| v.get("id"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .with_context(|| format!("response carried no {} id", resource))
}
