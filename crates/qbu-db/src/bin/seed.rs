//! # Seed Data Generator
//!
//! Installs the default pricing and shipping configuration plus a demo
//! ticket for local development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p qbu-db --bin seed
//!
//! # Specify database path and ticket salt
//! cargo run -p qbu-db --bin seed -- --db ./data/qbu.db --salt dev-salt
//! ```
//!
//! ## What Gets Seeded
//! - The fallback pricing parameters as the active pricing config
//!   (base 800 / per-cm³ 60 / min 1200 / step 10)
//! - The fallback shipping matrix as the active shipping config
//! - One demo ticket: code `QBU-DEV-20` = 20% off the item subtotal

use chrono::Utc;
use std::env;
use uuid::Uuid;

use qbu_core::shipping::RateMatrix;
use qbu_core::size_tier::SizeTier;
use qbu_core::ticket::{code_prefix, hash_ticket_code, ApplyScope, TicketKind};
use qbu_core::zone::Zone;
use qbu_core::{PricingParams, ShippingRate, Ticket};
use qbu_db::{Database, DbConfig};

const DEMO_TICKET_CODE: &str = "QBU-DEV-20";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (db_path, salt) = parse_args();

    println!("Seeding {} ...", db_path);
    let db = Database::new(DbConfig::new(&db_path)).await?;

    // Active pricing config = the documented fallback values
    let pricing = db
        .pricing_configs()
        .insert_active(PricingParams::fallback(), None)
        .await?;
    println!("  pricing config {} (active)", pricing.id);

    // Active shipping config = the documented fallback matrix
    let fallback = RateMatrix::fallback();
    let mut rates = Vec::with_capacity(36);
    for zone in Zone::ALL {
        for tier in SizeTier::ALL {
            rates.push(ShippingRate {
                zone,
                size_tier: tier,
                price_yen: fallback.lookup(zone, tier).unwrap_or(0),
            });
        }
    }
    let shipping = db.shipping().replace_active("seed-default", &rates).await?;
    println!("  shipping config {} with {} rates (active)", shipping.id, rates.len());

    // Demo ticket
    let ticket = Ticket {
        id: Uuid::new_v4().to_string(),
        code_prefix: code_prefix(DEMO_TICKET_CODE),
        kind: TicketKind::Percent,
        value: 20,
        apply_scope: ApplyScope::Subtotal,
        shipping_free: false,
        is_active: true,
        expires_at: None,
        max_total_uses: Some(1000),
        max_uses_per_user: Some(5),
        created_at: Utc::now(),
    };
    match db
        .tickets()
        .insert(&ticket, &hash_ticket_code(DEMO_TICKET_CODE, &salt))
        .await
    {
        Ok(()) => println!("  ticket {} → code {}", ticket.id, DEMO_TICKET_CODE),
        Err(e) => println!("  ticket skipped ({})", e),
    }

    println!("Done.");
    Ok(())
}

/// Parses `--db <path>` and `--salt <salt>` arguments.
fn parse_args() -> (String, String) {
    let args: Vec<String> = env::args().collect();
    let mut db_path = "qbu.db".to_string();
    let mut salt = "dev-salt".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" if i + 1 < args.len() => {
                db_path = args[i + 1].clone();
                i += 2;
            }
            "--salt" if i + 1 < args.len() => {
                salt = args[i + 1].clone();
                i += 2;
            }
            _ => i += 1,
        }
    }

    (db_path, salt)
}
