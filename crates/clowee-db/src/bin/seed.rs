//! # Seed Data Generator
//!
//! Populates a database with demo franchises, agreements, machines, monthly
//! counter readings, the sales derived from them and some payments.
//!
//! ## Usage
//! ```bash
//! cargo run -p clowee-db --bin seed
//! cargo run -p clowee-db --bin seed -- --months 12 --db ./data/clowee.db
//! cargo run -p clowee-db --bin seed -- --json
//! ```

use chrono::{Datelike, Duration, NaiveDate, Utc};
use clowee_core::sale::SaleDraft;
use clowee_core::types::{PaymentDuration, PaymentMethod, PricingTerms, Rate};
use clowee_core::Money;
use clowee_db::{Database, DbConfig, NewPayment};
use serde::Serialize;
use std::env;

/// (name, coin price ৳, clowee share bps, duration, machines)
const FRANCHISES: &[(&str, i64, u32, PaymentDuration, usize)] = &[
    ("Bashundhara City", 10, 4000, PaymentDuration::Monthly, 4),
    ("Jamuna Future Park", 10, 3500, PaymentDuration::Monthly, 3),
    ("Chittagong GEC", 5, 4500, PaymentDuration::HalfMonthly, 2),
    ("Sylhet Blue Water", 5, 5000, PaymentDuration::Monthly, 1),
];

const LOCATIONS: &[&str] = &["Ground floor", "Food court", "Kids zone", "Cinema lobby"];

#[derive(Debug, Default, Serialize)]
struct SeedSummary {
    franchises: usize,
    agreements: usize,
    machines: usize,
    readings: usize,
    sales: usize,
    payments: usize,
    skipped: usize,
}

fn terms(coin_taka: i64, clowee_bps: u32, duration: PaymentDuration) -> PricingTerms {
    PricingTerms {
        coin_price: Money::from_major(coin_taka),
        doll_price: Money::from_major(120),
        vat_percentage: Rate::from_bps(750),
        franchise_share: Rate::from_bps(10_000 - clowee_bps),
        clowee_share: Rate::from_bps(clowee_bps),
        electricity_cost: Money::from_major(1_500),
        maintenance_percentage: None,
        payment_duration: duration,
    }
}

/// First day of the month `back` months before `today`'s month.
fn month_start(today: NaiveDate, back: u32) -> Option<NaiveDate> {
    let months = today.year() * 12 + today.month0() as i32 - back as i32;
    NaiveDate::from_ymd_opt(months.div_euclid(12), months.rem_euclid(12) as u32 + 1, 1)
}

/// Reading dates covering `months` full months before today, one per
/// billing period.
fn reading_dates(today: NaiveDate, months: u32, duration: PaymentDuration) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for back in (1..=months).rev() {
        let (Some(start), Some(next)) = (month_start(today, back), month_start(today, back - 1)) else {
            continue;
        };
        let last = next - Duration::days(1);
        if duration == PaymentDuration::HalfMonthly {
            dates.push(start + Duration::days(14));
        }
        dates.push(last);
    }
    dates
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut months: u32 = 6;
    let mut db_path = String::from("./clowee_dev.db");
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--months" | "-m" => {
                if i + 1 < args.len() {
                    months = args[i + 1].parse().unwrap_or(6);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--json" => json = true,
            "--help" | "-h" => {
                println!("Clowee Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -m, --months <N>   Months of sales history (default: 6)");
                println!("  -d, --db <PATH>    Database file path (default: ./clowee_dev.db)");
                println!("      --json         Print the summary as JSON");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    if !json {
        println!("🌱 Clowee Seed Data Generator");
        println!("=============================");
        println!("Database: {}", db_path);
        println!("Months:   {}", months);
        println!();
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.franchises().count().await?;
    if existing > 0 {
        eprintln!("⚠ Database already has {} franchises, skipping seed.", existing);
        eprintln!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let mut summary = SeedSummary::default();

    for (f_idx, (name, coin, clowee_bps, duration, machine_count)) in FRANCHISES.iter().enumerate() {
        let franchise = db.franchises().create(name, terms(*coin, *clowee_bps, *duration)).await?;
        summary.franchises += 1;

        // Halfway through the history the coin price goes up by ৳2.
        if let Some(effective) = month_start(today, months / 2) {
            db.agreements()
                .create(
                    &franchise.id,
                    effective,
                    terms(coin + 2, *clowee_bps, *duration),
                    Some("Annual price revision".to_string()),
                )
                .await?;
            summary.agreements += 1;
        }

        for m_idx in 0..*machine_count {
            let machine = db
                .machines()
                .create(
                    &franchise.id,
                    &format!("Claw {}", m_idx + 1),
                    &format!("CLW-{:02}-{:03}", f_idx + 1, m_idx + 1),
                    Some(LOCATIONS[m_idx % LOCATIONS.len()]),
                )
                .await?;
            summary.machines += 1;

            let seed = f_idx * 31 + m_idx * 7;
            let mut coin_counter = 10_000 + (seed as i64 * 1_000);
            let mut prize_counter = coin_counter / 20;

            let Some(opening_date) = month_start(today, months) else {
                continue;
            };
            let mut previous = db
                .machines()
                .record_reading(&machine.id, opening_date, coin_counter, prize_counter)
                .await?;
            summary.readings += 1;

            for (p_idx, reading_date) in reading_dates(today, months, *duration).into_iter().enumerate() {
                let plays = 600 + ((seed + p_idx * 13) % 900) as i64;
                coin_counter += plays;
                prize_counter += plays / (12 + (p_idx % 6) as i64);

                let current = db
                    .machines()
                    .record_reading(&machine.id, reading_date, coin_counter, prize_counter)
                    .await?;
                summary.readings += 1;

                let draft = SaleDraft::from_readings(&previous, &current)?;
                previous = current;

                let sale = match db.sales().record(draft).await {
                    Ok(sale) => sale,
                    Err(e) => {
                        eprintln!("Failed to record sale for {}: {}", machine.serial_number, e);
                        summary.skipped += 1;
                        continue;
                    }
                };
                summary.sales += 1;

                // Everything but the latest period is settled.
                let is_latest = reading_date + Duration::days(31) > today;
                if sale.pay_to_clowee.is_positive() && !is_latest {
                    db.sales()
                        .add_payment(NewPayment {
                            sale_id: sale.id.clone(),
                            amount: sale.pay_to_clowee,
                            method: if p_idx % 2 == 0 {
                                PaymentMethod::BankTransfer
                            } else {
                                PaymentMethod::MobileBanking
                            },
                            reference: Some(format!("SEED-{}", &sale.id[..8])),
                            paid_on: reading_date + Duration::days(5),
                        })
                        .await?;
                    summary.payments += 1;
                }
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("✓ Franchises: {}", summary.franchises);
        println!("✓ Agreements: {}", summary.agreements);
        println!("✓ Machines:   {}", summary.machines);
        println!("✓ Readings:   {}", summary.readings);
        println!("✓ Sales:      {}", summary.sales);
        println!("✓ Payments:   {}", summary.payments);
        if summary.skipped > 0 {
            println!("⚠ Skipped:    {}", summary.skipped);
        }
        println!();
        println!("✓ Seed complete!");
    }

    db.close().await;
    Ok(())
}
