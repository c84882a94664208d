//! # Seed Data Generator
//!
//! Populates the database with demo clinic data for development.
//!
//! ## Usage
//! ```bash
//! # Seed 30 days of activity (default)
//! cargo run -p klinik-db --bin seed
//!
//! # Seed a longer history
//! cargo run -p klinik-db --bin seed -- --days 90
//!
//! # Specify database path
//! cargo run -p klinik-db --bin seed -- --db ./data/klinik.db
//! ```
//!
//! ## Generated Data
//! For each day going back from today:
//! - 1-4 patient registrations
//! - 1-3 single-item sales from the service catalog
//! - 1-2 POS orders of 1-3 lines each
//!
//! Values are derived from the record index, so two runs with the same
//! options produce the same rows (apart from ids).

use chrono::{Duration, NaiveDate, Utc};
use klinik_core::{
    CreateOrderRequest, CreatePatientRequest, CreateSalesTransactionRequest, Money, OrderLine,
    PaymentMethod,
};
use klinik_db::{Database, DbConfig};
use std::env;

const NAMES: &[&str] = &[
    "Budi Santoso",
    "Siti Aminah",
    "Agus Wijaya",
    "Dewi Lestari",
    "Rudi Hartono",
    "Rina Marlina",
    "Andi Pratama",
    "Putri Anggraini",
    "Joko Susilo",
    "Maya Sari",
    "Hendra Gunawan",
    "Lina Kusuma",
];

const COMPLAINTS: &[&str] = &[
    "Demam tiga hari",
    "Batuk dan pilek",
    "Sakit kepala",
    "Nyeri perut",
    "Kontrol tekanan darah",
    "Sakit gigi",
    "Gatal-gatal di kulit",
    "Kontrol gula darah",
];

/// Service catalog: (name, price in whole rupiah)
const SERVICES: &[(&str, i64)] = &[
    ("Konsultasi Dokter Umum", 50_000),
    ("Konsultasi Dokter Gigi", 75_000),
    ("Cabut Gigi", 150_000),
    ("Tambal Gigi", 120_000),
    ("Cek Gula Darah", 25_000),
    ("Cek Kolesterol", 30_000),
    ("Nebulizer", 60_000),
    ("Perawatan Luka", 40_000),
];

/// Pharmacy items sold through the POS: (name, price in whole rupiah)
const PRODUCTS: &[(&str, i64)] = &[
    ("Paracetamol 500mg", 5_000),
    ("Amoxicillin 500mg", 12_000),
    ("Vitamin C 1000mg", 8_500),
    ("Obat Batuk Sirup", 18_000),
    ("Salep Kulit", 22_000),
    ("Masker Medis (isi 5)", 7_500),
    ("Plester Luka", 3_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut days: i64 = 30;
    let mut db_path = String::from("./klinik_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Klinik Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>     Days of history to generate (default: 30)");
                println!("  -d, --db <PATH>    Database file path (default: ./klinik_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }
    let days = days.clamp(1, 365);

    println!("🌱 Klinik Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Days:     {}", days);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.patients().count().await?
        + db.sales_transactions().count().await?
        + db.orders().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} records", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating activity...");

    let start = std::time::Instant::now();
    let now = Utc::now();
    let (mut patients, mut sales, mut orders) = (0usize, 0usize, 0usize);
    let mut seq: usize = 0;

    for day in (0..days).rev() {
        let day_start = now - Duration::days(day);

        for n in 0..(1 + seq % 4) {
            let at = day_start - Duration::minutes((n * 37) as i64);
            if let Err(e) = db.patients().create_at(generate_patient(seq, at.date_naive()), at).await {
                eprintln!("Failed to insert patient: {}", e);
            } else {
                patients += 1;
            }
            seq += 1;
        }

        for n in 0..(1 + seq % 3) {
            let at = day_start - Duration::minutes((n * 53 + 5) as i64);
            if let Err(e) = db.sales_transactions().create_at(generate_sale(seq), at).await {
                eprintln!("Failed to insert sale: {}", e);
            } else {
                sales += 1;
            }
            seq += 1;
        }

        for n in 0..(1 + seq % 2) {
            let at = day_start - Duration::minutes((n * 71 + 11) as i64);
            if let Err(e) = db.orders().create_at(generate_order(seq), at).await {
                eprintln!("Failed to insert order: {}", e);
            } else {
                orders += 1;
            }
            seq += 1;
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Generated {} patients, {} sales, {} orders in {:?}",
        patients, sales, orders, elapsed
    );

    let stats = db.dashboard().stats().await?;
    println!();
    println!("Dashboard check:");
    println!("  Patients today:      {}", stats.total_patients_today);
    println!("  Patients this month: {}", stats.total_patients_this_month);
    println!("  Sales today:         {}", stats.total_sales_today);
    println!("  Sales this month:    {}", stats.total_sales_this_month);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn generate_patient(seed: usize, examination_date: NaiveDate) -> CreatePatientRequest {
    CreatePatientRequest {
        name: NAMES[seed % NAMES.len()].to_string(),
        phone_number: format!("08{:010}", (seed as u64 * 7919) % 10_000_000_000),
        complaint: COMPLAINTS[seed % COMPLAINTS.len()].to_string(),
        examination_date,
    }
}

fn generate_sale(seed: usize) -> CreateSalesTransactionRequest {
    let (name, price) = SERVICES[seed % SERVICES.len()];
    CreateSalesTransactionRequest {
        item_service_name: name.to_string(),
        price: Money::from_major_minor(price, 0),
        quantity: 1 + (seed % 2) as i64,
    }
}

fn generate_order(seed: usize) -> CreateOrderRequest {
    let lines = 1 + seed % 3;
    let items = (0..lines)
        .map(|n| {
            let (name, price) = PRODUCTS[(seed + n * 3) % PRODUCTS.len()];
            OrderLine::new(name, Money::from_major_minor(price, 0), 1 + ((seed + n) % 4) as i64)
        })
        .collect();

    CreateOrderRequest {
        payment_method: PaymentMethod::ALL[seed % PaymentMethod::ALL.len()]
            .as_str()
            .to_string(),
        items,
    }
}
