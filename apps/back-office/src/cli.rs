//! Command-line interface definition.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clowee_core::types::{PaymentDuration, PaymentMethod};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "clowee", version, about = "Clowee franchise back office")]
pub struct Cli {
    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Database file (overrides CLOWEE_DB_PATH).
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply pending database migrations.
    Migrate,

    /// List active franchises with the terms in force today.
    Franchises,

    /// Start new terms for a franchise; unset options keep the terms in force.
    AddAgreement {
        #[arg(long)]
        franchise: String,

        /// First day the terms apply (YYYY-MM-DD).
        #[arg(long)]
        effective: NaiveDate,

        /// Price per coin in taka.
        #[arg(long)]
        coin_price: Option<String>,

        /// Cost per prize in taka.
        #[arg(long)]
        doll_price: Option<String>,

        /// Electricity per billing period in taka.
        #[arg(long)]
        electricity: Option<String>,

        /// VAT percentage, e.g. `7.5`.
        #[arg(long)]
        vat: Option<String>,

        #[arg(long)]
        franchise_share: Option<String>,

        #[arg(long)]
        clowee_share: Option<String>,

        /// Maintenance percentage; an empty value removes it.
        #[arg(long)]
        maintenance: Option<String>,

        #[arg(long, value_enum)]
        duration: Option<DurationArg>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Record one billing period's sale for a machine.
    RecordSale {
        #[arg(long)]
        machine: String,

        /// Sales date (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,

        /// Coins played; missing or unparseable counts as zero.
        #[arg(long)]
        coins: Option<String>,

        /// Prizes won; missing or unparseable counts as zero.
        #[arg(long)]
        prizes: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Record a payment against a sale.
    Pay {
        #[arg(long)]
        sale: String,

        /// Amount in taka, e.g. `1,250.50`.
        #[arg(long)]
        amount: String,

        #[arg(long, value_enum, default_value_t = MethodArg::Cash)]
        method: MethodArg,

        #[arg(long)]
        reference: Option<String>,

        /// Payment date (YYYY-MM-DD), defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Build a franchise invoice for a date range.
    Invoice {
        #[arg(long)]
        franchise: String,

        /// First day (YYYY-MM-DD).
        #[arg(long)]
        from: NaiveDate,

        /// Last day, inclusive (YYYY-MM-DD).
        #[arg(long)]
        to: NaiveDate,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    Cash,
    Bank,
    Mobile,
    Cheque,
}

impl From<MethodArg> for PaymentMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Cash => PaymentMethod::Cash,
            MethodArg::Bank => PaymentMethod::BankTransfer,
            MethodArg::Mobile => PaymentMethod::MobileBanking,
            MethodArg::Cheque => PaymentMethod::Cheque,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DurationArg {
    Monthly,
    HalfMonthly,
}

impl From<DurationArg> for PaymentDuration {
    fn from(arg: DurationArg) -> Self {
        match arg {
            DurationArg::Monthly => PaymentDuration::Monthly,
            DurationArg::HalfMonthly => PaymentDuration::HalfMonthly,
        }
    }
}
