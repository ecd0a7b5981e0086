//! # Fiscal Invoice Builder
//!
//! Builds the command-file line sequence for one fiscal invoice, ready for
//! [`Fiscal::send_invoice`](crate::printer::Fiscal::send_invoice).
//!
//! ## Command Sequence
//!
//! The printer expects an invoice as an ordered command list:
//!
//! 1. customer lines: `iS*<name>`, `iR*<rif>`
//! 2. one line per item: tax flag + zero-padded price + zero-padded
//!    quantity + description
//! 3. subtotal: `3`
//! 4. payments: partial payments (`2NN<amount>`) followed by one
//!    totalizing payment (`1NN`); `101` when no payment is given
//! 5. `199` when any payment used a foreign-currency slot, which the tax
//!    authority requires to close the IGTF surcharge
//!
//! ## Number Encoding
//!
//! Amounts are written without a decimal separator, zero-padded: prices as
//! 10 digits of cents, quantities as 8 digits of thousandths, payment
//! amounts as 12 digits of cents. `11.60` as a price is `0000001160`.

use serde::{Deserialize, Serialize};

/// Payment slots reserved for foreign currency; any of them triggers the
/// mandatory IGTF closing command.
pub const IGTF_SLOTS: [u8; 5] = [20, 21, 22, 23, 24];

/// Item descriptions are cut to the printer's column limit
const MAX_DESCRIPTION: usize = 40;

/// Customer identification printed on the invoice header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Legal name (`iS*` line)
    #[serde(default = "Customer::default_name")]
    pub name: String,
    /// Tax id (`iR*` line)
    #[serde(default = "Customer::default_rif")]
    pub rif: String,
}

impl Customer {
    fn default_name() -> String {
        "Consumidor Final".to_string()
    }

    fn default_rif() -> String {
        "V000000000".to_string()
    }
}

impl Default for Customer {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            rif: Self::default_rif(),
        }
    }
}

/// One invoice line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub description: String,
    pub quantity: f64,
    /// Unit price including tax
    pub unit_price: f64,
    /// Tax rate in percent (16, 8, 31, or 0 for exempt)
    #[serde(default)]
    pub tax_rate: f64,
}

impl Item {
    /// The printer command line for this item.
    ///
    /// The printer wants the unit price *before* tax; the rate flag tells
    /// it which rate to add back. Zero or negative prices are clamped to
    /// one exempt cent, which is what the printer accepts as a free line.
    fn command(&self) -> String {
        let (price, rate) = if self.unit_price <= 0.0 {
            (0.01, 0.0)
        } else {
            (self.unit_price, self.tax_rate)
        };
        let base = if rate > 0.0 { price / (1.0 + rate / 100.0) } else { price };
        let description: String = self.description.chars().take(MAX_DESCRIPTION).collect();
        format!(
            "{}{}{}{}",
            tax_flag(rate),
            zero_padded(base, 2, 10),
            zero_padded(self.quantity, 3, 8),
            description
        )
    }
}

/// One payment against the invoice total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Fiscal payment slot (1–24, per the printer's configured means of
    /// payment; 20–24 are the foreign-currency slots)
    pub slot: u8,
    /// Amount in invoice currency; ignored for the totalizing payment
    #[serde(default)]
    pub amount: f64,
}

impl Payment {
    /// Partial payment command (`2NN<amount>`), used for every payment
    /// except the last of a mixed set.
    fn partial_command(&self) -> String {
        format!("2{:02}{}", self.slot, zero_padded(self.amount, 2, 12))
    }

    /// Totalizing payment command (`1NN`), which closes the invoice with
    /// whatever amount remains.
    fn total_command(&self) -> String {
        format!("1{:02}", self.slot)
    }
}

/// A complete fiscal invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default)]
    pub customer: Customer,
    pub items: Vec<Item>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl Invoice {
    /// The full command sequence, one printer command per element.
    pub fn commands(&self) -> Vec<String> {
        let mut commands = vec![
            format!("iS*{}", self.customer.name),
            format!("iR*{}", self.customer.rif),
        ];

        for item in &self.items {
            commands.push(item.command());
        }

        commands.push("3".to_string());

        match self.payments.as_slice() {
            [] => commands.push("101".to_string()),
            [single] => commands.push(single.total_command()),
            [partials @ .., last] => {
                for payment in partials {
                    commands.push(payment.partial_command());
                }
                commands.push(last.total_command());
            }
        }

        if self.uses_igtf() {
            commands.push("199".to_string());
        }

        commands
    }

    fn uses_igtf(&self) -> bool {
        self.payments.iter().any(|p| IGTF_SLOTS.contains(&p.slot))
    }
}

/// The tax-rate flag character prefixed to an item line.
///
/// The rates are the fixed set the printer is fiscalized with, so exact
/// comparison is intended here.
fn tax_flag(rate: f64) -> char {
    if rate == 16.0 {
        '!'
    } else if rate == 8.0 {
        '"'
    } else if rate == 31.0 {
        '#'
    } else {
        ' '
    }
}

/// Render a value with `decimals` places, drop the separator, left-pad
/// with zeros to `width` digits.
fn zero_padded(value: f64, decimals: usize, width: usize) -> String {
    let digits = format!("{:.*}", decimals, value).replace('.', "");
    format!("{:0>width$}", digits)
}

// ============================================================================
// TESTS
// ============================================================================
