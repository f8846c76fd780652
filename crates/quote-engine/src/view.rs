//! Quote View-Model
//!
//! Pure rendering of a quote into the strings the pricing and payment
//! pages display. No DOM, no formatting state; testable in isolation.

use rust_decimal::Decimal;

use crate::quote::Quote;

/// Display strings for one quote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteView {
    /// Headline price, e.g. "$3,000" or "$225/hour" or "Contact for Pricing".
    pub price_text: String,
    /// Label next to the deposit line.
    pub deposit_label: String,
    /// The deposit line itself.
    pub deposit_text: String,
    /// The remainder line; non-numeric for hourly work.
    pub remaining_text: String,
    /// Footnote under the summary.
    pub summary_note: String,
    /// Intro text on the payment page.
    pub header_text: String,
}

/// Render the display strings for a quote.
pub fn render_quote(quote: &Quote) -> QuoteView {
    if quote.is_contact {
        return QuoteView {
            price_text: "Contact for Pricing".into(),
            deposit_label: "Deposit:".into(),
            deposit_text: "Contact for pricing".into(),
            remaining_text: "Contact for pricing".into(),
            summary_note: "Please contact us directly for enterprise pricing.".into(),
            header_text: "Please contact us directly to discuss your project.".into(),
        };
    }

    if quote.is_hourly_rate {
        return QuoteView {
            price_text: format!("{}/hour", format_usd(quote.total_cost)),
            deposit_label: "Initial Payment:".into(),
            deposit_text: format!("{} (1 hour)", format_usd(quote.deposit_amount)),
            remaining_text: "Billed as work is completed".into(),
            summary_note: "Subsequent hours billed as work is completed".into(),
            header_text: "Fill in your details below and pay the initial 1-hour fee to get \
                          started. I'll follow up with you to discuss your maintenance needs \
                          in detail."
                .into(),
        };
    }

    QuoteView {
        price_text: format_usd(quote.total_cost),
        deposit_label: "20% Deposit:".into(),
        deposit_text: format_usd(quote.deposit_amount),
        remaining_text: format_usd(quote.remaining_amount),
        summary_note: "Remaining balance due upon project completion".into(),
        header_text: "Fill in your details below and pay the 20% deposit to get started. \
                      I'll follow up with you to discuss your project in detail."
            .into(),
    }
}

/// Format a USD amount with comma-grouped thousands, e.g. "$1,234,567".
/// Whole-dollar amounts render without a fraction; others keep two places.
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = rounded.to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (text.as_str(), None),
    };
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(f) if f != "00" => format!("{sign}${grouped}.{f:0<2}"),
        _ => format!("{sign}${grouped}"),
    }
}
