//! Masked currency input.
//!
//! Every keystroke in the price field is fed through [`CurrencyFormatter::format`],
//! which keeps only the digits, treats the last two of them as cents and
//! re-renders the whole value with thousands grouping. The display text and
//! the numeric value are always produced together so they cannot drift apart.

use serde::{Deserialize, Serialize};

/// Shortest digit string that still has an integer digit and two cents digits.
pub const MIN_PRICE_DIGITS: usize = 3;
pub const FRACTION_DIGITS: usize = 2;
/// Significant digits kept from the field, cents included. Fifteen digits
/// stay exact in an `f64`; keystrokes beyond that are dropped.
pub const MAX_PRICE_DIGITS: usize = 15;

/// Separators used when rendering amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocaleFormat {
    pub group_separator: char,
    pub decimal_separator: char,
}

impl LocaleFormat {
    pub const PT_BR: Self = Self {
        group_separator: '.',
        decimal_separator: ',',
    };

    pub const EN_US: Self = Self {
        group_separator: ',',
        decimal_separator: '.',
    };
}

impl Default for LocaleFormat {
    fn default() -> Self {
        Self::PT_BR
    }
}

/// In-progress text and value of a price field.
///
/// `numeric_value` is `None` exactly when `display_text` is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceEditState {
    display_text: String,
    numeric_value: Option<f64>,
}

impl PriceEditState {
    #[must_use]
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    #[must_use]
    pub const fn numeric_value(&self) -> Option<f64> {
        self.numeric_value
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_text.is_empty()
    }

    /// A price is acceptable for submission only when it is strictly positive.
    #[must_use]
    pub fn is_valid_price(&self) -> bool {
        self.numeric_value
            .is_some_and(|value| value.is_finite() && value > 0.0)
    }

    /// Seeds the field from the backend's decimal-as-text price.
    ///
    /// Text that does not parse, or parses to a negative or non-finite
    /// number, leaves the field empty so the user has to enter a new price.
    #[must_use]
    pub fn from_price_text(preco: &str, formatter: &CurrencyFormatter) -> Self {
        match preco.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => {
                formatter.format(&formatter.initial_display(value))
            }
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrencyFormatter {
    locale: LocaleFormat,
}

impl CurrencyFormatter {
    #[must_use]
    pub const fn new(locale: LocaleFormat) -> Self {
        Self { locale }
    }

    #[must_use]
    pub const fn locale(&self) -> LocaleFormat {
        self.locale
    }

    /// Turns raw field text into the masked display string and its value.
    ///
    /// Total over all inputs: non-digits are dropped, an input without
    /// digits clears the field, and significant digits past
    /// [`MAX_PRICE_DIGITS`] are ignored.
    #[must_use]
    pub fn format(&self, raw_input: &str) -> PriceEditState {
        let digits: String = raw_input.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return PriceEditState::default();
        }
        let digits: String = digits
            .trim_start_matches('0')
            .chars()
            .take(MAX_PRICE_DIGITS)
            .collect();

        let padded = format!("{digits:0>MIN_PRICE_DIGITS$}");
        let (integer_digits, fraction_digits) = padded.split_at(padded.len() - FRACTION_DIGITS);

        let display_text = format!(
            "{}{}{}",
            group_digits(integer_digits, self.locale.group_separator),
            self.locale.decimal_separator,
            fraction_digits
        );
        let numeric_value = format!("{integer_digits}.{fraction_digits}")
            .parse::<f64>()
            .ok();

        PriceEditState {
            display_text,
            numeric_value,
        }
    }

    /// Renders a known amount with the same two-decimal, grouped rule.
    #[must_use]
    pub fn initial_display(&self, value: f64) -> String {
        if !value.is_finite() {
            return String::new();
        }

        let fixed = format!("{:.2}", value.abs());
        let Some((integer_digits, fraction_digits)) = fixed.split_once('.') else {
            return String::new();
        };
        let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };

        format!(
            "{sign}{}{}{fraction_digits}",
            group_digits(integer_digits, self.locale.group_separator),
            self.locale.decimal_separator
        )
    }

    /// Table cell rendering: two decimals, no grouping, e.g. `R$ 1234,50`.
    #[must_use]
    pub fn price_label(&self, preco: &str, prefix: &str) -> String {
        match preco.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => {
                let fixed = format!("{value:.2}");
                let localized: String = fixed
                    .chars()
                    .map(|c| if c == '.' { self.locale.decimal_separator } else { c })
                    .collect();
                format!("{prefix}{localized}")
            }
            _ => format!("{prefix}{preco}"),
        }
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let significant = digits.trim_start_matches('0');
    let significant = if significant.is_empty() { "0" } else { significant };

    let len = significant.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in significant.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}
