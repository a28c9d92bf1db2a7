//! FILENAME: cellset-renderer/src/number_format.rs
//! PURPOSE: Optional caller-supplied formatting of numeric body cells.
//! CONTEXT: When the renderer has a body format, numeric cells are formatted
//! with it. Otherwise, and for non-numeric cells, the cell set's own
//! formatted string is shown unchanged.

use olap_engine::Cell;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyPosition {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberFormat {
    General,
    Number {
        decimal_places: u8,
        use_thousands_separator: bool,
    },
    Currency {
        decimal_places: u8,
        symbol: String,
        symbol_position: CurrencyPosition,
    },
    Percentage {
        decimal_places: u8,
    },
    Scientific {
        decimal_places: u8,
    },
}

/// Text shown for a body cell.
pub fn format_cell(cell: &Cell, format: Option<&NumberFormat>) -> String {
    match (format, cell.value.as_f64()) {
        (Some(format), Some(value)) => format_number(value, format),
        _ => cell.formatted_value.clone(),
    }
}

pub fn format_number(value: f64, format: &NumberFormat) -> String {
    match format {
        NumberFormat::General => format_general(value),
        NumberFormat::Number {
            decimal_places,
            use_thousands_separator,
        } => format_decimal(value, *decimal_places, *use_thousands_separator),
        NumberFormat::Currency {
            decimal_places,
            symbol,
            symbol_position,
        } => format_currency(value, *decimal_places, symbol, *symbol_position),
        NumberFormat::Percentage { decimal_places } => {
            format!("{:.prec$}%", value * 100.0, prec = *decimal_places as usize)
        }
        NumberFormat::Scientific { decimal_places } => {
            format!("{:.prec$e}", value, prec = *decimal_places as usize).replace('e', "E")
        }
    }
}

fn format_general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let abs_value = value.abs();

    if abs_value >= 1e10 || abs_value < 1e-4 {
        return format!("{:.5e}", value).replace('e', "E");
    }
    if value.fract() == 0.0 {
        return format!("{:.0}", value);
    }

    format!("{:.10}", value)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn format_decimal(value: f64, decimal_places: u8, use_thousands_separator: bool) -> String {
    let rounded = format!("{:.prec$}", value, prec = decimal_places as usize);
    if use_thousands_separator {
        add_thousands_separator(&rounded)
    } else {
        rounded
    }
}

/// Inserts `,` every three integer digits of an already-rounded number.
fn add_thousands_separator(s: &str) -> String {
    let (integer_part, decimal_part) = match s.split_once('.') {
        Some((int, dec)) => (int, Some(dec)),
        None => (s, None),
    };
    let negative = integer_part.starts_with('-');
    let digits: Vec<char> = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut result = String::with_capacity(s.len() + digits.len() / 3 + 1);
    if negative {
        result.push('-');
    }
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    if let Some(decimal) = decimal_part {
        result.push('.');
        result.push_str(decimal);
    }
    result
}

fn format_currency(
    value: f64,
    decimal_places: u8,
    symbol: &str,
    position: CurrencyPosition,
) -> String {
    let amount = add_thousands_separator(&format!(
        "{:.prec$}",
        value.abs(),
        prec = decimal_places as usize
    ));
    let with_symbol = match position {
        CurrencyPosition::Before => format!("{}{}", symbol, amount),
        CurrencyPosition::After => format!("{}{}", amount, symbol),
    };
    if value < 0.0 {
        format!("({})", with_symbol)
    } else {
        with_symbol
    }
}
