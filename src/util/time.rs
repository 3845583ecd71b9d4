use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the UNIX epoch, used to stamp export file names.
pub fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// `design-<product>-<millis>.png`, with the product name reduced to
/// characters that are safe in a file name.
pub fn export_file_name(product_name: &str, millis: u128) -> String {
    let product: String = product_name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    let product = if product.is_empty() { "product".to_owned() } else { product };
    format!("design-{product}-{millis}.png")
}
