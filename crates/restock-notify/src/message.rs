use restock_core::ProductRecord;

/// Alert for a tracked product that is back in stock.
///
/// Telegram Markdown; the link points at the landing page since the API
/// records carry no per-product URL.
pub fn restock_message(product: &ProductRecord, shop_url: &str) -> String {
    format!(
        "✅ *In Stock*: {}\n💰 Price: ₹{}\n📦 Qty: {}\n🔗 [Buy Now]({})",
        product.name.trim(),
        product.price,
        product.inventory_quantity,
        shop_url
    )
}

/// One-line report for a poll that never produced a product list
pub fn failure_message(detail: &str) -> String {
    format!("⚠️ Script Error: {}", detail)
}
