//! CSS selectors for the shop's listing page template.
//!
//! Update this file when the storefront theme changes its markup, and add
//! a matching fixture under `tests/fixtures`.

use scraper::Selector;
use std::sync::LazyLock;

/// Product card container, one per listing entry.
pub static PRODUCT_CARD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.product-inner").unwrap());

/// Product title inside a card.
pub static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2.woo-loop-product__title").unwrap());

/// Price amount inside a card. The first match is used.
pub static PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.woocommerce-Price-amount").unwrap());

/// Product thumbnail inside a card.
pub static IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img.attachment-woocommerce_thumbnail").unwrap());

/// Attribute holding the thumbnail URL.
pub static IMAGE_ATTR: &str = "src";
