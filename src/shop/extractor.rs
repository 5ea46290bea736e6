//! HTML extraction of product records from listing pages.

use crate::error::ScrapeError;
use crate::shop::client::ShopFetch;
use crate::shop::images::ImageRetriever;
use crate::shop::models::{ListingCard, ScrapedRecord};
use crate::shop::price::PriceParser;
use crate::shop::selectors;
use scraper::{ElementRef, Html};
use tracing::{debug, trace};

/// Parses listing markup into records, downloading each card's image.
pub struct RecordExtractor<'a, C: ShopFetch + ?Sized> {
    prices: &'a PriceParser,
    images: &'a ImageRetriever<'a, C>,
}

impl<'a, C: ShopFetch + ?Sized> RecordExtractor<'a, C> {
    pub fn new(prices: &'a PriceParser, images: &'a ImageRetriever<'a, C>) -> Self {
        Self { prices, images }
    }

    /// Extracts one record per product card, in document order.
    ///
    /// Every card is validated before any image is downloaded, so a
    /// template mismatch anywhere on the page fails without side effects.
    pub async fn extract(&self, html: &str) -> Result<Vec<ScrapedRecord>, ScrapeError> {
        let cards = parse_cards(html, self.prices)?;

        let mut records = Vec::with_capacity(cards.len());
        for card in cards {
            let image_ref = self.images.retrieve(&card.image_url).await?;
            trace!("Extracted {} @ {}", card.title, card.price);
            records.push(ScrapedRecord::new(card.title, card.price, image_ref));
        }

        Ok(records)
    }
}

/// Reads every product card on a page without touching the network.
pub fn parse_cards(html: &str, prices: &PriceParser) -> Result<Vec<ListingCard>, ScrapeError> {
    let document = Html::parse_document(html);

    let cards = document
        .select(&selectors::PRODUCT_CARD)
        .enumerate()
        .map(|(index, element)| parse_card(element, index, prices))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Found {} product cards", cards.len());
    Ok(cards)
}

fn parse_card(element: ElementRef, index: usize, prices: &PriceParser) -> Result<ListingCard, ScrapeError> {
    let missing = |what: &str| ScrapeError::extraction(format!("product card #{} has no {}", index + 1, what));

    let title = element
        .select(&selectors::TITLE)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .ok_or_else(|| missing("title"))?;

    if title.is_empty() {
        return Err(ScrapeError::extraction(format!("product card #{} has an empty title", index + 1)));
    }

    let price_text = element
        .select(&selectors::PRICE)
        .next()
        .map(|e| e.text().collect::<String>())
        .ok_or_else(|| missing("price"))?;

    let price = prices.parse(&price_text)?;

    let image_url = element
        .select(&selectors::IMAGE)
        .next()
        .ok_or_else(|| missing("image"))?
        .value()
        .attr(selectors::IMAGE_ATTR)
        .map(|src| src.trim().to_string())
        .filter(|src| !src.is_empty())
        .ok_or_else(|| missing("image source"))?;

    Ok(ListingCard { title, price, image_url })
}
