use regex::Regex;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::str::FromStr;
use url::Url;

use crate::Result;
use crate::config::SiteRule;
use crate::error::AppError;

/// Default rule for the original target site's markup.
const DEFAULT_SELECTOR: &str = "span.a-price-whole";

const PRICE_PATTERN: &str = r"(\d+(?:\.\d{1,2})?)";

/// Site-specific price extraction, kept behind a trait so new sites only
/// need a new rule, never a change to the orchestrator.
///
/// `None` covers both "selector matched nothing" and "matched text is not a
/// number": a recoverable no-price outcome, not an error.
pub trait PriceExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Option<Decimal>;
}

/// Extracts a price from the first element matched by a CSS selector.
pub struct CssPriceExtractor {
    selector: String,
    price_regex: Regex,
}

impl CssPriceExtractor {
    pub fn new(selector: &str) -> Result<Self> {
        // Validate up front so a bad rule fails at startup, not mid-cycle.
        Selector::parse(selector).map_err(|e| AppError::Selector {
            selector: selector.to_string(),
            message: format!("{:?}", e),
        })?;

        Ok(Self {
            selector: selector.to_string(),
            price_regex: Regex::new(PRICE_PATTERN).unwrap(),
        })
    }

    fn parse_price(&self, text: &str) -> Option<Decimal> {
        // Strip thousands separators before matching so long digit runs
        // are captured whole, not cut at the first group of three.
        let cleaned = text.replace(',', "");
        let captures = self.price_regex.captures(&cleaned)?;
        Decimal::from_str(captures.get(1)?.as_str()).ok()
    }
}

impl PriceExtractor for CssPriceExtractor {
    fn extract(&self, html: &str) -> Option<Decimal> {
        let document = Html::parse_document(html);
        // Validated in new(), so this cannot fail.
        let selector = Selector::parse(&self.selector).ok()?;

        let element = document.select(&selector).next()?;
        let text = element.text().collect::<Vec<_>>().join(" ");
        self.parse_price(text.trim())
    }
}

/// Strategy table mapping host patterns to extraction rules.
pub struct ExtractorRegistry {
    rules: Vec<(String, CssPriceExtractor)>,
    fallback: CssPriceExtractor,
}

impl ExtractorRegistry {
    pub fn from_config(sites: &[SiteRule]) -> Result<Self> {
        let mut rules = Vec::with_capacity(sites.len());
        for site in sites {
            rules.push((site.host.clone(), CssPriceExtractor::new(&site.selector)?));
        }

        Ok(Self {
            rules,
            fallback: CssPriceExtractor::new(DEFAULT_SELECTOR)?,
        })
    }

    /// Pick the extraction rule for a URL by host pattern, first match wins.
    pub fn for_url(&self, url: &str) -> &dyn PriceExtractor {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()));

        if let Some(host) = host {
            for (pattern, extractor) in &self.rules {
                if host.contains(pattern.as_str()) {
                    return extractor;
                }
            }
        }

        &self.fallback
    }
}
