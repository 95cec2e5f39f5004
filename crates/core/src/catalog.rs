//! Product listing options: search, category filter and sort order.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum number of name suggestions returned for a search prefix.
pub const SUGGESTION_LIMIT: i64 = 6;

/// Category name that means "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Error returned for an unknown sort key.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sort order: {0}")]
pub struct ParseSortError(pub String);

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    /// Catalog order (by product id).
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    NameAsc,
}

impl ProductSort {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::NameAsc => "name-asc",
        }
    }
}

impl FromStr for ProductSort {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "name-asc" => Ok(Self::NameAsc),
            other => Err(ParseSortError(other.to_owned())),
        }
    }
}

/// Normalized product listing filter.
///
/// A non-empty search query takes precedence over the category, the same
/// way the storefront search box replaces the selected category tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    query: Option<String>,
    category: Option<String>,
    in_stock_only: bool,
    max_price: Option<Decimal>,
    sort: ProductSort,
}

impl ProductFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive name search. Blank input clears it.
    #[must_use]
    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_owned);
        self
    }

    /// Category name. `All` and blank input clear it.
    #[must_use]
    pub fn with_category(mut self, category: Option<&str>) -> Self {
        self.category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
            .map(str::to_owned);
        self
    }

    #[must_use]
    pub const fn with_in_stock_only(mut self, in_stock_only: bool) -> Self {
        self.in_stock_only = in_stock_only;
        self
    }

    /// Price ceiling. Zero or negative means no ceiling.
    #[must_use]
    pub fn with_max_price(mut self, max_price: Option<Decimal>) -> Self {
        self.max_price = max_price.filter(|p| *p > Decimal::ZERO);
        self
    }

    #[must_use]
    pub const fn with_sort(mut self, sort: ProductSort) -> Self {
        self.sort = sort;
        self
    }

    /// Search text, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Category to filter on. Always `None` while a search query is set.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        if self.query.is_some() {
            None
        } else {
            self.category.as_deref()
        }
    }

    #[must_use]
    pub const fn in_stock_only(&self) -> bool {
        self.in_stock_only
    }

    #[must_use]
    pub const fn max_price(&self) -> Option<Decimal> {
        self.max_price
    }

    #[must_use]
    pub const fn sort(&self) -> ProductSort {
        self.sort
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse() {
        assert_eq!("price-desc".parse::<ProductSort>().unwrap(), ProductSort::PriceDesc);
        assert_eq!(
            "cheapest".parse::<ProductSort>(),
            Err(ParseSortError("cheapest".to_owned()))
        );
        for sort in [
            ProductSort::Featured,
            ProductSort::PriceAsc,
            ProductSort::PriceDesc,
            ProductSort::NameAsc,
        ] {
            assert_eq!(sort.as_str().parse::<ProductSort>().unwrap(), sort);
        }
    }

    #[test]
    fn test_query_overrides_category() {
        let filter = ProductFilter::new()
            .with_category(Some("Fruits"))
            .with_query(Some("  mango "));
        assert_eq!(filter.query(), Some("mango"));
        assert_eq!(filter.category(), None);

        let filter = ProductFilter::new()
            .with_category(Some("Fruits"))
            .with_query(Some("   "));
        assert_eq!(filter.query(), None);
        assert_eq!(filter.category(), Some("Fruits"));
    }

    #[test]
    fn test_all_category_means_unfiltered() {
        let filter = ProductFilter::new().with_category(Some("All"));
        assert_eq!(filter.category(), None);
    }

    #[test]
    fn test_non_positive_max_price_is_ignored() {
        let filter = ProductFilter::new().with_max_price(Some(Decimal::ZERO));
        assert_eq!(filter.max_price(), None);

        let filter = ProductFilter::new().with_max_price(Some(Decimal::new(250, 0)));
        assert_eq!(filter.max_price(), Some(Decimal::new(250, 0)));
    }
}
