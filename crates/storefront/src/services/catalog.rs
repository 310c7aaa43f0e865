//! Catalog queries.
//!
//! Listing and search never return a product that appears in any user's
//! order history. The sold set is recomputed from the store on every call.

use thiserror::Error;

use emporium_core::{Price, ProductId};

use crate::db::{ProductFilter, Store, StoreError, Window};
use crate::models::{NewProduct, Product};

/// Page size used when none (or an invalid one) is given.
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u64 = 100;
/// Largest skip the store accepts (a signed 64-bit count).
const MAX_SKIP: u64 = i64::MAX.unsigned_abs();

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A search or product field was rejected.
    #[error("{0}")]
    InvalidQuery(String),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// A normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Pagination {
    /// Clamp raw values: page below 1 becomes 1, page size below 1 becomes
    /// the default, page size above the maximum becomes the maximum.
    #[must_use]
    pub fn new(page: i64, page_size: i64) -> Self {
        let page = u64::try_from(page).ok().filter(|&p| p >= 1).unwrap_or(1);
        let page_size = match u64::try_from(page_size) {
            Ok(0) | Err(_) => DEFAULT_PAGE_SIZE,
            Ok(size) => size.min(MAX_PAGE_SIZE),
        };
        Self { page, page_size }
    }

    /// Parse from raw query strings. Unparseable values fall back to the
    /// defaults.
    #[must_use]
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|s| s.trim().parse::<i64>().ok());
        Self::new(parse(page).unwrap_or(1), parse(page_size).unwrap_or(0))
    }

    /// Number of matches to skip, capped at what the store accepts.
    #[must_use]
    pub const fn skip(self) -> u64 {
        let skip = self.page.saturating_sub(1).saturating_mul(self.page_size);
        if skip > MAX_SKIP { MAX_SKIP } else { skip }
    }

    #[must_use]
    pub const fn window(self) -> Window {
        Window {
            skip: self.skip(),
            limit: self.page_size,
        }
    }

    /// Pages needed to show `total` items.
    #[must_use]
    pub const fn total_pages(self, total: u64) -> u64 {
        total.div_ceil(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the size of the whole result set.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
    pub total: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.pagination.total_pages(self.total)
    }
}

/// A validated name/price search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
}

impl SearchQuery {
    /// Build a query from raw parameters. Empty strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidQuery` when no parameter is given, when
    /// a price is not a non-negative integer, or when min exceeds max.
    pub fn parse(
        search: Option<&str>,
        min_price: Option<&str>,
        max_price: Option<&str>,
    ) -> Result<Self, CatalogError> {
        fn present(raw: Option<&str>) -> Option<&str> {
            raw.map(str::trim).filter(|s| !s.is_empty())
        }

        let search = present(search);
        let min_raw = present(min_price);
        let max_raw = present(max_price);

        if search.is_none() && min_raw.is_none() && max_raw.is_none() {
            return Err(CatalogError::InvalidQuery(
                "at least one search parameter is required (search, min_price, or max_price)"
                    .to_string(),
            ));
        }

        let min_price = min_raw.map(|raw| parse_price("min_price", raw)).transpose()?;
        let max_price = max_raw.map(|raw| parse_price("max_price", raw)).transpose()?;

        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(CatalogError::InvalidQuery(
                    "min_price must be less than or equal to max_price".to_string(),
                ));
            }
        }

        Ok(Self {
            name: search.map(str::to_owned),
            min_price,
            max_price,
        })
    }
}

fn parse_price(field: &str, raw: &str) -> Result<Price, CatalogError> {
    raw.parse::<i64>()
        .ok()
        .and_then(|amount| Price::new(amount).ok())
        .ok_or_else(|| CatalogError::InvalidQuery(format!("{field} must be a valid number")))
}

/// Catalog query engine.
pub struct CatalogService<'a> {
    store: &'a dyn Store,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// All unsold products, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the store fails.
    pub async fn list_products(&self, pagination: Pagination) -> Result<Page<Product>, CatalogError> {
        self.page(ProductFilter::default(), pagination).await
    }

    /// Unsold products whose name contains `substring`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the store fails.
    pub async fn search_by_name(&self, substring: &str) -> Result<Vec<Product>, CatalogError> {
        let filter = ProductFilter {
            name: Some(substring.to_owned()),
            exclude: self.store.sold_product_ids().await?,
            ..ProductFilter::default()
        };
        Ok(self.store.find_products(&filter, None).await?)
    }

    /// Unsold products matching every predicate of `query`, paginated.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the store fails.
    pub async fn search(
        &self,
        query: SearchQuery,
        pagination: Pagination,
    ) -> Result<Page<Product>, CatalogError> {
        let filter = ProductFilter {
            name: query.name,
            min_price: query.min_price,
            max_price: query.max_price,
            ..ProductFilter::default()
        };
        self.page(filter, pagination).await
    }

    /// Create a product and return its id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidQuery` if the name is blank.
    pub async fn add_product(&self, product: NewProduct) -> Result<ProductId, CatalogError> {
        let name = product.product_name.trim();
        if name.is_empty() {
            return Err(CatalogError::InvalidQuery(
                "product_name is required".to_string(),
            ));
        }

        let product = Product {
            product_id: ProductId::generate(),
            product_name: name.to_owned(),
            price: product.price,
            rating: product.rating,
            image: product.image.trim().to_owned(),
        };
        self.store.insert_product(&product).await?;

        tracing::info!(product_id = %product.product_id, "Product added");
        Ok(product.product_id)
    }

    async fn page(
        &self,
        mut filter: ProductFilter,
        pagination: Pagination,
    ) -> Result<Page<Product>, CatalogError> {
        filter.exclude = self.store.sold_product_ids().await?;

        let total = self.store.count_products(&filter).await?;
        let items = self
            .store
            .find_products(&filter, Some(pagination.window()))
            .await?;

        Ok(Page {
            items,
            pagination,
            total,
        })
    }
}
