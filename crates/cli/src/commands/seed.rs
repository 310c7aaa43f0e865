//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - product_name: Alpine Kettle
//!     price: 1500
//!     rating: 4
//!     image: https://cdn.example.com/kettle.jpg
//! ```
//!
//! Prices are in minor units. Each product gets a fresh id, so running the
//! same file twice inserts the products twice.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use emporium_storefront::models::NewProduct;
use emporium_storefront::services::catalog::CatalogService;

use super::{CliError, connect};

/// Contents of a product seed file.
#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub products: Vec<NewProduct>,
}

/// Parse a seed file.
///
/// # Errors
///
/// Returns `CliError::Yaml` if the document does not match the format.
pub fn parse(content: &str) -> Result<ProductSeed, CliError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Insert every product in `file` through the catalog engine.
///
/// The file is parsed before connecting, so a malformed file never leaves
/// the catalog half-seeded.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the store
/// cannot be reached.
pub async fn products(file: &Path) -> Result<(), CliError> {
    let content = tokio::fs::read_to_string(file)
        .await
        .map_err(|source| CliError::Read {
            path: file.display().to_string(),
            source,
        })?;
    let seed = parse(&content)?;
    info!(path = %file.display(), products = seed.products.len(), "Parsed seed file");

    let (_, store) = connect().await?;
    let catalog = CatalogService::new(&store);

    let mut inserted = 0_usize;
    let mut failed = 0_usize;
    for product in seed.products {
        let name = product.product_name.clone();
        match catalog.add_product(product).await {
            Ok(product_id) => {
                inserted += 1;
                info!(%product_id, name = %name, "Inserted");
            }
            Err(e) => {
                failed += 1;
                error!(name = %name, "Failed: {e}");
            }
        }
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    if failed > 0 {
        error!("  Products failed: {failed}");
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_file() {
        let seed = parse(
            "products:\n  - product_name: Kettle\n    price: 1500\n    rating: 4\n  - product_name: Mug\n    price: 300\n",
        )
        .unwrap();

        assert_eq!(seed.products.len(), 2);
        assert_eq!(seed.products[0].product_name, "Kettle");
        assert_eq!(seed.products[0].price.amount(), 1500);
        assert_eq!(seed.products[1].rating, 0);
        assert!(seed.products[1].image.is_empty());
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = parse("products:\n  - product_name: Kettle\n    price: -1\n");
        assert!(matches!(result, Err(CliError::Yaml(_))));
    }
}
