//! Products, the catalog and the filtered/sorted view shown to shoppers.
//!
//! The catalog is loaded once and never mutated afterwards. Every search or
//! sort change produces a fresh [`FilteredView`] from the full catalog; the
//! catalog is small and unpaginated, so there is no incremental diffing.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// A purchasable product as described by the catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
}

/// Errors raised while building a [`Catalog`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Two products share the same id.
    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),
}

/// The read-only, ordered list of products for the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog, preserving document order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two products share an id.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateId(product.id));
            }
        }
        Ok(Self { products })
    }

    /// Look up a product by id.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Sort options offered next to the search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    /// Catalog order.
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortOption {
    /// Every option, in the order a select box lists them.
    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::NameAsc,
        Self::NameDesc,
    ];

    /// The kebab-case name used by front-ends.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }

    /// Parse a front-end value, falling back to [`SortOption::Default`] for
    /// anything unrecognized.
    #[must_use]
    pub fn from_param(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Default => Ordering::Equal,
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
            Self::NameAsc => collate(&a.name, &b.name),
            Self::NameDesc => collate(&b.name, &a.name),
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.as_str() == s.trim())
            .ok_or_else(|| format!("unknown sort option {s:?}"))
    }
}

/// The subset and ordering of the catalog currently shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilteredView {
    pub query: String,
    pub sort: SortOption,
    pub products: Vec<Product>,
}

impl FilteredView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Product ids in display order.
    #[must_use]
    pub fn ids(&self) -> Vec<ProductId> {
        self.products.iter().map(|product| product.id).collect()
    }
}

/// Derive the view for a search query and sort option.
///
/// Filtering is a case-insensitive substring match on the product name; a
/// blank query keeps every product. Sorting is stable and touches only the
/// filtered copy.
#[must_use]
pub fn apply_view(catalog: &Catalog, query: &str, sort: SortOption) -> FilteredView {
    let query = query.trim();
    let needle = query.to_lowercase();

    let mut products: Vec<Product> = catalog
        .products()
        .iter()
        .filter(|product| needle.is_empty() || product.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    if sort != SortOption::Default {
        products.sort_by(|a, b| sort.compare(a, b));
    }

    FilteredView {
        query: query.to_owned(),
        sort,
        products,
    }
}

/// Locale-aware name ordering.
///
/// Names are compared with case and common Latin diacritics folded, so
/// "água" sorts next to "Agenda" rather than after "Zebra". Raw text breaks
/// ties to keep the ordering total.
fn collate(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(fold_char);
    let folded_b = b.chars().flat_map(fold_char);
    folded_a.cmp(folded_b).then_with(|| a.cmp(b))
}

fn fold_char(c: char) -> impl Iterator<Item = char> {
    let base = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        other => other,
    };
    base.to_lowercase()
}
