//! Pure filter and sort helpers for a product-listing view.
//!
//! The listing screen fetches the full product list once and narrows it
//! locally; these functions are that narrowing, kept pure so the view
//! layer only re-renders.

use uuid::Uuid;

use crate::dto::ProductResponse;

/// Listing filters. Both narrow independently; an empty search matches
/// everything.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Case-insensitive substring match against name and description.
    pub search: Option<String>,
    /// Exact category match.
    pub category_id: Option<Uuid>,
}

/// Sort orders the listing offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    NameAsc,
    PriceAsc,
    PriceDesc,
    FeaturedFirst,
}

/// Applies the filter, preserving the incoming order.
pub fn filter_products(products: Vec<ProductResponse>, filter: &CatalogFilter) -> Vec<ProductResponse> {
    let needle = filter
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    products
        .into_iter()
        .filter(|product| {
            if let Some(needle) = &needle {
                let in_name = product.name.to_lowercase().contains(needle);
                let in_description = product
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(needle));
                if !in_name && !in_description {
                    return false;
                }
            }
            if let Some(category_id) = filter.category_id {
                if product.category.id != category_id {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// Sorts in place. Every order is stable: products that compare equal keep
/// their relative positions.
pub fn sort_products(products: &mut [ProductResponse], key: SortKey) {
    match key {
        SortKey::NameAsc => products.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::FeaturedFirst => products.sort_by_key(|p| !p.featured),
    }
}
