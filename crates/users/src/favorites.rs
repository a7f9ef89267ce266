//! Favorites list membership.
//!
//! A favorites list is an insertion-ordered set of product ids. Adding an
//! id that is already present is a no-op, as is removing one that is
//! absent. Product existence is not checked here (matching the API
//! contract: a favorite is a bookmark, not a reference with integrity).

use tradepost_core::ProductId;

/// Append `product` to `favorites` if absent. Returns whether the list changed.
pub fn add_favorite(favorites: &mut Vec<ProductId>, product: ProductId) -> bool {
    if favorites.contains(&product) {
        return false;
    }
    favorites.push(product);
    true
}

/// Remove `product` from `favorites` if present. Returns whether the list changed.
pub fn remove_favorite(favorites: &mut Vec<ProductId>, product: ProductId) -> bool {
    let before = favorites.len();
    favorites.retain(|p| *p != product);
    favorites.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_appends_in_insertion_order() {
        let (a, b) = (ProductId::new(), ProductId::new());
        let mut favorites = Vec::new();
        assert!(add_favorite(&mut favorites, a));
        assert!(add_favorite(&mut favorites, b));
        assert_eq!(favorites, vec![a, b]);
    }

    #[test]
    fn add_twice_keeps_exactly_one_occurrence() {
        let a = ProductId::new();
        let mut favorites = Vec::new();
        assert!(add_favorite(&mut favorites, a));
        assert!(!add_favorite(&mut favorites, a));
        assert_eq!(favorites, vec![a]);
    }

    #[test]
    fn remove_of_absent_id_is_a_no_op() {
        let (a, b) = (ProductId::new(), ProductId::new());
        let mut favorites = vec![a];
        assert!(!remove_favorite(&mut favorites, b));
        assert_eq!(favorites, vec![a]);
    }

    #[test]
    fn remove_drops_the_id_and_preserves_order() {
        let (a, b, c) = (ProductId::new(), ProductId::new(), ProductId::new());
        let mut favorites = vec![a, b, c];
        assert!(remove_favorite(&mut favorites, b));
        assert_eq!(favorites, vec![a, c]);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;
        use uuid::Uuid;

        fn product_ids() -> impl Strategy<Value = Vec<ProductId>> {
            // Small id space so collisions (duplicates) actually occur.
            prop::collection::vec(0u8..8, 0..24).prop_map(|ns| {
                ns.into_iter()
                    .map(|n| ProductId::from_uuid(Uuid::from_u128(u128::from(n) + 1)))
                    .collect()
            })
        }

        proptest! {
            /// Adding the same id any number of times yields one occurrence.
            #[test]
            fn add_is_idempotent(ops in product_ids()) {
                let mut favorites = Vec::new();
                for p in &ops {
                    add_favorite(&mut favorites, *p);
                }
                for p in &favorites {
                    prop_assert_eq!(favorites.iter().filter(|q| *q == p).count(), 1);
                }
            }

            /// Remove after add leaves the list as if the id was never added.
            #[test]
            fn remove_undoes_add(ops in product_ids(), extra in 0u8..8) {
                let extra = ProductId::from_uuid(Uuid::from_u128(u128::from(extra) + 1));
                let mut with = Vec::new();
                let mut without = Vec::new();
                for p in &ops {
                    add_favorite(&mut with, *p);
                    if *p != extra {
                        add_favorite(&mut without, *p);
                    }
                }
                remove_favorite(&mut with, extra);
                prop_assert_eq!(with, without);
            }
        }
    }
}
