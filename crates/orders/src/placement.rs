//! Purchase preconditions.
//!
//! The order workflow validates in a fixed, short-circuiting sequence:
//! the listing exists (checked by the caller via lookup), it is not sold,
//! and the buyer is not its owner. First failure wins and its message is
//! surfaced verbatim to the client.

use tradepost_catalog::Listing;
use tradepost_core::{DomainError, DomainResult, UserId};

pub const ALREADY_SOLD: &str = "This product has already been sold";
pub const OWN_PRODUCT: &str = "You cannot buy your own product";

/// Check that `buyer` may purchase `listing`.
///
/// Sold state is checked before ownership, so an owner probing their own
/// sold listing sees the already-sold error, matching the sequence the
/// API documents.
pub fn check_purchasable(listing: &Listing, buyer: UserId) -> DomainResult<()> {
    if listing.sold {
        return Err(DomainError::validation(ALREADY_SOLD));
    }
    if listing.owner == buyer {
        return Err(DomainError::validation(OWN_PRODUCT));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tradepost_catalog::NewListing;

    fn listing(owner: UserId) -> Listing {
        Listing::new(
            NewListing {
                title: "X".to_string(),
                price: 100,
                description: "desc".to_string(),
                image: String::new(),
            },
            owner,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn unsold_foreign_listing_is_purchasable() {
        let listing = listing(UserId::new());
        assert!(check_purchasable(&listing, UserId::new()).is_ok());
    }

    #[test]
    fn sold_listing_is_rejected_with_the_exact_message() {
        let mut listing = listing(UserId::new());
        listing.sold = true;
        let err = check_purchasable(&listing, UserId::new()).unwrap_err();
        assert_eq!(err, DomainError::validation(ALREADY_SOLD));
    }

    #[test]
    fn own_listing_is_rejected_with_the_exact_message() {
        let owner = UserId::new();
        let listing = listing(owner);
        let err = check_purchasable(&listing, owner).unwrap_err();
        assert_eq!(err, DomainError::validation(OWN_PRODUCT));
    }

    #[test]
    fn sold_state_is_checked_before_ownership() {
        let owner = UserId::new();
        let mut listing = listing(owner);
        listing.sold = true;
        let err = check_purchasable(&listing, owner).unwrap_err();
        assert_eq!(err, DomainError::validation(ALREADY_SOLD));
    }
}
