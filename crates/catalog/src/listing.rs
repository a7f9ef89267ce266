use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradepost_core::{DomainError, DomainResult, ProductId, UserId};

/// A product listing as stored and presented to marketplace users.
///
/// `sold` flips false→true exactly once, through the order workflow; no
/// code path reverses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ProductId,
    pub title: String,
    /// Price in the smallest currency unit.
    pub price: i64,
    pub description: String,
    /// URL path of the listing image; empty when none was uploaded.
    pub image: String,
    pub owner: UserId,
    pub sold: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn new(new: NewListing, owner: UserId, now: DateTime<Utc>) -> DomainResult<Self> {
        new.validate()?;
        Ok(Self {
            id: ProductId::new(),
            title: new.title.trim().to_string(),
            price: new.price,
            description: new.description.trim().to_string(),
            image: new.image,
            owner,
            sold: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply an owner edit. The sold flag is never touched here.
    pub fn apply_update(&mut self, update: ListingUpdate, now: DateTime<Utc>) -> DomainResult<()> {
        update.validate()?;
        if let Some(title) = update.title {
            self.title = title.trim().to_string();
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(description) = update.description {
            self.description = description.trim().to_string();
        }
        if let Some(image) = update.image {
            self.image = image;
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Input for creating a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct NewListing {
    pub title: String,
    pub price: i64,
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl NewListing {
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title is required"));
        }
        if self.price <= 0 {
            return Err(DomainError::validation("price must be a positive number"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("description is required"));
        }
        Ok(())
    }
}

/// An owner edit; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub price: Option<i64>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl ListingUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(DomainError::validation("title is required"));
            }
        }
        if let Some(price) = self.price {
            if price <= 0 {
                return Err(DomainError::validation("price must be a positive number"));
            }
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(DomainError::validation("description is required"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_listing() -> NewListing {
        NewListing {
            title: "Book Title 1".to_string(),
            price: 100,
            description: "A very interesting book.".to_string(),
            image: String::new(),
        }
    }

    #[test]
    fn new_listing_starts_unsold() {
        let listing = Listing::new(new_listing(), UserId::new(), Utc::now()).unwrap();
        assert!(!listing.sold);
        assert_eq!(listing.title, "Book Title 1");
    }

    #[test]
    fn empty_title_is_rejected() {
        let mut n = new_listing();
        n.title = "  ".to_string();
        assert!(matches!(
            Listing::new(n, UserId::new(), Utc::now()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn non_positive_price_is_rejected() {
        for price in [0, -5] {
            let mut n = new_listing();
            n.price = price;
            assert!(Listing::new(n, UserId::new(), Utc::now()).is_err());
        }
    }

    #[test]
    fn update_changes_only_supplied_fields() {
        let mut listing = Listing::new(new_listing(), UserId::new(), Utc::now()).unwrap();
        let update = ListingUpdate {
            price: Some(250),
            ..ListingUpdate::default()
        };
        listing.apply_update(update, Utc::now()).unwrap();
        assert_eq!(listing.price, 250);
        assert_eq!(listing.title, "Book Title 1");
        assert!(!listing.sold);
    }

    #[test]
    fn update_with_bad_price_is_rejected_without_side_effects() {
        let mut listing = Listing::new(new_listing(), UserId::new(), Utc::now()).unwrap();
        let update = ListingUpdate {
            price: Some(0),
            title: Some("New title".to_string()),
            ..ListingUpdate::default()
        };
        assert!(listing.apply_update(update, Utc::now()).is_err());
        assert_eq!(listing.title, "Book Title 1");
        assert_eq!(listing.price, 100);
    }
}
