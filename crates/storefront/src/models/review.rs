//! Product review models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::{ProductId, ReviewId};

/// A free-form rating attached to exactly one product.
///
/// There is no ownership link back to the submitting user; `name` is a
/// self-reported display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub review: String,
    pub rating: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a review. `rating` is validated 1-5 at the boundary.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub product_id: ProductId,
    pub review: String,
    pub rating: i32,
    pub name: String,
}
