//! Domain models serialized on the JSON API surface.
//!
//! All wire types use `snake_case` field names. Reference expansion
//! ("populate" in the data model) is represented with `Option` fields:
//! a dangling reference degrades to `null` rather than failing a request.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod review;

pub use cart::{Cart, CartItem};
pub use catalog::{
    Brand, BrandUpdate, Category, CategorySummary, CategoryUpdate, Color, ColorUpdate, NewBrand,
    NewCategory, NewColor, NewProduct, Product, ProductDetail, ProductUpdate, ProductWithCategory,
};
pub use order::{
    AdminOrder, AdminOrderItem, AdminOrderUser, Address, NewAddress, NewOrder, NewOrderItem, Order,
    OrderDetail, OrderItem, OrderItemDetail, OrderWithAddress,
};
pub use review::{NewReview, Review};
