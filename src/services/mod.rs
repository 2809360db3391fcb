//! Business logic layer. Services own the consistency rules; handlers
//! stay thin and delegate here.

pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

pub use cart::CartService;
pub use categories::CategoryService;
pub use orders::OrderService;
pub use products::ProductService;
pub use users::UserService;
