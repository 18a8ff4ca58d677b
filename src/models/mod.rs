pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use category::Category;
pub use order::{Order, OrderItem, OrderStatus, PaymentMethod, ShippingAddress};
pub use product::Product;
pub use user::{Role, User};
