pub mod abandoned;
pub mod cart;
pub mod repository;
pub mod validate;

pub use abandoned::sweep_abandoned;
pub use cart::{Cart, CartError, CartItem};
pub use repository::CartRepository;
pub use validate::{CartIssue, IssueAction};
