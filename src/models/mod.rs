mod checkout;
mod order;
mod order_item;
mod unmatched_payment;

pub use checkout::*;
pub use order::*;
pub use order_item::*;
pub use unmatched_payment::*;
