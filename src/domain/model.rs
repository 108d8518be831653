// ドメインモデル（集約・エンティティ・値オブジェクト）

mod basket;
mod customer;
mod order;
mod product;
mod value_objects;

pub use value_objects::{
    BasketId, CategoryId, Currency, CustomerId, Money, OrderId, OrderProcessingStatus, ProductId,
};

pub use basket::{Basket, BasketItem};
pub use customer::{Address, CardDetails, Customer};
pub use order::{Order, OrderItem};
pub use product::{Category, Product};
