// アプリケーションサービス
// ユースケースごとにサービスを分割する

pub mod basket_service;
pub mod checkout_service;
pub mod order_service;

pub use basket_service::{BasketApplicationService, BasketItemUpdate};
pub use checkout_service::CheckoutService;
pub use order_service::OrderApplicationService;
