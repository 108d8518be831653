// アプリケーション層
// ユースケースの調整役。ドメインモデルとポートを組み合わせて操作を実行する

pub mod error;
pub mod service;

pub use error::ApplicationError;
