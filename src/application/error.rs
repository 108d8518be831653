use crate::domain::error::DomainError;
use crate::domain::model::{BasketId, CustomerId, OrderId, ProductId};
use crate::domain::port::RepositoryError;

/// アプリケーション層のエラー型
/// ドメインエラー、リポジトリエラー、イベント発行エラーをラップする
#[derive(Debug)]
pub enum ApplicationError {
    /// ドメインエラー（ビジネスルール違反）
    DomainError(DomainError),
    /// リポジトリエラー（永続化の失敗）
    RepositoryError(RepositoryError),
    /// イベントバス発行エラー
    EventPublishingFailed(String),
    /// 入力リクエストが不正（空のIDなど）
    InvalidRequest(String),
    /// バスケットが見つからない
    BasketNotFound(BasketId),
    /// 注文が見つからない
    OrderNotFound(OrderId),
    /// 商品が見つからない
    ProductNotFound(ProductId),
    /// 顧客が見つからない
    CustomerNotFound(CustomerId),
}

impl std::fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationError::DomainError(err) => write!(f, "Domain error: {}", err),
            ApplicationError::RepositoryError(err) => write!(f, "Repository error: {}", err),
            ApplicationError::EventPublishingFailed(msg) => {
                write!(f, "Event publishing failed: {}", msg)
            }
            ApplicationError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApplicationError::BasketNotFound(id) => write!(f, "Basket not found: {}", id),
            ApplicationError::OrderNotFound(id) => write!(f, "Order not found: {}", id),
            ApplicationError::ProductNotFound(id) => write!(f, "Product not found: {}", id),
            ApplicationError::CustomerNotFound(id) => write!(f, "Customer not found: {}", id),
        }
    }
}

impl std::error::Error for ApplicationError {}

// From実装でエラー変換を簡潔に
impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        ApplicationError::DomainError(err)
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        ApplicationError::RepositoryError(err)
    }
}
