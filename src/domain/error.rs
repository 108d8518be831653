use crate::domain::model::{CustomerId, Money, OrderProcessingStatus, ProductId};

/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// バスケットの検証失敗（例: 50商品の上限超過）
    BasketValidation(String),
    /// バスケット明細の検証失敗（例: 数量が0以下、価格が0.01未満）
    BasketItemValidation(String),
    /// 注文の検証失敗（例: Pending以外の注文を変更しようとした）
    OrderValidation(String),
    /// 商品の検証失敗（例: 画像URLが不正）
    ProductValidation(String),
    /// カテゴリの検証失敗
    CategoryValidation(String),
    /// 顧客の検証失敗（例: メールアドレスの形式不正）
    CustomerValidation(String),
    /// 住所の検証失敗
    AddressValidation(String),
    /// カード情報の検証失敗
    CardValidation(String),
    /// 在庫不足
    InsufficientStock {
        product_name: String,
        requested: u32,
        available: u32,
    },
    /// バスケット追加時から商品価格が変動した
    PriceChanged {
        product_id: ProductId,
        basket_price: Money,
        product_price: Money,
    },
    /// 顧客の住所またはカード情報が未登録
    CustomerDetailsMissing { customer_id: CustomerId },
    /// 無効なステータス遷移（現在のステータスと試行したステータスを保持）
    InvalidStatusTransition {
        current: OrderProcessingStatus,
        attempted: OrderProcessingStatus,
    },
    /// 在庫数のオーバーフロー
    /// 事前条件違反であり、利用者向けの検証エラーとは区別する
    StockOverflow { product_name: String },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::BasketValidation(msg) => write!(f, "Basket validation failed: {}", msg),
            DomainError::BasketItemValidation(msg) => {
                write!(f, "Basket item validation failed: {}", msg)
            }
            DomainError::OrderValidation(msg) => write!(f, "Order validation failed: {}", msg),
            DomainError::ProductValidation(msg) => write!(f, "Product validation failed: {}", msg),
            DomainError::CategoryValidation(msg) => {
                write!(f, "Category validation failed: {}", msg)
            }
            DomainError::CustomerValidation(msg) => {
                write!(f, "Customer validation failed: {}", msg)
            }
            DomainError::AddressValidation(msg) => write!(f, "Address validation failed: {}", msg),
            DomainError::CardValidation(msg) => write!(f, "Card validation failed: {}", msg),
            DomainError::InsufficientStock {
                product_name,
                requested,
                available,
            } => write!(
                f,
                "Insufficient stock for product '{}'. Requested: {}, Available: {}",
                product_name, requested, available
            ),
            DomainError::PriceChanged {
                product_id,
                basket_price,
                product_price,
            } => write!(
                f,
                "The price of the product {} has changed from {} to {}",
                product_id,
                basket_price.amount(),
                product_price.amount()
            ),
            DomainError::CustomerDetailsMissing { customer_id } => write!(
                f,
                "The customer {} is missing the required address or card details",
                customer_id
            ),
            DomainError::InvalidStatusTransition { current, attempted } => write!(
                f,
                "Invalid order status transition from {} to {}",
                current, attempted
            ),
            DomainError::StockOverflow { product_name } => write!(
                f,
                "Adding stock for product '{}' would exceed the maximum stock level",
                product_name
            ),
        }
    }
}

impl std::error::Error for DomainError {}
