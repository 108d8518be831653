use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// バスケットの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasketId(Uuid);

impl BasketId {
    /// 新しい一意のBasketIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから BasketId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からBasketIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// nil UUID（空のID）かどうか
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for BasketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for BasketId {
    fn default() -> Self {
        Self::new()
    }
}

/// 注文の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    /// 新しい一意のOrderIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから OrderId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からOrderIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// nil UUID（空のID）かどうか
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

/// 商品の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(Uuid);

impl ProductId {
    /// 新しい一意のProductIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから ProductId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からProductIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// nil UUID（空のID）かどうか
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

/// 顧客の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(Uuid);

impl CustomerId {
    /// 新しい一意のCustomerIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから CustomerId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からCustomerIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// nil UUID（空のID）かどうか
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

/// カテゴリの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(Uuid);

impl CategoryId {
    /// 新しい一意のCategoryIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから CategoryId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

/// 通貨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// 英ポンド
    #[allow(clippy::upper_case_acronyms)]
    GBP,
}

/// 金額を表す値オブジェクト
/// 通貨の最小単位（ペンス）の整数で保持する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// 金額と通貨から作成
    pub fn new(amount: i64, currency: String) -> Result<Self, DomainError> {
        let currency = match currency.as_str() {
            "GBP" => Currency::GBP,
            _ => {
                return Err(DomainError::ProductValidation(format!(
                    "サポートされていない通貨: {}",
                    currency
                )))
            }
        };
        Ok(Self { amount, currency })
    }

    /// 英ポンドの金額を作成（ペンス単位）
    pub fn gbp(amount: i64) -> Self {
        Self {
            amount,
            currency: Currency::GBP,
        }
    }

    /// 金額を取得（最小単位）
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// 通貨を文字列として取得
    pub fn currency(&self) -> String {
        match self.currency {
            Currency::GBP => "GBP".to_string(),
        }
    }

    /// 金額を加算
    /// 通貨の不一致とi64のオーバーフローを拒否する
    pub fn add(&self, other: &Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::ProductValidation(
                "通貨が一致しません".to_string(),
            ));
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| {
                DomainError::ProductValidation("金額の加算がオーバーフローしました".to_string())
            })?;
        Ok(Money {
            amount,
            currency: self.currency,
        })
    }

    /// 金額を乗算
    /// i64のオーバーフローを拒否する
    pub fn multiply(&self, factor: u32) -> Result<Money, DomainError> {
        let amount = self
            .amount
            .checked_mul(i64::from(factor))
            .ok_or_else(|| {
                DomainError::ProductValidation("金額の乗算がオーバーフローしました".to_string())
            })?;
        Ok(Money {
            amount,
            currency: self.currency,
        })
    }
}

/// 注文処理ステータス
/// 固定された4値の閉じた集合（動的な拡張は不可）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderProcessingStatus {
    /// 保留中（作成直後）
    Pending,
    /// 発送済み
    Shipped,
    /// 配達完了
    Delivered,
    /// キャンセル済み
    Canceled,
}

impl OrderProcessingStatus {
    /// ステータスの数値ID（永続化用）
    pub fn id(&self) -> i32 {
        match self {
            OrderProcessingStatus::Pending => 1,
            OrderProcessingStatus::Shipped => 2,
            OrderProcessingStatus::Delivered => 3,
            OrderProcessingStatus::Canceled => 4,
        }
    }

    /// ステータス名を取得
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderProcessingStatus::Pending => "Pending",
            OrderProcessingStatus::Shipped => "Shipped",
            OrderProcessingStatus::Delivered => "Delivered",
            OrderProcessingStatus::Canceled => "Canceled",
        }
    }

    /// 文字列からOrderProcessingStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Pending" => Ok(OrderProcessingStatus::Pending),
            "Shipped" => Ok(OrderProcessingStatus::Shipped),
            "Delivered" => Ok(OrderProcessingStatus::Delivered),
            "Canceled" => Ok(OrderProcessingStatus::Canceled),
            _ => Err(DomainError::OrderValidation(format!(
                "無効な注文ステータス: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for OrderProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basket_id_creation() {
        let id1 = BasketId::new();
        let id2 = BasketId::new();
        assert_ne!(id1, id2, "Each BasketId should be unique");
        assert!(!id1.is_nil());
    }

    #[test]
    fn test_nil_id_detection() {
        let nil_id = CustomerId::from_uuid(Uuid::nil());
        assert!(nil_id.is_nil());
    }

    #[test]
    fn test_money_addition() {
        let money1 = Money::gbp(1000);
        let money2 = Money::gbp(500);
        let result = money1.add(&money2).unwrap();
        assert_eq!(result.amount(), 1500);
    }

    #[test]
    fn test_money_multiplication() {
        let money = Money::gbp(100);
        let result = money.multiply(5).unwrap();
        assert_eq!(result.amount(), 500);
    }

    #[test]
    fn test_money_multiplication_overflow() {
        let money = Money::gbp(i64::MAX);
        let result = money.multiply(2);
        assert!(matches!(result, Err(DomainError::ProductValidation(_))));
    }

    #[test]
    fn test_money_addition_overflow() {
        let money = Money::gbp(i64::MAX);
        let result = money.add(&Money::gbp(1));
        assert!(matches!(result, Err(DomainError::ProductValidation(_))));
    }

    #[test]
    fn test_money_unsupported_currency() {
        let result = Money::new(100, "JPY".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_order_processing_status_ids() {
        assert_eq!(OrderProcessingStatus::Pending.id(), 1);
        assert_eq!(OrderProcessingStatus::Shipped.id(), 2);
        assert_eq!(OrderProcessingStatus::Delivered.id(), 3);
        assert_eq!(OrderProcessingStatus::Canceled.id(), 4);
    }

    #[test]
    fn test_order_processing_status_round_trip() {
        for status in [
            OrderProcessingStatus::Pending,
            OrderProcessingStatus::Shipped,
            OrderProcessingStatus::Delivered,
            OrderProcessingStatus::Canceled,
        ] {
            let parsed = OrderProcessingStatus::from_string(status.as_str()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_order_processing_status_invalid_string() {
        let result = OrderProcessingStatus::from_string("Refunded");
        assert!(result.is_err());
    }
}
