use crate::domain::error::DomainError;
use crate::domain::event::{DomainEvent, OrderStatusChanged};
use crate::domain::model::{CustomerId, Money, OrderId, OrderProcessingStatus, ProductId};
use chrono::{DateTime, Utc};

/// 注文内の明細数の上限
const MAX_ORDER_ITEMS: usize = 99;
/// 1明細あたりの数量の上限
const MAX_ITEM_QUANTITY: u32 = 99;
/// 1明細あたりの数量の下限
const MIN_ITEM_QUANTITY: u32 = 1;
/// 価格の下限（ペンス単位）
const MIN_ITEM_PRICE: i64 = 1;

/// 注文明細
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    product_id: ProductId,
    product_name: String,
    price: Money,
    quantity: u32,
}

impl OrderItem {
    /// 新しい注文明細を作成
    ///
    /// # Arguments
    /// * `product_id` - 商品ID
    /// * `product_name` - 商品名（空白のみは不可）
    /// * `price` - 確定した単価
    /// * `quantity` - 数量（1〜99）
    pub fn new(
        product_id: ProductId,
        product_name: String,
        price: Money,
        quantity: u32,
    ) -> Result<Self, DomainError> {
        if product_id.is_nil() {
            return Err(DomainError::OrderValidation(
                "商品IDが指定されていません".to_string(),
            ));
        }
        if product_name.trim().is_empty() {
            return Err(DomainError::OrderValidation(
                "商品名が空です".to_string(),
            ));
        }
        Self::validate_quantity(quantity)?;
        if price.amount() < MIN_ITEM_PRICE {
            return Err(DomainError::OrderValidation(format!(
                "価格は{}ペンス以上で指定してください: {}",
                MIN_ITEM_PRICE,
                price.amount()
            )));
        }
        Ok(Self {
            product_id,
            product_name,
            price,
            quantity,
        })
    }

    fn validate_quantity(quantity: u32) -> Result<(), DomainError> {
        if !(MIN_ITEM_QUANTITY..=MAX_ITEM_QUANTITY).contains(&quantity) {
            return Err(DomainError::OrderValidation(format!(
                "数量は{}から{}の範囲で指定してください: {}",
                MIN_ITEM_QUANTITY, MAX_ITEM_QUANTITY, quantity
            )));
        }
        Ok(())
    }

    /// 数量を加算する
    pub fn increase_quantity(&mut self, additional: u32) -> Result<(), DomainError> {
        let new_quantity = self.quantity.checked_add(additional).ok_or_else(|| {
            DomainError::OrderValidation("数量の加算でオーバーフローしました".to_string())
        })?;
        Self::validate_quantity(new_quantity)?;
        self.quantity = new_quantity;
        Ok(())
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// 明細の合計金額（単価 × 数量）
    pub fn total_price(&self) -> Result<Money, DomainError> {
        self.price.multiply(self.quantity)
    }
}

/// 注文集約
/// 確定した購入内容とステータス遷移を管理する
#[derive(Debug, Clone)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    items: Vec<OrderItem>,
    status: OrderProcessingStatus,
    created_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl Order {
    /// 新しい保留中（Pending）の注文を作成
    pub fn new(id: OrderId, customer_id: CustomerId) -> Result<Self, DomainError> {
        if id.is_nil() {
            return Err(DomainError::OrderValidation(
                "注文IDが指定されていません".to_string(),
            ));
        }
        if customer_id.is_nil() {
            return Err(DomainError::OrderValidation(
                "顧客IDが指定されていません".to_string(),
            ));
        }
        Ok(Self {
            id,
            customer_id,
            items: Vec::new(),
            status: OrderProcessingStatus::Pending,
            created_at: Utc::now(),
            events: Vec::new(),
        })
    }

    /// 永続化済みの状態から注文を復元
    /// イベントバッファは空で始まる
    pub fn reconstruct(
        id: OrderId,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
        status: OrderProcessingStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer_id,
            items,
            status,
            created_at,
            events: Vec::new(),
        }
    }

    /// 明細を追加する
    /// 既に同じ商品の明細がある場合は数量を加算する
    /// 明細数の上限チェックは新規明細の追加時のみ行う
    pub fn add_item(&mut self, item: OrderItem) -> Result<(), DomainError> {
        self.ensure_pending()?;
        match self
            .items
            .iter_mut()
            .find(|existing| existing.product_id() == item.product_id())
        {
            Some(existing) => existing.increase_quantity(item.quantity()),
            None => {
                if self.items.len() >= MAX_ORDER_ITEMS {
                    return Err(DomainError::OrderValidation(format!(
                        "注文に追加できる明細は{}件までです",
                        MAX_ORDER_ITEMS
                    )));
                }
                self.items.push(item);
                Ok(())
            }
        }
    }

    /// 複数の明細をまとめて追加する
    pub fn add_items(&mut self, items: Vec<OrderItem>) -> Result<(), DomainError> {
        self.ensure_pending()?;
        for item in items {
            self.add_item(item)?;
        }
        Ok(())
    }

    /// 指定した商品の明細を削除する
    /// 明細が存在しない場合は何もしない
    pub fn remove_item(&mut self, product_id: ProductId) -> Result<(), DomainError> {
        self.ensure_pending()?;
        self.items.retain(|item| item.product_id() != product_id);
        Ok(())
    }

    /// 注文を発送済みにする
    /// 保留中かつ明細が1件以上ある場合のみ遷移できる
    pub fn mark_as_shipped(&mut self) -> Result<(), DomainError> {
        if self.status != OrderProcessingStatus::Pending {
            return Err(DomainError::InvalidStatusTransition {
                current: self.status,
                attempted: OrderProcessingStatus::Shipped,
            });
        }
        if self.items.is_empty() {
            return Err(DomainError::OrderValidation(
                "明細のない注文は発送できません".to_string(),
            ));
        }
        self.transition_to(OrderProcessingStatus::Shipped);
        Ok(())
    }

    /// 注文を配達完了にする
    /// 発送済みの注文のみ遷移できる
    pub fn mark_as_delivered(&mut self) -> Result<(), DomainError> {
        if self.status != OrderProcessingStatus::Shipped {
            return Err(DomainError::InvalidStatusTransition {
                current: self.status,
                attempted: OrderProcessingStatus::Delivered,
            });
        }
        self.transition_to(OrderProcessingStatus::Delivered);
        Ok(())
    }

    /// 注文をキャンセルする
    /// 保留中の注文のみ遷移できる
    pub fn mark_as_cancelled(&mut self) -> Result<(), DomainError> {
        if self.status != OrderProcessingStatus::Pending {
            return Err(DomainError::InvalidStatusTransition {
                current: self.status,
                attempted: OrderProcessingStatus::Canceled,
            });
        }
        self.transition_to(OrderProcessingStatus::Canceled);
        Ok(())
    }

    /// 目的のステータスへ遷移させるディスパッチャ
    /// Pendingが指定された場合は何もしない（注文は常にPendingで生まれるため）
    pub fn set_status(&mut self, status: OrderProcessingStatus) -> Result<(), DomainError> {
        match status {
            OrderProcessingStatus::Pending => Ok(()),
            OrderProcessingStatus::Shipped => self.mark_as_shipped(),
            OrderProcessingStatus::Delivered => self.mark_as_delivered(),
            OrderProcessingStatus::Canceled => self.mark_as_cancelled(),
        }
    }

    fn ensure_pending(&self) -> Result<(), DomainError> {
        if self.status != OrderProcessingStatus::Pending {
            return Err(DomainError::OrderValidation(format!(
                "保留中でない注文は変更できません。現在のステータス: {}",
                self.status
            )));
        }
        Ok(())
    }

    fn transition_to(&mut self, new_status: OrderProcessingStatus) {
        let old_status = self.status;
        self.status = new_status;
        self.events
            .push(DomainEvent::OrderStatusChanged(OrderStatusChanged::new(
                self.id, old_status, new_status,
            )));
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn status(&self) -> OrderProcessingStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 未発行のドメインイベントを参照する
    pub fn events(&self) -> &[DomainEvent] {
        &self.events
    }

    /// 未発行のドメインイベントを取り出してバッファを空にする
    /// 発行はアプリケーション層の責務
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    /// 注文全体の合計金額
    pub fn total_price(&self) -> Result<Money, DomainError> {
        let mut total = Money::gbp(0);
        for item in &self.items {
            total = total.add(&item.total_price()?)?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_item(quantity: u32) -> OrderItem {
        OrderItem::new(
            ProductId::new(),
            "Test Product".to_string(),
            Money::gbp(1000),
            quantity,
        )
        .unwrap()
    }

    fn shipped_order() -> Order {
        let mut order = Order::new(OrderId::new(), CustomerId::new()).unwrap();
        order.add_item(test_item(1)).unwrap();
        order.mark_as_shipped().unwrap();
        order
    }

    #[test]
    fn test_order_item_rejects_nil_product_id() {
        let result = OrderItem::new(
            ProductId::from_uuid(uuid::Uuid::nil()),
            "Widget".to_string(),
            Money::gbp(100),
            1,
        );
        assert!(matches!(result, Err(DomainError::OrderValidation(_))));
    }

    #[test]
    fn test_order_rejects_nil_ids() {
        let nil_order_id = OrderId::from_uuid(uuid::Uuid::nil());
        let nil_customer_id = CustomerId::from_uuid(uuid::Uuid::nil());
        assert!(Order::new(nil_order_id, CustomerId::new()).is_err());
        assert!(Order::new(OrderId::new(), nil_customer_id).is_err());
    }

    #[test]
    fn test_add_items_rejected_after_shipping() {
        let mut order = shipped_order();
        let result = order.add_items(vec![test_item(1)]);
        assert!(matches!(result, Err(DomainError::OrderValidation(_))));
    }

    #[test]
    fn test_order_item_rejects_blank_name() {
        let result = OrderItem::new(ProductId::new(), "   ".to_string(), Money::gbp(100), 1);
        assert!(matches!(result, Err(DomainError::OrderValidation(_))));
    }

    #[test]
    fn test_new_order_is_pending() {
        let order = Order::new(OrderId::new(), CustomerId::new()).unwrap();
        assert_eq!(order.status(), OrderProcessingStatus::Pending);
        assert!(order.items().is_empty());
        assert!(order.events().is_empty());
    }

    #[test]
    fn test_add_item_merges_same_product() {
        let mut order = Order::new(OrderId::new(), CustomerId::new()).unwrap();
        let product_id = ProductId::new();
        order
            .add_item(OrderItem::new(product_id, "Widget".to_string(), Money::gbp(500), 2).unwrap())
            .unwrap();
        order
            .add_item(OrderItem::new(product_id, "Widget".to_string(), Money::gbp(500), 3).unwrap())
            .unwrap();

        assert_eq!(order.items().len(), 1);
        assert_eq!(order.items()[0].quantity(), 5);
    }

    #[test]
    fn test_add_item_rejects_over_limit() {
        let mut order = Order::new(OrderId::new(), CustomerId::new()).unwrap();
        for _ in 0..99 {
            order.add_item(test_item(1)).unwrap();
        }
        let result = order.add_item(test_item(1));
        assert!(matches!(result, Err(DomainError::OrderValidation(_))));
    }

    #[test]
    fn test_add_item_rejected_after_shipping() {
        let mut order = shipped_order();
        let result = order.add_item(test_item(1));
        assert!(matches!(result, Err(DomainError::OrderValidation(_))));
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let mut order = Order::new(OrderId::new(), CustomerId::new()).unwrap();
        order.add_item(test_item(1)).unwrap();
        order.remove_item(ProductId::new()).unwrap();
        assert_eq!(order.items().len(), 1);
    }

    #[test]
    fn test_mark_as_shipped_requires_items() {
        let mut order = Order::new(OrderId::new(), CustomerId::new()).unwrap();
        let result = order.mark_as_shipped();
        assert!(matches!(result, Err(DomainError::OrderValidation(_))));
        assert_eq!(order.status(), OrderProcessingStatus::Pending);
    }

    #[test]
    fn test_mark_as_shipped_records_event() {
        let order = shipped_order();
        assert_eq!(order.status(), OrderProcessingStatus::Shipped);
        assert_eq!(order.events().len(), 1);
        match &order.events()[0] {
            DomainEvent::OrderStatusChanged(e) => {
                assert_eq!(e.old_status, OrderProcessingStatus::Pending);
                assert_eq!(e.new_status, OrderProcessingStatus::Shipped);
                assert_eq!(e.order_id, order.id());
            }
        }
    }

    #[test]
    fn test_mark_as_delivered_requires_shipped() {
        let mut order = Order::new(OrderId::new(), CustomerId::new()).unwrap();
        order.add_item(test_item(1)).unwrap();
        let result = order.mark_as_delivered();
        assert!(matches!(
            result,
            Err(DomainError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_mark_as_delivered_after_shipping() {
        let mut order = shipped_order();
        order.mark_as_delivered().unwrap();
        assert_eq!(order.status(), OrderProcessingStatus::Delivered);
        assert_eq!(order.events().len(), 2);
    }

    #[test]
    fn test_mark_as_cancelled_requires_pending() {
        let mut order = shipped_order();
        let result = order.mark_as_cancelled();
        assert!(matches!(
            result,
            Err(DomainError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_set_status_pending_is_noop() {
        let mut order = Order::new(OrderId::new(), CustomerId::new()).unwrap();
        order.set_status(OrderProcessingStatus::Pending).unwrap();
        assert_eq!(order.status(), OrderProcessingStatus::Pending);
        assert!(order.events().is_empty());
    }

    #[test]
    fn test_take_events_drains_buffer() {
        let mut order = shipped_order();
        let events = order.take_events();
        assert_eq!(events.len(), 1);
        assert!(order.events().is_empty());
    }

    #[test]
    fn test_order_total_price() {
        let mut order = Order::new(OrderId::new(), CustomerId::new()).unwrap();
        order
            .add_item(
                OrderItem::new(ProductId::new(), "A".to_string(), Money::gbp(100), 2).unwrap(),
            )
            .unwrap();
        order
            .add_item(
                OrderItem::new(ProductId::new(), "B".to_string(), Money::gbp(300), 1).unwrap(),
            )
            .unwrap();
        assert_eq!(order.total_price().unwrap().amount(), 500);
    }
}
