use crate::domain::model::{OrderId, OrderProcessingStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// イベントの共通メタデータ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// イベントの一意識別子
    pub event_id: Uuid,
    /// 一連の処理を紐付ける相関ID
    pub correlation_id: Uuid,
    /// イベント発生時刻
    pub occurred_at: DateTime<Utc>,
    /// イベントスキーマのバージョン
    pub event_version: u32,
}

impl EventMetadata {
    pub fn new() -> Self {
        Self {
            event_id: Uuid::new_v4(),
            correlation_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            event_version: 1,
        }
    }
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// 注文ステータス変更イベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub metadata: EventMetadata,
    pub order_id: OrderId,
    pub old_status: OrderProcessingStatus,
    pub new_status: OrderProcessingStatus,
}

impl OrderStatusChanged {
    pub fn new(
        order_id: OrderId,
        old_status: OrderProcessingStatus,
        new_status: OrderProcessingStatus,
    ) -> Self {
        Self {
            metadata: EventMetadata::new(),
            order_id,
            old_status,
            new_status,
        }
    }
}

/// ドメインイベント
/// 集約の状態変更を外部に通知するために発行される
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "event_data")]
pub enum DomainEvent {
    OrderStatusChanged(OrderStatusChanged),
}

impl DomainEvent {
    /// イベント種別を表す文字列
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::OrderStatusChanged(_) => "OrderStatusChanged",
        }
    }

    /// イベントのメタデータを取得
    pub fn metadata(&self) -> &EventMetadata {
        match self {
            DomainEvent::OrderStatusChanged(e) => &e.metadata,
        }
    }

    /// イベントのメタデータを可変参照で取得（相関IDの付け替えに使う）
    pub fn metadata_mut(&mut self) -> &mut EventMetadata {
        match self {
            DomainEvent::OrderStatusChanged(e) => &mut e.metadata,
        }
    }
}
