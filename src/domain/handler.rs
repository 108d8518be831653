use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::event::OrderStatusChanged;
use crate::domain::event_bus::{EventHandler, HandlerError};
use crate::domain::model::OrderProcessingStatus;
use crate::domain::port::Logger;

/// 処理済みイベントを追跡するためのリポジトリ
/// 実際の実装では永続化ストレージ（Redis、データベースなど）を使用
#[derive(Clone)]
pub struct ProcessedEventTracker {
    processed_events: Arc<Mutex<HashSet<Uuid>>>,
}

impl Default for ProcessedEventTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessedEventTracker {
    pub fn new() -> Self {
        Self {
            processed_events: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// イベントが既に処理済みかチェック
    pub async fn is_processed(&self, event_id: Uuid) -> bool {
        let processed = self.processed_events.lock().await;
        processed.contains(&event_id)
    }

    /// イベントを処理済みとしてマーク
    pub async fn mark_processed(&self, event_id: Uuid) {
        let mut processed = self.processed_events.lock().await;
        processed.insert(event_id);
    }
}

/// 通知ハンドラー
/// 注文ステータス変更イベントを受信して顧客への通知を送信する
#[derive(Clone)]
pub struct NotificationHandler {
    logger: Arc<dyn Logger>,
    processed_events: ProcessedEventTracker,
}

impl NotificationHandler {
    /// 新しい通知ハンドラーを作成
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            logger,
            processed_events: ProcessedEventTracker::new(),
        }
    }

    /// 通知メッセージを送信（実装では外部サービスを呼び出し）
    async fn send_notification(
        &self,
        message: &str,
        correlation_id: Uuid,
    ) -> Result<(), HandlerError> {
        // 実際の実装では外部通知サービス（メール、SMS、プッシュ通知など）を呼び出し
        // 今回はログ出力で代用
        let mut context = HashMap::new();
        context.insert("notification_type".to_string(), "OrderStatus".to_string());
        context.insert("recipient".to_string(), "customer".to_string());

        self.logger.info(
            "NotificationHandler",
            "Notification sent: OrderStatus",
            Some(correlation_id),
            Some(context),
        );

        // 通知内容もログに記録
        self.logger
            .info("NotificationHandler", message, Some(correlation_id), None);

        Ok(())
    }

    fn notification_message(event: &OrderStatusChanged) -> String {
        match event.new_status {
            OrderProcessingStatus::Pending => {
                format!("ご注文を受け付けました。注文ID: {}", event.order_id)
            }
            OrderProcessingStatus::Shipped => {
                format!("ご注文が発送されました。注文ID: {}", event.order_id)
            }
            OrderProcessingStatus::Delivered => {
                format!("ご注文の配達が完了しました。注文ID: {}", event.order_id)
            }
            OrderProcessingStatus::Canceled => {
                format!("ご注文がキャンセルされました。注文ID: {}", event.order_id)
            }
        }
    }
}

#[async_trait]
impl EventHandler<OrderStatusChanged> for NotificationHandler {
    async fn handle(&self, event: OrderStatusChanged) -> Result<(), HandlerError> {
        // ハンドラー開始ログ
        let mut context = HashMap::new();
        context.insert("event_type".to_string(), "OrderStatusChanged".to_string());
        self.logger.info(
            "NotificationHandler",
            "Processing OrderStatusChanged event",
            Some(event.metadata.correlation_id),
            Some(context),
        );

        let start_time = std::time::Instant::now();

        // 冪等性チェック: 既に処理済みのイベントかどうか確認
        if self
            .processed_events
            .is_processed(event.metadata.event_id)
            .await
        {
            let mut context = HashMap::new();
            context.insert("event_id".to_string(), event.metadata.event_id.to_string());
            context.insert("already_processed".to_string(), "true".to_string());

            self.logger.debug(
                "NotificationHandler",
                "Idempotency check: Event already processed, skipping",
                Some(event.metadata.correlation_id),
                Some(context),
            );
            return Ok(());
        }

        let message = Self::notification_message(&event);
        self.send_notification(&message, event.metadata.correlation_id)
            .await?;

        // イベントを処理済みとしてマーク
        self.processed_events
            .mark_processed(event.metadata.event_id)
            .await;

        // 処理成功ログ
        let execution_time = start_time.elapsed();
        let mut context = HashMap::new();
        context.insert("event_type".to_string(), "OrderStatusChanged".to_string());
        context.insert(
            "execution_time_ms".to_string(),
            execution_time.as_millis().to_string(),
        );

        self.logger.info(
            "NotificationHandler",
            "OrderStatusChanged event processed successfully",
            Some(event.metadata.correlation_id),
            Some(context),
        );

        Ok(())
    }
}
