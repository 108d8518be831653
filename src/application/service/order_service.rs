use crate::application::ApplicationError;
use crate::domain::event::DomainEvent;
use crate::domain::model::{CustomerId, Order, OrderId, OrderProcessingStatus};
use crate::domain::port::{EventBus, Logger, OrderRepository, UnitOfWork};
use std::sync::Arc;
use uuid::Uuid;

/// 注文アプリケーションサービス
/// 注文のステータス遷移と照会を担当する
pub struct OrderApplicationService<OR>
where
    OR: OrderRepository,
{
    order_repository: OR,
    event_bus: Arc<dyn EventBus>,
    unit_of_work: Arc<dyn UnitOfWork>,
    logger: Arc<dyn Logger>,
}

impl<OR> OrderApplicationService<OR>
where
    OR: OrderRepository,
{
    /// 新しいアプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `order_repository` - 注文リポジトリ
    /// * `event_bus` - イベントバス
    /// * `unit_of_work` - ユニットオブワーク
    /// * `logger` - ロガー
    pub fn new(
        order_repository: OR,
        event_bus: Arc<dyn EventBus>,
        unit_of_work: Arc<dyn UnitOfWork>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            order_repository,
            event_bus,
            unit_of_work,
            logger,
        }
    }

    /// 注文を発送済みにする
    ///
    /// # Arguments
    /// * `order_id` - 発送する注文のID
    ///
    /// # Returns
    /// * `Ok(())` - ステータス更新成功
    /// * `Err(ApplicationError)` - 更新失敗
    pub async fn ship_order(&self, order_id: OrderId) -> Result<(), ApplicationError> {
        self.transition(order_id, |order| order.mark_as_shipped())
            .await
    }

    /// 注文を配達済みにする
    ///
    /// # Arguments
    /// * `order_id` - 配達完了にする注文のID
    ///
    /// # Returns
    /// * `Ok(())` - ステータス更新成功
    /// * `Err(ApplicationError)` - 更新失敗
    pub async fn deliver_order(&self, order_id: OrderId) -> Result<(), ApplicationError> {
        self.transition(order_id, |order| order.mark_as_delivered())
            .await
    }

    /// 注文をキャンセルする
    ///
    /// # Arguments
    /// * `order_id` - キャンセルする注文のID
    ///
    /// # Returns
    /// * `Ok(())` - ステータス更新成功
    /// * `Err(ApplicationError)` - 更新失敗
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<(), ApplicationError> {
        self.transition(order_id, |order| order.mark_as_cancelled())
            .await
    }

    /// 注文のステータスを指定された値に変更する
    /// 現在と同じステータスの指定は何もしない
    ///
    /// # Arguments
    /// * `order_id` - 対象の注文ID
    /// * `status` - 変更後のステータス
    ///
    /// # Returns
    /// * `Ok(())` - ステータス更新成功
    /// * `Err(ApplicationError)` - 更新失敗
    pub async fn set_order_status(
        &self,
        order_id: OrderId,
        status: OrderProcessingStatus,
    ) -> Result<(), ApplicationError> {
        self.transition(order_id, |order| order.set_status(status))
            .await
    }

    /// 注文を取得する
    ///
    /// # Arguments
    /// * `order_id` - 取得する注文のID
    ///
    /// # Returns
    /// * `Ok(Order)` - 注文
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, ApplicationError> {
        self.order_repository
            .find_by_id(order_id)
            .await?
            .ok_or(ApplicationError::OrderNotFound(order_id))
    }

    /// 顧客の注文一覧を取得する
    ///
    /// # Arguments
    /// * `customer_id` - 対象の顧客ID
    ///
    /// # Returns
    /// * `Ok(Vec<Order>)` - 顧客の注文のリスト
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn get_orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, ApplicationError> {
        Ok(self.order_repository.find_for_customer(customer_id).await?)
    }

    /// 指定されたステータスの注文一覧を取得する
    ///
    /// # Arguments
    /// * `status` - フィルタリングするステータス
    ///
    /// # Returns
    /// * `Ok(Vec<Order>)` - 該当する注文のリスト
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn get_orders_by_status(
        &self,
        status: OrderProcessingStatus,
    ) -> Result<Vec<Order>, ApplicationError> {
        Ok(self.order_repository.find_by_status(status).await?)
    }

    /// ステータス遷移の共通処理
    /// 遷移を適用して保存・コミットし、記録されたイベントを発行する
    async fn transition<F>(&self, order_id: OrderId, apply: F) -> Result<(), ApplicationError>
    where
        F: FnOnce(&mut Order) -> Result<(), crate::domain::error::DomainError>,
    {
        let mut order = self
            .order_repository
            .find_by_id(order_id)
            .await?
            .ok_or(ApplicationError::OrderNotFound(order_id))?;

        let old_status = order.status();
        if let Err(err) = apply(&mut order) {
            self.unit_of_work.rollback().await?;
            return Err(err.into());
        }
        let new_status = order.status();

        let events = order.take_events();
        self.order_repository.save(&order).await?;
        self.unit_of_work.commit().await?;

        self.logger.info(
            "OrderApplicationService",
            &format!(
                "Order {} status changed from {} to {}",
                order_id, old_status, new_status
            ),
            None,
            None,
        );

        // ステータス確定後にイベントを発行する
        // 同じ遷移に属するイベントには共通の相関IDを付与する
        let correlation_id = Uuid::new_v4();
        for mut event in events {
            Self::set_correlation_id_to_event(&mut event, correlation_id);
            self.event_bus
                .publish(event)
                .await
                .map_err(|e| ApplicationError::EventPublishingFailed(e.to_string()))?;
        }

        Ok(())
    }

    /// イベントに相関IDを設定する
    fn set_correlation_id_to_event(event: &mut DomainEvent, correlation_id: Uuid) {
        event.metadata_mut().correlation_id = correlation_id;
    }
}
