use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{BasketId, CustomerId, Order, OrderId, OrderItem};
use crate::domain::port::{
    BasketRepository, CustomerRepository, Logger, OrderRepository, ProductRepository, UnitOfWork,
};
use std::sync::Arc;

/// チェックアウトサービス
/// バスケットを注文へ変換するユースケースを担当する
pub struct CheckoutService<BR, OR, PR, CR>
where
    BR: BasketRepository,
    OR: OrderRepository,
    PR: ProductRepository,
    CR: CustomerRepository,
{
    basket_repository: BR,
    order_repository: OR,
    product_repository: PR,
    customer_repository: CR,
    unit_of_work: Arc<dyn UnitOfWork>,
    logger: Arc<dyn Logger>,
}

impl<BR, OR, PR, CR> CheckoutService<BR, OR, PR, CR>
where
    BR: BasketRepository,
    OR: OrderRepository,
    PR: ProductRepository,
    CR: CustomerRepository,
{
    /// 新しいチェックアウトサービスを作成
    ///
    /// # Arguments
    /// * `basket_repository` - バスケットリポジトリ
    /// * `order_repository` - 注文リポジトリ
    /// * `product_repository` - 商品リポジトリ
    /// * `customer_repository` - 顧客リポジトリ
    /// * `unit_of_work` - ユニットオブワーク
    /// * `logger` - ロガー
    pub fn new(
        basket_repository: BR,
        order_repository: OR,
        product_repository: PR,
        customer_repository: CR,
        unit_of_work: Arc<dyn UnitOfWork>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            basket_repository,
            order_repository,
            product_repository,
            customer_repository,
            unit_of_work,
            logger,
        }
    }

    /// バスケットを注文に変換する
    ///
    /// バスケットの全明細を検証し、在庫を引き当てたうえで新しい注文を作成する。
    /// バスケット追加時と現在の商品価格が一致しない明細が1件でもあれば変換全体が失敗する。
    /// 成功時はバスケットが空になり、注文・在庫・バスケットの変更が単一のコミットで確定する。
    ///
    /// # Arguments
    /// * `customer_id` - 注文する顧客のID
    /// * `basket_id` - 変換するバスケットのID
    ///
    /// # Returns
    /// * `Ok(OrderId)` - 作成された注文のID
    /// * `Err(ApplicationError)` - 変換失敗（一切の変更は確定されない）
    pub async fn convert_basket_to_order(
        &self,
        customer_id: CustomerId,
        basket_id: BasketId,
    ) -> Result<OrderId, ApplicationError> {
        if customer_id.is_nil() {
            return Err(ApplicationError::InvalidRequest(
                "顧客IDが指定されていません".to_string(),
            ));
        }
        if basket_id.is_nil() {
            return Err(ApplicationError::InvalidRequest(
                "バスケットIDが指定されていません".to_string(),
            ));
        }

        match self.try_convert(customer_id, basket_id).await {
            Ok(order_id) => {
                self.logger.info(
                    "CheckoutService",
                    &format!("Converted basket {} into order {}", basket_id, order_id),
                    None,
                    None,
                );
                Ok(order_id)
            }
            Err(err) => {
                // 予約済みの書き込みを破棄して中途半端な状態を残さない
                self.unit_of_work.rollback().await?;
                self.logger.warn(
                    "CheckoutService",
                    &format!("Failed to convert basket {}: {}", basket_id, err),
                    None,
                    None,
                );
                Err(err)
            }
        }
    }

    async fn try_convert(
        &self,
        customer_id: CustomerId,
        basket_id: BasketId,
    ) -> Result<OrderId, ApplicationError> {
        let mut basket = self
            .basket_repository
            .find_by_id(basket_id)
            .await?
            .ok_or(ApplicationError::BasketNotFound(basket_id))?;

        if basket.is_empty() {
            return Err(DomainError::BasketValidation(
                "空のバスケットは注文に変換できません".to_string(),
            )
            .into());
        }

        let customer = self
            .customer_repository
            .find_by_id(customer_id)
            .await?
            .ok_or(ApplicationError::CustomerNotFound(customer_id))?;
        if !customer.has_complete_details() {
            return Err(DomainError::CustomerDetailsMissing {
                customer_id: customer.id(),
            }
            .into());
        }

        let mut order = Order::new(self.order_repository.next_identity(), customer.id())?;

        for basket_item in basket.items() {
            let mut product = self
                .product_repository
                .find_by_id(basket_item.product_id())
                .await?
                .ok_or(ApplicationError::ProductNotFound(basket_item.product_id()))?;

            product.validate_stock(basket_item.quantity())?;

            // バスケット追加時の価格と現在価格の厳密一致を要求する
            if basket_item.price() != product.price() {
                return Err(DomainError::PriceChanged {
                    product_id: product.id(),
                    basket_price: basket_item.price(),
                    product_price: product.price(),
                }
                .into());
            }

            let order_item = OrderItem::new(
                basket_item.product_id(),
                basket_item.product_name().to_string(),
                basket_item.price(),
                basket_item.quantity(),
            )?;
            order.add_item(order_item)?;

            product.remove_stock(basket_item.quantity())?;
            self.product_repository.save(&product).await?;
        }

        basket.clear();

        let order_id = order.id();
        self.order_repository.save(&order).await?;
        self.basket_repository.save(&basket).await?;
        self.unit_of_work.commit().await?;

        Ok(order_id)
    }
}
