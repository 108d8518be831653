use crate::application::ApplicationError;
use crate::domain::model::{Basket, BasketId, BasketItem, CustomerId, ProductId};
use crate::domain::port::{BasketRepository, Logger, ProductRepository, UnitOfWork};
use std::sync::Arc;

/// バスケット明細の更新リクエスト
/// 数量0はその商品の削除を意味する
#[derive(Debug, Clone, Copy)]
pub struct BasketItemUpdate {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// バスケットアプリケーションサービス
pub struct BasketApplicationService<BR, PR>
where
    BR: BasketRepository,
    PR: ProductRepository,
{
    basket_repository: BR,
    product_repository: PR,
    unit_of_work: Arc<dyn UnitOfWork>,
    logger: Arc<dyn Logger>,
}

impl<BR, PR> BasketApplicationService<BR, PR>
where
    BR: BasketRepository,
    PR: ProductRepository,
{
    /// 新しいアプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `basket_repository` - バスケットリポジトリ
    /// * `product_repository` - 商品リポジトリ
    /// * `unit_of_work` - ユニットオブワーク
    /// * `logger` - ロガー
    pub fn new(
        basket_repository: BR,
        product_repository: PR,
        unit_of_work: Arc<dyn UnitOfWork>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            basket_repository,
            product_repository,
            unit_of_work,
            logger,
        }
    }

    /// 顧客のバスケットを取得する
    /// バスケットがまだ存在しない場合は空のバスケットを作成して即座に確定する
    ///
    /// # Arguments
    /// * `customer_id` - 顧客ID
    ///
    /// # Returns
    /// * `Ok(Basket)` - 顧客のバスケット
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn get_or_create_basket(
        &self,
        customer_id: CustomerId,
    ) -> Result<Basket, ApplicationError> {
        if customer_id.is_nil() {
            return Err(ApplicationError::InvalidRequest(
                "顧客IDが指定されていません".to_string(),
            ));
        }

        if let Some(basket) = self
            .basket_repository
            .find_by_customer_id(customer_id)
            .await?
        {
            return Ok(basket);
        }

        // 新規作成は後続処理の失敗に巻き込まれないよう、この場で確定する
        let basket = Basket::new(self.basket_repository.next_identity(), customer_id)?;
        self.basket_repository.save(&basket).await?;
        self.unit_of_work.commit().await?;

        self.logger.info(
            "BasketApplicationService",
            &format!("Created a new basket for customer {}", customer_id),
            None,
            None,
        );

        Ok(basket)
    }

    /// バスケットの内容を更新する
    ///
    /// 各更新リクエストの処理:
    /// * バスケットに存在する商品で数量が1以上 → 在庫を確認し、数量と単価を最新化
    /// * バスケットに存在する商品で数量が0 → 明細を削除
    /// * バスケットに存在しない商品で数量が1以上 → 商品マスタの価格で明細を追加
    ///
    /// # Arguments
    /// * `customer_id` - 顧客ID
    /// * `updates` - 明細の更新リクエスト
    ///
    /// # Returns
    /// * `Ok(Basket)` - 更新後のバスケット
    /// * `Err(ApplicationError)` - 更新失敗（1件も反映されない）
    pub async fn update_basket(
        &self,
        customer_id: CustomerId,
        updates: Vec<BasketItemUpdate>,
    ) -> Result<Basket, ApplicationError> {
        let mut basket = self.get_or_create_basket(customer_id).await?;

        let result = self.apply_updates(&mut basket, updates).await;
        if let Err(err) = result {
            self.unit_of_work.rollback().await?;
            return Err(err);
        }

        self.basket_repository.save(&basket).await?;
        self.unit_of_work.commit().await?;
        Ok(basket)
    }

    async fn apply_updates(
        &self,
        basket: &mut Basket,
        updates: Vec<BasketItemUpdate>,
    ) -> Result<(), ApplicationError> {
        for update in updates {
            let exists = basket.contains_product(update.product_id);

            if exists && update.quantity == 0 {
                basket.remove_item(update.product_id)?;
                continue;
            }
            if update.quantity == 0 {
                // 存在しない商品の削除指示は無視する
                continue;
            }

            let product = self
                .product_repository
                .find_by_id(update.product_id)
                .await?
                .ok_or(ApplicationError::ProductNotFound(update.product_id))?;
            product.validate_stock(update.quantity)?;

            if exists {
                basket.update_item_quantity(update.product_id, update.quantity)?;
                // 単価は商品マスタの最新価格に追随させる
                basket.update_item_price(update.product_id, product.price())?;
            } else {
                let item = BasketItem::new(
                    update.product_id,
                    product.name().to_string(),
                    product.price(),
                    update.quantity,
                )?;
                basket.add_item(item)?;
            }
        }
        Ok(())
    }

    /// バスケットを空にする
    ///
    /// # Arguments
    /// * `basket_id` - バスケットID
    ///
    /// # Returns
    /// * `Ok(())` - クリア成功
    /// * `Err(ApplicationError)` - クリア失敗
    pub async fn clear_basket(&self, basket_id: BasketId) -> Result<(), ApplicationError> {
        let mut basket = self
            .basket_repository
            .find_by_id(basket_id)
            .await?
            .ok_or(ApplicationError::BasketNotFound(basket_id))?;

        basket.clear();
        self.basket_repository.save(&basket).await?;
        self.unit_of_work.commit().await?;
        Ok(())
    }
}
