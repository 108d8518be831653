use crate::domain::error::DomainError;
use crate::domain::model::{BasketId, CustomerId, Money, ProductId};
use chrono::{DateTime, Utc};

/// バスケット内の商品数の上限
const MAX_BASKET_ITEMS: usize = 50;
/// 1明細あたりの数量の上限
const MAX_ITEM_QUANTITY: u32 = 99;
/// 1明細あたりの数量の下限
const MIN_ITEM_QUANTITY: u32 = 1;
/// 価格の下限（ペンス単位）
const MIN_ITEM_PRICE: i64 = 1;

/// バスケット明細
/// 商品追加時点の価格スナップショットを保持する
#[derive(Debug, Clone, PartialEq)]
pub struct BasketItem {
    product_id: ProductId,
    product_name: String,
    price: Money,
    quantity: u32,
}

impl BasketItem {
    /// 新しいバスケット明細を作成
    ///
    /// # Arguments
    /// * `product_id` - 商品ID
    /// * `product_name` - 商品名（追加時点のスナップショット）
    /// * `price` - 単価（追加時点のスナップショット）
    /// * `quantity` - 数量（1〜99）
    ///
    /// # Returns
    /// * `Ok(BasketItem)` - 作成された明細
    /// * `Err(DomainError)` - 商品IDが空、または数量・価格が範囲外の場合
    pub fn new(
        product_id: ProductId,
        product_name: String,
        price: Money,
        quantity: u32,
    ) -> Result<Self, DomainError> {
        if product_id.is_nil() {
            return Err(DomainError::BasketItemValidation(
                "商品IDが指定されていません".to_string(),
            ));
        }
        Self::validate_quantity(quantity)?;
        Self::validate_price(&price)?;
        Ok(Self {
            product_id,
            product_name,
            price,
            quantity,
        })
    }

    fn validate_quantity(quantity: u32) -> Result<(), DomainError> {
        if !(MIN_ITEM_QUANTITY..=MAX_ITEM_QUANTITY).contains(&quantity) {
            return Err(DomainError::BasketItemValidation(format!(
                "数量は{}から{}の範囲で指定してください: {}",
                MIN_ITEM_QUANTITY, MAX_ITEM_QUANTITY, quantity
            )));
        }
        Ok(())
    }

    fn validate_price(price: &Money) -> Result<(), DomainError> {
        if price.amount() < MIN_ITEM_PRICE {
            return Err(DomainError::BasketItemValidation(format!(
                "価格は{}ペンス以上で指定してください: {}",
                MIN_ITEM_PRICE,
                price.amount()
            )));
        }
        Ok(())
    }

    /// 数量を加算する（加算量は1以上、結果が上限99を超えるとエラー）
    pub fn increase_quantity(&mut self, additional: u32) -> Result<(), DomainError> {
        if additional == 0 {
            return Err(DomainError::BasketItemValidation(
                "加算する数量は1以上で指定してください".to_string(),
            ));
        }
        let new_quantity = self
            .quantity
            .checked_add(additional)
            .ok_or_else(|| {
                DomainError::BasketItemValidation("数量の加算でオーバーフローしました".to_string())
            })?;
        Self::validate_quantity(new_quantity)?;
        self.quantity = new_quantity;
        Ok(())
    }

    /// 数量を減算する
    /// 結果が0以下になる減算はエラー（明細の削除は呼び出し側の責務）
    pub fn decrease_quantity(&mut self, amount: u32) -> Result<(), DomainError> {
        if amount == 0 {
            return Err(DomainError::BasketItemValidation(
                "減算する数量は1以上で指定してください".to_string(),
            ));
        }
        let new_quantity = self.quantity.checked_sub(amount).filter(|q| *q > 0).ok_or_else(|| {
            DomainError::BasketItemValidation(
                "数量は0より大きくなければなりません".to_string(),
            )
        })?;
        Self::validate_quantity(new_quantity)?;
        self.quantity = new_quantity;
        Ok(())
    }

    /// 数量を指定値に更新する
    pub fn update_quantity(&mut self, quantity: u32) -> Result<(), DomainError> {
        Self::validate_quantity(quantity)?;
        self.quantity = quantity;
        Ok(())
    }

    /// 単価を更新する（商品マスタの最新価格への追随に使う）
    pub fn update_price(&mut self, price: Money) -> Result<(), DomainError> {
        Self::validate_price(&price)?;
        self.price = price;
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

/// バスケット集約
/// 顧客ごとに1つ存在し、注文前の商品の一時的な置き場となる
#[derive(Debug, Clone)]
pub struct Basket {
    id: BasketId,
    customer_id: CustomerId,
    items: Vec<BasketItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Basket {
    /// 顧客の新しい空バスケットを作成
    /// 作成時刻と更新時刻は現在時刻になる
    pub fn new(id: BasketId, customer_id: CustomerId) -> Result<Self, DomainError> {
        Self::validate_customer_id(customer_id)?;
        let now = Utc::now();
        Ok(Self {
            id,
            customer_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// 永続化済みの状態からバスケットを復元
    pub fn reconstruct(
        id: BasketId,
        customer_id: CustomerId,
        items: Vec<BasketItem>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Self::validate_customer_id(customer_id)?;
        if created_at > updated_at {
            return Err(DomainError::BasketValidation(
                "作成時刻が更新時刻より後になっています".to_string(),
            ));
        }
        Ok(Self {
            id,
            customer_id,
            items,
            created_at,
            updated_at,
        })
    }

    fn validate_customer_id(customer_id: CustomerId) -> Result<(), DomainError> {
        if customer_id.is_nil() {
            return Err(DomainError::BasketValidation(
                "顧客IDが指定されていません".to_string(),
            ));
        }
        Ok(())
    }

    /// 商品をバスケットに追加する
    /// 既に同じ商品がある場合は数量を加算する（明細は増えない）
    /// 上限50商品のチェックは新規商品の追加時のみ行う
    pub fn add_item(&mut self, item: BasketItem) -> Result<(), DomainError> {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.product_id() == item.product_id())
        {
            Some(existing) => existing.increase_quantity(item.quantity())?,
            None => {
                if self.items.len() >= MAX_BASKET_ITEMS {
                    return Err(DomainError::BasketValidation(format!(
                        "バスケットに追加できる商品は{}種類までです",
                        MAX_BASKET_ITEMS
                    )));
                }
                self.items.push(item);
            }
        }
        self.touch();
        Ok(())
    }

    /// 複数の商品をまとめて追加する
    /// 事前チェックは入力件数で行うため、既存商品への統合で実際の種類数が
    /// 上限に収まる場合でも拒否されることがある
    pub fn add_items(&mut self, items: Vec<BasketItem>) -> Result<(), DomainError> {
        if items.is_empty() {
            return Err(DomainError::BasketValidation(
                "追加する商品が指定されていません".to_string(),
            ));
        }
        if self.items.len() + items.len() > MAX_BASKET_ITEMS {
            return Err(DomainError::BasketValidation(format!(
                "バスケットに追加できる商品は{}種類までです",
                MAX_BASKET_ITEMS
            )));
        }
        for item in items {
            self.add_item(item)?;
        }
        Ok(())
    }

    /// 指定した商品の明細を削除する
    pub fn remove_item(&mut self, product_id: ProductId) -> Result<(), DomainError> {
        if product_id.is_nil() {
            return Err(DomainError::BasketValidation(
                "商品IDが指定されていません".to_string(),
            ));
        }
        let position = self
            .items
            .iter()
            .position(|item| item.product_id() == product_id)
            .ok_or_else(|| {
                DomainError::BasketValidation(format!(
                    "商品がバスケットに存在しません: {}",
                    product_id
                ))
            })?;
        self.items.remove(position);
        self.touch();
        Ok(())
    }

    /// 指定した商品の数量を更新する
    pub fn update_item_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), DomainError> {
        self.find_item_mut(product_id)?.update_quantity(quantity)?;
        self.touch();
        Ok(())
    }

    /// 指定した商品の単価を最新の商品価格に更新する
    pub fn update_item_price(
        &mut self,
        product_id: ProductId,
        price: Money,
    ) -> Result<(), DomainError> {
        self.find_item_mut(product_id)?.update_price(price)?;
        self.touch();
        Ok(())
    }

    fn find_item_mut(&mut self, product_id: ProductId) -> Result<&mut BasketItem, DomainError> {
        self.items
            .iter_mut()
            .find(|item| item.product_id() == product_id)
            .ok_or_else(|| {
                DomainError::BasketValidation(format!(
                    "商品がバスケットに存在しません: {}",
                    product_id
                ))
            })
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// バスケットを空にする
    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    pub fn id(&self) -> BasketId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn items(&self) -> &[BasketItem] {
        &self.items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 指定した商品がバスケットに含まれているか
    pub fn contains_product(&self, product_id: ProductId) -> bool {
        self.items
            .iter()
            .any(|item| item.product_id() == product_id)
    }

    /// バスケット全体の合計金額
    pub fn total_price(&self) -> Result<Money, DomainError> {
        let mut total = Money::gbp(0);
        for item in &self.items {
            total = total.add(&item.total_price()?)?;
        }
        Ok(total)
    }
}
