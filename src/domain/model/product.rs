use crate::domain::error::DomainError;
use crate::domain::model::{CategoryId, Money, ProductId};

/// 商品名の最大長
const MAX_PRODUCT_NAME_LENGTH: usize = 200;
/// カテゴリ名の最大長
const MAX_CATEGORY_NAME_LENGTH: usize = 50;
/// 価格の下限（ペンス単位）
const MIN_PRODUCT_PRICE: i64 = 1;

/// 商品カテゴリ
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    id: CategoryId,
    name: String,
}

impl Category {
    /// 新しいカテゴリを作成
    /// 名前は空白のみ不可、50文字以内、先頭は英字であること
    pub fn new(id: CategoryId, name: String) -> Result<Self, DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::CategoryValidation(
                "カテゴリ名が空です".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_CATEGORY_NAME_LENGTH {
            return Err(DomainError::CategoryValidation(format!(
                "カテゴリ名は{}文字以内で指定してください",
                MAX_CATEGORY_NAME_LENGTH
            )));
        }
        if !trimmed
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
        {
            return Err(DomainError::CategoryValidation(
                "カテゴリ名は英字で始まる必要があります".to_string(),
            ));
        }
        Ok(Self {
            id,
            name: trimmed.to_string(),
        })
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// 商品集約
/// 商品マスタの情報と在庫数を管理する
#[derive(Debug, Clone)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    price: Money,
    image_url: String,
    stock: u32,
    categories: Vec<Category>,
    is_featured: bool,
}

impl Product {
    /// 新しい商品を作成
    ///
    /// # Arguments
    /// * `id` - 商品ID
    /// * `name` - 商品名（空白のみ不可、200文字以内）
    /// * `description` - 商品説明（空白のみ不可）
    /// * `price` - 単価（1ペンス以上）
    /// * `image_url` - 画像URL（絶対URLのみ）
    /// * `stock` - 初期在庫数
    /// * `categories` - カテゴリ（1件以上）
    /// * `is_featured` - おすすめ商品フラグ
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ProductId,
        name: String,
        description: String,
        price: Money,
        image_url: String,
        stock: u32,
        categories: Vec<Category>,
        is_featured: bool,
    ) -> Result<Self, DomainError> {
        Self::validate_name(&name)?;
        Self::validate_description(&description)?;
        Self::validate_price(&price)?;
        Self::validate_image_url(&image_url)?;
        if categories.is_empty() {
            return Err(DomainError::ProductValidation(
                "カテゴリを1件以上指定してください".to_string(),
            ));
        }
        Ok(Self {
            id,
            name,
            description,
            price,
            image_url,
            stock,
            categories,
            is_featured,
        })
    }

    fn validate_name(name: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::ProductValidation(
                "商品名が空です".to_string(),
            ));
        }
        if name.chars().count() > MAX_PRODUCT_NAME_LENGTH {
            return Err(DomainError::ProductValidation(format!(
                "商品名は{}文字以内で指定してください",
                MAX_PRODUCT_NAME_LENGTH
            )));
        }
        Ok(())
    }

    fn validate_description(description: &str) -> Result<(), DomainError> {
        if description.trim().is_empty() {
            return Err(DomainError::ProductValidation(
                "商品説明が空です".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_price(price: &Money) -> Result<(), DomainError> {
        if price.amount() < MIN_PRODUCT_PRICE {
            return Err(DomainError::ProductValidation(format!(
                "価格は{}ペンス以上で指定してください: {}",
                MIN_PRODUCT_PRICE,
                price.amount()
            )));
        }
        Ok(())
    }

    // 絶対URLのみ許可する（スキームとホストを持つこと）
    fn validate_image_url(url: &str) -> Result<(), DomainError> {
        let valid = url
            .split_once("://")
            .map(|(scheme, rest)| {
                !scheme.is_empty()
                    && scheme.chars().all(|c| c.is_ascii_alphabetic())
                    && !rest.is_empty()
            })
            .unwrap_or(false);
        if !valid {
            return Err(DomainError::ProductValidation(format!(
                "画像URLは絶対URLで指定してください: {}",
                url
            )));
        }
        Ok(())
    }

    /// 要求数量に対して在庫が足りているか検証する
    pub fn validate_stock(&self, requested: u32) -> Result<(), DomainError> {
        if requested > self.stock {
            return Err(DomainError::InsufficientStock {
                product_name: self.name.clone(),
                requested,
                available: self.stock,
            });
        }
        Ok(())
    }

    /// 在庫を引き当てる（数量分を減算する）
    pub fn remove_stock(&mut self, quantity: u32) -> Result<(), DomainError> {
        self.validate_stock(quantity)?;
        self.stock -= quantity;
        Ok(())
    }

    /// 在庫を補充する
    /// u32の上限を超える補充はオーバーフローとして拒否する
    pub fn add_stock(&mut self, quantity: u32) -> Result<(), DomainError> {
        self.stock = self
            .stock
            .checked_add(quantity)
            .ok_or_else(|| DomainError::StockOverflow {
                product_name: self.name.clone(),
            })?;
        Ok(())
    }

    /// 商品名を変更する
    pub fn rename(&mut self, name: String) -> Result<(), DomainError> {
        Self::validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// 価格を変更する
    pub fn update_price(&mut self, price: Money) -> Result<(), DomainError> {
        Self::validate_price(&price)?;
        self.price = price;
        Ok(())
    }

    /// 画像URLを変更する
    pub fn set_image(&mut self, image_url: String) -> Result<(), DomainError> {
        Self::validate_image_url(&image_url)?;
        self.image_url = image_url;
        Ok(())
    }

    /// 在庫数を指定値に設定する（棚卸しによる補正に使う）
    pub fn set_stock(&mut self, stock: u32) {
        self.stock = stock;
    }

    /// おすすめ商品フラグを設定する
    pub fn set_featured(&mut self, is_featured: bool) {
        self.is_featured = is_featured;
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_featured(&self) -> bool {
        self.is_featured
    }
}
