// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::event::DomainEvent;
use crate::domain::model::{
    Basket, BasketId, Customer, CustomerId, Order, OrderId, OrderProcessingStatus, Product,
    ProductId,
};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// ロガートレイト
/// ログ出力を抽象化するポート
pub trait Logger: Send + Sync {
    /// デバッグレベルのログを出力
    fn debug(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 情報レベルのログを出力
    fn info(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 警告レベルのログを出力
    fn warn(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// エラーレベルのログを出力
    fn error(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );
}

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum RepositoryError {
    /// データベース接続に失敗
    ConnectionFailed(String),
    /// 操作に失敗
    OperationFailed(String),
    /// データの取得に失敗
    FetchFailed(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            RepositoryError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
            RepositoryError::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// バスケットリポジトリトレイト
/// バスケット集約の永続化を抽象化する
#[async_trait]
pub trait BasketRepository: Send + Sync {
    /// バスケットの保存を予約する
    /// 変更はUnitOfWorkのコミットで確定する
    ///
    /// # Arguments
    /// * `basket` - 保存するバスケット
    ///
    /// # Returns
    /// * `Ok(())` - 保存予約成功
    /// * `Err(RepositoryError)` - 保存予約失敗
    async fn save(&self, basket: &Basket) -> Result<(), RepositoryError>;

    /// バスケットIDでバスケットを検索する
    ///
    /// # Arguments
    /// * `basket_id` - 検索するバスケットID
    ///
    /// # Returns
    /// * `Ok(Some(Basket))` - バスケットが見つかった
    /// * `Ok(None)` - バスケットが見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, basket_id: BasketId) -> Result<Option<Basket>, RepositoryError>;

    /// 顧客IDでバスケットを検索する
    ///
    /// # Arguments
    /// * `customer_id` - 検索する顧客ID
    ///
    /// # Returns
    /// * `Ok(Some(Basket))` - バスケットが見つかった
    /// * `Ok(None)` - 顧客のバスケットがまだ存在しない
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_customer_id(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<Basket>, RepositoryError>;

    /// 新しい一意のバスケットIDを生成する
    fn next_identity(&self) -> BasketId;
}

/// 注文リポジトリトレイト
/// 注文集約の永続化を抽象化する
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// 注文の保存を予約する
    /// 変更はUnitOfWorkのコミットで確定する
    ///
    /// # Arguments
    /// * `order` - 保存する注文
    ///
    /// # Returns
    /// * `Ok(())` - 保存予約成功
    /// * `Err(RepositoryError)` - 保存予約失敗
    async fn save(&self, order: &Order) -> Result<(), RepositoryError>;

    /// 注文IDで注文を検索する
    ///
    /// # Arguments
    /// * `order_id` - 検索する注文ID
    ///
    /// # Returns
    /// * `Ok(Some(Order))` - 注文が見つかった
    /// * `Ok(None)` - 注文が見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// 指定された顧客の注文を取得する
    ///
    /// # Arguments
    /// * `customer_id` - フィルタリングする顧客ID
    ///
    /// # Returns
    /// * `Ok(Vec<Order>)` - 顧客の注文のリスト
    /// * `Err(RepositoryError)` - 取得失敗
    async fn find_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError>;

    /// 指定されたステータスの注文を取得する
    ///
    /// # Arguments
    /// * `status` - フィルタリングする注文ステータス
    ///
    /// # Returns
    /// * `Ok(Vec<Order>)` - 指定されたステータスの注文のリスト
    /// * `Err(RepositoryError)` - 取得失敗
    async fn find_by_status(
        &self,
        status: OrderProcessingStatus,
    ) -> Result<Vec<Order>, RepositoryError>;

    /// 新しい一意の注文IDを生成する
    fn next_identity(&self) -> OrderId;
}

/// 商品リポジトリトレイト
/// 商品集約の永続化を抽象化する
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 商品の保存を予約する
    /// 変更はUnitOfWorkのコミットで確定する
    ///
    /// # Arguments
    /// * `product` - 保存する商品
    ///
    /// # Returns
    /// * `Ok(())` - 保存予約成功
    /// * `Err(RepositoryError)` - 保存予約失敗
    async fn save(&self, product: &Product) -> Result<(), RepositoryError>;

    /// 複数の商品の保存をまとめて予約する
    ///
    /// # Arguments
    /// * `products` - 保存する商品のリスト
    ///
    /// # Returns
    /// * `Ok(())` - 保存予約成功
    /// * `Err(RepositoryError)` - 保存予約失敗
    async fn save_all(&self, products: &[Product]) -> Result<(), RepositoryError>;

    /// 商品IDで商品を検索する
    ///
    /// # Arguments
    /// * `product_id` - 検索する商品ID
    ///
    /// # Returns
    /// * `Ok(Some(Product))` - 商品が見つかった
    /// * `Ok(None)` - 商品が見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, product_id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// 商品の削除を予約する
    ///
    /// # Arguments
    /// * `product_id` - 削除する商品ID
    ///
    /// # Returns
    /// * `Ok(())` - 削除予約成功
    /// * `Err(RepositoryError)` - 削除予約失敗
    async fn delete(&self, product_id: ProductId) -> Result<(), RepositoryError>;
}

/// 顧客リポジトリトレイト
/// 顧客集約の永続化を抽象化する
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// 顧客の保存を予約する
    ///
    /// # Arguments
    /// * `customer` - 保存する顧客
    ///
    /// # Returns
    /// * `Ok(())` - 保存予約成功
    /// * `Err(RepositoryError)` - 保存予約失敗
    async fn save(&self, customer: &Customer) -> Result<(), RepositoryError>;

    /// 顧客IDで顧客を検索する
    ///
    /// # Arguments
    /// * `customer_id` - 検索する顧客ID
    ///
    /// # Returns
    /// * `Ok(Some(Customer))` - 顧客が見つかった
    /// * `Ok(None)` - 顧客が見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, customer_id: CustomerId)
        -> Result<Option<Customer>, RepositoryError>;
}

/// ユニットオブワークトレイト
/// 複数リポジトリにまたがる保存予約を1つの作業単位として確定するポート
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// 保存予約されたすべての変更を原子的に確定する
    /// 失敗した場合、予約済みの変更は一切反映されない
    ///
    /// # Returns
    /// * `Ok(usize)` - 確定した変更の件数
    /// * `Err(RepositoryError)` - コミット失敗
    async fn commit(&self) -> Result<usize, RepositoryError>;

    /// 保存予約されたすべての変更を破棄する
    /// 処理が途中で失敗した場合、後続の作業単位に変更が漏れないようにする
    ///
    /// # Returns
    /// * `Ok(())` - 破棄成功
    /// * `Err(RepositoryError)` - 破棄失敗
    async fn rollback(&self) -> Result<(), RepositoryError>;
}

/// イベントバスエラー
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event publishing failed: {0}")]
    PublishingFailed(String),
}

/// イベントバストレイト
/// イベントの発行と配信を管理するポート
#[async_trait]
pub trait EventBus: Send + Sync {
    /// イベントを発行し、登録されたハンドラーに配信
    async fn publish(&self, event: DomainEvent) -> Result<(), EventBusError>;
}
