use crate::domain::model::{
    Basket, BasketId, Customer, CustomerId, Order, OrderId, OrderProcessingStatus, Product,
    ProductId,
};
use crate::domain::port::{
    BasketRepository, CustomerRepository, OrderRepository, ProductRepository, RepositoryError,
    UnitOfWork,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// コミット待ちの書き込み
/// リポジトリのsave/deleteはここに積まれ、UnitOfWorkのコミットで確定する
#[derive(Debug, Clone)]
enum StagedWrite {
    SaveBasket(Basket),
    SaveOrder(Order),
    SaveProduct(Product),
    SaveCustomer(Customer),
    DeleteProduct(ProductId),
}

/// 確定済みの状態
#[derive(Default)]
struct CommittedState {
    baskets: HashMap<BasketId, Basket>,
    orders: HashMap<OrderId, Order>,
    products: HashMap<ProductId, Product>,
    customers: HashMap<CustomerId, Customer>,
}

/// インメモリデータストア
/// 開発・テスト用の実装
/// 読み取りは常に確定済みの状態を返し、書き込みはコミットまで反映されない
#[derive(Clone, Default)]
pub struct InMemoryStore {
    committed: Arc<RwLock<CommittedState>>,
    pending: Arc<Mutex<Vec<StagedWrite>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn stage(&self, write: StagedWrite) {
        let mut pending = self.pending.lock().await;
        pending.push(write);
    }

    /// コミット待ちの書き込み件数（テスト・監視用）
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// コミット待ちの書き込みをすべて破棄する
    pub async fn discard_pending(&self) {
        self.pending.lock().await.clear();
    }
}

/// インメモリユニットオブワーク実装
/// 積まれた書き込みを1つのロック区間内でまとめて反映する
#[derive(Clone)]
pub struct InMemoryUnitOfWork {
    store: InMemoryStore,
}

impl InMemoryUnitOfWork {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit(&self) -> Result<usize, RepositoryError> {
        // pendingのロックを保持したままcommittedへ反映するので、
        // 部分的に反映された状態が観測されることはない
        let mut pending = self.store.pending.lock().await;
        let mut committed = self.store.committed.write().await;
        let count = pending.len();

        for write in pending.drain(..) {
            match write {
                StagedWrite::SaveBasket(basket) => {
                    committed.baskets.insert(basket.id(), basket);
                }
                StagedWrite::SaveOrder(order) => {
                    committed.orders.insert(order.id(), order);
                }
                StagedWrite::SaveProduct(product) => {
                    committed.products.insert(product.id(), product);
                }
                StagedWrite::SaveCustomer(customer) => {
                    committed.customers.insert(customer.id(), customer);
                }
                StagedWrite::DeleteProduct(product_id) => {
                    committed.products.remove(&product_id);
                }
            }
        }

        Ok(count)
    }

    async fn rollback(&self) -> Result<(), RepositoryError> {
        self.store.discard_pending().await;
        Ok(())
    }
}

/// インメモリバスケットリポジトリ実装
#[derive(Clone)]
pub struct InMemoryBasketRepository {
    store: InMemoryStore,
}

impl InMemoryBasketRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BasketRepository for InMemoryBasketRepository {
    async fn save(&self, basket: &Basket) -> Result<(), RepositoryError> {
        self.store.stage(StagedWrite::SaveBasket(basket.clone())).await;
        Ok(())
    }

    async fn find_by_id(&self, basket_id: BasketId) -> Result<Option<Basket>, RepositoryError> {
        let committed = self.store.committed.read().await;
        Ok(committed.baskets.get(&basket_id).cloned())
    }

    async fn find_by_customer_id(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<Basket>, RepositoryError> {
        let committed = self.store.committed.read().await;
        Ok(committed
            .baskets
            .values()
            .find(|basket| basket.customer_id() == customer_id)
            .cloned())
    }

    fn next_identity(&self) -> BasketId {
        BasketId::new()
    }
}

/// インメモリ注文リポジトリ実装
#[derive(Clone)]
pub struct InMemoryOrderRepository {
    store: InMemoryStore,
}

impl InMemoryOrderRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
        self.store.stage(StagedWrite::SaveOrder(order.clone())).await;
        Ok(())
    }

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let committed = self.store.committed.read().await;
        Ok(committed.orders.get(&order_id).cloned())
    }

    async fn find_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let committed = self.store.committed.read().await;
        Ok(committed
            .orders
            .values()
            .filter(|order| order.customer_id() == customer_id)
            .cloned()
            .collect())
    }

    async fn find_by_status(
        &self,
        status: OrderProcessingStatus,
    ) -> Result<Vec<Order>, RepositoryError> {
        let committed = self.store.committed.read().await;
        Ok(committed
            .orders
            .values()
            .filter(|order| order.status() == status)
            .cloned()
            .collect())
    }

    fn next_identity(&self) -> OrderId {
        OrderId::new()
    }
}

/// インメモリ商品リポジトリ実装
#[derive(Clone)]
pub struct InMemoryProductRepository {
    store: InMemoryStore,
}

impl InMemoryProductRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        self.store
            .stage(StagedWrite::SaveProduct(product.clone()))
            .await;
        Ok(())
    }

    async fn save_all(&self, products: &[Product]) -> Result<(), RepositoryError> {
        for product in products {
            self.save(product).await?;
        }
        Ok(())
    }

    async fn find_by_id(&self, product_id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let committed = self.store.committed.read().await;
        Ok(committed.products.get(&product_id).cloned())
    }

    async fn delete(&self, product_id: ProductId) -> Result<(), RepositoryError> {
        self.store.stage(StagedWrite::DeleteProduct(product_id)).await;
        Ok(())
    }
}

/// インメモリ顧客リポジトリ実装
#[derive(Clone)]
pub struct InMemoryCustomerRepository {
    store: InMemoryStore,
}

impl InMemoryCustomerRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn save(&self, customer: &Customer) -> Result<(), RepositoryError> {
        self.store
            .stage(StagedWrite::SaveCustomer(customer.clone()))
            .await;
        Ok(())
    }

    async fn find_by_id(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<Customer>, RepositoryError> {
        let committed = self.store.committed.read().await;
        Ok(committed.customers.get(&customer_id).cloned())
    }
}
