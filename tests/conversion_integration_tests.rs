use shop_order_management::adapter::driven::{
    ConsoleLogger, EventBusConfig, InMemoryBasketRepository, InMemoryCustomerRepository,
    InMemoryEventBus, InMemoryOrderRepository, InMemoryProductRepository, InMemoryStore,
    InMemoryUnitOfWork,
};
use shop_order_management::application::service::{
    BasketApplicationService, BasketItemUpdate, CheckoutService, OrderApplicationService,
};
use shop_order_management::application::ApplicationError;
use shop_order_management::domain::error::DomainError;
use shop_order_management::domain::handler::NotificationHandler;
use shop_order_management::domain::model::{
    Address, Basket, BasketId, BasketItem, CardDetails, Category, CategoryId, Customer,
    CustomerId, Money, OrderProcessingStatus, Product, ProductId,
};
use shop_order_management::domain::port::{
    BasketRepository, CustomerRepository, EventBus, Logger, OrderRepository, ProductRepository,
    UnitOfWork,
};

use std::sync::Arc;

// テスト用のフィクスチャ
// インメモリアダプター一式と各サービスを組み立てる
struct Fixture {
    store: InMemoryStore,
    unit_of_work: Arc<dyn UnitOfWork>,
    basket_repository: InMemoryBasketRepository,
    product_repository: InMemoryProductRepository,
    customer_repository: InMemoryCustomerRepository,
    checkout_service: CheckoutService<
        InMemoryBasketRepository,
        InMemoryOrderRepository,
        InMemoryProductRepository,
        InMemoryCustomerRepository,
    >,
    basket_service: BasketApplicationService<InMemoryBasketRepository, InMemoryProductRepository>,
}

impl Fixture {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let unit_of_work: Arc<dyn UnitOfWork> = Arc::new(InMemoryUnitOfWork::new(store.clone()));
        let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::new());

        let checkout_service = CheckoutService::new(
            InMemoryBasketRepository::new(store.clone()),
            InMemoryOrderRepository::new(store.clone()),
            InMemoryProductRepository::new(store.clone()),
            InMemoryCustomerRepository::new(store.clone()),
            unit_of_work.clone(),
            logger.clone(),
        );
        let basket_service = BasketApplicationService::new(
            InMemoryBasketRepository::new(store.clone()),
            InMemoryProductRepository::new(store.clone()),
            unit_of_work.clone(),
            logger,
        );

        Self {
            basket_repository: InMemoryBasketRepository::new(store.clone()),
            product_repository: InMemoryProductRepository::new(store.clone()),
            customer_repository: InMemoryCustomerRepository::new(store.clone()),
            store,
            unit_of_work,
            checkout_service,
            basket_service,
        }
    }

    /// 住所とカード情報が揃った顧客を登録する
    async fn seed_customer(&self) -> CustomerId {
        let customer_id = CustomerId::new();
        let mut customer = Customer::new(
            customer_id,
            "Taro".to_string(),
            "Suzuki".to_string(),
            "taro.suzuki@example.com".to_string(),
        )
        .unwrap();
        customer.set_address(
            Address::new(
                "221B Baker Street".to_string(),
                None,
                "London".to_string(),
                "Greater London".to_string(),
                "NW1 6XE".to_string(),
            )
            .unwrap(),
        );
        customer.set_card_details(
            CardDetails::new("4111111111111111".to_string(), "12/30", "123".to_string()).unwrap(),
        );

        self.customer_repository.save(&customer).await.unwrap();
        self.unit_of_work.commit().await.unwrap();
        customer_id
    }

    /// 住所・カード未登録の顧客を登録する
    async fn seed_incomplete_customer(&self) -> CustomerId {
        let customer_id = CustomerId::new();
        let customer = Customer::new(
            customer_id,
            "Jiro".to_string(),
            "Sato".to_string(),
            "jiro.sato@example.com".to_string(),
        )
        .unwrap();
        self.customer_repository.save(&customer).await.unwrap();
        self.unit_of_work.commit().await.unwrap();
        customer_id
    }

    /// 商品を登録する
    async fn seed_product(&self, name: &str, price: i64, stock: u32) -> ProductId {
        let product_id = ProductId::new();
        let product = Product::new(
            product_id,
            name.to_string(),
            format!("{} description", name),
            Money::gbp(price),
            "https://images.example.com/item.png".to_string(),
            stock,
            vec![Category::new(CategoryId::new(), "General".to_string()).unwrap()],
            false,
        )
        .unwrap();
        self.product_repository.save(&product).await.unwrap();
        self.unit_of_work.commit().await.unwrap();
        product_id
    }

    /// 指定された明細を持つバスケットを登録する
    async fn seed_basket(
        &self,
        customer_id: CustomerId,
        items: Vec<(ProductId, &str, i64, u32)>,
    ) -> BasketId {
        let basket_items = items
            .into_iter()
            .map(|(product_id, name, price, quantity)| {
                BasketItem::new(product_id, name.to_string(), Money::gbp(price), quantity).unwrap()
            })
            .collect();
        let basket_id = BasketId::new();
        let now = chrono::Utc::now();
        let basket = Basket::reconstruct(basket_id, customer_id, basket_items, now, now).unwrap();
        self.basket_repository.save(&basket).await.unwrap();
        self.unit_of_work.commit().await.unwrap();
        basket_id
    }
}

#[tokio::test]
async fn test_basket_is_converted_into_pending_order() {
    let fixture = Fixture::new();
    let customer_id = fixture.seed_customer().await;
    let notebook_id = fixture.seed_product("Notebook", 799, 20).await;
    let pen_id = fixture.seed_product("Pen", 2450, 5).await;
    let basket_id = fixture
        .seed_basket(
            customer_id,
            vec![(notebook_id, "Notebook", 799, 2), (pen_id, "Pen", 2450, 1)],
        )
        .await;

    let order_id = fixture
        .checkout_service
        .convert_basket_to_order(customer_id, basket_id)
        .await
        .unwrap();

    let order_repository = InMemoryOrderRepository::new(fixture.store.clone());
    let order = order_repository.find_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.status(), OrderProcessingStatus::Pending);
    assert_eq!(order.customer_id(), customer_id);
    assert_eq!(order.items().len(), 2);
    assert_eq!(order.total_price().unwrap().amount(), 799 * 2 + 2450);
}

#[tokio::test]
async fn test_conversion_clears_basket_and_reduces_stock() {
    let fixture = Fixture::new();
    let customer_id = fixture.seed_customer().await;
    let product_id = fixture.seed_product("Notebook", 799, 20).await;
    let basket_id = fixture
        .seed_basket(customer_id, vec![(product_id, "Notebook", 799, 3)])
        .await;

    fixture
        .checkout_service
        .convert_basket_to_order(customer_id, basket_id)
        .await
        .unwrap();

    let basket = fixture
        .basket_repository
        .find_by_id(basket_id)
        .await
        .unwrap()
        .unwrap();
    assert!(basket.is_empty());

    let product = fixture
        .product_repository
        .find_by_id(product_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.stock(), 17);

    // すべての変更が確定済みで、予約中の書き込みは残っていない
    assert_eq!(fixture.store.pending_count().await, 0);
}

#[tokio::test]
async fn test_conversion_fails_for_missing_basket() {
    let fixture = Fixture::new();

    let result = fixture
        .checkout_service
        .convert_basket_to_order(CustomerId::new(), BasketId::new())
        .await;

    assert!(matches!(result, Err(ApplicationError::BasketNotFound(_))));
}

#[tokio::test]
async fn test_conversion_fails_for_empty_basket() {
    let fixture = Fixture::new();
    let customer_id = fixture.seed_customer().await;
    let basket_id = fixture.seed_basket(customer_id, vec![]).await;

    let result = fixture
        .checkout_service
        .convert_basket_to_order(customer_id, basket_id)
        .await;

    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(DomainError::BasketValidation(
            _
        )))
    ));
}

#[tokio::test]
async fn test_conversion_fails_for_missing_customer() {
    let fixture = Fixture::new();
    let product_id = fixture.seed_product("Notebook", 799, 20).await;
    // 顧客を登録せずにバスケットだけ作成する
    let customer_id = CustomerId::new();
    let basket_id = fixture
        .seed_basket(customer_id, vec![(product_id, "Notebook", 799, 1)])
        .await;

    let result = fixture
        .checkout_service
        .convert_basket_to_order(customer_id, basket_id)
        .await;

    assert!(matches!(result, Err(ApplicationError::CustomerNotFound(_))));
}

#[tokio::test]
async fn test_conversion_fails_for_incomplete_customer_details() {
    let fixture = Fixture::new();
    let customer_id = fixture.seed_incomplete_customer().await;
    let product_id = fixture.seed_product("Notebook", 799, 20).await;
    let basket_id = fixture
        .seed_basket(customer_id, vec![(product_id, "Notebook", 799, 1)])
        .await;

    let result = fixture
        .checkout_service
        .convert_basket_to_order(customer_id, basket_id)
        .await;

    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(
            DomainError::CustomerDetailsMissing { .. }
        ))
    ));
}

#[tokio::test]
async fn test_conversion_rolls_back_on_insufficient_stock() {
    let fixture = Fixture::new();
    let customer_id = fixture.seed_customer().await;
    let plenty_id = fixture.seed_product("Notebook", 799, 20).await;
    let scarce_id = fixture.seed_product("Pen", 2450, 1).await;
    let basket_id = fixture
        .seed_basket(
            customer_id,
            vec![(plenty_id, "Notebook", 799, 2), (scarce_id, "Pen", 2450, 5)],
        )
        .await;

    let result = fixture
        .checkout_service
        .convert_basket_to_order(customer_id, basket_id)
        .await;

    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(
            DomainError::InsufficientStock { .. }
        ))
    ));

    // 1件目の商品の在庫引き当ても確定されていない
    let plenty = fixture
        .product_repository
        .find_by_id(plenty_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plenty.stock(), 20);

    // バスケットも変化していない
    let basket = fixture
        .basket_repository
        .find_by_id(basket_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(basket.items().len(), 2);

    // ロールバックにより予約中の書き込みが残っていない
    assert_eq!(fixture.store.pending_count().await, 0);
}

#[tokio::test]
async fn test_conversion_fails_when_price_has_changed() {
    let fixture = Fixture::new();
    let customer_id = fixture.seed_customer().await;
    let product_id = fixture.seed_product("Notebook", 999, 20).await;
    // バスケット追加時の価格は799ペンスだったが、現在は999ペンス
    let basket_id = fixture
        .seed_basket(customer_id, vec![(product_id, "Notebook", 799, 1)])
        .await;

    let result = fixture
        .checkout_service
        .convert_basket_to_order(customer_id, basket_id)
        .await;

    match result {
        Err(ApplicationError::DomainError(DomainError::PriceChanged {
            product_id: changed_id,
            basket_price,
            product_price,
        })) => {
            assert_eq!(changed_id, product_id);
            assert_eq!(basket_price.amount(), 799);
            assert_eq!(product_price.amount(), 999);
        }
        other => panic!("expected PriceChanged error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_or_create_basket_commits_new_basket_immediately() {
    let fixture = Fixture::new();
    let customer_id = CustomerId::new();

    let basket = fixture
        .basket_service
        .get_or_create_basket(customer_id)
        .await
        .unwrap();
    assert!(basket.is_empty());

    // 自動作成されたバスケットは確定済みで、別のリポジトリからも見える
    let found = fixture
        .basket_repository
        .find_by_id(basket.id())
        .await
        .unwrap();
    assert!(found.is_some());
    assert_eq!(fixture.store.pending_count().await, 0);

    // 2回目の呼び出しは同じバスケットを返す
    let again = fixture
        .basket_service
        .get_or_create_basket(customer_id)
        .await
        .unwrap();
    assert_eq!(again.id(), basket.id());
}

#[tokio::test]
async fn test_update_basket_adds_updates_and_removes_items() {
    let fixture = Fixture::new();
    let customer_id = fixture.seed_customer().await;
    let notebook_id = fixture.seed_product("Notebook", 799, 20).await;
    let pen_id = fixture.seed_product("Pen", 2450, 5).await;

    // 追加
    let basket = fixture
        .basket_service
        .update_basket(
            customer_id,
            vec![
                BasketItemUpdate {
                    product_id: notebook_id,
                    quantity: 2,
                },
                BasketItemUpdate {
                    product_id: pen_id,
                    quantity: 1,
                },
            ],
        )
        .await
        .unwrap();
    assert_eq!(basket.items().len(), 2);

    // 数量変更と削除（数量0）
    let basket = fixture
        .basket_service
        .update_basket(
            customer_id,
            vec![
                BasketItemUpdate {
                    product_id: notebook_id,
                    quantity: 5,
                },
                BasketItemUpdate {
                    product_id: pen_id,
                    quantity: 0,
                },
            ],
        )
        .await
        .unwrap();
    assert_eq!(basket.items().len(), 1);
    assert_eq!(basket.items()[0].product_id(), notebook_id);
    assert_eq!(basket.items()[0].quantity(), 5);
}

#[tokio::test]
async fn test_update_basket_refreshes_item_price() {
    let fixture = Fixture::new();
    let customer_id = fixture.seed_customer().await;
    let product_id = fixture.seed_product("Notebook", 999, 20).await;
    // 古い価格の明細を持つバスケットを用意する
    fixture
        .seed_basket(customer_id, vec![(product_id, "Notebook", 799, 1)])
        .await;

    let basket = fixture
        .basket_service
        .update_basket(
            customer_id,
            vec![BasketItemUpdate {
                product_id,
                quantity: 2,
            }],
        )
        .await
        .unwrap();

    // 数量変更に伴って単価が商品マスタの現在価格に追随する
    assert_eq!(basket.items()[0].quantity(), 2);
    assert_eq!(basket.items()[0].price().amount(), 999);
}

#[tokio::test]
async fn test_update_basket_fails_for_insufficient_stock() {
    let fixture = Fixture::new();
    let customer_id = fixture.seed_customer().await;
    let product_id = fixture.seed_product("Pen", 2450, 3).await;

    let result = fixture
        .basket_service
        .update_basket(
            customer_id,
            vec![BasketItemUpdate {
                product_id,
                quantity: 10,
            }],
        )
        .await;

    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(
            DomainError::InsufficientStock { .. }
        ))
    ));
    assert_eq!(fixture.store.pending_count().await, 0);
}

#[tokio::test]
async fn test_order_lifecycle_publishes_events_without_dead_letters() {
    let fixture = Fixture::new();
    let customer_id = fixture.seed_customer().await;
    let product_id = fixture.seed_product("Notebook", 799, 20).await;
    let basket_id = fixture
        .seed_basket(customer_id, vec![(product_id, "Notebook", 799, 1)])
        .await;
    let order_id = fixture
        .checkout_service
        .convert_basket_to_order(customer_id, basket_id)
        .await
        .unwrap();

    let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::new());
    let event_bus = Arc::new(InMemoryEventBus::new(EventBusConfig::default()));
    event_bus
        .subscribe_order_status_changed(NotificationHandler::new(logger.clone()))
        .await
        .unwrap();

    let order_service = OrderApplicationService::new(
        InMemoryOrderRepository::new(fixture.store.clone()),
        event_bus.clone() as Arc<dyn EventBus>,
        fixture.unit_of_work.clone(),
        logger,
    );

    order_service.ship_order(order_id).await.unwrap();
    order_service.deliver_order(order_id).await.unwrap();

    let order = order_service.get_order(order_id).await.unwrap();
    assert_eq!(order.status(), OrderProcessingStatus::Delivered);

    // すべてのイベントが正常に配信され、デッドレターキューは空のまま
    assert!(event_bus.dead_letter_entries().await.is_empty());
}

#[tokio::test]
async fn test_cancel_is_rejected_after_shipping() {
    let fixture = Fixture::new();
    let customer_id = fixture.seed_customer().await;
    let product_id = fixture.seed_product("Notebook", 799, 20).await;
    let basket_id = fixture
        .seed_basket(customer_id, vec![(product_id, "Notebook", 799, 1)])
        .await;
    let order_id = fixture
        .checkout_service
        .convert_basket_to_order(customer_id, basket_id)
        .await
        .unwrap();

    let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::new());
    let event_bus = Arc::new(InMemoryEventBus::new(EventBusConfig::default()));
    let order_service = OrderApplicationService::new(
        InMemoryOrderRepository::new(fixture.store.clone()),
        event_bus as Arc<dyn EventBus>,
        fixture.unit_of_work.clone(),
        logger,
    );

    order_service.ship_order(order_id).await.unwrap();

    let result = order_service.cancel_order(order_id).await;
    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(
            DomainError::InvalidStatusTransition { .. }
        ))
    ));

    // 失敗した遷移は確定されず、ステータスは発送済みのまま
    let order = order_service.get_order(order_id).await.unwrap();
    assert_eq!(order.status(), OrderProcessingStatus::Shipped);
    assert_eq!(fixture.store.pending_count().await, 0);
}
