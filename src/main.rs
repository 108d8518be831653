use shop_order_management::adapter::driven::{
    ConsoleLogger, EventBusConfig, InMemoryBasketRepository, InMemoryCustomerRepository,
    InMemoryEventBus, InMemoryOrderRepository, InMemoryProductRepository, InMemoryStore,
    InMemoryUnitOfWork,
};
use shop_order_management::application::service::{
    BasketApplicationService, BasketItemUpdate, CheckoutService, OrderApplicationService,
};
use shop_order_management::domain::handler::NotificationHandler;
use shop_order_management::domain::model::{
    Address, CardDetails, Category, CategoryId, Customer, CustomerId, Money, Product, ProductId,
};
use shop_order_management::domain::port::{
    CustomerRepository, Logger, ProductRepository, UnitOfWork,
};

use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== ショップ注文管理システム ===");
    println!("ドメイン駆動設計サンプルプロジェクト");
    println!();

    // インメモリストアと永続化アダプターを作成
    let store = InMemoryStore::new();
    let unit_of_work: Arc<dyn UnitOfWork> = Arc::new(InMemoryUnitOfWork::new(store.clone()));
    let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::new());

    // イベントバスを作成し、通知ハンドラーを登録
    let event_bus = Arc::new(InMemoryEventBus::new(EventBusConfig::default()));
    let notification_handler = NotificationHandler::new(logger.clone());
    event_bus
        .subscribe_order_status_changed(notification_handler)
        .await?;
    println!("イベントハンドラーを登録しました");

    // マスタデータを投入
    let customer_id = CustomerId::new();
    let mut customer = Customer::new(
        customer_id,
        "Hanako".to_string(),
        "Yamada".to_string(),
        "hanako.yamada@example.com".to_string(),
    )?;
    customer.set_address(Address::new(
        "10 Downing Street".to_string(),
        None,
        "London".to_string(),
        "Greater London".to_string(),
        "SW1A 2AA".to_string(),
    )?);
    customer.set_card_details(CardDetails::new(
        "4111111111111111".to_string(),
        "12/30",
        "123".to_string(),
    )?);

    let category = Category::new(CategoryId::new(), "Stationery".to_string())?;
    let notebook_id = ProductId::new();
    let notebook = Product::new(
        notebook_id,
        "A5 Notebook".to_string(),
        "Hardcover notebook with dotted pages".to_string(),
        Money::gbp(799),
        "https://images.example.com/notebook.png".to_string(),
        20,
        vec![category.clone()],
        true,
    )?;
    let pen_id = ProductId::new();
    let pen = Product::new(
        pen_id,
        "Fountain Pen".to_string(),
        "Fine nib fountain pen".to_string(),
        Money::gbp(2450),
        "https://images.example.com/pen.png".to_string(),
        5,
        vec![category],
        false,
    )?;

    let customer_repository = InMemoryCustomerRepository::new(store.clone());
    let product_repository = InMemoryProductRepository::new(store.clone());
    customer_repository.save(&customer).await?;
    product_repository.save_all(&[notebook, pen]).await?;
    unit_of_work.commit().await?;
    println!("顧客と商品を登録しました");
    println!();

    // バスケットに商品を追加
    let basket_service = BasketApplicationService::new(
        InMemoryBasketRepository::new(store.clone()),
        InMemoryProductRepository::new(store.clone()),
        unit_of_work.clone(),
        logger.clone(),
    );
    let basket = basket_service
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
        .await?;
    println!(
        "バスケットに{}種類の商品を追加しました（合計: {}ペンス）",
        basket.items().len(),
        basket.total_price()?.amount()
    );

    // バスケットを注文に変換
    let checkout_service = CheckoutService::new(
        InMemoryBasketRepository::new(store.clone()),
        InMemoryOrderRepository::new(store.clone()),
        InMemoryProductRepository::new(store.clone()),
        InMemoryCustomerRepository::new(store.clone()),
        unit_of_work.clone(),
        logger.clone(),
    );
    let order_id = checkout_service
        .convert_basket_to_order(customer_id, basket.id())
        .await?;
    println!("注文を作成しました: {}", order_id);
    println!();

    // 注文を発送し、配達完了にする
    let order_service = OrderApplicationService::new(
        InMemoryOrderRepository::new(store.clone()),
        event_bus.clone(),
        unit_of_work.clone(),
        logger.clone(),
    );
    order_service.ship_order(order_id).await?;
    order_service.deliver_order(order_id).await?;

    let order = order_service.get_order(order_id).await?;
    println!();
    println!("注文の最終状態:");
    println!("  注文ID: {}", order.id());
    println!("  ステータス: {}", order.status());
    for item in order.items() {
        println!(
            "  明細: {} x{} @ {}ペンス",
            item.product_name(),
            item.quantity(),
            item.price().amount()
        );
    }
    println!("  合計金額: {}ペンス", order.total_price()?.amount());

    Ok(())
}
