use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal_macros::dec;
use tokio::sync::Mutex;

use coingate_rs::{
    CallbackReconciler, CoinGateError, CoinGateOrder, CreateOrderRequest, InMemoryOrderStore,
    InMemoryPaymentStore, Order, OrderApi, OrderItem, OrderStore, PaymentInitiator, PaymentRecord,
    PaymentStore, StoreConfig,
};

/// Correlation token used when tests seed payment records directly.
pub const TEST_TOKEN: &str = "0f8fad5bd9cb469fa165b0f5aae0a5c6";

/// Scriptable stand-in for the CoinGate API.
///
/// Creation requests are recorded and answered with a `new` order; tests push
/// status changes with [`MockGateway::set_status`] to simulate what the
/// gateway reports once it starts calling back. Order ids starting with
/// `fail_` make creation fail, and [`MockGateway::set_offline`] fails every
/// call at the transport level.
pub struct MockGateway {
    state: Mutex<GatewayState>,
    offline: AtomicBool,
}

struct GatewayState {
    next_id: i64,
    orders: HashMap<i64, CoinGateOrder>,
    requests: Vec<CreateOrderRequest>,
    fetches: usize,
}

impl MockGateway {
    pub fn new() -> Self {
        MockGateway {
            state: Mutex::new(GatewayState {
                next_id: 1528350,
                orders: HashMap::new(),
                requests: Vec::new(),
                fetches: 0,
            }),
            offline: AtomicBool::new(false),
        }
    }

    /// Change the status the gateway reports for an existing order.
    pub async fn set_status(&self, id: i64, status: &str) {
        let mut state = self.state.lock().await;
        state
            .orders
            .get_mut(&id)
            .expect("unknown gateway order id")
            .status = status.to_string();
    }

    /// Seed a gateway order without going through creation.
    pub async fn insert(&self, order: CoinGateOrder) {
        let mut state = self.state.lock().await;
        state.orders.insert(order.id, order);
    }

    /// Every creation request received so far, oldest first.
    pub async fn requests(&self) -> Vec<CreateOrderRequest> {
        self.state.lock().await.requests.clone()
    }

    pub async fn last_request(&self) -> CreateOrderRequest {
        self.state
            .lock()
            .await
            .requests
            .last()
            .cloned()
            .expect("no creation request recorded")
    }

    /// How many times `get_order` has been called.
    pub async fn fetch_count(&self) -> usize {
        self.state.lock().await.fetches
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderApi for MockGateway {
    async fn create_order(
        &self,
        params: &CreateOrderRequest,
    ) -> Result<CoinGateOrder, CoinGateError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CoinGateError::HttpError("connection refused".to_string()));
        }

        // Simulated gateway-side rejection, triggered by the order id.
        if params.order_id.starts_with("fail_") {
            return Err(CoinGateError::ApiError {
                status_code: 422,
                message: "OrderIsNotValid: Price amount is invalid".to_string(),
            });
        }

        let mut state = self.state.lock().await;
        state.next_id += 1;
        let id = state.next_id;

        let order = CoinGateOrder {
            id,
            status: "new".to_string(),
            order_id: params.order_id.clone(),
            price_amount: params.price_amount.clone(),
            price_currency: params.price_currency.clone(),
            receive_currency: params.receive_currency.clone(),
            receive_amount: None,
            payment_url: Some(format!("https://coingate.com/invoice/{}", params.token)),
            token: Some(params.token.clone()),
            created_at: Some(Utc::now()),
        };

        state.requests.push(params.clone());
        state.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: i64) -> Result<Option<CoinGateOrder>, CoinGateError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CoinGateError::HttpError("connection refused".to_string()));
        }

        let mut state = self.state.lock().await;
        state.fetches += 1;
        Ok(state.orders.get(&id).cloned())
    }
}

/// Everything a test needs: the mock gateway, both in-memory stores, and the
/// two flows wired against them.
pub struct TestContext {
    pub gateway: Arc<MockGateway>,
    pub orders: Arc<InMemoryOrderStore>,
    pub payments: Arc<InMemoryPaymentStore>,
    pub initiator: PaymentInitiator,
    pub reconciler: Arc<CallbackReconciler>,
}

pub fn setup() -> TestContext {
    setup_with_orders(InMemoryOrderStore::new())
}

/// Variant for tests that preconfigure the order store, e.g. with display
/// status overrides.
pub fn setup_with_orders(orders: InMemoryOrderStore) -> TestContext {
    init_tracing();

    let gateway = Arc::new(MockGateway::new());
    let orders = Arc::new(orders);
    let payments = Arc::new(InMemoryPaymentStore::new());

    let initiator = PaymentInitiator::new(gateway.clone(), payments.clone(), store_config());
    let reconciler = Arc::new(CallbackReconciler::new(
        gateway.clone(),
        orders.clone(),
        payments.clone(),
    ));

    TestContext {
        gateway,
        orders,
        payments,
        initiator,
        reconciler,
    }
}

pub fn store_config() -> StoreConfig {
    StoreConfig::new("EUR", "Acme Outlet", "https://shop.example.com")
}

/// Order #1000123: 49.50 USD, two line items.
pub fn sample_order() -> Order {
    Order::new(
        "1000123",
        dec!(49.50),
        "USD",
        vec![
            OrderItem::new(dec!(2), "Widget"),
            OrderItem::new(dec!(1), "Gadget"),
        ],
    )
}

/// Persist `order` along with a payment record carrying `token`, the way
/// checkout leaves them before the first callback arrives.
pub async fn seed_order_with_token(ctx: &TestContext, order: Order, token: &str) {
    let mut payment = PaymentRecord::new(order.increment_id.as_str());
    payment.set_gateway_token(token);
    ctx.payments.save(payment).await.expect("seed payment");
    ctx.orders.save(order).await.expect("seed order");
}

/// Build a gateway order for seeding into the mock.
pub fn remote_order(id: i64, order_id: &str, status: &str) -> CoinGateOrder {
    CoinGateOrder {
        id,
        status: status.to_string(),
        order_id: order_id.to_string(),
        price_amount: "49.50".to_string(),
        price_currency: "USD".to_string(),
        receive_currency: "EUR".to_string(),
        receive_amount: None,
        payment_url: Some(format!("https://coingate.com/invoice/{}", id)),
        token: Some(TEST_TOKEN.to_string()),
        created_at: Some(Utc::now()),
    }
}

/// Route tracing output through the test harness so `RUST_LOG=debug` shows
/// the flows' logging. Only the first caller installs the subscriber.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}
