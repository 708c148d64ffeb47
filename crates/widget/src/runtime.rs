//! Effect runtime for the widget state machine.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{Instrument, error, info_span, warn};

use saved_cart_core::{CustomerId, SaveCartRequest};

use crate::client::{CartStoreClient, ClientError, SessionTokenProvider};
use crate::config::WidgetConfig;
use crate::state::{Effect, Msg, WidgetState, WidgetView};
use crate::timer::ResetTimer;

/// Results coming back from background work.
#[derive(Debug)]
enum Inbound {
    Msg(Msg),
    Reset(u64),
}

/// Drives a [`WidgetState`], executing its effects.
///
/// Fetches and saves run as tokio tasks and report back through an internal
/// channel; call [`CheckoutWidget::process_next`] to apply their results.
/// Neither is cancelled once started. Dropping the widget cancels a pending
/// banner reset.
pub struct CheckoutWidget<T, C> {
    state: WidgetState,
    tokens: Arc<T>,
    client: Arc<C>,
    timer: ResetTimer,
    tx: mpsc::UnboundedSender<Inbound>,
    rx: mpsc::UnboundedReceiver<Inbound>,
}

impl<T, C> CheckoutWidget<T, C>
where
    T: SessionTokenProvider + 'static,
    C: CartStoreClient + 'static,
{
    /// Create a widget in the `Unresolved` phase.
    #[must_use]
    pub fn new(tokens: Arc<T>, client: Arc<C>, config: &WidgetConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: WidgetState::new(),
            tokens,
            client,
            timer: ResetTimer::new(config.reset_delay),
            tx,
            rx,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &WidgetState {
        &self.state
    }

    #[must_use]
    pub fn view(&self) -> WidgetView {
        self.state.view()
    }

    /// Whether a banner reset is scheduled.
    #[must_use]
    pub const fn reset_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Apply a message and start whatever work it triggers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, msg: Msg) {
        for effect in self.state.update(msg) {
            self.run(effect);
        }
    }

    /// Wait for the next background result and apply it.
    pub async fn process_next(&mut self) {
        if let Some(inbound) = self.rx.recv().await {
            self.apply(inbound);
        }
    }

    /// Apply every result that has already arrived. Returns how many.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(inbound) = self.rx.try_recv() {
            self.apply(inbound);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Msg(msg) => self.dispatch(msg),
            Inbound::Reset(generation) => {
                if self.timer.take_fired(generation) {
                    self.dispatch(Msg::ResetElapsed);
                }
            }
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::FetchSavedCart(customer_id) => self.spawn_fetch(customer_id),
            Effect::SaveCart(request) => self.spawn_save(request),
            Effect::ScheduleReset => {
                let tx = self.tx.clone();
                self.timer.schedule(move |generation| {
                    let _ = tx.send(Inbound::Reset(generation));
                });
            }
            Effect::CancelReset => self.timer.cancel(),
        }
    }

    fn spawn_fetch(&self, customer_id: CustomerId) {
        let tokens = Arc::clone(&self.tokens);
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let span = info_span!("fetch_saved_cart", customer_id = %customer_id);

        tokio::spawn(
            async move {
                let result = async {
                    let token = tokens.get().await?;
                    client.get_cart(&token, &customer_id).await
                }
                .await;

                let msg = match result {
                    Ok(response) if response.is_success => Msg::SavedCartFetched(response.data),
                    Ok(response) => {
                        warn!(error = ?response.error, "Cart lookup reported a failure");
                        Msg::SavedCartUnavailable
                    }
                    Err(e) => {
                        error!(error = %e, "Error while getting cart");
                        Msg::SavedCartUnavailable
                    }
                };
                let _ = tx.send(Inbound::Msg(msg));
            }
            .instrument(span),
        );
    }

    fn spawn_save(&self, request: SaveCartRequest) {
        let tokens = Arc::clone(&self.tokens);
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let span = info_span!(
            "save_cart",
            lines = request.selected_product.as_ref().map_or(0, Vec::len)
        );

        tokio::spawn(
            async move {
                let result: Result<_, ClientError> = async {
                    let token = tokens.get().await?;
                    client.save_cart(&token, &request).await
                }
                .await;

                let msg = match result {
                    Ok(_) => Msg::SaveSucceeded,
                    Err(e) => {
                        error!(error = %e, "Error saving cart");
                        Msg::SaveFailed
                    }
                };
                let _ = tx.send(Inbound::Msg(msg));
            }
            .instrument(span),
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use reqwest::StatusCode;
    use tokio::time::Instant;
    use url::Url;

    use saved_cart_core::{
        CartLine, GetCartResponse, SaveCartResponse, SaveOutcome, SavedCart, SavedCartId,
    };

    use super::*;
    use crate::banner::{BannerStatus, BannerTitle};
    use crate::client::SessionToken;
    use crate::state::Phase;

    const BUYER: &str = "gid://shopify/Customer/123";

    #[derive(Default)]
    struct FakeTokens {
        issued: AtomicUsize,
        unavailable: AtomicBool,
    }

    #[async_trait]
    impl SessionTokenProvider for FakeTokens {
        async fn get(&self) -> Result<SessionToken, ClientError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(ClientError::SessionToken("offline".to_string()));
            }
            let n = self.issued.fetch_add(1, Ordering::SeqCst);
            Ok(SessionToken::new(format!("token-{n}")))
        }
    }

    #[derive(Default)]
    struct FakeStore {
        saved: Mutex<Option<SavedCart>>,
        requests: Mutex<Vec<SaveCartRequest>>,
        fail_lookup: AtomicBool,
        reject_saves: AtomicBool,
    }

    impl FakeStore {
        fn with_saved(products: Vec<CartLine>) -> Self {
            let store = Self::default();
            *store.saved.lock().unwrap() = Some(saved_cart(products));
            store
        }
    }

    #[async_trait]
    impl CartStoreClient for FakeStore {
        async fn get_cart(
            &self,
            _token: &SessionToken,
            _customer_id: &CustomerId,
        ) -> Result<GetCartResponse, ClientError> {
            if self.fail_lookup.load(Ordering::SeqCst) {
                return Ok(GetCartResponse::failed("database unavailable"));
            }
            Ok(GetCartResponse::found(self.saved.lock().unwrap().clone()))
        }

        async fn save_cart(
            &self,
            _token: &SessionToken,
            request: &SaveCartRequest,
        ) -> Result<SaveCartResponse, ClientError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.reject_saves.load(Ordering::SeqCst) {
                return Err(ClientError::Rejected {
                    status: StatusCode::BAD_REQUEST,
                    body: r#"{"message":"Invalid request"}"#.to_string(),
                });
            }
            let cart = saved_cart(request.selected_product.clone().unwrap_or_default());
            Ok(SaveCartResponse::new(SaveOutcome::Created, cart))
        }
    }

    fn saved_cart(products: Vec<CartLine>) -> SavedCart {
        SavedCart {
            id: SavedCartId::new(1),
            customer_id: CustomerId::parse("123").unwrap(),
            checkout_token: "tok".to_string(),
            products,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn config() -> WidgetConfig {
        WidgetConfig::new(Url::parse("https://app.example.com").unwrap())
    }

    type TestWidget = CheckoutWidget<FakeTokens, FakeStore>;

    /// Widget for customer 123 with live cart [a: Shoe], fetch applied.
    async fn ready_widget(tokens: Arc<FakeTokens>, store: Arc<FakeStore>) -> TestWidget {
        let mut widget = CheckoutWidget::new(tokens, store, &config());
        widget.dispatch(Msg::CheckoutTokenChanged(Some("tok".to_string())));
        widget.dispatch(Msg::LiveLinesChanged(vec![CartLine::new("a", "Shoe")]));
        widget.dispatch(Msg::BuyerIdentified(Some(BUYER.to_string())));
        widget.process_next().await;
        assert_eq!(widget.state().phase(), Phase::Ready);
        widget
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_save_for_new_customer() {
        let tokens = Arc::new(FakeTokens::default());
        let store = Arc::new(FakeStore::default());
        let mut widget = ready_widget(Arc::clone(&tokens), Arc::clone(&store)).await;

        assert!(widget.state().saved_lines().is_empty());

        widget.dispatch(Msg::SelectLive(vec!["a".to_string()]));
        widget.dispatch(Msg::SaveRequested);
        widget.process_next().await;

        assert_eq!(widget.state().phase(), Phase::Saved);
        assert!(!widget.state().is_saving());
        assert!(widget.reset_pending());

        let requests = store.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests.first().unwrap().selected_product,
            Some(vec![CartLine::new("a", "Shoe")])
        );
        assert_eq!(requests.first().unwrap().customer_id.as_deref(), Some("123"));
        // One token for the fetch, one for the save.
        assert_eq!(tokens.issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_loads_saved_lines() {
        let store = Arc::new(FakeStore::with_saved(vec![CartLine::new("x", "Sock")]));
        let widget = ready_widget(Arc::default(), store).await;

        assert_eq!(widget.state().saved_lines(), &[CartLine::new("x", "Sock")]);
        let form = widget.view().form.unwrap();
        assert_eq!(form.saved_lines.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_shows_no_banner() {
        let store = Arc::new(FakeStore::default());
        store.fail_lookup.store(true, Ordering::SeqCst);
        let widget = ready_widget(Arc::default(), store).await;

        let view = widget.view();
        assert_eq!(view.banner.title, BannerTitle::SaveCart);
        assert_eq!(view.banner.status, BannerStatus::Info);
        assert!(view.form.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_token_on_fetch_leaves_widget_usable() {
        let tokens = Arc::new(FakeTokens::default());
        tokens.unavailable.store(true, Ordering::SeqCst);
        let widget = ready_widget(tokens, Arc::default()).await;
        assert!(widget.state().saved_lines().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_merged_save_with_saved_lines() {
        let store = Arc::new(FakeStore::with_saved(vec![
            CartLine::new("x", "Sock"),
            CartLine::new("y", "Belt"),
        ]));
        let mut widget = ready_widget(Arc::default(), Arc::clone(&store)).await;

        widget.dispatch(Msg::SelectSaved(vec!["y".to_string()]));
        widget.dispatch(Msg::SelectLive(vec!["a".to_string()]));
        widget.dispatch(Msg::SaveRequested);
        widget.process_next().await;

        let requests = store.requests.lock().unwrap();
        let ids: Vec<_> = requests
            .first()
            .unwrap()
            .selected_product
            .as_ref()
            .unwrap()
            .iter()
            .map(|l| l.id.clone())
            .collect();
        assert_eq!(ids, vec!["a", "y"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_save_shows_failed_banner() {
        let store = Arc::new(FakeStore::default());
        store.reject_saves.store(true, Ordering::SeqCst);
        let mut widget = ready_widget(Arc::default(), store).await;

        widget.dispatch(Msg::SelectLive(vec!["a".to_string()]));
        widget.dispatch(Msg::SaveRequested);
        widget.process_next().await;

        let view = widget.view();
        assert_eq!(view.banner.title, BannerTitle::Failed);
        assert_eq!(view.banner.status, BannerStatus::Critical);
        assert!(view.form.is_none());
        assert!(!widget.state().is_saving());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_token_on_save_fails() {
        let tokens = Arc::new(FakeTokens::default());
        let store = Arc::new(FakeStore::default());
        let mut widget = ready_widget(Arc::clone(&tokens), Arc::clone(&store)).await;

        tokens.unavailable.store(true, Ordering::SeqCst);
        widget.dispatch(Msg::SelectLive(vec!["a".to_string()]));
        widget.dispatch(Msg::SaveRequested);
        widget.process_next().await;

        assert_eq!(widget.state().phase(), Phase::Failed);
        assert!(store.requests.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_banner_resets_after_delay() {
        let mut widget = ready_widget(Arc::default(), Arc::default()).await;
        widget.dispatch(Msg::SelectLive(vec!["a".to_string()]));
        widget.dispatch(Msg::SaveRequested);
        widget.process_next().await;
        assert_eq!(widget.state().phase(), Phase::Saved);

        let saved_at = Instant::now();
        let delay = config().reset_delay;

        let early = tokio::time::timeout(
            delay - Duration::from_millis(1),
            widget.process_next(),
        )
        .await;
        assert!(early.is_err());
        assert_eq!(widget.state().phase(), Phase::Saved);

        widget.process_next().await;
        assert!(saved_at.elapsed() >= delay);

        let view = widget.view();
        assert_eq!(view.banner.title, BannerTitle::SaveCart);
        assert_eq!(view.banner.status, BannerStatus::Info);
        assert!(view.form.is_some());
        assert!(!widget.reset_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_banner_also_resets() {
        let store = Arc::new(FakeStore::default());
        store.reject_saves.store(true, Ordering::SeqCst);
        let mut widget = ready_widget(Arc::default(), store).await;
        widget.dispatch(Msg::SelectLive(vec!["a".to_string()]));
        widget.dispatch(Msg::SaveRequested);
        widget.process_next().await;
        assert_eq!(widget.state().phase(), Phase::Failed);

        widget.process_next().await;
        assert_eq!(widget.state().phase(), Phase::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_pending_without_results() {
        let mut widget: TestWidget =
            CheckoutWidget::new(Arc::default(), Arc::default(), &config());
        assert_eq!(widget.process_pending(), 0);
        assert_eq!(widget.state().phase(), Phase::Unresolved);
    }
}
