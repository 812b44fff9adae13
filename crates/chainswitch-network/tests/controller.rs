//! Controller behaviour against a scripted transport factory.
//!
//! Every request a mock node receives is handed to the test through a
//! channel together with a oneshot reply, so probe completion order is
//! decided by the test.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use chainswitch_core::{
    BlockEvent, BlockListener, BlockSource, JsonRpcRequest, JsonRpcResponse, ListenerId,
    Listeners, NetworkClient, NetworkIdentity, NetworkRegistry, NetworkSettings, NetworkType,
    ProviderConfig, ProviderConfigPatch, RpcTransport, TransportError, TransportFactory,
    TransportMiddleware,
};
use chainswitch_network::presets::{LOCALHOST, MAINNET, TESTNET};
use chainswitch_network::{
    BaseParams, ControllerStatus, NetworkController, NetworkError, NetworkOptions, RpcTarget,
};

const WAIT: Duration = Duration::from_secs(2);

// ─── Scripted node ───────────────────────────────────────────────────────────

struct PendingRequest {
    url: String,
    method: String,
    reply: oneshot::Sender<Result<Value, String>>,
}

impl PendingRequest {
    fn answer(self, value: Value) {
        let _ = self.reply.send(Ok(value));
    }

    fn fail(self, message: &str) {
        let _ = self.reply.send(Err(message.to_string()));
    }
}

struct ScriptedNode {
    url: String,
    requests: mpsc::UnboundedSender<PendingRequest>,
}

#[async_trait]
impl RpcTransport for ScriptedNode {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let (reply, answer) = oneshot::channel();
        self.requests
            .send(PendingRequest {
                url: self.url.clone(),
                method: req.method.clone(),
                reply,
            })
            .map_err(|_| TransportError::Other("test finished".into()))?;
        match answer.await {
            Ok(Ok(value)) => Ok(JsonRpcResponse::success(req.id, value)),
            Ok(Err(message)) => Err(TransportError::Http(message)),
            Err(_) => Err(TransportError::Other("reply dropped".into())),
        }
    }

    fn url(&self) -> String {
        self.url.clone()
    }
}

#[derive(Default)]
struct ManualBlocks {
    listeners: Listeners<BlockEvent>,
}

impl ManualBlocks {
    fn emit(&self, event: BlockEvent) {
        self.listeners.emit(&event);
    }
}

impl BlockSource for ManualBlocks {
    fn on(&self, listener: BlockListener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn off(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn latest(&self) -> Result<Option<u64>, TransportError> {
        Ok(None)
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

struct ScriptedFactory {
    requests: mpsc::UnboundedSender<PendingRequest>,
    built: Mutex<Vec<(String, Arc<ManualBlocks>)>>,
    fail_next: AtomicBool,
}

impl ScriptedFactory {
    fn build(&self, url: &str) -> Result<NetworkClient, TransportError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(TransportError::InvalidUrl {
                url: url.to_string(),
                reason: "scripted failure".into(),
            });
        }
        let node: Arc<dyn RpcTransport> = Arc::new(ScriptedNode {
            url: url.to_string(),
            requests: self.requests.clone(),
        });
        let blocks = Arc::new(ManualBlocks::default());
        self.built
            .lock()
            .unwrap()
            .push((url.to_string(), Arc::clone(&blocks)));
        Ok(NetworkClient {
            middleware: Arc::new(TransportMiddleware::new(Arc::clone(&node))),
            block_tracker: blocks,
            rpc_url: url.to_string(),
            transport: Some(node),
        })
    }

    fn built_urls(&self) -> Vec<String> {
        self.built.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }

    fn latest_blocks(&self) -> Arc<ManualBlocks> {
        Arc::clone(&self.built.lock().unwrap().last().unwrap().1)
    }
}

impl TransportFactory for ScriptedFactory {
    fn create_json_rpc_client(&self, rpc_url: &str) -> Result<NetworkClient, TransportError> {
        self.build(rpc_url)
    }

    fn create_localhost_client(&self) -> Result<NetworkClient, TransportError> {
        self.build(LOCALHOST.rpc_url)
    }
}

struct Harness {
    controller: NetworkController,
    factory: Arc<ScriptedFactory>,
    requests: mpsc::UnboundedReceiver<PendingRequest>,
}

impl Harness {
    fn new(options: NetworkOptions) -> Self {
        Self::with_registry(options, Arc::new(NetworkRegistry::new()))
    }

    fn with_registry(options: NetworkOptions, registry: Arc<NetworkRegistry>) -> Self {
        let (tx, requests) = mpsc::unbounded_channel();
        let factory = Arc::new(ScriptedFactory {
            requests: tx,
            built: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        });
        let controller = NetworkController::with_registry(options, factory.clone(), registry);
        Self {
            controller,
            factory,
            requests,
        }
    }

    async fn next_request(&mut self) -> PendingRequest {
        timeout(WAIT, self.requests.recv())
            .await
            .expect("no request reached the node")
            .expect("request channel closed")
    }

    /// Initialize and resolve the first probe with `raw`.
    async fn initialized(options: NetworkOptions, raw: Value) -> Self {
        let mut h = Self::new(options);
        h.controller.initialize(BaseParams::default()).unwrap();
        h.next_request().await.answer(raw);
        h.controller.settle().await;
        h
    }

    fn assert_no_request(&mut self) {
        assert!(self.requests.try_recv().is_err(), "unexpected request");
    }
}

async fn wait_resolved(controller: &NetworkController) -> NetworkIdentity {
    let mut rx = controller.watch_network();
    let resolved = timeout(WAIT, rx.wait_for(|id| !id.is_loading()))
        .await
        .expect("identity never resolved")
        .expect("network store dropped");
    resolved.clone()
}

fn options_for(network_type: NetworkType) -> NetworkOptions {
    NetworkOptions {
        provider: Some(ProviderConfig::builtin(network_type)),
        ..NetworkOptions::default()
    }
}

// ─── Initialization ──────────────────────────────────────────────────────────

#[tokio::test]
async fn initialize_with_default_config_resolves_mainnet() {
    let mut h = Harness::new(NetworkOptions::default());
    assert_eq!(h.controller.status(), ControllerStatus::Uninitialized);
    assert_eq!(h.controller.get_network_state(), "loading");

    h.controller.initialize(BaseParams::default()).unwrap();
    assert_eq!(h.controller.status(), ControllerStatus::Switching);

    let probe = h.next_request().await;
    assert_eq!(probe.url, MAINNET.rpc_url);
    assert_eq!(probe.method, "cfx_epochNumber");
    probe.answer(json!("0x2f"));
    h.controller.settle().await;

    assert_eq!(h.controller.get_network_state(), "0");
    assert_eq!(h.controller.status(), ControllerStatus::Ready);
    assert_eq!(h.factory.built_urls(), vec![MAINNET.rpc_url.to_string()]);
    assert_eq!(h.controller.get_network_config(), NetworkSettings::from(MAINNET.entry()));
}

#[tokio::test]
async fn lookup_without_provider_is_a_no_op() {
    let mut h = Harness::new(NetworkOptions::default());
    assert!(!h.controller.lookup_network());
    h.controller.verify_network();
    h.assert_no_request();
    assert_eq!(h.controller.get_network_state(), "loading");
}

#[tokio::test]
async fn unknown_persisted_type_fails_initialize() {
    let mut options = options_for(NetworkType::Mainnet);
    options.provider.as_mut().unwrap().network_type = NetworkType::from("ropsten");
    let mut h = Harness::new(options);

    let err = h.controller.initialize(BaseParams::default()).unwrap_err();
    assert!(matches!(err, NetworkError::UnknownNetworkType(t) if t == "ropsten"));
    assert_eq!(h.controller.status(), ControllerStatus::Uninitialized);
    h.assert_no_request();
}

// ─── Switching ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn testnet_identity_is_fixed_regardless_of_probe_value() {
    let mut h = Harness::initialized(NetworkOptions::default(), json!("0x1")).await;

    h.controller.set_provider_type(NetworkType::Testnet).unwrap();
    assert!(h.controller.is_network_loading());
    let probe = h.next_request().await;
    assert_eq!(probe.url, TESTNET.rpc_url);
    probe.answer(json!(12345));
    h.controller.settle().await;

    assert_eq!(h.controller.get_network_state(), "1");
    assert_eq!(h.controller.get_provider_config().network_type, NetworkType::Testnet);
    assert_eq!(h.controller.get_network_config().nickname.as_deref(), Some("testnet"));
}

#[tokio::test]
async fn localhost_passes_raw_probe_value_through() {
    let mut h = Harness::initialized(NetworkOptions::default(), json!("0x1")).await;

    h.controller.set_provider_type(NetworkType::Localhost).unwrap();
    let probe = h.next_request().await;
    assert_eq!(probe.url, LOCALHOST.rpc_url);
    probe.answer(json!("0x1a"));

    assert_eq!(wait_resolved(&h.controller).await, "0x1a");
    assert_eq!(h.controller.get_network_config().nickname.as_deref(), Some("localhost"));
}

#[tokio::test]
async fn rpc_target_sets_network_settings() {
    let mut h = Harness::initialized(NetworkOptions::default(), json!("0x1")).await;

    h.controller
        .set_rpc_target(RpcTarget::new("http://x", "7").ticker("TST").nickname("custom"))
        .unwrap();

    assert_eq!(
        serde_json::to_value(h.controller.get_network_config()).unwrap(),
        json!({ "network": "7", "rpcUrl": "http://x", "ticker": "TST", "nickname": "custom" })
    );

    let probe = h.next_request().await;
    assert_eq!(probe.url, "http://x");
    probe.answer(json!("0x99"));
    assert_eq!(wait_resolved(&h.controller).await, "7");

    let config = h.controller.get_provider_config();
    assert_eq!(config.network_type, NetworkType::Rpc);
    assert_eq!(config.chain_id.as_deref(), Some("7"));
}

#[tokio::test]
async fn provider_type_switch_keeps_stored_chain_id_and_preferences() {
    let mut h = Harness::initialized(NetworkOptions::default(), json!("0x1")).await;

    h.controller
        .set_rpc_target(RpcTarget::new("http://x", "7").rpc_preferences(json!({ "explorer": "http://scan" })))
        .unwrap();
    h.next_request().await.answer(json!("0x1"));
    h.controller.settle().await;

    h.controller
        .set_provider_type_with(ProviderConfigPatch {
            nickname: Some("main".into()),
            ..ProviderConfigPatch::new(NetworkType::Mainnet)
        })
        .unwrap();
    h.next_request().await.answer(json!("0x1"));
    h.controller.settle().await;

    let config = h.controller.get_provider_config();
    assert_eq!(config.network_type, NetworkType::Mainnet);
    assert_eq!(config.nickname.as_deref(), Some("main"));
    assert_eq!(config.chain_id.as_deref(), Some("7"));
    assert!(config.rpc_preferences.is_some());
    assert_eq!(h.controller.get_network_state(), "0");
}

#[tokio::test]
async fn network_changed_is_broadcast_per_switch() {
    let mut h = Harness::initialized(NetworkOptions::default(), json!("0x1")).await;
    let mut changes = h.controller.subscribe_network_changed();

    h.controller.set_provider_type(NetworkType::Testnet).unwrap();
    h.controller.set_rpc_target(RpcTarget::new("http://x", "7")).unwrap();

    assert_eq!(changes.recv().await.unwrap(), NetworkType::Testnet);
    assert_eq!(changes.recv().await.unwrap(), NetworkType::Rpc);

    h.next_request().await.answer(json!("0x1"));
    h.next_request().await.answer(json!("0x1"));
    h.controller.settle().await;
}

#[tokio::test]
async fn reset_connection_rebuilds_transport_without_changing_config() {
    let mut h = Harness::initialized(options_for(NetworkType::Testnet), json!("0x1")).await;
    let before = h.controller.get_provider_config();
    assert_eq!(h.factory.built_urls().len(), 1);

    h.controller.reset_connection().unwrap();
    assert_eq!(h.factory.built_urls(), vec![TESTNET.rpc_url.to_string(); 2]);
    assert_eq!(h.controller.get_provider_config(), before);
    assert!(h.controller.is_network_loading());

    h.next_request().await.answer(json!("0x1"));
    h.controller.settle().await;
    assert_eq!(h.controller.get_network_state(), "1");
}

#[tokio::test]
async fn composed_store_reports_every_step_of_a_switch() {
    let mut h = Harness::initialized(NetworkOptions::default(), json!("0x1")).await;
    let views = Arc::new(Mutex::new(Vec::<Value>::new()));
    let v = views.clone();
    h.controller
        .store()
        .subscribe(move |view: &Value| v.lock().unwrap().push(view.clone()));

    h.controller.set_provider_type(NetworkType::Testnet).unwrap();
    h.next_request().await.answer(json!("0x1"));
    h.controller.settle().await;

    let views = views.lock().unwrap();
    assert!(views
        .iter()
        .any(|view| view["provider"]["type"] == "testnet" && view["network"] == "loading"));

    let last = views.last().expect("no view delivered");
    assert_eq!(last["provider"]["type"], "testnet");
    assert_eq!(last["network"], "1");
    assert_eq!(
        last["settings"],
        serde_json::to_value(NetworkSettings::from(TESTNET.entry())).unwrap()
    );
    assert_eq!(*last, h.controller.store().get());
}

// ─── Preconditions and failures ──────────────────────────────────────────────

#[tokio::test]
async fn rejected_provider_types_leave_state_untouched() {
    let mut h = Harness::initialized(NetworkOptions::default(), json!("0x1")).await;
    let notified = Arc::new(Mutex::new(0usize));
    let n = notified.clone();
    h.controller.store().subscribe(move |_: &Value| *n.lock().unwrap() += 1);
    let before = h.controller.get_provider_config();

    let err = h.controller.set_provider_type(NetworkType::Rpc).unwrap_err();
    assert!(err.is_precondition());
    assert!(err.to_string().contains("set_rpc_target"));

    let err = h
        .controller
        .set_provider_type(NetworkType::from("ropsten"))
        .unwrap_err();
    assert!(err.is_precondition());
    assert!(err.to_string().contains("ropsten"));

    let err = h.controller.set_rpc_target(RpcTarget::new("", "7")).unwrap_err();
    assert!(err.is_precondition());

    assert_eq!(h.controller.get_provider_config(), before);
    assert_eq!(h.controller.get_network_state(), "0");
    assert_eq!(*notified.lock().unwrap(), 0);
    assert_eq!(h.factory.built_urls().len(), 1);
    h.assert_no_request();
}

#[tokio::test]
async fn probe_failure_keeps_loading_and_degrades() {
    let mut h = Harness::new(NetworkOptions::default());
    h.controller.initialize(BaseParams::default()).unwrap();
    h.next_request().await.fail("connection refused");
    h.controller.settle().await;

    assert_eq!(h.controller.get_network_state(), "loading");
    assert_eq!(h.controller.status(), ControllerStatus::Degraded);

    h.controller.verify_network();
    h.next_request().await.answer(json!("0x1"));
    h.controller.settle().await;
    assert_eq!(h.controller.status(), ControllerStatus::Ready);

    // Already resolved: nothing to verify.
    h.controller.verify_network();
    h.assert_no_request();
}

#[tokio::test]
async fn construction_failure_keeps_previous_transport() {
    let mut h = Harness::initialized(NetworkOptions::default(), json!("0x1")).await;
    let (provider, _) = h.controller.get_provider_and_block_tracker();

    h.factory.fail_next.store(true, Ordering::SeqCst);
    let err = h
        .controller
        .set_rpc_target(RpcTarget::new("http://bad", "3"))
        .unwrap_err();
    assert!(matches!(err, NetworkError::TransportConstruction(_)));

    assert_eq!(provider.url(), MAINNET.rpc_url);
    assert_eq!(h.factory.built_urls().len(), 1);
    h.assert_no_request();
}

#[tokio::test]
async fn failed_switch_resolves_identity_of_the_still_bound_network() {
    let mut h = Harness::initialized(NetworkOptions::default(), json!("0x1")).await;
    let mainnet_blocks = h.factory.latest_blocks();

    h.factory.fail_next.store(true, Ordering::SeqCst);
    h.controller
        .set_rpc_target(RpcTarget::new("http://bad", "3"))
        .unwrap_err();
    assert_eq!(h.controller.get_provider_config().network_type, NetworkType::Rpc);
    assert!(h.controller.is_network_loading());

    // A new head on the old tracker re-runs the lookup through the old transport.
    mainnet_blocks.emit(BlockEvent::Latest { epoch: 10 });
    let request = h.next_request().await;
    assert_eq!(request.url, MAINNET.rpc_url);
    request.answer(json!("0x1"));
    h.controller.settle().await;

    assert_eq!(h.controller.get_network_state(), "0");
    assert_eq!(h.controller.status(), ControllerStatus::Ready);
    assert_eq!(h.controller.get_network_config(), NetworkSettings::from(MAINNET.entry()));
}

#[tokio::test]
async fn failed_custom_switch_keeps_chain_id_of_the_bound_endpoint() {
    let mut h = Harness::initialized(NetworkOptions::default(), json!("0x1")).await;
    h.controller.set_rpc_target(RpcTarget::new("http://a", "7")).unwrap();
    h.next_request().await.answer(json!("0x1"));
    h.controller.settle().await;

    h.factory.fail_next.store(true, Ordering::SeqCst);
    h.controller
        .set_rpc_target(RpcTarget::new("http://bad", "3"))
        .unwrap_err();
    assert_eq!(h.controller.registry().chain_id(&NetworkType::Rpc).as_deref(), Some("3"));

    h.controller.verify_network();
    let request = h.next_request().await;
    assert_eq!(request.url, "http://a");
    request.answer(json!("0x1"));
    h.controller.settle().await;

    assert_eq!(h.controller.get_network_state(), "7");
}

// ─── Stable handles ──────────────────────────────────────────────────────────

#[tokio::test]
async fn handles_keep_identity_across_switches() {
    let mut h = Harness::new(NetworkOptions::default());
    let (provider, blocks) = h.controller.get_provider_and_block_tracker();

    let err = provider
        .send(JsonRpcRequest::new(1, "cfx_epochNumber", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Uninitialized { .. }));

    h.controller.initialize(BaseParams::default()).unwrap();
    h.next_request().await.answer(json!("0x1"));
    for network_type in [NetworkType::Testnet, NetworkType::Localhost] {
        h.controller.set_provider_type(network_type).unwrap();
        h.next_request().await.answer(json!("0x1"));
    }
    h.controller.settle().await;

    let (again, blocks_again) = h.controller.get_provider_and_block_tracker();
    assert!(provider.ptr_eq(&again));
    assert!(blocks.ptr_eq(&blocks_again));
    assert_eq!(provider.url(), LOCALHOST.rpc_url);

    let call = tokio::spawn(async move { provider.call::<String>(9, "cfx_getStatus", vec![]).await });
    let request = h.next_request().await;
    assert_eq!((request.url.as_str(), request.method.as_str()), (LOCALHOST.rpc_url, "cfx_getStatus"));
    request.answer(json!("ok"));
    assert_eq!(call.await.unwrap().unwrap(), "ok");
}

#[tokio::test]
async fn base_layer_answers_client_version_locally() {
    let mut h = Harness::new(NetworkOptions::default());
    h.controller
        .initialize(BaseParams {
            client_version: "wallet/9".into(),
            ..BaseParams::default()
        })
        .unwrap();
    h.next_request().await.answer(json!("0x1"));
    h.controller.settle().await;

    let (provider, _) = h.controller.get_provider_and_block_tracker();
    let version: String = provider.call(1, "web3_clientVersion", vec![]).await.unwrap();
    assert_eq!(version, "wallet/9");
    h.assert_no_request();
}

#[tokio::test]
async fn block_listeners_follow_the_current_tracker() {
    let mut h = Harness::new(NetworkOptions::default());
    let (_, blocks) = h.controller.get_provider_and_block_tracker();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    blocks.on(Arc::new(move |e: &BlockEvent| s.lock().unwrap().push(e.clone())));

    h.controller.initialize(BaseParams::default()).unwrap();
    h.next_request().await.fail("offline");
    h.controller.settle().await;
    let first = h.factory.latest_blocks();

    // A new head while loading triggers another identity lookup.
    first.emit(BlockEvent::Started);
    first.emit(BlockEvent::Latest { epoch: 5 });
    h.next_request().await.answer(json!("0x5"));
    h.controller.settle().await;
    assert_eq!(h.controller.get_network_state(), "0");

    h.controller.set_provider_type(NetworkType::Testnet).unwrap();
    h.next_request().await.answer(json!("0x1"));
    h.controller.settle().await;
    let second = h.factory.latest_blocks();
    assert_eq!(first.listener_count(), 0);
    assert_eq!(second.listener_count(), 2);

    second.emit(BlockEvent::Latest { epoch: 6 });
    h.assert_no_request();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![BlockEvent::Latest { epoch: 5 }, BlockEvent::Latest { epoch: 6 }]
    );
}

// ─── Stale probes ────────────────────────────────────────────────────────────

#[tokio::test]
async fn stale_probe_never_overwrites_newer_identity() {
    let mut h = Harness::initialized(NetworkOptions::default(), json!("0x1")).await;

    h.controller.set_provider_type(NetworkType::Testnet).unwrap();
    let probe_a = h.next_request().await;
    h.controller.set_rpc_target(RpcTarget::new("http://b", "9")).unwrap();
    let probe_b = h.next_request().await;
    assert_eq!((probe_a.url.as_str(), probe_b.url.as_str()), (TESTNET.rpc_url, "http://b"));

    probe_b.answer(json!("0x1"));
    assert_eq!(wait_resolved(&h.controller).await, "9");

    probe_a.answer(json!("0x1"));
    h.controller.settle().await;
    assert_eq!(h.controller.get_network_state(), "9");
}

#[tokio::test]
async fn stale_probe_is_dropped_while_both_switches_are_loading() {
    let mut h = Harness::initialized(NetworkOptions::default(), json!("0x1")).await;

    h.controller.set_provider_type(NetworkType::Testnet).unwrap();
    let probe_a = h.next_request().await;
    h.controller.set_provider_type(NetworkType::Localhost).unwrap();
    let probe_b = h.next_request().await;

    // Had the testnet probe committed "1", the localhost failure below
    // would be discarded and the controller would report Ready.
    probe_a.answer(json!("0x1"));
    probe_b.fail("connection refused");
    h.controller.settle().await;

    assert_eq!(h.controller.get_network_state(), "loading");
    assert_eq!(h.controller.status(), ControllerStatus::Degraded);
}

// ─── Registry ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn registry_can_be_shared_between_controllers() {
    let registry = Arc::new(NetworkRegistry::new());
    let mut first = Harness::with_registry(NetworkOptions::default(), Arc::clone(&registry));
    let second = Harness::with_registry(NetworkOptions::default(), Arc::clone(&registry));

    first.controller.initialize(BaseParams::default()).unwrap();
    first.next_request().await.answer(json!("0x1"));
    first
        .controller
        .set_rpc_target(RpcTarget::new("http://x", "7"))
        .unwrap();
    first.next_request().await.answer(json!("0x1"));
    first.controller.settle().await;

    assert_eq!(second.controller.registry().chain_id(&NetworkType::Rpc).as_deref(), Some("7"));
}

#[tokio::test]
async fn only_the_last_custom_endpoint_is_remembered() {
    let mut h = Harness::initialized(NetworkOptions::default(), json!("0x1")).await;

    for (url, chain) in [("http://a", "7"), ("http://b", "8")] {
        h.controller.set_rpc_target(RpcTarget::new(url, chain)).unwrap();
        h.next_request().await.answer(json!("0x1"));
    }
    h.controller.settle().await;

    let entry = h.controller.registry().get(&NetworkType::Rpc).unwrap();
    assert_eq!((entry.rpc_url.as_str(), entry.chain_id.as_deref()), ("http://b", Some("8")));
}
