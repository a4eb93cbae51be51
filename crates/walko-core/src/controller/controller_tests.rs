use super::*;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::json;
use walko_protocols::{
    BeaconMount, ButtonAction, CardKind, CardMount, Clock, ElementHandle, ElementRect, HighlightMount,
    HostError, KeyValueStorage, MountSpec, SourceError, StorageError, TooltipDefinition,
    TourDefinition, ViewRecord,
};

use crate::history::{HistoryStore, MemoryStorage};
use crate::static_source::{ContentBundle, StaticContentSource};

const URL: &str = "https://app.test/home";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Recording host
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Attach(Layer),
    Mount(Layer, NodeId),
    Update(NodeId, MountSpec),
    Unmount(NodeId),
    Clear(Layer),
}

struct FakeHost {
    url: String,
    viewport: Viewport,
    elements: Mutex<HashMap<String, ElementRect>>,
    calls: Mutex<Vec<Call>>,
    live: Mutex<BTreeMap<NodeId, (Layer, MountSpec)>>,
}

impl FakeHost {
    fn new() -> Self {
        Self {
            url: URL.to_string(),
            viewport: Viewport::new(1280.0, 720.0),
            elements: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            live: Mutex::new(BTreeMap::new()),
        }
    }

    fn with_element(self, selector: &str, rect: ElementRect) -> Self {
        self.set_element(selector, rect);
        self
    }

    fn set_element(&self, selector: &str, rect: ElementRect) {
        self.elements.lock().insert(selector.to_string(), rect);
    }

    fn live_specs(&self) -> Vec<(NodeId, MountSpec)> {
        self.live
            .lock()
            .iter()
            .map(|(id, (_, spec))| (*id, spec.clone()))
            .collect()
    }

    fn cards(&self) -> Vec<CardMount> {
        self.live_specs()
            .into_iter()
            .filter_map(|(_, spec)| match spec {
                MountSpec::Card(card) => Some(card),
                _ => None,
            })
            .collect()
    }

    fn card(&self) -> CardMount {
        let cards = self.cards();
        assert_eq!(cards.len(), 1, "expected exactly one card, got {:?}", cards);
        cards.into_iter().next().unwrap()
    }

    fn beacons(&self) -> Vec<(NodeId, BeaconMount)> {
        self.live_specs()
            .into_iter()
            .filter_map(|(id, spec)| match spec {
                MountSpec::Beacon(beacon) => Some((id, beacon)),
                _ => None,
            })
            .collect()
    }

    fn beacon_node(&self, content_id: &str) -> NodeId {
        self.beacons()
            .into_iter()
            .find(|(_, b)| b.content_id == content_id)
            .map(|(id, _)| id)
            .unwrap_or_else(|| panic!("no beacon for {}", content_id))
    }

    fn highlights(&self) -> Vec<HighlightMount> {
        self.live_specs()
            .into_iter()
            .filter_map(|(_, spec)| match spec {
                MountSpec::Highlight(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    fn button(&self, action: ButtonAction) -> NodeId {
        self.cards()
            .iter()
            .flat_map(|c| c.buttons.iter())
            .find(|b| b.action == action)
            .map(|b| b.node)
            .unwrap_or_else(|| panic!("no {:?} button", action))
    }

    fn has_button(&self, action: ButtonAction) -> bool {
        self.cards()
            .iter()
            .flat_map(|c| c.buttons.iter())
            .any(|b| b.action == action)
    }

    fn is_empty(&self) -> bool {
        self.live.lock().is_empty()
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn mount_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Mount(..)))
            .count()
    }
}

#[async_trait]
impl DomHost for FakeHost {
    fn surface(&self) -> &str {
        "test"
    }

    async fn current_url(&self) -> Result<String, HostError> {
        Ok(self.url.clone())
    }

    async fn viewport(&self) -> Result<Viewport, HostError> {
        Ok(self.viewport)
    }

    async fn browser_language(&self) -> Result<Option<String>, HostError> {
        Ok(Some("de-DE".to_string()))
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<ElementHandle>, HostError> {
        if selector.contains("[[") {
            return Err(HostError::InvalidSelector(selector.to_string()));
        }
        Ok(self
            .elements
            .lock()
            .contains_key(selector)
            .then(|| ElementHandle(selector.to_string())))
    }

    async fn bounding_rect(&self, element: &ElementHandle) -> Result<Option<ElementRect>, HostError> {
        Ok(self.elements.lock().get(&element.0).copied())
    }

    async fn attach_root(&self, layer: Layer) -> Result<(), HostError> {
        self.calls.lock().push(Call::Attach(layer));
        Ok(())
    }

    async fn mount(&self, layer: Layer, node: NodeId, spec: &MountSpec) -> Result<(), HostError> {
        self.calls.lock().push(Call::Mount(layer, node));
        self.live.lock().insert(node, (layer, spec.clone()));
        Ok(())
    }

    async fn update(&self, node: NodeId, spec: &MountSpec) -> Result<(), HostError> {
        self.calls.lock().push(Call::Update(node, spec.clone()));
        match self.live.lock().get_mut(&node) {
            Some(entry) => {
                entry.1 = spec.clone();
                Ok(())
            }
            None => Err(HostError::UnknownNode(node.0)),
        }
    }

    async fn unmount(&self, node: NodeId) -> Result<(), HostError> {
        self.calls.lock().push(Call::Unmount(node));
        self.live.lock().remove(&node);
        Ok(())
    }

    async fn clear_layer(&self, layer: Layer) -> Result<(), HostError> {
        self.calls.lock().push(Call::Clear(layer));
        self.live.lock().retain(|_, (l, _)| *l != layer);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Storage, clock and sources
// ---------------------------------------------------------------------------

#[derive(Default)]
struct CountingStorage {
    inner: MemoryStorage,
    writes: AtomicUsize,
}

impl CountingStorage {
    async fn preset(&self, key: &str, record: ViewRecord) {
        let raw = serde_json::to_string(&record).unwrap();
        self.inner.set(key, raw).await.unwrap();
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn record(&self, key: &str) -> ViewRecord {
        self.inner
            .snapshot()
            .get(key)
            .map(|raw| serde_json::from_str(raw).unwrap())
            .unwrap_or_default()
    }
}

#[async_trait]
impl KeyValueStorage for CountingStorage {
    fn id(&self) -> &str {
        "counting"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key).await
    }
}

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        now()
    }
}

/// Tooltips arrive a minute late; tours are immediate.
struct SlowTooltips(StaticContentSource);

#[async_trait]
impl ContentSource for SlowTooltips {
    fn id(&self) -> &str {
        "slow"
    }

    async fn fetch_tours(&self, url: &str, lang: &str) -> Result<Vec<TourDefinition>, SourceError> {
        self.0.fetch_tours(url, lang).await
    }

    async fn fetch_tooltips(
        &self,
        url: &str,
        lang: &str,
    ) -> Result<Vec<TooltipDefinition>, SourceError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        self.0.fetch_tooltips(url, lang).await
    }
}

struct FailingSource;

#[async_trait]
impl ContentSource for FailingSource {
    fn id(&self) -> &str {
        "failing"
    }

    async fn fetch_tours(&self, _: &str, _: &str) -> Result<Vec<TourDefinition>, SourceError> {
        Err(SourceError::Network("offline".into()))
    }

    async fn fetch_tooltips(&self, _: &str, _: &str) -> Result<Vec<TooltipDefinition>, SourceError> {
        Err(SourceError::http(503, "unavailable"))
    }
}

// ---------------------------------------------------------------------------
// Fixtures and harness
// ---------------------------------------------------------------------------

fn rect_a() -> ElementRect {
    ElementRect::new(100.0, 100.0, 200.0, 40.0)
}

fn rect_b() -> ElementRect {
    ElementRect::new(300.0, 400.0, 100.0, 40.0)
}

fn page() -> FakeHost {
    FakeHost::new()
        .with_element("#a", rect_a())
        .with_element("#b", rect_b())
}

fn two_step_tour() -> TourDefinition {
    serde_json::from_value(json!({
        "id": "t1",
        "name": "Intro",
        "urlPattern": "https://app.test/*",
        "frequencyType": "once",
        "steps": [
            {"selector": "#b", "title": "Two", "content": "second", "stepOrder": 2},
            {"selector": "#a", "title": "Hi {{firstName}}", "content": "first", "stepOrder": 1,
             "pulseEnabled": true}
        ]
    }))
    .unwrap()
}

fn tour_with_selectors(id: &str, selectors: &[&str]) -> TourDefinition {
    let steps: Vec<_> = selectors
        .iter()
        .enumerate()
        .map(|(i, s)| json!({"selector": s, "title": format!("Step {}", i + 1), "stepOrder": i}))
        .collect();
    serde_json::from_value(json!({"id": id, "urlPattern": "", "steps": steps})).unwrap()
}

fn tooltip(fields: serde_json::Value) -> TooltipDefinition {
    let mut base = json!({
        "id": "tip",
        "urlPattern": URL,
        "selector": "#a",
        "title": "Tip",
        "content": "Try this",
        "frequencyType": "always"
    });
    if let (Some(base), Some(fields)) = (base.as_object_mut(), fields.as_object()) {
        for (k, v) in fields {
            base.insert(k.clone(), v.clone());
        }
    }
    serde_json::from_value(base).unwrap()
}

fn bundle(tours: Vec<TourDefinition>, tooltips: Vec<TooltipDefinition>) -> ContentBundle {
    ContentBundle { tours, tooltips }
}

/// Let every ready task run. Timers further out than 1ms stay pending.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

struct Harness {
    host: Arc<FakeHost>,
    storage: Arc<CountingStorage>,
    events: mpsc::Sender<HostEvent>,
    task: JoinHandle<Result<(), ControllerError>>,
}

impl Harness {
    async fn start(host: FakeHost, content: ContentBundle) -> Self {
        Self::start_with(host, Arc::new(StaticContentSource::new(content)), Arc::default()).await
    }

    async fn start_with(
        host: FakeHost,
        content: Arc<dyn ContentSource>,
        storage: Arc<CountingStorage>,
    ) -> Self {
        let host = Arc::new(host);
        let history = Arc::new(HistoryStore::local(storage.clone()));
        let gate = Arc::new(FrequencyGate::new(history, Arc::new(FixedClock)));
        let options = ControllerOptions {
            visitor: VisitorConfig {
                first_name: Some("Ann".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let controller = RenderController::new(host.clone(), content, gate, options);
        let (events, rx) = mpsc::channel(16);
        let task = controller.spawn(rx);
        settle().await;
        Self {
            host,
            storage,
            events,
            task,
        }
    }

    async fn send(&self, event: HostEvent) {
        self.events.send(event).await.unwrap();
        settle().await;
    }

    async fn click(&self, node: NodeId) {
        self.send(HostEvent::Clicked {
            node: Some(node),
            x: -1.0,
            y: -1.0,
        })
        .await;
    }

    async fn click_at(&self, x: f64, y: f64) {
        self.send(HostEvent::Clicked { node: None, x, y }).await;
    }

    async fn close(self) -> Result<(), ControllerError> {
        self.events.send(HostEvent::Closed).await.unwrap();
        self.task.await.unwrap()
    }
}

async fn storage_with(key: &str, record: ViewRecord) -> Arc<CountingStorage> {
    let storage = Arc::new(CountingStorage::default());
    storage.preset(key, record).await;
    storage
}

// ---------------------------------------------------------------------------
// Tours
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_tour_completion_records_once() {
    let h = Harness::start(page(), bundle(vec![two_step_tour()], vec![])).await;

    let card = h.host.card();
    assert_eq!(card.title, "Hi Ann");
    assert_eq!(card.kind, CardKind::TourStep { step_index: 0, step_count: 2 });
    assert!(!card.centered);
    assert!(!h.host.has_button(ButtonAction::Prev));
    let highlights = h.host.highlights();
    assert_eq!(highlights.len(), 1);
    assert_eq!(highlights[0].rect, rect_a());
    assert!(highlights[0].pulsing);

    h.click(h.host.button(ButtonAction::Next)).await;
    let card = h.host.card();
    assert_eq!(card.title, "Two");
    assert_eq!(card.kind, CardKind::TourStep { step_index: 1, step_count: 2 });
    assert!(h.host.has_button(ButtonAction::Prev));
    assert_eq!(h.storage.writes(), 0);

    h.click(h.host.button(ButtonAction::Finish)).await;
    assert!(h.host.is_empty());
    assert_eq!(h.storage.writes(), 1);
    assert_eq!(h.storage.record("walko_tour_t1").view_count, 1);

    h.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_tour_skip_records_nothing() {
    let h = Harness::start(page(), bundle(vec![two_step_tour()], vec![])).await;

    h.click(h.host.button(ButtonAction::Skip)).await;
    assert!(h.host.is_empty());
    assert!(h.host.calls().contains(&Call::Clear(Layer::Tours)));
    assert_eq!(h.storage.writes(), 0);
    assert_eq!(h.storage.record("walko_tour_t1").view_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_tour_prev_returns_to_previous_step() {
    let h = Harness::start(page(), bundle(vec![two_step_tour()], vec![])).await;

    h.click(h.host.button(ButtonAction::Next)).await;
    h.click(h.host.button(ButtonAction::Prev)).await;
    assert_eq!(
        h.host.card().kind,
        CardKind::TourStep { step_index: 0, step_count: 2 }
    );
    assert_eq!(h.host.highlights().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_seen_tour_is_not_shown() {
    let storage = storage_with("walko_tour_t1", ViewRecord::new(1, Some(now()))).await;
    let content = Arc::new(StaticContentSource::new(bundle(vec![two_step_tour()], vec![])));
    let h = Harness::start_with(page(), content, storage).await;

    assert!(h.host.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_only_first_eligible_tour_plays() {
    let storage = storage_with("walko_tour_t1", ViewRecord::new(1, Some(now()))).await;
    let content = Arc::new(StaticContentSource::new(bundle(
        vec![
            two_step_tour(),
            tour_with_selectors("t2", &["#a"]),
            tour_with_selectors("t3", &["#b"]),
        ],
        vec![],
    )));
    let h = Harness::start_with(page(), content, storage).await;

    assert_eq!(h.host.card().content_id, "t2");
}

#[tokio::test(start_paused = true)]
async fn test_non_positional_steps_render_centered() {
    let tour = tour_with_selectors("c", &["", "<div class=\"hero\">"]);
    let h = Harness::start(page(), bundle(vec![tour], vec![])).await;

    let card = h.host.card();
    assert!(card.centered);
    assert!(h.host.highlights().is_empty());

    h.click(h.host.button(ButtonAction::Next)).await;
    assert!(h.host.card().centered);
    assert!(h.host.highlights().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_selector_centers_without_retry() {
    let tour = tour_with_selectors("bad", &["div[[oops"]);
    let h = Harness::start(page(), bundle(vec![tour], vec![])).await;

    assert!(h.host.card().centered);
}

#[tokio::test(start_paused = true)]
async fn test_missing_anchor_retries_once_then_anchors() {
    let tour = tour_with_selectors("late", &["#late"]);
    let h = Harness::start(page(), bundle(vec![tour], vec![])).await;

    assert!(h.host.is_empty());
    h.host.set_element("#late", rect_b());

    tokio::time::sleep(Duration::from_millis(1000)).await;
    let card = h.host.card();
    assert!(!card.centered);
    assert_eq!(h.host.highlights()[0].rect, rect_b());
}

#[tokio::test(start_paused = true)]
async fn test_missing_anchor_falls_back_to_centered() {
    let tour = tour_with_selectors("late", &["#never"]);
    let h = Harness::start(page(), bundle(vec![tour], vec![])).await;

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(h.host.is_empty());
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(h.host.card().centered);
    assert!(h.host.highlights().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_resize_repositions_tour_card() {
    let host = FakeHost::new().with_element("#edge", ElementRect::new(100.0, 1200.0, 80.0, 40.0));
    let tour = tour_with_selectors("e", &["#edge"]);
    let h = Harness::start(host, bundle(vec![tour], vec![])).await;

    assert_eq!(h.host.card().position.left, 1280.0 - 320.0 - 12.0);
    h.send(HostEvent::Resized {
        viewport: Viewport::new(1000.0, 720.0),
    })
    .await;
    assert_eq!(h.host.card().position.left, 1000.0 - 320.0 - 12.0);
}

#[tokio::test(start_paused = true)]
async fn test_content_failure_shows_nothing() {
    let h = Harness::start_with(page(), Arc::new(FailingSource), Arc::default()).await;
    assert!(h.host.is_empty());
    h.close().await.unwrap();
}

// ---------------------------------------------------------------------------
// Tooltips
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_tooltip_count_policy_dismissal() {
    let storage = storage_with("walko_tooltip_tip", ViewRecord::new(2, None)).await;
    let tip = tooltip(json!({"frequencyType": "count", "frequencyCount": 3}));
    let content = Arc::new(StaticContentSource::new(bundle(vec![], vec![tip])));
    let h = Harness::start_with(page(), content, storage).await;

    let beacons = h.host.beacons();
    assert_eq!(beacons.len(), 1);
    assert_eq!(beacons[0].1.position.top, 100.0 + 20.0 - 8.0);
    assert_eq!(beacons[0].1.position.left, 300.0 - 8.0);

    h.click(h.host.beacon_node("tip")).await;
    assert_eq!(h.host.card().kind, CardKind::Tooltip);

    h.click(h.host.button(ButtonAction::Dismiss)).await;
    assert!(h.host.cards().is_empty());
    assert!(h.host.beacons().is_empty());
    assert_eq!(h.storage.record("walko_tooltip_tip").view_count, 3);
    assert_eq!(h.storage.writes(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_always_tooltip_keeps_beacon_after_dismiss() {
    let h = Harness::start(page(), bundle(vec![], vec![tooltip(json!({}))])).await;

    h.click(h.host.beacon_node("tip")).await;
    h.click(h.host.button(ButtonAction::Dismiss)).await;
    assert!(h.host.cards().is_empty());
    assert_eq!(h.host.beacons().len(), 1);
    assert_eq!(h.storage.record("walko_tooltip_tip").view_count, 1);

    // Reopen and dismiss again: every dismissal records.
    h.click(h.host.beacon_node("tip")).await;
    h.click(h.host.button(ButtonAction::Dismiss)).await;
    assert_eq!(h.storage.record("walko_tooltip_tip").view_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_days_cooldown_gates_tooltip() {
    let tip = tooltip(json!({"frequencyType": "days", "frequencyDays": 7}));

    let recent = ViewRecord::new(1, Some(now() - chrono::Duration::days(6)));
    let storage = storage_with("walko_tooltip_tip", recent).await;
    let content = Arc::new(StaticContentSource::new(bundle(vec![], vec![tip.clone()])));
    let h = Harness::start_with(page(), content, storage).await;
    assert!(h.host.beacons().is_empty());

    let old = ViewRecord::new(1, Some(now() - chrono::Duration::days(8)));
    let storage = storage_with("walko_tooltip_tip", old).await;
    let content = Arc::new(StaticContentSource::new(bundle(vec![], vec![tip])));
    let h = Harness::start_with(page(), content, storage).await;
    assert_eq!(h.host.beacons().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_beacon_guard() {
    let tip = tooltip(json!({}));
    let h = Harness::start(page(), bundle(vec![], vec![tip.clone(), tip])).await;
    assert_eq!(h.host.beacons().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_tooltip_delay() {
    let tip = tooltip(json!({"delayMs": 500}));
    let h = Harness::start(page(), bundle(vec![], vec![tip])).await;

    assert!(h.host.beacons().is_empty());
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(h.host.beacons().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_tooltip_retry_finds_late_element() {
    let tip = tooltip(json!({"selector": "#late"}));
    let h = Harness::start(page(), bundle(vec![], vec![tip])).await;

    assert!(h.host.beacons().is_empty());
    h.host.set_element("#late", rect_b());
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(h.host.beacons().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_tooltip_skipped_when_unresolvable() {
    let tips = vec![
        tooltip(json!({"id": "missing", "selector": "#never"})),
        tooltip(json!({"id": "blank", "selector": "  "})),
        tooltip(json!({"id": "markup", "selector": "<b>x</b>"})),
        tooltip(json!({"id": "invalid", "selector": "a[[b"})),
    ];
    let h = Harness::start(page(), bundle(vec![], tips)).await;

    tokio::time::sleep(Duration::from_millis(3000)).await;
    assert!(h.host.is_empty());
    assert_eq!(h.host.mount_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_hover_trigger_opens_on_pointer_enter() {
    let tip = tooltip(json!({"triggerType": "hover"}));
    let h = Harness::start(page(), bundle(vec![], vec![tip])).await;

    let beacon = h.host.beacon_node("tip");
    h.click(beacon).await;
    assert!(h.host.cards().is_empty());

    h.send(HostEvent::PointerEntered { node: beacon }).await;
    assert_eq!(h.host.cards().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_opening_a_card_closes_the_other_without_recording() {
    let tips = vec![
        tooltip(json!({"id": "one"})),
        tooltip(json!({"id": "two", "selector": "#b"})),
    ];
    let h = Harness::start(page(), bundle(vec![], tips)).await;

    h.click(h.host.beacon_node("one")).await;
    assert_eq!(h.host.card().content_id, "one");

    h.click(h.host.beacon_node("two")).await;
    assert_eq!(h.host.card().content_id, "two");
    assert_eq!(h.host.beacons().len(), 2);
    assert_eq!(h.storage.writes(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_opening_another_card_dismisses_click_outside_card() {
    let tips = vec![
        tooltip(json!({"id": "one", "dismissType": "click_outside", "frequencyType": "once"})),
        tooltip(json!({"id": "two", "selector": "#b"})),
    ];
    let h = Harness::start(page(), bundle(vec![], tips)).await;

    h.click(h.host.beacon_node("one")).await;
    assert_eq!(h.host.card().content_id, "one");

    h.click(h.host.beacon_node("two")).await;
    assert_eq!(h.host.card().content_id, "two");
    assert_eq!(h.storage.record("walko_tooltip_one").view_count, 1);
    assert_eq!(h.host.beacons().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_tour_button_dismisses_click_outside_card() {
    let tip = tooltip(json!({"dismissType": "click_outside", "selector": "#b"}));
    let h = Harness::start(page(), bundle(vec![two_step_tour()], vec![tip])).await;

    h.click(h.host.beacon_node("tip")).await;
    assert_eq!(h.host.cards().len(), 2);

    h.click(h.host.button(ButtonAction::Skip)).await;
    assert!(h.host.cards().is_empty());
    assert_eq!(h.storage.record("walko_tooltip_tip").view_count, 1);
    assert_eq!(h.storage.writes(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_click_outside_dismissal() {
    let tip = tooltip(json!({"dismissType": "click_outside", "frequencyType": "once"}));
    let h = Harness::start(page(), bundle(vec![], vec![tip])).await;

    h.click(h.host.beacon_node("tip")).await;
    let card = h.host.card();
    assert!(card.buttons.is_empty());

    h.click_at(card.position.left + 10.0, card.position.top + 10.0).await;
    assert_eq!(h.host.cards().len(), 1);
    assert_eq!(h.storage.writes(), 0);

    h.click_at(1270.0, 710.0).await;
    assert!(h.host.cards().is_empty());
    assert_eq!(h.storage.record("walko_tooltip_tip").view_count, 1);
    assert!(h.host.beacons().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_click_element_dismissal() {
    let tip = tooltip(json!({"dismissType": "click_element"}));
    let h = Harness::start(page(), bundle(vec![], vec![tip])).await;

    h.click(h.host.beacon_node("tip")).await;
    h.click_at(1000.0, 600.0).await;
    assert_eq!(h.host.cards().len(), 1);

    h.click_at(150.0, 120.0).await;
    assert!(h.host.cards().is_empty());
    assert_eq!(h.storage.record("walko_tooltip_tip").view_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_scroll_moves_beacon() {
    let h = Harness::start(page(), bundle(vec![], vec![tooltip(json!({}))])).await;

    h.host.set_element("#a", ElementRect::new(50.0, 100.0, 200.0, 40.0));
    h.send(HostEvent::Scrolled).await;

    let (_, beacon) = h.host.beacons().into_iter().next().unwrap();
    assert_eq!(beacon.position.top, 50.0 + 20.0 - 8.0);
    assert!(h
        .host
        .calls()
        .iter()
        .any(|c| matches!(c, Call::Update(_, MountSpec::Beacon(_)))));
}

// ---------------------------------------------------------------------------
// Concurrency, navigation and shutdown
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_slow_tooltips_do_not_block_tours() {
    let content = Arc::new(SlowTooltips(StaticContentSource::new(bundle(
        vec![two_step_tour()],
        vec![tooltip(json!({}))],
    ))));
    let h = Harness::start_with(page(), content, Arc::default()).await;

    assert_eq!(h.host.cards().len(), 1);
    assert!(h.host.beacons().is_empty());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.host.beacons().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_navigation_tears_down_everything() {
    let mut tour = two_step_tour();
    tour.url_pattern = URL.to_string();
    let h = Harness::start(page(), bundle(vec![tour], vec![tooltip(json!({}))])).await;
    assert_eq!(h.host.cards().len(), 1);
    assert_eq!(h.host.beacons().len(), 1);

    h.send(HostEvent::Navigated {
        url: "https://app.test/settings".into(),
    })
    .await;
    assert!(h.host.is_empty());
    let calls = h.host.calls();
    assert!(calls.contains(&Call::Clear(Layer::Tours)));
    assert!(calls.contains(&Call::Clear(Layer::Tooltips)));
    assert_eq!(h.storage.writes(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_same_url_navigation_is_ignored() {
    let h = Harness::start(page(), bundle(vec![two_step_tour()], vec![tooltip(json!({}))])).await;
    let mounts = h.host.mount_count();

    h.send(HostEvent::Navigated { url: URL.into() }).await;
    assert_eq!(h.host.mount_count(), mounts);
    assert_eq!(h.host.beacons().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_navigation_restarts_tour_from_first_step() {
    let h = Harness::start(page(), bundle(vec![two_step_tour()], vec![])).await;
    h.click(h.host.button(ButtonAction::Next)).await;

    h.send(HostEvent::Navigated {
        url: "https://app.test/other".into(),
    })
    .await;
    assert_eq!(
        h.host.card().kind,
        CardKind::TourStep { step_index: 0, step_count: 2 }
    );
}

#[tokio::test(start_paused = true)]
async fn test_stale_timers_are_dropped_after_navigation() {
    let tip = tooltip(json!({"delayMs": 500}));
    let h = Harness::start(page(), bundle(vec![], vec![tip])).await;

    h.send(HostEvent::Navigated {
        url: "https://app.test/settings".into(),
    })
    .await;
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(h.host.beacons().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_close_tears_down_and_returns() {
    let h = Harness::start(page(), bundle(vec![two_step_tour()], vec![tooltip(json!({}))])).await;
    let host = h.host.clone();
    let storage = h.storage.clone();

    h.close().await.unwrap();
    assert!(host.is_empty());
    assert_eq!(storage.writes(), 0);
    let calls = host.calls();
    assert_eq!(calls[0], Call::Attach(Layer::Tours));
    assert_eq!(calls[1], Call::Attach(Layer::Tooltips));
}

#[tokio::test(start_paused = true)]
async fn test_dropped_event_stream_is_an_error() {
    let h = Harness::start(page(), bundle(vec![], vec![])).await;
    let Harness { events, task, .. } = h;
    drop(events);

    let result = task.await.unwrap();
    assert!(matches!(result, Err(ControllerError::EventStreamClosed)));
}
