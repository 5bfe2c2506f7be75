use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use gateway::{CommandGateway, CommandInvoker};
use panel::{ActionOutcome, NotificationState, PanelController, DEFAULT_HIDE_DELAY};
use shared::{
    domain::{DeviceId, FavoriteSelector},
    error::OperationFailed,
    protocol::{GatewayReply, GatewayRequest},
};
use tokio::time::sleep;

type Responder = dyn Fn(&GatewayRequest) -> Result<GatewayReply, OperationFailed> + Send + Sync;

/// Answers each request through a closure and remembers what was asked.
struct FakeBoundary {
    respond: Box<Responder>,
    calls: Mutex<Vec<GatewayRequest>>,
}

impl FakeBoundary {
    fn new(
        respond: impl Fn(&GatewayRequest) -> Result<GatewayReply, OperationFailed>
            + Send
            + Sync
            + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<GatewayRequest> {
        self.calls.lock().expect("calls").clone()
    }
}

#[async_trait]
impl CommandInvoker for FakeBoundary {
    async fn invoke(&self, request: GatewayRequest) -> Result<GatewayReply, OperationFailed> {
        let reply = (self.respond)(&request);
        self.calls.lock().expect("calls").push(request);
        reply
    }
}

fn with_favorites(names: &'static [&'static str]) -> Arc<FakeBoundary> {
    FakeBoundary::new(move |request| match request {
        GatewayRequest::ListFavorites => Ok(GatewayReply::Favorites(
            names.iter().copied().map(FavoriteSelector::from).collect(),
        )),
        GatewayRequest::SwitchDevice { device_id } if device_id.0 == 7 => {
            Err(OperationFailed::new("device 7 offline"))
        }
        GatewayRequest::SwitchDevice { .. } | GatewayRequest::ActivateFavorite { .. } => {
            Ok(GatewayReply::Unit)
        }
    })
}

fn panel_for(boundary: &Arc<FakeBoundary>) -> Arc<PanelController> {
    PanelController::new(CommandGateway::new(boundary.clone()))
}

#[tokio::test(start_paused = true)]
async fn loaded_favorites_become_one_click_actions() {
    let boundary = with_favorites(&["box-a", "box-b"]);
    let panel = panel_for(&boundary);

    let loaded = panel.initialize().await.expect("initialize");

    assert_eq!(panel.favorite_actions(), vec!["box-a", "box-b"]);
    assert_eq!(loaded, panel.favorites());
}

#[tokio::test(start_paused = true)]
async fn valid_ids_are_switched_exactly_once_with_parsed_value() {
    let boundary = with_favorites(&["box-a"]);
    let panel = panel_for(&boundary);
    panel.initialize().await.expect("initialize");

    for id in [0u64, 1, 42, 255, 4_294_967_296] {
        let outcome = panel.submit_switch(&id.to_string()).await;
        assert_eq!(outcome, ActionOutcome::Completed);
    }

    let switches: Vec<GatewayRequest> = boundary
        .calls()
        .into_iter()
        .filter(|call| matches!(call, GatewayRequest::SwitchDevice { .. }))
        .collect();
    assert_eq!(
        switches,
        [0u64, 1, 42, 255, 4_294_967_296]
            .into_iter()
            .map(|id| GatewayRequest::SwitchDevice {
                device_id: DeviceId(id)
            })
            .collect::<Vec<_>>()
    );
    assert_eq!(panel.favorites(), vec![FavoriteSelector::from("box-a")]);
}

#[tokio::test(start_paused = true)]
async fn activating_each_favorite_sends_only_that_selector() {
    let boundary = with_favorites(&["box-a", "box-b"]);
    let panel = panel_for(&boundary);
    panel.initialize().await.expect("initialize");

    for selector in panel.favorites() {
        assert_eq!(
            panel.activate_favorite(&selector).await,
            ActionOutcome::Completed
        );
    }

    assert_eq!(
        boundary.calls(),
        vec![
            GatewayRequest::ListFavorites,
            GatewayRequest::ActivateFavorite {
                selector: FavoriteSelector::from("box-a")
            },
            GatewayRequest::ActivateFavorite {
                selector: FavoriteSelector::from("box-b")
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn offline_device_shows_error_then_hides_after_delay() {
    let boundary = with_favorites(&["box-a", "box-b"]);
    let panel = panel_for(&boundary);
    panel.initialize().await.expect("initialize");

    let outcome = panel.submit_switch("7").await;

    assert_eq!(
        outcome,
        ActionOutcome::Failed(OperationFailed::new("device 7 offline"))
    );
    let view = panel.view();
    assert_eq!(view.notification.state(), NotificationState::Visible);
    assert_eq!(view.notification.message, "device 7 offline");

    sleep(DEFAULT_HIDE_DELAY - Duration::from_millis(1)).await;
    assert!(panel.notification().visible);

    sleep(Duration::from_millis(2)).await;
    assert_eq!(panel.notification().state(), NotificationState::Hidden);
    assert_eq!(
        panel.favorites(),
        vec![FavoriteSelector::from("box-a"), FavoriteSelector::from("box-b")]
    );
}

#[tokio::test(start_paused = true)]
async fn second_failure_extends_visibility_from_its_own_time() {
    let boundary = FakeBoundary::new(|request| match request {
        GatewayRequest::SwitchDevice { device_id } => {
            Err(OperationFailed::new(format!("err{}", device_id.0)))
        }
        _ => Ok(GatewayReply::Unit),
    });
    let panel = panel_for(&boundary);

    panel.submit_switch("1").await;
    sleep(Duration::from_millis(500)).await;
    panel.submit_switch("2").await;

    // Past the first error's deadline, the second error is still showing.
    sleep(Duration::from_millis(1600)).await;
    let view = panel.view();
    assert_eq!(view.visible_error(), Some("err2"));

    sleep(Duration::from_millis(399)).await;
    assert_eq!(panel.view().visible_error(), Some("err2"));

    sleep(Duration::from_millis(2)).await;
    assert_eq!(panel.view().visible_error(), None);
}

#[tokio::test(start_paused = true)]
async fn successful_favorite_shows_nothing() {
    let boundary = with_favorites(&["box-a"]);
    let panel = panel_for(&boundary);
    panel.initialize().await.expect("initialize");
    let before = panel.view();

    let outcome = panel
        .activate_favorite(&FavoriteSelector::from("box-a"))
        .await;

    assert_eq!(outcome, ActionOutcome::Completed);
    assert_eq!(panel.view(), before);
}

#[tokio::test(start_paused = true)]
async fn concurrent_actions_resolve_independently() {
    let boundary = with_favorites(&["box-a"]);
    let panel = panel_for(&boundary);

    let box_a = FavoriteSelector::from("box-a");
    let (switched, activated) = tokio::join!(
        panel.submit_switch("7"),
        panel.activate_favorite(&box_a)
    );

    assert_eq!(
        switched,
        ActionOutcome::Failed(OperationFailed::new("device 7 offline"))
    );
    assert_eq!(activated, ActionOutcome::Completed);
    assert_eq!(panel.view().visible_error(), Some("device 7 offline"));
}
