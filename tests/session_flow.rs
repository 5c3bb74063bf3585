use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;

use tradewinds_state::error::StoreError;
use tradewinds_state::session::{
    ChannelTransport, Collaborators, Delivery, MemoryStore, OutboundMessage, PhaseView, Recipient,
    SessionCoordinator, SessionDto, SessionRegistry, SessionSnapshot, SessionStore, WidthMeasure,
};
use tradewinds_state::state::types::{Phase, PlayerColor};
use tradewinds_state::{SessionSettings, GENERIC_ERROR};

struct Table {
    registry: SessionRegistry,
    store: Arc<MemoryStore>,
    deliveries: UnboundedReceiver<Delivery>,
    session_id: String,
}

impl Table {
    async fn open() -> Self {
        let store = Arc::new(MemoryStore::new());
        let (transport, deliveries) = ChannelTransport::new();
        let collaborators = Collaborators::new(store.clone(), Arc::new(transport), Arc::new(WidthMeasure));
        let settings = SessionSettings {
            seed: Some(5),
            ..SessionSettings::default()
        };
        let registry = SessionRegistry::new(settings, collaborators);
        let session_id = registry.create_session().await.unwrap();
        Self {
            registry,
            store,
            deliveries,
            session_id,
        }
    }

    async fn send(&mut self, identity: &str, action: &str, payload: Value) -> Delivery {
        let frame = json!({
            "identity": identity,
            "message": { "action": action, "payload": payload }
        });
        self.registry.dispatch(&self.session_id, &frame).await.unwrap();
        self.deliveries.recv().await.unwrap()
    }

    /// Send an action that must succeed and return the broadcast view.
    async fn accept(&mut self, identity: &str, action: &str, payload: Value) -> SessionDto {
        let delivery = self.send(identity, action, payload).await;
        assert_eq!(delivery.recipient, Recipient::Session(self.session_id.clone()));
        match delivery.message {
            OutboundMessage::State(dto) => *dto,
            OutboundMessage::Error { error } => panic!("{action} refused: {error}"),
        }
    }

    /// Send an action that must be refused, privately.
    async fn refuse(&mut self, identity: &str, action: &str, payload: Value) {
        let delivery = self.send(identity, action, payload).await;
        assert_eq!(delivery.recipient, Recipient::Client(identity.to_string()));
        assert_eq!(
            delivery.message,
            OutboundMessage::Error {
                error: GENERIC_ERROR.to_string()
            }
        );
    }
}

fn identity_of(color: PlayerColor) -> &'static str {
    match color {
        PlayerColor::Red => "id-ada",
        _ => "id-bo",
    }
}

async fn table_in_play() -> (Table, SessionDto) {
    let mut table = Table::open().await;
    table
        .accept("id-ada", "enrol", json!({ "color": "red", "name": "Ada" }))
        .await;
    table
        .accept("id-bo", "enrol", json!({ "color": "green", "name": "Bo" }))
        .await;

    let dto = table.accept("id-ada", "start_setup", Value::Null).await;
    let PhaseView::Setup(setup) = dto.state else {
        panic!("expected setup view");
    };
    let mut order = setup.players.clone();
    order.sort_by_key(|p| p.turn_order);
    for (player, offer) in order.iter().zip(&setup.specialists) {
        table
            .accept(
                identity_of(player.color),
                "pick_specialist",
                json!({ "name": offer.specialist.name }),
            )
            .await;
    }

    let dto = table
        .accept(
            "id-ada",
            "start_play",
            json!({ "setupCoordinates": [{ "x": 0, "y": 0 }, { "x": 1, "y": 0 }] }),
        )
        .await;
    (table, dto)
}

fn play_view(dto: &SessionDto) -> &tradewinds_state::session::message::PlayView {
    match &dto.state {
        PhaseView::Play(view) => view,
        other => panic!("expected play view, got {other:?}"),
    }
}

#[tokio::test]
async fn test_enrolment_to_first_move() {
    let (mut table, dto) = table_in_play().await;
    assert_eq!(dto.phase, Phase::Play);
    assert_eq!(dto.session_owner, Some(PlayerColor::Red));

    let view = play_view(&dto);
    assert_eq!(view.players.iter().filter(|p| p.is_active).count(), 1);
    let active = view.players.iter().find(|p| p.is_active).unwrap().clone();
    let waiting = view.players.iter().find(|p| !p.is_active).unwrap().clone();
    assert_eq!(active.turn_order, 1);

    // Not their turn.
    table
        .refuse(identity_of(waiting.color), "end_turn", Value::Null)
        .await;

    let target = active.destinations[0];
    let dto = table
        .accept(
            identity_of(active.color),
            "move",
            json!({ "zoneId": target, "position": { "x": 3, "y": 4 } }),
        )
        .await;
    let mover = play_view(&dto)
        .players
        .iter()
        .find(|p| p.color == active.color)
        .unwrap()
        .clone();
    assert_eq!(mover.bearings.sea_zone, target);
    assert_eq!(mover.move_actions, 1);
    assert!(mover.is_anchored);
    // An uncontested move keeps the starting influence.
    assert_eq!(mover.influence, active.influence);

    // Sailing clears the undo slot.
    table.refuse(identity_of(active.color), "undo", Value::Null).await;

    let dto = table
        .accept(identity_of(active.color), "end_turn", Value::Null)
        .await;
    let view = play_view(&dto);
    let now_active: Vec<PlayerColor> = view
        .players
        .iter()
        .filter(|p| p.is_active)
        .map(|p| p.color)
        .collect();
    assert_eq!(now_active, vec![waiting.color]);

    let snapshot = table.store.load(&table.session_id).await.unwrap().unwrap();
    assert_eq!(snapshot.phase, Phase::Play);
    assert!(snapshot.play.is_some());
}

#[tokio::test]
async fn test_errors_reach_only_the_sender() {
    let mut table = Table::open().await;
    table
        .accept("id-ada", "enrol", json!({ "color": "red", "name": "Ada" }))
        .await;

    table.refuse("id-stranger", "chat", json!({ "message": "hi" })).await;
    table.refuse("id-ada", "start_setup", Value::Null).await;
    table.refuse("id-ada", "move", json!({ "zoneId": "left" })).await;

    let frame = json!({ "identity": "id-ada", "message": { "action": "sail_away" } });
    table.registry.dispatch(&table.session_id, &frame).await.unwrap();
    let delivery = table.deliveries.recv().await.unwrap();
    assert_eq!(delivery.recipient, Recipient::Client("id-ada".to_string()));
    assert!(delivery.message.is_error());
}

#[tokio::test]
async fn test_chat_rename_and_reset() {
    let (mut table, _) = table_in_play().await;

    let dto = table
        .accept("id-bo", "chat", json!({ "message": "fair winds" }))
        .await;
    assert_eq!(dto.chat.last().map(|c| c.name.as_str()), Some("Bo"));

    table
        .refuse("id-bo", "chat", json!({ "message": "#rename Ada" }))
        .await;
    let dto = table
        .accept("id-bo", "chat", json!({ "message": "#rename Bosun" }))
        .await;
    let renamed = play_view(&dto)
        .players
        .iter()
        .any(|p| p.color == PlayerColor::Green && p.name == "Bosun");
    assert!(renamed);

    // Only the owner may reset a running game.
    table.refuse("id-bo", "declare_reset", Value::Null).await;
    let dto = table.accept("id-ada", "declare_reset", Value::Null).await;
    assert_eq!(dto.phase, Phase::Enrolment);
    assert_eq!(dto.session_owner, None);
    assert!(dto.chat.is_empty());

    // Colors were released with the reset.
    table
        .accept("id-bo", "enrol", json!({ "color": "red", "name": "Bo" }))
        .await;
}

#[tokio::test]
async fn test_session_survives_eviction() {
    let (mut table, before) = table_in_play().await;
    assert!(table.registry.evict(&table.session_id));

    let session = table.registry.session(&table.session_id).await.unwrap();
    let after = session.lock().await.session_dto();
    assert_eq!(after, before);
    drop(session);

    table.accept("id-bo", "chat", json!({ "message": "still here" })).await;
}

struct BrokenStore;

#[async_trait]
impl SessionStore for BrokenStore {
    async fn load(&self, _session_id: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        Ok(None)
    }

    async fn save(&self, _snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        Err(StoreError::Backend("disk full".to_string()))
    }
}

#[tokio::test]
async fn test_save_failure_is_broadcast() {
    let (transport, mut deliveries) = ChannelTransport::new();
    let collaborators = Collaborators::new(Arc::new(BrokenStore), Arc::new(transport), Arc::new(WidthMeasure));
    let mut coordinator =
        SessionCoordinator::new("s-broken".to_string(), SessionSettings::default(), collaborators);

    let message = json!({ "action": "enrol", "payload": { "color": "yellow", "name": "Cy" } });
    coordinator.handle("id-cy", &message).await;

    let first = deliveries.recv().await.unwrap();
    assert_eq!(first.recipient, Recipient::Session("s-broken".to_string()));
    assert!(first.message.is_error());

    let second = deliveries.recv().await.unwrap();
    assert!(matches!(second.message, OutboundMessage::State(_)));
}
