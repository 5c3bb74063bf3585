//! Per-session action pipeline.
//!
//! ```text
//!   raw message ─▶ envelope check ─▶ identity ─▶ cross-phase action? ─▶ chat / rename / reset
//!                                                      │ no
//!                                                      ▼
//!                                     payload validation ─▶ phase processor
//!                                                      │
//!                          ok: broadcast new view       │   err: generic error to sender
//! ```
//!
//! Actions are applied one at a time. Errors of every kind are logged with
//! their cause and reach the client only as [`GENERIC_ERROR`](crate::error::GENERIC_ERROR).

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::action::Action;
use crate::config::SessionSettings;
use crate::error::{ActionError, ActionResult, Rejection, RuleViolation};
use crate::processor::{EnrolmentProcessor, PhaseProcessor, PlayOutcome, SetupProcessor};
use crate::session::collaborators::{Collaborators, TextConstraints};
use crate::session::message::{Audience, OutboundMessage, PhaseView, Response, SessionDto};
use crate::session::snapshot::SessionSnapshot;
use crate::state::player::EnrolledPlayer;
use crate::state::store::{Keyed, Writable};
use crate::state::types::{ChatEntry, Phase, PlayerColor};
use crate::validation::schemas::{
    parse_chat, parse_client_message, parse_enrol, parse_pick_specialist, parse_play_command,
    parse_start_play, parse_start_setup,
};

/// Chat prefix that renames the sender.
pub const RENAME_COMMAND: &str = "#rename ";

pub struct SessionCoordinator {
    session_id: String,
    settings: SessionSettings,
    collaborators: Collaborators,
    rng: StdRng,
    owner: Writable<Option<String>>,
    identities: Keyed<String, PlayerColor>,
    chat: Writable<Vec<ChatEntry>>,
    processor: PhaseProcessor,
}

fn session_rng(settings: &SessionSettings) -> StdRng {
    match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

impl SessionCoordinator {
    /// A fresh session waiting for enrolments.
    pub fn new(session_id: String, settings: SessionSettings, collaborators: Collaborators) -> Self {
        Self {
            rng: session_rng(&settings),
            session_id,
            settings,
            collaborators,
            owner: Writable::new(None),
            identities: Keyed::new(),
            chat: Writable::new(Vec::new()),
            processor: PhaseProcessor::Enrolment(EnrolmentProcessor::new()),
        }
    }

    /// Resume a persisted session.
    pub fn restore(
        snapshot: SessionSnapshot,
        settings: SessionSettings,
        collaborators: Collaborators,
    ) -> ActionResult<Self> {
        let processor = snapshot.restore_processor()?;
        Ok(Self {
            rng: session_rng(&settings),
            session_id: snapshot.session_id,
            settings,
            collaborators,
            owner: Writable::new(snapshot.owner),
            identities: Keyed::from_entries(snapshot.identities),
            chat: Writable::new(snapshot.chat),
            processor,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn phase(&self) -> Phase {
        self.processor.phase()
    }

    pub fn processor(&self) -> &PhaseProcessor {
        &self.processor
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(
            &self.session_id,
            self.owner.get(),
            self.identities
                .keys()
                .into_iter()
                .zip(self.identities.values())
                .collect(),
            self.chat.get(),
            &self.processor,
        )
    }

    /// The public view broadcast to every participant.
    pub fn session_dto(&self) -> SessionDto {
        let session_owner = self
            .owner
            .get()
            .and_then(|identity| self.identities.get(&identity));
        SessionDto {
            session_id: self.session_id.clone(),
            phase: self.phase(),
            session_owner,
            chat: self.chat.get(),
            state: PhaseView::of(&self.processor),
        }
    }

    /// Process a message, persist on success and deliver the response.
    #[instrument(skip(self, raw), fields(session = %self.session_id))]
    pub async fn handle(&mut self, identity: &str, raw: &Value) {
        let response = self.handle_message(identity, raw);
        self.deliver(identity, response).await;
    }

    async fn deliver(&self, identity: &str, response: Response) {
        let Response { audience, message } = response;
        let transport = &self.collaborators.transport;
        match audience {
            Audience::Sender => transport.transmit(identity, &message).await,
            Audience::Session => {
                if let Err(e) = self.collaborators.store.save(&self.snapshot()).await {
                    error!(error = %e, "failed to persist session");
                    transport
                        .broadcast(&self.session_id, &OutboundMessage::generic_error())
                        .await;
                }
                transport.broadcast(&self.session_id, &message).await;
            }
        }
    }

    /// Check the envelope of a raw `{action, payload}` message, then process it.
    pub fn handle_message(&mut self, identity: &str, raw: &Value) -> Response {
        match parse_client_message(raw) {
            Ok(message) => self.process_action(identity, message.action, &message.payload),
            Err(rejection) => {
                debug!(session = %self.session_id, identity, error = %rejection, "malformed message");
                Response::to_sender(OutboundMessage::generic_error())
            }
        }
    }

    /// Apply one action. Success is broadcast; failure goes to the sender only.
    pub fn process_action(&mut self, identity: &str, action: Action, payload: &Value) -> Response {
        match self.dispatch(identity, action, payload) {
            Ok(()) => Response::to_session(OutboundMessage::State(Box::new(self.session_dto()))),
            Err(e) => {
                self.log_failure(identity, action, &e);
                Response::to_sender(OutboundMessage::generic_error())
            }
        }
    }

    fn log_failure(&self, identity: &str, action: Action, err: &ActionError) {
        let session = &self.session_id;
        match err {
            ActionError::Validation(rejection) => {
                debug!(session = %session, identity, %action, error = %rejection, "payload rejected")
            }
            ActionError::Rule(violation) => {
                warn!(session = %session, identity, %action, error = %violation, "action refused")
            }
            ActionError::Fatal(cause) => {
                error!(session = %session, identity, %action, cause = %cause, "action failed")
            }
        }
    }

    fn dispatch(&mut self, identity: &str, action: Action, payload: &Value) -> ActionResult<()> {
        match action {
            Action::Enrol => return self.enrol(identity, payload),
            Action::DeclareReset => return self.declare_reset(identity),
            _ => {}
        }

        let color = self
            .identities
            .get(&identity.to_string())
            .ok_or(RuleViolation::UnknownIdentity)?;
        let is_owner = self.is_owner(identity);

        match action {
            Action::Chat => self.chat(color, payload),
            Action::StartSetup => self.start_setup(is_owner, payload),
            Action::PickSpecialist => self.pick_specialist(color, payload),
            Action::StartPlay => self.start_play(is_owner, payload),
            _ => self.play(color, is_owner, action, payload),
        }
    }

    fn is_owner(&self, identity: &str) -> bool {
        self.owner.inspect(|owner| owner.as_deref() == Some(identity))
    }

    fn wrong_phase(&self) -> ActionError {
        RuleViolation::WrongPhase(self.phase()).into()
    }

    /// Names must fit the display and be unique in the session.
    fn check_name(&self, name: &str) -> ActionResult<()> {
        let constraints = TextConstraints {
            max_width: self.settings.name_max_width,
        };
        self.collaborators
            .measure
            .measure(name, constraints)
            .map_err(|rejection| RuleViolation::NameRejected(rejection.to_string()))?;
        if self.processor.is_name_taken(name) {
            return Err(RuleViolation::NameTaken.into());
        }
        Ok(())
    }

    fn enrol(&mut self, identity: &str, payload: &Value) -> ActionResult<()> {
        if self.phase() != Phase::Enrolment {
            return Err(self.wrong_phase());
        }
        if self.identities.contains(&identity.to_string()) {
            return Err(RuleViolation::AlreadyEnrolled.into());
        }
        let request = parse_enrol(payload)?;
        let name = request.name.trim().to_string();
        self.check_name(&name)?;

        let PhaseProcessor::Enrolment(enrolment) = &mut self.processor else {
            return Err(ActionError::fatal("enrolment processor missing"));
        };
        enrolment.enrol(EnrolledPlayer {
            color: request.color,
            name,
        })?;

        self.identities.set(identity.to_string(), request.color);
        if self.owner.inspect(Option::is_none) {
            self.owner.set(Some(identity.to_string()));
            info!(session = %self.session_id, color = %request.color, "session owner assigned");
        }
        Ok(())
    }

    fn chat(&mut self, color: PlayerColor, payload: &Value) -> ActionResult<()> {
        let message = parse_chat(payload)?.message;
        if let Some(name) = message.strip_prefix(RENAME_COMMAND) {
            return self.rename(color, name.trim());
        }
        if message.trim().is_empty() {
            return Err(Rejection::new(vec!["message: empty".to_string()]).into());
        }

        let name = self.processor.name_of(color).unwrap_or_default();
        self.push_chat(ChatEntry {
            color: Some(color),
            name,
            message,
            sent_at: Utc::now(),
        });
        Ok(())
    }

    fn rename(&mut self, color: PlayerColor, name: &str) -> ActionResult<()> {
        self.check_name(name)?;
        let previous = self.processor.name_of(color).unwrap_or_default();
        if !self.processor.rename(color, name.to_string()) {
            return Err(ActionError::fatal(format!("no player for enrolled color {color}")));
        }

        debug!(session = %self.session_id, %color, "player renamed");
        self.push_chat(ChatEntry {
            color: None,
            name: String::new(),
            message: format!("{previous} is now known as {name}"),
            sent_at: Utc::now(),
        });
        Ok(())
    }

    fn push_chat(&mut self, entry: ChatEntry) {
        let max = self.settings.max_chat_entries;
        self.chat.update(|mut chat| {
            chat.push(entry);
            let excess = chat.len().saturating_sub(max);
            chat.drain(..excess);
            chat
        });
    }

    /// The owner may reset at any time; anyone enrolled may once the game is over.
    fn declare_reset(&mut self, identity: &str) -> ActionResult<()> {
        let is_owner = self.is_owner(identity);
        if !is_owner && !self.identities.contains(&identity.to_string()) {
            return Err(RuleViolation::UnknownIdentity.into());
        }
        if !is_owner && self.phase() != Phase::Conclusion {
            return Err(RuleViolation::ResetRefused.into());
        }

        self.processor = PhaseProcessor::Enrolment(EnrolmentProcessor::new());
        self.identities.clear();
        self.owner.set(None);
        self.chat.set(Vec::new());
        info!(session = %self.session_id, "session reset");
        Ok(())
    }

    fn start_setup(&mut self, is_owner: bool, payload: &Value) -> ActionResult<()> {
        let PhaseProcessor::Enrolment(enrolment) = &self.processor else {
            return Err(self.wrong_phase());
        };
        if !is_owner {
            return Err(RuleViolation::NotOwner.into());
        }
        let roster = enrolment.roster_for_setup()?;
        let options = parse_start_setup(payload)?;

        let setup = SetupProcessor::new(
            roster,
            options.include_rival.unwrap_or(false),
            &self.settings.forced_specialists,
            &mut self.rng,
        );
        self.processor = PhaseProcessor::Setup(setup);
        info!(session = %self.session_id, "setup started");
        Ok(())
    }

    fn pick_specialist(&mut self, color: PlayerColor, payload: &Value) -> ActionResult<()> {
        if self.phase() != Phase::Setup {
            return Err(self.wrong_phase());
        }
        let pick = parse_pick_specialist(payload)?;
        let PhaseProcessor::Setup(setup) = &mut self.processor else {
            return Err(ActionError::fatal("setup processor missing"));
        };
        setup.pick_specialist(color, pick.name)
    }

    fn start_play(&mut self, is_owner: bool, payload: &Value) -> ActionResult<()> {
        let PhaseProcessor::Setup(setup) = &self.processor else {
            return Err(self.wrong_phase());
        };
        if !is_owner {
            return Err(RuleViolation::NotOwner.into());
        }
        let request = parse_start_play(payload)?;

        let play = setup.start_play(request, &mut self.rng)?;
        self.processor = PhaseProcessor::Play(play);
        info!(session = %self.session_id, "play started");
        Ok(())
    }

    fn play(
        &mut self,
        color: PlayerColor,
        is_owner: bool,
        action: Action,
        payload: &Value,
    ) -> ActionResult<()> {
        let phase = self.phase();
        let PhaseProcessor::Play(play) = &mut self.processor else {
            return Err(RuleViolation::WrongPhase(phase).into());
        };
        let command = parse_play_command(action, payload)?;
        if play.is_handling_rival(color) && !action.allowed_while_handling_rival() {
            return Err(RuleViolation::HandlingRival.into());
        }

        let outcome = play.process(color, command, is_owner, &mut self.rng)?;
        if let PlayOutcome::GameOver(results) = outcome {
            info!(session = %self.session_id, winners = ?results.winners, "game over");
            self.processor = PhaseProcessor::Conclusion(results);
        }
        Ok(())
    }
}
