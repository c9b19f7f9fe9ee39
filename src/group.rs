//! The light group: members, command routing and state publication.

use std::collections::HashMap;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::aggregate::{AggregatedState, aggregate};
use crate::capability::Capabilities;
use crate::command::{GroupCommand, MemberCommand};
use crate::config::GroupConfig;
use crate::errors::Error;
use crate::history::{CommandHistory, EventKind, HistorySummary};
use crate::member::{Member, MemberInfo, MemberState};
use crate::runtime::{self, JoinHandle, Mutex};
use crate::thresholds::Thresholds;
use crate::translate::{Translation, translate};

type Result<T> = std::result::Result<T, Error>;

/// Delivers member commands to the host.
///
/// Delivery is fire-and-forget: the group never waits for the light to
/// confirm, and failures are logged and recorded but never retried.
pub trait Dispatcher: Send + Sync {
    fn send_command(&self, member_id: &str, command: &MemberCommand) -> Result<()>;
}

impl<D: Dispatcher + ?Sized> Dispatcher for Arc<D> {
    fn send_command(&self, member_id: &str, command: &MemberCommand) -> Result<()> {
        (**self).send_command(member_id, command)
    }
}

/// Looks up what the host knows about a light.
pub trait MemberRegistry {
    fn lookup(&self, member_id: &str) -> Option<MemberInfo>;
}

impl MemberRegistry for HashMap<String, MemberInfo> {
    fn lookup(&self, member_id: &str) -> Option<MemberInfo> {
        self.get(member_id).cloned()
    }
}

/// A state report for one member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberEvent {
    pub member_id: String,
    pub state: MemberState,
}

impl MemberEvent {
    pub fn new(member_id: &str, state: MemberState) -> Self {
        MemberEvent {
            member_id: member_id.to_string(),
            state,
        }
    }
}

type Listener = Box<dyn Fn(&AggregatedState) + Send + Sync>;

struct GroupInner {
    members: Vec<Member>,
    sequence: u64,
    state: AggregatedState,
    last_command: Option<GroupCommand>,
    history: CommandHistory,
    listeners: Vec<Listener>,
}

/// A group of heterogeneous lights that behaves like a single light.
///
/// Commands and state reports are serialized through one async mutex, so a
/// command is translated against a consistent view of the members and the
/// last command wins.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use smart_light_group::{
///     Capabilities, Capability, Dispatcher, Error, GroupCommand, GroupConfig, HueSaturation,
///     LightGroup, MemberCommand, MemberInfo, MemberState,
/// };
///
/// struct Print;
///
/// impl Dispatcher for Print {
///     fn send_command(&self, member_id: &str, command: &MemberCommand) -> Result<(), Error> {
///         println!("{member_id}: {command:?}");
///         Ok(())
///     }
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let registry = HashMap::from([
///     ("light.main".to_string(), MemberInfo::default()),
///     (
///         "light.hue_lamp".to_string(),
///         MemberInfo::new(
///             Capabilities::from([Capability::Brightness, Capability::HueSaturation]),
///             MemberState::off(),
///         ),
///     ),
/// ]);
/// let config = GroupConfig::new("Living Room", &["light.main", "light.hue_lamp"]);
/// let group = LightGroup::new(&config, &registry, Print).unwrap();
///
/// let blue = GroupCommand::from(&HueSaturation::create(240.0, 90.0).unwrap());
/// let translation = group.handle_command(&blue).await.unwrap();
/// assert_eq!(translation.forwarded_count(), 1);
/// # });
/// ```
pub struct LightGroup<D: Dispatcher> {
    id: Uuid,
    name: String,
    thresholds: Thresholds,
    dispatcher: D,
    inner: Mutex<GroupInner>,
}

impl<D: Dispatcher> LightGroup<D> {
    /// Build a group from its configuration.
    ///
    /// Every entity is looked up in the registry and classified once. Ids
    /// the registry does not know are registered as unavailable on/off
    /// lights until they report a state.
    pub fn new<R: MemberRegistry>(config: &GroupConfig, registry: &R, dispatcher: D) -> Result<Self> {
        let thresholds = config.validate()?;

        let members: Vec<Member> = config
            .entities
            .iter()
            .map(|id| {
                let info = registry.lookup(id).unwrap_or_else(|| {
                    warn!("{}: unknown member {id}, registering it as unavailable", config.name);
                    MemberInfo::new(Capabilities::on_off(), MemberState::unavailable())
                });
                let member = Member::new(id, info);
                debug!("{}: {id} registered as {}", config.name, member.class());
                member
            })
            .collect();

        let state = aggregate(&members, &thresholds);
        info!("{}: created with {} members", config.name, members.len());

        Ok(LightGroup {
            id: Uuid::new_v4(),
            name: config.name.clone(),
            thresholds,
            dispatcher,
            inner: Mutex::new(GroupInner {
                members,
                sequence: 0,
                state,
                last_command: None,
                history: CommandHistory::new(),
                listeners: Vec::new(),
            }),
        })
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Route a group command to the members.
    ///
    /// The command is translated for every member before anything is
    /// dispatched. Dispatch failures do not fail the call; they are logged
    /// and show up as the last error in [`LightGroup::diagnostics`].
    pub async fn handle_command(&self, command: &GroupCommand) -> Result<Translation> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        inner.history.record(
            EventKind::Command,
            &self.name,
            serde_json::to_value(command).unwrap_or(Value::Null),
        );

        let translation = match translate(command, &inner.members, &self.thresholds) {
            Ok(translation) => translation,
            Err(e) => {
                warn!("{}: {e}", self.name);
                inner.history.record_error(&e.to_string());
                return Err(e);
            }
        };
        info!(
            "{}: {} member commands, {} suppressed",
            self.name,
            translation.forwarded_count(),
            translation.suppressed_count()
        );

        for (member_id, member_command) in translation.forwarded() {
            inner.history.record(
                EventKind::Dispatch,
                member_id,
                serde_json::to_value(member_command).unwrap_or(Value::Null),
            );
            if let Err(e) = self.dispatcher.send_command(member_id, member_command) {
                warn!("{}: {e}", self.name);
                inner.history.record_error(&e.to_string());
            }
        }

        inner.last_command = Some(command.clone());
        self.refresh(inner);
        Ok(translation)
    }

    /// Record a state report for a member.
    ///
    /// Returns `true` if the member's state changed. Listeners are notified
    /// when the group state changes as a result.
    pub async fn member_state_changed(&self, member_id: &str, state: MemberState) -> Result<bool> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        inner.sequence += 1;
        let sequence = inner.sequence;

        let Some(member) = inner.members.iter_mut().find(|m| m.id() == member_id) else {
            return Err(Error::member_not_found(&self.id, member_id));
        };
        if !member.update_state(state, sequence) {
            return Ok(false);
        }

        let snapshot = serde_json::to_value(member.state()).unwrap_or(Value::Null);
        debug!("{}: {member_id} changed to {snapshot}", self.name);
        inner.history.record(EventKind::StateChange, member_id, snapshot);

        self.refresh(inner);
        Ok(true)
    }

    /// Current state of the group.
    pub async fn aggregated_state(&self) -> AggregatedState {
        self.inner.lock().await.state.clone()
    }

    /// Snapshot of the members in registration order.
    pub async fn members(&self) -> Vec<Member> {
        self.inner.lock().await.members.clone()
    }

    pub async fn last_command(&self) -> Option<GroupCommand> {
        self.inner.lock().await.last_command.clone()
    }

    pub async fn history_summary(&self) -> HistorySummary {
        self.inner.lock().await.history.summary()
    }

    /// Register a callback invoked with the new state whenever it changes.
    pub async fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&AggregatedState) + Send + Sync + 'static,
    {
        self.inner.lock().await.listeners.push(Box::new(listener));
    }

    /// Returns diagnostics including members, thresholds and history.
    pub async fn diagnostics(&self) -> Value {
        let inner = self.inner.lock().await;

        let members: Vec<Value> = inner
            .members
            .iter()
            .map(|m| {
                json!({
                    "id": m.id(),
                    "class": m.class().to_string(),
                    "capabilities": m.capabilities().to_string(),
                    "available": m.is_available(),
                    "state": m.state(),
                    "last_changed": m.last_changed(),
                })
            })
            .collect();

        let mut diag = json!({
            "id": self.id.to_string(),
            "name": self.name,
            "state": inner.state,
            "members": members,
            "thresholds": self.thresholds,
            "last_command": inner.last_command,
        });
        diag["history"] = serde_json::to_value(inner.history.summary()).unwrap_or(Value::Null);
        diag
    }

    // Recompute the group state and notify listeners if it changed.
    fn refresh(&self, inner: &mut GroupInner) -> bool {
        let state = aggregate(&inner.members, &self.thresholds);
        if state == inner.state {
            return false;
        }

        debug!("{}: state is now {:?}", self.name, state);
        inner.state = state;
        for listener in &inner.listeners {
            listener(&inner.state);
        }
        true
    }
}

impl<D: Dispatcher + 'static> LightGroup<D> {
    /// Consume member state reports in a background task.
    ///
    /// Reports for unknown members are logged and skipped. The task ends
    /// with the stream, or when the returned handle is aborted.
    pub fn listen<S>(self: Arc<Self>, events: S) -> JoinHandle<()>
    where
        S: Stream<Item = MemberEvent> + Send + 'static,
    {
        runtime::spawn(async move {
            futures::pin_mut!(events);
            while let Some(event) = events.next().await {
                if let Err(e) = self.member_state_changed(&event.member_id, event.state).await {
                    warn!("{}: {e}", self.name);
                }
            }
            debug!("{}: member event stream closed", self.name);
        })
    }
}

#[cfg(all(test, feature = "runtime-tokio"))]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use crate::types::{Brightness, HueSaturation};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recorder {
        sent: std::sync::Mutex<Vec<(String, MemberCommand)>>,
    }

    impl Recorder {
        fn sent(&self) -> Vec<(String, MemberCommand)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Dispatcher for Recorder {
        fn send_command(&self, member_id: &str, command: &MemberCommand) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((member_id.to_string(), command.clone()));
            Ok(())
        }
    }

    struct Unreachable;

    impl Dispatcher for Unreachable {
        fn send_command(&self, member_id: &str, _command: &MemberCommand) -> Result<()> {
            Err(Error::dispatch(member_id, "host unreachable"))
        }
    }

    fn registry() -> HashMap<String, MemberInfo> {
        HashMap::from([
            ("light.main".to_string(), MemberInfo::default()),
            (
                "light.hue_lamp".to_string(),
                MemberInfo::new(
                    Capabilities::from([
                        Capability::Brightness,
                        Capability::ColorTemperature,
                        Capability::HueSaturation,
                    ]),
                    MemberState::off(),
                ),
            ),
        ])
    }

    fn config() -> GroupConfig {
        GroupConfig::new("Living Room", &["light.main", "light.hue_lamp"])
    }

    fn hs(hue: f32, saturation: f32) -> HueSaturation {
        HueSaturation::create(hue, saturation).unwrap()
    }

    #[test]
    fn test_invalid_config() {
        let empty = GroupConfig::new("Empty", &[]);
        assert!(matches!(
            LightGroup::new(&empty, &registry(), Recorder::default()),
            Err(Error::Configuration { .. })
        ));

        let duplicate = GroupConfig::new("Twice", &["light.main", "light.main"]);
        assert!(LightGroup::new(&duplicate, &registry(), Recorder::default()).is_err());
    }

    #[tokio::test]
    async fn test_unknown_entity_is_unavailable() {
        let config = GroupConfig::new("Hall", &["light.main", "light.ghost"]);
        let group = LightGroup::new(&config, &registry(), Recorder::default()).unwrap();

        let members = group.members().await;
        assert!(!members[1].is_available());

        let translation = group.handle_command(&GroupCommand::turn_on()).await.unwrap();
        assert!(translation.decision("light.ghost").unwrap().is_suppressed());
        assert_eq!(group.dispatcher().sent().len(), 1);
    }

    #[tokio::test]
    async fn test_command_is_dispatched() {
        let group = LightGroup::new(&config(), &registry(), Recorder::default()).unwrap();
        group
            .handle_command(&GroupCommand::from(&hs(240.0, 90.0)))
            .await
            .unwrap();

        let sent = group.dispatcher().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "light.hue_lamp");
        assert!(sent[0].1.is_on());
        assert!(group.last_command().await.is_some());
    }

    #[tokio::test]
    async fn test_unroutable_command_dispatches_nothing() {
        let group = LightGroup::new(&config(), &registry(), Recorder::default()).unwrap();
        let before = group.aggregated_state().await;

        let result = group.handle_command(&GroupCommand::new()).await;
        assert_eq!(result, Err(Error::UnroutableCommand));
        assert!(group.dispatcher().sent().is_empty());
        assert_eq!(group.aggregated_state().await, before);
        assert!(group.history_summary().await.last_error.is_some());
    }

    #[tokio::test]
    async fn test_dispatch_errors_are_recorded() {
        let group = LightGroup::new(&config(), &registry(), Unreachable).unwrap();
        let translation = group.handle_command(&GroupCommand::turn_on()).await.unwrap();
        assert_eq!(translation.forwarded_count(), 2);

        let summary = group.history_summary().await;
        assert_eq!(summary.dispatch_count, 2);
        assert!(summary.last_error.unwrap().contains("host unreachable"));
    }

    #[tokio::test]
    async fn test_state_changes_notify_listeners() {
        let group = LightGroup::new(&config(), &registry(), Recorder::default()).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        group
            .subscribe(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        let lamp = MemberState::on()
            .with_brightness(Brightness::from(120))
            .with_hs_color(hs(240.0, 90.0));
        assert!(group.member_state_changed("light.hue_lamp", lamp.clone()).await.unwrap());
        assert!(!group.member_state_changed("light.hue_lamp", lamp).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let state = group.aggregated_state().await;
        assert!(state.is_on);
        assert_eq!(state.brightness, Some(Brightness::from(120)));
        assert_eq!(state.hs_color, Some(hs(240.0, 90.0)));
    }

    #[tokio::test]
    async fn test_unknown_member_event() {
        let group = LightGroup::new(&config(), &registry(), Recorder::default()).unwrap();
        let result = group.member_state_changed("light.other", MemberState::on()).await;
        assert_eq!(
            result,
            Err(Error::member_not_found(group.id(), "light.other"))
        );
    }

    #[tokio::test]
    async fn test_listen_consumes_events() {
        let group = Arc::new(LightGroup::new(&config(), &registry(), Recorder::default()).unwrap());
        let events = futures::stream::iter(vec![
            MemberEvent::new("light.other", MemberState::on()),
            MemberEvent::new("light.main", MemberState::on()),
        ]);

        group.clone().listen(events).await;

        let state = group.aggregated_state().await;
        assert!(state.is_on);
        assert_eq!(state.brightness, Some(group.thresholds().non_dimmable_brightness_estimate()));
    }

    #[tokio::test]
    async fn test_abort_stops_listening() {
        let group = Arc::new(LightGroup::new(&config(), &registry(), Recorder::default()).unwrap());
        let handle = group.clone().listen(futures::stream::pending::<MemberEvent>());
        assert_eq!(Arc::strong_count(&group), 2);

        handle.abort();
        for _ in 0..100 {
            if Arc::strong_count(&group) == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(Arc::strong_count(&group), 1);
        assert!(group.member_state_changed("light.main", MemberState::on()).await.unwrap());
    }

    #[tokio::test]
    async fn test_blue_white_blue_through_group() {
        let group = LightGroup::new(&config(), &registry(), Recorder::default()).unwrap();
        let blue = GroupCommand::from(&hs(240.0, 90.0));
        let white = GroupCommand::from(&hs(0.0, 5.0));

        let feed_back = |translation: &Translation| {
            translation
                .forwarded()
                .map(|(id, command)| (id.to_string(), command.clone()))
                .collect::<Vec<_>>()
        };

        for (command, main_on) in [(&blue, false), (&white, true), (&blue, false)] {
            let translation = group.handle_command(command).await.unwrap();
            for (id, member_command) in feed_back(&translation) {
                let mut state = group
                    .members()
                    .await
                    .into_iter()
                    .find(|m| m.id() == id)
                    .unwrap()
                    .state()
                    .clone();
                state.apply(&member_command);
                group.member_state_changed(&id, state).await.unwrap();
            }
            let members = group.members().await;
            assert_eq!(members[0].is_on(), main_on);
            assert!(members[1].is_on());
        }
    }

    #[tokio::test]
    async fn test_diagnostics() {
        let group = LightGroup::new(&config(), &registry(), Recorder::default()).unwrap();
        group.handle_command(&GroupCommand::turn_on()).await.unwrap();

        let diag = group.diagnostics().await;
        assert_eq!(diag["name"], "Living Room");
        assert_eq!(diag["members"].as_array().unwrap().len(), 2);
        assert_eq!(diag["members"][0]["class"], "on_off");
        assert_eq!(diag["history"]["command_count"], 1);
        assert_eq!(diag["history"]["dispatch_count"], 2);
    }
}
