use crate::client::{ClientFactory, DeviceClient, DeviceClientError};
use crate::definitions::{ActionDefinition, FeedbackDefinition};
use crate::domain::commands::{GroupAction, SceneAction, TimelineAction};
use crate::domain::feedback::FeedbackKind;
use crate::domain::session::ConnectionStatus;
use crate::domain::{DeviceKind, Group, Scene, SceneState, Timeline, TimelineState};
use crate::host::Host;
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// An in-memory controller whose state follows the commands it receives.
#[derive(Debug, Default)]
pub struct FakeDevice {
    groups: Mutex<Vec<Group>>,
    scenes: Mutex<Vec<Scene>>,
    timelines: Mutex<Vec<Timeline>>,
    failing: Mutex<HashSet<DeviceKind>>,
    queries: Mutex<Vec<DeviceKind>>,
    commands: Mutex<Vec<String>>,
    reject_authentication: AtomicBool,
    reject_commands: AtomicBool,
    logged_out: AtomicBool,
    auth_gate: Option<Arc<Notify>>,
    groups_gate: Option<Arc<Notify>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        FakeDevice::default()
    }

    pub fn with_group(self, num: Option<u32>, name: &str, level: f64) -> Self {
        self.groups.lock().unwrap().push(Group {
            num,
            name: name.to_string(),
            level,
        });
        self
    }

    pub fn with_scene(self, num: Option<u32>, name: &str, state: SceneState) -> Self {
        self.scenes.lock().unwrap().push(Scene {
            num,
            name: name.to_string(),
            state,
        });
        self
    }

    pub fn with_timeline(self, num: Option<u32>, name: &str, state: TimelineState) -> Self {
        self.timelines.lock().unwrap().push(Timeline {
            num,
            name: name.to_string(),
            state,
        });
        self
    }

    pub fn failing(self, kind: DeviceKind) -> Self {
        self.set_failing(kind, true);
        self
    }

    pub fn rejecting_authentication(self) -> Self {
        self.set_reject_authentication(true);
        self
    }

    pub fn rejecting_commands(self) -> Self {
        self.reject_commands.store(true, Ordering::SeqCst);
        self
    }

    /// Authentication waits until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.auth_gate = Some(gate);
        self
    }

    /// The groups query waits until `gate` is notified.
    pub fn gated_groups(mut self, gate: Arc<Notify>) -> Self {
        self.groups_gate = Some(gate);
        self
    }

    pub fn set_failing(&self, kind: DeviceKind, failing: bool) {
        let mut guard = self.failing.lock().unwrap();
        if failing {
            guard.insert(kind);
        } else {
            guard.remove(&kind);
        }
    }

    pub fn set_reject_authentication(&self, reject: bool) {
        self.reject_authentication.store(reject, Ordering::SeqCst);
    }

    pub fn set_group_level(&self, num: u32, level: f64) {
        for group in self.groups.lock().unwrap().iter_mut().filter(|group| group.num == Some(num)) {
            group.level = level;
        }
    }

    pub fn rename_timeline(&self, num: u32, name: &str) {
        for timeline in self.timelines.lock().unwrap().iter_mut().filter(|timeline| timeline.num == Some(num)) {
            timeline.name = name.to_string();
        }
    }

    pub fn query_count(&self, kind: DeviceKind) -> usize {
        self.queries.lock().unwrap().iter().filter(|&&queried| queried == kind).count()
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn logged_out(&self) -> bool {
        self.logged_out.load(Ordering::SeqCst)
    }

    fn query<T: Clone>(&self, kind: DeviceKind, records: &Mutex<Vec<T>>) -> Result<Vec<T>, DeviceClientError> {
        self.queries.lock().unwrap().push(kind);
        self.records(kind, records)
    }

    fn records<T: Clone>(&self, kind: DeviceKind, records: &Mutex<Vec<T>>) -> Result<Vec<T>, DeviceClientError> {
        if self.failing.lock().unwrap().contains(&kind) {
            return Err(DeviceClientError::Request(format!("{} unavailable", kind)));
        }
        Ok(records.lock().unwrap().clone())
    }

    fn control(&self, command: String) -> Result<(), DeviceClientError> {
        if self.reject_commands.load(Ordering::SeqCst) {
            return Err(DeviceClientError::Rejected(command));
        }
        self.commands.lock().unwrap().push(command);
        Ok(())
    }
}

#[async_trait]
impl DeviceClient for FakeDevice {
    async fn authenticate(&self, _user: &str, _password: &str) -> Result<(), DeviceClientError> {
        if let Some(gate) = &self.auth_gate {
            gate.notified().await;
        }
        if self.reject_authentication.load(Ordering::SeqCst) {
            return Err(DeviceClientError::Unauthorized("invalid credentials".to_string()));
        }
        Ok(())
    }

    async fn groups(&self) -> Result<Vec<Group>, DeviceClientError> {
        if let Some(gate) = &self.groups_gate {
            self.queries.lock().unwrap().push(DeviceKind::Group);
            gate.notified().await;
            return self.records(DeviceKind::Group, &self.groups);
        }
        self.query(DeviceKind::Group, &self.groups)
    }

    async fn scenes(&self) -> Result<Vec<Scene>, DeviceClientError> {
        self.query(DeviceKind::Scene, &self.scenes)
    }

    async fn timelines(&self) -> Result<Vec<Timeline>, DeviceClientError> {
        self.query(DeviceKind::Timeline, &self.timelines)
    }

    async fn control_group(&self, num: u32, action: GroupAction) -> Result<(), DeviceClientError> {
        self.control(format!("group {} {}", num, action.as_str()))?;
        for group in self.groups.lock().unwrap().iter_mut().filter(|group| group.num == Some(num)) {
            let target = match action {
                GroupAction::Level { level, .. } => level,
                GroupAction::Raise { step, .. } => group.level + step,
                GroupAction::Lower { step, .. } => group.level - step,
            };
            group.level = target.clamp(0.0, 100.0);
        }
        Ok(())
    }

    async fn control_scene(&self, num: u32, action: SceneAction) -> Result<(), DeviceClientError> {
        self.control(format!("scene {} {}", num, action.as_str()))?;
        for scene in self.scenes.lock().unwrap().iter_mut().filter(|scene| scene.num == Some(num)) {
            scene.state = match (action, scene.state) {
                (SceneAction::Start, _) | (SceneAction::Toggle, SceneState::Released) => SceneState::Started,
                _ => SceneState::Released,
            };
        }
        Ok(())
    }

    async fn control_timeline(&self, num: u32, action: TimelineAction) -> Result<(), DeviceClientError> {
        self.control(format!("timeline {} {}", num, action.as_str()))?;
        for timeline in self.timelines.lock().unwrap().iter_mut().filter(|timeline| timeline.num == Some(num)) {
            timeline.state = match (action, timeline.state) {
                (TimelineAction::Start | TimelineAction::Resume, _) => TimelineState::Running,
                (TimelineAction::Pause, _) => TimelineState::Paused,
                (TimelineAction::Toggle, TimelineState::Running | TimelineState::Paused) => TimelineState::Released,
                (TimelineAction::Toggle, _) => TimelineState::Running,
                (TimelineAction::Release, _) => TimelineState::Released,
            };
        }
        Ok(())
    }

    async fn logout(&self) -> Result<(), DeviceClientError> {
        self.logged_out.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out the queued devices in order, repeating the last one.
#[derive(Debug)]
pub struct FakeFactory {
    devices: Mutex<VecDeque<Arc<FakeDevice>>>,
    hosts: Mutex<Vec<String>>,
}

impl FakeFactory {
    pub fn new(devices: Vec<Arc<FakeDevice>>) -> Self {
        FakeFactory {
            devices: Mutex::new(devices.into()),
            hosts: Mutex::new(Vec::new()),
        }
    }

    pub fn single(device: Arc<FakeDevice>) -> Self {
        FakeFactory::new(vec![device])
    }

    pub fn created(&self) -> usize {
        self.hosts.lock().unwrap().len()
    }

    pub fn hosts(&self) -> Vec<String> {
        self.hosts.lock().unwrap().clone()
    }
}

impl ClientFactory for FakeFactory {
    fn create(&self, host: &str) -> Result<Arc<dyn DeviceClient>, DeviceClientError> {
        self.hosts.lock().unwrap().push(host.to_string());
        let mut devices = self.devices.lock().unwrap();
        let device = if devices.len() > 1 { devices.pop_front() } else { devices.front().cloned() };
        device
            .map(|device| device as Arc<dyn DeviceClient>)
            .ok_or_else(|| DeviceClientError::InvalidHost(host.to_string()))
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum HostEvent {
    Status(ConnectionStatus, Option<String>),
    ActionDefinitions(Vec<ActionDefinition>),
    FeedbackDefinitions(Vec<FeedbackDefinition>),
    CheckFeedbacks(Vec<FeedbackKind>),
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        RecordingHost::default()
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<ConnectionStatus> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Status(status, _) => Some(status),
                _ => None,
            })
            .collect()
    }

    pub fn checked_feedbacks(&self) -> Vec<FeedbackKind> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::CheckFeedbacks(kinds) => Some(kinds),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn feedback_definition_updates(&self) -> Vec<Vec<FeedbackDefinition>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::FeedbackDefinitions(definitions) => Some(definitions),
                _ => None,
            })
            .collect()
    }

    pub fn action_definition_updates(&self) -> Vec<Vec<ActionDefinition>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::ActionDefinitions(definitions) => Some(definitions),
                _ => None,
            })
            .collect()
    }
}

impl Host for RecordingHost {
    fn update_status(&self, status: ConnectionStatus, message: Option<&str>) {
        self.events.lock().unwrap().push(HostEvent::Status(status, message.map(str::to_string)));
    }

    fn set_action_definitions(&self, definitions: Vec<ActionDefinition>) {
        self.events.lock().unwrap().push(HostEvent::ActionDefinitions(definitions));
    }

    fn set_feedback_definitions(&self, definitions: Vec<FeedbackDefinition>) {
        self.events.lock().unwrap().push(HostEvent::FeedbackDefinitions(definitions));
    }

    fn check_feedbacks(&self, kinds: &[FeedbackKind]) {
        self.events.lock().unwrap().push(HostEvent::CheckFeedbacks(kinds.to_vec()));
    }
}
