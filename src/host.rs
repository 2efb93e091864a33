use crate::definitions::{ActionDefinition, FeedbackDefinition};
use crate::domain::feedback::FeedbackKind;
use crate::domain::session::ConnectionStatus;
use std::fmt::Debug;

/// The button surface hosting the adapter. All calls are notifications; the host decides
/// when to act on them.
pub trait Host: Debug + Send + Sync {
    fn update_status(&self, status: ConnectionStatus, message: Option<&str>);

    fn set_action_definitions(&self, definitions: Vec<ActionDefinition>);

    fn set_feedback_definitions(&self, definitions: Vec<FeedbackDefinition>);

    /// Asks the host to re-evaluate every button bound to one of `kinds`.
    fn check_feedbacks(&self, kinds: &[FeedbackKind]);
}
