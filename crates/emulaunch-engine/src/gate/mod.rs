//! Startup gating: decides whether the device can run the engine, whether
//! storage access must be requested, and whether the scoped-storage warning
//! must be shown, before the main surface is activated.
//!
//! The flow is a state machine driven by explicit events. UI layers show
//! the [`Prompt`]s and [`Step`]s it returns and feed user or host answers
//! back as [`GateEvent`]s; nothing here depends on a UI toolkit.

mod controller;

pub use controller::GatingController;

use crate::capability::CapabilityLevel;
use crate::permissions::{PermissionOutcome, PermissionSet};
use std::fmt;

/// Prefix of the scoped-storage warning; the data directory path follows it.
pub const STORAGE_WARNING_TEMPLATE: &str = "This device restricts storage access. \
The emulator can only read games, firmware and save data placed inside its own folder:\n";

/// Restoration hint given by the host when it invokes the entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchKind {
    ColdStart,
    /// The host tore down and recreated the entry point (e.g. configuration change)
    Recreated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    CapabilityInsufficient,
    PermissionDenied,
    /// The acknowledged storage warning could not be persisted
    SettingsPersistenceFailure,
    /// Required emulator folders could not be created
    EnvironmentSetupFailure,
}

impl BlockReason {
    /// Short notice shown before the session ends.
    pub fn notice(&self) -> &'static str {
        match self {
            BlockReason::CapabilityInsufficient => {
                "This device does not support OpenGL ES 3.0, which the emulator requires."
            }
            BlockReason::PermissionDenied => "Storage permission is required to run the emulator.",
            BlockReason::SettingsPersistenceFailure => {
                "Could not save settings. Please check free storage space and try again."
            }
            BlockReason::EnvironmentSetupFailure => {
                "Could not create the emulator data folders. Please check storage access."
            }
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockReason::CapabilityInsufficient => "capability_insufficient",
            BlockReason::PermissionDenied => "permission_denied",
            BlockReason::SettingsPersistenceFailure => "settings_persistence_failure",
            BlockReason::EnvironmentSetupFailure => "environment_setup_failure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Start,
    AwaitingPermission,
    CheckingCapability,
    CheckingStorageWarning,
    Ready,
    Blocked(BlockReason),
}

/// Modal, non-dismissible dialog with a single acknowledgment action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Acknowledging ends the session
    CapabilityInsufficient {
        required: CapabilityLevel,
        reported: CapabilityLevel,
    },
    /// Acknowledging persists the warning flag and proceeds
    StorageWarning { message: String },
}

impl Prompt {
    pub fn title(&self) -> &'static str {
        match self {
            Prompt::CapabilityInsufficient { .. } => "Error",
            Prompt::StorageWarning { .. } => "Warning",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Prompt::CapabilityInsufficient { required, reported } => format!(
                "OpenGL ES {required} or newer is required. This device reports OpenGL ES {reported}."
            ),
            Prompt::StorageWarning { message } => message.clone(),
        }
    }

    pub fn ends_session(&self) -> bool {
        matches!(self, Prompt::CapabilityInsufficient { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    /// The host's single answer to an outstanding permission request
    PermissionOutcome(PermissionOutcome),
    /// The user confirmed the dialog currently shown
    Acknowledge,
}

impl GateEvent {
    fn name(&self) -> &'static str {
        match self {
            GateEvent::PermissionOutcome(_) => "permission_outcome",
            GateEvent::Acknowledge => "acknowledge",
        }
    }
}

/// What the host has to do after a call into the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A permission request was issued; deliver its outcome as an event
    AwaitingPermission(PermissionSet),
    /// Show this dialog; deliver [`GateEvent::Acknowledge`] when confirmed
    Prompt(Prompt),
    /// The presentation surface has been activated
    Ready,
    /// Show the reason's notice and end the session
    SessionEnded(BlockReason),
}

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Gating flow already started (state: {0:?})")]
    AlreadyStarted(GateState),
    #[error("Unexpected {event} event in state {state:?}")]
    UnexpectedEvent {
        event: &'static str,
        state: GateState,
    },
}

/// Compose the scoped-storage warning for the given data directory.
pub fn storage_warning_message(data_dir: &std::path::Path) -> String {
    format!("{STORAGE_WARNING_TEMPLATE}{}", data_dir.display())
}
