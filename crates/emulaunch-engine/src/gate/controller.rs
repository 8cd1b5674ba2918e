use super::{
    BlockReason, GateError, GateEvent, GateState, LaunchKind, Prompt, Step,
    storage_warning_message,
};
use crate::capability::CapabilityLevel;
use crate::host::Collaborators;
use crate::permissions::{PermissionOutcome, PermissionSet};
use crate::settings::{STORAGE_WARNING_SHOWN, SettingsStore};

/// Runs the startup gating flow once per process.
///
/// Ordering is fixed: permission, then capability, then the storage warning,
/// then activation. Capability is always confirmed before any settings read.
pub struct GatingController {
    services: Collaborators,
    permissions: PermissionSet,
    state: GateState,
    history: Vec<GateState>,
    prompt: Option<Prompt>,
    legacy_storage: bool,
    started: bool,
    activated: bool,
}

impl GatingController {
    pub fn new(services: Collaborators) -> Self {
        Self {
            services,
            permissions: PermissionSet::storage(),
            state: GateState::Start,
            history: vec![GateState::Start],
            prompt: None,
            legacy_storage: false,
            started: false,
            activated: false,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Every state entered so far, oldest first.
    pub fn history(&self) -> &[GateState] {
        &self.history
    }

    /// Dialog currently waiting for acknowledgment, if any.
    pub fn pending_prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        &*self.services.settings
    }

    /// Entry point. May be called once; the flow never restarts from the host.
    pub fn start(&mut self, launch: LaunchKind) -> Result<Step, GateError> {
        if self.started {
            return Err(GateError::AlreadyStarted(self.state));
        }
        self.started = true;
        log::info!("Gating flow starting ({launch:?})");
        Ok(self.enter_start(false))
    }

    pub fn handle(&mut self, event: GateEvent) -> Result<Step, GateError> {
        match (self.state, event) {
            (GateState::AwaitingPermission, GateEvent::PermissionOutcome(outcome)) => {
                Ok(self.on_permission_outcome(&outcome))
            }
            (GateState::CheckingStorageWarning, GateEvent::Acknowledge)
                if matches!(self.prompt, Some(Prompt::StorageWarning { .. })) =>
            {
                Ok(self.confirm_storage_warning())
            }
            (GateState::Blocked(reason), GateEvent::Acknowledge) if self.prompt.is_some() => {
                self.prompt = None;
                log::info!("Blocking dialog acknowledged, ending session ({reason})");
                Ok(Step::SessionEnded(reason))
            }
            (state, event) => {
                log::warn!("Ignoring {} event in state {state:?}", event.name());
                Err(GateError::UnexpectedEvent {
                    event: event.name(),
                    state,
                })
            }
        }
    }

    pub fn permission_outcome(&mut self, outcome: PermissionOutcome) -> Result<Step, GateError> {
        self.handle(GateEvent::PermissionOutcome(outcome))
    }

    pub fn acknowledge(&mut self) -> Result<Step, GateError> {
        self.handle(GateEvent::Acknowledge)
    }

    fn transition(&mut self, next: GateState) {
        log::debug!("Gate transition {:?} -> {next:?}", self.state);
        self.state = next;
        self.history.push(next);
    }

    fn block(&mut self, reason: BlockReason) -> Step {
        log::warn!("Gating blocked: {reason}");
        self.transition(GateState::Blocked(reason));
        Step::SessionEnded(reason)
    }

    /// `after_grant` is set when re-entering after every permission was granted.
    fn enter_start(&mut self, after_grant: bool) -> Step {
        if self.state != GateState::Start {
            self.transition(GateState::Start);
        }

        self.legacy_storage = self.services.storage_policy.is_legacy_model();
        let missing = self
            .permissions
            .iter()
            .filter(|p| !self.services.permissions.is_granted(p))
            .count();

        if self.legacy_storage || missing == 0 {
            return self.check_capability();
        }

        if after_grant {
            log::warn!("Host reported {missing} permission(s) still missing after a grant");
            return self.block(BlockReason::PermissionDenied);
        }

        log::info!("Requesting {} storage permission(s)", self.permissions.len());
        self.transition(GateState::AwaitingPermission);
        self.services.permissions.request(&self.permissions);
        Step::AwaitingPermission(self.permissions.clone())
    }

    fn on_permission_outcome(&mut self, outcome: &PermissionOutcome) -> Step {
        let denied = outcome.denied(&self.permissions);
        if denied.is_empty() {
            log::info!("All permissions granted, re-evaluating from start");
            return self.enter_start(true);
        }

        for permission in denied {
            log::warn!("Permission denied: {permission}");
        }
        self.block(BlockReason::PermissionDenied)
    }

    fn check_capability(&mut self) -> Step {
        self.transition(GateState::CheckingCapability);

        let reported = self.services.capability.current_level();
        if !reported.meets_minimum() {
            log::error!(
                "Graphics capability {reported} is below the required {}",
                CapabilityLevel::MINIMUM
            );
            let prompt = Prompt::CapabilityInsufficient {
                required: CapabilityLevel::MINIMUM,
                reported,
            };
            self.transition(GateState::Blocked(BlockReason::CapabilityInsufficient));
            self.prompt = Some(prompt.clone());
            return Step::Prompt(prompt);
        }

        log::info!("Graphics capability {reported} OK");
        self.check_storage_warning()
    }

    fn check_storage_warning(&mut self) -> Step {
        self.transition(GateState::CheckingStorageWarning);

        let warning_shown = self.services.settings.get_bool(STORAGE_WARNING_SHOWN, false);
        if self.legacy_storage || warning_shown {
            return self.enter_ready();
        }

        let message = storage_warning_message(self.services.environment.data_dir());
        log::info!("Showing scoped storage warning");
        let prompt = Prompt::StorageWarning { message };
        self.prompt = Some(prompt.clone());
        Step::Prompt(prompt)
    }

    fn confirm_storage_warning(&mut self) -> Step {
        self.prompt = None;
        self.services.settings.put_bool(STORAGE_WARNING_SHOWN, true);

        // The flag must be durable before moving past the dialog.
        if let Err(first) = self.services.settings.commit() {
            log::warn!("{first}; retrying once");
            if let Err(e) = self.services.settings.commit() {
                log::error!("{e}");
                return self.block(BlockReason::SettingsPersistenceFailure);
            }
        }

        self.enter_ready()
    }

    fn enter_ready(&mut self) -> Step {
        if let Err(e) = self.services.environment.initialize_folders() {
            log::error!("Failed to prepare emulator folders: {e}");
            return self.block(BlockReason::EnvironmentSetupFailure);
        }

        self.transition(GateState::Ready);
        self.services.surface.bind_volume_to_media();
        if !self.activated {
            self.activated = true;
            log::info!("Activating presentation surface");
            self.services.surface.activate();
        }
        Step::Ready
    }
}
