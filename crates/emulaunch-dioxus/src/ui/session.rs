//! Bridges the gating controller to the UI: turns controller steps into a
//! view to render and user actions into gate events.

use crate::platform::{self, HostCapabilityProbe, HostPermissionBroker, HostStoragePolicy};
use emulaunch_config::{AppDataStore, Config};
use emulaunch_engine::io::DataDirEnvironment;
use emulaunch_engine::{
    BlockReason, CapabilityLevel, Collaborators, GateError, GatingController, LaunchKind,
    PermissionOutcome, PermissionSet, PresentationSurface, Prompt, Step,
};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum GateView {
    Starting,
    AwaitingPermission(PermissionSet),
    Prompt(Prompt),
    Apps,
    Ended(BlockReason),
    /// The gate could not be set up at all
    Failed(String),
}

/// Flips a shared flag the view reads once the gate hands off.
pub struct HostSurface {
    activated: Rc<Cell<bool>>,
}

impl PresentationSurface for HostSurface {
    fn bind_volume_to_media(&mut self) {
        platform::bind_volume_to_media();
    }

    fn activate(&mut self) {
        self.activated.set(true);
    }
}

pub struct GateSession {
    controller: Option<GatingController>,
    view: GateView,
    activated: Rc<Cell<bool>>,
}

impl GateSession {
    /// Wire the host collaborators from `config` and run the gate's entry point.
    pub fn launch(config: &Config) -> Self {
        let activated = Rc::new(Cell::new(false));
        match build_controller(config, activated.clone()) {
            Ok(controller) => Self::start(controller, activated),
            Err(e) => {
                log::error!("Failed to set up startup gate: {e:#}");
                Self {
                    controller: None,
                    view: GateView::Failed(format!("{e:#}")),
                    activated,
                }
            }
        }
    }

    /// Start an already wired controller whose surface reports into `activated`.
    pub fn start(mut controller: GatingController, activated: Rc<Cell<bool>>) -> Self {
        let result = controller.start(LaunchKind::ColdStart);
        let mut session = Self {
            controller: Some(controller),
            view: GateView::Starting,
            activated,
        };
        session.apply(result);
        session
    }

    pub fn view(&self) -> &GateView {
        &self.view
    }

    /// Confirm the current dialog. Returns `true` when the session must end now.
    pub fn acknowledge(&mut self) -> bool {
        let Some(controller) = self.controller.as_mut() else {
            return false;
        };
        let result = controller.acknowledge();
        self.apply(result);
        matches!(self.view, GateView::Ended(BlockReason::CapabilityInsufficient))
    }

    /// The user came back from the permission screen; deliver what the host now reports.
    pub fn permission_answered(&mut self) {
        let GateView::AwaitingPermission(requested) = &self.view else {
            return;
        };
        let outcome: PermissionOutcome = requested
            .iter()
            .map(|p| (p.clone(), platform::check_permission(p.as_str())))
            .collect();
        self.permission_outcome(outcome);
    }

    pub fn permission_outcome(&mut self, outcome: PermissionOutcome) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        let result = controller.permission_outcome(outcome);
        self.apply(result);
    }

    fn apply(&mut self, result: Result<Step, GateError>) {
        self.view = match result {
            Ok(Step::AwaitingPermission(set)) => GateView::AwaitingPermission(set),
            Ok(Step::Prompt(prompt)) => GateView::Prompt(prompt),
            Ok(Step::Ready) if self.activated.get() => GateView::Apps,
            Ok(Step::Ready) => {
                GateView::Failed("Startup finished without activating the app list".to_string())
            }
            Ok(Step::SessionEnded(reason)) => GateView::Ended(reason),
            Err(e) => {
                log::warn!("{e}");
                return;
            }
        };
    }
}

fn build_controller(
    config: &Config,
    activated: Rc<Cell<bool>>,
) -> anyhow::Result<GatingController> {
    let store = AppDataStore::open(config.settings_path())?;

    Ok(GatingController::new(Collaborators {
        capability: Box::new(HostCapabilityProbe {
            override_level: config.gles_version_override.map(CapabilityLevel::from_raw),
        }),
        storage_policy: Box::new(HostStoragePolicy {
            force_scoped: config.force_scoped_storage,
        }),
        permissions: Box::new(HostPermissionBroker),
        settings: Box::new(store),
        environment: Box::new(DataDirEnvironment::new(config.data_dir.clone())),
        surface: Box::new(HostSurface { activated }),
    }))
}
