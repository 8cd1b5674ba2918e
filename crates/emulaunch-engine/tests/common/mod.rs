//! Recording fakes for driving the gating controller in tests.

#![allow(dead_code)]

use emulaunch_engine::io::IoError;
use emulaunch_engine::{
    CapabilityLevel, CapabilityProbe, Collaborators, EmulatorEnvironment, FixedStoragePolicy,
    GatingController, Permission, PermissionBroker, PermissionSet, PresentationSurface,
    SettingsError, SettingsStore,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CapabilityQueried,
    PermissionRequested(Vec<String>),
    SettingsRead(String),
    SettingsPut(String, bool),
    SettingsCommit { ok: bool },
    FoldersInitialized,
    VolumeBound,
    SurfaceActivated,
}

#[derive(Debug, Default)]
pub struct HostState {
    pub calls: Vec<Call>,
    pub granted: bool,
    /// Answer the simulated user gives when a permission request is shown
    pub grant_on_request: bool,
    pub staged: BTreeMap<String, bool>,
    pub committed: BTreeMap<String, bool>,
    pub commit_failures: usize,
}

pub type Shared = Rc<RefCell<HostState>>;

struct Probe {
    level: CapabilityLevel,
    host: Shared,
}

impl CapabilityProbe for Probe {
    fn current_level(&self) -> CapabilityLevel {
        self.host.borrow_mut().calls.push(Call::CapabilityQueried);
        self.level
    }
}

struct Broker {
    host: Shared,
}

impl PermissionBroker for Broker {
    fn is_granted(&self, _permission: &Permission) -> bool {
        self.host.borrow().granted
    }

    fn request(&mut self, permissions: &PermissionSet) {
        let mut host = self.host.borrow_mut();
        let names = permissions.iter().map(|p| p.as_str().to_string()).collect();
        host.calls.push(Call::PermissionRequested(names));
        host.granted = host.grant_on_request;
    }
}

struct Settings {
    host: Shared,
}

impl SettingsStore for Settings {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        let mut host = self.host.borrow_mut();
        host.calls.push(Call::SettingsRead(key.to_string()));
        host.staged.get(key).copied().unwrap_or(default)
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        let mut host = self.host.borrow_mut();
        host.calls.push(Call::SettingsPut(key.to_string(), value));
        host.staged.insert(key.to_string(), value);
    }

    fn commit(&mut self) -> Result<(), SettingsError> {
        let mut host = self.host.borrow_mut();
        if host.commit_failures > 0 {
            host.commit_failures -= 1;
            host.calls.push(Call::SettingsCommit { ok: false });
            return Err(SettingsError::Commit("disk full".to_string()));
        }
        host.calls.push(Call::SettingsCommit { ok: true });
        host.committed = host.staged.clone();
        Ok(())
    }
}

struct Environment {
    data_dir: PathBuf,
    fail: bool,
    host: Shared,
}

impl EmulatorEnvironment for Environment {
    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn initialize_folders(&self) -> Result<(), IoError> {
        if self.fail {
            return Err(IoError::InvalidDataDir("read-only".to_string()));
        }
        self.host.borrow_mut().calls.push(Call::FoldersInitialized);
        Ok(())
    }
}

struct Surface {
    host: Shared,
}

impl PresentationSurface for Surface {
    fn bind_volume_to_media(&mut self) {
        self.host.borrow_mut().calls.push(Call::VolumeBound);
    }

    fn activate(&mut self) {
        self.host.borrow_mut().calls.push(Call::SurfaceActivated);
    }
}

/// Describes the host a gating run starts on.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub legacy: bool,
    pub granted: bool,
    pub grant_on_request: bool,
    pub level: u32,
    pub warning_shown: bool,
    pub commit_failures: usize,
    pub folders_fail: bool,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            legacy: false,
            granted: true,
            grant_on_request: true,
            level: 0x30000,
            warning_shown: false,
            commit_failures: 0,
            folders_fail: false,
        }
    }
}

impl Scenario {
    pub fn build(self) -> (GatingController, Shared) {
        let host = Rc::new(RefCell::new(HostState {
            granted: self.granted,
            grant_on_request: self.grant_on_request,
            commit_failures: self.commit_failures,
            ..HostState::default()
        }));
        if self.warning_shown {
            let mut state = host.borrow_mut();
            state.staged.insert("storage_warning_shown".to_string(), true);
            state.committed.insert("storage_warning_shown".to_string(), true);
        }

        let controller = GatingController::new(Collaborators {
            capability: Box::new(Probe {
                level: CapabilityLevel::from_raw(self.level),
                host: host.clone(),
            }),
            storage_policy: Box::new(FixedStoragePolicy {
                legacy: self.legacy,
            }),
            permissions: Box::new(Broker { host: host.clone() }),
            settings: Box::new(Settings { host: host.clone() }),
            environment: Box::new(Environment {
                data_dir: PathBuf::from("/storage/emulated/0/emulaunch"),
                fail: self.folders_fail,
                host: host.clone(),
            }),
            surface: Box::new(Surface { host: host.clone() }),
        });

        (controller, host)
    }
}

pub fn calls(host: &Shared) -> Vec<Call> {
    host.borrow().calls.clone()
}

pub fn count(host: &Shared, call: &Call) -> usize {
    host.borrow().calls.iter().filter(|c| *c == call).count()
}

pub fn position(host: &Shared, call: &Call) -> Option<usize> {
    host.borrow().calls.iter().position(|c| c == call)
}

pub fn committed_flag(host: &Shared) -> Option<bool> {
    host.borrow().committed.get("storage_warning_shown").copied()
}
