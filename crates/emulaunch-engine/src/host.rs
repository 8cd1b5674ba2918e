//! Host-side collaborators consumed by the gating controller, and the
//! bundle that injects them.

use crate::capability::{CapabilityLevel, CapabilityProbe};
use crate::io::IoError;
use crate::permissions::PermissionBroker;
use crate::settings::SettingsStore;
use std::path::Path;

/// Whether the host enforces scoped (restricted) storage access.
pub trait StoragePolicyOracle {
    fn is_legacy_model(&self) -> bool;
}

/// The emulator's on-disk environment.
pub trait EmulatorEnvironment {
    fn data_dir(&self) -> &Path;

    /// Create any missing folders the engine needs. Idempotent.
    fn initialize_folders(&self) -> Result<(), IoError>;
}

/// Main application surface shown once gating succeeds.
pub trait PresentationSurface {
    /// Route the session's volume keys to the media stream.
    fn bind_volume_to_media(&mut self);

    fn activate(&mut self);
}

pub struct Collaborators {
    pub capability: Box<dyn CapabilityProbe>,
    pub storage_policy: Box<dyn StoragePolicyOracle>,
    pub permissions: Box<dyn PermissionBroker>,
    pub settings: Box<dyn SettingsStore>,
    pub environment: Box<dyn EmulatorEnvironment>,
    pub surface: Box<dyn PresentationSurface>,
}

/// Capability probe that always reports the same level.
#[derive(Debug, Clone, Copy)]
pub struct FixedCapability(pub CapabilityLevel);

impl CapabilityProbe for FixedCapability {
    fn current_level(&self) -> CapabilityLevel {
        self.0
    }
}

/// Storage policy decided up front, e.g. from configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedStoragePolicy {
    pub legacy: bool,
}

impl StoragePolicyOracle for FixedStoragePolicy {
    fn is_legacy_model(&self) -> bool {
        self.legacy
    }
}
