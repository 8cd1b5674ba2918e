//! Platform-specific functionality
//!
//! Host answers for the startup gate: graphics capability, storage policy,
//! permissions, volume routing and ending the session. Android goes through
//! JNI; desktop hosts have unrestricted storage and a capable GPU unless the
//! config says otherwise.

#[cfg(target_os = "android")]
mod android;

#[cfg(target_os = "android")]
pub use android::*;

use emulaunch_engine::{
    CapabilityLevel, CapabilityProbe, Permission, PermissionBroker, PermissionSet,
    StoragePolicyOracle,
};

/// Reads the device's graphics capability, unless overridden by config.
pub struct HostCapabilityProbe {
    pub override_level: Option<CapabilityLevel>,
}

impl CapabilityProbe for HostCapabilityProbe {
    fn current_level(&self) -> CapabilityLevel {
        self.override_level.unwrap_or_else(gles_version)
    }
}

pub struct HostStoragePolicy {
    pub force_scoped: bool,
}

impl StoragePolicyOracle for HostStoragePolicy {
    fn is_legacy_model(&self) -> bool {
        !self.force_scoped && is_external_storage_legacy()
    }
}

pub struct HostPermissionBroker;

impl PermissionBroker for HostPermissionBroker {
    fn is_granted(&self, permission: &Permission) -> bool {
        check_permission(permission.as_str())
    }

    fn request(&mut self, permissions: &PermissionSet) {
        log::info!("Requesting permissions: {permissions:?}");
        if !request_permissions() {
            log::warn!("Could not open the permission settings page");
        }
    }
}

/// Graphics capability reported by the host.
///
/// Desktop GL drivers are assumed to cover GLES 3.0.
#[cfg(not(target_os = "android"))]
pub fn gles_version() -> CapabilityLevel {
    CapabilityLevel::MINIMUM
}

/// Desktop file systems are not scoped.
#[cfg(not(target_os = "android"))]
pub fn is_external_storage_legacy() -> bool {
    true
}

#[cfg(not(target_os = "android"))]
pub fn check_permission(_permission: &str) -> bool {
    true
}

/// Open wherever the user grants storage access.
///
/// On non-Android platforms, this is a no-op.
/// Returns `true` if the request was initiated successfully.
#[cfg(not(target_os = "android"))]
pub fn request_permissions() -> bool {
    true
}

#[cfg(not(target_os = "android"))]
pub fn bind_volume_to_media() {
    log::debug!("Volume routing is managed by the desktop mixer");
}

#[cfg(not(target_os = "android"))]
pub fn finish_session() {
    log::info!("Session finished");
    std::process::exit(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_over_host_report() {
        let probe = HostCapabilityProbe {
            override_level: Some(CapabilityLevel::from_raw(0x20000)),
        };

        assert_eq!(probe.current_level(), CapabilityLevel::from_raw(0x20000));
    }

    #[test]
    fn test_forced_scoped_storage_is_never_legacy() {
        let policy = HostStoragePolicy { force_scoped: true };

        assert!(!policy.is_legacy_model());
    }

    #[cfg(not(target_os = "android"))]
    #[test]
    fn test_desktop_host_defaults() {
        let probe = HostCapabilityProbe {
            override_level: None,
        };
        let policy = HostStoragePolicy {
            force_scoped: false,
        };

        assert!(probe.current_level().meets_minimum());
        assert!(policy.is_legacy_model());
        assert!(HostPermissionBroker.is_granted(&Permission::write_external_storage()));
    }
}
