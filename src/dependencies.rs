use crate::error::{DriverError, Result};
use crate::host::HostCapabilities;
use crate::traits::ModuleResolver;
use crate::types::{Credentials, Dependency, DependencyKind, InstallAction};

/// Verifies that every declared package dependency is installed at the required version.
///
/// Script dependencies are not verified. Each package is re-detected through
/// [`ModuleResolver::reload`], so a package installed since the last check is seen.
///
/// Returns `Ok(false)` when all dependencies are satisfied; failures are errors.
pub fn need_to_install_dependencies(
    dependencies: &[Dependency],
    credentials: &Credentials,
    host: &HostCapabilities,
    resolver: &dyn ModuleResolver,
) -> Result<bool> {
    if !host.native_runtime {
        return Err(DriverError::UnsupportedHost);
    }
    if dependencies.is_empty() {
        return Ok(false);
    }

    for dep in dependencies.iter().filter(|d| d.kind == DependencyKind::Package) {
        let action = match resolver.reload(&dep.name) {
            Ok(installed) => match &dep.version {
                Some(required) if installed.version != *required => {
                    tracing::debug!(
                        module = %dep.name,
                        installed = %installed.version,
                        required = %required,
                        "dependency version mismatch"
                    );
                    Some(InstallAction::Upgrade)
                }
                _ => None,
            },
            Err(e) => {
                tracing::debug!(module = %dep.name, error = %e, "dependency not installed");
                Some(InstallAction::Install)
            }
        };

        if let Some(action) = action {
            return Err(DriverError::MissingDependencies {
                dependencies: dependencies.to_vec(),
                credentials: Box::new(credentials.clone()),
                action,
            });
        }
    }

    Ok(false)
}
