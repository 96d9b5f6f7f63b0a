//! Loading compiled units from their binary form.

use pascalc_compiler::{Unit, artifact, unit::CLINIT};
use pascalc_core::ArtifactError;
use tracing::debug;

/// Decode and validate an artifact.
pub fn load(bytes: &[u8]) -> Result<Unit, ArtifactError> {
    let unit = artifact::decode(bytes)?;
    debug!(
        unit = %unit.name,
        methods = unit.methods.len(),
        has_static_init = unit.method_id(CLINIT).is_some(),
        "unit loaded"
    );
    Ok(unit)
}
