use std::path::Path;

use serde_json::Value;

use super::expect_str;
use crate::errors::{ValidationError, ValidationResult};
use crate::probe::FsProbe;
use crate::rules::{PathRule, PathType};

/// Validate a filesystem path. The type check only applies to paths that
/// exist; a missing path passes unless `exists` is set.
pub(super) fn coerce_path(
    probe: &dyn FsProbe,
    options: &PathRule,
    raw: &Value,
    path: &str,
) -> ValidationResult<Value> {
    let value = expect_str(raw, path, "a path")?.trim();
    if value.is_empty() {
        return Err(ValidationError::type_mismatch(path, "a non-empty path", "\"\""));
    }

    let target = Path::new(value);
    let exists = probe.exists(target);
    tracing::trace!("Probed path {} for {}: exists={}", value, path, exists);

    if options.exists && !exists {
        return Err(ValidationError::existence(
            path,
            "exists",
            format!("path does not exist: {}", value),
        )
        .with_actual(value));
    }

    if let (Some(wanted), true) = (options.path_type, exists) {
        let stat = probe.stat(target).map_err(|e| {
            ValidationError::existence(path, "readable", format!("cannot read {}: {}", value, e))
                .with_actual(value)
        })?;

        let matches = match wanted {
            PathType::File => stat.is_file,
            PathType::Dir => stat.is_dir,
        };
        if !matches {
            return Err(ValidationError::existence(
                path,
                "pathType",
                format!("path is not a {}: {}", wanted, value),
            )
            .with_expected(wanted.to_string())
            .with_actual(value));
        }
    }

    Ok(Value::String(value.to_string()))
}
