//! Runtime switches read from the environment.
//!
//! Each switch is read once and cached for the life of the process.

use std::sync::OnceLock;

/// Forces every row through the scalar tier when truthy.
pub(crate) const FORCE_SCALAR_VAR: &str = "ROWDELTA_FORCE_SCALAR";

/// `1`, `true`, `yes` or `on`, case-insensitive, surrounding whitespace ignored.
#[inline]
pub(crate) fn is_truthy(raw: &str) -> bool {
    let normalized = raw.trim().to_ascii_lowercase();
    matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
}

#[inline]
fn env_var_truthy(var_name: &str) -> bool {
    std::env::var(var_name)
        .map(|raw| is_truthy(&raw))
        .unwrap_or(false)
}

/// Whether the vector tiers were switched off through [`FORCE_SCALAR_VAR`].
#[inline]
pub(crate) fn force_scalar() -> bool {
    static VALUE: OnceLock<bool> = OnceLock::new();
    *VALUE.get_or_init(|| {
        let forced = env_var_truthy(FORCE_SCALAR_VAR);
        if forced {
            log::debug!("{FORCE_SCALAR_VAR} set, vector row tiers disabled");
        }
        forced
    })
}
