// SPDX-License-Identifier: MIT OR Apache-2.0
//! Resource limits (configuration), supplied by the embedder at construction.
//!
//! There is no configuration file: an embedded interpreter core is configured
//! by its host application in process, the way the reference host-shell
//! project's own `System`/environment setup is assembled by its caller rather
//! than read from disk by the library itself.

/// Resource limits enforced by the core during evaluation.
///
/// All limits are soft guards against runaway scripts (unbounded recursion,
/// unbounded substitution blowup), not security boundaries; a host that needs
/// hard sandboxing enforces it in its own `Host` implementation.
#[derive(Clone, Debug)]
pub struct Limits {
    /// Maximum call-frame nesting depth (procedure calls, `uplevel`,
    /// `eval` nesting). Exceeding this raises `too many nested evaluations
    /// (infinite loop?)`, matching Tcl's own guard.
    pub max_nesting_depth: usize,

    /// Maximum number of bytes a single `subst`/command-substitution pass
    /// may produce before the core aborts it as unbounded.
    pub max_substitution_bytes: usize,
}

impl Limits {
    /// Matches the reference implementation's default recursion ceiling.
    pub const DEFAULT_MAX_NESTING_DEPTH: usize = 1000;
    pub const DEFAULT_MAX_SUBSTITUTION_BYTES: usize = 64 * 1024 * 1024;

    pub fn builder() -> LimitsBuilder {
        LimitsBuilder::default()
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_nesting_depth: Self::DEFAULT_MAX_NESTING_DEPTH,
            max_substitution_bytes: Self::DEFAULT_MAX_SUBSTITUTION_BYTES,
        }
    }
}

/// Builder for [`Limits`], so an embedder can override one field without
/// naming every other.
#[derive(Clone, Debug, Default)]
pub struct LimitsBuilder {
    limits: OptionLimits,
}

#[derive(Clone, Debug, Default)]
struct OptionLimits {
    max_nesting_depth: Option<usize>,
    max_substitution_bytes: Option<usize>,
}

impl LimitsBuilder {
    pub fn max_nesting_depth(mut self, value: usize) -> Self {
        self.limits.max_nesting_depth = Some(value);
        self
    }

    pub fn max_substitution_bytes(mut self, value: usize) -> Self {
        self.limits.max_substitution_bytes = Some(value);
        self
    }

    pub fn build(self) -> Limits {
        let defaults = Limits::default();
        Limits {
            max_nesting_depth: self.limits.max_nesting_depth.unwrap_or(defaults.max_nesting_depth),
            max_substitution_bytes: self
                .limits
                .max_substitution_bytes
                .unwrap_or(defaults.max_substitution_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let limits = Limits::default();
        assert_eq!(limits.max_nesting_depth, Limits::DEFAULT_MAX_NESTING_DEPTH);
        assert_eq!(
            limits.max_substitution_bytes,
            Limits::DEFAULT_MAX_SUBSTITUTION_BYTES
        );
    }

    #[test]
    fn builder_overrides_only_named_fields() {
        let limits = Limits::builder().max_nesting_depth(50).build();
        assert_eq!(limits.max_nesting_depth, 50);
        assert_eq!(
            limits.max_substitution_bytes,
            Limits::DEFAULT_MAX_SUBSTITUTION_BYTES
        );
    }
}
