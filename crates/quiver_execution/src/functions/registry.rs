use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use quiver_error::{ErrorKind, QuiverError, Result};

use super::builtin;
use super::ScalarKernel;
use crate::expr::FunctionOptions;

/// A resolved kernel plus the options overlay contributed by the
/// alias the lookup went through (empty for canonical lookups).
#[derive(Debug, Clone)]
pub struct KernelBinding {
    pub kernel: Arc<dyn ScalarKernel>,
    pub options_overlay: FunctionOptions,
}

impl KernelBinding {
    /// Merge caller-supplied options with the alias overlay.
    ///
    /// Overlay fields are pinned: a caller-supplied value for a pinned
    /// field is ignored, the alias is the contract.
    pub fn merge_options(&self, caller: &FunctionOptions) -> FunctionOptions {
        let mut merged = caller.clone();
        for (key, value) in &self.options_overlay {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

#[derive(Debug, Clone)]
struct AliasBinding {
    canonical: String,
    overlay: FunctionOptions,
}

/// Maps expression call names to native compute kernels.
///
/// Two name spaces: canonical kernel names, and aliases mapping
/// host-language function names to a canonical kernel plus a fixed
/// options overlay. Populated once at startup, read-only after.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    kernels: HashMap<String, Arc<dyn ScalarKernel>, ahash::RandomState>,
    aliases: HashMap<String, AliasBinding, ahash::RandomState>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        FunctionRegistry::default()
    }

    pub fn register(&mut self, kernel: Arc<dyn ScalarKernel>) {
        self.kernels.insert(kernel.name().to_string(), kernel);
    }

    /// Register an alias for a canonical kernel name, optionally
    /// pinning option fields.
    pub fn register_alias(
        &mut self,
        alias: impl Into<String>,
        canonical: impl Into<String>,
        overlay: FunctionOptions,
    ) -> Result<()> {
        let canonical = canonical.into();
        if !self.kernels.contains_key(&canonical) {
            return Err(QuiverError::with_kind(
                ErrorKind::InvalidArgument,
                format!("Cannot alias unknown kernel: {canonical}"),
            ));
        }
        self.aliases
            .insert(alias.into(), AliasBinding { canonical, overlay });
        Ok(())
    }

    /// Resolve a call name to a kernel binding.
    ///
    /// Canonical names resolve directly. Alias resolution is
    /// exact-name match only; qualified references (containing "::")
    /// never resolve through the alias table, forcing such calls to
    /// the fallback bridge.
    pub fn resolve(&self, name: &str) -> Option<KernelBinding> {
        if let Some(kernel) = self.kernels.get(name) {
            return Some(KernelBinding {
                kernel: kernel.clone(),
                options_overlay: FunctionOptions::new(),
            });
        }

        if name.contains("::") {
            return None;
        }

        let alias = self.aliases.get(name)?;
        let kernel = self.kernels.get(&alias.canonical)?;
        Some(KernelBinding {
            kernel: kernel.clone(),
            options_overlay: alias.overlay.clone(),
        })
    }

    /// All canonical kernel names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.kernels.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

static DEFAULT_REGISTRY: Lazy<Arc<FunctionRegistry>> =
    Lazy::new(|| Arc::new(builtin::builtin_registry()));

/// The process-wide registry holding the builtin kernels.
pub fn default_registry() -> Arc<FunctionRegistry> {
    DEFAULT_REGISTRY.clone()
}

#[cfg(test)]
mod tests {
    use quiver_array::scalar::ScalarValue;

    use super::*;

    #[test]
    fn canonical_resolution() {
        let registry = default_registry();
        let binding = registry.resolve("is_null").unwrap();
        assert_eq!("is_null", binding.kernel.name());
        assert!(binding.options_overlay.is_empty());

        assert!(registry.resolve("definitely_not_registered").is_none());
    }

    #[test]
    fn alias_resolution_with_overlay() {
        let registry = default_registry();
        let binding = registry.resolve("is_nan_or_null").unwrap();
        assert_eq!("is_null", binding.kernel.name());
        assert_eq!(
            Some(&ScalarValue::Boolean(true)),
            binding.options_overlay.get("nan_is_null")
        );
    }

    #[test]
    fn overlay_pins_fields() {
        let registry = default_registry();
        let binding = registry.resolve("is_nan_or_null").unwrap();

        let caller =
            FunctionOptions::from([("nan_is_null".to_string(), ScalarValue::Boolean(false))]);
        let merged = binding.merge_options(&caller);
        assert_eq!(Some(&ScalarValue::Boolean(true)), merged.get("nan_is_null"));
    }

    #[test]
    fn qualified_names_skip_the_alias_table() {
        let mut registry = builtin::builtin_registry();
        registry
            .register_alias("pkg::is_null", "is_null", FunctionOptions::new())
            .unwrap();

        // Registered, but qualified: never resolves through aliases.
        assert!(registry.resolve("pkg::is_null").is_none());
    }

    #[test]
    fn alias_to_unknown_kernel_errors() {
        let mut registry = FunctionRegistry::new();
        let err = registry
            .register_alias("x", "nope", FunctionOptions::new())
            .unwrap_err();
        assert_eq!(ErrorKind::InvalidArgument, err.kind());
    }

    #[test]
    fn list_is_sorted() {
        let registry = default_registry();
        let names = registry.list();
        assert!(names.contains(&"add"));
        assert!(names.contains(&"is_null"));
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, names);
    }
}
