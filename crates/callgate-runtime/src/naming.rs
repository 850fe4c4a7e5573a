//! Names of generated code units
//!
//! Translated code is assembled into units named `GeneratedClass<id>`,
//! where `<id>` comes from the native compiler library of the running
//! generation. Resolving the owner of a callback back into generated code
//! uses the same name.

use once_cell::sync::OnceCell;

/// Prefix of every generated unit name
pub const GENERATED_UNIT_PREFIX: &str = "GeneratedClass";

/// Supplies the generation-specific identifier. Treated as opaque.
pub trait GenerationIdSupplier: Send + Sync {
    /// Identifier of the current generation
    fn generation_id(&self) -> String;
}

impl<F> GenerationIdSupplier for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generation_id(&self) -> String {
        self()
    }
}

/// A generation id known up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedGenerationId(pub String);

impl GenerationIdSupplier for FixedGenerationId {
    fn generation_id(&self) -> String {
        self.0.clone()
    }
}

/// `GeneratedClass<id>` for the supplier's current id
pub fn generated_unit_name(supplier: &dyn GenerationIdSupplier) -> String {
    format!("{}{}", GENERATED_UNIT_PREFIX, supplier.generation_id())
}

/// Computes the unit name once and hands out the same name afterwards.
pub struct UnitNamer<S: GenerationIdSupplier> {
    supplier: S,
    name: OnceCell<String>,
}

impl<S: GenerationIdSupplier> UnitNamer<S> {
    /// Wrap a supplier; it is not consulted until the first `name()` call
    pub fn new(supplier: S) -> Self {
        UnitNamer {
            supplier,
            name: OnceCell::new(),
        }
    }

    /// The unit name
    pub fn name(&self) -> &str {
        self.name.get_or_init(|| generated_unit_name(&self.supplier))
    }
}
