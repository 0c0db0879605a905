// Core modules: the dynamic value model, scalar coercion, and error modeling.
pub mod error;
pub mod scalar;
pub mod value;
