/// Default parameter declarations
pub mod defaults;
/// Parameter, value and constraint types
pub mod parameter;
/// Parameter registry
pub mod store;
pub use parameter::{Constraint, ParamKind, ParamValue, Parameter};
pub use store::ParameterStore;
