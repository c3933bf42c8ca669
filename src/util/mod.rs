pub(crate) mod macros;
pub mod unit_convertor;
