pub mod ports;
pub mod transform_use_case;
pub mod batch_use_case;
