pub mod domain;
pub mod error;
pub mod machine_code;
pub mod protocol;
