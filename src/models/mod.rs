pub mod site;
pub mod solar;
