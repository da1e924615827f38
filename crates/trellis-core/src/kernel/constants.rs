/// Id given to the anonymous descriptor used by `Kernel::build`
pub const TRANSIENT_ID: &str = "transient";
