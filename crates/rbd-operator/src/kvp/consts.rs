/// The key of the label marking resources as created by the operator.
pub const BELONG_TO_KEY: &str = "belongTo";

/// The value of the [`BELONG_TO_KEY`] label.
pub const BELONG_TO_VALUE: &str = "rainbond-operator";

/// The key of the label describing the access mode of a volume claim, e.g.
/// `rwx`.
pub const ACCESS_MODES_KEY: &str = "accessModes";

pub const ACCESS_MODE_RWX: &str = "rwx";
pub const ACCESS_MODE_RWO: &str = "rwo";
