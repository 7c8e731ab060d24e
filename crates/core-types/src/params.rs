use std::collections::BTreeMap;

/// A concrete assignment of integer values to a strategy's tunable parameters.
///
/// A `BTreeMap` keeps iteration (and therefore serialization and log output)
/// in a stable order, which keeps optimizer runs reproducible.
pub type ParameterSet = BTreeMap<String, i64>;
