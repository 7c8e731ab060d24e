use crate::Strategy;
use crate::error::StrategyError;
use core_types::ParameterSet;
use serde::Serialize;

/// A tunable parameter as declared by a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterDecl {
    pub name: String,
    pub default: i64,
    /// Explicit search range. When `None`, [`heuristic_range`] decides.
    pub range: Option<(i64, i64)>,
}

impl ParameterDecl {
    pub fn new(name: &str, default: i64) -> Self {
        Self { name: name.to_string(), default, range: None }
    }

    pub fn with_range(mut self, low: i64, high: i64) -> Self {
        self.range = Some((low.min(high), low.max(high)));
        self
    }
}

/// A parameter with its resolved search range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    pub default: i64,
    pub low: i64,
    pub high: i64,
}

impl ParameterSpec {
    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.low, self.high)
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.low..=self.high).contains(&value)
    }
}

/// Search ranges by parameter naming convention.
///
/// Lookback-style names ("window", "period") search [5, 100], oscillator
/// levels ("threshold") search [10, 90], and anything else [1, 50].
pub fn heuristic_range(name: &str) -> (i64, i64) {
    if name.contains("window") || name.contains("period") {
        (5, 100)
    } else if name.contains("threshold") {
        (10, 90)
    } else {
        (1, 50)
    }
}

/// The ordered set of tunable parameters of a strategy and their ranges.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ParameterSchema {
    specs: Vec<ParameterSpec>,
}

impl ParameterSchema {
    /// Resolves declarations into specs. Defaults are clamped into range so
    /// that every set derived from the schema satisfies `low <= v <= high`.
    pub fn from_decls(decls: &[ParameterDecl]) -> Self {
        let specs = decls
            .iter()
            .map(|decl| {
                let (low, high) = decl.range.unwrap_or_else(|| heuristic_range(&decl.name));
                ParameterSpec {
                    name: decl.name.clone(),
                    default: decl.default.clamp(low, high),
                    low,
                    high,
                }
            })
            .collect();
        Self { specs }
    }

    /// Builds the schema of an already-constructed strategy.
    pub fn discover(strategy: &dyn Strategy) -> Self {
        Self::from_decls(&strategy.declared_parameters())
    }

    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|spec| spec.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// The all-default parameter set.
    pub fn defaults(&self) -> ParameterSet {
        self.specs
            .iter()
            .map(|spec| (spec.name.clone(), spec.default))
            .collect()
    }

    /// True when `params` names only known parameters and every value is in range.
    pub fn contains(&self, params: &ParameterSet) -> bool {
        params.iter().all(|(name, value)| {
            self.get(name).is_some_and(|spec| spec.contains(*value))
        })
    }
}

/// Merges caller-supplied values over a strategy's declared defaults.
///
/// Missing names keep their default; a name the strategy does not declare is
/// rejected, since silently ignoring it would hide a typo in the request.
pub fn resolve_parameters(
    decls: &[ParameterDecl],
    overrides: Option<&ParameterSet>,
) -> Result<ParameterSet, StrategyError> {
    let mut resolved: ParameterSet = decls
        .iter()
        .map(|decl| (decl.name.clone(), decl.default))
        .collect();

    if let Some(overrides) = overrides {
        for (name, value) in overrides {
            match resolved.get_mut(name) {
                Some(slot) => *slot = *value,
                None => {
                    return Err(StrategyError::InvalidParameters(format!(
                        "unknown parameter '{}' (expected one of: {})",
                        name,
                        decls.iter().map(|d| d.name.as_str()).collect::<Vec<_>>().join(", ")
                    )));
                }
            }
        }
    }

    Ok(resolved)
}

/// Reads a resolved parameter as a strictly positive length.
pub(crate) fn positive_length(params: &ParameterSet, name: &str) -> Result<usize, StrategyError> {
    let value = params.get(name).copied().ok_or_else(|| {
        StrategyError::InvalidParameters(format!("missing parameter '{}'", name))
    })?;
    if value < 1 {
        return Err(StrategyError::InvalidParameters(format!(
            "'{}' must be at least 1, got {}",
            name, value
        )));
    }
    usize::try_from(value)
        .map_err(|_| StrategyError::InvalidParameters(format!("'{}' is too large", name)))
}

/// Reads a resolved parameter as a plain integer.
pub(crate) fn integer(params: &ParameterSet, name: &str) -> Result<i64, StrategyError> {
    params.get(name).copied().ok_or_else(|| {
        StrategyError::InvalidParameters(format!("missing parameter '{}'", name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_ranges() {
        assert_eq!(heuristic_range("short_window"), (5, 100));
        assert_eq!(heuristic_range("lookback_period_months"), (5, 100));
        assert_eq!(heuristic_range("buy_threshold"), (10, 90));
        assert_eq!(heuristic_range("trading_days_per_month"), (1, 50));
    }

    #[test]
    fn test_explicit_range_wins_over_heuristic() {
        let schema = ParameterSchema::from_decls(&[
            ParameterDecl::new("fast_window", 10).with_range(2, 20),
            ParameterDecl::new("slow_window", 30),
        ]);
        assert_eq!(schema.get("fast_window").map(|s| (s.low, s.high)), Some((2, 20)));
        assert_eq!(schema.get("slow_window").map(|s| (s.low, s.high)), Some((5, 100)));
        assert_eq!(schema.names(), vec!["fast_window", "slow_window"]);
    }

    #[test]
    fn test_defaults_are_clamped_into_range() {
        let schema = ParameterSchema::from_decls(&[ParameterDecl::new("period", 2)]);
        assert_eq!(schema.defaults().get("period"), Some(&5));
        assert!(schema.contains(&schema.defaults()));
    }

    #[test]
    fn test_contains_rejects_out_of_range_and_unknown() {
        let schema = ParameterSchema::from_decls(&[ParameterDecl::new("buy_threshold", 30)]);
        let mut params = ParameterSet::new();
        params.insert("buy_threshold".to_string(), 95);
        assert!(!schema.contains(&params));
        params.insert("buy_threshold".to_string(), 90);
        assert!(schema.contains(&params));
        params.insert("other".to_string(), 1);
        assert!(!schema.contains(&params));
    }

    #[test]
    fn test_resolve_parameters_merges_and_rejects_unknown() {
        let decls = [ParameterDecl::new("a", 1), ParameterDecl::new("b", 2)];
        let mut overrides = ParameterSet::new();
        overrides.insert("b".to_string(), 7);
        let resolved = resolve_parameters(&decls, Some(&overrides)).unwrap();
        assert_eq!(resolved.get("a"), Some(&1));
        assert_eq!(resolved.get("b"), Some(&7));

        overrides.insert("c".to_string(), 3);
        let err = resolve_parameters(&decls, Some(&overrides)).unwrap_err();
        assert!(err.is_load_error());
    }

    #[test]
    fn test_positive_length_rejects_zero() {
        let mut params = ParameterSet::new();
        params.insert("window".to_string(), 0);
        assert!(positive_length(&params, "window").is_err());
        params.insert("window".to_string(), 3);
        assert_eq!(positive_length(&params, "window"), Ok(3));
    }
}
