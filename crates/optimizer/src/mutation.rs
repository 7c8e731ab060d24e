use core_types::ParameterSet;
use rand::Rng;
use strategies::ParameterSchema;

/// Perturbs every parameter of `current` by a uniform integer in
/// `[-step, step]`, then clamps it into the parameter's search range.
///
/// Parameters missing from `current` start from their schema default. The
/// output always contains exactly the schema's parameters.
pub fn mutate<R: Rng>(
    schema: &ParameterSchema,
    current: &ParameterSet,
    step: i64,
    rng: &mut R,
) -> ParameterSet {
    schema
        .specs()
        .iter()
        .map(|spec| {
            let base = current.get(&spec.name).copied().unwrap_or(spec.default);
            let change = rng.random_range(-step..=step);
            (spec.name.clone(), spec.clamp(base.saturating_add(change)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use strategies::ParameterDecl;

    fn schema() -> ParameterSchema {
        ParameterSchema::from_decls(&[
            ParameterDecl::new("short_window", 5),
            ParameterDecl::new("buy_threshold", 90),
            ParameterDecl::new("multiplier", 25),
        ])
    }

    #[test]
    fn test_mutations_stay_within_step_and_range() {
        let schema = schema();
        let start = schema.defaults();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let next = mutate(&schema, &start, 5, &mut rng);
            assert!(schema.contains(&next));
            for (name, value) in &next {
                assert!((value - start[name]).abs() <= 5, "{} jumped too far", name);
            }
        }
    }

    #[test]
    fn test_edges_are_clamped() {
        let schema = schema();
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen_low = false;
        let mut seen_high = false;
        for _ in 0..200 {
            let next = mutate(&schema, &schema.defaults(), 5, &mut rng);
            seen_low |= next["short_window"] == 5;
            seen_high |= next["buy_threshold"] == 90;
            assert!(next["short_window"] >= 5);
            assert!(next["buy_threshold"] <= 90);
        }
        assert!(seen_low && seen_high);
    }

    #[test]
    fn test_zero_step_is_identity() {
        let schema = schema();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(mutate(&schema, &schema.defaults(), 0, &mut rng), schema.defaults());
    }

    #[test]
    fn test_unknown_keys_are_dropped_and_missing_keys_defaulted() {
        let schema = schema();
        let current = ParameterSet::from([("other".to_string(), 1)]);
        let mut rng = StdRng::seed_from_u64(3);
        let next = mutate(&schema, &current, 0, &mut rng);
        assert_eq!(next, schema.defaults());
    }
}
