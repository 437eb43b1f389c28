use std::collections::HashMap;

use cube_particles::ParticleSetOptions;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<HashMap<_, _>>();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_are_valid() {
    let options = ParticleSetOptions::default();
    assert!(options.validate().is_ok());
    assert_eq!(options.progress_step, 0.01);
    assert!(!options.is_random_position);

    let from_empty = ParticleSetOptions::from_lookup(lookup(&[])).unwrap();
    assert_eq!(from_empty, options);
}

#[test]
fn environment_overrides_defaults() {
    let options = ParticleSetOptions::from_lookup(lookup(&[
        ("CUBE_ROW_COUNT", "8"),
        ("CUBE_WIDTH", " 4.5 "),
        ("CUBE_RANDOM_POSITION", "true"),
        ("CUBE_SEED", "12"),
    ]))
    .unwrap();

    assert_eq!(options.row_count, 8);
    assert_eq!(options.cube_width, 4.5);
    assert!(options.is_random_position);
    assert_eq!(options.seed, Some(12));
    assert_eq!(options.particle_width, 0.05);
}

#[test]
fn unparsable_values_name_the_variable() {
    let err = ParticleSetOptions::from_lookup(lookup(&[("CUBE_ROW_COUNT", "many")])).unwrap_err();
    assert!(format!("{err:#}").contains("CUBE_ROW_COUNT"));
}

#[test]
fn invalid_values_fail_validation() {
    assert!(ParticleSetOptions::from_lookup(lookup(&[("CUBE_PROGRESS_STEP", "1.5")])).is_err());
    assert!(ParticleSetOptions::from_lookup(lookup(&[("CUBE_PARTICLE_WIDTH", "0")])).is_err());
    assert!(ParticleSetOptions::from_lookup(lookup(&[("CUBE_WIDTH", "NaN")])).is_err());
}
