use shapes_nn::{FigureType, GeneratorConfig, NetworkSpec, ShapeGenerator, TrainParams};

fn normalized() -> GeneratorConfig {
    GeneratorConfig { normalize: true, ..GeneratorConfig::default() }
}

#[test]
fn generated_samples_fit_the_default_spec() {
    let spec = NetworkSpec { seed: Some(1), ..NetworkSpec::default() };
    let mut network = spec.build().unwrap();
    let mut generator = ShapeGenerator::seeded(spec.generator.clone(), 1).unwrap();

    let mut sample = generator.generate_sample();
    assert_eq!(sample.input().len(), network.sensor_width());

    let recognized = network.predict(&mut sample).unwrap().unwrap();
    assert!(recognized < network.output_width());
    assert_eq!(network.outputs(), sample.output().unwrap());
}

#[test]
fn labels_cover_every_figure_kind() {
    let mut generator = ShapeGenerator::seeded(GeneratorConfig::default(), 99).unwrap();
    let set = generator.generate_set(200);
    for kind in FigureType::ALL {
        assert!(set.iter().any(|s| s.actual_class() == Some(kind.index())), "no {kind}");
    }
}

#[test]
fn short_training_run_on_shapes_stays_consistent() {
    let spec = NetworkSpec {
        train: TrainParams::with_learning_rate(0.5),
        generator: normalized(),
        seed: Some(5),
        ..NetworkSpec::from_structure("shapes", "400;10;4").unwrap()
    };
    spec.validate_for_generator().unwrap();

    let mut network = spec.build().unwrap();
    let mut generator = ShapeGenerator::seeded(spec.generator.clone(), 5).unwrap();
    let mut train = generator.generate_set(40);
    let mut test = generator.generate_set(40);

    let accuracy = network.train_on_data_set(&mut train, 3, 0.9).unwrap();
    assert!((0.0..=1.0).contains(&accuracy));

    let tested = network.test_on_data_set(&mut test).unwrap().unwrap();
    assert!((0.0..=1.0).contains(&tested));
    assert_eq!(test.accuracy(), Some(tested));
}

#[test]
fn two_class_generator_needs_two_outputs() {
    let config = GeneratorConfig { figure_count: 2, ..GeneratorConfig::default() };
    let spec = NetworkSpec {
        generator: config,
        ..NetworkSpec::from_structure("pairs", "400;6;4").unwrap()
    };
    assert!(spec.validate_for_generator().is_err());

    let spec = NetworkSpec { layers: vec![400, 6, 2], ..spec };
    assert!(spec.validate_for_generator().is_ok());
}
