use cardiorisk::application::ml::model_provider::{ModelProvider, ModelSource};
use cardiorisk::config::{ClassifierAlgorithm, ModelEnvConfig};
use cardiorisk::domain::errors::InferenceError;
use cardiorisk::domain::ml::prediction::RiskTier;
use serde_json::{Value, json};
use std::path::PathBuf;

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cardiorisk-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    dir
}

/// 80 rows; risk rises with chest pain type, vessels and age
fn write_dataset(dir: &PathBuf) -> PathBuf {
    let mut csv = String::from(
        "age,sex,cp,trestbps,chol,fbs,restecg,thalach,exang,oldpeak,slope,ca,thal,target\n",
    );
    for i in 0..80u32 {
        let positive = i % 2 == 0;
        let cp = if positive { 2 + i % 2 } else { i % 2 };
        let ca = if positive { 0 } else { 1 + i % 3 };
        let thalach = if positive { 160 + i % 20 } else { 120 + i % 20 };
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{:.1},{},{},{},{}\n",
            35 + i % 40,
            i % 2,
            cp,
            120 + i % 30,
            200 + i % 60,
            i % 2,
            i % 3,
            thalach,
            u32::from(!positive),
            (i % 30) as f64 / 10.0,
            i % 3,
            ca,
            1 + i % 3,
            u32::from(positive)
        ));
    }
    // Incomplete row, dropped before fitting
    csv.push_str("50,1,2,130,,0,0,160,0,1.0,1,0,2,1\n");
    let path = dir.join("heart.csv");
    std::fs::write(&path, csv).expect("write dataset");
    path
}

fn sample_body() -> Value {
    json!({
        "age": 63, "sex": 1, "cp": 3, "trestbps": 145, "chol": 233, "fbs": 1,
        "restecg": 0, "thalach": 150, "exang": 0, "oldpeak": 2.3, "slope": 0,
        "ca": 0, "thal": 1
    })
}

#[test]
fn test_fallback_model_end_to_end_example() {
    let dir = temp_dir();
    let config = ModelEnvConfig {
        model_path: dir.join("model.json"),
        dataset_path: dir.join("absent.csv"),
        ..ModelEnvConfig::default()
    };
    let (ctx, source) = ModelProvider::new(config).obtain().expect("fallback model");
    assert!(matches!(source, ModelSource::Fallback(_)));

    let result = ctx.classify_json(&sample_body()).expect("prediction");
    assert_eq!(result.predicted_class, 1);
    assert_eq!(result.message, "Heart disease detected");
}

#[test]
fn test_dataset_fit_persist_reload_roundtrip() {
    for algorithm in [ClassifierAlgorithm::Linear, ClassifierAlgorithm::TreeEnsemble] {
        let dir = temp_dir();
        let config = ModelEnvConfig {
            model_path: dir.join("model.json"),
            dataset_path: write_dataset(&dir),
            algorithm,
            n_trees: 25,
            ..ModelEnvConfig::default()
        };

        let (fitted, source) = ModelProvider::new(config.clone()).obtain().expect("fit");
        match source {
            ModelSource::Dataset(report) => {
                assert_eq!(report.train_samples + report.test_samples, 80);
                assert_eq!(report.test_samples, 16);
                assert!(report.test_accuracy.is_some());
            }
            other => panic!("expected a dataset fit, got {:?}", other),
        }

        let (reloaded, source) = ModelProvider::new(config).obtain().expect("reload");
        assert_eq!(source, ModelSource::Artifact);
        assert!(reloaded.uses_scaling());

        for age in [30, 45, 63, 77] {
            let mut body = sample_body();
            body["age"] = json!(age);
            let before = fitted.classify_json(&body).expect("in-memory");
            let after = reloaded.classify_json(&body).expect("reloaded");
            assert_eq!(before.probability.to_bits(), after.probability.to_bits());
            assert_eq!(before, after);
        }
    }
}

#[test]
fn test_probability_and_tier_are_consistent() {
    let dir = temp_dir();
    let config = ModelEnvConfig {
        model_path: dir.join("model.json"),
        dataset_path: write_dataset(&dir),
        algorithm: ClassifierAlgorithm::TreeEnsemble,
        n_trees: 20,
        ..ModelEnvConfig::default()
    };
    let (ctx, _) = ModelProvider::new(config).obtain().expect("fit");

    for cp in 0..=3 {
        for ca in 0..=3 {
            let mut body = sample_body();
            body["cp"] = json!(cp);
            body["ca"] = json!(ca);
            let result = ctx.classify_json(&body).expect("prediction");
            assert!((0.0..=1.0).contains(&result.probability));
            assert_eq!(result.risk_tier, RiskTier::from_probability(result.probability));
            assert_eq!(result.predicted_class, u8::from(result.probability > 0.5));
        }
    }
}

#[test]
fn test_invalid_input_rejected_without_result() {
    let dir = temp_dir();
    let config = ModelEnvConfig {
        model_path: dir.join("model.json"),
        dataset_path: dir.join("absent.csv"),
        ..ModelEnvConfig::default()
    };
    let (ctx, _) = ModelProvider::new(config).obtain().expect("fallback model");

    let mut body = sample_body();
    body.as_object_mut().unwrap().remove("age");
    match ctx.classify_json(&body) {
        Err(InferenceError::InvalidInput { field, .. }) => assert_eq!(field, "age"),
        other => panic!("expected invalid input, got {:?}", other),
    }

    let mut body = sample_body();
    body["oldpeak"] = json!("two");
    assert!(ctx.classify_json(&body).is_err());
}
