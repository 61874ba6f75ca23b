/// Single-row flood probability from the served model.

use std::sync::Arc;

use crate::error::PredictError;
use crate::features::FeatureMap;
use crate::registry::ModelRegistry;
use crate::training::TrainedModel;

pub const COL_WEATHER_MAIN: &str = "weather_main";
pub const COL_WEATHER_DESCRIPTION: &str = "weather_description";

pub struct Predictor {
    registry: Arc<ModelRegistry>,
}

impl Predictor {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Probability in [0, 1] that the described hour floods.
    pub fn predict(&self, features: &FeatureMap) -> Result<f64, PredictError> {
        let model = self.registry.get().ok_or(PredictError::ModelUnavailable)?;
        predict_with(&model, features)
    }
}

/// Vectorizes `features` with `model`'s schema and encoders and scores it.
pub fn predict_with(model: &TrainedModel, features: &FeatureMap) -> Result<f64, PredictError> {
    let main_code = features
        .weather_main
        .as_deref()
        .map(|v| model.weather_main.transform(COL_WEATHER_MAIN, v))
        .transpose()?;
    let desc_code = features
        .weather_description
        .as_deref()
        .map(|v| model.weather_desc.transform(COL_WEATHER_DESCRIPTION, v))
        .transpose()?;

    let row = model.schema().vectorize_map(
        features,
        main_code.map(|c| c as f64),
        desc_code.map(|c| c as f64),
    );
    let probability = model
        .predict_proba(std::slice::from_ref(&row))
        .first()
        .copied()
        .unwrap_or(0.0);
    Ok(probability.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureSchema, LabelEncoder};
    use crate::storage::MemoryStore;
    use crate::training::linear::LogisticModel;
    use crate::training::scaler::StandardScaler;
    use crate::training::{Classifier, Estimator};
    use chrono::Utc;

    /// Logistic model that only looks at `rain1h` and the road indicator.
    fn rain_model() -> TrainedModel {
        let schema = FeatureSchema::new(&["EDSA".to_string()]);
        let width = schema.len();
        let mut weights = vec![0.0; width];
        let rain = schema.columns().iter().position(|c| c == "rain1h").unwrap();
        weights[rain] = 1.0;
        weights[width - 1] = 0.5;
        TrainedModel {
            version: "t".to_string(),
            estimator: Estimator {
                trained_at: Utc::now(),
                classifier: Classifier::LogisticRegression(LogisticModel::from_parts(weights, -3.0)),
                schema,
            },
            // identity scaling
            scaler: StandardScaler::fit(&[vec![-1.0; width], vec![1.0; width]]),
            weather_main: LabelEncoder::fit(["Clouds", "Rain"]),
            weather_desc: LabelEncoder::fit(["light rain"]),
        }
    }

    fn predictor(model: Option<TrainedModel>) -> Predictor {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let registry = match model {
            Some(m) => ModelRegistry::with_model(store, m),
            None => ModelRegistry::new(store),
        };
        Predictor::new(Arc::new(registry))
    }

    #[test]
    fn test_no_model_is_unavailable() {
        let p = predictor(None);
        assert_eq!(p.predict(&FeatureMap::new()), Err(PredictError::ModelUnavailable));
    }

    #[test]
    fn test_probability_rises_with_rain_and_is_deterministic() {
        let p = predictor(Some(rain_model()));
        let dry = p.predict(&FeatureMap::new().with("rain1h", 0.0)).unwrap();
        let wet = p.predict(&FeatureMap::new().with("rain1h", 8.0)).unwrap();
        assert!(wet > dry);
        assert!((0.0..=1.0).contains(&dry) && (0.0..=1.0).contains(&wet));
        assert_eq!(p.predict(&FeatureMap::new().with("rain1h", 8.0)).unwrap(), wet);
    }

    #[test]
    fn test_missing_numeric_features_default_to_zero() {
        let p = predictor(Some(rain_model()));
        let empty = p.predict(&FeatureMap::new()).unwrap();
        let zero = p.predict(&FeatureMap::new().with("rain1h", 0.0)).unwrap();
        assert_eq!(empty, zero);
    }

    #[test]
    fn test_unseen_category_is_reported() {
        let p = predictor(Some(rain_model()));
        let map = FeatureMap { weather_main: Some("Snow".to_string()), ..FeatureMap::new() };
        assert_eq!(
            p.predict(&map),
            Err(PredictError::UnseenCategory {
                column: COL_WEATHER_MAIN.to_string(),
                value: "Snow".to_string()
            })
        );

        let seen = FeatureMap { weather_main: Some("Rain".to_string()), ..FeatureMap::new() };
        assert!(p.predict(&seen).is_ok());
    }

    #[test]
    fn test_known_road_sets_indicator() {
        let p = predictor(Some(rain_model()));
        let base = FeatureMap::new().with("rain1h", 2.0);
        let on_road = FeatureMap { road_sector: Some("EDSA".to_string()), ..base.clone() };
        let unknown = FeatureMap { road_sector: Some("Nowhere".to_string()), ..base.clone() };

        assert!(p.predict(&on_road).unwrap() > p.predict(&base).unwrap());
        assert_eq!(p.predict(&unknown).unwrap(), p.predict(&base).unwrap());
    }
}
