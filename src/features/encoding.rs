/// Label encoding for categorical weather fields.
///
/// Codes are positions in the sorted vocabulary seen at fit time. There is
/// no bucket for unseen values; inference reports them as
/// `PredictError::UnseenCategory`.

use serde::{Deserialize, Serialize};

use crate::error::PredictError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut classes: Vec<String> = values.into_iter().map(str::to_string).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn code(&self, value: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }

    /// Encodes `value`, naming `column` in the error when unseen.
    pub fn transform(&self, column: &str, value: &str) -> Result<usize, PredictError> {
        self.code(value).ok_or_else(|| PredictError::UnseenCategory {
            column: column.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_sorted_vocabulary() {
        let values = ["Rain", "Clouds", "Rain", "Clear"];
        let encoder = LabelEncoder::fit(values);
        let codes: Vec<usize> = values.iter().filter_map(|v| encoder.code(v)).collect();
        assert_eq!(encoder.classes(), &["Clear", "Clouds", "Rain"]);
        assert_eq!(codes, vec![2, 1, 2, 0]);
    }

    #[test]
    fn test_unseen_value_is_an_error() {
        let encoder = LabelEncoder::fit(["Rain", "Clouds"]);
        assert_eq!(encoder.transform("weather_main", "Rain"), Ok(1));
        assert_eq!(
            encoder.transform("weather_main", "Snow"),
            Err(PredictError::UnseenCategory {
                column: "weather_main".to_string(),
                value: "Snow".to_string()
            })
        );
    }

    #[test]
    fn test_round_trips_through_json() {
        let encoder = LabelEncoder::fit(["thunderstorm", "light rain"]);
        let json = serde_json::to_string(&encoder).unwrap();
        let back: LabelEncoder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, encoder);
    }
}
