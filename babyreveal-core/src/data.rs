use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two outcomes guests can vote for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Girl,
    Boy,
}

#[derive(Debug, Error)]
#[error("{0} is not a valid choice")]
pub struct UnknownGender(String);

impl FromStr for Gender {
    type Err = UnknownGender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "girl" => Ok(Self::Girl),
            "boy" => Ok(Self::Boy),
            other => Err(UnknownGender(other.to_string())),
        }
    }
}

/// Optional guesses about the birth that come along with a vote
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predictions {
    /// Calendar date, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// 24-hour `HH:MM`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_time: Option<String>,
    /// Grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    /// Centimeters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hair_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_color: Option<String>,
}

impl Predictions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A single guest's vote. Votes never change once they are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub choice: Gender,
    /// Milliseconds since epoch
    pub timestamp: i64,
    #[serde(flatten)]
    pub predictions: Predictions,
}

/// A vote that has passed validation but has not been stored yet
#[derive(Debug, Clone)]
pub struct NewVote {
    pub name: String,
    pub email: Option<String>,
    pub choice: Gender,
    pub predictions: Predictions,
}

impl NewVote {
    pub fn new(name: impl Into<String>, choice: Gender) -> Self {
        Self {
            name: name.into(),
            email: None,
            choice,
            predictions: Predictions::default(),
        }
    }

    pub(crate) fn into_vote(self, id: i64, timestamp: i64) -> Vote {
        Vote {
            id,
            name: self.name,
            email: self.email,
            choice: self.choice,
            timestamp,
            predictions: self.predictions,
        }
    }
}

/// Event-wide settings. Keys missing from a stored document fall back to [AppConfig::default].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub baby_name: String,
    pub parent_names: String,
    pub girl_icon: String,
    pub boy_icon: String,
    pub girl_color: String,
    pub boy_color: String,
    pub birth_list_link: String,
    pub due_date: String,
    pub reveal_date: String,
    pub is_revealed: bool,
    pub actual_gender: Option<Gender>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_birth_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_weight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_hair_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_eye_color: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            baby_name: "Bébé".to_string(),
            parent_names: "Papa & Maman".to_string(),
            girl_icon: "Crown".to_string(),
            boy_icon: "Gamepad2".to_string(),
            girl_color: "#ec4899".to_string(),
            boy_color: "#3b82f6".to_string(),
            birth_list_link: String::new(),
            due_date: String::new(),
            reveal_date: String::new(),
            is_revealed: false,
            actual_gender: None,
            actual_birth_date: None,
            actual_birth_time: None,
            actual_weight: None,
            actual_height: None,
            actual_hair_color: None,
            actual_eye_color: None,
        }
    }
}

/// A partial update to [AppConfig].
///
/// `None` leaves a field untouched. For the nullable fields, `Some(None)` clears
/// the stored value and `Some(Some(x))` sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPatch {
    pub baby_name: Option<String>,
    pub parent_names: Option<String>,
    pub girl_icon: Option<String>,
    pub boy_icon: Option<String>,
    pub girl_color: Option<String>,
    pub boy_color: Option<String>,
    pub birth_list_link: Option<String>,
    pub due_date: Option<String>,
    pub reveal_date: Option<String>,
    pub is_revealed: Option<bool>,
    pub actual_gender: Option<Option<Gender>>,
    pub actual_birth_date: Option<Option<String>>,
    pub actual_birth_time: Option<Option<String>>,
    pub actual_weight: Option<Option<u32>>,
    pub actual_height: Option<Option<u32>>,
    pub actual_hair_color: Option<Option<String>>,
    pub actual_eye_color: Option<Option<String>>,
}

impl AppConfig {
    /// Applies a patch on top of this config, keeping every field the patch leaves out
    pub fn apply(&mut self, patch: ConfigPatch) {
        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        set(&mut self.baby_name, patch.baby_name);
        set(&mut self.parent_names, patch.parent_names);
        set(&mut self.girl_icon, patch.girl_icon);
        set(&mut self.boy_icon, patch.boy_icon);
        set(&mut self.girl_color, patch.girl_color);
        set(&mut self.boy_color, patch.boy_color);
        set(&mut self.birth_list_link, patch.birth_list_link);
        set(&mut self.due_date, patch.due_date);
        set(&mut self.reveal_date, patch.reveal_date);
        set(&mut self.is_revealed, patch.is_revealed);
        set(&mut self.actual_gender, patch.actual_gender);
        set(&mut self.actual_birth_date, patch.actual_birth_date);
        set(&mut self.actual_birth_time, patch.actual_birth_time);
        set(&mut self.actual_weight, patch.actual_weight);
        set(&mut self.actual_height, patch.actual_height);
        set(&mut self.actual_hair_color, patch.actual_hair_color);
        set(&mut self.actual_eye_color, patch.actual_eye_color);
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn vote_omits_absent_fields() {
        let vote = NewVote::new("Alice", Gender::Girl).into_vote(1, 1);
        let value = serde_json::to_value(&vote).unwrap();

        assert_eq!(
            value,
            json!({ "id": 1, "name": "Alice", "choice": "girl", "timestamp": 1 })
        );
    }

    #[test]
    fn vote_flattens_predictions() {
        let mut new_vote = NewVote::new("Bob", Gender::Boy);
        new_vote.predictions.weight = Some(3400);
        new_vote.predictions.birth_time = Some("08:15".to_string());

        let value = serde_json::to_value(new_vote.into_vote(2, 2)).unwrap();

        assert_eq!(value["weight"], json!(3400));
        assert_eq!(value["birthTime"], json!("08:15"));
        assert!(value.get("predictions").is_none());
    }

    #[test]
    fn partial_document_is_filled_with_defaults() {
        let config: AppConfig =
            serde_json::from_value(json!({ "babyName": "Lou", "isRevealed": true })).unwrap();

        assert_eq!(config.baby_name, "Lou");
        assert!(config.is_revealed);
        assert_eq!(config.parent_names, AppConfig::default().parent_names);
        assert_eq!(config.actual_gender, None);
    }

    #[test]
    fn default_config_serializes_null_gender() {
        let value = serde_json::to_value(AppConfig::default()).unwrap();

        assert_eq!(value["actualGender"], json!(null));
        assert!(value.get("actualWeight").is_none());
    }

    #[test]
    fn patch_keeps_clears_and_sets() {
        let mut config = AppConfig {
            actual_gender: Some(Gender::Boy),
            actual_weight: Some(3200),
            ..Default::default()
        };

        config.apply(ConfigPatch {
            baby_name: Some("Lou".to_string()),
            actual_gender: Some(None),
            ..Default::default()
        });

        assert_eq!(config.baby_name, "Lou");
        assert_eq!(config.actual_gender, None, "null clears the gender");
        assert_eq!(config.actual_weight, Some(3200), "absent keeps the weight");
    }

    #[test]
    fn gender_from_str() {
        assert_eq!("girl".parse::<Gender>().unwrap(), Gender::Girl);
        assert_eq!("boy".parse::<Gender>().unwrap(), Gender::Boy);
        assert!("Girl".parse::<Gender>().is_err());
    }
}
