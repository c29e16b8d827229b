use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Transport,
    Food,
    Energy,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Transport, Category::Food, Category::Energy];

    pub fn endpoint(self) -> &'static str {
        match self {
            Category::Transport => "/transport",
            Category::Food => "/food",
            Category::Energy => "/energy",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Transport => "transport",
            Category::Food => "food",
            Category::Energy => "energy",
        }
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "transport" => Ok(Category::Transport),
            "food" => Ok(Category::Food),
            "energy" => Ok(Category::Energy),
            _ => Err(UnknownVariant(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value '{0}'")]
pub struct UnknownVariant(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Car,
    Bus,
    Train,
    Flight,
}

impl TransportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Car => "car",
            TransportMode::Bus => "bus",
            TransportMode::Train => "train",
            TransportMode::Flight => "flight",
        }
    }
}

impl FromStr for TransportMode {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "car" => Ok(TransportMode::Car),
            "bus" => Ok(TransportMode::Bus),
            "train" => Ok(TransportMode::Train),
            "flight" => Ok(TransportMode::Flight),
            _ => Err(UnknownVariant(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodType {
    Beef,
    Chicken,
    Dairy,
    #[serde(alias = "veg")]
    Vegetables,
    Rice,
}

impl FoodType {
    pub fn as_str(self) -> &'static str {
        match self {
            FoodType::Beef => "beef",
            FoodType::Chicken => "chicken",
            FoodType::Dairy => "dairy",
            FoodType::Vegetables => "vegetables",
            FoodType::Rice => "rice",
        }
    }
}

impl FromStr for FoodType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beef" => Ok(FoodType::Beef),
            "chicken" => Ok(FoodType::Chicken),
            "dairy" => Ok(FoodType::Dairy),
            "veg" | "vegetables" => Ok(FoodType::Vegetables),
            "rice" => Ok(FoodType::Rice),
            _ => Err(UnknownVariant(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FoodUnit {
    #[default]
    Kg,
    G,
    Serving,
}

impl FoodUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            FoodUnit::Kg => "kg",
            FoodUnit::G => "g",
            FoodUnit::Serving => "serving",
        }
    }

    fn is_kg(&self) -> bool {
        *self == FoodUnit::Kg
    }
}

impl FromStr for FoodUnit {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "kg" => Ok(FoodUnit::Kg),
            "g" => Ok(FoodUnit::G),
            "serving" => Ok(FoodUnit::Serving),
            _ => Err(UnknownVariant(value.to_string())),
        }
    }
}

/// Validated values of one category's form, ready to be sent and cached.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryFields {
    Transport { mode: TransportMode, distance: f64 },
    Food { food_type: FoodType, quantity: f64, unit: FoodUnit },
    Energy { kwh: f64 },
}

impl CategoryFields {
    pub fn category(&self) -> Category {
        match self {
            CategoryFields::Transport { .. } => Category::Transport,
            CategoryFields::Food { .. } => Category::Food,
            CategoryFields::Energy { .. } => Category::Energy,
        }
    }

    pub fn payload(&self) -> CategoryPayload {
        match *self {
            CategoryFields::Transport { mode, distance } => {
                CategoryPayload::Transport { mode, distance }
            }
            CategoryFields::Food {
                food_type,
                quantity,
                unit,
            } => CategoryPayload::Food {
                category: food_type,
                food_type,
                quantity,
                unit,
            },
            CategoryFields::Energy { kwh } => CategoryPayload::Energy {
                energy_type: "electricity".to_string(),
                kwh,
            },
        }
    }
}

/// Body of the per-category create request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CategoryPayload {
    Transport {
        mode: TransportMode,
        distance: f64,
    },
    Food {
        category: FoodType,
        #[serde(rename = "type")]
        food_type: FoodType,
        quantity: f64,
        unit: FoodUnit,
    },
    Energy {
        #[serde(rename = "type")]
        energy_type: String,
        kwh: f64,
    },
}

impl CategoryPayload {
    pub fn category(&self) -> Category {
        match self {
            CategoryPayload::Transport { .. } => Category::Transport,
            CategoryPayload::Food { .. } => Category::Food,
            CategoryPayload::Energy { .. } => Category::Energy,
        }
    }
}

/// How categories that were not part of a submission are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackfillPolicy {
    /// Each submission describes one category; the others get fixed
    /// placeholder values (`car`, `beef`, `kg`, zero amounts).
    #[default]
    SingleCategoryDemo,
}

impl BackfillPolicy {
    fn transport_mode(self) -> TransportMode {
        match self {
            BackfillPolicy::SingleCategoryDemo => TransportMode::Car,
        }
    }

    fn food_type(self) -> FoodType {
        match self {
            BackfillPolicy::SingleCategoryDemo => FoodType::Beef,
        }
    }
}

/// The fixed-shape record passed from the logger to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub transport_mode: TransportMode,
    pub distance: f64,
    pub food_type: FoodType,
    pub food_quantity: f64,
    #[serde(default, skip_serializing_if = "FoodUnit::is_kg")]
    pub food_unit: FoodUnit,
    pub energy_kwh: f64,
}

impl ActivityRecord {
    /// Record scored when nothing has been logged yet.
    pub fn default_record() -> Self {
        Self {
            transport_mode: TransportMode::Train,
            distance: 50.0,
            food_type: FoodType::Vegetables,
            food_quantity: 2.0,
            food_unit: FoodUnit::Kg,
            energy_kwh: 5.0,
        }
    }

    pub fn from_submission(fields: &CategoryFields, policy: BackfillPolicy) -> Self {
        let mut record = Self {
            transport_mode: policy.transport_mode(),
            distance: 0.0,
            food_type: policy.food_type(),
            food_quantity: 0.0,
            food_unit: FoodUnit::default(),
            energy_kwh: 0.0,
        };

        match *fields {
            CategoryFields::Transport { mode, distance } => {
                record.transport_mode = mode;
                record.distance = distance;
            }
            CategoryFields::Food {
                food_type,
                quantity,
                unit,
            } => {
                record.food_type = food_type;
                record.food_quantity = quantity;
                record.food_unit = unit;
            }
            CategoryFields::Energy { kwh } => record.energy_kwh = kwh,
        }

        record
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Aggregate returned by the scoring service for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub transport_emission: f64,
    pub food_emission: f64,
    pub energy_emission: f64,
    pub total_emission: f64,
    pub daily_score: f64,
    pub badges: Vec<Badge>,
    pub recommendation_prompt: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transport_submission_backfills_food_and_energy() {
        let fields = CategoryFields::Transport {
            mode: TransportMode::Car,
            distance: 15.0,
        };
        let record = ActivityRecord::from_submission(&fields, BackfillPolicy::SingleCategoryDemo);

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "transport_mode": "car",
                "distance": 15.0,
                "food_type": "beef",
                "food_quantity": 0.0,
                "energy_kwh": 0.0
            })
        );
    }

    #[test]
    fn energy_submission_keeps_placeholder_mode_and_food() {
        let record = ActivityRecord::from_submission(
            &CategoryFields::Energy { kwh: 12.5 },
            BackfillPolicy::default(),
        );
        assert_eq!(record.transport_mode, TransportMode::Car);
        assert_eq!(record.food_type, FoodType::Beef);
        assert_eq!(record.distance, 0.0);
        assert_eq!(record.food_quantity, 0.0);
        assert_eq!(record.energy_kwh, 12.5);
    }

    #[test]
    fn non_kg_unit_is_carried_in_record() {
        let record = ActivityRecord::from_submission(
            &CategoryFields::Food {
                food_type: FoodType::Rice,
                quantity: 300.0,
                unit: FoodUnit::G,
            },
            BackfillPolicy::default(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["food_unit"], "g");
        assert_eq!(value["food_type"], "rice");

        let parsed: ActivityRecord = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn default_record_matches_demo_values() {
        let value = serde_json::to_value(ActivityRecord::default_record()).unwrap();
        assert_eq!(
            value,
            json!({
                "transport_mode": "train",
                "distance": 50.0,
                "food_type": "vegetables",
                "food_quantity": 2.0,
                "energy_kwh": 5.0
            })
        );
    }

    #[test]
    fn food_type_accepts_short_veg_name() {
        assert_eq!("veg".parse::<FoodType>(), Ok(FoodType::Vegetables));
        assert_eq!(" Beef ".parse::<FoodType>(), Ok(FoodType::Beef));
        let parsed: FoodType = serde_json::from_value(json!("veg")).unwrap();
        assert_eq!(parsed, FoodType::Vegetables);
        assert!("tofu".parse::<FoodType>().is_err());
    }

    #[test]
    fn payloads_use_category_specific_keys() {
        let food = CategoryFields::Food {
            food_type: FoodType::Chicken,
            quantity: 0.4,
            unit: FoodUnit::Kg,
        };
        assert_eq!(
            serde_json::to_value(food.payload()).unwrap(),
            json!({ "category": "chicken", "type": "chicken", "quantity": 0.4, "unit": "kg" })
        );

        let energy = CategoryFields::Energy { kwh: 3.0 };
        assert_eq!(
            serde_json::to_value(energy.payload()).unwrap(),
            json!({ "type": "electricity", "kwh": 3.0 })
        );
        assert_eq!(energy.payload().category(), Category::Energy);
    }

    #[test]
    fn score_result_accepts_integer_score_and_ignores_extra_fields() {
        let result: ScoreResult = serde_json::from_value(json!({
            "transport_emission": 1.5,
            "food_emission": 0.8,
            "energy_emission": 2.25,
            "total_emission": 4.55,
            "daily_score": 77,
            "badges": [{ "id": "green_traveler", "name": "Green Traveler", "description": "Low transport" }],
            "recommendation_prompt": "Act as an expert.\nMore text",
            "level": "Seedling"
        }))
        .unwrap();
        assert_eq!(result.daily_score, 77.0);
        assert_eq!(result.badges.len(), 1);
    }

    #[test]
    fn score_result_requires_every_field() {
        let missing = serde_json::from_value::<ScoreResult>(json!({
            "transport_emission": 1.5,
            "food_emission": 0.8,
            "energy_emission": 2.25,
            "total_emission": 4.55,
            "badges": [],
            "recommendation_prompt": ""
        }));
        assert!(missing.is_err());
    }

    #[test]
    fn unknown_category_names_the_input() {
        let err = "fuel".parse::<Category>().unwrap_err();
        assert_eq!(err, UnknownVariant("fuel".to_string()));
        assert_eq!(err.to_string(), "unknown value 'fuel'");
    }
}
