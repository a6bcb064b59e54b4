use serde::{Deserialize, Serialize};

use crate::utils::format_quantity;

/// A recipe as listed by the backend API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub recipe_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub cuisine_name: String,
    #[serde(default)]
    pub cuisine_id: i64,
    #[serde(default)]
    pub goal_name: String,
    #[serde(default)]
    pub goal_id: i64,
    #[serde(default)]
    pub diet_name: String,
    #[serde(default)]
    pub allergy_name: String,
    #[serde(rename = "DietaryInformation_id", default, skip_serializing_if = "Option::is_none")]
    pub dietary_information_id: Option<i64>,
    #[serde(rename = "AllergiesInformation_id", default, skip_serializing_if = "Option::is_none")]
    pub allergies_information_id: Option<i64>,
}

impl Recipe {
    /// Short tag line such as "Italian · Vegetarian · Weight loss"
    pub fn tags(&self) -> String {
        [&self.cuisine_name, &self.diet_name, &self.goal_name]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeInstruction {
    pub instruction_id: i64,
    pub step_number: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub ingredient_id: i64,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub quantity: f64,
}

impl RecipeIngredient {
    /// "2 cups flour", "0.5 tsp salt", "3 eggs"
    pub fn display(&self) -> String {
        let quantity = format_quantity(self.quantity);
        if self.unit.is_empty() {
            format!("{} {}", quantity, self.name)
        } else {
            format!("{} {} {}", quantity, self.unit, self.name)
        }
    }
}

/// A recipe with its steps and ingredients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    #[serde(default)]
    pub instructions: Vec<RecipeInstruction>,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
}

impl FullRecipe {
    /// Instructions in step order; the API does not guarantee ordering.
    pub fn sorted_instructions(&self) -> Vec<&RecipeInstruction> {
        let mut steps: Vec<&RecipeInstruction> = self.instructions.iter().collect();
        steps.sort_by_key(|i| i.step_number);
        steps
    }
}
