//! Prompt texts sent to the providers.
//!
//! Keeping them together makes it easy to adjust the wording of the whole
//! chain in one place.

use crate::planner::ConsultationRequest;

/// System instruction for the meal plan call.
pub const NUTRITIONIST_SYSTEM_PROMPT: &str =
    "You are a world-class nutritionist. Provide a personalized meal plan for a diabetic patient.";

/// User message for the meal plan call.
pub fn meal_plan_prompt(request: &ConsultationRequest) -> String {
    format!(
        "Create a personalized meal plan for a diabetic patient with the following details:\n\
         Fasting Sugar Level: {} mg/dL\n\
         Pre-Meal Sugar Level: {} mg/dL\n\
         Post-Meal Sugar Level: {} mg/dL\n\
         Dietary Preferences: {}",
        request.fasting_sugar, request.pre_meal_sugar, request.post_meal_sugar, request.preferences
    )
}

pub fn nutrition_prompt(meal_plan: &str) -> String {
    format!("Provide detailed nutritional information for the following meal plan:\n{meal_plan}")
}

pub fn insights_prompt(meal_plan: &str) -> String {
    format!("Explain how the following meal plan helps in managing diabetes:\n{meal_plan}")
}
