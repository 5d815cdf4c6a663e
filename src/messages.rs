//! Shared text shown by the planner UI.
//!
//! Keep all user-facing strings in this module so they stay in one place and are
//! easy to update or translate.

pub const APP_TITLE: &str = "Diabetic Diet Meal Planner";
pub const SIDEBAR_HEADER: &str = "Input Your Details";

pub const FASTING_LABEL: &str = "Fasting Sugar Level";
pub const PRE_MEAL_LABEL: &str = "Pre-Meal Sugar Level";
pub const POST_MEAL_LABEL: &str = "Post-Meal Sugar Level";
pub const PREFERENCES_LABEL: &str = "Personal Preferences";
pub const PREFERENCES_DEFAULT: &str = "e.g., low-carb, vegetarian";
pub const SUBMIT_LABEL: &str = "Generate Meal Plan";

pub const MEAL_PLAN_HEADING: &str = "📋 Personalized Meal Plan";
pub const NUTRITION_HEADING: &str = "🍽 Nutritional Information";
pub const INSIGHTS_HEADING: &str = "🔍 Expert Insights";

pub const DISCLAIMER_HEADING: &str = "Disclaimer";
pub const DISCLAIMER: &str = "This AI-powered tool is for informational purposes only and does not replace professional medical advice. Please consult with your healthcare provider for personalized medical guidance.";

pub const API_KEYS_MISSING: &str =
    "API keys are missing. Please set them in the environment variables.";

pub const GENERATION_FAILED: &str =
    "Something went wrong while generating your meal plan. Please try again later.";
pub const MEAL_PLAN_ERROR: &str = "Error generating meal plan.";
pub const NUTRITION_ERROR: &str = "Error generating nutritional information.";
pub const INSIGHTS_ERROR: &str = "Error generating expert insights.";
