//! HTML rendering for the planner page.

use pulldown_cmark::{html, Event, Options, Parser};
use serde::Deserialize;

use crate::messages;
use crate::planner::PlanOutcome;

/// Raw form fields, kept as strings so invalid input can be shown back.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct FormValues {
    #[serde(default)]
    pub fasting_sugar: String,
    #[serde(default)]
    pub pre_meal_sugar: String,
    #[serde(default)]
    pub post_meal_sugar: String,
    #[serde(default)]
    pub preferences: String,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            fasting_sugar: "0".to_string(),
            pre_meal_sugar: "0".to_string(),
            post_meal_sugar: "0".to_string(),
            preferences: messages::PREFERENCES_DEFAULT.to_string(),
        }
    }
}

/// Everything one page render needs.
#[derive(Debug, Default)]
pub struct PageView {
    pub form: FormValues,
    /// Shown when the providers are not configured; disables the form.
    pub warning: Option<String>,
    /// Shown when the submitted values were rejected.
    pub validation: Option<String>,
    pub outcome: Option<PlanOutcome>,
    pub footer: String,
}

/// Render model output as HTML. Embedded raw HTML is shown as text.
pub fn markdown_to_html(text: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(text.len() * 2);
    html::push_html(&mut out, parser);
    out
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn number_input(name: &str, label: &str, value: &str) -> String {
    format!(
        "<label for=\"{name}\">{label}</label>\n\
         <input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"0\" max=\"500\" step=\"1\" value=\"{}\" required>\n",
        escape_html(value)
    )
}

fn sidebar(form: &FormValues, enabled: bool) -> String {
    let mut out = format!(
        "<aside>\n<h2>{}</h2>\n<form method=\"post\" action=\"/plan\">\n",
        messages::SIDEBAR_HEADER
    );
    out.push_str(&number_input("fasting_sugar", messages::FASTING_LABEL, &form.fasting_sugar));
    out.push_str(&number_input("pre_meal_sugar", messages::PRE_MEAL_LABEL, &form.pre_meal_sugar));
    out.push_str(&number_input(
        "post_meal_sugar",
        messages::POST_MEAL_LABEL,
        &form.post_meal_sugar,
    ));
    out.push_str(&format!(
        "<label for=\"preferences\">{}</label>\n\
         <input type=\"text\" id=\"preferences\" name=\"preferences\" value=\"{}\">\n",
        messages::PREFERENCES_LABEL,
        escape_html(&form.preferences)
    ));
    let disabled = if enabled { "" } else { " disabled" };
    out.push_str(&format!(
        "<button type=\"submit\"{disabled}>{}</button>\n</form>\n</aside>\n",
        messages::SUBMIT_LABEL
    ));
    out
}

fn section(heading: &str, body: &str) -> String {
    format!(
        "<section>\n<h3>{heading}</h3>\n{}</section>\n",
        markdown_to_html(body)
    )
}

pub fn render_page(view: &PageView) -> String {
    let mut main = String::new();
    if let Some(warning) = &view.warning {
        main.push_str(&format!(
            "<p class=\"warning\">{}</p>\n",
            escape_html(warning)
        ));
    }
    if let Some(validation) = &view.validation {
        main.push_str(&format!(
            "<p class=\"error\">{}</p>\n",
            escape_html(validation)
        ));
    }

    if let Some(outcome) = &view.outcome {
        main.push_str(&format!("<h1>{}</h1>\n", messages::APP_TITLE));
        if let PlanOutcome::Failed { message, .. } = outcome {
            main.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(message)));
        }
        let plan = outcome.plan();
        main.push_str(&section(messages::MEAL_PLAN_HEADING, &plan.meal_plan));
        main.push_str(&section(messages::NUTRITION_HEADING, &plan.nutritional_info));
        main.push_str(&section(messages::INSIGHTS_HEADING, &plan.expert_insights));
    }

    main.push_str(&format!(
        "<h4>{}</h4>\n<p>{}</p>\n",
        messages::DISCLAIMER_HEADING,
        messages::DISCLAIMER
    ));

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{sidebar}\
         <main>\n{main}</main>\n<footer><pre>{footer}</pre></footer>\n</body>\n</html>\n",
        title = messages::APP_TITLE,
        sidebar = sidebar(&view.form, view.warning.is_none()),
        footer = escape_html(&view.footer),
    )
}

const STYLE: &str = "body{display:flex;font-family:sans-serif;margin:0}\
aside{width:18rem;padding:1rem;background:#f0f2f6}\
aside input,aside button{display:block;width:100%;margin:.25rem 0 .75rem}\
main{flex:1;padding:1rem 2rem}\
.warning{background:#fff3cd;padding:.5rem}\
.error{background:#f8d7da;padding:.5rem}\
footer{position:fixed;bottom:0;right:0;font-size:.7rem;color:#888}";
