// Page handlers for HTML rendering with Askama

use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::Form;
use serde::Deserialize;

use crate::dashboard::Dashboard;
use crate::data;
use crate::features::{FeatureVector, PatientInput, Region, Sex, Smoker};
use crate::server::AppState;

fn render<T: Template>(template: T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        format!("Template error: {}", e)
    }))
}

// ============================================================================
// Home Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub title: String,
    pub dataset_url: String,
}

pub async fn home_page() -> impl IntoResponse {
    render(HomeTemplate {
        title: "Medical Cost Predictor".to_string(),
        dataset_url: "https://www.kaggle.com/datasets/mirichoi0218/insurance".to_string(),
    })
}

// ============================================================================
// Prediction Page
// ============================================================================

/// Raw form values. Strings for the categorical fields so a failed parse
/// can be surfaced as a message instead of a 422.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictForm {
    pub age: u32,
    pub sex: String,
    pub smoker: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub children: u32,
    pub region: String,
}

impl Default for PredictForm {
    fn default() -> Self {
        Self {
            age: 25,
            sex: "male".to_string(),
            smoker: "no".to_string(),
            height_cm: 170.0,
            weight_kg: 70.0,
            children: 0,
            region: "southeast".to_string(),
        }
    }
}

pub struct FeatureDetail {
    pub name: &'static str,
    pub value: String,
}

pub struct PredictionView {
    pub charges: String,
    pub bmi: String,
    pub details: Vec<FeatureDetail>,
}

#[derive(Template)]
#[template(path = "pages/predict.html")]
pub struct PredictTemplate {
    pub form: PredictForm,
    pub result: Option<PredictionView>,
    pub error: Option<String>,
}

pub async fn predict_page() -> impl IntoResponse {
    render(PredictTemplate {
        form: PredictForm::default(),
        result: None,
        error: None,
    })
}

pub async fn predict_submit(
    State(state): State<AppState>,
    Form(form): Form<PredictForm>,
) -> impl IntoResponse {
    let template = match run_prediction(&state, &form) {
        Ok(result) => PredictTemplate {
            form,
            result: Some(result),
            error: None,
        },
        Err(message) => PredictTemplate {
            form,
            result: None,
            error: Some(message),
        },
    };
    render(template)
}

fn run_prediction(state: &AppState, form: &PredictForm) -> Result<PredictionView, String> {
    let sex = form.sex.parse::<Sex>().map_err(|e| e.to_string())?;
    let smoker = form.smoker.parse::<Smoker>().map_err(|e| e.to_string())?;
    let region = form.region.parse::<Region>().map_err(|e| e.to_string())?;

    let model = state
        .model
        .as_ref()
        .ok_or_else(|| "Prediction model is not loaded; check the model artifact".to_string())?;

    let input = PatientInput {
        age: form.age,
        sex,
        smoker,
        height_cm: form.height_cm,
        weight_kg: form.weight_kg,
        children: form.children,
        region,
    };
    let features = input.features();
    let charges = model.predict_charges(&features);

    Ok(PredictionView {
        charges: format_usd(charges),
        bmi: format!("{:.2}", features.bmi),
        details: feature_details(&features),
    })
}

/// Encoded input row shown under the prediction (the "detail input" table).
fn feature_details(features: &FeatureVector) -> Vec<FeatureDetail> {
    FeatureVector::COLUMNS
        .iter()
        .zip(features.as_array())
        .map(|(name, value)| FeatureDetail {
            name,
            value: fmt_number(value),
        })
        .collect()
}

// ============================================================================
// Dashboard Page
// ============================================================================

pub struct SummaryRow {
    pub column: String,
    pub count: String,
    pub mean: String,
    pub std: String,
    pub min: String,
    pub q25: String,
    pub median: String,
    pub q75: String,
    pub max: String,
}

pub struct CorrCell {
    pub display: String,
    pub style: String,
}

pub struct CorrRow {
    pub label: String,
    pub cells: Vec<CorrCell>,
}

pub struct CorrView {
    pub columns: Vec<String>,
    pub rows: Vec<CorrRow>,
}

pub struct BoxplotRow {
    pub label: String,
    pub min: String,
    pub q1: String,
    pub median: String,
    pub q3: String,
    pub max: String,
}

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
pub struct DashboardTemplate {
    pub error: Option<String>,
    pub row_count: usize,
    pub warnings: Vec<String>,
    pub summary: Vec<SummaryRow>,
    pub corr: Option<CorrView>,
    pub boxplots: Vec<BoxplotRow>,
    /// Full dashboard payload as JSON, consumed by the chart script.
    pub payload_json: String,
}

impl DashboardTemplate {
    fn error_page(message: String) -> Self {
        Self {
            error: Some(message),
            row_count: 0,
            warnings: Vec::new(),
            summary: Vec::new(),
            corr: None,
            boxplots: Vec::new(),
            payload_json: "null".to_string(),
        }
    }
}

pub async fn dashboard_page(State(state): State<AppState>) -> impl IntoResponse {
    // Re-read the dataset on every view
    let df = match data::load_dataset(&state.dataset_path) {
        Ok(df) => df,
        Err(e) => return render(DashboardTemplate::error_page(e.to_string())),
    };

    let dashboard = Dashboard::from_dataframe(&df);
    let payload_json =
        serde_json::to_string(&dashboard).unwrap_or_else(|_| "null".to_string());

    let summary = dashboard
        .summary
        .iter()
        .map(|s| SummaryRow {
            column: s.column.clone(),
            count: s.count.to_string(),
            mean: fmt_stat(s.mean),
            std: fmt_stat(s.std),
            min: fmt_stat(s.min),
            q25: fmt_stat(s.q25),
            median: fmt_stat(s.median),
            q75: fmt_stat(s.q75),
            max: fmt_stat(s.max),
        })
        .collect();

    let corr = dashboard.correlation.as_ref().map(|matrix| CorrView {
        columns: matrix.columns.clone(),
        rows: matrix
            .columns
            .iter()
            .zip(&matrix.values)
            .map(|(label, row)| CorrRow {
                label: label.clone(),
                cells: row
                    .iter()
                    .map(|r| CorrCell {
                        display: if r.is_nan() {
                            "-".to_string()
                        } else {
                            format!("{:.2}", r)
                        },
                        style: corr_style(*r),
                    })
                    .collect(),
            })
            .collect(),
    });

    let boxplots = dashboard
        .charges_by_region
        .as_ref()
        .map(|stats| {
            stats
                .iter()
                .map(|b| BoxplotRow {
                    label: b.label.clone(),
                    min: format_usd(b.min),
                    q1: format_usd(b.q1),
                    median: format_usd(b.median),
                    q3: format_usd(b.q3),
                    max: format_usd(b.max),
                })
                .collect()
        })
        .unwrap_or_default();

    render(DashboardTemplate {
        error: None,
        row_count: dashboard.row_count,
        warnings: dashboard.warnings.clone(),
        summary,
        corr,
        boxplots,
        payload_json,
    })
}

// ============================================================================
// Formatting Helpers
// ============================================================================

/// "$16,884.92" style currency formatting.
fn format_usd(value: f64) -> String {
    let s = format!("{:.2}", value);
    let (int_part, frac_part) = match s.split_once('.') {
        Some(parts) => parts,
        None => (s.as_str(), "00"),
    };

    let negative = int_part.starts_with('-');
    let digits = int_part.trim_start_matches('-');

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac_part)
}

/// Integers render bare, everything else with two decimals.
fn fmt_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn fmt_stat(value: f64) -> String {
    format!("{:.2}", value)
}

/// Blue (-1) through red (+1) cell background for the heatmap table.
fn corr_style(r: f64) -> String {
    if r.is_nan() {
        return String::new();
    }
    let t = ((r + 1.0) / 2.0).clamp(0.0, 1.0);
    let hue = 240.0 * (1.0 - t);
    format!("background-color: hsl({:.0}, 70%, 82%)", hue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd_groups_thousands() {
        assert_eq!(format_usd(16884.924), "$16,884.92");
        assert_eq!(format_usd(1338.0), "$1,338.00");
        assert_eq!(format_usd(42.5), "$42.50");
        assert_eq!(format_usd(1234567.891), "$1,234,567.89");
    }

    #[test]
    fn test_fmt_number() {
        assert_eq!(fmt_number(30.0), "30");
        assert_eq!(fmt_number(24.2214), "24.22");
    }

    #[test]
    fn test_corr_style_extremes() {
        assert_eq!(corr_style(1.0), "background-color: hsl(0, 70%, 82%)");
        assert_eq!(corr_style(-1.0), "background-color: hsl(240, 70%, 82%)");
        assert_eq!(corr_style(f64::NAN), "");
    }
}
