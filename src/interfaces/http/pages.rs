//! Server-rendered HTML for the three-step flow.

use crate::domain::ml::feature_registry::{FEATURE_SCHEMA, FeatureKind};
use crate::domain::session::{DEFAULT_PATIENT_NAME, SessionRecord};

const STYLE: &str = "body{font-family:sans-serif;max-width:720px;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-top:.6rem}input{width:100%;padding:.3rem}\
button{margin-top:1rem;padding:.5rem 1.2rem}.badge{padding:.3rem .8rem;border-radius:4px;color:#fff}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{title} - CardioPredict</title><style>{STYLE}</style></head>\
         <body>{body}</body></html>"
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn patient_name_page() -> String {
    layout(
        "Patient",
        r#"<h1>CardioPredict</h1>
<form id="patient">
  <label for="patient_name">Patient name</label>
  <input id="patient_name" name="patient_name" required>
  <button type="submit">Continue</button>
</form>
<script>
document.getElementById('patient').addEventListener('submit', async (e) => {
  e.preventDefault();
  await fetch('/set_patient', {method: 'POST', headers: {'Content-Type': 'application/json'},
    body: JSON.stringify({patient_name: document.getElementById('patient_name').value})});
  window.location = '/assessment';
});
</script>"#,
    )
}

pub fn assessment_page(patient_name: &str) -> String {
    let inputs: String = FEATURE_SCHEMA
        .iter()
        .map(|spec| {
            let constraint = match spec.kind {
                FeatureKind::Continuous => "step=\"any\"".to_string(),
                FeatureKind::Categorical { min, max } => {
                    format!("step=\"1\" min=\"{}\" max=\"{}\"", min, max)
                }
            };
            format!(
                "<label for=\"{name}\">{name}</label>\
                 <input type=\"number\" id=\"{name}\" name=\"{name}\" {constraint} required>",
                name = spec.name
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Assessment for {name}</h1>
<form id="assessment">{inputs}<button type="submit">Predict</button></form>
<p id="error" style="color:#dc3545"></p>
<script>
document.getElementById('assessment').addEventListener('submit', async (e) => {{
  e.preventDefault();
  const body = Object.fromEntries(new FormData(e.target).entries());
  const res = await fetch('/predict', {{method: 'POST', headers: {{'Content-Type': 'application/json'}},
    body: JSON.stringify(body)}});
  if (res.ok) {{ window.location = '/results'; }}
  else {{ document.getElementById('error').textContent = (await res.json()).error; }}
}});
</script>"#,
        name = escape_html(patient_name),
        inputs = inputs
    );
    layout("Assessment", &body)
}

pub fn results_page(record: Option<&SessionRecord>) -> String {
    let name = record
        .map(SessionRecord::display_name)
        .unwrap_or(DEFAULT_PATIENT_NAME);

    let Some(prediction) = record.and_then(|r| r.prediction.as_ref()) else {
        return layout(
            "Results",
            &format!(
                "<h1>Results for {}</h1><p>No assessment yet. <a href=\"/assessment\">Start one</a>.</p>",
                escape_html(name)
            ),
        );
    };

    let rows: String = record
        .and_then(|r| r.patient_data.as_ref())
        .map(|data| {
            FEATURE_SCHEMA
                .iter()
                .filter_map(|spec| data.get(spec.name).map(|v| (spec.name, v)))
                .map(|(field, value)| {
                    let shown = match value.as_str() {
                        Some(s) => s.to_string(),
                        None => value.to_string(),
                    };
                    format!(
                        "<tr><td>{}</td><td>{}</td></tr>",
                        field,
                        escape_html(&shown)
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    let body = format!(
        "<h1>Results for {name}</h1>\
         <p><span class=\"badge\" style=\"background:{color}\">{level} risk</span></p>\
         <p>{message} (probability {probability:.1}%)</p>\
         <table>{rows}</table><p><a href=\"/assessment\">New assessment</a></p>",
        name = escape_html(name),
        color = prediction.risk_color,
        level = escape_html(&prediction.risk_level),
        message = escape_html(&prediction.message),
        probability = prediction.probability * 100.0,
        rows = rows
    );
    layout("Results", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::prediction::PredictionResult;
    use chrono::{Duration, Utc};

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_assessment_page_lists_every_feature() {
        let page = assessment_page("<script>");
        for spec in FEATURE_SCHEMA.iter() {
            assert!(page.contains(&format!("name=\"{}\"", spec.name)));
        }
        assert!(!page.contains("<script>alert"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_results_page_without_prediction() {
        let page = results_page(None);
        assert!(page.contains(DEFAULT_PATIENT_NAME));
        assert!(page.contains("No assessment yet"));
    }

    #[test]
    fn test_results_page_with_prediction() {
        let mut record = SessionRecord::new(Utc::now(), Duration::minutes(5));
        record.patient_name = Some("Ada".to_string());
        record.prediction = Some(PredictionResult::new(1, 0.82).to_response());
        let page = results_page(Some(&record));
        assert!(page.contains("Ada"));
        assert!(page.contains("High risk"));
        assert!(page.contains("#dc3545"));
        assert!(page.contains("82.0%"));
    }
}
