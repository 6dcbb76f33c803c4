//! Diagnostic report composition.
//!
//! Assembles a self-contained printable document from one interpreted
//! analysis plus operator-entered patient context. The composer is a pure
//! downstream consumer: it re-displays the result (rounded percentage,
//! severity color, confidence bar) but never re-derives the label or the
//! confidence. Handing the document to a print/export surface is the
//! caller's concern.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::AnalysisError;
use crate::pipeline::AnalysisResult;

/// Severity color for a positive finding.
const POSITIVE_COLOR: &str = "#DC2626";
/// Severity color for a negative finding.
const NEGATIVE_COLOR: &str = "#16A34A";

/// Operator-entered patient context for the report.
///
/// Purely a composition input; the pipeline itself never sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub physician_name: String,
    /// Free-text clinical notes, rendered verbatim (escaped) in the report.
    pub additional_notes: Option<String>,
}

/// The source X-ray, inlined so the document stands alone.
#[derive(Debug, Clone)]
pub struct ReportImage {
    data_uri: String,
}

impl ReportImage {
    /// Wraps already-encoded image bytes (the same bytes the pipeline
    /// analyzed) as an inline `data:` URI.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Decode`] if the format cannot be recognized.
    pub fn from_encoded_bytes(image_bytes: &[u8]) -> Result<Self, AnalysisError> {
        let format = image::guess_format(image_bytes).map_err(AnalysisError::Decode)?;
        Ok(Self {
            data_uri: format!(
                "data:{};base64,{}",
                format.to_mime_type(),
                BASE64.encode(image_bytes)
            ),
        })
    }

    /// The inline `data:` URI.
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }
}

/// A rendered diagnostic document. Immutable once composed.
#[derive(Debug, Clone)]
pub struct Report {
    html: String,
}

impl Report {
    /// The document markup.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Consumes the report, yielding the markup.
    pub fn into_html(self) -> String {
        self.html
    }
}

/// Assembles the printable diagnosis form.
///
/// Deterministic: the same inputs always produce the same document. Dates
/// render as `MM/DD/YYYY`; the confidence bar width and percentage both use
/// `round(confidence * 100)`.
pub fn compose(
    result: &AnalysisResult,
    patient: &PatientRecord,
    image: &ReportImage,
    service_date: NaiveDate,
) -> Report {
    let confidence_percent = (result.confidence * 100.0).round() as u32;
    let severity_color = if result.has_pneumonia {
        POSITIVE_COLOR
    } else {
        NEGATIVE_COLOR
    };
    let detection_text = if result.has_pneumonia {
        "Pneumonia detected"
    } else {
        "No pneumonia detected"
    };
    let diagnosis_text = if result.has_pneumonia {
        "Pneumonia detected with high probability. Further clinical correlation recommended."
    } else {
        "No pneumonia detected. Normal lung findings on x-ray analysis."
    };

    let patient_name = escape_html(&format!("{} {}", patient.first_name, patient.last_name));
    let gender = escape_html(&patient.gender);
    let physician_name = escape_html(&patient.physician_name);
    let notes = patient
        .additional_notes
        .as_deref()
        .map(escape_html)
        .unwrap_or_default();
    let formatted_dob = patient.date_of_birth.format("%m/%d/%Y");
    let formatted_service_date = service_date.format("%m/%d/%Y");
    let report_year = service_date.year();
    let image_uri = image.data_uri();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>Doctor Diagnosis Form</title>
<meta charset="utf-8" />
<style>
{REPORT_STYLE}
</style>
</head>
<body>
<h1>Doctor Diagnosis Form</h1>

<div class="form-row space-between">
  <div class="form-group col-50">
    <label>Patient's Name</label>
    <div class="form-control">{patient_name}</div>
  </div>
  <div class="form-group col-50">
    <label>Gender</label>
    <div class="form-control">{gender}</div>
  </div>
</div>

<div class="form-row space-between">
  <div class="form-group col-50">
    <label>Patient's Date of Birth</label>
    <div class="form-control">{formatted_dob}</div>
  </div>
  <div class="form-group col-50">
    <label>Date of Service</label>
    <div class="form-control">{formatted_service_date}</div>
  </div>
</div>

<div class="form-group">
  <label>Diagnosis</label>
  <div class="form-control">{diagnosis_text}</div>
</div>

<div class="form-group">
  <label>X-Ray Analysis</label>
  <img src="{image_uri}" alt="Chest X-ray" class="x-ray-image" />
  <div>
    <strong>AI Detection Result:</strong> {detection_text}
  </div>
  <div>
    <strong>Confidence:</strong> {confidence_percent}%
  </div>
  <div class="confidence-bar" style="width: {confidence_percent}%; background-color: {severity_color};"></div>
</div>

<div class="form-group">
  <label>Additional Notes</label>
  <div class="form-control form-control-textarea">{notes}</div>
</div>

<div class="form-group">
  <label>Performing Physician Signature</label>
  <div class="signature-box">
    <div class="signature-text">{physician_name}</div>
    <div class="signature-line"></div>
  </div>
</div>

<div class="footer">
  <p>This is an AI-assisted diagnostic report. Please consult with a healthcare professional for final diagnosis.</p>
  <p>MediScan Pro &copy; {report_year}</p>
</div>
</body>
</html>
"#
    );

    Report { html }
}

/// Static styling for the diagnosis form. The confidence bar's width and
/// color are per-report and rendered inline on the element.
const REPORT_STYLE: &str = r#"body {
  font-family: 'Times New Roman', Times, serif;
  line-height: 1.6;
  color: #333;
  max-width: 800px;
  margin: 0 auto;
  padding: 20px;
}
h1 {
  text-align: center;
  color: #333;
  font-size: 28px;
  margin-bottom: 30px;
  font-weight: normal;
}
.form-row {
  display: flex;
  margin-bottom: 20px;
}
.form-group {
  margin-bottom: 20px;
}
.form-group label {
  display: block;
  font-weight: bold;
  margin-bottom: 5px;
}
.form-control {
  width: 100%;
  padding: 10px;
  border: 1px solid #ccc;
  border-radius: 4px;
  background-color: #f0f7ff;
}
.form-control-textarea {
  min-height: 100px;
}
.col-50 {
  flex: 0 0 48%;
}
.space-between {
  justify-content: space-between;
}
.signature-box {
  border: 1px solid #ccc;
  padding: 20px;
  margin-top: 10px;
  min-height: 60px;
  border-radius: 4px;
  background-color: #f0f7ff;
  text-align: center;
  position: relative;
}
.signature-line {
  position: absolute;
  bottom: 10px;
  left: 10px;
  right: 10px;
  border-bottom: 1px solid #999;
}
.signature-text {
  position: absolute;
  bottom: 15px;
  left: 0;
  right: 0;
  text-align: center;
  font-style: italic;
}
.x-ray-image {
  max-width: 100%;
  max-height: 300px;
  display: block;
  margin: 20px auto;
  border: 1px solid #ccc;
  border-radius: 4px;
}
.confidence-bar {
  height: 20px;
  border-radius: 4px;
  margin-top: 5px;
}
.footer {
  margin-top: 40px;
  text-align: center;
  font-size: 12px;
  color: #666;
}"#;

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
