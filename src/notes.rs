//! Note-generation boundary.
//!
//! The transcript is handed to an external service as newline-joined
//! `"Speaker: text"` lines with a specialty tag and a quality level; the
//! service returns a structured SOAP note. When the call fails the caller
//! falls back to a locally generated mock structure, which is the documented
//! degraded mode rather than an error path.

use crate::config::NoteConfig;
use crate::error::{Result, ScribeError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// How much clinical detail to ask the service for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Fast,
    #[default]
    Standard,
    High,
}

impl QualityLevel {
    /// Instruction sent to the service for this level.
    pub fn prompt(&self) -> &'static str {
        match self {
            QualityLevel::Fast => {
                "Provide a concise but complete SOAP note with essential details."
            }
            QualityLevel::Standard => {
                "Provide a comprehensive SOAP note with appropriate clinical detail and reasoning."
            }
            QualityLevel::High => {
                "Provide a detailed, thorough SOAP note with extensive clinical reasoning, \
                 differential diagnoses, and specialty-specific considerations."
            }
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QualityLevel::Fast => "fast",
            QualityLevel::Standard => "standard",
            QualityLevel::High => "high",
        };
        write!(f, "{}", name)
    }
}

/// Prompt context for a documentation specialty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialtyInfo {
    pub name: &'static str,
    pub context: &'static str,
    pub focus: &'static str,
}

/// Look up a specialty tag, falling back to general medicine for unknown
/// tags.
pub fn specialty_info(tag: &str) -> SpecialtyInfo {
    match tag {
        "cardiology" => SpecialtyInfo {
            name: "Cardiology",
            context: "cardiology with focus on cardiovascular conditions",
            focus: "cardiac assessment and cardiovascular risk factors",
        },
        "pediatrics" => SpecialtyInfo {
            name: "Pediatrics",
            context: "pediatrics with age-appropriate considerations",
            focus: "pediatric development and age-specific conditions",
        },
        "psychiatry" => SpecialtyInfo {
            name: "Psychiatry",
            context: "psychiatry with mental health focus",
            focus: "mental status examination and psychiatric conditions",
        },
        "orthopedics" => SpecialtyInfo {
            name: "Orthopedics",
            context: "orthopedics with musculoskeletal focus",
            focus: "musculoskeletal examination and movement disorders",
        },
        "dermatology" => SpecialtyInfo {
            name: "Dermatology",
            context: "dermatology with skin condition focus",
            focus: "dermatological examination and skin pathology",
        },
        "neurology" => SpecialtyInfo {
            name: "Neurology",
            context: "neurology with neurological condition focus",
            focus: "neurological examination and nervous system disorders",
        },
        "emergency" => SpecialtyInfo {
            name: "Emergency Medicine",
            context: "emergency medicine with acute care focus",
            focus: "acute presentation and emergency stabilization",
        },
        "oncology" => SpecialtyInfo {
            name: "Oncology",
            context: "oncology with cancer care focus",
            focus: "cancer staging, treatment response, and supportive care",
        },
        "endocrinology" => SpecialtyInfo {
            name: "Endocrinology",
            context: "endocrinology with hormonal disorder focus",
            focus: "endocrine system evaluation and metabolic disorders",
        },
        _ => SpecialtyInfo {
            name: "General Medicine",
            context: "general internal medicine",
            focus: "comprehensive primary care evaluation",
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientInfo {
    pub name: String,
    pub dob: String,
    pub mrn: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Subjective {
    pub chief_complaint: String,
    pub present_illness: String,
    pub review_systems: String,
    pub past_medical_history: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Objective {
    pub vital_signs: String,
    pub physical_exam: String,
    pub diagnostic_results: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Assessment {
    pub primary_diagnosis: String,
    pub differential_dx: String,
    pub clinical_impression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Plan {
    pub medications: String,
    pub procedures: String,
    pub follow_up: String,
    pub patient_education: String,
}

/// A structured clinical note in SOAP form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SoapNote {
    pub patient_info: PatientInfo,
    pub subjective: Subjective,
    pub objective: Objective,
    pub assessment: Assessment,
    pub plan: Plan,
}

/// Input to a note generator.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRequest {
    /// Newline-joined `"Speaker: text"` lines.
    pub dialogue: String,
    /// Specialty tag (see [`specialty_info`]).
    pub specialty: String,
    pub quality: QualityLevel,
}

/// Contract for the external note-generation service.
///
/// This trait allows swapping implementations (HTTP service vs mock).
#[async_trait]
pub trait NoteGenerator: Send + Sync {
    /// Turn a transcript into a structured note.
    async fn generate(&self, request: &NoteRequest) -> Result<SoapNote>;

    /// Name for logging/diagnostics.
    fn name(&self) -> &'static str;
}

/// HTTP-backed note generator.
pub struct HttpNoteGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpNoteGenerator {
    pub fn new(config: &NoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScribeError::NoteGeneration {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl NoteGenerator for HttpNoteGenerator {
    async fn generate(&self, request: &NoteRequest) -> Result<SoapNote> {
        let specialty = specialty_info(&request.specialty);
        let prompt = format!(
            "You are documenting a {} encounter, focusing on {}. {}\n\n\
             Return the SOAP note as a single JSON object.\n\n\
             Conversation transcript:\n{}",
            specialty.context,
            specialty.focus,
            request.quality.prompt(),
            request.dialogue
        );

        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
        });

        let mut http_request = self.client.post(&self.endpoint).json(&body);
        if !self.api_key.is_empty() {
            http_request = http_request.bearer_auth(&self.api_key);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| ScribeError::NoteGeneration {
                message: format!("request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScribeError::NoteGeneration {
                message: format!("service returned {}", status),
            });
        }

        let reply = response
            .text()
            .await
            .map_err(|e| ScribeError::NoteGeneration {
                message: format!("could not read service reply: {}", e),
            })?;

        parse_note_reply(&reply)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Parse a service reply, tolerating prose around the JSON object.
pub fn parse_note_reply(reply: &str) -> Result<SoapNote> {
    let json = extract_json_object(reply).ok_or_else(|| ScribeError::NoteGeneration {
        message: "no JSON object found in service reply".to_string(),
    })?;

    serde_json::from_str(json).map_err(|e| ScribeError::NoteGeneration {
        message: format!("could not parse note structure: {}", e),
    })
}

/// Slice out the outermost `{...}` block, if any.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Mock note generator for testing and offline fallback
#[derive(Debug, Clone, Default)]
pub struct MockNoteGenerator {
    should_fail: bool,
}

impl MockNoteGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail on generate
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

#[async_trait]
impl NoteGenerator for MockNoteGenerator {
    async fn generate(&self, request: &NoteRequest) -> Result<SoapNote> {
        if self.should_fail {
            return Err(ScribeError::NoteGeneration {
                message: "mock note generation failure".to_string(),
            });
        }
        Ok(mock_soap(&request.specialty))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Pick a generator from configuration: HTTP when an endpoint is set,
/// otherwise the mock.
pub fn generator_from_config(config: &NoteConfig) -> Result<Box<dyn NoteGenerator>> {
    if config.endpoint.is_empty() {
        Ok(Box::new(MockNoteGenerator::new()))
    } else {
        Ok(Box::new(HttpNoteGenerator::new(config)?))
    }
}

/// Generate a note, falling back to the mock structure on failure.
///
/// The fallback is the documented degraded mode; the failure is logged, not
/// surfaced.
pub async fn generate_with_fallback(
    generator: &dyn NoteGenerator,
    request: &NoteRequest,
) -> SoapNote {
    match generator.generate(request).await {
        Ok(note) => note,
        Err(e) => {
            warn!(
                generator = generator.name(),
                error = %e,
                "note generation failed, using mock structure"
            );
            mock_soap(&request.specialty)
        }
    }
}

/// Deterministic demo note, lightly customized per specialty.
pub fn mock_soap(specialty: &str) -> SoapNote {
    let mut note = SoapNote {
        patient_info: PatientInfo {
            name: "John Smith".to_string(),
            dob: "03/15/1978".to_string(),
            mrn: "MRN456789".to_string(),
        },
        subjective: Subjective {
            chief_complaint:
                "Patient presents with chest discomfort and shortness of breath for the past 2 days."
                    .to_string(),
            present_illness:
                "45-year-old male reports onset of substernal chest pressure 2 days ago, described \
                 as 7/10 intensity, non-radiating, associated with mild shortness of breath on \
                 exertion. Symptoms worsen with activity, improve with rest. No prior episodes."
                    .to_string(),
            review_systems:
                "Constitutional: Denies fever, chills, weight loss. Cardiovascular: Chest pain as \
                 per HPI, denies palpitations, orthopnea, PND, lower extremity edema. Respiratory: \
                 Mild SOB with exertion, denies cough, wheezing. All other systems negative."
                    .to_string(),
            past_medical_history:
                "Hypertension, hyperlipidemia, father with MI at age 55. No prior cardiac events. \
                 Medications: Lisinopril 10mg daily, atorvastatin 40mg daily. NKDA."
                    .to_string(),
        },
        objective: Objective {
            vital_signs:
                "BP 145/92, HR 78, RR 16, O2 Sat 98% on room air, Temp 98.4°F, Weight 185 lbs, BMI 28.1"
                    .to_string(),
            physical_exam:
                "General: Well-appearing male in no acute distress. Cardiovascular: Regular rate \
                 and rhythm, no murmurs, rubs, or gallops, no peripheral edema. Respiratory: Clear \
                 to auscultation bilaterally. Abdomen: Soft, non-tender, non-distended."
                    .to_string(),
            diagnostic_results:
                "ECG: Normal sinus rhythm at 78 bpm, no acute ST-T wave changes. Chest X-ray: \
                 Clear lung fields, normal cardiac silhouette."
                    .to_string(),
        },
        assessment: Assessment {
            primary_diagnosis: "R07.89 - Other chest pain".to_string(),
            differential_dx:
                "1. Atypical chest pain vs. stable angina 2. Gastroesophageal reflux disease 3. \
                 Musculoskeletal chest pain 4. Anxiety-related chest pain"
                    .to_string(),
            clinical_impression:
                "45-year-old male with cardiovascular risk factors presenting with atypical chest \
                 pain. Low-to-intermediate risk for acute coronary syndrome based on clinical \
                 presentation and normal ECG."
                    .to_string(),
        },
        plan: Plan {
            medications:
                "1. Continue Lisinopril 10mg daily 2. Continue atorvastatin 40mg daily 3. Consider \
                 trial of omeprazole 20mg daily 4. Aspirin 81mg daily"
                    .to_string(),
            procedures:
                "1. Outpatient stress echocardiogram within 2 weeks 2. Basic metabolic panel and \
                 lipid panel"
                    .to_string(),
            follow_up:
                "1. Return to clinic in 1-2 weeks or sooner if symptoms worsen 2. Cardiology \
                 referral if stress test positive"
                    .to_string(),
            patient_education:
                "1. Discussed warning signs of heart attack 2. Lifestyle modifications: \
                 heart-healthy diet, regular exercise 3. Medication compliance and follow-up \
                 importance"
                    .to_string(),
        },
    };

    if specialty == "pediatrics" {
        note.patient_info = PatientInfo {
            name: "Emma Johnson".to_string(),
            dob: "08/22/2018".to_string(),
            mrn: "PED123456".to_string(),
        };
        note.subjective.chief_complaint = "Well child visit for 5-year-old".to_string();
        note.assessment.primary_diagnosis =
            "Z00.129 - Encounter for routine child health examination without abnormal findings"
                .to_string();
    } else if specialty == "psychiatry" {
        note.subjective.chief_complaint = "Depression and anxiety symptoms".to_string();
        note.assessment.primary_diagnosis =
            "F32.1 - Major depressive disorder, single episode, moderate".to_string();
    }

    note
}
