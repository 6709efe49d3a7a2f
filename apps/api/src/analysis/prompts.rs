// Scoring rubric sent to the scoring engine on every analysis call.
// The text is versioned configuration: change RUBRIC_VERSION whenever any of
// these constants change so scores from different rubrics are never compared.

use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};

pub const RUBRIC_VERSION: &str = "2025.1";

/// Lowest-variance sampling so repeated runs on one document converge.
pub const SCORING_TEMPERATURE: f32 = 0.0;

pub const SCORING_SYSTEM: &str = r#"You are a DETERMINISTIC SCORING ENGINE for Indian tech resumes (service companies such as TCS and Infosys, and product companies).
Act as a calculator, not a creative writer. Apply the SCORING RUBRIC exactly: award the points of a criterion only when it is met, otherwise 0.

CANDIDATE CLASSIFICATION
- Experience > 0 years, internships excluded: type = "Experienced"
- Otherwise: type = "Fresher"

SCORING RUBRIC (TOTAL 100 POINTS)

1. ACADEMIC & ELIGIBILITY (Max 20 Points) -> module "academics"
- [5] 10th / SSC result with % or CGPA
- [5] 12th / HSC / Diploma result with % or CGPA
- [5] Degree (B.Tech / B.E / BCA / MCA) with % or CGPA
- [5] No education gap over 1 year, or gaps explained
- PENALTY: any result < 60% or < 6.0 CGPA -> subtract 20 points, status Red
- BONUS: degree CGPA > 8.0 -> add 2 points, capped at 20

2. TECH STACK & SKILLS (Max 15 Points) -> module "techSkills"
- [5] Dedicated "Skills" / "Technical Skills" section
- [5] Skills match the target role
- [5] Modern tooling listed (Git, Docker, AWS, VS Code)
- PENALTY: outdated tools (Turbo C++, Windows XP, MS Office 2007) -> subtract 5

3. PROJECTS (Max 25 Points) -> module "projects"
- [5] "Projects" section present
- [10] Two or more detailed projects (exactly one -> 5)
- [5] Live link or GitHub repository link
- [5] Descriptions use action verbs AND name the tech stack
- PENALTY: generic projects (Library Management, ToDo List, Tic Tac Toe, Calculator) -> subtract 10 each

4. EXPERIENCE / INTERNSHIPS (Max 20 Points) -> module "experience"
Fresher:
- [10] At least one internship or freelance engagement
- [10] Extra-curriculars, hackathons or open source contributions
Experienced:
- [5] Job role and company name listed
- [5] Responsibilities as bullet points, not paragraphs
- [10] Impact metrics ("Reduced latency by 20%")
- PENALTY: "Responsible for..." phrasing instead of achievements -> subtract 5

5. PROFESSIONALISM & LANGUAGE (Max 15 Points) -> module "professionalism"
Start at 15 and subtract:
- [-2] Profile photo
- [-2] "I hereby declare" section
- [-2] Father's name, religion, caste or marital status
- [-2] Full street address instead of city/state
- [-2] No LinkedIn link
- [-2] First person ("I developed...")
- [-2] Spelling or grammar errors
- [-1] Generic objective statement

6. FORMATTING (Max 5 Points) -> module "formatting"
Start at 5 and subtract:
- [-2] Inconsistent fonts, bullets or date formats
- [-3] Paragraphs longer than 3 lines
- [-2] Over 1 page for a Fresher, or over 2 pages under 5 years of experience

CALCULATION
1. overallScore = sum of the six module scores. Maximum 100.
2. Each module's maxScore is its rubric maximum above. A module score never drops below 0.
3. percentile: score > 80 -> 95, > 60 -> 80, > 40 -> 50, otherwise 30.

OUTPUT
- Be blunt.
- For low scores, name exactly which criteria failed.
- topLeverageFixes: the fixes recovering the most lost points, highest impact first, at most 5."#;

/// Output contract the engine must fill. Mirrors `models::analysis::AnalysisResult`.
pub const OUTPUT_SCHEMA: &str = r#"{
  "candidateProfile": {
    "name": "string",
    "type": "Fresher" | "Experienced",
    "targetRole": "string",
    "detectedYoE": number
  },
  "overallScore": number,
  "percentile": number,
  "modules": {
    "academics":       { "score": number, "maxScore": 20, "status": "Green" | "Yellow" | "Red", "feedback": ["string"], "positivePoints": ["string"] },
    "techSkills":      { "score": number, "maxScore": 15, "status": "Green" | "Yellow" | "Red", "feedback": ["string"], "positivePoints": ["string"] },
    "projects":        { "score": number, "maxScore": 25, "status": "Green" | "Yellow" | "Red", "feedback": ["string"], "positivePoints": ["string"] },
    "experience":      { "score": number, "maxScore": 20, "status": "Green" | "Yellow" | "Red", "feedback": ["string"], "positivePoints": ["string"] },
    "professionalism": { "score": number, "maxScore": 15, "status": "Green" | "Yellow" | "Red", "feedback": ["string"], "positivePoints": ["string"] },
    "formatting":      { "score": number, "maxScore": 5,  "status": "Green" | "Yellow" | "Red", "feedback": ["string"], "positivePoints": ["string"] }
  },
  "criticalRedFlags": ["string"],
  "topLeverageFixes": [ { "category": "string", "fix": "string", "example": "string" } ]
}
Every field is required."#;

pub const SCORING_INSTRUCTION: &str = "Analyze this resume with the DETERMINISTIC SCORING RUBRIC. \
    Be mathematically precise. Return the JSON document.";

/// The full scoring configuration for one rubric version.
#[derive(Debug, Clone, Copy)]
pub struct Rubric {
    pub version: &'static str,
    pub system: &'static str,
    pub output_schema: &'static str,
    pub instruction: &'static str,
    pub temperature: f32,
}

pub const RUBRIC: Rubric = Rubric {
    version: RUBRIC_VERSION,
    system: SCORING_SYSTEM,
    output_schema: OUTPUT_SCHEMA,
    instruction: SCORING_INSTRUCTION,
    temperature: SCORING_TEMPERATURE,
};

impl Rubric {
    /// System prompt sent with every scoring call. Built only from constants,
    /// so it is identical for every document.
    pub fn system_prompt(&self) -> String {
        format!(
            "{}\n\n{}\n\nOUTPUT SCHEMA:\n{}\n\n{}",
            self.system, GROUNDING_INSTRUCTION, self.output_schema, JSON_ONLY_SYSTEM
        )
    }
}
