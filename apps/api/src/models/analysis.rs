//! The Analysis Result contract shared by the scoring engine, the session
//! snapshot served to the UI, and the advisory chat context.
//!
//! Field names follow the wire format (camelCase). Every field is required on
//! decode; see `analysis::decode` for the invariants checked after parsing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateType {
    Fresher,
    Experienced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub name: String,
    #[serde(rename = "type")]
    pub candidate_type: CandidateType,
    pub target_role: String,
    #[serde(rename = "detectedYoE")]
    pub detected_yoe: f64,
}

impl CandidateProfile {
    /// First whitespace-separated token of the name, used for greetings.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("there")
    }
}

/// Traffic-light status the engine assigns to each module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleStatus {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleResult {
    pub score: f64,
    pub max_score: f64,
    pub status: ModuleStatus,
    pub feedback: Vec<String>,
    pub positive_points: Vec<String>,
}

/// The six fixed scoring categories of the rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleName {
    Academics,
    TechSkills,
    Projects,
    Experience,
    Professionalism,
    Formatting,
}

impl ModuleName {
    pub const ALL: [ModuleName; 6] = [
        ModuleName::Academics,
        ModuleName::TechSkills,
        ModuleName::Projects,
        ModuleName::Experience,
        ModuleName::Professionalism,
        ModuleName::Formatting,
    ];

    /// Rubric point allocation. Sums to 100 across all modules.
    pub fn max_score(self) -> f64 {
        match self {
            ModuleName::Academics => 20.0,
            ModuleName::TechSkills => 15.0,
            ModuleName::Projects => 25.0,
            ModuleName::Experience => 20.0,
            ModuleName::Professionalism => 15.0,
            ModuleName::Formatting => 5.0,
        }
    }

    /// Wire key, as it appears under `modules` in the JSON document.
    pub fn key(self) -> &'static str {
        match self {
            ModuleName::Academics => "academics",
            ModuleName::TechSkills => "techSkills",
            ModuleName::Projects => "projects",
            ModuleName::Experience => "experience",
            ModuleName::Professionalism => "professionalism",
            ModuleName::Formatting => "formatting",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ModuleName::Academics => "Academic & Eligibility",
            ModuleName::TechSkills => "Tech Stack Relevance",
            ModuleName::Projects => "Projects & Internships",
            ModuleName::Experience => "Experience & Impact",
            ModuleName::Professionalism => "Professional Norms (Indian)",
            ModuleName::Formatting => "Formatting & Structure",
        }
    }
}

/// All six module results. A struct rather than a map so that a missing
/// module is a decode error, not an absent key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modules {
    pub academics: ModuleResult,
    pub tech_skills: ModuleResult,
    pub projects: ModuleResult,
    pub experience: ModuleResult,
    pub professionalism: ModuleResult,
    pub formatting: ModuleResult,
}

impl Modules {
    pub fn get(&self, name: ModuleName) -> &ModuleResult {
        match name {
            ModuleName::Academics => &self.academics,
            ModuleName::TechSkills => &self.tech_skills,
            ModuleName::Projects => &self.projects,
            ModuleName::Experience => &self.experience,
            ModuleName::Professionalism => &self.professionalism,
            ModuleName::Formatting => &self.formatting,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleName, &ModuleResult)> {
        ModuleName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }

    pub fn total_score(&self) -> f64 {
        self.iter().map(|(_, module)| module.score).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageFix {
    pub category: String,
    pub fix: String,
    pub example: String,
}

/// Aggregate root of one analysis. Built once from one engine response and
/// shared behind an `Arc`; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub candidate_profile: CandidateProfile,
    pub overall_score: f64,
    pub percentile: f64,
    pub modules: Modules,
    pub critical_red_flags: Vec<String>,
    pub top_leverage_fixes: Vec<LeverageFix>,
}

impl AnalysisResult {
    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::for_score(self.overall_score)
    }
}

/// Colour band of the overall score gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Red,
    Yellow,
    Green,
}

impl ScoreBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Green
        } else if score >= 60.0 {
            ScoreBand::Yellow
        } else {
            ScoreBand::Red
        }
    }
}
