//! Built-in scrape profiles
//!
//! A profile bundles what one batch run needs: the literal URL list (in
//! processing order), candidate container selectors, URL-to-category rules
//! and extraction thresholds. Every profile shares the canonical thresholds;
//! only selectors and URL lists differ between sources.

use anyhow::{Context, Result};
use regex::Regex;

use super::extraction::{ContentExtractor, ExtractionOptions, DEFAULT_CANDIDATE_SELECTORS};

pub const DEFAULT_CATEGORY: &str = "general";

/// Assigns a category when the URL matches `pattern`
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub pattern: Regex,
    pub category: String,
}

impl CategoryRule {
    pub fn new(pattern: &str, category: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)
                .with_context(|| format!("Invalid category pattern {:?}", pattern))?,
            category: category.to_string(),
        })
    }
}

/// Category rules shared by every built-in profile, first match wins
pub fn default_category_rules() -> Result<Vec<CategoryRule>> {
    [
        (r"(?i)/(academic|registrar|grading|grades|enroll|transcript|curriculum)", "academic"),
        (r"(?i)/(conduct|integrity|title-?ix|discipline|misconduct|harassment)", "conduct"),
        (r"(?i)/(financial|tuition|aid|refund|billing|scholarship)", "financial"),
        (r"(?i)/(housing|residence|residential|dining)", "housing"),
        (r"(?i)/(parking|transportation|safety|security|emergency)", "campus"),
        (r"(?i)/(privacy|ferpa|records|it-|technology|acceptable-use)", "privacy"),
    ]
    .iter()
    .map(|(pattern, category)| CategoryRule::new(pattern, category))
    .collect()
}

/// One source of policy pages
#[derive(Debug, Clone)]
pub struct SourceProfile {
    /// Short name used on the command line
    pub name: String,
    /// Stored on every record as `source_name`
    pub source_name: String,
    pub urls: Vec<String>,
    pub candidate_selectors: Vec<String>,
    pub category_rules: Vec<CategoryRule>,
    pub default_category: String,
    pub options: ExtractionOptions,
}

impl SourceProfile {
    pub fn new(name: &str, source_name: &str, urls: Vec<String>) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            source_name: source_name.to_string(),
            urls,
            candidate_selectors: DEFAULT_CANDIDATE_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            category_rules: default_category_rules()?,
            default_category: DEFAULT_CATEGORY.to_string(),
            options: ExtractionOptions::default(),
        })
    }

    /// Put `selectors` ahead of the defaults
    pub fn with_selectors(mut self, selectors: &[&str]) -> Self {
        let mut ordered: Vec<String> = selectors.iter().map(|s| s.to_string()).collect();
        ordered.extend(
            self.candidate_selectors
                .into_iter()
                .filter(|s| !selectors.contains(&s.as_str())),
        );
        self.candidate_selectors = ordered;
        self
    }

    pub fn with_default_category(mut self, category: &str) -> Self {
        self.default_category = category.to_string();
        self
    }

    pub fn with_options(mut self, options: ExtractionOptions) -> Self {
        self.options = options;
        self
    }

    /// Category for `url` by rule, else the profile default
    pub fn categorize(&self, url: &str) -> String {
        self.category_rules
            .iter()
            .find(|rule| rule.pattern.is_match(url))
            .map(|rule| rule.category.clone())
            .unwrap_or_else(|| self.default_category.clone())
    }

    pub fn extractor(&self) -> Result<ContentExtractor> {
        ContentExtractor::new(self.candidate_selectors.as_slice(), self.options)
            .with_context(|| format!("Invalid selectors in profile {}", self.name))
    }
}

fn urls(site_url: &str, paths: &[&str]) -> Vec<String> {
    let base = site_url.trim_end_matches('/');
    paths.iter().map(|p| format!("{}{}", base, p)).collect()
}

/// The five built-in profiles for `site_url`
pub fn builtin_profiles(site_url: &str) -> Result<Vec<SourceProfile>> {
    Ok(vec![
        SourceProfile::new(
            "handbook",
            "Student Handbook",
            urls(
                site_url,
                &[
                    "/student-handbook",
                    "/student-handbook/rights-and-responsibilities",
                    "/student-handbook/student-conduct-code",
                    "/student-handbook/academic-integrity",
                    "/student-handbook/alcohol-and-drug-policy",
                    "/student-handbook/grievance-procedures",
                ],
            ),
        )?
        .with_selectors(&["#handbook-content", ".handbook-section"]),
        SourceProfile::new(
            "academic",
            "Registrar",
            urls(
                site_url,
                &[
                    "/registrar/academic-policies",
                    "/registrar/grading-policy",
                    "/registrar/add-drop-withdrawal",
                    "/registrar/academic-standing",
                    "/registrar/transcripts",
                    "/registrar/ferpa",
                ],
            ),
        )?
        .with_selectors(&[".policy-body", "#policy-content"])
        .with_default_category("academic"),
        SourceProfile::new(
            "conduct",
            "Office of Student Conduct",
            urls(
                site_url,
                &[
                    "/student-conduct/code-of-conduct",
                    "/student-conduct/conduct-process",
                    "/title-ix/policy",
                    "/title-ix/reporting",
                    "/student-conduct/anti-harassment",
                ],
            ),
        )?
        .with_default_category("conduct"),
        SourceProfile::new(
            "financial",
            "Student Financial Services",
            urls(
                site_url,
                &[
                    "/financial-aid/satisfactory-academic-progress",
                    "/financial-aid/refund-policy",
                    "/tuition/payment-policy",
                    "/tuition/late-fees",
                    "/financial-aid/scholarship-renewal",
                ],
            ),
        )?
        .with_selectors(&[".field--name-body", ".region-content"])
        .with_default_category("financial"),
        SourceProfile::new(
            "campus",
            "Campus Life",
            urls(
                site_url,
                &[
                    "/housing/residence-hall-policies",
                    "/housing/guest-policy",
                    "/dining/meal-plan-policy",
                    "/parking/regulations",
                    "/it/acceptable-use-policy",
                    "/safety/emergency-procedures",
                ],
            ),
        )?,
    ])
}

/// Look up a built-in profile by name
pub fn find_profile<'a>(profiles: &'a [SourceProfile], name: &str) -> Option<&'a SourceProfile> {
    profiles.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
