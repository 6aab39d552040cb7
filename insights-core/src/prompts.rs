//! Prompt construction — pure string templates over the repository record.
//!
//! Field values are interpolated verbatim; no escaping is applied, so
//! adversarial text in the description passes straight through to the model.

use crate::repo::{Language, RepoRecord};

/// Analysis prompt covering all four record fields.
pub fn insight_prompt(record: &RepoRecord) -> String {
    format!(
        "Analyze the following GitHub repository metadata and provide insights:\n\
         \n\
         Repository URL: {url}\n\
         Description: {description}\n\
         Stars: {stars}\n\
         Primary Language: {language}\n\
         \n\
         Please provide insights on the following aspects:\n\
         1. Repository popularity and community interest\n\
         2. Potential use cases based on the description\n\
         3. Suggestions for improvement or growth\n\
         4. Relevance to current trends in {language} development\n\
         5. Feature recommendations: Suggest 3-5 features or enhancements that are popular in similar projects\n\
         \n\
         Insights:",
        url = record.url,
        description = record.description,
        stars = record.stars,
        language = record.language,
    )
}

/// Recommendation prompt using only the description and language.
pub fn recommendation_prompt(description: &str, language: Language) -> String {
    format!(
        "Based on the following GitHub repository description, suggest 3-5 features or enhancements that are popular in similar projects:\n\
         \n\
         Repository Description: {description}\n\
         Primary Language: {language}\n\
         \n\
         Feature Recommendations:"
    )
}
