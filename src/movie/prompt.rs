//! Prompt rendering for movie recommendations.

use serde::{Deserialize, Serialize};

/// The five similarity criteria every recommendation request enumerates.
pub const SIMILARITY_CRITERIA: [&str; 5] = [
    "Similar plot/story elements",
    "Matching tone and atmosphere",
    "Comparable themes and messages",
    "Similar directorial style or cinematography",
    "Shared cast members when relevant",
];

/// What the user typed into the movie form.
///
/// Values are opaque strings: a malformed year is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieQuery {
    pub title: String,
    pub year: String,
    #[serde(default)]
    pub preferences: String,
}

impl MovieQuery {
    pub fn new(title: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: year.into(),
            preferences: String::new(),
        }
    }

    pub fn preferences(mut self, preferences: impl Into<String>) -> Self {
        self.preferences = preferences.into();
        self
    }

    /// Both the title and the year were filled in.
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.year.trim().is_empty()
    }
}

/// System instruction plus user message, built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    system_instruction: String,
    user_message: String,
}

impl RenderedPrompt {
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }
}

/// Renders the recommendation template for `query`.
///
/// A sixth criterion carrying the preferences verbatim is added only when the
/// preferences are non-empty.
pub fn render_prompt(query: &MovieQuery) -> RenderedPrompt {
    let MovieQuery {
        title,
        year,
        preferences,
    } = query;

    let mut criteria: Vec<String> = SIMILARITY_CRITERIA
        .iter()
        .enumerate()
        .map(|(i, criterion)| format!("{}. {}", i + 1, criterion))
        .collect();
    if !preferences.is_empty() {
        criteria.push(format!("6. User-specified preferences: {preferences}"));
    }

    let system_instruction = format!(
        "You are an expert film analyst with comprehensive knowledge of movies across all genres and eras.
Your task is to recommend movies similar to {title} ({year}) based on:
{criteria}

Provide exactly 5 recommendations with:
- Movie title (with release year)
- Brief similarity explanation (what makes it similar)
- Key shared elements (genre, director, cast, etc.)
- Where available to stream (Netflix, Prime, etc.)

Format the output in clear markdown with bold titles and bullet points.
",
        criteria = criteria.join("\n"),
    );

    let user_message = format!(
        "Recommend movies similar to {title} ({year}) with these preferences: {preferences}"
    );

    RenderedPrompt {
        system_instruction,
        user_message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_lines(instruction: &str) -> Vec<&str> {
        instruction
            .lines()
            .filter(|l| l.chars().next().is_some_and(|c| c.is_ascii_digit()))
            .collect()
    }

    #[test]
    fn inception_without_preferences() {
        let prompt = render_prompt(&MovieQuery::new("Inception", "2010"));
        let instruction = prompt.system_instruction();

        assert!(instruction.contains("Inception (2010)"));
        let lines = numbered_lines(instruction);
        assert_eq!(lines.len(), 5);
        for (i, criterion) in SIMILARITY_CRITERIA.iter().enumerate() {
            assert_eq!(lines[i], format!("{}. {}", i + 1, criterion));
        }
        assert!(!instruction.contains("6."));
        assert!(!instruction.contains("User-specified preferences"));
    }

    #[test]
    fn parasite_with_preferences() {
        let query = MovieQuery::new("Parasite", "2019").preferences("social commentary");
        let prompt = render_prompt(&query);
        let lines = numbered_lines(prompt.system_instruction());

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[5], "6. User-specified preferences: social commentary");
        assert_eq!(
            prompt.user_message(),
            "Recommend movies similar to Parasite (2019) with these preferences: social commentary"
        );
    }

    #[test]
    fn values_are_interpolated_verbatim() {
        let query = MovieQuery::new("<b>Amélie</b>", "two thousand one")
            .preferences("Yann Tiersen's *score*, {braces} & \"quotes\"");
        let prompt = render_prompt(&query);
        let instruction = prompt.system_instruction();

        assert!(instruction.contains("<b>Amélie</b> (two thousand one)"));
        assert!(instruction.contains("Yann Tiersen's *score*, {braces} & \"quotes\""));
        assert!(prompt.user_message().contains("<b>Amélie</b> (two thousand one)"));
    }

    #[test]
    fn instruction_asks_for_five_markdown_recommendations() {
        let instruction = render_prompt(&MovieQuery::new("Heat", "1995"))
            .system_instruction()
            .to_string();
        assert!(instruction.contains("Provide exactly 5 recommendations"));
        assert!(instruction.contains("Where available to stream"));
        assert!(instruction.contains("bold titles and bullet points"));
    }

    #[test]
    fn criteria_are_fixed_regardless_of_input() {
        for (title, year, prefs) in [
            ("", "", ""),
            ("1. Similar plot", "9999", "x"),
            ("Up", "2009", "\n"),
        ] {
            let query = MovieQuery::new(title, year).preferences(prefs);
            let instruction = render_prompt(&query).system_instruction().to_string();
            for (i, criterion) in SIMILARITY_CRITERIA.iter().enumerate() {
                assert!(instruction.contains(&format!("{}. {}", i + 1, criterion)));
            }
        }
    }

    #[test]
    fn completeness_requires_title_and_year() {
        assert!(MovieQuery::new("Heat", "1995").is_complete());
        assert!(!MovieQuery::new("Heat", "").is_complete());
        assert!(!MovieQuery::new("  ", "1995").is_complete());
    }

    #[test]
    fn whitespace_only_fields_count_as_missing() {
        assert!(!MovieQuery::new("Heat", " \t\n").is_complete());
        assert!(!MovieQuery::new("\n", "\t").is_complete());
        assert!(MovieQuery::new(" Heat ", " 1995 ").is_complete());
    }
}
