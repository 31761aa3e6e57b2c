//! DuckDuckGo Instant Answer client.
//!
//! The Instant Answer API is keyless. It returns an abstract for well-known
//! topics plus a tree of related topics, which is flattened into [`SearchHit`]s.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{SearchHit, WebSearch};
use crate::error::LLMError;

const DEFAULT_BASE_URL: &str = "https://api.duckduckgo.com/";

pub struct DuckDuckGo {
    base_url: String,
    timeout_seconds: Option<u64>,
    client: Client,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(default)]
    answer: serde_json::Value,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
    #[serde(default)]
    results: Vec<RelatedTopic>,
}

/// Either a leaf topic or a named group of topics.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum RelatedTopic {
    Group {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
    Leaf {
        #[serde(rename = "Text", default)]
        text: String,
        #[serde(rename = "FirstURL", default)]
        first_url: String,
    },
}

impl DuckDuckGo {
    pub fn new(base_url: Option<String>, timeout_seconds: Option<u64>) -> Result<Self, LLMError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(sec));
        }
        Ok(Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_seconds,
            client: builder.build()?,
        })
    }
}

impl InstantAnswer {
    fn into_hits(self, max_results: usize) -> Vec<SearchHit> {
        let mut hits = Vec::new();

        if let Some(answer) = self.answer.as_str().filter(|a| !a.is_empty()) {
            hits.push(SearchHit {
                title: "Instant answer".to_string(),
                url: String::new(),
                snippet: answer.to_string(),
            });
        }
        if !self.abstract_text.is_empty() {
            hits.push(SearchHit {
                title: self.heading,
                url: self.abstract_url,
                snippet: self.abstract_text,
            });
        }

        let mut pending: Vec<RelatedTopic> = self.results;
        pending.extend(self.related_topics);
        flatten_topics(pending, &mut hits);

        hits.truncate(max_results);
        hits
    }
}

fn flatten_topics(topics: Vec<RelatedTopic>, hits: &mut Vec<SearchHit>) {
    for topic in topics {
        match topic {
            RelatedTopic::Group { name, topics } => {
                log::trace!("flattening related topic group {name}");
                flatten_topics(topics, hits);
            }
            RelatedTopic::Leaf { text, first_url } if !text.is_empty() => {
                // Text reads "Title - description"
                let (title, snippet) = match text.split_once(" - ") {
                    Some((title, rest)) => (title.to_string(), rest.to_string()),
                    None => (text.clone(), text),
                };
                hits.push(SearchHit {
                    title,
                    url: first_url,
                    snippet,
                });
            }
            RelatedTopic::Leaf { .. } => {}
        }
    }
}

#[async_trait]
impl WebSearch for DuckDuckGo {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, LLMError> {
        let mut request = self.client.get(&self.base_url).query(&[
            ("q", query),
            ("format", "json"),
            ("no_html", "1"),
            ("skip_disambig", "1"),
        ]);
        if let Some(timeout) = self.timeout_seconds {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        let response = request.send().await?;
        log::debug!("DuckDuckGo HTTP status: {}", response.status());
        if !response.status().is_success() {
            let status = response.status();
            return Err(LLMError::ResponseFormatError {
                message: format!("DuckDuckGo returned error status: {status}"),
                raw_response: response.text().await?,
            });
        }

        // The API answers with content-type application/x-javascript
        let body = response.text().await?;
        let answer: InstantAnswer = serde_json::from_str(&body)?;
        let hits = answer.into_hits(max_results);
        log::debug!("DuckDuckGo returned {} hits for {:?}", hits.len(), query);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Heading": "Pizza",
        "AbstractText": "Pizza is an Italian dish.",
        "AbstractURL": "https://en.wikipedia.org/wiki/Pizza",
        "Answer": "",
        "Results": [],
        "RelatedTopics": [
            {"Text": "Neapolitan pizza - A style of pizza from Naples.", "FirstURL": "https://duckduckgo.com/Neapolitan_pizza"},
            {"Name": "Places", "Topics": [
                {"Text": "Rome - Capital of Italy.", "FirstURL": "https://duckduckgo.com/Rome"},
                {"Text": "", "FirstURL": "https://duckduckgo.com/empty"}
            ]}
        ]
    }"#;

    #[test]
    fn abstract_and_nested_topics_become_hits() {
        let answer: InstantAnswer = serde_json::from_str(SAMPLE).unwrap();
        let hits = answer.into_hits(10);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title, "Pizza");
        assert_eq!(hits[0].url, "https://en.wikipedia.org/wiki/Pizza");
        assert_eq!(hits[1].title, "Neapolitan pizza");
        assert_eq!(hits[1].snippet, "A style of pizza from Naples.");
        assert_eq!(hits[2].title, "Rome");
    }

    #[test]
    fn hits_are_truncated() {
        let answer: InstantAnswer = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(answer.into_hits(2).len(), 2);
    }

    #[test]
    fn empty_answer_has_no_hits() {
        let answer: InstantAnswer = serde_json::from_str("{}").unwrap();
        assert!(answer.into_hits(5).is_empty());
    }
}
