//! Server-rendered HTML for the two tools.

use std::fmt::Write;

use pulldown_cmark::{html, Options, Parser};

use super::types::{MovieForm, SearchForm};
use crate::movie::PREFERENCES_TIP;
use crate::search::SearchModel;

/// Notice styles, mirroring the info/warning/error boxes of the widget layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Info,
    Warning,
    Error,
}

impl Notice {
    fn class(self) -> &'static str {
        match self {
            Notice::Info => "notice info",
            Notice::Warning => "notice warning",
            Notice::Error => "notice error",
        }
    }
}

/// What goes below a form once it has been submitted.
#[derive(Debug, Clone, Default)]
pub struct PageOutput {
    pub heading: Option<&'static str>,
    pub markdown: Option<String>,
    pub notices: Vec<(Notice, String)>,
}

impl PageOutput {
    pub fn notice(kind: Notice, text: impl Into<String>) -> Self {
        Self {
            notices: vec![(kind, text.into())],
            ..Self::default()
        }
    }
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #262730; }
label { display: block; margin-top: 1rem; font-weight: 600; }
input, textarea, select { width: 100%; padding: .5rem; margin-top: .25rem; box-sizing: border-box; }
.columns { display: flex; gap: 1rem; }
.columns > div { flex: 1; }
button { margin-top: 1rem; padding: .5rem 1.25rem; cursor: pointer; }
.notice { padding: .75rem 1rem; border-radius: .5rem; margin: 1rem 0; }
.info { background: #e8f0fe; }
.warning { background: #fff8e1; }
.error { background: #fdecea; }
#spinner { display: none; margin-top: 1rem; }
#spinner.active { display: block; }
#spinner::before { content: ""; display: inline-block; width: 1em; height: 1em; margin-right: .5em;
  border: 2px solid #ccc; border-top-color: #ff4b4b; border-radius: 50%; animation: spin 1s linear infinite; vertical-align: middle; }
@keyframes spin { to { transform: rotate(360deg); } }
footer { margin-top: 3rem; border-top: 1px solid #ddd; padding-top: .5rem; color: #808495; font-size: .85rem; }
"#;

const SPINNER_SCRIPT: &str = r#"
document.querySelectorAll("form").forEach(function (form) {
  form.addEventListener("submit", function () {
    document.getElementById("spinner").classList.add("active");
  });
});
"#;

/// Escapes text echoed back into the page.
/// Safe both as element text and inside a double-quoted attribute.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

/// Renders model markdown. Raw HTML in the markdown is kept as is.
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn layout(title: &str, body: &str, footer: Option<&str>) -> String {
    let footer = footer
        .map(|f| format!("<footer>{}</footer>", escape_html(f)))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n{footer}\n\
<script>{SPINNER_SCRIPT}</script>\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

fn render_output(output: &PageOutput) -> String {
    let mut html = String::new();
    if let Some(heading) = output.heading {
        let _ = write!(html, "<h2>{}</h2>", escape_html(heading));
    }
    if let Some(markdown) = &output.markdown {
        let _ = write!(
            html,
            "<div class=\"output\">{}</div>",
            render_markdown(markdown)
        );
    }
    for (kind, text) in &output.notices {
        let _ = write!(
            html,
            "<div class=\"{}\">{}</div>",
            kind.class(),
            escape_html(text)
        );
    }
    html
}

pub fn index() -> String {
    layout(
        "LLM Companion",
        "<h1>LLM Companion</h1>\n<ul>\n\
<li><a href=\"/movies\">🎬 Cinematic Companion</a>: movie recommendations from a film you liked</li>\n\
<li><a href=\"/search\">🔎 Search Agent</a>: web-search backed answers to your questions</li>\n\
</ul>",
        None,
    )
}

const MOVIE_EXAMPLES: &str = "\
- **Movie:** The Dark Knight (2008)  
  **Preferences:** Heath Ledger's performance, the gritty tone, moral complexity

- **Movie:** Parasite (2019)  
  **Preferences:** social commentary, genre-blending, unexpected plot turns

- **Movie:** Pride & Prejudice (2005)  
  **Preferences:** period romance, strong female lead, witty dialogue
";

pub fn movies(form: &MovieForm, output: Option<&PageOutput>) -> String {
    let body = format!(
        r#"<h1>🎬 Cinematic Companion - Movie Recommendation Engine</h1>
<form method="post" action="/movies">
<div class="columns">
<div><label for="movie_name">Movie Name</label>
<input id="movie_name" name="movie_name" placeholder="e.g., Inception" value="{name}"></div>
<div><label for="movie_year">Release Year</label>
<input id="movie_year" name="movie_year" placeholder="e.g., 2010" value="{year}"></div>
</div>
<label for="preferences">What did you particularly enjoy about this movie? (Optional)</label>
<textarea id="preferences" name="preferences" rows="4" placeholder="e.g., the mind-bending plot twists, Hans Zimmer's score, the visual effects...">{preferences}</textarea>
<button type="submit">Get Recommendations</button>
</form>
<div id="spinner">Analyzing your movie and finding perfect matches...</div>
{output}
<details><summary>💡 Example Queries</summary>{examples}</details>"#,
        name = escape_html(&form.movie_name),
        year = escape_html(&form.movie_year),
        preferences = escape_html(&form.preferences),
        output = output.map(render_output).unwrap_or_default(),
        examples = render_markdown(MOVIE_EXAMPLES),
    );
    layout(
        "Cinematic Companion",
        &body,
        Some("Powered by Google Gemini - Finding your next favorite movie since 2024"),
    )
}

/// Output for a successful recommendation.
pub fn recommendations(markdown: String) -> PageOutput {
    PageOutput {
        heading: Some("Your Personalized Movie Recommendations"),
        markdown: Some(markdown),
        notices: vec![(Notice::Info, format!("💡 {PREFERENCES_TIP}"))],
    }
}

pub fn search(form: &SearchForm, selected: SearchModel, output: Option<&PageOutput>) -> String {
    let options: String = SearchModel::ALL
        .iter()
        .map(|m| {
            format!(
                "<option value=\"{id}\"{sel}>{label}</option>",
                id = m.id(),
                sel = if *m == selected { " selected" } else { "" },
                label = m.label(),
            )
        })
        .collect();

    let body = format!(
        r#"<h1>🔎 Search Agent</h1>
<form method="post" action="/search">
<label for="query">What are you looking for?</label>
<input id="query" name="query" placeholder="e.g., best pizza in Rome" value="{query}">
<label for="model">Model</label>
<select id="model" name="model">{options}</select>
<button type="submit">Search</button>
</form>
<div id="spinner">Searching the web...</div>
{output}"#,
        query = escape_html(&form.query),
        output = output.map(render_output).unwrap_or_default(),
    );
    layout("Search Agent", &body, Some("Powered by Groq and DuckDuckGo"))
}

/// Page shown when a request fails outright.
pub fn failure(message: &str) -> String {
    layout(
        "Something went wrong",
        &format!(
            "<h1>Something went wrong</h1>\n<div class=\"notice error\">{}</div>\n<p><a href=\"/\">Back</a></p>",
            escape_html(message)
        ),
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_echoed_values() {
        assert_eq!(
            escape_html(r#"<b>"Tom & Jerry"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&quot;&lt;/b&gt;"
        );
        let form = MovieForm {
            movie_name: r#"x" onfocus="alert(1)"#.into(),
            ..MovieForm::default()
        };
        let page = movies(&form, None);
        assert!(page.contains(r#"value="x&quot; onfocus=&quot;alert(1)""#));
        assert!(!page.contains(r#"x" onfocus"#));
        let form = MovieForm {
            movie_name: "<script>".into(),
            ..MovieForm::default()
        };
        let page = movies(&form, None);
        assert!(page.contains("value=\"&lt;script&gt;\""));
    }

    #[test]
    fn markdown_keeps_raw_html() {
        let html = render_markdown("**Heat** (1995)\n\n<em>stream it</em>\n");
        assert!(html.contains("<strong>Heat</strong>"));
        assert!(html.contains("<em>stream it</em>"));
    }

    #[test]
    fn movie_page_has_examples_and_footer() {
        let page = movies(&MovieForm::default(), None);
        assert!(page.contains("Example Queries"));
        assert!(page.contains("Pride &amp; Prejudice (2005)"));
        assert!(page.contains("Powered by Google Gemini"));
    }

    #[test]
    fn recommendations_carry_heading_and_tip() {
        let html = render_output(&recommendations("- **Heat**".into()));
        assert!(html.contains("<h2>Your Personalized Movie Recommendations</h2>"));
        assert!(html.contains("<strong>Heat</strong>"));
        assert!(html.contains("notice info"));
        assert!(html.contains(PREFERENCES_TIP));
    }

    #[test]
    fn search_page_selects_model() {
        let page = search(&SearchForm::default(), SearchModel::Gemma2, None);
        assert!(page.contains("<option value=\"gemma2-9b-it\" selected>"));
        assert_eq!(page.matches("<option").count(), 4);
    }
}
