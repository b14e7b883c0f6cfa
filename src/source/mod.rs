//! Best-effort lookups against external sources for technologies the catalog
//! does not know. Strictly off the primary read path: every transport,
//! status or decode failure collapses to `None` and the caller reports "no
//! enrichment data".

use log::debug;
use serde::{Deserialize, Serialize};

use crate::revision::first_year;
use crate::store::technology::TechnologyRecord;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

#[derive(Deserialize)]
struct WikiSummary {
    extract: Option<String>,
    content_urls: Option<WikiContentUrls>,
}

#[derive(Deserialize)]
struct WikiContentUrls {
    desktop: Option<WikiPageUrl>,
}

#[derive(Deserialize)]
struct WikiPageUrl {
    page: Option<String>,
}

#[derive(Deserialize)]
struct GithubSearch {
    items: Option<Vec<GithubRepo>>,
}

#[derive(Deserialize)]
struct GithubRepo {
    description: Option<String>,
    html_url: Option<String>,
    created_at: Option<String>,
}

/// A catalog hit needs no network round trip.
pub fn enrichment_from_record(record: &TechnologyRecord) -> Enrichment {
    Enrichment {
        name: record.name.clone(),
        description: record.description.clone(),
        start_year: Some(record.periods.start),
        sources: record.sources.clone(),
    }
}

/// Wikipedia first, GitHub repository search second, `None` when neither
/// yields anything usable.
pub async fn fetch_technology_summary(name: &str) -> Option<Enrichment> {
    if let Some(enrichment) = wiki_summary(name).await {
        return Some(enrichment);
    }
    github_summary(name).await
}

async fn wiki_summary(name: &str) -> Option<Enrichment> {
    let mut url = reqwest::Url::parse("https://en.wikipedia.org/api/rest_v1/page/summary/").ok()?;
    url.path_segments_mut().ok()?.push(name);

    let response = reqwest::Client::new().get(url).send().await.ok()?;
    if !response.status().is_success() {
        debug!("wikipedia lookup for {} returned {}", name, response.status());
        return None;
    }
    let summary: WikiSummary = response.json().await.ok()?;
    let extract = summary.extract.filter(|e| !e.is_empty())?;

    let mut sources = vec![];
    if let Some(page) = summary
        .content_urls
        .and_then(|u| u.desktop)
        .and_then(|d| d.page)
    {
        sources.push(format!("Wikipedia: {page}"));
    }
    Some(Enrichment {
        name: name.to_string(),
        description: extract,
        start_year: None,
        sources,
    })
}

async fn github_summary(name: &str) -> Option<Enrichment> {
    let response = reqwest::Client::new()
        .get("https://api.github.com/search/repositories")
        .query(&[
            ("q", name),
            ("sort", "stars"),
            ("order", "desc"),
            ("per_page", "1"),
        ])
        .header("User-Agent", "tessera")
        .send()
        .await
        .ok()?;
    if !response.status().is_success() {
        debug!("github lookup for {} returned {}", name, response.status());
        return None;
    }
    let search: GithubSearch = response.json().await.ok()?;
    let repo = search.items?.into_iter().next()?;

    let mut sources = vec![];
    if let Some(url) = &repo.html_url {
        sources.push(format!("GitHub: {url}"));
    }
    Some(Enrichment {
        name: name.to_string(),
        description: repo
            .description
            .unwrap_or_else(|| format!("{name} - технология из внешнего источника")),
        start_year: repo.created_at.as_deref().and_then(first_year),
        sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revision::Category;
    use crate::store::technology::Periods;

    #[test]
    fn catalog_records_enrich_without_network() {
        let record = TechnologyRecord {
            id: "ccxt".to_string(),
            name: "CCXT".to_string(),
            full_name: None,
            description: "Библиотека для подключения к биржам".to_string(),
            category: Category::Data,
            periods: Periods {
                start: 2017,
                peak: Some(2021),
                decline: None,
                end: None,
            },
            evolution: None,
            applicable_modules: vec![],
            advantages: vec![],
            disadvantages: vec![],
            use_cases: vec![],
            sources: vec!["CCXT Documentation".to_string()],
        };
        let enrichment = enrichment_from_record(&record);
        assert_eq!(enrichment.start_year, Some(2017));
        assert_eq!(enrichment.sources.len(), 1);
    }

    #[test]
    fn repo_creation_timestamps_yield_years() {
        assert_eq!(first_year("2017-05-14T09:21:33Z"), Some(2017));
        assert_eq!(first_year("not a date"), None);
    }
}
