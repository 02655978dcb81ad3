//! Recherche Nominatim (OpenStreetMap) via HTTP

use std::time::Duration;

use anyhow::{Context, Result};
use burgh::{Coordinates, Lookup, LookupError};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;

use crate::config::GeocoderConfig;

/// Un résultat de `/search?format=jsonv2` (seuls les champs utiles)
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Client Nominatim implémentant [`Lookup`]
#[derive(Debug, Clone)]
pub struct NominatimLookup {
    http: reqwest::Client,
    search_url: String,
    email: Option<String>,
    country_codes: Option<String>,
}

impl NominatimLookup {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            // marge au-delà du timeout du GeocodeClient
            builder = builder.timeout(timeout + Duration::from_secs(1));
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            search_url: format!("{}/search", config.endpoint.trim_end_matches('/')),
            email: config.email.clone(),
            country_codes: config.country_codes.clone(),
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    fn query_params<'a>(&'a self, query: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![("q", query), ("format", "jsonv2"), ("limit", "1")];
        if let Some(codes) = &self.country_codes {
            params.push(("countrycodes", codes.as_str()));
        }
        if let Some(email) = &self.email {
            params.push(("email", email.as_str()));
        }
        params
    }

    async fn search(&self, query: &str) -> Result<Option<Coordinates>, LookupError> {
        let response = self
            .http
            .get(&self.search_url)
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        parse_search_response(&body)
    }
}

impl Lookup for NominatimLookup {
    fn lookup<'a>(
        &'a self,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Option<Coordinates>, LookupError>> {
        self.search(query).boxed()
    }
}

/// Premier résultat d'une réponse `/search`, `None` si la liste est vide
fn parse_search_response(body: &str) -> Result<Option<Coordinates>, LookupError> {
    let places: Vec<Place> =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;

    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let latitude = parse_ordinate("lat", &place.lat)?;
    let longitude = parse_ordinate("lon", &place.lon)?;
    Ok(Some(Coordinates::new(latitude, longitude)))
}

fn parse_ordinate(field: &str, raw: &str) -> Result<f64, LookupError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| LookupError::Malformed(format!("invalid {}: {:?}", field, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_match() {
        let body = r#"[{"place_id": 1, "lat": "56.3955", "lon": "-3.4309", "display_name": "Perth, Scotland"}]"#;
        assert_eq!(
            parse_search_response(body).unwrap(),
            Some(Coordinates::new(56.3955, -3.4309))
        );
    }

    #[test]
    fn test_parse_no_match() {
        assert_eq!(parse_search_response("[]").unwrap(), None);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_search_response("<html>rate limited</html>"),
            Err(LookupError::Malformed(_))
        ));
        assert!(matches!(
            parse_search_response(r#"[{"lat": "north", "lon": "-3.4"}]"#),
            Err(LookupError::Malformed(_))
        ));
    }

    #[test]
    fn test_query_params() {
        let config = GeocoderConfig {
            endpoint: "http://localhost:8080/".to_string(),
            country_codes: Some("gb".to_string()),
            ..Default::default()
        };
        let lookup = NominatimLookup::new(&config).unwrap();

        assert_eq!(lookup.search_url(), "http://localhost:8080/search");
        let params = lookup.query_params("of Ayr");
        assert_eq!(params[0], ("q", "of Ayr"));
        assert!(params.contains(&("countrycodes", "gb")));
        assert!(!params.iter().any(|(k, _)| *k == "email"));
    }
}
