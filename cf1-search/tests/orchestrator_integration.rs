//! Integration tests for the market search pipeline.
//!
//! Providers run without credentials (synthetic mode) unless a test points
//! one at a `wiremock` server, so no test reaches the real network.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use cf1_search::orchestrator::scoring::score;
use cf1_search::synthetic::FALLBACK_SOURCE;
use cf1_search::{
    AnswerValue, Category, DataFreshness, MarketSearch, OpportunityQuery, OpportunityType,
    ProviderId, RateLimit, RateLimiter, RiskLevel, SearchConfig,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MOCK_RENTCAST_JSON: &str = r#"[
    {
        "id": "1200-Barton-Springs-Rd-Austin-TX-78704",
        "formattedAddress": "1200 Barton Springs Rd, Austin, TX 78704",
        "addressLine1": "1200 Barton Springs Rd",
        "city": "Austin",
        "state": "TX",
        "zipCode": "78704",
        "latitude": 30.2606,
        "longitude": -97.7594,
        "propertyType": "Duplex",
        "bedrooms": 3,
        "price": 2450,
        "status": "Active"
    }
]"#;

fn synthetic_search() -> MarketSearch {
    MarketSearch::new(SearchConfig::default()).expect("default config is valid")
}

/// Default config with RentCast pointed at `server`.
fn config_with_rentcast(server: &MockServer, requests_per_minute: u32) -> SearchConfig {
    let mut config = SearchConfig {
        timeout_seconds: 2,
        ..SearchConfig::default()
    };
    if let Some(rentcast) = config.provider_mut(ProviderId::RentCast) {
        *rentcast = rentcast
            .clone()
            .with_api_key("test-key")
            .with_base_url(server.uri())
            .with_rate_limit(requests_per_minute, 100);
    }
    config
}

fn austin_rental() -> OpportunityQuery {
    OpportunityQuery::new("real estate", "rental").with_location("Austin, TX")
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn austin_rental_without_credentials() {
    let results = synthetic_search().search(&austin_rental()).await;

    let matching: Vec<_> = results
        .iter()
        .filter(|r| {
            r.kind == OpportunityType::RealEstate
                && r.investment_type.contains("Rental")
                && r.location.as_ref().is_some_and(|l| l.city == "Austin")
        })
        .collect();
    assert!(!matching.is_empty(), "expected an Austin rental, got {results:#?}");
    assert!(results.iter().all(|r| r.data_freshness == DataFreshness::Synthetic));
}

#[tokio::test]
async fn ai_stocks_are_high_risk() {
    let results = synthetic_search()
        .search(&OpportunityQuery::new("stocks", "ai"))
        .await;
    assert!(results
        .iter()
        .any(|r| r.kind == OpportunityType::Stock && r.risk_level == RiskLevel::High));
}

#[tokio::test]
async fn unrecognized_category_draws_on_category_generators() {
    let results = synthetic_search()
        .search(&OpportunityQuery::new("crypto art", "side income"))
        .await;
    let kinds: HashSet<Category> = results.iter().map(|r| r.kind.category()).collect();
    assert!(
        kinds.iter().any(|c| Category::specific().contains(c)),
        "general route should include category results"
    );
    assert!(kinds.len() >= 2, "general route should be diversified: {kinds:?}");
}

#[tokio::test]
async fn guided_answers_shape_synthetic_results() {
    let query = austin_rental()
        .with_answer("propertyType", AnswerValue::Text("condo".into()))
        .with_answer("cashFlow", AnswerValue::Text("high".into()));
    let results = synthetic_search().search(&query).await;
    assert!(results
        .iter()
        .any(|r| r.title.contains("Condo") || r.description.contains("Condo")));
}

#[tokio::test]
async fn every_result_is_scored_and_sorted() {
    let query = OpportunityQuery::new("business", "laundromat").with_budget(10_000.0, 500_000.0);
    let results = synthetic_search().search(&query).await;
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.relevance_score)));
    assert!(results
        .windows(2)
        .all(|w| w[0].relevance_score >= w[1].relevance_score));
}

// ---------------------------------------------------------------------------
// Determinism and caching
// ---------------------------------------------------------------------------

#[tokio::test]
async fn synthetic_results_are_deterministic_across_instances() {
    let query = OpportunityQuery::new("energy", "solar").with_location("Phoenix, AZ");
    let a = synthetic_search().search(&query).await;
    let b = synthetic_search().search(&query).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn different_query_text_gets_independent_entries() {
    let search = synthetic_search();
    let rental = search.search(&austin_rental()).await;
    let flip = search
        .search(&OpportunityQuery::new("real estate", "flip").with_location("Austin, TX"))
        .await;
    assert_ne!(rental, flip);
    assert_eq!(search.cached_entry_count().await, 2);
}

#[tokio::test]
async fn equivalent_queries_share_an_entry() {
    let search = synthetic_search();
    let a = search.search(&OpportunityQuery::new("Stocks", "  AI ")).await;
    let b = search.search(&OpportunityQuery::new("stocks", "ai")).await;
    assert_eq!(a, b);
    assert_eq!(search.cached_entry_count().await, 1);
}

#[tokio::test]
async fn cache_stays_within_configured_bound() {
    let search = MarketSearch::new(SearchConfig {
        cache_max_entries: 2,
        ..SearchConfig::default()
    })
    .expect("valid config");
    for text in ["solar", "wind", "hydro", "geothermal", "battery"] {
        let results = search.search(&OpportunityQuery::new("energy", text)).await;
        assert!(!results.is_empty());
    }
    assert!(search.cached_entry_count().await <= 2);
}

#[tokio::test]
async fn cache_hit_skips_providers_and_rate_limits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listings/rental/long-term"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_RENTCAST_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let search = MarketSearch::new(config_with_rentcast(&server, 10)).expect("valid config");
    let first = search.search(&austin_rental()).await;
    let window = search
        .rate_limit_window(ProviderId::RentCast)
        .expect("first search calls RentCast");

    let second = search.search(&austin_rental()).await;
    assert_eq!(first, second);
    assert_eq!(search.rate_limit_window(ProviderId::RentCast), Some(window));
}

#[tokio::test]
async fn clear_cache_forces_a_fresh_route() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listings/rental/long-term"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_RENTCAST_JSON))
        .expect(2)
        .mount(&server)
        .await;

    let search = MarketSearch::new(config_with_rentcast(&server, 10)).expect("valid config");
    search.search(&austin_rental()).await;
    search.clear_cache();
    search.search(&austin_rental()).await;
    let window = search.rate_limit_window(ProviderId::RentCast).expect("window");
    assert_eq!(window.requests_in_window, 2);
}

// ---------------------------------------------------------------------------
// Live adapter paths against a mock provider
// ---------------------------------------------------------------------------

#[tokio::test]
async fn live_provider_results_are_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listings/rental/long-term"))
        .and(header("X-Api-Key", "test-key"))
        .and(query_param("city", "Austin"))
        .and(query_param("state", "TX"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_RENTCAST_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let search = MarketSearch::new(config_with_rentcast(&server, 10)).expect("valid config");
    let results = search.search(&austin_rental()).await;

    let live = results
        .iter()
        .find(|r| r.source == "RentCast")
        .expect("live RentCast result present");
    assert_eq!(live.data_freshness, DataFreshness::RealTime);
    assert_eq!(live.id, "rentcast-1200-Barton-Springs-Rd-Austin-TX-78704");
    assert_eq!(live.location.as_ref().map(|l| l.city.as_str()), Some("Austin"));
    // "rental" in title and description, plus the Austin location.
    assert!(live.relevance_score >= 0.6 - 1e-9);
}

#[tokio::test]
async fn provider_http_failure_falls_back_to_synthetic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let search = MarketSearch::new(config_with_rentcast(&server, 10)).expect("valid config");
    let results = search.search(&austin_rental()).await;

    let rentcast: Vec<_> = results.iter().filter(|r| r.source == "RentCast").collect();
    assert!(!rentcast.is_empty());
    assert!(rentcast
        .iter()
        .all(|r| r.data_freshness == DataFreshness::Synthetic));
}

#[tokio::test]
async fn malformed_body_falls_back_to_synthetic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let search = MarketSearch::new(config_with_rentcast(&server, 10)).expect("valid config");
    let results = search.search(&austin_rental()).await;
    assert!(results
        .iter()
        .filter(|r| r.source == "RentCast")
        .all(|r| r.data_freshness == DataFreshness::Synthetic));
}

#[tokio::test]
async fn rate_limited_provider_is_not_called() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_RENTCAST_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let search = MarketSearch::new(config_with_rentcast(&server, 1)).expect("valid config");
    search.search(&austin_rental()).await;
    let second = search
        .search(&OpportunityQuery::new("real estate", "duplex").with_location("Austin, TX"))
        .await;

    assert!(second
        .iter()
        .filter(|r| r.source == "RentCast")
        .all(|r| r.data_freshness == DataFreshness::Synthetic));
    let window = search.rate_limit_window(ProviderId::RentCast).expect("window");
    assert_eq!(window.requests_in_window, 1);
    assert_eq!(search.rate_limit_remaining(ProviderId::RentCast), Some(0));
}

#[tokio::test]
async fn slow_provider_times_out_to_synthetic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listings/rental/long-term"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(MOCK_RENTCAST_JSON)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut config = config_with_rentcast(&server, 10);
    config.timeout_seconds = 1;
    let search = MarketSearch::new(config).expect("valid config");

    let started = Instant::now();
    let results = search.search(&austin_rental()).await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(900), "returned before the timeout: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(4), "waited for the slow provider: {elapsed:?}");
    assert!(!results.is_empty());
    assert!(results
        .iter()
        .all(|r| r.data_freshness == DataFreshness::Synthetic));
    assert!(results
        .iter()
        .all(|r| r.id != "rentcast-1200-Barton-Springs-Rd-Austin-TX-78704"));
    let window = search.rate_limit_window(ProviderId::RentCast).expect("call was admitted");
    assert_eq!(window.requests_in_window, 1);
}

// ---------------------------------------------------------------------------
// Component properties
// ---------------------------------------------------------------------------

#[test]
fn limiter_admits_at_most_per_minute_budget() {
    let limiter = RateLimiter::new([(
        ProviderId::AlphaVantage,
        RateLimit {
            requests_per_minute: 5,
            requests_per_day: 25,
        },
    )]);
    let admitted = (0..20)
        .filter(|_| limiter.allow(ProviderId::AlphaVantage))
        .count();
    assert_eq!(admitted, 5);
}

#[test]
fn scorer_is_stable_for_ties() {
    let query = OpportunityQuery::new("commodities", "zzz-no-match");
    let results: Vec<_> = (0..6)
        .map(|i| {
            cf1_search::Opportunity::new(
                format!("id-{i}"),
                format!("Lot {i}"),
                "",
                OpportunityType::Commodity,
                FALLBACK_SOURCE,
            )
        })
        .collect();
    let ids: Vec<String> = score(results, &query).into_iter().map(|r| r.id).collect();
    assert_eq!(ids, (0..6).map(|i| format!("id-{i}")).collect::<Vec<_>>());
}
