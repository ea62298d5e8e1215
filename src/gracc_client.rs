//! Query client for the GRACC aggregation backend
//!
//! Issues one bucketed sum-aggregation request per window against the GRACC
//! Elasticsearch endpoint and decodes the response into an ordered
//! [`AnalysisResult`]. Queries are filtered to batch workloads and exclude
//! records carrying placeholder site or organization names.
//!
//! The request always sets `extended_bounds` on the date histogram so that
//! buckets with zero activity inside `[start, end)` are still emitted. An
//! absent bucket and a zero bucket mean different things; only a
//! bounds-extended request disambiguates them.

use crate::config::GraccConfig;
use crate::error::{GraccstatError, Result};
use crate::types::{AnalysisResult, HistogramDataPoint};
use crate::window::Window;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Site names that mark records with no usable site attribution
const EXCLUDED_SITE_NAMES: [&str; 3] = ["NONE", "Generic", "Obsolete"];

/// Organization (VO) names that mark records with no usable attribution
const EXCLUDED_VO_NAMES: [&str; 3] = ["Unknown", "unknown", "other"];

/// HTTP client for bucketed sum-aggregation queries
pub struct GraccClient {
    endpoint: String,
    client: reqwest::Client,
}

impl GraccClient {
    /// Create a new client from configuration.
    ///
    /// The per-query timeout is applied at the HTTP client level; an expired
    /// query surfaces as a [`GraccstatError::Network`] error.
    pub fn new(config: &GraccConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Run one bucketed sum-aggregation query for a window against an index.
    ///
    /// The index is chosen by the caller per timespan (see
    /// [`GraccConfig::index_for`]); this client does not decide it.
    pub async fn query(&self, window: &Window, index: &str) -> Result<AnalysisResult> {
        let url = format!("{}/{}/_search", self.endpoint, index);
        let body = build_query(window);

        debug!(
            %index,
            start = %window.start,
            end = %window.end,
            interval = window.interval.es_interval(),
            "querying GRACC"
        );

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GraccstatError::Query { status });
        }

        let text = response.text().await?;
        decode_response(window, &text)
    }
}

/// Build the search request body for one window.
///
/// `size: 0` suppresses hits; only the `EndTime` date-histogram aggregation
/// with its `CoreHours` and `Njobs` sums is returned.
fn build_query(window: &Window) -> serde_json::Value {
    let start = format_instant(window.start);
    let end = format_instant(window.end);

    json!({
        "size": 0,
        "query": {
            "bool": {
                "filter": [
                    {
                        "range": {
                            "EndTime": {
                                "gte": start,
                                "lt": end,
                            }
                        }
                    },
                    {
                        "term": {
                            "ResourceType": "Batch",
                        }
                    },
                    {
                        "bool": {
                            "must_not": [
                                {
                                    "terms": {
                                        "SiteName": EXCLUDED_SITE_NAMES,
                                    }
                                },
                                {
                                    "terms": {
                                        "VOName": EXCLUDED_VO_NAMES,
                                    }
                                },
                            ]
                        }
                    },
                ]
            }
        },
        "aggs": {
            "EndTime": {
                "date_histogram": {
                    "field": "EndTime",
                    "interval": window.interval.es_interval(),
                    "extended_bounds": {
                        "min": start,
                        "max": end,
                    }
                },
                "aggs": {
                    "CoreHours": {
                        "sum": {
                            "field": "CoreHours",
                        }
                    },
                    "Njobs": {
                        "sum": {
                            "field": "Njobs",
                        }
                    },
                }
            }
        }
    })
}

fn format_instant(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    took: u64,
    aggregations: Aggregations,
}

#[derive(Debug, Deserialize)]
struct Aggregations {
    #[serde(rename = "EndTime")]
    end_time: EndTimeAggregation,
}

#[derive(Debug, Deserialize)]
struct EndTimeAggregation {
    buckets: Vec<Bucket>,
}

#[derive(Debug, Deserialize)]
struct Bucket {
    key_as_string: String,
    #[serde(rename = "CoreHours")]
    core_hours: MetricValue,
    #[serde(rename = "Njobs")]
    njobs: MetricValue,
}

#[derive(Debug, Deserialize)]
struct MetricValue {
    value: Option<f64>,
}

/// Decode a response body into an [`AnalysisResult`] for a window.
///
/// Decoding is explicit: the `aggregations.EndTime.buckets` structure and
/// every bucket's numeric fields are validated, and each bucket key is
/// right-aligned by advancing it one interval. Bucket keys must be strictly
/// increasing; anything else indicates a bug in the window arithmetic or a
/// backend regression.
///
/// `extended_bounds.max` is inclusive on the backend, so a window whose end
/// sits exactly on a bucket boundary comes back with one empty bucket keyed
/// at the window end. Buckets outside `[start, end)` are dropped here; kept,
/// they would shift which buckets the sum trims.
fn decode_response(window: &Window, body: &str) -> Result<AnalysisResult> {
    let response: SearchResponse = serde_json::from_str(body)?;

    let buckets = response.aggregations.end_time.buckets;
    let mut data_points = Vec::with_capacity(buckets.len());
    let mut previous_key: Option<DateTime<Utc>> = None;

    for bucket in buckets {
        let key: DateTime<Utc> = bucket.key_as_string.parse().map_err(|e| {
            GraccstatError::MalformedResponse(format!(
                "unparseable bucket key {:?}: {e}",
                bucket.key_as_string
            ))
        })?;

        if key < window.start || key >= window.end {
            continue;
        }

        if let Some(previous) = previous_key
            && key <= previous
        {
            return Err(GraccstatError::Alignment(format!(
                "bucket keys not strictly increasing: {key} after {previous}"
            )));
        }
        previous_key = Some(key);

        let cpu_hours = bucket.core_hours.value.ok_or_else(|| {
            GraccstatError::MalformedResponse(format!("bucket {key} has no CoreHours value"))
        })?;
        let njobs = bucket.njobs.value.ok_or_else(|| {
            GraccstatError::MalformedResponse(format!("bucket {key} has no Njobs value"))
        })?;

        data_points.push(HistogramDataPoint {
            timestamp: window.interval.advance(key),
            job_count: njobs.max(0.0).round() as u64,
            cpu_hours: cpu_hours.max(0.0),
        });
    }

    Ok(AnalysisResult {
        query_duration_ms: response.took,
        window_start: window.start,
        window_end: window.end,
        data_points,
    })
}
