// Advanced stats calculator: evaluates the metric graph over one record.
//
// Evaluation is a single pass over the dependency-ordered metric list.
// Every computed value is memoized for the duration of the call; a metric
// whose dependency failed inherits that failure instead of being computed.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::formulas::{self, Scope};
use crate::metric::Metric;
use crate::record::{RecordError, StatRecord};

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

/// Why a metric could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureCause {
    /// Input fields absent from the record.
    MissingFields { fields: Vec<String> },
    /// A divisor evaluated to exactly zero.
    DivisionByZero { denominator: &'static str },
    /// The formula produced NaN or an infinity.
    NonFinite,
    /// A dependency had no value when it was read.
    Unresolved { metric: Metric },
}

/// A metric that is not applicable for this record.
///
/// `origin` is the metric where the failure started; for a metric that only
/// failed because one of its inputs did, it points upstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricFailure {
    pub metric: Metric,
    pub origin: Metric,
    pub cause: FailureCause,
}

impl fmt::Display for MetricFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: unavailable (", self.metric)?;
        match &self.cause {
            FailureCause::MissingFields { fields } => {
                write!(f, "missing field(s) {}", fields.join(", "))?
            }
            FailureCause::DivisionByZero { denominator } => {
                write!(f, "division by zero in {}: {}", self.origin, denominator)?
            }
            FailureCause::NonFinite => write!(f, "non-finite result in {}", self.origin)?,
            FailureCause::Unresolved { metric } => {
                write!(f, "{} was not computed before {}", metric, self.origin)?
            }
        }
        f.write_str(")")
    }
}

impl std::error::Error for MetricFailure {}

// ---------------------------------------------------------------------------
// Output record
// ---------------------------------------------------------------------------

/// The input record extended with every derived metric that could be
/// computed, plus one failure entry per metric that could not.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DerivedMetrics {
    values: BTreeMap<String, f64>,
    failures: Vec<MetricFailure>,
}

impl DerivedMetrics {
    /// Any value by name: an input field or a derived metric.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.get(metric.name())
    }

    pub fn failure(&self, metric: Metric) -> Option<&MetricFailure> {
        self.failures.iter().find(|f| f.metric == metric)
    }

    pub fn failures(&self) -> &[MetricFailure] {
        &self.failures
    }

    /// True when no requested metric failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Stateless evaluator for the fixed metric graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator;

impl Calculator {
    pub fn new() -> Self {
        Calculator
    }

    /// Evaluate every metric.
    pub fn evaluate(&self, record: &StatRecord) -> DerivedMetrics {
        self.evaluate_only(record, &Metric::ALL)
    }

    /// Evaluate `requested` and whatever they depend on. Metrics outside that
    /// closure are neither computed nor reported.
    pub fn evaluate_only(&self, record: &StatRecord, requested: &[Metric]) -> DerivedMetrics {
        let plan = plan(requested);

        // Field validation happens for the whole plan before any arithmetic.
        let missing: HashMap<Metric, Vec<String>> = plan
            .iter()
            .filter_map(|m| {
                let absent: Vec<String> = m
                    .required_fields()
                    .into_iter()
                    .filter(|f| !record.contains(f))
                    .map(str::to_string)
                    .collect();
                (!absent.is_empty()).then_some((*m, absent))
            })
            .collect();

        let mut memo: HashMap<Metric, f64> = HashMap::with_capacity(plan.len());
        let mut failed: HashMap<Metric, MetricFailure> = HashMap::new();
        let mut failures = Vec::new();

        for &metric in &plan {
            let upstream = metric.dependencies().find_map(|d| failed.get(&d));

            let failure = if let Some(fields) = missing.get(&metric) {
                let own = metric.direct_fields().any(|f| !record.contains(f));
                let origin = match upstream {
                    Some(up) if !own => up.origin,
                    _ => metric,
                };
                Some(MetricFailure {
                    metric,
                    origin,
                    cause: FailureCause::MissingFields {
                        fields: fields.clone(),
                    },
                })
            } else if let Some(up) = upstream {
                Some(MetricFailure {
                    metric,
                    origin: up.origin,
                    cause: up.cause.clone(),
                })
            } else {
                let scope = Scope::new(metric, record, &memo);
                match formulas::compute(metric, &scope) {
                    Ok(value) if value.is_finite() => {
                        memo.insert(metric, value);
                        None
                    }
                    Ok(_) => Some(MetricFailure {
                        metric,
                        origin: metric,
                        cause: FailureCause::NonFinite,
                    }),
                    Err(cause) => Some(MetricFailure {
                        metric,
                        origin: metric,
                        cause,
                    }),
                }
            };

            if let Some(failure) = failure {
                debug!("{}", failure);
                failed.insert(metric, failure.clone());
                failures.push(failure);
            }
        }

        let mut values: BTreeMap<String, f64> =
            record.iter().map(|(k, v)| (k.to_string(), v)).collect();
        for (metric, value) in &memo {
            values.insert(metric.name().to_string(), *value);
        }

        debug!(
            "evaluated {} metric(s): {} computed, {} unavailable",
            plan.len(),
            memo.len(),
            failures.len()
        );

        DerivedMetrics { values, failures }
    }

    /// Check that `record` carries every field `requested` needs, without
    /// evaluating anything.
    pub fn validate(&self, record: &StatRecord, requested: &[Metric]) -> Result<(), RecordError> {
        let required: BTreeSet<&'static str> = requested
            .iter()
            .flat_map(|m| m.required_fields())
            .collect();
        record.require(required)
    }
}

/// The requested metrics plus their transitive dependencies, in evaluation
/// order.
fn plan(requested: &[Metric]) -> Vec<Metric> {
    let mut needed: BTreeSet<Metric> = BTreeSet::new();
    let mut stack: Vec<Metric> = requested.to_vec();
    while let Some(metric) = stack.pop() {
        if needed.insert(metric) {
            stack.extend(metric.dependencies());
        }
    }
    Metric::evaluation_order()
        .iter()
        .copied()
        .filter(|m| needed.contains(m))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
