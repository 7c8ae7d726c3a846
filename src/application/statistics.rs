//! Descriptive statistics and the one-sample t-test used to compare the
//! model against the random baseline.

use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::{Data, Distribution};

const EPSILON: f64 = 1e-12;

/// Population mean, standard deviation and skewness of one draw.
///
/// Standard deviation and skewness are 0.0 (not NaN) when every value is
/// equal or the slice is too short for the moment to be defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub std_dev: f64,
    pub skewness: f64,
}

pub fn population_moments(values: &[f64]) -> Moments {
    if values.is_empty() {
        return Moments {
            mean: 0.0,
            std_dev: 0.0,
            skewness: 0.0,
        };
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev < EPSILON {
        return Moments {
            mean,
            std_dev: 0.0,
            skewness: 0.0,
        };
    }

    let skewness = values
        .iter()
        .map(|v| ((v - mean) / std_dev).powi(3))
        .sum::<f64>()
        / n;

    Moments {
        mean,
        std_dev,
        skewness,
    }
}

/// Result of a one-sample Student's t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    pub t_statistic: f64,
    pub degrees_of_freedom: f64,
    pub p_two_tailed: f64,
}

impl TTest {
    /// Tests whether the mean of `samples` differs from `hypothesized_mean`.
    ///
    /// Returns `None` when the statistic is undefined: fewer than two
    /// samples, or zero spread with the sample mean equal to the hypothesis.
    /// Zero spread away from the hypothesis gives an infinite statistic and a
    /// p-value of 0.
    pub fn one_sample(samples: &[f64], hypothesized_mean: f64) -> Option<TTest> {
        if samples.len() < 2 {
            return None;
        }

        let data = Data::new(samples.to_vec());
        let mean = data.mean()?;
        let std_dev = data.std_dev()?;
        let n = samples.len() as f64;
        let df = n - 1.0;
        let diff = mean - hypothesized_mean;

        if std_dev < EPSILON {
            if diff.abs() < EPSILON {
                return None;
            }
            return Some(TTest {
                t_statistic: if diff > 0.0 {
                    f64::INFINITY
                } else {
                    f64::NEG_INFINITY
                },
                degrees_of_freedom: df,
                p_two_tailed: 0.0,
            });
        }

        let t = diff / (std_dev / n.sqrt());
        let dist = StudentsT::new(0.0, 1.0, df).ok()?;
        let p = (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0);

        Some(TTest {
            t_statistic: t,
            degrees_of_freedom: df,
            p_two_tailed: p,
        })
    }

    /// One-tailed p-value for "sample mean is greater than the hypothesis".
    /// A negative statistic means the sample is no better, so the p-value is 1.
    pub fn p_greater(&self) -> f64 {
        if self.t_statistic < 0.0 {
            1.0
        } else {
            self.p_two_tailed / 2.0
        }
    }
}

/// One-tailed p-value that the samples beat `baseline`; 1.0 when undefined.
pub fn p_value_better_than(samples: &[f64], baseline: f64) -> f64 {
    TTest::one_sample(samples, baseline)
        .map(|t| t.p_greater())
        .unwrap_or(1.0)
}
