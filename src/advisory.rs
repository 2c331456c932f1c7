//! Advisory commentary on a projected deposit
//!
//! The advisory service is an external collaborator: anything that turns a
//! deposit and its projection into free text. [`AdvisoryPanel`] wraps a
//! service with the calling rules (one request at a time, capped text,
//! failures reduced to a friendly message).

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;

use crate::deposit::DepositInput;
use crate::projection::DepositResult;

/// Word budget requested from the service
pub const MAX_ADVICE_WORDS: usize = 150;

/// Hard cap on the text shown to the user
pub const MAX_ADVICE_CHARS: usize = 1200;

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("advisory service is not configured")]
    NotConfigured,

    #[error("advisory request failed: {0}")]
    Request(String),

    #[error("advisory service returned no text")]
    EmptyResponse,

    #[error("an advisory request is already in progress")]
    RequestInFlight,
}

/// Everything a service may use to answer: the raw figures and the
/// prompt built from them
#[derive(Debug, Clone)]
pub struct AdvisoryRequest<'a> {
    pub input: &'a DepositInput,
    pub result: &'a DepositResult,
    pub prompt: String,
}

impl<'a> AdvisoryRequest<'a> {
    pub fn new(input: &'a DepositInput, result: &'a DepositResult) -> Self {
        Self {
            input,
            result,
            prompt: build_prompt(input, result),
        }
    }
}

#[async_trait]
pub trait AdvisoryService: Send + Sync {
    async fn advise(&self, request: &AdvisoryRequest<'_>) -> Result<String, AdvisoryError>;
}

/// Prompt describing the deposit to a text-generation service
pub fn build_prompt(input: &DepositInput, result: &DepositResult) -> String {
    format!(
        "I am planning a Fixed Deposit investment with the following details:\n\
         - Principal: {principal}\n\
         - Interest Rate: {rate}%\n\
         - Tenure: {tenure} {unit}\n\
         - Compounding: {compounding}\n\
         \n\
         The calculated result is:\n\
         - Maturity Amount: {maturity}\n\
         - Total Interest Earned: {interest}\n\
         \n\
         Please provide a concise financial assessment (max {words} words).\n\
         1. Is this a competitive return based on general historical averages (no real-time data needed)?\n\
         2. What is the impact of inflation on this return?\n\
         3. Suggest one alternative low-risk investment if applicable.\n\
         \n\
         Keep the tone professional yet easy to understand for a general investor.",
        principal = input.principal,
        rate = input.rate,
        tenure = input.tenure_value,
        unit = input.tenure_type,
        compounding = input.compounding_frequency,
        maturity = result.maturity_amount,
        interest = result.total_interest,
        words = MAX_ADVICE_WORDS,
    )
}

/// Fixed message shown in place of advice when the service fails
pub fn failure_message(err: &AdvisoryError) -> &'static str {
    match err {
        AdvisoryError::EmptyResponse => "Could not generate advice at this time.",
        AdvisoryError::RequestInFlight => "Advice is already being prepared.",
        AdvisoryError::NotConfigured | AdvisoryError::Request(_) => {
            "Sorry, I am currently unable to provide financial advice. Please try again later."
        }
    }
}

/// Single-in-flight front for an advisory service
pub struct AdvisoryPanel<A: AdvisoryService> {
    service: A,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<A: AdvisoryService> AdvisoryPanel<A> {
    pub fn new(service: A) -> Self {
        Self {
            service,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Ask for advice. Refuses while another request is pending; no retry.
    pub async fn fetch(&self, input: &DepositInput, result: &DepositResult) -> Result<String, AdvisoryError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AdvisoryError::RequestInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let request = AdvisoryRequest::new(input, result);
        let text = self.service.advise(&request).await.map_err(|e| {
            log::warn!("Advisory request failed: {}", e);
            e
        })?;

        let text = text.trim();
        if text.is_empty() {
            return Err(AdvisoryError::EmptyResponse);
        }
        Ok(cap_text(text, MAX_ADVICE_CHARS))
    }

    /// Advice text, or the failure message. Never fails.
    pub async fn fetch_display(&self, input: &DepositInput, result: &DepositResult) -> String {
        match self.fetch(input, result).await {
            Ok(text) => text,
            Err(e) => failure_message(&e).to_string(),
        }
    }
}

fn cap_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

/// Offline advisor built from fixed rules of thumb.
///
/// Compares the effective annual yield with a typical deposit band and
/// an assumed inflation rate. Works from the figures and ignores the prompt.
#[derive(Debug, Clone)]
pub struct RuleBasedAdvisor {
    /// Assumed annual inflation, percent
    pub inflation_pct: f64,
    /// Typical fixed deposit rate band, percent
    pub typical_band: (f64, f64),
}

impl Default for RuleBasedAdvisor {
    fn default() -> Self {
        Self {
            inflation_pct: 3.0,
            typical_band: (4.0, 7.0),
        }
    }
}

impl RuleBasedAdvisor {
    /// Effective annual yield of the deposit's compounding, percent
    fn effective_yield(input: &DepositInput) -> f64 {
        let n = input.compounding_frequency.periods_per_year() as f64;
        ((1.0 + input.rate / 100.0 / n).powf(n) - 1.0) * 100.0
    }
}

#[async_trait]
impl AdvisoryService for RuleBasedAdvisor {
    async fn advise(&self, request: &AdvisoryRequest<'_>) -> Result<String, AdvisoryError> {
        let (input, result) = (request.input, request.result);
        if result.is_zero() {
            return Err(AdvisoryError::Request(
                "deposit is below the minimum principal".to_string(),
            ));
        }

        let effective = Self::effective_yield(input);
        let (low, high) = self.typical_band;
        let competitiveness = if effective >= high {
            "well above the typical fixed deposit range"
        } else if effective >= low {
            "within the typical fixed deposit range"
        } else {
            "below the typical fixed deposit range"
        };

        let real = ((1.0 + effective / 100.0) / (1.0 + self.inflation_pct / 100.0) - 1.0) * 100.0;
        let inflation = if real > 0.0 {
            format!(
                "After {:.1}% inflation the real return is about {:.2}% a year, so purchasing power still grows.",
                self.inflation_pct, real
            )
        } else {
            format!(
                "After {:.1}% inflation the real return is about {:.2}% a year, so purchasing power shrinks.",
                self.inflation_pct, real
            )
        };

        let alternative = if input.tenure_years() >= 3.0 {
            "For a long horizon, government savings bonds offer similar safety with comparable yields."
        } else {
            "For a shorter horizon, a high-yield savings account keeps funds accessible at low risk."
        };

        Ok(format!(
            "An effective yield of {:.2}% is {}. Total interest of {:.2} on {:.2} comes from {} compounding. {} {}",
            effective,
            competitiveness,
            result.total_interest,
            input.principal,
            input.compounding_frequency.label().to_lowercase(),
            inflation,
            alternative,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deposit::{CompoundingFrequency, TenureType};
    use crate::projection::DepositEngine;
    use std::sync::Mutex;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn input() -> DepositInput {
        DepositInput::new(
            250_000.0,
            6.5,
            2,
            TenureType::Years,
            CompoundingFrequency::Quarterly,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    struct Canned(Result<String, ()>);

    #[async_trait]
    impl AdvisoryService for Canned {
        async fn advise(&self, _: &AdvisoryRequest<'_>) -> Result<String, AdvisoryError> {
            self.0
                .clone()
                .map_err(|_| AdvisoryError::Request("boom".to_string()))
        }
    }

    struct Slow;

    #[async_trait]
    impl AdvisoryService for Slow {
        async fn advise(&self, _: &AdvisoryRequest<'_>) -> Result<String, AdvisoryError> {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok("done".to_string())
        }
    }

    /// Keeps the prompt it was sent
    #[derive(Default)]
    struct Recording(Mutex<Option<String>>);

    #[async_trait]
    impl AdvisoryService for Recording {
        async fn advise(&self, request: &AdvisoryRequest<'_>) -> Result<String, AdvisoryError> {
            *self.0.lock().unwrap() = Some(request.prompt.clone());
            Ok("noted".to_string())
        }
    }

    #[test]
    fn test_prompt_mentions_figures() {
        let input = input();
        let result = DepositEngine::default().project(&input);
        let prompt = build_prompt(&input, &result);
        assert!(prompt.contains("Principal: 250000"));
        assert!(prompt.contains("Interest Rate: 6.5%"));
        assert!(prompt.contains("Tenure: 2 Years"));
        assert!(prompt.contains("Maturity Amount: 284409.75"));
        assert!(prompt.contains("max 150 words"));
    }

    #[tokio::test]
    async fn test_failure_becomes_message() {
        let panel = AdvisoryPanel::new(Canned(Err(())));
        let input = input();
        let result = DepositEngine::default().project(&input);

        assert!(matches!(panel.fetch(&input, &result).await, Err(AdvisoryError::Request(_))));
        assert_eq!(
            panel.fetch_display(&input, &result).await,
            "Sorry, I am currently unable to provide financial advice. Please try again later."
        );
        assert!(!panel.is_busy());
    }

    #[tokio::test]
    async fn test_empty_and_long_responses() {
        let input = input();
        let result = DepositEngine::default().project(&input);

        let empty = AdvisoryPanel::new(Canned(Ok("   ".to_string())));
        assert!(matches!(empty.fetch(&input, &result).await, Err(AdvisoryError::EmptyResponse)));

        let long = AdvisoryPanel::new(Canned(Ok("word ".repeat(1000))));
        let text = long.fetch(&input, &result).await.unwrap();
        assert!(text.ends_with("..."));
        assert!(text.chars().count() <= MAX_ADVICE_CHARS + 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_request_refused_while_pending() {
        let panel = AdvisoryPanel::new(Slow);
        let input = input();
        let result = DepositEngine::default().project(&input);

        let (first, second) = tokio::join!(panel.fetch(&input, &result), async {
            tokio::task::yield_now().await;
            panel.fetch(&input, &result).await
        });

        assert_eq!(first.unwrap(), "done");
        assert!(matches!(second, Err(AdvisoryError::RequestInFlight)));

        // Released once the first completes
        assert_eq!(panel.fetch(&input, &result).await.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_rule_based_advisor() {
        let advisor = RuleBasedAdvisor::default();
        let input = input();
        let result = DepositEngine::default().project(&input);

        let text = advisor.advise(&AdvisoryRequest::new(&input, &result)).await.unwrap();
        assert!(text.contains("6.66%"), "{}", text);
        assert!(text.contains("within the typical"), "{}", text);
        assert!(text.contains("purchasing power still grows"), "{}", text);
        assert!(text.split_whitespace().count() <= MAX_ADVICE_WORDS);

        let mut small = input.clone();
        small.principal = 10.0;
        let zero = DepositEngine::default().project(&small);
        assert!(advisor.advise(&AdvisoryRequest::new(&small, &zero)).await.is_err());
    }

    #[tokio::test]
    async fn test_panel_sends_prompt_to_service() {
        let panel = AdvisoryPanel::new(Recording::default());
        let input = input();
        let result = DepositEngine::default().project(&input);

        assert_eq!(panel.fetch(&input, &result).await.unwrap(), "noted");
        let sent = panel.service.0.lock().unwrap().clone().unwrap();
        assert_eq!(sent, build_prompt(&input, &result));
        assert!(sent.contains("max 150 words"));
    }
}
