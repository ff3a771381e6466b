//! Failure Classifier (§4.C): a deterministic pure function mapping a
//! driver-reported exception into a `FailureCategory`, no I/O.

use qaflow_contract::FailureCategory;

/// Which part of a step was executing when the exception was raised.
/// Only `Assertion` participates in the assertion-family rule of §4.C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Action,
    Assertion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: FailureCategory,
    pub retryable: bool,
    pub hint: String,
}

const ASSERTION_EXCEPTION_FAMILY: &[&str] = &[
    "AssertionError",
    "AssertionFailedError",
    "ExpectationFailed",
];

/// Classifies a failed step. Rules apply in order, first match wins
/// (§4.C): exception-kind match, then message substring match for
/// network/stale-element patterns, then the assertion-family rule, then
/// `UNKNOWN`.
pub fn classify(exception_kind: &str, message: &str, phase: Phase, attempt: u32) -> Classification {
    if let Some(category) = category_from_exception_kind(exception_kind) {
        return finish(category, attempt);
    }

    if let Some(category) = category_from_message(message) {
        return finish(category, attempt);
    }

    if phase == Phase::Assertion && is_assertion_family(exception_kind) {
        return finish(FailureCategory::AssertionFailed, attempt);
    }

    finish(FailureCategory::Unknown, attempt)
}

fn category_from_exception_kind(exception_kind: &str) -> Option<FailureCategory> {
    match exception_kind {
        "TimeoutException" | "PageLoadTimeoutException" => Some(FailureCategory::Timeout),
        "NoSuchElementException" | "ElementNotFoundException" => {
            Some(FailureCategory::ElementNotFound)
        }
        "StaleElementReferenceException" => Some(FailureCategory::StaleElement),
        "ElementNotInteractableException" | "ElementClickInterceptedException" => {
            Some(FailureCategory::ElementNotInteractable)
        }
        "InvalidSelectorException" => Some(FailureCategory::InvalidSelector),
        "WebDriverException" | "ConnectionRefusedError" | "NetworkException" => {
            Some(FailureCategory::NetworkError)
        }
        "ConfigurationError" | "UnsupportedBrowserException" => {
            Some(FailureCategory::Configuration)
        }
        "ApplicationError" => Some(FailureCategory::ApplicationError),
        _ => None,
    }
}

fn category_from_message(message: &str) -> Option<FailureCategory> {
    let lowercase = message.to_ascii_lowercase();
    if lowercase.contains("stale") {
        return Some(FailureCategory::StaleElement);
    }
    if lowercase.contains("connection refused")
        || lowercase.contains("econnrefused")
        || lowercase.contains("network")
        || lowercase.contains("dns")
    {
        return Some(FailureCategory::NetworkError);
    }
    None
}

fn is_assertion_family(exception_kind: &str) -> bool {
    ASSERTION_EXCEPTION_FAMILY.contains(&exception_kind)
}

fn hint_for(category: FailureCategory) -> &'static str {
    match category {
        FailureCategory::Timeout => "the page or element did not respond within the configured timeout",
        FailureCategory::ElementNotFound => "the locator did not match any element",
        FailureCategory::StaleElement => "the element reference was invalidated by a DOM mutation",
        FailureCategory::ElementNotInteractable => "the element is present but cannot receive the action",
        FailureCategory::InvalidSelector => "the locator syntax is malformed for its strategy",
        FailureCategory::NetworkError => "the browser lost connectivity to the target or driver",
        FailureCategory::AssertionFailed => "the expected condition did not hold",
        FailureCategory::ApplicationError => "the application under test raised an unexpected error",
        FailureCategory::Configuration => "the test or environment configuration is invalid",
        FailureCategory::Unknown => "the exception did not match any known pattern",
    }
}

fn finish(category: FailureCategory, attempt: u32) -> Classification {
    Classification {
        category,
        retryable: category.is_retryable(),
        hint: format!("{} (attempt {attempt})", hint_for(category)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_classify_maps_timeout_exception_to_timeout_category() {
        let result = classify("TimeoutException", "wait exceeded 5000ms", Phase::Action, 1);
        assert_eq!(result.category, FailureCategory::Timeout);
        assert!(result.retryable);
    }

    #[test]
    fn unit_classify_message_substring_detects_network_error_without_matching_kind() {
        let result = classify("RuntimeException", "connection refused by host", Phase::Action, 1);
        assert_eq!(result.category, FailureCategory::NetworkError);
        assert!(result.retryable);
    }

    #[test]
    fn functional_classify_assertion_family_in_assertion_phase_is_assertion_failed() {
        let result = classify("AssertionError", "expected 'Welcome' got 'Login'", Phase::Assertion, 1);
        assert_eq!(result.category, FailureCategory::AssertionFailed);
        assert!(!result.retryable);
    }

    #[test]
    fn regression_classify_assertion_family_outside_assertion_phase_is_unknown() {
        let result = classify("AssertionError", "expected 'Welcome' got 'Login'", Phase::Action, 1);
        assert_eq!(result.category, FailureCategory::Unknown);
        assert!(!result.retryable);
    }

    #[test]
    fn unit_classify_unrecognized_exception_and_message_is_unknown() {
        let result = classify("WeirdCustomException", "something odd happened", Phase::Action, 1);
        assert_eq!(result.category, FailureCategory::Unknown);
        assert!(!result.retryable);
    }

    #[test]
    fn regression_classify_exception_kind_match_takes_priority_over_message_substring() {
        let result = classify("StaleElementReferenceException", "network blip", Phase::Action, 2);
        assert_eq!(result.category, FailureCategory::StaleElement);
    }
}
