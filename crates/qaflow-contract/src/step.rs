use serde::{Deserialize, Serialize};

use qaflow_core::QaError;

/// Closed set of recognized step actions (§4.E). An action outside this
/// set fails the run with category `CONFIGURATION`, not retryable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepAction {
    Navigate,
    Reload,
    GoBack,
    Click,
    Hover,
    Fill,
    Clear,
    SelectOption,
    Check,
    Uncheck,
    PressKey,
    WaitForLoad,
    WaitForSelector,
    WaitForUrl,
    AssertText,
    AssertVisible,
    AssertHidden,
    AssertUrl,
    AssertTitle,
    AssertCount,
    AssertValue,
    AssertEnabled,
    AssertDisabled,
}

impl StepAction {
    /// Parses a step action from its wire token, case-insensitively.
    /// Unrecognized tokens are the one place the closed-set rule of
    /// §4.E is enforced at the boundary of a test definition.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "NAVIGATE" => Some(Self::Navigate),
            "RELOAD" => Some(Self::Reload),
            "GO_BACK" => Some(Self::GoBack),
            "CLICK" => Some(Self::Click),
            "HOVER" => Some(Self::Hover),
            "FILL" => Some(Self::Fill),
            "CLEAR" => Some(Self::Clear),
            "SELECT_OPTION" => Some(Self::SelectOption),
            "CHECK" => Some(Self::Check),
            "UNCHECK" => Some(Self::Uncheck),
            "PRESS_KEY" => Some(Self::PressKey),
            "WAIT_FOR_LOAD" => Some(Self::WaitForLoad),
            "WAIT_FOR_SELECTOR" => Some(Self::WaitForSelector),
            "WAIT_FOR_URL" => Some(Self::WaitForUrl),
            "ASSERT_TEXT" => Some(Self::AssertText),
            "ASSERT_VISIBLE" => Some(Self::AssertVisible),
            "ASSERT_HIDDEN" => Some(Self::AssertHidden),
            "ASSERT_URL" => Some(Self::AssertUrl),
            "ASSERT_TITLE" => Some(Self::AssertTitle),
            "ASSERT_COUNT" => Some(Self::AssertCount),
            "ASSERT_VALUE" => Some(Self::AssertValue),
            "ASSERT_ENABLED" => Some(Self::AssertEnabled),
            "ASSERT_DISABLED" => Some(Self::AssertDisabled),
            _ => None,
        }
    }

    pub fn is_assertion(self) -> bool {
        matches!(
            self,
            Self::AssertText
                | Self::AssertVisible
                | Self::AssertHidden
                | Self::AssertUrl
                | Self::AssertTitle
                | Self::AssertCount
                | Self::AssertValue
                | Self::AssertEnabled
                | Self::AssertDisabled
        )
    }
}

/// Locator resolution strategy, selected by a recognized prefix on the
/// raw locator string or by falling back to CSS (§4.E).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LocatorStrategy {
    Id,
    Name,
    Css,
    Xpath,
    Class,
    Text,
    Role,
    TestId,
    Label,
}

/// A resolved locator: strategy plus the remaining selector value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Locator {
    pub strategy: LocatorStrategy,
    pub value: String,
}

impl Locator {
    /// Resolves a raw locator string by strategy prefix, defaulting to
    /// CSS when no recognized prefix is present (§4.E).
    pub fn resolve(raw: &str) -> Self {
        let prefixes: &[(&str, LocatorStrategy)] = &[
            ("id=", LocatorStrategy::Id),
            ("name=", LocatorStrategy::Name),
            ("css=", LocatorStrategy::Css),
            ("xpath=", LocatorStrategy::Xpath),
            ("class=", LocatorStrategy::Class),
            ("text=", LocatorStrategy::Text),
            ("role=", LocatorStrategy::Role),
            ("testid=", LocatorStrategy::TestId),
            ("label=", LocatorStrategy::Label),
        ];
        for (prefix, strategy) in prefixes {
            if let Some(value) = raw.strip_prefix(prefix) {
                return Self {
                    strategy: *strategy,
                    value: value.to_string(),
                };
            }
        }
        Self {
            strategy: LocatorStrategy::Css,
            value: raw.to_string(),
        }
    }
}

/// One atomic action inside a test's script payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Step {
    pub action: String,
    #[serde(default)]
    pub locator: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Step {
    /// Parses the action token into the closed `StepAction` set.
    /// Returns `Validation` rather than panicking so script authoring
    /// errors surface as ordinary API failures (§7).
    pub fn parsed_action(&self) -> Result<StepAction, QaError> {
        StepAction::parse(&self.action)
            .ok_or_else(|| QaError::validation(format!("unrecognized step action '{}'", self.action)))
    }
}
