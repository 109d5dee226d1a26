//! Column schema shared by both conversion directions.
//!
//! The set of standard fields is closed (`Field`). What changes between
//! deployments is how each field is labelled in the header row and which
//! custom fields are recognized; both live in `Schema`.

use serde::{Deserialize, Serialize};

// ============================================================================
// FIELDS
// ============================================================================

/// A standard column of the tabular representation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Field {
    Id,
    ExternalId,
    Version,
    TestCaseName,
    Summary,
    Importance,
    Preconditions,
    StepNumber,
    Action,
    ExpectedResult,
    ExecutionType,
    EstimatedDuration,
    Status,
    Active,
    Open,
    ParentSuite,
}

impl Field {
    /// Number of standard fields.
    pub const COUNT: usize = 16;

    /// All standard fields in output column order.
    pub const ALL: [Field; Field::COUNT] = [
        Field::Id,
        Field::ExternalId,
        Field::Version,
        Field::TestCaseName,
        Field::Summary,
        Field::Importance,
        Field::Preconditions,
        Field::StepNumber,
        Field::Action,
        Field::ExpectedResult,
        Field::ExecutionType,
        Field::EstimatedDuration,
        Field::Status,
        Field::Active,
        Field::Open,
        Field::ParentSuite,
    ];

    /// Columns that must be present in every input header.
    pub const REQUIRED: [Field; 8] = [
        Field::TestCaseName,
        Field::Version,
        Field::Summary,
        Field::Importance,
        Field::StepNumber,
        Field::Action,
        Field::ExpectedResult,
        Field::ExecutionType,
    ];

    /// Columns that may be absent from an input header.
    pub const OPTIONAL: [Field; 8] = [
        Field::Id,
        Field::ExternalId,
        Field::Preconditions,
        Field::EstimatedDuration,
        Field::Status,
        Field::Active,
        Field::Open,
        Field::ParentSuite,
    ];

    /// Position of this field in `Field::ALL`.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }

    pub const fn english_label(self) -> &'static str {
        match self {
            Field::Id => "ID",
            Field::ExternalId => "ExternalID",
            Field::Version => "Version",
            Field::TestCaseName => "TestCaseName",
            Field::Summary => "Summary",
            Field::Importance => "Importance",
            Field::Preconditions => "Preconditions",
            Field::StepNumber => "StepNumber",
            Field::Action => "Action",
            Field::ExpectedResult => "ExpectedResult",
            Field::ExecutionType => "ExecutionType",
            Field::EstimatedDuration => "EstimatedDuration",
            Field::Status => "Status",
            Field::Active => "Active",
            Field::Open => "Open",
            Field::ParentSuite => "ParentSuite",
        }
    }

    pub const fn japanese_label(self) -> &'static str {
        match self {
            Field::Id => "ID",
            Field::ExternalId => "外部ID",
            Field::Version => "バージョン",
            Field::TestCaseName => "テストケース名",
            Field::Summary => "サマリ（概要）",
            Field::Importance => "重要度",
            Field::Preconditions => "事前条件",
            Field::StepNumber => "ステップ番号",
            Field::Action => "アクション（手順）",
            Field::ExpectedResult => "期待結果",
            Field::ExecutionType => "実行タイプ",
            Field::EstimatedDuration => "推定実行時間",
            Field::Status => "ステータス",
            Field::Active => "有効/無効",
            Field::Open => "開いているか",
            Field::ParentSuite => "親テストスイート名",
        }
    }
}

// ============================================================================
// LABEL PRESETS
// ============================================================================

/// A built-in set of header labels.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPreset {
    #[default]
    English,
    Japanese,
}

impl LabelPreset {
    pub fn label(self, field: Field) -> &'static str {
        match self {
            LabelPreset::English => field.english_label(),
            LabelPreset::Japanese => field.japanese_label(),
        }
    }
}

/// Custom fields recognized when nothing else is configured.
pub const DEFAULT_CUSTOM_FIELDS: [&str; 5] = [
    "AutomationAction",
    "AutomationParameters",
    "AutomationEnabled",
    "AutomationTargetNode",
    "AutomationValidation",
];

// ============================================================================
// SCHEMA
// ============================================================================

/// Resolved header labels plus the declared custom-field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    labels: Vec<String>,
    custom_fields: Vec<String>,
}

impl Schema {
    pub fn new(preset: LabelPreset) -> Self {
        Self {
            labels: Field::ALL
                .iter()
                .map(|&field| preset.label(field).to_string())
                .collect(),
            custom_fields: DEFAULT_CUSTOM_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Overrides the header label of one field.
    pub fn with_label(mut self, field: Field, label: impl Into<String>) -> Self {
        self.labels[field.index()] = label.into();
        self
    }

    /// Replaces the declared custom-field list.
    pub fn with_custom_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_fields = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn label(&self, field: Field) -> &str {
        &self.labels[field.index()]
    }

    pub fn custom_fields(&self) -> &[String] {
        &self.custom_fields
    }

    /// The header row written in front of flattened rows.
    pub fn header_row(&self) -> Vec<String> {
        self.labels
            .iter()
            .chain(self.custom_fields.iter())
            .cloned()
            .collect()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(LabelPreset::English)
    }
}
