//! Default rule registry
//!
//! The baseline consumer-loan policy. Catalog versions adjust it with
//! overrides and custom rules; it is never mutated in place.

use underwrite_core::{ComparisonOperator, ComputedField, RuleDefinition, Severity, Threshold};

/// Build the default rule list, in evaluation order
pub fn default_rules() -> Vec<RuleDefinition> {
    use ComparisonOperator as Op;

    vec![
        RuleDefinition::threshold(
            "min_credit_score",
            "Minimum credit score",
            "credit_score",
            Op::Gte,
            Threshold::scalar(580.0),
            Severity::Hard,
        ),
        RuleDefinition::threshold(
            "max_dti",
            "Maximum debt-to-income ratio",
            "dti_ratio",
            Op::Lte,
            Threshold::scalar(0.45),
            Severity::Hard,
        ),
        RuleDefinition::threshold(
            "min_monthly_income",
            "Minimum monthly income",
            "monthly_income",
            Op::Gte,
            Threshold::scalar(300.0),
            Severity::Hard,
        ),
        RuleDefinition::threshold(
            "min_age",
            "Minimum applicant age",
            "age",
            Op::Gte,
            Threshold::scalar(18.0),
            Severity::Hard,
        ),
        RuleDefinition::threshold(
            "max_age",
            "Maximum applicant age",
            "age",
            Op::Lte,
            Threshold::scalar(70.0),
            Severity::Hard,
        ),
        RuleDefinition::computed(
            "max_maturity_age",
            "Maximum age at loan maturity",
            ComputedField::MaturityAge,
            Op::Lte,
            Threshold::scalar(75.0),
            Severity::Hard,
        )
        .with_description("Applicant age plus loan term must not exceed 75 years"),
        RuleDefinition::computed(
            "min_employment_months",
            "Minimum employment tenure",
            ComputedField::EmploymentMonths,
            Op::Gte,
            Threshold::scalar(6.0),
            Severity::Refer,
        ),
        RuleDefinition::threshold(
            "national_id_verified",
            "National ID verified",
            "national_id_verified",
            Op::Eq,
            Threshold::scalar(true),
            Severity::Hard,
        ),
        RuleDefinition::threshold(
            "employment_status_eligible",
            "Employment status eligible",
            "employment_status",
            Op::NotIn,
            Threshold::list(["unemployed"]),
            Severity::Hard,
        ),
        RuleDefinition::threshold(
            "loan_term_band",
            "Loan term within product limits",
            "term_months",
            Op::Between,
            Threshold::range(3.0, 60.0),
            Severity::Hard,
        ),
        RuleDefinition::threshold(
            "max_loan_amount",
            "Maximum loan amount",
            "loan_amount",
            Op::Lte,
            Threshold::scalar(50_000.0),
            Severity::Refer,
        ),
        RuleDefinition::threshold(
            "max_recent_delinquencies",
            "Delinquencies in the last 12 months",
            "delinquencies_12m",
            Op::Lte,
            Threshold::scalar(2.0),
            Severity::Refer,
        ),
        RuleDefinition::threshold(
            "no_bankruptcies",
            "No bankruptcies on file",
            "bankruptcies",
            Op::Eq,
            Threshold::scalar(0.0),
            Severity::Hard,
        ),
    ]
}
