//! Applicant attributes evaluated by the rule catalog

use crate::attributes::AttributeRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

attribute_record! {
    /// Flat, immutable snapshot of applicant and loan attributes.
    ///
    /// Built by the caller's context builder. `employment_months` and
    /// `maturity_age` are derived on read and never stored.
    pub struct RuleInput;

    /// Attributes a rule can reference
    pub enum RuleField {
        /// Bureau credit score
        credit_score: f64 => CreditScore,
        /// Debt-to-income ratio (0.35 = 35%)
        dti_ratio: f64 => DtiRatio,
        monthly_income: f64 => MonthlyIncome,
        annual_income: f64 => AnnualIncome,
        age: f64 => Age,
        years_employed: f64 => YearsEmployed,
        employment_status: String => EmploymentStatus,
        loan_amount: f64 => LoanAmount,
        term_months: u32 => TermMonths,
        national_id_verified: bool => NationalIdVerified,
        existing_monthly_debt: f64 => ExistingMonthlyDebt,
        delinquencies_12m: u32 => Delinquencies12m,
        bankruptcies: u32 => Bankruptcies,
        bureau_inquiries_6m: u32 => BureauInquiries6m,
        open_credit_lines: u32 => OpenCreditLines,
        residence_years: f64 => ResidenceYears,
        loan_purpose: String => LoanPurpose,
        product_type: String => ProductType,
        is_existing_customer: bool => IsExistingCustomer,
        /// Scorecard output captured with the application
        application_score: f64 => ApplicationScore,
    }

    computed {
        /// years_employed x 12
        "employment_months" => EmploymentMonths = RuleInput::employment_months,
        /// age + term_months / 12
        "maturity_age" => MaturityAge = RuleInput::maturity_age,
    }
}

impl RuleInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Employment tenure in months
    pub fn employment_months(&self) -> Option<f64> {
        self.years_employed.map(|years| years * 12.0)
    }

    /// Applicant age at the end of the loan term
    pub fn maturity_age(&self) -> Option<f64> {
        match (self.age, self.term_months) {
            (Some(age), Some(term)) => Some(age + term as f64 / 12.0),
            _ => None,
        }
    }

    /// Look up an attribute by name, `None` if the name is not a known field
    pub fn field(&self, name: &str) -> Option<crate::value::Value> {
        self.lookup(name)
    }
}

/// Typed handle on a computed attribute, used by computed rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputedField {
    EmploymentMonths,
    MaturityAge,
}

impl ComputedField {
    pub fn field(self) -> RuleField {
        match self {
            ComputedField::EmploymentMonths => RuleField::EmploymentMonths,
            ComputedField::MaturityAge => RuleField::MaturityAge,
        }
    }

    pub fn from_field(field: RuleField) -> Option<Self> {
        match field {
            RuleField::EmploymentMonths => Some(ComputedField::EmploymentMonths),
            RuleField::MaturityAge => Some(ComputedField::MaturityAge),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        self.field().name()
    }
}

impl fmt::Display for ComputedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
