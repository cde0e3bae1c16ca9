//! Routing attributes consumed by decision tree condition nodes

attribute_record! {
    /// Flat, immutable snapshot of everything a decision tree may branch on.
    ///
    /// Built once per decision by the caller's context builder from the
    /// application, borrower profile, bureau report, scorecard run and merchant.
    pub struct RoutingContext;

    /// Attributes a decision tree node can reference
    pub enum RoutingAttribute {
        // Relationship history
        is_existing_customer: bool => IsExistingCustomer,
        relationship_months: u32 => RelationshipMonths,
        prior_loans_count: u32 => PriorLoansCount,
        prior_loans_repaid: u32 => PriorLoansRepaid,
        active_loans_count: u32 => ActiveLoansCount,
        max_days_past_due: u32 => MaxDaysPastDue,
        months_since_last_loan: u32 => MonthsSinceLastLoan,

        // Application characteristics
        loan_amount: f64 => LoanAmount,
        term_months: u32 => TermMonths,
        product_type: String => ProductType,
        loan_purpose: String => LoanPurpose,
        channel: String => Channel,
        is_refinance: bool => IsRefinance,
        down_payment_ratio: f64 => DownPaymentRatio,

        // Borrower profile
        age: f64 => Age,
        employment_status: String => EmploymentStatus,
        employment_type: String => EmploymentType,
        monthly_income: f64 => MonthlyIncome,
        years_employed: f64 => YearsEmployed,
        residence_type: String => ResidenceType,
        region: String => Region,
        marital_status: String => MaritalStatus,
        dependents: u32 => Dependents,
        national_id_verified: bool => NationalIdVerified,

        // Bureau profile
        bureau_hit: bool => BureauHit,
        bureau_score: f64 => BureauScore,
        thin_file: bool => ThinFile,
        credit_history_months: u32 => CreditHistoryMonths,
        inquiries_6m: u32 => Inquiries6m,
        delinquencies_12m: u32 => Delinquencies12m,
        bankruptcies: u32 => Bankruptcies,
        total_outstanding_debt: f64 => TotalOutstandingDebt,
        dti_ratio: f64 => DtiRatio,

        // Scorecard outputs
        application_score: f64 => ApplicationScore,
        behavior_score: f64 => BehaviorScore,
        score_band: String => ScoreBand,
        probability_of_default: f64 => ProbabilityOfDefault,

        // Merchant data
        merchant_id: String => MerchantId,
        merchant_category: String => MerchantCategory,
        merchant_tier: String => MerchantTier,
        merchant_risk_rating: String => MerchantRiskRating,
        merchant_default_rate: f64 => MerchantDefaultRate,
    }

    computed {}
}

impl RoutingContext {
    pub fn new() -> Self {
        Self::default()
    }
}
